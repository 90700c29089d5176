//! Calendar date types for tracking venue availability.
//!
//! Each bookable day is represented by a [`CalendarDate`] row with an
//! availability state and an estimated rental price. Rows are created lazily
//! the first time a day is referenced and are never deleted once a booking
//! has existed for them.

use std::fmt;
use std::str::FromStr;

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

/// Identifier for a calendar date row.
pub type DateId = i64;

/// Availability state of a calendar date.
///
/// A date starts `Available`, moves to `Pending` when a booking request is
/// waiting for approval, and to `Reserved` once a booking is confirmed.
/// Cancelling or archiving the booking returns the date to `Available`.
///
/// # Examples
///
/// ```
/// use venua::DateState;
///
/// assert_eq!(DateState::Available.as_str(), "available");
/// assert_eq!("reserved".parse::<DateState>().unwrap(), DateState::Reserved);
/// assert!(DateState::Available.is_bookable());
/// assert!(!DateState::Pending.is_bookable());
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DateState {
    /// The date is open for booking.
    Available,
    /// A booking request is pending approval for this date.
    Pending,
    /// The date is held by a confirmed booking.
    Reserved,
}

impl DateState {
    /// Returns the canonical string form used for storage.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Available => "available",
            Self::Pending => "pending",
            Self::Reserved => "reserved",
        }
    }

    /// Whether a new booking may be created against a date in this state.
    #[must_use]
    pub const fn is_bookable(self) -> bool {
        matches!(self, Self::Available)
    }
}

impl fmt::Display for DateState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for DateState {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "available" => Ok(Self::Available),
            "pending" => Ok(Self::Pending),
            "reserved" => Ok(Self::Reserved),
            other => Err(format!("unknown date state: {other}")),
        }
    }
}

/// A single bookable day with an availability state and estimated price.
///
/// # Examples
///
/// ```
/// use chrono::NaiveDate;
/// use venua::{CalendarDate, DateState};
///
/// let day = NaiveDate::from_ymd_opt(2025, 12, 25).unwrap();
/// let date = CalendarDate::new(1, day);
/// assert_eq!(date.state, DateState::Available);
/// assert_eq!(date.price, 0.0);
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CalendarDate {
    /// Row identifier.
    pub id: DateId,
    /// The calendar day (unique across the table).
    pub day: NaiveDate,
    /// Current availability state.
    pub state: DateState,
    /// Estimated rental price for the day.
    pub price: f64,
}

impl CalendarDate {
    /// Creates a fresh date record in the default state (`available`, zero
    /// price), as produced by lazy creation.
    #[must_use]
    pub const fn new(id: DateId, day: NaiveDate) -> Self {
        Self {
            id,
            day,
            state: DateState::Available,
            price: 0.0,
        }
    }
}

/// Parses a `YYYY-MM-DD` day string.
///
/// # Errors
///
/// Returns a `Validation` error for any other format.
///
/// # Examples
///
/// ```
/// use venua::calendar::parse_day;
///
/// assert!(parse_day("2025-12-25").is_ok());
/// assert!(parse_day("25/12/2025").is_err());
/// ```
pub fn parse_day(s: &str) -> crate::Result<NaiveDate> {
    NaiveDate::parse_from_str(s, "%Y-%m-%d").map_err(|_| crate::Error::Validation {
        field: "day".into(),
        message: format!("invalid day '{s}', expected YYYY-MM-DD"),
    })
}

/// Validates an estimated price or rental price.
///
/// Prices must be finite and non-negative.
///
/// # Errors
///
/// Returns a `Validation` error otherwise.
pub fn validate_price(price: f64) -> crate::Result<()> {
    if !price.is_finite() || price < 0.0 {
        return Err(crate::Error::Validation {
            field: "price".into(),
            message: format!("price must be a non-negative number, got {price}"),
        });
    }
    Ok(())
}
