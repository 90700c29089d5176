//! Booking types for tracking venue reservations.
//!
//! A [`Booking`] ties one user to one calendar date for the lifetime of the
//! reservation. Bookings move through a one-directional state machine and are
//! never hard-deleted through the engine: archiving is the terminal,
//! history-preserving state.

use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::calendar::DateId;

/// Identifier for a booking row.
pub type BookingId = i64;

/// Identifier for a user, supplied by the external auth layer.
pub type UserId = i64;

/// Lifecycle state of a booking.
///
/// Transitions are one-directional:
/// `pending -> confirmed -> archived`, `pending -> cancelled`,
/// `confirmed -> cancelled`, and archive is reachable from every
/// non-archived state. There is no un-archiving.
///
/// # Examples
///
/// ```
/// use venua::BookingState;
///
/// assert!(BookingState::Pending.can_transition(BookingState::Confirmed));
/// assert!(BookingState::Confirmed.can_transition(BookingState::Cancelled));
/// assert!(!BookingState::Cancelled.can_transition(BookingState::Confirmed));
/// assert!(!BookingState::Archived.can_transition(BookingState::Pending));
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum BookingState {
    /// Requested but not yet approved.
    Pending,
    /// Approved; the date is held.
    Confirmed,
    /// Withdrawn; the date has been released.
    Cancelled,
    /// Terminal state preserving history; the date has been released.
    Archived,
}

impl BookingState {
    /// Returns the canonical string form used for storage.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Pending => "pending",
            Self::Confirmed => "confirmed",
            Self::Cancelled => "cancelled",
            Self::Archived => "archived",
        }
    }

    /// Whether a booking in this state holds its date.
    #[must_use]
    pub const fn is_active(self) -> bool {
        matches!(self, Self::Pending | Self::Confirmed)
    }

    /// Whether the state machine permits moving from `self` to `next`.
    #[must_use]
    pub const fn can_transition(self, next: Self) -> bool {
        match self {
            Self::Pending => matches!(next, Self::Confirmed | Self::Cancelled | Self::Archived),
            Self::Confirmed => matches!(next, Self::Cancelled | Self::Archived),
            Self::Cancelled => matches!(next, Self::Archived),
            Self::Archived => false,
        }
    }
}

impl fmt::Display for BookingState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for BookingState {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "pending" => Ok(Self::Pending),
            "confirmed" => Ok(Self::Confirmed),
            "cancelled" => Ok(Self::Cancelled),
            "archived" => Ok(Self::Archived),
            other => Err(format!("unknown booking state: {other}")),
        }
    }
}

/// A venue reservation with its contract metadata.
///
/// # Examples
///
/// ```
/// use venua::{Booking, BookingState};
///
/// let booking = Booking::builder(7, 1)
///     .rental_price(1000.0)
///     .acceptance_ip(Some("203.0.113.9".to_string()))
///     .build()
///     .unwrap();
///
/// assert_eq!(booking.state, BookingState::Pending);
/// assert_eq!(booking.rental_price, 1000.0);
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Booking {
    /// Row identifier (0 until persisted).
    pub id: BookingId,
    /// The owning user.
    pub user_id: UserId,
    /// The owning calendar date.
    pub date_id: DateId,
    /// Current lifecycle state.
    pub state: BookingState,
    /// Agreed rental price; the baseline for balance computation.
    pub rental_price: f64,
    /// Creation timestamp.
    pub created_at: DateTime<Utc>,
    /// Optional deadline after which a pending booking lapses.
    pub expires_at: Option<DateTime<Utc>>,
    /// IP address the contract was accepted from.
    pub acceptance_ip: Option<String>,
    /// When the contract was accepted.
    pub accepted_at: Option<DateTime<Utc>>,
    /// Version of the contract the user accepted.
    pub contract_version: String,
}

impl Booking {
    /// Creates a new booking builder for the given user and date.
    ///
    /// # Examples
    ///
    /// ```
    /// use venua::Booking;
    ///
    /// let booking = Booking::builder(7, 1).build().unwrap();
    /// assert_eq!(booking.user_id, 7);
    /// assert_eq!(booking.date_id, 1);
    /// ```
    #[must_use]
    pub fn builder(user_id: UserId, date_id: DateId) -> BookingBuilder {
        BookingBuilder {
            user_id,
            date_id,
            state: BookingState::Pending,
            rental_price: 0.0,
            created_at: None,
            expires_at: None,
            acceptance_ip: None,
            accepted_at: None,
            contract_version: None,
        }
    }
}

/// Builder for creating [`Booking`] instances.
#[derive(Debug)]
pub struct BookingBuilder {
    user_id: UserId,
    date_id: DateId,
    state: BookingState,
    rental_price: f64,
    created_at: Option<DateTime<Utc>>,
    expires_at: Option<DateTime<Utc>>,
    acceptance_ip: Option<String>,
    accepted_at: Option<DateTime<Utc>>,
    contract_version: Option<String>,
}

impl BookingBuilder {
    /// Sets the initial state (`pending` by default).
    #[must_use]
    pub const fn state(mut self, state: BookingState) -> Self {
        self.state = state;
        self
    }

    /// Sets the rental price.
    #[must_use]
    pub const fn rental_price(mut self, price: f64) -> Self {
        self.rental_price = price;
        self
    }

    /// Sets the creation timestamp (defaults to now).
    #[must_use]
    pub fn created_at(mut self, at: DateTime<Utc>) -> Self {
        self.created_at = Some(at);
        self
    }

    /// Sets the optional expiry deadline.
    #[must_use]
    pub fn expires_at(mut self, at: Option<DateTime<Utc>>) -> Self {
        self.expires_at = at;
        self
    }

    /// Sets the IP address the contract was accepted from.
    ///
    /// The value is trimmed of surrounding whitespace.
    #[must_use]
    pub fn acceptance_ip(mut self, ip: Option<String>) -> Self {
        self.acceptance_ip = ip.map(|s| s.trim().to_string());
        self
    }

    /// Sets the contract acceptance timestamp.
    #[must_use]
    pub fn accepted_at(mut self, at: Option<DateTime<Utc>>) -> Self {
        self.accepted_at = at;
        self
    }

    /// Sets the contract version (defaults to "1.0").
    #[must_use]
    pub fn contract_version(mut self, version: impl Into<String>) -> Self {
        self.contract_version = Some(version.into());
        self
    }

    /// Builds the booking.
    ///
    /// # Errors
    ///
    /// Returns an error if:
    /// - The rental price is negative or not finite
    /// - The initial state is `cancelled` or `archived`
    /// - The contract version is empty after trimming
    /// - The acceptance IP is empty after trimming
    pub fn build(self) -> Result<Booking, ValidationError> {
        if !self.rental_price.is_finite() || self.rental_price < 0.0 {
            return Err(ValidationError {
                field: "rental_price".into(),
                message: "rental price must be a non-negative number".into(),
            });
        }

        if !matches!(self.state, BookingState::Pending | BookingState::Confirmed) {
            return Err(ValidationError {
                field: "state".into(),
                message: format!("a booking cannot be created as {}", self.state),
            });
        }

        let contract_version = match self.contract_version {
            Some(v) => {
                let trimmed = v.trim();
                if trimmed.is_empty() {
                    return Err(ValidationError {
                        field: "contract_version".into(),
                        message: "contract version must be non-empty".into(),
                    });
                }
                trimmed.to_string()
            }
            None => "1.0".to_string(),
        };

        if let Some(ref ip) = self.acceptance_ip {
            if ip.is_empty() {
                return Err(ValidationError {
                    field: "acceptance_ip".into(),
                    message: "acceptance IP must be non-empty when provided".into(),
                });
            }
        }

        Ok(Booking {
            id: 0,
            user_id: self.user_id,
            date_id: self.date_id,
            state: self.state,
            rental_price: self.rental_price,
            created_at: self.created_at.unwrap_or_else(Utc::now),
            expires_at: self.expires_at,
            acceptance_ip: self.acceptance_ip,
            accepted_at: self.accepted_at,
            contract_version,
        })
    }
}

/// A typed field patch for updating a booking.
///
/// Every field is optional; `None` leaves the stored value unchanged. Unknown
/// fields cannot be expressed, and each present field is validated before any
/// write happens.
///
/// # Examples
///
/// ```
/// use venua::{BookingPatch, BookingState};
///
/// let patch = BookingPatch::new().state(BookingState::Confirmed);
/// assert!(!patch.is_empty());
/// ```
#[derive(Debug, Clone, Default, PartialEq)]
pub struct BookingPatch {
    /// New lifecycle state.
    pub state: Option<BookingState>,
    /// New expiry deadline.
    pub expires_at: Option<DateTime<Utc>>,
    /// New rental price.
    pub rental_price: Option<f64>,
    /// New contract version.
    pub contract_version: Option<String>,
}

impl BookingPatch {
    /// Creates an empty patch.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the target state.
    #[must_use]
    pub const fn state(mut self, state: BookingState) -> Self {
        self.state = Some(state);
        self
    }

    /// Sets the expiry deadline.
    #[must_use]
    pub fn expires_at(mut self, at: DateTime<Utc>) -> Self {
        self.expires_at = Some(at);
        self
    }

    /// Sets the rental price.
    #[must_use]
    pub const fn rental_price(mut self, price: f64) -> Self {
        self.rental_price = Some(price);
        self
    }

    /// Sets the contract version.
    #[must_use]
    pub fn contract_version(mut self, version: impl Into<String>) -> Self {
        self.contract_version = Some(version.into());
        self
    }

    /// Whether the patch carries no changes.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.state.is_none()
            && self.expires_at.is_none()
            && self.rental_price.is_none()
            && self.contract_version.is_none()
    }

    /// Applies the patch to a booking, validating each present field.
    ///
    /// # Errors
    ///
    /// Returns an error if:
    /// - The state transition is not permitted by the state machine
    /// - The rental price is negative or not finite
    /// - The contract version is empty after trimming
    pub fn apply(&self, booking: &mut Booking) -> Result<(), ValidationError> {
        if let Some(next) = self.state {
            if next != booking.state && !booking.state.can_transition(next) {
                return Err(ValidationError {
                    field: "state".into(),
                    message: format!("cannot transition from {} to {next}", booking.state),
                });
            }
        }

        if let Some(price) = self.rental_price {
            if !price.is_finite() || price < 0.0 {
                return Err(ValidationError {
                    field: "rental_price".into(),
                    message: "rental price must be a non-negative number".into(),
                });
            }
        }

        if let Some(ref version) = self.contract_version {
            if version.trim().is_empty() {
                return Err(ValidationError {
                    field: "contract_version".into(),
                    message: "contract version must be non-empty".into(),
                });
            }
        }

        // All fields validated; now mutate.
        if let Some(next) = self.state {
            booking.state = next;
        }
        if let Some(at) = self.expires_at {
            booking.expires_at = Some(at);
        }
        if let Some(price) = self.rental_price {
            booking.rental_price = price;
        }
        if let Some(ref version) = self.contract_version {
            booking.contract_version = version.trim().to_string();
        }

        Ok(())
    }
}

/// Error type for validation failures.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValidationError {
    /// The field that failed validation.
    pub field: String,
    /// A description of the validation failure.
    pub message: String,
}

impl fmt::Display for ValidationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "validation error for '{}': {}", self.field, self.message)
    }
}

impl std::error::Error for ValidationError {}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_state_machine_forward_only() {
        use BookingState::{Archived, Cancelled, Confirmed, Pending};

        assert!(Pending.can_transition(Confirmed));
        assert!(Pending.can_transition(Cancelled));
        assert!(Pending.can_transition(Archived));
        assert!(Confirmed.can_transition(Cancelled));
        assert!(Confirmed.can_transition(Archived));
        assert!(Cancelled.can_transition(Archived));

        assert!(!Confirmed.can_transition(Pending));
        assert!(!Cancelled.can_transition(Confirmed));
        assert!(!Cancelled.can_transition(Pending));
        assert!(!Archived.can_transition(Pending));
        assert!(!Archived.can_transition(Confirmed));
        assert!(!Archived.can_transition(Cancelled));
    }

    #[test]
    fn test_state_roundtrip() {
        for state in [
            BookingState::Pending,
            BookingState::Confirmed,
            BookingState::Cancelled,
            BookingState::Archived,
        ] {
            assert_eq!(state.as_str().parse::<BookingState>().unwrap(), state);
        }
        assert!("approved".parse::<BookingState>().is_err());
    }

    #[test]
    fn test_is_active() {
        assert!(BookingState::Pending.is_active());
        assert!(BookingState::Confirmed.is_active());
        assert!(!BookingState::Cancelled.is_active());
        assert!(!BookingState::Archived.is_active());
    }

    #[test]
    fn test_builder_defaults() {
        let booking = Booking::builder(7, 1).build().unwrap();
        assert_eq!(booking.id, 0);
        assert_eq!(booking.user_id, 7);
        assert_eq!(booking.date_id, 1);
        assert_eq!(booking.state, BookingState::Pending);
        assert_eq!(booking.rental_price, 0.0);
        assert_eq!(booking.contract_version, "1.0");
        assert!(booking.expires_at.is_none());
        assert!(booking.acceptance_ip.is_none());
    }

    #[test]
    fn test_builder_rejects_negative_price() {
        let result = Booking::builder(7, 1).rental_price(-50.0).build();
        assert!(result.is_err());
        assert_eq!(result.unwrap_err().field, "rental_price");
    }

    #[test]
    fn test_builder_rejects_terminal_initial_state() {
        let result = Booking::builder(7, 1).state(BookingState::Archived).build();
        assert!(result.is_err());
        assert_eq!(result.unwrap_err().field, "state");

        let result = Booking::builder(7, 1).state(BookingState::Cancelled).build();
        assert!(result.is_err());
    }

    #[test]
    fn test_builder_trims_fields() {
        let booking = Booking::builder(7, 1)
            .acceptance_ip(Some("  203.0.113.9  ".to_string()))
            .contract_version("  2.1  ")
            .build()
            .unwrap();
        assert_eq!(booking.acceptance_ip.as_deref(), Some("203.0.113.9"));
        assert_eq!(booking.contract_version, "2.1");
    }

    #[test]
    fn test_builder_rejects_empty_contract_version() {
        let result = Booking::builder(7, 1).contract_version("   ").build();
        assert!(result.is_err());
        assert_eq!(result.unwrap_err().field, "contract_version");
    }

    #[test]
    fn test_patch_apply_state_transition() {
        let mut booking = Booking::builder(7, 1).build().unwrap();
        let patch = BookingPatch::new().state(BookingState::Confirmed);
        patch.apply(&mut booking).unwrap();
        assert_eq!(booking.state, BookingState::Confirmed);
    }

    #[test]
    fn test_patch_rejects_illegal_transition() {
        let mut booking = Booking::builder(7, 1).build().unwrap();
        booking.state = BookingState::Archived;

        let patch = BookingPatch::new().state(BookingState::Pending);
        let err = patch.apply(&mut booking).unwrap_err();
        assert_eq!(err.field, "state");
        // Nothing was mutated.
        assert_eq!(booking.state, BookingState::Archived);
    }

    #[test]
    fn test_patch_same_state_is_noop_transition() {
        let mut booking = Booking::builder(7, 1).build().unwrap();
        let patch = BookingPatch::new().state(BookingState::Pending);
        patch.apply(&mut booking).unwrap();
        assert_eq!(booking.state, BookingState::Pending);
    }

    #[test]
    fn test_patch_validates_before_mutating() {
        let mut booking = Booking::builder(7, 1).rental_price(100.0).build().unwrap();
        let patch = BookingPatch::new()
            .state(BookingState::Confirmed)
            .rental_price(-1.0);

        assert!(patch.apply(&mut booking).is_err());
        // The valid state field must not have been applied either.
        assert_eq!(booking.state, BookingState::Pending);
        assert_eq!(booking.rental_price, 100.0);
    }

    #[test]
    fn test_patch_is_empty() {
        assert!(BookingPatch::new().is_empty());
        assert!(!BookingPatch::new().rental_price(10.0).is_empty());
    }

    #[test]
    fn test_booking_serde() {
        let booking = Booking::builder(7, 1)
            .rental_price(1000.0)
            .state(BookingState::Confirmed)
            .build()
            .unwrap();
        let json = serde_json::to_string(&booking).unwrap();
        let back: Booking = serde_json::from_str(&json).unwrap();
        assert_eq!(back, booking);
    }
}
