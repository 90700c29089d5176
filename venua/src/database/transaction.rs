//! Transactional multi-row commits.
//!
//! A booking mutation and its date transition must land together or not at
//! all: the date must never be flipped without the booking row, or vice
//! versa. Both helpers here run under an IMMEDIATE transaction and roll back
//! fully on any failure.

use rusqlite::{params, TransactionBehavior};

use crate::booking::Booking;
use crate::calendar::{DateId, DateState};
use crate::error::{Error, Result};

use super::connection::Database;
use super::operations::datetime_to_unix_secs;

const INSERT_BOOKING: &str = r"
    INSERT INTO booking
    (date_id, user_id, state, rental_price, created_at, expires_at,
     acceptance_ip, accepted_at, contract_version)
    VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?)
";

const UPDATE_BOOKING: &str = r"
    UPDATE booking
    SET state = ?, rental_price = ?, expires_at = ?, contract_version = ?
    WHERE id = ?
";

const UPDATE_DATE_STATE: &str = "UPDATE calendar_date SET state = ? WHERE id = ?";

impl Database {
    /// Inserts a booking and transitions its date in one atomic unit.
    ///
    /// Returns the booking with its assigned row id. The availability check
    /// that decides whether this call is legal happens in the reservation
    /// engine, under the per-date lock.
    ///
    /// # Errors
    ///
    /// Returns an error if the transaction cannot be started, either write
    /// fails, or the commit fails. No partial state is visible afterward.
    pub fn create_booking_with_date(
        &mut self,
        booking: &Booking,
        date_state: DateState,
    ) -> Result<Booking> {
        let tx = self
            .conn
            .transaction_with_behavior(TransactionBehavior::Immediate)?;

        tx.execute(
            INSERT_BOOKING,
            params![
                booking.date_id,
                booking.user_id,
                booking.state.as_str(),
                booking.rental_price,
                datetime_to_unix_secs(booking.created_at),
                booking.expires_at.map(datetime_to_unix_secs),
                booking.acceptance_ip,
                booking.accepted_at.map(datetime_to_unix_secs),
                booking.contract_version,
            ],
        )?;
        let id = tx.last_insert_rowid();

        let changed = tx.execute(
            UPDATE_DATE_STATE,
            params![date_state.as_str(), booking.date_id],
        )?;
        if changed == 0 {
            // Rolls back the booking insert when the tx drops.
            return Err(Error::NotFound {
                resource: format!("calendar date {}", booking.date_id),
            });
        }

        tx.commit()?;

        let mut created = booking.clone();
        created.id = id;
        Ok(created)
    }

    /// Updates a booking row and optionally transitions a date in one
    /// atomic unit.
    ///
    /// Only the patchable columns are written; creation metadata (user,
    /// date, timestamps, acceptance fields) is immutable after insert.
    ///
    /// # Errors
    ///
    /// Returns `NotFound` if the booking or date row is missing; any failure
    /// rolls back both writes.
    pub fn update_booking_and_date(
        &mut self,
        booking: &Booking,
        date_transition: Option<(DateId, DateState)>,
    ) -> Result<()> {
        let tx = self
            .conn
            .transaction_with_behavior(TransactionBehavior::Immediate)?;

        let changed = tx.execute(
            UPDATE_BOOKING,
            params![
                booking.state.as_str(),
                booking.rental_price,
                booking.expires_at.map(datetime_to_unix_secs),
                booking.contract_version,
                booking.id,
            ],
        )?;
        if changed == 0 {
            return Err(Error::NotFound {
                resource: format!("booking {}", booking.id),
            });
        }

        if let Some((date_id, state)) = date_transition {
            let changed = tx.execute(UPDATE_DATE_STATE, params![state.as_str(), date_id])?;
            if changed == 0 {
                return Err(Error::NotFound {
                    resource: format!("calendar date {date_id}"),
                });
            }
        }

        tx.commit()?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::database::test_util::create_test_database;
    use crate::{Booking, BookingState};
    use chrono::NaiveDate;

    fn day(s: &str) -> NaiveDate {
        NaiveDate::parse_from_str(s, "%Y-%m-%d").unwrap()
    }

    #[test]
    fn test_create_commits_both_rows() {
        let mut db = create_test_database();
        let date = db.get_or_create_date(day("2025-12-25")).unwrap();

        let booking = Booking::builder(7, date.id)
            .state(BookingState::Confirmed)
            .rental_price(1000.0)
            .build()
            .unwrap();
        let created = db
            .create_booking_with_date(&booking, DateState::Reserved)
            .unwrap();

        assert!(created.id > 0);
        let reloaded_date = db.get_date(date.id).unwrap().unwrap();
        assert_eq!(reloaded_date.state, DateState::Reserved);
    }

    #[test]
    fn test_create_rolls_back_on_missing_date() {
        let mut db = create_test_database();

        let booking = Booking::builder(7, 999).build().unwrap();
        let result = db.create_booking_with_date(&booking, DateState::Pending);
        assert!(result.is_err());

        // The booking insert was rolled back with the failed date write.
        assert!(db.list_bookings().unwrap().is_empty());
    }

    #[test]
    fn test_update_without_date_transition() {
        let mut db = create_test_database();
        let date = db.get_or_create_date(day("2025-12-25")).unwrap();
        let booking = Booking::builder(7, date.id)
            .rental_price(500.0)
            .build()
            .unwrap();
        let mut booking = db
            .create_booking_with_date(&booking, DateState::Pending)
            .unwrap();

        booking.rental_price = 800.0;
        db.update_booking_and_date(&booking, None).unwrap();

        let reloaded = db.get_booking(booking.id).unwrap().unwrap();
        assert_eq!(reloaded.rental_price, 800.0);
        // The date was not touched.
        assert_eq!(
            db.get_date(date.id).unwrap().unwrap().state,
            DateState::Pending
        );
    }

    #[test]
    fn test_update_with_date_transition() {
        let mut db = create_test_database();
        let date = db.get_or_create_date(day("2025-12-25")).unwrap();
        let booking = Booking::builder(7, date.id).build().unwrap();
        let mut booking = db
            .create_booking_with_date(&booking, DateState::Pending)
            .unwrap();

        booking.state = BookingState::Confirmed;
        db.update_booking_and_date(&booking, Some((date.id, DateState::Reserved)))
            .unwrap();

        assert_eq!(
            db.get_booking(booking.id).unwrap().unwrap().state,
            BookingState::Confirmed
        );
        assert_eq!(
            db.get_date(date.id).unwrap().unwrap().state,
            DateState::Reserved
        );
    }

    #[test]
    fn test_update_missing_booking() {
        let mut db = create_test_database();
        let mut booking = Booking::builder(7, 1).build().unwrap();
        booking.id = 999;

        let err = db.update_booking_and_date(&booking, None).unwrap_err();
        assert!(err.is_not_found());
    }
}
