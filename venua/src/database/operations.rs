//! Database CRUD operations for dates, bookings, and payments.

use chrono::{DateTime, NaiveDate, Utc};
use rusqlite::{params, OptionalExtension, TransactionBehavior};

use crate::booking::{Booking, BookingId, UserId};
use crate::calendar::{CalendarDate, DateId, DateState};
use crate::error::{Error, Result};
use crate::payment::{Payment, PaymentId};

use super::connection::Database;

/// Converts a UTC timestamp to Unix epoch seconds for storage.
pub(super) fn datetime_to_unix_secs(dt: DateTime<Utc>) -> i64 {
    dt.timestamp()
}

/// Converts Unix epoch seconds from the database to a UTC timestamp.
pub(super) fn unix_secs_to_datetime(secs: i64) -> rusqlite::Result<DateTime<Utc>> {
    DateTime::from_timestamp(secs, 0).ok_or_else(|| {
        rusqlite::Error::FromSqlConversionFailure(
            0,
            rusqlite::types::Type::Integer,
            format!("timestamp {secs} out of range").into(),
        )
    })
}

/// Formats a day for storage.
pub(super) fn day_to_string(day: NaiveDate) -> String {
    day.format("%Y-%m-%d").to_string()
}

fn string_to_day(s: &str) -> rusqlite::Result<NaiveDate> {
    NaiveDate::parse_from_str(s, "%Y-%m-%d").map_err(|e| {
        rusqlite::Error::FromSqlConversionFailure(0, rusqlite::types::Type::Text, Box::new(e))
    })
}

/// Deserializes a calendar date from a row.
///
/// Expects fields in this order: id, day, state, price.
fn row_to_date(row: &rusqlite::Row<'_>) -> rusqlite::Result<CalendarDate> {
    let id: DateId = row.get(0)?;
    let day_str: String = row.get(1)?;
    let state_str: String = row.get(2)?;
    let price: f64 = row.get(3)?;

    let day = string_to_day(&day_str)?;
    let state: DateState = state_str.parse().map_err(|e: String| {
        rusqlite::Error::FromSqlConversionFailure(2, rusqlite::types::Type::Text, e.into())
    })?;

    Ok(CalendarDate {
        id,
        day,
        state,
        price,
    })
}

/// Deserializes a booking from a row.
///
/// Expects fields in this order: id, date_id, user_id, state, rental_price,
/// created_at, expires_at, acceptance_ip, accepted_at, contract_version.
fn row_to_booking(row: &rusqlite::Row<'_>) -> rusqlite::Result<Booking> {
    let id: BookingId = row.get(0)?;
    let date_id: DateId = row.get(1)?;
    let user_id: UserId = row.get(2)?;
    let state_str: String = row.get(3)?;
    let rental_price: f64 = row.get(4)?;
    let created_secs: i64 = row.get(5)?;
    let expires_secs: Option<i64> = row.get(6)?;
    let acceptance_ip: Option<String> = row.get(7)?;
    let accepted_secs: Option<i64> = row.get(8)?;
    let contract_version: String = row.get(9)?;

    let state = state_str.parse().map_err(|e: String| {
        rusqlite::Error::FromSqlConversionFailure(3, rusqlite::types::Type::Text, e.into())
    })?;

    Ok(Booking {
        id,
        date_id,
        user_id,
        state,
        rental_price,
        created_at: unix_secs_to_datetime(created_secs)?,
        expires_at: expires_secs.map(unix_secs_to_datetime).transpose()?,
        acceptance_ip,
        accepted_at: accepted_secs.map(unix_secs_to_datetime).transpose()?,
        contract_version,
    })
}

/// Deserializes a payment from a row.
///
/// Expects fields in this order: id, booking_id, amount, paid_at.
fn row_to_payment(row: &rusqlite::Row<'_>) -> rusqlite::Result<Payment> {
    let id: PaymentId = row.get(0)?;
    let booking_id: BookingId = row.get(1)?;
    let amount: f64 = row.get(2)?;
    let paid_secs: i64 = row.get(3)?;

    Ok(Payment {
        id,
        booking_id,
        amount,
        paid_at: unix_secs_to_datetime(paid_secs)?,
    })
}

// SQL statements for CRUD operations
const SELECT_DATE_BY_ID: &str = r"
    SELECT id, day, state, price FROM calendar_date WHERE id = ?
";

const SELECT_DATE_BY_DAY: &str = r"
    SELECT id, day, state, price FROM calendar_date WHERE day = ?
";

const LIST_DATES: &str = r"
    SELECT id, day, state, price FROM calendar_date ORDER BY day
";

const INSERT_DATE: &str = r"
    INSERT INTO calendar_date (day, state, price) VALUES (?, 'available', 0.0)
";

const BOOKING_COLUMNS: &str = r"id, date_id, user_id, state, rental_price,
    created_at, expires_at, acceptance_ip, accepted_at, contract_version";

const SELECT_EXPIRED_PENDING: &str = r"
    SELECT id, date_id, user_id, state, rental_price,
           created_at, expires_at, acceptance_ip, accepted_at, contract_version
    FROM booking
    WHERE state = 'pending' AND expires_at IS NOT NULL AND expires_at < ?
    ORDER BY expires_at
";

impl Database {
    /// Retrieves a calendar date by id.
    ///
    /// # Errors
    ///
    /// Returns an error if the query fails.
    pub fn get_date(&self, id: DateId) -> Result<Option<CalendarDate>> {
        self.conn
            .query_row(SELECT_DATE_BY_ID, params![id], row_to_date)
            .optional()
            .map_err(Error::from)
    }

    /// Retrieves a calendar date by day.
    ///
    /// # Errors
    ///
    /// Returns an error if the query fails.
    pub fn find_date_by_day(&self, day: NaiveDate) -> Result<Option<CalendarDate>> {
        self.conn
            .query_row(SELECT_DATE_BY_DAY, params![day_to_string(day)], row_to_date)
            .optional()
            .map_err(Error::from)
    }

    /// Lists all calendar dates, ordered by day.
    ///
    /// # Errors
    ///
    /// Returns an error if the query fails.
    pub fn list_dates(&self) -> Result<Vec<CalendarDate>> {
        let mut stmt = self.conn.prepare(LIST_DATES)?;
        let rows = stmt.query_map([], row_to_date)?;
        rows.collect::<rusqlite::Result<Vec<_>>>().map_err(Error::from)
    }

    /// Returns the existing record for a day, or creates one in the default
    /// state (`available`, zero price).
    ///
    /// Idempotent under concurrent calls: losing a racing insert surfaces as
    /// a UNIQUE violation on `day`, which is treated as "already exists" and
    /// answered with a re-fetch of the winner's row.
    ///
    /// # Errors
    ///
    /// Returns an error if the insert or fetch fails.
    pub fn get_or_create_date(&mut self, day: NaiveDate) -> Result<CalendarDate> {
        if let Some(date) = self.find_date_by_day(day)? {
            return Ok(date);
        }

        match self.conn.execute(INSERT_DATE, params![day_to_string(day)]) {
            Ok(_) => {
                let id = self.conn.last_insert_rowid();
                Ok(CalendarDate::new(id, day))
            }
            Err(rusqlite::Error::SqliteFailure(e, _))
                if e.code == rusqlite::ErrorCode::ConstraintViolation =>
            {
                self.find_date_by_day(day)?.ok_or_else(|| Error::NotFound {
                    resource: format!("calendar date {day}"),
                })
            }
            Err(e) => Err(e.into()),
        }
    }

    /// Writes a date's availability state unconditionally.
    ///
    /// Legality of the transition is the reservation engine's job, decided
    /// under the per-date lock before this write.
    ///
    /// # Errors
    ///
    /// Returns `NotFound` if no row has the given id.
    pub fn set_date_state(&mut self, id: DateId, state: DateState) -> Result<()> {
        let changed = self.conn.execute(
            "UPDATE calendar_date SET state = ? WHERE id = ?",
            params![state.as_str(), id],
        )?;
        if changed == 0 {
            return Err(Error::NotFound {
                resource: format!("calendar date {id}"),
            });
        }
        Ok(())
    }

    /// Writes a date's estimated price.
    ///
    /// # Errors
    ///
    /// Returns `NotFound` if no row has the given id.
    pub fn set_date_price(&mut self, id: DateId, price: f64) -> Result<()> {
        let changed = self.conn.execute(
            "UPDATE calendar_date SET price = ? WHERE id = ?",
            params![price, id],
        )?;
        if changed == 0 {
            return Err(Error::NotFound {
                resource: format!("calendar date {id}"),
            });
        }
        Ok(())
    }

    /// Retrieves a booking by id.
    ///
    /// # Errors
    ///
    /// Returns an error if the query fails.
    pub fn get_booking(&self, id: BookingId) -> Result<Option<Booking>> {
        let sql = format!("SELECT {BOOKING_COLUMNS} FROM booking WHERE id = ?");
        self.conn
            .query_row(&sql, params![id], row_to_booking)
            .optional()
            .map_err(Error::from)
    }

    /// Lists all bookings, newest first.
    ///
    /// # Errors
    ///
    /// Returns an error if the query fails.
    pub fn list_bookings(&self) -> Result<Vec<Booking>> {
        let sql = format!("SELECT {BOOKING_COLUMNS} FROM booking ORDER BY created_at DESC, id DESC");
        let mut stmt = self.conn.prepare(&sql)?;
        let rows = stmt.query_map([], row_to_booking)?;
        rows.collect::<rusqlite::Result<Vec<_>>>().map_err(Error::from)
    }

    /// Lists the bookings owned by a user, newest first.
    ///
    /// # Errors
    ///
    /// Returns an error if the query fails.
    pub fn list_bookings_for_user(&self, user_id: UserId) -> Result<Vec<Booking>> {
        let sql = format!(
            "SELECT {BOOKING_COLUMNS} FROM booking WHERE user_id = ? ORDER BY created_at DESC, id DESC"
        );
        let mut stmt = self.conn.prepare(&sql)?;
        let rows = stmt.query_map(params![user_id], row_to_booking)?;
        rows.collect::<rusqlite::Result<Vec<_>>>().map_err(Error::from)
    }

    /// Lists pending bookings whose expiry deadline has passed.
    ///
    /// # Errors
    ///
    /// Returns an error if the query fails.
    pub fn list_expired_pending(&self, now: DateTime<Utc>) -> Result<Vec<Booking>> {
        let mut stmt = self.conn.prepare(SELECT_EXPIRED_PENDING)?;
        let rows = stmt.query_map(params![datetime_to_unix_secs(now)], row_to_booking)?;
        rows.collect::<rusqlite::Result<Vec<_>>>().map_err(Error::from)
    }

    /// Records a payment against a booking.
    ///
    /// Amount validation and the overpayment check happen in the payment
    /// ledger before this insert.
    ///
    /// # Errors
    ///
    /// Returns an error if the insert fails.
    pub fn insert_payment(&mut self, payment: &Payment) -> Result<Payment> {
        self.conn.execute(
            "INSERT INTO payment (booking_id, amount, paid_at) VALUES (?, ?, ?)",
            params![
                payment.booking_id,
                payment.amount,
                datetime_to_unix_secs(payment.paid_at)
            ],
        )?;
        let mut created = payment.clone();
        created.id = self.conn.last_insert_rowid();
        Ok(created)
    }

    /// Retrieves a payment by id.
    ///
    /// # Errors
    ///
    /// Returns an error if the query fails.
    pub fn get_payment(&self, id: PaymentId) -> Result<Option<Payment>> {
        self.conn
            .query_row(
                "SELECT id, booking_id, amount, paid_at FROM payment WHERE id = ?",
                params![id],
                row_to_payment,
            )
            .optional()
            .map_err(Error::from)
    }

    /// Lists the payments recorded for a booking, oldest first.
    ///
    /// # Errors
    ///
    /// Returns an error if the query fails.
    pub fn payments_for_booking(&self, booking_id: BookingId) -> Result<Vec<Payment>> {
        let mut stmt = self.conn.prepare(
            "SELECT id, booking_id, amount, paid_at FROM payment WHERE booking_id = ? ORDER BY paid_at, id",
        )?;
        let rows = stmt.query_map(params![booking_id], row_to_payment)?;
        rows.collect::<rusqlite::Result<Vec<_>>>().map_err(Error::from)
    }

    /// Deletes a payment row. Returns whether a row was removed.
    ///
    /// # Errors
    ///
    /// Returns an error if the delete fails.
    pub fn delete_payment(&mut self, id: PaymentId) -> Result<bool> {
        let changed = self
            .conn
            .execute("DELETE FROM payment WHERE id = ?", params![id])?;
        Ok(changed > 0)
    }

    /// Legacy hard delete of a booking row.
    ///
    /// The engine never calls this; archiving replaced deletion. The path
    /// remains for storage-level maintenance and refuses to destroy a
    /// payment trail.
    ///
    /// # Errors
    ///
    /// Returns `Conflict` if the booking has recorded payments.
    pub fn hard_delete_booking(&mut self, id: BookingId) -> Result<bool> {
        let tx = self
            .conn
            .transaction_with_behavior(TransactionBehavior::Immediate)?;

        let payment_count: i64 = tx.query_row(
            "SELECT COUNT(*) FROM payment WHERE booking_id = ?",
            params![id],
            |row| row.get(0),
        )?;
        if payment_count > 0 {
            return Err(Error::Conflict {
                details: format!(
                    "booking {id} has {payment_count} recorded payment(s); archive it instead"
                ),
            });
        }

        let changed = tx.execute("DELETE FROM booking WHERE id = ?", params![id])?;
        tx.commit()?;
        Ok(changed > 0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::database::test_util::create_test_database;
    use crate::BookingState;

    fn day(s: &str) -> NaiveDate {
        NaiveDate::parse_from_str(s, "%Y-%m-%d").unwrap()
    }

    #[test]
    fn test_get_or_create_date_creates_once() {
        let mut db = create_test_database();
        let d = day("2025-12-25");

        let first = db.get_or_create_date(d).unwrap();
        assert_eq!(first.day, d);
        assert_eq!(first.state, DateState::Available);
        assert_eq!(first.price, 0.0);

        let second = db.get_or_create_date(d).unwrap();
        assert_eq!(second.id, first.id);

        assert_eq!(db.list_dates().unwrap().len(), 1);
    }

    #[test]
    fn test_set_date_state() {
        let mut db = create_test_database();
        let date = db.get_or_create_date(day("2025-12-25")).unwrap();

        db.set_date_state(date.id, DateState::Reserved).unwrap();
        let reloaded = db.get_date(date.id).unwrap().unwrap();
        assert_eq!(reloaded.state, DateState::Reserved);
    }

    #[test]
    fn test_set_date_state_missing_row() {
        let mut db = create_test_database();
        let err = db.set_date_state(999, DateState::Pending).unwrap_err();
        assert!(err.is_not_found());
    }

    #[test]
    fn test_set_date_price() {
        let mut db = create_test_database();
        let date = db.get_or_create_date(day("2025-12-25")).unwrap();

        db.set_date_price(date.id, 1500.0).unwrap();
        let reloaded = db.get_date(date.id).unwrap().unwrap();
        assert_eq!(reloaded.price, 1500.0);
    }

    #[test]
    fn test_list_dates_ordered_by_day() {
        let mut db = create_test_database();
        db.get_or_create_date(day("2026-01-02")).unwrap();
        db.get_or_create_date(day("2025-12-25")).unwrap();

        let dates = db.list_dates().unwrap();
        assert_eq!(dates.len(), 2);
        assert_eq!(dates[0].day, day("2025-12-25"));
        assert_eq!(dates[1].day, day("2026-01-02"));
    }

    #[test]
    fn test_booking_roundtrip() {
        let mut db = create_test_database();
        let date = db.get_or_create_date(day("2025-12-25")).unwrap();

        let booking = crate::Booking::builder(7, date.id)
            .rental_price(1000.0)
            .acceptance_ip(Some("203.0.113.9".to_string()))
            .build()
            .unwrap();
        let created = db
            .create_booking_with_date(&booking, DateState::Pending)
            .unwrap();
        assert!(created.id > 0);

        let loaded = db.get_booking(created.id).unwrap().unwrap();
        assert_eq!(loaded.user_id, 7);
        assert_eq!(loaded.date_id, date.id);
        assert_eq!(loaded.state, BookingState::Pending);
        assert_eq!(loaded.rental_price, 1000.0);
        assert_eq!(loaded.acceptance_ip.as_deref(), Some("203.0.113.9"));
        assert_eq!(loaded.contract_version, "1.0");
    }

    #[test]
    fn test_list_bookings_for_user() {
        let mut db = create_test_database();
        let d1 = db.get_or_create_date(day("2025-12-25")).unwrap();
        let d2 = db.get_or_create_date(day("2025-12-26")).unwrap();

        let b1 = crate::Booking::builder(7, d1.id).build().unwrap();
        let b2 = crate::Booking::builder(8, d2.id).build().unwrap();
        db.create_booking_with_date(&b1, DateState::Pending).unwrap();
        db.create_booking_with_date(&b2, DateState::Pending).unwrap();

        let for_user = db.list_bookings_for_user(7).unwrap();
        assert_eq!(for_user.len(), 1);
        assert_eq!(for_user[0].user_id, 7);

        assert_eq!(db.list_bookings().unwrap().len(), 2);
    }

    #[test]
    fn test_payment_roundtrip_and_delete() {
        let mut db = create_test_database();
        let date = db.get_or_create_date(day("2025-12-25")).unwrap();
        let booking = crate::Booking::builder(7, date.id)
            .rental_price(1000.0)
            .build()
            .unwrap();
        let booking = db
            .create_booking_with_date(&booking, DateState::Pending)
            .unwrap();

        let payment = db
            .insert_payment(&Payment::new(booking.id, 400.0))
            .unwrap();
        assert!(payment.id > 0);

        let payments = db.payments_for_booking(booking.id).unwrap();
        assert_eq!(payments.len(), 1);
        assert_eq!(payments[0].amount, 400.0);

        assert!(db.delete_payment(payment.id).unwrap());
        assert!(!db.delete_payment(payment.id).unwrap());
        assert!(db.payments_for_booking(booking.id).unwrap().is_empty());
    }

    #[test]
    fn test_hard_delete_blocked_by_payments() {
        let mut db = create_test_database();
        let date = db.get_or_create_date(day("2025-12-25")).unwrap();
        let booking = crate::Booking::builder(7, date.id)
            .rental_price(1000.0)
            .build()
            .unwrap();
        let booking = db
            .create_booking_with_date(&booking, DateState::Pending)
            .unwrap();
        db.insert_payment(&Payment::new(booking.id, 100.0)).unwrap();

        let err = db.hard_delete_booking(booking.id).unwrap_err();
        assert!(matches!(err, Error::Conflict { .. }));

        // The booking row survived.
        assert!(db.get_booking(booking.id).unwrap().is_some());
    }

    #[test]
    fn test_hard_delete_without_payments() {
        let mut db = create_test_database();
        let date = db.get_or_create_date(day("2025-12-25")).unwrap();
        let booking = crate::Booking::builder(7, date.id).build().unwrap();
        let booking = db
            .create_booking_with_date(&booking, DateState::Pending)
            .unwrap();

        assert!(db.hard_delete_booking(booking.id).unwrap());
        assert!(db.get_booking(booking.id).unwrap().is_none());
        assert!(!db.hard_delete_booking(booking.id).unwrap());
    }

    #[test]
    fn test_list_expired_pending() {
        let mut db = create_test_database();
        let d1 = db.get_or_create_date(day("2025-12-25")).unwrap();
        let d2 = db.get_or_create_date(day("2025-12-26")).unwrap();
        let now = Utc::now();

        let overdue = crate::Booking::builder(7, d1.id)
            .expires_at(Some(now - chrono::Duration::hours(1)))
            .build()
            .unwrap();
        let fresh = crate::Booking::builder(7, d2.id)
            .expires_at(Some(now + chrono::Duration::hours(1)))
            .build()
            .unwrap();
        let overdue = db
            .create_booking_with_date(&overdue, DateState::Pending)
            .unwrap();
        db.create_booking_with_date(&fresh, DateState::Pending)
            .unwrap();

        let expired = db.list_expired_pending(now).unwrap();
        assert_eq!(expired.len(), 1);
        assert_eq!(expired[0].id, overdue.id);
    }
}
