//! Payment ledger: append-only payments and derived balances.
//!
//! The ledger is the only writer of payment rows. The outstanding balance is
//! recomputed from the rows on every read; no balance is ever stored, so the
//! two cannot drift apart. Recording serializes on the per-booking lock so a
//! concurrent pair of payments cannot jointly overshoot the balance.

use std::sync::Arc;

use crate::booking::BookingId;
use crate::cache::EngineCache;
use crate::database::Database;
use crate::error::{Error, Result};
use crate::identity::MasterCredential;
use crate::lock::{LockManager, LockResource};
use crate::payment::{remaining_balance, validate_amount, Payment, PaymentId};

/// The payment ledger.
///
/// # Examples
///
/// ```no_run
/// use std::sync::Arc;
/// use venua::database::{Database, DatabaseConfig};
/// use venua::engine::PaymentLedger;
/// use venua::{EngineCache, LockManager};
///
/// let mut db = Database::open(DatabaseConfig::new("/tmp/venua.db")).unwrap();
/// let ledger = PaymentLedger::new(
///     Arc::new(LockManager::new()),
///     Arc::new(EngineCache::new()),
/// );
///
/// let payment = ledger.record(&mut db, 1, 400.0).unwrap();
/// let balance = ledger.remaining_balance(&db, 1).unwrap();
/// println!("paid {} -> {balance} outstanding", payment.amount);
/// ```
pub struct PaymentLedger {
    locks: Arc<LockManager>,
    cache: Arc<EngineCache>,
}

impl PaymentLedger {
    /// Creates the ledger with its injected dependencies.
    #[must_use]
    pub fn new(locks: Arc<LockManager>, cache: Arc<EngineCache>) -> Self {
        Self { locks, cache }
    }

    /// Records a payment against a booking.
    ///
    /// The amount must be positive and no larger than the current remaining
    /// balance. A rejected payment leaves the ledger untouched; rejecting it
    /// twice produces the same state, with no side effect either time.
    ///
    /// # Errors
    ///
    /// - [`Error::Validation`] for a non-positive amount or overpayment
    /// - [`Error::ResourceBusy`] on lock contention (retryable)
    /// - [`Error::NotFound`] if the booking does not exist
    pub fn record(&self, db: &mut Database, booking_id: BookingId, amount: f64) -> Result<Payment> {
        validate_amount(amount)?;

        let _lock = self.locks.acquire(LockResource::Booking(booking_id))?;

        let booking = db.get_booking(booking_id)?.ok_or_else(|| Error::NotFound {
            resource: format!("booking {booking_id}"),
        })?;
        let payments = db.payments_for_booking(booking_id)?;
        let balance = remaining_balance(booking.rental_price, &payments);
        if amount > balance {
            return Err(Error::Validation {
                field: "amount".into(),
                message: format!("payment of {amount} exceeds the remaining balance of {balance}"),
            });
        }

        let payment = db.insert_payment(&Payment::new(booking_id, amount))?;
        self.cache.invalidate_booking(booking_id);
        Ok(payment)
    }

    /// Removes a payment.
    ///
    /// Demands a [`MasterCredential`], which only the auth collaborator can
    /// issue after its out-of-band check. No monetary state is patched:
    /// removal alone is enough, because the balance is always recomputed.
    /// Returns whether a row was removed.
    ///
    /// # Errors
    ///
    /// Returns [`Error::ResourceBusy`] on lock contention, or a database
    /// error.
    pub fn remove(
        &self,
        db: &mut Database,
        payment_id: PaymentId,
        _credential: &MasterCredential,
    ) -> Result<bool> {
        let Some(payment) = db.get_payment(payment_id)? else {
            return Ok(false);
        };

        let _lock = self.locks.acquire(LockResource::Booking(payment.booking_id))?;

        let removed = db.delete_payment(payment_id)?;
        if removed {
            self.cache.invalidate_booking(payment.booking_id);
        }
        Ok(removed)
    }

    /// Lists the payments recorded for a booking, oldest first.
    ///
    /// # Errors
    ///
    /// Returns an error if the query fails.
    pub fn payments(&self, db: &Database, booking_id: BookingId) -> Result<Vec<Payment>> {
        db.payments_for_booking(booking_id)
    }

    /// Computes the outstanding balance for a booking, fresh from the
    /// ledger.
    ///
    /// # Errors
    ///
    /// Returns [`Error::NotFound`] if the booking does not exist.
    pub fn remaining_balance(&self, db: &Database, booking_id: BookingId) -> Result<f64> {
        let booking = db.get_booking(booking_id)?.ok_or_else(|| Error::NotFound {
            resource: format!("booking {booking_id}"),
        })?;
        let payments = db.payments_for_booking(booking_id)?;
        Ok(remaining_balance(booking.rental_price, &payments))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::database::test_util::create_test_database;
    use crate::calendar::DateState;
    use crate::Booking;
    use chrono::NaiveDate;

    fn ledger() -> PaymentLedger {
        PaymentLedger::new(Arc::new(LockManager::new()), Arc::new(EngineCache::new()))
    }

    fn booking_with_price(db: &mut Database, price: f64) -> Booking {
        let day: NaiveDate = "2025-12-25".parse().unwrap();
        let date = db.get_or_create_date(day).unwrap();
        let booking = Booking::builder(7, date.id)
            .rental_price(price)
            .build()
            .unwrap();
        db.create_booking_with_date(&booking, DateState::Pending)
            .unwrap()
    }

    #[test]
    fn test_record_and_balance() {
        let mut db = create_test_database();
        let ledger = ledger();
        let booking = booking_with_price(&mut db, 1000.0);

        ledger.record(&mut db, booking.id, 400.0).unwrap();
        ledger.record(&mut db, booking.id, 300.0).unwrap();

        assert_eq!(ledger.remaining_balance(&db, booking.id).unwrap(), 300.0);
        assert_eq!(ledger.payments(&db, booking.id).unwrap().len(), 2);
    }

    #[test]
    fn test_record_rejects_overpayment_without_side_effect() {
        let mut db = create_test_database();
        let ledger = ledger();
        let booking = booking_with_price(&mut db, 1000.0);

        ledger.record(&mut db, booking.id, 700.0).unwrap();

        // 500 > 300 remaining
        let err = ledger.record(&mut db, booking.id, 500.0).unwrap_err();
        assert!(matches!(err, Error::Validation { .. }));

        // Rejection is idempotent: same rejection, still no side effect.
        assert!(ledger.record(&mut db, booking.id, 500.0).is_err());
        assert_eq!(ledger.payments(&db, booking.id).unwrap().len(), 1);
        assert_eq!(ledger.remaining_balance(&db, booking.id).unwrap(), 300.0);
    }

    #[test]
    fn test_record_rejects_non_positive_amounts() {
        let mut db = create_test_database();
        let ledger = ledger();
        let booking = booking_with_price(&mut db, 1000.0);

        assert!(ledger.record(&mut db, booking.id, 0.0).is_err());
        assert!(ledger.record(&mut db, booking.id, -5.0).is_err());
        assert!(ledger.payments(&db, booking.id).unwrap().is_empty());
    }

    #[test]
    fn test_record_missing_booking() {
        let mut db = create_test_database();
        let ledger = ledger();
        let err = ledger.record(&mut db, 999, 100.0).unwrap_err();
        assert!(err.is_not_found());
    }

    #[test]
    fn test_exact_payoff_allowed() {
        let mut db = create_test_database();
        let ledger = ledger();
        let booking = booking_with_price(&mut db, 1000.0);

        ledger.record(&mut db, booking.id, 1000.0).unwrap();
        assert_eq!(ledger.remaining_balance(&db, booking.id).unwrap(), 0.0);

        // Fully paid: any further payment exceeds the zero balance.
        assert!(ledger.record(&mut db, booking.id, 0.01).is_err());
    }

    #[test]
    fn test_remove_restores_balance() {
        let mut db = create_test_database();
        let ledger = ledger();
        let booking = booking_with_price(&mut db, 1000.0);

        let p400 = ledger.record(&mut db, booking.id, 400.0).unwrap();
        ledger.record(&mut db, booking.id, 300.0).unwrap();
        assert_eq!(ledger.remaining_balance(&db, booking.id).unwrap(), 300.0);

        let credential = MasterCredential::issue();
        assert!(ledger.remove(&mut db, p400.id, &credential).unwrap());
        assert_eq!(ledger.remaining_balance(&db, booking.id).unwrap(), 600.0);

        // Removing again reports nothing removed.
        assert!(!ledger.remove(&mut db, p400.id, &credential).unwrap());
    }

    #[test]
    fn test_record_while_booking_locked_is_busy() {
        let mut db = create_test_database();
        let locks = Arc::new(LockManager::new());
        let ledger = PaymentLedger::new(Arc::clone(&locks), Arc::new(EngineCache::new()));
        let booking = booking_with_price(&mut db, 1000.0);

        let _held = locks.acquire(LockResource::Booking(booking.id)).unwrap();

        let err = ledger.record(&mut db, booking.id, 100.0).unwrap_err();
        assert!(matches!(err, Error::ResourceBusy { .. }));
    }
}
