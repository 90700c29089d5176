//! Payment types and balance computation.
//!
//! Payments form an append-only ledger per booking. The outstanding balance
//! is always derived from the ledger by [`remaining_balance`]; it is never
//! stored, so it cannot drift from the payments that define it.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::booking::BookingId;

/// Identifier for a payment row.
pub type PaymentId = i64;

/// A partial or full settlement against a booking's rental price.
///
/// # Examples
///
/// ```
/// use venua::Payment;
///
/// let payment = Payment::new(5, 400.0);
/// assert_eq!(payment.booking_id, 5);
/// assert_eq!(payment.amount, 400.0);
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Payment {
    /// Row identifier (0 until persisted).
    pub id: PaymentId,
    /// The booking this payment settles against.
    pub booking_id: BookingId,
    /// The paid amount.
    pub amount: f64,
    /// When the payment was recorded.
    pub paid_at: DateTime<Utc>,
}

impl Payment {
    /// Creates an unpersisted payment stamped with the current time.
    #[must_use]
    pub fn new(booking_id: BookingId, amount: f64) -> Self {
        Self {
            id: 0,
            booking_id,
            amount,
            paid_at: Utc::now(),
        }
    }
}

/// Computes the outstanding balance for a booking.
///
/// Pure function over the payment ledger: rental price minus the sum of all
/// recorded payments. Call it fresh on every read instead of caching the
/// result.
///
/// # Examples
///
/// ```
/// use venua::{remaining_balance, Payment};
///
/// let payments = vec![Payment::new(1, 400.0), Payment::new(1, 300.0)];
/// assert_eq!(remaining_balance(1000.0, &payments), 300.0);
/// assert_eq!(remaining_balance(1000.0, &[]), 1000.0);
/// ```
#[must_use]
pub fn remaining_balance(rental_price: f64, payments: &[Payment]) -> f64 {
    let paid: f64 = payments.iter().map(|p| p.amount).sum();
    rental_price - paid
}

/// Validates a payment amount in isolation.
///
/// Amounts must be finite and strictly positive. The overpayment check
/// against the current balance lives in the ledger, where the booking is
/// loaded under lock.
///
/// # Errors
///
/// Returns a `Validation` error otherwise.
pub fn validate_amount(amount: f64) -> crate::Result<()> {
    if !amount.is_finite() || amount <= 0.0 {
        return Err(crate::Error::Validation {
            field: "amount".into(),
            message: format!("payment amount must be greater than zero, got {amount}"),
        });
    }
    Ok(())
}
