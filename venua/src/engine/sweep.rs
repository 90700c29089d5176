//! Expiry sweep for overdue pending bookings.
//!
//! A pending booking may carry a deadline; once it passes, the sweep cancels
//! the booking through the normal engine path, releasing its date. Each
//! cancellation is atomic on its own, but the batch as a whole is not
//! transactional: an error partway through leaves earlier cancellations
//! committed.

use chrono::{DateTime, Utc};

use crate::booking::Booking;
use crate::database::Database;
use crate::error::Result;

use super::booking::ReservationEngine;

/// Result of an expiry sweep.
#[derive(Debug, Clone, PartialEq)]
pub struct ExpireResult {
    /// Number of bookings cancelled (or that would be, in dry-run mode).
    pub expired_count: usize,
    /// The bookings that were (or would be) cancelled.
    pub expired_bookings: Vec<Booking>,
}

/// Sweep operations over the booking table.
pub struct SweepOperations;

impl SweepOperations {
    /// Cancels pending bookings whose expiry deadline has passed.
    ///
    /// In dry-run mode the overdue bookings are reported without being
    /// touched. A booking whose lock is contended is skipped with a warning
    /// and picked up by the next sweep.
    ///
    /// # Errors
    ///
    /// Returns an error if the scan fails or a cancellation fails for a
    /// non-retryable reason.
    ///
    /// # Examples
    ///
    /// ```no_run
    /// use std::sync::Arc;
    /// use chrono::Utc;
    /// use venua::database::{Database, DatabaseConfig};
    /// use venua::engine::{ReservationEngine, SweepOperations};
    /// use venua::{EngineCache, LockManager};
    ///
    /// let mut db = Database::open(DatabaseConfig::new("/tmp/venua.db")).unwrap();
    /// let engine = ReservationEngine::new(
    ///     Arc::new(LockManager::new()),
    ///     Arc::new(EngineCache::new()),
    /// );
    ///
    /// let preview = SweepOperations::expire_overdue(&mut db, &engine, Utc::now(), true).unwrap();
    /// println!("would cancel {} bookings", preview.expired_count);
    /// ```
    pub fn expire_overdue(
        db: &mut Database,
        engine: &ReservationEngine,
        now: DateTime<Utc>,
        dry_run: bool,
    ) -> Result<ExpireResult> {
        let overdue = db.list_expired_pending(now)?;

        if dry_run {
            return Ok(ExpireResult {
                expired_count: overdue.len(),
                expired_bookings: overdue,
            });
        }

        let mut expired = Vec::new();
        for booking in overdue {
            match engine.cancel(db, booking.id) {
                Ok(cancelled) => expired.push(cancelled),
                Err(e) if e.is_retryable() => {
                    log::warn!("sweep skipping booking {}: {e}", booking.id);
                }
                Err(e) => return Err(e),
            }
        }

        Ok(ExpireResult {
            expired_count: expired.len(),
            expired_bookings: expired,
        })
    }
}
