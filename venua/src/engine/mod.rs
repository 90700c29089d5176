//! Engines coordinating dates, bookings, and payments.
//!
//! Each engine is constructed once at startup with its dependencies (lock
//! manager, caches, notifier) passed in explicitly, and operates on a
//! [`Database`](crate::database::Database) handed to every call. The
//! engines own all conflict decisions: state is checked and transitioned
//! while holding the relevant lock, and the paired rows are committed in one
//! transaction.
//!
//! # Examples
//!
//! ```no_run
//! use std::sync::Arc;
//! use venua::database::{Database, DatabaseConfig};
//! use venua::engine::{CreateBookingOptions, ReservationEngine};
//! use venua::{EngineCache, LockManager};
//!
//! let mut db = Database::open(DatabaseConfig::new("/tmp/venua.db")).unwrap();
//! let locks = Arc::new(LockManager::new());
//! let cache = Arc::new(EngineCache::new());
//! let engine = ReservationEngine::new(Arc::clone(&locks), Arc::clone(&cache));
//!
//! let date = db.get_or_create_date("2025-12-25".parse().unwrap()).unwrap();
//! let booking = engine
//!     .create(&mut db, CreateBookingOptions::new(7, date.id))
//!     .unwrap();
//! println!("booked: {booking:?}");
//! ```

pub mod availability;
pub mod booking;
pub mod ledger;
pub mod sweep;

pub use availability::AvailabilityStore;
pub use booking::{CreateBookingOptions, ReservationEngine};
pub use ledger::PaymentLedger;
pub use sweep::{ExpireResult, SweepOperations};
