#![deny(missing_docs, unsafe_code)]
#![warn(clippy::all, clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]

//! # venua
//!
//! A booking engine for a single event venue.
//!
//! The library manages calendar date availability, the reservation
//! lifecycle, and partial payments with derived balance tracking. Its core
//! guarantee: a date can never be double-booked, even under concurrent
//! requests, because every conflict decision is made while holding a
//! per-date lock and committed atomically with the booking row.
//!
//! ## Core Types
//!
//! - [`CalendarDate`] and [`DateState`]: bookable days and their
//!   availability
//! - [`Booking`], [`BookingState`], and [`BookingPatch`]: reservations and
//!   their one-directional state machine
//! - [`Payment`] and [`remaining_balance`]: the append-only ledger and the
//!   derived balance
//! - [`LockManager`]: TTL-based mutual exclusion
//! - [`EngineCache`]: best-effort read-through caching
//! - [`Error`] and [`Result`]: error handling types
//!
//! ## Examples
//!
//! ```
//! use venua::{BookingState, DateState};
//!
//! // The state machines at the heart of the engine
//! assert!(DateState::Available.is_bookable());
//! assert!(BookingState::Pending.can_transition(BookingState::Confirmed));
//! assert!(!BookingState::Archived.can_transition(BookingState::Pending));
//! ```

pub mod booking;
pub mod cache;
pub mod calendar;
pub mod config;
pub mod database;
pub mod engine;
pub mod error;
pub mod identity;
pub mod lock;
pub mod logging;
pub mod notify;
pub mod payment;

// Re-export key types at crate root for convenience
pub use booking::{Booking, BookingId, BookingPatch, BookingState, UserId};
pub use cache::{EngineCache, TtlCache};
pub use calendar::{CalendarDate, DateId, DateState};
pub use config::{Config, ConfigBuilder};
pub use database::{Database, DatabaseConfig};
pub use engine::{
    AvailabilityStore, CreateBookingOptions, ExpireResult, PaymentLedger, ReservationEngine,
    SweepOperations,
};
pub use error::{Error, Result};
pub use identity::{Actor, Contact, ContactDirectory, MasterCredential, Role};
pub use lock::{LockGuard, LockManager, LockResource};
pub use logging::{init_logger, LogLevel, Logger};
pub use notify::{ConfirmationNotice, LogNotifier, NoopNotifier, Notifier};
pub use payment::{remaining_balance, Payment, PaymentId};
