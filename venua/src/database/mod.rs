//! Database layer for persistent storage of dates, bookings, and payments.
//!
//! This module provides the SQLite-based storage layer: connection
//! management, schema versioning, CRUD operations, and the transactional
//! multi-row commits that keep a booking and its calendar date consistent.
//!
//! # Examples
//!
//! ```no_run
//! use venua::database::{Database, DatabaseConfig};
//! use venua::calendar::parse_day;
//!
//! let config = DatabaseConfig::new("/tmp/venua.db");
//! let mut db = Database::open(config).unwrap();
//!
//! let day = parse_day("2025-12-25").unwrap();
//! let date = db.get_or_create_date(day).unwrap();
//! println!("{date:?}");
//! ```

mod config;
mod connection;
pub mod migrations;
mod operations;
mod schema;
mod transaction;

#[cfg(test)]
pub mod test_util;

// Re-export public API
pub use config::{default_data_dir, resolve_database_path, DatabaseConfig};
pub use connection::Database;

// Re-export migration functions for advanced use cases
pub use migrations::{check_schema_compatibility, get_schema_version, initialize_schema};
