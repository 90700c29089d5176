//! Utility functions for CLI operations.
//!
//! Common helpers used across commands: database opening, service
//! construction, and value formatting.

use std::path::PathBuf;
use std::sync::Arc;

use crate::error::CliError;
use chrono::{DateTime, NaiveDate, Utc};
use venua::engine::{AvailabilityStore, PaymentLedger, ReservationEngine};
use venua::{Database, DatabaseConfig, EngineCache, LockManager};

/// Global CLI options shared across all commands.
#[derive(Debug, Clone)]
#[allow(dead_code)] // Fields used via pattern matching in main.rs
pub struct GlobalOptions {
    /// Enable verbose output.
    pub verbose: bool,

    /// Suppress non-essential output.
    pub quiet: bool,

    /// Override the data directory location.
    pub data_dir: Option<PathBuf>,

    /// Override the default busy timeout (in seconds).
    pub busy_timeout: Option<u32>,

    /// Disable automatic database initialization.
    pub disable_autoinit: bool,
}

/// The engines wired for one CLI invocation.
///
/// A CLI process performs a single operation, so the lock manager and
/// caches live for the invocation; the database file is the shared state
/// between processes.
pub struct Services {
    pub config: venua::Config,
    pub engine: ReservationEngine,
    pub ledger: PaymentLedger,
    pub dates: AvailabilityStore,
}

impl Services {
    /// Constructs the engines over the merged configuration.
    pub fn new() -> Result<Self, CliError> {
        let config = venua::ConfigBuilder::new()
            .build()
            .map_err(|e| CliError::Config(e.to_string()))?;

        let locks = Arc::new(LockManager::with_ttl(config.effective_lock_ttl()));
        let cache = Arc::new(EngineCache::with_ttl(config.effective_cache_ttl()));
        Ok(Self {
            config,
            engine: ReservationEngine::new(Arc::clone(&locks), Arc::clone(&cache)),
            ledger: PaymentLedger::new(Arc::clone(&locks), Arc::clone(&cache)),
            dates: AvailabilityStore::new(locks, cache),
        })
    }
}

/// Resolve the database path from global options.
fn resolve_database_path(global: &GlobalOptions) -> Result<PathBuf, CliError> {
    if let Some(ref data_dir) = global.data_dir {
        return Ok(data_dir.join("venua.db"));
    }

    let home_dir = home::home_dir()
        .ok_or_else(|| CliError::Config("Could not determine home directory".to_string()))?;

    Ok(home_dir.join(".venua").join("venua.db"))
}

/// Open the database, honoring the global options.
///
/// # Errors
///
/// Returns `NoDataDirectory` if the database doesn't exist and auto-init is
/// disabled.
pub fn open_database(global: &GlobalOptions) -> Result<Database, CliError> {
    let db_path = resolve_database_path(global)?;

    if !db_path.exists() && global.disable_autoinit {
        return Err(CliError::NoDataDirectory);
    }

    let mut db_config = DatabaseConfig::new(db_path);

    if let Some(timeout_seconds) = global.busy_timeout {
        db_config =
            db_config.with_busy_timeout(std::time::Duration::from_secs(timeout_seconds.into()));
    }

    Database::open(db_config).map_err(CliError::from)
}

/// Parses a `YYYY-MM-DD` day argument.
pub fn parse_day_arg(s: &str) -> Result<NaiveDate, CliError> {
    venua::calendar::parse_day(s)
        .map_err(|_| CliError::InvalidArguments(format!("invalid day '{s}', expected YYYY-MM-DD")))
}

/// Formats a timestamp for display.
pub fn format_timestamp(ts: DateTime<Utc>) -> String {
    ts.format("%Y-%m-%d %H:%M:%S UTC").to_string()
}

/// Formats an optional timestamp for display.
pub fn format_optional_timestamp(ts: Option<DateTime<Utc>>) -> String {
    ts.map_or_else(|| "-".to_string(), format_timestamp)
}
