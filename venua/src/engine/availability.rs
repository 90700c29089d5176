//! Calendar date availability store.
//!
//! CRUD and state transitions for calendar dates, with read-through caching.
//! The store does not judge transition legality: the reservation engine
//! decides that under the per-date lock and then asks for the write.

use std::sync::Arc;

use chrono::NaiveDate;

use crate::cache::EngineCache;
use crate::calendar::{validate_price, CalendarDate, DateId, DateState};
use crate::database::Database;
use crate::error::{Error, Result};
use crate::lock::{LockManager, LockResource};

/// Availability store for calendar dates.
///
/// # Examples
///
/// ```no_run
/// use std::sync::Arc;
/// use venua::database::{Database, DatabaseConfig};
/// use venua::engine::AvailabilityStore;
/// use venua::{EngineCache, LockManager};
///
/// let mut db = Database::open(DatabaseConfig::new("/tmp/venua.db")).unwrap();
/// let store = AvailabilityStore::new(
///     Arc::new(LockManager::new()),
///     Arc::new(EngineCache::new()),
/// );
///
/// let date = store.get_or_create(&mut db, "2025-12-25".parse().unwrap()).unwrap();
/// let priced = store.update_price(&mut db, date.id, 1500.0).unwrap();
/// assert_eq!(priced.price, 1500.0);
/// ```
pub struct AvailabilityStore {
    locks: Arc<LockManager>,
    cache: Arc<EngineCache>,
}

impl AvailabilityStore {
    /// Creates the store with its injected dependencies.
    #[must_use]
    pub fn new(locks: Arc<LockManager>, cache: Arc<EngineCache>) -> Self {
        Self { locks, cache }
    }

    /// Returns the record for a day, creating it lazily in the default
    /// state (`available`, zero price).
    ///
    /// Idempotent under concurrent calls; the storage-level UNIQUE
    /// constraint on the day decides races.
    ///
    /// # Errors
    ///
    /// Returns an error if the underlying insert or fetch fails.
    pub fn get_or_create(&self, db: &mut Database, day: NaiveDate) -> Result<CalendarDate> {
        let existed = db.find_date_by_day(day)?;
        let created = existed.is_none();
        let date = match existed {
            Some(date) => date,
            None => db.get_or_create_date(day)?,
        };
        if created {
            self.cache.invalidate_date(date.id);
        }
        self.cache.dates.insert(date.id, date.clone());
        Ok(date)
    }

    /// Looks up a date by id, read-through cached.
    ///
    /// # Errors
    ///
    /// Returns an error if the query fails.
    pub fn find(&self, db: &Database, id: DateId) -> Result<Option<CalendarDate>> {
        if let Some(date) = self.cache.dates.get(&id) {
            return Ok(Some(date));
        }
        let date = db.get_date(id)?;
        if let Some(ref date) = date {
            self.cache.dates.insert(id, date.clone());
        }
        Ok(date)
    }

    /// Lists every calendar date, read-through cached.
    ///
    /// # Errors
    ///
    /// Returns an error if the query fails.
    pub fn list(&self, db: &Database) -> Result<Vec<CalendarDate>> {
        if let Some(dates) = self.cache.date_list.get(&()) {
            return Ok(dates);
        }
        let dates = db.list_dates()?;
        if !dates.is_empty() {
            self.cache.date_list.insert((), dates.clone());
        }
        Ok(dates)
    }

    /// Sets the estimated price for a date.
    ///
    /// # Errors
    ///
    /// Returns a validation error for negative or non-finite prices,
    /// `ResourceBusy` on lock contention, `NotFound` for a missing row.
    pub fn update_price(&self, db: &mut Database, id: DateId, price: f64) -> Result<CalendarDate> {
        validate_price(price)?;

        let _lock = self.locks.acquire(LockResource::Date(id))?;

        db.set_date_price(id, price)?;
        self.cache.invalidate_date(id);

        db.get_date(id)?.ok_or_else(|| Error::NotFound {
            resource: format!("calendar date {id}"),
        })
    }

    /// Writes a date's state unconditionally and invalidates its caches.
    ///
    /// The caller is expected to hold the per-date lock and to have checked
    /// that the transition is legal.
    ///
    /// # Errors
    ///
    /// Returns `NotFound` for a missing row.
    pub fn transition(&self, db: &mut Database, id: DateId, state: DateState) -> Result<()> {
        db.set_date_state(id, state)?;
        self.cache.invalidate_date(id);
        Ok(())
    }
}
