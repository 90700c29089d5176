//! Read-through entity caching.
//!
//! The cache is an optimization only, never a source of truth: every lookup
//! that misses goes to the store, every mutation invalidates by deleting the
//! affected keys, and entries expire after a TTL. On any disagreement the
//! store wins.

use std::collections::HashMap;
use std::hash::Hash;
use std::time::{Duration, Instant};

use parking_lot::RwLock;

use crate::booking::{Booking, BookingId};
use crate::calendar::{CalendarDate, DateId};

/// Default time-to-live for cached entries.
pub const DEFAULT_CACHE_TTL: Duration = Duration::from_secs(300);

struct CacheEntry<V> {
    value: V,
    expires_at: Instant,
}

/// A TTL key-value cache guarded by a reader-writer lock.
///
/// Reads take the shared lock and clone the value out; writes take the
/// exclusive lock briefly. Expired entries are treated as misses.
///
/// # Examples
///
/// ```
/// use venua::cache::TtlCache;
///
/// let cache: TtlCache<i64, String> = TtlCache::new();
/// assert!(cache.get(&1).is_none());
///
/// cache.insert(1, "hello".to_string());
/// assert_eq!(cache.get(&1).as_deref(), Some("hello"));
///
/// cache.remove(&1);
/// assert!(cache.get(&1).is_none());
/// ```
pub struct TtlCache<K, V> {
    entries: RwLock<HashMap<K, CacheEntry<V>>>,
    ttl: Duration,
}

impl<K: Eq + Hash, V: Clone> TtlCache<K, V> {
    /// Creates a cache with the default 300s TTL.
    #[must_use]
    pub fn new() -> Self {
        Self::with_ttl(DEFAULT_CACHE_TTL)
    }

    /// Creates a cache with a custom TTL.
    #[must_use]
    pub fn with_ttl(ttl: Duration) -> Self {
        Self {
            entries: RwLock::new(HashMap::new()),
            ttl,
        }
    }

    /// Returns the cached value for a key, or `None` on miss or expiry.
    #[must_use]
    pub fn get(&self, key: &K) -> Option<V> {
        let entries = self.entries.read();
        let entry = entries.get(key)?;
        if entry.expires_at <= Instant::now() {
            return None;
        }
        Some(entry.value.clone())
    }

    /// Stores a value under a key, replacing any previous entry.
    pub fn insert(&self, key: K, value: V) {
        let entry = CacheEntry {
            value,
            expires_at: Instant::now() + self.ttl,
        };
        self.entries.write().insert(key, entry);
    }

    /// Deletes the entry for a key. Invalidation always deletes rather than
    /// updating in place.
    pub fn remove(&self, key: &K) {
        self.entries.write().remove(key);
    }

    /// Deletes every entry.
    pub fn clear(&self) {
        self.entries.write().clear();
    }
}

impl<K: Eq + Hash, V: Clone> Default for TtlCache<K, V> {
    fn default() -> Self {
        Self::new()
    }
}

/// The entity caches shared by the engines.
///
/// One cache per lookup shape: single date, date listing, single booking,
/// booking listing. Mutations call the `invalidate_*` helpers, which drop
/// both the entity entry and the listing it appears in.
pub struct EngineCache {
    /// Single-date lookups by id.
    pub dates: TtlCache<DateId, CalendarDate>,
    /// The full calendar listing.
    pub date_list: TtlCache<(), Vec<CalendarDate>>,
    /// Single-booking lookups by id.
    pub bookings: TtlCache<BookingId, Booking>,
    /// The full booking listing.
    pub booking_list: TtlCache<(), Vec<Booking>>,
}

impl EngineCache {
    /// Creates the cache set with the default TTL.
    #[must_use]
    pub fn new() -> Self {
        Self::with_ttl(DEFAULT_CACHE_TTL)
    }

    /// Creates the cache set with a custom TTL.
    #[must_use]
    pub fn with_ttl(ttl: Duration) -> Self {
        Self {
            dates: TtlCache::with_ttl(ttl),
            date_list: TtlCache::with_ttl(ttl),
            bookings: TtlCache::with_ttl(ttl),
            booking_list: TtlCache::with_ttl(ttl),
        }
    }

    /// Drops the cached entry for a date and the calendar listing.
    pub fn invalidate_date(&self, id: DateId) {
        self.dates.remove(&id);
        self.date_list.remove(&());
    }

    /// Drops the cached entry for a booking and the booking listing.
    pub fn invalidate_booking(&self, id: BookingId) {
        self.bookings.remove(&id);
        self.booking_list.remove(&());
    }
}

impl Default for EngineCache {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::calendar::DateState;
    use chrono::NaiveDate;

    #[test]
    fn test_get_miss_then_hit() {
        let cache: TtlCache<i64, i64> = TtlCache::new();
        assert!(cache.get(&1).is_none());

        cache.insert(1, 100);
        assert_eq!(cache.get(&1), Some(100));
    }

    #[test]
    fn test_insert_replaces() {
        let cache: TtlCache<i64, i64> = TtlCache::new();
        cache.insert(1, 100);
        cache.insert(1, 200);
        assert_eq!(cache.get(&1), Some(200));
    }

    #[test]
    fn test_remove() {
        let cache: TtlCache<i64, i64> = TtlCache::new();
        cache.insert(1, 100);
        cache.remove(&1);
        assert!(cache.get(&1).is_none());

        // Removing a missing key is a no-op.
        cache.remove(&2);
    }

    #[test]
    fn test_clear() {
        let cache: TtlCache<i64, i64> = TtlCache::new();
        cache.insert(1, 100);
        cache.insert(2, 200);
        cache.clear();
        assert!(cache.get(&1).is_none());
        assert!(cache.get(&2).is_none());
    }

    #[test]
    fn test_expiry() {
        let cache: TtlCache<i64, i64> = TtlCache::with_ttl(Duration::from_millis(20));
        cache.insert(1, 100);
        assert_eq!(cache.get(&1), Some(100));

        std::thread::sleep(Duration::from_millis(40));
        assert!(cache.get(&1).is_none());
    }

    #[test]
    fn test_engine_cache_invalidate_date() {
        let cache = EngineCache::new();
        let day = NaiveDate::from_ymd_opt(2025, 12, 25).unwrap();
        let date = CalendarDate {
            id: 1,
            day,
            state: DateState::Available,
            price: 0.0,
        };

        cache.dates.insert(1, date.clone());
        cache.date_list.insert((), vec![date]);

        cache.invalidate_date(1);
        assert!(cache.dates.get(&1).is_none());
        assert!(cache.date_list.get(&()).is_none());
    }

    #[test]
    fn test_engine_cache_invalidate_booking() {
        let cache = EngineCache::new();
        let booking = crate::Booking::builder(7, 1).build().unwrap();

        cache.bookings.insert(0, booking.clone());
        cache.booking_list.insert((), vec![booking]);

        cache.invalidate_booking(0);
        assert!(cache.bookings.get(&0).is_none());
        assert!(cache.booking_list.get(&()).is_none());
    }
}
