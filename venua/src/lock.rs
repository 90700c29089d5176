//! Mutual exclusion for date and booking mutations.
//!
//! The [`LockManager`] serializes every conflict-sensitive decision: a
//! mutation acquires the lock for the entity it touches, checks state, and
//! commits while holding it. Acquisition is fail-fast; there is no wait
//! queue, callers retry with backoff. Held entries expire after a TTL so a
//! holder that crashes mid-operation cannot block the resource forever.
//!
//! Keys are namespaced by resource type so a date and a booking with the
//! same numeric id never collide. Any mutual-exclusion store with TTL
//! semantics satisfies this contract; this implementation keeps the table
//! in-process.

use std::collections::HashMap;
use std::fmt;
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::{Duration, Instant};

use parking_lot::Mutex;

use crate::booking::BookingId;
use crate::calendar::DateId;
use crate::error::{Error, Result};

/// Default time-to-live for a held lock.
pub const DEFAULT_LOCK_TTL: Duration = Duration::from_secs(10);

/// A lockable resource, namespaced by entity type.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum LockResource {
    /// A calendar date row.
    Date(DateId),
    /// A booking row.
    Booking(BookingId),
}

impl fmt::Display for LockResource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Date(id) => write!(f, "date/{id}"),
            Self::Booking(id) => write!(f, "booking/{id}"),
        }
    }
}

#[derive(Debug, Clone, Copy)]
struct LockEntry {
    token: u64,
    expires_at: Instant,
}

/// TTL-based mutual exclusion table.
///
/// # Examples
///
/// ```
/// use venua::{LockManager, LockResource};
///
/// let locks = LockManager::new();
///
/// let guard = locks.acquire(LockResource::Date(1)).unwrap();
/// // A second acquisition of the same resource fails immediately.
/// assert!(locks.acquire(LockResource::Date(1)).is_err());
/// // A different resource is unaffected.
/// assert!(locks.acquire(LockResource::Booking(1)).is_ok());
///
/// drop(guard);
/// assert!(locks.acquire(LockResource::Date(1)).is_ok());
/// ```
#[derive(Debug)]
pub struct LockManager {
    entries: Mutex<HashMap<LockResource, LockEntry>>,
    ttl: Duration,
    next_token: AtomicU64,
}

impl LockManager {
    /// Creates a lock manager with the default 10s TTL.
    #[must_use]
    pub fn new() -> Self {
        Self::with_ttl(DEFAULT_LOCK_TTL)
    }

    /// Creates a lock manager with a custom TTL.
    #[must_use]
    pub fn with_ttl(ttl: Duration) -> Self {
        Self {
            entries: Mutex::new(HashMap::new()),
            ttl,
            next_token: AtomicU64::new(1),
        }
    }

    /// Returns the configured TTL.
    #[must_use]
    pub const fn ttl(&self) -> Duration {
        self.ttl
    }

    /// Attempts to acquire the lock for a resource.
    ///
    /// Fails immediately if another unexpired holder exists; an expired
    /// entry is evicted and re-acquired.
    ///
    /// # Errors
    ///
    /// Returns [`Error::ResourceBusy`] on contention.
    pub fn acquire(&self, resource: LockResource) -> Result<LockGuard<'_>> {
        let now = Instant::now();
        let mut entries = self.entries.lock();

        if let Some(entry) = entries.get(&resource) {
            if entry.expires_at > now {
                return Err(Error::ResourceBusy { resource });
            }
        }

        let token = self.next_token.fetch_add(1, Ordering::Relaxed);
        entries.insert(
            resource,
            LockEntry {
                token,
                expires_at: now + self.ttl,
            },
        );

        Ok(LockGuard {
            manager: self,
            resource,
            token,
        })
    }

    /// Releases a held entry if the token still matches.
    ///
    /// A guard whose TTL lapsed may have been superseded by a new holder;
    /// the token check keeps it from evicting the successor.
    fn release(&self, resource: LockResource, token: u64) {
        let mut entries = self.entries.lock();
        if let Some(entry) = entries.get(&resource) {
            if entry.token == token {
                entries.remove(&resource);
            }
        }
    }
}

impl Default for LockManager {
    fn default() -> Self {
        Self::new()
    }
}

/// RAII guard for a held lock. The lock is released on drop, on both normal
/// and error paths.
#[derive(Debug)]
pub struct LockGuard<'a> {
    manager: &'a LockManager,
    resource: LockResource,
    token: u64,
}

impl LockGuard<'_> {
    /// Returns the locked resource.
    #[must_use]
    pub const fn resource(&self) -> LockResource {
        self.resource
    }
}

impl Drop for LockGuard<'_> {
    fn drop(&mut self) {
        self.manager.release(self.resource, self.token);
    }
}
