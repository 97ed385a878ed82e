//! Expiring Alias Store
//!
//! This module implements the store that holds every alias → target mapping.
//! Each mapping carries an absolute expiry instant computed when it is
//! written.
//!
//! ## Expiry
//!
//! An expired mapping is never returned, but it may sit in the map until one
//! of two things removes it:
//!
//! 1. **Lazy**: `get` finds it expired and evicts it.
//! 2. **Eager**: `sweep` scans the whole map and drops everything expired.
//!
//! Both paths may race on the same alias. Removing an alias that is already
//! gone is a no-op.
//!
//! ## Concurrency Model
//!
//! ```text
//! ┌───────────────────────────────────────────┐
//! │                 UrlStore                  │
//! │  ┌─────────────────────────────────────┐  │
//! │  │ RwLock<HashMap<alias, Mapping>>     │  │
//! │  └─────────────────────────────────────┘  │
//! │      ▲ read: get (fast path)              │
//! │      ▲ write: put, get (evict), sweep     │
//! └───────────────────────────────────────────┘
//! ```
//!
//! The whole map is a single critical region. Every write holds the lock for
//! the full update, so readers never observe a half-written mapping.

use crate::storage::clock::{Clock, SystemClock};
use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, PoisonError, RwLock, RwLockReadGuard, RwLockWriteGuard};
use std::time::{Duration, Instant};
use tracing::{debug, info};

/// A stored target together with its lifetime.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Mapping {
    /// The original URL
    pub target: String,
    /// When this mapping was written
    pub created_at: Instant,
    /// When this mapping stops being resolvable (None = the TTL reaches
    /// past what `Instant` can represent, so it never expires)
    pub expires_at: Option<Instant>,
}

impl Mapping {
    /// Creates a mapping that expires `ttl` after `now`.
    pub fn new(target: String, now: Instant, ttl: Duration) -> Self {
        Self {
            target,
            created_at: now,
            expires_at: now.checked_add(ttl),
        }
    }

    /// A mapping whose expiry is at or before `now` is expired.
    #[inline]
    pub fn is_expired_at(&self, now: Instant) -> bool {
        self.expires_at.is_some_and(|exp| exp <= now)
    }
}

/// In-memory alias store with TTL expiry.
///
/// Wrap it in an `Arc` to share it between callers and the
/// [`ExpirySweeper`](crate::storage::ExpirySweeper).
///
/// # Example
///
/// ```
/// use quicklink::storage::UrlStore;
/// use std::time::Duration;
///
/// let store = UrlStore::new();
/// store.put("aZ3kQ9", "https://www.example.com", Duration::from_secs(60));
/// assert_eq!(store.get("aZ3kQ9").as_deref(), Some("https://www.example.com"));
/// assert_eq!(store.get("missing"), None);
/// ```
pub struct UrlStore {
    /// alias -> mapping
    mappings: RwLock<HashMap<String, Mapping>>,

    /// Time source for expiry checks
    clock: Arc<dyn Clock>,

    /// Statistics: total put operations
    put_count: AtomicU64,

    /// Statistics: total get operations
    get_count: AtomicU64,

    /// Statistics: gets that returned a target
    hit_count: AtomicU64,

    /// Statistics: mappings removed by a lookup
    lazy_evicted: AtomicU64,

    /// Statistics: mappings removed by a sweep
    swept: AtomicU64,
}

impl std::fmt::Debug for UrlStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("UrlStore")
            .field("mappings", &self.len())
            .field("clock", &self.clock)
            .field("put_count", &self.put_count.load(Ordering::Relaxed))
            .field("get_count", &self.get_count.load(Ordering::Relaxed))
            .finish()
    }
}

impl Default for UrlStore {
    fn default() -> Self {
        Self::new()
    }
}

impl UrlStore {
    /// Creates an empty store driven by the system clock.
    pub fn new() -> Self {
        Self::with_clock(Arc::new(SystemClock))
    }

    /// Creates an empty store driven by `clock`.
    pub fn with_clock(clock: Arc<dyn Clock>) -> Self {
        Self {
            mappings: RwLock::new(HashMap::new()),
            clock,
            put_count: AtomicU64::new(0),
            get_count: AtomicU64::new(0),
            hit_count: AtomicU64::new(0),
            lazy_evicted: AtomicU64::new(0),
            swept: AtomicU64::new(0),
        }
    }

    // Every critical section leaves the map consistent, so a panic elsewhere
    // while holding the lock does not invalidate it.
    fn read(&self) -> RwLockReadGuard<'_, HashMap<String, Mapping>> {
        self.mappings.read().unwrap_or_else(PoisonError::into_inner)
    }

    fn write(&self) -> RwLockWriteGuard<'_, HashMap<String, Mapping>> {
        self.mappings.write().unwrap_or_else(PoisonError::into_inner)
    }

    /// Inserts or overwrites the mapping for `alias`.
    ///
    /// The mapping expires `ttl` from now. A zero `ttl` stores a mapping
    /// that is already expired; a `ttl` too large to add to the current
    /// instant stores one that never expires.
    pub fn put(&self, alias: impl Into<String>, target: impl Into<String>, ttl: Duration) {
        self.put_count.fetch_add(1, Ordering::Relaxed);

        let alias = alias.into();
        let mapping = Mapping::new(target.into(), self.clock.now(), ttl);

        let previous = self.write().insert(alias.clone(), mapping);
        if previous.is_some() {
            debug!(alias = %alias, "Overwrote existing mapping");
        }
    }

    /// Looks up the target for `alias`.
    ///
    /// Returns `None` if the alias is unknown or its mapping has expired.
    /// An expired mapping is removed on the way out.
    pub fn get(&self, alias: &str) -> Option<String> {
        self.get_count.fetch_add(1, Ordering::Relaxed);

        // Fast path under the read lock
        {
            let mappings = self.read();
            match mappings.get(alias) {
                Some(mapping) if !mapping.is_expired_at(self.clock.now()) => {
                    self.hit_count.fetch_add(1, Ordering::Relaxed);
                    return Some(mapping.target.clone());
                }
                Some(_) => {}
                None => return None,
            }
        }

        // Expired - recheck under the write lock, the sweeper or a put may
        // have got there first
        let mut mappings = self.write();
        let now = self.clock.now();
        match mappings.get(alias).map(|mapping| mapping.is_expired_at(now)) {
            Some(true) => {
                mappings.remove(alias);
                drop(mappings);
                self.lazy_evicted.fetch_add(1, Ordering::Relaxed);
                debug!(alias = %alias, "Expired entry evicted on lookup");
                None
            }
            Some(false) => {
                self.hit_count.fetch_add(1, Ordering::Relaxed);
                mappings.get(alias).map(|mapping| mapping.target.clone())
            }
            None => None,
        }
    }

    /// Removes every mapping that has expired.
    ///
    /// This is the eager eviction path driven by the background sweeper.
    pub fn sweep(&self) {
        self.sweep_expired();
    }

    /// Sweeps and returns how many mappings were removed.
    pub(crate) fn sweep_expired(&self) -> usize {
        let removed: Vec<String> = {
            let mut mappings = self.write();
            let now = self.clock.now();
            let expired: Vec<String> = mappings
                .iter()
                .filter(|(_, mapping)| mapping.is_expired_at(now))
                .map(|(alias, _)| alias.clone())
                .collect();
            for alias in &expired {
                mappings.remove(alias);
            }
            expired
        };

        if removed.is_empty() {
            return 0;
        }

        self.swept.fetch_add(removed.len() as u64, Ordering::Relaxed);
        for alias in &removed {
            info!(alias = %alias, "Expired entry removed");
        }
        removed.len()
    }

    /// Returns the number of stored mappings, including expired ones that
    /// have not been evicted yet.
    pub fn len(&self) -> usize {
        self.read().len()
    }

    /// Returns true if nothing is stored.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Returns the clock this store uses.
    pub fn clock(&self) -> &Arc<dyn Clock> {
        &self.clock
    }

    /// Returns store statistics.
    pub fn stats(&self) -> StoreStats {
        let gets = self.get_count.load(Ordering::Relaxed);
        let hits = self.hit_count.load(Ordering::Relaxed);
        StoreStats {
            mappings: self.len(),
            puts: self.put_count.load(Ordering::Relaxed),
            gets,
            hits,
            misses: gets.saturating_sub(hits),
            lazy_evicted: self.lazy_evicted.load(Ordering::Relaxed),
            swept: self.swept.load(Ordering::Relaxed),
        }
    }
}

/// Store statistics.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct StoreStats {
    /// Mappings currently held
    pub mappings: usize,
    /// Total put operations
    pub puts: u64,
    /// Total get operations
    pub gets: u64,
    /// Gets that returned a target
    pub hits: u64,
    /// Gets that returned nothing
    pub misses: u64,
    /// Expired mappings removed by a lookup
    pub lazy_evicted: u64,
    /// Expired mappings removed by a sweep
    pub swept: u64,
}
