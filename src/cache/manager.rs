//! In-memory TTL cache with a background reaper
//!
//! Provides a `TtlCache` that stores raw response bodies keyed by request
//! fingerprint, shared by every fetch made through one client.

use parking_lot::Mutex;
use std::collections::HashMap;
use std::sync::{Arc, Weak};
use std::time::{Duration, Instant};
use thiserror::Error;
use tracing::{debug, trace};

/// Smallest reap period accepted; tokio intervals cannot tick at zero
const MIN_REAP_INTERVAL: Duration = Duration::from_millis(1);

/// Errors returned by cache writes
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CacheError {
    /// Cache keys must be non-empty fingerprints
    #[error("cache key must not be empty")]
    EmptyKey,
}

/// A single cached value with its insertion time
#[derive(Debug)]
struct CacheEntry {
    value: Vec<u8>,
    created_at: Instant,
}

type EntryMap = HashMap<String, CacheEntry>;

/// Shared in-memory cache with time-bounded validity
///
/// Cloning a `TtlCache` yields another handle to the same entries. Every entry
/// is removed by the reaper once its age exceeds the interval, but `get` itself
/// never checks age: an entry may be returned up to one full interval after it
/// logically expired.
#[derive(Debug, Clone)]
pub struct TtlCache {
    entries: Arc<Mutex<EntryMap>>,
    interval: Duration,
}

impl TtlCache {
    /// Creates an empty cache and spawns its reaper task
    ///
    /// Must be called from within a Tokio runtime. The reaper wakes once per
    /// `interval` and stops on the first tick after every handle is dropped.
    pub fn new(interval: Duration) -> Self {
        let interval = interval.max(MIN_REAP_INTERVAL);
        let entries = Arc::new(Mutex::new(HashMap::new()));

        spawn_reaper(Arc::downgrade(&entries), interval);

        Self { entries, interval }
    }

    /// Inserts or overwrites `key`, resetting its creation time to now
    ///
    /// # Returns
    /// * `Ok(())` on success
    /// * `Err(CacheError::EmptyKey)` if `key` is empty
    pub fn put(&self, key: &str, value: impl Into<Vec<u8>>) -> Result<(), CacheError> {
        if key.is_empty() {
            return Err(CacheError::EmptyKey);
        }

        let entry = CacheEntry {
            value: value.into(),
            created_at: Instant::now(),
        };
        self.entries.lock().insert(key.to_string(), entry);
        Ok(())
    }

    /// Returns a copy of the value stored under `key`, if present
    ///
    /// Presence is all that is checked; expiry is left to the reaper.
    pub fn get(&self, key: &str) -> Option<Vec<u8>> {
        self.entries.lock().get(key).map(|entry| entry.value.clone())
    }

    /// Number of entries currently held, expired or not
    pub fn len(&self) -> usize {
        self.entries.lock().len()
    }

    /// Whether the cache currently holds no entries
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// The TTL, which is also the reap period
    pub fn interval(&self) -> Duration {
        self.interval
    }
}

/// Spawns the periodic reap loop for a cache's entry map
fn spawn_reaper(entries: Weak<Mutex<EntryMap>>, interval: Duration) {
    tokio::spawn(async move {
        let mut ticker = tokio::time::interval(interval);
        // Skip the first tick (immediate)
        ticker.tick().await;

        loop {
            ticker.tick().await;

            let Some(entries) = entries.upgrade() else {
                trace!("cache dropped, reaper exiting");
                break;
            };
            reap(&entries, interval);
        }
    });
}

/// Removes every entry older than `interval` in one locked pass
fn reap(entries: &Mutex<EntryMap>, interval: Duration) {
    let mut entries = entries.lock();
    let before = entries.len();
    entries.retain(|_, entry| entry.created_at.elapsed() <= interval);

    let removed = before - entries.len();
    if removed > 0 {
        debug!(removed, remaining = entries.len(), "reaped expired cache entries");
    }
}
