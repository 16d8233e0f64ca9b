//! Cache module for storing API responses in memory
//!
//! This module provides a TTL cache keyed by request fingerprint (the fully
//! resolved upstream URL). Entries live for the lifetime of the client that owns
//! the cache; a background reaper removes entries older than the configured
//! interval. Reads do not check entry age, so a value can be served up to one
//! interval past its expiry before the next reap removes it.

mod manager;

pub use manager::{CacheError, TtlCache};
