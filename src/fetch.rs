//! Bounded-concurrency fetching of many keys
//!
//! Spawns one Tokio task per key, caps the number of tasks actively running
//! the fetch function with a semaphore, and collects every outcome into two
//! disjoint maps once all tasks have finished.

use futures::future::join_all;
use parking_lot::Mutex;
use std::collections::{HashMap, HashSet};
use std::future::Future;
use std::sync::Arc;
use tokio::sync::Semaphore;
use tokio_util::sync::CancellationToken;
use tracing::{debug, warn};

/// Concurrency used when the caller passes a non-positive bound
pub const DEFAULT_CONCURRENCY: usize = 3;

/// Per-key results of a batch fetch
///
/// Every distinct key of the batch appears in exactly one of the two maps.
#[derive(Debug)]
pub struct FetchOutcome<V, E> {
    /// Values keyed by the key that produced them
    pub successes: HashMap<String, V>,
    /// Errors keyed by the key that failed
    pub failures: HashMap<String, E>,
}

impl<V, E> Default for FetchOutcome<V, E> {
    fn default() -> Self {
        Self {
            successes: HashMap::new(),
            failures: HashMap::new(),
        }
    }
}

impl<V, E> FetchOutcome<V, E> {
    /// Total number of recorded keys
    pub fn len(&self) -> usize {
        self.successes.len() + self.failures.len()
    }

    /// Whether no key has been recorded
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    fn record(&mut self, key: String, result: Result<V, E>) {
        match result {
            Ok(value) => {
                self.successes.insert(key, value);
            }
            Err(err) => {
                self.failures.insert(key, err);
            }
        }
    }
}

/// Maps a caller-supplied bound to the number of permits actually used
pub fn effective_concurrency(concurrency: i64) -> usize {
    if concurrency <= 0 {
        DEFAULT_CONCURRENCY
    } else {
        usize::try_from(concurrency).unwrap_or(usize::MAX)
    }
}

/// Fetches every key with at most `concurrency` calls to `fetch_one` in flight
///
/// # Arguments
/// * `keys` - Keys to fetch; duplicates are fetched once
/// * `concurrency` - Ceiling on simultaneous `fetch_one` calls; `<= 0` means 3
/// * `cancel` - Token passed (as a child) to every `fetch_one` call
/// * `fetch_one` - Produces the value or error for a single key
///
/// # Returns
/// A `FetchOutcome` holding one entry per distinct key. Failures of individual
/// keys never abort the batch; the call returns only after every key finished.
///
/// # Panics
/// Resumes any panic raised inside `fetch_one`.
pub async fn fetch_many<V, E, F, Fut>(
    keys: &[String],
    concurrency: i64,
    cancel: &CancellationToken,
    fetch_one: F,
) -> FetchOutcome<V, E>
where
    V: Send + 'static,
    E: Send + 'static,
    F: Fn(String, CancellationToken) -> Fut + Send + Sync + 'static,
    Fut: Future<Output = Result<V, E>> + Send + 'static,
{
    if keys.is_empty() {
        return FetchOutcome::default();
    }

    let permits = effective_concurrency(concurrency).min(Semaphore::MAX_PERMITS);
    let semaphore = Arc::new(Semaphore::new(permits));
    let outcome = Arc::new(Mutex::new(FetchOutcome::default()));
    let fetch_one = Arc::new(fetch_one);

    let mut seen = HashSet::with_capacity(keys.len());
    let mut tasks = Vec::with_capacity(keys.len());

    debug!(keys = keys.len(), permits, "starting batch fetch");

    for key in keys {
        if !seen.insert(key.as_str()) {
            warn!(%key, "duplicate key in batch, fetching once");
            continue;
        }

        let key = key.clone();
        let semaphore = Arc::clone(&semaphore);
        let outcome = Arc::clone(&outcome);
        let fetch_one = Arc::clone(&fetch_one);
        let cancel = cancel.child_token();

        tasks.push(tokio::spawn(async move {
            // Never closed, so acquiring cannot fail
            let _permit = semaphore.acquire_owned().await.ok();
            let result = fetch_one(key.clone(), cancel).await;
            outcome.lock().record(key, result);
        }));
    }

    for joined in join_all(tasks).await {
        if let Err(err) = joined {
            if err.is_panic() {
                std::panic::resume_unwind(err.into_panic());
            }
        }
    }

    let outcome = std::mem::take(&mut *outcome.lock());
    debug!(
        succeeded = outcome.successes.len(),
        failed = outcome.failures.len(),
        "batch fetch finished"
    );
    outcome
}
