//! Read cache keyed by `QueryKey`, refreshed only through invalidation.
//!
//! # Design
//! Every key carries a generation counter. Data is stored together with the
//! generation that was current when its fetch *started*, and it counts as
//! fresh only while that still equals the key's generation. `invalidate`
//! bumps the counter, so the next read always goes back to the backend, even
//! if a fetch that began before the invalidation lands afterwards.
//!
//! Writers never touch cached data. The only way data enters the cache is
//! `fetch_query`.

use std::any::Any;
use std::collections::HashMap;
use std::future::Future;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use acme_sdk::QueryKey;
use tokio::sync::broadcast;

const EVENT_CAPACITY: usize = 64;

type Value = Arc<dyn Any + Send + Sync>;

struct Cached {
    generation: u64,
    value: Value,
}

#[derive(Default)]
struct Entry {
    generation: u64,
    data: Option<Cached>,
}

struct Inner {
    entries: Mutex<HashMap<QueryKey, Entry>>,
    events: broadcast::Sender<QueryKey>,
}

/// Shared handle to the read cache. Clones see the same entries.
#[derive(Clone)]
pub struct QueryClient {
    inner: Arc<Inner>,
}

impl Default for QueryClient {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Debug for QueryClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("QueryClient")
            .field("keys", &self.entries().len())
            .finish()
    }
}

impl QueryClient {
    pub fn new() -> Self {
        let (events, _) = broadcast::channel(EVENT_CAPACITY);
        Self {
            inner: Arc::new(Inner {
                entries: Mutex::new(HashMap::new()),
                events,
            }),
        }
    }

    fn entries(&self) -> MutexGuard<'_, HashMap<QueryKey, Entry>> {
        self.inner
            .entries
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
    }

    /// Receive every key invalidated from now on.
    pub fn subscribe(&self) -> broadcast::Receiver<QueryKey> {
        self.inner.events.subscribe()
    }

    /// Mark `key` stale and notify subscribers. The next `fetch_query` for
    /// the key hits the backend.
    pub fn invalidate(&self, key: &QueryKey) {
        let generation = {
            let mut entries = self.entries();
            let entry = entries.entry(key.clone()).or_default();
            entry.generation += 1;
            entry.generation
        };
        tracing::info!(%key, generation, "query invalidated");
        // No subscribers is fine: readers still see the bumped generation.
        let _ = self.inner.events.send(key.clone());
    }

    pub fn is_fresh(&self, key: &QueryKey) -> bool {
        self.entries().get(key).is_some_and(|entry| {
            entry
                .data
                .as_ref()
                .is_some_and(|cached| cached.generation == entry.generation)
        })
    }

    /// Last data fetched for `key`, fresh or stale.
    pub fn cached<T: Any + Send + Sync>(&self, key: &QueryKey) -> Option<Arc<T>> {
        let entries = self.entries();
        let cached = entries.get(key)?.data.as_ref()?;
        cached.value.clone().downcast::<T>().ok()
    }

    /// Return fresh data for `key`, running `fetch` when there is none.
    ///
    /// A failed fetch leaves whatever was cached before in place.
    pub async fn fetch_query<T, E, F, Fut>(&self, key: &QueryKey, fetch: F) -> Result<Arc<T>, E>
    where
        T: Any + Send + Sync,
        F: FnOnce() -> Fut,
        Fut: Future<Output = Result<T, E>>,
    {
        let generation = {
            let entries = self.entries();
            match entries.get(key) {
                Some(entry) => {
                    let fresh = entry
                        .data
                        .as_ref()
                        .filter(|cached| cached.generation == entry.generation)
                        .and_then(|cached| cached.value.clone().downcast::<T>().ok());
                    if let Some(value) = fresh {
                        tracing::debug!(%key, "query cache hit");
                        return Ok(value);
                    }
                    entry.generation
                }
                None => 0,
            }
        };

        tracing::debug!(%key, generation, "query cache miss, fetching");
        let value = Arc::new(fetch().await?);

        let mut entries = self.entries();
        let entry = entries.entry(key.clone()).or_default();
        let newer = entry
            .data
            .as_ref()
            .map_or(true, |cached| cached.generation <= generation);
        if newer {
            entry.data = Some(Cached {
                generation,
                value: value.clone(),
            });
        }
        Ok(value)
    }
}
