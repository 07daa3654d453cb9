//! Query cache keyed by table name plus parameters.
//!
//! Reads go through [`QueryCache::fetch`]; mutations drop every entry under a
//! key prefix so the next read refetches. Entries also go stale after a
//! configured age.

use std::any::Any;
use std::collections::HashMap;
use std::future::Future;
use std::sync::{Arc, PoisonError, RwLock, RwLockReadGuard, RwLockWriteGuard};
use std::time::{Duration, Instant};

/// Cache key for dashboard aggregates, invalidated by writes that feed them.
pub const DASHBOARD: &str = "dashboard";

/// Hierarchical cache key: `["inventory_movements", "item=…", "limit=50"]`.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct QueryKey(Vec<String>);

impl QueryKey {
    pub fn new(root: impl Into<String>) -> Self {
        Self(vec![root.into()])
    }

    pub fn with(mut self, segment: impl Into<String>) -> Self {
        self.0.push(segment.into());
        self
    }

    pub fn starts_with(&self, prefix: &QueryKey) -> bool {
        self.0.starts_with(&prefix.0)
    }
}

impl core::fmt::Display for QueryKey {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.write_str(&self.0.join("/"))
    }
}

struct Entry {
    value: Arc<dyn Any + Send + Sync>,
    fetched_at: Instant,
}

#[derive(Default)]
struct State {
    entries: HashMap<QueryKey, Entry>,
    // Bumped on every invalidation; a fetch that started before the bump does
    // not store its result.
    generation: u64,
}

/// Shared query cache.
///
/// The lock is never held across an `.await`: loaders run unlocked.
pub struct QueryCache {
    state: RwLock<State>,
    stale_after: Duration,
}

impl QueryCache {
    pub fn new(stale_after: Duration) -> Self {
        Self {
            state: RwLock::new(State::default()),
            stale_after,
        }
    }

    /// Cached value for `key`, or the loader's result (stored on success).
    pub async fn fetch<T, E, F, Fut>(&self, key: QueryKey, loader: F) -> Result<T, E>
    where
        T: Clone + Send + Sync + 'static,
        F: FnOnce() -> Fut,
        Fut: Future<Output = Result<T, E>>,
    {
        let generation = {
            let state = self.read();
            if let Some(value) = self.fresh::<T>(&state, &key) {
                tracing::debug!(%key, "cache hit");
                return Ok(value);
            }
            state.generation
        };

        tracing::debug!(%key, "cache miss");
        let value = loader().await?;

        let mut state = self.write();
        if state.generation == generation {
            state.entries.insert(
                key,
                Entry {
                    value: Arc::new(value.clone()),
                    fetched_at: Instant::now(),
                },
            );
        }
        Ok(value)
    }

    /// Current cached value, fresh or stale, without loading.
    pub fn peek<T: Clone + 'static>(&self, key: &QueryKey) -> Option<T> {
        self.read()
            .entries
            .get(key)
            .and_then(|entry| entry.value.downcast_ref::<T>().cloned())
    }

    /// Drop every entry whose key starts with `prefix`.
    pub fn invalidate(&self, prefix: &QueryKey) {
        let mut state = self.write();
        state.generation += 1;
        let before = state.entries.len();
        state.entries.retain(|key, _| !key.starts_with(prefix));
        tracing::debug!(%prefix, dropped = before - state.entries.len(), "cache invalidated");
    }

    /// Drop every entry under each of the given roots.
    pub fn invalidate_roots(&self, roots: &[&str]) {
        for root in roots {
            self.invalidate(&QueryKey::new(*root));
        }
    }

    pub fn clear(&self) {
        let mut state = self.write();
        state.generation += 1;
        state.entries.clear();
    }

    pub fn len(&self) -> usize {
        self.read().entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    fn fresh<T: Clone + 'static>(&self, state: &State, key: &QueryKey) -> Option<T> {
        let entry = state.entries.get(key)?;
        if entry.fetched_at.elapsed() >= self.stale_after {
            return None;
        }
        entry.value.downcast_ref::<T>().cloned()
    }

    fn read(&self) -> RwLockReadGuard<'_, State> {
        self.state.read().unwrap_or_else(PoisonError::into_inner)
    }

    fn write(&self) -> RwLockWriteGuard<'_, State> {
        self.state.write().unwrap_or_else(PoisonError::into_inner)
    }
}

impl core::fmt::Debug for QueryCache {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("QueryCache")
            .field("entries", &self.len())
            .field("stale_after", &self.stale_after)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};

    async fn load(counter: &AtomicUsize, value: u32) -> Result<u32, String> {
        counter.fetch_add(1, Ordering::SeqCst);
        Ok(value)
    }

    #[tokio::test]
    async fn second_read_is_served_from_cache() {
        let cache = QueryCache::new(Duration::from_secs(60));
        let calls = AtomicUsize::new(0);
        let key = QueryKey::new("customers");

        assert_eq!(cache.fetch(key.clone(), || load(&calls, 1)).await, Ok(1));
        assert_eq!(cache.fetch(key.clone(), || load(&calls, 2)).await, Ok(1));
        assert_eq!(calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn invalidation_is_by_prefix() {
        let cache = QueryCache::new(Duration::from_secs(60));
        let calls = AtomicUsize::new(0);
        let scoped = QueryKey::new("inventory_movements").with("limit=10");
        let other = QueryKey::new("inventory_stock");

        cache.fetch(scoped.clone(), || load(&calls, 1)).await.unwrap();
        cache.fetch(other.clone(), || load(&calls, 2)).await.unwrap();
        cache.invalidate(&QueryKey::new("inventory_movements"));

        assert_eq!(cache.peek::<u32>(&scoped), None);
        assert_eq!(cache.peek::<u32>(&other), Some(2));
    }

    #[tokio::test]
    async fn stale_entries_are_refetched() {
        let cache = QueryCache::new(Duration::ZERO);
        let calls = AtomicUsize::new(0);
        let key = QueryKey::new("items");

        cache.fetch(key.clone(), || load(&calls, 1)).await.unwrap();
        assert_eq!(cache.fetch(key, || load(&calls, 2)).await, Ok(2));
        assert_eq!(calls.load(Ordering::SeqCst), 2);
    }

    #[tokio::test]
    async fn failed_loads_are_not_cached() {
        let cache = QueryCache::new(Duration::from_secs(60));
        let key = QueryKey::new("taxes");

        let failed: Result<u32, String> = cache.fetch(key.clone(), || async { Err("offline".to_string()) }).await;
        assert!(failed.is_err());
        assert!(cache.is_empty());
    }

    #[tokio::test]
    async fn load_racing_an_invalidation_is_dropped() {
        let cache = QueryCache::new(Duration::from_secs(60));
        let key = QueryKey::new("suppliers");

        let value = cache
            .fetch(key.clone(), || async {
                cache.invalidate(&QueryKey::new("suppliers"));
                Ok::<_, String>(7u32)
            })
            .await;
        assert_eq!(value, Ok(7));
        assert_eq!(cache.peek::<u32>(&key), None);
    }
}
