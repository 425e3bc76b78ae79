//! Cache layer that orchestrates caching logic with network fetching.

use chrono::{Duration, Utc};
use std::collections::HashMap;
use std::future::Future;
use std::sync::{Arc, Mutex};
use tracing::{debug, warn};

use super::storage::CacheStorage;
use super::traits::{CacheResult, Cacheable, QueryKey};
use crate::error::{Error, Result};

type KeyLocks = HashMap<String, Arc<tokio::sync::Mutex<()>>>;

/// Cache layer that manages caching logic and network fetching.
///
/// This layer sits between the views and the network client:
/// - results are served from storage while younger than `stale_time`
/// - failed fetches are re-invoked immediately, up to `retries` extra times
/// - concurrent fetches for the same key run one at a time, so the later
///   caller picks up what the first one stored
pub struct CacheLayer<S: CacheStorage> {
  storage: Arc<S>,
  /// How long before cached data is considered stale
  stale_time: Duration,
  /// Additional attempts after the first failure
  retries: u32,
  in_flight: Arc<Mutex<KeyLocks>>,
}

impl<S: CacheStorage> CacheLayer<S> {
  /// Create a new cache layer with the given storage backend.
  pub fn new(storage: S) -> Self {
    Self {
      storage: Arc::new(storage),
      stale_time: Duration::minutes(5),
      retries: 2,
      in_flight: Arc::new(Mutex::new(HashMap::new())),
    }
  }

  /// Set the stale time for cached data.
  pub fn with_stale_time(mut self, stale_time: Duration) -> Self {
    self.stale_time = stale_time;
    self
  }

  /// Set how many times a failed fetch is retried.
  pub fn with_retries(mut self, retries: u32) -> Self {
    self.retries = retries;
    self
  }

  /// Check if cached data is stale based on cached_at timestamp.
  fn is_stale(&self, cached_at: chrono::DateTime<Utc>) -> bool {
    Utc::now() - cached_at >= self.stale_time
  }

  /// Fetch a list with cache-first strategy.
  ///
  /// 1. Wait for any in-flight fetch of the same key
  /// 2. Check cache - if fresh, return immediately
  /// 3. If stale/missing, fetch from network with retries
  /// 4. Update cache with new data
  ///
  /// A failure after the last retry is returned as-is; stale data is never
  /// served in its place.
  pub async fn fetch_list<K, T, F, Fut>(&self, key: &K, fetcher: F) -> Result<CacheResult<Vec<T>>>
  where
    K: QueryKey,
    T: Cacheable,
    F: Fn() -> Fut,
    Fut: Future<Output = Result<Vec<T>>>,
  {
    let hash = key.cache_hash();
    let description = key.description();

    let key_lock = self.key_lock(&hash)?;
    let result = {
      let _guard = key_lock.lock().await;
      self.fetch_locked(&hash, &description, &fetcher).await
    };
    self.release_key_lock(&hash, key_lock)?;

    result
  }

  /// Fetch a single optional entity with caching.
  ///
  /// `None` is cached like any other result, so a lookup that found nothing
  /// is not repeated while fresh.
  pub async fn fetch_optional<K, T, F, Fut>(
    &self,
    key: &K,
    fetcher: F,
  ) -> Result<CacheResult<Option<T>>>
  where
    K: QueryKey,
    T: Cacheable,
    F: Fn() -> Fut,
    Fut: Future<Output = Result<Option<T>>>,
  {
    let result = self
      .fetch_list(key, || {
        let fut = fetcher();
        async move { fut.await.map(|found| found.into_iter().collect::<Vec<T>>()) }
      })
      .await?;

    Ok(result.map(|entities| entities.into_iter().next()))
  }

  /// Drop the cached result for a key so the next fetch goes to the network.
  pub fn invalidate<K: QueryKey>(&self, key: &K) -> Result<()> {
    debug!(query = %key.description(), "Invalidating cache entry");
    self.storage.invalidate(&key.cache_hash())
  }

  async fn fetch_locked<T, F, Fut>(
    &self,
    hash: &str,
    description: &str,
    fetcher: &F,
  ) -> Result<CacheResult<Vec<T>>>
  where
    T: Cacheable,
    F: Fn() -> Fut,
    Fut: Future<Output = Result<Vec<T>>>,
  {
    if let Some(cached) = self.storage.get_query_result::<T>(hash)? {
      if !self.is_stale(cached.cached_at) {
        debug!(query = description, "Cache hit");
        return Ok(CacheResult::from_cache(cached.entities, cached.cached_at));
      }
      debug!(query = description, "Cache entry stale");
    }

    let data = self.fetch_with_retry(description, fetcher).await?;
    self.storage.store_query_result(hash, &data)?;
    Ok(CacheResult::from_network(data))
  }

  async fn fetch_with_retry<T, F, Fut>(&self, description: &str, fetcher: &F) -> Result<T>
  where
    F: Fn() -> Fut,
    Fut: Future<Output = Result<T>>,
  {
    let mut attempt = 0;
    loop {
      match fetcher().await {
        Ok(data) => return Ok(data),
        Err(e) if attempt < self.retries => {
          attempt += 1;
          warn!(query = description, attempt, status = ?e.status(), error = %e, "Fetch failed, retrying");
        }
        Err(e) => {
          warn!(query = description, status = ?e.status(), error = %e, "Fetch failed, giving up");
          return Err(e);
        }
      }
    }
  }

  fn key_lock(&self, hash: &str) -> Result<Arc<tokio::sync::Mutex<()>>> {
    let mut locks = self.lock_in_flight()?;
    Ok(Arc::clone(locks.entry(hash.to_string()).or_default()))
  }

  fn release_key_lock(&self, hash: &str, key_lock: Arc<tokio::sync::Mutex<()>>) -> Result<()> {
    let mut locks = self.lock_in_flight()?;
    // Only the map and this caller hold it: nobody else is waiting
    if Arc::strong_count(&key_lock) == 2 {
      locks.remove(hash);
    }
    Ok(())
  }

  fn lock_in_flight(&self) -> Result<std::sync::MutexGuard<'_, KeyLocks>> {
    self
      .in_flight
      .lock()
      .map_err(|e| Error::Cache(format!("Lock poisoned: {}", e)))
  }
}

impl<S: CacheStorage> Clone for CacheLayer<S> {
  fn clone(&self) -> Self {
    Self {
      storage: Arc::clone(&self.storage),
      stale_time: self.stale_time,
      retries: self.retries,
      in_flight: Arc::clone(&self.in_flight),
    }
  }
}

#[cfg(test)]
mod tests {
  use super::*;
  use crate::cache::storage::MemoryStorage;
  use crate::cache::traits::CacheSource;
  use serde::{Deserialize, Serialize};
  use std::sync::atomic::{AtomicU32, Ordering};

  #[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
  struct Item {
    id: u32,
  }

  impl Cacheable for Item {
    fn cache_key(&self) -> String {
      self.id.to_string()
    }

    fn entity_type() -> &'static str {
      "item"
    }
  }

  struct Key(&'static str);

  impl QueryKey for Key {
    fn cache_hash(&self) -> String {
      self.0.to_string()
    }

    fn description(&self) -> String {
      format!("test {}", self.0)
    }
  }

  fn server_error() -> Error {
    Error::Fetch {
      status: 500,
      status_text: "Internal Server Error".to_string(),
    }
  }

  #[tokio::test]
  async fn test_fresh_entry_is_served_from_cache() {
    let layer = CacheLayer::new(MemoryStorage::new());
    let calls = AtomicU32::new(0);
    let fetcher = || async {
      calls.fetch_add(1, Ordering::SeqCst);
      Ok(vec![Item { id: 1 }])
    };

    let first = layer.fetch_list(&Key("a"), fetcher).await.unwrap();
    let second = layer.fetch_list(&Key("a"), fetcher).await.unwrap();

    assert_eq!(first.source, CacheSource::Network);
    assert_eq!(second.source, CacheSource::CacheFresh);
    assert_eq!(second.data, vec![Item { id: 1 }]);
    assert_eq!(calls.load(Ordering::SeqCst), 1);
  }

  #[tokio::test]
  async fn test_stale_entry_is_refetched() {
    let layer = CacheLayer::new(MemoryStorage::new()).with_stale_time(Duration::zero());
    let calls = AtomicU32::new(0);
    let fetcher = || async {
      let n = calls.fetch_add(1, Ordering::SeqCst);
      Ok(vec![Item { id: n }])
    };

    layer.fetch_list(&Key("a"), fetcher).await.unwrap();
    let second = layer.fetch_list(&Key("a"), fetcher).await.unwrap();

    assert_eq!(second.source, CacheSource::Network);
    assert_eq!(second.data, vec![Item { id: 1 }]);
    assert_eq!(calls.load(Ordering::SeqCst), 2);
  }

  #[tokio::test]
  async fn test_different_keys_do_not_share_entries() {
    let layer = CacheLayer::new(MemoryStorage::new());
    let calls = AtomicU32::new(0);
    let fetcher = || async {
      calls.fetch_add(1, Ordering::SeqCst);
      Ok(vec![Item { id: 1 }])
    };

    layer.fetch_list(&Key("a"), fetcher).await.unwrap();
    layer.fetch_list(&Key("b"), fetcher).await.unwrap();
    assert_eq!(calls.load(Ordering::SeqCst), 2);
  }

  #[tokio::test]
  async fn test_failure_is_retried_twice_then_surfaced() {
    let layer = CacheLayer::new(MemoryStorage::new());
    let calls = AtomicU32::new(0);

    let result = layer
      .fetch_list(&Key("a"), || async {
        calls.fetch_add(1, Ordering::SeqCst);
        Err::<Vec<Item>, _>(server_error())
      })
      .await;

    assert_eq!(calls.load(Ordering::SeqCst), 3);
    assert_eq!(result.unwrap_err().status(), Some(500));
  }

  #[tokio::test]
  async fn test_recovers_on_retry() {
    let layer = CacheLayer::new(MemoryStorage::new());
    let calls = AtomicU32::new(0);

    let result = layer
      .fetch_list(&Key("a"), || async {
        if calls.fetch_add(1, Ordering::SeqCst) == 0 {
          Err(server_error())
        } else {
          Ok(vec![Item { id: 7 }])
        }
      })
      .await
      .unwrap();

    assert_eq!(calls.load(Ordering::SeqCst), 2);
    assert_eq!(result.data, vec![Item { id: 7 }]);
  }

  #[tokio::test]
  async fn test_zero_retries() {
    let layer = CacheLayer::new(MemoryStorage::new()).with_retries(0);
    let calls = AtomicU32::new(0);

    let result = layer
      .fetch_list(&Key("a"), || async {
        calls.fetch_add(1, Ordering::SeqCst);
        Err::<Vec<Item>, _>(server_error())
      })
      .await;

    assert!(result.is_err());
    assert_eq!(calls.load(Ordering::SeqCst), 1);
  }

  #[tokio::test]
  async fn test_stale_data_is_not_served_on_failure() {
    let layer = CacheLayer::new(MemoryStorage::new()).with_stale_time(Duration::zero());

    layer
      .fetch_list(&Key("a"), || async { Ok(vec![Item { id: 1 }]) })
      .await
      .unwrap();

    let result = layer
      .fetch_list(&Key("a"), || async { Err::<Vec<Item>, _>(server_error()) })
      .await;
    assert!(result.is_err());
  }

  #[tokio::test]
  async fn test_concurrent_fetches_for_same_key_are_deduplicated() {
    let layer = CacheLayer::new(MemoryStorage::new());
    let calls = AtomicU32::new(0);
    let fetcher = || async {
      calls.fetch_add(1, Ordering::SeqCst);
      tokio::time::sleep(std::time::Duration::from_millis(20)).await;
      Ok(vec![Item { id: 1 }])
    };

    let (a, b) = tokio::join!(
      layer.fetch_list(&Key("a"), fetcher),
      layer.fetch_list(&Key("a"), fetcher)
    );

    assert_eq!(a.unwrap().data, b.unwrap().data);
    assert_eq!(calls.load(Ordering::SeqCst), 1);
    assert!(layer.in_flight.lock().unwrap().is_empty());
  }

  #[tokio::test]
  async fn test_fetch_optional_caches_absence() {
    let layer = CacheLayer::new(MemoryStorage::new());
    let calls = AtomicU32::new(0);
    let fetcher = || async {
      calls.fetch_add(1, Ordering::SeqCst);
      Ok(None::<Item>)
    };

    let first = layer.fetch_optional(&Key("x"), fetcher).await.unwrap();
    let second = layer.fetch_optional(&Key("x"), fetcher).await.unwrap();

    assert!(first.data.is_none());
    assert!(second.data.is_none());
    assert_eq!(second.source, CacheSource::CacheFresh);
    assert_eq!(calls.load(Ordering::SeqCst), 1);
  }

  #[tokio::test]
  async fn test_fetch_optional_returns_found_entity() {
    let layer = CacheLayer::new(MemoryStorage::new());
    let result = layer
      .fetch_optional(&Key("x"), || async { Ok(Some(Item { id: 4 })) })
      .await
      .unwrap();
    assert_eq!(result.data, Some(Item { id: 4 }));
  }

  #[tokio::test]
  async fn test_invalidate_forces_refetch() {
    let layer = CacheLayer::new(MemoryStorage::new());
    let calls = AtomicU32::new(0);
    let fetcher = || async {
      calls.fetch_add(1, Ordering::SeqCst);
      Ok(vec![Item { id: 1 }])
    };

    layer.fetch_list(&Key("a"), fetcher).await.unwrap();
    layer.invalidate(&Key("a")).unwrap();
    layer.fetch_list(&Key("a"), fetcher).await.unwrap();

    assert_eq!(calls.load(Ordering::SeqCst), 2);
  }
}
