//! Cache layer that orchestrates read-through caching over a backend fetch.

use chrono::Utc;
use std::collections::HashMap;
use std::future::Future;
use std::sync::{Arc, Mutex, PoisonError};
use std::time::Duration;
use tokio::sync::Mutex as AsyncMutex;
use tokio::time::Instant;
use tracing::{debug, warn};

use super::storage::{CacheStorage, CachedEntry};
use super::traits::{CacheResult, Cacheable};

/// Default absolute lifetime of a cached value.
pub const DEFAULT_TTL: Duration = Duration::from_secs(10 * 60);

/// Cache layer that manages caching logic and backend fetching.
///
/// This layer sits between the service and the backend client. Entries get
/// an absolute deadline when written; reads never extend it.
pub struct CacheLayer {
  storage: Arc<dyn CacheStorage>,
  /// Absolute lifetime applied on every store
  ttl: Duration,
  /// Share one fill among concurrent callers that miss on the same key
  coalesce: bool,
  fill_guards: Arc<Mutex<HashMap<String, Arc<AsyncMutex<()>>>>>,
}

impl CacheLayer {
  /// Create a new cache layer with the given storage backend.
  pub fn new(storage: Arc<dyn CacheStorage>) -> Self {
    Self {
      storage,
      ttl: DEFAULT_TTL,
      coalesce: false,
      fill_guards: Arc::new(Mutex::new(HashMap::new())),
    }
  }

  /// Set the lifetime of cached values.
  pub fn with_ttl(mut self, ttl: Duration) -> Self {
    self.ttl = ttl;
    self
  }

  /// Enable or disable fetch coalescing.
  ///
  /// With coalescing off, every caller that misses runs its own fetcher
  /// and overwrites the slot; the last write wins.
  pub fn with_coalescing(mut self, enabled: bool) -> Self {
    self.coalesce = enabled;
    self
  }

  pub fn ttl(&self) -> Duration {
    self.ttl
  }

  fn storage_key<T: Cacheable>(key: &str) -> String {
    format!("{}:{}", T::entity_type(), key)
  }

  /// Look up a value without fetching. Does not touch the deadline.
  pub fn get<T: Cacheable>(&self, key: &str) -> Option<CacheResult<Arc<T>>> {
    let entry = self.storage.get(&Self::storage_key::<T>(key))?;
    let cached_at = entry.cached_at;

    match entry.value.downcast::<T>() {
      Ok(data) => Some(CacheResult::from_cache(data, cached_at)),
      Err(_) => {
        warn!(key, entity = T::entity_type(), "cached value has unexpected type");
        None
      }
    }
  }

  /// Overwrite the value under `key` with a fresh absolute deadline.
  pub fn store<T: Cacheable>(&self, key: &str, data: Arc<T>) {
    let entry = CachedEntry {
      value: data,
      cached_at: Utc::now(),
      expires_at: Instant::now() + self.ttl,
    };
    self.storage.store(&Self::storage_key::<T>(key), entry);
  }

  /// Drop the value under `key`.
  pub fn invalidate<T: Cacheable>(&self, key: &str) {
    self.storage.remove(&Self::storage_key::<T>(key));
  }

  /// Fetch with cache-first strategy.
  ///
  /// 1. Check cache - if present and unexpired, return it
  /// 2. Otherwise run the fetcher
  /// 3. Store the result with a new deadline and return it
  ///
  /// Fetcher errors are returned as-is and nothing is stored. An expired
  /// entry is never served as a fallback.
  pub async fn fetch<T, E, F, Fut>(&self, key: &str, fetcher: F) -> Result<CacheResult<Arc<T>>, E>
  where
    T: Cacheable,
    F: FnOnce() -> Fut,
    Fut: Future<Output = Result<T, E>>,
  {
    if let Some(hit) = self.get::<T>(key) {
      debug!(key, "cache hit");
      return Ok(hit);
    }

    if !self.coalesce {
      debug!(key, "cache miss");
      return self.fill(key, fetcher).await;
    }

    let guard = self.fill_guard(key);
    let _held = guard.lock().await;

    // Another caller may have filled the slot while we waited.
    if let Some(hit) = self.get::<T>(key) {
      debug!(key, "cache hit after waiting on in-flight fill");
      return Ok(hit);
    }

    debug!(key, "cache miss");
    self.fill(key, fetcher).await
  }

  async fn fill<T, E, F, Fut>(&self, key: &str, fetcher: F) -> Result<CacheResult<Arc<T>>, E>
  where
    T: Cacheable,
    F: FnOnce() -> Fut,
    Fut: Future<Output = Result<T, E>>,
  {
    let data = Arc::new(fetcher().await?);
    self.store(key, Arc::clone(&data));
    Ok(CacheResult::from_network(data))
  }

  fn fill_guard(&self, key: &str) -> Arc<AsyncMutex<()>> {
    let mut guards = self
      .fill_guards
      .lock()
      .unwrap_or_else(PoisonError::into_inner);
    Arc::clone(guards.entry(key.to_string()).or_default())
  }
}

impl Clone for CacheLayer {
  fn clone(&self) -> Self {
    Self {
      storage: Arc::clone(&self.storage),
      ttl: self.ttl,
      coalesce: self.coalesce,
      fill_guards: Arc::clone(&self.fill_guards),
    }
  }
}
