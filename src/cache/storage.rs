//! Cache storage trait and in-memory implementation.

use chrono::{DateTime, Utc};
use std::any::Any;
use std::collections::HashMap;
use std::sync::{Arc, PoisonError, RwLock};
use tokio::time::Instant;

/// A type-erased, shared, read-only cached value.
pub type SharedValue = Arc<dyn Any + Send + Sync>;

/// A single cache slot.
#[derive(Clone)]
pub struct CachedEntry {
  /// The cached value
  pub value: SharedValue,
  /// Wall-clock time the value was stored, for reporting
  pub cached_at: DateTime<Utc>,
  /// Absolute deadline after which the slot reads as absent
  pub expires_at: Instant,
}

impl CachedEntry {
  pub fn is_expired(&self) -> bool {
    Instant::now() >= self.expires_at
  }
}

/// Trait for cache storage backends.
///
/// Reads never extend an entry's lifetime and never mutate the store.
pub trait CacheStorage: Send + Sync {
  /// Get the entry under `key` if present and not expired.
  fn get(&self, key: &str) -> Option<CachedEntry>;

  /// Unconditionally overwrite the entry under `key`.
  fn store(&self, key: &str, entry: CachedEntry);

  /// Drop the entry under `key`, if any.
  fn remove(&self, key: &str);
}

/// Storage implementation that doesn't cache anything.
/// Used when caching is disabled - all operations are no-ops.
pub struct NoopStorage;

impl CacheStorage for NoopStorage {
  fn get(&self, _key: &str) -> Option<CachedEntry> {
    None // Always miss
  }

  fn store(&self, _key: &str, _entry: CachedEntry) {}

  fn remove(&self, _key: &str) {}
}

/// Process-local storage backed by a lock-guarded map.
///
/// Expired entries are left in place and ignored on read; the next store
/// under the same key replaces them.
#[derive(Default)]
pub struct MemoryStorage {
  entries: RwLock<HashMap<String, CachedEntry>>,
}

impl MemoryStorage {
  pub fn new() -> Self {
    Self::default()
  }
}

impl CacheStorage for MemoryStorage {
  fn get(&self, key: &str) -> Option<CachedEntry> {
    // Entries are replaced whole, so a poisoned map is still consistent.
    let entries = self.entries.read().unwrap_or_else(PoisonError::into_inner);
    entries
      .get(key)
      .filter(|entry| !entry.is_expired())
      .cloned()
  }

  fn store(&self, key: &str, entry: CachedEntry) {
    let mut entries = self.entries.write().unwrap_or_else(PoisonError::into_inner);
    entries.insert(key.to_string(), entry);
  }

  fn remove(&self, key: &str) {
    let mut entries = self.entries.write().unwrap_or_else(PoisonError::into_inner);
    entries.remove(key);
  }
}
