//! Core traits and types for the caching system.

use chrono::{DateTime, Utc};

/// Trait for values that can be held in the process-local cache.
///
/// Values are stored behind an `Arc` and handed out as shared read-only
/// snapshots, so implementors only need to be thread-safe and `'static`.
pub trait Cacheable: Send + Sync + 'static {
  /// Entity type name used to namespace storage keys (e.g., "project")
  fn entity_type() -> &'static str;
}

impl<T: Cacheable> Cacheable for Vec<T> {
  fn entity_type() -> &'static str {
    T::entity_type()
  }
}

/// Result from a cache operation, including data and metadata about the source.
#[derive(Debug, Clone)]
pub struct CacheResult<T> {
  /// The actual data
  pub data: T,
  /// Where the data came from
  pub source: CacheSource,
  /// When the data was cached (if from cache)
  pub cached_at: Option<DateTime<Utc>>,
}

impl<T> CacheResult<T> {
  /// Create a new cache result from fresh network data.
  pub fn from_network(data: T) -> Self {
    Self {
      data,
      source: CacheSource::Network,
      cached_at: None,
    }
  }

  /// Create a new cache result from cached data.
  pub fn from_cache(data: T, cached_at: DateTime<Utc>) -> Self {
    Self {
      data,
      source: CacheSource::Cache,
      cached_at: Some(cached_at),
    }
  }
}

/// Indicates where a result came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CacheSource {
  /// Fresh data from the backend
  Network,
  /// Data from a cache entry that had not yet expired
  Cache,
}
