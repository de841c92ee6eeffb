//! Generic process-local caching layer.
//!
//! This module provides a backend-agnostic caching mechanism that:
//! - Stores shared read-only values under string keys
//! - Gives every write an absolute deadline; reads never extend it
//! - Optionally coalesces concurrent fills of the same key

mod layer;
mod storage;
mod traits;

pub use layer::{CacheLayer, DEFAULT_TTL};
pub use storage::{CacheStorage, MemoryStorage, NoopStorage};
pub use traits::{CacheResult, CacheSource, Cacheable};
