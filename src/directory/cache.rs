//! Caching implementations for directory types.

use crate::cache::Cacheable;

use super::types::Project;

impl Cacheable for Project {
  fn entity_type() -> &'static str {
    "project"
  }
}
