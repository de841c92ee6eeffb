//! Project catalog service with a read-through snapshot cache.

use std::sync::Arc;
use tracing::{debug, instrument};

use crate::cache::CacheLayer;
use crate::directory::error::Result;
use crate::directory::{Project, ProjectDirectory};

use super::filter::{run_query, FilteredResult, ProjectsFilter};

/// Cache key of the full project snapshot.
pub const ALL_PROJECTS_KEY: &str = "all-projects-information";

/// Catalog of projects backed by a directory service.
///
/// List queries are answered from a cached snapshot of every project.
/// Single-item reads and all writes go straight to the directory and leave
/// the snapshot alone, so a write becomes visible in list queries only once
/// the snapshot expires.
pub struct ProjectCatalogService<D> {
  directory: D,
  cache: CacheLayer,
}

impl<D: ProjectDirectory> ProjectCatalogService<D> {
  pub fn new(directory: D, cache: CacheLayer) -> Self {
    Self { directory, cache }
  }

  /// Filter, sort and page the project snapshot.
  ///
  /// Fetches the full list from the directory when no unexpired snapshot
  /// is cached. A failed fetch fails the query.
  #[instrument(skip(self))]
  pub async fn get_projects(&self, filter: &ProjectsFilter) -> Result<FilteredResult<Project>> {
    let snapshot = self
      .cache
      .fetch(ALL_PROJECTS_KEY, || self.directory.fetch_all())
      .await?;

    debug!(
      source = ?snapshot.source,
      cached_at = ?snapshot.cached_at,
      snapshot_len = snapshot.data.len(),
      "project snapshot ready"
    );

    let result = run_query(&snapshot.data, filter);
    debug!(
      all_results = result.all_results,
      returned = result.results.len(),
      "projects query answered"
    );
    Ok(result)
  }

  /// Get a single project (not cached).
  pub async fn get_project(&self, id: &str) -> Result<Project> {
    self.directory.fetch_one(id).await
  }

  /// Create a project (not cached - write operation).
  pub async fn create_project(&self, project: &Project) -> Result<()> {
    debug!(id = %project.id, "creating project");
    self.directory.create(project).await
  }

  /// Update a project (not cached - write operation).
  pub async fn update_project(&self, id: &str, project: &Project) -> Result<()> {
    debug!(id, "updating project");
    self.directory.update(id, project).await
  }

  /// Delete a project (not cached - write operation).
  pub async fn delete_project(&self, id: &str) -> Result<()> {
    debug!(id, "deleting project");
    self.directory.delete(id).await
  }

  /// The cached snapshot, if present and unexpired.
  pub fn try_get_cached_projects(&self) -> Option<Arc<Vec<Project>>> {
    self
      .cache
      .get::<Vec<Project>>(ALL_PROJECTS_KEY)
      .map(|hit| hit.data)
  }

  /// Replace the cached snapshot, restarting its lifetime.
  pub fn store_projects(&self, projects: Vec<Project>) {
    self.cache.store(ALL_PROJECTS_KEY, Arc::new(projects));
  }

  /// Drop the cached snapshot so the next query refetches.
  pub fn clear_cached_projects(&self) {
    self.cache.invalidate::<Vec<Project>>(ALL_PROJECTS_KEY);
  }
}
