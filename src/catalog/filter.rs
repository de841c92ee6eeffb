//! Query pipeline over a project snapshot: filter, count, sort, page.

use serde::{Deserialize, Serialize};
use std::collections::HashSet;

use crate::directory::Project;

/// Query descriptor for the project list.
///
/// Every criterion is optional. Blank or empty criteria are skipped.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProjectsFilter {
  /// Free text matched against project names
  #[serde(default)]
  pub query: Option<String>,
  #[serde(default)]
  pub groups: Option<Vec<String>>,
  #[serde(default)]
  pub tags: Option<Vec<String>>,
  /// Zero-based page index
  #[serde(default)]
  pub page: usize,
  /// Page size; zero or negative disables paging
  #[serde(default)]
  pub limit: i64,
}

impl ProjectsFilter {
  pub fn with_query(mut self, query: impl Into<String>) -> Self {
    self.query = Some(query.into());
    self
  }

  pub fn with_groups<I, S>(mut self, groups: I) -> Self
  where
    I: IntoIterator<Item = S>,
    S: Into<String>,
  {
    self.groups = Some(groups.into_iter().map(Into::into).collect());
    self
  }

  pub fn with_tags<I, S>(mut self, tags: I) -> Self
  where
    I: IntoIterator<Item = S>,
    S: Into<String>,
  {
    self.tags = Some(tags.into_iter().map(Into::into).collect());
    self
  }

  pub fn paged(mut self, page: usize, limit: i64) -> Self {
    self.page = page;
    self.limit = limit;
    self
  }
}

/// One page of matches plus the total match count before paging.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FilteredResult<T> {
  pub results: Vec<T>,
  pub all_results: usize,
}

/// Run the full query pipeline over `projects`.
pub fn run_query(projects: &[Project], filter: &ProjectsFilter) -> FilteredResult<Project> {
  let mut matches: Vec<&Project> = projects.iter().collect();
  filter_by_name(&mut matches, filter.query.as_deref());
  filter_by_groups(&mut matches, filter.groups.as_deref());
  filter_by_tags(&mut matches, filter.tags.as_deref());

  let all_results = matches.len();

  // sort_by is stable: equal names keep snapshot order
  matches.sort_by(|a, b| a.name.cmp(&b.name));

  let results = page(matches, filter.page, filter.limit)
    .into_iter()
    .cloned()
    .collect();

  FilteredResult {
    results,
    all_results,
  }
}

fn filter_by_name(matches: &mut Vec<&Project>, query: Option<&str>) {
  let Some(query) = query.filter(|q| !q.trim().is_empty()) else {
    return;
  };

  let needle = query.to_uppercase();
  matches.retain(|p| p.name.to_uppercase().contains(&needle));
}

/// Requested groups are uppercased; the project's group is compared as stored.
fn filter_by_groups(matches: &mut Vec<&Project>, groups: Option<&[String]>) {
  let Some(groups) = groups.filter(|g| !g.is_empty()) else {
    return;
  };

  let wanted: HashSet<String> = groups.iter().map(|g| g.to_uppercase()).collect();
  matches.retain(|p| wanted.contains(&p.group));
}

/// Keeps projects carrying at least one requested tag, ignoring case.
fn filter_by_tags(matches: &mut Vec<&Project>, tags: Option<&[String]>) {
  let Some(tags) = tags.filter(|t| !t.is_empty()) else {
    return;
  };

  let wanted: HashSet<String> = tags.iter().map(|t| t.to_uppercase()).collect();
  matches.retain(|p| p.tags.iter().any(|tag| wanted.contains(&tag.to_uppercase())));
}

fn page<T>(items: Vec<T>, page: usize, limit: i64) -> Vec<T> {
  if limit <= 0 {
    return items;
  }

  let limit = usize::try_from(limit).unwrap_or(usize::MAX);
  items
    .into_iter()
    .skip(page.saturating_mul(limit))
    .take(limit)
    .collect()
}
