//! Filterable, paged view over the project directory.

mod filter;
mod service;

pub use filter::{run_query, FilteredResult, ProjectsFilter};
pub use service::{ProjectCatalogService, ALL_PROJECTS_KEY};
