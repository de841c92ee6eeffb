//! Access to the backend project directory service.

mod cache;
pub mod client;
pub mod error;
pub mod types;

pub use client::{HttpDirectoryClient, ProjectDirectory};
pub use error::DirectoryError;
pub use types::{ContactPerson, Project};
