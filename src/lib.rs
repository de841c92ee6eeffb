//! Gateway-side project catalog.
//!
//! Proxies project records from a backend directory service and answers
//! filtered, sorted, paged list queries from a time-limited in-process
//! snapshot of the full project list.

pub mod cache;
pub mod catalog;
pub mod config;
pub mod directory;
pub mod logging;
