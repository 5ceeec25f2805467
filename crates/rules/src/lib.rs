//! Diplomacy rule loader.
//!
//! This crate provides:
//! - XML document parsing into relationship-rule records
//! - Expansion of "all except" directives against the host roster
//! - Catalog aggregation across the module's own document and sub-mod documents
//! - Hot-reload of the catalog via `notify` watcher

pub mod catalog;
pub mod error;
pub mod expander;
pub mod loader;
pub mod parser;
pub mod schema;

pub use catalog::Catalog;
pub use error::{DiplomacyError, ErrorKind, Result};
pub use loader::{CatalogLoader, SourceSet};
