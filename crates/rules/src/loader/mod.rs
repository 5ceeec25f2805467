//! Catalog aggregation across the primary document and sub-mod documents.
//!
//! [`CatalogLoader`] reads every source of a [`SourceSet`] in order, parses
//! it, and merges the resulting rules into one [`Catalog`](crate::Catalog).
//! Failures are handed to an [`ErrorReporter`] and never abort the load.
//! An optional `notify` watcher signals when a source changes so the owner
//! can reset and rebuild the catalog.

mod core;
mod report;
mod reporter;
mod sources;
mod watcher;

#[cfg(test)]
mod tests;

pub use self::core::CatalogLoader;
pub use self::report::{LoadSummary, SourceReport, SourceStatus};
pub use self::reporter::{CollectingReporter, ErrorReporter, Report, TracingReporter};
pub use self::sources::{SourceRole, SourceSet};
pub use self::watcher::SourceWatcher;
