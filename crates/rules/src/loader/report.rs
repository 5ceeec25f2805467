//! Load summary structures for the catalog loader.

use std::path::PathBuf;

use chrono::{DateTime, Utc};

use super::sources::SourceRole;
use crate::error::DiplomacyError;
use crate::parser::EntryFailure;

/// Outcome of one `initialize()` run.
#[derive(Debug)]
pub struct LoadSummary {
    pub loaded_at: DateTime<Utc>,
    /// One report per source, in load order.
    pub sources: Vec<SourceReport>,
    /// Rules in the resulting catalog.
    pub rule_count: usize,
}

impl LoadSummary {
    /// Every entry-level failure across all sources.
    pub fn entry_failures(&self) -> impl Iterator<Item = (&SourceReport, &EntryFailure)> {
        self.sources.iter().flat_map(|source| {
            let failures: &[EntryFailure] = match &source.status {
                SourceStatus::Loaded { failures, .. } => failures,
                _ => &[],
            };
            failures.iter().map(move |f| (source, f))
        })
    }

    /// Number of errors reported during the load.
    pub fn error_count(&self) -> usize {
        self.sources
            .iter()
            .map(|s| match &s.status {
                SourceStatus::Loaded { failures, .. } => failures.len(),
                SourceStatus::Failed { .. } => 1,
                SourceStatus::Skipped { .. } => 0,
            })
            .sum()
    }

    pub fn is_clean(&self) -> bool {
        self.error_count() == 0
    }

}

/// Outcome of loading a single source.
#[derive(Debug)]
pub struct SourceReport {
    pub path: PathBuf,
    pub role: SourceRole,
    pub status: SourceStatus,
}

impl SourceReport {
    /// Context label handed to the error reporter.
    pub fn context(&self) -> String {
        format!("Diplomacy Data Parsing of {}", self.path.display())
    }
}

/// Status of a single source load attempt.
#[derive(Debug)]
pub enum SourceStatus {
    /// Document was parsed; `inserted` rules made it into the catalog.
    Loaded {
        inserted: usize,
        failures: Vec<EntryFailure>,
    },
    /// Source was not present (secondary sources only).
    Skipped { reason: String },
    /// Document could not be read or parsed at all.
    Failed { error: DiplomacyError },
}
