//! Core [`CatalogLoader`] struct: builds, holds and resets the catalog.

use std::fs;
use std::path::Path;
use std::sync::{mpsc, Arc, RwLock};

use chrono::Utc;
use diplomacy_core::Roster;
use notify::{RecursiveMode, Watcher};
use tracing::{debug, info, warn};

use crate::catalog::Catalog;
use crate::error::{DiplomacyError, Result};
use crate::parser::{parse_document, EntryFailure};

use super::report::{LoadSummary, SourceReport, SourceStatus};
use super::reporter::{ErrorReporter, TracingReporter};
use super::sources::{SourceRole, SourceSet};
use super::watcher::{forward_fs_event, watch_targets, SourceWatcher};

/// Owns the diplomacy catalog and its lifecycle.
///
/// The catalog is built by [`initialize`](Self::initialize) (or lazily on the
/// first [`catalog`](Self::catalog) call), handed out as an immutable
/// `Arc<Catalog>`, and only dropped by an explicit [`reset`](Self::reset).
pub struct CatalogLoader {
    sources: SourceSet,
    roster: Arc<dyn Roster>,
    reporter: Arc<dyn ErrorReporter>,
    /// `None` until the first build and after `reset()`.
    catalog: RwLock<Option<Arc<Catalog>>>,
}

impl CatalogLoader {
    /// Create a loader that reports through [`TracingReporter`].
    pub fn new(sources: SourceSet, roster: Arc<dyn Roster>) -> Self {
        Self {
            sources,
            roster,
            reporter: Arc::new(TracingReporter),
            catalog: RwLock::new(None),
        }
    }

    pub fn with_reporter(mut self, reporter: Arc<dyn ErrorReporter>) -> Self {
        self.reporter = reporter;
        self
    }

    pub fn sources(&self) -> &SourceSet {
        &self.sources
    }

    /// Build the catalog from every source and store it, replacing any
    /// previous one. Never fails: errors go to the reporter and the catalog
    /// holds whatever loaded.
    ///
    /// The build runs outside the lock; the write lock is held only for the
    /// swap, and errors are reported after it is released.
    pub fn initialize(&self) -> LoadSummary {
        let (catalog, summary) = self.build();
        let previous = self
            .catalog
            .write()
            .expect("catalog lock poisoned")
            .replace(Arc::new(catalog));
        if previous.is_some() {
            debug!("replaced existing diplomacy catalog");
        }
        self.report_summary(&summary);
        summary
    }

    /// Read-only view of the catalog, building it first if none exists.
    pub fn catalog(&self) -> Arc<Catalog> {
        if let Some(catalog) = self.catalog.read().expect("catalog lock poisoned").as_ref() {
            return Arc::clone(catalog);
        }
        let (built, summary) = self.build();
        let stored = {
            let mut guard = self.catalog.write().expect("catalog lock poisoned");
            // Another caller may have stored one while we were building.
            if let Some(existing) = guard.as_ref() {
                return Arc::clone(existing);
            }
            Arc::clone(guard.insert(Arc::new(built)))
        };
        self.report_summary(&summary);
        stored
    }

    pub fn is_initialized(&self) -> bool {
        self.catalog.read().expect("catalog lock poisoned").is_some()
    }

    /// Drop the stored catalog so the next `initialize()` rebuilds from scratch.
    /// Views already handed out stay valid.
    pub fn reset(&self) {
        let previous = self.catalog.write().expect("catalog lock poisoned").take();
        if previous.is_some() {
            info!("diplomacy catalog cleared");
        }
    }

    /// Aggregate all sources into a fresh catalog without touching the stored one.
    pub fn build(&self) -> (Catalog, LoadSummary) {
        let mut catalog = Catalog::default();
        let mut reports = Vec::with_capacity(self.sources.len());

        for (role, path) in self.sources.iter() {
            let status = self.load_source(role, path, &mut catalog);
            reports.push(SourceReport {
                path: path.to_path_buf(),
                role,
                status,
            });
        }

        info!(
            sources = reports.len(),
            rules = catalog.len(),
            "built diplomacy catalog"
        );

        let summary = LoadSummary {
            loaded_at: Utc::now(),
            sources: reports,
            rule_count: catalog.len(),
        };
        (catalog, summary)
    }

    /// Hand every error recorded in `summary` to the reporter.
    fn report_summary(&self, summary: &LoadSummary) {
        for source in &summary.sources {
            let context = source.context();
            match &source.status {
                SourceStatus::Loaded { failures, .. } => {
                    for failure in failures {
                        self.reporter.report(&failure.error, &context);
                    }
                }
                SourceStatus::Failed { error } => self.reporter.report(error, &context),
                SourceStatus::Skipped { .. } => {}
            }
        }
    }

    /// Load one source into `catalog`, recording every failure.
    ///
    /// A missing secondary source is skipped silently; a missing primary is
    /// recorded as unreadable. Duplicate keys keep the entry already in the
    /// catalog and are recorded per entry.
    fn load_source(&self, role: SourceRole, path: &Path, catalog: &mut Catalog) -> SourceStatus {
        if role == SourceRole::Secondary && !path.exists() {
            debug!(path = %path.display(), "secondary diplomacy source not found, skipping");
            return SourceStatus::Skipped {
                reason: "not found".to_string(),
            };
        }

        let parsed = match fs::read_to_string(path)
            .map_err(DiplomacyError::from)
            .and_then(|text| parse_document(&text, self.roster.as_ref()))
        {
            Ok(parsed) => parsed,
            Err(error) => {
                warn!(
                    path = %path.display(),
                    role = %role,
                    error = %error,
                    "failed to load diplomacy source"
                );
                return SourceStatus::Failed { error };
            }
        };

        let mut failures = parsed.failures;
        let mut inserted = 0;
        for entry in parsed.entries {
            let target = entry.rule.target_key.clone();
            match catalog.insert(entry.rule) {
                Ok(()) => inserted += 1,
                Err(error) => {
                    warn!(
                        path = %path.display(),
                        target = %target,
                        error = %error,
                        "rejected diplomacy entry"
                    );
                    failures.push(EntryFailure {
                        index: entry.index,
                        target: Some(target),
                        error,
                    });
                }
            }
        }
        failures.sort_by_key(|f| f.index);

        info!(
            path = %path.display(),
            role = %role,
            rules = inserted,
            failed = failures.len(),
            "loaded diplomacy source"
        );
        SourceStatus::Loaded { inserted, failures }
    }

    /// Start a filesystem watcher over the source documents.
    ///
    /// The watcher never touches the catalog. It only signals which source
    /// changed; the owner decides when to `reset()` and `initialize()`.
    /// Directories of sources that do not exist yet are not watched.
    pub fn watch(&self) -> Result<SourceWatcher> {
        let targets = watch_targets(&self.sources);
        let files: Vec<_> = targets.iter().map(|t| t.file.clone()).collect();
        let (tx, rx) = mpsc::channel();

        let mut watcher = notify::recommended_watcher(
            move |res: std::result::Result<notify::Event, notify::Error>| match res {
                Ok(event) => forward_fs_event(&event, &files, &tx),
                Err(e) => warn!(error = %e, "filesystem watcher error"),
            },
        )?;

        let mut dirs: Vec<_> = targets.iter().map(|t| t.dir.clone()).collect();
        dirs.sort();
        dirs.dedup();
        for dir in &dirs {
            watcher.watch(dir, RecursiveMode::NonRecursive)?;
        }

        info!(dirs = dirs.len(), "watching diplomacy sources for changes");
        Ok(SourceWatcher::new(watcher, rx))
    }
}
