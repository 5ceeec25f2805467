//! Error-reporting collaborators.

use std::sync::Mutex;

use tracing::{error, warn};

use crate::error::{DiplomacyError, ErrorKind};

/// Receives every recoverable failure together with a context label naming
/// the source it came from.
pub trait ErrorReporter: Send + Sync {
    fn report(&self, error: &DiplomacyError, context: &str);
}

/// Default reporter: logs each failure at `error` level.
#[derive(Debug, Clone, Copy, Default)]
pub struct TracingReporter;

impl ErrorReporter for TracingReporter {
    fn report(&self, err: &DiplomacyError, context: &str) {
        error!(context = %context, kind = %err.kind(), error = %err, "diplomacy data error");
    }
}

/// One captured report.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Report {
    pub kind: ErrorKind,
    pub message: String,
    pub context: String,
}

/// Keeps every report in memory (and logs it at `warn`).
#[derive(Debug, Default)]
pub struct CollectingReporter {
    reports: Mutex<Vec<Report>>,
}

impl CollectingReporter {
    pub fn new() -> Self {
        Self::default()
    }

    /// Snapshot of all reports so far, in arrival order.
    pub fn reports(&self) -> Vec<Report> {
        self.reports.lock().expect("reports lock poisoned").clone()
    }

    pub fn count(&self, kind: ErrorKind) -> usize {
        self.reports
            .lock()
            .expect("reports lock poisoned")
            .iter()
            .filter(|r| r.kind == kind)
            .count()
    }

    pub fn len(&self) -> usize {
        self.reports.lock().expect("reports lock poisoned").len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn clear(&self) {
        self.reports.lock().expect("reports lock poisoned").clear();
    }
}

impl ErrorReporter for CollectingReporter {
    fn report(&self, err: &DiplomacyError, context: &str) {
        warn!(context = %context, kind = %err.kind(), error = %err, "diplomacy data error");
        self.reports
            .lock()
            .expect("reports lock poisoned")
            .push(Report {
                kind: err.kind(),
                message: err.to_string(),
                context: context.to_string(),
            });
    }
}
