//! Filesystem change notifications for the diplomacy sources (hot reload).

use std::fs;
use std::path::{Path, PathBuf};
use std::sync::mpsc::{Receiver, Sender};
use std::time::Duration;

use notify::event::ModifyKind;
use notify::{Event, EventKind, RecommendedWatcher};
use tracing::debug;

use super::sources::SourceSet;

/// A source document and the (canonical) directory watched for it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(super) struct WatchTarget {
    pub dir: PathBuf,
    pub file: PathBuf,
}

/// Resolve the directories to watch. Sources whose directory does not exist
/// are left out.
pub(super) fn watch_targets(sources: &SourceSet) -> Vec<WatchTarget> {
    sources
        .iter()
        .filter_map(|(_, path)| {
            let file = normalize(path)?;
            let dir = file.parent()?.to_path_buf();
            Some(WatchTarget { dir, file })
        })
        .collect()
}

/// Canonicalize the parent directory and re-attach the file name, so paths
/// compare equal even when the file itself does not exist.
fn normalize(path: &Path) -> Option<PathBuf> {
    let name = path.file_name()?;
    let parent = match path.parent() {
        Some(p) if !p.as_os_str().is_empty() => p,
        _ => Path::new("."),
    };
    let dir = fs::canonicalize(parent).ok()?;
    Some(dir.join(name))
}

fn is_relevant_kind(kind: &EventKind) -> bool {
    matches!(
        kind,
        EventKind::Create(_)
            | EventKind::Remove(_)
            | EventKind::Modify(ModifyKind::Data(_))
            | EventKind::Modify(ModifyKind::Name(_))
            | EventKind::Modify(ModifyKind::Any)
    )
}

/// Does this event touch one of the watched source documents?
pub(super) fn touches_source(event: &Event, files: &[PathBuf]) -> bool {
    if !is_relevant_kind(&event.kind) {
        return false;
    }
    event.paths.iter().any(|p| {
        files.iter().any(|f| f == p) || normalize(p).is_some_and(|n| files.contains(&n))
    })
}

/// Send the changed source path to the owner if the event touches one.
pub(super) fn forward_fs_event(event: &Event, files: &[PathBuf], changes: &Sender<PathBuf>) {
    if !touches_source(event, files) {
        return;
    }
    let path = event.paths.first().cloned().unwrap_or_default();
    debug!(path = %path.display(), "diplomacy source changed");
    // The receiver is gone once the `SourceWatcher` is dropped.
    let _ = changes.send(path);
}

/// Live filesystem watch over the diplomacy sources.
///
/// Yields the path of each changed source document. Dropping it stops the
/// underlying `notify` watcher.
pub struct SourceWatcher {
    _watcher: RecommendedWatcher,
    changes: Receiver<PathBuf>,
}

impl SourceWatcher {
    pub(super) fn new(watcher: RecommendedWatcher, changes: Receiver<PathBuf>) -> Self {
        Self {
            _watcher: watcher,
            changes,
        }
    }

    /// Block until a source changes.
    pub fn recv(&self) -> Option<PathBuf> {
        self.changes.recv().ok()
    }

    /// Wait up to `timeout` for a source to change.
    pub fn recv_timeout(&self, timeout: Duration) -> Option<PathBuf> {
        self.changes.recv_timeout(timeout).ok()
    }

    /// Discard pending notifications, returning how many there were. Editors
    /// tend to emit several events per save.
    pub fn drain(&self) -> usize {
        self.changes.try_iter().count()
    }
}
