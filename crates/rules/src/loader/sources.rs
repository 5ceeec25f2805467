//! The ordered set of documents a catalog is built from.

use std::fmt;
use std::path::{Path, PathBuf};

use diplomacy_core::config::{DiplomacyConfig, DOCUMENT_FILE_NAME};

/// Whether a source is the module's own document or a sub-mod contribution.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SourceRole {
    Primary,
    Secondary,
}

impl fmt::Display for SourceRole {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SourceRole::Primary => write!(f, "primary"),
            SourceRole::Secondary => write!(f, "secondary"),
        }
    }
}

/// One optional primary document followed by secondary documents in
/// declaration order.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SourceSet {
    primary: Option<PathBuf>,
    secondary: Vec<PathBuf>,
}

impl SourceSet {
    pub fn new(primary: Option<PathBuf>) -> Self {
        Self {
            primary,
            secondary: Vec::new(),
        }
    }

    /// Primary document from the configured module layout (none in API mode),
    /// then `<dir>/Diplomacy.xml` for each sub-mod directory.
    pub fn from_config(config: &DiplomacyConfig) -> Self {
        Self {
            primary: config.primary_document_path(),
            secondary: config.submod_document_paths(),
        }
    }

    /// Append a secondary document path.
    pub fn with_secondary(mut self, path: impl Into<PathBuf>) -> Self {
        self.secondary.push(path.into());
        self
    }

    /// Append `<dir>/Diplomacy.xml` as a secondary document.
    pub fn with_secondary_dir(self, dir: impl AsRef<Path>) -> Self {
        self.with_secondary(dir.as_ref().join(DOCUMENT_FILE_NAME))
    }

    pub fn primary(&self) -> Option<&Path> {
        self.primary.as_deref()
    }

    pub fn secondary(&self) -> &[PathBuf] {
        &self.secondary
    }

    /// All sources in load order.
    pub fn iter(&self) -> impl Iterator<Item = (SourceRole, &Path)> {
        self.primary
            .iter()
            .map(|p| (SourceRole::Primary, p.as_path()))
            .chain(self.secondary.iter().map(|p| (SourceRole::Secondary, p.as_path())))
    }

    pub fn len(&self) -> usize {
        self.primary.iter().count() + self.secondary.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}
