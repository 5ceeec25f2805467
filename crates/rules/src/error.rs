//! Error type shared by the expander, the document parser and the loader.

use std::fmt;

use serde::Serialize;

/// Errors raised while turning diplomacy documents into a catalog.
#[derive(Debug, thiserror::Error)]
pub enum DiplomacyError {
    /// Required attribute absent or empty (e.g. `target`).
    #[error("missing required field '{0}'")]
    MissingRequiredField(&'static str),

    /// A boolean-typed field whose text is not `true`/`false`.
    #[error("{field} must be a boolean value, got '{value}'")]
    InvalidBooleanLiteral { field: &'static str, value: String },

    /// Unrecognized `ForcedWarSpecial` flag.
    #[error("invalid forced war special flag '{0}'")]
    UnsupportedDirective(String),

    /// Structurally required sub-attribute missing.
    #[error("malformed rule: {0}")]
    MalformedRule(String),

    /// Two entries across the merged sources share a target key.
    #[error("duplicate target key '{0}'")]
    DuplicateKey(String),

    /// The document could not be read or is not well-formed XML.
    #[error("source unreadable: {0}")]
    SourceUnreadable(String),

    /// Filesystem watcher error.
    #[error("notify watcher error: {0}")]
    Watch(#[from] notify::Error),
}

impl DiplomacyError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            DiplomacyError::MissingRequiredField(_) => ErrorKind::MissingRequiredField,
            DiplomacyError::InvalidBooleanLiteral { .. } => ErrorKind::InvalidBooleanLiteral,
            DiplomacyError::UnsupportedDirective(_) => ErrorKind::UnsupportedDirective,
            DiplomacyError::MalformedRule(_) => ErrorKind::MalformedRule,
            DiplomacyError::DuplicateKey(_) => ErrorKind::DuplicateKey,
            DiplomacyError::SourceUnreadable(_) => ErrorKind::SourceUnreadable,
            DiplomacyError::Watch(_) => ErrorKind::Watch,
        }
    }
}

impl From<std::io::Error> for DiplomacyError {
    fn from(e: std::io::Error) -> Self {
        DiplomacyError::SourceUnreadable(e.to_string())
    }
}

impl From<roxmltree::Error> for DiplomacyError {
    fn from(e: roxmltree::Error) -> Self {
        DiplomacyError::SourceUnreadable(format!("malformed XML: {e}"))
    }
}

/// Result alias for diplomacy operations.
pub type Result<T> = std::result::Result<T, DiplomacyError>;

/// Fieldless discriminant of [`DiplomacyError`], for counting and matching reports.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum ErrorKind {
    MissingRequiredField,
    InvalidBooleanLiteral,
    UnsupportedDirective,
    MalformedRule,
    DuplicateKey,
    SourceUnreadable,
    Watch,
}

impl fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ErrorKind::MissingRequiredField => write!(f, "MissingRequiredField"),
            ErrorKind::InvalidBooleanLiteral => write!(f, "InvalidBooleanLiteral"),
            ErrorKind::UnsupportedDirective => write!(f, "UnsupportedDirective"),
            ErrorKind::MalformedRule => write!(f, "MalformedRule"),
            ErrorKind::DuplicateKey => write!(f, "DuplicateKey"),
            ErrorKind::SourceUnreadable => write!(f, "SourceUnreadable"),
            ErrorKind::Watch => write!(f, "Watch"),
        }
    }
}
