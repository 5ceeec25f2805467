//! Special membership directives of a `ForcedWarSpecial` node.

use std::fmt;
use std::str::FromStr;

use crate::error::DiplomacyError;

/// Strategy for computing membership lists from a roster plus exception lists.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Directive {
    /// `flag="all"`: every entity except the listed ones.
    AllExcept,
}

impl fmt::Display for Directive {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Directive::AllExcept => write!(f, "all"),
        }
    }
}

impl FromStr for Directive {
    type Err = DiplomacyError;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s {
            "all" => Ok(Directive::AllExcept),
            other => Err(DiplomacyError::UnsupportedDirective(other.to_string())),
        }
    }
}
