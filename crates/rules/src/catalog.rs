//! The merged, keyed collection of relationship rules.

use indexmap::IndexMap;
use serde::Serialize;

use crate::error::{DiplomacyError, Result};
use crate::schema::RelationshipRule;

/// Relationship rules keyed by target, in load order.
///
/// Keys are non-empty and unique. A catalog is only ever mutated by the
/// loader while it is being built; consumers receive it behind an `Arc`.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(transparent)]
pub struct Catalog {
    rules: IndexMap<String, RelationshipRule>,
}

impl Catalog {
    /// Insert a rule, keeping the existing entry on a key collision.
    pub(crate) fn insert(&mut self, rule: RelationshipRule) -> Result<()> {
        if rule.target_key.is_empty() {
            return Err(DiplomacyError::MissingRequiredField("target"));
        }
        if self.rules.contains_key(&rule.target_key) {
            return Err(DiplomacyError::DuplicateKey(rule.target_key));
        }
        self.rules.insert(rule.target_key.clone(), rule);
        Ok(())
    }

    pub fn get(&self, target_key: &str) -> Option<&RelationshipRule> {
        self.rules.get(target_key)
    }

    pub fn contains_key(&self, target_key: &str) -> bool {
        self.rules.contains_key(target_key)
    }

    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.rules.keys().map(String::as_str)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &RelationshipRule)> {
        self.rules.iter().map(|(k, v)| (k.as_str(), v))
    }

    pub fn len(&self) -> usize {
        self.rules.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rules.is_empty()
    }
}
