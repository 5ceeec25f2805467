use std::collections::HashSet;
use std::fmt;
use std::fs;
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::{CoreError, Result};

/// An individual faction-like actor in the host simulation (a clan).
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct EntityRef {
    pub id: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
}

impl EntityRef {
    pub fn new(id: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            name: None,
        }
    }
}

impl fmt::Display for EntityRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.id)
    }
}

/// A higher-order collection of entities (a kingdom).
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct GroupRef {
    pub id: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
}

impl GroupRef {
    pub fn new(id: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            name: None,
        }
    }
}

impl fmt::Display for GroupRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.id)
    }
}

/// Read-only view of every entity and group the host currently knows about.
///
/// Enumeration order is the host's natural order and is preserved by
/// everything that expands membership lists from a roster.
pub trait Roster: Send + Sync {
    fn entities(&self) -> &[EntityRef];
    fn groups(&self) -> &[GroupRef];
}

/// Fixed in-memory roster, loadable from YAML.
///
/// ```yaml
/// entities:
///   - id: clan_a
///     name: Clan A
/// groups:
///   - id: kingdom_1
/// ```
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct StaticRoster {
    #[serde(default)]
    pub entities: Vec<EntityRef>,
    #[serde(default)]
    pub groups: Vec<GroupRef>,
}

impl StaticRoster {
    pub fn new(entities: Vec<EntityRef>, groups: Vec<GroupRef>) -> Self {
        Self { entities, groups }
    }

    /// Build a roster from bare ids.
    pub fn from_ids<E, G>(entities: E, groups: G) -> Self
    where
        E: IntoIterator,
        E::Item: Into<String>,
        G: IntoIterator,
        G::Item: Into<String>,
    {
        Self {
            entities: entities.into_iter().map(EntityRef::new).collect(),
            groups: groups.into_iter().map(GroupRef::new).collect(),
        }
    }

    /// Parse a roster document. Ids must be unique within each list.
    pub fn from_yaml_str(yaml: &str) -> Result<Self> {
        let roster: StaticRoster = serde_yaml::from_str(yaml)?;
        roster.check_unique_ids()?;
        Ok(roster)
    }

    pub fn from_file(path: &Path) -> Result<Self> {
        let contents = fs::read_to_string(path)?;
        let roster = Self::from_yaml_str(&contents)?;
        tracing::debug!(
            path = %path.display(),
            entities = roster.entities.len(),
            groups = roster.groups.len(),
            "loaded roster"
        );
        Ok(roster)
    }

    fn check_unique_ids(&self) -> Result<()> {
        let mut seen = HashSet::new();
        for e in &self.entities {
            if !seen.insert(e.id.as_str()) {
                return Err(CoreError::DuplicateRosterId(e.id.clone()));
            }
        }
        seen.clear();
        for g in &self.groups {
            if !seen.insert(g.id.as_str()) {
                return Err(CoreError::DuplicateRosterId(g.id.clone()));
            }
        }
        Ok(())
    }
}

impl Roster for StaticRoster {
    fn entities(&self) -> &[EntityRef] {
        &self.entities
    }

    fn groups(&self) -> &[GroupRef] {
        &self.groups
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const ROSTER_YAML: &str = r#"
entities:
  - id: clan_a
    name: Clan A
  - id: clan_b
groups:
  - id: kingdom_1
    name: First Kingdom
"#;

    #[test]
    fn parse_roster_yaml() {
        let roster = StaticRoster::from_yaml_str(ROSTER_YAML).unwrap();
        let ids: Vec<_> = roster.entities().iter().map(|e| e.id.as_str()).collect();
        assert_eq!(ids, vec!["clan_a", "clan_b"]);
        assert_eq!(roster.entities()[0].name.as_deref(), Some("Clan A"));
        assert!(roster.entities()[1].name.is_none());
        assert_eq!(roster.groups(), &[GroupRef {
            id: "kingdom_1".into(),
            name: Some("First Kingdom".into()),
        }]);
    }

    #[test]
    fn missing_lists_default_to_empty() {
        let roster = StaticRoster::from_yaml_str("entities: []").unwrap();
        assert!(roster.entities().is_empty());
        assert!(roster.groups().is_empty());
    }

    #[test]
    fn duplicate_entity_id_is_rejected() {
        let yaml = "entities:\n  - id: clan_a\n  - id: clan_a\n";
        let err = StaticRoster::from_yaml_str(yaml).unwrap_err();
        assert!(matches!(err, CoreError::DuplicateRosterId(ref id) if id == "clan_a"));
    }

    #[test]
    fn same_id_in_entities_and_groups_is_allowed() {
        let roster = StaticRoster::from_ids(["shared"], ["shared"]);
        assert!(roster.check_unique_ids().is_ok());
    }

    #[test]
    fn load_roster_from_file() {
        let dir = tempfile::TempDir::new().unwrap();
        let path = dir.path().join("roster.yml");
        fs::write(&path, ROSTER_YAML).unwrap();

        let roster = StaticRoster::from_file(&path).unwrap();
        assert_eq!(roster.entities().len(), 2);
        assert_eq!(roster.groups().len(), 1);
    }

    #[test]
    fn missing_roster_file_is_io_error() {
        let err = StaticRoster::from_file(Path::new("/nonexistent/roster.yml")).unwrap_err();
        assert!(matches!(err, CoreError::Io(_)));
    }
}
