//! Parsed relationship-rule records.

use serde::Serialize;

use diplomacy_core::{EntityRef, GroupRef};

/// One parsed entry of a diplomacy document.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RelationshipRule {
    /// Non-empty identifier of the faction this rule targets.
    pub target_key: String,
    /// Present only if the entry declared a `ForceWarPeaceBehaviour` block.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub forced_war_peace: Option<ForcedWarPeaceRule>,
    /// Parsed `ForceNoKingdom` flag.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub force_no_parent_group: Option<bool>,
}

impl RelationshipRule {
    pub fn new(target_key: impl Into<String>) -> Self {
        Self {
            target_key: target_key.into(),
            forced_war_peace: None,
            force_no_parent_group: None,
        }
    }

    /// `ForceNoKingdom` with an absent flag read as `false`.
    pub fn forces_no_parent_group(&self) -> bool {
        self.force_no_parent_group.unwrap_or(false)
    }
}

/// Forced war/peace sub-rule of a [`RelationshipRule`].
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct ForcedWarPeaceRule {
    /// Entities forced into war with the target, in roster order.
    pub at_war_entities: Vec<EntityRef>,
    /// Groups named as exceptions, in roster order.
    pub exception_groups: Vec<GroupRef>,
}

impl ForcedWarPeaceRule {
    pub fn is_at_war_with(&self, entity_id: &str) -> bool {
        self.at_war_entities.iter().any(|e| e.id == entity_id)
    }

    pub fn is_exception_group(&self, group_id: &str) -> bool {
        self.exception_groups.iter().any(|g| g.id == group_id)
    }
}
