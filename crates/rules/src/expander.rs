//! Expansion of `ForcedWarSpecial` directives into concrete membership lists.
//!
//! Exception lists are read from contiguous indexed attributes
//! (`but_0`, `but_1`, … and `but_kingdom_0`, `but_kingdom_1`, …). Scanning
//! stops at the first missing or empty index, so `but_0="a" but_2="c"` yields
//! only `["a"]`.

use std::collections::HashSet;

use diplomacy_core::Roster;
use tracing::debug;

use crate::error::{DiplomacyError, Result};
use crate::schema::{Directive, ForcedWarPeaceRule};

/// Attribute prefix of the entity exception list.
pub const ENTITY_EXCEPTION_PREFIX: &str = "but";
/// Attribute prefix of the group exception list.
pub const GROUP_EXCEPTION_PREFIX: &str = "but_kingdom";

/// Collect `{prefix}_0`, `{prefix}_1`, … until the first missing or empty value.
pub fn indexed_values<'a, F>(prefix: &str, mut lookup: F) -> Vec<String>
where
    F: FnMut(&str) -> Option<&'a str>,
{
    let mut values = Vec::new();
    for index in 0usize.. {
        match lookup(&format!("{prefix}_{index}")) {
            Some(v) if !v.is_empty() => values.push(v.to_string()),
            _ => break,
        }
    }
    values
}

/// Entity and group exception ids declared on one directive node.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ExceptionLists {
    pub entities: Vec<String>,
    pub groups: Vec<String>,
}

impl ExceptionLists {
    /// Read both indexed exception lists through an attribute lookup.
    pub fn from_attributes<'a, F>(lookup: F) -> Self
    where
        F: Fn(&str) -> Option<&'a str>,
    {
        Self {
            entities: indexed_values(ENTITY_EXCEPTION_PREFIX, &lookup),
            groups: indexed_values(GROUP_EXCEPTION_PREFIX, &lookup),
        }
    }
}

/// Resolve one directive node into `rule`.
///
/// `flag` is the raw `flag` attribute; `None` means the attribute is absent.
/// Results are appended, so several directives in one block accumulate.
pub fn expand_special(
    flag: Option<&str>,
    exceptions: &ExceptionLists,
    roster: &dyn Roster,
    rule: &mut ForcedWarPeaceRule,
) -> Result<()> {
    let flag = flag.ok_or_else(|| {
        DiplomacyError::MalformedRule("each forced war special must have a flag".to_string())
    })?;
    match flag.parse::<Directive>()? {
        Directive::AllExcept => expand_all_except(exceptions, roster, rule),
    }
    Ok(())
}

/// Entities are included unless excepted; groups are included only when named.
pub fn expand_all_except(
    exceptions: &ExceptionLists,
    roster: &dyn Roster,
    rule: &mut ForcedWarPeaceRule,
) {
    let excepted: HashSet<&str> = exceptions.entities.iter().map(String::as_str).collect();
    let named_groups: HashSet<&str> = exceptions.groups.iter().map(String::as_str).collect();

    let before = rule.at_war_entities.len();
    rule.at_war_entities.extend(
        roster
            .entities()
            .iter()
            .filter(|e| !excepted.contains(e.id.as_str()))
            .cloned(),
    );
    rule.exception_groups.extend(
        roster
            .groups()
            .iter()
            .filter(|g| named_groups.contains(g.id.as_str()))
            .cloned(),
    );

    debug!(
        at_war = rule.at_war_entities.len() - before,
        entity_exceptions = exceptions.entities.len(),
        group_exceptions = exceptions.groups.len(),
        "expanded all-except directive"
    );
}
