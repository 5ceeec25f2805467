//! Entry-level parsing of a diplomacy document.

use diplomacy_core::Roster;
use roxmltree::{Document, Node, ParsingOptions};
use tracing::{debug, warn};

use crate::error::{DiplomacyError, Result};
use crate::expander::{expand_special, ExceptionLists};
use crate::schema::{ForcedWarPeaceRule, RelationshipRule};

pub const TARGET_ATTR: &str = "target";
pub const FORCE_WAR_PEACE_NODE: &str = "ForceWarPeaceBehaviour";
pub const FORCED_WAR_SPECIAL_NODE: &str = "ForcedWarSpecial";
pub const FLAG_ATTR: &str = "flag";
pub const FORCE_NO_KINGDOM_NODE: &str = "ForceNoKingdom";

/// A successfully parsed entry and its position among the document's entries.
#[derive(Debug, Clone, PartialEq)]
pub struct ParsedEntry {
    pub index: usize,
    pub rule: RelationshipRule,
}

/// An entry that failed to parse (or, in the loader, to insert).
#[derive(Debug)]
pub struct EntryFailure {
    /// Zero-based position among the document's entry elements.
    pub index: usize,
    /// The entry's `target` attribute, when it had one.
    pub target: Option<String>,
    pub error: DiplomacyError,
}

/// Outcome of parsing one document.
#[derive(Debug, Default)]
pub struct ParsedDocument {
    pub entries: Vec<ParsedEntry>,
    pub failures: Vec<EntryFailure>,
}

impl ParsedDocument {
    pub fn rules(&self) -> impl Iterator<Item = &RelationshipRule> {
        self.entries.iter().map(|e| &e.rule)
    }

    pub fn into_rules(self) -> Vec<RelationshipRule> {
        self.entries.into_iter().map(|e| e.rule).collect()
    }
}

/// Parse a whole document.
///
/// Only malformed XML fails the call; per-entry errors are collected in
/// [`ParsedDocument::failures`].
pub fn parse_document(text: &str, roster: &dyn Roster) -> Result<ParsedDocument> {
    let options = ParsingOptions {
        allow_dtd: true,
        ..ParsingOptions::default()
    };
    let doc = Document::parse_with_options(text, options)?;
    let mut parsed = ParsedDocument::default();

    for (index, node) in doc.root_element().children().filter(|n| n.is_element()).enumerate() {
        match parse_entry(node, roster) {
            Ok(rule) => parsed.entries.push(ParsedEntry { index, rule }),
            Err(error) => {
                let target = node.attribute(TARGET_ATTR).map(str::to_string);
                warn!(index, target = ?target, error = %error, "skipping invalid diplomacy entry");
                parsed.failures.push(EntryFailure { index, target, error });
            }
        }
    }

    Ok(parsed)
}

/// Parse one entry element.
pub fn parse_entry(node: Node<'_, '_>, roster: &dyn Roster) -> Result<RelationshipRule> {
    let target = node
        .attribute(TARGET_ATTR)
        .filter(|t| !t.is_empty())
        .ok_or(DiplomacyError::MissingRequiredField(TARGET_ATTR))?;

    let mut rule = RelationshipRule::new(target);

    if let Some(force_node) = child_element(node, FORCE_WAR_PEACE_NODE) {
        rule.forced_war_peace = Some(parse_forced_war_peace(force_node, roster)?);
    }

    if let Some(flag_node) = child_element(node, FORCE_NO_KINGDOM_NODE) {
        let text = inner_text(flag_node);
        let value = parse_bool_literal(&text).ok_or(DiplomacyError::InvalidBooleanLiteral {
            field: FORCE_NO_KINGDOM_NODE,
            value: text,
        })?;
        rule.force_no_parent_group = Some(value);
    }

    Ok(rule)
}

fn parse_forced_war_peace(node: Node<'_, '_>, roster: &dyn Roster) -> Result<ForcedWarPeaceRule> {
    let mut rule = ForcedWarPeaceRule::default();

    for child in node.children().filter(|n| n.is_element()) {
        let name = child.tag_name().name();
        if name != FORCED_WAR_SPECIAL_NODE {
            debug!(node = %name, "ignoring unknown node in {}", FORCE_WAR_PEACE_NODE);
            continue;
        }
        let exceptions = ExceptionLists::from_attributes(|attr| child.attribute(attr));
        expand_special(child.attribute(FLAG_ATTR), &exceptions, roster, &mut rule)?;
    }

    Ok(rule)
}

/// `true`/`false`, ignoring ASCII case and surrounding whitespace.
pub fn parse_bool_literal(text: &str) -> Option<bool> {
    let text = text.trim();
    if text.eq_ignore_ascii_case("true") {
        Some(true)
    } else if text.eq_ignore_ascii_case("false") {
        Some(false)
    } else {
        None
    }
}

/// First child element with the given name.
fn child_element<'a, 'input>(node: Node<'a, 'input>, name: &str) -> Option<Node<'a, 'input>> {
    node.children()
        .find(|c| c.is_element() && c.tag_name().name() == name)
}

/// Concatenated text of all descendant text nodes.
fn inner_text(node: Node<'_, '_>) -> String {
    node.descendants()
        .filter(|n| n.is_text())
        .filter_map(|n| n.text())
        .collect()
}
