//! Diplomacy XML document parser.
//!
//! Walks the entry elements under the document root and turns each into a
//! [`RelationshipRule`](crate::schema::RelationshipRule), delegating
//! `ForcedWarSpecial` nodes to the [`expander`](crate::expander).
//! A failing entry is recorded with its index and the remaining entries are
//! still parsed; only a document that is not well-formed fails as a whole.

mod document;


pub use self::document::{
    parse_bool_literal, parse_document, parse_entry, EntryFailure, ParsedDocument, ParsedEntry,
    FLAG_ATTR, FORCED_WAR_SPECIAL_NODE, FORCE_NO_KINGDOM_NODE, FORCE_WAR_PEACE_NODE, TARGET_ATTR,
};
