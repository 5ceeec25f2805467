//! Schema records produced by the document parser.
//!
//! - `RelationshipRule`: one entry keyed by its target faction
//! - `ForcedWarPeaceRule`: concrete war membership computed by the expander
//! - `Directive`: the `ForcedWarSpecial` flag values

mod directive;
mod rule;

pub use directive::*;
pub use rule::*;
