//! Markup front end: tokenizer, tree builder and read-only tree helpers.
//!
//! The mutable live document lives in the `dom` crate; this crate only turns
//! text into an immutable [`Node`] tree and back into debug outlines.

pub mod dom_utils;
pub mod traverse;

mod dom_builder;
mod entities;
mod tokenizer;
mod types;

pub use crate::dom_builder::build_dom;
pub use crate::tokenizer::{Tokenizer, tokenize};
pub use crate::types::{Attribute, Id, Node, NodeId, Token};

/// Tokenize and build in one step.
pub fn parse_document(input: &str) -> Node {
    build_dom(&tokenize(input))
}
