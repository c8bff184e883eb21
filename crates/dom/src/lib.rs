//! Live, mutable document model for form scripting.
//!
//! [`Document`] is an arena of nodes addressed by [`NodeKey`]. It carries the
//! live form state browsers keep next to the markup (`value`, `checked`), a
//! small [`Selector`] engine, and [`form_data`] for computing what a form
//! would submit.

mod document;
mod error;
mod form;
mod selector;

pub use document::{Document, NodeKey};
pub use error::DomError;
pub use form::{InputControlType, form_data, input_control_type};
pub use selector::{Selector, SelectorError};
