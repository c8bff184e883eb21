//! # sortable
//!
//! Drag-and-drop reordering of a list's direct children.
//!
//! Lists are registered on a [`Sortables`] registry with a group name; an item
//! may move between two lists only when their groups match. A drop runs in
//! three steps, always in this order:
//!
//! 1. the item is moved in the document,
//! 2. the source list's `on_end` callbacks run with a [`DropEvent`],
//! 3. bookkeeping: the checkedness of every checkbox and radio inside the
//!    item is restored to what it was when the drag started.
//!
//! Step 3 runs after the callbacks, so a callback that wants to change the
//! checked state of the dropped item has to defer the write with
//! [`runtime_events::Page::set_timeout`].

mod error;
mod registry;

pub use error::DragError;
pub use registry::{DropEvent, DropHandler, SortableId, SortableOptions, Sortables};
