use dom::{DomError, NodeKey};
use std::fmt;

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum DragError {
    /// The item's parent is not a sortable list.
    NotSortable(NodeKey),
    /// The item is filtered out or does not match the list's draggable selector.
    NotDraggable(NodeKey),
    /// The drop target is not a sortable list.
    UnknownList(NodeKey),
    GroupMismatch { from: String, to: String },
    Dom(DomError),
}

impl fmt::Display for DragError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DragError::NotSortable(key) => write!(f, "{key} is not inside a sortable list"),
            DragError::NotDraggable(key) => write!(f, "{key} cannot be dragged"),
            DragError::UnknownList(key) => write!(f, "{key} is not a sortable list"),
            DragError::GroupMismatch { from, to } => {
                write!(f, "cannot drop from group {from:?} into group {to:?}")
            }
            DragError::Dom(err) => write!(f, "dom: {err}"),
        }
    }
}

impl std::error::Error for DragError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            DragError::Dom(err) => Some(err),
            _ => None,
        }
    }
}

impl From<DomError> for DragError {
    fn from(err: DomError) -> Self {
        DragError::Dom(err)
    }
}
