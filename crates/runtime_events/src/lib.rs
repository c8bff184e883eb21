//! # runtime_events
//!
//! A deterministic, single-threaded event loop around a [`dom::Document`].
//!
//! - [`Page`]: the document plus everything that reacts to it
//! - listeners keyed by node and [`EventType`], delivered to the target only
//! - a virtual clock with a timer queue and an animation-frame queue
//! - [`TransitionRules`]: which class toggles start a CSS transition and when
//!   the matching `transitionend` fires
//!
//! Every handler runs to completion before the next queued task starts.
//! Time only moves when the host calls [`Page::advance`] or
//! [`Page::run_until_idle`], which makes timing-dependent behavior testable.

mod event;
mod listeners;
mod page;
mod scheduler;
mod transitions;

pub use event::{Event, EventType};
pub use listeners::ListenerId;
pub use page::Page;
pub use scheduler::TimerId;
pub use transitions::TransitionRules;
