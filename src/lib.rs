//! Dynamic formsets over an in-memory document.
//!
//! The workspace is layered bottom-up:
//!
//! - [`html`]: tokenizer and tree builder producing an immutable node tree
//! - [`dom`]: the live, mutable document with selectors and form state
//! - [`runtime_events`]: listeners, timers, animation frames and transitions
//! - [`sortable`]: drag-and-drop list sorting with named groups
//! - [`formset`]: the add / delete / reorder / mirror behavior itself
//!
//! [`FormsetPage`] bundles a page with its wired components for hosts that
//! just want to load markup and drive it.

pub use dom;
pub use formset;
pub use html;
pub use runtime_events;
pub use sortable;

pub use formset::{Components, ConfigError, FormsetConfig, RankOrder, Rules, init_page};
pub use runtime_events::{Page, TransitionRules};

use dom::{Document, NodeKey};
use std::rc::Rc;

/// A page whose formset markup has been wired.
pub struct FormsetPage {
    pub page: Page,
    pub components: Components,
    rules: Rc<Rules>,
}

impl FormsetPage {
    pub fn load(
        markup: &str,
        config: &FormsetConfig,
        transitions: TransitionRules,
    ) -> Result<Self, ConfigError> {
        let rules = Rc::new(config.compile()?);
        let mut page = Page::with_transitions(Document::parse(markup), transitions);
        let components = init_page(&mut page, &rules);
        log::info!(
            target: "formsets",
            "loaded {} nodes, {} sortable lists",
            page.doc().len(),
            components.lists.len()
        );
        Ok(Self {
            page,
            components,
            rules,
        })
    }

    pub fn rules(&self) -> &Rules {
        &self.rules
    }

    /// Element by `id` attribute in the live document.
    pub fn element(&self, id: &str) -> Option<NodeKey> {
        self.page.doc().get_element_by_id(id)
    }

    /// The `(name, value)` pairs the form with this `id` would submit.
    pub fn form_data(&self, form_id: &str) -> Vec<(String, String)> {
        self.element(form_id)
            .map(|form| dom::form_data(self.page.doc(), form))
            .unwrap_or_default()
    }
}
