//! # formset
//!
//! Client-side behavior for repeatable form groups ("formsets"):
//!
//! - [`Repeater`]: an add trigger that instantiates a `<template>` into a
//!   container, numbering the new entry from the form's counter field
//! - [`Remover`]: a delete button that checks an entry's delete flag and fades
//!   the entry out without removing it from the form
//! - [`PriorityList`]: drag reordering that rewrites every row's priority and
//!   sets a dropped row's active flag from the list it landed in
//! - [`Mirror`]: read-only text that follows a field's value
//!
//! All behavior hangs off markup attributes and classes described by
//! [`FormsetConfig`]. [`init_page`] wires a whole [`runtime_events::Page`] and
//! returns the components it created.
//!
//! ```
//! use formset::{FormsetConfig, init_page};
//! use runtime_events::Page;
//! use std::rc::Rc;
//!
//! let mut page = Page::parse(
//!     r#"<template id="t"><div class="formset-entry" id="e-__prefix__"></div></template>
//!        <input id="total" value="0">
//!        <div id="rows"></div>
//!        <button id="add" data-formset-template="t" data-formset-counter="total"
//!                data-formset-container="rows">Add</button>"#,
//! );
//! let rules = Rc::new(FormsetConfig::default().compile()?);
//! let components = init_page(&mut page, &rules);
//! page.click(components.repeaters[0].trigger());
//! assert!(page.doc().get_element_by_id("e-0").is_some());
//! # Ok::<(), formset::ConfigError>(())
//! ```

mod config;
mod init;
mod mirror;
mod remover;
mod reorder;
mod repeater;

pub use config::{
    ConfigError, FormsetConfig, MirrorConfig, RankOrder, RemoverConfig, ReorderConfig,
    RepeaterConfig, Rules,
};
pub use init::{Components, init_page};
pub use mirror::Mirror;
pub use remover::Remover;
pub use reorder::{
    PriorityList, group_counter, handle_drop, list_active, rerank, rows, sync_placeholder,
};
pub use repeater::{Repeater, substitute_placeholder, template_root};
