use crate::config::Rules;
use crate::init::{find_reference, wire_subtree};
use dom::{Document, DomError, NodeKey};
use runtime_events::{EventType, Page};
use std::rc::Rc;

const ROLE: &str = "repeater";

/// An "add another" trigger bound to its template, counter and container.
#[derive(Clone)]
pub struct Repeater {
    trigger: NodeKey,
    template: NodeKey,
    counter: NodeKey,
    container: NodeKey,
    rules: Rc<Rules>,
}

impl std::fmt::Debug for Repeater {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Repeater")
            .field("trigger", &self.trigger)
            .field("template", &self.template)
            .field("counter", &self.counter)
            .field("container", &self.container)
            .finish()
    }
}

impl Repeater {
    /// Bind `trigger` and start listening for clicks on it.
    ///
    /// References are looked up inside `scope` first (a freshly cloned entry
    /// that is not in the document yet), then in the whole document. Returns
    /// `None` when a reference is missing, the template does not have exactly
    /// one root element, or the trigger is already bound.
    pub fn attach(
        page: &mut Page,
        rules: &Rc<Rules>,
        trigger: NodeKey,
        scope: Option<NodeKey>,
    ) -> Option<Repeater> {
        let repeater = Self::resolve(page.doc(), rules, trigger, scope)?;
        if !page.mark_wired(trigger, ROLE) {
            log::debug!(target: "formset.repeater", "trigger {trigger} already bound");
            return None;
        }
        let on_click = repeater.clone();
        page.add_listener(trigger, EventType::Click, move |page, _| {
            on_click.add_entry(page);
        });
        log::debug!(
            target: "formset.repeater",
            "trigger {trigger}: template {} counter {} container {}",
            repeater.template,
            repeater.counter,
            repeater.container
        );
        Some(repeater)
    }

    fn resolve(
        doc: &Document,
        rules: &Rc<Rules>,
        trigger: NodeKey,
        scope: Option<NodeKey>,
    ) -> Option<Repeater> {
        let config = rules.repeater();
        let reference = |attr: &str| {
            let found = doc
                .attr(trigger, attr)
                .and_then(|id| find_reference(doc, scope, id));
            if found.is_none() {
                log::debug!(target: "formset.repeater", "trigger {trigger}: unresolved {attr}");
            }
            found
        };
        let template = reference(config.template_attr.as_str())?;
        let counter = reference(config.counter_attr.as_str())?;
        let container = reference(config.container_attr.as_str())?;
        if !doc.is_template(template) {
            log::debug!(target: "formset.repeater", "trigger {trigger}: {template} is not a <template>");
            return None;
        }
        template_root(doc, template)?;
        Some(Repeater {
            trigger,
            template,
            counter,
            container,
            rules: Rc::clone(rules),
        })
    }

    pub fn trigger(&self) -> NodeKey {
        self.trigger
    }

    pub fn template(&self) -> NodeKey {
        self.template
    }

    pub fn counter(&self) -> NodeKey {
        self.counter
    }

    pub fn container(&self) -> NodeKey {
        self.container
    }

    /// What a click on the trigger does. Returns the new entry, or `None` when
    /// the counter does not hold a non-negative integer.
    pub fn add_entry(&self, page: &mut Page) -> Option<NodeKey> {
        let raw = page.doc().value(self.counter);
        let Ok(index) = raw.trim().parse::<u64>() else {
            log::warn!(
                target: "formset.repeater",
                "counter {} holds {raw:?}, not an entry count",
                self.counter
            );
            return None;
        };
        match self.instantiate(page, index) {
            Ok(entry) => Some(entry),
            Err(err) => {
                log::warn!(target: "formset.repeater", "adding entry {index} failed: {err}");
                None
            }
        }
    }

    fn instantiate(&self, page: &mut Page, index: u64) -> Result<NodeKey, DomError> {
        let root = template_root(page.doc(), self.template).ok_or(DomError::NotAnElement(self.template))?;
        let doc = page.doc_mut();
        let entry = doc.deep_clone(root)?;
        let rewritten =
            substitute_placeholder(doc, entry, self.rules.placeholder(), &index.to_string())?;
        let entering = self.rules.repeater().entering_class.clone();
        if !entering.is_empty() {
            doc.add_class(entry, &entering)?;
        }
        log::trace!(
            target: "formset.repeater",
            "entry {index}: cloned {root} as {entry}, {rewritten} attributes rewritten"
        );

        wire_subtree(page, &self.rules, entry);
        page.doc_mut().append_child(self.container, entry)?;
        // Counted only once the entry is in place.
        page.set_value_and_notify(self.counter, &(index + 1).to_string())?;

        if !entering.is_empty() {
            page.request_animation_frame(move |page| {
                page.request_animation_frame(move |page| {
                    if let Err(err) = page.remove_class(entry, &entering) {
                        log::warn!(target: "formset.repeater", "reveal of {entry} failed: {err}");
                    }
                });
            });
        }
        Ok(entry)
    }
}

/// The single element a template instantiates. Whitespace text and comments
/// are ignored; anything else besides one element makes the template unusable.
pub fn template_root(doc: &Document, template: NodeKey) -> Option<NodeKey> {
    let mut meaningful = doc.template_contents(template).iter().copied().filter(|k| {
        doc.is_element(*k) || !doc.text_content(*k).trim().is_empty()
    });
    let root = meaningful.next();
    let extra = meaningful.next();
    match (root, extra) {
        (Some(root), None) if doc.is_element(root) => Some(root),
        _ => {
            log::debug!(
                target: "formset.repeater",
                "template {template} needs exactly one root element"
            );
            None
        }
    }
}

/// Replace every occurrence of `placeholder` with `value` in every attribute
/// value of `root` and its descendants. Contents of nested templates are left
/// alone; the nested template element itself is rewritten. Returns the number
/// of attributes changed.
pub fn substitute_placeholder(
    doc: &mut Document,
    root: NodeKey,
    placeholder: &str,
    value: &str,
) -> Result<usize, DomError> {
    if placeholder.is_empty() {
        return Ok(0);
    }
    let nodes: Vec<NodeKey> = std::iter::once(root)
        .chain(doc.descendants(root))
        .filter(|k| doc.is_element(*k))
        .collect();
    let mut changed = 0;
    for key in nodes {
        let updates: Vec<(String, String)> = doc
            .attributes(key)
            .iter()
            .filter_map(|(name, v)| {
                let v = v.as_deref()?;
                v.contains(placeholder)
                    .then(|| (name.clone(), v.replace(placeholder, value)))
            })
            .collect();
        for (name, new_value) in updates {
            doc.set_attr(key, &name, &new_value)?;
            changed += 1;
        }
    }
    Ok(changed)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::FormsetConfig;

    fn rules() -> Rc<Rules> {
        Rc::new(FormsetConfig::default().compile().unwrap())
    }

    #[test]
    fn substitution_is_total_and_exact() {
        let mut doc = Document::parse(
            r#"<div id="e" data-x="__prefix__-__prefix__">
                 <label for="id_f-__prefix__-name">Name</label>
                 <input id="id_f-__prefix__-name" name="f-__prefix__-name" value="__prefix__x">
                 <input name="f-__prefix___other" disabled>
               </div>"#,
        );
        let root = doc.get_element_by_id("e").unwrap();
        let changed = substitute_placeholder(&mut doc, root, "__prefix__", "3").unwrap();
        assert_eq!(changed, 6);
        assert_eq!(doc.attr(root, "data-x"), Some("3-3"));
        let input = doc.get_element_by_id("id_f-3-name").unwrap();
        assert_eq!(doc.attr(input, "name"), Some("f-3-name"));
        assert_eq!(doc.attr(input, "value"), Some("3x"));
        let outline = doc.outline(root);
        assert!(!outline.contains("__prefix__"), "{outline}");
        assert!(outline.contains("f-3_other"));
    }

    #[test]
    fn nested_template_contents_stay_inert() {
        let mut doc = Document::parse(
            r#"<div id="e"><template id="t-__prefix__"><p data-n="__prefix__"></p></template></div>"#,
        );
        let root = doc.get_element_by_id("e").unwrap();
        substitute_placeholder(&mut doc, root, "__prefix__", "0").unwrap();
        let nested = doc.get_element_by_id("t-0").unwrap();
        let inner = doc.template_contents(nested)[0];
        assert_eq!(doc.attr(inner, "data-n"), Some("__prefix__"));
    }

    #[test]
    fn template_root_requires_exactly_one_element() {
        let doc = Document::parse(
            r#"<template id="one">
                 <!-- entry -->
                 <div></div>
               </template>
               <template id="two"><div></div><div></div></template>
               <template id="text">loose <div></div></template>
               <template id="empty">  </template>"#,
        );
        let key = |id| doc.get_element_by_id(id).unwrap();
        assert!(template_root(&doc, key("one")).is_some());
        assert!(template_root(&doc, key("two")).is_none());
        assert!(template_root(&doc, key("text")).is_none());
        assert!(template_root(&doc, key("empty")).is_none());
    }

    #[test]
    fn attach_requires_every_reference() {
        let mut page = Page::parse(
            r#"<template id="t"><div></div></template>
               <input id="c" value="0">
               <button id="ok" data-formset-template="t" data-formset-counter="c" data-formset-container="box"></button>
               <button id="missing" data-formset-template="t" data-formset-counter="nope" data-formset-container="box"></button>
               <div id="box"></div>"#,
        );
        let rules = rules();
        let ok = page.doc().get_element_by_id("ok").unwrap();
        let missing = page.doc().get_element_by_id("missing").unwrap();
        assert!(Repeater::attach(&mut page, &rules, missing, None).is_none());
        assert_eq!(page.listener_count(missing, EventType::Click), 0);
        assert!(Repeater::attach(&mut page, &rules, ok, None).is_some());
        assert!(Repeater::attach(&mut page, &rules, ok, None).is_none());
        assert_eq!(page.listener_count(ok, EventType::Click), 1);
    }

    #[test]
    fn non_numeric_counter_makes_click_a_no_op() {
        let mut page = Page::parse(
            r#"<template id="t"><div class="row"></div></template>
               <input id="c" value="abc">
               <button id="add" data-formset-template="t" data-formset-counter="c" data-formset-container="box"></button>
               <div id="box"></div>"#,
        );
        let add = page.doc().get_element_by_id("add").unwrap();
        let repeater = Repeater::attach(&mut page, &rules(), add, None).unwrap();
        page.click(add);
        assert!(page.doc().children(repeater.container()).is_empty());
        assert_eq!(page.doc().value(repeater.counter()), "abc");
    }

    #[test]
    fn counter_change_sees_the_inserted_entry() {
        let mut page = Page::parse(
            r#"<template id="t"><div class="row" id="row-__prefix__"></div></template>
               <input id="c" value="2">
               <button id="add" data-formset-template="t" data-formset-counter="c" data-formset-container="box"></button>
               <div id="box"></div>"#,
        );
        let add = page.doc().get_element_by_id("add").unwrap();
        let repeater = Repeater::attach(&mut page, &rules(), add, None).unwrap();
        let seen = Rc::new(std::cell::RefCell::new(Vec::new()));
        let log = Rc::clone(&seen);
        let container = repeater.container();
        page.add_listener(repeater.counter(), EventType::Change, move |page, event| {
            log.borrow_mut().push((
                page.doc().value(event.target),
                page.doc().element_children(container).len(),
            ));
        });
        page.click(add);
        page.click(add);
        assert_eq!(*seen.borrow(), [("3".to_string(), 1), ("4".to_string(), 2)]);
        assert!(page.doc().get_element_by_id("row-3").is_some());
    }

    #[test]
    fn entering_class_is_removed_after_two_frames() {
        let mut page = Page::parse(
            r#"<template id="t"><div class="row"></div></template>
               <input id="c" value="0">
               <button id="add" data-formset-template="t" data-formset-counter="c" data-formset-container="box"></button>
               <div id="box"></div>"#,
        );
        let add = page.doc().get_element_by_id("add").unwrap();
        let repeater = Repeater::attach(&mut page, &rules(), add, None).unwrap();
        let entry = repeater.add_entry(&mut page).unwrap();
        assert!(page.doc().is_connected(entry));
        assert!(page.doc().has_class(entry, "formset-entering"));
        page.run_animation_frame();
        assert!(page.doc().has_class(entry, "formset-entering"));
        page.run_animation_frame();
        assert!(!page.doc().has_class(entry, "formset-entering"));
        assert!(page.doc().has_class(entry, "row"));
    }
}
