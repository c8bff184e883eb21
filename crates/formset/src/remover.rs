use crate::config::Rules;
use dom::{Document, DomError, NodeKey};
use runtime_events::{EventType, Page};
use std::rc::Rc;

const ROLE: &str = "remover";

/// Delete affordance for one entry.
///
/// The entry is never taken out of the document: its delete flag is checked
/// so the server drops the record, and the entry is animated out of view with
/// the "deleting" class, then hidden with the "deleted" class once the
/// transition ends.
#[derive(Clone)]
pub struct Remover {
    entry: NodeKey,
    flag: NodeKey,
    label: Option<NodeKey>,
    affordance: NodeKey,
    rules: Rc<Rules>,
}

impl std::fmt::Debug for Remover {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Remover")
            .field("entry", &self.entry)
            .field("flag", &self.flag)
            .field("label", &self.label)
            .field("affordance", &self.affordance)
            .finish()
    }
}

impl Remover {
    /// Returns `None` when the entry has no delete flag or is already wired.
    pub fn attach(page: &mut Page, rules: &Rc<Rules>, entry: NodeKey) -> Option<Remover> {
        if page.is_wired(entry, ROLE) {
            log::debug!(target: "formset.remover", "entry {entry} already wired");
            return None;
        }
        let Some(flag) = find_flag(page.doc(), rules, entry) else {
            log::debug!(target: "formset.remover", "entry {entry} has no delete flag");
            return None;
        };
        match Self::build(page, rules, entry, flag) {
            Ok(remover) => {
                page.mark_wired(entry, ROLE);
                remover.listen(page);
                Some(remover)
            }
            Err(err) => {
                log::warn!(target: "formset.remover", "wiring entry {entry} failed: {err}");
                None
            }
        }
    }

    fn build(
        page: &mut Page,
        rules: &Rc<Rules>,
        entry: NodeKey,
        flag: NodeKey,
    ) -> Result<Remover, DomError> {
        let config = rules.remover();
        let doc = page.doc_mut();
        let label = find_label(doc, entry, flag);
        // A label wrapping the flag gets hidden too, so the button goes before it.
        let anchor = label.filter(|l| doc.contains(*l, flag)).unwrap_or(flag);
        let parent = doc.parent(anchor).ok_or(DomError::UnknownNode(anchor))?;

        let existing = doc
            .previous_element_sibling(anchor)
            .filter(|b| doc.name(*b) == Some("button") && doc.has_class(*b, &config.button_class));
        let affordance = match existing {
            Some(button) => button,
            None => {
                let button = doc.create_element(
                    "button",
                    &[("type", "button"), ("class", config.button_class.as_str())],
                );
                doc.set_text_content(button, &config.button_label)?;
                doc.insert_before(parent, button, anchor)?;
                button
            }
        };

        doc.set_hidden(flag, true)?;
        if let Some(label) = label {
            doc.set_hidden(label, true)?;
        }
        // Re-rendered after a failed submit with the flag still set.
        if doc.checked(flag) {
            doc.add_class(entry, &config.deleting_class)?;
            doc.add_class(entry, &config.deleted_class)?;
        }
        log::debug!(
            target: "formset.remover",
            "entry {entry}: flag {flag}, affordance {affordance}"
        );
        Ok(Remover {
            entry,
            flag,
            label,
            affordance,
            rules: Rc::clone(rules),
        })
    }

    fn listen(&self, page: &mut Page) {
        let on_click = self.clone();
        page.add_listener(self.affordance, EventType::Click, move |page, _| {
            on_click.delete(page);
        });
        let entry = self.entry;
        let rules = Rc::clone(&self.rules);
        page.add_listener(entry, EventType::TransitionEnd, move |page, event| {
            let config = rules.remover();
            // Only the fade-out counts; a reveal ending mid-delete does not.
            if !event.is_transition_of(&config.deleting_class)
                || !page.doc().has_class(entry, &config.deleting_class)
            {
                return;
            }
            log::trace!(target: "formset.remover", "entry {entry} faded out");
            if let Err(err) = page.add_class(entry, &config.deleted_class) {
                log::warn!(target: "formset.remover", "hiding {entry} failed: {err}");
            }
        });
    }

    pub fn entry(&self) -> NodeKey {
        self.entry
    }

    pub fn flag(&self) -> NodeKey {
        self.flag
    }

    pub fn label(&self) -> Option<NodeKey> {
        self.label
    }

    pub fn affordance(&self) -> NodeKey {
        self.affordance
    }

    /// What a click on the affordance does. A second call while the entry
    /// is already deleting does nothing.
    pub fn delete(&self, page: &mut Page) {
        let config = self.rules.remover();
        if page.doc().has_class(self.entry, &config.deleting_class) {
            log::trace!(target: "formset.remover", "entry {} already deleting", self.entry);
            return;
        }
        log::debug!(target: "formset.remover", "deleting entry {}", self.entry);
        let result = page
            .set_checked_and_notify(self.flag, true)
            .and_then(|()| page.add_class(self.entry, &config.deleting_class));
        if let Err(err) = result {
            log::warn!(target: "formset.remover", "deleting {} failed: {err}", self.entry);
        }
    }
}

/// The entry's own delete flag: the first match with no other entry between
/// it and `entry`, so nested entries keep their flags.
fn find_flag(doc: &Document, rules: &Rules, entry: NodeKey) -> Option<NodeKey> {
    doc.query_selector_all(entry, &rules.flag)
        .into_iter()
        .find(|flag| {
            !doc.ancestors(*flag)
                .take_while(|a| *a != entry)
                .any(|a| rules.entry.matches(doc, a))
        })
}

/// `label[for=<flag id>]` inside the entry, else a `<label>` wrapping the flag.
fn find_label(doc: &Document, entry: NodeKey, flag: NodeKey) -> Option<NodeKey> {
    let by_for = doc
        .attr(flag, "id")
        .filter(|id| !id.is_empty())
        .and_then(|id| {
            doc.descendants(entry)
                .into_iter()
                .find(|k| doc.name(*k) == Some("label") && doc.attr(*k, "for") == Some(id))
        });
    by_for.or_else(|| {
        doc.ancestors(flag)
            .take_while(|a| *a != entry)
            .find(|a| doc.name(*a) == Some("label"))
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::FormsetConfig;
    use runtime_events::TransitionRules;

    const ENTRY: &str = r#"
        <div id="e" class="formset-entry">
          <input name="f-0-name">
          <p class="delete-field">
            <label for="id_f-0-DELETE">Delete</label>
            <input type="checkbox" id="id_f-0-DELETE" name="f-0-DELETE">
          </p>
        </div>"#;

    fn rules() -> Rc<Rules> {
        Rc::new(FormsetConfig::default().compile().unwrap())
    }

    fn page(markup: &str) -> (Page, NodeKey) {
        let doc = Document::parse(markup);
        let entry = doc.get_element_by_id("e").unwrap();
        let transitions = TransitionRules::new().with("formset-deleting", 300);
        (Page::with_transitions(doc, transitions), entry)
    }

    #[test]
    fn hides_flag_and_label_and_adds_button_before_flag() {
        let (mut page, entry) = page(ENTRY);
        let remover = Remover::attach(&mut page, &rules(), entry).unwrap();
        let doc = page.doc();
        assert!(doc.is_hidden(remover.flag()));
        assert!(doc.is_hidden(remover.label().unwrap()));
        assert_eq!(doc.previous_element_sibling(remover.flag()), Some(remover.affordance()));
        assert_eq!(doc.attr(remover.affordance(), "type"), Some("button"));
        assert_eq!(doc.text_content(remover.affordance()), "Delete");
    }

    #[test]
    fn reattaching_keeps_one_affordance_and_one_listener() {
        let (mut page, entry) = page(ENTRY);
        let rules = rules();
        let remover = Remover::attach(&mut page, &rules, entry).unwrap();
        assert!(Remover::attach(&mut page, &rules, entry).is_none());
        let buttons = page
            .doc()
            .descendants(entry)
            .into_iter()
            .filter(|k| page.doc().name(*k) == Some("button"))
            .count();
        assert_eq!(buttons, 1);
        assert_eq!(page.listener_count(remover.affordance(), EventType::Click), 1);
    }

    #[test]
    fn click_checks_flag_then_hides_after_transition() {
        let (mut page, entry) = page(ENTRY);
        let remover = Remover::attach(&mut page, &rules(), entry).unwrap();
        page.click(remover.affordance());
        assert!(page.doc().checked(remover.flag()));
        assert!(page.doc().has_class(entry, "formset-deleting"));
        assert!(!page.doc().has_class(entry, "formset-deleted"));
        page.advance(300);
        assert!(page.doc().has_class(entry, "formset-deleted"));
        assert!(page.doc().is_connected(entry));
    }

    #[test]
    fn other_transitions_ending_mid_fade_do_not_hide() {
        let doc = Document::parse(ENTRY);
        let entry = doc.get_element_by_id("e").unwrap();
        let transitions = TransitionRules::new()
            .with("formset-deleting", 300)
            .with("formset-entering", 100);
        let mut page = Page::with_transitions(doc, transitions);
        let remover = Remover::attach(&mut page, &rules(), entry).unwrap();
        page.doc_mut().add_class(entry, "formset-entering").unwrap();

        remover.delete(&mut page);
        page.remove_class(entry, "formset-entering").unwrap();
        page.advance(100);
        assert!(!page.doc().has_class(entry, "formset-deleted"));
        page.advance(200);
        assert!(page.doc().has_class(entry, "formset-deleted"));
    }

    #[test]
    fn without_transitionend_entry_stays_faded() {
        let doc = Document::parse(ENTRY);
        let entry = doc.get_element_by_id("e").unwrap();
        let mut page = Page::new(doc);
        let remover = Remover::attach(&mut page, &rules(), entry).unwrap();
        remover.delete(&mut page);
        page.run_until_idle();
        assert!(page.doc().has_class(entry, "formset-deleting"));
        assert!(!page.doc().has_class(entry, "formset-deleted"));
    }

    #[test]
    fn second_click_is_ignored() {
        let (mut page, entry) = page(ENTRY);
        let remover = Remover::attach(&mut page, &rules(), entry).unwrap();
        let changes = Rc::new(std::cell::Cell::new(0));
        let seen = Rc::clone(&changes);
        page.add_listener(remover.flag(), EventType::Change, move |_, _| seen.set(seen.get() + 1));
        page.click(remover.affordance());
        page.click(remover.affordance());
        assert_eq!(changes.get(), 1);
        assert_eq!(page.pending_timers(), 1);
    }

    #[test]
    fn entry_without_flag_is_left_alone() {
        let (mut page, entry) = page(r#"<div id="e" class="formset-entry"><input name="x"></div>"#);
        assert!(Remover::attach(&mut page, &rules(), entry).is_none());
        assert!(page.doc().descendants(entry).len() == 1);
        assert!(!page.is_wired(entry, ROLE));
    }

    #[test]
    fn wrapping_label_gets_the_button_in_front() {
        let (mut page, entry) = page(
            r#"<div id="e" class="formset-entry"><span class="delete-field"><label id="l"><input type="checkbox" name="f-0-DELETE"> Delete</label></span></div>"#,
        );
        let remover = Remover::attach(&mut page, &rules(), entry).unwrap();
        let label = page.doc().get_element_by_id("l").unwrap();
        assert_eq!(remover.label(), Some(label));
        assert_eq!(page.doc().previous_element_sibling(label), Some(remover.affordance()));
        assert!(!page.doc().is_hidden(remover.affordance()));
    }

    #[test]
    fn nested_entry_flag_is_not_taken() {
        let (mut page, entry) = page(
            r#"<div id="e" class="formset-entry">
                 <div class="formset-entry"><p class="delete-field"><input type="checkbox" id="inner"></p></div>
                 <p class="delete-field"><input type="checkbox" id="outer"></p>
               </div>"#,
        );
        let remover = Remover::attach(&mut page, &rules(), entry).unwrap();
        assert_eq!(page.doc().attr(remover.flag(), "id"), Some("outer"));
    }

    #[test]
    fn checked_flag_starts_hidden() {
        let (mut page, entry) = page(
            r#"<div id="e" class="formset-entry"><p class="delete-field"><input type="checkbox" checked></p></div>"#,
        );
        Remover::attach(&mut page, &rules(), entry).unwrap();
        assert!(page.doc().has_class(entry, "formset-deleted"));
    }
}
