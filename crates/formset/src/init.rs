use crate::config::Rules;
use crate::mirror::Mirror;
use crate::remover::Remover;
use crate::reorder::PriorityList;
use crate::repeater::Repeater;
use dom::{Document, NodeKey, Selector};
use runtime_events::Page;
use sortable::{DragError, DropEvent, Sortables};
use std::rc::Rc;

/// Everything wired on a page by [`init_page`].
#[derive(Default)]
pub struct Components {
    pub repeaters: Vec<Repeater>,
    pub removers: Vec<Remover>,
    pub lists: Vec<PriorityList>,
    pub mirrors: Vec<Mirror>,
    pub sortables: Sortables,
}

impl Components {
    /// Drag `row` into `to` at `index`, as a user would with the pointer.
    pub fn drag(
        &self,
        page: &mut Page,
        row: NodeKey,
        to: NodeKey,
        index: usize,
    ) -> Result<DropEvent, DragError> {
        self.sortables.drag(page, row, to, index)
    }

    pub fn list_for(&self, element: NodeKey) -> Option<&PriorityList> {
        self.lists.iter().find(|l| l.list() == element)
    }

    pub fn remover_for(&self, entry: NodeKey) -> Option<&Remover> {
        self.removers.iter().find(|r| r.entry() == entry)
    }
}

/// Wire every entry, add trigger, sortable list and mirror in the document.
/// Markup inside templates stays untouched until it is instantiated.
pub fn init_page(page: &mut Page, rules: &Rc<Rules>) -> Components {
    let root = page.doc().root();
    let mut components = Components::default();

    let wired = wire_subtree(page, rules, root);
    components.removers = wired.removers;
    components.repeaters = wired.repeaters;
    components.mirrors = wired.mirrors;

    for list in page.doc().query_selector_all(root, &rules.list) {
        if let Some(list) = PriorityList::attach(page, &mut components.sortables, rules, list) {
            components.lists.push(list);
        }
    }

    log::debug!(
        target: "formset",
        "page wired: {} repeaters, {} removers, {} lists, {} mirrors",
        components.repeaters.len(),
        components.removers.len(),
        components.lists.len(),
        components.mirrors.len()
    );
    components
}

#[derive(Default)]
pub(crate) struct Wired {
    pub(crate) repeaters: Vec<Repeater>,
    pub(crate) removers: Vec<Remover>,
    pub(crate) mirrors: Vec<Mirror>,
}

/// Attach removers, repeaters and mirrors on `root` and everything under it.
/// `root` may still be detached: references resolve inside it first.
pub(crate) fn wire_subtree(page: &mut Page, rules: &Rc<Rules>, root: NodeKey) -> Wired {
    let scope = (root != page.doc().root()).then_some(root);
    let mut wired = Wired::default();

    for entry in inclusive_matches(page.doc(), root, &rules.entry) {
        if let Some(remover) = Remover::attach(page, rules, entry) {
            wired.removers.push(remover);
        }
    }
    for trigger in inclusive_matches(page.doc(), root, &rules.trigger) {
        if let Some(repeater) = Repeater::attach(page, rules, trigger, scope) {
            wired.repeaters.push(repeater);
        }
    }
    for element in inclusive_matches(page.doc(), root, &rules.mirror) {
        if let Some(mirror) = Mirror::attach(page, rules, element, scope) {
            wired.mirrors.push(mirror);
        }
    }
    wired
}

fn inclusive_matches(doc: &Document, root: NodeKey, selector: &Selector) -> Vec<NodeKey> {
    let mut out = Vec::new();
    if selector.matches(doc, root) {
        out.push(root);
    }
    out.extend(doc.query_selector_all(root, selector));
    out
}

/// Element with id `id`, searched in `scope` first and then in the document.
pub(crate) fn find_reference(doc: &Document, scope: Option<NodeKey>, id: &str) -> Option<NodeKey> {
    scope
        .and_then(|scope| doc.find_by_id_within(scope, id))
        .or_else(|| doc.get_element_by_id(id))
}
