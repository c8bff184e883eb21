use crate::error::DragError;
use dom::{Document, InputControlType, NodeKey, Selector, input_control_type};
use runtime_events::Page;
use std::rc::Rc;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct SortableId(usize);

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct SortableOptions {
    /// Lists share items only within the same group.
    pub group: String,
    /// Children that can be dragged; `None` means every element child.
    pub draggable: Option<Selector>,
    /// Children that never move and are skipped when computing indices.
    pub filter: Option<Selector>,
}

impl SortableOptions {
    pub fn new(group: impl Into<String>) -> Self {
        Self {
            group: group.into(),
            draggable: None,
            filter: None,
        }
    }

    pub fn with_filter(mut self, filter: Selector) -> Self {
        self.filter = Some(filter);
        self
    }

    pub fn with_draggable(mut self, draggable: Selector) -> Self {
        self.draggable = Some(draggable);
        self
    }
}

/// Payload of the end-of-drop callback. Indices count draggable items only.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct DropEvent {
    pub item: NodeKey,
    pub from: NodeKey,
    pub to: NodeKey,
    pub old_index: usize,
    pub new_index: usize,
}

impl DropEvent {
    pub fn changed_list(&self) -> bool {
        self.from != self.to
    }
}

pub type DropHandler = Rc<dyn Fn(&mut Page, &DropEvent)>;

struct SortableList {
    element: NodeKey,
    options: SortableOptions,
    on_end: Vec<DropHandler>,
}

/// Every sortable list on a page.
#[derive(Default)]
pub struct Sortables {
    lists: Vec<SortableList>,
}

impl Sortables {
    pub fn new() -> Self {
        Self::default()
    }

    /// Make `element`'s children sortable. Registering the same element again
    /// returns the existing id and leaves its options untouched.
    pub fn create(&mut self, element: NodeKey, options: SortableOptions) -> SortableId {
        if let Some(id) = self.find(element) {
            log::debug!(target: "sortable", "{element} is already sortable");
            return id;
        }
        log::debug!(target: "sortable", "sortable list {element} in group {:?}", options.group);
        self.lists.push(SortableList {
            element,
            options,
            on_end: Vec::new(),
        });
        SortableId(self.lists.len() - 1)
    }

    pub fn find(&self, element: NodeKey) -> Option<SortableId> {
        self.lists
            .iter()
            .position(|l| l.element == element)
            .map(SortableId)
    }

    pub fn element(&self, id: SortableId) -> Option<NodeKey> {
        self.lists.get(id.0).map(|l| l.element)
    }

    pub fn options(&self, id: SortableId) -> Option<&SortableOptions> {
        self.lists.get(id.0).map(|l| &l.options)
    }

    pub fn len(&self) -> usize {
        self.lists.len()
    }

    pub fn is_empty(&self) -> bool {
        self.lists.is_empty()
    }

    /// Register a callback run once a drop that started in this list lands.
    pub fn on_end<F>(&mut self, id: SortableId, handler: F)
    where
        F: Fn(&mut Page, &DropEvent) + 'static,
    {
        if let Some(list) = self.lists.get_mut(id.0) {
            list.on_end.push(Rc::new(handler));
        }
    }

    /// Draggable children of a list, in document order.
    pub fn items(&self, doc: &Document, id: SortableId) -> Vec<NodeKey> {
        match self.lists.get(id.0) {
            Some(list) => draggable_items(doc, list),
            None => Vec::new(),
        }
    }

    /// Drag `item` and drop it into list `to` at `new_index` among that list's
    /// draggable items (the item itself not counted). Indices past the end
    /// append.
    pub fn drag(
        &self,
        page: &mut Page,
        item: NodeKey,
        to: NodeKey,
        new_index: usize,
    ) -> Result<DropEvent, DragError> {
        let from = page.doc().parent(item).ok_or(DragError::NotSortable(item))?;
        let source = self
            .list_for(from)
            .ok_or(DragError::NotSortable(item))?;
        let target = self.list_for(to).ok_or(DragError::UnknownList(to))?;
        if source.options.group != target.options.group {
            return Err(DragError::GroupMismatch {
                from: source.options.group.clone(),
                to: target.options.group.clone(),
            });
        }
        if !is_draggable(page.doc(), source, item) {
            return Err(DragError::NotDraggable(item));
        }

        let old_index = draggable_items(page.doc(), source)
            .iter()
            .position(|k| *k == item)
            .ok_or(DragError::NotDraggable(item))?;
        let snapshot = capture_checked(page.doc(), item);

        let siblings: Vec<NodeKey> = draggable_items(page.doc(), target)
            .into_iter()
            .filter(|k| *k != item)
            .collect();
        let new_index = new_index.min(siblings.len());
        let doc = page.doc_mut();
        match (siblings.get(new_index), siblings.last()) {
            (Some(&before), _) => doc.insert_before(to, item, before)?,
            (None, Some(&last)) => doc.insert_after(to, item, last)?,
            (None, None) => doc.append_child(to, item)?,
        }

        let event = DropEvent {
            item,
            from,
            to,
            old_index,
            new_index,
        };
        log::trace!(
            target: "sortable",
            "drop {item}: {from}[{old_index}] -> {to}[{new_index}]"
        );
        for handler in &source.on_end {
            handler(page, &event);
        }

        restore_checked(page.doc_mut(), &snapshot)?;
        Ok(event)
    }

    fn list_for(&self, element: NodeKey) -> Option<&SortableList> {
        self.lists.iter().find(|l| l.element == element)
    }
}

fn is_draggable(doc: &Document, list: &SortableList, key: NodeKey) -> bool {
    doc.is_element(key)
        && list.options.draggable.as_ref().is_none_or(|s| s.matches(doc, key))
        && !list.options.filter.as_ref().is_some_and(|s| s.matches(doc, key))
}

fn draggable_items(doc: &Document, list: &SortableList) -> Vec<NodeKey> {
    doc.element_children(list.element)
        .into_iter()
        .filter(|k| is_draggable(doc, list, *k))
        .collect()
}

/// Checkedness of every checkbox and radio inside `item`, taken at drag start.
fn capture_checked(doc: &Document, item: NodeKey) -> Vec<(NodeKey, bool)> {
    std::iter::once(item)
        .chain(doc.descendants(item))
        .filter(|k| {
            matches!(
                input_control_type(doc, *k),
                InputControlType::Checkbox | InputControlType::Radio
            )
        })
        .map(|k| (k, doc.checked(k)))
        .collect()
}

fn restore_checked(doc: &mut Document, snapshot: &[(NodeKey, bool)]) -> Result<(), DragError> {
    for &(key, checked) in snapshot {
        if doc.set_checked(key, checked)? {
            log::trace!(target: "sortable", "restored {key} checked={checked}");
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::RefCell;

    const LISTS: &str = r#"
        <ul id="a" data-group="g">
          <li id="a0"><input type="checkbox" id="a0c"></li>
          <li id="a1"></li>
          <li id="a2"></li>
        </ul>
        <ul id="b">
          <li id="empty" class="sortable-empty"></li>
        </ul>
        <ul id="c"><li id="c0"></li></ul>
    "#;

    fn setup() -> (Page, Sortables, [NodeKey; 3]) {
        let page = Page::parse(LISTS);
        let lists = ["a", "b", "c"].map(|id| page.doc().get_element_by_id(id).unwrap());
        let mut sortables = Sortables::new();
        let filter = Selector::parse(".sortable-empty").unwrap();
        sortables.create(lists[0], SortableOptions::new("g").with_filter(filter.clone()));
        sortables.create(lists[1], SortableOptions::new("g").with_filter(filter));
        sortables.create(lists[2], SortableOptions::new("other"));
        (page, sortables, lists)
    }

    fn key(page: &Page, id: &str) -> NodeKey {
        page.doc().get_element_by_id(id).unwrap()
    }

    #[test]
    fn reorders_within_a_list() {
        let (mut page, sortables, [a, _, _]) = setup();
        let a2 = key(&page, "a2");
        let event = sortables.drag(&mut page, a2, a, 0).unwrap();
        assert_eq!((event.old_index, event.new_index), (2, 0));
        assert!(!event.changed_list());
        let id = sortables.find(a).unwrap();
        let order: Vec<_> = sortables
            .items(page.doc(), id)
            .into_iter()
            .map(|k| page.doc().attr(k, "id").unwrap().to_string())
            .collect();
        assert_eq!(order, ["a2", "a0", "a1"]);
    }

    #[test]
    fn moves_between_lists_of_one_group_past_the_placeholder() {
        let (mut page, sortables, [a, b, _]) = setup();
        let a1 = key(&page, "a1");
        let event = sortables.drag(&mut page, a1, b, 5).unwrap();
        assert_eq!(event.new_index, 0);
        assert_eq!(event.from, a);
        assert_eq!(page.doc().parent(a1), Some(b));
        assert_eq!(page.doc().previous_element_sibling(a1), Some(key(&page, "empty")));
    }

    #[test]
    fn rejects_group_mismatch_and_filtered_items() {
        let (mut page, sortables, [a, b, c]) = setup();
        let a0 = key(&page, "a0");
        assert_eq!(
            sortables.drag(&mut page, a0, c, 0),
            Err(DragError::GroupMismatch {
                from: "g".into(),
                to: "other".into()
            })
        );
        let empty = key(&page, "empty");
        assert_eq!(
            sortables.drag(&mut page, empty, a, 0),
            Err(DragError::NotDraggable(empty))
        );
        assert_eq!(sortables.drag(&mut page, a0, a0, 0), Err(DragError::UnknownList(a0)));
        assert_eq!(sortables.drag(&mut page, b, a, 0), Err(DragError::NotSortable(b)));
    }

    #[test]
    fn bookkeeping_overwrites_synchronous_checkbox_writes() {
        let (mut page, mut sortables, [a, b, _]) = setup();
        let a0c = key(&page, "a0c");
        let id = sortables.find(a).unwrap();
        sortables.on_end(id, move |page, _| {
            page.doc_mut().set_checked(a0c, true).unwrap();
        });
        let deferred = Rc::new(RefCell::new(Vec::new()));
        let seen = Rc::clone(&deferred);
        sortables.on_end(id, move |page, _| {
            let seen = Rc::clone(&seen);
            page.set_timeout(0, move |page| {
                seen.borrow_mut().push(page.doc().checked(a0c));
                page.doc_mut().set_checked(a0c, true).unwrap();
            });
        });

        let a0 = key(&page, "a0");
        sortables.drag(&mut page, a0, b, 0).unwrap();
        assert!(!page.doc().checked(a0c), "restored to its drag-start state");
        page.advance(0);
        assert_eq!(*deferred.borrow(), vec![false]);
        assert!(page.doc().checked(a0c));
    }

    #[test]
    fn draggable_selector_limits_what_moves_and_counts() {
        let mut page = Page::parse(
            r#"<ol id="l"><li id="h" class="heading"></li><li id="x" class="row"></li><li id="y" class="row"></li></ol>"#,
        );
        let list = key(&page, "l");
        let mut sortables = Sortables::new();
        let rows = Selector::parse(".row").unwrap();
        sortables.create(list, SortableOptions::new("g").with_draggable(rows));

        let heading = key(&page, "h");
        assert_eq!(
            sortables.drag(&mut page, heading, list, 1),
            Err(DragError::NotDraggable(heading))
        );
        let y = key(&page, "y");
        let event = sortables.drag(&mut page, y, list, 0).unwrap();
        assert_eq!((event.old_index, event.new_index), (1, 0));
        let id = sortables.find(list).unwrap();
        assert_eq!(sortables.items(page.doc(), id), [y, key(&page, "x")]);
    }

    #[test]
    fn create_is_idempotent() {
        let (_, mut sortables, [a, _, _]) = setup();
        let before = sortables.len();
        let id = sortables.create(a, SortableOptions::new("changed"));
        assert_eq!(sortables.len(), before);
        assert_eq!(sortables.options(id).unwrap().group, "g");
    }
}
