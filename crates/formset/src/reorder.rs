use crate::config::Rules;
use dom::{Document, NodeKey, Selector};
use runtime_events::Page;
use sortable::{DropEvent, SortableId, SortableOptions, Sortables};
use std::rc::Rc;

const ROLE: &str = "reorder";

/// A drag-sortable list whose rows carry a priority field and an active flag.
#[derive(Clone)]
pub struct PriorityList {
    list: NodeKey,
    sortable: SortableId,
    rules: Rc<Rules>,
}

impl std::fmt::Debug for PriorityList {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PriorityList")
            .field("list", &self.list)
            .field("sortable", &self.sortable)
            .finish()
    }
}

impl PriorityList {
    /// Make `list` sortable within the group named by its group attribute.
    /// The placeholder row is synced right away; priorities are left as
    /// rendered until the first drop.
    pub fn attach(
        page: &mut Page,
        sortables: &mut Sortables,
        rules: &Rc<Rules>,
        list: NodeKey,
    ) -> Option<PriorityList> {
        let config = rules.reorder();
        let group = page.doc().attr(list, &config.group_attr).unwrap_or("").to_string();
        if !page.mark_wired(list, ROLE) {
            log::debug!(target: "formset.reorder", "list {list} already sortable");
            return None;
        }
        let options = SortableOptions::new(group).with_filter(rules.placeholder_row.clone());
        let sortable = sortables.create(list, options);
        let on_drop = Rc::clone(rules);
        sortables.on_end(sortable, move |page, event| handle_drop(page, &on_drop, event));
        sync_placeholder(page, rules, list);
        log::debug!(target: "formset.reorder", "list {list} is sortable");
        Some(PriorityList {
            list,
            sortable,
            rules: Rc::clone(rules),
        })
    }

    pub fn list(&self) -> NodeKey {
        self.list
    }

    pub fn sortable(&self) -> SortableId {
        self.sortable
    }

    pub fn rows(&self, doc: &Document) -> Vec<NodeKey> {
        rows(doc, &self.rules, self.list)
    }

    /// Renumber every row now; see [`rerank`].
    pub fn rerank(&self, page: &mut Page) {
        rerank(page, &self.rules, self.list);
    }

    pub fn is_active(&self, doc: &Document) -> bool {
        list_active(doc, &self.rules, self.list)
    }
}

/// End-of-drop synchronization for a row that landed in `event.to`.
pub fn handle_drop(page: &mut Page, rules: &Rules, event: &DropEvent) {
    let config = rules.reorder();
    let active = list_active(page.doc(), rules, event.to);
    match row_field(page.doc(), rules, event.item, &rules.active_field) {
        Some(field) => {
            log::trace!(
                target: "formset.reorder",
                "row {} moved to {}: active={active} in {}ms",
                event.item,
                event.to,
                config.settle_delay_ms
            );
            // The drag library restores checkboxes after this callback returns.
            page.set_timeout(config.settle_delay_ms, move |page| {
                if let Err(err) = page.set_checked_and_notify(field, active) {
                    log::warn!(target: "formset.reorder", "active flag {field}: {err}");
                }
            });
        }
        None => log::debug!(target: "formset.reorder", "row {} has no active field", event.item),
    }

    rerank(page, rules, event.to);
    sync_placeholder(page, rules, event.to);
    if event.changed_list() {
        rerank(page, rules, event.from);
        sync_placeholder(page, rules, event.from);
        if rows(page.doc(), rules, event.from).is_empty() {
            log_emptied(page.doc(), rules, event);
        }
    }
}

/// Rows keep their field names across lists, so every formset still submits
/// the same number of forms and its counter is left as rendered.
fn log_emptied(doc: &Document, rules: &Rules, event: &DropEvent) {
    match group_counter(doc, rules, event.item) {
        Some(counter) => log::debug!(
            target: "formset.reorder",
            "list {} emptied; counter {counter} still covers row {} at {}",
            event.from,
            event.item,
            doc.value(counter)
        ),
        None => log::debug!(
            target: "formset.reorder",
            "list {} emptied; row {} names no counter",
            event.from,
            event.item
        ),
    }
}

/// The management counter of the formset `row` belongs to. The row's prefix
/// attribute reads `<group>-<index>`; the counter is the field named
/// `<group>-<counter suffix>` anywhere in the document.
pub fn group_counter(doc: &Document, rules: &Rules, row: NodeKey) -> Option<NodeKey> {
    let config = rules.reorder();
    let prefix = doc.attr(row, &config.prefix_attr)?;
    let (group, index) = prefix.rsplit_once('-')?;
    index.parse::<u64>().ok()?;
    let wanted = format!("{group}-{}", config.counter_suffix);
    doc.descendants(doc.root())
        .into_iter()
        .find(|k| doc.name(*k) == Some("input") && doc.attr(*k, "name") == Some(wanted.as_str()))
}

/// Rows of `list` in visual order, placeholder rows excluded.
pub fn rows(doc: &Document, rules: &Rules, list: NodeKey) -> Vec<NodeKey> {
    doc.element_children(list)
        .into_iter()
        .filter(|row| !rules.placeholder_row.matches(doc, *row))
        .collect()
}

/// Write each row's priority from its position and fire `change` on it.
/// Returns the priorities written, in row order.
pub fn rerank(page: &mut Page, rules: &Rules, list: NodeKey) -> Vec<u64> {
    let order = rules.reorder().order;
    let rows = rows(page.doc(), rules, list);
    let count = rows.len();
    let mut written = Vec::with_capacity(count);
    for (index, row) in rows.into_iter().enumerate() {
        let Some(field) = row_field(page.doc(), rules, row, &rules.priority_field) else {
            log::debug!(target: "formset.reorder", "row {row} has no priority field");
            continue;
        };
        let priority = order.rank(index, count);
        if let Err(err) = page.set_value_and_notify(field, &priority.to_string()) {
            log::warn!(target: "formset.reorder", "priority {field}: {err}");
            continue;
        }
        written.push(priority);
    }
    log::trace!(target: "formset.reorder", "list {list} ranked {written:?}");
    written
}

/// Placeholder rows are visible only while the list has no real rows.
pub fn sync_placeholder(page: &mut Page, rules: &Rules, list: NodeKey) {
    let empty = rows(page.doc(), rules, list).is_empty();
    let placeholders: Vec<NodeKey> = page
        .doc()
        .element_children(list)
        .into_iter()
        .filter(|row| rules.placeholder_row.matches(page.doc(), *row))
        .collect();
    for placeholder in placeholders {
        if let Err(err) = page.doc_mut().set_hidden(placeholder, !empty) {
            log::warn!(target: "formset.reorder", "placeholder {placeholder}: {err}");
        }
    }
}

/// The list's flag from the nearest ancestor carrying the active attribute.
/// Only a case-insensitive `"true"` counts as active.
pub fn list_active(doc: &Document, rules: &Rules, list: NodeKey) -> bool {
    let attr = &rules.reorder().active_attr;
    doc.closest_with_attr(list, attr)
        .and_then(|holder| doc.attr(holder, attr))
        .is_some_and(|v| v.trim().eq_ignore_ascii_case("true"))
}

/// A field of `row` matching `selector`. When the row declares its form
/// prefix, a field named under that prefix wins over other matches.
fn row_field(doc: &Document, rules: &Rules, row: NodeKey, selector: &Selector) -> Option<NodeKey> {
    let matches = doc.query_selector_all(row, selector);
    let prefixed = doc
        .attr(row, &rules.reorder().prefix_attr)
        .filter(|p| !p.is_empty())
        .and_then(|prefix| {
            let wanted = format!("{prefix}-");
            matches.iter().copied().find(|k| {
                doc.attr(*k, "name").is_some_and(|n| n.starts_with(&wanted))
            })
        });
    prefixed.or_else(|| matches.first().copied())
}
