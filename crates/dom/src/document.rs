use crate::error::DomError;
use crate::selector::Selector;
use html::{Attribute, Id, Node};
use std::fmt;

/// Stable handle to a node in a [`Document`]. Keys are never reused: detached
/// nodes keep their key and can be re-inserted.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct NodeKey(pub u32);

impl fmt::Display for NodeKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

#[derive(Clone, Debug)]
pub(crate) struct ElementData {
    pub(crate) name: String,
    pub(crate) attributes: Vec<Attribute>,
    /// Live value once script or the user changed it; `None` means "use the default".
    pub(crate) value: Option<String>,
    /// Live checkedness once changed; `None` means "use the `checked` attribute".
    pub(crate) checked: Option<bool>,
}

#[derive(Clone, Debug)]
pub(crate) enum NodeKind {
    Document,
    Element(ElementData),
    Text(String),
    Comment(String),
}

#[derive(Clone, Debug)]
struct NodeRecord {
    kind: NodeKind,
    parent: Option<NodeKey>,
    children: Vec<NodeKey>,
}

impl NodeRecord {
    fn allows_children(&self) -> bool {
        matches!(self.kind, NodeKind::Document | NodeKind::Element(_))
    }
}

/// Mutable, arena-backed document with live form state.
///
/// Contents of `<template>` elements are stored as ordinary children of the
/// template but are inert: id lookups and selector queries never descend into
/// them, and form data never includes them.
#[derive(Clone, Debug)]
pub struct Document {
    nodes: Vec<NodeRecord>,
    root: NodeKey,
}

impl Default for Document {
    fn default() -> Self {
        Self::new()
    }
}

impl Document {
    pub fn new() -> Self {
        Self {
            nodes: vec![NodeRecord {
                kind: NodeKind::Document,
                parent: None,
                children: Vec::new(),
            }],
            root: NodeKey(0),
        }
    }

    pub fn parse(markup: &str) -> Self {
        Self::from_node(&html::parse_document(markup))
    }

    /// Import a parsed tree. A `Node::Document` root maps onto this document's
    /// root; any other node is appended under it.
    pub fn from_node(node: &Node) -> Self {
        let mut doc = Self::new();
        let root = doc.root;
        match node {
            Node::Document { children, .. } => {
                for child in children {
                    let key = doc.import(child);
                    doc.link(root, key, None);
                }
            }
            other => {
                let key = doc.import(other);
                doc.link(root, key, None);
            }
        }
        doc
    }

    pub fn root(&self) -> NodeKey {
        self.root
    }

    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.len() <= 1
    }

    fn record(&self, key: NodeKey) -> Result<&NodeRecord, DomError> {
        self.nodes
            .get(key.0 as usize)
            .ok_or(DomError::UnknownNode(key))
    }

    fn record_mut(&mut self, key: NodeKey) -> Result<&mut NodeRecord, DomError> {
        self.nodes
            .get_mut(key.0 as usize)
            .ok_or(DomError::UnknownNode(key))
    }

    fn element(&self, key: NodeKey) -> Option<&ElementData> {
        match &self.nodes.get(key.0 as usize)?.kind {
            NodeKind::Element(data) => Some(data),
            _ => None,
        }
    }

    fn element_mut(&mut self, key: NodeKey) -> Result<&mut ElementData, DomError> {
        match &mut self.record_mut(key)?.kind {
            NodeKind::Element(data) => Ok(data),
            _ => Err(DomError::NotAnElement(key)),
        }
    }

    fn push(&mut self, kind: NodeKind) -> NodeKey {
        let key = NodeKey(self.nodes.len() as u32);
        self.nodes.push(NodeRecord {
            kind,
            parent: None,
            children: Vec::new(),
        });
        key
    }

    /// Import a parsed subtree as a detached node. Iterative to tolerate deep markup.
    pub fn import(&mut self, node: &Node) -> NodeKey {
        let top = self.push(Self::kind_of(node));
        let mut stack: Vec<(&Node, NodeKey)> = vec![(node, top)];
        while let Some((source, key)) = stack.pop() {
            for child in source.children() {
                let child_key = self.push(Self::kind_of(child));
                self.link(key, child_key, None);
                stack.push((child, child_key));
            }
        }
        top
    }

    fn kind_of(node: &Node) -> NodeKind {
        match node {
            Node::Document { .. } => NodeKind::Element(ElementData {
                name: "#fragment".to_string(),
                attributes: Vec::new(),
                value: None,
                checked: None,
            }),
            Node::Element {
                name, attributes, ..
            } => NodeKind::Element(ElementData {
                name: name.clone(),
                attributes: attributes.clone(),
                value: None,
                checked: None,
            }),
            Node::Text { text, .. } => NodeKind::Text(text.clone()),
            Node::Comment { text, .. } => NodeKind::Comment(text.clone()),
        }
    }

    /// Unchecked link; callers guarantee `child` is detached and no cycle forms.
    fn link(&mut self, parent: NodeKey, child: NodeKey, before: Option<usize>) {
        let siblings = &mut self.nodes[parent.0 as usize].children;
        match before {
            Some(pos) => siblings.insert(pos, child),
            None => siblings.push(child),
        }
        self.nodes[child.0 as usize].parent = Some(parent);
    }

    pub fn create_element(&mut self, name: &str, attributes: &[(&str, &str)]) -> NodeKey {
        self.push(NodeKind::Element(ElementData {
            name: name.to_ascii_lowercase(),
            attributes: attributes
                .iter()
                .map(|(k, v)| (k.to_ascii_lowercase(), Some(v.to_string())))
                .collect(),
            value: None,
            checked: None,
        }))
    }

    pub fn create_text(&mut self, text: &str) -> NodeKey {
        self.push(NodeKind::Text(text.to_string()))
    }

    // --- tree structure -------------------------------------------------

    pub fn parent(&self, key: NodeKey) -> Option<NodeKey> {
        self.nodes.get(key.0 as usize)?.parent
    }

    pub fn parent_element(&self, key: NodeKey) -> Option<NodeKey> {
        self.parent(key).filter(|p| self.is_element(*p))
    }

    pub fn children(&self, key: NodeKey) -> &[NodeKey] {
        self.nodes
            .get(key.0 as usize)
            .map(|r| r.children.as_slice())
            .unwrap_or(&[])
    }

    pub fn element_children(&self, key: NodeKey) -> Vec<NodeKey> {
        self.children(key)
            .iter()
            .copied()
            .filter(|c| self.is_element(*c))
            .collect()
    }

    pub fn previous_element_sibling(&self, key: NodeKey) -> Option<NodeKey> {
        let parent = self.parent(key)?;
        let siblings = self.children(parent);
        let pos = siblings.iter().position(|k| *k == key)?;
        siblings[..pos]
            .iter()
            .rev()
            .copied()
            .find(|k| self.is_element(*k))
    }

    /// Ancestors from the parent upwards, ending at the root.
    pub fn ancestors(&self, key: NodeKey) -> impl Iterator<Item = NodeKey> + '_ {
        std::iter::successors(self.parent(key), move |k| self.parent(*k))
    }

    pub fn contains(&self, ancestor: NodeKey, key: NodeKey) -> bool {
        key == ancestor || self.ancestors(key).any(|a| a == ancestor)
    }

    pub fn is_connected(&self, key: NodeKey) -> bool {
        self.contains(self.root, key)
    }

    /// True when `key` sits inside a `<template>` (strictly below it).
    pub fn is_inert(&self, key: NodeKey) -> bool {
        self.ancestors(key).any(|a| self.is_template(a))
    }

    pub fn is_template(&self, key: NodeKey) -> bool {
        self.name(key) == Some("template")
    }

    /// Move `child` to the end of `parent`'s children, detaching it first.
    pub fn append_child(&mut self, parent: NodeKey, child: NodeKey) -> Result<(), DomError> {
        self.check_insert(parent, child)?;
        self.detach(child)?;
        self.link(parent, child, None);
        Ok(())
    }

    /// Move `child` right before `before`, which must be a child of `parent`.
    pub fn insert_before(
        &mut self,
        parent: NodeKey,
        child: NodeKey,
        before: NodeKey,
    ) -> Result<(), DomError> {
        if child == before {
            return Ok(());
        }
        self.check_insert(parent, child)?;
        if self.parent(before) != Some(parent) {
            return Err(DomError::NotAChild {
                parent,
                child: before,
            });
        }
        self.detach(child)?;
        let pos = self
            .children(parent)
            .iter()
            .position(|k| *k == before)
            .ok_or(DomError::NotAChild {
                parent,
                child: before,
            })?;
        self.link(parent, child, Some(pos));
        Ok(())
    }

    /// Move `child` right after `after`, which must be a child of `parent`.
    pub fn insert_after(
        &mut self,
        parent: NodeKey,
        child: NodeKey,
        after: NodeKey,
    ) -> Result<(), DomError> {
        if child == after {
            return Ok(());
        }
        let next = {
            let siblings = self.children(parent);
            let pos = siblings
                .iter()
                .position(|k| *k == after)
                .ok_or(DomError::NotAChild {
                    parent,
                    child: after,
                })?;
            siblings[pos + 1..].iter().copied().find(|k| *k != child)
        };
        match next {
            Some(next) => self.insert_before(parent, child, next),
            None => self.append_child(parent, child),
        }
    }

    fn check_insert(&self, parent: NodeKey, child: NodeKey) -> Result<(), DomError> {
        if !self.record(parent)?.allows_children() {
            return Err(DomError::InvalidParent(parent));
        }
        self.record(child)?;
        if child == self.root || self.contains(child, parent) {
            return Err(DomError::CycleDetected { parent, child });
        }
        Ok(())
    }

    /// Remove `key` from its parent. The subtree stays in the arena.
    pub fn detach(&mut self, key: NodeKey) -> Result<(), DomError> {
        let Some(parent) = self.record_mut(key)?.parent.take() else {
            return Ok(());
        };
        self.record_mut(parent)?.children.retain(|k| *k != key);
        Ok(())
    }

    /// Structural deep copy of `key`, returned detached. Live form state is
    /// copied along with attributes; nothing else (listeners live outside the
    /// document) is carried over.
    pub fn deep_clone(&mut self, key: NodeKey) -> Result<NodeKey, DomError> {
        let kind = self.record(key)?.kind.clone();
        let top = self.push(kind);
        let mut stack = vec![(key, top)];
        while let Some((source, copy)) = stack.pop() {
            let children = self.record(source)?.children.clone();
            for child in children {
                let kind = self.record(child)?.kind.clone();
                let child_copy = self.push(kind);
                self.link(copy, child_copy, None);
                stack.push((child, child_copy));
            }
        }
        Ok(top)
    }

    // --- element data ---------------------------------------------------

    pub fn is_element(&self, key: NodeKey) -> bool {
        self.element(key).is_some()
    }

    pub fn name(&self, key: NodeKey) -> Option<&str> {
        self.element(key).map(|e| e.name.as_str())
    }

    pub fn attributes(&self, key: NodeKey) -> &[Attribute] {
        self.element(key)
            .map(|e| e.attributes.as_slice())
            .unwrap_or(&[])
    }

    /// Attribute value; a valueless attribute reads as `""`.
    pub fn attr(&self, key: NodeKey, name: &str) -> Option<&str> {
        self.element(key)?
            .attributes
            .iter()
            .find(|(k, _)| k.eq_ignore_ascii_case(name))
            .map(|(_, v)| v.as_deref().unwrap_or(""))
    }

    pub fn has_attr(&self, key: NodeKey, name: &str) -> bool {
        self.attr(key, name).is_some()
    }

    pub fn set_attr(&mut self, key: NodeKey, name: &str, value: &str) -> Result<(), DomError> {
        let element = self.element_mut(key)?;
        match element
            .attributes
            .iter_mut()
            .find(|(k, _)| k.eq_ignore_ascii_case(name))
        {
            Some((_, v)) => *v = Some(value.to_string()),
            None => element
                .attributes
                .push((name.to_ascii_lowercase(), Some(value.to_string()))),
        }
        Ok(())
    }

    pub fn remove_attr(&mut self, key: NodeKey, name: &str) -> Result<bool, DomError> {
        let element = self.element_mut(key)?;
        let before = element.attributes.len();
        element
            .attributes
            .retain(|(k, _)| !k.eq_ignore_ascii_case(name));
        Ok(element.attributes.len() != before)
    }

    pub fn has_class(&self, key: NodeKey, class: &str) -> bool {
        self.attr(key, "class")
            .is_some_and(|v| v.split_ascii_whitespace().any(|c| c == class))
    }

    /// Returns `true` if the class list changed.
    pub fn add_class(&mut self, key: NodeKey, class: &str) -> Result<bool, DomError> {
        if self.has_class(key, class) {
            return Ok(false);
        }
        let joined = match self.attr(key, "class").map(str::trim) {
            Some(existing) if !existing.is_empty() => format!("{existing} {class}"),
            _ => class.to_string(),
        };
        self.set_attr(key, "class", &joined)?;
        Ok(true)
    }

    /// Returns `true` if the class list changed.
    pub fn remove_class(&mut self, key: NodeKey, class: &str) -> Result<bool, DomError> {
        if !self.has_class(key, class) {
            self.element_mut(key)?;
            return Ok(false);
        }
        let kept = self
            .attr(key, "class")
            .unwrap_or("")
            .split_ascii_whitespace()
            .filter(|c| *c != class)
            .collect::<Vec<_>>()
            .join(" ");
        self.set_attr(key, "class", &kept)?;
        Ok(true)
    }

    pub fn is_hidden(&self, key: NodeKey) -> bool {
        self.has_attr(key, "hidden")
    }

    pub fn set_hidden(&mut self, key: NodeKey, hidden: bool) -> Result<(), DomError> {
        if hidden {
            self.set_attr(key, "hidden", "")
        } else {
            self.remove_attr(key, "hidden").map(|_| ())
        }
    }

    // --- form state -----------------------------------------------------

    /// Current value of a form control (or any element's `value` attribute).
    pub fn value(&self, key: NodeKey) -> String {
        let Some(element) = self.element(key) else {
            return String::new();
        };
        if let Some(value) = &element.value {
            return value.clone();
        }
        match element.name.as_str() {
            "textarea" => self.text_content(key),
            "select" => self.selected_option_value(key).unwrap_or_default(),
            _ => self.attr(key, "value").unwrap_or("").to_string(),
        }
    }

    pub fn set_value(&mut self, key: NodeKey, value: &str) -> Result<(), DomError> {
        self.element_mut(key)?.value = Some(value.to_string());
        Ok(())
    }

    fn selected_option_value(&self, select: NodeKey) -> Option<String> {
        let options: Vec<NodeKey> = self
            .descendants(select)
            .into_iter()
            .filter(|k| self.name(*k) == Some("option"))
            .collect();
        let chosen = options
            .iter()
            .copied()
            .find(|k| self.has_attr(*k, "selected"))
            .or_else(|| options.first().copied())?;
        Some(
            self.attr(chosen, "value")
                .map(str::to_string)
                .unwrap_or_else(|| self.text_content(chosen).trim().to_string()),
        )
    }

    pub fn checked(&self, key: NodeKey) -> bool {
        self.element(key)
            .is_some_and(|e| e.checked.unwrap_or_else(|| self.has_attr(key, "checked")))
    }

    /// Returns `true` if the checked state changed.
    pub fn set_checked(&mut self, key: NodeKey, checked: bool) -> Result<bool, DomError> {
        let previous = self.checked(key);
        self.element_mut(key)?.checked = Some(checked);
        Ok(previous != checked)
    }

    // --- text -----------------------------------------------------------

    pub fn text_content(&self, key: NodeKey) -> String {
        let mut out = String::new();
        let mut stack = vec![key];
        while let Some(current) = stack.pop() {
            match self.nodes.get(current.0 as usize).map(|r| &r.kind) {
                Some(NodeKind::Text(text)) => out.push_str(text),
                Some(NodeKind::Element(_) | NodeKind::Document) => {
                    stack.extend(self.children(current).iter().rev());
                }
                _ => {}
            }
        }
        out
    }

    /// Replace all children with a single text node (none for an empty string).
    pub fn set_text_content(&mut self, key: NodeKey, text: &str) -> Result<(), DomError> {
        if !self.record(key)?.allows_children() {
            return match &mut self.record_mut(key)?.kind {
                NodeKind::Text(existing) | NodeKind::Comment(existing) => {
                    existing.clear();
                    existing.push_str(text);
                    Ok(())
                }
                _ => Err(DomError::InvalidParent(key)),
            };
        }
        let old = std::mem::take(&mut self.record_mut(key)?.children);
        for child in old {
            self.record_mut(child)?.parent = None;
        }
        if !text.is_empty() {
            let text_key = self.create_text(text);
            self.link(key, text_key, None);
        }
        Ok(())
    }

    // --- queries --------------------------------------------------------

    /// Descendants of `key` in tree order, excluding `key`. Template elements
    /// are yielded but their contents are skipped.
    pub fn descendants(&self, key: NodeKey) -> Vec<NodeKey> {
        let mut out = Vec::new();
        let mut stack: Vec<NodeKey> = self.children(key).iter().rev().copied().collect();
        while let Some(current) = stack.pop() {
            out.push(current);
            if !self.is_template(current) {
                stack.extend(self.children(current).iter().rev());
            }
        }
        out
    }

    /// Direct children of a `<template>`; empty for any other node.
    pub fn template_contents(&self, template: NodeKey) -> &[NodeKey] {
        if self.is_template(template) {
            self.children(template)
        } else {
            &[]
        }
    }

    pub fn query_selector_all(&self, scope: NodeKey, selector: &Selector) -> Vec<NodeKey> {
        self.descendants(scope)
            .into_iter()
            .filter(|k| selector.matches(self, *k))
            .collect()
    }

    pub fn query_selector(&self, scope: NodeKey, selector: &Selector) -> Option<NodeKey> {
        self.descendants(scope)
            .into_iter()
            .find(|k| selector.matches(self, *k))
    }

    pub fn matches(&self, key: NodeKey, selector: &Selector) -> bool {
        selector.matches(self, key)
    }

    /// Nearest inclusive ancestor matching `selector`.
    pub fn closest(&self, key: NodeKey, selector: &Selector) -> Option<NodeKey> {
        std::iter::once(key)
            .chain(self.ancestors(key))
            .find(|k| selector.matches(self, *k))
    }

    /// Nearest inclusive ancestor carrying `attr`.
    pub fn closest_with_attr(&self, key: NodeKey, attr: &str) -> Option<NodeKey> {
        std::iter::once(key)
            .chain(self.ancestors(key))
            .find(|k| self.has_attr(*k, attr))
    }

    /// `getElementById` over the connected, non-inert document.
    pub fn get_element_by_id(&self, id: &str) -> Option<NodeKey> {
        self.find_by_id_within(self.root, id)
    }

    /// First element with `id` inside `scope` (inclusive), skipping template contents.
    /// `scope` may be a detached subtree.
    pub fn find_by_id_within(&self, scope: NodeKey, id: &str) -> Option<NodeKey> {
        if id.is_empty() {
            return None;
        }
        std::iter::once(scope)
            .chain(self.descendants(scope))
            .find(|k| self.attr(*k, "id") == Some(id))
    }

    // --- export ---------------------------------------------------------

    /// Materialize a subtree as an immutable [`Node`]; ids are the node keys.
    pub fn to_node(&self, key: NodeKey) -> Node {
        let children = self
            .children(key)
            .iter()
            .map(|child| self.to_node(*child))
            .collect();
        let id = Id(key.0);
        match self.nodes.get(key.0 as usize).map(|r| &r.kind) {
            Some(NodeKind::Element(data)) => Node::Element {
                id,
                name: data.name.clone(),
                attributes: data.attributes.clone(),
                children,
            },
            Some(NodeKind::Text(text)) => Node::Text {
                id,
                text: text.clone(),
            },
            Some(NodeKind::Comment(text)) => Node::Comment {
                id,
                text: text.clone(),
            },
            Some(NodeKind::Document) | None => Node::Document {
                id,
                doctype: None,
                children,
            },
        }
    }

    /// Debug outline of a subtree, see [`html::dom_utils::outline_from_dom`].
    pub fn outline(&self, key: NodeKey) -> String {
        html::dom_utils::outline_from_dom(&self.to_node(key), 500).join("\n")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_imports_elements_and_attributes() {
        let doc = Document::parse(r#"<div id="rows"><input id="c" value="2"></div>"#);
        let rows = doc.get_element_by_id("rows").unwrap();
        assert_eq!(doc.name(rows), Some("div"));
        let counter = doc.get_element_by_id("c").unwrap();
        assert_eq!(doc.parent(counter), Some(rows));
        assert_eq!(doc.value(counter), "2");
    }

    #[test]
    fn template_contents_are_inert() {
        let doc = Document::parse(
            r#"<template id="t"><div id="inside"></div></template><div id="outside"></div>"#,
        );
        assert!(doc.get_element_by_id("inside").is_none());
        assert!(doc.get_element_by_id("outside").is_some());
        let template = doc.get_element_by_id("t").unwrap();
        let inside = doc.template_contents(template)[0];
        assert!(doc.is_inert(inside));
        assert_eq!(doc.find_by_id_within(inside, "inside"), Some(inside));
    }

    #[test]
    fn append_moves_and_rejects_cycles() {
        let mut doc = Document::parse(r#"<ul id="a"><li id="x"></li></ul><ul id="b"></ul>"#);
        let a = doc.get_element_by_id("a").unwrap();
        let b = doc.get_element_by_id("b").unwrap();
        let x = doc.get_element_by_id("x").unwrap();
        doc.append_child(b, x).unwrap();
        assert!(doc.children(a).is_empty());
        assert_eq!(doc.children(b), &[x]);
        assert_eq!(
            doc.append_child(x, b),
            Err(DomError::CycleDetected {
                parent: x,
                child: b
            })
        );
    }

    #[test]
    fn insert_before_and_after_reorder_siblings() {
        let mut doc = Document::parse(r#"<ol id="l"><li id="1"></li><li id="2"></li><li id="3"></li></ol>"#);
        let list = doc.get_element_by_id("l").unwrap();
        let [one, two, three] = ["1", "2", "3"].map(|id| doc.get_element_by_id(id).unwrap());
        doc.insert_before(list, three, one).unwrap();
        assert_eq!(doc.children(list), &[three, one, two]);
        doc.insert_after(list, three, two).unwrap();
        assert_eq!(doc.children(list), &[one, two, three]);
        doc.insert_after(list, one, one).unwrap();
        assert_eq!(doc.children(list), &[one, two, three]);
        assert!(matches!(
            doc.insert_before(list, one, list),
            Err(DomError::NotAChild { .. })
        ));
    }

    #[test]
    fn deep_clone_is_detached_and_independent() {
        let mut doc = Document::parse(r#"<div id="src" class="a"><input name="n" checked></div>"#);
        let src = doc.get_element_by_id("src").unwrap();
        let copy = doc.deep_clone(src).unwrap();
        assert_eq!(doc.parent(copy), None);
        doc.set_attr(copy, "id", "copy").unwrap();
        let input = doc.children(copy)[0];
        doc.set_checked(input, false).unwrap();
        assert_eq!(doc.attr(src, "id"), Some("src"));
        assert!(doc.checked(doc.children(src)[0]));
        assert!(!doc.checked(input));
    }

    #[test]
    fn class_list_editing() {
        let mut doc = Document::parse(r#"<tr id="r" class="formset-entry"></tr>"#);
        let row = doc.get_element_by_id("r").unwrap();
        assert!(doc.add_class(row, "deleting").unwrap());
        assert!(!doc.add_class(row, "deleting").unwrap());
        assert_eq!(doc.attr(row, "class"), Some("formset-entry deleting"));
        assert!(doc.remove_class(row, "formset-entry").unwrap());
        assert_eq!(doc.attr(row, "class"), Some("deleting"));
        assert!(!doc.remove_class(row, "missing").unwrap());
    }

    #[test]
    fn live_value_overrides_attribute() {
        let mut doc = Document::parse(
            r#"<input id="i" value="1"><textarea id="t">hi</textarea><select id="s"><option value="a">A</option><option value="b" selected>B</option></select>"#,
        );
        let input = doc.get_element_by_id("i").unwrap();
        doc.set_value(input, "9").unwrap();
        assert_eq!(doc.value(input), "9");
        assert_eq!(doc.attr(input, "value"), Some("1"));
        assert_eq!(doc.value(doc.get_element_by_id("t").unwrap()), "hi");
        assert_eq!(doc.value(doc.get_element_by_id("s").unwrap()), "b");
    }

    #[test]
    fn set_text_content_replaces_children() {
        let mut doc = Document::parse(r#"<span id="m">old <b>bold</b></span>"#);
        let span = doc.get_element_by_id("m").unwrap();
        doc.set_text_content(span, "7").unwrap();
        assert_eq!(doc.text_content(span), "7");
        assert_eq!(doc.children(span).len(), 1);
    }

    #[test]
    fn errors_on_unknown_keys() {
        let mut doc = Document::new();
        assert_eq!(
            doc.set_attr(NodeKey(42), "id", "x"),
            Err(DomError::UnknownNode(NodeKey(42)))
        );
        let text = doc.create_text("t");
        assert_eq!(
            doc.set_attr(text, "id", "x"),
            Err(DomError::NotAnElement(text))
        );
    }
}
