use crate::traverse::assign_node_ids;
use crate::types::{Id, Node, Token};

/// Build a document tree from a token stream.
///
/// Open elements live on an explicit stack (no recursion), so nesting depth is
/// bounded by memory rather than the call stack. An end tag pops up to the
/// nearest open element with the same name; an end tag without a match is
/// ignored. Elements still open at the end are closed implicitly.
pub fn build_dom(tokens: &[Token]) -> Node {
    let mut doctype: Option<String> = None;
    let mut root_children: Vec<Node> = Vec::new();
    let mut open: Vec<Node> = Vec::new();

    fn attach(open: &mut [Node], root_children: &mut Vec<Node>, node: Node) {
        match open.last_mut().and_then(Node::children_mut) {
            Some(children) => children.push(node),
            None => root_children.push(node),
        }
    }

    for token in tokens {
        match token {
            Token::Doctype(dt) => {
                if doctype.is_none() {
                    doctype = Some(dt.clone());
                }
            }
            Token::Comment(text) => attach(
                &mut open,
                &mut root_children,
                Node::Comment {
                    id: Id(0),
                    text: text.clone(),
                },
            ),
            Token::Text(text) => {
                if !text.is_empty() {
                    attach(
                        &mut open,
                        &mut root_children,
                        Node::Text {
                            id: Id(0),
                            text: text.clone(),
                        },
                    );
                }
            }
            Token::StartTag {
                name,
                attributes,
                self_closing,
            } => {
                let element = Node::Element {
                    id: Id(0),
                    name: name.clone(),
                    attributes: attributes.clone(),
                    children: Vec::new(),
                };
                if *self_closing {
                    attach(&mut open, &mut root_children, element);
                } else {
                    open.push(element);
                }
            }
            Token::EndTag(name) => {
                let Some(depth) = open
                    .iter()
                    .rposition(|node| node.element_name() == Some(name.as_str()))
                else {
                    log::trace!(target: "html.tree_builder", "ignoring stray </{name}>");
                    continue;
                };
                while open.len() > depth {
                    let Some(closed) = open.pop() else {
                        break;
                    };
                    attach(&mut open, &mut root_children, closed);
                }
            }
        }
    }

    while let Some(closed) = open.pop() {
        attach(&mut open, &mut root_children, closed);
    }

    let mut document = Node::Document {
        id: Id(0),
        doctype,
        children: root_children,
    };
    assign_node_ids(&mut document);
    document
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tokenize;

    #[test]
    fn nests_elements_and_closes_void_inputs() {
        let dom = build_dom(&tokenize(
            r#"<form><div class="row"><input name="a"><label>A</label></div></form>"#,
        ));
        let form = &dom.children()[0];
        assert_eq!(form.element_name(), Some("form"));
        let row = &form.children()[0];
        assert_eq!(row.attr("class"), Some("row"));
        assert_eq!(row.children().len(), 2);
        assert_eq!(row.children()[0].element_name(), Some("input"));
        assert_eq!(row.children()[1].element_name(), Some("label"));
    }

    #[test]
    fn stray_end_tag_is_ignored() {
        let dom = build_dom(&tokenize("<div>a</span>b</div>"));
        let div = &dom.children()[0];
        assert_eq!(div.children().len(), 2);
        assert!(div.children().iter().all(|c| matches!(c, Node::Text { .. })));
    }

    #[test]
    fn unclosed_elements_close_at_end_of_input() {
        let dom = build_dom(&tokenize("<ul><li>one<li>two"));
        let ul = &dom.children()[0];
        let first = &ul.children()[0];
        // No implied end tags: the second <li> nests inside the first.
        assert_eq!(first.children().len(), 2);
        assert_eq!(first.children()[1].element_name(), Some("li"));
    }

    #[test]
    fn assigns_unique_nonzero_ids() {
        let dom = build_dom(&tokenize("<p><b>x</b><i>y</i></p>"));
        let mut seen = Vec::new();
        fn walk(node: &Node, seen: &mut Vec<Id>) {
            seen.push(node.id());
            for c in node.children() {
                walk(c, seen);
            }
        }
        walk(&dom, &mut seen);
        let mut sorted = seen.clone();
        sorted.sort_by_key(|id| id.0);
        sorted.dedup();
        assert_eq!(sorted.len(), seen.len());
        assert!(seen.iter().all(|id| id.0 != 0));
    }

    #[test]
    fn deep_nesting_does_not_recurse() {
        let depth = 2_000;
        let markup = "<div>".repeat(depth);
        let dom = build_dom(&tokenize(&markup));
        let mut current = &dom.children()[0];
        let mut seen = 1;
        while let Some(child) = current.children().first() {
            current = child;
            seen += 1;
        }
        assert_eq!(seen, depth);
    }
}
