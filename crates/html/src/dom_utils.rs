use crate::Node;

/// Concatenated text of all descendant text nodes.
pub fn text_content(node: &Node) -> String {
    fn walk(node: &Node, out: &mut String) {
        match node {
            Node::Text { text, .. } => out.push_str(text),
            Node::Element { children, .. } | Node::Document { children, .. } => {
                for c in children {
                    walk(c, out);
                }
            }
            Node::Comment { .. } => {}
        }
    }
    let mut out = String::new();
    walk(node, &mut out);
    out
}

/// Children that carry meaning: whitespace-only text and comments are dropped.
pub fn significant_children(node: &Node) -> impl Iterator<Item = &Node> {
    node.children()
        .iter()
        .filter(|c| !c.is_whitespace_text() && !matches!(c, Node::Comment { .. }))
}

/// Indented, human-readable outline used in test failure messages and debug logs.
/// Shows `id`, `class`, `name` and `value` attributes; stops after `cap` nodes.
pub fn outline_from_dom(root: &Node, cap: usize) -> Vec<String> {
    fn walk(node: &Node, depth: usize, out: &mut Vec<String>, left: &mut usize) {
        if *left == 0 {
            return;
        }
        *left -= 1;
        let indent = "  ".repeat(depth);
        match node {
            Node::Document {
                doctype, children, ..
            } => {
                match doctype {
                    Some(dt) => out.push(format!("{indent}<!{dt}>")),
                    None => out.push(format!("{indent}#document")),
                }
                for c in children {
                    walk(c, depth + 1, out, left);
                }
            }
            Node::Element { name, children, .. } => {
                let mut line = format!("{indent}<{name}");
                for key in ["id", "class", "name", "value"] {
                    if let Some(v) = node.attr(key).filter(|v| !v.is_empty()) {
                        line.push_str(&format!(r#" {key}="{v}""#));
                    }
                }
                line.push('>');
                out.push(line);
                for c in children {
                    walk(c, depth + 1, out, left);
                }
            }
            Node::Text { text, .. } => {
                let t = text.replace('\n', " ").trim().to_string();
                if !t.is_empty() {
                    out.push(format!("{indent}\"{}\"", truncate(&t, 40)));
                }
            }
            Node::Comment { text, .. } => {
                out.push(format!("{indent}<!-- {} -->", truncate(text, 40)));
            }
        }
    }
    let mut out = Vec::new();
    let mut left = cap;
    walk(root, 0, &mut out, &mut left);
    out
}

fn truncate(s: &str, max_chars: usize) -> String {
    match s.char_indices().nth(max_chars) {
        Some((cut, _)) => format!("{}…", &s[..cut]),
        None => s.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{build_dom, tokenize};

    #[test]
    fn significant_children_skip_whitespace_and_comments() {
        let dom = build_dom(&tokenize("<template>\n  <!-- row -->\n  <tr></tr>\n</template>"));
        let template = &dom.children()[0];
        let kept: Vec<_> = significant_children(template).collect();
        assert_eq!(kept.len(), 1);
        assert_eq!(kept[0].element_name(), Some("tr"));
    }

    #[test]
    fn outline_lists_identifying_attributes() {
        let dom = build_dom(&tokenize(
            r#"<div id="rows" class="list"><input name="form-0-priority" value="3"></div>"#,
        ));
        let outline = outline_from_dom(&dom, 10);
        assert_eq!(
            outline,
            vec![
                "#document".to_string(),
                r#"  <div id="rows" class="list">"#.to_string(),
                r#"    <input name="form-0-priority" value="3">"#.to_string(),
            ]
        );
    }

    #[test]
    fn text_content_concatenates_descendants() {
        let dom = build_dom(&tokenize("<p>a<b>b</b>c</p>"));
        assert_eq!(text_content(&dom), "abc");
    }

    #[test]
    fn truncate_respects_char_boundaries() {
        assert_eq!(truncate("ééé", 2), "éé…");
        assert_eq!(truncate("ab", 5), "ab");
    }
}
