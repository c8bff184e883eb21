use crate::config::Rules;
use crate::init::find_reference;
use dom::NodeKey;
use runtime_events::{EventType, Page};

const ROLE: &str = "mirror";

/// Read-only text copy of a field's value, kept current on `change`.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Mirror {
    element: NodeKey,
    source: NodeKey,
}

impl Mirror {
    /// Returns `None` when the referenced field does not exist or the element
    /// is already mirroring.
    pub fn attach(
        page: &mut Page,
        rules: &Rules,
        element: NodeKey,
        scope: Option<NodeKey>,
    ) -> Option<Mirror> {
        let source_id = page.doc().attr(element, &rules.mirror().attr)?;
        let Some(source) = find_reference(page.doc(), scope, source_id) else {
            log::debug!(target: "formset.mirror", "{element}: no field {source_id:?}");
            return None;
        };
        if !page.mark_wired(element, ROLE) {
            return None;
        }
        let mirror = Mirror { element, source };
        mirror.sync(page);
        page.add_listener(source, EventType::Change, move |page, _| mirror.sync(page));
        Some(mirror)
    }

    pub fn element(&self) -> NodeKey {
        self.element
    }

    pub fn source(&self) -> NodeKey {
        self.source
    }

    pub fn sync(&self, page: &mut Page) {
        let value = page.doc().value(self.source);
        log::trace!(target: "formset.mirror", "{} <- {:?}", self.element, value);
        if let Err(err) = page.doc_mut().set_text_content(self.element, &value) {
            log::warn!(target: "formset.mirror", "mirroring into {} failed: {err}", self.element);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::FormsetConfig;

    #[test]
    fn copies_now_and_on_change() {
        let mut page = Page::parse(
            r#"<input type="hidden" id="p" value="7"><span id="m" data-mirror="p">?</span>"#,
        );
        let rules = FormsetConfig::default().compile().unwrap();
        let span = page.doc().get_element_by_id("m").unwrap();
        let mirror = Mirror::attach(&mut page, &rules, span, None).unwrap();
        assert_eq!(page.doc().text_content(span), "7");

        page.doc_mut().set_value(mirror.source(), "9").unwrap();
        assert_eq!(page.doc().text_content(span), "7", "waits for change");
        page.dispatch(EventType::Change, mirror.source());
        assert_eq!(page.doc().text_content(span), "9");
    }

    #[test]
    fn missing_source_is_skipped() {
        let mut page = Page::parse(r#"<span id="m" data-mirror="gone">?</span>"#);
        let rules = FormsetConfig::default().compile().unwrap();
        let span = page.doc().get_element_by_id("m").unwrap();
        assert!(Mirror::attach(&mut page, &rules, span, None).is_none());
        assert_eq!(page.doc().text_content(span), "?");
    }
}
