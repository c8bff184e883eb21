#![no_main]

use dom::{Document, Selector};
use libfuzzer_sys::fuzz_target;

fuzz_target!(|data: &[u8]| {
    let Ok(input) = std::str::from_utf8(data) else {
        return;
    };
    let tree = html::parse_document(input);
    let mut doc = Document::from_node(&tree);

    // Cloning and substituting must never panic or touch the source subtree.
    let root = doc.root();
    let Ok(entry) = Selector::parse("*") else {
        return;
    };
    if let Some(first) = doc.query_selector(root, &entry) {
        let before = doc.to_node(first);
        if let Ok(copy) = doc.deep_clone(first) {
            let _ = doc.set_attr(copy, "data-fuzz", "__prefix__");
            assert_eq!(doc.to_node(first), before);
            assert_eq!(doc.parent(copy), None);
        }
    }
    let _ = doc.outline(root);
});
