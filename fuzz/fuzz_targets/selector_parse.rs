#![no_main]

use dom::{Document, Selector};
use libfuzzer_sys::fuzz_target;

fuzz_target!(|data: &[u8]| {
    let Ok(source) = std::str::from_utf8(data) else {
        return;
    };
    let Ok(selector) = Selector::parse(source) else {
        return;
    };
    // Display must round-trip through the parser.
    let reparsed = Selector::parse(selector.as_str()).expect("displayed selector reparses");
    assert_eq!(reparsed.as_str(), selector.as_str());

    let doc = Document::parse(
        r#"<form><div class="formset-entry" data-prefix="f-0"><input name="f-0-priority" value="1"></div></form>"#,
    );
    let _ = doc.query_selector_all(doc.root(), &selector);
});
