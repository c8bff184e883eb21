use crate::{Document, NodeKey};

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum InputControlType {
    Text,
    Hidden,
    Number,
    Checkbox,
    Radio,
    Button,
    Other,
}

/// Classify an `<input>` by its `type` attribute. Non-inputs are `Other`.
pub fn input_control_type(doc: &Document, key: NodeKey) -> InputControlType {
    if doc.name(key) != Some("input") {
        return InputControlType::Other;
    }
    let ty = doc
        .attr(key, "type")
        .map(str::trim)
        .filter(|s| !s.is_empty());
    match ty {
        None => InputControlType::Text, // missing type defaults to text
        Some(t) if t.eq_ignore_ascii_case("text") => InputControlType::Text,
        Some(t) if t.eq_ignore_ascii_case("hidden") => InputControlType::Hidden,
        Some(t) if t.eq_ignore_ascii_case("number") => InputControlType::Number,
        Some(t) if t.eq_ignore_ascii_case("checkbox") => InputControlType::Checkbox,
        Some(t) if t.eq_ignore_ascii_case("radio") => InputControlType::Radio,
        Some(t)
            if ["submit", "button", "reset", "image"]
                .iter()
                .any(|b| t.eq_ignore_ascii_case(b)) =>
        {
            InputControlType::Button
        }
        _ => InputControlType::Other,
    }
}

/// The `(name, value)` pairs submitting `form` would send, in tree order.
///
/// Follows the successful-controls rules: named, not disabled, not inside a
/// `<template>`; checkboxes and radios only when checked (value defaults to
/// `"on"`); buttons never. Elements hidden from layout still submit.
pub fn form_data(doc: &Document, form: NodeKey) -> Vec<(String, String)> {
    let mut out = Vec::new();
    for key in doc.descendants(form) {
        if doc.is_inert(key) {
            continue;
        }
        let Some(tag) = doc.name(key) else {
            continue;
        };
        if !matches!(tag, "input" | "select" | "textarea") {
            continue;
        }
        let Some(name) = doc.attr(key, "name").filter(|n| !n.is_empty()) else {
            continue;
        };
        if doc.has_attr(key, "disabled") {
            continue;
        }
        let value = match input_control_type(doc, key) {
            InputControlType::Button => continue,
            InputControlType::Checkbox | InputControlType::Radio => {
                if !doc.checked(key) {
                    continue;
                }
                doc.attr(key, "value").unwrap_or("on").to_string()
            }
            _ => doc.value(key),
        };
        out.push((name.to_string(), value));
    }
    out
}
