//! Rich text and image shapes
//!
//! Rich text is an array of paragraph nodes, each holding an array of inline
//! text runs:
//!
//! ```text
//! [{ "type": "block", "key", "style": "normal", "markDefs": [],
//!    "children": [{ "type": "span", "key", "text", "marks": [] }] }]
//! ```

use serde_json::{json, Value};

use crate::reference::ReferenceObject;

/// Build a single paragraph node holding one text run
#[must_use]
pub fn paragraph(text: &str, paragraph_key: &str, span_key: &str) -> Value {
    json!({
        "type": "block",
        "key": paragraph_key,
        "style": "normal",
        "markDefs": [],
        "children": [{
            "type": "span",
            "key": span_key,
            "text": text,
            "marks": []
        }]
    })
}

/// Check a single paragraph node
///
/// Requires an object with a `children` array whose members are objects
/// carrying a string `text`.
#[must_use]
pub fn is_paragraph(value: &Value) -> bool {
    value
        .get("children")
        .and_then(Value::as_array)
        .is_some_and(|children| {
            children
                .iter()
                .all(|run| run.get("text").is_some_and(Value::is_string))
        })
}

/// Check a rich-text array
#[must_use]
pub fn is_rich_text(value: &Value) -> bool {
    value
        .as_array()
        .is_some_and(|nodes| nodes.iter().all(is_paragraph))
}

/// Whether a value carries inline text runs worth flattening
#[must_use]
pub fn has_text_runs(value: &Value) -> bool {
    match value {
        Value::Object(map) => map.contains_key("children") || map.get("text").is_some_and(Value::is_string),
        Value::Array(items) => items.iter().any(|v| v.is_string() || has_text_runs(v)),
        _ => false,
    }
}

/// Flatten all inline text runs into one string
///
/// Runs are joined with single spaces and whitespace is collapsed.
#[must_use]
pub fn flatten_text(value: &Value) -> String {
    let mut runs = Vec::new();
    collect_runs(value, &mut runs);
    runs.into_iter()
        .flat_map(str::split_whitespace)
        .collect::<Vec<_>>()
        .join(" ")
}

fn collect_runs<'a>(value: &'a Value, runs: &mut Vec<&'a str>) {
    match value {
        Value::String(s) => runs.push(s),
        Value::Array(items) => items.iter().for_each(|v| collect_runs(v, runs)),
        Value::Object(map) => {
            if let Some(text) = map.get("text").and_then(Value::as_str) {
                runs.push(text);
            }
            if let Some(children) = map.get("children") {
                collect_runs(children, runs);
            }
        }
        _ => {}
    }
}

/// Build an image object pointing at an asset identifier
#[must_use]
pub fn image(asset_id: &str) -> Value {
    json!({
        "type": "image",
        "asset": ReferenceObject::new(asset_id).to_value()
    })
}

/// Check an image object: an `asset` that is a valid reference
#[must_use]
pub fn is_image(value: &Value) -> bool {
    value
        .get("asset")
        .is_some_and(|asset| ReferenceObject::from_value(asset).is_some())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn paragraph_is_valid_rich_text_node() {
        let node = paragraph("hello", "p1", "s1");
        assert!(is_paragraph(&node));
        assert!(is_rich_text(&Value::Array(vec![node])));
    }

    #[test]
    fn rejects_malformed_rich_text() {
        assert!(!is_rich_text(&json!("text")));
        assert!(!is_rich_text(&json!(["text"])));
        assert!(!is_rich_text(&json!([{"children": [{"text": 1}]}])));
        assert!(is_rich_text(&json!([])));
    }

    #[test]
    fn flatten_collapses_whitespace() {
        let value = json!([
            {"children": [{"text": "  Hello\n"}, {"text": "world "}]},
            {"children": [{"text": "again"}]},
            "tail   text"
        ]);
        assert_eq!(flatten_text(&value), "Hello world again tail text");
    }

    #[test]
    fn flatten_ignores_non_text() {
        assert_eq!(flatten_text(&json!([1, null, {"marks": []}])), "");
    }

    #[test]
    fn image_shape() {
        assert!(is_image(&image("asset-1")));
        assert!(!is_image(&json!({"asset": {"ref": "a"}})));
        assert!(!is_image(&json!("asset-1")));
    }
}
