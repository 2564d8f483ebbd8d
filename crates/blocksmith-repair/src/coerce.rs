//! Best-effort coercion toward a field type tag
//!
//! Coercion is idempotent: a value that already satisfies its tag comes back
//! [`Coercion::Unchanged`] and is never logged as fixed.

use blocksmith_schema::rich_text::{flatten_text, has_text_runs, image, is_paragraph, paragraph};
use blocksmith_schema::{FieldTypeTag, KeyMint, ReferenceObject};
use serde_json::{Map, Number, Value};

/// Outcome of coercing one field value
#[derive(Debug, Clone, PartialEq)]
pub enum Coercion {
    /// Value already satisfies the tag
    Unchanged,
    /// Value was reshaped
    Fixed(Value),
    /// Value is unfixable; the field should be removed
    Drop(String),
}

/// Coerce `value` toward `tag`
///
/// `allowed` is the field's enum vocabulary, consulted by
/// [`FieldTypeTag::Enum`] only. Paragraph and span keys of synthesized rich
/// text are drawn from `keys`.
pub fn coerce(
    tag: FieldTypeTag,
    value: &Value,
    allowed: Option<&[String]>,
    keys: &mut KeyMint<'_>,
) -> Coercion {
    if tag.accepts(value, allowed) {
        return Coercion::Unchanged;
    }
    if value.is_null() {
        return Coercion::Drop("null value".to_string());
    }
    match tag {
        FieldTypeTag::String => to_string(value),
        FieldTypeTag::Number => to_number(value),
        FieldTypeTag::StringArray => to_string_array(value),
        FieldTypeTag::RichTextArray => to_rich_text(value, keys),
        // element-level problems belong to the reference sanitizer and validator
        FieldTypeTag::ReferenceArray if value.is_array() => Coercion::Unchanged,
        FieldTypeTag::ReferenceArray => Coercion::Drop("expected an array of references".to_string()),
        FieldTypeTag::ImageRef | FieldTypeTag::OptionalImageRef => to_image(value),
        FieldTypeTag::IconRef => to_icon(value),
        FieldTypeTag::Enum => to_enum(value, allowed),
    }
}

/// Canonicalize a value against an enum vocabulary
///
/// Used for fields that carry a `fieldEnums` entry under a non-enum tag.
#[must_use]
pub fn canonicalize_enum(value: &Value, allowed: &[String]) -> Coercion {
    if value.is_null() || FieldTypeTag::Enum.accepts(value, Some(allowed)) {
        return Coercion::Unchanged;
    }
    to_enum(value, Some(allowed))
}

fn to_string(value: &Value) -> Coercion {
    match value {
        Value::Bool(_) | Value::Number(_) => Coercion::Fixed(Value::String(value.to_string())),
        Value::Array(_) => match flatten_text(value) {
            text if text.is_empty() => Coercion::Drop("array holds no text".to_string()),
            text => Coercion::Fixed(Value::String(text)),
        },
        Value::Object(_) if has_text_runs(value) => match flatten_text(value) {
            text if text.is_empty() => Coercion::Drop("object holds no text".to_string()),
            text => Coercion::Fixed(Value::String(text)),
        },
        Value::Object(map) if !map.is_empty() => Coercion::Fixed(Value::String(value.to_string())),
        _ => Coercion::Drop("empty value".to_string()),
    }
}

fn to_number(value: &Value) -> Coercion {
    let Some(text) = value.as_str().map(str::trim) else {
        return Coercion::Drop("not numeric".to_string());
    };
    if let Ok(int) = text.parse::<i64>() {
        return Coercion::Fixed(Value::from(int));
    }
    match text.parse::<f64>().ok().and_then(Number::from_f64) {
        Some(number) => Coercion::Fixed(Value::Number(number)),
        None => Coercion::Drop(format!("'{text}' is not numeric")),
    }
}

/// String form of a single string-array member, if it has one
fn string_member(value: &Value) -> Option<String> {
    match value {
        Value::String(s) if !s.trim().is_empty() => Some(s.clone()),
        Value::Bool(_) | Value::Number(_) => Some(value.to_string()),
        Value::Object(_) | Value::Array(_) if has_text_runs(value) => {
            Some(flatten_text(value)).filter(|s| !s.is_empty())
        }
        _ => None,
    }
}

fn to_string_array(value: &Value) -> Coercion {
    match value {
        Value::Array(items) => {
            let members: Vec<Value> = items
                .iter()
                .filter_map(string_member)
                .map(Value::String)
                .collect();
            if members.is_empty() {
                Coercion::Drop("no usable entries".to_string())
            } else {
                Coercion::Fixed(Value::Array(members))
            }
        }
        other => match string_member(other) {
            Some(member) => Coercion::Fixed(Value::Array(vec![Value::String(member)])),
            None => Coercion::Drop("no usable text".to_string()),
        },
    }
}

/// Paragraph node for one rich-text array member, if it has text
fn paragraph_member(value: &Value, keys: &mut KeyMint<'_>) -> Option<Value> {
    if value.is_object() && is_paragraph(value) {
        return Some(value.clone());
    }
    let text = flatten_text(value);
    if text.is_empty() {
        return None;
    }
    let (paragraph_key, span_key) = (keys.mint(), keys.mint());
    Some(paragraph(&text, &paragraph_key, &span_key))
}

fn to_rich_text(value: &Value, keys: &mut KeyMint<'_>) -> Coercion {
    match value {
        Value::Array(items) => {
            let nodes: Vec<Value> = items
                .iter()
                .filter_map(|item| paragraph_member(item, keys))
                .collect();
            if nodes.is_empty() {
                Coercion::Drop("no usable paragraphs".to_string())
            } else {
                Coercion::Fixed(Value::Array(nodes))
            }
        }
        Value::String(_) | Value::Object(_) => match paragraph_member(value, keys) {
            Some(node) => Coercion::Fixed(Value::Array(vec![node])),
            None => Coercion::Drop("no usable text".to_string()),
        },
        _ => Coercion::Drop("expected rich text".to_string()),
    }
}

/// Identifier named by a bare string or a ref-like object
fn referenced_id(value: &Value) -> Option<&str> {
    let id = match value {
        Value::String(s) => Some(s.as_str()),
        Value::Object(map) => ["ref", "_ref"]
            .iter()
            .find_map(|k| map.get(*k).and_then(Value::as_str)),
        _ => None,
    };
    id.filter(|id| !id.trim().is_empty())
}

fn to_image(value: &Value) -> Coercion {
    let Some(map) = value.as_object() else {
        return match referenced_id(value) {
            Some(id) => Coercion::Fixed(image(id)),
            None => Coercion::Drop("expected an image".to_string()),
        };
    };
    match map.get("asset") {
        Some(asset) => match referenced_id(asset) {
            Some(id) => {
                let mut fixed: Map<String, Value> = map.clone();
                fixed.insert("asset".to_string(), ReferenceObject::new(id).to_value());
                fixed
                    .entry("type")
                    .or_insert_with(|| Value::from("image"));
                Coercion::Fixed(Value::Object(fixed))
            }
            None => Coercion::Drop("image asset has no identifier".to_string()),
        },
        // a bare reference standing in for the image
        None => match referenced_id(value) {
            Some(id) => Coercion::Fixed(image(id)),
            None => Coercion::Drop("expected an image".to_string()),
        },
    }
}

fn to_icon(value: &Value) -> Coercion {
    let name = ["name", "icon"]
        .iter()
        .find_map(|k| value.get(*k).and_then(Value::as_str))
        .map(str::trim)
        .filter(|name| !name.is_empty());
    match name {
        Some(name) => Coercion::Fixed(Value::from(name)),
        None => Coercion::Drop("expected an icon name".to_string()),
    }
}

fn to_enum(value: &Value, allowed: Option<&[String]>) -> Coercion {
    let Some(allowed) = allowed else {
        return Coercion::Drop("no enum vocabulary declared".to_string());
    };
    let text = match value {
        Value::String(s) => s.trim().to_string(),
        Value::Number(_) | Value::Bool(_) => value.to_string(),
        _ => return Coercion::Drop(format!("must be one of: {}", allowed.join(", "))),
    };
    match allowed.iter().find(|a| a.eq_ignore_ascii_case(&text)) {
        Some(canonical) => Coercion::Fixed(Value::from(canonical.as_str())),
        None => Coercion::Drop(format!("'{text}' must be one of: {}", allowed.join(", "))),
    }
}
