//! Reference sanitizer
//!
//! Walks a field value depth-first (array members before nested objects) and
//! rewrites every ref-like object into the strict reference shape. The walk
//! builds a new value and is idempotent: every rewritten object carries
//! `type: "reference"` and only scalar reference keys.

use blocksmith_schema::looks_like_reference;
use blocksmith_schema::reference::{LEGACY_REFERENCE_KEYS, REFERENCE_KEYS, REFERENCE_TYPE};
use serde_json::{Map, Value};

/// Sanitized value and a description of every change, prefixed by its path
#[derive(Debug, Clone, PartialEq)]
pub struct Sanitized {
    /// Rewritten value
    pub value: Value,
    /// One entry per rewrite
    pub changes: Vec<String>,
}

/// Sanitize every ref-like object inside `value`
#[must_use]
pub fn sanitize_references(value: &Value) -> Sanitized {
    let mut changes = Vec::new();
    let value = walk(value, "", &mut changes);
    Sanitized { value, changes }
}

fn walk(value: &Value, path: &str, changes: &mut Vec<String>) -> Value {
    match value {
        Value::Array(items) => Value::Array(
            items
                .iter()
                .enumerate()
                .map(|(i, item)| walk(item, &format!("{path}[{i}]"), changes))
                .collect(),
        ),
        Value::Object(map) if looks_like_reference(value) => {
            Value::Object(normalize_reference(map, path, changes))
        }
        Value::Object(map) => {
            let mut out = Map::new();
            for (key, child) in map {
                if !child.is_array() && !child.is_object() {
                    out.insert(key.clone(), child.clone());
                }
            }
            for (key, child) in map.iter().filter(|(_, v)| v.is_array()) {
                out.insert(key.clone(), walk(child, &join(path, key), changes));
            }
            for (key, child) in map.iter().filter(|(_, v)| v.is_object()) {
                out.insert(key.clone(), walk(child, &join(path, key), changes));
            }
            Value::Object(out)
        }
        scalar => scalar.clone(),
    }
}

fn join(path: &str, key: &str) -> String {
    if path.is_empty() {
        key.to_string()
    } else {
        format!("{path}.{key}")
    }
}

fn at(path: &str) -> &str {
    if path.is_empty() {
        "<value>"
    } else {
        path
    }
}

fn normalize_reference(map: &Map<String, Value>, path: &str, changes: &mut Vec<String>) -> Map<String, Value> {
    let mut out = Map::new();

    // canonical spellings win over underscore ones
    for (legacy, canonical) in LEGACY_REFERENCE_KEYS {
        let Some(value) = map.get(legacy) else {
            continue;
        };
        if map.contains_key(canonical) {
            changes.push(format!("{}: dropped '{legacy}' shadowed by '{canonical}'", at(path)));
        } else {
            out.insert(canonical.to_string(), value.clone());
            changes.push(format!("{}: renamed '{legacy}' to '{canonical}'", at(path)));
        }
    }
    for canonical in REFERENCE_KEYS {
        if let Some(value) = map.get(canonical) {
            out.insert(canonical.to_string(), value.clone());
        }
    }
    for key in map.keys() {
        let known = REFERENCE_KEYS.contains(&key.as_str())
            || LEGACY_REFERENCE_KEYS.iter().any(|(legacy, _)| legacy == key);
        if !known {
            changes.push(format!("{}: removed key '{key}'", at(path)));
        }
    }

    if out.get("type").and_then(Value::as_str) != Some(REFERENCE_TYPE) {
        out.insert("type".to_string(), Value::from(REFERENCE_TYPE));
        changes.push(format!("{}: set type to '{REFERENCE_TYPE}'", at(path)));
    }
    if out.get("ref").is_some_and(|id| !id.is_string()) {
        out.remove("ref");
        changes.push(format!("{}: removed non-string ref", at(path)));
    }
    if out.get("key").is_some_and(|key| !key.is_string()) {
        out.remove("key");
        changes.push(format!("{}: removed non-string key", at(path)));
    }
    if out.get("weak").is_some_and(|weak| !weak.is_boolean()) {
        out.remove("weak");
        changes.push(format!("{}: removed non-boolean weak", at(path)));
    }
    out
}
