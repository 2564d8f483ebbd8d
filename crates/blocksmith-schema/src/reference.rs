//! Reference objects
//!
//! A reference names another entity by identifier and never carries an
//! inline record. The canonical shape is
//! `{ "type": "reference", "ref": <id>, "key"?: <string>, "weak"?: <bool> }`
//! and no other key is permitted.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// Value of the `type` tag on every reference object
pub const REFERENCE_TYPE: &str = "reference";

/// The only keys a reference object may carry
pub const REFERENCE_KEYS: [&str; 4] = ["type", "ref", "key", "weak"];

/// Underscore spellings accepted as ref-like, with their canonical names
pub const LEGACY_REFERENCE_KEYS: [(&str, &str); 4] = [
    ("_type", "type"),
    ("_ref", "ref"),
    ("_key", "key"),
    ("_weak", "weak"),
];

/// A validated reference object
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "ReferenceWire", into = "ReferenceWire")]
pub struct ReferenceObject {
    /// Referenced identifier (never empty)
    pub id: String,
    /// Stable key within the containing array
    pub key: Option<String>,
    /// Weak reference flag
    pub weak: Option<bool>,
}

#[derive(Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
struct ReferenceWire {
    #[serde(rename = "type")]
    kind: String,
    #[serde(rename = "ref")]
    id: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    key: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    weak: Option<bool>,
}

impl TryFrom<ReferenceWire> for ReferenceObject {
    type Error = String;

    fn try_from(wire: ReferenceWire) -> Result<Self, Self::Error> {
        if wire.kind != REFERENCE_TYPE {
            return Err(format!("expected type 'reference', got '{}'", wire.kind));
        }
        if wire.id.trim().is_empty() {
            return Err("empty ref".to_string());
        }
        Ok(Self {
            id: wire.id,
            key: wire.key,
            weak: wire.weak,
        })
    }
}

impl From<ReferenceObject> for ReferenceWire {
    fn from(reference: ReferenceObject) -> Self {
        Self {
            kind: REFERENCE_TYPE.to_string(),
            id: reference.id,
            key: reference.key,
            weak: reference.weak,
        }
    }
}

impl ReferenceObject {
    /// Create reference to identifier
    #[inline]
    #[must_use]
    pub fn new(id: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            key: None,
            weak: None,
        }
    }

    /// With array key
    #[inline]
    #[must_use]
    pub fn with_key(mut self, key: impl Into<String>) -> Self {
        self.key = Some(key.into());
        self
    }

    /// Strictly parse a JSON value
    ///
    /// Returns `None` for anything that is not exactly a reference object:
    /// extra keys, a wrong `type`, an empty or non-string `ref`.
    #[must_use]
    pub fn from_value(value: &Value) -> Option<Self> {
        Self::deserialize(value).ok()
    }

    /// Render as canonical JSON
    #[must_use]
    pub fn to_value(&self) -> Value {
        let mut map = Map::new();
        map.insert("type".to_string(), Value::from(REFERENCE_TYPE));
        map.insert("ref".to_string(), Value::from(self.id.as_str()));
        if let Some(key) = &self.key {
            map.insert("key".to_string(), Value::from(key.as_str()));
        }
        if let Some(weak) = self.weak {
            map.insert("weak".to_string(), Value::Bool(weak));
        }
        Value::Object(map)
    }
}

/// Check whether a value looks like a reference
///
/// True for any object bearing a ref-like identifier key (`ref`, `_ref`) or
/// an explicit `type`/`_type` of `"reference"`. Says nothing about validity.
#[must_use]
pub fn looks_like_reference(value: &Value) -> bool {
    let Some(map) = value.as_object() else {
        return false;
    };
    map.contains_key("ref")
        || map.contains_key("_ref")
        || ["type", "_type"]
            .iter()
            .any(|k| map.get(*k).and_then(Value::as_str) == Some(REFERENCE_TYPE))
}
