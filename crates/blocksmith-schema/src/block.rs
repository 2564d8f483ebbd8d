//! Content blocks and block keys

use std::collections::HashSet;

use rand::RngCore;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// Hex digits in a minted key
pub const KEY_LEN: usize = 12;

/// One structured content unit
///
/// Fields the manifest does not declare are preserved untouched in
/// `fields`; only declared fields are coerced and validated.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ContentBlock {
    /// Block type name, a key of the manifest
    #[serde(rename = "type")]
    pub block_type: String,
    /// Document-unique key
    pub key: String,
    /// Remaining fields
    #[serde(flatten)]
    pub fields: Map<String, Value>,
}

impl ContentBlock {
    /// Create block without fields
    #[inline]
    #[must_use]
    pub fn new(block_type: impl Into<String>, key: impl Into<String>) -> Self {
        Self {
            block_type: block_type.into(),
            key: key.into(),
            fields: Map::new(),
        }
    }

    /// With field value
    ///
    /// `type` and `key` are reserved and ignored here.
    #[must_use]
    pub fn with_field(mut self, name: impl Into<String>, value: Value) -> Self {
        let name = name.into();
        if name != "type" && name != "key" {
            self.fields.insert(name, value);
        }
        self
    }

    /// Get field value
    #[inline]
    #[must_use]
    pub fn field(&self, name: &str) -> Option<&Value> {
        self.fields.get(name)
    }

    /// Render as a flat JSON object
    #[must_use]
    pub fn to_value(&self) -> Value {
        let mut map = Map::with_capacity(self.fields.len() + 2);
        map.insert("type".to_string(), Value::from(self.block_type.as_str()));
        map.insert("key".to_string(), Value::from(self.key.as_str()));
        for (name, value) in &self.fields {
            map.insert(name.clone(), value.clone());
        }
        Value::Object(map)
    }
}

/// Whether a value counts as empty for a required field
///
/// Null, blank strings, empty arrays and empty objects are all empty.
#[must_use]
pub fn is_blank(value: &Value) -> bool {
    match value {
        Value::Null => true,
        Value::String(s) => s.trim().is_empty(),
        Value::Array(items) => items.is_empty(),
        Value::Object(map) => map.is_empty(),
        Value::Bool(_) | Value::Number(_) => false,
    }
}

/// Issues document-unique keys from a pluggable random source
pub struct KeyMint<'r> {
    rng: &'r mut dyn RngCore,
    issued: HashSet<String>,
}

impl std::fmt::Debug for KeyMint<'_> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("KeyMint")
            .field("issued", &self.issued.len())
            .finish()
    }
}

impl<'r> KeyMint<'r> {
    /// Create mint over a random source
    #[must_use]
    pub fn new(rng: &'r mut dyn RngCore) -> Self {
        Self {
            rng,
            issued: HashSet::new(),
        }
    }

    /// Claim an existing key
    ///
    /// Returns false if the key was already issued or claimed.
    pub fn claim(&mut self, key: &str) -> bool {
        self.issued.insert(key.to_string())
    }

    /// Mint a fresh key
    pub fn mint(&mut self) -> String {
        loop {
            let key = format!("{:012x}", self.rng.next_u64() & 0xffff_ffff_ffff);
            if self.issued.insert(key.clone()) {
                return key;
            }
        }
    }

    /// Underlying random source
    pub fn rng(&mut self) -> &mut dyn RngCore {
        &mut *self.rng
    }
}
