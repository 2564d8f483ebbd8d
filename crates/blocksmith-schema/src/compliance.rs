//! Compliance validation
//!
//! A read-only walk of a block list against the manifest. Produces
//! [`ValidationWarning`]s and never mutates its input.
//!
//! Per block, in order:
//! 1. `type` present and known (an unknown type ends the block's checks)
//! 2. `key` present
//! 3. required fields present and non-empty
//! 4. typed fields satisfy their tag
//! 5. enum-constrained fields hold an allowed value
//! 6. vocabulary fields respect their allow-list and preferred entry
//! 7. record-list fields hold well-formed inline records
//!
//! Then, across the document: mandatory block types occupy the leading
//! positions in manifest order, and no two blocks share a key.

use std::collections::HashSet;

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::block::{is_blank, ContentBlock};
use crate::field::FieldTypeTag;
use crate::manifest::{BlockTypeSpec, SchemaManifest};

/// Placeholder block type used in warnings when `type` is absent
pub const MISSING_TYPE: &str = "<missing>";

/// A single compliance diagnostic
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ValidationWarning {
    /// Position of the block in the document
    pub block_index: usize,
    /// Block type, or [`MISSING_TYPE`]
    pub block_type: String,
    /// Offending field, if the warning is field-level
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub field: Option<String>,
    /// Human-readable description
    pub message: String,
}

impl ValidationWarning {
    fn block(index: usize, block_type: &str, message: impl Into<String>) -> Self {
        Self {
            block_index: index,
            block_type: block_type.to_string(),
            field: None,
            message: message.into(),
        }
    }

    fn field(index: usize, block_type: &str, field: &str, message: impl Into<String>) -> Self {
        Self {
            block_index: index,
            block_type: block_type.to_string(),
            field: Some(field.to_string()),
            message: message.into(),
        }
    }
}

impl std::fmt::Display for ValidationWarning {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match &self.field {
            Some(field) => write!(
                f,
                "block {} ({}) field '{}': {}",
                self.block_index, self.block_type, field, self.message
            ),
            None => write!(
                f,
                "block {} ({}): {}",
                self.block_index, self.block_type, self.message
            ),
        }
    }
}

/// Outcome of a validation pass
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ComplianceReport {
    /// True iff `warnings` is empty
    pub compliant: bool,
    /// Warnings in document order
    pub warnings: Vec<ValidationWarning>,
}

impl ComplianceReport {
    /// Build report from warnings
    #[must_use]
    pub fn from_warnings(warnings: Vec<ValidationWarning>) -> Self {
        Self {
            compliant: warnings.is_empty(),
            warnings,
        }
    }

    /// Warnings joined into one message
    #[must_use]
    pub fn summary(&self) -> String {
        self.warnings
            .iter()
            .map(ToString::to_string)
            .collect::<Vec<_>>()
            .join("; ")
    }
}

/// Read-only checker for block lists
#[derive(Debug, Clone, Copy)]
pub struct ComplianceValidator<'m> {
    manifest: &'m SchemaManifest,
}

impl<'m> ComplianceValidator<'m> {
    /// Create validator over a manifest
    #[inline]
    #[must_use]
    pub fn new(manifest: &'m SchemaManifest) -> Self {
        Self { manifest }
    }

    /// Validate raw JSON blocks
    #[must_use]
    pub fn validate(&self, blocks: &[Value]) -> ComplianceReport {
        let mut warnings = Vec::new();
        for (index, block) in blocks.iter().enumerate() {
            self.check_block(index, block, &mut warnings);
        }
        self.check_mandatory_order(blocks, &mut warnings);
        check_unique_keys(blocks, &mut warnings);
        ComplianceReport::from_warnings(warnings)
    }

    /// Validate typed blocks
    #[must_use]
    pub fn validate_blocks(&self, blocks: &[ContentBlock]) -> ComplianceReport {
        let values: Vec<Value> = blocks.iter().map(ContentBlock::to_value).collect();
        self.validate(&values)
    }

    fn check_block(&self, index: usize, block: &Value, out: &mut Vec<ValidationWarning>) {
        let Some(map) = block.as_object() else {
            out.push(ValidationWarning::block(index, MISSING_TYPE, "block is not an object"));
            return;
        };

        // (1) type
        let Some(block_type) = map.get("type").and_then(Value::as_str) else {
            out.push(ValidationWarning::block(index, MISSING_TYPE, "missing block type"));
            return;
        };
        let Some(spec) = self.manifest.block(block_type) else {
            out.push(ValidationWarning::block(
                index,
                block_type,
                format!("unknown block type '{block_type}'"),
            ));
            return;
        };

        // (2) key
        let key_ok = map
            .get("key")
            .and_then(Value::as_str)
            .is_some_and(|k| !k.trim().is_empty());
        if !key_ok {
            out.push(ValidationWarning::block(index, block_type, "missing block key"));
        }

        // (3) required fields
        for field in &spec.required_fields {
            if map.get(field).map_or(true, is_blank) {
                out.push(ValidationWarning::field(
                    index,
                    block_type,
                    field,
                    "required field is missing or empty",
                ));
            }
        }

        // (4) type tags
        for (field, tag) in &spec.field_types {
            // enum membership is reported by (5)
            if *tag == FieldTypeTag::Enum {
                continue;
            }
            let Some(value) = map.get(field).filter(|v| !v.is_null()) else {
                continue;
            };
            if !tag.accepts(value, None) {
                out.push(ValidationWarning::field(
                    index,
                    block_type,
                    field,
                    format!("value does not satisfy type {tag}"),
                ));
            }
        }

        // (5) enums
        for (field, allowed) in &spec.field_enums {
            let Some(value) = map.get(field).filter(|v| !v.is_null()) else {
                continue;
            };
            let ok = value
                .as_str()
                .is_some_and(|s| allowed.iter().any(|a| a == s));
            if !ok {
                out.push(ValidationWarning::field(
                    index,
                    block_type,
                    field,
                    format!("value must be one of: {}", allowed.join(", ")),
                ));
            }
        }

        self.check_structures(index, spec, map, out);
    }

    /// (6) vocabularies and (7) record lists
    fn check_structures(
        &self,
        index: usize,
        spec: &BlockTypeSpec,
        map: &serde_json::Map<String, Value>,
        out: &mut Vec<ValidationWarning>,
    ) {
        let block_type = spec.block_type.as_str();
        for (field, vocabulary) in &spec.vocabularies {
            if !spec.is_required(field) && map.get(field).is_none() {
                continue;
            }
            for problem in vocabulary.violations(map.get(field)) {
                out.push(ValidationWarning::field(index, block_type, field, problem));
            }
        }
        for (field, records) in &spec.record_lists {
            if !spec.is_required(field) && map.get(field).is_none() {
                continue;
            }
            for problem in records.violations(map.get(field)) {
                out.push(ValidationWarning::field(index, block_type, field, problem));
            }
        }
    }

    fn check_mandatory_order(&self, blocks: &[Value], out: &mut Vec<ValidationWarning>) {
        let type_at = |i: usize| blocks[i].get("type").and_then(Value::as_str);

        let mut expected_slot = 0;
        for mandatory in self.manifest.mandatory_types() {
            let Some(position) = (0..blocks.len()).find(|&i| type_at(i) == Some(mandatory)) else {
                continue;
            };
            if position != expected_slot {
                out.push(ValidationWarning::block(
                    position,
                    mandatory,
                    format!("mandatory block must be at position {expected_slot}"),
                ));
            }
            expected_slot += 1;
        }
    }
}

fn check_unique_keys(blocks: &[Value], out: &mut Vec<ValidationWarning>) {
    let mut seen = HashSet::new();
    for (index, block) in blocks.iter().enumerate() {
        let Some(key) = block.get("key").and_then(Value::as_str).filter(|k| !k.trim().is_empty()) else {
            continue;
        };
        if !seen.insert(key) {
            let block_type = block.get("type").and_then(Value::as_str).unwrap_or(MISSING_TYPE);
            out.push(ValidationWarning::field(
                index,
                block_type,
                "key",
                format!("duplicate block key '{key}'"),
            ));
        }
    }
}
