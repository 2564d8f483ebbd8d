//! Plain reference-list repair
//!
//! A `referenceArray` field without an allow-list must hold references
//! only. Bare identifier strings are wrapped; inline records and anything
//! else that is not a reference object are removed.

use blocksmith_schema::{looks_like_reference, ReferenceObject};
use serde_json::Value;

/// Result of checking one reference-list field
#[derive(Debug, Clone, PartialEq)]
pub enum ReferenceListRepair {
    /// Every entry is already a reference object
    Unchanged,
    /// Entries were wrapped or removed
    Replaced {
        /// Repaired list; `None` when no entry survived
        value: Option<Value>,
        /// Entries removed as structural violations
        violations: Vec<String>,
        /// Entries rewritten into references
        fixes: Vec<String>,
    },
}

/// Repair a reference-list field value
///
/// Non-array values are left alone; coercion has already dropped them.
#[must_use]
pub fn repair_reference_list(value: &Value) -> ReferenceListRepair {
    let Some(entries) = value.as_array() else {
        return ReferenceListRepair::Unchanged;
    };

    let mut kept = Vec::with_capacity(entries.len());
    let mut violations = Vec::new();
    let mut fixes = Vec::new();
    for (index, entry) in entries.iter().enumerate() {
        if ReferenceObject::from_value(entry).is_some() {
            kept.push(entry.clone());
            continue;
        }
        match entry {
            Value::String(id) if !id.trim().is_empty() => {
                let id = id.trim();
                fixes.push(format!("entry {index}: wrapped id '{id}' as a reference"));
                kept.push(ReferenceObject::new(id).to_value());
            }
            Value::Object(_) if !looks_like_reference(entry) => violations.push(format!(
                "entry {index} removed: inline record where only references are allowed"
            )),
            _ => violations.push(format!("entry {index} removed: not a usable reference")),
        }
    }

    if violations.is_empty() && fixes.is_empty() {
        return ReferenceListRepair::Unchanged;
    }
    ReferenceListRepair::Replaced {
        value: (!kept.is_empty()).then_some(Value::Array(kept)),
        violations,
        fixes,
    }
}
