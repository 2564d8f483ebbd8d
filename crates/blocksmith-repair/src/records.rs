//! Inline-record list repair
//!
//! Entries must be whole records (title string plus rich-text body). Bare
//! references and malformed entries are removed; if nothing survives, one
//! placeholder record is synthesized so the list is never empty.

use blocksmith_schema::rich_text::paragraph;
use blocksmith_schema::{looks_like_reference, FieldTypeTag, KeyMint, RecordListSpec};
use serde_json::{Map, Value};

use crate::coerce::{coerce, Coercion};

/// Result of repairing one record-list field
#[derive(Debug, Clone, PartialEq)]
pub struct RecordRepair {
    /// Repaired list, always non-empty
    pub value: Value,
    /// Structural violations detected (entries removed)
    pub violations: Vec<String>,
    /// Cosmetic fixes applied
    pub fixes: Vec<String>,
}

impl RecordRepair {
    /// Whether the field needed no work
    #[inline]
    #[must_use]
    pub fn is_clean(&self) -> bool {
        self.violations.is_empty() && self.fixes.is_empty()
    }
}

/// Repair a record-list field value
pub fn repair_records(value: Option<&Value>, spec: &RecordListSpec, keys: &mut KeyMint<'_>) -> RecordRepair {
    let mut violations = Vec::new();
    let mut fixes = Vec::new();

    let entries: Vec<&Value> = match value {
        Some(Value::Array(items)) => items.iter().collect(),
        Some(single @ Value::Object(_)) => {
            fixes.push("wrapped a single record in a list".to_string());
            vec![single]
        }
        Some(other) => {
            violations.push(format!("expected a list of records, got {}", kind(other)));
            Vec::new()
        }
        None => {
            violations.push("record list is missing".to_string());
            Vec::new()
        }
    };

    let mut records = Vec::with_capacity(entries.len());
    for (index, entry) in entries.into_iter().enumerate() {
        match repair_entry(entry, spec, keys, &mut fixes, index) {
            Ok(record) => records.push(record),
            Err(reason) => violations.push(format!("entry {index} removed: {reason}")),
        }
    }

    if records.is_empty() {
        records.push(placeholder(spec, keys));
        fixes.push("synthesized a placeholder record".to_string());
    }

    RecordRepair {
        value: Value::Array(records),
        violations,
        fixes,
    }
}

fn repair_entry(
    entry: &Value,
    spec: &RecordListSpec,
    keys: &mut KeyMint<'_>,
    fixes: &mut Vec<String>,
    index: usize,
) -> Result<Value, String> {
    if looks_like_reference(entry) {
        return Err("bare reference where an inline record is required".to_string());
    }
    let Some(source) = entry.as_object() else {
        return Err("entry is not an object".to_string());
    };

    let mut record: Map<String, Value> = source.clone();
    for (field, tag) in [
        (&spec.title_field, FieldTypeTag::String),
        (&spec.body_field, FieldTypeTag::RichTextArray),
    ] {
        let Some(current) = record.get(field.as_str()) else {
            continue;
        };
        match coerce(tag, current, None, keys) {
            Coercion::Unchanged => {}
            Coercion::Fixed(fixed) => {
                fixes.push(format!("entry {index}: coerced '{field}' to {tag}"));
                record.insert(field.clone(), fixed);
            }
            Coercion::Drop(_) => {
                record.remove(field.as_str());
            }
        }
    }

    let mut record = Value::Object(record);
    if let Some(reason) = spec.entry_violation(&record) {
        return Err(reason);
    }

    let existing = record
        .get("key")
        .and_then(Value::as_str)
        .filter(|key| !key.trim().is_empty())
        .map(ToString::to_string);
    let fresh = match existing {
        Some(key) if keys.claim(&key) => None,
        Some(key) => {
            let fresh = keys.mint();
            fixes.push(format!("entry {index}: duplicate key '{key}' replaced with '{fresh}'"));
            Some(fresh)
        }
        None => {
            let fresh = keys.mint();
            fixes.push(format!("entry {index}: minted key '{fresh}'"));
            Some(fresh)
        }
    };
    if let (Some(fresh), Some(map)) = (fresh, record.as_object_mut()) {
        map.insert("key".to_string(), Value::from(fresh));
    }
    Ok(record)
}

fn placeholder(spec: &RecordListSpec, keys: &mut KeyMint<'_>) -> Value {
    let mut record = Map::new();
    record.insert("key".to_string(), Value::from(keys.mint()));
    record.insert(spec.title_field.clone(), Value::from(spec.placeholder_title.as_str()));
    let (paragraph_key, span_key) = (keys.mint(), keys.mint());
    record.insert(
        spec.body_field.clone(),
        Value::Array(vec![paragraph(&spec.placeholder_body, &paragraph_key, &span_key)]),
    );
    Value::Object(record)
}

fn kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(_) => "an array",
        Value::Object(_) => "an object",
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::rngs::StdRng;
    use rand::SeedableRng;
    use serde_json::json;

    fn repair(value: Option<Value>) -> RecordRepair {
        let mut rng = StdRng::seed_from_u64(11);
        let mut keys = KeyMint::new(&mut rng);
        repair_records(value.as_ref(), &RecordListSpec::default(), &mut keys)
    }

    fn rich(text: &str) -> Value {
        json!([paragraph(text, "p", "s")])
    }

    #[test]
    fn bare_references_are_replaced_by_one_placeholder() {
        let repaired = repair(Some(json!([
            {"_type": "reference", "_ref": "faq-1"},
            {"type": "reference", "ref": "faq-2"}
        ])));
        assert_eq!(repaired.violations.len(), 2);
        let items = repaired.value.as_array().unwrap();
        assert_eq!(items.len(), 1);
        assert_eq!(
            items[0]["question"],
            json!(RecordListSpec::default().placeholder_title)
        );
        assert!(RecordListSpec::default().violations(Some(&repaired.value)).is_empty());
    }

    #[test]
    fn valid_records_survive_with_keys() {
        let repaired = repair(Some(json!([
            {"key": "q1", "question": "What?", "answer": rich("This.")},
            {"question": "Why?", "answer": "Because."}
        ])));
        assert!(repaired.violations.is_empty());
        let items = repaired.value.as_array().unwrap();
        assert_eq!(items.len(), 2);
        assert_eq!(items[0]["key"], "q1");
        assert_eq!(items[1]["answer"][0]["children"][0]["text"], "Because.");
        assert_eq!(items[1]["key"].as_str().map(str::len), Some(12));
    }

    #[test]
    fn malformed_entries_are_removed() {
        let repaired = repair(Some(json!([
            "just text",
            {"question": "", "answer": rich("x")},
            {"question": "Kept?", "answer": rich("Yes.")}
        ])));
        assert_eq!(repaired.violations.len(), 2);
        assert_eq!(repaired.value.as_array().map(Vec::len), Some(1));
    }

    #[test]
    fn single_record_is_wrapped_and_repaired() {
        let repaired = repair(Some(json!({"question": "Q", "answer": "plain text"})));
        assert!(repaired.violations.is_empty());
        assert!(repaired.fixes.iter().any(|fix| fix == "wrapped a single record in a list"));
        let items = repaired.value.as_array().unwrap();
        assert_eq!(items.len(), 1);
        assert_eq!(items[0]["question"], "Q");
        assert_eq!(items[0]["answer"][0]["children"][0]["text"], "plain text");
    }

    #[test]
    fn single_reference_becomes_a_placeholder() {
        let repaired = repair(Some(json!({"_type": "reference", "_ref": "faq-1"})));
        assert_eq!(repaired.violations.len(), 1);
        assert_eq!(repaired.value.as_array().map(Vec::len), Some(1));
        assert_eq!(repaired.value[0]["question"], RecordListSpec::default().placeholder_title.as_str());
    }

    #[test]
    fn missing_or_wrong_shape_gets_placeholder() {
        for value in [None, Some(json!("text")), Some(json!([]))] {
            let repaired = repair(value);
            assert_eq!(repaired.value.as_array().map(Vec::len), Some(1));
            assert!(!repaired.fixes.is_empty());
        }
    }

    #[test]
    fn clean_list_is_untouched() {
        let value = json!([{"key": "q1", "question": "What?", "answer": rich("This.")}]);
        let repaired = repair(Some(value.clone()));
        assert!(repaired.is_clean());
        assert_eq!(repaired.value, value);
    }
}
