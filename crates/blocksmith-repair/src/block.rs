//! Field-level repair of a single block
//!
//! Runs, in order: type coercion of tagged fields, reference sanitization of
//! every field, then the block-specific repairers (plain reference lists,
//! allow-listed references and inline-record lists). The source map is
//! never mutated.

use std::borrow::Cow;

use blocksmith_schema::{BlockTypeSpec, FieldTypeTag, KeyMint};
use serde_json::{Map, Value};

use crate::coerce::{canonicalize_enum, coerce, Coercion};
use crate::records::repair_records;
use crate::reference_list::{repair_reference_list, ReferenceListRepair};
use crate::references::sanitize_references;
use crate::report::{BlockScope, RepairLog};
use crate::vocabulary::{repair_vocabulary, VocabularyRepair};

/// Fields that belong to the block envelope rather than its content
const ENVELOPE_FIELDS: [&str; 2] = ["type", "key"];

/// Repair the content fields of one block
///
/// Returns the repaired field map without `type` and `key`. Optional
/// vocabulary and record-list fields are only repaired when present.
pub fn repair_fields(
    spec: &BlockTypeSpec,
    scope: &BlockScope<'_>,
    source: &Map<String, Value>,
    keys: &mut KeyMint<'_>,
    log: &mut RepairLog,
) -> Map<String, Value> {
    let mut fields = Map::new();
    for (name, value) in source {
        if ENVELOPE_FIELDS.contains(&name.as_str()) {
            continue;
        }
        if let Some(repaired) = repair_field(spec, scope, name, value, keys, log) {
            fields.insert(name.clone(), repaired);
        }
    }

    for (name, tag) in &spec.field_types {
        if *tag != FieldTypeTag::ReferenceArray || spec.vocabularies.contains_key(name) {
            continue;
        }
        let Some(current) = fields.get(name).cloned() else {
            continue;
        };
        if let ReferenceListRepair::Replaced { value, violations, fixes } = repair_reference_list(&current) {
            for violation in violations {
                log.violation(scope, Some(name.as_str()), violation);
            }
            for fix in fixes {
                log.fixed_note(scope, Some(name.as_str()), fix);
            }
            match value {
                Some(value) => {
                    fields.insert(name.clone(), value);
                }
                None => {
                    log.dropped(scope, name, &current, "no usable references remain");
                    fields.remove(name);
                }
            }
        }
    }

    for (name, vocabulary) in &spec.vocabularies {
        if !spec.is_required(name) && !fields.contains_key(name) {
            continue;
        }
        if let VocabularyRepair::Replaced { value, violations } =
            repair_vocabulary(fields.get(name), vocabulary, keys)
        {
            for violation in violations {
                log.violation(scope, Some(name.as_str()), violation);
            }
            log.fixed_note(scope, Some(name.as_str()), "regenerated reference selection");
            fields.insert(name.clone(), value);
        }
    }

    for (name, records) in &spec.record_lists {
        if !spec.is_required(name) && !fields.contains_key(name) {
            continue;
        }
        let repaired = repair_records(fields.get(name), records, keys);
        if repaired.is_clean() {
            continue;
        }
        for violation in repaired.violations {
            log.violation(scope, Some(name.as_str()), violation);
        }
        for fix in repaired.fixes {
            log.fixed_note(scope, Some(name.as_str()), fix);
        }
        fields.insert(name.clone(), repaired.value);
    }

    fields
}

fn repair_field(
    spec: &BlockTypeSpec,
    scope: &BlockScope<'_>,
    name: &str,
    value: &Value,
    keys: &mut KeyMint<'_>,
    log: &mut RepairLog,
) -> Option<Value> {
    let mut current = Cow::Borrowed(value);

    let tag = spec.field_type(name);
    if let Some(tag) = tag {
        let step = coerce(tag, &current, spec.field_enum(name), keys);
        current = apply(step, scope, name, current, log)?;
    }
    if let Some(allowed) = spec.field_enum(name).filter(|_| tag != Some(FieldTypeTag::Enum)) {
        let step = canonicalize_enum(&current, allowed);
        current = apply(step, scope, name, current, log)?;
    }

    let sanitized = sanitize_references(&current);
    for change in sanitized.changes {
        log.fixed_note(scope, Some(name), change);
    }
    Some(sanitized.value)
}

fn apply<'v>(
    step: Coercion,
    scope: &BlockScope<'_>,
    name: &str,
    current: Cow<'v, Value>,
    log: &mut RepairLog,
) -> Option<Cow<'v, Value>> {
    match step {
        Coercion::Unchanged => Some(current),
        Coercion::Fixed(fixed) => {
            log.fixed(scope, name, &current, &fixed);
            Some(Cow::Owned(fixed))
        }
        Coercion::Drop(reason) => {
            log.dropped(scope, name, &current, &reason);
            None
        }
    }
}
