//! Whole-document repair
//!
//! ```text
//! raw blocks ─→ drop unusable blocks ─→ fix keys ─→ repair fields ─→ reorder mandatory
//! ```
//!
//! Blocks that cannot be typed against the manifest are removed, never
//! guessed at. Everything else is repaired in place and kept.

use std::collections::BTreeSet;

use blocksmith_schema::compliance::MISSING_TYPE;
use blocksmith_schema::{BlockTypeSpec, ContentBlock, KeyMint, SchemaManifest};
use rand::RngCore;
use serde_json::{Map, Value};

use crate::block::repair_fields;
use crate::report::{BlockScope, RepairLog, DEFAULT_VALUE_LIMIT};

/// Repaired blocks plus the record of what was done
#[derive(Debug, Clone)]
pub struct RepairOutcome {
    /// Blocks in final order
    pub blocks: Vec<ContentBlock>,
    /// Every repair, in the order it happened
    pub log: RepairLog,
}

impl RepairOutcome {
    /// Blocks as raw JSON
    #[must_use]
    pub fn to_values(&self) -> Vec<Value> {
        self.blocks.iter().map(ContentBlock::to_value).collect()
    }
}

/// Repairs extracted block lists against a manifest
#[derive(Debug, Clone)]
pub struct DocumentRepairer<'m> {
    manifest: &'m SchemaManifest,
    selected: Option<BTreeSet<String>>,
    value_limit: usize,
}

impl<'m> DocumentRepairer<'m> {
    /// Create repairer over a manifest
    #[must_use]
    pub fn new(manifest: &'m SchemaManifest) -> Self {
        Self {
            manifest,
            selected: None,
            value_limit: DEFAULT_VALUE_LIMIT,
        }
    }

    /// Drop optional blocks whose type is not in `types`
    ///
    /// Mandatory types are always kept.
    #[must_use]
    pub fn with_selected_types<I, S>(mut self, types: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.selected = Some(types.into_iter().map(Into::into).collect());
        self
    }

    /// Maximum characters of a value rendered into a log line
    #[must_use]
    pub fn with_value_limit(mut self, limit: usize) -> Self {
        self.value_limit = limit;
        self
    }

    /// Repair a raw block list
    ///
    /// Total: every input yields an outcome, possibly with zero blocks.
    /// Keys are minted from `rng`, so a seeded source gives reproducible
    /// output.
    pub fn repair(&self, raw_blocks: &[Value], rng: &mut dyn RngCore) -> RepairOutcome {
        let mut log = RepairLog::new(self.value_limit);
        let mut keys = KeyMint::new(rng);

        let mut blocks = Vec::with_capacity(raw_blocks.len());
        for (index, raw) in raw_blocks.iter().enumerate() {
            let Some((spec, source)) = self.admit(index, raw, &mut log) else {
                continue;
            };
            let scope = BlockScope::new(index, &spec.block_type);
            let key = assign_key(source.get("key"), &scope, &mut keys, &mut log);
            let fields = repair_fields(spec, &scope, source, &mut keys, &mut log);
            blocks.push((
                index,
                ContentBlock {
                    block_type: spec.block_type.clone(),
                    key,
                    fields,
                },
            ));
        }

        let blocks = self.order_mandatory(blocks, &mut log);
        tracing::debug!(
            input = raw_blocks.len(),
            output = blocks.len(),
            repairs = log.events().len(),
            "document repaired"
        );
        RepairOutcome { blocks, log }
    }

    /// Resolve the block's type spec, or log why the block is dropped
    fn admit<'v>(
        &self,
        index: usize,
        raw: &'v Value,
        log: &mut RepairLog,
    ) -> Option<(&'m BlockTypeSpec, &'v Map<String, Value>)> {
        let Some(source) = raw.as_object() else {
            log.violation(&BlockScope::new(index, MISSING_TYPE), None, "dropped block: not an object");
            return None;
        };
        let Some(block_type) = source.get("type").and_then(Value::as_str) else {
            log.violation(&BlockScope::new(index, MISSING_TYPE), None, "dropped block: missing type");
            return None;
        };
        let scope = BlockScope::new(index, block_type);
        let Some(spec) = self.manifest.block(block_type) else {
            log.violation(&scope, None, format!("dropped block: unknown type '{block_type}'"));
            return None;
        };
        if let Some(selected) = &self.selected {
            if !spec.mandatory && !selected.contains(block_type) {
                log.violation(&scope, None, format!("dropped block: type '{block_type}' was not selected"));
                return None;
            }
        }
        Some((spec, source))
    }

    /// Move the first block of each mandatory type to the front, in
    /// manifest order; everything else keeps its relative order
    fn order_mandatory(&self, blocks: Vec<(usize, ContentBlock)>, log: &mut RepairLog) -> Vec<ContentBlock> {
        let mut slots: Vec<Option<(usize, ContentBlock)>> = blocks.into_iter().map(Some).collect();
        let mut ordered = Vec::with_capacity(slots.len());

        for mandatory in self.manifest.mandatory_types() {
            let position = slots
                .iter()
                .position(|slot| slot.as_ref().is_some_and(|(_, b)| b.block_type == mandatory));
            if let Some((index, block)) = position.and_then(|p| slots[p].take()) {
                let target = ordered.len();
                if position != Some(target) || slots[..target].iter().any(Option::is_some) {
                    log.fixed_note(
                        &BlockScope::new(index, mandatory),
                        None,
                        format!("moved mandatory block to position {target}"),
                    );
                }
                ordered.push(block);
            }
        }
        ordered.extend(slots.into_iter().flatten().map(|(_, block)| block));
        ordered
    }
}

/// Keep a usable, unclaimed key or mint a fresh one
fn assign_key(existing: Option<&Value>, scope: &BlockScope<'_>, keys: &mut KeyMint<'_>, log: &mut RepairLog) -> String {
    match existing.and_then(Value::as_str) {
        Some(key) if !key.trim().is_empty() && keys.claim(key) => key.to_string(),
        Some(key) if !key.trim().is_empty() => {
            let fresh = keys.mint();
            log.fixed_note(scope, Some("key"), format!("duplicate key '{key}' replaced with '{fresh}'"));
            fresh
        }
        _ => {
            let fresh = keys.mint();
            log.fixed_note(scope, Some("key"), format!("minted missing key '{fresh}'"));
            fresh
        }
    }
}
