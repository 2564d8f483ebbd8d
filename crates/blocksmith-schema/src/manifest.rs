//! Schema manifest
//!
//! Declarative description of every block type a document may contain. The
//! manifest is loaded once from operator-controlled configuration and never
//! mutated afterwards; replacing it means swapping the whole value.

use std::collections::{BTreeMap, HashSet};
use std::path::Path;

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::error::{ManifestError, ManifestResult};
use crate::field::FieldTypeTag;
use crate::reference::{looks_like_reference, ReferenceObject};
use crate::rich_text::is_rich_text;

/// Number of block types that must be flagged mandatory
pub const MANDATORY_BLOCK_COUNT: usize = 2;

/// Default cap on entries of a vocabulary-constrained field
pub const DEFAULT_VOCABULARY_ENTRIES: usize = 4;

/// Allow-list for a reference field
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ReferenceVocabulary {
    /// Identifiers a reference may point at
    pub allowed: Vec<String>,
    /// Identifier pinned at index 0
    pub preferred: String,
    /// Maximum number of entries
    #[serde(default = "default_max_entries")]
    pub max_entries: usize,
}

fn default_max_entries() -> usize {
    DEFAULT_VOCABULARY_ENTRIES
}

impl ReferenceVocabulary {
    /// Create vocabulary with default entry cap
    #[must_use]
    pub fn new(allowed: Vec<String>, preferred: impl Into<String>) -> Self {
        Self {
            allowed,
            preferred: preferred.into(),
            max_entries: DEFAULT_VOCABULARY_ENTRIES,
        }
    }

    /// Whether `id` is on the allow-list
    #[inline]
    #[must_use]
    pub fn allows(&self, id: &str) -> bool {
        self.allowed.iter().any(|a| a == id)
    }

    /// Every reason a field value breaks this vocabulary
    ///
    /// Empty when the value is a non-empty array of allowed, unique
    /// reference objects with the preferred identifier first and at most
    /// `max_entries` entries.
    #[must_use]
    pub fn violations(&self, value: Option<&Value>) -> Vec<String> {
        let Some(items) = value.and_then(Value::as_array) else {
            return vec!["expected an array of references".to_string()];
        };
        if items.is_empty() {
            return vec!["empty reference list".to_string()];
        }

        let mut problems = Vec::new();
        if items.len() > self.max_entries {
            problems.push(format!(
                "{} entries exceed the limit of {}",
                items.len(),
                self.max_entries
            ));
        }

        let mut seen = HashSet::new();
        for (i, item) in items.iter().enumerate() {
            match ReferenceObject::from_value(item) {
                Some(reference) => {
                    if !self.allows(&reference.id) {
                        problems.push(format!("entry {i}: '{}' is not allowed", reference.id));
                    }
                    if !seen.insert(reference.id.clone()) {
                        problems.push(format!("entry {i}: duplicate '{}'", reference.id));
                    }
                    if i == 0 && reference.id != self.preferred {
                        problems.push(format!(
                            "entry 0 must be '{}', got '{}'",
                            self.preferred, reference.id
                        ));
                    }
                }
                None => problems.push(format!("entry {i}: not a reference object")),
            }
        }
        problems
    }
}

/// Shape of a list of inline records (e.g. question/answer pairs)
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RecordListSpec {
    /// String field every record must carry
    #[serde(default = "default_title_field")]
    pub title_field: String,
    /// Rich-text field every record must carry
    #[serde(default = "default_body_field")]
    pub body_field: String,
    /// Title of the synthesized record when nothing usable survives
    #[serde(default = "default_placeholder_title")]
    pub placeholder_title: String,
    /// Body of the synthesized record
    #[serde(default = "default_placeholder_body")]
    pub placeholder_body: String,
}

fn default_title_field() -> String {
    "question".to_string()
}

fn default_body_field() -> String {
    "answer".to_string()
}

fn default_placeholder_title() -> String {
    "We're sorry, this question isn't available yet.".to_string()
}

fn default_placeholder_body() -> String {
    "We couldn't prepare an answer here. Please check back soon.".to_string()
}

impl Default for RecordListSpec {
    fn default() -> Self {
        Self {
            title_field: default_title_field(),
            body_field: default_body_field(),
            placeholder_title: default_placeholder_title(),
            placeholder_body: default_placeholder_body(),
        }
    }
}

impl RecordListSpec {
    /// Why a single entry is not a well-formed inline record
    #[must_use]
    pub fn entry_violation(&self, entry: &Value) -> Option<String> {
        if looks_like_reference(entry) {
            return Some("bare reference where an inline record is required".to_string());
        }
        let Some(record) = entry.as_object() else {
            return Some("entry is not an object".to_string());
        };
        let title_ok = record
            .get(&self.title_field)
            .and_then(Value::as_str)
            .is_some_and(|s| !s.trim().is_empty());
        if !title_ok {
            return Some(format!("missing '{}' string", self.title_field));
        }
        let body_ok = record
            .get(&self.body_field)
            .is_some_and(|body| is_rich_text(body) && body.as_array().is_some_and(|a| !a.is_empty()));
        if !body_ok {
            return Some(format!("missing '{}' rich text", self.body_field));
        }
        None
    }

    /// Every reason a field value breaks this record list
    #[must_use]
    pub fn violations(&self, value: Option<&Value>) -> Vec<String> {
        let Some(items) = value.and_then(Value::as_array) else {
            return vec!["expected an array of records".to_string()];
        };
        if items.is_empty() {
            return vec!["record list is empty".to_string()];
        }
        items
            .iter()
            .enumerate()
            .filter_map(|(i, entry)| {
                self.entry_violation(entry)
                    .map(|reason| format!("entry {i}: {reason}"))
            })
            .collect()
    }
}

/// Definition of one block type
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BlockTypeSpec {
    /// Unique type name
    #[serde(rename = "type")]
    pub block_type: String,
    /// Human description, used in prompts
    #[serde(default)]
    pub description: String,
    /// Whether every document leads with this block type
    #[serde(default)]
    pub mandatory: bool,
    /// Fields that must be present and non-empty
    #[serde(default)]
    pub required_fields: Vec<String>,
    /// Declared type per field
    #[serde(default)]
    pub field_types: BTreeMap<String, FieldTypeTag>,
    /// Allowed values per enum-constrained field, first value is the default
    #[serde(default)]
    pub field_enums: BTreeMap<String, Vec<String>>,
    /// Allow-lists for reference fields
    #[serde(default)]
    pub vocabularies: BTreeMap<String, ReferenceVocabulary>,
    /// Inline record lists
    #[serde(default)]
    pub record_lists: BTreeMap<String, RecordListSpec>,
}

impl BlockTypeSpec {
    /// Create empty spec for a type name
    #[must_use]
    pub fn new(block_type: impl Into<String>) -> Self {
        Self {
            block_type: block_type.into(),
            description: String::new(),
            mandatory: false,
            required_fields: Vec::new(),
            field_types: BTreeMap::new(),
            field_enums: BTreeMap::new(),
            vocabularies: BTreeMap::new(),
            record_lists: BTreeMap::new(),
        }
    }

    /// Mark as mandatory
    #[must_use]
    pub fn mandatory(mut self) -> Self {
        self.mandatory = true;
        self
    }

    /// With a required, typed field
    #[must_use]
    pub fn require(mut self, field: impl Into<String>, tag: FieldTypeTag) -> Self {
        let field = field.into();
        self.required_fields.push(field.clone());
        self.field_types.insert(field, tag);
        self
    }

    /// With an optional, typed field
    #[must_use]
    pub fn optional(mut self, field: impl Into<String>, tag: FieldTypeTag) -> Self {
        self.field_types.insert(field.into(), tag);
        self
    }

    /// With an enum vocabulary for a field
    #[must_use]
    pub fn with_enum(mut self, field: impl Into<String>, values: &[&str]) -> Self {
        self.field_enums
            .insert(field.into(), values.iter().map(ToString::to_string).collect());
        self
    }

    /// With a reference allow-list for a field
    #[must_use]
    pub fn with_vocabulary(mut self, field: impl Into<String>, vocabulary: ReferenceVocabulary) -> Self {
        self.vocabularies.insert(field.into(), vocabulary);
        self
    }

    /// With an inline record list for a field
    #[must_use]
    pub fn with_record_list(mut self, field: impl Into<String>, records: RecordListSpec) -> Self {
        self.record_lists.insert(field.into(), records);
        self
    }

    /// Whether a field is required
    #[inline]
    #[must_use]
    pub fn is_required(&self, field: &str) -> bool {
        self.required_fields.iter().any(|f| f == field)
    }

    /// Declared tag for a field
    #[inline]
    #[must_use]
    pub fn field_type(&self, field: &str) -> Option<FieldTypeTag> {
        self.field_types.get(field).copied()
    }

    /// Enum vocabulary for a field
    #[inline]
    #[must_use]
    pub fn field_enum(&self, field: &str) -> Option<&[String]> {
        self.field_enums.get(field).map(Vec::as_slice)
    }

    fn problems(&self, out: &mut Vec<String>) {
        let name = &self.block_type;
        if name.trim().is_empty() {
            out.push("block type with empty name".to_string());
        }
        for (field, tag) in &self.field_types {
            if *tag == FieldTypeTag::Enum && !self.field_enums.contains_key(field) {
                out.push(format!("{name}.{field}: enum field without fieldEnums"));
            }
        }
        for (field, values) in &self.field_enums {
            if values.is_empty() {
                out.push(format!("{name}.{field}: empty enum vocabulary"));
            }
        }
        for (field, vocabulary) in &self.vocabularies {
            if vocabulary.allowed.is_empty() {
                out.push(format!("{name}.{field}: empty allow-list"));
            }
            if !vocabulary.allows(&vocabulary.preferred) {
                out.push(format!(
                    "{name}.{field}: preferred '{}' is not on the allow-list",
                    vocabulary.preferred
                ));
            }
            if vocabulary.max_entries == 0 {
                out.push(format!("{name}.{field}: maxEntries must be at least 1"));
            }
            match self.field_type(field) {
                None | Some(FieldTypeTag::ReferenceArray) => {}
                Some(other) => out.push(format!(
                    "{name}.{field}: vocabulary on a {other} field, expected referenceArray"
                )),
            }
        }
        for field in self.record_lists.keys() {
            if self.field_types.contains_key(field) {
                out.push(format!("{name}.{field}: record list must not declare a field type"));
            }
        }
    }
}

/// Ordered set of block type definitions
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SchemaManifest {
    /// Operator-assigned version label
    #[serde(default)]
    pub version: String,
    /// Block types; order fixes the order of mandatory blocks
    pub blocks: Vec<BlockTypeSpec>,
}

impl SchemaManifest {
    /// Build and validate a manifest
    ///
    /// # Errors
    /// Returns [`ManifestError::Invalid`] listing every structural problem
    pub fn new(version: impl Into<String>, blocks: Vec<BlockTypeSpec>) -> ManifestResult<Self> {
        let manifest = Self {
            version: version.into(),
            blocks,
        };
        manifest.validate()?;
        Ok(manifest)
    }

    /// Parse and validate JSON manifest
    ///
    /// # Errors
    /// Returns error on malformed JSON or an invalid manifest
    pub fn from_json_str(source: &str) -> ManifestResult<Self> {
        let manifest: Self = serde_json::from_str(source)?;
        manifest.validate()?;
        Ok(manifest)
    }

    /// Parse and validate YAML manifest
    ///
    /// # Errors
    /// Returns error on malformed YAML or an invalid manifest
    pub fn from_yaml_str(source: &str) -> ManifestResult<Self> {
        let manifest: Self = serde_yaml::from_str(source)?;
        manifest.validate()?;
        Ok(manifest)
    }

    /// Load manifest file, format chosen by extension
    ///
    /// # Errors
    /// Returns error if the file cannot be read, has an unknown extension,
    /// or does not hold a valid manifest
    pub fn load(path: impl AsRef<Path>) -> ManifestResult<Self> {
        let path = path.as_ref();
        let extension = path
            .extension()
            .and_then(|e| e.to_str())
            .unwrap_or_default()
            .to_ascii_lowercase();
        let source =
            std::fs::read_to_string(path).map_err(|e| ManifestError::io_error(path, e))?;

        let manifest = match extension.as_str() {
            "json" => Self::from_json_str(&source)?,
            "yaml" | "yml" => Self::from_yaml_str(&source)?,
            other => return Err(ManifestError::UnsupportedExtension(other.to_string())),
        };
        tracing::info!(
            path = %path.display(),
            version = %manifest.version,
            block_types = manifest.blocks.len(),
            "loaded schema manifest"
        );
        Ok(manifest)
    }

    /// Check structural invariants
    ///
    /// # Errors
    /// Returns [`ManifestError::Invalid`] listing every problem found
    pub fn validate(&self) -> ManifestResult<()> {
        let problems = self.problems();
        if problems.is_empty() {
            Ok(())
        } else {
            Err(ManifestError::Invalid { problems })
        }
    }

    /// Every structural problem in this manifest
    #[must_use]
    pub fn problems(&self) -> Vec<String> {
        let mut problems = Vec::new();
        if self.blocks.is_empty() {
            problems.push("manifest declares no block types".to_string());
        }

        let mut names = HashSet::new();
        for spec in &self.blocks {
            if !names.insert(spec.block_type.as_str()) {
                problems.push(format!("duplicate block type '{}'", spec.block_type));
            }
            spec.problems(&mut problems);
        }

        let mandatory = self.mandatory_types().count();
        if mandatory != MANDATORY_BLOCK_COUNT {
            problems.push(format!(
                "expected {MANDATORY_BLOCK_COUNT} mandatory block types, found {mandatory}"
            ));
        }
        problems
    }

    /// Look up a block type
    #[inline]
    #[must_use]
    pub fn block(&self, block_type: &str) -> Option<&BlockTypeSpec> {
        self.blocks.iter().find(|b| b.block_type == block_type)
    }

    /// Whether a block type is declared
    #[inline]
    #[must_use]
    pub fn contains(&self, block_type: &str) -> bool {
        self.block(block_type).is_some()
    }

    /// Mandatory block types in manifest order
    pub fn mandatory_types(&self) -> impl Iterator<Item = &str> {
        self.blocks
            .iter()
            .filter(|b| b.mandatory)
            .map(|b| b.block_type.as_str())
    }

    /// Optional block types in manifest order
    pub fn optional_types(&self) -> impl Iterator<Item = &str> {
        self.blocks
            .iter()
            .filter(|b| !b.mandatory)
            .map(|b| b.block_type.as_str())
    }

    /// The mandatory block type that leads every document
    #[must_use]
    pub fn leading_type(&self) -> Option<&BlockTypeSpec> {
        self.blocks.iter().find(|b| b.mandatory)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn vocabulary() -> ReferenceVocabulary {
        ReferenceVocabulary::new(
            vec!["acme".to_string(), "globex".to_string(), "initech".to_string()],
            "acme",
        )
    }

    fn minimal_blocks() -> Vec<BlockTypeSpec> {
        vec![
            BlockTypeSpec::new("hero")
                .mandatory()
                .require("headline", FieldTypeTag::String),
            BlockTypeSpec::new("pageSection")
                .mandatory()
                .require("body", FieldTypeTag::RichTextArray),
        ]
    }

    #[test]
    fn valid_manifest_builds() {
        let manifest = SchemaManifest::new("1", minimal_blocks()).unwrap();
        assert_eq!(manifest.mandatory_types().collect::<Vec<_>>(), ["hero", "pageSection"]);
        assert_eq!(manifest.leading_type().unwrap().block_type, "hero");
        assert!(manifest.contains("pageSection"));
        assert!(!manifest.contains("faq"));
    }

    #[test]
    fn reports_every_problem() {
        let mut blocks = minimal_blocks();
        blocks.push(BlockTypeSpec::new("hero"));
        blocks.push(
            BlockTypeSpec::new("layout").optional("align", FieldTypeTag::Enum),
        );
        let err = SchemaManifest::new("1", blocks).unwrap_err();
        let problems = err.problems();
        assert!(problems.iter().any(|p| p.contains("duplicate block type 'hero'")));
        assert!(problems.iter().any(|p| p.contains("enum field without fieldEnums")));
    }

    #[test]
    fn requires_exactly_two_mandatory() {
        let blocks = vec![BlockTypeSpec::new("hero").mandatory()];
        let err = SchemaManifest::new("1", blocks).unwrap_err();
        assert!(err.problems()[0].contains("expected 2 mandatory block types, found 1"));
    }

    #[test]
    fn vocabulary_preferred_must_be_allowed() {
        let mut blocks = minimal_blocks();
        blocks.push(BlockTypeSpec::new("providers").with_vocabulary(
            "providers",
            ReferenceVocabulary::new(vec!["a".to_string()], "b"),
        ));
        let err = SchemaManifest::new("1", blocks).unwrap_err();
        assert!(err.problems().iter().any(|p| p.contains("preferred 'b'")));
    }

    #[test]
    fn parses_json_with_defaults() {
        let source = r#"{
            "version": "2024-01",
            "blocks": [
                {"type": "hero", "mandatory": true, "requiredFields": ["headline"],
                 "fieldTypes": {"headline": "string"}},
                {"type": "pageSection", "mandatory": true},
                {"type": "providerList",
                 "fieldTypes": {"providers": "referenceArray"},
                 "vocabularies": {"providers": {"allowed": ["a", "b"], "preferred": "a"}}}
            ]
        }"#;
        let manifest = SchemaManifest::from_json_str(source).unwrap();
        let vocab = &manifest.block("providerList").unwrap().vocabularies["providers"];
        assert_eq!(vocab.max_entries, DEFAULT_VOCABULARY_ENTRIES);
    }

    #[test]
    fn parses_yaml() {
        let source = "
version: y1
blocks:
  - type: hero
    mandatory: true
  - type: pageSection
    mandatory: true
    fieldTypes:
      layout: enum
    fieldEnums:
      layout: [wide, narrow]
";
        let manifest = SchemaManifest::from_yaml_str(source).unwrap();
        assert_eq!(
            manifest.block("pageSection").unwrap().field_enum("layout").unwrap(),
            ["wide", "narrow"]
        );
    }

    #[test]
    fn vocabulary_violations() {
        let vocab = vocabulary();
        let good = json!([
            {"type": "reference", "ref": "acme"},
            {"type": "reference", "ref": "initech"}
        ]);
        assert!(vocab.violations(Some(&good)).is_empty());

        let wrong_first = json!([{"type": "reference", "ref": "globex"}]);
        assert_eq!(vocab.violations(Some(&wrong_first)).len(), 1);

        let strings = json!(["acme", "globex"]);
        assert_eq!(vocab.violations(Some(&strings)).len(), 2);

        assert!(!vocab.violations(Some(&json!([]))).is_empty());
        assert!(!vocab.violations(None).is_empty());
    }

    #[test]
    fn record_entry_violations() {
        let records = RecordListSpec::default();
        let good = json!({
            "question": "Why?",
            "answer": [{"children": [{"text": "Because."}]}]
        });
        assert!(records.entry_violation(&good).is_none());
        assert!(records
            .entry_violation(&json!({"type": "reference", "ref": "faq-1"}))
            .unwrap()
            .contains("bare reference"));
        assert!(records.entry_violation(&json!({"question": "Why?"})).is_some());
        assert!(records.entry_violation(&json!("Why?")).is_some());
        assert_eq!(records.violations(Some(&json!([]))), ["record list is empty"]);
    }
}
