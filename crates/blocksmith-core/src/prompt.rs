//! Prompt construction
//!
//! The prompt is opaque to the rest of the pipeline; only the reply is
//! parsed. [`ManifestPromptBuilder`] describes the requested block types so
//! the model has a chance of producing a compliant document first time.

use std::collections::BTreeSet;
use std::fmt::Write as _;

use blocksmith_schema::{BlockTypeSpec, SchemaManifest};

use crate::error::GenerateError;
use crate::request::GenerationRequest;

/// Turns a request into provider input
pub trait PromptBuilder: Send + Sync {
    /// Build the prompt
    ///
    /// # Errors
    /// Returns [`GenerateError::Prompt`] if the request cannot be described
    fn build(&self, request: &GenerationRequest, manifest: &SchemaManifest) -> Result<String, GenerateError>;
}

/// Describes topic, voice and every requested block type with its fields
#[derive(Debug, Clone, Copy, Default)]
pub struct ManifestPromptBuilder;

impl ManifestPromptBuilder {
    fn describe(spec: &BlockTypeSpec, lines: &mut Vec<String>) {
        let mut header = format!("- type \"{}\"", spec.block_type);
        if spec.mandatory {
            header.push_str(" (mandatory)");
        }
        if !spec.description.is_empty() {
            let _ = write!(header, ": {}", spec.description);
        }
        lines.push(header);

        for field in &spec.required_fields {
            lines.push(format!("    required {field}: {}", Self::field_kind(spec, field)));
        }
        let optional: BTreeSet<&String> = spec
            .field_types
            .keys()
            .chain(spec.vocabularies.keys())
            .chain(spec.record_lists.keys())
            .filter(|f| !spec.is_required(f))
            .collect();
        for field in optional {
            lines.push(format!("    optional {field}: {}", Self::field_kind(spec, field)));
        }
    }

    fn field_kind(spec: &BlockTypeSpec, field: &str) -> String {
        if let Some(records) = spec.record_lists.get(field) {
            return format!(
                "list of inline records with \"{}\" (string) and \"{}\" (rich text), never references",
                records.title_field, records.body_field
            );
        }
        if let Some(vocabulary) = spec.vocabularies.get(field) {
            return format!(
                "up to {} references, first must be \"{}\", chosen from: {}",
                vocabulary.max_entries,
                vocabulary.preferred,
                vocabulary.allowed.join(", ")
            );
        }
        if let Some(values) = spec.field_enum(field) {
            return format!("one of: {}", values.join(", "));
        }
        spec.field_type(field)
            .map_or_else(|| "string".to_string(), |tag| tag.to_string())
    }
}

impl PromptBuilder for ManifestPromptBuilder {
    fn build(&self, request: &GenerationRequest, manifest: &SchemaManifest) -> Result<String, GenerateError> {
        let mut lines = vec![
            format!("Write landing page content about: {}", request.topic.trim()),
            format!("Keywords: {}", request.keywords.join(", ")),
            format!("Tone: {}", request.tone),
            format!("Length: {}", request.length),
            "Reply with a single JSON object {\"contentBlocks\": [...]} and nothing else.".to_string(),
            "Every block needs a \"type\" and a unique \"key\". Mandatory blocks come first, in the order listed.".to_string(),
            "Block types:".to_string(),
        ];

        for spec in manifest.blocks.iter().filter(|b| b.mandatory) {
            Self::describe(spec, &mut lines);
        }
        for selected in &request.selected_blocks {
            let spec = manifest
                .block(selected)
                .ok_or_else(|| GenerateError::Prompt(format!("unknown block type '{selected}'")))?;
            if !spec.mandatory {
                Self::describe(spec, &mut lines);
            }
        }
        Ok(lines.join("\n"))
    }
}
