//! Fallback document
//!
//! A single block of the leading mandatory type that tells the reader, in
//! band, that the page could not be generated. Every required field is
//! synthesized and the block is validated before it is handed out.

use blocksmith_repair::{generate_selection, repair_records};
use blocksmith_schema::rich_text::paragraph;
use blocksmith_schema::{BlockTypeSpec, ComplianceValidator, ContentBlock, FieldTypeTag, KeyMint, SchemaManifest};
use serde_json::Value;

use crate::config::FallbackText;
use crate::error::FallbackError;

/// Icon used for synthesized icon fields
pub const FALLBACK_ICON: &str = "info";

/// Builds the fallback block for a manifest
#[derive(Debug, Clone, Copy)]
pub struct FallbackBuilder<'a> {
    manifest: &'a SchemaManifest,
    text: &'a FallbackText,
}

impl<'a> FallbackBuilder<'a> {
    /// Create builder
    #[inline]
    #[must_use]
    pub fn new(manifest: &'a SchemaManifest, text: &'a FallbackText) -> Self {
        Self { manifest, text }
    }

    /// Build and validate the fallback block
    ///
    /// # Errors
    /// Returns [`FallbackError`] if the manifest has no mandatory type, a
    /// required field has a tag that cannot be synthesized, or the result
    /// is not compliant
    pub fn build(&self, keys: &mut KeyMint<'_>) -> Result<ContentBlock, FallbackError> {
        let spec = self.manifest.leading_type().ok_or(FallbackError::NoMandatoryType)?;

        let mut block = ContentBlock::new(spec.block_type.clone(), keys.mint());
        let mut text_fields = 0_usize;
        for field in &spec.required_fields {
            let value = self.synthesize(spec, field, &mut text_fields, keys)?;
            block.fields.insert(field.clone(), value);
        }

        let report = ComplianceValidator::new(self.manifest).validate_blocks(std::slice::from_ref(&block));
        if !report.compliant {
            return Err(FallbackError::NonCompliant(report.summary()));
        }
        tracing::info!(block_type = %block.block_type, key = %block.key, "fallback block built");
        Ok(block)
    }

    fn synthesize(
        &self,
        spec: &BlockTypeSpec,
        field: &str,
        text_fields: &mut usize,
        keys: &mut KeyMint<'_>,
    ) -> Result<Value, FallbackError> {
        if let Some(records) = spec.record_lists.get(field) {
            return Ok(repair_records(None, records, keys).value);
        }
        if let Some(vocabulary) = spec.vocabularies.get(field) {
            return Ok(generate_selection(vocabulary, keys));
        }
        if let Some(first) = spec.field_enum(field).and_then(<[String]>::first) {
            return Ok(Value::from(first.as_str()));
        }

        let unsynthesizable = |tag| FallbackError::Unsynthesizable {
            field: field.to_string(),
            tag,
        };
        let value = match spec.field_type(field) {
            None | Some(FieldTypeTag::String) => {
                let text = self.next_text(text_fields);
                Value::from(text)
            }
            Some(FieldTypeTag::IconRef) => Value::from(FALLBACK_ICON),
            Some(FieldTypeTag::Number) => Value::from(0),
            Some(FieldTypeTag::StringArray) => Value::Array(vec![Value::from(self.text.body.as_str())]),
            Some(FieldTypeTag::RichTextArray) => {
                let (paragraph_key, span_key) = (keys.mint(), keys.mint());
                Value::Array(vec![paragraph(&self.text.body, &paragraph_key, &span_key)])
            }
            Some(
                tag @ (FieldTypeTag::ReferenceArray
                | FieldTypeTag::ImageRef
                | FieldTypeTag::OptionalImageRef
                | FieldTypeTag::Enum),
            ) => return Err(unsynthesizable(tag)),
        };
        Ok(value)
    }

    /// Headline for the first text field, body for the rest
    fn next_text(&self, text_fields: &mut usize) -> &'a str {
        let text = if *text_fields == 0 {
            &self.text.headline
        } else {
            &self.text.body
        };
        *text_fields += 1;
        text
    }
}
