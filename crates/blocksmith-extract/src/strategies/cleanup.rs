//! Strip fence markers and surrounding text, then parse
//!
//! Keeps everything from the first `{` to the last `}`. Catches replies where
//! a fence marker sits inside the object, e.g. a fence closed too early.

use serde_json::Value;

use crate::error::ExtractError;
use crate::strategies::FENCE_MARKER;
use crate::strategy::ExtractionStrategy;

/// Cleanup-and-retry extraction
#[derive(Debug, Clone, Copy, Default)]
pub struct CleanupStrategy;

impl ExtractionStrategy for CleanupStrategy {
    fn name(&self) -> &'static str {
        "cleanup_retry"
    }

    fn priority(&self) -> i32 {
        10
    }

    fn extract(&self, text: &str) -> Result<Value, ExtractError> {
        let stripped = FENCE_MARKER.replace_all(text, "");
        let start = stripped.find('{').ok_or(ExtractError::NoOpeningBrace)?;
        let end = stripped
            .rfind('}')
            .filter(|&end| end > start)
            .ok_or(ExtractError::NoClosingBrace { start })?;
        Ok(serde_json::from_str(&stripped[start..=end])?)
    }
}
