//! Parse the whole reply as JSON

use serde_json::Value;

use crate::error::ExtractError;
use crate::strategy::ExtractionStrategy;

/// Whole-input JSON parse
#[derive(Debug, Clone, Copy, Default)]
pub struct DirectParseStrategy;

impl ExtractionStrategy for DirectParseStrategy {
    fn name(&self) -> &'static str {
        "direct_parse"
    }

    fn priority(&self) -> i32 {
        40
    }

    fn extract(&self, text: &str) -> Result<Value, ExtractError> {
        Ok(serde_json::from_str(text)?)
    }
}
