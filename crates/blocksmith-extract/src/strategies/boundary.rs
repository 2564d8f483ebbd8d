//! Balanced-brace scan from the first `{`
//!
//! Braces inside JSON string literals (including escaped quotes) do not
//! count toward nesting.

use serde_json::Value;

use crate::error::ExtractError;
use crate::strategy::ExtractionStrategy;

/// Boundary scan extraction
#[derive(Debug, Clone, Copy, Default)]
pub struct BoundaryScanStrategy;

impl ExtractionStrategy for BoundaryScanStrategy {
    fn name(&self) -> &'static str {
        "boundary_scan"
    }

    fn priority(&self) -> i32 {
        20
    }

    fn extract(&self, text: &str) -> Result<Value, ExtractError> {
        let candidate = balanced_object(text)?;
        Ok(serde_json::from_str(candidate)?)
    }
}

/// Slice from the first `{` to its matching `}`
///
/// # Errors
/// Returns [`ExtractError::NoOpeningBrace`] or [`ExtractError::Unbalanced`]
pub fn balanced_object(text: &str) -> Result<&str, ExtractError> {
    let start = text.find('{').ok_or(ExtractError::NoOpeningBrace)?;

    let mut depth = 0usize;
    let mut in_string = false;
    let mut escaped = false;
    for (offset, ch) in text[start..].char_indices() {
        if in_string {
            match ch {
                _ if escaped => escaped = false,
                '\\' => escaped = true,
                '"' => in_string = false,
                _ => {}
            }
            continue;
        }
        match ch {
            '"' => in_string = true,
            '{' => depth += 1,
            '}' => {
                depth -= 1;
                if depth == 0 {
                    let end = start + offset + ch.len_utf8();
                    return Ok(&text[start..end]);
                }
            }
            _ => {}
        }
    }
    Err(ExtractError::Unbalanced { start })
}
