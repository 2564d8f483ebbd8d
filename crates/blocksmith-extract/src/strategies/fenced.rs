//! Parse the contents of a fenced code block
//!
//! Every fence in the reply is tried in order; the first whose body parses
//! wins. A language tag after the opening fence is optional.

use once_cell::sync::Lazy;
use regex::Regex;
use serde_json::Value;

use crate::error::ExtractError;
use crate::strategy::ExtractionStrategy;

static FENCED_BLOCK: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?s)```[ \t]*[A-Za-z0-9_+\-]*[ \t]*\r?\n?(.*?)```").expect("fenced block regex")
});

/// Fenced code block extraction
#[derive(Debug, Clone, Copy, Default)]
pub struct FencedBlockStrategy;

impl ExtractionStrategy for FencedBlockStrategy {
    fn name(&self) -> &'static str {
        "fenced_block"
    }

    fn priority(&self) -> i32 {
        30
    }

    fn extract(&self, text: &str) -> Result<Value, ExtractError> {
        let mut last_error = None;
        for captures in FENCED_BLOCK.captures_iter(text) {
            let body = captures.get(1).map_or("", |m| m.as_str());
            match serde_json::from_str(body.trim()) {
                Ok(value) => return Ok(value),
                Err(e) => last_error = Some(ExtractError::Json(e)),
            }
        }
        Err(last_error.unwrap_or(ExtractError::NoFence))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_tagged_fence() {
        let value = FencedBlockStrategy
            .extract("```json\n{\"contentBlocks\":[]}\n```")
            .unwrap();
        assert!(value["contentBlocks"].as_array().unwrap().is_empty());
    }

    #[test]
    fn parses_untagged_fence_inside_prose() {
        let text = "Here you go:\n```\n{\"a\": 1}\n```\nEnjoy.";
        assert_eq!(FencedBlockStrategy.extract(text).unwrap()["a"], 1);
    }

    #[test]
    fn skips_fences_that_do_not_parse() {
        let text = "```bash\nnpm install\n```\nthen\n```json\n{\"ok\": true}\n```";
        assert_eq!(FencedBlockStrategy.extract(text).unwrap()["ok"], true);
    }

    #[test]
    fn reports_missing_fence() {
        assert!(matches!(
            FencedBlockStrategy.extract("{\"a\": 1}"),
            Err(ExtractError::NoFence)
        ));
    }

    #[test]
    fn reports_parse_error_of_last_fence() {
        assert!(matches!(
            FencedBlockStrategy.extract("```json\n{oops}\n```"),
            Err(ExtractError::Json(_))
        ));
    }
}
