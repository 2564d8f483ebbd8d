//! Strategy trait and the extraction cascade

use serde_json::Value;

use crate::error::{ExtractError, StrategyFailure};
use crate::strategies::{
    BoundaryScanStrategy, CleanupStrategy, DirectParseStrategy, FencedBlockStrategy,
};

/// One way of recovering a JSON payload from raw text
///
/// Implement this trait to add a stage to the cascade.
pub trait ExtractionStrategy: Send + Sync + std::fmt::Debug + 'static {
    /// Stable name used in logs and metrics
    fn name(&self) -> &'static str;

    /// Cascade priority (higher = tried first)
    fn priority(&self) -> i32 {
        0
    }

    /// Attempt to recover a JSON value
    ///
    /// # Errors
    /// Returns the specific reason this strategy could not recover a value
    fn extract(&self, text: &str) -> Result<Value, ExtractError>;
}

/// How the recovered value mapped onto a block list
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PayloadShape {
    /// Object with a `contentBlocks` array
    ContentBlocks,
    /// Top-level array
    BareArray,
    /// Anything else; treated as zero blocks
    Unrecognized,
    /// Every strategy failed
    Unrecovered,
}

/// Result of running the cascade
#[derive(Debug)]
pub struct Extraction {
    /// Raw block values, unvalidated
    pub blocks: Vec<Value>,
    /// Strategy that succeeded, if any
    pub strategy: Option<&'static str>,
    /// How the recovered value was interpreted
    pub shape: PayloadShape,
    /// Failures of the strategies tried before the successful one
    pub failures: Vec<StrategyFailure>,
}

impl Extraction {
    /// Whether any strategy recovered a value
    #[inline]
    #[must_use]
    pub fn recovered(&self) -> bool {
        self.strategy.is_some()
    }
}

/// Priority-ordered cascade of strategies
///
/// Each stage runs only if every earlier stage failed. Total: never returns
/// an error, an unrecoverable reply yields an empty block list.
pub struct StrategyCascade {
    strategies: Vec<Box<dyn ExtractionStrategy>>,
}

impl Default for StrategyCascade {
    fn default() -> Self {
        default_cascade()
    }
}

impl std::fmt::Debug for StrategyCascade {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("StrategyCascade")
            .field("strategies", &self.names())
            .finish()
    }
}

impl StrategyCascade {
    /// Create empty cascade
    #[inline]
    #[must_use]
    pub fn new() -> Self {
        Self {
            strategies: Vec::new(),
        }
    }

    /// Register a strategy
    pub fn register<S: ExtractionStrategy>(&mut self, strategy: S) {
        self.strategies.push(Box::new(strategy));
        // stable: equal priorities keep registration order
        self.strategies
            .sort_by_key(|s| std::cmp::Reverse(s.priority()));
    }

    /// Strategy names in cascade order
    #[must_use]
    pub fn names(&self) -> Vec<&'static str> {
        self.strategies.iter().map(|s| s.name()).collect()
    }

    /// Run the cascade over a raw reply
    #[must_use]
    pub fn extract(&self, text: &str) -> Extraction {
        let mut failures = Vec::new();

        for strategy in &self.strategies {
            match strategy.extract(text) {
                Ok(value) => {
                    let (blocks, shape) = normalize_payload(value);
                    tracing::info!(
                        strategy = strategy.name(),
                        blocks = blocks.len(),
                        shape = ?shape,
                        "payload extracted"
                    );
                    metrics::counter!("blocksmith_extraction_total", "strategy" => strategy.name())
                        .increment(1);
                    return Extraction {
                        blocks,
                        strategy: Some(strategy.name()),
                        shape,
                        failures,
                    };
                }
                Err(error) => {
                    tracing::debug!(strategy = strategy.name(), %error, "extraction strategy failed");
                    failures.push(StrategyFailure {
                        strategy: strategy.name(),
                        error,
                    });
                }
            }
        }

        tracing::warn!(
            attempts = failures.len(),
            input_len = text.len(),
            "no strategy recovered a payload, continuing with zero blocks"
        );
        metrics::counter!("blocksmith_extraction_total", "strategy" => "none").increment(1);
        Extraction {
            blocks: Vec::new(),
            strategy: None,
            shape: PayloadShape::Unrecovered,
            failures,
        }
    }
}

/// Map a recovered value onto a block list
///
/// An object's `contentBlocks` array is used as-is, a top-level array is
/// used directly, anything else yields zero blocks.
#[must_use]
pub fn normalize_payload(value: Value) -> (Vec<Value>, PayloadShape) {
    match value {
        Value::Array(blocks) => (blocks, PayloadShape::BareArray),
        Value::Object(mut map) => match map.remove("contentBlocks") {
            Some(Value::Array(blocks)) => (blocks, PayloadShape::ContentBlocks),
            _ => (Vec::new(), PayloadShape::Unrecognized),
        },
        _ => (Vec::new(), PayloadShape::Unrecognized),
    }
}

/// Create the built-in four-stage cascade
#[must_use]
pub fn default_cascade() -> StrategyCascade {
    let mut cascade = StrategyCascade::new();
    cascade.register(DirectParseStrategy);
    cascade.register(FencedBlockStrategy);
    cascade.register(BoundaryScanStrategy);
    cascade.register(CleanupStrategy);
    cascade
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[derive(Debug)]
    struct Always(i32, &'static str);

    impl ExtractionStrategy for Always {
        fn name(&self) -> &'static str {
            self.1
        }

        fn priority(&self) -> i32 {
            self.0
        }

        fn extract(&self, _text: &str) -> Result<Value, ExtractError> {
            Ok(json!([{"from": self.1}]))
        }
    }

    #[test]
    fn default_order() {
        assert_eq!(
            default_cascade().names(),
            ["direct_parse", "fenced_block", "boundary_scan", "cleanup_retry"]
        );
    }

    #[test]
    fn higher_priority_runs_first() {
        let mut cascade = StrategyCascade::new();
        cascade.register(Always(1, "low"));
        cascade.register(Always(5, "high"));
        let extraction = cascade.extract("anything");
        assert_eq!(extraction.strategy, Some("high"));
        assert!(extraction.failures.is_empty());
    }

    #[test]
    fn empty_cascade_recovers_nothing() {
        let extraction = StrategyCascade::new().extract("{}");
        assert!(!extraction.recovered());
        assert_eq!(extraction.shape, PayloadShape::Unrecovered);
    }

    #[test]
    fn normalization() {
        let (blocks, shape) = normalize_payload(json!({"contentBlocks": [1, 2]}));
        assert_eq!((blocks.len(), shape), (2, PayloadShape::ContentBlocks));

        let (blocks, shape) = normalize_payload(json!([{"type": "hero"}]));
        assert_eq!((blocks.len(), shape), (1, PayloadShape::BareArray));

        let (blocks, shape) = normalize_payload(json!({"contentBlocks": {"type": "hero"}}));
        assert_eq!((blocks.len(), shape), (0, PayloadShape::Unrecognized));

        let (blocks, shape) = normalize_payload(json!("text"));
        assert_eq!((blocks.len(), shape), (0, PayloadShape::Unrecognized));
    }

    #[test]
    fn debug_lists_strategies() {
        let debug = format!("{:?}", default_cascade());
        assert!(debug.contains("boundary_scan"));
    }
}
