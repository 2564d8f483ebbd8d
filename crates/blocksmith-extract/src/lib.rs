//! Blocksmith Extract
//!
//! Recovers a JSON payload from an untrusted, free-form model reply.
//!
//! # Cascade
//!
//! ```text
//! raw text → direct parse → fenced block → boundary scan → cleanup-and-retry
//!              │ ok            │ ok           │ ok            │ ok
//!              └───────────────┴──────────────┴───────────────┴─→ normalize → blocks
//! ```
//!
//! Every failed stage is logged with its parse error. When all stages fail
//! the result is an empty block list, never an error.
//!
//! # Example
//!
//! ```rust
//! use blocksmith_extract::extract_blocks;
//!
//! let extraction = extract_blocks("Sure! {\"contentBlocks\": [{\"type\": \"hero\"}]} Enjoy.");
//! assert_eq!(extraction.strategy, Some("boundary_scan"));
//! assert_eq!(extraction.blocks.len(), 1);
//! ```

#![warn(missing_docs)]

pub mod error;
pub mod strategies;
pub mod strategy;

use once_cell::sync::Lazy;

// Re-exports
pub use error::{ExtractError, StrategyFailure};
pub use strategy::{
    default_cascade, normalize_payload, Extraction, ExtractionStrategy, PayloadShape,
    StrategyCascade,
};

static DEFAULT_CASCADE: Lazy<StrategyCascade> = Lazy::new(default_cascade);

/// Run the built-in cascade over a raw reply
#[must_use]
pub fn extract_blocks(text: &str) -> Extraction {
    DEFAULT_CASCADE.extract(text)
}

/// Version of this crate
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
