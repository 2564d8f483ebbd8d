//! Blocksmith Core
//!
//! Turns an untrusted model reply into a schema-compliant list of content
//! blocks, or an explicit failure.
//!
//! # Architecture
//!
//! ```text
//! ┌──────────────────────────────────────────────────────────────┐
//! │                         Generator                            │
//! │   preconditions → prompt → provider (timeout) → Pipeline     │
//! └──────────────────────────────┬───────────────────────────────┘
//!                                │ raw text + token usage
//! ┌──────────────────────────────▼───────────────────────────────┐
//! │                          Pipeline                            │
//! │   extract → repair → validate → compliant | fallback | fail  │
//! └───────┬──────────────────┬──────────────────┬────────────────┘
//!         │                  │                  │
//!  blocksmith-extract  blocksmith-repair  blocksmith-schema
//! ```
//!
//! The manifest is read-only for the duration of a request. Hot swapping
//! goes through [`ManifestStore`], which replaces the whole manifest so an
//! in-flight request keeps the snapshot it started with.
//!
//! # Example
//!
//! ```rust
//! use blocksmith_core::{NonCompliancePolicy, Pipeline, PipelineConfig, TokenUsage};
//! use blocksmith_schema::{BlockTypeSpec, FieldTypeTag, SchemaManifest};
//! use rand::rngs::StdRng;
//! use rand::SeedableRng;
//!
//! let manifest = SchemaManifest::new(
//!     "1",
//!     vec![
//!         BlockTypeSpec::new("hero").mandatory().require("headline", FieldTypeTag::String),
//!         BlockTypeSpec::new("pageSection").mandatory(),
//!     ],
//! )
//! .unwrap();
//! let config = PipelineConfig::new().with_policy(NonCompliancePolicy::Fallback);
//!
//! let mut rng = StdRng::seed_from_u64(1);
//! let result = Pipeline::new(&manifest, &config).run("not json at all", TokenUsage::default(), &mut rng);
//! assert_eq!(result.outcome(), "fallback");
//! ```

#![warn(missing_docs)]

pub mod config;
pub mod error;
pub mod fallback;
pub mod generator;
pub mod manifest_store;
pub mod pipeline;
pub mod prompt;
pub mod provider;
pub mod request;
pub mod types;

// Re-exports
pub use config::{FallbackText, NonCompliancePolicy, PipelineConfig};
pub use error::{
    ConfigError, FallbackError, GenerateError, PreconditionViolation, ProviderError, RequestError,
};
pub use fallback::FallbackBuilder;
pub use generator::Generator;
pub use manifest_store::ManifestStore;
pub use pipeline::{Pipeline, PipelineState, NOTHING_RECOVERED};
pub use prompt::{ManifestPromptBuilder, PromptBuilder};
pub use provider::{CompletionProvider, StaticProvider};
pub use request::{GenerationRequest, LengthBucket};
pub use types::{
    Completion, GenerationFailure, GenerationOrigin, GenerationResult, GenerationSuccess,
    TokenUsage,
};

/// Prelude module for common imports
pub mod prelude {
    //! Common imports for callers of the generator
    pub use crate::{
        CompletionProvider, GenerateError, GenerationRequest, GenerationResult, Generator,
        NonCompliancePolicy, Pipeline, PipelineConfig, TokenUsage,
    };
    pub use blocksmith_schema::prelude::*;
}

/// Version of this crate
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
