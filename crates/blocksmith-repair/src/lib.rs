//! Blocksmith Repair
//!
//! Best-effort, total repair of extracted content blocks against a schema
//! manifest.
//!
//! # Stages
//!
//! ```text
//! per block:  coerce tagged fields → sanitize references → reference lists / vocabulary / record lists
//! document:   drop untyped blocks, fix keys, move mandatory blocks to the front
//! ```
//!
//! Repair never fails. Fixes, drops and violations are recorded in a
//! [`RepairLog`] and emitted as `tracing` events.
//!
//! # Example
//!
//! ```rust
//! use blocksmith_repair::DocumentRepairer;
//! use blocksmith_schema::{BlockTypeSpec, FieldTypeTag, SchemaManifest};
//! use rand::rngs::StdRng;
//! use rand::SeedableRng;
//! use serde_json::json;
//!
//! let manifest = SchemaManifest::new(
//!     "1",
//!     vec![
//!         BlockTypeSpec::new("hero").mandatory().require("headline", FieldTypeTag::String),
//!         BlockTypeSpec::new("pageSection").mandatory(),
//!     ],
//! )
//! .unwrap();
//!
//! let mut rng = StdRng::seed_from_u64(7);
//! let outcome = DocumentRepairer::new(&manifest)
//!     .repair(&[json!({"type": "hero", "headline": ["Hello", "there"]})], &mut rng);
//! assert_eq!(outcome.blocks[0].field("headline"), Some(&json!("Hello there")));
//! ```

#![warn(missing_docs)]

pub mod block;
pub mod coerce;
pub mod document;
pub mod records;
pub mod reference_list;
pub mod references;
pub mod report;
pub mod vocabulary;

// Re-exports
pub use coerce::{canonicalize_enum, coerce, Coercion};
pub use document::{DocumentRepairer, RepairOutcome};
pub use records::{repair_records, RecordRepair};
pub use reference_list::{repair_reference_list, ReferenceListRepair};
pub use references::{sanitize_references, Sanitized};
pub use report::{BlockScope, RepairEvent, RepairKind, RepairLog, DEFAULT_VALUE_LIMIT};
pub use vocabulary::{generate_selection, repair_vocabulary, VocabularyRepair};

/// Prelude module for common imports
pub mod prelude {
    //! Common imports for repair work
    pub use crate::{DocumentRepairer, RepairEvent, RepairKind, RepairLog, RepairOutcome};
}

/// Version of this crate
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
