//! Blocksmith Schema
//!
//! Typed model of the block-type schema manifest and of the documents that
//! must satisfy it.
//!
//! # Overview
//!
//! - [`SchemaManifest`] / [`BlockTypeSpec`]: declarative block definitions
//! - [`FieldTypeTag`]: closed set of field types with validity predicates
//! - [`ReferenceObject`]: pointer-like values, never inline records
//! - [`ContentBlock`]: one typed content unit with a document-unique key
//! - [`ComplianceValidator`]: read-only check of a block list
//!
//! # Example
//!
//! ```rust
//! use blocksmith_schema::{BlockTypeSpec, ComplianceValidator, FieldTypeTag, SchemaManifest};
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
//! let report = ComplianceValidator::new(&manifest)
//!     .validate(&[json!({"type": "hero", "key": "h1", "headline": "Hello"})]);
//! assert!(report.compliant);
//! ```

#![warn(missing_docs)]

pub mod block;
pub mod compliance;
pub mod error;
pub mod field;
pub mod manifest;
pub mod reference;
pub mod rich_text;

// Re-exports
pub use block::{is_blank, ContentBlock, KeyMint};
pub use compliance::{ComplianceReport, ComplianceValidator, ValidationWarning};
pub use error::{ManifestError, ManifestResult};
pub use field::FieldTypeTag;
pub use manifest::{BlockTypeSpec, RecordListSpec, ReferenceVocabulary, SchemaManifest};
pub use reference::{looks_like_reference, ReferenceObject};

/// Prelude module for common imports
pub mod prelude {
    //! Common imports for schema work
    pub use crate::{
        BlockTypeSpec, ComplianceReport, ComplianceValidator, ContentBlock, FieldTypeTag,
        KeyMint, ReferenceObject, SchemaManifest, ValidationWarning,
    };
}

/// Version of this crate
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
