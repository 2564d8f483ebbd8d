//! Testing utilities for the blocksmith workspace
//!
//! Shared fixtures, builders and a seeded random source.

#![allow(missing_docs)]

use std::sync::Arc;

use blocksmith_schema::rich_text::paragraph;
use blocksmith_schema::SchemaManifest;
use rand::rngs::StdRng;
use rand::SeedableRng;
use serde_json::{json, Value};

/// Raw sample manifest (hero, pageSection, featureList, stats, faqGroup,
/// providerList, testimonials)
pub const SAMPLE_MANIFEST_JSON: &str = include_str!("../fixtures/manifest.json");

/// Identifier every provider list must lead with
pub const PREFERRED_PROVIDER: &str = "northwind";

/// Allow-listed providers of the sample manifest
pub const ALLOWED_PROVIDERS: [&str; 6] = [
    "northwind", "contoso", "fabrikam", "tailspin", "woodgrove", "litware",
];

pub fn sample_manifest() -> SchemaManifest {
    SchemaManifest::from_json_str(SAMPLE_MANIFEST_JSON).unwrap()
}

pub fn shared_manifest() -> Arc<SchemaManifest> {
    Arc::new(sample_manifest())
}

pub fn seeded_rng(seed: u64) -> StdRng {
    StdRng::seed_from_u64(seed)
}

pub fn rich(text: &str) -> Value {
    json!([paragraph(text, "p0", "s0")])
}

pub fn reference(id: &str) -> Value {
    json!({"type": "reference", "ref": id})
}

pub fn hero(key: &str) -> Value {
    json!({
        "type": "hero",
        "key": key,
        "headline": "Ship faster",
        "subheadline": "Everything you need in one place"
    })
}

pub fn section(key: &str) -> Value {
    json!({
        "type": "pageSection",
        "key": key,
        "title": "Why it works",
        "body": rich("Because it was built with care.")
    })
}

pub fn faq(key: &str, faqs: Value) -> Value {
    json!({"type": "faqGroup", "key": key, "title": "Questions", "faqs": faqs})
}

pub fn providers(key: &str, providers: Value) -> Value {
    json!({"type": "providerList", "key": key, "title": "Partners", "providers": providers})
}

/// Wrap blocks in the reply envelope a model is asked to produce
pub fn reply(blocks: &[Value]) -> String {
    json!({ "contentBlocks": blocks }).to_string()
}
