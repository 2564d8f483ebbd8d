//! Manifest loading and validation against the shared sample manifest.

use std::io::Write;

use blocksmith_schema::{ComplianceValidator, ManifestError, SchemaManifest};
use blocksmith_test_utils::{faq, hero, providers, reference, rich, sample_manifest, section, SAMPLE_MANIFEST_JSON};
use pretty_assertions::assert_eq;
use serde_json::json;

#[test]
fn sample_manifest_is_valid() {
    let manifest = sample_manifest();
    assert_eq!(
        manifest.mandatory_types().collect::<Vec<_>>(),
        vec!["hero", "pageSection"]
    );
    assert_eq!(manifest.optional_types().count(), 5);
}

#[test]
fn loads_json_file_by_extension() {
    let mut file = tempfile::Builder::new().suffix(".json").tempfile().unwrap();
    file.write_all(SAMPLE_MANIFEST_JSON.as_bytes()).unwrap();

    let manifest = SchemaManifest::load(file.path()).unwrap();
    assert_eq!(manifest, sample_manifest());
}

#[test]
fn loads_yaml_file_by_extension() {
    let yaml = serde_yaml::to_string(&sample_manifest()).unwrap();
    let mut file = tempfile::Builder::new().suffix(".yaml").tempfile().unwrap();
    file.write_all(yaml.as_bytes()).unwrap();

    let manifest = SchemaManifest::load(file.path()).unwrap();
    assert_eq!(manifest, sample_manifest());
}

#[test]
fn rejects_unknown_extension_and_missing_file() {
    let file = tempfile::Builder::new().suffix(".ini").tempfile().unwrap();
    assert!(matches!(
        SchemaManifest::load(file.path()),
        Err(ManifestError::UnsupportedExtension(_))
    ));
    assert!(matches!(
        SchemaManifest::load("/definitely/not/here.json"),
        Err(ManifestError::Io { .. })
    ));
}

#[test]
fn full_sample_document_is_compliant() {
    let manifest = sample_manifest();
    let document = vec![
        hero("h1"),
        section("s1"),
        faq("f1", json!([{"question": "Is it fast?", "answer": rich("Yes.")}])),
        providers("p1", json!([reference("northwind"), reference("contoso")])),
        json!({"type": "stats", "key": "st1", "label": "Uptime", "value": 99.9}),
        json!({"type": "featureList", "key": "fl1", "title": "Perks", "features": ["a", "b"]}),
    ];
    let report = ComplianceValidator::new(&manifest).validate(&document);
    assert!(report.compliant, "{}", report.summary());
}

#[test]
fn report_is_deterministic_and_ordered() {
    let manifest = sample_manifest();
    let document = vec![
        json!({"type": "hero", "key": "h1", "headline": 3}),
        json!({"type": "mystery", "key": "m"}),
        section("s1"),
    ];
    let report = ComplianceValidator::new(&manifest).validate(&document);
    let indices: Vec<usize> = report.warnings.iter().map(|w| w.block_index).collect();
    assert_eq!(indices, vec![0, 0, 1, 2]);
    assert!(!report.compliant);
}
