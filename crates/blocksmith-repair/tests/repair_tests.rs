//! Document repair against the sample landing-page manifest.

use blocksmith_repair::{DocumentRepairer, RepairKind};
use blocksmith_schema::{ComplianceValidator, ContentBlock, ReferenceObject};
use blocksmith_test_utils::{
    faq, hero, providers, reference, sample_manifest, section, seeded_rng, ALLOWED_PROVIDERS,
    PREFERRED_PROVIDER,
};
use pretty_assertions::assert_eq;
use serde_json::{json, Value};

fn block<'a>(blocks: &'a [ContentBlock], block_type: &str) -> &'a ContentBlock {
    blocks
        .iter()
        .find(|b| b.block_type == block_type)
        .unwrap_or_else(|| panic!("no {block_type} block"))
}

fn reference_ids(value: &Value) -> Vec<String> {
    value
        .as_array()
        .unwrap()
        .iter()
        .map(|v| ReferenceObject::from_value(v).unwrap().id)
        .collect()
}

fn messy_document() -> Vec<Value> {
    vec![
        json!({
            "type": "pageSection",
            "key": "s1",
            "title": "Why",
            "body": "Plain text body",
            "layout": " WIDE "
        }),
        json!({
            "type": "hero",
            "headline": ["Ship", {"children": [{"text": "faster"}]}],
            "subheadline": 42
        }),
        json!({"type": "stats", "key": "st", "label": "Users", "value": "12"}),
        faq(
            "f1",
            json!([
                {"_type": "reference", "_ref": "faq-1"},
                {"question": "Does it scale?", "answer": "Yes."}
            ]),
        ),
        providers("p1", json!(["contoso", "northwind", "unknown"])),
        json!({
            "type": "testimonials",
            "key": "t1",
            "quotes": [{"_type": "reference", "_ref": "q1", "text": "inline quote"}]
        }),
        json!({"type": "carousel", "key": "c1"}),
    ]
}

#[test]
fn messy_document_repairs_to_compliance() {
    let manifest = sample_manifest();
    let outcome = DocumentRepairer::new(&manifest).repair(&messy_document(), &mut seeded_rng(1));

    let types: Vec<&str> = outcome.blocks.iter().map(|b| b.block_type.as_str()).collect();
    assert_eq!(
        types,
        ["hero", "pageSection", "stats", "faqGroup", "providerList", "testimonials"]
    );

    let hero = block(&outcome.blocks, "hero");
    assert_eq!(hero.field("headline"), Some(&json!("Ship faster")));
    assert_eq!(hero.field("subheadline"), Some(&json!("42")));
    assert_eq!(block(&outcome.blocks, "pageSection").field("layout"), Some(&json!("wide")));
    assert_eq!(block(&outcome.blocks, "stats").field("value"), Some(&json!(12)));
    assert_eq!(
        block(&outcome.blocks, "testimonials").field("quotes"),
        Some(&json!([reference("q1")]))
    );

    let report = ComplianceValidator::new(&manifest).validate_blocks(&outcome.blocks);
    assert!(report.compliant, "{}", report.summary());
    assert!(outcome.log.count(RepairKind::Violation) >= 3);
}

#[test]
fn repair_is_stable_on_its_own_output() {
    let manifest = sample_manifest();
    let repairer = DocumentRepairer::new(&manifest);
    let first = repairer.repair(&messy_document(), &mut seeded_rng(1));
    let second = repairer.repair(&first.to_values(), &mut seeded_rng(2));

    assert!(second.log.is_empty(), "{:?}", second.log.events());
    assert_eq!(second.blocks, first.blocks);
}

#[test]
fn same_seed_same_document() {
    let manifest = sample_manifest();
    let repairer = DocumentRepairer::new(&manifest);
    let a = repairer.repair(&messy_document(), &mut seeded_rng(5));
    let b = repairer.repair(&messy_document(), &mut seeded_rng(5));
    assert_eq!(a.blocks, b.blocks);
}

#[test]
fn bare_reference_faq_gets_single_placeholder() {
    let manifest = sample_manifest();
    let document = [
        hero("h1"),
        section("s1"),
        faq("f1", json!([reference("faq-1"), {"_type": "reference", "_ref": "faq-2"}])),
    ];
    let outcome = DocumentRepairer::new(&manifest).repair(&document, &mut seeded_rng(3));

    let faqs = block(&outcome.blocks, "faqGroup").field("faqs").unwrap();
    assert_eq!(faqs.as_array().map(Vec::len), Some(1));
    assert!(faqs[0]["question"].as_str().is_some_and(|q| !q.is_empty()));
    assert_eq!(outcome.log.count(RepairKind::Violation), 2);
    assert!(ComplianceValidator::new(&manifest)
        .validate_blocks(&outcome.blocks)
        .compliant);
}

#[test]
fn plain_string_providers_are_regenerated() {
    let manifest = sample_manifest();
    let document = [
        hero("h1"),
        section("s1"),
        providers("p1", json!(["contoso", "fabrikam", "tailspin"])),
    ];
    let outcome = DocumentRepairer::new(&manifest).repair(&document, &mut seeded_rng(4));

    let ids = reference_ids(block(&outcome.blocks, "providerList").field("providers").unwrap());
    assert_eq!(ids[0], PREFERRED_PROVIDER);
    assert!(ids.len() <= 4);
    assert!(ids.iter().all(|id| ALLOWED_PROVIDERS.contains(&id.as_str())));
    assert!(ComplianceValidator::new(&manifest)
        .validate_blocks(&outcome.blocks)
        .compliant);
}

#[test]
fn unselected_optional_types_are_dropped() {
    let manifest = sample_manifest();
    let document = [
        hero("h1"),
        section("s1"),
        faq("f1", json!([])),
        providers("p1", json!([reference(PREFERRED_PROVIDER)])),
    ];
    let outcome = DocumentRepairer::new(&manifest)
        .with_selected_types(["providerList"])
        .repair(&document, &mut seeded_rng(6));

    let types: Vec<&str> = outcome.blocks.iter().map(|b| b.block_type.as_str()).collect();
    assert_eq!(types, ["hero", "pageSection", "providerList"]);
}

#[test]
fn empty_input_yields_empty_outcome() {
    let manifest = sample_manifest();
    let outcome = DocumentRepairer::new(&manifest).repair(&[], &mut seeded_rng(0));
    assert!(outcome.blocks.is_empty());
    assert!(outcome.log.is_empty());
}

#[test]
fn inline_records_are_removed_from_reference_lists() {
    let manifest = sample_manifest();
    let document = [
        hero("h1"),
        section("s1"),
        json!({
            "type": "testimonials",
            "key": "t1",
            "quotes": [reference("q1"), {"name": "Bob", "text": "Great"}, "q2"]
        }),
    ];
    let outcome = DocumentRepairer::new(&manifest).repair(&document, &mut seeded_rng(6));

    let quotes = block(&outcome.blocks, "testimonials").field("quotes").unwrap();
    assert_eq!(reference_ids(quotes), ["q1", "q2"]);
    assert_eq!(outcome.log.count(RepairKind::Violation), 1);
    assert!(ComplianceValidator::new(&manifest)
        .validate_blocks(&outcome.blocks)
        .compliant);
}

#[test]
fn reference_list_without_references_is_dropped() {
    let manifest = sample_manifest();
    let document = [
        hero("h1"),
        section("s1"),
        json!({"type": "testimonials", "key": "t1", "quotes": [{"quote": "Loved it"}]}),
    ];
    let outcome = DocumentRepairer::new(&manifest).repair(&document, &mut seeded_rng(6));

    assert!(block(&outcome.blocks, "testimonials").field("quotes").is_none());
    assert_eq!(outcome.log.count(RepairKind::Dropped), 1);
    let report = ComplianceValidator::new(&manifest).validate_blocks(&outcome.blocks);
    assert_eq!(report.warnings.len(), 1);
    assert_eq!(report.warnings[0].field.as_deref(), Some("quotes"));
}
