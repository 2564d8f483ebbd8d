//! End-to-end pipeline runs against the sample landing-page manifest.

use blocksmith_core::{
    GenerationOrigin, GenerationResult, NonCompliancePolicy, Pipeline, PipelineConfig, TokenUsage,
    NOTHING_RECOVERED,
};
use blocksmith_repair::RepairKind;
use blocksmith_schema::{ComplianceValidator, ReferenceObject, SchemaManifest};
use blocksmith_test_utils::{
    faq, hero, providers, reference, reply, sample_manifest, section, seeded_rng, PREFERRED_PROVIDER,
};
use pretty_assertions::assert_eq;
use proptest::prelude::*;
use serde_json::json;

const DIRECT: &str = r#"{"contentBlocks":[{"type":"hero","key":"h1","headline":"X","subheadline":"Y"}]}"#;
const FENCED_EMPTY: &str = "```json\n{\"contentBlocks\":[]}\n```";
const PROSE: &str = r#"Here is the page: {"contentBlocks":[{"type":"hero","key":"h1","headline":"X","subheadline":"Y"}]} Hope it helps!"#;

fn run(manifest: &SchemaManifest, config: &PipelineConfig, text: &str) -> GenerationResult {
    let mut rng = seeded_rng(17);
    Pipeline::new(manifest, config).run(text, TokenUsage::new(120, 480), &mut rng)
}

fn fallback_config() -> PipelineConfig {
    PipelineConfig::new().with_policy(NonCompliancePolicy::Fallback)
}

#[test]
fn clean_reply_passes_straight_through() {
    let manifest = sample_manifest();
    for text in [DIRECT, PROSE] {
        let success = run(&manifest, &PipelineConfig::default(), text)
            .into_result()
            .unwrap();
        assert_eq!(success.origin, GenerationOrigin::Generated);
        assert_eq!(success.blocks.len(), 1);
        assert_eq!(success.blocks[0].key, "h1");
        assert!(success.repairs.is_empty());
        assert_eq!(success.usage, TokenUsage::new(120, 480));
    }
}

#[test]
fn empty_fenced_list_fails_by_default() {
    let manifest = sample_manifest();
    let failure = run(&manifest, &PipelineConfig::default(), FENCED_EMPTY)
        .into_result()
        .unwrap_err();
    assert_eq!(failure.reason, NOTHING_RECOVERED);
}

#[test]
fn empty_fenced_list_falls_back_when_configured() {
    let manifest = sample_manifest();
    let success = run(&manifest, &fallback_config(), FENCED_EMPTY)
        .into_result()
        .unwrap();
    assert_eq!(success.origin, GenerationOrigin::Fallback);
    assert_eq!(success.blocks.len(), 1);
}

#[test]
fn prose_reply_falls_back_to_compliant_hero() {
    let manifest = sample_manifest();
    let config = fallback_config().with_fallback_text("Sorry", "Please try again later.");
    let success = run(&manifest, &config, "not json at all").into_result().unwrap();

    let block = &success.blocks[0];
    assert_eq!(block.block_type, "hero");
    assert_eq!(block.field("headline"), Some(&json!("Sorry")));
    assert_eq!(block.field("subheadline"), Some(&json!("Please try again later.")));
    assert!(ComplianceValidator::new(&manifest)
        .validate_blocks(&success.blocks)
        .compliant);
}

#[test]
fn bare_reference_faqs_become_one_placeholder() {
    let manifest = sample_manifest();
    let text = reply(&[
        hero("h"),
        section("s"),
        faq("f", json!([reference("faq-1"), {"_type": "reference", "_ref": "faq-2"}])),
    ]);
    let success = run(&manifest, &PipelineConfig::default(), &text)
        .into_result()
        .unwrap();

    let faqs = success.blocks[2].field("faqs").and_then(|v| v.as_array()).unwrap();
    assert_eq!(faqs.len(), 1);
    let violations = success
        .repairs
        .iter()
        .filter(|event| event.kind == RepairKind::Violation)
        .count();
    assert_eq!(violations, 2);
}

#[test]
fn plain_string_providers_are_regenerated() {
    let manifest = sample_manifest();
    let text = reply(&[
        hero("h"),
        section("s"),
        providers("p", json!(["contoso", "fabrikam", "tailspin"])),
    ]);
    let success = run(&manifest, &PipelineConfig::default(), &text)
        .into_result()
        .unwrap();

    let list = success.blocks[2].field("providers").and_then(|v| v.as_array()).unwrap();
    let first = ReferenceObject::from_value(&list[0]).unwrap();
    assert_eq!(first.id, PREFERRED_PROVIDER);
}

#[test]
fn inline_quote_in_reference_list_is_removed() {
    let manifest = sample_manifest();
    let text = reply(&[
        hero("h"),
        section("s"),
        json!({"type": "testimonials", "key": "t", "quotes": [reference("q1"), {"name": "Bob", "text": "Great"}]}),
    ]);
    let success = run(&manifest, &PipelineConfig::default(), &text)
        .into_result()
        .unwrap();

    assert_eq!(success.origin, GenerationOrigin::Generated);
    assert_eq!(success.blocks[2].field("quotes"), Some(&json!([reference("q1")])));
    assert!(success
        .repairs
        .iter()
        .any(|event| event.kind == RepairKind::Violation && event.field.as_deref() == Some("quotes")));
}

#[test]
fn unfixable_document_reports_joined_warnings() {
    let manifest = sample_manifest();
    let text = reply(&[json!({"type": "hero", "key": "h", "headline": "Only half"})]);
    let failure = run(&manifest, &PipelineConfig::default(), &text)
        .into_result()
        .unwrap_err();
    assert_eq!(failure.warnings.len(), 1);
    assert_eq!(failure.reason, failure.warnings[0].to_string());
    assert!(failure.reason.contains("subheadline"));
}

#[test]
fn unfixable_document_falls_back_with_warnings() {
    let manifest = sample_manifest();
    let text = reply(&[json!({"type": "hero", "key": "h", "headline": "Only half"})]);
    let success = run(&manifest, &fallback_config(), &text).into_result().unwrap();
    assert_eq!(success.origin, GenerationOrigin::Fallback);
    assert_eq!(success.warnings.len(), 1);
}

#[test]
fn unselected_blocks_are_dropped_only_when_enabled() {
    let manifest = sample_manifest();
    let text = reply(&[
        hero("h"),
        section("s"),
        json!({"type": "stats", "key": "st", "label": "Users", "value": 3}),
    ]);

    let mut rng = seeded_rng(2);
    let config = PipelineConfig::default();
    let kept = Pipeline::new(&manifest, &config)
        .with_selected_types(["faqGroup"])
        .run(&text, TokenUsage::default(), &mut rng);
    assert_eq!(kept.blocks().map(<[_]>::len), Some(2));

    let config = PipelineConfig::default().with_drop_unselected_blocks(false);
    let all = Pipeline::new(&manifest, &config)
        .with_selected_types(["faqGroup"])
        .run(&text, TokenUsage::default(), &mut rng);
    assert_eq!(all.blocks().map(<[_]>::len), Some(3));
}

fn reply_text() -> impl Strategy<Value = String> {
    prop_oneof![
        ".{0,120}",
        "[{}\\[\\]\":, a-z]{0,80}",
        Just(String::new()),
        Just("{\"contentBlocks\": [".to_string()),
        Just(DIRECT.to_string()),
        Just(FENCED_EMPTY.to_string()),
    ]
}

proptest! {
    #[test]
    fn never_an_empty_success(text in reply_text(), fallback in any::<bool>()) {
        let manifest = sample_manifest();
        let config = if fallback { fallback_config() } else { PipelineConfig::default() };
        match run(&manifest, &config, &text) {
            GenerationResult::Success(success) => {
                prop_assert!(!success.blocks.is_empty());
                prop_assert!(ComplianceValidator::new(&manifest).validate_blocks(&success.blocks).compliant);
            }
            GenerationResult::Failure(failure) => {
                prop_assert!(!fallback);
                prop_assert!(!failure.reason.is_empty());
            }
        }
    }
}
