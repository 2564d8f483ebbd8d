//! End-to-end behavior of the default extraction cascade.

use blocksmith_extract::{extract_blocks, PayloadShape};
use pretty_assertions::assert_eq;
use proptest::prelude::*;

fn failed_strategies(text: &str) -> Vec<&'static str> {
    extract_blocks(text)
        .failures
        .iter()
        .map(|f| f.strategy)
        .collect()
}

#[test]
fn direct_parse_succeeds_on_clean_reply() {
    let text = r#"{"contentBlocks":[{"type":"hero","key":"h1","headline":"X","subheadline":"Y"}]}"#;
    let extraction = extract_blocks(text);
    assert_eq!(extraction.strategy, Some("direct_parse"));
    assert_eq!(extraction.blocks.len(), 1);
    assert_eq!(extraction.shape, PayloadShape::ContentBlocks);
    assert!(extraction.failures.is_empty());
}

#[test]
fn fenced_block_with_empty_list() {
    let text = "```json\n{\"contentBlocks\":[]}\n```";
    let extraction = extract_blocks(text);
    assert_eq!(extraction.strategy, Some("fenced_block"));
    assert!(extraction.blocks.is_empty());
    assert_eq!(failed_strategies(text), vec!["direct_parse"]);
}

#[test]
fn boundary_scan_inside_prose() {
    let text = r#"Here is the page: {"contentBlocks":[{"type":"hero","key":"h1","headline":"X","subheadline":"Y"}]} Hope it helps!"#;
    let extraction = extract_blocks(text);
    assert_eq!(extraction.strategy, Some("boundary_scan"));
    assert_eq!(extraction.blocks[0]["headline"], "X");
    assert_eq!(failed_strategies(text), vec!["direct_parse", "fenced_block"]);
}

#[test]
fn all_stages_fail_on_plain_prose() {
    let extraction = extract_blocks("not json at all");
    assert!(!extraction.recovered());
    assert!(extraction.blocks.is_empty());
    assert_eq!(extraction.shape, PayloadShape::Unrecovered);
    assert_eq!(
        failed_strategies("not json at all"),
        vec!["direct_parse", "fenced_block", "boundary_scan", "cleanup_retry"]
    );
}

#[test]
fn unbalanced_and_empty_inputs_degrade() {
    for text in ["", "{\"contentBlocks\": [", "}{", "```json\n```"] {
        let extraction = extract_blocks(text);
        assert!(extraction.blocks.is_empty(), "input {text:?}");
    }
}

#[test]
fn bare_array_reply() {
    let extraction = extract_blocks(r#"[{"type":"hero"},{"type":"pageSection"}]"#);
    assert_eq!(extraction.shape, PayloadShape::BareArray);
    assert_eq!(extraction.blocks.len(), 2);
}

proptest! {
    #[test]
    fn cascade_is_total(text in ".{0,200}") {
        let extraction = extract_blocks(&text);
        prop_assert!(extraction.failures.len() <= 4);
        if !extraction.recovered() {
            prop_assert!(extraction.blocks.is_empty());
        }
    }

    #[test]
    fn wrapped_payload_is_always_found(prefix in "[a-zA-Z .:!]{0,40}", suffix in "[a-zA-Z .!]{0,40}") {
        let text = format!("{prefix}{{\"contentBlocks\":[{{\"type\":\"hero\"}}]}}{suffix}");
        let extraction = extract_blocks(&text);
        prop_assert_eq!(extraction.blocks.len(), 1);
    }
}
