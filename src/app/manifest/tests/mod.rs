//! Tests for the schema fallback sequence and result normalization

use super::*;
use crate::app::models::{TimeOfDay, VideoQuality};

/// Test that a legacy manifest is decoded by the first attempt
#[test]
fn test_legacy_manifest_scenario() {
    let json = r#"[{"id":"g1","assets":[{"id":"a","url":"https://x/a.mov","type":"video","timeOfDay":"day"}]}]"#;
    let mut parser = ManifestParser::new();

    let videos = parser.parse(json);
    assert_eq!(videos.len(), 1);
    assert_eq!(videos[0].id(), "a");
    assert_eq!(videos[0].time_of_day(), TimeOfDay::Day);
    assert_eq!(videos[0].candidates()[0].url().as_str(), "https://x/a.mov");
    assert_eq!(parser.stats().format, ManifestFormat::Legacy);
}

/// Test that a versioned manifest falls through to the second attempt
#[test]
fn test_versioned_manifest_scenario() {
    let json = r#"{"version":1,"assets":[{"id":"v1","accessibilityLabel":"L","url-4K-HDR":"https://x/b.mov"}]}"#;
    let mut parser = ManifestParser::new();

    let videos = parser.parse(json);
    assert_eq!(videos.len(), 1);
    assert_eq!(videos[0].candidates()[0].quality(), VideoQuality::HDR4K);
    assert_eq!(parser.stats().format, ManifestFormat::Versioned);
}

/// Test that the parser is total over arbitrary input
///
/// Anything that matches neither schema yields an empty list, never a panic.
#[test]
fn test_unknown_formats_yield_empty_list() {
    let inputs = [
        "",
        "null",
        "42",
        "\"text\"",
        "{}",
        r#"{"version":2,"assets":[]}"#,
        r#"{"version":1}"#,
        r#"{"version":1,"assets":{"id":"x"}}"#,
        "[1,2]",
        "[{\"assets\":7}]",
        "{ not json",
    ];

    for input in inputs {
        let mut parser = ManifestParser::new();
        assert!(parser.parse(input).is_empty(), "input {:?}", input);
        assert_eq!(parser.stats().format, ManifestFormat::Unknown);
    }
}

/// Test that videos are ordered by their composite label, case-insensitively
#[test]
fn test_videos_sorted_by_label() {
    let json = r#"[{"id":"g","assets":[
        {"id":"3","url":"https://x/3.mov","type":"video","accessibilityLabel":"zebra"},
        {"id":"1","url":"https://x/1.mov","type":"video","accessibilityLabel":"Alps"},
        {"id":"2","url":"https://x/2.mov","type":"video","accessibilityLabel":"beach"},
        {"id":"4","url":"https://x/4.mov","type":"video"}
    ]}]"#;

    let labels: Vec<String> = parse_manifest(json)
        .iter()
        .map(|v| v.accessibility_label().to_string())
        .collect();

    // "<No Label>" sorts before letters
    assert_eq!(labels, vec!["", "Alps", "beach", "zebra"]);
}

/// Test that exact duplicate videos across groups are collapsed
#[test]
fn test_duplicate_videos_collapsed() {
    let asset = r#"{"id":"a","url":"https://x/a.mov","type":"video","timeOfDay":"night","accessibilityLabel":"A"}"#;
    let json = format!(
        r#"[{{"id":"g1","assets":[{asset}]}},{{"id":"g2","assets":[{asset}]}}]"#,
        asset = asset
    );
    let mut parser = ManifestParser::new();

    let videos = parser.parse(&json);
    assert_eq!(videos.len(), 1);
    assert_eq!(parser.stats().duplicate_videos, 1);
    assert_eq!(parser.stats().videos, 1);
}

/// Test that parsing is deterministic regardless of input order
#[test]
fn test_order_independent_of_manifest_order() {
    let forward = r#"[{"id":"g","assets":[
        {"id":"a","url":"https://x/a.mov","type":"video","accessibilityLabel":"One"},
        {"id":"b","url":"https://x/b.mov","type":"video","accessibilityLabel":"Two"}
    ]}]"#;
    let reversed = r#"[{"id":"g","assets":[
        {"id":"b","url":"https://x/b.mov","type":"video","accessibilityLabel":"Two"},
        {"id":"a","url":"https://x/a.mov","type":"video","accessibilityLabel":"One"}
    ]}]"#;

    assert_eq!(parse_manifest(forward), parse_manifest(reversed));
}
