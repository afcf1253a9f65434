//! Command parser behavior over the default catalogue

use serde_json::json;

use navis::config::CatalogSettings;
use navis::domain::{ActionPlan, CapabilityCatalog};
use navis::parser::{tools, CommandParser};

fn parse(text: &str) -> ActionPlan {
    let catalog = CapabilityCatalog::new(CatalogSettings::default());
    CommandParser::new(&catalog, 24).parse(text, Some("s-1".to_string()))
}

#[test]
fn full_command_extracts_everything() {
    let plan = parse("switch to 5 minute chart and add ema 9 and 20 overlay dashed blue");

    assert_eq!(
        plan.tools(),
        vec![tools::CONTEXT_FETCH, tools::SET_TIMEFRAME, tools::INDICATOR_ADD]
    );
    assert_eq!(plan.calls[1].arguments, json!({"timeframe": "5m"}));

    let add = &plan.calls[2].arguments;
    assert_eq!(add["name"], "EMA");
    assert_eq!(add["params"], json!([9, 20]));
    assert_eq!(add["overlay"], true);
    assert_eq!(add["style"]["color"], "blue");
    assert_eq!(add["style"]["line_style"], "dashed");
}

#[test]
fn analysis_requires_an_explicit_trigger() {
    assert!(parse("show me support and resistance").is_empty());
    assert!(parse("pull up the chart").is_empty());

    let plan = parse("analyze the current setup");
    assert!(plan.tools().contains(&tools::ANALYSIS));
    let plan = parse("any good entry here?");
    assert!(plan.tools().contains(&tools::ANALYSIS));
}

#[test]
fn repeated_mentions_union_into_one_add() {
    let plan = parse("add ema 9 and also ema 200");
    let adds: Vec<_> = plan
        .calls
        .iter()
        .filter(|c| c.tool == tools::INDICATOR_ADD)
        .collect();
    assert_eq!(adds.len(), 1);
    assert_eq!(adds[0].arguments["params"], json!([9, 200]));
}

#[test]
fn numeric_timeframe_beats_keyword_alias() {
    let plan = parse("daily chart... no wait, 15 minutes");
    assert_eq!(plan.calls[1].arguments["timeframe"], "15m");
}

#[test]
fn synonyms_and_removals() {
    let plan = parse("get rid of the bollinger bands, delete kdj too");
    let removes: Vec<&str> = plan
        .calls
        .iter()
        .filter(|c| c.tool == tools::INDICATOR_REMOVE)
        .filter_map(|c| c.arguments["name"].as_str())
        .collect();
    assert_eq!(removes, vec!["BOLL", "KDJ"]);
}

#[test]
fn screenshot_and_navigation() {
    let plan = parse("zoom out and grab a screenshot");
    assert_eq!(
        plan.tools(),
        vec![tools::CONTEXT_FETCH, tools::NAVIGATE, tools::SCREENSHOT]
    );
    assert_eq!(plan.calls[1].arguments["direction"], "zoom-out");
}

#[test]
fn describe_round_trip_preserves_extraction() {
    let catalog = CapabilityCatalog::new(CatalogSettings::default());
    let parser = CommandParser::new(&catalog, 24);

    for command in [
        "switch to 5 minute chart and add ema 9 and 20",
        "weekly candles with bollinger bands",
        "zoom in and take a screenshot",
        "remove the macd and add rsi 14 in a separate panel",
    ] {
        let original = parser.parse(command, None);
        let reparsed = parser.parse(&parser.describe_plan(&original), None);
        assert_eq!(
            original.tools(),
            reparsed.tools(),
            "round trip diverged for: {command}"
        );
        assert_eq!(original.calls, reparsed.calls, "arguments diverged for: {command}");
    }
}

#[test]
fn session_id_is_carried_into_the_plan() {
    let plan = parse("switch to 1h");
    assert_eq!(plan.session_id.as_deref(), Some("s-1"));
    assert_eq!(plan.version, 1);
}
