//! Command parser: free text in, action plan out
//!
//! A pure, synchronous pipeline of independent extractors (timeframe,
//! chart type, navigation, indicators, style, screenshot, analysis)
//! whose fragments are merged into an `ActionPlan` in a fixed emission
//! order. Each extractor is heuristic on its own and testable in
//! isolation; the pipeline emits only what the text actually triggered.

pub mod indicators;
pub mod style;
pub mod timeframe;

use serde_json::json;

use crate::domain::{ActionPlan, CapabilityCatalog, NavDirection, ToolCall};
use indicators::{extract_indicators, IndicatorIntent};
use style::{contains_word, extract_style};
use timeframe::extract_timeframe;

/// Tool identifiers emitted into action plans
pub mod tools {
    pub const CONTEXT_FETCH: &str = "context.fetch";
    pub const SET_TIMEFRAME: &str = "chart.control.set_timeframe";
    pub const SET_TYPE: &str = "chart.control.set_type";
    pub const NAVIGATE: &str = "chart.control.navigate";
    pub const INDICATOR_ADD: &str = "indicators.add";
    pub const INDICATOR_REMOVE: &str = "indicators.remove";
    pub const SCREENSHOT: &str = "chart.screenshot";
    pub const ANALYSIS: &str = "analysis.run";
    pub const STATE_VERIFY: &str = "state.verify";
}

pub struct CommandParser<'a> {
    catalog: &'a CapabilityCatalog,
    /// Character window scanned around an indicator mention for numeric
    /// parameters and placement/removal hints
    parameter_window: usize,
}

impl<'a> CommandParser<'a> {
    pub fn new(catalog: &'a CapabilityCatalog, parameter_window: usize) -> Self {
        Self {
            catalog,
            parameter_window,
        }
    }

    /// Parse a free-text command into an ordered action plan.
    ///
    /// Commands that mention nothing actionable yield an empty plan,
    /// never a default setup step.
    pub fn parse(&self, command: &str, session_id: Option<String>) -> ActionPlan {
        let text = command.to_lowercase();

        let tf_scan = extract_timeframe(&text, self.catalog);
        let chart_type = self.extract_chart_type(&text);
        let navigation = extract_navigation(&text);
        let mut intents =
            extract_indicators(&text, self.catalog, &tf_scan.consumed, self.parameter_window);
        let screenshot = wants_screenshot(&text);
        let analysis = wants_analysis(&text);

        // style directives are command-wide: one scan, applied
        // uniformly to every indicator intent
        if let Some(style) = extract_style(&text, self.catalog) {
            for intent in &mut intents {
                intent.style = Some(style.clone());
            }
        }

        let mut plan = ActionPlan::new(session_id);

        if let Some(timeframe) = &tf_scan.token {
            plan.push(ToolCall::new(
                tools::SET_TIMEFRAME,
                json!({ "timeframe": timeframe }),
            ));
        }
        if let Some(chart_type) = &chart_type {
            plan.push(ToolCall::new(
                tools::SET_TYPE,
                json!({ "chart_type": chart_type }),
            ));
        }
        if let Some(direction) = navigation {
            plan.push(ToolCall::new(
                tools::NAVIGATE,
                json!({ "direction": direction.to_string() }),
            ));
        }
        for intent in &intents {
            plan.push(indicator_call(intent));
        }
        if screenshot {
            plan.push(ToolCall::new(tools::SCREENSHOT, json!({})));
        }
        if analysis {
            plan.push(ToolCall::new(tools::ANALYSIS, json!({})));
        }

        // a context fetch only makes sense when something follows it
        if !plan.is_empty() {
            plan.calls.insert(0, ToolCall::new(tools::CONTEXT_FETCH, json!({})));
        }

        tracing::debug!(
            command = %command,
            calls = plan.len(),
            tools = ?plan.tools(),
            "parsed command"
        );

        plan
    }

    /// Render a plan back to a canonical command string. Parsing the
    /// rendered string extracts the same timeframe, chart type, and
    /// indicator set as the original command did.
    pub fn describe_plan(&self, plan: &ActionPlan) -> String {
        let mut phrases = Vec::new();

        for call in &plan.calls {
            match call.tool.as_str() {
                tools::SET_TIMEFRAME => {
                    if let Some(token) = call.arguments["timeframe"].as_str() {
                        phrases.push(format!("switch to {} chart", expand_timeframe(token)));
                    }
                }
                tools::SET_TYPE => {
                    if let Some(t) = call.arguments["chart_type"].as_str() {
                        phrases.push(format!("use a {t} chart"));
                    }
                }
                tools::NAVIGATE => {
                    if let Some(d) = call.arguments["direction"].as_str() {
                        phrases.push(match d {
                            "zoom-in" => "zoom in".to_string(),
                            "zoom-out" => "zoom out".to_string(),
                            other => format!("pan {other}"),
                        });
                    }
                }
                tools::INDICATOR_ADD => phrases.push(self.describe_indicator(call, false)),
                tools::INDICATOR_REMOVE => phrases.push(self.describe_indicator(call, true)),
                tools::SCREENSHOT => phrases.push("take a screenshot".to_string()),
                tools::ANALYSIS => phrases.push("analyze the chart".to_string()),
                _ => {}
            }
        }

        phrases.join(", ")
    }

    fn describe_indicator(&self, call: &ToolCall, remove: bool) -> String {
        let name = call.arguments["name"].as_str().unwrap_or_default();
        if remove {
            return format!("remove the {}", name.to_lowercase());
        }

        let mut phrase = format!("add {}", name.to_lowercase());
        if let Some(params) = call.arguments["params"].as_array() {
            for p in params.iter().filter_map(|v| v.as_u64()) {
                phrase.push_str(&format!(" {p}"));
            }
        }

        // only spell out placement when it differs from the catalogue
        let overlay = call.arguments["overlay"].as_bool().unwrap_or(false);
        let default = self
            .catalog
            .indicator(name)
            .map(|spec| spec.overlay)
            .unwrap_or(false);
        if overlay != default {
            phrase.push_str(if overlay {
                " as an overlay"
            } else {
                " in a separate panel"
            });
        }

        if let Some(style) = call.arguments.get("style").filter(|s| s.is_object()) {
            if let Some(line) = style["line_style"].as_str() {
                phrase.push_str(&format!(" {line}"));
            }
            if let Some(color) = style["color"].as_str() {
                phrase.push_str(&format!(" {color}"));
            }
        }

        phrase
    }

    fn extract_chart_type(&self, text: &str) -> Option<String> {
        let candidate = if contains_word(text, "candlestick") || contains_word(text, "candle")
            || contains_word(text, "candles")
        {
            Some("candle")
        } else if contains_word(text, "area") {
            Some("area")
        } else if is_chart_line_mention(text) {
            Some("line")
        } else {
            None
        };

        candidate
            .filter(|t| self.catalog.is_valid_chart_type(t))
            .map(str::to_string)
    }
}

/// "line" counts as a chart type only when it is not describing a
/// drawn line ("dashed line", "trend line").
fn is_chart_line_mention(text: &str) -> bool {
    let Some(at) = style::find_word(text, "line") else {
        return false;
    };
    let before = &text[..at];
    for qualifier in ["solid", "dashed", "dotted", "trend", "horizontal"] {
        if before.trim_end().ends_with(qualifier) {
            return false;
        }
    }
    true
}

fn extract_navigation(text: &str) -> Option<NavDirection> {
    const PHRASES: &[(&str, NavDirection)] = &[
        ("zoom in", NavDirection::ZoomIn),
        ("zoom out", NavDirection::ZoomOut),
        ("pan left", NavDirection::Left),
        ("scroll left", NavDirection::Left),
        ("move left", NavDirection::Left),
        ("go left", NavDirection::Left),
        ("go back", NavDirection::Left),
        ("pan right", NavDirection::Right),
        ("scroll right", NavDirection::Right),
        ("move right", NavDirection::Right),
        ("go right", NavDirection::Right),
        ("go forward", NavDirection::Right),
    ];

    // at most one navigation intent: the earliest phrase in the text
    PHRASES
        .iter()
        .filter_map(|(phrase, direction)| style::find_word(text, phrase).map(|at| (at, *direction)))
        .min_by_key(|&(at, _)| at)
        .map(|(_, direction)| direction)
}

fn wants_screenshot(text: &str) -> bool {
    ["screenshot", "snapshot", "capture"]
        .iter()
        .any(|word| contains_word(text, word))
        || text.contains("screen shot")
}

/// Analysis is strictly opt-in: it needs an explicit trigger word, so a
/// chart-mutation command never silently runs computation-heavy
/// analysis.
fn wants_analysis(text: &str) -> bool {
    ["analyze", "analyse", "analysis", "entry", "exit", "signal", "signals"]
        .iter()
        .any(|word| contains_word(text, word))
        || text.contains("should i buy")
        || text.contains("should i sell")
}

fn indicator_call(intent: &IndicatorIntent) -> ToolCall {
    if intent.remove {
        return ToolCall::new(tools::INDICATOR_REMOVE, json!({ "name": intent.name }));
    }

    let mut arguments = json!({
        "name": intent.name,
        "params": intent.params,
        "overlay": intent.overlay,
    });
    if let Some(style) = &intent.style {
        arguments["style"] = json!(style);
    }
    ToolCall::new(tools::INDICATOR_ADD, arguments)
}

/// Canonical timeframe token back to unambiguous words ("1M" would
/// otherwise lowercase into "1m", one minute)
fn expand_timeframe(token: &str) -> String {
    let (number, unit) = token.split_at(token.len().saturating_sub(1));
    let word = match unit {
        "m" => "minute",
        "h" => "hour",
        "D" => "day",
        "W" => "week",
        "M" => "month",
        _ => return token.to_string(),
    };
    format!("{number} {word}")
}
