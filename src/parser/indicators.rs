//! Indicator mention extraction
//!
//! Finds indicator names and synonyms in the command, attaches nearby
//! numeric parameters, and reads per-mention overlay and removal hints
//! from the surrounding window. Numbers already claimed by the
//! timeframe pass are never considered parameters.

use regex::Regex;

use super::style::{find_word, StyleDirective};
use crate::domain::CapabilityCatalog;

/// One resolved indicator intent, after merging repeated mentions
#[derive(Debug, Clone, PartialEq)]
pub struct IndicatorIntent {
    /// Canonical catalogue name, e.g. "BOLL"
    pub name: String,
    pub params: Vec<u32>,
    pub overlay: bool,
    /// True when the command asks to remove rather than add
    pub remove: bool,
    /// Filled in by the pipeline from the command-wide style scan
    pub style: Option<StyleDirective>,
}

#[derive(Debug)]
struct Mention {
    name: String,
    span: (usize, usize),
    overlay: bool,
    remove: bool,
    params: Vec<u32>,
}

const MAX_PARAM: u32 = 9999;

pub fn extract_indicators(
    text: &str,
    catalog: &CapabilityCatalog,
    timeframe_spans: &[(usize, usize)],
    window: usize,
) -> Vec<IndicatorIntent> {
    let mut mentions = collect_mentions(text, catalog, window);
    if mentions.is_empty() {
        return Vec::new();
    }

    assign_numbers(text, timeframe_spans, window, &mut mentions);
    let mut intents = merge_mentions(mentions);

    // catalogue defaults fill in when the command named no numbers;
    // they keep their catalogue order (MACD's 12,26,9 is fast, slow,
    // signal, not an ascending set)
    for intent in &mut intents {
        if intent.params.is_empty() {
            if let Some(spec) = catalog.indicator(&intent.name) {
                intent.params = spec.default_params.clone();
            }
        }
    }

    intents
}

/// Locate every indicator term occurrence, longest term first so that a
/// phrase like "bollinger bands" is never shadowed by "bb". Overlapping
/// claims on the same bytes are dropped.
fn collect_mentions(text: &str, catalog: &CapabilityCatalog, window: usize) -> Vec<Mention> {
    let mut claimed: Vec<(usize, usize)> = Vec::new();
    let mut mentions = Vec::new();

    for (term, spec) in catalog.search_terms() {
        let mut from = 0;
        while let Some(offset) = find_word(&text[from..], &term) {
            let start = from + offset;
            let end = start + term.len();
            from = end;

            if claimed.iter().any(|&(s, e)| start < e && end > s) {
                continue;
            }
            claimed.push((start, end));

            let around = window_slice(text, start, end, window);
            mentions.push(Mention {
                name: spec.name.clone(),
                span: (start, end),
                overlay: overlay_hint(around).unwrap_or(spec.overlay),
                remove: removal_hint(leading_slice(text, start, window)),
                params: Vec::new(),
            });
        }
    }

    mentions.sort_by_key(|m| m.span.0);
    mentions
}

/// Hand each free number to a mention, provided the gap fits inside the
/// configured window. Parameters conventionally trail the indicator
/// name, so the nearest preceding mention is tried first; only a number
/// with no preceding mention in range attaches to a following one
/// ("add a 20 period ema").
fn assign_numbers(
    text: &str,
    timeframe_spans: &[(usize, usize)],
    window: usize,
    mentions: &mut [Mention],
) {
    let Ok(re) = Regex::new(r"\d+(?:\.\d+)?") else { return };

    for m in re.find_iter(text) {
        let (start, end) = (m.start(), m.end());
        if timeframe_spans.iter().any(|&(s, e)| start < e && end > s) {
            continue;
        }

        let Ok(number) = m.as_str().parse::<f64>() else {
            continue;
        };
        if number < 1.0 || number > f64::from(MAX_PARAM) {
            continue;
        }
        // decimals floor to whole periods
        let value = number as u32;

        let preceding = mentions
            .iter()
            .enumerate()
            .filter(|(_, m)| m.span.1 <= start)
            .map(|(idx, m)| (start - m.span.1, idx))
            .filter(|&(distance, _)| distance <= window)
            .min();
        let following = mentions
            .iter()
            .enumerate()
            .filter(|(_, m)| end <= m.span.0)
            .map(|(idx, m)| (m.span.0 - end, idx))
            .filter(|&(distance, _)| distance <= window)
            .min();

        if let Some((_, idx)) = preceding.or(following) {
            mentions[idx].params.push(value);
        }
    }
}

fn merge_mentions(mentions: Vec<Mention>) -> Vec<IndicatorIntent> {
    let mut merged: Vec<IndicatorIntent> = Vec::new();

    for mention in mentions {
        if let Some(existing) = merged.iter_mut().find(|i| i.name == mention.name) {
            // union of all mentioned parameters, sorted
            existing.params.extend(mention.params);
            existing.params.sort_unstable();
            existing.params.dedup();
            existing.remove |= mention.remove;
            existing.overlay = mention.overlay;
        } else {
            let mut params = mention.params;
            params.sort_unstable();
            params.dedup();
            merged.push(IndicatorIntent {
                name: mention.name,
                params,
                overlay: mention.overlay,
                remove: mention.remove,
                style: None,
            });
        }
    }

    merged
}

/// Explicit pane placement near the mention, if any
fn overlay_hint(around: &str) -> Option<bool> {
    use super::style::contains_word;

    if contains_word(around, "overlay")
        || around.contains("on the price")
        || around.contains("on price")
        || around.contains("on the chart")
        || around.contains("on chart")
    {
        Some(true)
    } else if contains_word(around, "below")
        || around.contains("separate panel")
        || around.contains("own panel")
        || around.contains("separate pane")
        || around.contains("new pane")
    {
        Some(false)
    } else {
        None
    }
}

const REMOVAL_VERBS: &[&str] = &["remove", "delete", "clear", "hide", "drop", "rid"];
const ADDITION_VERBS: &[&str] = &["add", "show", "display", "enable", "put"];

/// Removal intent is decided by the nearest verb before the mention, so
/// "add ema 9 and remove macd" removes only the macd.
fn removal_hint(before: &str) -> bool {
    let last_verb_at = |verbs: &[&str]| -> Option<usize> {
        verbs
            .iter()
            .filter_map(|v| {
                let mut from = 0;
                let mut last = None;
                while let Some(at) = find_word(&before[from..], v) {
                    last = Some(from + at);
                    from += at + v.len();
                }
                last
            })
            .max()
    };

    match (last_verb_at(REMOVAL_VERBS), last_verb_at(ADDITION_VERBS)) {
        (Some(r), Some(a)) => r > a,
        (Some(_), None) => true,
        _ => false,
    }
}

/// Up to `window` bytes immediately before an offset, snapped to a char
/// boundary.
fn leading_slice(text: &str, at: usize, window: usize) -> &str {
    let mut lo = at.saturating_sub(window);
    while lo > 0 && !text.is_char_boundary(lo) {
        lo -= 1;
    }
    &text[lo..at]
}

/// Slice `window` bytes either side of a span, snapped to char
/// boundaries.
fn window_slice(text: &str, start: usize, end: usize, window: usize) -> &str {
    let mut lo = start.saturating_sub(window);
    let mut hi = (end + window).min(text.len());
    while lo > 0 && !text.is_char_boundary(lo) {
        lo -= 1;
    }
    while hi < text.len() && !text.is_char_boundary(hi) {
        hi += 1;
    }
    &text[lo..hi]
}
