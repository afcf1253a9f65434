//! Timeframe extraction
//!
//! Two passes over the lowercased command: a numeric pass ("5 minute",
//! "4h", "1 week") and a keyword fallback ("daily", "weekly"). When a
//! command names several numeric timeframes the last mention wins, on
//! the theory that "actually, make that 15 minutes" trails the command.

use regex::Regex;

use crate::domain::CapabilityCatalog;

/// Outcome of the timeframe pass: the canonical token (if any valid one
/// was found) plus the byte spans of every numeric timeframe mention.
/// The spans are reported even for invalid candidates so the indicator
/// pass never mistakes a timeframe's number for a calculation parameter.
#[derive(Debug, Default)]
pub struct TimeframeScan {
    pub token: Option<String>,
    pub consumed: Vec<(usize, usize)>,
}

const NUMERIC_PATTERN: &str =
    r"(\d+)\s*(minutes?|months?|hours?|weeks?|mins?|days?|hrs?|mo\b|m\b|h\b|d\b|w\b)";

pub fn extract_timeframe(text: &str, catalog: &CapabilityCatalog) -> TimeframeScan {
    let mut scan = TimeframeScan::default();

    let Ok(re) = Regex::new(NUMERIC_PATTERN) else {
        return scan;
    };

    for caps in re.captures_iter(text) {
        let Some(whole) = caps.get(0) else { continue };
        scan.consumed.push((whole.start(), whole.end()));

        let (Some(number), Some(unit)) = (caps.get(1), caps.get(2)) else {
            continue;
        };
        let token = canonical_token(number.as_str(), unit.as_str());
        if let Some(token) = token {
            if catalog.is_valid_timeframe(&token) {
                // last valid numeric mention wins
                scan.token = Some(token);
            }
        }
    }

    if scan.token.is_none() {
        scan.token = keyword_fallback(text).filter(|t| catalog.is_valid_timeframe(t));
    }

    scan
}

fn canonical_token(number: &str, unit: &str) -> Option<String> {
    let n: u32 = number.parse().ok()?;
    let suffix = match unit.chars().next()? {
        'h' => "h",
        'd' => "D",
        'w' => "W",
        'm' => {
            // "m"/"min"/"minutes" are minutes; "mo"/"month" are months
            if unit.starts_with("mo") {
                "M"
            } else {
                "m"
            }
        }
        _ => return None,
    };
    Some(format!("{n}{suffix}"))
}

fn keyword_fallback(text: &str) -> Option<String> {
    use super::style::contains_word;

    if contains_word(text, "daily") {
        Some("1D".to_string())
    } else if contains_word(text, "weekly") {
        Some("1W".to_string())
    } else if contains_word(text, "monthly") {
        Some("1M".to_string())
    } else if contains_word(text, "hourly") {
        Some("1h".to_string())
    } else {
        None
    }
}
