//! Style directive extraction: color, line style, and weight words

use serde::{Deserialize, Serialize};

use crate::domain::CapabilityCatalog;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LineStyle {
    Solid,
    Dashed,
    Dotted,
}

/// Presentation hints attached to an indicator mention
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct StyleDirective {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub color: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub line_style: Option<LineStyle>,
    /// Line weight in pixels (thin=1, medium=2, thick=3)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub size: Option<u8>,
}

impl StyleDirective {
    pub fn is_empty(&self) -> bool {
        self.color.is_none() && self.line_style.is_none() && self.size.is_none()
    }
}

/// Scan lowercased text for style words. Returns `None` when nothing
/// style-related is mentioned at all.
pub fn extract_style(text: &str, catalog: &CapabilityCatalog) -> Option<StyleDirective> {
    let mut style = StyleDirective::default();

    for color in catalog.colors() {
        if contains_word(text, color) {
            style.color = Some(color.clone());
            break;
        }
    }

    if contains_word(text, "dashed") {
        style.line_style = Some(LineStyle::Dashed);
    } else if contains_word(text, "dotted") {
        style.line_style = Some(LineStyle::Dotted);
    } else if contains_word(text, "solid") {
        style.line_style = Some(LineStyle::Solid);
    }

    if contains_word(text, "thin") {
        style.size = Some(1);
    } else if contains_word(text, "medium") {
        style.size = Some(2);
    } else if contains_word(text, "thick") || contains_word(text, "bold") {
        style.size = Some(3);
    }

    if style.is_empty() {
        None
    } else {
        Some(style)
    }
}

/// Whole-word containment over ASCII word boundaries
pub(crate) fn contains_word(text: &str, word: &str) -> bool {
    find_word(text, word).is_some()
}

/// Byte offset of the first whole-word occurrence
pub(crate) fn find_word(text: &str, word: &str) -> Option<usize> {
    if word.is_empty() {
        return None;
    }
    let mut start = 0;
    while let Some(pos) = text[start..].find(word) {
        let at = start + pos;
        let end = at + word.len();
        let before_ok = at == 0
            || !text.as_bytes()[at - 1].is_ascii_alphanumeric();
        let after_ok = end == text.len()
            || !text.as_bytes()[end].is_ascii_alphanumeric();
        if before_ok && after_ok {
            return Some(at);
        }
        start = at + 1;
    }
    None
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::CatalogSettings;

    fn catalog() -> CapabilityCatalog {
        CapabilityCatalog::new(CatalogSettings::default())
    }

    #[test]
    fn extracts_color_line_style_and_weight() {
        let style = extract_style("add a thick dashed blue ema", &catalog()).unwrap();
        assert_eq!(style.color.as_deref(), Some("blue"));
        assert_eq!(style.line_style, Some(LineStyle::Dashed));
        assert_eq!(style.size, Some(3));
    }

    #[test]
    fn no_style_words_yields_none() {
        assert!(extract_style("add ema 9 and 20", &catalog()).is_none());
    }

    #[test]
    fn word_boundaries_prevent_partial_matches() {
        // "redraw" must not match "red"
        assert!(extract_style("redraw the chart", &catalog()).is_none());
        assert!(contains_word("make it red please", "red"));
        assert!(!contains_word("bred", "red"));
    }
}
