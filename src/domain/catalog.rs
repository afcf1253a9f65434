//! Read-only capability catalogue handed to the command parser
//!
//! The catalogue is rebuilt from `Settings` on every parse call; the
//! parser makes no caching assumptions about it.

use crate::config::{CatalogSettings, IndicatorSpec};

/// Per-call view over the configured indicator metadata, valid timeframe
/// set, valid chart-type set, and color palette.
#[derive(Debug, Clone)]
pub struct CapabilityCatalog {
    settings: CatalogSettings,
}

impl CapabilityCatalog {
    pub fn new(settings: CatalogSettings) -> Self {
        Self { settings }
    }

    pub fn indicators(&self) -> &[IndicatorSpec] {
        &self.settings.indicators
    }

    /// Look up an indicator by canonical name (case-insensitive)
    pub fn indicator(&self, name: &str) -> Option<&IndicatorSpec> {
        self.settings
            .indicators
            .iter()
            .find(|spec| spec.name.eq_ignore_ascii_case(name))
    }

    /// Resolve a lowercased word or phrase to an indicator via canonical
    /// name or synonym
    pub fn resolve_indicator(&self, term: &str) -> Option<&IndicatorSpec> {
        self.settings.indicators.iter().find(|spec| {
            spec.name.eq_ignore_ascii_case(term)
                || spec.synonyms.iter().any(|s| s.eq_ignore_ascii_case(term))
        })
    }

    /// All search terms (canonical names and synonyms, lowercased) with
    /// the canonical name they resolve to, longest term first so that
    /// e.g. "bollinger bands" is tried before "bb".
    pub fn search_terms(&self) -> Vec<(String, &IndicatorSpec)> {
        let mut terms: Vec<(String, &IndicatorSpec)> = Vec::new();
        for spec in &self.settings.indicators {
            terms.push((spec.name.to_lowercase(), spec));
            for synonym in &spec.synonyms {
                terms.push((synonym.to_lowercase(), spec));
            }
        }
        terms.sort_by(|a, b| b.0.len().cmp(&a.0.len()));
        terms
    }

    pub fn is_valid_timeframe(&self, token: &str) -> bool {
        self.settings.timeframes.iter().any(|t| t == token)
    }

    pub fn is_valid_chart_type(&self, name: &str) -> bool {
        self.settings.chart_types.iter().any(|t| t == name)
    }

    pub fn colors(&self) -> &[String] {
        &self.settings.colors
    }
}
