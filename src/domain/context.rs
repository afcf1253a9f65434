//! Session-scoped execution context

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// Mutable bag of session-scoped fields threaded through a workflow.
///
/// Contexts are passed by value into each step; a successful step's data
/// payload is merged into a fresh copy before the next sequential step
/// runs, so the caller's original context is never mutated in place.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ExecutionContext {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub session_id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub symbol: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub timeframe: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub chart_type: Option<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub indicators: Vec<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub last_price: Option<f64>,
    /// Fields merged from step results that have no dedicated slot
    #[serde(default, skip_serializing_if = "Map::is_empty")]
    pub extra: Map<String, Value>,
}

impl ExecutionContext {
    pub fn new(session_id: impl Into<String>) -> Self {
        Self {
            session_id: Some(session_id.into()),
            ..Self::default()
        }
    }

    pub fn with_symbol(mut self, symbol: impl Into<String>) -> Self {
        self.symbol = Some(symbol.into());
        self
    }

    /// Copy-on-write shallow merge of a step's data payload.
    ///
    /// Known session fields are lifted from matching keys; everything
    /// else lands in `extra`. New keys overwrite old ones of the same
    /// name. Non-object payloads leave the context unchanged.
    pub fn merged(&self, data: &Value) -> Self {
        let mut next = self.clone();
        let Some(obj) = data.as_object() else {
            return next;
        };

        for (key, value) in obj {
            match key.as_str() {
                "session_id" => lift_string(value, &mut next.session_id),
                "symbol" => lift_string(value, &mut next.symbol),
                "timeframe" => lift_string(value, &mut next.timeframe),
                "chart_type" => lift_string(value, &mut next.chart_type),
                "last_price" => {
                    if let Some(price) = value.as_f64() {
                        next.last_price = Some(price);
                    }
                }
                "indicators" => {
                    if let Some(items) = value.as_array() {
                        next.indicators = items
                            .iter()
                            .filter_map(|v| v.as_str().map(str::to_string))
                            .collect();
                    }
                }
                _ => {
                    next.extra.insert(key.clone(), value.clone());
                }
            }
        }

        next
    }
}

fn lift_string(value: &Value, slot: &mut Option<String>) {
    if let Some(s) = value.as_str() {
        *slot = Some(s.to_string());
    }
}
