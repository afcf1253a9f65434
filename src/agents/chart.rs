//! Chart-control agent
//!
//! Translates action parameters into `ChartAction` batches and applies
//! them through the `ChartPort` boundary. Port failures come back as
//! structured failures, never as errors past the agent boundary.

use std::str::FromStr;
use std::sync::Arc;

use async_trait::async_trait;
use serde_json::{json, Value};

use super::{check_params, Agent, Capability, ParameterKind, ParameterSpec};
use crate::domain::{AgentResponse, ChartAction, ChartPort, ExecutionContext, NavDirection};

pub struct ChartControlAgent {
    chart: Arc<dyn ChartPort>,
    capabilities: Vec<Capability>,
}

impl ChartControlAgent {
    pub fn new(chart: Arc<dyn ChartPort>) -> Self {
        Self {
            chart,
            capabilities: vec![
                Capability::new("change-timeframe", "Switch the chart to a new timeframe")
                    .with_params(vec![ParameterSpec::required(
                        "timeframe",
                        ParameterKind::String,
                    )]),
                Capability::new("change-chart-type", "Switch the chart rendering style")
                    .with_params(vec![ParameterSpec::required(
                        "chart_type",
                        ParameterKind::String,
                    )]),
                Capability::new("add-indicator", "Add a technical indicator to the chart")
                    .with_params(vec![
                        ParameterSpec::required("name", ParameterKind::String),
                        ParameterSpec::optional("params", ParameterKind::Array),
                        ParameterSpec::optional("overlay", ParameterKind::Boolean),
                        ParameterSpec::optional("style", ParameterKind::Object),
                    ]),
                Capability::new("remove-indicator", "Remove an indicator from the chart")
                    .with_params(vec![ParameterSpec::required("name", ParameterKind::String)]),
                Capability::new("navigate", "Pan or zoom the visible chart range").with_params(
                    vec![ParameterSpec::one_of(
                        "direction",
                        &["left", "right", "zoom-in", "zoom-out"],
                    )],
                ),
                Capability::new("toggle-display-option", "Toggle a named display option")
                    .with_params(vec![
                        ParameterSpec::required("option", ParameterKind::String),
                        ParameterSpec::optional("enabled", ParameterKind::Boolean),
                    ]),
                Capability::new("take-screenshot", "Capture the current chart as an image"),
                Capability::new("read-state", "Read back the current chart state"),
            ],
        }
    }

    async fn apply_one(&self, action: ChartAction, data: Value, message: &str) -> AgentResponse {
        match self.chart.apply(std::slice::from_ref(&action)).await {
            Ok(()) => AgentResponse::success(data, message),
            Err(e) => AgentResponse::failure(e.to_string(), "chart update failed"),
        }
    }

    async fn change_timeframe(&self, params: &Value) -> AgentResponse {
        // presence and type already checked
        let timeframe = params["timeframe"].as_str().unwrap_or_default().to_string();
        self.apply_one(
            ChartAction::SetTimeframe {
                timeframe: timeframe.clone(),
            },
            json!({ "timeframe": timeframe }),
            "Timeframe changed",
        )
        .await
    }

    async fn change_chart_type(&self, params: &Value) -> AgentResponse {
        let chart_type = params["chart_type"].as_str().unwrap_or_default().to_string();
        self.apply_one(
            ChartAction::SetChartType {
                chart_type: chart_type.clone(),
            },
            json!({ "chart_type": chart_type }),
            "Chart type changed",
        )
        .await
    }

    async fn add_indicator(&self, ctx: &ExecutionContext, params: &Value) -> AgentResponse {
        let name = params["name"].as_str().unwrap_or_default().to_string();
        let numbers: Vec<u32> = params["params"]
            .as_array()
            .map(|items| {
                items
                    .iter()
                    .filter_map(|v| v.as_u64())
                    .filter_map(|n| u32::try_from(n).ok())
                    .collect()
            })
            .unwrap_or_default();
        let overlay = params["overlay"].as_bool().unwrap_or(false);

        let mut indicators = ctx.indicators.clone();
        if !indicators.iter().any(|i| i.eq_ignore_ascii_case(&name)) {
            indicators.push(name.clone());
        }

        self.apply_one(
            ChartAction::AddIndicator {
                name: name.clone(),
                params: numbers.clone(),
                overlay,
            },
            json!({
                "indicator": name,
                "params": numbers,
                "overlay": overlay,
                "indicators": indicators,
            }),
            "Indicator added",
        )
        .await
    }

    async fn remove_indicator(&self, ctx: &ExecutionContext, params: &Value) -> AgentResponse {
        let name = params["name"].as_str().unwrap_or_default().to_string();
        let indicators: Vec<String> = ctx
            .indicators
            .iter()
            .filter(|i| !i.eq_ignore_ascii_case(&name))
            .cloned()
            .collect();

        self.apply_one(
            ChartAction::RemoveIndicator { name: name.clone() },
            json!({ "indicator": name, "indicators": indicators }),
            "Indicator removed",
        )
        .await
    }

    async fn navigate(&self, params: &Value) -> AgentResponse {
        let raw = params["direction"].as_str().unwrap_or_default();
        let direction = match NavDirection::from_str(raw) {
            Ok(d) => d,
            Err(e) => return AgentResponse::failure(e, "could not navigate"),
        };
        self.apply_one(
            ChartAction::Navigate { direction },
            json!({ "direction": direction.to_string() }),
            "Chart navigated",
        )
        .await
    }

    async fn toggle_option(&self, params: &Value) -> AgentResponse {
        let option = params["option"].as_str().unwrap_or_default().to_string();
        let enabled = params["enabled"].as_bool().unwrap_or(true);
        self.apply_one(
            ChartAction::ToggleOption {
                option: option.clone(),
                enabled,
            },
            json!({ "option": option, "enabled": enabled }),
            "Display option toggled",
        )
        .await
    }

    async fn take_screenshot(&self) -> AgentResponse {
        match self.chart.capture_screenshot().await {
            Ok(reference) => AgentResponse::success(
                json!({ "screenshot": reference }),
                "Screenshot captured",
            ),
            Err(e) => AgentResponse::failure(e.to_string(), "screenshot failed"),
        }
    }

    async fn read_state(&self) -> AgentResponse {
        match self.chart.current_state().await {
            Ok(state) => match serde_json::to_value(&state) {
                Ok(data) => AgentResponse::success(data, "Chart state read"),
                Err(e) => AgentResponse::failure(e.to_string(), "could not encode chart state"),
            },
            Err(e) => AgentResponse::failure(e.to_string(), "could not read chart state"),
        }
    }
}

#[async_trait]
impl Agent for ChartControlAgent {
    fn name(&self) -> &str {
        "chart-control"
    }

    fn description(&self) -> &str {
        "Applies timeframe, chart-type, indicator, and navigation changes to the chart surface"
    }

    fn capabilities(&self) -> &[Capability] {
        &self.capabilities
    }

    async fn execute(&self, ctx: &ExecutionContext, action: &str, params: &Value) -> AgentResponse {
        if let Err(response) = check_params(&self.capabilities, action, params) {
            return response;
        }

        match action {
            "change-timeframe" => self.change_timeframe(params).await,
            "change-chart-type" => self.change_chart_type(params).await,
            "add-indicator" => self.add_indicator(ctx, params).await,
            "remove-indicator" => self.remove_indicator(ctx, params).await,
            "navigate" => self.navigate(params).await,
            "toggle-display-option" => self.toggle_option(params).await,
            "take-screenshot" => self.take_screenshot().await,
            "read-state" => self.read_state().await,
            other => AgentResponse::failure(
                format!("unsupported action: {other}"),
                "action is not part of this agent's capabilities",
            ),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::adapters::chart::InMemoryChart;
    use serde_json::json;

    fn agent() -> ChartControlAgent {
        ChartControlAgent::new(Arc::new(InMemoryChart::new()))
    }

    #[tokio::test]
    async fn change_timeframe_reports_new_value() {
        let response = agent()
            .execute(
                &ExecutionContext::default(),
                "change-timeframe",
                &json!({"timeframe": "5m"}),
            )
            .await;

        assert!(response.is_success());
        assert_eq!(response.data().unwrap()["timeframe"], "5m");
    }

    #[tokio::test]
    async fn missing_required_parameter_fails() {
        let response = agent()
            .execute(&ExecutionContext::default(), "change-timeframe", &json!({}))
            .await;

        assert!(!response.is_success());
        assert!(response.error().unwrap().contains("timeframe"));
    }

    #[tokio::test]
    async fn navigate_rejects_unknown_direction() {
        let response = agent()
            .execute(
                &ExecutionContext::default(),
                "navigate",
                &json!({"direction": "sideways"}),
            )
            .await;

        assert!(!response.is_success());
    }

    #[tokio::test]
    async fn add_indicator_extends_context_list() {
        let ctx = ExecutionContext::default().merged(&json!({"indicators": ["MACD"]}));
        let response = agent()
            .execute(
                &ctx,
                "add-indicator",
                &json!({"name": "EMA", "params": [9, 20], "overlay": true}),
            )
            .await;

        assert!(response.is_success());
        let data = response.data().unwrap();
        assert_eq!(data["indicators"], json!(["MACD", "EMA"]));
        assert_eq!(data["params"], json!([9, 20]));
    }

    #[tokio::test]
    async fn screenshot_returns_reference() {
        let response = agent()
            .execute(&ExecutionContext::default(), "take-screenshot", &Value::Null)
            .await;

        assert!(response.is_success());
        assert!(response.data().unwrap()["screenshot"].as_str().is_some());
    }
}
