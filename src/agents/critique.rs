//! Critique agent: reviews an action plan before it is dispatched

use std::collections::HashSet;

use async_trait::async_trait;
use serde_json::{json, Value};

use super::{check_params, Agent, Capability, ParameterKind, ParameterSpec};
use crate::domain::{ActionPlan, AgentResponse, ExecutionContext};

pub struct CritiqueAgent {
    capabilities: Vec<Capability>,
}

impl CritiqueAgent {
    pub fn new() -> Self {
        Self {
            capabilities: vec![Capability::new(
                "review-plan",
                "Flag redundant or conflicting calls in an action plan",
            )
            .with_params(vec![ParameterSpec::required(
                "plan",
                ParameterKind::Object,
            )])],
        }
    }

    fn review(&self, params: &Value) -> AgentResponse {
        let plan: ActionPlan = match serde_json::from_value(params["plan"].clone()) {
            Ok(p) => p,
            Err(e) => {
                return AgentResponse::failure(
                    format!("plan does not parse: {e}"),
                    "invalid plan",
                )
            }
        };

        let mut findings = Vec::new();

        if plan.is_empty() {
            findings.push(json!({
                "severity": "warning",
                "finding": "plan contains no calls",
            }));
        }

        let mut added: HashSet<String> = HashSet::new();
        let mut directions: HashSet<String> = HashSet::new();
        for call in &plan.calls {
            match call.tool.as_str() {
                "indicators.add" => {
                    if let Some(name) = call.arguments["name"].as_str() {
                        if !added.insert(name.to_uppercase()) {
                            findings.push(json!({
                                "severity": "warning",
                                "finding": format!("indicator {name} is added more than once"),
                            }));
                        }
                    }
                }
                "chart.control.navigate" => {
                    if let Some(direction) = call.arguments["direction"].as_str() {
                        directions.insert(direction.to_string());
                    }
                }
                _ => {}
            }
        }

        for (a, b) in [("left", "right"), ("zoom-in", "zoom-out")] {
            if directions.contains(a) && directions.contains(b) {
                findings.push(json!({
                    "severity": "warning",
                    "finding": format!("plan navigates both {a} and {b}"),
                }));
            }
        }

        let count = findings.len();
        AgentResponse::success(
            json!({ "findings": findings, "clean": count == 0 }),
            format!("{count} findings"),
        )
    }
}

impl Default for CritiqueAgent {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl Agent for CritiqueAgent {
    fn name(&self) -> &str {
        "critique"
    }

    fn description(&self) -> &str {
        "Reviews action plans for redundant or conflicting calls"
    }

    fn capabilities(&self) -> &[Capability] {
        &self.capabilities
    }

    async fn execute(
        &self,
        _ctx: &ExecutionContext,
        action: &str,
        params: &Value,
    ) -> AgentResponse {
        if let Err(response) = check_params(&self.capabilities, action, params) {
            return response;
        }

        match action {
            "review-plan" => self.review(params),
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
    use crate::domain::ToolCall;
    use serde_json::json;

    async fn review(plan: &ActionPlan) -> AgentResponse {
        CritiqueAgent::new()
            .execute(
                &ExecutionContext::default(),
                "review-plan",
                &json!({ "plan": plan }),
            )
            .await
    }

    #[tokio::test]
    async fn empty_plan_is_flagged() {
        let plan = ActionPlan::new(Some("s-1".to_string()));
        let response = review(&plan).await;

        assert!(response.is_success());
        assert_eq!(response.data().unwrap()["clean"], false);
    }

    #[tokio::test]
    async fn duplicate_indicator_adds_are_flagged() {
        let mut plan = ActionPlan::new(Some("s-1".to_string()));
        plan.push(ToolCall::new("indicators.add", json!({"name": "EMA"})));
        plan.push(ToolCall::new("indicators.add", json!({"name": "ema"})));

        let response = review(&plan).await;
        let data = response.data().unwrap();
        assert_eq!(data["clean"], false);
        assert!(data["findings"][0]["finding"]
            .as_str()
            .unwrap()
            .contains("more than once"));
    }

    #[tokio::test]
    async fn conflicting_navigation_is_flagged() {
        let mut plan = ActionPlan::new(Some("s-1".to_string()));
        plan.push(ToolCall::new(
            "chart.control.navigate",
            json!({"direction": "left"}),
        ));
        plan.push(ToolCall::new(
            "chart.control.navigate",
            json!({"direction": "right"}),
        ));

        let response = review(&plan).await;
        assert_eq!(response.data().unwrap()["clean"], false);
    }

    #[tokio::test]
    async fn sensible_plan_is_clean() {
        let mut plan = ActionPlan::new(Some("s-1".to_string()));
        plan.push(ToolCall::new(
            "chart.control.set_timeframe",
            json!({"timeframe": "5m"}),
        ));
        plan.push(ToolCall::new("indicators.add", json!({"name": "EMA"})));

        let response = review(&plan).await;
        assert_eq!(response.data().unwrap()["clean"], true);
    }
}
