//! Strategy agent: turns analysis output into concrete suggestions

use async_trait::async_trait;
use serde_json::{json, Value};

use super::{check_params, Agent, Capability, ParameterKind, ParameterSpec};
use crate::domain::{AgentResponse, ExecutionContext};

pub struct StrategyAgent {
    capabilities: Vec<Capability>,
}

impl StrategyAgent {
    pub fn new() -> Self {
        Self {
            capabilities: vec![
                Capability::new(
                    "suggest-strategy",
                    "Suggest an approach matching the observed trend",
                )
                .with_params(vec![ParameterSpec::optional("trend", ParameterKind::String)]),
                Capability::new(
                    "evaluate-setup",
                    "Score a proposed entry against its stop and target",
                )
                .with_params(vec![
                    ParameterSpec::required("entry", ParameterKind::Number),
                    ParameterSpec::required("stop", ParameterKind::Number),
                    ParameterSpec::required("target", ParameterKind::Number),
                ]),
            ],
        }
    }

    fn suggest(&self, ctx: &ExecutionContext, params: &Value) -> AgentResponse {
        // trend can come from explicit params or a previous analysis
        // step merged into the context
        let trend = params["trend"]
            .as_str()
            .or_else(|| ctx.extra.get("trend").and_then(Value::as_str))
            .unwrap_or("unknown");

        let (approach, note) = match trend {
            "bullish" => (
                "trend-following long",
                "buy pullbacks toward the fast moving average",
            ),
            "bearish" => (
                "trend-following short",
                "sell rallies toward the fast moving average",
            ),
            "sideways" => (
                "range trading",
                "fade moves at the edges of the recent range",
            ),
            _ => (
                "wait",
                "no directional read available; analyze the chart first",
            ),
        };

        AgentResponse::success(
            json!({ "trend": trend, "approach": approach, "note": note }),
            format!("suggested approach: {approach}"),
        )
    }

    fn evaluate(&self, params: &Value) -> AgentResponse {
        let entry = params["entry"].as_f64().unwrap_or_default();
        let stop = params["stop"].as_f64().unwrap_or_default();
        let target = params["target"].as_f64().unwrap_or_default();

        let risk = (entry - stop).abs();
        let reward = (target - entry).abs();
        if risk == 0.0 {
            return AgentResponse::failure(
                "entry and stop are identical",
                "setup has no measurable risk",
            );
        }

        let ratio = reward / risk;
        let verdict = if ratio >= 2.0 {
            "favorable"
        } else if ratio >= 1.0 {
            "marginal"
        } else {
            "unfavorable"
        };

        AgentResponse::success(
            json!({
                "entry": entry,
                "stop": stop,
                "target": target,
                "risk": risk,
                "reward": reward,
                "risk_reward": (ratio * 100.0).round() / 100.0,
                "verdict": verdict,
            }),
            format!("setup is {verdict}"),
        )
    }
}

impl Default for StrategyAgent {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl Agent for StrategyAgent {
    fn name(&self) -> &str {
        "strategy"
    }

    fn description(&self) -> &str {
        "Suggests trading approaches and scores entry setups"
    }

    fn capabilities(&self) -> &[Capability] {
        &self.capabilities
    }

    async fn execute(&self, ctx: &ExecutionContext, action: &str, params: &Value) -> AgentResponse {
        if let Err(response) = check_params(&self.capabilities, action, params) {
            return response;
        }

        match action {
            "suggest-strategy" => self.suggest(ctx, params),
            "evaluate-setup" => self.evaluate(params),
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
    use serde_json::json;

    #[tokio::test]
    async fn suggests_from_context_trend() {
        let ctx = ExecutionContext::default().merged(&json!({"trend": "bullish"}));
        let response = StrategyAgent::new()
            .execute(&ctx, "suggest-strategy", &Value::Null)
            .await;

        assert!(response.is_success());
        assert_eq!(
            response.data().unwrap()["approach"],
            "trend-following long"
        );
    }

    #[tokio::test]
    async fn evaluates_risk_reward() {
        let response = StrategyAgent::new()
            .execute(
                &ExecutionContext::default(),
                "evaluate-setup",
                &json!({"entry": 100.0, "stop": 95.0, "target": 115.0}),
            )
            .await;

        assert!(response.is_success());
        let data = response.data().unwrap();
        assert_eq!(data["risk_reward"], 3.0);
        assert_eq!(data["verdict"], "favorable");
    }

    #[tokio::test]
    async fn zero_risk_setup_is_rejected() {
        let response = StrategyAgent::new()
            .execute(
                &ExecutionContext::default(),
                "evaluate-setup",
                &json!({"entry": 100.0, "stop": 100.0, "target": 110.0}),
            )
            .await;

        assert!(!response.is_success());
    }
}
