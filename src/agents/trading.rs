//! Trading agent: paper order preparation only, no live execution

use async_trait::async_trait;
use serde_json::{json, Value};
use uuid::Uuid;

use super::{check_params, Agent, Capability, ParameterKind, ParameterSpec};
use crate::domain::{AgentResponse, ExecutionContext};

pub struct TradingAgent {
    capabilities: Vec<Capability>,
}

fn order_params() -> Vec<ParameterSpec> {
    vec![
        ParameterSpec::optional("symbol", ParameterKind::String),
        ParameterSpec::one_of("side", &["buy", "sell"]),
        ParameterSpec::required("quantity", ParameterKind::Number),
        ParameterSpec::optional("limit_price", ParameterKind::Number),
    ]
}

impl TradingAgent {
    pub fn new() -> Self {
        Self {
            capabilities: vec![
                Capability::new("prepare-order", "Build a paper order ticket")
                    .with_params(order_params()),
                Capability::new("validate-order", "Check an order's fields without creating it")
                    .with_params(order_params()),
            ],
        }
    }

    fn check_order(ctx: &ExecutionContext, params: &Value) -> Result<(String, f64), String> {
        let symbol = params["symbol"]
            .as_str()
            .map(str::to_string)
            .or_else(|| ctx.symbol.clone())
            .ok_or_else(|| "no symbol in parameters or session context".to_string())?;

        let quantity = params["quantity"].as_f64().unwrap_or_default();
        if quantity <= 0.0 {
            return Err(format!("quantity must be positive, got {quantity}"));
        }

        if let Some(limit) = params.get("limit_price").and_then(Value::as_f64) {
            if limit <= 0.0 {
                return Err(format!("limit price must be positive, got {limit}"));
            }
        }

        Ok((symbol, quantity))
    }

    fn prepare(&self, ctx: &ExecutionContext, params: &Value) -> AgentResponse {
        let (symbol, quantity) = match Self::check_order(ctx, params) {
            Ok(v) => v,
            Err(e) => return AgentResponse::failure(e, "order rejected"),
        };
        let side = params["side"].as_str().unwrap_or_default();
        let limit_price = params.get("limit_price").and_then(Value::as_f64);

        let ticket = json!({
            "order_id": Uuid::new_v4().to_string(),
            "symbol": symbol,
            "side": side,
            "quantity": quantity,
            "limit_price": limit_price,
            "kind": if limit_price.is_some() { "limit" } else { "market" },
            "status": "prepared",
            "paper": true,
        });

        AgentResponse::success(ticket, format!("paper {side} order prepared for {symbol}"))
    }

    fn validate(&self, ctx: &ExecutionContext, params: &Value) -> AgentResponse {
        match Self::check_order(ctx, params) {
            Ok((symbol, quantity)) => AgentResponse::success(
                json!({ "symbol": symbol, "quantity": quantity, "valid": true }),
                "order fields are valid",
            ),
            Err(e) => AgentResponse::failure(e, "order fields are invalid"),
        }
    }
}

impl Default for TradingAgent {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl Agent for TradingAgent {
    fn name(&self) -> &str {
        "trading"
    }

    fn description(&self) -> &str {
        "Prepares and validates paper order tickets"
    }

    fn capabilities(&self) -> &[Capability] {
        &self.capabilities
    }

    async fn execute(&self, ctx: &ExecutionContext, action: &str, params: &Value) -> AgentResponse {
        if let Err(response) = check_params(&self.capabilities, action, params) {
            return response;
        }

        match action {
            "prepare-order" => self.prepare(ctx, params),
            "validate-order" => self.validate(ctx, params),
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
    async fn prepares_paper_ticket_with_context_symbol() {
        let ctx = ExecutionContext::new("s-1").with_symbol("AAPL");
        let response = TradingAgent::new()
            .execute(
                &ctx,
                "prepare-order",
                &json!({"side": "buy", "quantity": 10}),
            )
            .await;

        assert!(response.is_success());
        let data = response.data().unwrap();
        assert_eq!(data["symbol"], "AAPL");
        assert_eq!(data["kind"], "market");
        assert_eq!(data["paper"], true);
        assert!(data["order_id"].as_str().is_some());
    }

    #[tokio::test]
    async fn rejects_non_positive_quantity() {
        let response = TradingAgent::new()
            .execute(
                &ExecutionContext::default(),
                "validate-order",
                &json!({"symbol": "TSLA", "side": "sell", "quantity": 0}),
            )
            .await;

        assert!(!response.is_success());
        assert!(response.error().unwrap().contains("quantity"));
    }

    #[tokio::test]
    async fn rejects_unknown_side() {
        let response = TradingAgent::new()
            .execute(
                &ExecutionContext::default(),
                "prepare-order",
                &json!({"symbol": "TSLA", "side": "hold", "quantity": 1}),
            )
            .await;

        assert!(!response.is_success());
    }
}
