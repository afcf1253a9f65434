//! Alert agent: in-process price alert registry

use std::sync::Mutex;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use uuid::Uuid;

use super::{check_params, Agent, Capability, ParameterKind, ParameterSpec};
use crate::domain::{AgentResponse, ExecutionContext};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AlertRecord {
    pub id: String,
    pub symbol: String,
    pub condition: String,
    pub price: f64,
    pub created_at: DateTime<Utc>,
}

pub struct AlertAgent {
    alerts: Mutex<Vec<AlertRecord>>,
    capabilities: Vec<Capability>,
}

impl AlertAgent {
    pub fn new() -> Self {
        Self {
            alerts: Mutex::new(Vec::new()),
            capabilities: vec![
                Capability::new("create-alert", "Register a price alert").with_params(vec![
                    ParameterSpec::optional("symbol", ParameterKind::String),
                    ParameterSpec::one_of("condition", &["above", "below"]),
                    ParameterSpec::required("price", ParameterKind::Number),
                ]),
                Capability::new("list-alerts", "List registered alerts").with_params(vec![
                    ParameterSpec::optional("symbol", ParameterKind::String),
                ]),
                Capability::new("remove-alert", "Remove an alert by id").with_params(vec![
                    ParameterSpec::required("id", ParameterKind::String),
                ]),
            ],
        }
    }

    fn create(&self, ctx: &ExecutionContext, params: &Value) -> AgentResponse {
        let Some(symbol) = params["symbol"]
            .as_str()
            .map(str::to_string)
            .or_else(|| ctx.symbol.clone())
        else {
            return AgentResponse::failure(
                "no symbol in parameters or session context",
                "alert requires a symbol",
            );
        };

        let price = params["price"].as_f64().unwrap_or_default();
        if price <= 0.0 {
            return AgentResponse::failure(
                format!("alert price must be positive, got {price}"),
                "invalid alert price",
            );
        }

        let record = AlertRecord {
            id: Uuid::new_v4().to_string(),
            symbol,
            condition: params["condition"].as_str().unwrap_or_default().to_string(),
            price,
            created_at: Utc::now(),
        };

        let data = json!(&record);
        self.alerts
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .push(record);

        AgentResponse::success(data, "Alert created")
    }

    fn list(&self, params: &Value) -> AgentResponse {
        let alerts = self.alerts.lock().unwrap_or_else(|e| e.into_inner());
        let filter = params["symbol"].as_str();
        let matching: Vec<&AlertRecord> = alerts
            .iter()
            .filter(|a| filter.map_or(true, |s| a.symbol.eq_ignore_ascii_case(s)))
            .collect();

        let count = matching.len();
        AgentResponse::success(
            json!({ "alerts": matching, "count": count }),
            format!("{count} alerts"),
        )
    }

    fn remove(&self, params: &Value) -> AgentResponse {
        let id = params["id"].as_str().unwrap_or_default();
        let mut alerts = self.alerts.lock().unwrap_or_else(|e| e.into_inner());
        let before = alerts.len();
        alerts.retain(|a| a.id != id);

        if alerts.len() == before {
            AgentResponse::failure(format!("no alert with id {id}"), "alert not found")
        } else {
            AgentResponse::success(json!({ "removed": id }), "Alert removed")
        }
    }
}

impl Default for AlertAgent {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl Agent for AlertAgent {
    fn name(&self) -> &str {
        "alert"
    }

    fn description(&self) -> &str {
        "Manages in-process price alerts"
    }

    fn capabilities(&self) -> &[Capability] {
        &self.capabilities
    }

    async fn execute(&self, ctx: &ExecutionContext, action: &str, params: &Value) -> AgentResponse {
        if let Err(response) = check_params(&self.capabilities, action, params) {
            return response;
        }

        match action {
            "create-alert" => self.create(ctx, params),
            "list-alerts" => self.list(params),
            "remove-alert" => self.remove(params),
            other => AgentResponse::failure(
                format!("unsupported action: {other}"),
                "action is not part of this agent's capabilities",
            ),
        }
    }
}
