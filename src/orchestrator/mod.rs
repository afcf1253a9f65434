//! Orchestration surface
//!
//! The in-process call surface of the engine: named actions, each
//! taking a context and a parameter bag, each returning the uniform
//! response shape. A thin transport layer can expose these remotely;
//! none is provided here.

pub mod dispatch;
pub mod executor;

pub use dispatch::PlanDispatcher;
pub use executor::WorkflowExecutor;

use std::sync::Arc;

use serde_json::{json, Value};

use crate::agents::AgentRegistry;
use crate::config::Settings;
use crate::domain::{
    ActionPlan, AgentResponse, CapabilityCatalog, ExecutionContext, ExecutionMode, WorkflowStep,
};
use crate::parser::CommandParser;

pub struct Orchestrator {
    registry: Arc<AgentRegistry>,
    executor: WorkflowExecutor,
    dispatcher: PlanDispatcher,
    settings: Arc<Settings>,
}

impl Orchestrator {
    pub fn new(registry: Arc<AgentRegistry>, settings: Arc<Settings>) -> Self {
        Self {
            executor: WorkflowExecutor::new(registry.clone()),
            dispatcher: PlanDispatcher::new(registry.clone()),
            registry,
            settings,
        }
    }

    /// Entry point for every orchestration action.
    pub async fn handle(
        &self,
        ctx: &ExecutionContext,
        action: &str,
        params: &Value,
    ) -> AgentResponse {
        tracing::debug!(action, "orchestrator action");
        match action {
            "execute-workflow" => self.execute_workflow(ctx, params).await,
            "execute-plan" => self.execute_plan(ctx, params).await,
            "process-chart-command" => self.process_chart_command(ctx, params).await,
            "coordinate-analysis" => self.coordinate_analysis(ctx).await,
            "get-agent-status" => {
                AgentResponse::success(self.registry.status(), "agent status")
            }
            other => AgentResponse::failure(
                format!("unknown orchestration action: {other}"),
                "unsupported action",
            ),
        }
    }

    async fn execute_workflow(&self, ctx: &ExecutionContext, params: &Value) -> AgentResponse {
        let steps: Vec<WorkflowStep> = match serde_json::from_value(params["steps"].clone()) {
            Ok(steps) => steps,
            Err(e) => {
                return AgentResponse::failure(
                    format!("malformed workflow steps: {e}"),
                    "cannot execute workflow",
                )
            }
        };
        let mode = params
            .get("mode")
            .and_then(|m| serde_json::from_value::<ExecutionMode>(m.clone()).ok())
            .unwrap_or(self.settings.engine.default_mode);

        let result = self.executor.run(ctx, &steps, mode).await;
        workflow_response(result)
    }

    async fn execute_plan(&self, ctx: &ExecutionContext, params: &Value) -> AgentResponse {
        // accept both {"plan": {...}} and a bare plan object
        let raw = if params.get("plan").is_some() {
            params["plan"].clone()
        } else {
            params.clone()
        };
        let plan: ActionPlan = match serde_json::from_value(raw) {
            Ok(plan) => plan,
            Err(e) => {
                return AgentResponse::failure(
                    format!("malformed action plan: {e}"),
                    "cannot execute plan",
                )
            }
        };

        let result = self.dispatcher.dispatch(ctx, &plan).await;
        workflow_response(result)
    }

    /// Free text in, parse, dispatch, both plan and outcome out.
    async fn process_chart_command(&self, ctx: &ExecutionContext, params: &Value) -> AgentResponse {
        let Some(command) = params["command"].as_str() else {
            return AgentResponse::failure(
                "missing required parameter 'command'",
                "cannot process command",
            );
        };

        // the catalogue is rebuilt from settings on every call
        let catalog = CapabilityCatalog::new(self.settings.catalog.clone());
        let parser = CommandParser::new(&catalog, self.settings.engine.parameter_window);
        let plan = parser.parse(command, ctx.session_id.clone());

        let result = self.dispatcher.dispatch(ctx, &plan).await;
        let message = if plan.is_empty() {
            "command named nothing actionable".to_string()
        } else {
            result.message.clone()
        };

        AgentResponse::success(json!({ "plan": plan, "result": result }), message)
    }

    /// Canned read-analyze-levels pipeline over the session's symbol.
    async fn coordinate_analysis(&self, ctx: &ExecutionContext) -> AgentResponse {
        let steps = vec![
            WorkflowStep::new("chart-control", "read-state", Value::Null),
            WorkflowStep::new("analysis", "analyze-chart", Value::Null),
            WorkflowStep::new("analysis", "support-resistance", Value::Null),
        ];

        let result = self.executor.run(ctx, &steps, ExecutionMode::Sequential).await;
        workflow_response(result)
    }
}

/// Wrap an aggregate outcome in the uniform response shape. The
/// orchestration action itself succeeded either way; callers inspect
/// the embedded error list for per-step failures.
fn workflow_response(result: crate::domain::WorkflowResult) -> AgentResponse {
    let message = result.message.clone();
    match serde_json::to_value(&result) {
        Ok(data) => AgentResponse::success(data, message),
        Err(e) => AgentResponse::failure(e.to_string(), "could not encode workflow result"),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::adapters::chart::InMemoryChart;
    use crate::adapters::market::StaticMarketData;

    fn orchestrator() -> Orchestrator {
        let registry = crate::default_registry(
            Arc::new(InMemoryChart::new()),
            Arc::new(StaticMarketData::new()),
        );
        Orchestrator::new(registry, Arc::new(Settings::default()))
    }

    #[tokio::test]
    async fn unknown_action_fails() {
        let response = orchestrator()
            .handle(&ExecutionContext::default(), "do-magic", &Value::Null)
            .await;
        assert!(!response.is_success());
    }

    #[tokio::test]
    async fn get_agent_status_lists_all_six() {
        let response = orchestrator()
            .handle(&ExecutionContext::default(), "get-agent-status", &Value::Null)
            .await;

        assert!(response.is_success());
        assert_eq!(response.data().unwrap()["count"], 6);
    }

    #[tokio::test]
    async fn execute_workflow_runs_steps() {
        let params = json!({
            "steps": [
                {"agent": "chart-control", "action": "change-timeframe",
                 "params": {"timeframe": "1h"}},
                {"agent": "chart-control", "action": "read-state"}
            ]
        });

        let response = orchestrator()
            .handle(&ExecutionContext::new("s-1"), "execute-workflow", &params)
            .await;

        assert!(response.is_success());
        let data = response.data().unwrap();
        assert_eq!(data["success"], true);
        assert_eq!(data["results"].as_array().unwrap().len(), 2);
    }

    #[tokio::test]
    async fn malformed_workflow_steps_fail_fast() {
        let params = json!({"steps": "not a list"});
        let response = orchestrator()
            .handle(&ExecutionContext::default(), "execute-workflow", &params)
            .await;

        assert!(!response.is_success());
        assert!(response.error().unwrap().contains("malformed workflow steps"));
    }

    #[tokio::test]
    async fn coordinate_analysis_produces_levels() {
        let ctx = ExecutionContext::new("s-1").with_symbol("AAPL");
        let response = orchestrator()
            .handle(&ctx, "coordinate-analysis", &Value::Null)
            .await;

        assert!(response.is_success());
        let data = response.data().unwrap();
        assert_eq!(data["success"], true, "errors: {}", data["errors"]);
        assert_eq!(data["results"].as_array().unwrap().len(), 3);
    }

    #[tokio::test]
    async fn process_chart_command_returns_plan_and_result() {
        let ctx = ExecutionContext::new("s-1").with_symbol("AAPL");
        let response = orchestrator()
            .handle(
                &ctx,
                "process-chart-command",
                &json!({"command": "switch to 5 minute chart and add ema 9 and 20"}),
            )
            .await;

        assert!(response.is_success());
        let data = response.data().unwrap();
        assert_eq!(data["plan"]["session_id"], "s-1");
        assert_eq!(data["result"]["success"], true, "errors: {}", data["result"]["errors"]);
    }
}
