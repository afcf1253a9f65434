//! Plan dispatch: declarative tool calls to agent-contract calls
//!
//! The binding table below is the single place where the plan
//! vocabulary is translated into agent actions. Adding a tool means
//! adding a row, not a conditional somewhere else.

use std::sync::Arc;

use serde_json::{json, Value};

use crate::agents::{guarded, validate_args, AgentRegistry, ParameterKind, ParameterSpec};
use crate::domain::{
    ActionPlan, AgentResponse, ExecutionContext, WorkflowResult, PLAN_VERSION,
};
use crate::parser::tools;

struct ToolBinding {
    tool: &'static str,
    agent: &'static str,
    action: &'static str,
    params: Vec<ParameterSpec>,
}

fn tool_table() -> Vec<ToolBinding> {
    vec![
        ToolBinding {
            tool: tools::CONTEXT_FETCH,
            agent: "chart-control",
            action: "read-state",
            params: vec![],
        },
        ToolBinding {
            tool: tools::SET_TIMEFRAME,
            agent: "chart-control",
            action: "change-timeframe",
            params: vec![ParameterSpec::required("timeframe", ParameterKind::String)],
        },
        ToolBinding {
            tool: tools::SET_TYPE,
            agent: "chart-control",
            action: "change-chart-type",
            params: vec![ParameterSpec::required("chart_type", ParameterKind::String)],
        },
        ToolBinding {
            tool: tools::NAVIGATE,
            agent: "chart-control",
            action: "navigate",
            params: vec![ParameterSpec::one_of(
                "direction",
                &["left", "right", "zoom-in", "zoom-out"],
            )],
        },
        ToolBinding {
            tool: tools::INDICATOR_ADD,
            agent: "chart-control",
            action: "add-indicator",
            params: vec![
                ParameterSpec::required("name", ParameterKind::String),
                ParameterSpec::optional("params", ParameterKind::Array),
                ParameterSpec::optional("overlay", ParameterKind::Boolean),
                ParameterSpec::optional("style", ParameterKind::Object),
            ],
        },
        ToolBinding {
            tool: tools::INDICATOR_REMOVE,
            agent: "chart-control",
            action: "remove-indicator",
            params: vec![ParameterSpec::required("name", ParameterKind::String)],
        },
        ToolBinding {
            tool: tools::SCREENSHOT,
            agent: "chart-control",
            action: "take-screenshot",
            params: vec![],
        },
        ToolBinding {
            tool: tools::ANALYSIS,
            agent: "analysis",
            action: "analyze-chart",
            params: vec![
                ParameterSpec::optional("symbol", ParameterKind::String),
                ParameterSpec::optional("timeframe", ParameterKind::String),
            ],
        },
        ToolBinding {
            tool: tools::STATE_VERIFY,
            agent: "chart-control",
            action: "read-state",
            params: vec![ParameterSpec::required("expected", ParameterKind::Object)],
        },
    ]
}

pub struct PlanDispatcher {
    registry: Arc<AgentRegistry>,
}

impl PlanDispatcher {
    pub fn new(registry: Arc<AgentRegistry>) -> Self {
        Self { registry }
    }

    /// Dispatch every tool call in order, with the same step-boundary
    /// error recovery as the sequential executor. Unknown tools and
    /// schema violations cost their own step and nothing else.
    pub async fn dispatch(&self, ctx: &ExecutionContext, plan: &ActionPlan) -> WorkflowResult {
        if plan.version != PLAN_VERSION {
            return WorkflowResult::aborted(format!(
                "unsupported plan version {} (expected {PLAN_VERSION})",
                plan.version
            ));
        }

        let table = tool_table();
        let mut ctx = ctx.clone();
        let mut results = Vec::new();
        let mut errors = Vec::new();

        tracing::info!(calls = plan.len(), "dispatching plan");

        for (index, call) in plan.calls.iter().enumerate() {
            let n = index + 1;

            let Some(binding) = table.iter().find(|b| b.tool == call.tool) else {
                errors.push(format!("Step {n}: Unknown tool {}", call.tool));
                continue;
            };

            if let Err(e) = validate_args(&binding.params, &call.arguments) {
                errors.push(format!("Step {n}: {e}"));
                continue;
            }

            let Some(agent) = self.registry.get(binding.agent) else {
                errors.push(format!("Step {n}: Agent {} not found", binding.agent));
                continue;
            };

            let response = if call.tool == tools::STATE_VERIFY {
                let read = guarded(agent.as_ref(), &ctx, binding.action, &Value::Null).await;
                verify_state(&call.arguments["expected"], read)
            } else {
                guarded(agent.as_ref(), &ctx, binding.action, &call.arguments).await
            };

            match response {
                AgentResponse::Success { ref data, .. } => {
                    ctx = ctx.merged(data);
                    results.push(response);
                }
                AgentResponse::Failure { ref error, .. } => {
                    errors.push(format!("Step {n}: {error}"));
                }
            }
        }

        WorkflowResult::from_outcomes(results, errors)
    }
}

/// Field-by-field comparison of the read-back chart state against the
/// expected values, reporting named mismatches rather than a single
/// boolean.
fn verify_state(expected: &Value, read: AgentResponse) -> AgentResponse {
    let actual = match read {
        AgentResponse::Success { data, .. } => data,
        failure => return failure,
    };

    let Some(expected) = expected.as_object() else {
        return AgentResponse::failure("expected values must be an object", "cannot verify state");
    };

    let mut mismatches = Vec::new();
    for (field, want) in expected {
        let got = actual.get(field).cloned().unwrap_or(Value::Null);
        if &got != want {
            mismatches.push(json!({
                "field": field,
                "expected": want,
                "actual": got,
            }));
        }
    }

    let verified = mismatches.is_empty();
    let message = if verified {
        "chart state matches".to_string()
    } else {
        format!("{} fields differ", mismatches.len())
    };
    AgentResponse::success(
        json!({ "verified": verified, "mismatches": mismatches }),
        message,
    )
}
