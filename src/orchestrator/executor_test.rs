use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use serde_json::{json, Value};

use super::*;
use crate::agents::{Agent, Capability};

/// Succeeds on "emit", returning the configured payload; fails on
/// "fail"; records the context it observed for every call.
struct ProbeAgent {
    name: String,
    capabilities: Vec<Capability>,
    payload: Value,
    seen: Mutex<Vec<ExecutionContext>>,
}

impl ProbeAgent {
    fn new(name: &str, payload: Value) -> Arc<Self> {
        Arc::new(Self {
            name: name.to_string(),
            capabilities: vec![
                Capability::new("emit", "returns the configured payload"),
                Capability::new("fail", "always fails"),
            ],
            payload,
            seen: Mutex::new(Vec::new()),
        })
    }

    fn observed(&self) -> Vec<ExecutionContext> {
        self.seen.lock().unwrap().clone()
    }
}

#[async_trait]
impl Agent for ProbeAgent {
    fn name(&self) -> &str {
        &self.name
    }

    fn description(&self) -> &str {
        "test probe"
    }

    fn capabilities(&self) -> &[Capability] {
        &self.capabilities
    }

    async fn execute(&self, ctx: &ExecutionContext, action: &str, _params: &Value) -> AgentResponse {
        self.seen.lock().unwrap().push(ctx.clone());
        match action {
            "emit" => AgentResponse::success(self.payload.clone(), "emitted"),
            _ => AgentResponse::failure("deliberate failure", "failed"),
        }
    }
}

fn executor_with(agents: &[Arc<ProbeAgent>]) -> WorkflowExecutor {
    let registry = Arc::new(AgentRegistry::new());
    for agent in agents {
        registry.register(agent.clone());
    }
    WorkflowExecutor::new(registry)
}

fn step(agent: &str, action: &str) -> WorkflowStep {
    WorkflowStep::new(agent, action, Value::Null)
}

#[tokio::test]
async fn all_successful_steps_aggregate_cleanly() {
    let a = ProbeAgent::new("a", json!({"x": 1}));
    let executor = executor_with(&[a]);
    let steps = vec![step("a", "emit"), step("a", "emit"), step("a", "emit")];

    let result = executor
        .run(&ExecutionContext::default(), &steps, ExecutionMode::Sequential)
        .await;

    assert!(result.success);
    assert_eq!(result.results.len(), 3);
    assert!(result.errors.is_empty());
    assert_eq!(result.message, "3 steps succeeded, 0 failed");
}

#[tokio::test]
async fn sequential_steps_observe_merged_context() {
    let first = ProbeAgent::new("first", json!({"symbol": "TSLA", "note": "hello"}));
    let second = ProbeAgent::new("second", json!({}));
    let executor = executor_with(&[first, second.clone()]);

    let ctx = ExecutionContext::new("s-1").with_symbol("AAPL");
    let steps = vec![step("first", "emit"), step("second", "emit")];
    let result = executor.run(&ctx, &steps, ExecutionMode::Sequential).await;

    assert!(result.success);
    let seen = second.observed();
    assert_eq!(seen.len(), 1);
    // first step's payload overwrote the symbol and added an extra field
    assert_eq!(seen[0].symbol.as_deref(), Some("TSLA"));
    assert_eq!(seen[0].extra["note"], json!("hello"));
    assert_eq!(seen[0].session_id.as_deref(), Some("s-1"));
    // caller's context is untouched
    assert_eq!(ctx.symbol.as_deref(), Some("AAPL"));
}

#[tokio::test]
async fn one_bad_step_does_not_abort_the_rest() {
    let a = ProbeAgent::new("a", json!({}));
    let executor = executor_with(&[a]);
    let steps = vec![step("a", "emit"), step("a", "fail"), step("a", "emit")];

    let result = executor
        .run(&ExecutionContext::default(), &steps, ExecutionMode::Sequential)
        .await;

    assert!(!result.success);
    assert_eq!(result.results.len(), 2);
    assert_eq!(result.errors, vec!["Step 2: deliberate failure"]);
    assert_eq!(result.message, "2 steps succeeded, 1 failed");
}

#[tokio::test]
async fn missing_agent_yields_exact_error_string() {
    let executor = executor_with(&[]);
    let steps = vec![step("nonexistent", "emit")];

    let result = executor
        .run(&ExecutionContext::default(), &steps, ExecutionMode::Sequential)
        .await;

    assert!(!result.success);
    assert_eq!(result.errors, vec!["Step 1: Agent nonexistent not found"]);
}

#[tokio::test]
async fn unsupported_action_is_a_step_error() {
    let a = ProbeAgent::new("a", json!({}));
    let executor = executor_with(&[a]);
    let steps = vec![step("a", "levitate")];

    let result = executor
        .run(&ExecutionContext::default(), &steps, ExecutionMode::Sequential)
        .await;

    assert_eq!(result.errors, vec!["Step 1: Agent a cannot handle levitate"]);
}

#[tokio::test]
async fn malformed_step_list_aborts_before_execution() {
    let a = ProbeAgent::new("a", json!({}));
    let executor = executor_with(&[a.clone()]);
    let steps = vec![step("a", "emit"), step("", "emit")];

    let result = executor
        .run(&ExecutionContext::default(), &steps, ExecutionMode::Sequential)
        .await;

    assert!(!result.success);
    assert!(result.results.is_empty());
    assert_eq!(result.errors, vec!["Step 2: missing agent name"]);
    // nothing ran at all
    assert!(a.observed().is_empty());
}

#[tokio::test]
async fn parallel_matches_sequential_outcome_sets() {
    let a = ProbeAgent::new("a", json!({"x": 1}));
    let b = ProbeAgent::new("b", json!({"y": 2}));
    let executor = executor_with(&[a, b]);
    let steps = vec![
        step("a", "emit"),
        step("b", "fail"),
        step("missing", "emit"),
        step("b", "emit"),
    ];

    let sequential = executor
        .run(&ExecutionContext::default(), &steps, ExecutionMode::Sequential)
        .await;
    let parallel = executor
        .run(&ExecutionContext::default(), &steps, ExecutionMode::Parallel)
        .await;

    assert_eq!(sequential.success, parallel.success);
    assert_eq!(sequential.errors, parallel.errors);

    let to_set = |r: &WorkflowResult| {
        let mut v: Vec<String> = r
            .results
            .iter()
            .map(|resp| serde_json::to_string(resp).unwrap())
            .collect();
        v.sort();
        v
    };
    assert_eq!(to_set(&sequential), to_set(&parallel));
}

#[tokio::test]
async fn parallel_steps_see_the_starting_context_only() {
    let first = ProbeAgent::new("first", json!({"symbol": "TSLA"}));
    let second = ProbeAgent::new("second", json!({}));
    let executor = executor_with(&[first, second.clone()]);

    let ctx = ExecutionContext::new("s-1").with_symbol("AAPL");
    let steps = vec![step("first", "emit"), step("second", "emit")];
    let result = executor.run(&ctx, &steps, ExecutionMode::Parallel).await;

    assert!(result.success);
    // no inter-step propagation in parallel mode
    assert_eq!(second.observed()[0].symbol.as_deref(), Some("AAPL"));
}

#[test]
fn validate_steps_flags_every_problem() {
    let steps = vec![
        WorkflowStep::new("", "", json!([])),
        WorkflowStep::new("a", "emit", Value::Null),
    ];
    let error = validate_steps(&steps).unwrap_err();
    assert!(error.contains("Step 1: missing agent name"));
    assert!(error.contains("Step 1: missing action name"));
    assert!(error.contains("Step 1: params must be an object"));
}
