//! Workflow executor: sequential and parallel step machines
//!
//! A workflow never aborts because of a single bad step. The only
//! whole-workflow abort is the pre-flight shape validation on the full
//! step list; every later failure is collected at the step boundary and
//! execution moves on.

use std::sync::Arc;

use futures::future::join_all;
use serde_json::Value;

use crate::agents::{guarded, AgentRegistry};
use crate::domain::{AgentResponse, ExecutionContext, ExecutionMode, WorkflowResult, WorkflowStep};

pub struct WorkflowExecutor {
    registry: Arc<AgentRegistry>,
}

impl WorkflowExecutor {
    pub fn new(registry: Arc<AgentRegistry>) -> Self {
        Self { registry }
    }

    pub async fn run(
        &self,
        ctx: &ExecutionContext,
        steps: &[WorkflowStep],
        mode: ExecutionMode,
    ) -> WorkflowResult {
        if let Err(error) = validate_steps(steps) {
            tracing::warn!(%error, "workflow rejected before execution");
            return WorkflowResult::aborted(error);
        }

        tracing::info!(steps = steps.len(), ?mode, "executing workflow");
        match mode {
            ExecutionMode::Sequential => self.run_sequential(ctx, steps).await,
            ExecutionMode::Parallel => self.run_parallel(ctx, steps).await,
        }
    }

    /// Strictly ordered: each successful step's data payload is merged
    /// into the context all subsequent steps observe.
    async fn run_sequential(
        &self,
        ctx: &ExecutionContext,
        steps: &[WorkflowStep],
    ) -> WorkflowResult {
        let mut ctx = ctx.clone();
        let mut results = Vec::new();
        let mut errors = Vec::new();

        for (index, step) in steps.iter().enumerate() {
            let n = index + 1;
            match self.resolve(n, step) {
                Err(error) => errors.push(error),
                Ok(agent) => {
                    let response = guarded(agent.as_ref(), &ctx, &step.action, &step.params).await;
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
            }
        }

        WorkflowResult::from_outcomes(results, errors)
    }

    /// All steps dispatched concurrently against a snapshot of the
    /// starting context; no step observes another step's output, and the
    /// executor waits for every task before aggregating.
    async fn run_parallel(&self, ctx: &ExecutionContext, steps: &[WorkflowStep]) -> WorkflowResult {
        let mut errors = Vec::new();
        let mut tasks = Vec::new();

        for (index, step) in steps.iter().enumerate() {
            let n = index + 1;
            match self.resolve(n, step) {
                Err(error) => errors.push((n, error)),
                Ok(agent) => {
                    let ctx = ctx.clone();
                    let action = step.action.clone();
                    let params = step.params.clone();
                    tasks.push(async move {
                        let response = guarded(agent.as_ref(), &ctx, &action, &params).await;
                        (n, response)
                    });
                }
            }
        }

        let mut outcomes = join_all(tasks).await;
        outcomes.sort_by_key(|(n, _)| *n);

        let mut results = Vec::new();
        for (n, response) in outcomes {
            match response {
                AgentResponse::Success { .. } => results.push(response),
                AgentResponse::Failure { ref error, .. } => {
                    errors.push((n, format!("Step {n}: {error}")));
                }
            }
        }

        errors.sort_by_key(|(n, _)| *n);
        WorkflowResult::from_outcomes(results, errors.into_iter().map(|(_, e)| e).collect())
    }

    fn resolve(
        &self,
        n: usize,
        step: &WorkflowStep,
    ) -> Result<Arc<dyn crate::agents::Agent>, String> {
        let Some(agent) = self.registry.get(&step.agent) else {
            return Err(format!("Step {n}: Agent {} not found", step.agent));
        };
        if !agent.can_handle(&step.action) {
            return Err(format!(
                "Step {n}: Agent {} cannot handle {}",
                step.agent, step.action
            ));
        }
        Ok(agent)
    }
}

/// Pre-flight shape validation over the whole step list. Any violation
/// aborts the workflow before a single step runs.
pub fn validate_steps(steps: &[WorkflowStep]) -> Result<(), String> {
    let mut problems = Vec::new();
    for (index, step) in steps.iter().enumerate() {
        let n = index + 1;
        if step.agent.trim().is_empty() {
            problems.push(format!("Step {n}: missing agent name"));
        }
        if step.action.trim().is_empty() {
            problems.push(format!("Step {n}: missing action name"));
        }
        if !matches!(step.params, Value::Null | Value::Object(_)) {
            problems.push(format!("Step {n}: params must be an object"));
        }
    }

    if problems.is_empty() {
        Ok(())
    } else {
        Err(problems.join("; "))
    }
}

#[cfg(test)]
#[path = "executor_test.rs"]
mod tests;
