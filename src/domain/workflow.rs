//! Programmatic workflow steps

use serde::{Deserialize, Serialize};
use serde_json::Value;

/// A single step of a programmatic workflow: which agent, which action,
/// and the parameter bag to hand it. Distinct from a `ToolCall`, which
/// targets a declarative tool identifier instead of an agent directly.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WorkflowStep {
    pub agent: String,
    pub action: String,
    #[serde(default)]
    pub params: Value,
}

impl WorkflowStep {
    pub fn new(agent: impl Into<String>, action: impl Into<String>, params: Value) -> Self {
        Self {
            agent: agent.into(),
            action: action.into(),
            params,
        }
    }
}

/// Concurrency discipline for a workflow run
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ExecutionMode {
    /// Strictly ordered; each step sees the previous steps' merged data
    #[default]
    Sequential,
    /// All steps run concurrently against a snapshot of the starting
    /// context; no step observes another step's output
    Parallel,
}
