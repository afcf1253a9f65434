//! Action plans: the contract between the command parser and dispatch

use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Current plan schema version
pub const PLAN_VERSION: u32 = 1;

/// The atomic unit of an action plan: a declarative tool identifier plus
/// its argument bag.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ToolCall {
    pub tool: String,
    #[serde(default)]
    pub arguments: Value,
}

impl ToolCall {
    pub fn new(tool: impl Into<String>, arguments: Value) -> Self {
        Self {
            tool: tool.into(),
            arguments,
        }
    }
}

/// Ordered list of tool calls produced by the command parser and
/// consumed by plan dispatch. Plans are value objects: no identity
/// beyond their session id, never mutated after construction.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ActionPlan {
    pub version: u32,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub session_id: Option<String>,
    #[serde(default)]
    pub calls: Vec<ToolCall>,
}

impl ActionPlan {
    pub fn new(session_id: Option<String>) -> Self {
        Self {
            version: PLAN_VERSION,
            session_id,
            calls: Vec::new(),
        }
    }

    pub fn push(&mut self, call: ToolCall) {
        self.calls.push(call);
    }

    pub fn is_empty(&self) -> bool {
        self.calls.is_empty()
    }

    pub fn len(&self) -> usize {
        self.calls.len()
    }

    /// Tool identifiers in plan order
    pub fn tools(&self) -> Vec<&str> {
        self.calls.iter().map(|c| c.tool.as_str()).collect()
    }
}
