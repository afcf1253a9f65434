//! Agent contract and concrete agents
//!
//! Every agent exposes the same fixed contract: a name, a description,
//! a declared capability list, a `can_handle` predicate, and an
//! `execute` operation returning the uniform response shape. Concrete
//! agents are leaves with no dependency on the orchestration layer.
//!
//! - `registry` - name-keyed lookup table over registered agents
//! - `chart` - chart-control agent over the `ChartPort` boundary
//! - `analysis` - trend/levels/signals over `MarketDataPort` candles
//! - `strategy`, `trading`, `alert`, `critique` - remaining leaves

pub mod alert;
pub mod analysis;
pub mod chart;
pub mod critique;
pub mod registry;
pub mod strategy;
pub mod trading;

pub use registry::AgentRegistry;

use async_trait::async_trait;
use futures::FutureExt;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::panic::AssertUnwindSafe;

use crate::domain::{AgentResponse, ExecutionContext};

/// A declared, named operation an agent supports, with a described
/// parameter shape. Immutable once the agent is constructed; used both
/// for documentation and for `can_handle` routing.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Capability {
    pub name: String,
    pub description: String,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub parameters: Vec<ParameterSpec>,
}

impl Capability {
    pub fn new(name: &str, description: &str) -> Self {
        Self {
            name: name.to_string(),
            description: description.to_string(),
            parameters: Vec::new(),
        }
    }

    pub fn with_params(mut self, parameters: Vec<ParameterSpec>) -> Self {
        self.parameters = parameters;
        self
    }
}

/// Shape of one declared parameter
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ParameterSpec {
    pub name: String,
    pub kind: ParameterKind,
    #[serde(default)]
    pub required: bool,
    /// Enumeration of allowed string values, when constrained
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub allowed: Option<Vec<String>>,
}

impl ParameterSpec {
    pub fn required(name: &str, kind: ParameterKind) -> Self {
        Self {
            name: name.to_string(),
            kind,
            required: true,
            allowed: None,
        }
    }

    pub fn optional(name: &str, kind: ParameterKind) -> Self {
        Self {
            name: name.to_string(),
            kind,
            required: false,
            allowed: None,
        }
    }

    pub fn one_of(name: &str, values: &[&str]) -> Self {
        Self {
            name: name.to_string(),
            kind: ParameterKind::String,
            required: true,
            allowed: Some(values.iter().map(|v| v.to_string()).collect()),
        }
    }
}

/// Primitive parameter types
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ParameterKind {
    String,
    Integer,
    Number,
    Boolean,
    Array,
    Object,
}

impl ParameterKind {
    pub fn matches(&self, value: &Value) -> bool {
        match self {
            ParameterKind::String => value.is_string(),
            ParameterKind::Integer => value.is_i64() || value.is_u64(),
            ParameterKind::Number => value.is_number(),
            ParameterKind::Boolean => value.is_boolean(),
            ParameterKind::Array => value.is_array(),
            ParameterKind::Object => value.is_object(),
        }
    }
}

/// Validate an argument bag against a declared parameter shape.
///
/// `Null` is accepted when nothing is required; anything else must be an
/// object. Returns a human-readable description of the first group of
/// violations.
pub fn validate_args(specs: &[ParameterSpec], args: &Value) -> Result<(), String> {
    let obj = match args {
        Value::Null => {
            if let Some(missing) = specs.iter().find(|s| s.required) {
                return Err(format!("missing required parameter '{}'", missing.name));
            }
            return Ok(());
        }
        Value::Object(obj) => obj,
        other => return Err(format!("parameters must be an object, got {other}")),
    };

    let mut problems = Vec::new();

    for spec in specs {
        match obj.get(&spec.name) {
            None | Some(Value::Null) => {
                if spec.required {
                    problems.push(format!("missing required parameter '{}'", spec.name));
                }
            }
            Some(value) => {
                if !spec.kind.matches(value) {
                    problems.push(format!(
                        "parameter '{}' has the wrong type (expected {:?})",
                        spec.name, spec.kind
                    ));
                } else if let (Some(allowed), Some(s)) = (&spec.allowed, value.as_str()) {
                    if !allowed.iter().any(|a| a == s) {
                        problems.push(format!(
                            "parameter '{}' must be one of [{}]",
                            spec.name,
                            allowed.join(", ")
                        ));
                    }
                }
            }
        }
    }

    if problems.is_empty() {
        Ok(())
    } else {
        Err(problems.join("; "))
    }
}

/// Contract every concrete agent implements.
///
/// `execute` must never fail past its own boundary: domain errors come
/// back as `AgentResponse::Failure`, and the `guarded` wrapper below
/// catches anything that still escapes.
#[async_trait]
pub trait Agent: Send + Sync {
    fn name(&self) -> &str;

    fn description(&self) -> &str;

    fn capabilities(&self) -> &[Capability];

    /// Whether this agent handles the given action name. Default is a
    /// membership test over the declared capability names.
    fn can_handle(&self, action: &str) -> bool {
        self.capabilities().iter().any(|c| c.name == action)
    }

    async fn execute(
        &self,
        ctx: &ExecutionContext,
        action: &str,
        params: &Value,
    ) -> AgentResponse;
}

/// Look up the declared parameter shape for an action and validate the
/// bag against it. Shared by all concrete agents as their first
/// dispatch step.
pub(crate) fn check_params(
    capabilities: &[Capability],
    action: &str,
    params: &Value,
) -> Result<(), AgentResponse> {
    let Some(capability) = capabilities.iter().find(|c| c.name == action) else {
        return Err(AgentResponse::failure(
            format!("unsupported action: {action}"),
            "action is not part of this agent's capabilities",
        ));
    };

    validate_args(&capability.parameters, params)
        .map_err(|e| AgentResponse::failure(e, format!("invalid parameters for {action}")))
}

/// Dispatch-boundary guard applied uniformly by the executor: a panic
/// inside an agent becomes a structured failure instead of tearing down
/// the workflow.
pub async fn guarded(
    agent: &dyn Agent,
    ctx: &ExecutionContext,
    action: &str,
    params: &Value,
) -> AgentResponse {
    let fut = AssertUnwindSafe(agent.execute(ctx, action, params));
    match fut.catch_unwind().await {
        Ok(response) => response,
        Err(panic) => {
            // deref the box so the payload itself is downcast, not the box
            let detail = panic_detail(panic.as_ref());
            tracing::error!(agent = agent.name(), action, detail, "agent panicked");
            AgentResponse::failure(
                format!("agent {} panicked handling {action}: {detail}", agent.name()),
                "internal agent fault",
            )
        }
    }
}

fn panic_detail(panic: &(dyn std::any::Any + Send)) -> &str {
    if let Some(s) = panic.downcast_ref::<&str>() {
        s
    } else if let Some(s) = panic.downcast_ref::<String>() {
        s
    } else {
        "unknown panic"
    }
}
