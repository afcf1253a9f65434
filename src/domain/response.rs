//! Uniform response shapes for agents and workflows

use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Outcome of a single agent action.
///
/// A tagged result rather than a bag of optional fields: the success
/// variant always carries data, the failure variant always carries an
/// error string. The serde representation keeps the flat
/// `{success, data, error, message}` wire shape the dashboard expects.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(from = "ResponseRepr", into = "ResponseRepr")]
pub enum AgentResponse {
    Success { data: Value, message: String },
    Failure { error: String, message: String },
}

impl AgentResponse {
    pub fn success(data: Value, message: impl Into<String>) -> Self {
        Self::Success {
            data,
            message: message.into(),
        }
    }

    pub fn failure(error: impl Into<String>, message: impl Into<String>) -> Self {
        Self::Failure {
            error: error.into(),
            message: message.into(),
        }
    }

    pub fn is_success(&self) -> bool {
        matches!(self, Self::Success { .. })
    }

    pub fn data(&self) -> Option<&Value> {
        match self {
            Self::Success { data, .. } => Some(data),
            Self::Failure { .. } => None,
        }
    }

    pub fn error(&self) -> Option<&str> {
        match self {
            Self::Success { .. } => None,
            Self::Failure { error, .. } => Some(error),
        }
    }

    pub fn message(&self) -> &str {
        match self {
            Self::Success { message, .. } | Self::Failure { message, .. } => message,
        }
    }
}

/// Flat wire form of `AgentResponse`
#[derive(Debug, Clone, Serialize, Deserialize)]
struct ResponseRepr {
    success: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    data: Option<Value>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    error: Option<String>,
    #[serde(default)]
    message: String,
}

impl From<ResponseRepr> for AgentResponse {
    fn from(repr: ResponseRepr) -> Self {
        if repr.success {
            AgentResponse::Success {
                data: repr.data.unwrap_or(Value::Null),
                message: repr.message,
            }
        } else {
            AgentResponse::Failure {
                error: repr.error.unwrap_or_else(|| "unknown error".to_string()),
                message: repr.message,
            }
        }
    }
}

impl From<AgentResponse> for ResponseRepr {
    fn from(response: AgentResponse) -> Self {
        match response {
            AgentResponse::Success { data, message } => ResponseRepr {
                success: true,
                data: Some(data),
                error: None,
                message,
            },
            AgentResponse::Failure { error, message } => ResponseRepr {
                success: false,
                data: None,
                error: Some(error),
                message,
            },
        }
    }
}

/// Aggregate outcome of a workflow or plan execution.
///
/// Invariant: `success` is true iff `errors` is empty, regardless of how
/// many steps produced results.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WorkflowResult {
    pub success: bool,
    pub results: Vec<AgentResponse>,
    pub errors: Vec<String>,
    pub message: String,
}

impl WorkflowResult {
    /// Build the aggregate from collected step outcomes, enforcing the
    /// success-iff-no-errors invariant and the counts message.
    pub fn from_outcomes(results: Vec<AgentResponse>, errors: Vec<String>) -> Self {
        let message = format!(
            "{} steps succeeded, {} failed",
            results.len(),
            errors.len()
        );
        Self {
            success: errors.is_empty(),
            results,
            errors,
            message,
        }
    }

    /// A workflow aborted before any step ran (pre-flight validation).
    pub fn aborted(error: impl Into<String>) -> Self {
        Self {
            success: false,
            results: Vec::new(),
            errors: vec![error.into()],
            message: "workflow aborted before execution".to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn wire_shape_round_trip() {
        let ok = AgentResponse::success(json!({"timeframe": "5m"}), "Timeframe changed");
        let wire = serde_json::to_value(&ok).unwrap();
        assert_eq!(wire["success"], json!(true));
        assert_eq!(wire["data"]["timeframe"], json!("5m"));
        assert!(wire.get("error").is_none());

        let back: AgentResponse = serde_json::from_value(wire).unwrap();
        assert_eq!(back, ok);
    }

    #[test]
    fn failure_wire_shape() {
        let err = AgentResponse::failure("bad timeframe", "could not change timeframe");
        let wire = serde_json::to_value(&err).unwrap();
        assert_eq!(wire["success"], json!(false));
        assert_eq!(wire["error"], json!("bad timeframe"));
        assert!(wire.get("data").is_none());
    }

    #[test]
    fn workflow_result_invariant() {
        let ok = WorkflowResult::from_outcomes(vec![], vec![]);
        assert!(ok.success);
        assert_eq!(ok.message, "0 steps succeeded, 0 failed");

        let failed = WorkflowResult::from_outcomes(
            vec![AgentResponse::success(Value::Null, "ok")],
            vec!["Step 2: boom".to_string()],
        );
        assert!(!failed.success);
        assert_eq!(failed.message, "1 steps succeeded, 1 failed");
    }
}
