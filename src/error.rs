//! Engine error types
//!
//! Runtime failures travel through the uniform agent response shape;
//! these errors cover what happens before the engine is running at all.

use thiserror::Error;

use crate::config::validator::ValidationError;

#[derive(Debug, Error)]
pub enum EngineError {
    #[error("Configuration error: {0}")]
    Config(#[from] config::ConfigError),

    #[error("Configuration validation failed:\n{}", join_errors(.0))]
    Validation(Vec<ValidationError>),
}

fn join_errors(errors: &[ValidationError]) -> String {
    errors
        .iter()
        .map(|e| e.to_string())
        .collect::<Vec<_>>()
        .join("\n")
}

pub type EngineResult<T> = Result<T, EngineError>;
