//! Error types for lifecycle callbacks.

use std::time::Duration;

/// Top-level error type.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error("Hook error: {0}")]
    Hook(#[from] HookError),

    #[error("Validation error: {0}")]
    Validation(#[from] ValidationError),

    #[error("Persistence error: {0}")]
    Persistence(#[from] PersistenceError),

    #[error("ORM error: {0}")]
    Orm(#[from] OrmError),
}

/// Configuration-related errors.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Invalid configuration value for {key}: {message}")]
    InvalidValue { key: String, message: String },

    #[error("Failed to parse configuration: {0}")]
    ParseError(String),
}

/// Failure reported by a lifecycle callback.
///
/// The runner hands this value back to the mutation caller exactly as the
/// failing callback produced it.
#[derive(Debug, thiserror::Error)]
pub enum HookError {
    #[error("Hook rejected: {reason}")]
    Rejected { reason: String },

    #[error("Hook execution failed: {reason}")]
    ExecutionFailed { reason: String },

    #[error("Unknown lifecycle stage: {stage}")]
    UnknownStage { stage: String },

    #[error("Hook '{hook}' timed out after {timeout:?}")]
    Timeout { hook: String, timeout: Duration },

    #[error(transparent)]
    Other(#[from] Box<dyn std::error::Error + Send + Sync>),
}

impl HookError {
    /// Shorthand for `Rejected { reason }`.
    pub fn rejected(reason: impl Into<String>) -> Self {
        HookError::Rejected {
            reason: reason.into(),
        }
    }

    /// Shorthand for `ExecutionFailed { reason }`.
    pub fn failed(reason: impl Into<String>) -> Self {
        HookError::ExecutionFailed {
            reason: reason.into(),
        }
    }
}

/// Errors raised by a model's validator.
#[derive(Debug, thiserror::Error)]
pub enum ValidationError {
    #[error("Invalid value for attribute {attribute}: {message}")]
    InvalidAttribute { attribute: String, message: String },

    #[error("Missing required attribute: {0}")]
    MissingAttribute(String),

    #[error("Validation failed: {0}")]
    Failed(String),
}

/// Errors raised by the underlying storage operation.
#[derive(Debug, thiserror::Error)]
pub enum PersistenceError {
    #[error("Query failed: {0}")]
    Query(String),

    #[error("Constraint violation: {0}")]
    Constraint(String),
}

/// Errors from the model registry.
#[derive(Debug, thiserror::Error)]
pub enum OrmError {
    #[error("Unknown model: {0}")]
    UnknownModel(String),

    #[error("Model already registered: {0}")]
    DuplicateModel(String),
}

pub type Result<T> = std::result::Result<T, Error>;
