/*!
 * Error Types
 * Top-level error handling with thiserror and miette
 */

use miette::Diagnostic;
use serde::{Deserialize, Serialize};
use thiserror::Error;

pub use crate::signals::types::SignalError;

/// Configuration errors raised while reading the environment
#[derive(Error, Debug, Clone, Serialize, Deserialize, PartialEq, Eq, Diagnostic)]
#[serde(tag = "error_type", content = "details", rename_all = "snake_case")]
pub enum ConfigError {
    #[error("Invalid value for {key}: {value}")]
    #[diagnostic(
        code(config::invalid_value),
        help("Check the environment variable; see ProcSignalConfig for accepted values.")
    )]
    InvalidValue { key: String, value: String },

    #[error("Signal {0} cannot carry process signals")]
    #[diagnostic(
        code(config::unusable_signal),
        help("SIGKILL and SIGSTOP cannot be caught. Use SIGUSR1 or SIGUSR2.")
    )]
    UnusableSignal(String),
}

/// Unified error type for the demo entry point
#[derive(Error, Debug, Diagnostic)]
pub enum EngineError {
    #[error("Signal error: {0}")]
    #[diagnostic(transparent)]
    Signal(#[from] SignalError),

    #[error("Configuration error: {0}")]
    #[diagnostic(transparent)]
    Config(#[from] ConfigError),

    #[error("Serialization error: {0}")]
    #[diagnostic(
        code(engine::serialization),
        help("Statistics could not be rendered as JSON.")
    )]
    Serialization(String),
}

impl From<serde_json::Error> for EngineError {
    fn from(err: serde_json::Error) -> Self {
        EngineError::Serialization(err.to_string())
    }
}

/// Result type for the demo entry point
pub type EngineResult<T> = Result<T, EngineError>;
