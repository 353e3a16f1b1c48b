/// Error Types
///
/// Errors raised while coercing tool arguments, reading configuration, or
/// running a transport. Tool operations themselves never fail; every
/// `ToolError` comes from argument extraction before the operation runs.

use thiserror::Error;

/// Argument coercion failure reported back to the caller as a tool error.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ToolError {
    #[error("Missing required parameter: {name}")]
    MissingArgument { name: String },

    #[error("Invalid parameter '{name}': expected {expected}")]
    InvalidArgument { name: String, expected: String },
}

/// Configuration error raised while reading environment variables.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ConfigError {
    #[error("Invalid transport mode '{0}'. Must be 'stdio', 'http', or 'both'")]
    InvalidTransport(String),

    #[error("Invalid port '{0}'")]
    InvalidPort(String),

    #[error("Invalid worker thread count '{0}'")]
    InvalidWorkers(String),
}

/// Top-level error returned from `main`.
#[derive(Debug, Error)]
pub enum ServerError {
    #[error(transparent)]
    Config(#[from] ConfigError),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}
