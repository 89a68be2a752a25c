//! Error types for the check orchestrator

use std::io;
use std::path::PathBuf;
use std::time::Duration;
use thiserror::Error;

/// Result type alias for orchestrator operations
pub type Result<T> = std::result::Result<T, OrchestratorError>;

/// Main error type for the orchestrator
#[derive(Error, Debug)]
pub enum OrchestratorError {
    /// Configuration-related errors
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    /// Mode argument is not one of the known modes
    #[error("Invalid mode '{0}' (valid modes: quick, smart, full)")]
    InvalidMode(String),

    /// Command-line arguments could not be parsed
    #[error("{0}")]
    Usage(String),

    /// I/O errors
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),

    /// YAML parsing errors
    #[error("YAML parsing error: {0}")]
    Yaml(#[from] serde_yaml::Error),

    /// JSON rendering errors
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

/// Configuration, registry and plan validation errors
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Failed to find config file (searched: {0})")]
    NotFound(String),

    #[error("Failed to read config file '{path}': {error}")]
    Read { path: PathBuf, error: String },

    #[error("Invalid configuration: {0}")]
    Invalid(String),

    #[error("Task '{0}' is not defined")]
    TaskNotFound(String),

    #[error("Task '{0}' is defined more than once")]
    DuplicateTask(String),

    #[error("Circular dependency detected: {0}")]
    CircularDependency(String),

    #[error("Task '{task}' is scheduled before its dependency '{dependency}'")]
    DependencyOrder { task: String, dependency: String },
}

/// Failures of a single task invocation
#[derive(Error, Debug, Clone, PartialEq)]
pub enum ExecutionError {
    #[error("Command failed with exit code {code:?}{detail}")]
    CommandFailed { code: Option<i32>, detail: String },

    #[error("Failed to start command: {0}")]
    Spawn(String),

    #[error("Timed out after {}ms", .0.as_millis())]
    Timeout(Duration),

    #[error("{0}")]
    Operation(String),

    #[error("Probe failed: {0}")]
    Probe(String),
}

impl ExecutionError {
    /// Whether this failure came from exceeding the task's time bound
    pub fn is_timeout(&self) -> bool {
        matches!(self, ExecutionError::Timeout(_))
    }
}

/// Specialized result type for configuration operations
pub type ConfigResult<T> = std::result::Result<T, ConfigError>;

/// Specialized result type for execution operations
pub type ExecutionResult<T> = std::result::Result<T, ExecutionError>;
