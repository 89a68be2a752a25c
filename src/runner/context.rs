//! Execution context for a check run
//!
//! The context carries everything tasks and condition probes need from the
//! environment: where to run, which shell to use and what to diff against.

use std::env;
use std::path::PathBuf;

/// Default reference used by change-detection conditions
pub const DEFAULT_DIFF_BASE: &str = "HEAD~1";

/// Shared, read-only state for one orchestration run
#[derive(Debug, Clone)]
pub struct Context {
    /// Directory tasks and probes run in
    pub working_dir: PathBuf,

    /// Interpreter used to run shell commands (e.g., ["sh", "-c"])
    pub interpreter: Vec<String>,

    /// Git reference that change-detection conditions diff against
    pub diff_base: String,

    /// Verbosity level
    pub verbosity: Verbosity,
}

/// Verbosity levels for output
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum Verbosity {
    Silent = 0,
    Quiet = 1,
    Normal = 2,
    Verbose = 3,
}

impl Verbosity {
    /// Default tracing filter directive for this level
    pub fn filter_directive(self) -> &'static str {
        match self {
            Verbosity::Silent => "off",
            Verbosity::Quiet => "error",
            Verbosity::Normal => "info",
            Verbosity::Verbose => "debug",
        }
    }
}

impl Context {
    /// Create a new context with default settings
    pub fn new() -> Self {
        Context {
            working_dir: env::current_dir().unwrap_or_else(|_| PathBuf::from(".")),
            interpreter: vec!["sh".to_string(), "-c".to_string()],
            diff_base: DEFAULT_DIFF_BASE.to_string(),
            verbosity: Verbosity::Normal,
        }
    }

    /// Create a context with a specific working directory
    pub fn with_working_dir(mut self, dir: PathBuf) -> Self {
        self.working_dir = dir;
        self
    }

    /// Set the interpreter
    pub fn with_interpreter(mut self, interpreter: Vec<String>) -> Self {
        self.interpreter = interpreter;
        self
    }

    /// Set the change-detection base reference
    pub fn with_diff_base(mut self, diff_base: impl Into<String>) -> Self {
        self.diff_base = diff_base.into();
        self
    }

    /// Set verbosity level
    pub fn with_verbosity(mut self, verbosity: Verbosity) -> Self {
        self.verbosity = verbosity;
        self
    }

    /// Build a process that runs `script` through the configured interpreter
    pub fn shell(&self, script: &str) -> tokio::process::Command {
        let mut parts = self.interpreter.iter();
        let program = parts.next().map(String::as_str).unwrap_or("sh");
        let mut command = tokio::process::Command::new(program);
        command.args(parts);
        command.arg(script);
        command.current_dir(&self.working_dir);
        command
    }
}

impl Default for Context {
    fn default() -> Self {
        Self::new()
    }
}
