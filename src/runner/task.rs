//! Task definitions and results
//!
//! A [`TaskDefinition`] is authored once and never changes during a run. Each
//! run produces a fresh [`TaskResult`] for every task it reaches.

use futures::future::BoxFuture;
use serde::{Serialize, Serializer};
use std::fmt;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

/// In-process asynchronous operation; receives the run's working directory
pub type Operation = Arc<dyn Fn(PathBuf) -> BoxFuture<'static, Result<(), String>> + Send + Sync>;

/// In-process condition; an `Err` means the predicate itself could not be evaluated
pub type Predicate = Arc<dyn Fn() -> Result<bool, String> + Send + Sync>;

/// How a task does its work
#[derive(Clone)]
pub enum Invocation {
    /// Shell command run through the context's interpreter
    Shell(String),

    /// Async operation run inside the orchestrator
    InProcess(Operation),
}

impl Invocation {
    /// Wrap an async closure as an in-process invocation
    pub fn in_process<F, Fut>(f: F) -> Self
    where
        F: Fn(PathBuf) -> Fut + Send + Sync + 'static,
        Fut: std::future::Future<Output = Result<(), String>> + Send + 'static,
    {
        Invocation::InProcess(Arc::new(
            move |dir| -> BoxFuture<'static, Result<(), String>> { Box::pin(f(dir)) },
        ))
    }

    /// Short description used in logs
    pub fn describe(&self) -> &str {
        match self {
            Invocation::Shell(cmd) => cmd,
            Invocation::InProcess(_) => "<in-process>",
        }
    }
}

impl fmt::Debug for Invocation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Invocation::Shell(cmd) => f.debug_tuple("Shell").field(cmd).finish(),
            Invocation::InProcess(_) => f.write_str("InProcess(..)"),
        }
    }
}

/// Runtime check deciding whether a task is attempted
#[derive(Clone)]
pub enum Condition {
    /// Run only if a path matching one of the glob patterns changed since the diff base
    Changed(Vec<String>),

    /// Run only if the probe command exits successfully
    Command(String),

    /// Run only if the predicate returns true
    Predicate(Predicate),
}

impl Condition {
    /// Wrap a closure as a predicate condition
    pub fn predicate<F>(f: F) -> Self
    where
        F: Fn() -> Result<bool, String> + Send + Sync + 'static,
    {
        Condition::Predicate(Arc::new(f))
    }
}

impl fmt::Debug for Condition {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Condition::Changed(patterns) => f.debug_tuple("Changed").field(patterns).finish(),
            Condition::Command(cmd) => f.debug_tuple("Command").field(cmd).finish(),
            Condition::Predicate(_) => f.write_str("Predicate(..)"),
        }
    }
}

/// Static description of a task
#[derive(Debug, Clone)]
pub struct TaskDefinition {
    /// Unique identifier
    pub id: String,

    /// Human-readable label
    pub name: String,

    /// What the task runs
    pub invocation: Invocation,

    /// Whether a failure aborts the rest of the run
    pub critical: bool,

    /// Tasks that must be scheduled before this one
    pub dependencies: Vec<String>,

    /// Optional skip condition
    pub condition: Option<Condition>,

    /// Optional bound on invocation wall-clock time
    pub timeout: Option<Duration>,
}

impl TaskDefinition {
    /// Create a non-critical task with no dependencies, condition or timeout
    pub fn new(id: impl Into<String>, name: impl Into<String>, invocation: Invocation) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            invocation,
            critical: false,
            dependencies: Vec::new(),
            condition: None,
            timeout: None,
        }
    }

    /// Shorthand for a shell-command task
    pub fn shell(id: impl Into<String>, name: impl Into<String>, command: impl Into<String>) -> Self {
        Self::new(id, name, Invocation::Shell(command.into()))
    }

    /// Mark the task as critical
    pub fn critical(mut self) -> Self {
        self.critical = true;
        self
    }

    /// Add a dependency
    pub fn depends_on(mut self, id: impl Into<String>) -> Self {
        self.dependencies.push(id.into());
        self
    }

    /// Set the skip condition
    pub fn when(mut self, condition: Condition) -> Self {
        self.condition = Some(condition);
        self
    }

    /// Set the timeout
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = Some(timeout);
        self
    }
}

/// Terminal state of a task in a run
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum TaskStatus {
    Passed,
    Failed,
    Skipped,
}

impl TaskStatus {
    /// Short label used in summaries
    pub fn label(&self) -> &'static str {
        match self {
            TaskStatus::Passed => "passed",
            TaskStatus::Failed => "failed",
            TaskStatus::Skipped => "skipped",
        }
    }
}

impl fmt::Display for TaskStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// Outcome of one task in one run
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TaskResult {
    pub id: String,
    pub name: String,
    pub status: TaskStatus,
    #[serde(rename = "duration_ms", serialize_with = "serialize_millis")]
    pub duration: Duration,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl TaskResult {
    pub fn passed(def: &TaskDefinition, duration: Duration) -> Self {
        Self::finish(def, TaskStatus::Passed, duration, None)
    }

    pub fn failed(def: &TaskDefinition, duration: Duration, error: impl Into<String>) -> Self {
        Self::finish(def, TaskStatus::Failed, duration, Some(error.into()))
    }

    pub fn skipped(def: &TaskDefinition) -> Self {
        Self::finish(def, TaskStatus::Skipped, Duration::ZERO, None)
    }

    fn finish(
        def: &TaskDefinition,
        status: TaskStatus,
        duration: Duration,
        error: Option<String>,
    ) -> Self {
        TaskResult {
            id: def.id.clone(),
            name: def.name.clone(),
            status,
            duration,
            error,
        }
    }

    pub fn is_failed(&self) -> bool {
        self.status == TaskStatus::Failed
    }
}

pub(crate) fn serialize_millis<S: Serializer>(d: &Duration, s: S) -> Result<S::Ok, S::Error> {
    s.serialize_u64(d.as_millis() as u64)
}
