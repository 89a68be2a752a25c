//! Progress events emitted while a plan runs

use crate::runner::{GroupKind, TaskStatus};
use std::sync::Mutex;
use std::time::Duration;

/// Events emitted by the task runner and group scheduler
#[derive(Debug, Clone, PartialEq)]
pub enum RunEvent {
    /// A group is about to start
    GroupStarted {
        index: usize,
        kind: GroupKind,
        task_count: usize,
    },
    /// A task's invocation is starting
    TaskStarted { id: String, invocation: String },
    /// A task's condition was false
    TaskSkipped { id: String },
    /// A condition probe errored and the task runs regardless
    ProbeFailed { id: String, reason: String },
    /// A task reached passed or failed
    TaskFinished {
        id: String,
        status: TaskStatus,
        duration: Duration,
        error: Option<String>,
    },
    /// A critical failure stopped scheduling
    RunAborted { id: String },
}

/// Receives progress events
pub trait Reporter: Send + Sync {
    /// Handle an event
    fn report(&self, event: &RunEvent);
}

/// Reporter that logs to tracing
#[derive(Debug, Default)]
pub struct TracingReporter;

impl Reporter for TracingReporter {
    fn report(&self, event: &RunEvent) {
        match event {
            RunEvent::GroupStarted {
                index,
                kind,
                task_count,
            } => {
                tracing::info!("Starting {} group {} ({} tasks)", kind, index + 1, task_count);
            }
            RunEvent::TaskStarted { id, invocation } => {
                tracing::info!("Running {}: {}", id, invocation);
            }
            RunEvent::TaskSkipped { id } => {
                tracing::info!("{} skipped: condition not met", id);
            }
            RunEvent::ProbeFailed { id, reason } => {
                tracing::warn!("{} condition could not be evaluated, running anyway: {}", id, reason);
            }
            RunEvent::TaskFinished {
                id,
                status,
                duration,
                error,
            } => match error {
                Some(error) => {
                    tracing::error!("{} {} after {:.1}s: {}", id, status, duration.as_secs_f64(), error);
                }
                None => {
                    tracing::info!("{} {} in {:.1}s", id, status, duration.as_secs_f64());
                }
            },
            RunEvent::RunAborted { id } => {
                tracing::error!("Critical task {} failed, aborting remaining tasks", id);
            }
        }
    }
}

/// Reporter that collects events for later inspection
#[derive(Debug, Default)]
pub struct CollectingReporter {
    events: Mutex<Vec<RunEvent>>,
}

impl CollectingReporter {
    /// Get all collected events
    pub fn events(&self) -> Vec<RunEvent> {
        self.events
            .lock()
            .map(|events| events.clone())
            .unwrap_or_default()
    }
}

impl Reporter for CollectingReporter {
    fn report(&self, event: &RunEvent) {
        if let Ok(mut events) = self.events.lock() {
            events.push(event.clone());
        }
    }
}
