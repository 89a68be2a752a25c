//! Single-task execution
//!
//! Runs one [`TaskDefinition`] to a terminal [`TaskResult`] and decides
//! whether its outcome lets scheduling continue.

use crate::error::{ExecutionError, ExecutionResult};
use crate::runner::{
    evaluate_condition, execute_command, ConditionOutcome, Context, Invocation, Reporter,
    RunEvent, TaskDefinition, TaskResult,
};
use std::time::Instant;

/// Whether scheduling continues after a task
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Flow {
    Continue,
    Abort,
}

/// A finished task and the scheduling decision it implies
#[derive(Debug, Clone)]
pub struct TaskExecution {
    pub result: TaskResult,
    pub flow: Flow,
}

/// Critical failures abort; everything else continues
pub fn escalation(def: &TaskDefinition, result: &TaskResult) -> Flow {
    if def.critical && result.is_failed() {
        Flow::Abort
    } else {
        Flow::Continue
    }
}

/// Run one task
///
/// With `honor_conditions` false the task's condition is not evaluated at all.
pub async fn run_task(
    def: &TaskDefinition,
    ctx: &Context,
    honor_conditions: bool,
    reporter: &dyn Reporter,
) -> TaskExecution {
    if honor_conditions {
        match evaluate_condition(def.condition.as_ref(), ctx).await {
            ConditionOutcome::Run => {}
            ConditionOutcome::Skip => {
                reporter.report(&RunEvent::TaskSkipped { id: def.id.clone() });
                return TaskExecution {
                    result: TaskResult::skipped(def),
                    flow: Flow::Continue,
                };
            }
            ConditionOutcome::ProbeFailed(reason) => {
                reporter.report(&RunEvent::ProbeFailed {
                    id: def.id.clone(),
                    reason,
                });
            }
        }
    }

    reporter.report(&RunEvent::TaskStarted {
        id: def.id.clone(),
        invocation: def.invocation.describe().to_string(),
    });

    let start = Instant::now();
    let outcome = match def.timeout {
        Some(limit) => tokio::time::timeout(limit, invoke(def, ctx))
            .await
            .unwrap_or(Err(ExecutionError::Timeout(limit))),
        None => invoke(def, ctx).await,
    };
    let duration = start.elapsed();

    let result = match outcome {
        Ok(()) => TaskResult::passed(def, duration),
        Err(e) => TaskResult::failed(def, duration, e.to_string()),
    };

    reporter.report(&RunEvent::TaskFinished {
        id: result.id.clone(),
        status: result.status,
        duration: result.duration,
        error: result.error.clone(),
    });

    let flow = escalation(def, &result);
    TaskExecution { result, flow }
}

async fn invoke(def: &TaskDefinition, ctx: &Context) -> ExecutionResult<()> {
    match &def.invocation {
        Invocation::Shell(cmd) => execute_command(&def.id, cmd, ctx).await,
        Invocation::InProcess(operation) => operation(ctx.working_dir.clone())
            .await
            .map_err(ExecutionError::Operation),
    }
}
