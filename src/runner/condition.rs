//! Condition evaluation
//!
//! Decides whether a task is attempted. Probes are best-effort: when a probe
//! cannot give an answer the outcome is [`ConditionOutcome::ProbeFailed`],
//! which still runs the task.

use crate::error::{ExecutionError, ExecutionResult};
use crate::runner::{check_command, Condition, Context};
use globset::{Glob, GlobSetBuilder};
use std::process::Stdio;

/// Result of evaluating a task's condition
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConditionOutcome {
    /// Condition holds, or the task has none
    Run,

    /// Condition evaluated to false
    Skip,

    /// The probe itself errored; the task runs anyway
    ProbeFailed(String),
}

impl ConditionOutcome {
    /// Whether the task should be attempted
    pub fn should_run(&self) -> bool {
        match self {
            ConditionOutcome::Run => true,
            ConditionOutcome::Skip => false,
            ConditionOutcome::ProbeFailed(_) => true,
        }
    }
}

/// Evaluate an optional condition
pub async fn evaluate_condition(condition: Option<&Condition>, ctx: &Context) -> ConditionOutcome {
    let Some(condition) = condition else {
        return ConditionOutcome::Run;
    };

    match probe(condition, ctx).await {
        Ok(true) => ConditionOutcome::Run,
        Ok(false) => ConditionOutcome::Skip,
        Err(e) => ConditionOutcome::ProbeFailed(e.to_string()),
    }
}

async fn probe(condition: &Condition, ctx: &Context) -> ExecutionResult<bool> {
    match condition {
        Condition::Changed(patterns) => {
            let changed = changed_files(ctx).await?;
            matches_any(patterns, &changed)
        }
        Condition::Command(cmd) => check_command(cmd, ctx).await,
        Condition::Predicate(predicate) => predicate().map_err(ExecutionError::Probe),
    }
}

/// Paths with changes relative to the context's diff base
pub async fn changed_files(ctx: &Context) -> ExecutionResult<Vec<String>> {
    let output = tokio::process::Command::new("git")
        .args(["diff", "--name-only", &ctx.diff_base])
        .current_dir(&ctx.working_dir)
        .stdin(Stdio::null())
        .output()
        .await
        .map_err(|e| ExecutionError::Probe(format!("failed to run git: {}", e)))?;

    if !output.status.success() {
        return Err(ExecutionError::Probe(format!(
            "git diff against {} failed: {}",
            ctx.diff_base,
            String::from_utf8_lossy(&output.stderr).trim()
        )));
    }

    Ok(String::from_utf8_lossy(&output.stdout)
        .lines()
        .map(str::trim)
        .filter(|l| !l.is_empty())
        .map(String::from)
        .collect())
}

/// Whether any path matches any of the glob patterns
pub fn matches_any(patterns: &[String], paths: &[String]) -> ExecutionResult<bool> {
    let mut builder = GlobSetBuilder::new();
    for pattern in patterns {
        let glob = Glob::new(pattern)
            .map_err(|e| ExecutionError::Probe(format!("invalid pattern '{}': {}", pattern, e)))?;
        builder.add(glob);
    }
    let set = builder
        .build()
        .map_err(|e| ExecutionError::Probe(e.to_string()))?;

    Ok(paths.iter().any(|path| set.is_match(path)))
}
