//! Shell command execution
//!
//! Commands run through the context's interpreter with output captured, so
//! that tasks in a parallel group do not interleave on the terminal. Captured
//! lines are logged at debug level and the tail of the output is folded into
//! the failure message.

use crate::error::{ExecutionError, ExecutionResult};
use crate::runner::Context;
use std::process::{Output, Stdio};

/// Lines of captured output kept in a failure message
const FAILURE_TAIL_LINES: usize = 10;

/// Kills a command's whole process group unless disarmed
///
/// The shell is started as the leader of its own group, so dropping the guard
/// also stops whatever `npm` or `python3` spawned underneath it.
struct ProcessGroupGuard {
    pgid: Option<u32>,
}

impl ProcessGroupGuard {
    fn new(pgid: Option<u32>) -> Self {
        ProcessGroupGuard { pgid }
    }

    fn disarm(&mut self) {
        self.pgid = None;
    }
}

impl Drop for ProcessGroupGuard {
    fn drop(&mut self) {
        if let Some(pgid) = self.pgid.take() {
            kill_process_group(pgid);
        }
    }
}

#[cfg(unix)]
fn kill_process_group(pgid: u32) {
    let Ok(pgid) = libc::pid_t::try_from(pgid) else {
        return;
    };
    // SAFETY: killpg only sends a signal; a stale group id yields ESRCH
    let rc = unsafe { libc::killpg(pgid, libc::SIGKILL) };
    if rc == 0 {
        tracing::debug!("Killed process group {}", pgid);
    }
}

#[cfg(not(unix))]
fn kill_process_group(_pgid: u32) {}

/// Execute a task's shell command
///
/// If the returned future is dropped before the command finishes (a timeout),
/// the command's process group is killed and the shell itself is reaped.
pub async fn execute_command(task_id: &str, script: &str, ctx: &Context) -> ExecutionResult<()> {
    let mut command = ctx.shell(script);
    command
        .stdin(Stdio::null())
        .stdout(Stdio::piped())
        .stderr(Stdio::piped())
        .kill_on_drop(true);
    #[cfg(unix)]
    command.process_group(0);

    let child = command
        .spawn()
        .map_err(|e| ExecutionError::Spawn(format!("{}: {}", script, e)))?;
    let mut group = ProcessGroupGuard::new(child.id());

    let output = child
        .wait_with_output()
        .await
        .map_err(|e| ExecutionError::Spawn(e.to_string()))?;
    group.disarm();

    log_output(task_id, &output);

    if !output.status.success() {
        return Err(ExecutionError::CommandFailed {
            code: output.status.code(),
            detail: failure_detail(&output),
        });
    }

    Ok(())
}

/// Check if a probe command succeeds (for command conditions)
pub async fn check_command(script: &str, ctx: &Context) -> ExecutionResult<bool> {
    let mut command = ctx.shell(script);
    command
        .stdin(Stdio::null())
        .stdout(Stdio::null())
        .stderr(Stdio::null())
        .kill_on_drop(true);

    let status = command
        .status()
        .await
        .map_err(|e| ExecutionError::Probe(format!("{}: {}", script, e)))?;

    Ok(status.success())
}

fn log_output(task_id: &str, output: &Output) {
    for line in String::from_utf8_lossy(&output.stdout).lines() {
        tracing::debug!("[{}] {}", task_id, line);
    }
    for line in String::from_utf8_lossy(&output.stderr).lines() {
        tracing::debug!("[{}] {}", task_id, line);
    }
}

/// Tail of stderr (or stdout when stderr is empty), prefixed for display
fn failure_detail(output: &Output) -> String {
    let stderr = String::from_utf8_lossy(&output.stderr);
    let text = if stderr.trim().is_empty() {
        String::from_utf8_lossy(&output.stdout).into_owned()
    } else {
        stderr.into_owned()
    };

    let lines: Vec<&str> = text.lines().filter(|l| !l.trim().is_empty()).collect();
    if lines.is_empty() {
        return String::new();
    }

    let start = lines.len().saturating_sub(FAILURE_TAIL_LINES);
    format!(": {}", lines[start..].join("\n"))
}
