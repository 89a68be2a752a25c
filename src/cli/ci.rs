//! CI status comparison
//!
//! Best-effort side channel: fetch the latest CI conclusion and compare it with
//! the local verdict. Nothing here can fail the run.

use crate::runner::Context;
use anyhow::{bail, Context as _};
use std::process::Stdio;
use std::time::Duration;

/// Upper bound for the CI status command
const CI_PROBE_TIMEOUT: Duration = Duration::from_secs(30);

/// How the local verdict relates to the latest CI conclusion
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CiComparison {
    Agree { conclusion: String },
    Disagree { conclusion: String },
}

/// Compare a CI conclusion string with the local verdict
pub fn compare(conclusion: &str, local_ready: bool) -> CiComparison {
    let ci_ready = conclusion.eq_ignore_ascii_case("success");
    if ci_ready == local_ready {
        CiComparison::Agree {
            conclusion: conclusion.to_string(),
        }
    } else {
        CiComparison::Disagree {
            conclusion: conclusion.to_string(),
        }
    }
}

/// Run the CI status command and return the conclusion it prints
pub async fn latest_conclusion(command: &str, ctx: &Context) -> anyhow::Result<String> {
    let mut probe = ctx.shell(command);
    probe
        .stdin(Stdio::null())
        .stdout(Stdio::piped())
        .stderr(Stdio::piped())
        .kill_on_drop(true);

    let output = tokio::time::timeout(CI_PROBE_TIMEOUT, probe.output())
        .await
        .with_context(|| format!("'{}' did not finish within {}s", command, CI_PROBE_TIMEOUT.as_secs()))?
        .with_context(|| format!("failed to run '{}'", command))?;

    if !output.status.success() {
        bail!(
            "'{}' exited with {}: {}",
            command,
            output.status,
            String::from_utf8_lossy(&output.stderr).trim()
        );
    }

    let conclusion = String::from_utf8_lossy(&output.stdout).trim().to_string();
    if conclusion.is_empty() || conclusion == "null" {
        bail!("no CI conclusion available yet");
    }
    Ok(conclusion)
}

/// Fetch, compare and log; failures are downgraded to warnings
pub async fn report_ci_comparison(command: &str, ctx: &Context, local_ready: bool) -> Option<CiComparison> {
    match latest_conclusion(command, ctx).await {
        Ok(conclusion) => {
            let comparison = compare(&conclusion, local_ready);
            match &comparison {
                CiComparison::Agree { conclusion } => {
                    tracing::info!("CI status '{}' agrees with the local result", conclusion);
                }
                CiComparison::Disagree { conclusion } => {
                    tracing::warn!(
                        "CI status '{}' differs from the local result ({})",
                        conclusion,
                        if local_ready { "passed" } else { "failed" }
                    );
                }
            }
            Some(comparison)
        }
        Err(e) => {
            tracing::warn!("CI comparison unavailable: {:#}", e);
            None
        }
    }
}
