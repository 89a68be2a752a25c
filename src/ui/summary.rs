//! Run summaries and reports

use crate::runner::task::serialize_millis;
use crate::runner::{Mode, RunOutcome, TaskResult, TaskStatus};
use chrono::{DateTime, Utc};
use colored::Colorize;
use serde::Serialize;
use std::fmt::Write;
use std::time::Duration;

/// Counts and verdict derived from a run's results
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct RunSummary {
    pub passed: usize,
    pub failed: usize,
    pub skipped: usize,
    #[serde(rename = "total_duration_ms", serialize_with = "serialize_millis")]
    pub total_duration: Duration,
    /// True iff no task failed
    pub ready: bool,
}

impl RunSummary {
    pub fn from_results(results: &[TaskResult]) -> Self {
        let count = |status| results.iter().filter(|r| r.status == status).count();
        let failed = count(TaskStatus::Failed);

        RunSummary {
            passed: count(TaskStatus::Passed),
            failed,
            skipped: count(TaskStatus::Skipped),
            total_duration: results.iter().map(|r| r.duration).sum(),
            ready: failed == 0,
        }
    }

    /// Number of results summarised
    pub fn total(&self) -> usize {
        self.passed + self.failed + self.skipped
    }
}

/// Serialisable record of one run
#[derive(Debug, Clone, Serialize)]
pub struct RunReport {
    pub mode: String,
    pub timestamp: DateTime<Utc>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub aborted_by: Option<String>,
    pub summary: RunSummary,
    pub results: Vec<TaskResult>,
}

impl RunReport {
    pub fn new(mode: Mode, outcome: RunOutcome) -> Self {
        RunReport {
            mode: mode.to_string(),
            timestamp: Utc::now(),
            summary: RunSummary::from_results(&outcome.results),
            aborted_by: outcome.aborted_by,
            results: outcome.results,
        }
    }

    pub fn to_json(&self) -> serde_json::Result<String> {
        serde_json::to_string_pretty(self)
    }
}

fn format_duration(d: Duration) -> String {
    if d < Duration::from_secs(1) {
        format!("{}ms", d.as_millis())
    } else {
        format!("{:.1}s", d.as_secs_f64())
    }
}

/// Human-readable summary of a report
pub fn render_summary(report: &RunReport) -> String {
    let mut out = String::new();
    let _ = writeln!(out, "\n{} ({} mode)", "Check results".bold(), report.mode);

    for result in &report.results {
        let (icon, label) = match result.status {
            TaskStatus::Passed => ("✓".green(), format_duration(result.duration)),
            TaskStatus::Failed => ("✗".red(), format_duration(result.duration)),
            TaskStatus::Skipped => ("○".yellow(), "skipped".to_string()),
        };
        let _ = writeln!(out, "  {} {} ({})", icon, result.name, label.dimmed());

        if let Some(error) = &result.error {
            for line in error.lines() {
                let _ = writeln!(out, "      {}", line.red());
            }
        }
    }

    if let Some(id) = &report.aborted_by {
        let _ = writeln!(
            out,
            "\n{} critical task '{}' failed, remaining tasks were not run",
            "Aborted:".red().bold(),
            id
        );
    }

    let summary = &report.summary;
    let _ = writeln!(
        out,
        "\n{} passed, {} failed, {} skipped in {}",
        summary.passed,
        summary.failed,
        summary.skipped,
        format_duration(summary.total_duration)
    );

    if summary.ready {
        let _ = writeln!(out, "{}", "✓ All checks passed, ready to proceed".green().bold());
    } else {
        let _ = writeln!(
            out,
            "{}",
            format!("✗ Not ready: {} task(s) failed", summary.failed)
                .red()
                .bold()
        );
    }

    out
}
