//! Group scheduling
//!
//! A [`Plan`] is an ordered list of groups; each group runs its tasks either
//! concurrently or one after another. Results are accumulated in order and
//! returned once every group has run or a critical failure stops the run.

use crate::error::{ConfigError, ConfigResult, OrchestratorError};
use crate::runner::{run_task, Context, Flow, Reporter, RunEvent, TaskRegistry, TaskResult};
use futures::future::join_all;
use std::collections::HashMap;
use std::fmt;
use std::str::FromStr;

/// Named execution mode
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Mode {
    /// Lint, format and packaging checks
    Quick,
    /// Quick, plus unit tests and change-gated build and integration groups
    Smart,
    /// Every group, conditions ignored
    Full,
}

impl Mode {
    pub const ALL: [Mode; 3] = [Mode::Quick, Mode::Smart, Mode::Full];

    pub fn as_str(&self) -> &'static str {
        match self {
            Mode::Quick => "quick",
            Mode::Smart => "smart",
            Mode::Full => "full",
        }
    }
}

impl Default for Mode {
    fn default() -> Self {
        Mode::Smart
    }
}

impl fmt::Display for Mode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Mode {
    type Err = OrchestratorError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Mode::ALL
            .into_iter()
            .find(|mode| mode.as_str() == s)
            .ok_or_else(|| OrchestratorError::InvalidMode(s.to_string()))
    }
}

/// How the tasks of a group are run
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GroupKind {
    Parallel,
    Sequential,
}

impl fmt::Display for GroupKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            GroupKind::Parallel => f.write_str("parallel"),
            GroupKind::Sequential => f.write_str("sequential"),
        }
    }
}

/// Task ids run under one concurrency policy
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Group {
    pub kind: GroupKind,
    pub tasks: Vec<String>,
}

impl Group {
    pub fn parallel(tasks: &[&str]) -> Self {
        Self::new(GroupKind::Parallel, tasks)
    }

    pub fn sequential(tasks: &[&str]) -> Self {
        Self::new(GroupKind::Sequential, tasks)
    }

    fn new(kind: GroupKind, tasks: &[&str]) -> Self {
        Group {
            kind,
            tasks: tasks.iter().map(|s| s.to_string()).collect(),
        }
    }
}

/// Ordered groups plus whether task conditions are evaluated
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Plan {
    pub groups: Vec<Group>,
    pub honor_conditions: bool,
}

impl Plan {
    pub fn new(groups: Vec<Group>) -> Self {
        Plan {
            groups,
            honor_conditions: true,
        }
    }

    /// Bypass every task condition
    pub fn ignoring_conditions(mut self) -> Self {
        self.honor_conditions = false;
        self
    }

    /// The fixed plan for a mode
    pub fn for_mode(mode: Mode) -> Self {
        let quick = vec![
            Group::parallel(&["lint", "format"]),
            Group::sequential(&["package", "structure"]),
        ];
        let mut smart = quick.clone();
        smart.extend([
            Group::sequential(&["unit"]),
            Group::parallel(&["compose", "kedro"]),
            Group::sequential(&["integration"]),
        ]);

        match mode {
            Mode::Quick => Plan::new(quick),
            Mode::Smart => Plan::new(smart),
            Mode::Full => {
                let mut full = smart;
                full.push(Group::sequential(&["generated"]));
                Plan::new(full).ignoring_conditions()
            }
        }
    }

    /// Check every id exists and every scheduled dependency runs first
    ///
    /// A dependency precedes a task if it sits in an earlier group, or earlier
    /// in the same sequential group. Dependencies absent from the plan are
    /// allowed.
    pub fn validate(&self, registry: &TaskRegistry) -> ConfigResult<()> {
        let mut position: HashMap<&str, (usize, usize)> = HashMap::new();
        for (g, group) in self.groups.iter().enumerate() {
            for (t, id) in group.tasks.iter().enumerate() {
                registry.get(id)?;
                if position.insert(id.as_str(), (g, t)).is_some() {
                    return Err(ConfigError::DuplicateTask(id.clone()));
                }
            }
        }

        for (g, group) in self.groups.iter().enumerate() {
            for (t, id) in group.tasks.iter().enumerate() {
                for dep in &registry.get(id)?.dependencies {
                    let Some(&(dep_g, dep_t)) = position.get(dep.as_str()) else {
                        continue;
                    };
                    let precedes = dep_g < g
                        || (dep_g == g && group.kind == GroupKind::Sequential && dep_t < t);
                    if !precedes {
                        return Err(ConfigError::DependencyOrder {
                            task: id.clone(),
                            dependency: dep.clone(),
                        });
                    }
                }
            }
        }

        Ok(())
    }
}

/// Everything a run produced
#[derive(Debug, Clone, PartialEq)]
pub struct RunOutcome {
    /// Results of every task reached, in plan order
    pub results: Vec<TaskResult>,

    /// Critical task whose failure stopped the run
    pub aborted_by: Option<String>,
}

/// Validate and run a plan
pub async fn run_plan(
    plan: &Plan,
    registry: &TaskRegistry,
    ctx: &Context,
    reporter: &dyn Reporter,
) -> ConfigResult<RunOutcome> {
    plan.validate(registry)?;

    let mut results = Vec::new();
    for (index, group) in plan.groups.iter().enumerate() {
        reporter.report(&RunEvent::GroupStarted {
            index,
            kind: group.kind,
            task_count: group.tasks.len(),
        });

        let (accumulated, aborted_by) =
            run_group(group, registry, ctx, plan.honor_conditions, reporter, results).await?;
        results = accumulated;

        if let Some(id) = aborted_by {
            reporter.report(&RunEvent::RunAborted { id: id.clone() });
            return Ok(RunOutcome {
                results,
                aborted_by: Some(id),
            });
        }
    }

    Ok(RunOutcome {
        results,
        aborted_by: None,
    })
}

/// Run one group, appending to `results`; returns the aborting task id if any
async fn run_group(
    group: &Group,
    registry: &TaskRegistry,
    ctx: &Context,
    honor_conditions: bool,
    reporter: &dyn Reporter,
    mut results: Vec<TaskResult>,
) -> ConfigResult<(Vec<TaskResult>, Option<String>)> {
    let defs = group
        .tasks
        .iter()
        .map(|id| registry.get(id))
        .collect::<ConfigResult<Vec<_>>>()?;

    match group.kind {
        GroupKind::Parallel => {
            let executions =
                join_all(defs.iter().map(|def| run_task(def, ctx, honor_conditions, reporter))).await;

            let mut aborted_by = None;
            for exec in executions {
                if exec.flow == Flow::Abort && aborted_by.is_none() {
                    aborted_by = Some(exec.result.id.clone());
                }
                results.push(exec.result);
            }
            Ok((results, aborted_by))
        }
        GroupKind::Sequential => {
            for def in defs {
                let exec = run_task(def, ctx, honor_conditions, reporter).await;
                let abort = exec.flow == Flow::Abort;
                results.push(exec.result);
                if abort {
                    return Ok((results, Some(def.id.clone())));
                }
            }
            Ok((results, None))
        }
    }
}
