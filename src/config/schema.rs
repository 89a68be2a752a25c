//! Configuration validation
//!
//! This module checks a parsed configuration against the task registry it
//! will be applied to.

use crate::config::types::{Config, TaskOverride};
use crate::error::{ConfigError, ConfigResult};
use crate::runner::TaskRegistry;

/// Validate a complete configuration
pub fn validate_config(config: &Config, registry: &TaskRegistry) -> ConfigResult<()> {
    if let Some(interpreter) = &config.interpreter {
        match interpreter.first() {
            Some(program) if !program.trim().is_empty() => {}
            _ => {
                return Err(ConfigError::Invalid(
                    "interpreter must name a program, e.g. [sh, -c]".to_string(),
                ))
            }
        }
    }

    if let Some(diff_base) = &config.diff_base {
        if diff_base.trim().is_empty() {
            return Err(ConfigError::Invalid("diff-base must not be empty".to_string()));
        }
    }

    if let Some(ci) = &config.ci {
        if ci.command.trim().is_empty() {
            return Err(ConfigError::Invalid("ci.command must not be empty".to_string()));
        }
    }

    for (id, task_override) in &config.tasks {
        validate_override(id, task_override, registry)?;
    }

    Ok(())
}

/// Validate a single task override
pub fn validate_override(
    id: &str,
    task_override: &TaskOverride,
    registry: &TaskRegistry,
) -> ConfigResult<()> {
    if !registry.contains(id) {
        return Err(ConfigError::TaskNotFound(id.to_string()));
    }

    if let Some(command) = &task_override.command {
        if command.trim().is_empty() {
            return Err(ConfigError::Invalid(format!(
                "tasks.{}.command must not be empty",
                id
            )));
        }
    }

    if task_override.timeout_ms == Some(0) {
        return Err(ConfigError::Invalid(format!(
            "tasks.{}.timeout-ms must be greater than zero",
            id
        )));
    }

    Ok(())
}
