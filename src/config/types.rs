//! Core configuration types
//!
//! This module defines the data structures that represent an orchestrator.yml file.

use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// Default command used to fetch the latest CI conclusion
pub const DEFAULT_CI_COMMAND: &str =
    "gh run list --limit 1 --json conclusion --jq '.[0].conclusion'";

/// Top-level configuration structure
#[derive(Debug, Clone, Default, PartialEq, Deserialize, Serialize)]
#[serde(rename_all = "kebab-case", deny_unknown_fields)]
pub struct Config {
    /// Interpreter used for task commands and probes (e.g., ["bash", "-c"])
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub interpreter: Option<Vec<String>>,

    /// Git reference that change detection diffs against
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub diff_base: Option<String>,

    /// CI status side channel
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub ci: Option<CiConfig>,

    /// Per-task overrides, keyed by task id
    #[serde(default, skip_serializing_if = "HashMap::is_empty")]
    pub tasks: HashMap<String, TaskOverride>,
}

/// CI comparison settings
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
#[serde(rename_all = "kebab-case", deny_unknown_fields)]
pub struct CiConfig {
    /// Command printing the latest CI conclusion (e.g. "success") on stdout
    #[serde(default = "default_ci_command")]
    pub command: String,
}

impl Default for CiConfig {
    fn default() -> Self {
        CiConfig {
            command: default_ci_command(),
        }
    }
}

fn default_ci_command() -> String {
    DEFAULT_CI_COMMAND.to_string()
}

/// Replacement values for a built-in task
#[derive(Debug, Clone, Default, PartialEq, Deserialize, Serialize)]
#[serde(rename_all = "kebab-case", deny_unknown_fields)]
pub struct TaskOverride {
    /// Shell command to run instead of the built-in invocation
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub command: Option<String>,

    /// Timeout in milliseconds
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub timeout_ms: Option<u64>,
}
