//! stackwizard-check - test orchestration for the StackWizard generator
//!
//! Runs the project's checks (lint, formatting, package contents, unit and
//! integration tests, Kedro validation) in dependency-ordered groups, skips
//! what recent changes make irrelevant, and reports one ready/not-ready verdict.

// Public modules
pub mod cli;
pub mod config;
pub mod error;
pub mod runner;
pub mod ui;

// Re-export commonly used types
pub use error::{OrchestratorError, Result};

/// Current version of stackwizard-check
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
