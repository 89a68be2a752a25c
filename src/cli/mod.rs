//! CLI interface and argument parsing
//!
//! This module handles command-line parsing, shell completion, and the
//! optional comparison with CI.

pub mod app;
pub mod ci;

// Re-export main types
pub use app::*;
