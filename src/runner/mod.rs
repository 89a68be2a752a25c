//! Task orchestration engine
//!
//! This module holds the task model, the condition evaluator, the single-task
//! runner and the group scheduler that drives a mode's plan.

pub mod checks;
pub mod command;
pub mod condition;
pub mod context;
pub mod events;
pub mod execute;
pub mod registry;
pub mod scheduler;
pub mod task;

// Re-export main types
pub use checks::*;
pub use command::*;
pub use condition::*;
pub use context::*;
pub use events::*;
pub use execute::*;
pub use registry::*;
pub use scheduler::*;
pub use task::*;
