//! Terminal output
//!
//! Rendering of run summaries and machine-readable run reports.

pub mod summary;

pub use summary::*;
