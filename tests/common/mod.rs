//! Common test utilities

#![allow(dead_code)]

use std::fs;
use std::path::PathBuf;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;
use tempfile::TempDir;

use stackwizard_check::runner::{Invocation, TaskDefinition};

/// Create a temporary directory with an orchestrator.yml file
pub fn create_test_config(content: &str) -> (TempDir, PathBuf) {
    let temp_dir = TempDir::new().unwrap();
    let config_path = temp_dir.path().join("orchestrator.yml");
    fs::write(&config_path, content).unwrap();
    (temp_dir, config_path)
}

/// Config overriding every quick-mode task with the given commands
pub fn quick_overrides(lint: &str, format: &str, package: &str, structure: &str) -> String {
    format!(
        r#"
tasks:
  lint:
    command: "{}"
  format:
    command: "{}"
  package:
    command: "{}"
  structure:
    command: "{}"
"#,
        lint, format, package, structure
    )
}

/// Invocation counter shared with an in-process task
#[derive(Clone, Default)]
pub struct Spy(Arc<AtomicUsize>);

impl Spy {
    pub fn calls(&self) -> usize {
        self.0.load(Ordering::SeqCst)
    }
}

/// In-process task that counts its invocations and passes or fails
pub fn spy_task(id: &str, spy: &Spy, pass: bool) -> TaskDefinition {
    let counter = spy.0.clone();
    let label = id.to_string();
    TaskDefinition::new(
        id,
        format!("Spy {}", id),
        Invocation::in_process(move |_dir| {
            let counter = counter.clone();
            let label = label.clone();
            async move {
                counter.fetch_add(1, Ordering::SeqCst);
                if pass {
                    Ok(())
                } else {
                    Err(format!("{} failed", label))
                }
            }
        }),
    )
}

/// In-process task that sleeps before passing
pub fn slow_task(id: &str, delay: Duration) -> TaskDefinition {
    TaskDefinition::new(
        id,
        format!("Slow {}", id),
        Invocation::in_process(move |_dir| async move {
            tokio::time::sleep(delay).await;
            Ok(())
        }),
    )
}
