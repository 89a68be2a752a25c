//! Task catalogue
//!
//! The registry is assembled once at startup (built-in catalogue plus any
//! configured overrides) and is read-only while a plan runs.

use crate::config::TaskOverride;
use crate::error::{ConfigError, ConfigResult};
use crate::runner::{check_template_structure, Condition, Invocation, TaskDefinition};
use std::collections::{HashMap, HashSet};
use std::time::Duration;

/// Lookup table of task definitions, in authoring order
#[derive(Debug, Clone)]
pub struct TaskRegistry {
    tasks: Vec<TaskDefinition>,
    index: HashMap<String, usize>,
}

impl TaskRegistry {
    /// Build a registry, rejecting duplicate ids, unknown dependencies and cycles
    pub fn new(tasks: Vec<TaskDefinition>) -> ConfigResult<Self> {
        let mut index = HashMap::new();
        for (pos, task) in tasks.iter().enumerate() {
            if index.insert(task.id.clone(), pos).is_some() {
                return Err(ConfigError::DuplicateTask(task.id.clone()));
            }
        }

        let registry = TaskRegistry { tasks, index };
        registry.validate_dependencies()?;
        Ok(registry)
    }

    /// The StackWizard check catalogue
    pub fn builtin() -> ConfigResult<Self> {
        Self::new(builtin_tasks())
    }

    /// Look up a task by id
    pub fn get(&self, id: &str) -> ConfigResult<&TaskDefinition> {
        self.index
            .get(id)
            .map(|&pos| &self.tasks[pos])
            .ok_or_else(|| ConfigError::TaskNotFound(id.to_string()))
    }

    pub fn contains(&self, id: &str) -> bool {
        self.index.contains_key(id)
    }

    pub fn len(&self) -> usize {
        self.tasks.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tasks.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &TaskDefinition> {
        self.tasks.iter()
    }

    /// Replace commands and timeouts from configuration
    ///
    /// A command override turns an in-process task into a shell task.
    pub fn apply_overrides(&mut self, overrides: &HashMap<String, TaskOverride>) -> ConfigResult<()> {
        for (id, task_override) in overrides {
            let pos = *self
                .index
                .get(id)
                .ok_or_else(|| ConfigError::TaskNotFound(id.clone()))?;
            let task = &mut self.tasks[pos];

            if let Some(command) = &task_override.command {
                task.invocation = Invocation::Shell(command.clone());
            }
            if let Some(ms) = task_override.timeout_ms {
                task.timeout = Some(Duration::from_millis(ms));
            }
        }
        Ok(())
    }

    fn validate_dependencies(&self) -> ConfigResult<()> {
        for task in &self.tasks {
            for dep in &task.dependencies {
                if !self.contains(dep) {
                    return Err(ConfigError::TaskNotFound(dep.clone()));
                }
            }
        }

        let mut visited = HashSet::new();
        for task in &self.tasks {
            let mut stack = Vec::new();
            self.check_cycle(&task.id, &mut visited, &mut stack)?;
        }
        Ok(())
    }

    fn check_cycle(
        &self,
        id: &str,
        visited: &mut HashSet<String>,
        stack: &mut Vec<String>,
    ) -> ConfigResult<()> {
        if stack.iter().any(|s| s == id) {
            stack.push(id.to_string());
            return Err(ConfigError::CircularDependency(stack.join(" -> ")));
        }
        if visited.contains(id) {
            return Ok(());
        }

        stack.push(id.to_string());
        for dep in &self.get(id)?.dependencies {
            self.check_cycle(dep, visited, stack)?;
        }
        stack.pop();
        visited.insert(id.to_string());

        Ok(())
    }
}

fn patterns(items: &[&str]) -> Vec<String> {
    items.iter().map(|s| s.to_string()).collect()
}

fn builtin_tasks() -> Vec<TaskDefinition> {
    vec![
        TaskDefinition::shell("lint", "ESLint", "npm run lint")
            .with_timeout(Duration::from_secs(120)),
        TaskDefinition::shell("format", "Prettier check", "npm run format:check")
            .with_timeout(Duration::from_secs(60)),
        TaskDefinition::shell("package", "Package contents", "npm pack --dry-run")
            .critical()
            .with_timeout(Duration::from_secs(60)),
        TaskDefinition::new(
            "structure",
            "Template structure",
            Invocation::in_process(check_template_structure),
        )
        .critical(),
        TaskDefinition::shell("unit", "Unit tests", "npm test")
            .critical()
            .depends_on("structure")
            .with_timeout(Duration::from_secs(300)),
        TaskDefinition::shell(
            "compose",
            "Compose config",
            "docker compose -f templates/common/docker-compose.yml config --quiet",
        )
        .depends_on("structure")
        .when(Condition::Changed(patterns(&[
            "templates/**",
            "**/docker-compose*.yml",
            "**/Dockerfile",
        ])))
        .with_timeout(Duration::from_secs(120)),
        TaskDefinition::shell(
            "kedro",
            "Kedro validation pipeline",
            "python3 kedro-pipeline/run_pipeline.py quick --skip-docker",
        )
        .depends_on("package")
        .when(Condition::Changed(patterns(&[
            "kedro-pipeline/**",
            "templates/**",
            "src/**",
        ])))
        .with_timeout(Duration::from_secs(900)),
        TaskDefinition::shell("integration", "Integration tests", "npm run test:integration")
            .critical()
            .depends_on("unit")
            .depends_on("compose")
            .when(Condition::Changed(patterns(&["src/**", "templates/**"])))
            .with_timeout(Duration::from_secs(900)),
        TaskDefinition::shell(
            "generated",
            "Generated project verification",
            "python3 kedro-pipeline/run_pipeline.py release",
        )
        .critical()
        .depends_on("integration")
        .with_timeout(Duration::from_secs(1800)),
    ]
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_builtin_registry_is_valid() {
        let registry = TaskRegistry::builtin().unwrap();
        assert_eq!(registry.len(), 9);
        assert!(registry.get("structure").unwrap().critical);
        assert!(!registry.get("lint").unwrap().critical);
        assert!(registry.get("compose").unwrap().condition.is_some());
    }

    #[test]
    fn test_lookup_unknown_task() {
        let registry = TaskRegistry::builtin().unwrap();
        let result = registry.get("deploy");
        assert!(matches!(result, Err(ConfigError::TaskNotFound(id)) if id == "deploy"));
    }

    #[test]
    fn test_duplicate_ids_rejected() {
        let result = TaskRegistry::new(vec![
            TaskDefinition::shell("lint", "ESLint", "npm run lint"),
            TaskDefinition::shell("lint", "ESLint again", "npm run lint"),
        ]);
        assert!(matches!(result, Err(ConfigError::DuplicateTask(_))));
    }

    #[test]
    fn test_unknown_dependency_rejected() {
        let result = TaskRegistry::new(vec![
            TaskDefinition::shell("unit", "Unit", "npm test").depends_on("build"),
        ]);
        assert!(matches!(result, Err(ConfigError::TaskNotFound(id)) if id == "build"));
    }

    #[test]
    fn test_dependency_cycle_rejected() {
        let result = TaskRegistry::new(vec![
            TaskDefinition::shell("a", "A", "true").depends_on("b"),
            TaskDefinition::shell("b", "B", "true").depends_on("c"),
            TaskDefinition::shell("c", "C", "true").depends_on("a"),
        ]);
        match result {
            Err(ConfigError::CircularDependency(path)) => assert_eq!(path, "a -> b -> c -> a"),
            other => panic!("expected cycle, got {:?}", other.map(|r| r.len())),
        }
    }

    #[test]
    fn test_apply_overrides() {
        let mut registry = TaskRegistry::builtin().unwrap();
        let mut overrides = HashMap::new();
        overrides.insert(
            "lint".to_string(),
            TaskOverride {
                command: Some("npm run lint -- --max-warnings 0".to_string()),
                timeout_ms: Some(180_000),
            },
        );
        overrides.insert(
            "structure".to_string(),
            TaskOverride {
                command: Some("true".to_string()),
                timeout_ms: None,
            },
        );

        registry.apply_overrides(&overrides).unwrap();

        let lint = registry.get("lint").unwrap();
        assert_eq!(lint.invocation.describe(), "npm run lint -- --max-warnings 0");
        assert_eq!(lint.timeout, Some(Duration::from_secs(180)));

        let structure = registry.get("structure").unwrap();
        assert!(matches!(&structure.invocation, Invocation::Shell(cmd) if cmd == "true"));
        assert!(structure.critical);
    }

    #[test]
    fn test_override_unknown_task() {
        let mut registry = TaskRegistry::builtin().unwrap();
        let mut overrides = HashMap::new();
        overrides.insert(
            "deploy".to_string(),
            TaskOverride {
                command: Some("true".to_string()),
                timeout_ms: None,
            },
        );

        let result = registry.apply_overrides(&overrides);
        assert!(matches!(result, Err(ConfigError::TaskNotFound(_))));
    }
}
