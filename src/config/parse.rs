//! Configuration file parsing and discovery

use crate::config::types::Config;
use crate::error::{ConfigError, ConfigResult, OrchestratorError};
use std::env;
use std::fs;
use std::path::{Path, PathBuf};

/// Default configuration file names to search for
pub const CONFIG_FILE_NAMES: &[&str] = &["orchestrator.yml", "orchestrator.yaml"];

/// Find the configuration file by searching current and parent directories
pub fn find_config_file() -> ConfigResult<PathBuf> {
    find_config_file_from(env::current_dir().map_err(|e| {
        ConfigError::Invalid(format!("Failed to get current directory: {}", e))
    })?)
}

/// Find the configuration file starting from a specific directory
pub fn find_config_file_from(start_dir: PathBuf) -> ConfigResult<PathBuf> {
    let mut current_dir = start_dir;
    let mut searched_paths = Vec::new();

    loop {
        for file_name in CONFIG_FILE_NAMES {
            let config_path = current_dir.join(file_name);
            searched_paths.push(config_path.display().to_string());

            if config_path.is_file() {
                return Ok(config_path);
            }
        }

        match current_dir.parent() {
            Some(parent) => current_dir = parent.to_path_buf(),
            None => return Err(ConfigError::NotFound(searched_paths.join(", "))),
        }
    }
}

/// Parse a configuration file from a path
pub fn parse_config_file(path: &Path) -> Result<Config, OrchestratorError> {
    let contents = fs::read_to_string(path).map_err(|e| ConfigError::Read {
        path: path.to_path_buf(),
        error: e.to_string(),
    })?;

    parse_config(&contents)
}

/// Parse configuration from a string
pub fn parse_config(yaml: &str) -> Result<Config, OrchestratorError> {
    if yaml.trim().is_empty() {
        return Ok(Config::default());
    }
    Ok(serde_yaml::from_str(yaml)?)
}

/// Load the configuration, if any
///
/// An explicit path must exist. Without one, the nearest orchestrator.yml at
/// or above `search_from` (the current directory by default) is used, and a
/// missing file means defaults.
pub fn load_config(
    explicit: Option<&Path>,
    search_from: Option<&Path>,
) -> Result<(Config, Option<PathBuf>), OrchestratorError> {
    if let Some(path) = explicit {
        let config = parse_config_file(path)?;
        return Ok((config, Some(path.to_path_buf())));
    }

    let found = match search_from {
        Some(dir) if dir.is_absolute() => find_config_file_from(dir.to_path_buf()),
        Some(dir) => find_config_file_from(env::current_dir()?.join(dir)),
        None => find_config_file(),
    };

    match found {
        Ok(path) => {
            let config = parse_config_file(&path)?;
            Ok((config, Some(path)))
        }
        Err(ConfigError::NotFound(_)) => Ok((Config::default(), None)),
        Err(e) => Err(e.into()),
    }
}
