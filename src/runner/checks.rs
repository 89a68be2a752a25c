//! Built-in in-process checks

use std::path::{Path, PathBuf};

/// Files the published generator package must ship
pub const REQUIRED_PACKAGE_FILES: &[&str] = &[
    "package.json",
    "README.md",
    "LICENSE",
    "src/index.js",
    "templates/common/backend/Dockerfile",
    "templates/common/docker-compose.yml",
    "templates/frontend-mui/package.json",
    "templates/frontend-tailwind/package.json",
];

/// Verify that every required file exists under `root`
///
/// Fails with the full list of missing paths rather than the first one.
pub async fn check_template_structure(root: PathBuf) -> Result<(), String> {
    check_required_files(&root, REQUIRED_PACKAGE_FILES).await
}

pub async fn check_required_files(root: &Path, required: &[&str]) -> Result<(), String> {
    let mut missing = Vec::new();
    for rel in required {
        let present = tokio::fs::metadata(root.join(rel))
            .await
            .map(|m| m.is_file())
            .unwrap_or(false);
        if !present {
            missing.push(*rel);
        }
    }

    if missing.is_empty() {
        Ok(())
    } else {
        Err(format!("missing required files: {}", missing.join(", ")))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    fn touch(root: &Path, rel: &str) {
        let path = root.join(rel);
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).unwrap();
        }
        fs::write(path, "").unwrap();
    }

    #[tokio::test]
    async fn test_complete_structure_passes() {
        let temp_dir = TempDir::new().unwrap();
        for rel in REQUIRED_PACKAGE_FILES {
            touch(temp_dir.path(), rel);
        }

        assert!(check_template_structure(temp_dir.path().to_path_buf())
            .await
            .is_ok());
    }

    #[tokio::test]
    async fn test_missing_files_are_all_listed() {
        let temp_dir = TempDir::new().unwrap();
        touch(temp_dir.path(), "package.json");
        touch(temp_dir.path(), "src/index.js");

        let err = check_template_structure(temp_dir.path().to_path_buf())
            .await
            .unwrap_err();

        assert!(err.starts_with("missing required files: "));
        assert!(err.contains("templates/common/backend/Dockerfile"));
        assert!(err.contains("templates/frontend-tailwind/package.json"));
        assert!(!err.contains("src/index.js"));
    }

    #[tokio::test]
    async fn test_readme_and_license_required() {
        let temp_dir = TempDir::new().unwrap();
        for rel in REQUIRED_PACKAGE_FILES {
            if *rel != "README.md" && *rel != "LICENSE" {
                touch(temp_dir.path(), rel);
            }
        }

        let err = check_template_structure(temp_dir.path().to_path_buf())
            .await
            .unwrap_err();
        assert_eq!(err, "missing required files: README.md, LICENSE");
    }

    #[tokio::test]
    async fn test_directory_does_not_count_as_file() {
        let temp_dir = TempDir::new().unwrap();
        fs::create_dir_all(temp_dir.path().join("package.json")).unwrap();

        let result = check_required_files(temp_dir.path(), &["package.json"]).await;
        assert!(result.is_err());
    }
}
