//! File system access: configuration and task files.

use std::path::{Path, PathBuf};

use anyhow::Context;
use serde::Deserialize;

use crate::core::Task;

pub mod config;

pub use config::{BridgeConfig, BridgeMode, load_config, save_config};

/// Holds the taskbridge paths derived from a base directory.
///
/// Tests root these in a temporary directory; the binary uses the working
/// directory or `--config-dir`.
///
/// # Example
///
/// ```
/// use std::path::Path;
/// use taskbridge::fs::BridgePaths;
///
/// let paths = BridgePaths::new(Path::new("/tmp/test"));
/// assert_eq!(paths.config_file(), Path::new("/tmp/test/.taskbridge/config.json"));
/// ```
#[derive(Debug, Clone)]
pub struct BridgePaths {
    base: PathBuf,
}

impl BridgePaths {
    /// Creates paths rooted at the given base directory.
    #[must_use]
    pub fn new(base: &Path) -> Self {
        Self {
            base: base.to_path_buf(),
        }
    }

    /// Creates paths rooted at the current working directory.
    ///
    /// # Errors
    ///
    /// Returns an error if the current directory cannot be determined.
    pub fn from_cwd() -> anyhow::Result<Self> {
        let base = std::env::current_dir().context("Failed to get current directory")?;
        Ok(Self { base })
    }

    #[must_use]
    pub fn base(&self) -> &Path {
        &self.base
    }

    /// Returns the `.taskbridge` directory path.
    #[must_use]
    pub fn config_dir(&self) -> PathBuf {
        self.base.join(config::CONFIG_DIR)
    }

    /// Returns the config file path (`.taskbridge/config.json`).
    #[must_use]
    pub fn config_file(&self) -> PathBuf {
        self.config_dir().join(config::CONFIG_FILE)
    }

    /// Ensures the `.taskbridge` directory exists.
    ///
    /// # Errors
    ///
    /// Returns an error if the directory cannot be created.
    pub fn ensure_config_dir(&self) -> anyhow::Result<()> {
        let dir = self.config_dir();
        if !dir.exists() {
            std::fs::create_dir_all(&dir)
                .with_context(|| format!("Failed to create directory: {}", dir.display()))?;
        }
        Ok(())
    }

    /// Loads the configuration, or defaults when no file exists.
    ///
    /// # Errors
    ///
    /// Returns an error if the file exists but cannot be read or parsed.
    pub fn load_config(&self) -> anyhow::Result<BridgeConfig> {
        load_config(&self.config_file())
    }

    /// Saves the configuration, creating `.taskbridge` if needed.
    ///
    /// # Errors
    ///
    /// Returns an error if the directory cannot be created or the file cannot be written.
    pub fn save_config(&self, config: &BridgeConfig) -> anyhow::Result<()> {
        self.ensure_config_dir()?;
        save_config(&self.config_file(), config)
    }
}

#[derive(Deserialize)]
struct TaskFile {
    tasks: Vec<Task>,
}

/// Reads a text file such as a PRD.
///
/// # Errors
///
/// Returns an error if the file cannot be read.
pub fn read_text(path: &Path) -> anyhow::Result<String> {
    std::fs::read_to_string(path).with_context(|| format!("Failed to read file: {}", path.display()))
}

/// Reads the tasks of a JSON task file shaped `{"tasks": [...]}`.
///
/// # Errors
///
/// Returns an error if the file cannot be read or is not a task file.
pub fn read_tasks(path: &Path) -> anyhow::Result<Vec<Task>> {
    let content = read_text(path)?;
    let file: TaskFile = serde_json::from_str(&content)
        .with_context(|| format!("Failed to parse task file: {}", path.display()))?;
    Ok(file.tasks)
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)]
mod tests {
    use super::*;
    use crate::core::{TaskPriority, TaskStatus};
    use tempfile::TempDir;

    #[test]
    fn paths_are_derived_from_base() {
        let paths = BridgePaths::new(Path::new("/test/base"));

        assert_eq!(paths.base(), Path::new("/test/base"));
        assert_eq!(paths.config_dir(), Path::new("/test/base/.taskbridge"));
        assert_eq!(
            paths.config_file(),
            Path::new("/test/base/.taskbridge/config.json")
        );
    }

    #[test]
    fn ensure_config_dir_creates_directory() {
        let temp = TempDir::new().unwrap();
        let paths = BridgePaths::new(temp.path());

        assert!(!paths.config_dir().exists());
        paths.ensure_config_dir().unwrap();
        assert!(paths.config_dir().exists());
    }

    #[test]
    fn load_config_without_file_is_default() {
        let temp = TempDir::new().unwrap();
        let paths = BridgePaths::new(temp.path());

        assert_eq!(paths.load_config().unwrap(), BridgeConfig::default());
        assert!(!paths.config_dir().exists());
    }

    #[test]
    fn read_tasks_applies_serde_defaults() {
        let temp = TempDir::new().unwrap();
        let path = temp.path().join("tasks.json");
        std::fs::write(
            &path,
            r#"{"tasks": [{"id": 1, "title": "Setup", "description": "Init repo",
                "subtasks": [{"id": 1, "title": "Create repo", "description": "Create the repository",
                              "details": "Initialize git and push the skeleton."}]}]}"#,
        )
        .unwrap();

        let tasks = read_tasks(&path).unwrap();
        assert_eq!(tasks.len(), 1);
        assert_eq!(tasks[0].priority, TaskPriority::Medium);
        assert_eq!(tasks[0].status, TaskStatus::Pending);
        assert_eq!(tasks[0].subtasks[0].title, "Create repo");
    }

    #[test]
    fn read_tasks_rejects_other_json() {
        let temp = TempDir::new().unwrap();
        let path = temp.path().join("tasks.json");
        std::fs::write(&path, r#"[{"id": 1}]"#).unwrap();

        let err = read_tasks(&path).unwrap_err().to_string();
        assert!(err.contains("Failed to parse task file"));
    }

    #[test]
    fn read_text_reports_missing_file() {
        let err = read_text(Path::new("/nonexistent/prd.txt")).unwrap_err();
        assert!(err.to_string().contains("/nonexistent/prd.txt"));
    }
}
