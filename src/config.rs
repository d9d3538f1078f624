//! Configuration loading and management
//!
//! Handles parsing of `.trk.toml` configuration files.

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

use crate::model::{Priority, TaskStatus};

/// Main configuration structure
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    /// Directory holding the JSON collections, relative to the workspace
    #[serde(default = "default_data_dir")]
    pub data_dir: PathBuf,

    /// Task defaults
    #[serde(default)]
    pub tasks: TasksConfig,

    /// Notification behavior
    #[serde(default)]
    pub notifications: NotificationsConfig,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            data_dir: default_data_dir(),
            tasks: TasksConfig::default(),
            notifications: NotificationsConfig::default(),
        }
    }
}

fn default_data_dir() -> PathBuf {
    PathBuf::from(".trk")
}

/// Default values for new tasks
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TasksConfig {
    /// Status for new tasks when none is given
    #[serde(default = "default_task_status")]
    pub default_status: String,

    /// Priority for new tasks when none is given
    #[serde(default = "default_task_priority")]
    pub default_priority: String,
}

fn default_task_status() -> String {
    "to-do".to_string()
}

fn default_task_priority() -> String {
    "medium".to_string()
}

impl Default for TasksConfig {
    fn default() -> Self {
        Self {
            default_status: default_task_status(),
            default_priority: default_task_priority(),
        }
    }
}

impl TasksConfig {
    pub fn default_status(&self) -> crate::error::Result<TaskStatus> {
        self.default_status.parse().map_err(|_| {
            crate::error::Error::InvalidConfig(format!(
                "tasks.default_status: invalid status '{}' (expected to-do|in-progress|completed)",
                self.default_status
            ))
        })
    }

    pub fn default_priority(&self) -> crate::error::Result<Priority> {
        self.default_priority.parse().map_err(|_| {
            crate::error::Error::InvalidConfig(format!(
                "tasks.default_priority: invalid priority '{}' (expected low|medium|high)",
                self.default_priority
            ))
        })
    }
}

/// Notification behavior
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NotificationsConfig {
    /// Fan out a notification on task and project writes
    #[serde(default = "default_true")]
    pub on_write: bool,
}

fn default_true() -> bool {
    true
}

impl Default for NotificationsConfig {
    fn default() -> Self {
        Self { on_write: true }
    }
}

impl Config {
    /// Load configuration from a `.trk.toml` file
    pub fn load(path: &Path) -> crate::error::Result<Self> {
        let content = std::fs::read_to_string(path)?;
        let config: Config = toml::from_str(&content)?;
        config.validate()?;
        Ok(config)
    }

    /// Load configuration from a workspace root.
    ///
    /// A missing `.trk.toml` yields the defaults; a file that exists but
    /// does not parse or validate is an error.
    pub fn load_from_workspace(root: &Path) -> crate::error::Result<Self> {
        let config_path = root.join(".trk.toml");
        if config_path.exists() {
            Self::load(&config_path)
        } else {
            Ok(Self::default())
        }
    }

    /// Save configuration to a file
    pub fn save(&self, path: &Path) -> crate::error::Result<()> {
        let content = toml::to_string_pretty(self)?;
        std::fs::write(path, content)?;
        Ok(())
    }

    fn validate(&self) -> crate::error::Result<()> {
        if self.data_dir.as_os_str().is_empty() {
            return Err(crate::error::Error::InvalidConfig(
                "data_dir cannot be empty".to_string(),
            ));
        }
        self.tasks.default_status()?;
        self.tasks.default_priority()?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;

    #[test]
    fn defaults_are_expected() {
        let cfg = Config::default();
        assert_eq!(cfg.data_dir, PathBuf::from(".trk"));
        assert_eq!(cfg.tasks.default_status, "to-do");
        assert_eq!(cfg.tasks.default_priority, "medium");
        assert!(cfg.notifications.on_write);
        assert_eq!(cfg.tasks.default_status().unwrap(), TaskStatus::ToDo);
        assert_eq!(cfg.tasks.default_priority().unwrap(), Priority::Medium);
    }

    #[test]
    fn load_parses_overrides() {
        let dir = tempfile::tempdir().expect("tempdir");
        let path = dir.path().join(".trk.toml");
        let content = r#"
data_dir = "state"

[tasks]
default_status = "in-progress"
default_priority = "high"

[notifications]
on_write = false
"#;
        fs::write(&path, content.trim()).expect("write config");

        let cfg = Config::load(&path).expect("load config");
        assert_eq!(cfg.data_dir, PathBuf::from("state"));
        assert_eq!(cfg.tasks.default_status().unwrap(), TaskStatus::InProgress);
        assert_eq!(cfg.tasks.default_priority().unwrap(), Priority::High);
        assert!(!cfg.notifications.on_write);
    }

    #[test]
    fn invalid_status_rejected() {
        let dir = tempfile::tempdir().expect("tempdir");
        let path = dir.path().join(".trk.toml");
        fs::write(&path, "[tasks]\ndefault_status = \"done\"").expect("write config");

        let err = Config::load(&path).expect_err("invalid config");
        match err {
            crate::error::Error::InvalidConfig(_) => {}
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[test]
    fn load_from_workspace_defaults_when_missing() {
        let dir = tempfile::tempdir().expect("tempdir");
        let cfg = Config::load_from_workspace(dir.path()).expect("defaults");
        assert_eq!(cfg.data_dir, PathBuf::from(".trk"));
    }

    #[test]
    fn load_from_workspace_rejects_malformed_file() {
        let dir = tempfile::tempdir().expect("tempdir");
        fs::write(dir.path().join(".trk.toml"), "data_dir = [broken").expect("write config");

        let err = Config::load_from_workspace(dir.path()).expect_err("malformed config");
        match err {
            crate::error::Error::TomlParse(_) => {}
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[test]
    fn load_from_workspace_rejects_invalid_values() {
        let dir = tempfile::tempdir().expect("tempdir");
        fs::write(
            dir.path().join(".trk.toml"),
            "[tasks]\ndefault_priority = \"urgent\"",
        )
        .expect("write config");

        let err = Config::load_from_workspace(dir.path()).expect_err("invalid config");
        match err {
            crate::error::Error::InvalidConfig(message) => {
                assert!(message.contains("default_priority"));
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[test]
    fn save_writes_toml() {
        let dir = tempfile::tempdir().expect("tempdir");
        let path = dir.path().join("out.toml");
        Config::default().save(&path).expect("save config");

        let written = fs::read_to_string(&path).expect("read config");
        assert!(written.contains("data_dir = \".trk\""));
    }
}
