use std::fs;
use std::path::{Path, PathBuf};

use assert_cmd::Command;
use serde_json::Value;
use tempfile::TempDir;

/// A temporary trk workspace with an initialized data dir.
pub struct TestWorkspace {
    dir: TempDir,
}

impl TestWorkspace {
    pub fn init() -> Self {
        let dir = tempfile::tempdir().expect("failed to create tempdir");
        let ws = Self { dir };
        ws.trk_cmd().arg("init").assert().success();
        ws
    }

    pub fn path(&self) -> &Path {
        self.dir.path()
    }

    pub fn data_dir(&self) -> PathBuf {
        self.dir.path().join(".trk")
    }

    /// A trk command rooted in this workspace, isolated from the
    /// caller's environment.
    pub fn trk_cmd(&self) -> Command {
        let mut cmd = Command::cargo_bin("trk").expect("binary");
        cmd.current_dir(self.dir.path());
        cmd.env_remove("TRK_ACTOR");
        cmd.env_remove("TRK_ROOT");
        cmd
    }

    pub fn write_config(&self, contents: &str) {
        fs::write(self.dir.path().join(".trk.toml"), contents).expect("write config");
    }

    /// Seed a leader (id 1) and persist them as the acting user.
    pub fn seed_actor(&self) {
        self.trk_cmd()
            .args(["user", "add", "Lena", "--role", "leader"])
            .assert()
            .success();
        self.trk_cmd().args(["actor", "set", "1"]).assert().success();
    }

    /// Parse a collection file straight from disk.
    pub fn read_collection(&self, name: &str) -> Vec<Value> {
        let path = self.data_dir().join(format!("{name}.json"));
        let raw = fs::read_to_string(path).expect("read collection");
        serde_json::from_str(&raw).expect("parse collection")
    }

    /// Run a trk command with --json and parse the envelope.
    pub fn trk_json(&self, args: &[&str]) -> Value {
        let output = self
            .trk_cmd()
            .arg("--json")
            .args(args)
            .assert()
            .success()
            .get_output()
            .stdout
            .clone();
        serde_json::from_slice(&output).expect("parse json envelope")
    }
}

/// A date `days` days from now, formatted YYYY-MM-DD. Keeps tests clear
/// of the end-date-not-in-the-past rule.
pub fn days_from_now(days: i64) -> String {
    (chrono::Utc::now().date_naive() + chrono::Duration::days(days))
        .format("%Y-%m-%d")
        .to_string()
}
