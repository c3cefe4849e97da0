#![allow(dead_code)]

use std::fs;
use std::path::{Path, PathBuf};

use assert_cmd::Command;
use serde_json::Value;
use tempfile::TempDir;

/// A throwaway data directory
pub struct TestDir {
    dir: TempDir,
}

impl TestDir {
    /// Empty directory; the first command run against it seeds the sample tasks
    pub fn fresh() -> Self {
        let dir = tempfile::tempdir().expect("failed to create tempdir");
        Self { dir }
    }

    /// Empty directory with seeding turned off
    pub fn empty() -> Self {
        let test_dir = Self::fresh();
        test_dir
            .write_config("[seed]\nenabled = false\n")
            .expect("write config");
        test_dir
    }

    pub fn path(&self) -> &Path {
        self.dir.path()
    }

    pub fn write_config(&self, contents: &str) -> std::io::Result<PathBuf> {
        let path = self.dir.path().join("taskmaster.toml");
        fs::write(&path, contents)?;
        Ok(path)
    }

    pub fn blob_path(&self) -> PathBuf {
        self.dir.path().join("taskmaster_tasks.json")
    }

    pub fn cmd(&self) -> Command {
        let mut cmd = taskmaster_cmd();
        cmd.env("TASKMASTER_DIR", self.dir.path());
        cmd
    }

    /// Run with `--json` and return the parsed success envelope
    pub fn json(&self, args: &[&str]) -> Value {
        let output = self
            .cmd()
            .args(args)
            .arg("--json")
            .assert()
            .success()
            .get_output()
            .stdout
            .clone();
        serde_json::from_slice(&output).expect("json envelope")
    }

    /// Create a task and return its id
    pub fn new_task(&self, args: &[&str]) -> String {
        let mut full = vec!["new"];
        full.extend_from_slice(args);
        let value = self.json(&full);
        value["data"]["id"].as_str().expect("task id").to_string()
    }
}

pub fn taskmaster_cmd() -> Command {
    let mut cmd = Command::cargo_bin("taskmaster").expect("binary");
    cmd.env_remove("RUST_LOG");
    cmd
}
