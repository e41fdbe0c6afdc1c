use std::fs;
use std::path::{Path, PathBuf};

use assert_cmd::Command;
use serde_json::Value;
use tasklist::model::Task;
use tempfile::TempDir;

/// A throwaway data directory with the add delay disabled.
pub struct TestDir {
    dir: TempDir,
}

impl TestDir {
    pub fn init() -> std::io::Result<Self> {
        let dir = tempfile::tempdir()?;
        fs::write(
            dir.path().join("config.toml"),
            "[tasks]\nsubmit_delay_ms = 0\n",
        )?;
        Ok(Self { dir })
    }

    pub fn path(&self) -> &Path {
        self.dir.path()
    }

    pub fn write_file(&self, rel_path: &str, contents: &str) -> std::io::Result<PathBuf> {
        let path = self.dir.path().join(rel_path);
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }
        fs::write(&path, contents)?;
        Ok(path)
    }

    pub fn write_config(&self, contents: &str) -> std::io::Result<PathBuf> {
        self.write_file("config.toml", contents)
    }

    /// Tasks as persisted in the default record.
    pub fn read_tasks(&self) -> Result<Vec<Task>, Box<dyn std::error::Error>> {
        let raw = fs::read_to_string(self.dir.path().join("enhancedTodoTasks.json"))?;
        Ok(serde_json::from_str(&raw)?)
    }

    /// `tasklist --data-dir <dir>` running inside the directory.
    pub fn cmd(&self) -> Command {
        let mut cmd = tasklist_cmd();
        cmd.current_dir(self.dir.path());
        cmd.arg("--data-dir").arg(self.dir.path());
        cmd
    }

    /// Run with `--json` and return the parsed envelope; the command must succeed.
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

    /// Add a task and return its id.
    pub fn add(&self, text: &str, extra: &[&str]) -> String {
        let mut args = vec!["add", text];
        args.extend_from_slice(extra);
        let value = self.json(&args);
        value["data"]["id"].as_u64().expect("task id").to_string()
    }
}

pub fn tasklist_cmd() -> Command {
    let mut cmd = Command::cargo_bin("tasklist").expect("binary");
    cmd.env_remove("TASKLIST_DIR").env_remove("RUST_LOG");
    cmd
}
