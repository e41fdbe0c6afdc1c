mod support;

use std::fs;

use support::TestDir;
use tasklist::config::{Config, CONFIG_FILE};

#[test]
fn load_from_dir_defaults_on_invalid_config() {
    let dir = tempfile::tempdir().expect("tempdir");
    fs::write(dir.path().join(CONFIG_FILE), "storage = 123").expect("write invalid config");

    let cfg = Config::load_from_dir(dir.path());
    assert_eq!(cfg.storage.tasks_key, "enhancedTodoTasks");
    assert_eq!(cfg.tasks.submit_delay_ms, 300);
}

#[test]
fn load_from_dir_defaults_on_unsafe_key() {
    let dir = tempfile::tempdir().expect("tempdir");
    let content = r#"
[storage]
tasks_key = "tasks/../../etc"
"#;
    fs::write(dir.path().join(CONFIG_FILE), content.trim()).expect("write config");

    let cfg = Config::load_from_dir(dir.path());
    assert_eq!(cfg.storage.tasks_key, "enhancedTodoTasks");
}

#[test]
fn cli_uses_configured_tasks_key() -> Result<(), Box<dyn std::error::Error>> {
    let dir = TestDir::init()?;
    dir.write_config("[storage]\ntasks_key = \"work_tasks\"\n\n[tasks]\nsubmit_delay_ms = 0\n")?;
    dir.add("Ship release", &[]);

    assert!(dir.path().join("work_tasks.json").exists());
    assert!(!dir.path().join("enhancedTodoTasks.json").exists());
    Ok(())
}
