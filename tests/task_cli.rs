mod support;

use predicates::str::contains;
use serde_json::Value;

use support::TestDir;
use tasklist::error::exit_codes;

fn error_envelope(dir: &TestDir, args: &[&str], code: i32) -> Value {
    let output = dir
        .cmd()
        .args(args)
        .arg("--json")
        .assert()
        .code(code)
        .get_output()
        .stdout
        .clone();
    serde_json::from_slice(&output).expect("error json")
}

fn listed_ids(value: &Value) -> Vec<String> {
    value["data"]["tasks"]
        .as_array()
        .expect("tasks array")
        .iter()
        .map(|task| task["id"].as_u64().expect("id").to_string())
        .collect()
}

#[test]
fn add_persists_task_with_defaults() -> Result<(), Box<dyn std::error::Error>> {
    let dir = TestDir::init()?;
    let value = dir.json(&["add", "  Buy groceries  ", "--category", "shopping"]);

    let data = &value["data"];
    assert_eq!(data["text"], "Buy groceries");
    assert_eq!(data["priority"], "medium");
    assert_eq!(data["category"], "Shopping");
    assert_eq!(data["completed"], false);
    assert_eq!(data["order"], 0);
    assert_eq!(data["categoryIcon"], "🛒");
    assert!(data.get("completedAt").is_none());

    let tasks = dir.read_tasks()?;
    assert_eq!(tasks.len(), 1);
    assert_eq!(tasks[0].text, "Buy groceries");
    Ok(())
}

#[test]
fn add_uses_configured_default_priority() -> Result<(), Box<dyn std::error::Error>> {
    let dir = TestDir::init()?;
    dir.write_config("[tasks]\nsubmit_delay_ms = 0\ndefault_priority = \"high\"\n")?;
    let value = dir.json(&["add", "Urgent thing"]);
    assert_eq!(value["data"]["priority"], "high");
    Ok(())
}

#[test]
fn add_rejects_invalid_text() -> Result<(), Box<dyn std::error::Error>> {
    let dir = TestDir::init()?;
    let cases = [
        ("   ", "Please enter a task description"),
        ("ab", "Task must be at least 3 characters long"),
        ("12345", "Task cannot contain only numbers"),
    ];

    for (text, message) in cases {
        let value = error_envelope(&dir, &["add", text], exit_codes::USER_ERROR);
        assert_eq!(value["status"], "error");
        assert_eq!(value["error"]["message"], message);
        assert_eq!(value["error"]["kind"], "user_error");
    }

    assert!(!dir.path().join("enhancedTodoTasks.json").exists());
    Ok(())
}

#[test]
fn add_rejects_unknown_priority_and_due() -> Result<(), Box<dyn std::error::Error>> {
    let dir = TestDir::init()?;
    dir.cmd()
        .args(["add", "Valid text", "--priority", "urgent"])
        .assert()
        .code(exit_codes::USER_ERROR)
        .stderr(contains("invalid priority"));
    dir.cmd()
        .args(["add", "Valid text", "--due", "someday"])
        .assert()
        .code(exit_codes::USER_ERROR)
        .stderr(contains("invalid due date"));
    Ok(())
}

#[test]
fn list_sorts_pending_first_then_priority() -> Result<(), Box<dyn std::error::Error>> {
    let dir = TestDir::init()?;
    let low = dir.add("Low task", &["--priority", "low"]);
    let high = dir.add("High task", &["--priority", "high"]);
    let done = dir.add("Done task", &["--priority", "high"]);
    dir.json(&["toggle", &done]);

    let display = dir.json(&["list"]);
    assert_eq!(listed_ids(&display), vec![high.clone(), low.clone(), done.clone()]);

    // Stored order is newest first.
    let manual = dir.json(&["list", "--manual"]);
    assert_eq!(listed_ids(&manual), vec![done, high, low]);
    Ok(())
}

#[test]
fn list_filters_and_searches() -> Result<(), Box<dyn std::error::Error>> {
    let dir = TestDir::init()?;
    dir.add("Write report", &[]);
    dir.add("Read book", &[]);
    let done = dir.add("Write letter", &[]);
    dir.json(&["complete", &done]);

    let pending = dir.json(&["list", "--filter", "pending", "--search", "WRITE"]);
    assert_eq!(pending["data"]["total"], 1);
    assert_eq!(pending["data"]["tasks"][0]["text"], "Write report");
    assert_eq!(pending["data"]["counts"]["all"], 2);
    assert_eq!(pending["data"]["counts"]["completed"], 1);

    let completed = dir.json(&["list", "--filter", "completed"]);
    assert_eq!(listed_ids(&completed), vec![done]);

    dir.cmd()
        .args(["list", "--filter", "archived"])
        .assert()
        .code(exit_codes::USER_ERROR);
    Ok(())
}

#[test]
fn list_counts_ignore_the_status_filter() -> Result<(), Box<dyn std::error::Error>> {
    let dir = TestDir::init()?;
    dir.add("Write report", &[]);
    let done = dir.add("Write letter", &[]);
    dir.add("Read book", &[]);
    dir.json(&["complete", &done]);

    for filter in ["all", "pending", "completed"] {
        let value = dir.json(&["list", "--filter", filter, "--search", "write"]);
        let counts = &value["data"]["counts"];
        assert_eq!(counts["all"], 2, "{filter}");
        assert_eq!(counts["pending"], 1, "{filter}");
        assert_eq!(counts["completed"], 1, "{filter}");
    }
    Ok(())
}

#[test]
fn list_groups_by_category() -> Result<(), Box<dyn std::error::Error>> {
    let dir = TestDir::init()?;
    dir.add("Gym session", &["--category", "Health", "--priority", "low"]);
    dir.add("Team meeting", &["--category", "Work", "--priority", "high"]);
    dir.add("Loose end", &["--priority", "medium"]);

    let value = dir.json(&["list", "--group"]);
    let groups = value["data"]["groups"].as_array().expect("groups");
    let names: Vec<&str> = groups
        .iter()
        .map(|group| group["name"].as_str().expect("name"))
        .collect();
    assert_eq!(names, vec!["Work", "Uncategorized", "Health"]);

    dir.cmd()
        .args(["list", "--group"])
        .assert()
        .success()
        .stdout(contains("Uncategorized (1)"));
    Ok(())
}

#[test]
fn show_reports_task_and_missing_id() -> Result<(), Box<dyn std::error::Error>> {
    let dir = TestDir::init()?;
    let id = dir.add("Renew passport", &["--due", "2000-01-01", "--category", "Personal"]);

    let value = dir.json(&["show", &id]);
    assert_eq!(value["data"]["text"], "Renew passport");
    assert_eq!(value["data"]["overdue"], true);
    assert!(value["data"]["dueLabel"]
        .as_str()
        .expect("due label")
        .starts_with("Overdue by"));

    let err = error_envelope(&dir, &["show", "42"], exit_codes::USER_ERROR);
    assert_eq!(err["error"]["details"]["id"], 42);
    assert_eq!(err["next_steps"][0], "tasklist list");

    dir.cmd()
        .args(["show", "abc"])
        .assert()
        .code(exit_codes::USER_ERROR)
        .stderr(contains("invalid task id"));
    Ok(())
}

#[test]
fn edit_changes_and_clears_fields() -> Result<(), Box<dyn std::error::Error>> {
    let dir = TestDir::init()?;
    let id = dir.add("Draft plan", &["--category", "Work", "--due", "2030-05-01"]);

    let value = dir.json(&["edit", &id, "--text", "Final plan", "--priority", "high"]);
    assert_eq!(value["data"]["text"], "Final plan");
    assert_eq!(value["data"]["priority"], "high");
    assert_eq!(value["data"]["category"], "Work");

    let value = dir.json(&["edit", &id, "--no-category", "--no-due"]);
    assert!(value["data"].get("category").is_none());
    assert!(value["data"].get("dueDate").is_none());

    let err = error_envelope(&dir, &["edit", &id, "--text", "99"], exit_codes::USER_ERROR);
    assert_eq!(err["error"]["message"], "Task cannot contain only numbers");
    assert_eq!(dir.read_tasks()?[0].text, "Final plan");

    dir.cmd()
        .args(["edit", &id])
        .assert()
        .code(exit_codes::USER_ERROR)
        .stderr(contains("nothing to edit"));
    Ok(())
}

#[test]
fn toggle_sets_and_clears_completed_at() -> Result<(), Box<dyn std::error::Error>> {
    let dir = TestDir::init()?;
    let id = dir.add("Water plants", &[]);

    let value = dir.json(&["toggle", &id]);
    assert_eq!(value["data"]["completed"], true);
    assert!(value["data"]["completedAt"].is_string());

    let value = dir.json(&["toggle", &id]);
    assert_eq!(value["data"]["completed"], false);
    assert!(value["data"].get("completedAt").is_none());

    error_envelope(&dir, &["toggle", "1"], exit_codes::USER_ERROR);
    Ok(())
}

#[test]
fn complete_and_reopen_in_bulk() -> Result<(), Box<dyn std::error::Error>> {
    let dir = TestDir::init()?;
    let a = dir.add("Task alpha", &[]);
    let b = dir.add("Task beta", &[]);

    let value = dir.json(&["complete", &a, &b, "77"]);
    assert_eq!(value["data"]["changed"], 2);
    assert_eq!(value["data"]["missing"][0], 77);
    assert!(value["warnings"][0].as_str().expect("warning").contains("77"));

    let tasks = dir.read_tasks()?;
    assert!(tasks.iter().all(|task| task.completed));
    assert_eq!(tasks[0].completed_at, tasks[1].completed_at);

    let value = dir.json(&["reopen", &a]);
    assert_eq!(value["data"]["changed"], 1);

    error_envelope(&dir, &["complete", "77"], exit_codes::USER_ERROR);
    Ok(())
}

#[test]
fn rm_and_clear() -> Result<(), Box<dyn std::error::Error>> {
    let dir = TestDir::init()?;
    let a = dir.add("Task alpha", &[]);
    let b = dir.add("Task beta", &[]);
    dir.add("Task gamma", &[]);

    let value = dir.json(&["rm", &a]);
    assert_eq!(value["data"]["changed"], 1);
    let value = dir.json(&["rm", &b, "5"]);
    assert_eq!(value["data"]["changed"], 1);
    assert_eq!(dir.read_tasks()?.len(), 1);

    dir.cmd()
        .arg("clear")
        .assert()
        .code(exit_codes::USER_ERROR)
        .stderr(contains("--yes"));
    assert_eq!(dir.read_tasks()?.len(), 1);

    let value = dir.json(&["clear", "--yes"]);
    assert_eq!(value["data"]["removed"], 1);
    assert!(dir.read_tasks()?.is_empty());
    Ok(())
}

#[test]
fn move_renumbers_order() -> Result<(), Box<dyn std::error::Error>> {
    let dir = TestDir::init()?;
    let a = dir.add("Task alpha", &[]);
    let b = dir.add("Task beta", &[]);
    let c = dir.add("Task gamma", &[]);

    let value = dir.json(&["move", &c, "10"]);
    assert_eq!(value["data"]["index"], 2);

    let tasks = dir.read_tasks()?;
    let ids: Vec<String> = tasks.iter().map(|task| task.id.to_string()).collect();
    assert_eq!(ids, vec![b, a, c]);
    let orders: Vec<usize> = tasks.iter().map(|task| task.order).collect();
    assert_eq!(orders, vec![0, 1, 2]);

    error_envelope(&dir, &["move", "3", "0"], exit_codes::USER_ERROR);
    Ok(())
}

#[test]
fn stats_reflect_completions() -> Result<(), Box<dyn std::error::Error>> {
    let dir = TestDir::init()?;
    let a = dir.add("Task alpha", &[]);
    dir.add("Task beta", &[]);
    dir.add("Task gamma", &["--due", "2000-01-01"]);
    dir.json(&["toggle", &a]);

    let value = dir.json(&["stats"]);
    let stats = &value["data"];
    assert_eq!(stats["total"], 3);
    assert_eq!(stats["completed"], 1);
    assert_eq!(stats["pending"], 2);
    assert_eq!(stats["completionRate"], 33);
    assert_eq!(stats["todayCompleted"], 1);
    assert_eq!(stats["weeklyCompleted"], 1);
    assert_eq!(stats["streak"], 1);
    assert_eq!(stats["overdue"], 1);

    dir.cmd()
        .arg("stats")
        .assert()
        .success()
        .stdout(contains("Completion rate: 33%"));
    Ok(())
}

#[test]
fn corrupt_record_is_preserved_and_list_starts_empty() -> Result<(), Box<dyn std::error::Error>> {
    let dir = TestDir::init()?;
    dir.write_file("enhancedTodoTasks.json", "{not json")?;

    let value = dir.json(&["list"]);
    assert_eq!(value["data"]["total"], 0);

    let preserved = dir.path().join("enhancedTodoTasks.json.corrupt");
    assert_eq!(std::fs::read_to_string(&preserved)?, "{not json");

    dir.add("Fresh start", &[]);
    assert_eq!(dir.read_tasks()?.len(), 1);
    assert_eq!(std::fs::read_to_string(&preserved)?, "{not json");
    Ok(())
}
