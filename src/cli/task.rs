//! tasklist task command implementations.

use std::path::PathBuf;

use serde::Serialize;

use crate::cli::load_context;
use crate::dates::{self, Timestamp};
use crate::derive::{self, FilterCounts, StatusFilter, TaskGroup};
use crate::error::{Error, Result};
use crate::manager::TaskManager;
use crate::model::{Category, Priority, Task, TaskDraft, TaskId, TaskPatch, TaskStats};
use crate::output::{emit_success, HumanOutput, OutputOptions};
use crate::store::FileStore;

pub struct AddOptions {
    pub text: String,
    pub priority: Option<String>,
    pub category: Option<String>,
    pub due: Option<String>,
    pub data_dir: Option<PathBuf>,
    pub json: bool,
    pub quiet: bool,
}

pub struct ListOptions {
    pub search: Option<String>,
    pub filter: String,
    pub group: bool,
    pub manual: bool,
    pub data_dir: Option<PathBuf>,
    pub json: bool,
    pub quiet: bool,
}

pub struct ShowOptions {
    pub id: String,
    pub data_dir: Option<PathBuf>,
    pub json: bool,
    pub quiet: bool,
}

pub struct EditOptions {
    pub id: String,
    pub text: Option<String>,
    pub priority: Option<String>,
    pub category: Option<String>,
    pub no_category: bool,
    pub due: Option<String>,
    pub no_due: bool,
    pub data_dir: Option<PathBuf>,
    pub json: bool,
    pub quiet: bool,
}

pub struct ToggleOptions {
    pub id: String,
    pub data_dir: Option<PathBuf>,
    pub json: bool,
    pub quiet: bool,
}

pub struct SetCompletedOptions {
    pub ids: Vec<String>,
    pub completed: bool,
    pub data_dir: Option<PathBuf>,
    pub json: bool,
    pub quiet: bool,
}

pub struct RmOptions {
    pub ids: Vec<String>,
    pub data_dir: Option<PathBuf>,
    pub json: bool,
    pub quiet: bool,
}

pub struct ClearOptions {
    pub yes: bool,
    pub data_dir: Option<PathBuf>,
    pub json: bool,
    pub quiet: bool,
}

pub struct MoveOptions {
    pub id: String,
    pub index: usize,
    pub data_dir: Option<PathBuf>,
    pub json: bool,
    pub quiet: bool,
}

pub struct StatsOptions {
    pub data_dir: Option<PathBuf>,
    pub json: bool,
    pub quiet: bool,
}

/// A task plus the presentation fields a front end needs to render it.
#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct TaskView {
    #[serde(flatten)]
    task: Task,
    priority_color: &'static str,
    priority_icon: &'static str,
    category_color: &'static str,
    category_icon: &'static str,
    #[serde(skip_serializing_if = "Option::is_none")]
    due_label: Option<String>,
    overdue: bool,
}

impl TaskView {
    fn new(task: &Task, now: &Timestamp) -> Self {
        Self {
            task: task.clone(),
            priority_color: derive::priority_color(task.priority),
            priority_icon: derive::priority_icon(task.priority),
            category_color: derive::category_color(task.category),
            category_icon: derive::category_icon(task.category),
            due_label: task
                .due_date
                .as_ref()
                .map(|due| dates::format_due_date_at(due, now)),
            overdue: derive::is_overdue_task(task, now),
        }
    }
}

#[derive(Serialize)]
struct TaskListOutput {
    total: usize,
    filter: StatusFilter,
    counts: FilterCounts,
    tasks: Vec<TaskView>,
    #[serde(skip_serializing_if = "Option::is_none")]
    groups: Option<Vec<TaskGroup>>,
}

#[derive(Serialize)]
struct BatchOutput {
    changed: usize,
    ids: Vec<TaskId>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    missing: Vec<TaskId>,
}

#[derive(Serialize)]
struct ClearOutput {
    removed: usize,
}

#[derive(Serialize)]
struct MoveOutput {
    id: TaskId,
    index: usize,
}

pub fn run_add(options: AddOptions) -> Result<()> {
    let ctx = load_context(options.data_dir)?;
    let priority = match options.priority.as_deref() {
        Some(raw) => raw.parse::<Priority>()?,
        None => ctx.config.tasks.default_priority,
    };
    let mut draft = TaskDraft::new(options.text, priority);
    if let Some(raw) = options.category.as_deref() {
        draft = draft.category(raw.parse::<Category>()?);
    }
    if let Some(raw) = options.due.as_deref() {
        draft = draft.due(parse_due(raw)?);
    }

    let (mut manager, _) = ctx.into_manager();
    let task = manager.add(draft)?;
    let now = dates::now();

    let mut human = HumanOutput::new("Task added");
    push_task_summary(&mut human, &task, &now);
    if derive::is_overdue_task(&task, &now) {
        human.push_warning("due date is already in the past");
    }

    emit_success(
        OutputOptions {
            json: options.json,
            quiet: options.quiet,
        },
        "add",
        &TaskView::new(&task, &now),
        Some(&human),
    )
}

pub fn run_list(options: ListOptions) -> Result<()> {
    let filter = options.filter.parse::<StatusFilter>()?;
    let search = options.search.unwrap_or_default();
    let ctx = load_context(options.data_dir)?;
    let (manager, _) = ctx.into_manager();
    let now = dates::now();

    let ordered = if options.manual {
        manager.tasks().to_vec()
    } else {
        derive::sort_for_display(manager.tasks())
    };
    // Tab counts follow the search only, so every status tab shows its own
    // size whichever tab is selected.
    let counts = FilterCounts::from_tasks(&derive::filter_tasks(
        &ordered,
        &search,
        StatusFilter::All,
    ));
    let tasks = derive::filter_tasks(&ordered, &search, filter);
    let groups = options.group.then(|| derive::group_by_category(&tasks));

    let mut human = HumanOutput::new("Tasks");
    human.push_summary(
        "Showing",
        format!("{} ({})", tasks.len(), filter_label(filter)),
    );
    human.push_summary(
        "Counts",
        format!(
            "all {}, pending {}, completed {}",
            counts.all, counts.pending, counts.completed
        ),
    );
    if !search.trim().is_empty() {
        human.push_summary("Search", search.trim());
    }
    match groups.as_ref() {
        Some(groups) => {
            for group in groups {
                human.push_detail(format!("{} ({})", group.name, group.tasks.len()));
                for task in &group.tasks {
                    human.push_detail(format!("  {}", format_task_line(task, &now)));
                }
            }
        }
        None => {
            for task in &tasks {
                human.push_detail(format_task_line(task, &now));
            }
        }
    }
    if manager.tasks().is_empty() {
        human.push_next_step("tasklist add \"...\"");
    }

    let output = TaskListOutput {
        total: tasks.len(),
        filter,
        counts,
        tasks: tasks.iter().map(|task| TaskView::new(task, &now)).collect(),
        groups,
    };

    emit_success(
        OutputOptions {
            json: options.json,
            quiet: options.quiet,
        },
        "list",
        &output,
        Some(&human),
    )
}

pub fn run_show(options: ShowOptions) -> Result<()> {
    let id = parse_id(&options.id)?;
    let ctx = load_context(options.data_dir)?;
    let (manager, _) = ctx.into_manager();
    let task = manager.get(id).ok_or(Error::TaskNotFound(id))?;
    let now = dates::now();

    let mut human = HumanOutput::new(format!("Task {}", task.id));
    push_task_summary(&mut human, task, &now);
    human.push_summary(
        "Created",
        format!(
            "{} ({})",
            dates::format_date_time(&task.created_at),
            dates::format_relative_time_at(&task.created_at, &now)
        ),
    );
    if let Some(done) = task.completed_at.as_ref() {
        human.push_summary("Completed", dates::format_date_time(done));
    }
    human.push_summary("Position", task.order.to_string());

    emit_success(
        OutputOptions {
            json: options.json,
            quiet: options.quiet,
        },
        "show",
        &TaskView::new(task, &now),
        Some(&human),
    )
}

pub fn run_edit(options: EditOptions) -> Result<()> {
    let id = parse_id(&options.id)?;
    let patch = TaskPatch {
        text: options.text,
        priority: options
            .priority
            .as_deref()
            .map(str::parse::<Priority>)
            .transpose()?,
        category: if options.no_category {
            Some(None)
        } else {
            options
                .category
                .as_deref()
                .map(|raw| raw.parse::<Category>().map(Some))
                .transpose()?
        },
        due_date: if options.no_due {
            Some(None)
        } else {
            options
                .due
                .as_deref()
                .map(|raw| parse_due(raw).map(Some))
                .transpose()?
        },
    };
    if patch.is_empty() {
        return Err(Error::InvalidArgument(
            "nothing to edit (use --text, --priority, --category, --no-category, --due or --no-due)"
                .to_string(),
        ));
    }

    let ctx = load_context(options.data_dir)?;
    let (mut manager, _) = ctx.into_manager();
    let task = manager.update(id, patch)?;
    let now = dates::now();

    let mut human = HumanOutput::new("Task updated");
    push_task_summary(&mut human, &task, &now);

    emit_success(
        OutputOptions {
            json: options.json,
            quiet: options.quiet,
        },
        "edit",
        &TaskView::new(&task, &now),
        Some(&human),
    )
}

pub fn run_toggle(options: ToggleOptions) -> Result<()> {
    let id = parse_id(&options.id)?;
    let ctx = load_context(options.data_dir)?;
    let (mut manager, _) = ctx.into_manager();
    let task = manager.toggle(id)?.ok_or(Error::TaskNotFound(id))?;
    let now = dates::now();

    let header = if task.completed {
        "Task completed"
    } else {
        "Task reopened"
    };
    let mut human = HumanOutput::new(header);
    push_task_summary(&mut human, &task, &now);
    if task.completed {
        human.push_summary("Streak", format!("{} day(s)", manager.stats().streak));
    }

    emit_success(
        OutputOptions {
            json: options.json,
            quiet: options.quiet,
        },
        "toggle",
        &TaskView::new(&task, &now),
        Some(&human),
    )
}

pub fn run_set_completed(options: SetCompletedOptions) -> Result<()> {
    let ids = parse_ids(&options.ids)?;
    let ctx = load_context(options.data_dir)?;
    let (mut manager, _) = ctx.into_manager();
    let (found, missing) = split_known(&manager, &ids)?;

    let changed = manager.toggle_many(&found, options.completed)?;
    let (command, header) = if options.completed {
        ("complete", "Tasks completed")
    } else {
        ("reopen", "Tasks reopened")
    };

    let mut human = HumanOutput::new(header);
    human.push_summary("Changed", changed.to_string());
    for id in &missing {
        human.push_warning(format!("task {id} not found"));
    }

    emit_success(
        OutputOptions {
            json: options.json,
            quiet: options.quiet,
        },
        command,
        &BatchOutput {
            changed,
            ids: found,
            missing,
        },
        Some(&human),
    )
}

pub fn run_rm(options: RmOptions) -> Result<()> {
    let ids = parse_ids(&options.ids)?;
    let ctx = load_context(options.data_dir)?;
    let (mut manager, _) = ctx.into_manager();
    let (found, missing) = split_known(&manager, &ids)?;

    let removed = if found.len() == 1 {
        usize::from(manager.delete(found[0])?)
    } else {
        manager.delete_many(&found)?
    };

    let mut human = HumanOutput::new("Tasks deleted");
    human.push_summary("Removed", removed.to_string());
    human.push_summary("Remaining", manager.tasks().len().to_string());
    for id in &missing {
        human.push_warning(format!("task {id} not found"));
    }

    emit_success(
        OutputOptions {
            json: options.json,
            quiet: options.quiet,
        },
        "rm",
        &BatchOutput {
            changed: removed,
            ids: found,
            missing,
        },
        Some(&human),
    )
}

pub fn run_clear(options: ClearOptions) -> Result<()> {
    let ctx = load_context(options.data_dir)?;
    let (mut manager, _) = ctx.into_manager();
    if !options.yes {
        return Err(Error::InvalidArgument(format!(
            "refusing to delete {} task(s) without --yes",
            manager.tasks().len()
        )));
    }
    let removed = manager.clear()?;

    let mut human = HumanOutput::new("All tasks deleted");
    human.push_summary("Removed", removed.to_string());

    emit_success(
        OutputOptions {
            json: options.json,
            quiet: options.quiet,
        },
        "clear",
        &ClearOutput { removed },
        Some(&human),
    )
}

pub fn run_move(options: MoveOptions) -> Result<()> {
    let id = parse_id(&options.id)?;
    let ctx = load_context(options.data_dir)?;
    let (mut manager, _) = ctx.into_manager();
    if !manager.reorder(id, options.index)? {
        return Err(Error::TaskNotFound(id));
    }
    let index = manager
        .tasks()
        .iter()
        .position(|task| task.id == id)
        .unwrap_or(options.index);

    let mut human = HumanOutput::new("Task moved");
    human.push_summary("Id", id.to_string());
    human.push_summary("Position", index.to_string());

    emit_success(
        OutputOptions {
            json: options.json,
            quiet: options.quiet,
        },
        "move",
        &MoveOutput { id, index },
        Some(&human),
    )
}

pub fn run_stats(options: StatsOptions) -> Result<()> {
    let ctx = load_context(options.data_dir)?;
    let (manager, _) = ctx.into_manager();
    let stats: TaskStats = manager.stats();

    let mut human = HumanOutput::new("Task stats");
    human.push_summary("Total", stats.total.to_string());
    human.push_summary("Completed", stats.completed.to_string());
    human.push_summary("Pending", stats.pending.to_string());
    human.push_summary("Completion rate", format!("{}%", stats.completion_rate));
    human.push_summary("Completed today", stats.today_completed.to_string());
    human.push_summary("Completed this week", stats.weekly_completed.to_string());
    human.push_summary("Streak", format!("{} day(s)", stats.streak));
    human.push_summary("Overdue", stats.overdue.to_string());
    if stats.overdue > 0 {
        human.push_next_step("tasklist list --filter pending");
    }

    emit_success(
        OutputOptions {
            json: options.json,
            quiet: options.quiet,
        },
        "stats",
        &stats,
        Some(&human),
    )
}

fn parse_id(raw: &str) -> Result<TaskId> {
    raw.parse::<TaskId>()
}

fn parse_ids(raw: &[String]) -> Result<Vec<TaskId>> {
    raw.iter().map(|value| parse_id(value)).collect()
}

fn parse_due(raw: &str) -> Result<Timestamp> {
    dates::parse_due_date(raw).ok_or_else(|| {
        Error::InvalidArgument(format!(
            "invalid due date '{raw}' (expected YYYY-MM-DD or RFC 3339)"
        ))
    })
}

/// Split `ids` into known and unknown ones; all unknown is an error.
fn split_known(
    manager: &TaskManager<FileStore>,
    ids: &[TaskId],
) -> Result<(Vec<TaskId>, Vec<TaskId>)> {
    let (found, missing): (Vec<TaskId>, Vec<TaskId>) =
        ids.iter().partition(|id| manager.get(**id).is_some());
    match (found.is_empty(), missing.first()) {
        (true, Some(first)) => Err(Error::TaskNotFound(*first)),
        _ => Ok((found, missing)),
    }
}

fn filter_label(filter: StatusFilter) -> &'static str {
    match filter {
        StatusFilter::All => "all",
        StatusFilter::Pending => "pending",
        StatusFilter::Completed => "completed",
    }
}

fn format_task_line(task: &Task, now: &Timestamp) -> String {
    let check = if task.completed { "[x]" } else { "[ ]" };
    let mut line = format!(
        "{check} {} {} {} [{}]",
        task.id,
        derive::priority_icon(task.priority),
        task.text,
        task.category_name()
    );
    if let Some(due) = task.due_date.as_ref() {
        if !task.completed {
            line.push_str(&format!(" ({})", dates::format_due_date_at(due, now)));
        }
    }
    line
}

fn push_task_summary(human: &mut HumanOutput, task: &Task, now: &Timestamp) {
    human.push_summary("Id", task.id.to_string());
    human.push_summary("Text", task.text.clone());
    human.push_summary(
        "Status",
        if task.completed { "completed" } else { "pending" },
    );
    human.push_summary(
        "Priority",
        format!("{} {}", derive::priority_icon(task.priority), task.priority),
    );
    human.push_summary(
        "Category",
        format!(
            "{} {}",
            derive::category_icon(task.category),
            task.category_name()
        ),
    );
    if let Some(due) = task.due_date.as_ref() {
        human.push_summary(
            "Due",
            format!(
                "{} ({})",
                dates::format_date_time(due),
                dates::format_due_date_at(due, now)
            ),
        );
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Duration, Local, TimeZone};

    fn task(completed: bool, due: Option<Timestamp>) -> Task {
        Task {
            id: TaskId(7),
            text: "Call the dentist".to_string(),
            completed,
            created_at: Local.with_ymd_and_hms(2024, 3, 1, 12, 0, 0).unwrap(),
            completed_at: None,
            priority: Priority::High,
            category: Some(Category::Health),
            due_date: due,
            order: 0,
        }
    }

    #[test]
    fn task_line_shows_due_label_for_pending_only() {
        let now = Local.with_ymd_and_hms(2024, 3, 7, 12, 0, 0).unwrap();
        let due = Some(now + Duration::days(1));
        let pending = format_task_line(&task(false, due), &now);
        assert_eq!(pending, "[ ] 7 🔴 Call the dentist [Health] (Due tomorrow)");

        let done = format_task_line(&task(true, due), &now);
        assert_eq!(done, "[x] 7 🔴 Call the dentist [Health]");
    }

    #[test]
    fn view_flags_overdue_pending_tasks() {
        let now = Local.with_ymd_and_hms(2024, 3, 7, 12, 0, 0).unwrap();
        let past = Some(now - Duration::days(2));
        let view = TaskView::new(&task(false, past), &now);
        assert!(view.overdue);
        assert_eq!(view.due_label.as_deref(), Some("Overdue by 2 days"));
        assert_eq!(view.category_icon, "💊");

        assert!(!TaskView::new(&task(true, past), &now).overdue);
    }

    #[test]
    fn due_parsing_rejects_garbage() {
        assert!(parse_due("2024-03-08").is_ok());
        assert!(matches!(parse_due("next week"), Err(Error::InvalidArgument(_))));
    }
}
