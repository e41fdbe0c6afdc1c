//! Pure views over a task slice: display order, grouping, filtering,
//! completion streaks and the color/icon lookup tables.

use std::collections::HashSet;
use std::str::FromStr;

use chrono::{Duration, NaiveDate};
use serde::Serialize;

use crate::dates::Timestamp;
use crate::error::{Error, Result};
use crate::model::{Category, Priority, Task};

pub fn priority_color(priority: Priority) -> &'static str {
    match priority {
        Priority::High => "bg-danger",
        Priority::Medium => "bg-warning",
        Priority::Low => "bg-success",
    }
}

pub fn priority_icon(priority: Priority) -> &'static str {
    match priority {
        Priority::High => "🔴",
        Priority::Medium => "🟡",
        Priority::Low => "🟢",
    }
}

pub fn category_color(category: Option<Category>) -> &'static str {
    match category {
        Some(Category::Work) => "bg-primary",
        Some(Category::Personal) => "bg-info",
        Some(Category::Shopping) => "bg-warning",
        Some(Category::Health) => "bg-success",
        Some(Category::Study) => "bg-dark",
        None => "bg-secondary",
    }
}

pub fn category_icon(category: Option<Category>) -> &'static str {
    match category {
        Some(Category::Work) => "💼",
        Some(Category::Personal) => "🏠",
        Some(Category::Shopping) => "🛒",
        Some(Category::Health) => "💊",
        Some(Category::Study) => "📚",
        None => "📁",
    }
}

/// Display order: pending before completed, then high to low priority.
///
/// The sort is stable and ignores `order`; manual order only applies to the
/// stored sequence.
pub fn sort_for_display(tasks: &[Task]) -> Vec<Task> {
    let mut sorted = tasks.to_vec();
    sorted.sort_by(|left, right| {
        left.completed
            .cmp(&right.completed)
            .then_with(|| right.priority.rank().cmp(&left.priority.rank()))
    });
    sorted
}

/// Tasks sharing one category label.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TaskGroup {
    pub name: String,
    pub tasks: Vec<Task>,
}

/// Group tasks by category name. Groups appear in order of first occurrence
/// and keep the input order of their tasks.
pub fn group_by_category(tasks: &[Task]) -> Vec<TaskGroup> {
    let mut groups: Vec<TaskGroup> = Vec::new();
    for task in tasks {
        let name = task.category_name();
        match groups.iter_mut().find(|group| group.name == name) {
            Some(group) => group.tasks.push(task.clone()),
            None => groups.push(TaskGroup {
                name: name.to_string(),
                tasks: vec![task.clone()],
            }),
        }
    }
    groups
}

/// Consecutive days with at least one completion, ending today, or
/// yesterday when nothing has been completed today yet.
pub fn streak(tasks: &[Task], today: NaiveDate) -> u32 {
    let days: HashSet<NaiveDate> = tasks
        .iter()
        .filter(|task| task.completed)
        .filter_map(|task| task.completed_at.as_ref())
        .map(|ts| ts.date_naive())
        .collect();

    if days.is_empty() {
        return 0;
    }

    let mut day = if days.contains(&today) {
        today
    } else {
        today - Duration::days(1)
    };

    let mut count = 0;
    while days.contains(&day) {
        count += 1;
        day -= Duration::days(1);
    }
    count
}

/// Status filter for list views.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum StatusFilter {
    #[default]
    All,
    Pending,
    Completed,
}

impl StatusFilter {
    pub fn matches(self, task: &Task) -> bool {
        match self {
            StatusFilter::All => true,
            StatusFilter::Pending => !task.completed,
            StatusFilter::Completed => task.completed,
        }
    }
}

impl FromStr for StatusFilter {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "all" => Ok(StatusFilter::All),
            "pending" => Ok(StatusFilter::Pending),
            "completed" | "done" => Ok(StatusFilter::Completed),
            other => Err(Error::InvalidArgument(format!(
                "invalid filter '{other}' (expected all|pending|completed)"
            ))),
        }
    }
}

/// Case-insensitive text search combined with a status filter. Keeps the
/// input order.
pub fn filter_tasks(tasks: &[Task], search: &str, filter: StatusFilter) -> Vec<Task> {
    let needle = search.trim().to_lowercase();
    tasks
        .iter()
        .filter(|task| needle.is_empty() || task.text.to_lowercase().contains(&needle))
        .filter(|task| filter.matches(task))
        .cloned()
        .collect()
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
pub struct FilterCounts {
    pub all: usize,
    pub pending: usize,
    pub completed: usize,
}

impl FilterCounts {
    pub fn from_tasks(tasks: &[Task]) -> Self {
        let completed = tasks.iter().filter(|task| task.completed).count();
        Self {
            all: tasks.len(),
            pending: tasks.len() - completed,
            completed,
        }
    }
}

/// A pending task whose due date has passed.
pub fn is_overdue_task(task: &Task, now: &Timestamp) -> bool {
    !task.completed
        && task
            .due_date
            .as_ref()
            .is_some_and(|due| crate::dates::is_overdue_at(due, now))
}

pub fn overdue_tasks<'a>(tasks: &'a [Task], now: &Timestamp) -> impl Iterator<Item = &'a Task> {
    let now = *now;
    tasks.iter().filter(move |task| is_overdue_task(task, &now))
}
