//! The task collection and every operation that changes it.
//!
//! Each mutation builds the next collection, persists it as one record and
//! only then replaces the in-memory copy, so a failed write leaves the
//! manager exactly as it was.

use std::collections::HashSet;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Duration;

use chrono::Utc;
use serde::Serialize;
use tracing::{debug, warn};

use crate::config::Config;
use crate::dates::{self, Timestamp};
use crate::derive;
use crate::error::{Error, Result};
use crate::model::{Task, TaskDraft, TaskId, TaskPatch, TaskStats};
use crate::store::Store;
use crate::validation;

/// Issues task ids: creation-time milliseconds, bumped past the last id
/// handed out so ids stay unique even within the same millisecond.
#[derive(Debug, Clone, Default)]
pub struct IdGenerator {
    last: u64,
}

impl IdGenerator {
    /// Start above every id already present in `tasks`.
    pub fn seeded(tasks: &[Task]) -> Self {
        Self {
            last: tasks.iter().map(|task| task.id.0).max().unwrap_or(0),
        }
    }

    pub fn issue_at(&mut self, now_millis: u64) -> TaskId {
        let id = now_millis.max(self.last.saturating_add(1));
        self.last = id;
        TaskId(id)
    }

    pub fn issue(&mut self) -> TaskId {
        let millis = u64::try_from(Utc::now().timestamp_millis()).unwrap_or(0);
        self.issue_at(millis)
    }
}

/// Shared view of whether an `add` is in flight.
#[derive(Debug, Clone, Default)]
pub struct BusyFlag(Arc<AtomicBool>);

impl BusyFlag {
    pub fn is_busy(&self) -> bool {
        self.0.load(Ordering::SeqCst)
    }

    fn raise(&self) -> BusyGuard<'_> {
        self.0.store(true, Ordering::SeqCst);
        BusyGuard(self)
    }
}

/// Clears the flag on every exit path.
struct BusyGuard<'a>(&'a BusyFlag);

impl Drop for BusyGuard<'_> {
    fn drop(&mut self) {
        (self.0).0.store(false, Ordering::SeqCst);
    }
}

/// Outcome of merging imported tasks.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ImportReport {
    pub imported: usize,
    pub skipped: usize,
    pub ids: Vec<TaskId>,
}

/// Owns the task collection, backed by one record of `S`.
#[derive(Debug)]
pub struct TaskManager<S: Store> {
    store: S,
    key: String,
    tasks: Vec<Task>,
    ids: IdGenerator,
    busy: BusyFlag,
    submit_delay: Duration,
}

impl<S: Store> TaskManager<S> {
    /// Load the collection stored under the configured key; a missing or
    /// corrupt record starts an empty list.
    pub fn open(store: S, config: &Config) -> Self {
        let key = config.storage.tasks_key.clone();
        let tasks: Vec<Task> = store.get(&key, Vec::new());
        debug!(key = %key, count = tasks.len(), "tasks loaded");
        Self {
            ids: IdGenerator::seeded(&tasks),
            store,
            key,
            tasks,
            busy: BusyFlag::default(),
            submit_delay: Duration::from_millis(config.tasks.submit_delay_ms),
        }
    }

    pub fn with_submit_delay(mut self, delay: Duration) -> Self {
        self.submit_delay = delay;
        self
    }

    /// Tasks in stored (manual) order.
    pub fn tasks(&self) -> &[Task] {
        &self.tasks
    }

    pub fn get(&self, id: TaskId) -> Option<&Task> {
        self.tasks.iter().find(|task| task.id == id)
    }

    pub fn is_busy(&self) -> bool {
        self.busy.is_busy()
    }

    /// Handle for observing the busy state from elsewhere.
    pub fn busy_flag(&self) -> BusyFlag {
        self.busy.clone()
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    pub fn store_mut(&mut self) -> &mut S {
        &mut self.store
    }

    fn position(&self, id: TaskId) -> Option<usize> {
        self.tasks.iter().position(|task| task.id == id)
    }

    fn commit(&mut self, op: &'static str, next: Vec<Task>) -> Result<()> {
        self.store.set(&self.key, next.as_slice())?;
        debug!(op, before = self.tasks.len(), after = next.len(), "tasks persisted");
        self.tasks = next;
        Ok(())
    }

    /// Validate and prepend a new task.
    ///
    /// Invalid text returns `Error::Validation` and changes nothing. The busy
    /// flag stays raised for the whole call, including the submit delay.
    pub fn add(&mut self, draft: TaskDraft) -> Result<Task> {
        let text = validation::validate(&draft.text)?.to_string();

        let busy = self.busy.clone();
        let _guard = busy.raise();
        if !self.submit_delay.is_zero() {
            std::thread::sleep(self.submit_delay);
        }

        let task = Task {
            id: self.ids.issue(),
            text,
            completed: false,
            created_at: dates::now(),
            completed_at: None,
            priority: draft.priority,
            category: draft.category,
            due_date: draft.due_date,
            order: self.tasks.len(),
        };

        let mut next = Vec::with_capacity(self.tasks.len() + 1);
        next.push(task.clone());
        next.extend(self.tasks.iter().cloned());
        self.commit("add", next)?;
        Ok(task)
    }

    /// Remove one task. Returns whether it existed.
    pub fn delete(&mut self, id: TaskId) -> Result<bool> {
        if self.position(id).is_none() {
            return Ok(false);
        }
        let next = self.tasks.iter().filter(|task| task.id != id).cloned().collect();
        self.commit("delete", next)?;
        Ok(true)
    }

    /// Remove every task in `ids`; unknown ids are ignored. Returns how many
    /// were removed.
    pub fn delete_many(&mut self, ids: &[TaskId]) -> Result<usize> {
        let ids: HashSet<TaskId> = ids.iter().copied().collect();
        let next: Vec<Task> = self
            .tasks
            .iter()
            .filter(|task| !ids.contains(&task.id))
            .cloned()
            .collect();
        let removed = self.tasks.len() - next.len();
        if removed > 0 {
            self.commit("delete_many", next)?;
        }
        Ok(removed)
    }

    /// Remove every task.
    pub fn clear(&mut self) -> Result<usize> {
        let removed = self.tasks.len();
        self.commit("clear", Vec::new())?;
        Ok(removed)
    }

    /// Flip completion of one task. `Ok(None)` when the id is unknown.
    pub fn toggle(&mut self, id: TaskId) -> Result<Option<Task>> {
        let Some(pos) = self.position(id) else {
            return Ok(None);
        };
        let mut next = self.tasks.clone();
        let completed = !next[pos].completed;
        next[pos].set_completed(completed, dates::now());
        let updated = next[pos].clone();
        self.commit("toggle", next)?;
        Ok(Some(updated))
    }

    /// Set completion for every task in `ids`, stamping them all with the
    /// same instant. Returns how many tasks matched.
    pub fn toggle_many(&mut self, ids: &[TaskId], completed: bool) -> Result<usize> {
        let ids: HashSet<TaskId> = ids.iter().copied().collect();
        let now = dates::now();
        let mut next = self.tasks.clone();
        let mut matched = 0;
        for task in next.iter_mut().filter(|task| ids.contains(&task.id)) {
            task.set_completed(completed, now);
            matched += 1;
        }
        if matched > 0 {
            self.commit("toggle_many", next)?;
        }
        Ok(matched)
    }

    /// Move a task to `target_index` (past-the-end appends) and renumber
    /// every `order` to its position. Returns false for an unknown id.
    pub fn reorder(&mut self, dragged: TaskId, target_index: usize) -> Result<bool> {
        let Some(pos) = self.position(dragged) else {
            return Ok(false);
        };
        let mut next = self.tasks.clone();
        let task = next.remove(pos);
        let index = target_index.min(next.len());
        next.insert(index, task);
        for (order, task) in next.iter_mut().enumerate() {
            task.order = order;
        }
        self.commit("reorder", next)?;
        Ok(true)
    }

    /// Edit text, priority, category or due date of one task.
    pub fn update(&mut self, id: TaskId, patch: TaskPatch) -> Result<Task> {
        let pos = self.position(id).ok_or(Error::TaskNotFound(id))?;
        if patch.is_empty() {
            return Ok(self.tasks[pos].clone());
        }

        let mut next = self.tasks.clone();
        let task = &mut next[pos];
        if let Some(text) = patch.text.as_deref() {
            task.text = validation::validate(text)?.to_string();
        }
        if let Some(priority) = patch.priority {
            task.priority = priority;
        }
        if let Some(category) = patch.category {
            task.category = category;
        }
        if let Some(due_date) = patch.due_date {
            task.due_date = due_date;
        }
        let updated = task.clone();
        self.commit("update", next)?;
        Ok(updated)
    }

    /// Append imported tasks with fresh ids and `order` continuing from the
    /// current length. Tasks with invalid text are skipped.
    pub fn import(&mut self, incoming: Vec<Task>) -> Result<ImportReport> {
        let now = dates::now();
        let mut next = self.tasks.clone();
        let mut report = ImportReport {
            imported: 0,
            skipped: 0,
            ids: Vec::new(),
        };

        for task in incoming {
            let text = match validation::validate(&task.text) {
                Ok(text) => text.to_string(),
                Err(err) => {
                    warn!(text = %task.text, error = %err, "skipping imported task");
                    report.skipped += 1;
                    continue;
                }
            };
            let completed_at = if task.completed {
                task.completed_at.or(Some(now))
            } else {
                None
            };
            let id = self.ids.issue();
            next.push(Task {
                id,
                text,
                completed_at,
                order: next.len(),
                ..task
            });
            report.ids.push(id);
            report.imported += 1;
        }

        if report.imported > 0 {
            self.commit("import", next)?;
        }
        Ok(report)
    }

    pub fn stats(&self) -> TaskStats {
        compute_stats(&self.tasks, &dates::now())
    }
}

/// Recompute every figure in [`TaskStats`] from `tasks`.
pub fn compute_stats(tasks: &[Task], now: &Timestamp) -> TaskStats {
    let total = tasks.len();
    let completed = tasks.iter().filter(|task| task.completed).count();
    let completion_rate = if total > 0 {
        ((completed as f64 / total as f64) * 100.0).round() as u32
    } else {
        0
    };

    let today = now.date_naive();
    let completion_dates = || {
        tasks
            .iter()
            .filter(|task| task.completed)
            .filter_map(|task| task.completed_at.as_ref())
    };
    let today_completed = completion_dates()
        .filter(|ts| ts.date_naive() == today)
        .count();
    let weekly_completed = completion_dates()
        .filter(|ts| dates::is_this_week_at(ts, now))
        .count();

    TaskStats {
        total,
        completed,
        pending: total - completed,
        completion_rate,
        today_completed,
        weekly_completed,
        streak: derive::streak(tasks, today),
        overdue: derive::overdue_tasks(tasks, now).count(),
    }
}
