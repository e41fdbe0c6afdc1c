//! Task data model.
//!
//! The JSON shape matches the persisted collection and the export format:
//! camelCase field names, lowercase priorities, capitalized categories.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Deserializer, Serialize};

use crate::dates::Timestamp;
use crate::error::{Error, Result};

/// Task identifier. Unique within a collection for its whole lifetime.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
#[serde(transparent)]
pub struct TaskId(pub u64);

impl fmt::Display for TaskId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl FromStr for TaskId {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        s.trim()
            .parse::<u64>()
            .map(TaskId)
            .map_err(|_| Error::InvalidArgument(format!("invalid task id '{s}'")))
    }
}

// Older exports may carry fractional ids; truncate them.
impl<'de> Deserialize<'de> for TaskId {
    fn deserialize<D: Deserializer<'de>>(de: D) -> std::result::Result<Self, D::Error> {
        #[derive(Deserialize)]
        #[serde(untagged)]
        enum RawId {
            Int(u64),
            Float(f64),
        }

        match RawId::deserialize(de)? {
            RawId::Int(value) => Ok(TaskId(value)),
            RawId::Float(value) if value.is_finite() && value >= 0.0 => Ok(TaskId(value as u64)),
            RawId::Float(value) => Err(serde::de::Error::custom(format!(
                "invalid task id {value}"
            ))),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Priority {
    Low,
    #[default]
    Medium,
    High,
}

impl Priority {
    pub const ALL: [Priority; 3] = [Priority::Low, Priority::Medium, Priority::High];

    /// Higher rank sorts first in the display view.
    pub fn rank(self) -> u8 {
        match self {
            Priority::High => 3,
            Priority::Medium => 2,
            Priority::Low => 1,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Priority::Low => "low",
            Priority::Medium => "medium",
            Priority::High => "high",
        }
    }
}

impl fmt::Display for Priority {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Priority {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        let trimmed = s.trim();
        Priority::ALL
            .into_iter()
            .find(|p| p.as_str().eq_ignore_ascii_case(trimmed))
            .ok_or_else(|| {
                Error::InvalidArgument(format!(
                    "invalid priority '{trimmed}' (expected low|medium|high)"
                ))
            })
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Category {
    Work,
    Personal,
    Shopping,
    Health,
    Study,
}

impl Category {
    pub const ALL: [Category; 5] = [
        Category::Work,
        Category::Personal,
        Category::Shopping,
        Category::Health,
        Category::Study,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            Category::Work => "Work",
            Category::Personal => "Personal",
            Category::Shopping => "Shopping",
            Category::Health => "Health",
            Category::Study => "Study",
        }
    }
}

impl fmt::Display for Category {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Category {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        let trimmed = s.trim();
        Category::ALL
            .into_iter()
            .find(|c| c.as_str().eq_ignore_ascii_case(trimmed))
            .ok_or_else(|| {
                Error::InvalidArgument(format!(
                    "invalid category '{trimmed}' (expected Work|Personal|Shopping|Health|Study)"
                ))
            })
    }
}

/// A single to-do item.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Task {
    pub id: TaskId,
    pub text: String,
    #[serde(default)]
    pub completed: bool,
    #[serde(with = "crate::serde_utils::timestamp")]
    pub created_at: Timestamp,
    #[serde(
        default,
        with = "crate::serde_utils::optional_timestamp",
        skip_serializing_if = "Option::is_none"
    )]
    pub completed_at: Option<Timestamp>,
    #[serde(default)]
    pub priority: Priority,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub category: Option<Category>,
    #[serde(
        default,
        with = "crate::serde_utils::optional_due_date",
        skip_serializing_if = "Option::is_none"
    )]
    pub due_date: Option<Timestamp>,
    #[serde(default)]
    pub order: usize,
}

impl Task {
    /// Set the completion flag, keeping `completed_at` in step with it.
    pub fn set_completed(&mut self, completed: bool, now: Timestamp) {
        self.completed = completed;
        self.completed_at = if completed { Some(now) } else { None };
    }

    pub fn category_name(&self) -> &'static str {
        self.category.map(Category::as_str).unwrap_or(UNCATEGORIZED)
    }
}

/// Group label for tasks without a category.
pub const UNCATEGORIZED: &str = "Uncategorized";

/// Input for creating a task.
#[derive(Debug, Clone, Default)]
pub struct TaskDraft {
    pub text: String,
    pub priority: Priority,
    pub category: Option<Category>,
    pub due_date: Option<Timestamp>,
}

impl TaskDraft {
    pub fn new(text: impl Into<String>, priority: Priority) -> Self {
        Self {
            text: text.into(),
            priority,
            category: None,
            due_date: None,
        }
    }

    pub fn category(mut self, category: Category) -> Self {
        self.category = Some(category);
        self
    }

    pub fn due(mut self, due_date: Timestamp) -> Self {
        self.due_date = Some(due_date);
        self
    }
}

/// Field edits applied by `TaskManager::update`. `None` leaves a field as is;
/// `Some(None)` clears an optional field.
#[derive(Debug, Clone, Default)]
pub struct TaskPatch {
    pub text: Option<String>,
    pub priority: Option<Priority>,
    pub category: Option<Option<Category>>,
    pub due_date: Option<Option<Timestamp>>,
}

impl TaskPatch {
    pub fn is_empty(&self) -> bool {
        self.text.is_none()
            && self.priority.is_none()
            && self.category.is_none()
            && self.due_date.is_none()
    }
}

/// Aggregate figures derived from the collection on every read.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TaskStats {
    pub total: usize,
    pub completed: usize,
    pub pending: usize,
    pub completion_rate: u32,
    pub today_completed: usize,
    pub weekly_completed: usize,
    pub streak: u32,
    pub overdue: usize,
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Local, TimeZone};

    fn sample() -> Task {
        Task {
            id: TaskId(1_700_000_000_000),
            text: "Buy milk".to_string(),
            completed: false,
            created_at: Local.with_ymd_and_hms(2024, 3, 7, 9, 0, 0).unwrap(),
            completed_at: None,
            priority: Priority::High,
            category: Some(Category::Shopping),
            due_date: None,
            order: 0,
        }
    }

    #[test]
    fn serializes_camel_case_and_skips_absent_fields() {
        let value = serde_json::to_value(sample()).unwrap();
        assert_eq!(value["id"], 1_700_000_000_000u64);
        assert_eq!(value["priority"], "high");
        assert_eq!(value["category"], "Shopping");
        assert!(value.get("createdAt").is_some());
        assert!(value.get("completedAt").is_none());
        assert!(value.get("dueDate").is_none());
    }

    #[test]
    fn reads_legacy_shape() {
        let raw = r#"{
            "id": 1700000000000.25,
            "text": "Call mom",
            "completed": true,
            "createdAt": "07/03/2024, 09:00",
            "completedAt": "07/03/2024, 10:30",
            "priority": "low",
            "dueDate": "2024-03-08",
            "order": 3
        }"#;
        let task: Task = serde_json::from_str(raw).unwrap();
        assert_eq!(task.id, TaskId(1_700_000_000_000));
        assert!(task.completed);
        assert_eq!(
            task.completed_at,
            Some(Local.with_ymd_and_hms(2024, 3, 7, 10, 30, 0).unwrap())
        );
        assert_eq!(task.category, None);
        assert_eq!(task.category_name(), UNCATEGORIZED);
        assert_eq!(task.order, 3);
        assert!(task.due_date.is_some());
    }

    #[test]
    fn set_completed_tracks_timestamp() {
        let mut task = sample();
        let now = Local.with_ymd_and_hms(2024, 3, 8, 9, 0, 0).unwrap();
        task.set_completed(true, now);
        assert_eq!(task.completed_at, Some(now));
        task.set_completed(false, now);
        assert_eq!(task.completed_at, None);
    }

    #[test]
    fn parses_priority_and_category_case_insensitively() {
        assert_eq!("HIGH".parse::<Priority>().unwrap(), Priority::High);
        assert_eq!("study".parse::<Category>().unwrap(), Category::Study);
        assert!("urgent".parse::<Priority>().is_err());
        assert!("Errands".parse::<Category>().is_err());
    }
}
