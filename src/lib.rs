//! tasklist - Personal Task-List Library
//!
//! This library provides the task collection behind the `tasklist` CLI:
//! creating, prioritizing, categorizing, completing and reordering tasks,
//! with derived statistics and JSON import/export.
//!
//! # Core Concepts
//!
//! - **Tasks**: text, priority, optional category and due date, completion
//!   state and a manual position
//! - **Task Manager**: owns the collection and persists every change as one
//!   write to a [`store::Store`]
//! - **Derived views**: display order, category groups, filters, streaks and
//!   stats, recomputed from the collection on demand
//!
//! # Module Organization
//!
//! - `cli`: Command-line interface using clap
//! - `config`: Configuration loading from `config.toml`
//! - `error`: Error types and result aliases
//! - `model`: Task, priority, category and stats types
//! - `manager`: The task collection and its operations
//! - `derive`: Sorting, grouping, filtering and streaks
//! - `validation`: Task text rules
//! - `dates`: Date formatting and calendar helpers
//! - `store`: Key-value records on disk or in memory
//! - `lock`: File locking and atomic writes
//! - `transfer`: JSON export and import
//! - `theme`: Light/dark preference
//! - `output`: Human and JSON output envelopes

pub mod cli;
pub mod config;
pub mod dates;
pub mod derive;
pub mod error;
pub mod lock;
pub mod manager;
pub mod model;
pub mod output;
pub mod store;
pub mod theme;
pub mod transfer;
pub mod validation;

mod serde_utils;

pub use error::{Error, Result};
pub use manager::TaskManager;
pub use model::{Category, Priority, Task, TaskDraft, TaskId, TaskPatch, TaskStats};
