//! Command-line interface for tasklist
//!
//! This module defines the CLI structure using clap derive macros.
//! Commands are grouped by concern into submodules.

use std::path::PathBuf;

use clap::{Parser, Subcommand};
use directories::ProjectDirs;

use crate::config::Config;
use crate::error::{Error, Result};
use crate::manager::TaskManager;
use crate::store::FileStore;

mod task;
mod theme;
mod transfer;

/// tasklist - a personal task list
///
/// Create, prioritize, categorize and complete tasks, track streaks, and
/// move the list between machines as JSON.
#[derive(Parser, Debug)]
#[command(name = "tasklist")]
#[command(author, version, about, long_about = None)]
#[command(propagate_version = true)]
pub struct Cli {
    /// Directory holding the task records and config.toml
    #[arg(long, global = true, env = "TASKLIST_DIR")]
    pub data_dir: Option<PathBuf>,

    /// Output in JSON format
    #[arg(long, global = true)]
    pub json: bool,

    /// Suppress non-essential output
    #[arg(short, long, global = true)]
    pub quiet: bool,

    /// Enable debug logging for tasklist (RUST_LOG takes precedence)
    #[arg(short, long, global = true)]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Commands,
}

/// Available subcommands
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Add a new task
    Add {
        /// Task description (at least 3 characters, not only digits)
        text: String,

        /// Priority: low, medium, high (defaults to tasks.default_priority)
        #[arg(short, long)]
        priority: Option<String>,

        /// Category: Work, Personal, Shopping, Health, Study
        #[arg(short, long)]
        category: Option<String>,

        /// Due date (YYYY-MM-DD or RFC 3339)
        #[arg(short, long)]
        due: Option<String>,
    },

    /// List tasks
    #[command(alias = "ls")]
    List {
        /// Case-insensitive text search
        #[arg(short, long)]
        search: Option<String>,

        /// Status filter: all, pending, completed
        #[arg(short, long, default_value = "all")]
        filter: String,

        /// Group by category
        #[arg(short, long)]
        group: bool,

        /// Keep stored (manual) order instead of status/priority order
        #[arg(long)]
        manual: bool,
    },

    /// Show one task
    Show {
        /// Task ID
        id: String,
    },

    /// Edit a task
    Edit {
        /// Task ID
        id: String,

        /// New description
        #[arg(long)]
        text: Option<String>,

        /// New priority
        #[arg(short, long)]
        priority: Option<String>,

        /// New category
        #[arg(short, long, conflicts_with = "no_category")]
        category: Option<String>,

        /// Remove the category
        #[arg(long)]
        no_category: bool,

        /// New due date
        #[arg(short, long, conflicts_with = "no_due")]
        due: Option<String>,

        /// Remove the due date
        #[arg(long)]
        no_due: bool,
    },

    /// Flip a task between pending and completed
    Toggle {
        /// Task ID
        id: String,
    },

    /// Mark tasks completed
    #[command(alias = "done")]
    Complete {
        /// Task IDs
        #[arg(required = true)]
        ids: Vec<String>,
    },

    /// Mark tasks pending again
    Reopen {
        /// Task IDs
        #[arg(required = true)]
        ids: Vec<String>,
    },

    /// Delete tasks
    Rm {
        /// Task IDs
        #[arg(required = true)]
        ids: Vec<String>,
    },

    /// Delete every task
    Clear {
        /// Confirm deleting all tasks
        #[arg(long)]
        yes: bool,
    },

    /// Move a task to a position in the stored order
    Move {
        /// Task ID
        id: String,

        /// Zero-based target position; past the end moves it last
        index: usize,
    },

    /// Show completion statistics
    Stats,

    /// Export tasks to a JSON file
    Export {
        /// Output file (defaults to <prefix>-YYYY-MM-DD.json in the current directory)
        #[arg(short, long)]
        output: Option<PathBuf>,
    },

    /// Import tasks from a JSON file, appending them to the list
    Import {
        /// File written by `tasklist export`, or a bare task array
        path: PathBuf,
    },

    /// Show or change the theme preference
    Theme {
        /// show, toggle, dark or light
        #[arg(default_value = "show")]
        action: String,
    },
}

impl Cli {
    /// Execute the CLI command
    pub fn run(self) -> Result<()> {
        let data_dir = self.data_dir;
        let json = self.json;
        let quiet = self.quiet;

        match self.command {
            Commands::Add {
                text,
                priority,
                category,
                due,
            } => task::run_add(task::AddOptions {
                text,
                priority,
                category,
                due,
                data_dir,
                json,
                quiet,
            }),
            Commands::List {
                search,
                filter,
                group,
                manual,
            } => task::run_list(task::ListOptions {
                search,
                filter,
                group,
                manual,
                data_dir,
                json,
                quiet,
            }),
            Commands::Show { id } => task::run_show(task::ShowOptions {
                id,
                data_dir,
                json,
                quiet,
            }),
            Commands::Edit {
                id,
                text,
                priority,
                category,
                no_category,
                due,
                no_due,
            } => task::run_edit(task::EditOptions {
                id,
                text,
                priority,
                category,
                no_category,
                due,
                no_due,
                data_dir,
                json,
                quiet,
            }),
            Commands::Toggle { id } => task::run_toggle(task::ToggleOptions {
                id,
                data_dir,
                json,
                quiet,
            }),
            Commands::Complete { ids } => task::run_set_completed(task::SetCompletedOptions {
                ids,
                completed: true,
                data_dir,
                json,
                quiet,
            }),
            Commands::Reopen { ids } => task::run_set_completed(task::SetCompletedOptions {
                ids,
                completed: false,
                data_dir,
                json,
                quiet,
            }),
            Commands::Rm { ids } => task::run_rm(task::RmOptions {
                ids,
                data_dir,
                json,
                quiet,
            }),
            Commands::Clear { yes } => task::run_clear(task::ClearOptions {
                yes,
                data_dir,
                json,
                quiet,
            }),
            Commands::Move { id, index } => task::run_move(task::MoveOptions {
                id,
                index,
                data_dir,
                json,
                quiet,
            }),
            Commands::Stats => task::run_stats(task::StatsOptions {
                data_dir,
                json,
                quiet,
            }),
            Commands::Export { output } => transfer::run_export(transfer::ExportOptions {
                output,
                data_dir,
                json,
                quiet,
            }),
            Commands::Import { path } => transfer::run_import(transfer::ImportOptions {
                path,
                data_dir,
                json,
                quiet,
            }),
            Commands::Theme { action } => theme::run(theme::ThemeOptions {
                action,
                data_dir,
                json,
                quiet,
            }),
        }
    }
}

/// Configuration and file store for one invocation.
pub(crate) struct Context {
    pub config: Config,
    pub store: FileStore,
}

impl Context {
    pub fn into_manager(self) -> (TaskManager<FileStore>, Config) {
        let manager = TaskManager::open(self.store, &self.config);
        (manager, self.config)
    }
}

/// `--data-dir` / `TASKLIST_DIR` when given, else the platform data directory.
pub(crate) fn resolve_data_dir(explicit: Option<PathBuf>) -> Result<PathBuf> {
    if let Some(dir) = explicit {
        return Ok(dir);
    }
    ProjectDirs::from("", "", "tasklist")
        .map(|dirs| dirs.data_dir().to_path_buf())
        .ok_or_else(|| {
            Error::OperationFailed(
                "could not determine a data directory; pass --data-dir".to_string(),
            )
        })
}

pub(crate) fn load_context(data_dir: Option<PathBuf>) -> Result<Context> {
    let data_dir = resolve_data_dir(data_dir)?;
    let config = Config::load_from_dir(&data_dir);
    let store = FileStore::new(&data_dir).with_lock_timeout(config.storage.lock_timeout_ms);
    tracing::debug!(data_dir = %data_dir.display(), "context loaded");
    Ok(Context {
        config,
        store,
    })
}
