//! Command-line interface for taskmaster
//!
//! This module defines the CLI structure using clap derive macros.
//! Command implementations live in submodules.

use std::path::{Path, PathBuf};

use clap::{Parser, Subcommand};

use crate::config::{self, Config};
use crate::error::{Error, Result};
use crate::session::SessionScope;
use crate::storage::FileStorage;
use crate::store::{SeedOutcome, TaskStore};

mod dashboard;
mod init;
mod task;

/// taskmaster - track tasks from the terminal
///
/// List, create, edit, delete and filter tasks, and view aggregate
/// statistics. Tasks are stored locally in the data directory.
#[derive(Parser, Debug)]
#[command(name = "taskmaster")]
#[command(author, version, about, long_about = None)]
#[command(propagate_version = true)]
pub struct Cli {
    /// Data directory holding tasks and taskmaster.toml
    #[arg(long, global = true, env = "TASKMASTER_DIR")]
    pub data_dir: Option<PathBuf>,

    /// Output in JSON format
    #[arg(long, global = true)]
    pub json: bool,

    /// Suppress non-essential output
    #[arg(short, long, global = true)]
    pub quiet: bool,

    /// Enable verbose output
    #[arg(short, long, global = true)]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Commands,
}

/// Available subcommands
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Create the data directory and seed sample tasks if it is empty
    Init,

    /// List tasks, optionally filtered
    List {
        /// Status filter: all, todo, in-progress, completed
        #[arg(long)]
        status: Option<String>,

        /// Priority filter: all, low, medium, high
        #[arg(long)]
        priority: Option<String>,

        /// Case-insensitive text matched against title and description
        #[arg(short, long)]
        search: Option<String>,
    },

    /// Show one task
    Show {
        /// Task ID or unique prefix
        id: String,
    },

    /// Create a task
    New {
        /// Task title (3-100 characters)
        title: String,

        /// Longer description (up to 500 characters)
        #[arg(short, long)]
        description: Option<String>,

        /// Status: todo, in-progress, completed
        #[arg(long)]
        status: Option<String>,

        /// Priority: low, medium, high
        #[arg(short, long)]
        priority: Option<String>,

        /// Due date (YYYY-MM-DD), today or later
        #[arg(long)]
        due: Option<String>,

        /// Person responsible
        #[arg(short, long)]
        assignee: Option<String>,
    },

    /// Edit fields of a task; omitted fields are kept
    Edit {
        /// Task ID or unique prefix
        id: String,

        /// New title
        #[arg(long)]
        title: Option<String>,

        /// New description
        #[arg(short, long, conflicts_with = "clear_description")]
        description: Option<String>,

        /// New status
        #[arg(long)]
        status: Option<String>,

        /// New priority
        #[arg(short, long)]
        priority: Option<String>,

        /// New due date (YYYY-MM-DD)
        #[arg(long, conflicts_with = "clear_due")]
        due: Option<String>,

        /// New assignee
        #[arg(short, long, conflicts_with = "clear_assignee")]
        assignee: Option<String>,

        /// Remove the description
        #[arg(long)]
        clear_description: bool,

        /// Remove the due date
        #[arg(long)]
        clear_due: bool,

        /// Remove the assignee
        #[arg(long)]
        clear_assignee: bool,
    },

    /// Delete a task
    Delete {
        /// Task ID or unique prefix
        id: String,

        /// Skip the confirmation prompt
        #[arg(short, long)]
        yes: bool,
    },

    /// Show task counts
    Stats,

    /// Overview: counts, recent tasks and open high-priority tasks
    Dashboard,
}

/// Everything a command needs: the active session over the data directory
pub(crate) struct Context {
    pub data_dir: PathBuf,
    pub seed: SeedOutcome,
    pub session: SessionScope<FileStorage>,
}

/// Open the data directory, seed it on first run, and load the tasks.
pub(crate) fn load_context(data_dir: Option<PathBuf>) -> Result<Context> {
    let data_dir = resolve_data_dir(data_dir)?;
    std::fs::create_dir_all(&data_dir)?;
    let config = Config::load_from_dir(&data_dir);

    let storage = FileStorage::new(&data_dir).with_lock_timeout(config.storage.lock_timeout_ms);
    let store = TaskStore::with_config(storage, &config);
    let seed = store.initialize()?;

    let mut session = SessionScope::new();
    session.enter(store)?.fetch_all()?;

    Ok(Context {
        data_dir,
        seed,
        session,
    })
}

fn resolve_data_dir(data_dir: Option<PathBuf>) -> Result<PathBuf> {
    match data_dir {
        Some(dir) => Ok(dir),
        None => config::default_data_dir().ok_or_else(|| {
            Error::InvalidArgument(
                "no home directory found; pass --data-dir or set TASKMASTER_DIR".to_string(),
            )
        }),
    }
}

pub(crate) fn display_path(path: &Path) -> String {
    path.display().to_string()
}

impl Cli {
    /// Execute the CLI command
    pub fn run(self) -> Result<()> {
        match self.command {
            Commands::Init => init::run(init::InitOptions {
                data_dir: self.data_dir,
                json: self.json,
                quiet: self.quiet,
            }),
            Commands::List {
                status,
                priority,
                search,
            } => task::run_list(task::ListOptions {
                status,
                priority,
                search,
                data_dir: self.data_dir,
                json: self.json,
                quiet: self.quiet,
            }),
            Commands::Show { id } => task::run_show(task::ShowOptions {
                id,
                data_dir: self.data_dir,
                json: self.json,
                quiet: self.quiet,
            }),
            Commands::New {
                title,
                description,
                status,
                priority,
                due,
                assignee,
            } => task::run_new(task::NewOptions {
                title,
                description,
                status,
                priority,
                due,
                assignee,
                data_dir: self.data_dir,
                json: self.json,
                quiet: self.quiet,
            }),
            Commands::Edit {
                id,
                title,
                description,
                status,
                priority,
                due,
                assignee,
                clear_description,
                clear_due,
                clear_assignee,
            } => task::run_edit(task::EditOptions {
                id,
                title,
                description,
                status,
                priority,
                due,
                assignee,
                clear_description,
                clear_due,
                clear_assignee,
                data_dir: self.data_dir,
                json: self.json,
                quiet: self.quiet,
            }),
            Commands::Delete { id, yes } => task::run_delete(task::DeleteOptions {
                id,
                yes,
                data_dir: self.data_dir,
                json: self.json,
                quiet: self.quiet,
            }),
            Commands::Stats => dashboard::run_stats(dashboard::StatsOptions {
                data_dir: self.data_dir,
                json: self.json,
                quiet: self.quiet,
            }),
            Commands::Dashboard => dashboard::run_dashboard(dashboard::DashboardOptions {
                data_dir: self.data_dir,
                json: self.json,
                quiet: self.quiet,
            }),
        }
    }
}
