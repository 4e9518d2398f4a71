//! Command-line configuration.
//!
//! # Responsibility
//! - Parse flags and environment fallbacks into one `Cli` value.
//! - Resolve the log directory to the absolute path logging requires.

use clap::{Args, Parser, Subcommand};
use std::path::{Path, PathBuf};
use uuid::Uuid;

const DEFAULT_DB_FILE_NAME: &str = "employees.sqlite3";

#[derive(Debug, Parser)]
#[command(name = "employee-cli", version, about = "Employee salary statistics")]
pub struct Cli {
    #[command(flatten)]
    pub storage: StorageArgs,

    #[command(flatten)]
    pub logging: LoggingArgs,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Debug, Args)]
pub struct StorageArgs {
    /// SQLite database file.
    #[arg(long = "db", env = "EMPLOYEE_DB", default_value = DEFAULT_DB_FILE_NAME)]
    pub db_path: PathBuf,

    /// Use a throwaway in-memory database; takes precedence over `--db`.
    #[arg(long)]
    pub memory: bool,
}

#[derive(Debug, Args)]
pub struct LoggingArgs {
    /// trace|debug|info|warn|error; defaults by build mode.
    #[arg(long, env = "EMPLOYEE_LOG_LEVEL")]
    pub log_level: Option<String>,

    /// Directory for rolling log files. Logging is off when unset.
    #[arg(long, env = "EMPLOYEE_LOG_DIR")]
    pub log_dir: Option<PathBuf>,
}

impl LoggingArgs {
    /// Absolute log directory, resolving relative paths against `cwd`.
    pub fn resolved_log_dir(&self, cwd: &Path) -> Option<PathBuf> {
        self.log_dir.as_ref().map(|dir| {
            if dir.is_absolute() {
                dir.clone()
            } else {
                cwd.join(dir)
            }
        })
    }
}

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Print count, min, average, max and sum of salaries.
    Stats {
        /// Also print statistics per record type.
        #[arg(long)]
        by_type: bool,
        #[arg(long)]
        json: bool,
    },
    /// List records by ascending salary.
    List {
        #[arg(long)]
        json: bool,
    },
    /// Add employees with random salaries.
    Add {
        #[arg(long, default_value_t = 1)]
        count: u32,
    },
    /// Delete records by id.
    Delete {
        #[arg(required = true)]
        ids: Vec<Uuid>,
    },
    /// Delete every record.
    Clear,
    /// Add three employees, print stats, clear, print stats again.
    Demo,
}
