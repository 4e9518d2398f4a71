//! Employee salary store command-line front end.
//!
//! # Responsibility
//! - Render the statistics block and the sorted employee list.
//! - Invoke add / delete / delete-all on the store.
//!
//! # Invariants
//! - A failed add or delete-by-id ends the process with a non-zero status.
//! - Statistics and clear never fail the process; the store degrades them.

mod config;
mod render;

use clap::Parser;
use config::{Cli, Command};
use employee_core::db::{open_db, open_db_in_memory};
use employee_core::{
    default_log_level, init_logging, EmployeeStore, LogSettings, RecordBackend, SqliteRecordBackend,
    StoreResult,
};
use log::error;
use std::collections::HashSet;
use std::process::ExitCode;

const DEMO_EMPLOYEE_COUNT: usize = 3;

fn main() -> ExitCode {
    let cli = Cli::parse();

    if let Err(message) = start_logging(&cli) {
        eprintln!("error: {message}");
        return ExitCode::from(2);
    }

    let opened = if cli.storage.memory {
        open_db_in_memory()
    } else {
        open_db(&cli.storage.db_path)
    };
    let conn = match opened {
        Ok(conn) => conn,
        Err(err) => {
            eprintln!("error: cannot open database: {err}");
            return ExitCode::FAILURE;
        }
    };

    let store = EmployeeStore::new(SqliteRecordBackend::new(&conn));
    match run(&store, cli.command) {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            error!("event=cli_command module=cli status=error error={err}");
            eprintln!("error: {err}");
            ExitCode::FAILURE
        }
    }
}

fn start_logging(cli: &Cli) -> Result<(), String> {
    let cwd = std::env::current_dir().map_err(|err| err.to_string())?;
    let Some(log_dir) = cli.logging.resolved_log_dir(&cwd) else {
        return Ok(());
    };
    let level = cli
        .logging
        .log_level
        .as_deref()
        .unwrap_or(default_log_level());

    let settings = LogSettings::parse(level, log_dir).map_err(|err| err.to_string())?;
    init_logging(settings).map_err(|err| err.to_string())
}

fn run<B: RecordBackend>(store: &EmployeeStore<B>, command: Command) -> StoreResult<()> {
    match command {
        Command::Stats { by_type, json } => {
            let groups = if by_type {
                store.summary_by_type()
            } else {
                Vec::new()
            };
            if json {
                println!("{}", render::stats_json(&store.summary(), &groups));
            } else {
                print!("{}", render::stats_table(&store.summary()));
                for (kind, summary) in &groups {
                    println!();
                    println!("[{kind}]");
                    print!("{}", render::stats_table(summary));
                }
            }
        }
        Command::List { json } => {
            let employees = store.list_all()?;
            if json {
                println!("{}", render::employees_json(&employees));
            } else {
                print!("{}", render::employee_lines(&employees));
            }
        }
        Command::Add { count } => {
            for _ in 0..count {
                let employee = store.add_employee()?;
                println!("{}", employee.id);
            }
        }
        Command::Delete { ids } => {
            let ids: HashSet<_> = ids.into_iter().collect();
            store.delete_employees(&ids)?;
        }
        Command::Clear => store.delete_all(),
        Command::Demo => {
            for _ in 0..DEMO_EMPLOYEE_COUNT {
                store.add_employee()?;
            }
            print!("{}", render::stats_table(&store.summary()));
            print!("{}", render::employee_lines(&store.list_all()?));
            store.delete_all();
            println!();
            print!("{}", render::stats_table(&store.summary()));
        }
    }
    Ok(())
}
