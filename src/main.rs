//! # QT - QuickTasks CLI
//!
//! A personal task manager for the terminal: due dates, priorities,
//! categories, reminders and recurring-task metadata, with a quick-glance
//! agenda and an optional interactive TUI.
//!
//! ## Key Features
//!
//! - **Agenda view**: overdue, due-today, upcoming and recently completed
//!   tasks at a glance, with free-text filtering
//! - **Rich Task Metadata**: priority, category, reminder time, recurrence
//!   period and a completion streak counter
//! - **Multiple Interfaces**: full CLI for automation + interactive TUI
//! - **Local File Storage**: a simple JSON file per machine, written
//!   atomically; settings live in a second small JSON file
//!
//! ## Quick Start
//!
//! ```bash
//! # Add a task
//! qt add "Pay rent" --due "2024-01-01 23:59" --priority high --category Home
//!
//! # See what matters right now
//! qt agenda
//!
//! # Launch the interactive UI
//! qt ui
//!
//! # Complete a task
//! qt done 3
//! ```
//!
//! Data is stored locally in `~/.quicktasks/` (`tasks.json` and
//! `settings.json`). Pass `--db` to use a different tasks file.

use std::path::{Path, PathBuf};

use clap::Parser;

pub mod agenda;
pub mod cli;
pub mod cmd;
pub mod fields;
pub mod query;
pub mod settings;
pub mod store;
pub mod task;
pub mod tui {
    pub mod app;
    pub mod colors;
    pub mod enums;
    pub mod input;
    pub mod run;
    pub mod task_form;
    pub mod utils;
}

use cli::Cli;
use cmd::*;
use settings::Settings;
use store::TaskStore;

fn main() {
    let cli = Cli::parse();

    let store_path = cli.db.unwrap_or_else(|| {
        let home = std::env::var("HOME").unwrap_or_else(|_| ".".to_string());
        let data_dir = PathBuf::from(home).join(".quicktasks");
        if let Err(e) = std::fs::create_dir_all(&data_dir) {
            eprintln!("Failed to create data directory {}: {}", data_dir.display(), e);
            std::process::exit(1);
        }
        data_dir.join("tasks.json")
    });
    let settings_path = store_path
        .parent()
        .unwrap_or_else(|| Path::new("."))
        .join("settings.json");

    // Commands that don't touch the task store.
    let command = match cli.command {
        Commands::Ui => {
            cmd_ui(&store_path, &settings_path);
            return;
        }
        Commands::Completions { shell } => {
            cmd_completions(shell);
            return;
        }
        Commands::Settings { action } => {
            let mut settings = Settings::load(&settings_path);
            cmd_settings(&mut settings, &settings_path, action);
            return;
        }
        command => command,
    };

    let mut store = TaskStore::load(&store_path);

    match command {
        Commands::Ui | Commands::Completions { .. } | Commands::Settings { .. } => {
            unreachable!("handled above")
        }

        Commands::Add { title, desc, due, priority, category, remind, every } => {
            cmd_add(&mut store, &store_path, title, desc, due, priority, category, remind, every)
        }

        Commands::List { all, completed, category, priority, on, from, to, limit } => {
            cmd_list(&store, all, completed, category, priority, on, from, to, limit)
        }

        Commands::Agenda { search } => cmd_agenda(&store, search),

        Commands::View { id } => cmd_view(&store, id),

        Commands::Update {
            id, title, desc, due, priority, category, remind, every,
            clear_due, clear_remind, not_recurring,
        } => cmd_update(
            &mut store, &store_path, id, title, desc, due, priority, category, remind,
            every, clear_due, clear_remind, not_recurring,
        ),

        Commands::Done { id } => cmd_set_completed(&mut store, &store_path, id, true),

        Commands::Reopen { id } => cmd_set_completed(&mut store, &store_path, id, false),

        Commands::Streak { id, count } => cmd_streak(&mut store, &store_path, id, count),

        Commands::Delete { id } => cmd_delete(&mut store, &store_path, id),

        Commands::ClearCompleted => cmd_clear_completed(&mut store, &store_path),

        Commands::Search { query } => cmd_search(&store, query),

        Commands::Categories { name } => cmd_categories(&store, name),

        Commands::Reminders => {
            let settings = Settings::load(&settings_path);
            cmd_reminders(&store, &settings)
        }

        Commands::Recurring => cmd_recurring(&store),

        Commands::Stats { from, to } => cmd_stats(&store, from, to),
    }
}
