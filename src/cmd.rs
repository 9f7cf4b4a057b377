//! Command implementations for the CLI interface.
//!
//! This module contains all the command handlers that implement the various
//! subcommands, from basic CRUD operations to the agenda view, category
//! browsing, settings management and the TUI launcher.

use std::io;
use std::path::Path;

use chrono::{Duration, Local, NaiveDateTime};
use clap::{CommandFactory, Subcommand, ValueEnum};
use clap_complete::{generate, Shell};

use crate::agenda::Agenda;
use crate::cli::Cli;
use crate::fields::*;
use crate::query;
use crate::settings::Settings;
use crate::store::*;
use crate::task::Task;
use crate::tui::run::run_tui;

#[derive(Subcommand)]
pub enum Commands {
    /// Launch the interactive UI interface.
    Ui,

    /// Add a new task.
    Add {
        /// Short title for the task.
        title: String,
        /// Optional longer description.
        #[arg(long)]
        desc: Option<String>,
        /// Due date: YYYY-MM-DD, "YYYY-MM-DD HH:MM", "today", "tomorrow", or "in Nd".
        #[arg(long)]
        due: Option<String>,
        /// Priority: low | medium | high | urgent.
        #[arg(long, value_enum, default_value_t = Priority::Medium)]
        priority: Priority,
        /// Category name. Defaults to "General".
        #[arg(long)]
        category: Option<String>,
        /// Reminder time, same formats as --due.
        #[arg(long)]
        remind: Option<String>,
        /// Mark the task recurring with this period: daily | weekly | monthly.
        #[arg(long, value_enum)]
        every: Option<RecurringType>,
    },

    /// List tasks with optional filters.
    List {
        /// Include completed tasks.
        #[arg(long)]
        all: bool,
        /// Show only completed tasks.
        #[arg(long)]
        completed: bool,
        /// Filter by category (exact match).
        #[arg(long)]
        category: Option<String>,
        /// Filter by priority.
        #[arg(long, value_enum)]
        priority: Option<Priority>,
        /// Only tasks due at exactly this time, same formats as --due.
        #[arg(long)]
        on: Option<String>,
        /// Only tasks due at or after this time.
        #[arg(long)]
        from: Option<String>,
        /// Only tasks due at or before this time.
        #[arg(long)]
        to: Option<String>,
        /// Limit number of rows printed.
        #[arg(long)]
        limit: Option<usize>,
    },

    /// Show overdue, due-today, upcoming and recently completed tasks.
    Agenda {
        /// Filter active tasks by a search string first.
        #[arg(long)]
        search: Option<String>,
    },

    /// View a single task by ID.
    View {
        /// Task ID to view.
        id: u64,
    },

    /// Update fields on a task.
    Update {
        /// Task ID to update.
        id: u64,
        #[arg(long)]
        title: Option<String>,
        #[arg(long)]
        desc: Option<String>,
        #[arg(long)]
        due: Option<String>,
        #[arg(long, value_enum)]
        priority: Option<Priority>,
        #[arg(long)]
        category: Option<String>,
        #[arg(long)]
        remind: Option<String>,
        /// Set the recurrence period (implies recurring).
        #[arg(long, value_enum)]
        every: Option<RecurringType>,
        /// Clear the due date.
        #[arg(long)]
        clear_due: bool,
        /// Clear the reminder.
        #[arg(long)]
        clear_remind: bool,
        /// Turn recurrence off and clear its period.
        #[arg(long)]
        not_recurring: bool,
    },

    /// Mark a task completed.
    Done {
        /// Task ID to complete.
        id: u64,
    },

    /// Reopen a completed task.
    Reopen {
        /// Task ID to reopen.
        id: u64,
    },

    /// Set the completion streak counter on a task.
    Streak {
        /// Task ID.
        id: u64,
        /// New streak value.
        count: i32,
    },

    /// Delete a task by ID.
    Delete {
        /// Task ID to delete.
        id: u64,
    },

    /// Delete all completed tasks.
    ClearCompleted,

    /// Search tasks by title or description.
    Search {
        /// Case-insensitive substring to look for.
        query: String,
    },

    /// List categories, or the tasks of one category.
    Categories {
        /// Category name to drill into.
        name: Option<String>,
    },

    /// List tasks whose reminder time has arrived.
    Reminders,

    /// List recurring tasks.
    Recurring,

    /// Show completed and overdue counts.
    Stats {
        /// Range start for the completed count (default: 7 days ago).
        #[arg(long)]
        from: Option<String>,
        /// Range end for the completed count (default: now).
        #[arg(long)]
        to: Option<String>,
    },

    /// Show or change user settings.
    Settings {
        #[command(subcommand)]
        action: SettingsAction,
    },

    /// Generate shell completion scripts.
    Completions {
        /// Shell to generate completions for.
        #[arg(value_enum)]
        shell: Shell,
    },
}

#[derive(Subcommand)]
pub enum SettingsAction {
    /// Show current settings.
    Show,
    /// Switch the dark theme on or off.
    Theme { state: Toggle },
    /// Switch reminder notifications on or off.
    Notifications { state: Toggle },
    /// Switch cloud backup on or off.
    Backup { state: Toggle },
    /// Set the daily notification time.
    Time {
        /// Hour, 0-23.
        hour: u32,
        /// Minute, 0-59.
        minute: u32,
    },
    /// Reset all settings to their defaults.
    Clear,
}

/// On/off switch for boolean settings.
#[derive(Debug, Clone, Copy, ValueEnum, PartialEq, Eq)]
pub enum Toggle {
    On,
    Off,
}

impl Toggle {
    fn as_bool(self) -> bool {
        self == Toggle::On
    }
}

/// Print tasks in a formatted table.
pub fn print_table(tasks: &[&Task]) {
    println!(
        "{:<5} {:<7} {:<8} {:<12} {:<14} {}",
        "ID", "Status", "Pri", "Due", "Category", "Title"
    );
    let today = Local::now().date_naive();
    for t in tasks {
        let status = if t.completed { "done" } else { "open" };
        println!(
            "{:<5} {:<7} {:<8} {:<12} {:<14} {}",
            t.id,
            status,
            format_priority(t.priority),
            format_due_relative(t.due, today),
            truncate(&t.category, 14),
            t.title
        );
    }
}

fn parse_when_or_exit(input: &str, what: &str) -> chrono::NaiveDateTime {
    match parse_when_input(input) {
        Some(dt) => dt,
        None => {
            eprintln!("Could not parse {what} '{input}'");
            std::process::exit(1);
        }
    }
}

fn save_or_exit(store: &TaskStore, path: &Path) {
    if let Err(e) = store.save(path) {
        eprintln!("Failed to save tasks: {e}");
        std::process::exit(1);
    }
}

/// Launch the terminal user interface.
pub fn cmd_ui(store_path: &Path, settings_path: &Path) {
    if let Err(e) = run_tui(store_path, settings_path) {
        eprintln!("UI error: {e}");
        std::process::exit(1);
    }
}

/// Add a new task to the store.
pub fn cmd_add(
    store: &mut TaskStore,
    path: &Path,
    title: String,
    desc: Option<String>,
    due: Option<String>,
    priority: Priority,
    category: Option<String>,
    remind: Option<String>,
    every: Option<RecurringType>,
) {
    if title.trim().is_empty() {
        eprintln!("Title cannot be empty");
        std::process::exit(1);
    }

    let mut task = Task::new(title.trim());
    task.description = desc.unwrap_or_default().trim().to_string();
    task.due = due.map(|s| parse_when_or_exit(&s, "due date"));
    task.priority = priority;
    if let Some(c) = category {
        let c = c.trim();
        if !c.is_empty() {
            task.category = c.to_string();
        }
    }
    task.reminder = remind.map(|s| parse_when_or_exit(&s, "reminder time"));
    task.recurring = every.is_some();
    task.recurring_type = every;

    let id = store.insert(task);
    save_or_exit(store, path);
    println!("Added task {}", id);
}

/// List tasks with optional filtering.
#[allow(clippy::too_many_arguments)]
pub fn cmd_list(
    store: &TaskStore,
    all: bool,
    completed: bool,
    category: Option<String>,
    priority: Option<Priority>,
    on: Option<String>,
    from: Option<String>,
    to: Option<String>,
    limit: Option<usize>,
) {
    let mut tasks: Vec<&Task> = if completed {
        query::completed(store)
    } else if all {
        query::all(store)
    } else if let Some(ref s) = on {
        query::by_date(store, parse_when_or_exit(s, "date"))
    } else if from.is_some() || to.is_some() {
        let start = from
            .as_ref()
            .map(|s| parse_when_or_exit(s, "range start"))
            .unwrap_or(NaiveDateTime::MIN);
        let end = to
            .as_ref()
            .map(|s| parse_when_or_exit(s, "range end"))
            .unwrap_or(NaiveDateTime::MAX);
        query::by_date_range(store, start, end)
    } else if let Some(ref c) = category {
        query::by_category(store, c)
    } else if let Some(p) = priority {
        query::by_priority(store, p)
    } else {
        query::active(store)
    };

    // Secondary filters narrow the chosen listing without reordering it.
    if let Some(ref c) = category {
        tasks.retain(|t| &t.category == c);
    }
    if let Some(p) = priority {
        tasks.retain(|t| t.priority == p);
    }
    if let Some(n) = limit {
        tasks.truncate(n);
    }
    print_table(&tasks);
}

/// Show the agenda groupings: overdue, today, upcoming, recently completed.
pub fn cmd_agenda(store: &TaskStore, search: Option<String>) {
    let now = Local::now().naive_local();
    let active = query::active(store);
    let completed = query::completed(store);
    let filter = search.unwrap_or_default();
    let agenda = Agenda::build(&active, &completed, now, &filter);

    let sections: [(&str, &[&Task]); 4] = [
        ("Overdue", &agenda.overdue),
        ("Due today", &agenda.today),
        ("Upcoming", &agenda.upcoming),
        ("Recently completed", &agenda.recent_completed),
    ];
    for (name, tasks) in sections {
        println!("== {} ({}) ==", name, tasks.len());
        if tasks.is_empty() {
            println!("  -");
        } else {
            print_table(tasks);
        }
        println!();
    }
}

/// View detailed information about a specific task.
pub fn cmd_view(store: &TaskStore, id: u64) {
    let Some(task) = store.get(id) else {
        eprintln!("Task {} not found.", id);
        std::process::exit(1);
    };
    let today = Local::now().date_naive();
    println!("ID:         {}", task.id);
    println!("Title:      {}", task.title);
    println!("Status:     {}", if task.completed { "done" } else { "open" });
    println!("Priority:   {}", format_priority(task.priority));
    println!("Category:   {}", task.category);
    println!(
        "Due:        {}",
        match task.due {
            Some(d) => format!("{} ({})", d.format("%Y-%m-%d %H:%M"), format_due_relative(Some(d), today)),
            None => "-".into(),
        }
    );
    println!("Reminder:   {}", format_datetime(task.reminder));
    println!("Recurring:  {}", format_recurring(task.recurring_type.filter(|_| task.recurring)));
    println!("Streak:     {}", task.streak);
    println!("Created:    {}", task.created_at.format("%Y-%m-%d %H:%M"));
    println!("Description:\n{}", if task.description.is_empty() { "-" } else { &task.description });
}

/// Update an existing task's fields.
#[allow(clippy::too_many_arguments)]
pub fn cmd_update(
    store: &mut TaskStore,
    path: &Path,
    id: u64,
    title: Option<String>,
    desc: Option<String>,
    due: Option<String>,
    priority: Option<Priority>,
    category: Option<String>,
    remind: Option<String>,
    every: Option<RecurringType>,
    clear_due: bool,
    clear_remind: bool,
    not_recurring: bool,
) {
    let Some(task) = store.get(id) else {
        eprintln!("Task {} not found.", id);
        std::process::exit(1);
    };
    let mut task = task.clone();

    if let Some(t) = title {
        if t.trim().is_empty() {
            eprintln!("Title cannot be empty");
            std::process::exit(1);
        }
        task.title = t.trim().to_string();
    }
    if let Some(d) = desc {
        task.description = d.trim().to_string();
    }
    if let Some(s) = due {
        task.due = Some(parse_when_or_exit(&s, "due date"));
    }
    if clear_due {
        task.due = None;
    }
    if let Some(p) = priority {
        task.priority = p;
    }
    if let Some(c) = category {
        let c = c.trim();
        task.category = if c.is_empty() { "General".to_string() } else { c.to_string() };
    }
    if let Some(s) = remind {
        task.reminder = Some(parse_when_or_exit(&s, "reminder time"));
    }
    if clear_remind {
        task.reminder = None;
    }
    if let Some(r) = every {
        task.recurring = true;
        task.recurring_type = Some(r);
    }
    if not_recurring {
        task.recurring = false;
        task.recurring_type = None;
    }

    store.replace(task);
    save_or_exit(store, path);
    println!("Updated task {}", id);
}

/// Set a task's completion flag and save.
pub fn cmd_set_completed(store: &mut TaskStore, path: &Path, id: u64, completed: bool) {
    if !store.set_completed(id, completed) {
        eprintln!("Task {} not found.", id);
        std::process::exit(1);
    }
    save_or_exit(store, path);
    println!("{} task {}", if completed { "Completed" } else { "Reopened" }, id);
}

/// Set a task's streak counter and save.
pub fn cmd_streak(store: &mut TaskStore, path: &Path, id: u64, count: i32) {
    if !store.set_streak(id, count) {
        eprintln!("Task {} not found.", id);
        std::process::exit(1);
    }
    save_or_exit(store, path);
    println!("Set streak of task {} to {}", id, count);
}

/// Delete a task by ID.
pub fn cmd_delete(store: &mut TaskStore, path: &Path, id: u64) {
    if !store.remove(id) {
        eprintln!("Task {} not found.", id);
        std::process::exit(1);
    }
    save_or_exit(store, path);
    println!("Deleted task {}", id);
}

/// Delete all completed tasks.
pub fn cmd_clear_completed(store: &mut TaskStore, path: &Path) {
    let removed = store.remove_completed();
    save_or_exit(store, path);
    println!("Deleted {} completed task(s)", removed);
}

/// Search tasks by title or description.
pub fn cmd_search(store: &TaskStore, text: String) {
    print_table(&query::search(store, &text));
}

/// List distinct categories with counts, or the tasks of one category.
pub fn cmd_categories(store: &TaskStore, name: Option<String>) {
    match name {
        Some(name) => {
            let tasks = query::by_category(store, &name);
            if tasks.is_empty() {
                println!("No tasks in category '{}'", name);
            } else {
                print_table(&tasks);
            }
        }
        None => {
            for cat in query::categories(store) {
                let count = store.tasks.iter().filter(|t| t.category == cat).count();
                println!("{:<20} {}", cat, count);
            }
        }
    }
}

/// List tasks whose reminder time has arrived, honoring the notification setting.
pub fn cmd_reminders(store: &TaskStore, settings: &Settings) {
    if !settings.notifications_enabled() {
        println!("Notifications are disabled in settings.");
        return;
    }
    let now = Local::now().naive_local();
    let due = query::reminders_due(store, now);
    if due.is_empty() {
        println!("No reminders due.");
        return;
    }
    for t in due {
        println!("{:<5} {:<16} {}", t.id, format_datetime(t.reminder), t.title);
    }
}

/// List recurring tasks with their periods.
pub fn cmd_recurring(store: &TaskStore) {
    let today = Local::now().date_naive();
    for t in query::recurring(store) {
        println!(
            "{:<5} {:<8} {:<12} streak {:<4} {}",
            t.id,
            format_recurring(t.recurring_type),
            format_due_relative(t.due, today),
            t.streak,
            t.title
        );
    }
}

/// Show completed-in-range and overdue counts.
pub fn cmd_stats(store: &TaskStore, from: Option<String>, to: Option<String>) {
    let now = Local::now().naive_local();
    let start = match from {
        Some(s) => parse_when_or_exit(&s, "range start"),
        None => now - Duration::days(7),
    };
    let end = match to {
        Some(s) => parse_when_or_exit(&s, "range end"),
        None => now,
    };
    println!(
        "Completed between {} and {}: {}",
        start.format("%Y-%m-%d %H:%M"),
        end.format("%Y-%m-%d %H:%M"),
        query::completed_count(store, start, end)
    );
    println!("Overdue now: {}", query::overdue_count(store, now));
}

/// Show or change user settings.
pub fn cmd_settings(settings: &mut Settings, path: &Path, action: SettingsAction) {
    match action {
        SettingsAction::Show => {
            let (hour, minute) = settings.notification_time();
            println!("dark_theme:            {}", settings.dark_theme());
            println!("notifications_enabled: {}", settings.notifications_enabled());
            println!("cloud_backup_enabled:  {}", settings.cloud_backup_enabled());
            println!("notification_time:     {:02}:{:02}", hour, minute);
            return;
        }
        SettingsAction::Theme { state } => settings.dark_theme = Some(state.as_bool()),
        SettingsAction::Notifications { state } => {
            settings.notifications_enabled = Some(state.as_bool())
        }
        SettingsAction::Backup { state } => {
            settings.cloud_backup_enabled = Some(state.as_bool())
        }
        SettingsAction::Time { hour, minute } => {
            if let Err(e) = settings.set_notification_time(hour, minute) {
                eprintln!("{e}");
                std::process::exit(1);
            }
        }
        SettingsAction::Clear => settings.clear(),
    }
    if let Err(e) = settings.save(path) {
        eprintln!("Failed to save settings: {e}");
        std::process::exit(1);
    }
    println!("Settings updated");
}

/// Generate shell completion scripts.
pub fn cmd_completions(shell: Shell) {
    let mut cmd = Cli::command();
    generate(shell, &mut cmd, "qt", &mut io::stdout());
}
