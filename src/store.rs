//! Task record store and date utility functions.
//!
//! This module provides the `TaskStore` struct that owns all persisted task
//! records, plus helpers for parsing human-readable due input and formatting
//! dates for display. Storage is a single JSON file written atomically via
//! temp file + rename.

use std::fs::{self, File};
use std::io::{Read, Write};
use std::path::Path;

use chrono::{Datelike, Duration, Local, NaiveDate, NaiveDateTime, NaiveTime};
use serde::{Deserialize, Serialize};

use crate::task::Task;

/// In-memory store for task records, backed by a JSON file.
#[derive(Debug, Default, Serialize, Deserialize)]
pub struct TaskStore {
    pub tasks: Vec<Task>,
}

impl TaskStore {
    /// Load the store from a JSON file, starting empty if the file doesn't exist.
    pub fn load(path: &Path) -> Self {
        if !path.exists() {
            return TaskStore::default();
        }
        let mut buf = String::new();
        match File::open(path).and_then(|mut f| f.read_to_string(&mut buf)) {
            Ok(_) => match serde_json::from_str(&buf) {
                Ok(store) => store,
                Err(e) => {
                    eprintln!("Error parsing task store, starting fresh: {e}");
                    TaskStore::default()
                }
            },
            Err(e) => {
                eprintln!("Error reading task store, starting fresh: {e}");
                TaskStore::default()
            }
        }
    }

    /// Save the store to a JSON file using atomic write (temp file + rename).
    pub fn save(&self, path: &Path) -> std::io::Result<()> {
        let tmp = path.with_extension("json.tmp");
        let mut f = File::create(&tmp)?;
        let data = serde_json::to_string_pretty(self).unwrap();
        f.write_all(data.as_bytes())?;
        f.flush()?;
        fs::rename(tmp, path)?;
        Ok(())
    }

    /// Generate the next available task ID.
    pub fn next_id(&self) -> u64 {
        self.tasks.iter().map(|t| t.id).max().unwrap_or(0) + 1
    }

    /// Get a task by ID.
    pub fn get(&self, id: u64) -> Option<&Task> {
        self.tasks.iter().find(|t| t.id == id)
    }

    /// Get a mutable reference to a task by ID.
    pub fn get_mut(&mut self, id: u64) -> Option<&mut Task> {
        self.tasks.iter_mut().find(|t| t.id == id)
    }

    /// Insert a task, assigning it a generated ID. Returns the new ID.
    pub fn insert(&mut self, mut task: Task) -> u64 {
        let id = self.next_id();
        task.id = id;
        self.tasks.push(task);
        id
    }

    /// Replace the full record with the given ID. Returns false if absent.
    pub fn replace(&mut self, task: Task) -> bool {
        match self.get_mut(task.id) {
            Some(slot) => {
                *slot = task;
                true
            }
            None => false,
        }
    }

    /// Remove a task by ID. Returns false if absent.
    pub fn remove(&mut self, id: u64) -> bool {
        let before = self.tasks.len();
        self.tasks.retain(|t| t.id != id);
        self.tasks.len() != before
    }

    /// Set only the completion flag of a task. Returns false if absent.
    pub fn set_completed(&mut self, id: u64, completed: bool) -> bool {
        match self.get_mut(id) {
            Some(t) => {
                t.completed = completed;
                true
            }
            None => false,
        }
    }

    /// Set only the streak counter of a task. Returns false if absent.
    pub fn set_streak(&mut self, id: u64, streak: i32) -> bool {
        match self.get_mut(id) {
            Some(t) => {
                t.streak = streak;
                true
            }
            None => false,
        }
    }

    /// Delete all completed tasks in one bulk operation. Returns the count removed.
    pub fn remove_completed(&mut self) -> usize {
        let before = self.tasks.len();
        self.tasks.retain(|t| !t.completed);
        before - self.tasks.len()
    }
}

/// End-of-day time used when due input carries no time component.
fn end_of_day(date: NaiveDate) -> NaiveDateTime {
    date.and_time(NaiveTime::from_hms_opt(23, 59, 0).unwrap())
}

/// Parse human-readable date-time input with natural language support.
///
/// Supports:
/// - "today", "tomorrow"
/// - bare weekday names ("monday", "fri") for this week's occurrence
/// - "in 3d", "in 2w"
/// - "YYYY-MM-DD" (resolves to 23:59 that day)
/// - "YYYY-MM-DD HH:MM" / "YYYY-MM-DDTHH:MM"
pub fn parse_when_input(s: &str) -> Option<NaiveDateTime> {
    let raw = s.trim();

    // Explicit formats parse the original input; the T separator is
    // case-sensitive.
    for fmt in ["%Y-%m-%dT%H:%M:%S", "%Y-%m-%dT%H:%M", "%Y-%m-%d %H:%M:%S", "%Y-%m-%d %H:%M"] {
        if let Ok(dt) = NaiveDateTime::parse_from_str(raw, fmt) {
            return Some(dt);
        }
    }
    if let Ok(date) = NaiveDate::parse_from_str(raw, "%Y-%m-%d") {
        return Some(end_of_day(date));
    }

    let s = raw.to_lowercase();
    let today = Local::now().date_naive();

    match s.as_str() {
        "today" => return Some(end_of_day(today)),
        "tomorrow" => return Some(end_of_day(today + Duration::days(1))),
        _ => {}
    }

    if let Some(rest) = s.strip_prefix("in ") {
        if let Some(nd) = rest.strip_suffix('d') {
            if let Ok(days) = nd.trim().parse::<i64>() {
                return Some(end_of_day(today + Duration::days(days)));
            }
        }
        if let Some(nw) = rest.strip_suffix('w') {
            if let Ok(weeks) = nw.trim().parse::<i64>() {
                return Some(end_of_day(today + Duration::weeks(weeks)));
            }
        }
    }

    let weekdays = [
        ("monday", 0), ("tuesday", 1), ("wednesday", 2), ("thursday", 3),
        ("friday", 4), ("saturday", 5), ("sunday", 6),
        ("mon", 0), ("tue", 1), ("wed", 2), ("thu", 3),
        ("fri", 4), ("sat", 5), ("sun", 6),
    ];
    for (day_name, target_day) in weekdays {
        if s == day_name {
            let current_day = today.weekday().num_days_from_monday() as i32;
            let days_ahead = (target_day + 7 - current_day) % 7;
            return Some(end_of_day(today + Duration::days(days_ahead as i64)));
        }
    }

    None
}

/// Format a due date-time relative to today ("today 18:00", "tomorrow", "in 3d", "2d late").
pub fn format_due_relative(due: Option<NaiveDateTime>, today: NaiveDate) -> String {
    match due {
        None => "-".into(),
        Some(dt) => {
            let delta = dt.date() - today;
            if delta.num_days() == 0 {
                format!("today {}", dt.format("%H:%M"))
            } else if delta.num_days() == 1 {
                "tomorrow".into()
            } else if delta.num_days() > 1 {
                format!("in {}d", delta.num_days())
            } else {
                format!("{}d late", -delta.num_days())
            }
        }
    }
}

/// Format an optional date-time for detail views.
pub fn format_datetime(dt: Option<NaiveDateTime>) -> String {
    match dt {
        Some(dt) => dt.format("%Y-%m-%d %H:%M").to_string(),
        None => "-".into(),
    }
}

/// Truncate a string to a maximum width, adding ellipsis if needed.
pub fn truncate(s: &str, width: usize) -> String {
    if s.chars().count() <= width {
        s.to_string()
    } else {
        let mut out = String::new();
        for (i, ch) in s.chars().enumerate() {
            if i + 1 >= width {
                out.push('…');
                break;
            }
            out.push(ch);
        }
        out
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fields::Priority;

    fn dt(s: &str) -> NaiveDateTime {
        NaiveDateTime::parse_from_str(s, "%Y-%m-%dT%H:%M").unwrap()
    }

    fn dt2(s: &str) -> NaiveDateTime {
        NaiveDateTime::parse_from_str(s, "%Y-%m-%dT%H:%M:%S").unwrap()
    }

    #[test]
    fn test_insert_assigns_ids_and_get_roundtrips() {
        let mut store = TaskStore::default();
        let mut task = Task::new("Pay rent");
        task.priority = Priority::High;
        task.due = Some(dt("2024-01-01T23:59"));
        let expected = task.clone();

        let id = store.insert(task);
        assert_eq!(id, 1);
        let fetched = store.get(id).unwrap();
        // Everything except the generated id matches what went in.
        let mut expected = expected;
        expected.id = id;
        assert_eq!(*fetched, expected);

        let id2 = store.insert(Task::new("Second"));
        assert_eq!(id2, 2);
    }

    #[test]
    fn test_get_missing_is_none() {
        let store = TaskStore::default();
        assert!(store.get(42).is_none());
    }

    #[test]
    fn test_replace_and_remove() {
        let mut store = TaskStore::default();
        let id = store.insert(Task::new("Old title"));

        let mut edited = store.get(id).unwrap().clone();
        edited.title = "New title".into();
        assert!(store.replace(edited));
        assert_eq!(store.get(id).unwrap().title, "New title");

        let mut missing = Task::new("ghost");
        missing.id = 99;
        assert!(!store.replace(missing));

        assert!(store.remove(id));
        assert!(store.get(id).is_none());
        assert!(!store.remove(id));
    }

    #[test]
    fn test_set_completed_touches_only_the_flag() {
        let mut store = TaskStore::default();
        let mut task = Task::new("Gym");
        task.due = Some(dt("2024-03-01T18:00"));
        task.streak = 4;
        let id = store.insert(task);
        let before = store.get(id).unwrap().clone();

        assert!(store.set_completed(id, true));
        let after = store.get(id).unwrap();
        assert!(after.completed);
        assert_eq!(after.title, before.title);
        assert_eq!(after.due, before.due);
        assert_eq!(after.streak, before.streak);
        assert_eq!(after.created_at, before.created_at);

        assert!(!store.set_completed(99, true));
    }

    #[test]
    fn test_remove_completed_is_bulk() {
        let mut store = TaskStore::default();
        for i in 0..5 {
            let mut t = Task::new(&format!("t{i}"));
            t.completed = i % 2 == 0;
            store.insert(t);
        }
        assert_eq!(store.remove_completed(), 3);
        assert_eq!(store.tasks.len(), 2);
        assert!(store.tasks.iter().all(|t| !t.completed));
    }

    #[test]
    fn test_save_load_roundtrip() {
        let mut store = TaskStore::default();
        let mut task = Task::new("Persist me");
        task.due = Some(dt("2024-06-10T09:30"));
        store.insert(task);

        let path = std::env::temp_dir().join(format!("qt_store_test_{}.json", std::process::id()));
        store.save(&path).unwrap();
        let loaded = TaskStore::load(&path);
        assert_eq!(loaded.tasks, store.tasks);
        let _ = fs::remove_file(&path);
    }

    #[test]
    fn test_parse_when_input() {
        let today = Local::now().date_naive();
        assert_eq!(parse_when_input("today"), Some(end_of_day(today)));
        assert_eq!(
            parse_when_input("tomorrow"),
            Some(end_of_day(today + Duration::days(1)))
        );
        assert_eq!(
            parse_when_input("in 3d"),
            Some(end_of_day(today + Duration::days(3)))
        );
        assert_eq!(parse_when_input("2024-01-02"), Some(end_of_day(dt("2024-01-02T00:00").date())));
        assert_eq!(parse_when_input("2024-01-02 08:15"), Some(dt("2024-01-02T08:15")));
        assert_eq!(parse_when_input("2024-01-02T08:15"), Some(dt("2024-01-02T08:15")));
        assert_eq!(parse_when_input("2024-01-02T08:15:30"), Some(dt2("2024-01-02T08:15:30")));
        // Keywords are case-insensitive; the T-separated forms above must
        // survive that normalisation.
        assert_eq!(parse_when_input("Tomorrow"), Some(end_of_day(today + Duration::days(1))));
        assert_eq!(parse_when_input("not a date"), None);
    }

    #[test]
    fn test_format_due_relative() {
        let today = NaiveDate::from_ymd_opt(2024, 1, 10).unwrap();
        assert_eq!(format_due_relative(None, today), "-");
        assert_eq!(format_due_relative(Some(dt("2024-01-10T18:00")), today), "today 18:00");
        assert_eq!(format_due_relative(Some(dt("2024-01-11T08:00")), today), "tomorrow");
        assert_eq!(format_due_relative(Some(dt("2024-01-14T08:00")), today), "in 4d");
        assert_eq!(format_due_relative(Some(dt("2024-01-08T08:00")), today), "2d late");
    }
}
