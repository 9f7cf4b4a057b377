//! Task data structure and related functionality.
//!
//! This module defines the core `Task` struct that represents a single todo
//! item with its scheduling metadata: due date, priority, category,
//! reminder, recurrence and completion streak.

use chrono::{Local, NaiveDateTime};
use serde::{Deserialize, Serialize};

use crate::fields::{Priority, RecurringType};

/// A single todo item.
///
/// Timestamps are local date-times and persist as ISO-8601 strings.
/// `recurring_type` is meaningful only while `recurring` is set; the store
/// accepts either combination and the edit surfaces normalise it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Task {
    pub id: u64,
    pub title: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub due: Option<NaiveDateTime>,
    #[serde(default)]
    pub priority: Priority,
    #[serde(default = "default_category")]
    pub category: String,
    #[serde(default)]
    pub completed: bool,
    pub created_at: NaiveDateTime,
    #[serde(default)]
    pub reminder: Option<NaiveDateTime>,
    #[serde(default)]
    pub recurring: bool,
    #[serde(default)]
    pub recurring_type: Option<RecurringType>,
    #[serde(default)]
    pub streak: i32,
}

fn default_category() -> String {
    "General".to_string()
}

impl Task {
    /// Create a task with defaults: medium priority, "General" category,
    /// not completed, creation time stamped now.
    pub fn new(title: &str) -> Self {
        Task {
            id: 0,
            title: title.to_string(),
            description: String::new(),
            due: None,
            priority: Priority::default(),
            category: default_category(),
            completed: false,
            created_at: Local::now().naive_local(),
            reminder: None,
            recurring: false,
            recurring_type: None,
            streak: 0,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_task_defaults() {
        let t = Task::new("Water plants");
        assert_eq!(t.title, "Water plants");
        assert_eq!(t.priority, Priority::Medium);
        assert_eq!(t.category, "General");
        assert!(!t.completed);
        assert!(!t.recurring);
        assert_eq!(t.streak, 0);
        assert!(t.due.is_none());
        assert!(t.reminder.is_none());
    }

    #[test]
    fn test_timestamps_persist_as_iso_strings() {
        let mut t = Task::new("Pay rent");
        t.due = Some(
            NaiveDateTime::parse_from_str("2024-01-01T23:59:00", "%Y-%m-%dT%H:%M:%S").unwrap(),
        );
        let json = serde_json::to_string(&t).unwrap();
        assert!(json.contains("\"due\":\"2024-01-01T23:59:00\""));
        let back: Task = serde_json::from_str(&json).unwrap();
        assert_eq!(back, t);
    }

    #[test]
    fn test_missing_optional_fields_use_defaults() {
        // Records written before a field existed must still decode.
        let json = r#"{"id":4,"title":"Old","created_at":"2023-05-01T08:00:00"}"#;
        let t: Task = serde_json::from_str(json).unwrap();
        assert_eq!(t.category, "General");
        assert_eq!(t.priority, Priority::Medium);
        assert!(!t.completed);
        assert_eq!(t.streak, 0);
    }
}
