//! Task form handling for the terminal user interface.
//!
//! This module provides the `TaskForm` structure for creating and editing
//! tasks in the TUI, including field ordering and form state management.

use crate::{
    fields::{Priority, RecurringType},
    store::parse_when_input,
    task::Task,
    tui::input::InputField,
};

/// Global order constants for task form fields.
pub const TITLE_FIELD: usize = 0;
pub const DESCRIPTION_FIELD: usize = 1;
pub const DUE_FIELD: usize = 2;
pub const CATEGORY_FIELD: usize = 3;
pub const REMINDER_FIELD: usize = 4;
pub const PRIORITY_FIELD: usize = 5;
pub const RECURRING_FIELD: usize = 6;

/// Task form for editing fields.
pub struct TaskForm {
    pub title: InputField,
    pub description: InputField,
    pub due: InputField,
    pub category: InputField,
    pub reminder: InputField,
    pub priority: usize,
    pub recurring: usize,
    pub current_field: usize,
    pub priorities: Vec<Priority>,
    pub recurrences: Vec<Option<RecurringType>>,
}

impl TaskForm {
    /// Create a new empty task form with default selections.
    pub fn new() -> Self {
        let mut form = Self {
            title: InputField::new(),
            description: InputField::new(),
            due: InputField::new(),
            category: InputField::new(),
            reminder: InputField::new(),
            priority: 1, // Medium
            recurring: 0, // Not recurring
            current_field: 0,
            priorities: vec![Priority::Low, Priority::Medium, Priority::High, Priority::Urgent],
            recurrences: vec![
                None,
                Some(RecurringType::Daily),
                Some(RecurringType::Weekly),
                Some(RecurringType::Monthly),
            ],
        };
        form.update_active_field();
        form
    }

    /// Create a task form populated from an existing task.
    pub fn from_task(task: &Task) -> Self {
        let mut form = Self::new();
        form.title = InputField::with_value(&task.title);
        form.description = InputField::with_value(&task.description);
        form.due = InputField::with_value(
            &task.due.map(|d| d.format("%Y-%m-%d %H:%M").to_string()).unwrap_or_default(),
        );
        form.category = InputField::with_value(&task.category);
        form.reminder = InputField::with_value(
            &task.reminder.map(|d| d.format("%Y-%m-%d %H:%M").to_string()).unwrap_or_default(),
        );
        form.priority =
            form.priorities.iter().position(|&p| p == task.priority).unwrap_or(1);
        let effective = if task.recurring { task.recurring_type } else { None };
        form.recurring =
            form.recurrences.iter().position(|&r| r == effective).unwrap_or(0);
        form.update_active_field();
        form
    }

    /// Get the total number of fields (text fields + selectors).
    pub fn field_count(&self) -> usize {
        7 // 5 text fields + 2 selectors
    }

    /// Move to the next field in the form.
    pub fn next_field(&mut self) {
        self.current_field = (self.current_field + 1) % self.field_count();
        self.update_active_field();
    }

    /// Move to the previous field in the form.
    pub fn prev_field(&mut self) {
        self.current_field = if self.current_field == 0 {
            self.field_count() - 1
        } else {
            self.current_field - 1
        };
        self.update_active_field();
    }

    /// Update which field is currently active for editing.
    pub fn update_active_field(&mut self) {
        self.title.active = self.current_field == TITLE_FIELD;
        self.description.active = self.current_field == DESCRIPTION_FIELD;
        self.due.active = self.current_field == DUE_FIELD;
        self.category.active = self.current_field == CATEGORY_FIELD;
        self.reminder.active = self.current_field == REMINDER_FIELD;
    }

    /// Handle character input for the currently active field.
    pub fn handle_char(&mut self, c: char) {
        match self.current_field {
            TITLE_FIELD => self.title.handle_char(c),
            DESCRIPTION_FIELD => self.description.handle_char(c),
            DUE_FIELD => self.due.handle_char(c),
            CATEGORY_FIELD => self.category.handle_char(c),
            REMINDER_FIELD => self.reminder.handle_char(c),
            _ => {}
        }
    }

    /// Handle backspace input for the currently active field.
    pub fn handle_backspace(&mut self) {
        match self.current_field {
            TITLE_FIELD => self.title.handle_backspace(),
            DESCRIPTION_FIELD => self.description.handle_backspace(),
            DUE_FIELD => self.due.handle_backspace(),
            CATEGORY_FIELD => self.category.handle_backspace(),
            REMINDER_FIELD => self.reminder.handle_backspace(),
            _ => {}
        }
    }

    /// Handle left/right arrow keys for cursor movement or selector changes.
    pub fn handle_left_right(&mut self, right: bool) {
        match self.current_field {
            TITLE_FIELD => {
                if right { self.title.move_cursor_right() } else { self.title.move_cursor_left() }
            }
            DESCRIPTION_FIELD => {
                if right {
                    self.description.move_cursor_right()
                } else {
                    self.description.move_cursor_left()
                }
            }
            DUE_FIELD => {
                if right { self.due.move_cursor_right() } else { self.due.move_cursor_left() }
            }
            CATEGORY_FIELD => {
                if right {
                    self.category.move_cursor_right()
                } else {
                    self.category.move_cursor_left()
                }
            }
            REMINDER_FIELD => {
                if right {
                    self.reminder.move_cursor_right()
                } else {
                    self.reminder.move_cursor_left()
                }
            }
            PRIORITY_FIELD => {
                if right {
                    self.priority = (self.priority + 1) % self.priorities.len();
                } else {
                    self.priority = if self.priority == 0 {
                        self.priorities.len() - 1
                    } else {
                        self.priority - 1
                    };
                }
            }
            RECURRING_FIELD => {
                if right {
                    self.recurring = (self.recurring + 1) % self.recurrences.len();
                } else {
                    self.recurring = if self.recurring == 0 {
                        self.recurrences.len() - 1
                    } else {
                        self.recurring - 1
                    };
                }
            }
            _ => {}
        }
    }

    /// Build a task from the form, validating its fields.
    ///
    /// Keeps `base`'s id, completion flag, streak and creation date when
    /// editing an existing task.
    pub fn to_task(&self, base: Option<&Task>) -> Result<Task, String> {
        if self.title.value.trim().is_empty() {
            return Err("Title cannot be empty".to_string());
        }
        let due = if self.due.value.trim().is_empty() {
            None
        } else {
            Some(
                parse_when_input(&self.due.value)
                    .ok_or_else(|| format!("Could not parse due date '{}'", self.due.value))?,
            )
        };
        let reminder = if self.reminder.value.trim().is_empty() {
            None
        } else {
            Some(
                parse_when_input(&self.reminder.value)
                    .ok_or_else(|| format!("Could not parse reminder '{}'", self.reminder.value))?,
            )
        };

        let mut task = match base {
            Some(t) => t.clone(),
            None => Task::new(""),
        };
        task.title = self.title.value.trim().to_string();
        task.description = self.description.value.trim().to_string();
        task.due = due;
        task.priority = self.priorities[self.priority];
        let category = self.category.value.trim();
        task.category = if category.is_empty() { "General".to_string() } else { category.to_string() };
        task.reminder = reminder;
        let recurrence = self.recurrences[self.recurring];
        task.recurring = recurrence.is_some();
        task.recurring_type = recurrence;
        Ok(task)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_blank_title_rejected() {
        let mut form = TaskForm::new();
        form.title = InputField::with_value("   ");
        assert_eq!(form.to_task(None).unwrap_err(), "Title cannot be empty");
    }

    #[test]
    fn test_blank_category_falls_back_to_general() {
        let mut form = TaskForm::new();
        form.title = InputField::with_value("Walk dog");
        let task = form.to_task(None).unwrap();
        assert_eq!(task.category, "General");
        assert_eq!(task.priority, Priority::Medium);
    }

    #[test]
    fn test_recurring_selector_round_trip() {
        let mut task = Task::new("Gym");
        task.recurring = true;
        task.recurring_type = Some(RecurringType::Weekly);
        let form = TaskForm::from_task(&task);
        let rebuilt = form.to_task(Some(&task)).unwrap();
        assert!(rebuilt.recurring);
        assert_eq!(rebuilt.recurring_type, Some(RecurringType::Weekly));
    }

    #[test]
    fn test_switching_off_recurrence_clears_period() {
        let mut task = Task::new("Gym");
        task.recurring = true;
        task.recurring_type = Some(RecurringType::Daily);
        let mut form = TaskForm::from_task(&task);
        form.recurring = 0;
        let rebuilt = form.to_task(Some(&task)).unwrap();
        assert!(!rebuilt.recurring);
        assert!(rebuilt.recurring_type.is_none());
    }

    #[test]
    fn test_stale_period_without_flag_not_shown_as_recurring() {
        // The store allows recurring_type without the flag; the form
        // normalises it to "not recurring".
        let mut task = Task::new("Odd record");
        task.recurring = false;
        task.recurring_type = Some(RecurringType::Monthly);
        let form = TaskForm::from_task(&task);
        assert_eq!(form.recurring, 0);
    }

    #[test]
    fn test_edit_preserves_identity_fields() {
        let mut task = Task::new("Original");
        task.id = 7;
        task.streak = 3;
        task.completed = true;
        let mut form = TaskForm::from_task(&task);
        form.title = InputField::with_value("Renamed");
        let rebuilt = form.to_task(Some(&task)).unwrap();
        assert_eq!(rebuilt.id, 7);
        assert_eq!(rebuilt.streak, 3);
        assert!(rebuilt.completed);
        assert_eq!(rebuilt.created_at, task.created_at);
        assert_eq!(rebuilt.title, "Renamed");
    }

    #[test]
    fn test_bad_due_input_is_an_error() {
        let mut form = TaskForm::new();
        form.title = InputField::with_value("t");
        form.due = InputField::with_value("someday soon");
        assert!(form.to_task(None).is_err());
    }
}
