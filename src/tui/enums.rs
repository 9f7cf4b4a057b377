//! Enumerations for TUI state management.

/// Application view for the terminal user interface.
#[derive(Clone, Copy, PartialEq)]
pub enum View {
    Home,
    TaskList,
    TaskDetail,
    AddTask,
    EditTask,
    Categories,
    Settings,
    Help,
    Confirm,
}

/// Input mode for text entry fields.
#[derive(Clone, Copy, PartialEq)]
pub enum InputMode {
    None,
    Text,
}

/// Pending action awaiting confirmation.
#[derive(Clone, PartialEq)]
pub enum ConfirmAction {
    DeleteTask(u64),
    ClearCompleted,
    ClearSettings,
}

impl ConfirmAction {
    /// Human-readable description for the confirm dialog.
    pub fn describe(&self) -> String {
        match self {
            ConfirmAction::DeleteTask(id) => format!("Delete task {}", id),
            ConfirmAction::ClearCompleted => "Delete all completed tasks".to_string(),
            ConfirmAction::ClearSettings => "Reset all settings to defaults".to_string(),
        }
    }
}
