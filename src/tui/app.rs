//! Main application logic for the terminal user interface.
//!
//! This module contains the `App` struct which manages the TUI state,
//! handles user input, renders the interface, and coordinates between the
//! home agenda, task list, categories, settings, detail and form views.

use std::io;
use std::path::Path;
use std::time::Duration;

use chrono::Local;
use crossterm::event::{self, Event, KeyCode, KeyModifiers};
use ratatui::{
    backend::Backend,
    layout::{Alignment, Constraint, Direction, Layout, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Cell, Clear, Paragraph, Row, Table, TableState, Wrap},
    Frame, Terminal,
};

use crate::agenda::Agenda;
use crate::fields::{format_priority, format_recurring};
use crate::query;
use crate::settings::Settings;
use crate::store::{format_datetime, format_due_relative, truncate, TaskStore};
use crate::task::Task;
use crate::tui::{
    colors::priority_color,
    enums::{ConfirmAction, InputMode, View},
    task_form::{TaskForm, PRIORITY_FIELD, RECURRING_FIELD},
    utils::centered_rect,
};

/// A row in the home agenda: either a section header or a task reference.
enum HomeRow {
    Header(String),
    Task(u64),
}

/// Rows in the settings view, top to bottom.
const SETTINGS_ROWS: usize = 6;
const SETTING_DARK_THEME: usize = 0;
const SETTING_NOTIFICATIONS: usize = 1;
const SETTING_BACKUP: usize = 2;
const SETTING_HOUR: usize = 3;
const SETTING_MINUTE: usize = 4;
const SETTING_CLEAR: usize = 5;

/// Main application state for the terminal user interface.
///
/// Every mutation saves the store and rebuilds the visible snapshots before
/// the next draw, so all views always reflect the persisted state.
pub struct App {
    view: View,
    store: TaskStore,
    store_path: std::path::PathBuf,
    settings: Settings,
    settings_path: std::path::PathBuf,
    home_rows: Vec<HomeRow>,
    home_state: TableState,
    list_ids: Vec<u64>,
    list_state: TableState,
    show_completed: bool,
    categories: Vec<String>,
    selected_category: Option<String>,
    category_ids: Vec<u64>,
    cat_state: TableState,
    settings_cursor: usize,
    selected_task: Option<u64>,
    task_form: TaskForm,
    input_mode: InputMode,
    search_text: String,
    status_message: String,
    confirm_action: Option<ConfirmAction>,
    return_view: View,
}

impl App {
    /// Create a new App instance, loading store and settings from disk.
    pub fn new(store_path: &Path, settings_path: &Path) -> io::Result<Self> {
        let store = TaskStore::load(store_path);
        let settings = Settings::load(settings_path);

        let mut app = App {
            view: View::Home,
            store,
            store_path: store_path.to_path_buf(),
            settings,
            settings_path: settings_path.to_path_buf(),
            home_rows: Vec::new(),
            home_state: TableState::default(),
            list_ids: Vec::new(),
            list_state: TableState::default(),
            show_completed: false,
            categories: Vec::new(),
            selected_category: None,
            category_ids: Vec::new(),
            cat_state: TableState::default(),
            settings_cursor: 0,
            selected_task: None,
            task_form: TaskForm::new(),
            input_mode: InputMode::None,
            search_text: String::new(),
            status_message: String::new(),
            confirm_action: None,
            return_view: View::Home,
        };
        app.refresh();
        Ok(app)
    }

    /// Rebuild every visible snapshot from the store.
    fn refresh(&mut self) {
        // Home agenda rows
        let rows = {
            let now = Local::now().naive_local();
            let active = query::active(&self.store);
            let completed = query::completed(&self.store);
            let agenda = Agenda::build(&active, &completed, now, &self.search_text);
            let sections: [(&str, &[&Task]); 4] = [
                ("Overdue", &agenda.overdue),
                ("Due today", &agenda.today),
                ("Upcoming", &agenda.upcoming),
                ("Recently completed", &agenda.recent_completed),
            ];
            let mut rows = Vec::new();
            for (name, tasks) in sections {
                rows.push(HomeRow::Header(format!("{} ({})", name, tasks.len())));
                for t in tasks {
                    rows.push(HomeRow::Task(t.id));
                }
            }
            rows
        };
        self.home_rows = rows;
        self.fix_home_selection();

        // All-tasks list
        self.list_ids = if self.show_completed {
            query::all(&self.store).iter().map(|t| t.id).collect()
        } else {
            query::active(&self.store).iter().map(|t| t.id).collect()
        };
        fix_selection(&mut self.list_state, self.list_ids.len());

        // Categories
        self.categories = query::categories(&self.store);
        if let Some(cat) = self.selected_category.clone() {
            self.category_ids =
                query::by_category(&self.store, &cat).iter().map(|t| t.id).collect();
            fix_selection(&mut self.cat_state, self.category_ids.len());
        } else {
            self.category_ids.clear();
            fix_selection(&mut self.cat_state, self.categories.len());
        }
    }

    /// Save the store to disk and rebuild the snapshots.
    fn save_store(&mut self) -> io::Result<()> {
        self.store.save(&self.store_path)?;
        self.refresh();
        Ok(())
    }

    /// Persist a settings change.
    fn save_settings(&mut self) {
        if let Err(e) = self.settings.save(&self.settings_path) {
            self.status_message = format!("Failed to save settings: {e}");
        }
    }

    /// Ensure the home selection sits on a task row, not a header.
    fn fix_home_selection(&mut self) {
        let valid = self
            .home_state
            .selected()
            .map(|i| matches!(self.home_rows.get(i), Some(HomeRow::Task(_))))
            .unwrap_or(false);
        if !valid {
            let first = self
                .home_rows
                .iter()
                .position(|r| matches!(r, HomeRow::Task(_)));
            self.home_state.select(first);
        }
    }

    /// Move the home selection to the next/previous task row, skipping headers.
    fn move_home_selection(&mut self, down: bool) {
        let task_rows: Vec<usize> = self
            .home_rows
            .iter()
            .enumerate()
            .filter(|(_, r)| matches!(r, HomeRow::Task(_)))
            .map(|(i, _)| i)
            .collect();
        if task_rows.is_empty() {
            self.home_state.select(None);
            return;
        }
        let current = self.home_state.selected().unwrap_or(task_rows[0]);
        let pos = task_rows.iter().position(|&i| i == current).unwrap_or(0);
        let next = if down {
            task_rows[(pos + 1) % task_rows.len()]
        } else if pos == 0 {
            task_rows[task_rows.len() - 1]
        } else {
            task_rows[pos - 1]
        };
        self.home_state.select(Some(next));
    }

    /// ID of the task currently selected in the active view.
    fn selected_id(&self) -> Option<u64> {
        match self.view {
            View::Home => match self.home_state.selected().and_then(|i| self.home_rows.get(i)) {
                Some(HomeRow::Task(id)) => Some(*id),
                _ => None,
            },
            View::TaskList => self
                .list_state
                .selected()
                .and_then(|i| self.list_ids.get(i))
                .copied(),
            View::Categories if self.selected_category.is_some() => self
                .cat_state
                .selected()
                .and_then(|i| self.category_ids.get(i))
                .copied(),
            _ => self.selected_task,
        }
    }

    /// Toggle completion of the selected task and persist.
    fn toggle_selected(&mut self) -> io::Result<()> {
        if let Some(id) = self.selected_id() {
            let completed = self.store.get(id).map(|t| t.completed).unwrap_or(false);
            self.store.set_completed(id, !completed);
            self.save_store()?;
            self.status_message =
                format!("{} task {}", if completed { "Reopened" } else { "Completed" }, id);
        }
        Ok(())
    }

    /// Open the add form, remembering where to return.
    fn open_add_form(&mut self) {
        self.return_view = self.view;
        self.task_form = TaskForm::new();
        self.view = View::AddTask;
    }

    /// Open the edit form for the selected task.
    fn open_edit_form(&mut self) {
        if let Some(id) = self.selected_id() {
            if let Some(task) = self.store.get(id) {
                self.task_form = TaskForm::from_task(task);
                self.selected_task = Some(id);
                if self.view != View::TaskDetail {
                    self.return_view = self.view;
                }
                self.view = View::EditTask;
            }
        }
    }

    /// Open the detail view for the selected task.
    fn open_detail(&mut self) {
        if let Some(id) = self.selected_id() {
            self.selected_task = Some(id);
            self.return_view = self.view;
            self.view = View::TaskDetail;
        }
    }

    /// Ask for confirmation of a destructive action.
    fn ask_confirm(&mut self, action: ConfirmAction) {
        self.confirm_action = Some(action);
        self.return_view = self.view;
        self.view = View::Confirm;
    }

    /// Save the form as a new or edited task.
    fn save_form(&mut self, is_edit: bool) -> io::Result<()> {
        let base = if is_edit {
            self.selected_task.and_then(|id| self.store.get(id)).cloned()
        } else {
            None
        };
        match self.task_form.to_task(base.as_ref()) {
            Ok(task) => {
                let msg = if is_edit {
                    let id = task.id;
                    self.store.replace(task);
                    format!("Updated task {}", id)
                } else {
                    let id = self.store.insert(task);
                    format!("Added task {}", id)
                };
                self.save_store()?;
                self.status_message = msg;
                self.view = self.return_view;
            }
            Err(e) => {
                self.status_message = e;
            }
        }
        Ok(())
    }

    /// Accent color for the current theme.
    fn accent(&self) -> Color {
        if self.settings.dark_theme() {
            Color::Cyan
        } else {
            Color::Blue
        }
    }

    fn handle_home_input(&mut self, key: KeyCode, _modifiers: KeyModifiers) -> io::Result<bool> {
        if self.input_mode == InputMode::Text {
            match key {
                KeyCode::Esc => {
                    self.search_text.clear();
                    self.input_mode = InputMode::None;
                    self.refresh();
                }
                KeyCode::Enter => {
                    self.input_mode = InputMode::None;
                }
                KeyCode::Backspace => {
                    self.search_text.pop();
                    self.refresh();
                }
                KeyCode::Char(c) => {
                    self.search_text.push(c);
                    self.refresh();
                }
                _ => {}
            }
            return Ok(false);
        }

        match key {
            KeyCode::Char('q') => return Ok(true),
            KeyCode::Char('/') => {
                self.input_mode = InputMode::Text;
            }
            KeyCode::Down | KeyCode::Char('j') => self.move_home_selection(true),
            KeyCode::Up | KeyCode::Char('k') => self.move_home_selection(false),
            KeyCode::Char(' ') => self.toggle_selected()?,
            KeyCode::Char('a') => self.open_add_form(),
            KeyCode::Char('e') => self.open_edit_form(),
            KeyCode::Char('d') => {
                if let Some(id) = self.selected_id() {
                    self.ask_confirm(ConfirmAction::DeleteTask(id));
                }
            }
            KeyCode::Char('x') => self.ask_confirm(ConfirmAction::ClearCompleted),
            KeyCode::Enter => self.open_detail(),
            KeyCode::Char('t') => self.view = View::TaskList,
            KeyCode::Char('c') => {
                self.selected_category = None;
                self.refresh();
                self.view = View::Categories;
            }
            KeyCode::Char('s') => {
                self.settings_cursor = 0;
                self.view = View::Settings;
            }
            KeyCode::Char('h') => self.view = View::Help,
            _ => {}
        }
        Ok(false)
    }

    fn handle_list_input(&mut self, key: KeyCode, _modifiers: KeyModifiers) -> io::Result<bool> {
        match key {
            KeyCode::Char('q') => return Ok(true),
            KeyCode::Esc | KeyCode::Char('b') => self.view = View::Home,
            KeyCode::Char('v') => {
                self.show_completed = !self.show_completed;
                self.refresh();
            }
            KeyCode::Down | KeyCode::Char('j') => {
                move_selection(&mut self.list_state, self.list_ids.len(), true)
            }
            KeyCode::Up | KeyCode::Char('k') => {
                move_selection(&mut self.list_state, self.list_ids.len(), false)
            }
            KeyCode::Char(' ') => self.toggle_selected()?,
            KeyCode::Char('a') => self.open_add_form(),
            KeyCode::Char('e') => self.open_edit_form(),
            KeyCode::Char('d') => {
                if let Some(id) = self.selected_id() {
                    self.ask_confirm(ConfirmAction::DeleteTask(id));
                }
            }
            KeyCode::Enter => self.open_detail(),
            _ => {}
        }
        Ok(false)
    }

    fn handle_categories_input(
        &mut self,
        key: KeyCode,
        _modifiers: KeyModifiers,
    ) -> io::Result<bool> {
        match key {
            KeyCode::Char('q') => return Ok(true),
            KeyCode::Esc => {
                if self.selected_category.is_some() {
                    self.selected_category = None;
                    self.refresh();
                } else {
                    self.view = View::Home;
                }
            }
            KeyCode::Down | KeyCode::Char('j') => {
                let len = if self.selected_category.is_some() {
                    self.category_ids.len()
                } else {
                    self.categories.len()
                };
                move_selection(&mut self.cat_state, len, true);
            }
            KeyCode::Up | KeyCode::Char('k') => {
                let len = if self.selected_category.is_some() {
                    self.category_ids.len()
                } else {
                    self.categories.len()
                };
                move_selection(&mut self.cat_state, len, false);
            }
            KeyCode::Enter => {
                if self.selected_category.is_some() {
                    self.open_detail();
                } else if let Some(i) = self.cat_state.selected() {
                    if let Some(cat) = self.categories.get(i) {
                        self.selected_category = Some(cat.clone());
                        self.cat_state.select(Some(0));
                        self.refresh();
                    }
                }
            }
            KeyCode::Char(' ') if self.selected_category.is_some() => self.toggle_selected()?,
            KeyCode::Char('d') if self.selected_category.is_some() => {
                if let Some(id) = self.selected_id() {
                    self.ask_confirm(ConfirmAction::DeleteTask(id));
                }
            }
            _ => {}
        }
        Ok(false)
    }

    fn handle_settings_input(&mut self, key: KeyCode, _modifiers: KeyModifiers) -> io::Result<bool> {
        match key {
            KeyCode::Char('q') => return Ok(true),
            KeyCode::Esc => self.view = View::Home,
            KeyCode::Down | KeyCode::Char('j') => {
                self.settings_cursor = (self.settings_cursor + 1) % SETTINGS_ROWS;
            }
            KeyCode::Up | KeyCode::Char('k') => {
                self.settings_cursor =
                    if self.settings_cursor == 0 { SETTINGS_ROWS - 1 } else { self.settings_cursor - 1 };
            }
            KeyCode::Left | KeyCode::Right | KeyCode::Char(' ') => {
                let right = key != KeyCode::Left;
                match self.settings_cursor {
                    SETTING_DARK_THEME => {
                        self.settings.dark_theme = Some(!self.settings.dark_theme());
                    }
                    SETTING_NOTIFICATIONS => {
                        self.settings.notifications_enabled =
                            Some(!self.settings.notifications_enabled());
                    }
                    SETTING_BACKUP => {
                        self.settings.cloud_backup_enabled =
                            Some(!self.settings.cloud_backup_enabled());
                    }
                    SETTING_HOUR => {
                        let (hour, _) = self.settings.notification_time();
                        let hour = if right { (hour + 1) % 24 } else { (hour + 23) % 24 };
                        self.settings.notification_hour = Some(hour);
                    }
                    SETTING_MINUTE => {
                        let (_, minute) = self.settings.notification_time();
                        let minute = if right { (minute + 5) % 60 } else { (minute + 55) % 60 };
                        self.settings.notification_minute = Some(minute);
                    }
                    _ => {}
                }
                if self.settings_cursor != SETTING_CLEAR {
                    self.save_settings();
                }
            }
            KeyCode::Enter => {
                if self.settings_cursor == SETTING_CLEAR {
                    self.ask_confirm(ConfirmAction::ClearSettings);
                }
            }
            _ => {}
        }
        Ok(false)
    }

    fn handle_detail_input(&mut self, key: KeyCode, _modifiers: KeyModifiers) -> io::Result<bool> {
        match key {
            KeyCode::Char('q') => return Ok(true),
            KeyCode::Esc | KeyCode::Char('b') => self.view = self.return_view,
            KeyCode::Char('e') => self.open_edit_form(),
            KeyCode::Char(' ') => self.toggle_selected()?,
            KeyCode::Char('d') => {
                if let Some(id) = self.selected_task {
                    self.ask_confirm(ConfirmAction::DeleteTask(id));
                }
            }
            _ => {}
        }
        Ok(false)
    }

    fn handle_form_input(
        &mut self,
        key: KeyCode,
        _modifiers: KeyModifiers,
        is_edit: bool,
    ) -> io::Result<bool> {
        match key {
            KeyCode::Esc => {
                self.view = self.return_view;
                self.status_message.clear();
            }
            KeyCode::Tab | KeyCode::Down => self.task_form.next_field(),
            KeyCode::BackTab | KeyCode::Up => self.task_form.prev_field(),
            KeyCode::Left => self.task_form.handle_left_right(false),
            KeyCode::Right => self.task_form.handle_left_right(true),
            KeyCode::Backspace => self.task_form.handle_backspace(),
            KeyCode::Enter => self.save_form(is_edit)?,
            KeyCode::Char(c) => self.task_form.handle_char(c),
            _ => {}
        }
        Ok(false)
    }

    fn handle_confirm_input(&mut self, key: KeyCode, _modifiers: KeyModifiers) -> io::Result<bool> {
        match key {
            KeyCode::Char('y') | KeyCode::Char('Y') => {
                if let Some(action) = self.confirm_action.take() {
                    match action {
                        ConfirmAction::DeleteTask(id) => {
                            if self.store.remove(id) {
                                self.save_store()?;
                                self.status_message = format!("Deleted task {}", id);
                            }
                            if self.selected_task == Some(id) {
                                self.selected_task = None;
                            }
                            // Leaving the detail view of a deleted task.
                            if self.return_view == View::TaskDetail {
                                self.return_view = View::Home;
                            }
                        }
                        ConfirmAction::ClearCompleted => {
                            let removed = self.store.remove_completed();
                            self.save_store()?;
                            self.status_message = format!("Deleted {} completed task(s)", removed);
                        }
                        ConfirmAction::ClearSettings => {
                            self.settings.clear();
                            self.save_settings();
                            self.status_message = "Settings reset to defaults".to_string();
                        }
                    }
                }
                self.view = self.return_view;
            }
            KeyCode::Char('n') | KeyCode::Char('N') | KeyCode::Esc => {
                self.confirm_action = None;
                self.view = self.return_view;
            }
            _ => {}
        }
        Ok(false)
    }

    fn handle_help_input(&mut self, key: KeyCode, _modifiers: KeyModifiers) -> io::Result<bool> {
        match key {
            KeyCode::Char('q') => return Ok(true),
            _ => self.view = View::Home,
        }
        Ok(false)
    }

    /// Dispatch one key event to the active view's handler.
    ///
    /// Returns true if the application should quit.
    fn handle_input(&mut self) -> io::Result<bool> {
        if event::poll(Duration::from_millis(50))? {
            if let Event::Key(key) = event::read()? {
                self.status_message.clear();

                let should_quit = match self.view {
                    View::Home => self.handle_home_input(key.code, key.modifiers)?,
                    View::TaskList => self.handle_list_input(key.code, key.modifiers)?,
                    View::TaskDetail => self.handle_detail_input(key.code, key.modifiers)?,
                    View::AddTask => self.handle_form_input(key.code, key.modifiers, false)?,
                    View::EditTask => self.handle_form_input(key.code, key.modifiers, true)?,
                    View::Categories => self.handle_categories_input(key.code, key.modifiers)?,
                    View::Settings => self.handle_settings_input(key.code, key.modifiers)?,
                    View::Help => self.handle_help_input(key.code, key.modifiers)?,
                    View::Confirm => self.handle_confirm_input(key.code, key.modifiers)?,
                };
                if should_quit {
                    return Ok(true);
                }
            }
        }
        Ok(false)
    }

    /// Render the home agenda with its four sections.
    fn render_home(&mut self, f: &mut Frame, area: Rect) {
        let today = Local::now().date_naive();
        let accent = self.accent();

        let rows: Vec<Row> = self
            .home_rows
            .iter()
            .map(|row| match row {
                HomeRow::Header(name) => Row::new(vec![
                    Cell::from(""),
                    Cell::from(name.clone()),
                    Cell::from(""),
                    Cell::from(""),
                ])
                .style(Style::default().fg(accent).add_modifier(Modifier::BOLD)),
                HomeRow::Task(id) => match self.store.get(*id) {
                    Some(task) => {
                        let style = if task.completed {
                            Style::default().fg(Color::DarkGray)
                        } else {
                            Style::default().fg(priority_color(task.priority))
                        };
                        let marker = if task.completed { "[x]" } else { "[ ]" };
                        Row::new(vec![
                            Cell::from(marker),
                            Cell::from(task.title.clone()),
                            Cell::from(format_due_relative(task.due, today)),
                            Cell::from(truncate(&task.category, 14)),
                        ])
                        .style(style)
                    }
                    None => Row::new(vec![Cell::from(""), Cell::from(""), Cell::from(""), Cell::from("")]),
                },
            })
            .collect();

        let widths = [
            Constraint::Length(3),  // completion marker
            Constraint::Min(25),    // title / section header
            Constraint::Length(12), // due
            Constraint::Length(14), // category
        ];

        let title = if self.search_text.is_empty() {
            "QuickTasks - Press 'h' for help".to_string()
        } else {
            format!("QuickTasks (filtered by '{}')", self.search_text)
        };

        let table = Table::new(rows, widths)
            .block(Block::default().borders(Borders::ALL).title(title))
            .row_highlight_style(Style::default().bg(Color::Gray).fg(Color::Black))
            .highlight_symbol(">> ");

        f.render_stateful_widget(table, area, &mut self.home_state);
    }

    /// Render the flat task list view.
    fn render_task_list(&mut self, f: &mut Frame, area: Rect) {
        let today = Local::now().date_naive();

        let header_cells = ["ID", "Status", "Pri", "Due", "Category", "Title"]
            .iter()
            .map(|h| Cell::from(*h).style(Style::default().add_modifier(Modifier::BOLD)));
        let header = Row::new(header_cells)
            .style(Style::default().bg(self.accent()).fg(Color::White))
            .height(1);

        let rows: Vec<Row> = self
            .list_ids
            .iter()
            .filter_map(|&id| self.store.get(id))
            .map(|task| {
                let style = if task.completed {
                    Style::default().fg(Color::DarkGray)
                } else {
                    Style::default().fg(priority_color(task.priority))
                };
                Row::new(vec![
                    Cell::from(task.id.to_string()),
                    Cell::from(if task.completed { "done" } else { "open" }),
                    Cell::from(format_priority(task.priority)),
                    Cell::from(format_due_relative(task.due, today)),
                    Cell::from(truncate(&task.category, 14)),
                    Cell::from(task.title.clone()),
                ])
                .style(style)
            })
            .collect();

        let widths = [
            Constraint::Length(5),
            Constraint::Length(7),
            Constraint::Length(8),
            Constraint::Length(12),
            Constraint::Length(14),
            Constraint::Min(25),
        ];

        let table = Table::new(rows, widths)
            .header(header)
            .block(Block::default().borders(Borders::ALL).title(format!(
                "Tasks ({}/{}){}",
                self.list_ids.len(),
                self.store.tasks.len(),
                if self.show_completed { " - all" } else { " - active" }
            )))
            .row_highlight_style(Style::default().bg(Color::Gray).fg(Color::Black))
            .highlight_symbol(">> ");

        f.render_stateful_widget(table, area, &mut self.list_state);
    }

    /// Render the categories view: the category list, or one category's tasks.
    fn render_categories(&mut self, f: &mut Frame, area: Rect) {
        let today = Local::now().date_naive();

        match self.selected_category.clone() {
            None => {
                let rows: Vec<Row> = self
                    .categories
                    .iter()
                    .map(|cat| {
                        let count =
                            self.store.tasks.iter().filter(|t| &t.category == cat).count();
                        Row::new(vec![
                            Cell::from(cat.clone()),
                            Cell::from(format!("{} task(s)", count)),
                        ])
                    })
                    .collect();
                let widths = [Constraint::Min(20), Constraint::Length(12)];
                let table = Table::new(rows, widths)
                    .block(Block::default().borders(Borders::ALL).title("Categories"))
                    .row_highlight_style(Style::default().bg(Color::Gray).fg(Color::Black))
                    .highlight_symbol(">> ");
                f.render_stateful_widget(table, area, &mut self.cat_state);
            }
            Some(cat) => {
                let rows: Vec<Row> = self
                    .category_ids
                    .iter()
                    .filter_map(|&id| self.store.get(id))
                    .map(|task| {
                        let style = if task.completed {
                            Style::default().fg(Color::DarkGray)
                        } else {
                            Style::default().fg(priority_color(task.priority))
                        };
                        Row::new(vec![
                            Cell::from(if task.completed { "[x]" } else { "[ ]" }),
                            Cell::from(task.title.clone()),
                            Cell::from(format_due_relative(task.due, today)),
                            Cell::from(format_priority(task.priority)),
                        ])
                        .style(style)
                    })
                    .collect();
                let widths = [
                    Constraint::Length(3),
                    Constraint::Min(25),
                    Constraint::Length(12),
                    Constraint::Length(8),
                ];
                let table = Table::new(rows, widths)
                    .block(
                        Block::default()
                            .borders(Borders::ALL)
                            .title(format!("Category: {}", cat)),
                    )
                    .row_highlight_style(Style::default().bg(Color::Gray).fg(Color::Black))
                    .highlight_symbol(">> ");
                f.render_stateful_widget(table, area, &mut self.cat_state);
            }
        }
    }

    /// Render the settings view.
    fn render_settings(&mut self, f: &mut Frame, area: Rect) {
        let (hour, minute) = self.settings.notification_time();
        let entries = [
            ("Dark theme", format!("{}", self.settings.dark_theme())),
            ("Notifications", format!("{}", self.settings.notifications_enabled())),
            ("Cloud backup", format!("{}", self.settings.cloud_backup_enabled())),
            ("Notification hour", format!("{:02}", hour)),
            ("Notification minute", format!("{:02}", minute)),
            ("Clear all data", "press Enter".to_string()),
        ];

        let mut lines = vec![Line::from("")];
        for (i, (name, value)) in entries.iter().enumerate() {
            let style = if i == self.settings_cursor {
                Style::default().bg(Color::Gray).fg(Color::Black)
            } else {
                Style::default()
            };
            lines.push(Line::from(Span::styled(
                format!("  {:<22} {}", name, value),
                style,
            )));
        }
        lines.push(Line::from(""));
        lines.push(Line::from(
            "Up/Down select, Left/Right change, Enter on Clear resets, Esc back",
        ));

        let paragraph = Paragraph::new(lines)
            .block(Block::default().borders(Borders::ALL).title("Settings"));
        f.render_widget(paragraph, area);
    }

    /// Render the detailed view of a single task.
    fn render_task_detail(&mut self, f: &mut Frame, area: Rect) {
        let Some(task) = self.selected_task.and_then(|id| self.store.get(id)) else {
            let paragraph = Paragraph::new("Task no longer exists")
                .block(Block::default().borders(Borders::ALL).title("Task"));
            f.render_widget(paragraph, area);
            return;
        };
        let today = Local::now().date_naive();

        let due_line = match task.due {
            Some(d) => format!(
                "{} ({})",
                d.format("%Y-%m-%d %H:%M"),
                format_due_relative(Some(d), today)
            ),
            None => "-".into(),
        };
        let recurring =
            format_recurring(task.recurring_type.filter(|_| task.recurring)).to_string();

        let lines = vec![
            Line::from(vec![
                Span::styled("Title:      ", Style::default().add_modifier(Modifier::BOLD)),
                Span::raw(task.title.clone()),
            ]),
            Line::from(format!("Status:     {}", if task.completed { "done" } else { "open" })),
            Line::from(vec![
                Span::raw("Priority:   "),
                Span::styled(
                    format_priority(task.priority),
                    Style::default().fg(priority_color(task.priority)),
                ),
            ]),
            Line::from(format!("Category:   {}", task.category)),
            Line::from(format!("Due:        {}", due_line)),
            Line::from(format!("Reminder:   {}", format_datetime(task.reminder))),
            Line::from(format!("Recurring:  {}", recurring)),
            Line::from(format!("Streak:     {}", task.streak)),
            Line::from(format!("Created:    {}", task.created_at.format("%Y-%m-%d %H:%M"))),
            Line::from(""),
            Line::from(Span::styled(
                "Description",
                Style::default().add_modifier(Modifier::BOLD),
            )),
            Line::from(if task.description.is_empty() {
                "-".to_string()
            } else {
                task.description.clone()
            }),
            Line::from(""),
            Line::from("e edit | Space toggle done | d delete | Esc back"),
        ];

        let paragraph = Paragraph::new(lines)
            .block(
                Block::default()
                    .borders(Borders::ALL)
                    .title(format!("Task {}", task.id)),
            )
            .wrap(Wrap { trim: false });
        f.render_widget(paragraph, area);
    }

    /// Render the add/edit task form.
    fn render_task_form(&mut self, f: &mut Frame, area: Rect, is_edit: bool) {
        let accent = self.accent();
        let chunks = Layout::default()
            .direction(Direction::Vertical)
            .constraints([
                Constraint::Length(3), // title
                Constraint::Length(3), // description
                Constraint::Length(3), // due
                Constraint::Length(3), // category
                Constraint::Length(3), // reminder
                Constraint::Length(3), // priority
                Constraint::Length(3), // recurring
                Constraint::Min(0),
            ])
            .split(area);

        let text_fields = [
            ("Title", &self.task_form.title),
            ("Description", &self.task_form.description),
            ("Due (e.g. tomorrow, 2024-06-01 18:00)", &self.task_form.due),
            ("Category", &self.task_form.category),
            ("Reminder", &self.task_form.reminder),
        ];
        for (i, (label, field)) in text_fields.iter().enumerate() {
            let style = if field.active {
                Style::default().fg(accent)
            } else {
                Style::default()
            };
            let paragraph = Paragraph::new(field.value.clone()).block(
                Block::default()
                    .borders(Borders::ALL)
                    .title(*label)
                    .border_style(style),
            );
            f.render_widget(paragraph, chunks[i]);
        }

        let priority_active = self.task_form.current_field == PRIORITY_FIELD;
        let priority_style = if priority_active {
            Style::default().fg(accent)
        } else {
            Style::default()
        };
        let priority_value = self.task_form.priorities[self.task_form.priority];
        let priority = Paragraph::new(format!("< {} >", format_priority(priority_value)))
            .style(Style::default().fg(priority_color(priority_value)))
            .block(
                Block::default()
                    .borders(Borders::ALL)
                    .title("Priority")
                    .border_style(priority_style),
            );
        f.render_widget(priority, chunks[5]);

        let recurring_active = self.task_form.current_field == RECURRING_FIELD;
        let recurring_style = if recurring_active {
            Style::default().fg(accent)
        } else {
            Style::default()
        };
        let recurring_value = self.task_form.recurrences[self.task_form.recurring];
        let recurring_label = match recurring_value {
            None => "Not recurring".to_string(),
            Some(_) => format_recurring(recurring_value).to_string(),
        };
        let recurring = Paragraph::new(format!("< {} >", recurring_label)).block(
            Block::default()
                .borders(Borders::ALL)
                .title("Repeat")
                .border_style(recurring_style),
        );
        f.render_widget(recurring, chunks[6]);

        let footer = Paragraph::new("Tab/Shift-Tab move | Enter save | Esc cancel")
            .alignment(Alignment::Center)
            .block(Block::default().borders(Borders::ALL).title(if is_edit {
                "Edit Task"
            } else {
                "Add Task"
            }));
        f.render_widget(footer, chunks[7]);
    }

    /// Render the help screen.
    fn render_help(&mut self, f: &mut Frame, area: Rect) {
        let lines = vec![
            Line::from(Span::styled("QuickTasks keys", Style::default().add_modifier(Modifier::BOLD))),
            Line::from(""),
            Line::from("Home:       j/k move, Space toggle done, Enter details"),
            Line::from("            a add, e edit, d delete, x clear completed"),
            Line::from("            / search, t all tasks, c categories, s settings"),
            Line::from("Task list:  v toggle completed visibility, Esc back"),
            Line::from("Categories: Enter drill in, Esc back out"),
            Line::from("Settings:   Left/Right change value, Enter on Clear resets"),
            Line::from("Forms:      Tab/Shift-Tab move, Enter save, Esc cancel"),
            Line::from(""),
            Line::from("q quits from any list view."),
            Line::from(""),
            Line::from("Press any key to return."),
        ];
        let paragraph = Paragraph::new(lines)
            .block(Block::default().borders(Borders::ALL).title("Help"));
        f.render_widget(paragraph, area);
    }

    /// Render the confirmation dialog over the previous view.
    fn render_confirm(&mut self, f: &mut Frame, area: Rect) {
        let block = Block::default()
            .title("Confirm Action")
            .borders(Borders::ALL)
            .style(Style::default().bg(Color::Red));

        let area = centered_rect(50, 20, area);
        f.render_widget(Clear, area);

        let text = vec![
            Line::from(""),
            Line::from(vec![Span::styled(
                "Are you sure you want to:",
                Style::default().add_modifier(Modifier::BOLD),
            )]),
            Line::from(
                self.confirm_action
                    .as_ref()
                    .map(|a| a.describe())
                    .unwrap_or_default(),
            ),
            Line::from(""),
            Line::from("This action cannot be undone."),
            Line::from(""),
            Line::from("Press 'y' to confirm, 'n' to cancel"),
        ];

        let paragraph = Paragraph::new(text)
            .block(block)
            .alignment(Alignment::Center)
            .wrap(Wrap { trim: true });

        f.render_widget(paragraph, area);
    }

    /// Render the status bar at the bottom of the screen.
    fn render_status_bar(&mut self, f: &mut Frame, area: Rect) {
        let status_text = if !self.status_message.is_empty() {
            self.status_message.clone()
        } else if self.input_mode == InputMode::Text {
            format!("Search: {} (Esc to clear, Enter to confirm)", self.search_text)
        } else {
            match self.view {
                View::Home => "Home | Press 'h' for help".to_string(),
                View::TaskList => "All tasks | 'v' toggles completed".to_string(),
                View::TaskDetail => "Task Details".to_string(),
                View::AddTask => "Add New Task".to_string(),
                View::EditTask => "Edit Task".to_string(),
                View::Categories => "Categories".to_string(),
                View::Settings => "Settings".to_string(),
                View::Help => "Help".to_string(),
                View::Confirm => "Confirm Action".to_string(),
            }
        };

        let status = Paragraph::new(status_text)
            .style(Style::default().bg(self.accent()).fg(Color::White))
            .alignment(Alignment::Left);

        f.render_widget(status, area);
    }

    /// Main render function that dispatches to appropriate view renderers.
    fn render(&mut self, f: &mut Frame) {
        let chunks = Layout::default()
            .direction(Direction::Vertical)
            .constraints([Constraint::Min(0), Constraint::Length(1)].as_ref())
            .split(f.area());

        match self.view {
            View::Home => self.render_home(f, chunks[0]),
            View::TaskList => self.render_task_list(f, chunks[0]),
            View::TaskDetail => self.render_task_detail(f, chunks[0]),
            View::AddTask => self.render_task_form(f, chunks[0], false),
            View::EditTask => self.render_task_form(f, chunks[0], true),
            View::Categories => self.render_categories(f, chunks[0]),
            View::Settings => self.render_settings(f, chunks[0]),
            View::Help => self.render_help(f, chunks[0]),
            View::Confirm => {
                match self.return_view {
                    View::TaskList => self.render_task_list(f, chunks[0]),
                    View::Categories => self.render_categories(f, chunks[0]),
                    View::Settings => self.render_settings(f, chunks[0]),
                    View::TaskDetail => self.render_task_detail(f, chunks[0]),
                    _ => self.render_home(f, chunks[0]),
                }
                self.render_confirm(f, chunks[0]);
            }
        }

        self.render_status_bar(f, chunks[1]);
    }

    /// Main event loop for the TUI application.
    ///
    /// Handles rendering and input processing until the user exits.
    pub fn run<B: Backend>(&mut self, terminal: &mut Terminal<B>) -> io::Result<()> {
        loop {
            terminal.draw(|f| self.render(f))?;

            if self.handle_input()? {
                break;
            }
        }
        Ok(())
    }
}

/// Clamp or initialise a table selection for a list of the given length.
fn fix_selection(state: &mut TableState, len: usize) {
    if len == 0 {
        state.select(None);
    } else {
        match state.selected() {
            Some(i) if i < len => {}
            _ => state.select(Some(0)),
        }
    }
}

/// Move a table selection up or down with wrap-around.
fn move_selection(state: &mut TableState, len: usize, down: bool) {
    if len == 0 {
        state.select(None);
        return;
    }
    let current = state.selected().unwrap_or(0);
    let next = if down {
        (current + 1) % len
    } else if current == 0 {
        len - 1
    } else {
        current - 1
    };
    state.select(Some(next));
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;

    fn test_app(tag: &str) -> (App, std::path::PathBuf) {
        let dir = std::env::temp_dir();
        let store = dir.join(format!("qt_app_{}_{}_tasks.json", tag, std::process::id()));
        let settings = dir.join(format!("qt_app_{}_{}_settings.json", tag, std::process::id()));
        let _ = fs::remove_file(&store);
        let _ = fs::remove_file(&settings);
        let mut app = App::new(&store, &settings).unwrap();
        app.view = View::Settings;
        (app, settings)
    }

    #[test]
    fn test_settings_hour_stepping_wraps_and_stays_in_range() {
        let (mut app, settings_path) = test_app("hour");
        app.settings_cursor = SETTING_HOUR;

        // Default hour is 9; one step left lands on 8.
        app.handle_settings_input(KeyCode::Left, KeyModifiers::NONE).unwrap();
        assert_eq!(app.settings.notification_time().0, 8);

        for _ in 0..9 {
            app.handle_settings_input(KeyCode::Left, KeyModifiers::NONE).unwrap();
        }
        assert_eq!(app.settings.notification_time().0, 23);

        app.handle_settings_input(KeyCode::Right, KeyModifiers::NONE).unwrap();
        assert_eq!(app.settings.notification_time().0, 0);
        let _ = fs::remove_file(settings_path);
    }

    #[test]
    fn test_settings_minute_stepping_wraps_and_stays_in_range() {
        let (mut app, settings_path) = test_app("minute");
        app.settings_cursor = SETTING_MINUTE;

        app.handle_settings_input(KeyCode::Right, KeyModifiers::NONE).unwrap();
        assert_eq!(app.settings.notification_time().1, 5);

        app.handle_settings_input(KeyCode::Left, KeyModifiers::NONE).unwrap();
        app.handle_settings_input(KeyCode::Left, KeyModifiers::NONE).unwrap();
        assert_eq!(app.settings.notification_time().1, 55);

        // Stepping never produces an out-of-range component.
        for _ in 0..30 {
            app.handle_settings_input(KeyCode::Right, KeyModifiers::NONE).unwrap();
            let (hour, minute) = app.settings.notification_time();
            assert!(hour < 24 && minute < 60);
        }
        let _ = fs::remove_file(settings_path);
    }
}
