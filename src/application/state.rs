//! Application state management for the terminal calculator.
//!
//! This module holds the calculator session: the expression being built,
//! the displayed result, the history and the UI mode. All of it lives in
//! [`App`], owned by the terminal loop and passed around explicitly.

use std::time::{Duration, Instant};
use log::{debug, info};
use crate::domain::parser::Constant;
use crate::domain::{ExpressionEngine, History, HistoryEntry};
use super::settings::Settings;

/// Result shown before anything has been calculated.
pub const INITIAL_RESULT: &str = "0";

/// Result shown while a failed calculation is on screen.
pub const ERROR_RESULT: &str = "Error";

/// Filename offered when exporting the history.
pub const DEFAULT_EXPORT_FILENAME: &str = "history.json";

/// Represents the current mode of the application.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AppMode {
    /// Keys build and evaluate the expression
    Normal,
    /// Help screen is displayed
    Help,
    /// History export dialog is open
    ExportHistory,
}

/// Main application state for a calculator session.
///
/// # Examples
///
/// ```
/// use tcalc::application::App;
///
/// let mut app = App::default();
/// for ch in "1+2".chars() {
///     match ch {
///         '+' => app.append_operator(ch),
///         _ => app.append_number(ch),
///     }
/// }
/// app.calculate();
///
/// assert_eq!(app.result, "3");
/// assert!(app.expression.is_empty());
/// assert_eq!(app.history.len(), 1);
/// ```
#[derive(Debug)]
pub struct App {
    /// Expression being built
    pub expression: String,
    /// Displayed result: a rendered number, "0" or "Error"
    pub result: String,
    /// Completed calculations, newest first
    pub history: History,
    /// Current application mode
    pub mode: AppMode,
    /// Highlighted history entry, if any
    pub selected_history: Option<usize>,
    /// Scroll position in help text
    pub help_scroll: usize,
    /// Temporary status message to display
    pub status_message: Option<String>,
    /// Input buffer for filename entry
    pub filename_input: String,
    /// Cursor position within the filename buffer
    pub cursor_position: usize,
    error_deadline: Option<Instant>,
    error_display: Duration,
    engine: ExpressionEngine,
}

impl Default for App {
    fn default() -> Self {
        Self::new(Settings::default())
    }
}

impl App {
    pub fn new(settings: Settings) -> Self {
        Self {
            expression: String::new(),
            result: INITIAL_RESULT.to_string(),
            history: History::with_limit(settings.history_limit),
            mode: AppMode::Normal,
            selected_history: None,
            help_scroll: 0,
            status_message: None,
            filename_input: String::new(),
            cursor_position: 0,
            error_deadline: None,
            error_display: settings.error_display,
            engine: ExpressionEngine::new(settings.evaluator),
        }
    }

    /// Whether a failed calculation is currently displayed.
    pub fn is_showing_error(&self) -> bool {
        self.error_deadline.is_some()
    }

    /// Appends a digit or decimal point.
    pub fn append_number(&mut self, digit: char) {
        self.prepare_for_input();
        self.chain_previous_result();
        self.expression.push(digit);
    }

    /// Appends `+ - * /` or a parenthesis.
    ///
    /// A binary operator is only accepted after an operand, so operators are
    /// never doubled. Parentheses are always accepted.
    pub fn append_operator(&mut self, op: char) {
        self.prepare_for_input();
        self.chain_previous_result();

        let last_is_operator = matches!(self.expression.chars().last(), Some('+' | '-' | '*' | '/'));

        if !self.expression.is_empty() && !last_is_operator {
            self.expression.push(op);
        } else if op == '(' || op == ')' {
            self.expression.push(op);
        }
    }

    /// Appends a function prefix such as `sqrt(`.
    pub fn append_function(&mut self, name: &str) {
        self.prepare_for_input();
        self.chain_previous_result();
        self.expression.push_str(name);
        self.expression.push('(');
    }

    /// Appends the symbol for `π` or `e`.
    pub fn append_constant(&mut self, constant: Constant) {
        self.prepare_for_input();
        self.chain_previous_result();
        self.expression.push(constant.symbol());
    }

    /// Clears the expression and resets the result to "0".
    pub fn clear_all(&mut self) {
        self.error_deadline = None;
        self.expression.clear();
        self.result = INITIAL_RESULT.to_string();
    }

    /// Removes the last character of the expression.
    pub fn clear_entry(&mut self) {
        self.prepare_for_input();
        self.expression.pop();
    }

    /// Evaluates the current expression.
    ///
    /// On success the rendered result is displayed and recorded in history
    /// and the expression is cleared. On failure "Error" is displayed until
    /// [`App::expire_error`] is called past the error display time. While
    /// "Error" is displayed this does nothing, so the deadline is not pushed
    /// back.
    pub fn calculate(&mut self) {
        if self.expression.is_empty() || self.is_showing_error() {
            return;
        }

        match self.engine.evaluate_to_string(&self.expression) {
            Ok(result) => {
                info!("{} = {}", self.expression, result);
                let expression = std::mem::take(&mut self.expression);
                self.history.record(HistoryEntry::new(expression, result.clone()));
                self.result = result;
                self.error_deadline = None;
                self.selected_history = None;
            }
            Err(err) => {
                debug!("calculation of {:?} failed: {}", self.expression, err);
                self.result = ERROR_RESULT.to_string();
                self.error_deadline = Some(Instant::now() + self.error_display);
            }
        }
    }

    /// Reverts the error display once its deadline has passed.
    pub fn expire_error(&mut self, now: Instant) {
        if self.error_deadline.is_some_and(|deadline| now >= deadline) {
            self.reset_after_error();
        }
    }

    /// Displays a history entry's result and clears the expression, so the
    /// next key press continues from that result.
    pub fn use_history_result(&mut self, index: usize) {
        if let Some(entry) = self.history.get(index) {
            self.result = entry.result.clone();
            self.expression.clear();
            self.error_deadline = None;
        }
    }

    pub fn use_selected_history(&mut self) {
        if let Some(index) = self.selected_history {
            self.use_history_result(index);
        }
    }

    pub fn clear_history(&mut self) {
        self.history.clear();
        self.selected_history = None;
        self.status_message = Some("History cleared".to_string());
    }

    /// Moves the history highlight towards newer entries.
    pub fn select_previous_history(&mut self) {
        if self.history.is_empty() {
            return;
        }
        self.selected_history = Some(match self.selected_history {
            Some(index) => index.saturating_sub(1),
            None => 0,
        });
    }

    /// Moves the history highlight towards older entries.
    pub fn select_next_history(&mut self) {
        if self.history.is_empty() {
            return;
        }
        let last = self.history.len() - 1;
        self.selected_history = Some(match self.selected_history {
            Some(index) => (index + 1).min(last),
            None => 0,
        });
    }

    pub fn show_help(&mut self) {
        self.mode = AppMode::Help;
        self.help_scroll = 0;
    }

    pub fn close_help(&mut self) {
        self.mode = AppMode::Normal;
    }

    /// Switches to the export dialog with the default filename.
    pub fn start_history_export(&mut self) {
        self.mode = AppMode::ExportHistory;
        self.filename_input = DEFAULT_EXPORT_FILENAME.to_string();
        self.cursor_position = self.filename_input.len();
        self.status_message = None;
    }

    /// Cancels filename input and returns to normal mode.
    pub fn cancel_filename_input(&mut self) {
        self.mode = AppMode::Normal;
        self.filename_input.clear();
        self.cursor_position = 0;
    }

    /// Returns the filename for export, falling back to the default when the
    /// input is blank.
    pub fn get_export_filename(&self) -> String {
        let trimmed = self.filename_input.trim();
        if trimmed.is_empty() {
            DEFAULT_EXPORT_FILENAME.to_string()
        } else {
            trimmed.to_string()
        }
    }

    /// Applies the outcome of an export and returns to normal mode.
    pub fn set_export_result(&mut self, result: Result<String, String>) {
        self.status_message = Some(match result {
            Ok(filename) => format!("Exported {} entries to {}", self.history.len(), filename),
            Err(e) => format!("Export failed: {}", e),
        });
        self.cancel_filename_input();
    }

    /// Any editing while "Error" is displayed starts over from a clean state,
    /// so "Error" is never chained into a new expression.
    fn prepare_for_input(&mut self) {
        self.status_message = None;
        if self.is_showing_error() {
            self.reset_after_error();
        }
    }

    /// Starts a new expression from the previous result.
    fn chain_previous_result(&mut self) {
        if self.expression.is_empty() && self.result != INITIAL_RESULT {
            self.expression = self.result.clone();
        }
    }

    fn reset_after_error(&mut self) {
        self.error_deadline = None;
        self.result = INITIAL_RESULT.to_string();
        self.expression.clear();
    }
}
