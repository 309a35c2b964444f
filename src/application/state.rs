//! Application state for the terminal sign-up wizard.
//!
//! Holds the wizard controller plus everything the view needs around it:
//! the in-progress form inputs, field focus, cursor and inline errors.

use crate::domain::{default_countries, Field, FieldValues, ValidationReport};
use super::controller::{StepOutcome, Submission, WizardController};

/// Project page shown in the header.
pub const DEFAULT_PROJECT_LINK: &str = "https://github.com/NeiruBugz/next-amplify-beta-routing";

/// Which screen is showing and how keys are interpreted.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AppMode {
    /// Landing screen with the "To Booking" action
    Home,
    /// The multi-step form
    Wizard,
    /// Key binding help popup
    Help,
    /// Confirmation after a successful submission
    Submitted,
}

/// Main application state.
///
/// # Examples
///
/// ```
/// use signup_wizard::application::{App, AppMode};
///
/// let mut app = App::default();
/// assert_eq!(app.mode, AppMode::Home);
/// app.open_booking();
/// assert_eq!(app.mode, AppMode::Wizard);
/// assert_eq!(app.controller.step(), 0);
/// ```
#[derive(Debug)]
pub struct App {
    /// Step controller owning the wizard store
    pub controller: WizardController,
    /// Current application mode
    pub mode: AppMode,
    /// Current form inputs, across all steps
    pub form: FieldValues,
    /// Index of the focused field within the current step
    pub focus: usize,
    /// Cursor position within the focused field, in characters
    pub cursor_position: usize,
    /// Inline messages from the last rejected step
    pub errors: ValidationReport,
    /// Temporary status message to display
    pub status_message: Option<String>,
    /// Scroll position in help text
    pub help_scroll: usize,
    /// Result of the finished session, if any
    pub submission: Option<Submission>,
    /// Options offered by the country selector
    pub countries: Vec<String>,
    /// Link shown next to the title in the header
    pub project_link: String,
    help_return: AppMode,
    synced_revision: u64,
}

impl Default for App {
    fn default() -> Self {
        Self::new(WizardController::default(), default_countries())
    }
}

impl App {
    pub fn new(controller: WizardController, countries: Vec<String>) -> Self {
        Self {
            synced_revision: controller.store().values_revision(),
            controller,
            mode: AppMode::Home,
            form: FieldValues::new(),
            focus: 0,
            cursor_position: 0,
            errors: ValidationReport::new(),
            status_message: None,
            help_scroll: 0,
            submission: None,
            countries,
            project_link: DEFAULT_PROJECT_LINK.to_string(),
            help_return: AppMode::Home,
        }
    }

    /// Leaves the landing screen for the form.
    pub fn open_booking(&mut self) {
        self.mode = AppMode::Wizard;
        self.status_message = None;
        self.focus = 0;
        self.move_cursor_to_end();
    }

    pub fn go_home(&mut self) {
        self.mode = AppMode::Home;
        self.status_message = None;
    }

    pub fn show_help(&mut self) {
        if self.mode != AppMode::Help {
            self.help_return = self.mode;
        }
        self.mode = AppMode::Help;
        self.help_scroll = 0;
    }

    pub fn close_help(&mut self) {
        self.mode = self.help_return;
    }

    pub fn visible_fields(&self) -> &'static [Field] {
        self.controller.current_fields()
    }

    pub fn focused_field(&self) -> Option<Field> {
        self.visible_fields().get(self.focus).copied()
    }

    pub fn field_value(&self, field: Field) -> &str {
        self.form.get(&field).map(String::as_str).unwrap_or("")
    }

    pub fn focus_next(&mut self) {
        let count = self.visible_fields().len();
        if count > 0 {
            self.focus = (self.focus + 1) % count;
            self.move_cursor_to_end();
        }
    }

    pub fn focus_previous(&mut self) {
        let count = self.visible_fields().len();
        if count > 0 {
            self.focus = (self.focus + count - 1) % count;
            self.move_cursor_to_end();
        }
    }

    /// Types `c` into the focused text field.
    pub fn insert_char(&mut self, c: char) {
        let Some(field) = self.focused_field() else { return };
        if field.is_choice() {
            return;
        }
        let value = self.form.entry(field).or_default();
        let offset = byte_offset(value, self.cursor_position);
        value.insert(offset, c);
        self.cursor_position += 1;
    }

    pub fn delete_backward(&mut self) {
        if self.cursor_position == 0 {
            return;
        }
        let Some(field) = self.editable_field() else { return };
        if let Some(value) = self.form.get_mut(&field) {
            let offset = byte_offset(value, self.cursor_position - 1);
            if offset < value.len() {
                value.remove(offset);
                self.cursor_position -= 1;
            }
        }
    }

    pub fn delete_forward(&mut self) {
        let Some(field) = self.editable_field() else { return };
        if let Some(value) = self.form.get_mut(&field) {
            let offset = byte_offset(value, self.cursor_position);
            if offset < value.len() {
                value.remove(offset);
            }
        }
    }

    pub fn move_cursor_left(&mut self) {
        self.cursor_position = self.cursor_position.saturating_sub(1);
    }

    pub fn move_cursor_right(&mut self) {
        if self.cursor_position < self.focused_len() {
            self.cursor_position += 1;
        }
    }

    pub fn move_cursor_home(&mut self) {
        self.cursor_position = 0;
    }

    pub fn move_cursor_to_end(&mut self) {
        self.cursor_position = self.focused_len();
    }

    /// Steps the focused selector through the country list.
    pub fn cycle_choice(&mut self, forward: bool) {
        let Some(field) = self.focused_field() else { return };
        if !field.is_choice() || self.countries.is_empty() {
            return;
        }

        let count = self.countries.len();
        let current = self.countries.iter().position(|c| c == self.field_value(field));
        let index = match (current, forward) {
            (None, true) => 0,
            (None, false) => count - 1,
            (Some(i), true) => (i + 1) % count,
            (Some(i), false) => (i + count - 1) % count,
        };
        self.form.insert(field, self.countries[index].clone());
        self.errors = without(&self.errors, field);
    }

    /// "Next" on intermediate steps, "Send" on the last.
    pub fn next_step(&mut self) {
        match self.controller.next(&self.form) {
            StepOutcome::Advanced { to, .. } => {
                self.errors.clear();
                self.focus = 0;
                self.sync_from_store();
                self.move_cursor_to_end();
                self.status_message = Some(format!(
                    "Step {} of {}",
                    to + 1,
                    self.controller.variant().step_count()
                ));
            }
            StepOutcome::Rejected(report) => {
                if let Some(position) = report
                    .first_invalid()
                    .and_then(|field| self.visible_fields().iter().position(|f| *f == field))
                {
                    self.focus = position;
                    self.move_cursor_to_end();
                }
                self.errors = report;
                self.status_message = None;
            }
            StepOutcome::Submitted(submission) => {
                self.errors.clear();
                self.sync_from_store();
                self.submission = Some(submission);
                self.mode = AppMode::Submitted;
                self.status_message = Some("Form submitted".to_string());
            }
            StepOutcome::Aborted(error) => {
                self.status_message = Some(format!("Could not validate: {}", error));
            }
        }
    }

    /// "Prev"; a no-op on the first step.
    pub fn previous_step(&mut self) {
        if self.controller.prev() {
            self.errors.clear();
            self.focus = 0;
            self.sync_from_store();
            self.move_cursor_to_end();
            self.status_message = None;
        }
    }

    /// Copies stored values back into the form inputs after the stored
    /// values changed. Step moves alone never overwrite what was typed.
    pub fn sync_from_store(&mut self) {
        let store = self.controller.store();
        if store.values_revision() == self.synced_revision {
            return;
        }
        for (field, value) in store.values() {
            self.form.insert(*field, value.clone());
        }
        self.synced_revision = store.values_revision();
    }

    /// Throws the session away and starts the form over.
    pub fn restart(&mut self) {
        self.controller.reset();
        self.synced_revision = self.controller.store().values_revision();
        self.form.clear();
        self.errors.clear();
        self.submission = None;
        self.status_message = None;
        self.mode = AppMode::Wizard;
        self.focus = 0;
        self.cursor_position = 0;
    }

    fn editable_field(&self) -> Option<Field> {
        self.focused_field().filter(|field| !field.is_choice())
    }

    fn focused_len(&self) -> usize {
        self.focused_field()
            .map(|field| self.field_value(field).chars().count())
            .unwrap_or(0)
    }
}

fn byte_offset(value: &str, char_index: usize) -> usize {
    value
        .char_indices()
        .nth(char_index)
        .map(|(i, _)| i)
        .unwrap_or(value.len())
}

fn without(report: &ValidationReport, field: Field) -> ValidationReport {
    let mut trimmed = ValidationReport::new();
    for (f, message) in report.errors() {
        if *f != field {
            trimmed.add(*f, message.clone());
        }
    }
    trimmed
}
