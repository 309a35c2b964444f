use crate::application::{App, AppMode};
use crossterm::event::{KeyCode, KeyModifiers};

pub struct InputHandler;

impl InputHandler {
    pub fn handle_key_event(app: &mut App, key: KeyCode, modifiers: KeyModifiers) {
        log::debug!("key {:?} ({:?}) in {:?} mode", key, modifiers, app.mode);
        match app.mode {
            AppMode::Home => Self::handle_home_mode(app, key),
            AppMode::Wizard => Self::handle_wizard_mode(app, key, modifiers),
            AppMode::Help => Self::handle_help_mode(app, key),
            AppMode::Submitted => Self::handle_submitted_mode(app, key),
        }
    }

    /// Whether `key` should end the program in the current mode.
    pub fn is_quit(app: &App, key: KeyCode, modifiers: KeyModifiers) -> bool {
        if modifiers.contains(KeyModifiers::CONTROL) && key == KeyCode::Char('c') {
            return true;
        }
        key == KeyCode::Char('q') && matches!(app.mode, AppMode::Home | AppMode::Submitted)
    }

    fn handle_home_mode(app: &mut App, key: KeyCode) {
        match key {
            KeyCode::Enter | KeyCode::Char('b') => app.open_booking(),
            KeyCode::F(1) | KeyCode::Char('?') => app.show_help(),
            _ => {}
        }
    }

    fn handle_wizard_mode(app: &mut App, key: KeyCode, modifiers: KeyModifiers) {
        let on_choice = app.focused_field().is_some_and(|field| field.is_choice());

        match key {
            KeyCode::Enter | KeyCode::PageDown => app.next_step(),
            KeyCode::PageUp => app.previous_step(),
            KeyCode::Esc => {
                if app.controller.is_first_step() {
                    app.go_home();
                } else {
                    app.previous_step();
                }
            }
            KeyCode::Tab | KeyCode::Down => app.focus_next(),
            KeyCode::BackTab | KeyCode::Up => app.focus_previous(),
            KeyCode::Left if on_choice => app.cycle_choice(false),
            KeyCode::Right if on_choice => app.cycle_choice(true),
            KeyCode::Left => app.move_cursor_left(),
            KeyCode::Right => app.move_cursor_right(),
            KeyCode::Home => app.move_cursor_home(),
            KeyCode::End => app.move_cursor_to_end(),
            KeyCode::Backspace => app.delete_backward(),
            KeyCode::Delete => app.delete_forward(),
            KeyCode::F(1) => app.show_help(),
            KeyCode::Char(' ') if on_choice => app.cycle_choice(true),
            KeyCode::Char(c) if !modifiers.contains(KeyModifiers::CONTROL) => app.insert_char(c),
            _ => {}
        }
    }

    fn handle_help_mode(app: &mut App, key: KeyCode) {
        match key {
            KeyCode::Esc | KeyCode::F(1) | KeyCode::Char('?') | KeyCode::Char('q') => {
                app.close_help();
            }
            KeyCode::Up | KeyCode::Char('k') => {
                app.help_scroll = app.help_scroll.saturating_sub(1);
            }
            KeyCode::Down | KeyCode::Char('j') => {
                app.help_scroll += 1;
            }
            KeyCode::PageUp => {
                app.help_scroll = app.help_scroll.saturating_sub(5);
            }
            KeyCode::PageDown => {
                app.help_scroll += 5;
            }
            KeyCode::Home => {
                app.help_scroll = 0;
            }
            _ => {}
        }
    }

    fn handle_submitted_mode(app: &mut App, key: KeyCode) {
        match key {
            KeyCode::Enter | KeyCode::Char('r') => app.restart(),
            KeyCode::Char('h') | KeyCode::Esc => app.go_home(),
            KeyCode::F(1) | KeyCode::Char('?') => app.show_help(),
            _ => {}
        }
    }
}
