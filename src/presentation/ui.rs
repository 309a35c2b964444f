use crate::application::{App, AppMode};
use crate::domain::{Field, WizardVariant};
use ratatui::{
    layout::{Alignment, Constraint, Direction, Layout, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Clear, Paragraph},
    Frame,
};

pub fn render_ui(f: &mut Frame, app: &App) {
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(1),
            Constraint::Min(0),
            Constraint::Length(3),
        ])
        .split(f.area());

    render_header(f, app, chunks[0]);
    match app.mode {
        AppMode::Home => render_home(f, chunks[1]),
        AppMode::Wizard => render_wizard(f, app, chunks[1]),
        AppMode::Submitted => render_submitted(f, app, chunks[1]),
        AppMode::Help => {}
    }
    render_status_bar(f, app, chunks[2]);

    if matches!(app.mode, AppMode::Help) {
        render_help_popup(f, app);
    }
}

fn render_header(f: &mut Frame, app: &App, area: Rect) {
    let location = match app.mode {
        AppMode::Home => "Home".to_string(),
        AppMode::Wizard => format!("Booking | Step: {}", app.controller.step()),
        AppMode::Submitted => "Booking | Sent".to_string(),
        AppMode::Help => "Help".to_string(),
    };
    let halves = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([Constraint::Min(0), Constraint::Length(app.project_link.chars().count() as u16)])
        .split(area);

    let title = Paragraph::new(format!("signup-wizard - Sign-up Form | {}", location))
        .style(Style::default().fg(Color::Cyan));
    let link = Paragraph::new(app.project_link.as_str())
        .style(Style::default().fg(Color::Blue).add_modifier(Modifier::UNDERLINED))
        .alignment(Alignment::Right);
    f.render_widget(title, halves[0]);
    f.render_widget(link, halves[1]);
}

fn render_home(f: &mut Frame, area: Rect) {
    let lines = vec![
        Line::from(""),
        Line::from(Span::styled(
            "[ To Booking ]",
            Style::default().fg(Color::Black).bg(Color::LightBlue).add_modifier(Modifier::BOLD),
        )),
        Line::from(""),
        Line::from(Span::styled("Press Enter to start", Style::default().fg(Color::DarkGray))),
    ];
    let home = Paragraph::new(lines)
        .alignment(Alignment::Center)
        .block(Block::default().borders(Borders::ALL).title("Home"));
    f.render_widget(home, centered(area, 50, 8));
}

fn render_wizard(f: &mut Frame, app: &App, area: Rect) {
    let fields = app.visible_fields();
    let form_height = 2 + 1 + fields.len() as u16 * 4 + 2;
    let form_area = centered(area, 60, form_height);

    let block = Block::default().borders(Borders::ALL).title("Form");
    let inner = block.inner(form_area);
    f.render_widget(block, form_area);

    let mut constraints = vec![Constraint::Length(1)];
    for _ in fields {
        constraints.push(Constraint::Length(3));
        constraints.push(Constraint::Length(1));
    }
    constraints.push(Constraint::Length(1));
    constraints.push(Constraint::Min(0));
    let rows = Layout::default()
        .direction(Direction::Vertical)
        .constraints(constraints)
        .split(inner);

    f.render_widget(Paragraph::new(format!("Step: {}", app.controller.step())), rows[0]);

    for (index, field) in fields.iter().enumerate() {
        let input_area = rows[1 + index * 2];
        let error_area = rows[2 + index * 2];
        let focused = index == app.focus;

        render_field(f, app, *field, focused, input_area);

        if let Some(message) = app.errors.message(*field) {
            let error = Paragraph::new(message).style(Style::default().fg(Color::Red));
            f.render_widget(error, error_area);
        }

        if focused && !field.is_choice() {
            let x = input_area.x + 1 + app.cursor_position as u16;
            let max_x = input_area.x + input_area.width.saturating_sub(2);
            f.set_cursor_position((x.min(max_x), input_area.y + 1));
        }
    }

    render_buttons(f, app, rows[1 + fields.len() * 2]);
}

fn render_field(f: &mut Frame, app: &App, field: Field, focused: bool, area: Rect) {
    let value = app.field_value(field);
    let content = if value.is_empty() {
        Span::styled(field.placeholder(), Style::default().fg(Color::DarkGray))
    } else if field.is_secret() {
        Span::raw("*".repeat(value.chars().count()))
    } else {
        Span::raw(value.to_string())
    };

    let mut line = vec![content];
    if field.is_choice() {
        line.push(Span::styled("  ◀ ▶", Style::default().fg(Color::DarkGray)));
    }

    let border_style = if focused {
        Style::default().fg(Color::Yellow)
    } else {
        Style::default()
    };
    let input = Paragraph::new(Line::from(line)).block(
        Block::default()
            .borders(Borders::ALL)
            .border_style(border_style)
            .title(field.label()),
    );
    f.render_widget(input, area);
}

fn render_buttons(f: &mut Frame, app: &App, area: Rect) {
    let prev_style = if app.controller.is_first_step() {
        Style::default().fg(Color::DarkGray)
    } else {
        Style::default().fg(Color::White)
    };
    let primary = if app.controller.is_last_step() { "[ Send ]" } else { "[ Next ]" };

    let halves = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([Constraint::Percentage(50), Constraint::Percentage(50)])
        .split(area);
    f.render_widget(Paragraph::new(Span::styled("[ Prev ]", prev_style)), halves[0]);
    f.render_widget(
        Paragraph::new(Span::styled(primary, Style::default().fg(Color::Green).add_modifier(Modifier::BOLD)))
            .alignment(Alignment::Right),
        halves[1],
    );
}

fn render_submitted(f: &mut Frame, app: &App, area: Rect) {
    let (email, country) = app
        .submission
        .as_ref()
        .map(|s| (s.value(Field::Email), s.value(Field::Country)))
        .unwrap_or((None, None));

    let mut lines = vec![
        Line::from(Span::styled("Thanks, your form was sent.", Style::default().add_modifier(Modifier::BOLD))),
        Line::from(""),
        Line::from(format!("Email:   {}", email.unwrap_or("-"))),
    ];
    if let Some(country) = country {
        lines.push(Line::from(format!("Country: {}", country)));
    }
    let summary = Paragraph::new(lines).block(Block::default().borders(Borders::ALL).title("Sent"));
    f.render_widget(summary, centered(area, 50, 7));
}

fn render_status_bar(f: &mut Frame, app: &App, area: Rect) {
    let input_text = if let Some(ref status) = app.status_message {
        status.clone()
    } else {
        match app.mode {
            AppMode::Home => "Enter: to booking | F1/?: help | q: quit".to_string(),
            AppMode::Wizard => {
                let primary = if app.controller.is_last_step() { "send" } else { "next" };
                format!("Enter: {} | Esc: prev | Tab/↑↓: field | ←→: choose | F1: help | Ctrl+C: quit", primary)
            }
            AppMode::Submitted => "r/Enter: new form | h: home | q: quit".to_string(),
            AppMode::Help => "↑↓/jk: scroll | PgUp/PgDn: fast scroll | Home: top | Esc/q: close help".to_string(),
        }
    };

    let input = Paragraph::new(input_text)
        .block(Block::default().borders(Borders::ALL).title("Status"))
        .style(match app.mode {
            AppMode::Home => Style::default(),
            AppMode::Wizard => Style::default().fg(Color::Green),
            AppMode::Help => Style::default().fg(Color::Cyan),
            AppMode::Submitted => Style::default().fg(Color::Yellow),
        });
    f.render_widget(input, area);
}

fn render_help_popup(f: &mut Frame, app: &App) {
    let scroll = app.help_scroll;
    let area = f.area();
    let popup_area = Rect {
        x: area.width / 10,
        y: area.height / 10,
        width: area.width * 4 / 5,
        height: area.height * 4 / 5,
    };

    f.render_widget(Clear, popup_area);

    let help_text = help_text(app.controller.variant());
    let help_lines: Vec<&str> = help_text.lines().collect();
    let visible_height = popup_area.height.saturating_sub(2) as usize;

    let start_line = scroll.min(help_lines.len().saturating_sub(visible_height));
    let end_line = (start_line + visible_height).min(help_lines.len());

    let visible_text = help_lines[start_line..end_line].join("\n");

    let help_widget = Paragraph::new(visible_text)
        .block(Block::default()
            .borders(Borders::ALL)
            .title(format!("signup-wizard Help (Line {}/{})", start_line + 1, help_lines.len()))
            .style(Style::default().fg(Color::Cyan)))
        .style(Style::default().fg(Color::White));

    f.render_widget(help_widget, popup_area);
}

/// Rect of at most `width` x `height`, centered in `area`.
fn centered(area: Rect, width: u16, height: u16) -> Rect {
    let width = width.min(area.width);
    let height = height.min(area.height);
    Rect {
        x: area.x + (area.width - width) / 2,
        y: area.y + (area.height - height) / 2,
        width,
        height,
    }
}

/// Key binding reference; the steps section follows the form variant.
fn help_text(variant: WizardVariant) -> String {
    let mut steps = vec![
        "1. Email            must be a valid address",
        "2. Password         at least 8 characters, confirmation must match",
    ];
    if variant == WizardVariant::ThreeStep {
        steps.push("3. Country          pick one from the list");
    }

    format!(
        "SIGN-UP FORM\n\n=== STEPS ===\n{}\n\n{}",
        steps.join("\n"),
        HELP_KEYS
    )
}

const HELP_KEYS: &str = r#"The form only moves on once the fields of the current step are valid.
Going back keeps everything you typed. Send is offered on the last step.

=== HOME ===
Enter / b       Open the booking form
F1 or ?         Show this help
q               Quit

=== FORM ===
Enter / PgDn    Next step (Send on the last step)
Esc / PgUp      Previous step (Esc on the first step returns home)
Tab / ↓         Focus next field
Shift+Tab / ↑   Focus previous field
← →             Move cursor, or change the selected country
Space           Change the selected country
Home / End      Jump to start or end of the field
Backspace/Del   Delete characters
F1              Show this help
Ctrl+C          Quit

=== AFTER SENDING ===
r / Enter       Start a new form
h / Esc         Back to home
q               Quit

=== HELP NAVIGATION ===
↑↓ or j/k       Scroll help text up/down one line
Page Up/Down    Scroll help text up/down 5 lines
Home            Jump to top of help text
Esc/F1/?/q      Close this help window"#;

#[cfg(test)]
mod tests {
    use super::*;
    use crate::application::DEFAULT_PROJECT_LINK;
    use ratatui::{backend::TestBackend, buffer::Buffer, Terminal};

    fn render(app: &App) -> Buffer {
        let backend = TestBackend::new(120, 30);
        let mut terminal = Terminal::new(backend).unwrap();
        terminal.draw(|f| render_ui(f, app)).unwrap();
        terminal.backend().buffer().clone()
    }

    fn rows(buffer: &Buffer) -> Vec<String> {
        buffer
            .content()
            .chunks(buffer.area.width as usize)
            .map(|row| row.iter().map(|cell| cell.symbol()).collect::<String>())
            .collect()
    }

    fn draw(app: &App) -> String {
        rows(&render(app)).join("\n")
    }

    /// Foreground color of the first cell of `text` on screen.
    fn fg_of(buffer: &Buffer, text: &str) -> Option<Color> {
        let width = buffer.area.width as usize;
        rows(buffer).iter().enumerate().find_map(|(y, row)| {
            let byte = row.find(text)?;
            let x = row[..byte].chars().count();
            Some(buffer.content()[y * width + x].fg)
        })
    }

    fn type_text(app: &mut App, text: &str) {
        for c in text.chars() {
            app.insert_char(c);
        }
    }

    #[test]
    fn test_home_screen_offers_booking() {
        let app = App::default();
        assert!(draw(&app).contains("To Booking"));
    }

    #[test]
    fn test_header_shows_title_and_project_link() {
        let mut app = App::default();
        let screen = draw(&app);
        let header = screen.lines().next().unwrap();
        assert!(header.contains("signup-wizard"));
        assert!(header.contains(DEFAULT_PROJECT_LINK));

        app.project_link = "https://example.org/form".to_string();
        let screen = draw(&app);
        assert!(screen.lines().next().unwrap().contains("https://example.org/form"));
    }

    #[test]
    fn test_password_fields_are_masked() {
        let mut app = App::default();
        app.open_booking();
        type_text(&mut app, "a@b.com");
        app.next_step();
        type_text(&mut app, "hunter22");

        let screen = draw(&app);
        assert!(screen.contains("Step: 1"));
        assert!(screen.contains("********"));
        assert!(!screen.contains("hunter22"));
    }

    #[test]
    fn test_first_step_shows_errors_next_and_disabled_prev() {
        let mut app = App::default();
        app.open_booking();
        app.next_step();

        let buffer = render(&app);
        let screen = rows(&buffer).join("\n");
        assert!(screen.contains("invalid email"));
        assert!(screen.contains("[ Next ]"));
        assert!(!screen.contains("[ Send ]"));
        assert_eq!(fg_of(&buffer, "[ Prev ]"), Some(Color::DarkGray));
    }

    #[test]
    fn test_last_step_offers_send() {
        let mut app = App::default();
        app.open_booking();
        type_text(&mut app, "a@b.com");
        app.next_step();
        type_text(&mut app, "longenough1");
        app.focus_next();
        type_text(&mut app, "longenough1");
        app.next_step();
        assert!(app.controller.is_last_step());

        let buffer = render(&app);
        let screen = rows(&buffer).join("\n");
        assert!(screen.contains("[ Send ]"));
        assert!(!screen.contains("[ Next ]"));
        assert!(screen.contains("Select country"));
        assert_eq!(fg_of(&buffer, "[ Prev ]"), Some(Color::White));
    }

    #[test]
    fn test_help_popup_rendered() {
        let mut app = App::default();
        app.show_help();
        let screen = draw(&app);
        assert!(screen.contains("SIGN-UP FORM"));
        assert!(screen.contains("3. Country"));
    }

    #[test]
    fn test_help_steps_follow_variant() {
        let two_step = help_text(WizardVariant::TwoStep);
        assert!(two_step.contains("2. Password"));
        assert!(!two_step.contains("3. Country"));

        let three_step = help_text(WizardVariant::ThreeStep);
        assert!(three_step.contains("3. Country"));
        assert!(three_step.contains("=== HELP NAVIGATION ==="));
    }

    #[test]
    fn test_centered_fits_small_area() {
        let area = Rect { x: 0, y: 0, width: 10, height: 4 };
        let rect = centered(area, 50, 8);
        assert_eq!(rect, area);
    }
}
