//! signup-wizard - Terminal Sign-up Form
//!
//! A multi-step sign-up form (email, password, country) for the terminal.
//! Each step must validate before the form moves on; the last step sends
//! the collected answers to the configured analytics sink.

use std::io;
use std::path::PathBuf;

use clap::Parser;
use crossterm::{
    event::{self, DisableMouseCapture, EnableMouseCapture, Event, KeyEventKind},
    execute,
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
};
use ratatui::{
    backend::{Backend, CrosstermBackend},
    Terminal,
};

use signup_wizard::application::{App, WizardController};
use signup_wizard::domain::WizardVariant;
use signup_wizard::infrastructure::{init_logging, Config, DEFAULT_CONFIG_FILE, WRITE_KEY_ENV};
use signup_wizard::presentation::{render_ui, InputHandler};

#[derive(Debug, Parser)]
#[command(name = "signup-wizard", version, about = "Multi-step sign-up form in the terminal")]
struct Cli {
    /// Path to the JSON config file
    #[arg(short, long, default_value = DEFAULT_CONFIG_FILE)]
    config: PathBuf,

    /// Form variant: two_step or three_step
    #[arg(long)]
    variant: Option<WizardVariant>,

    /// Where log output goes
    #[arg(long)]
    log_file: Option<PathBuf>,

    /// Segment write key, used when the config file sets none
    #[arg(long, env = WRITE_KEY_ENV, hide_env_values = true)]
    segment_write_key: Option<String>,
}

/// Entry point for the sign-up wizard.
///
/// Loads configuration, routes logging to a file, sets up the terminal
/// and runs the event loop until the user quits.
///
/// # Errors
///
/// Returns an error if the config is invalid, the log file cannot be
/// opened, or terminal setup fails.
fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();

    let mut config = Config::load(&cli.config)?.with_write_key_from(cli.segment_write_key);
    if let Some(variant) = cli.variant {
        config.variant = variant;
    }
    if let Some(log_file) = cli.log_file {
        config.log_file = log_file;
    }

    init_logging(&config.log_file)?;
    log::info!("signup-wizard v{} starting ({} variant)", env!("CARGO_PKG_VERSION"), config.variant);

    let controller = WizardController::new(
        config.variant,
        Box::new(config.schema()),
        config.analytics_sink()?,
    );
    let mut app = App::new(controller, config.countries.clone());
    app.project_link = config.project_link.clone();

    enable_raw_mode()?;
    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen, EnableMouseCapture)?;
    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend)?;

    let res = run_app(&mut terminal, &mut app);

    disable_raw_mode()?;
    execute!(
        terminal.backend_mut(),
        LeaveAlternateScreen,
        DisableMouseCapture
    )?;
    terminal.show_cursor()?;

    if let Err(err) = res {
        log::error!("terminal error: {}", err);
        println!("{err:?}");
    }

    log::info!("signup-wizard exiting");
    Ok(())
}

/// Main application event loop.
///
/// Redraws after every key press and stops on a quit key.
fn run_app<B: Backend>(terminal: &mut Terminal<B>, app: &mut App) -> io::Result<()> {
    loop {
        terminal.draw(|f| render_ui(f, app))?;

        if let Event::Key(key) = event::read()? {
            if key.kind == KeyEventKind::Press {
                if InputHandler::is_quit(app, key.code, key.modifiers) {
                    return Ok(());
                }
                InputHandler::handle_key_event(app, key.code, key.modifiers);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn test_cli_defaults() {
        let cli = Cli::try_parse_from(["signup-wizard"]).unwrap();
        assert_eq!(cli.config, PathBuf::from(DEFAULT_CONFIG_FILE));
        assert!(cli.variant.is_none());
        assert!(cli.log_file.is_none());
    }

    #[test]
    fn test_cli_write_key_flag() {
        let cli = Cli::try_parse_from([
            "signup-wizard",
            "--variant",
            "two_step",
            "--segment-write-key",
            "flag-key",
        ])
        .unwrap();
        assert_eq!(cli.variant, Some(WizardVariant::TwoStep));
        assert_eq!(cli.segment_write_key.as_deref(), Some("flag-key"));
    }

    #[test]
    fn test_cli_write_key_is_read_from_env() {
        let command = Cli::command();
        let arg = command
            .get_arguments()
            .find(|arg| arg.get_id() == "segment_write_key")
            .unwrap();
        assert_eq!(arg.get_env(), Some(std::ffi::OsStr::new(WRITE_KEY_ENV)));
    }
}
