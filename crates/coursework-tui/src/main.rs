//! Coursework TUI - account, quiz, and practice exercises in the terminal.
//!
//! Keyboard-driven front end for the coursework service: log in and edit
//! your profile, take the quiz, and play the flip-match, keyboard, and
//! colour-picker exercises.

mod app;
mod ui;

use std::io::{self, Write};
use std::time::{Duration, Instant};

use anyhow::{Context, Result};
use crossterm::{
    event::{
        self, Event, KeyCode, KeyModifiers, KeyboardEnhancementFlags,
        PopKeyboardEnhancementFlags, PushKeyboardEnhancementFlags,
    },
    execute,
    terminal::{
        disable_raw_mode, enable_raw_mode, supports_keyboard_enhancement, EnterAlternateScreen,
        LeaveAlternateScreen,
    },
};
use ratatui::{backend::CrosstermBackend, Terminal};
use tracing::{info, warn};
use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

use coursework_core::auth::{Credentials, RestoreOutcome};
use coursework_core::{AuthFlow, Config};

use app::{App, AppState};
use ui::input::handle_input;
use ui::render::render;

// ============================================================================
// Constants
// ============================================================================

/// Timeout for polling terminal events (in milliseconds)
const EVENT_POLL_TIMEOUT_MS: u64 = 100;

const LOG_FILE: &str = "coursework.log";

fn env_filter() -> EnvFilter {
    // Use RUST_LOG env var to control log level (e.g., RUST_LOG=debug)
    EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"))
}

/// Log to stderr, for the non-interactive commands
fn init_stderr_tracing() {
    tracing_subscriber::registry()
        .with(fmt::layer().with_writer(io::stderr))
        .with(env_filter())
        .init();
}

/// Log to a file in the data directory; the TUI owns the terminal.
/// The returned guard flushes the writer when dropped.
fn init_file_tracing(config: &Config) -> Option<WorkerGuard> {
    let dir = config.data_dir().ok()?;
    if std::fs::create_dir_all(&dir).is_err() {
        return None;
    }
    let appender = tracing_appender::rolling::never(dir, LOG_FILE);
    let (writer, guard) = tracing_appender::non_blocking(appender);

    tracing_subscriber::registry()
        .with(fmt::layer().with_writer(writer).with_ansi(false))
        .with(env_filter())
        .init();
    Some(guard)
}

fn load_config() -> Config {
    Config::load().unwrap_or_else(|e| {
        warn!(error = %e, "Failed to load config, using defaults");
        Config::default()
    })
}

#[tokio::main]
async fn main() -> Result<()> {
    // Load .env file if present (silently ignore if not found)
    let _ = dotenvy::dotenv();

    // Check for CLI commands
    let args: Vec<String> = std::env::args().collect();
    if args.len() > 1 {
        init_stderr_tracing();
        return match args[1].as_str() {
            "--login" => cli_login().await,
            "--logout" => cli_logout().await,
            "--whoami" => cli_whoami().await,
            other => {
                eprintln!("Unknown option: {}", other);
                eprintln!("Usage: coursework [--login | --logout | --whoami]");
                Ok(())
            }
        };
    }

    let config = load_config();
    let _log_guard = init_file_tracing(&config);
    info!("Coursework TUI starting");

    // Create app before touching the terminal so config errors print normally
    let mut app = App::new(config)?;

    // Setup terminal
    enable_raw_mode()?;
    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen)?;

    // Key release events light up the on-screen keyboard precisely where
    // the terminal reports them
    let enhanced = matches!(supports_keyboard_enhancement(), Ok(true));
    if enhanced {
        execute!(
            stdout,
            PushKeyboardEnhancementFlags(KeyboardEnhancementFlags::REPORT_EVENT_TYPES)
        )?;
    }
    app.key_release_supported = enhanced;

    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend)?;

    // Pick up a saved session, or show the login form
    terminal.draw(|f| render(f, &mut app))?;
    app.restore_session().await;

    // Main loop
    let result = run_app(&mut terminal, &mut app).await;

    // Restore terminal
    if enhanced {
        execute!(terminal.backend_mut(), PopKeyboardEnhancementFlags)?;
    }
    disable_raw_mode()?;
    execute!(terminal.backend_mut(), LeaveAlternateScreen)?;
    terminal.show_cursor()?;

    if let Err(e) = result {
        eprintln!("Error: {}", e);
    }

    info!("Coursework TUI shutting down");
    Ok(())
}

async fn run_app(
    terminal: &mut Terminal<CrosstermBackend<io::Stdout>>,
    app: &mut App,
) -> Result<()> {
    loop {
        // Draw UI
        terminal.draw(|f| render(f, app))?;

        // Poll for events with timeout to allow background updates
        if event::poll(Duration::from_millis(EVENT_POLL_TIMEOUT_MS))? {
            if let Event::Key(key) = event::read()? {
                // Ctrl+C to quit
                if key.code == KeyCode::Char('c') && key.modifiers.contains(KeyModifiers::CONTROL) {
                    return Ok(());
                }

                // Handle input
                if handle_input(app, key).await? {
                    return Ok(());
                }
            }
        }

        // Check for completed background tasks and expired timers
        app.check_background_tasks();
        app.tick(Instant::now());

        // Check if we should quit
        if matches!(app.state, AppState::Quitting) {
            return Ok(());
        }
    }
}

// ============================================================================
// CLI commands
// ============================================================================

fn prompt(label: &str) -> Result<String> {
    print!("{}", label);
    io::stdout().flush()?;

    let mut line = String::new();
    io::stdin().read_line(&mut line).context("Failed to read input")?;
    Ok(line.trim().to_string())
}

/// Interactive login without the full-screen interface
async fn cli_login() -> Result<()> {
    let mut config = load_config();
    let auth = AuthFlow::from_config(&config)?;

    let email = match config.last_email.clone() {
        Some(last) => {
            let entered = prompt(&format!("Email [{}]: ", last))?;
            if entered.is_empty() {
                last
            } else {
                entered
            }
        }
        None => prompt("Email: ")?,
    };
    let password = rpassword::prompt_password("Password: ")?;
    let keep_logged_in = auth.features().remember_me
        && matches!(
            prompt("Keep me logged in? [y/N]: ")?.as_str(),
            "y" | "Y" | "yes"
        );

    let credentials = Credentials::new(&email, &password);
    match auth.login(&credentials, keep_logged_in).await {
        Ok(outcome) => {
            config.last_email = Some(credentials.email().to_string());
            if let Err(e) = config.save() {
                warn!(error = %e, "Failed to save config");
            }
            println!(
                "Logged in as {} ({})",
                outcome.profile.display_name(),
                outcome.storage
            );
            Ok(())
        }
        Err(e) => anyhow::bail!(e.user_message()),
    }
}

async fn cli_logout() -> Result<()> {
    let config = load_config();
    let auth = AuthFlow::from_config(&config)?;
    auth.logout().await;
    println!("Logged out.");
    Ok(())
}

async fn cli_whoami() -> Result<()> {
    let config = load_config();
    let auth = AuthFlow::from_config(&config)?;

    match auth.restore().await {
        RestoreOutcome::Restored { profile, token } => {
            println!("Session stored in {}", token.kind);
            for (key, value) in profile.display_fields() {
                println!("{:<16} {}", key, value);
            }
            Ok(())
        }
        RestoreOutcome::NoSession => {
            println!("Not logged in. Run with --login to log in.");
            Ok(())
        }
        RestoreOutcome::Expired => {
            println!("Session expired. Run with --login to log in again.");
            Ok(())
        }
        RestoreOutcome::Failed(e) => anyhow::bail!(e.user_message()),
    }
}
