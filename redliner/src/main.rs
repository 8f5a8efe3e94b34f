//! redliner - Contract Risk Analysis Client
//!
//! Terminal UI for uploading a contract PDF, running the backend risk
//! analysis, and reviewing risk-classified clauses.

mod app;
mod redline;
mod ui;

use std::io;
use std::path::PathBuf;

use anyhow::{Context, Result};
use crossterm::{
    event::{self, Event},
    execute,
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
};
use ratatui::{backend::CrosstermBackend, Terminal};
use redliner_core::{AnalysisClient, Config, SyncSession};

use crate::app::App;

fn main() -> Result<()> {
    Config::ensure_xdg_env();

    // Load configuration
    let config = Config::load().context("failed to load configuration")?;

    // Initialize logging (to file, not stdout since we have a TUI)
    let _log_guard =
        redliner_core::logging::init(&config.logging).context("failed to initialize logging")?;

    tracing::info!("redliner TUI starting up");

    // Directory to scan for contract PDFs: first CLI argument, else cwd
    let scan_dir = match std::env::args().nth(1) {
        Some(dir) => PathBuf::from(dir),
        None => std::env::current_dir().context("failed to resolve working directory")?,
    };

    // Build the backend client and session
    let client =
        AnalysisClient::new(&config.backend).context("failed to create backend client")?;
    tracing::info!(backend = %client.base_url(), "Backend client ready");

    let mut session = SyncSession::new(client).context("failed to create session")?;

    // Startup health check; a failing check surfaces as a warning toast
    session.initialize();

    let mut app = App::new(session, scan_dir, config.export.dir.clone());

    // Setup terminal
    enable_raw_mode().context("failed to enable raw mode")?;
    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen).context("failed to enter alternate screen")?;
    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend).context("failed to create terminal")?;

    // Run the main loop
    let result = run_app(&mut terminal, &mut app);

    // Restore terminal
    disable_raw_mode().context("failed to disable raw mode")?;
    execute!(terminal.backend_mut(), LeaveAlternateScreen)
        .context("failed to leave alternate screen")?;
    terminal.show_cursor().context("failed to show cursor")?;

    tracing::info!("redliner TUI shutting down");

    result
}

/// Run the main application loop.
fn run_app(terminal: &mut Terminal<CrosstermBackend<io::Stdout>>, app: &mut App) -> Result<()> {
    loop {
        // Expire notification deadlines before drawing
        app.tick();

        // Render
        terminal.draw(|frame| ui::render(frame, app, None))?;

        // Handle events
        if event::poll(std::time::Duration::from_millis(100))? {
            if let Event::Key(key) = event::read()? {
                app.handle_key(key);
            }
        }

        // Execute any queued backend call with the busy overlay visible.
        // The call blocks this loop; the session's busy gate rejects re-entry
        // by construction since no input is read until it returns.
        if let Some(action) = app.take_pending() {
            let label = action.label();
            terminal.draw(|frame| ui::render(frame, app, Some(label)))?;
            app.run_pending(action);
        }

        // Check if we should quit
        if app.should_quit {
            break;
        }
    }

    Ok(())
}
