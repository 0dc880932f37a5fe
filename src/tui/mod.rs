//! Terminal UI
//!
//! Ratatui front end: one `App` owns all state, a background task feeds it
//! terminal input, and network requests report back through the same channel.

pub mod app;
pub mod events;
pub mod form;
pub mod render;

pub use app::App;
pub use events::{EventHandler, Screen, TuiEvent};

use anyhow::{Context, Result};
use crossterm::{
    event::{DisableBracketedPaste, EnableBracketedPaste},
    execute,
    terminal::{EnterAlternateScreen, LeaveAlternateScreen, disable_raw_mode, enable_raw_mode},
};
use ratatui::{Terminal, backend::CrosstermBackend};
use std::io::{self, Stdout};

type Term = Terminal<CrosstermBackend<Stdout>>;

/// Take over the terminal, run `app` until it quits, then restore the terminal.
pub async fn run(mut app: App) -> Result<()> {
    enable_raw_mode().context("Failed to enable raw mode")?;
    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen, EnableBracketedPaste)
        .context("Failed to enter alternate screen")?;
    let mut terminal = Terminal::new(CrosstermBackend::new(stdout))?;

    let result = run_loop(&mut terminal, &mut app).await;

    // Restore even when the loop failed
    disable_raw_mode()?;
    execute!(
        terminal.backend_mut(),
        DisableBracketedPaste,
        LeaveAlternateScreen
    )?;
    terminal.show_cursor()?;

    result
}

async fn run_loop(terminal: &mut Term, app: &mut App) -> Result<()> {
    EventHandler::start_terminal_listener(app.event_sender());

    loop {
        terminal.draw(|f| render::render(f, app))?;

        let Some(event) = app.next_event().await else {
            tracing::warn!("Event channel closed");
            break;
        };
        app.handle_event(event)?;

        if app.should_quit {
            tracing::info!("Quitting");
            break;
        }
    }
    Ok(())
}
