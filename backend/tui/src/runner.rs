//! Terminal event loop.
//!
//! Owns the [`AppState`] and multiplexes key presses, analysis completions
//! and the spinner tick. Analysis runs on spawned tasks; results come back
//! over a channel and are applied here, so the controller never leaves
//! this task.

use std::io::{self, Stdout};
use std::sync::Arc;
use std::time::Duration;

use anyhow::{Context, Result};
use crossterm::{
    event::{Event, EventStream, KeyEventKind},
    execute,
    terminal::{EnterAlternateScreen, LeaveAlternateScreen, disable_raw_mode, enable_raw_mode},
};
use futures_util::StreamExt;
use govsync_core::{AnalysisClient, dispatch_analysis};
use govsync_media::FileCapture;
use ratatui::{Terminal, backend::CrosstermBackend};
use tokio::sync::mpsc;
use tracing::{error, info};

use crate::app::AppState;
use crate::input::{InputAction, handle_key_event};
use crate::render::draw_ui;

const TICK: Duration = Duration::from_millis(120);

type Term = Terminal<CrosstermBackend<Stdout>>;

/// Run `govsync ui` until the clerk quits.
///
/// The terminal is restored on every exit path, including a failed setup.
pub async fn run(client: Arc<dyn AnalysisClient>, capture: FileCapture) -> Result<()> {
    enable_raw_mode().context("Failed to enable raw mode")?;
    let (mut terminal, guard) = enter(restore_terminal, || {
        let mut stdout = io::stdout();
        execute!(stdout, EnterAlternateScreen).context("Failed to enter alternate screen")?;
        Ok(Terminal::new(CrosstermBackend::new(stdout))?)
    })?;

    info!(client = client.name(), "TUI started");
    let result = event_loop(&mut terminal, client, capture).await;
    if let Err(e) = &result {
        error!(error = %e, "TUI loop failed");
    }

    drop(guard);
    terminal.show_cursor()?;
    info!("TUI stopped");
    result
}

/// Calls `restore` when dropped.
struct TerminalGuard {
    restore: fn(),
}

impl Drop for TerminalGuard {
    fn drop(&mut self) {
        (self.restore)();
    }
}

/// Run `setup` with raw mode already on. If it fails the guard is dropped
/// here and `restore` runs before the error propagates.
fn enter<T>(restore: fn(), setup: impl FnOnce() -> Result<T>) -> Result<(T, TerminalGuard)> {
    let guard = TerminalGuard { restore };
    let value = setup()?;
    Ok((value, guard))
}

fn restore_terminal() {
    let _ = disable_raw_mode();
    let _ = execute!(io::stdout(), LeaveAlternateScreen);
}

async fn event_loop(
    terminal: &mut Term,
    client: Arc<dyn AnalysisClient>,
    capture: FileCapture,
) -> Result<()> {
    let mut state = AppState::new();
    let (tx, mut rx) = mpsc::unbounded_channel();
    let mut events = EventStream::new();
    let mut ticker = tokio::time::interval(TICK);

    loop {
        terminal.draw(|f| draw_ui(f, &state))?;
        if state.should_quit {
            return Ok(());
        }

        tokio::select! {
            event = events.next() => match event {
                Some(Ok(Event::Key(key))) if key.kind == KeyEventKind::Press => {
                    if let Some(InputAction::Capture(path)) = handle_key_event(key, &mut state) {
                        if let Some(ticket) = state.capture_and_submit(&capture, &path).await {
                            dispatch_analysis(Arc::clone(&client), ticket, tx.clone());
                        }
                    }
                }
                Some(Ok(_)) => {}
                Some(Err(e)) => return Err(e).context("Failed to read terminal event"),
                None => return Ok(()),
            },
            Some(completion) = rx.recv() => state.apply_completion(completion),
            _ = ticker.tick() => state.tick(),
        }
    }
}
