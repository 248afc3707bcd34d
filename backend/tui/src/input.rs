//! Keyboard Input Handler
//!
//! Maps crossterm key events to controller operations for the current
//! screen. Anything that needs I/O is handed back as an [`InputAction`].

use std::path::PathBuf;

use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};
use govsync_core::{AppView, Screen};

use crate::app::AppState;

/// Work the key handler cannot do synchronously.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum InputAction {
    /// Read this file and submit it as the capture.
    Capture(PathBuf),
}

/// Handles a single keyboard event.
pub fn handle_key_event(key: KeyEvent, state: &mut AppState) -> Option<InputAction> {
    if key.code == KeyCode::Char('c') && key.modifiers.contains(KeyModifiers::CONTROL) {
        state.should_quit = true;
        return None;
    }

    let screen = state.controller.screen();
    let typing =
        screen == Screen::Capture && matches!(key.code, KeyCode::Char(_) | KeyCode::Backspace);
    if !typing {
        state.notice = None;
    }

    match screen {
        Screen::Dashboard => match key.code {
            KeyCode::Char('n') => state.controller.navigate(AppView::ProcessTransfer),
            KeyCode::Char('h') => state.controller.navigate(AppView::History),
            KeyCode::Char('s') => state.controller.navigate(AppView::Settings),
            KeyCode::Char('q') => state.should_quit = true,
            _ => {}
        },
        Screen::NotImplemented(_) => match key.code {
            KeyCode::Esc | KeyCode::Char('d') => state.controller.navigate(AppView::Dashboard),
            KeyCode::Char('q') => state.should_quit = true,
            _ => {}
        },
        Screen::Capture => match key.code {
            KeyCode::Enter => {
                let path = state.input.trim();
                if path.is_empty() {
                    state.notice = Some("Type the path of the license image first".into());
                } else {
                    return Some(InputAction::Capture(PathBuf::from(path)));
                }
            }
            KeyCode::Backspace => {
                state.input.pop();
            }
            KeyCode::Char(c) => state.input.push(c),
            KeyCode::Esc => {
                state.input.clear();
                state.controller.reset_session();
            }
            _ => {}
        },
        Screen::Failed => match key.code {
            KeyCode::Char('r') => {
                if let Err(err) = state.controller.retry() {
                    state.notice = Some(err.to_string());
                }
            }
            KeyCode::Esc => state.controller.reset_session(),
            _ => {}
        },
        Screen::Analyzing | Screen::Review | Screen::Complete => match key.code {
            KeyCode::Esc => state.controller.reset_session(),
            // Only a settled session may be replaced from here.
            KeyCode::Char('n')
                if state
                    .controller
                    .session()
                    .is_some_and(|s| s.status().is_terminal()) =>
            {
                state.controller.start_session();
            }
            _ => {}
        },
    }

    None
}
