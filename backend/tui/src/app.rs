//! TUI App State
//!
//! Wraps the [`ViewController`] with the bits of state only the terminal
//! needs: the path being typed, a one-line notice and the spinner frame.

use std::path::Path;

use govsync_core::{AnalysisCompletion, AnalysisTicket, CompletionOutcome, ViewController};
use govsync_media::FileCapture;
use tracing::warn;

const SPINNER: &[char] = &['⠋', '⠙', '⠹', '⠸', '⠼', '⠴', '⠦', '⠧', '⠇', '⠏'];

pub struct AppState {
    pub controller: ViewController,
    /// Path typed on the capture screen.
    pub input: String,
    /// Transient message shown in the footer; cleared on the next action.
    pub notice: Option<String>,
    pub should_quit: bool,
    tick: usize,
}

impl AppState {
    pub fn new() -> Self {
        Self {
            controller: ViewController::new(),
            input: String::new(),
            notice: None,
            should_quit: false,
            tick: 0,
        }
    }

    pub fn tick(&mut self) {
        self.tick = self.tick.wrapping_add(1);
    }

    pub fn spinner(&self) -> char {
        SPINNER[self.tick % SPINNER.len()]
    }

    /// Read the file at `path` and hand it to the controller.
    ///
    /// Capture problems stay on the capture screen as a notice; the session
    /// only moves once a readable image is in hand.
    pub async fn capture_and_submit(
        &mut self,
        capture: &FileCapture,
        path: &Path,
    ) -> Option<AnalysisTicket> {
        let image = match capture.capture(path).await {
            Ok(image) => image,
            Err(err) => {
                warn!(error = %err, "Capture rejected");
                self.notice = Some(err.to_string());
                return None;
            }
        };

        match self.controller.submit_capture(image) {
            Ok(ticket) => {
                self.input.clear();
                self.notice = None;
                Some(ticket)
            }
            Err(err) => {
                self.notice = Some(err.to_string());
                None
            }
        }
    }

    pub fn apply_completion(&mut self, completion: AnalysisCompletion) {
        if self.controller.apply_completion(completion) == CompletionOutcome::Stale {
            self.notice = Some("Ignored a result for a session that is no longer open".into());
        }
    }
}

impl Default for AppState {
    fn default() -> Self {
        Self::new()
    }
}
