//! View controller: owns the single live session and picks what to render.

use govsync_logging::{WorkflowEvent, WorkflowEventLogger};
use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};
use uuid::Uuid;

use crate::error::{AnalysisError, ControllerError};
use crate::session::{Session, SessionEvent, SessionStatus};
use crate::types::{AnalysisResult, ImagePayload};

/// Top-level views reachable from the sidebar.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum AppView {
    #[default]
    Dashboard,
    ProcessTransfer,
    History,
    Settings,
}

impl AppView {
    pub fn title(self) -> &'static str {
        match self {
            Self::Dashboard => "Dashboard",
            Self::ProcessTransfer => "New Transfer Application",
            Self::History => "History",
            Self::Settings => "Settings",
        }
    }
}

/// What the presentation layer should draw right now.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Screen {
    Dashboard,
    Capture,
    Analyzing,
    Review,
    Failed,
    Complete,
    /// A view with nothing behind it yet.
    NotImplemented(AppView),
}

/// Handed out by [`ViewController::submit_capture`]; the bearer runs the
/// analysis and reports back under `session_id`.
#[derive(Debug, Clone)]
pub struct AnalysisTicket {
    pub session_id: Uuid,
    pub image: ImagePayload,
}

/// Result of feeding an analysis completion back to the controller.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CompletionOutcome {
    /// The live session moved to this status.
    Applied(SessionStatus),
    /// The completion targeted a session that is gone or no longer waiting.
    Stale,
}

#[derive(Debug, Default)]
pub struct ViewController {
    view: AppView,
    session: Option<Session>,
    error: Option<String>,
}

impl ViewController {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn view(&self) -> AppView {
        self.view
    }

    pub fn session(&self) -> Option<&Session> {
        self.session.as_ref()
    }

    /// Message from the last failed analysis, if the session is in `error`.
    pub fn error_message(&self) -> Option<&str> {
        self.error.as_deref()
    }

    /// Start a new transfer, discarding any previous session.
    pub fn start_session(&mut self) -> Uuid {
        if let Some(previous) = self.session.take() {
            debug!(session_id = %previous.id(), "Discarding previous session");
        }
        let session = Session::new();
        let id = session.id();
        self.session = Some(session);
        self.view = AppView::ProcessTransfer;
        self.error = None;

        info!(session_id = %id, "Started transfer session");
        WorkflowEventLogger::log_event(&id.to_string(), WorkflowEvent::SessionStarted);
        id
    }

    /// Record the captured image and move to `analyzing`.
    ///
    /// The returned ticket must be dispatched by the caller; only one capture
    /// may be in flight per session.
    pub fn submit_capture(&mut self, image: ImagePayload) -> Result<AnalysisTicket, ControllerError> {
        let session = self.session.as_ref().ok_or(ControllerError::NoActiveSession)?;
        if session.status() == SessionStatus::Analyzing {
            return Err(ControllerError::CaptureInFlight(session.id()));
        }

        let event = WorkflowEvent::CaptureSubmitted {
            mime_type: image.mime_type.clone(),
            size_bytes: image.len(),
        };
        let next = session.apply(SessionEvent::CaptureSubmitted(image.clone()))?;
        let session_id = next.id();
        self.session = Some(next);

        WorkflowEventLogger::log_event(&session_id.to_string(), event);
        Ok(AnalysisTicket { session_id, image })
    }

    /// Apply the settled analysis call dispatched for `session_id`.
    ///
    /// Completions for a session that has since been reset or replaced are
    /// discarded without touching the live session.
    pub fn complete_analysis(
        &mut self,
        session_id: Uuid,
        outcome: Result<AnalysisResult, AnalysisError>,
    ) -> CompletionOutcome {
        let Some(session) = self.session.as_ref() else {
            return self.discard(session_id, "no live session");
        };
        if session.id() != session_id {
            return self.discard(session_id, "session was replaced");
        }
        if session.status() != SessionStatus::Analyzing {
            return self.discard(session_id, "session is not awaiting analysis");
        }

        let (event, log_event, error) = match outcome {
            Ok(result) => {
                let log_event = WorkflowEvent::AnalysisSucceeded {
                    target_class: result.equivalency.target_class.clone(),
                    direct_exchange: result.equivalency.is_direct_exchange,
                    confidence: result.license_data.authenticity_confidence,
                };
                (SessionEvent::AnalysisSucceeded(result), log_event, None)
            }
            Err(err) => {
                let message = err.message().to_string();
                let log_event = WorkflowEvent::AnalysisFailed {
                    error_msg: message.clone(),
                };
                (SessionEvent::AnalysisFailed, log_event, Some(message))
            }
        };

        match session.apply(event) {
            Ok(next) => {
                let status = next.status();
                self.session = Some(next);
                self.error = error;
                WorkflowEventLogger::log_event(&session_id.to_string(), log_event);
                CompletionOutcome::Applied(status)
            }
            Err(err) => self.discard(session_id, &err.to_string()),
        }
    }

    /// Return a failed session to `scanning` so the clerk can rescan.
    pub fn retry(&mut self) -> Result<(), ControllerError> {
        let session = self.session.as_ref().ok_or(ControllerError::NoActiveSession)?;
        let next = session.apply(SessionEvent::Retry)?;
        let id = next.id();
        self.session = Some(next);
        self.error = None;
        WorkflowEventLogger::log_event(&id.to_string(), WorkflowEvent::Retried);
        Ok(())
    }

    /// Drop the session entirely and go back to the dashboard.
    pub fn reset_session(&mut self) {
        if let Some(session) = self.session.take() {
            info!(session_id = %session.id(), status = %session.status(), "Session reset");
            WorkflowEventLogger::log_event(&session.id().to_string(), WorkflowEvent::SessionReset);
        }
        self.error = None;
        self.view = AppView::Dashboard;
    }

    /// Sidebar navigation. Opening the transfer view always starts a new session.
    pub fn navigate(&mut self, view: AppView) {
        match view {
            AppView::ProcessTransfer => {
                self.start_session();
            }
            other => self.view = other,
        }
    }

    /// Choose the screen for the current view and session status.
    pub fn screen(&self) -> Screen {
        match (self.view, self.session.as_ref()) {
            (AppView::Dashboard, _) => Screen::Dashboard,
            (AppView::ProcessTransfer, Some(session)) => match session.status() {
                SessionStatus::Scanning => Screen::Capture,
                SessionStatus::Analyzing => Screen::Analyzing,
                SessionStatus::Review => Screen::Review,
                SessionStatus::Complete => Screen::Complete,
                SessionStatus::Error => Screen::Failed,
            },
            (view, _) => Screen::NotImplemented(view),
        }
    }

    fn discard(&self, session_id: Uuid, reason: &str) -> CompletionOutcome {
        warn!(session_id = %session_id, reason, "Discarding stale analysis completion");
        WorkflowEventLogger::log_event(
            &session_id.to_string(),
            WorkflowEvent::CompletionDiscarded {
                reason: reason.to_string(),
            },
        );
        CompletionOutcome::Stale
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::fixtures;

    fn analyzing_controller(source: &str) -> (ViewController, AnalysisTicket) {
        let mut controller = ViewController::new();
        controller.start_session();
        let ticket = controller.submit_capture(fixtures::image(source)).unwrap();
        (controller, ticket)
    }

    #[test]
    fn starts_on_dashboard_without_session() {
        let controller = ViewController::new();
        assert_eq!(controller.view(), AppView::Dashboard);
        assert!(controller.session().is_none());
        assert_eq!(controller.screen(), Screen::Dashboard);
    }

    #[test]
    fn start_session_replaces_previous() {
        let mut controller = ViewController::new();
        let first = controller.start_session();
        let second = controller.start_session();
        assert_ne!(first, second);

        let session = controller.session().unwrap();
        assert_eq!(session.id(), second);
        assert_eq!(session.status(), SessionStatus::Scanning);
        assert!(session.extracted_data().is_none());
        assert!(session.equivalency_result().is_none());
        assert_eq!(controller.view(), AppView::ProcessTransfer);
        assert_eq!(controller.screen(), Screen::Capture);
    }

    #[test]
    fn submit_capture_without_session_fails() {
        let mut controller = ViewController::new();
        let err = controller.submit_capture(fixtures::image("a.png")).unwrap_err();
        assert_eq!(err, ControllerError::NoActiveSession);
    }

    #[test]
    fn scenario_success_reaches_review() {
        let (mut controller, ticket) = analyzing_controller("imgA.png");
        assert_eq!(controller.screen(), Screen::Analyzing);
        assert_eq!(ticket.image, fixtures::image("imgA.png"));

        let outcome = controller.complete_analysis(ticket.session_id, Ok(fixtures::result()));
        assert_eq!(outcome, CompletionOutcome::Applied(SessionStatus::Review));

        let session = controller.session().unwrap();
        assert_eq!(session.status(), SessionStatus::Review);
        assert_eq!(session.extracted_data(), Some(&fixtures::license()));
        assert_eq!(session.equivalency_result(), Some(&fixtures::equivalency()));
        assert_eq!(controller.screen(), Screen::Review);
        assert!(controller.error_message().is_none());
    }

    #[test]
    fn scenario_failure_records_message_and_keeps_image() {
        let (mut controller, ticket) = analyzing_controller("imgB.png");
        let outcome = controller.complete_analysis(
            ticket.session_id,
            Err(AnalysisError::new("low confidence")),
        );
        assert_eq!(outcome, CompletionOutcome::Applied(SessionStatus::Error));

        let session = controller.session().unwrap();
        assert_eq!(session.status(), SessionStatus::Error);
        assert_eq!(session.captured_image(), Some(&fixtures::image("imgB.png")));
        assert_eq!(controller.error_message(), Some("low confidence"));
        assert_eq!(controller.screen(), Screen::Failed);
    }

    #[test]
    fn second_capture_while_analyzing_is_rejected() {
        let (mut controller, ticket) = analyzing_controller("first.png");
        let err = controller.submit_capture(fixtures::image("second.png")).unwrap_err();
        assert_eq!(err, ControllerError::CaptureInFlight(ticket.session_id));
        // The first capture is untouched.
        assert_eq!(
            controller.session().unwrap().captured_image(),
            Some(&fixtures::image("first.png"))
        );
    }

    #[test]
    fn capture_after_review_is_an_invalid_transition() {
        let (mut controller, ticket) = analyzing_controller("a.png");
        controller.complete_analysis(ticket.session_id, Ok(fixtures::result()));
        let err = controller.submit_capture(fixtures::image("b.png")).unwrap_err();
        assert!(matches!(err, ControllerError::InvalidTransition(_)));
    }

    #[test]
    fn completion_is_applied_exactly_once() {
        let (mut controller, ticket) = analyzing_controller("a.png");
        assert_eq!(
            controller.complete_analysis(ticket.session_id, Err(AnalysisError::default())),
            CompletionOutcome::Applied(SessionStatus::Error)
        );
        assert_eq!(
            controller.complete_analysis(ticket.session_id, Ok(fixtures::result())),
            CompletionOutcome::Stale
        );
        assert_eq!(controller.session().unwrap().status(), SessionStatus::Error);
    }

    #[test]
    fn stale_completion_after_reset_is_discarded() {
        let (mut controller, ticket) = analyzing_controller("a.png");
        controller.reset_session();
        let outcome = controller.complete_analysis(ticket.session_id, Ok(fixtures::result()));
        assert_eq!(outcome, CompletionOutcome::Stale);
        assert!(controller.session().is_none());
        assert_eq!(controller.view(), AppView::Dashboard);
    }

    #[test]
    fn stale_completion_does_not_clobber_newer_session() {
        let (mut controller, old_ticket) = analyzing_controller("old.png");
        let new_id = controller.start_session();
        let new_ticket = controller.submit_capture(fixtures::image("new.png")).unwrap();
        assert_eq!(new_ticket.session_id, new_id);

        let outcome = controller.complete_analysis(
            old_ticket.session_id,
            Err(AnalysisError::new("old failure")),
        );
        assert_eq!(outcome, CompletionOutcome::Stale);
        let session = controller.session().unwrap();
        assert_eq!(session.id(), new_id);
        assert_eq!(session.status(), SessionStatus::Analyzing);
        assert!(controller.error_message().is_none());
    }

    #[test]
    fn retry_from_error_clears_results_and_message() {
        let (mut controller, ticket) = analyzing_controller("a.png");
        controller.complete_analysis(ticket.session_id, Err(AnalysisError::new("blurry")));
        controller.retry().unwrap();

        let session = controller.session().unwrap();
        assert_eq!(session.id(), ticket.session_id);
        assert_eq!(session.status(), SessionStatus::Scanning);
        assert!(session.captured_image().is_none());
        assert!(session.extracted_data().is_none());
        assert!(session.equivalency_result().is_none());
        assert!(controller.error_message().is_none());
        assert_eq!(controller.screen(), Screen::Capture);
    }

    #[test]
    fn retry_outside_error_is_rejected() {
        let mut controller = ViewController::new();
        assert_eq!(controller.retry(), Err(ControllerError::NoActiveSession));
        controller.start_session();
        assert!(matches!(
            controller.retry(),
            Err(ControllerError::InvalidTransition(_))
        ));
    }

    #[test]
    fn reset_from_any_status_returns_to_dashboard() {
        let (mut controller, ticket) = analyzing_controller("a.png");
        controller.complete_analysis(ticket.session_id, Ok(fixtures::result()));
        controller.reset_session();
        assert!(controller.session().is_none());
        assert_eq!(controller.view(), AppView::Dashboard);
        assert_eq!(controller.screen(), Screen::Dashboard);

        // Resetting with nothing live is harmless.
        controller.reset_session();
        assert!(controller.session().is_none());
    }

    #[test]
    fn start_session_clears_stale_error() {
        let (mut controller, ticket) = analyzing_controller("a.png");
        controller.complete_analysis(ticket.session_id, Err(AnalysisError::new("bad scan")));
        controller.start_session();
        assert!(controller.error_message().is_none());
    }

    #[test]
    fn navigation_to_placeholder_views_keeps_session() {
        let mut controller = ViewController::new();
        controller.navigate(AppView::ProcessTransfer);
        let id = controller.session().unwrap().id();

        controller.navigate(AppView::History);
        assert_eq!(controller.screen(), Screen::NotImplemented(AppView::History));
        assert_eq!(controller.session().unwrap().id(), id);

        controller.navigate(AppView::Dashboard);
        assert_eq!(controller.screen(), Screen::Dashboard);

        controller.navigate(AppView::ProcessTransfer);
        assert_ne!(controller.session().unwrap().id(), id);
    }
}
