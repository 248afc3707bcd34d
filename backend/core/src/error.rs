use thiserror::Error;
use uuid::Uuid;

use crate::session::SessionStatus;

/// Message shown when the analysis boundary fails without saying why.
pub const DEFAULT_ANALYSIS_FAILURE: &str = "Failed to analyze document";

/// Top-level error type for GovSync.
#[derive(Debug, Error)]
pub enum GovSyncError {
    #[error("analysis failed: {0}")]
    Analysis(#[from] AnalysisError),

    #[error(transparent)]
    Controller(#[from] ControllerError),

    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

/// Failure reported by an [`AnalysisClient`](crate::traits::AnalysisClient).
///
/// Always carries a message fit for display to the clerk.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{message}")]
pub struct AnalysisError {
    message: String,
}

impl AnalysisError {
    pub fn new(message: impl Into<String>) -> Self {
        let message = message.into();
        if message.trim().is_empty() {
            return Self::default();
        }
        Self { message }
    }

    pub fn message(&self) -> &str {
        &self.message
    }
}

impl Default for AnalysisError {
    fn default() -> Self {
        Self {
            message: DEFAULT_ANALYSIS_FAILURE.to_string(),
        }
    }
}

impl From<anyhow::Error> for AnalysisError {
    fn from(err: anyhow::Error) -> Self {
        Self::new(format!("{err:#}"))
    }
}

/// A session event that is not valid in the session's current status.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("cannot apply {event} while session is {from}")]
pub struct TransitionError {
    pub from: SessionStatus,
    pub event: &'static str,
}

/// Errors returned by [`ViewController`](crate::controller::ViewController) operations.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ControllerError {
    #[error("no active session")]
    NoActiveSession,

    #[error("an analysis is already in flight for session {0}")]
    CaptureInFlight(Uuid),

    #[error(transparent)]
    InvalidTransition(#[from] TransitionError),
}
