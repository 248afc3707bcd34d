//! The transfer session record and its lifecycle.
//!
//! A [`Session`] is immutable from the outside: every change goes through
//! [`Session::apply`], which takes the current value and a [`SessionEvent`]
//! and yields the next value.

use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::error::TransitionError;
use crate::types::{AnalysisResult, EquivalencyResult, ExtractedLicenseData, ImagePayload};

/// Lifecycle status of a transfer session.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SessionStatus {
    /// Waiting for the source document to be captured.
    Scanning,
    /// Capture submitted; the analysis call is outstanding.
    Analyzing,
    /// Analysis returned; the clerk is reviewing the result.
    Review,
    /// Transfer approved. Nothing transitions here yet.
    Complete,
    /// Analysis failed; waiting for a manual retry.
    Error,
}

impl SessionStatus {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Scanning => "scanning",
            Self::Analyzing => "analyzing",
            Self::Review => "review",
            Self::Complete => "complete",
            Self::Error => "error",
        }
    }

    /// No further transitions are modelled out of these states.
    pub fn is_terminal(self) -> bool {
        matches!(self, Self::Review | Self::Complete)
    }
}

impl fmt::Display for SessionStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Inputs to the session state machine.
#[derive(Debug, Clone)]
pub enum SessionEvent {
    CaptureSubmitted(ImagePayload),
    AnalysisSucceeded(AnalysisResult),
    AnalysisFailed,
    Retry,
}

impl SessionEvent {
    pub fn name(&self) -> &'static str {
        match self {
            Self::CaptureSubmitted(_) => "capture_submitted",
            Self::AnalysisSucceeded(_) => "analysis_succeeded",
            Self::AnalysisFailed => "analysis_failed",
            Self::Retry => "retry",
        }
    }
}

/// One clerk's in-progress document transfer.
#[derive(Debug, Clone, PartialEq)]
pub struct Session {
    id: Uuid,
    created_at: DateTime<Utc>,
    status: SessionStatus,
    captured_image: Option<ImagePayload>,
    analysis: Option<AnalysisResult>,
}

impl Session {
    /// A fresh session waiting for capture.
    pub fn new() -> Self {
        Self {
            id: Uuid::new_v4(),
            created_at: Utc::now(),
            status: SessionStatus::Scanning,
            captured_image: None,
            analysis: None,
        }
    }

    pub fn id(&self) -> Uuid {
        self.id
    }

    /// First eight characters of the id, for headers.
    pub fn short_id(&self) -> String {
        self.id.to_string().chars().take(8).collect()
    }

    pub fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }

    pub fn status(&self) -> SessionStatus {
        self.status
    }

    pub fn captured_image(&self) -> Option<&ImagePayload> {
        self.captured_image.as_ref()
    }

    pub fn analysis(&self) -> Option<&AnalysisResult> {
        self.analysis.as_ref()
    }

    pub fn extracted_data(&self) -> Option<&ExtractedLicenseData> {
        self.analysis.as_ref().map(|a| &a.license_data)
    }

    pub fn equivalency_result(&self) -> Option<&EquivalencyResult> {
        self.analysis.as_ref().map(|a| &a.equivalency)
    }

    /// Compute the session that results from `event`.
    ///
    /// `self` is left untouched; an event that is not valid in the current
    /// status yields a [`TransitionError`].
    pub fn apply(&self, event: SessionEvent) -> Result<Session, TransitionError> {
        let invalid = |event: &SessionEvent| TransitionError {
            from: self.status,
            event: event.name(),
        };

        match (self.status, event) {
            (SessionStatus::Scanning, SessionEvent::CaptureSubmitted(image)) => Ok(Session {
                status: SessionStatus::Analyzing,
                captured_image: Some(image),
                analysis: None,
                ..self.clone()
            }),
            (SessionStatus::Analyzing, SessionEvent::AnalysisSucceeded(result)) => Ok(Session {
                status: SessionStatus::Review,
                analysis: Some(result),
                ..self.clone()
            }),
            // The captured image is kept so the clerk can see what failed.
            (SessionStatus::Analyzing, SessionEvent::AnalysisFailed) => Ok(Session {
                status: SessionStatus::Error,
                analysis: None,
                ..self.clone()
            }),
            (SessionStatus::Error, SessionEvent::Retry) => Ok(Session {
                status: SessionStatus::Scanning,
                captured_image: None,
                analysis: None,
                ..self.clone()
            }),
            (_, event) => Err(invalid(&event)),
        }
    }
}

impl Default for Session {
    fn default() -> Self {
        Self::new()
    }
}
