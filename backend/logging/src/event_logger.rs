//! Workflow Event Logger
//!
//! Structured session lifecycle events written through `tracing` so they land
//! in the rolling NDJSON log alongside everything else.

use std::sync::atomic::{AtomicBool, Ordering};

use chrono::{DateTime, Utc};
use serde::Serialize;
use tracing::info;

use crate::redact::redact_sensitive_data;

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "type")]
pub enum WorkflowEvent {
    SessionStarted,
    CaptureSubmitted {
        mime_type: String,
        size_bytes: usize,
    },
    AnalysisSucceeded {
        target_class: String,
        direct_exchange: bool,
        confidence: f64,
    },
    AnalysisFailed {
        error_msg: String,
    },
    CompletionDiscarded {
        reason: String,
    },
    Retried,
    SessionReset,
}

static REDACT_EVENTS: AtomicBool = AtomicBool::new(true);

/// Turn scrubbing of free-text event fields on or off process-wide.
pub fn set_redaction_enabled(enabled: bool) {
    REDACT_EVENTS.store(enabled, Ordering::Relaxed);
}

#[derive(Debug, Serialize)]
pub struct EventLogEntry {
    pub session_id: String,
    pub timestamp: DateTime<Utc>,
    pub event: WorkflowEvent,
}

impl EventLogEntry {
    /// Build an entry, scrubbing free-text fields on the way in unless
    /// redaction was turned off with [`set_redaction_enabled`].
    pub fn new(session_id: &str, event: WorkflowEvent) -> Self {
        Self::with_redaction(session_id, event, REDACT_EVENTS.load(Ordering::Relaxed))
    }

    pub fn with_redaction(session_id: &str, mut event: WorkflowEvent, redact: bool) -> Self {
        match &mut event {
            WorkflowEvent::AnalysisFailed { error_msg } if redact => {
                *error_msg = redact_sensitive_data(error_msg);
            }
            WorkflowEvent::CompletionDiscarded { reason } if redact => {
                *reason = redact_sensitive_data(reason);
            }
            _ => {}
        }

        Self {
            session_id: session_id.into(),
            timestamp: Utc::now(),
            event,
        }
    }
}

pub struct WorkflowEventLogger;

impl WorkflowEventLogger {
    /// Logs a session lifecycle event, immediately serializing it to the tracing system.
    pub fn log_event(session_id: &str, event: WorkflowEvent) {
        let entry = EventLogEntry::new(session_id, event);
        let json = serde_json::to_string(&entry).unwrap_or_default();
        info!(target: "workflow_events", session_id = %entry.session_id, event = %json, "Workflow event");
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn failure(msg: &str) -> WorkflowEvent {
        WorkflowEvent::AnalysisFailed {
            error_msg: msg.into(),
        }
    }

    #[test]
    fn failure_messages_are_redacted() {
        let entry =
            EventLogEntry::with_redaction("abc", failure("request to ?key=topsecret failed"), true);
        match entry.event {
            WorkflowEvent::AnalysisFailed { error_msg } => {
                assert!(!error_msg.contains("topsecret"));
            }
            other => panic!("unexpected event {other:?}"),
        }
    }

    #[test]
    fn discard_reasons_are_redacted() {
        let entry = EventLogEntry::with_redaction(
            "abc",
            WorkflowEvent::CompletionDiscarded {
                reason: "licence D1234-56789-01234 superseded".into(),
            },
            true,
        );
        match entry.event {
            WorkflowEvent::CompletionDiscarded { reason } => {
                assert!(!reason.contains("D1234-56789-01234"));
            }
            other => panic!("unexpected event {other:?}"),
        }
    }

    #[test]
    fn disabled_redaction_keeps_message() {
        let msg = "licence D1234-56789-01234 unreadable";
        set_redaction_enabled(false);
        let entry = EventLogEntry::new("abc", failure(msg));
        set_redaction_enabled(true);

        assert_eq!(entry.event, failure(msg));
    }

    #[test]
    fn entry_serializes_with_type_tag() {
        let entry = EventLogEntry::new("abc", WorkflowEvent::Retried);
        let json = serde_json::to_value(&entry).unwrap();
        assert_eq!(json["event"]["type"], "Retried");
        assert_eq!(json["session_id"], "abc");
    }
}
