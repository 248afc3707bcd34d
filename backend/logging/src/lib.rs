//! Telemetry and structured logging components for GovSync.
//!
//! Handles log redaction of license PII and API keys, JSON file output with
//! daily rotation, and session workflow event logging.

pub mod event_logger;
pub mod logger;
pub mod redact;

pub use event_logger::{EventLogEntry, WorkflowEvent, WorkflowEventLogger, set_redaction_enabled};
pub use logger::{init_file_logger, init_logger};
pub use redact::redact_sensitive_data;
