//! Core types for GovSync: the transfer session, its state machine, the view
//! controller that owns it, and the boundary to the analysis service.

pub mod controller;
pub mod dispatch;
pub mod error;
pub mod session;
pub mod traits;
pub mod types;

pub use controller::{AnalysisTicket, AppView, CompletionOutcome, Screen, ViewController};
pub use dispatch::{analyze_capture, dispatch_analysis, AnalysisCompletion};
pub use error::{AnalysisError, ControllerError, GovSyncError, TransitionError, DEFAULT_ANALYSIS_FAILURE};
pub use session::{Session, SessionEvent, SessionStatus};
pub use traits::AnalysisClient;
pub use types::{AnalysisResult, EquivalencyResult, ExtractedLicenseData, ImagePayload};
