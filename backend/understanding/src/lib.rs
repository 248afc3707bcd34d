//! License image understanding for GovSync.
//!
//! [`GeminiAnalysisClient`] talks to the hosted vision model;
//! [`MockAnalysisClient`] stands in for it offline and in tests.

pub mod gemini;
pub mod mock;
pub mod prompt;

pub use gemini::{DEFAULT_BASE_URL, DEFAULT_MODEL, GeminiAnalysisClient, parse_generate_content};
pub use mock::{MockAnalysisClient, sample_result};
pub use prompt::{DEFAULT_TARGET_JURISDICTION, analysis_prompt, response_schema};
