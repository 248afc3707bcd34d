use async_trait::async_trait;

use crate::error::AnalysisError;
use crate::types::{AnalysisResult, ImagePayload};

/// Trait for hosted services that read a license image and recommend an equivalency.
///
/// Implementations must not retry on their own; a failure is reported once
/// and recovery is left to the clerk.
#[async_trait]
pub trait AnalysisClient: Send + Sync {
    /// Client name (e.g., "gemini", "mock").
    fn name(&self) -> &str;

    /// Analyze one captured image.
    async fn analyze(&self, image: &ImagePayload) -> Result<AnalysisResult, AnalysisError>;
}
