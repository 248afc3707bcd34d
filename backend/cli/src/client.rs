//! Picks the analysis client the config asks for.

use std::sync::Arc;
use std::time::Duration;

use anyhow::{anyhow, Result};
use govsync_config::{AnalysisConfig, AnalysisProvider};
use govsync_core::AnalysisClient;
use govsync_understanding::{GeminiAnalysisClient, MockAnalysisClient};
use tracing::info;

/// Build the configured client. `mock_delay` only applies to the offline mock.
pub fn build_client(
    analysis: &AnalysisConfig,
    mock_delay: Duration,
) -> Result<Arc<dyn AnalysisClient>> {
    match analysis.provider() {
        AnalysisProvider::Mock => {
            info!("Using offline analysis client");
            Ok(Arc::new(MockAnalysisClient::default().with_delay(mock_delay)))
        }
        AnalysisProvider::Gemini => {
            let api_key = analysis.api_key().ok_or_else(|| {
                anyhow!(
                    "No Gemini API key configured; set GEMINI_API_KEY or analysis.apiKey, \
                     or pass --offline"
                )
            })?;
            let client = GeminiAnalysisClient::new(api_key)
                .with_model(analysis.model())
                .with_base_url(analysis.base_url())
                .with_target_jurisdiction(analysis.target_jurisdiction())
                .with_temperature(analysis.temperature())
                .with_timeout(Duration::from_secs(analysis.timeout_secs()))?;
            info!(model = analysis.model(), "Using Gemini analysis client");
            Ok(Arc::new(client))
        }
    }
}
