use std::time::Duration;

use async_trait::async_trait;
use govsync_core::{
    AnalysisClient, AnalysisError, AnalysisResult, EquivalencyResult, ExtractedLicenseData,
    ImagePayload,
};

/// An analysis client that returns a canned outcome, optionally after a delay.
pub struct MockAnalysisClient {
    outcome: Result<AnalysisResult, AnalysisError>,
    delay: Duration,
}

impl MockAnalysisClient {
    pub fn succeeding(result: AnalysisResult) -> Self {
        Self {
            outcome: Ok(result),
            delay: Duration::ZERO,
        }
    }

    pub fn failing(message: impl Into<String>) -> Self {
        Self {
            outcome: Err(AnalysisError::new(message)),
            delay: Duration::ZERO,
        }
    }

    /// Simulate service latency.
    pub fn with_delay(mut self, delay: Duration) -> Self {
        self.delay = delay;
        self
    }
}

impl Default for MockAnalysisClient {
    fn default() -> Self {
        Self::succeeding(sample_result())
    }
}

#[async_trait]
impl AnalysisClient for MockAnalysisClient {
    fn name(&self) -> &str {
        "mock"
    }

    async fn analyze(&self, _image: &ImagePayload) -> Result<AnalysisResult, AnalysisError> {
        if !self.delay.is_zero() {
            tokio::time::sleep(self.delay).await;
        }
        self.outcome.clone()
    }
}

/// A plausible out-of-province exchange, used for offline demos.
pub fn sample_result() -> AnalysisResult {
    AnalysisResult {
        license_data: ExtractedLicenseData {
            first_name: "Alex".to_string(),
            last_name: "Morgan".to_string(),
            dob: "1990-05-14".to_string(),
            address: "1450 Granville St, Vancouver BC V6Z 1M3".to_string(),
            license_number: "7654321".to_string(),
            origin_province: "British Columbia".to_string(),
            current_class: "5".to_string(),
            expiry_date: "2028-05-14".to_string(),
            conditions: vec!["21 - Corrective lenses".to_string()],
            restrictions: Vec::new(),
            is_authentic: true,
            authenticity_confidence: 0.93,
        },
        equivalency: EquivalencyResult {
            target_class: "G".to_string(),
            is_direct_exchange: true,
            required_tests: vec!["Vision test".to_string()],
            required_docs: vec![
                "Proof of residency".to_string(),
                "Original licence (surrendered)".to_string(),
            ],
            fees: 90.0,
            policy_citation: "Interprovincial reciprocal licence exchange agreement".to_string(),
            notes: "Class 5 with more than 24 months' experience exchanges directly to G."
                .to_string(),
        },
    }
}
