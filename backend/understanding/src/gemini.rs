//! License analysis through the Gemini `generateContent` API.
//!
//! The image travels inline (base64) next to the prompt, and the model is
//! asked for JSON constrained by [`response_schema`].

use std::time::{Duration, Instant};

use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::{debug, info};

use govsync_core::{AnalysisClient, AnalysisError, AnalysisResult, ImagePayload};

use crate::prompt::{DEFAULT_TARGET_JURISDICTION, analysis_prompt, response_schema};

pub use govsync_config::defaults::{DEFAULT_BASE_URL, DEFAULT_MODEL};
use govsync_config::defaults::DEFAULT_TEMPERATURE;

/// Gemini vision client.
pub struct GeminiAnalysisClient {
    client: Client,
    api_key: String,
    model: String,
    base_url: String,
    target_jurisdiction: String,
    temperature: f32,
}

impl GeminiAnalysisClient {
    pub fn new(api_key: impl Into<String>) -> Self {
        Self {
            client: Client::new(),
            api_key: api_key.into(),
            model: DEFAULT_MODEL.to_string(),
            base_url: DEFAULT_BASE_URL.to_string(),
            target_jurisdiction: DEFAULT_TARGET_JURISDICTION.to_string(),
            temperature: DEFAULT_TEMPERATURE,
        }
    }

    pub fn with_model(mut self, model: impl Into<String>) -> Self {
        self.model = model.into();
        self
    }

    pub fn with_base_url(mut self, url: impl Into<String>) -> Self {
        self.base_url = url.into().trim_end_matches('/').to_string();
        self
    }

    pub fn with_target_jurisdiction(mut self, jurisdiction: impl Into<String>) -> Self {
        self.target_jurisdiction = jurisdiction.into();
        self
    }

    pub fn with_temperature(mut self, temperature: f32) -> Self {
        self.temperature = temperature;
        self
    }

    /// Bound every request by `timeout`.
    pub fn with_timeout(mut self, timeout: Duration) -> anyhow::Result<Self> {
        self.client = Client::builder().timeout(timeout).build()?;
        Ok(self)
    }

    fn endpoint(&self) -> String {
        format!("{}/models/{}:generateContent", self.base_url, self.model)
    }

    fn request_body(&self, image: &ImagePayload) -> GenerateContentRequest {
        GenerateContentRequest {
            contents: vec![RequestContent {
                parts: vec![
                    RequestPart::Text {
                        text: analysis_prompt(&self.target_jurisdiction),
                    },
                    RequestPart::InlineData {
                        inline_data: InlineData {
                            mime_type: image.mime_type.clone(),
                            data: image.to_base64(),
                        },
                    },
                ],
            }],
            generation_config: GenerationConfig {
                response_mime_type: "application/json".to_string(),
                response_schema: response_schema(),
                temperature: self.temperature,
            },
        }
    }
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct GenerateContentRequest {
    contents: Vec<RequestContent>,
    generation_config: GenerationConfig,
}

#[derive(Serialize)]
struct RequestContent {
    parts: Vec<RequestPart>,
}

#[derive(Serialize)]
#[serde(untagged)]
enum RequestPart {
    Text {
        text: String,
    },
    InlineData {
        #[serde(rename = "inlineData")]
        inline_data: InlineData,
    },
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct InlineData {
    mime_type: String,
    data: String,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct GenerationConfig {
    response_mime_type: String,
    response_schema: Value,
    temperature: f32,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct GenerateContentResponse {
    #[serde(default)]
    candidates: Vec<Candidate>,
    prompt_feedback: Option<PromptFeedback>,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct Candidate {
    content: Option<ResponseContent>,
    finish_reason: Option<String>,
}

#[derive(Deserialize)]
struct ResponseContent {
    #[serde(default)]
    parts: Vec<ResponsePart>,
}

#[derive(Deserialize)]
struct ResponsePart {
    text: Option<String>,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct PromptFeedback {
    block_reason: Option<String>,
}

#[derive(Deserialize)]
struct ErrorEnvelope {
    error: ErrorBody,
}

#[derive(Deserialize)]
struct ErrorBody {
    message: String,
}

/// Turn a non-2xx reply into a displayable message.
fn http_error_message(status: reqwest::StatusCode, body: &str) -> String {
    match serde_json::from_str::<ErrorEnvelope>(body) {
        Ok(envelope) => format!("Gemini returned {}: {}", status, envelope.error.message),
        Err(_) if body.trim().is_empty() => format!("Gemini returned {}", status),
        Err(_) => format!("Gemini returned {}: {}", status, body.trim()),
    }
}

/// Models sometimes wrap JSON in a Markdown fence despite the MIME type.
fn strip_code_fence(text: &str) -> &str {
    let trimmed = text.trim();
    let Some(rest) = trimmed.strip_prefix("```") else {
        return trimmed;
    };
    let rest = rest.strip_prefix("json").unwrap_or(rest);
    rest.strip_suffix("```").unwrap_or(rest).trim()
}

/// Extract the [`AnalysisResult`] from a successful `generateContent` body.
pub fn parse_generate_content(body: &str) -> Result<AnalysisResult, AnalysisError> {
    let response: GenerateContentResponse = serde_json::from_str(body)
        .map_err(|e| AnalysisError::new(format!("Failed to parse Gemini response: {e}")))?;

    if let Some(reason) = response.prompt_feedback.and_then(|f| f.block_reason) {
        return Err(AnalysisError::new(format!(
            "Gemini blocked the request ({reason})"
        )));
    }

    let candidate = response
        .candidates
        .into_iter()
        .next()
        .ok_or_else(|| AnalysisError::new("Gemini returned no candidates"))?;

    let text: String = candidate
        .content
        .map(|c| c.parts.into_iter().filter_map(|p| p.text).collect())
        .unwrap_or_default();

    if text.trim().is_empty() {
        let reason = candidate.finish_reason.unwrap_or_else(|| "UNKNOWN".to_string());
        return Err(AnalysisError::new(format!(
            "Gemini returned an empty answer (finish reason {reason})"
        )));
    }

    serde_json::from_str(strip_code_fence(&text)).map_err(|e| {
        AnalysisError::new(format!("Gemini answer did not match the license schema: {e}"))
    })
}

#[async_trait]
impl AnalysisClient for GeminiAnalysisClient {
    fn name(&self) -> &str {
        "gemini"
    }

    async fn analyze(&self, image: &ImagePayload) -> Result<AnalysisResult, AnalysisError> {
        let start = Instant::now();
        let body = self.request_body(image);

        debug!(
            model = %self.model,
            mime = %image.mime_type,
            bytes = image.len(),
            "Sending license image to Gemini"
        );

        let response = self
            .client
            .post(self.endpoint())
            .header("x-goog-api-key", &self.api_key)
            .json(&body)
            .send()
            .await
            .map_err(|e| {
                AnalysisError::new(format!("Gemini HTTP request failed: {}", e.without_url()))
            })?;

        let status = response.status();
        let text = response.text().await.map_err(|e| {
            AnalysisError::new(format!("Failed to read Gemini response: {}", e.without_url()))
        })?;

        if !status.is_success() {
            return Err(AnalysisError::new(http_error_message(status, &text)));
        }

        let result = parse_generate_content(&text)?;
        info!(
            model = %self.model,
            latency_ms = start.elapsed().as_millis() as u64,
            target_class = %result.equivalency.target_class,
            "Gemini analysis complete"
        );
        Ok(result)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use govsync_config::AnalysisConfig;
    use serde_json::json;

    #[test]
    fn unconfigured_client_matches_config_defaults() {
        let defaults = AnalysisConfig::default();
        let client = GeminiAnalysisClient::new("k");
        assert_eq!(
            client.endpoint(),
            format!("{}/models/{}:generateContent", defaults.base_url(), defaults.model())
        );
        assert_eq!(client.target_jurisdiction, defaults.target_jurisdiction());
        assert_eq!(client.temperature, defaults.temperature());
    }

    fn answer() -> Value {
        json!({
            "licenseData": {
                "firstName": "Mina", "lastName": "Okafor", "dob": "1992-07-30",
                "address": "88 Jasper Ave, Edmonton AB", "licenseNumber": "123456-789",
                "originProvince": "Alberta", "currentClass": "5", "expiryDate": "2028-07-30",
                "conditions": [], "restrictions": ["B"],
                "isAuthentic": true, "authenticityConfidence": 0.91
            },
            "equivalency": {
                "targetClass": "G", "isDirectExchange": true,
                "requiredTests": ["Vision test"], "requiredDocs": ["Proof of residency"],
                "fees": 90.0, "policyCitation": "Reciprocal agreement", "notes": ""
            }
        })
    }

    fn wrap(text: &str) -> String {
        json!({
            "candidates": [{
                "content": { "parts": [{ "text": text }], "role": "model" },
                "finishReason": "STOP"
            }]
        })
        .to_string()
    }

    #[test]
    fn parses_candidate_json() {
        let body = wrap(&answer().to_string());
        let result = parse_generate_content(&body).unwrap();
        assert_eq!(result.license_data.last_name, "Okafor");
        assert_eq!(result.license_data.restrictions, vec!["B"]);
        assert_eq!(result.equivalency.target_class, "G");
        assert!(result.equivalency.is_direct_exchange);
    }

    #[test]
    fn parses_fenced_answer() {
        let fenced = format!("```json\n{}\n```", answer());
        let result = parse_generate_content(&wrap(&fenced)).unwrap();
        assert_eq!(result.license_data.first_name, "Mina");
    }

    #[test]
    fn blocked_prompt_is_an_error() {
        let body = json!({ "promptFeedback": { "blockReason": "SAFETY" } }).to_string();
        let err = parse_generate_content(&body).unwrap_err();
        assert_eq!(err.message(), "Gemini blocked the request (SAFETY)");
    }

    #[test]
    fn empty_candidate_reports_finish_reason() {
        let body = json!({
            "candidates": [{ "content": { "parts": [] }, "finishReason": "MAX_TOKENS" }]
        })
        .to_string();
        let err = parse_generate_content(&body).unwrap_err();
        assert!(err.message().contains("MAX_TOKENS"));
    }

    #[test]
    fn schema_mismatch_is_an_error() {
        let err = parse_generate_content(&wrap(r#"{"licenseData": {}}"#)).unwrap_err();
        assert!(err.message().starts_with("Gemini answer did not match"));
    }

    #[test]
    fn http_errors_use_service_message() {
        let body = r#"{"error": {"code": 400, "message": "API key not valid.", "status": "INVALID_ARGUMENT"}}"#;
        assert_eq!(
            http_error_message(reqwest::StatusCode::BAD_REQUEST, body),
            "Gemini returned 400 Bad Request: API key not valid."
        );
        assert_eq!(
            http_error_message(reqwest::StatusCode::SERVICE_UNAVAILABLE, ""),
            "Gemini returned 503 Service Unavailable"
        );
    }

    #[test]
    fn request_body_carries_image_and_schema() {
        let client = GeminiAnalysisClient::new("k").with_target_jurisdiction("Manitoba");
        let image = ImagePayload::new("scan.jpg", "image/jpeg", b"abc".to_vec());
        let body = serde_json::to_value(client.request_body(&image)).unwrap();

        let parts = &body["contents"][0]["parts"];
        assert!(parts[0]["text"].as_str().unwrap().contains("Manitoba"));
        assert_eq!(parts[1]["inlineData"]["mimeType"], "image/jpeg");
        assert_eq!(parts[1]["inlineData"]["data"], "YWJj");
        assert_eq!(
            body["generationConfig"]["responseMimeType"],
            "application/json"
        );
    }

    #[test]
    fn endpoint_joins_base_url_and_model() {
        let client = GeminiAnalysisClient::new("k")
            .with_base_url("http://localhost:9999/v1beta/")
            .with_model("gemini-test");
        assert_eq!(
            client.endpoint(),
            "http://localhost:9999/v1beta/models/gemini-test:generateContent"
        );
    }
}
