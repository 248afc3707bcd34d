//! Config validation: schema checks with user-friendly error messages.

use crate::schema::{AnalysisProvider, GovSyncConfig, CURRENT_VERSION};
use thiserror::Error;

/// Gemini rejects inline request payloads above this size.
const INLINE_REQUEST_LIMIT: u64 = 20 * 1024 * 1024;

const KNOWN_LOG_LEVELS: &[&str] = &["trace", "debug", "info", "warn", "error", "off"];

/// A config validation error with field path and message.
#[derive(Debug, Error)]
#[error("Config validation error at '{path}': {message}")]
pub struct ConfigValidationError {
    pub path: String,
    pub message: String,
}

/// A collection of validation errors found in one pass.
#[derive(Debug, Default)]
pub struct ValidationReport {
    pub errors: Vec<ConfigValidationError>,
    pub warnings: Vec<ConfigValidationError>,
}

impl ValidationReport {
    pub fn is_valid(&self) -> bool {
        self.errors.is_empty()
    }

    fn error(&mut self, path: impl Into<String>, message: impl Into<String>) {
        self.errors.push(ConfigValidationError {
            path: path.into(),
            message: message.into(),
        });
    }

    fn warn(&mut self, path: impl Into<String>, message: impl Into<String>) {
        self.warnings.push(ConfigValidationError {
            path: path.into(),
            message: message.into(),
        });
    }
}

/// Validate the config and return a report of all errors and warnings.
pub fn validate(config: &GovSyncConfig) -> ValidationReport {
    let mut report = ValidationReport::default();
    validate_version(config, &mut report);
    validate_analysis(config, &mut report);
    validate_capture(config, &mut report);
    validate_logging(config, &mut report);
    report
}

fn validate_version(config: &GovSyncConfig, report: &mut ValidationReport) {
    if let Some(version) = config.version {
        if version > CURRENT_VERSION {
            report.error(
                "_version",
                format!("Config version {version} is newer than supported version {CURRENT_VERSION}"),
            );
        }
    }
}

fn validate_analysis(config: &GovSyncConfig, report: &mut ValidationReport) {
    let Some(analysis) = &config.analysis else { return };

    if analysis.provider() == AnalysisProvider::Gemini && analysis.api_key().is_none() {
        report.error(
            "analysis.apiKey",
            "Gemini provider requires an API key (set analysis.apiKey or GEMINI_API_KEY)",
        );
    }
    if let Some(url) = &analysis.base_url {
        if !(url.starts_with("https://") || url.starts_with("http://")) {
            report.error("analysis.baseUrl", format!("'{url}' is not an http(s) URL"));
        } else if url.starts_with("http://") {
            report.warn("analysis.baseUrl", "Plain http sends license images unencrypted");
        }
    }
    if let Some(model) = &analysis.model {
        if model.trim().is_empty() {
            report.error("analysis.model", "Model id cannot be empty");
        }
    }
    if analysis.timeout_secs == Some(0) {
        report.error("analysis.timeoutSecs", "timeoutSecs must be >= 1");
    }
    if let Some(t) = analysis.temperature {
        if !(0.0..=2.0).contains(&t) {
            report.error("analysis.temperature", format!("temperature {t} is outside [0, 2]"));
        }
    }
}

fn validate_capture(config: &GovSyncConfig, report: &mut ValidationReport) {
    let Some(capture) = &config.capture else { return };
    match capture.max_image_bytes {
        Some(0) => report.error("capture.maxImageBytes", "maxImageBytes must be > 0"),
        // Base64 inflates the image by a third on the wire.
        Some(n) if n.saturating_mul(4) / 3 > INLINE_REQUEST_LIMIT => report.warn(
            "capture.maxImageBytes",
            format!("{n} bytes will exceed the analysis service's 20 MB inline request limit"),
        ),
        _ => {}
    }
}

fn validate_logging(config: &GovSyncConfig, report: &mut ValidationReport) {
    let Some(logging) = &config.logging else { return };
    if let Some(level) = &logging.level {
        if !KNOWN_LOG_LEVELS.contains(&level.to_lowercase().as_str()) {
            report.warn(
                "logging.level",
                format!("Unknown level '{level}'; RUST_LOG-style directives are passed through as-is"),
            );
        }
    }
    if logging.redact_sensitive == Some(false) {
        report.warn(
            "logging.redactSensitive",
            "License numbers and dates of birth will be written to logs",
        );
    }
}
