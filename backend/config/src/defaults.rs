//! Config defaults: applies sensible default values to parsed config.

use crate::schema::{
    AnalysisConfig, AnalysisProvider, CaptureConfig, GovSyncConfig, LoggingConfig,
    CURRENT_VERSION,
};

pub const DEFAULT_MODEL: &str = "gemini-2.0-flash";
pub const DEFAULT_BASE_URL: &str = "https://generativelanguage.googleapis.com/v1beta";
pub const DEFAULT_TARGET_JURISDICTION: &str = "Ontario";

/// Default request timeout (seconds) for one analysis call.
pub const DEFAULT_TIMEOUT_SECS: u64 = 60;

pub const DEFAULT_TEMPERATURE: f32 = 0.1;

/// Default capture size limit (10 MiB).
pub const DEFAULT_MAX_IMAGE_BYTES: u64 = 10 * 1024 * 1024;

pub const DEFAULT_LOG_LEVEL: &str = "info";

/// Apply all defaults to a freshly loaded config.
pub fn apply_all_defaults(config: GovSyncConfig) -> GovSyncConfig {
    let config = apply_version_default(config);
    let config = apply_analysis_defaults(config);
    let config = apply_capture_defaults(config);
    apply_logging_defaults(config)
}

fn apply_version_default(mut config: GovSyncConfig) -> GovSyncConfig {
    config.version.get_or_insert(CURRENT_VERSION);
    config
}

/// Ensure provider, model, endpoint and request tuning are set.
fn apply_analysis_defaults(mut config: GovSyncConfig) -> GovSyncConfig {
    let analysis = config.analysis.get_or_insert_with(AnalysisConfig::default);
    analysis.provider.get_or_insert(AnalysisProvider::Gemini);
    analysis
        .model
        .get_or_insert_with(|| DEFAULT_MODEL.to_string());
    analysis
        .base_url
        .get_or_insert_with(|| DEFAULT_BASE_URL.to_string());
    analysis
        .target_jurisdiction
        .get_or_insert_with(|| DEFAULT_TARGET_JURISDICTION.to_string());
    analysis.timeout_secs.get_or_insert(DEFAULT_TIMEOUT_SECS);
    analysis.temperature.get_or_insert(DEFAULT_TEMPERATURE);
    config
}

fn apply_capture_defaults(mut config: GovSyncConfig) -> GovSyncConfig {
    let capture = config.capture.get_or_insert_with(CaptureConfig::default);
    capture.max_image_bytes.get_or_insert(DEFAULT_MAX_IMAGE_BYTES);
    config
}

/// Logging level and PII redaction default on.
fn apply_logging_defaults(mut config: GovSyncConfig) -> GovSyncConfig {
    let logging = config.logging.get_or_insert_with(LoggingConfig::default);
    logging
        .level
        .get_or_insert_with(|| DEFAULT_LOG_LEVEL.to_string());
    logging.redact_sensitive.get_or_insert(true);
    config
}
