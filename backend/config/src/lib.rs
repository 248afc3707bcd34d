//! `govsync-config` — GovSync runtime configuration management.
//!
//! Provides:
//! - Typed config schema (analysis service, capture limits, logging)
//! - YAML read/write with atomic backup rotation
//! - `${ENV_VAR}` substitution and API key fallback from the environment
//! - Config redaction for safe display
//! - Default value application
//! - Schema validation

pub mod defaults;
pub mod env;
pub mod io;
pub mod redact;
pub mod schema;
pub mod validation;

pub use defaults::apply_all_defaults;
pub use env::{
    apply_api_key_fallback, collect_referenced_vars, resolve_env_vars_with,
    MissingEnvVarError,
};
pub use io::{config_dir, config_file_path, default_log_dir, load_config, write_config};
pub use redact::redact;
pub use schema::{
    AnalysisConfig, AnalysisProvider, CaptureConfig, GovSyncConfig, LoggingConfig,
    CURRENT_VERSION,
};
pub use validation::{validate, ConfigValidationError, ValidationReport};

use anyhow::{Context, Result};
use serde_json::Value;
use std::path::Path;

/// Load, apply env substitution, and apply defaults to a config file.
///
/// This is the main entry point for loading a config at runtime.
pub async fn load_and_prepare(path: &Path) -> Result<GovSyncConfig> {
    let raw_config = load_config(path).await?;
    prepare(raw_config, &std::env::vars().collect())
}

/// The in-memory half of [`load_and_prepare`], with an explicit environment.
pub fn prepare(
    raw_config: GovSyncConfig,
    env: &std::collections::HashMap<String, String>,
) -> Result<GovSyncConfig> {
    let value: Value = serde_json::to_value(&raw_config)
        .context("Failed to serialize config for processing")?;

    let value = resolve_env_vars_with(&value, env).context("Failed to resolve env vars in config")?;

    let config: GovSyncConfig =
        serde_json::from_value(value).context("Failed to deserialize config after processing")?;

    let config = apply_api_key_fallback(config, env);
    let config = apply_all_defaults(config);

    let report = validate(&config);
    for warning in &report.warnings {
        tracing::warn!(path = %warning.path, message = %warning.message, "Config warning");
    }
    for error in &report.errors {
        tracing::error!(path = %error.path, message = %error.message, "Config error");
    }

    Ok(config)
}
