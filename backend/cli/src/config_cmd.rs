//! CLI Config Subcommands

use std::path::Path;

use anyhow::{bail, Result};
use clap::Subcommand;
use govsync_config::{
    apply_all_defaults, load_and_prepare, redact, validate, write_config, AnalysisConfig,
    AnalysisProvider, GovSyncConfig, CURRENT_VERSION,
};

use crate::terminal_output::{note_error, note_info, note_success, note_warn};

#[derive(Subcommand)]
pub enum ConfigCommands {
    /// Print the effective config with secrets masked
    Show,
    /// Write a starter config file
    Init {
        /// Overwrite an existing file (the old one is kept as a backup)
        #[arg(long)]
        force: bool,
    },
    /// Check the config file for errors and warnings
    Validate,
}

pub async fn run(cmd: ConfigCommands, path: &Path) -> Result<()> {
    match cmd {
        ConfigCommands::Show => {
            let config = load_and_prepare(path).await?;
            let masked = redact(&serde_json::to_value(&config)?);
            println!("# {}", path.display());
            print!("{}", serde_yaml::to_string(&masked)?);
        }
        ConfigCommands::Init { force } => {
            if path.exists() && !force {
                bail!("{} already exists; pass --force to overwrite", path.display());
            }
            write_config(&starter_config(), path).await?;
            note_success(&format!("Wrote {}", path.display()));
            note_info("Set GEMINI_API_KEY, or run with --offline to use sample results");
        }
        ConfigCommands::Validate => {
            let config = load_and_prepare(path).await?;
            let report = validate(&config);
            for warning in &report.warnings {
                note_warn(&format!("{}: {}", warning.path, warning.message));
            }
            for error in &report.errors {
                note_error(&format!("{}: {}", error.path, error.message));
            }
            if !report.is_valid() {
                bail!("{} error(s) in {}", report.errors.len(), path.display());
            }
            note_success(&format!("{} is valid", path.display()));
        }
    }
    Ok(())
}

/// Defaults spelled out, with the API key left to the environment.
fn starter_config() -> GovSyncConfig {
    apply_all_defaults(GovSyncConfig {
        version: Some(CURRENT_VERSION),
        analysis: Some(AnalysisConfig {
            provider: Some(AnalysisProvider::Gemini),
            ..Default::default()
        }),
        ..Default::default()
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use govsync_config::load_config;

    #[tokio::test]
    async fn init_writes_once_unless_forced() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.yaml");

        run(ConfigCommands::Init { force: false }, &path).await.unwrap();
        let written = load_config(&path).await.unwrap();
        assert_eq!(written.version, Some(CURRENT_VERSION));
        assert!(written.analysis().api_key.is_none());

        assert!(run(ConfigCommands::Init { force: false }, &path).await.is_err());
        run(ConfigCommands::Init { force: true }, &path).await.unwrap();
        assert!(path.with_extension("yaml.bak.1").exists());
    }

    #[tokio::test]
    async fn validate_accepts_offline_config() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.yaml");
        tokio::fs::write(&path, "analysis:\n  provider: mock\n").await.unwrap();
        run(ConfigCommands::Validate, &path).await.unwrap();
    }

    #[tokio::test]
    async fn validate_rejects_bad_limits() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.yaml");
        tokio::fs::write(&path, "analysis:\n  provider: mock\ncapture:\n  maxImageBytes: 0\n")
            .await
            .unwrap();
        assert!(run(ConfigCommands::Validate, &path).await.is_err());
    }
}
