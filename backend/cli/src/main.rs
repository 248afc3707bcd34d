mod analyze_cmd;
mod client;
mod config_cmd;
mod terminal_output;

use std::path::{Path, PathBuf};
use std::process::ExitCode;
use std::time::Duration;

use anyhow::{bail, Result};
use clap::{Parser, Subcommand};
use tracing::{info, warn};

use govsync_config::{
    config_dir, config_file_path, default_log_dir, load_and_prepare, validate, AnalysisProvider,
    GovSyncConfig,
};
use govsync_core::GovSyncError;
use govsync_logging::{init_file_logger, init_logger, set_redaction_enabled};
use govsync_media::FileCapture;

use config_cmd::ConfigCommands;

/// Simulated service latency for the offline client in the UI.
const OFFLINE_UI_DELAY: Duration = Duration::from_millis(1500);

#[derive(Parser)]
#[command(name = "govsync")]
#[command(about = "GovSync — driver's license transfer desk")]
#[command(version)]
struct Cli {
    /// Config file (defaults to $GOVSYNC_CONFIG_DIR/config.yaml or ~/.govsync/config.yaml)
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Open the interactive transfer desk
    Ui {
        /// Use sample results instead of the analysis service
        #[arg(long)]
        offline: bool,
    },
    /// Analyze one license image and print the review
    Analyze {
        /// Scanned or photographed license (JPEG, PNG, WebP or HEIC)
        path: PathBuf,
        /// Print JSON instead of tables
        #[arg(long)]
        json: bool,
        /// Use sample results instead of the analysis service
        #[arg(long)]
        offline: bool,
    },
    /// Inspect or create the config file
    Config {
        #[command(subcommand)]
        command: ConfigCommands,
    },
}

/// How the logger should treat the console.
#[derive(Clone, Copy)]
enum Console {
    Enabled,
    /// The TUI owns the terminal.
    Suppressed,
}

#[tokio::main]
async fn main() -> ExitCode {
    let cli = Cli::parse();
    match run(cli).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            terminal_output::note_error(&format!("{err:#}"));
            match err.downcast_ref::<GovSyncError>() {
                Some(GovSyncError::Analysis(_)) => ExitCode::from(2),
                _ => ExitCode::FAILURE,
            }
        }
    }
}

async fn run(cli: Cli) -> Result<()> {
    let config_path = cli
        .config
        .unwrap_or_else(|| config_file_path(&config_dir()));

    match cli.command {
        Commands::Config { command } => config_cmd::run(command, &config_path).await,
        Commands::Ui { offline } => {
            let config = prepare_runtime(&config_path, offline, Console::Suppressed).await?;
            let client = client::build_client(&config.analysis(), OFFLINE_UI_DELAY)?;
            let capture = FileCapture::new(config.capture().max_image_bytes());
            govsync_tui::run(client, capture).await
        }
        Commands::Analyze {
            path,
            json,
            offline,
        } => {
            let config = prepare_runtime(&config_path, offline, Console::Enabled).await?;
            let client = client::build_client(&config.analysis(), Duration::ZERO)?;
            let capture = FileCapture::new(config.capture().max_image_bytes());
            analyze_cmd::run(&path, json, client, &capture).await
        }
    }
}

/// Load the config, start logging and refuse to run on an invalid config.
async fn prepare_runtime(path: &Path, offline: bool, console: Console) -> Result<GovSyncConfig> {
    let mut config = load_and_prepare(path).await?;
    if offline {
        config.analysis.get_or_insert_with(Default::default).provider =
            Some(AnalysisProvider::Mock);
    }

    let logging = config.logging();
    let log_dir = match &logging.dir {
        Some(dir) => PathBuf::from(dir),
        None => default_log_dir(path.parent().unwrap_or(Path::new("."))),
    };
    match console {
        Console::Enabled => init_logger(&log_dir, logging.level())?,
        Console::Suppressed => init_file_logger(&log_dir, logging.level())?,
    }
    set_redaction_enabled(logging.redact_sensitive());

    for warning in check_config(path, &config)? {
        warn!(warning = %warning, "Config warning");
        terminal_output::note_warn(&warning);
    }

    info!(
        config = %path.display(),
        provider = ?config.analysis().provider(),
        "GovSync starting"
    );
    Ok(config)
}

/// Fail on config errors; hand back warnings for the caller to surface once
/// logging is up.
fn check_config(path: &Path, config: &GovSyncConfig) -> Result<Vec<String>> {
    let report = validate(config);
    if !report.is_valid() {
        let problems: Vec<String> = report
            .errors
            .iter()
            .map(|e| format!("{}: {}", e.path, e.message))
            .collect();
        bail!("Invalid config {}:\n  {}", path.display(), problems.join("\n  "));
    }
    Ok(report
        .warnings
        .iter()
        .map(|w| format!("{}: {}", w.path, w.message))
        .collect())
}
