//! Uptime monitor CLI.
//!
//! # Architecture Overview
//!
//! ```text
//!   scheduler (cron / workflow_dispatch)
//!        │
//!        ▼
//!   ┌──────────────────────────────────────────────────────────────┐
//!   │ uptime-monitor check                                          │
//!   │                                                               │
//!   │  config ──▶ targets ──▶ runner ──▶ check (probe × N, bounded) │
//!   │                           │                                   │
//!   │   store.load ─▶ prior ────┤                                   │
//!   │                           ▼                                   │
//!   │                 alerting (policy + templates)                 │
//!   │                           │                                   │
//!   │          new state ◀──────┴──────▶ notification requests      │
//!   │              │                            │                   │
//!   │         store.save                  notify::Dispatcher        │
//!   │                                     ├─▶ Twilio (SMS/WhatsApp) │
//!   │                                     └─▶ GitHub Issues         │
//!   └──────────────────────────────────────────────────────────────┘
//! ```
//!
//! Exit status is non-zero only for setup errors; down targets exit 0.

use std::path::{Path, PathBuf};
use std::process::ExitCode;

use clap::{Args, Parser, Subcommand};

use uptime_monitor::app::{build_store, run_once, watch};
use uptime_monitor::check::targets_from_config;
use uptime_monitor::config::{load_config, Credentials, MonitorConfig, ObservabilityConfig};
use uptime_monitor::lifecycle::{signals, Shutdown};
use uptime_monitor::notify::build_dispatcher;
use uptime_monitor::observability::logging::init_logging;
use uptime_monitor::{AppError, UptimeCheckRunner};

#[derive(Parser)]
#[command(name = "uptime-monitor", version)]
#[command(about = "Checks website uptime and raises SMS / issue alerts", long_about = None)]
struct Cli {
    /// Path to the TOML configuration file.
    #[arg(short, long, default_value = "monitor.toml", env = "UPTIME_CONFIG")]
    config: PathBuf,

    /// Log notifications instead of sending them.
    #[arg(long, global = true)]
    dry_run: bool,

    #[command(flatten)]
    credentials: CredentialArgs,

    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Args)]
struct CredentialArgs {
    #[arg(long, env = "TWILIO_ACCOUNT_SID", hide_env_values = true, hide = true)]
    twilio_account_sid: Option<String>,

    #[arg(long, env = "TWILIO_AUTH_TOKEN", hide_env_values = true, hide = true)]
    twilio_auth_token: Option<String>,

    #[arg(long, env = "GITHUB_TOKEN", hide_env_values = true, hide = true)]
    github_token: Option<String>,

    #[arg(long, env = "GITHUB_REPOSITORY", hide = true)]
    github_repository: Option<String>,
}

impl CredentialArgs {
    fn into_credentials(self) -> Credentials {
        Credentials::from_parts(
            self.twilio_account_sid,
            self.twilio_auth_token,
            self.github_token,
            self.github_repository,
        )
    }
}

#[derive(Subcommand)]
enum Commands {
    /// Run one check pass (default)
    Check {
        /// Print the pass outcome as JSON on stdout
        #[arg(long)]
        json: bool,
    },
    /// Run check passes on the configured interval until interrupted
    Watch,
    /// Validate the configuration and exit
    Validate,
    /// Show persisted alert state
    State {
        /// Drop entries for targets no longer configured
        #[arg(long)]
        prune: bool,
    },
}

#[tokio::main]
async fn main() -> ExitCode {
    let cli = Cli::parse();

    let config = match load_config(&cli.config) {
        Ok(config) => config,
        Err(e) => {
            init_logging(&ObservabilityConfig::default());
            let err = AppError::from(e);
            tracing::error!(path = ?cli.config, error = %err, "Failed to load configuration");
            return ExitCode::from(err.exit_code());
        }
    };
    init_logging(&config.observability);

    tracing::info!(
        version = env!("CARGO_PKG_VERSION"),
        targets = config.targets.len(),
        dry_run = cli.dry_run,
        "uptime-monitor starting"
    );

    let credentials = cli.credentials.into_credentials();
    let result = match cli.command.unwrap_or(Commands::Check { json: false }) {
        Commands::Check { json } => check(&config, &credentials, cli.dry_run, json).await,
        Commands::Watch => run_watch(config, &cli.config, credentials, cli.dry_run).await,
        Commands::Validate => {
            tracing::info!("Configuration is valid");
            Ok(())
        }
        Commands::State { prune } => show_state(&config, prune).await,
    };

    match result {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            tracing::error!(error = %e, "Aborting");
            ExitCode::from(e.exit_code())
        }
    }
}

async fn check(config: &MonitorConfig, credentials: &Credentials, dry_run: bool, json: bool) -> Result<(), AppError> {
    let dispatcher = build_dispatcher(config, credentials, dry_run)?;
    let runner = UptimeCheckRunner::from_config(config)?;
    let store = build_store(&config.state);
    let targets = targets_from_config(&config.targets, &config.http);

    let outcome = run_once(&runner, &targets, store.as_ref(), &dispatcher).await?;

    if json {
        match serde_json::to_string_pretty(&outcome) {
            Ok(text) => println!("{}", text),
            Err(e) => tracing::error!(error = %e, "Failed to serialize pass outcome"),
        }
    }

    for down in outcome.report.down_targets() {
        tracing::warn!(
            target_url = %down.target.url,
            outcome = down.outcome(),
            "Target not healthy at end of pass"
        );
    }
    Ok(())
}

async fn run_watch(config: MonitorConfig, path: &Path, credentials: Credentials, dry_run: bool) -> Result<(), AppError> {
    let shutdown = Shutdown::new();
    signals::spawn_signal_handler(&shutdown);
    watch(config, Some(path.to_path_buf()), credentials, dry_run, &shutdown).await?;
    tracing::info!("Shutdown complete");
    Ok(())
}

async fn show_state(config: &MonitorConfig, prune: bool) -> Result<(), AppError> {
    let store = build_store(&config.state);
    let mut state = store.load().await?;

    if prune {
        let before = state.len();
        state.retain(|url, _| config.targets.iter().any(|t| &t.url == url));
        store.save(&state).await?;
        tracing::info!(removed = before - state.len(), "Pruned alert state");
    }

    match serde_json::to_string_pretty(&state) {
        Ok(text) => println!("{}", text),
        Err(e) => tracing::error!(error = %e, "Failed to serialize alert state"),
    }
    Ok(())
}
