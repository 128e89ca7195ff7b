//! Wiring of one pass (load → check → notify → save) and the watch loop.

use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use chrono::Utc;
use serde::Serialize;
use tokio::time;

use crate::check::{targets_from_config, Probe, Target};
use crate::config::watcher::ConfigWatcher;
use crate::config::{Credentials, MonitorConfig, StateConfig};
use crate::error::AppError;
use crate::lifecycle::Shutdown;
use crate::notify::{build_dispatcher, DispatchReport, Dispatcher};
use crate::observability::metrics;
use crate::runner::{RunReport, UptimeCheckRunner};
use crate::store::{JsonFileStore, MemoryStore, StateStore};

/// Everything a pass produced, including delivery results.
#[derive(Debug, Serialize)]
pub struct PassOutcome {
    pub report: RunReport,
    pub dispatch: DispatchReport,
}

/// Store selected by configuration.
pub fn build_store(config: &StateConfig) -> Arc<dyn StateStore> {
    match &config.path {
        Some(path) => Arc::new(JsonFileStore::new(path)),
        None => Arc::new(MemoryStore::new()),
    }
}

/// One complete pass.
///
/// State is read once before probing and written once after delivery, so a
/// pass that dies midway re-notifies on the next run rather than losing an alert.
pub async fn run_once<P: Probe + ?Sized>(
    runner: &UptimeCheckRunner<P>,
    targets: &[Target],
    store: &dyn StateStore,
    dispatcher: &Dispatcher,
) -> Result<PassOutcome, AppError> {
    let prior = store.load().await?;
    let report = runner.run(targets, &prior, Utc::now()).await;

    let dispatch = dispatcher.dispatch(&report.notifications).await;
    if !dispatch.all_delivered() {
        tracing::warn!(failed = dispatch.failed.len(), "Some notifications were not delivered");
    }

    store.save(&report.new_state).await?;
    Ok(PassOutcome { report, dispatch })
}

struct Components {
    runner: UptimeCheckRunner,
    dispatcher: Dispatcher,
    targets: Vec<Target>,
    interval: Duration,
}

impl Components {
    fn build(config: &MonitorConfig, credentials: &Credentials, dry_run: bool) -> Result<Self, AppError> {
        Ok(Self {
            runner: UptimeCheckRunner::from_config(config)?,
            dispatcher: build_dispatcher(config, credentials, dry_run)?,
            targets: targets_from_config(&config.targets, &config.http),
            interval: Duration::from_secs(config.schedule.interval_secs),
        })
    }
}

/// Run passes on a fixed interval until `shutdown` fires.
///
/// With a `config_path`, edits to the file are picked up between passes; a
/// reload that fails validation keeps the previous configuration.
pub async fn watch(
    config: MonitorConfig,
    config_path: Option<PathBuf>,
    credentials: Credentials,
    dry_run: bool,
    shutdown: &Shutdown,
) -> Result<(), AppError> {
    if config.observability.metrics_enabled {
        match config.observability.metrics_address.parse() {
            Ok(addr) => metrics::init_metrics(addr).map_err(AppError::Metrics)?,
            Err(e) => tracing::error!(
                metrics_address = %config.observability.metrics_address,
                error = %e,
                "Failed to parse metrics address"
            ),
        }
    }

    let store = build_store(&config.state);
    let mut state_config = config.state.clone();
    let mut components = Components::build(&config, &credentials, dry_run)?;

    let (_watcher, mut updates) = match config_path {
        Some(path) => {
            let (watcher, updates) = ConfigWatcher::new(&path);
            (Some(watcher.run()?), Some(updates))
        }
        None => (None, None),
    };

    let mut stop = shutdown.subscribe();
    let mut ticker = time::interval(components.interval);
    ticker.set_missed_tick_behavior(time::MissedTickBehavior::Delay);

    tracing::info!(
        interval_secs = components.interval.as_secs(),
        targets = components.targets.len(),
        "Watch loop starting"
    );

    loop {
        tokio::select! {
            _ = ticker.tick() => {
                match run_once(&components.runner, &components.targets, store.as_ref(), &components.dispatcher).await {
                    Ok(outcome) => tracing::debug!(
                        delivered = outcome.dispatch.delivered,
                        "Pass finished"
                    ),
                    Err(e) => tracing::error!(error = %e, "Pass failed, retrying next tick"),
                }
            }
            Some(new_config) = recv_update(&mut updates) => {
                match Components::build(&new_config, &credentials, dry_run) {
                    Ok(next) => {
                        if next.interval != components.interval {
                            ticker = time::interval_at(time::Instant::now() + next.interval, next.interval);
                            ticker.set_missed_tick_behavior(time::MissedTickBehavior::Delay);
                        }
                        if new_config.state.path != state_config.path {
                            tracing::warn!("State path changes take effect after restart");
                        }
                        state_config = new_config.state.clone();
                        components = next;
                        tracing::info!(targets = components.targets.len(), "Configuration reloaded");
                    }
                    Err(e) => tracing::error!(error = %e, "Reloaded configuration rejected, keeping current"),
                }
            }
            _ = stop.recv() => {
                tracing::info!("Watch loop received shutdown signal, exiting");
                break;
            }
        }
    }

    Ok(())
}

/// Next config update, or pending forever without a watcher.
async fn recv_update(updates: &mut Option<tokio::sync::mpsc::UnboundedReceiver<MonitorConfig>>) -> Option<MonitorConfig> {
    match updates {
        Some(rx) => rx.recv().await,
        None => std::future::pending().await,
    }
}
