//! Config file watcher for `watch` mode.
//!
//! The parent directory is watched rather than the file itself: editors and
//! CI checkouts replace the file by rename, which drops a watch on the old
//! inode. Events are filtered down to the config file name, and a reload is
//! only forwarded when the file content actually changed.

use std::ffi::OsString;
use std::path::{Path, PathBuf};
use std::time::Duration;

use notify::{Config, Event, EventKind, RecommendedWatcher, RecursiveMode, Watcher};
use tokio::sync::mpsc;

use crate::config::loader::parse_config;
use crate::config::schema::MonitorConfig;

/// Forwards validated configs whenever the file at `path` changes.
pub struct ConfigWatcher {
    path: PathBuf,
    update_tx: mpsc::UnboundedSender<MonitorConfig>,
}

impl ConfigWatcher {
    /// Returns the watcher and the receiving end for reloaded configs.
    pub fn new(path: &Path) -> (Self, mpsc::UnboundedReceiver<MonitorConfig>) {
        let (update_tx, update_rx) = mpsc::unbounded_channel();
        (
            Self {
                path: path.to_path_buf(),
                update_tx,
            },
            update_rx,
        )
    }

    /// Start watching. The returned handle must be kept alive.
    pub fn run(self) -> Result<RecommendedWatcher, notify::Error> {
        let dir = watch_dir(&self.path);
        let file_name = self.path.file_name().map(OsString::from);
        let path = self.path.clone();
        let tx = self.update_tx;
        // Content of the last config seen, so touch/chmod/duplicate events are ignored.
        let mut last = std::fs::read_to_string(&path).ok();

        let mut watcher = RecommendedWatcher::new(
            move |res: notify::Result<Event>| match res {
                Ok(event) if concerns(&event, file_name.as_deref()) => {
                    let content = match std::fs::read_to_string(&path) {
                        Ok(content) => content,
                        Err(e) => {
                            // Mid-rename; the create event that follows will retry.
                            tracing::debug!(path = ?path, error = %e, "Config file not readable yet");
                            return;
                        }
                    };
                    if last.as_deref() == Some(content.as_str()) {
                        return;
                    }

                    match parse_config(&content) {
                        Ok(config) => {
                            tracing::info!(path = ?path, targets = config.targets.len(), "Config file changed");
                            last = Some(content);
                            let _ = tx.send(config);
                        }
                        Err(e) => {
                            tracing::error!(path = ?path, error = %e, "Changed config is invalid, keeping current");
                        }
                    }
                }
                Ok(_) => {}
                Err(e) => tracing::error!(error = ?e, "Config watch error"),
            },
            Config::default().with_poll_interval(Duration::from_secs(2)),
        )?;

        watcher.watch(&dir, RecursiveMode::NonRecursive)?;
        tracing::info!(path = ?self.path, dir = ?dir, "Config watcher started");
        Ok(watcher)
    }
}

fn watch_dir(path: &Path) -> PathBuf {
    match path.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent.to_path_buf(),
        _ => PathBuf::from("."),
    }
}

/// Whether `event` is a write, create or rename touching the config file.
fn concerns(event: &Event, file_name: Option<&std::ffi::OsStr>) -> bool {
    let relevant_kind = matches!(event.kind, EventKind::Modify(_) | EventKind::Create(_));
    relevant_kind
        && file_name.is_some_and(|name| event.paths.iter().any(|p| p.file_name() == Some(name)))
}
