//! FileSystem Actor
//!
//! Watches the source directory and swaps the session's source map after
//! each quiet burst of changes.
//!
//! ```text
//! Watcher → ChangeBatch (quiet period, cooldown) → rescan → PreviewSession::replace_sources
//! ```
//!
//! The actor is created from the config, before the initial scan, so a
//! change made while scanning is still reported. A rescan whose content
//! identity matches the current map starts no cycle.

use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::{Duration, Instant};

use notify::{RecommendedWatcher, RecursiveMode, Watcher};

use crate::config::{PreviewConfig, SourceConfig};
use crate::preview::{PreviewSession, RenderCycle};
use crate::source::scan_dir;

mod batch;

#[cfg(test)]
mod tests;

use batch::ChangeBatch;

/// Sleep used while no batch is pending.
const IDLE: Duration = Duration::from_secs(3600);

/// FileSystem Actor - watches for source changes
pub struct FsActor {
    /// Channel to receive notify events (sync -> async bridge)
    notify_rx: std::sync::mpsc::Receiver<notify::Result<notify::Event>>,
    /// Watcher handle (must be kept alive)
    _watcher: RecommendedWatcher,
    root: PathBuf,
    source: SourceConfig,
}

impl FsActor {
    /// Start watching the configured source directory immediately.
    ///
    /// Events are buffered until [`run`](Self::run) is called.
    pub fn new(config: &PreviewConfig) -> notify::Result<Self> {
        let (notify_tx, notify_rx) = std::sync::mpsc::channel();

        let mut watcher = notify::recommended_watcher(move |res| {
            let _ = notify_tx.send(res);
        })?;

        let root = config.source_dir();
        watcher.watch(&root, RecursiveMode::Recursive)?;
        crate::debug!("watch"; "watching {}", root.display());

        Ok(Self {
            notify_rx,
            _watcher: watcher,
            root,
            source: config.source.clone(),
        })
    }

    /// Feed changes into `session` until the watcher goes away.
    pub async fn run(self, session: Arc<PreviewSession>) {
        let Self {
            notify_rx,
            _watcher,
            root,
            source,
        } = self;

        let (async_tx, mut async_rx) = tokio::sync::mpsc::channel::<notify::Event>(64);

        std::thread::spawn(move || {
            while let Ok(result) = notify_rx.recv() {
                match result {
                    Ok(event) => {
                        if async_tx.blocking_send(event).is_err() {
                            break;
                        }
                    }
                    Err(e) => crate::log!("watch"; "notify error: {}", e),
                }
            }
        });

        let mut batch = ChangeBatch::default();
        loop {
            let wait = batch
                .due()
                .map_or(IDLE, |due| due.saturating_duration_since(Instant::now()));
            tokio::select! {
                biased;
                event = async_rx.recv() => match event {
                    Some(event) => batch.record(&event, Instant::now(), |path| {
                        is_source_change(path, &root, &source)
                    }),
                    None => break,
                },
                _ = tokio::time::sleep(wait) => {
                    let Some(paths) = batch.release(Instant::now()) else {
                        continue;
                    };
                    for path in &paths {
                        crate::debug!("watch"; "changed {}", display_path(path, &root));
                    }
                    rescan(&session).await;
                }
            }
        }
    }
}

/// Reload the source map from disk and swap it into the session.
pub(super) async fn rescan(session: &Arc<PreviewSession>) -> Option<RenderCycle> {
    let root = session.config().source_dir();
    let source = session.config().source.clone();

    let scanned = tokio::task::spawn_blocking(move || scan_dir(&root, &source)).await;
    let sources = match scanned {
        Ok(Ok(sources)) => sources,
        Ok(Err(e)) => {
            crate::log!("watch"; "rescan failed: {:#}", e);
            return None;
        }
        Err(e) => {
            crate::log!("watch"; "rescan aborted: {}", e);
            return None;
        }
    };

    let started = session.replace_sources(sources);
    if started.is_none() {
        crate::logger::status_unchanged("sources unchanged");
    }
    started
}

/// Whether a change under `root` can affect the source map.
///
/// Paths inside ignored directories never do. Paths without an extension
/// may be directories that were removed or renamed, so they count.
pub(super) fn is_source_change(path: &Path, root: &Path, config: &SourceConfig) -> bool {
    let Ok(relative) = path.strip_prefix(root) else {
        return false;
    };
    let ignored = relative.components().any(|c| {
        c.as_os_str()
            .to_str()
            .is_some_and(|name| config.ignore.iter().any(|i| i == name))
    });
    if ignored {
        return false;
    }
    match path.extension().and_then(|e| e.to_str()) {
        Some(ext) => config.scan.iter().any(|s| s == ext),
        None => true,
    }
}

fn display_path<'a>(path: &'a Path, root: &Path) -> std::borrow::Cow<'a, str> {
    path.strip_prefix(root).unwrap_or(path).to_string_lossy()
}
