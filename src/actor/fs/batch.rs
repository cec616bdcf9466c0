use std::path::{Path, PathBuf};
use std::time::{Duration, Instant};

use rustc_hash::FxHashSet;

use crate::config::normalize_path;

/// Time without events before a batch is released.
pub(super) const QUIET_PERIOD: Duration = Duration::from_millis(300);
/// Minimum gap between two released batches.
pub(super) const COOLDOWN: Duration = Duration::from_millis(500);

/// Paths touched since the last rescan.
///
/// What happened to a path does not matter: any touch means the map is
/// reloaded from disk, and the reload sees the final state.
#[derive(Debug, Default)]
pub(super) struct ChangeBatch {
    paths: FxHashSet<PathBuf>,
    last_touch: Option<Instant>,
    last_release: Option<Instant>,
}

impl ChangeBatch {
    /// Record the paths of `event` that pass `relevant`.
    pub(super) fn record(
        &mut self,
        event: &notify::Event,
        now: Instant,
        relevant: impl Fn(&Path) -> bool,
    ) {
        if !touches_content(&event.kind) {
            return;
        }
        let mut touched = false;
        for path in event.paths.iter().filter(|p| !is_editor_artifact(p)) {
            let path = normalize_path(path);
            if relevant(&path) {
                self.paths.insert(path);
                touched = true;
            }
        }
        if touched {
            self.last_touch = Some(now);
        }
    }

    /// When the batch may next be released, if it holds anything.
    pub(super) fn due(&self) -> Option<Instant> {
        let touched = self.last_touch.filter(|_| !self.paths.is_empty())?;
        let quiet = touched + QUIET_PERIOD;
        Some(match self.last_release {
            Some(released) => quiet.max(released + COOLDOWN),
            None => quiet,
        })
    }

    /// Take the paths if the batch is due at `now`.
    pub(super) fn release(&mut self, now: Instant) -> Option<Vec<PathBuf>> {
        if self.due()? > now {
            return None;
        }
        self.last_touch = None;
        self.last_release = Some(now);
        let mut paths: Vec<_> = self.paths.drain().collect();
        paths.sort();
        Some(paths)
    }
}

fn touches_content(kind: &notify::EventKind) -> bool {
    use notify::EventKind;
    use notify::event::ModifyKind;

    match kind {
        EventKind::Create(_) | EventKind::Remove(_) => true,
        EventKind::Modify(modify) => !matches!(modify, ModifyKind::Metadata(_)),
        _ => false,
    }
}

/// Swap files, backups and hidden files written by editors while saving.
fn is_editor_artifact(path: &Path) -> bool {
    let Some(name) = path.file_name().and_then(|n| n.to_str()) else {
        return false;
    };
    name.starts_with('.')
        || name.ends_with('~')
        || path
            .extension()
            .and_then(|e| e.to_str())
            .is_some_and(|ext| matches!(ext, "swp" | "swo" | "tmp" | "bak" | "bck" | "backup"))
}
