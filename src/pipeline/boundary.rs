//! Per-cycle boundary state.
//!
//! Every cycle gets a fresh [`Boundary`]; nothing in it is shared with a
//! previous cycle. The loader is hidden by one idempotent operation that
//! the watchdog, success and every failure path all call; only the first
//! call has any effect.

use super::Stage;
use crate::preview::{ExecutionOutcome, OutcomeBoard, RenderCycle};
use parking_lot::Mutex;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, OnceLock};

/// Loading indicator state.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Loader {
    Visible,
    /// Hidden at once (watchdog, failure).
    Hidden,
    /// Faded out and removed after a successful mount.
    Removed,
}

/// What the boundary currently displays under the loader.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Surface {
    Blank,
    Placeholder,
    Mounted {
        component: String,
    },
    Panel {
        title: &'static str,
        message: String,
        line: Option<u32>,
    },
}

pub struct Boundary {
    cycle: RenderCycle,
    board: Arc<OutcomeBoard>,
    finalized: AtomicBool,
    loader: Mutex<Loader>,
    reported: OnceLock<ExecutionOutcome>,
    surface: Mutex<Surface>,
    stages: Mutex<Vec<Stage>>,
}

impl Boundary {
    pub fn new(cycle: RenderCycle, board: Arc<OutcomeBoard>) -> Self {
        Self {
            cycle,
            board,
            finalized: AtomicBool::new(false),
            loader: Mutex::new(Loader::Visible),
            reported: OnceLock::new(),
            surface: Mutex::new(Surface::Blank),
            stages: Mutex::new(Vec::new()),
        }
    }

    pub const fn cycle(&self) -> RenderCycle {
        self.cycle
    }

    /// Hide the loader. Returns `true` only for the call that hid it.
    pub fn finalize(&self, fade: bool) -> bool {
        if self.finalized.swap(true, Ordering::SeqCst) {
            return false;
        }
        *self.loader.lock() = if fade { Loader::Removed } else { Loader::Hidden };
        true
    }

    /// Report the boundary's outcome. The first report wins.
    pub fn report(&self, outcome: ExecutionOutcome) -> bool {
        if self.reported.set(outcome.clone()).is_err() {
            return false;
        }
        if let Err(rejected) = self.board.publish(self.cycle, outcome) {
            crate::debug!("cycle"; "{}", rejected);
        }
        true
    }

    /// Terminal failure: hide the loader, report, then show the panel.
    ///
    /// A later failure still replaces the panel, but never the report.
    pub fn fail(&self, outcome: ExecutionOutcome) {
        self.finalize(false);
        self.enter(Stage::Failed);
        let line = match &outcome {
            ExecutionOutcome::RuntimeError { line, .. } => *line,
            _ => None,
        };
        let panel = Surface::Panel {
            title: outcome.title(),
            message: outcome.message().unwrap_or_default().to_string(),
            line,
        };
        crate::debug!("preview"; "cycle {}: {}", self.cycle, outcome);
        self.report(outcome);
        *self.surface.lock() = panel;
    }

    /// The component is attached; the loader is still up until `succeed`.
    pub fn mounted(&self, component: &str) {
        self.enter(Stage::Mounted);
        *self.surface.lock() = Surface::Mounted {
            component: component.to_string(),
        };
    }

    /// Fade the loader out and report success.
    pub fn succeed(&self) {
        self.finalize(true);
        self.report(ExecutionOutcome::Success);
    }

    /// Nothing to render: no loader, no scripts, just the placeholder.
    pub fn empty(&self) {
        self.finalized.store(true, Ordering::SeqCst);
        *self.loader.lock() = Loader::Hidden;
        *self.surface.lock() = Surface::Placeholder;
        self.report(ExecutionOutcome::Empty);
    }

    pub fn enter(&self, stage: Stage) {
        self.stages.lock().push(stage);
    }

    pub fn is_reported(&self) -> bool {
        self.reported.get().is_some()
    }

    pub fn outcome(&self) -> Option<ExecutionOutcome> {
        self.reported.get().cloned()
    }

    pub fn loader(&self) -> Loader {
        *self.loader.lock()
    }

    pub fn surface(&self) -> Surface {
        self.surface.lock().clone()
    }

    /// Stages entered so far, in order.
    pub fn stages(&self) -> Vec<Stage> {
        self.stages.lock().clone()
    }
}
