//! Render cycles and the refresh controller.
//!
//! A [`RenderCycle`] is nothing but a generation number. The controller
//! publishes every new cycle through a `watch` channel; whoever hosts the
//! boundary (the headless executor or the serve-mode frame) observes the
//! change and replaces its boundary wholesale.

use serde::{Deserialize, Serialize};
use tokio::sync::watch;

/// Generation counter identifying one execution attempt.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct RenderCycle(u64);

impl RenderCycle {
    /// Cycle created when the preview is first mounted.
    pub const FIRST: Self = Self(1);

    pub const fn new(n: u64) -> Self {
        Self(n)
    }

    pub const fn get(self) -> u64 {
        self.0
    }

    pub const fn next(self) -> Self {
        Self(self.0 + 1)
    }
}

impl std::fmt::Display for RenderCycle {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Why a cycle was started.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CycleReason {
    Mount,
    Refresh,
    Sources,
}

impl CycleReason {
    pub const fn label(self) -> &'static str {
        match self {
            Self::Mount => "mount",
            Self::Refresh => "refresh",
            Self::Sources => "sources changed",
        }
    }
}

/// A started cycle together with its trigger.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CycleTick {
    pub cycle: RenderCycle,
    pub reason: CycleReason,
}

/// Owner of the cycle counter.
///
/// `refresh()` never touches the source map or the entry selection; it only
/// forces a clean re-run of the same inputs.
pub struct RefreshController {
    tx: watch::Sender<CycleTick>,
}

impl Default for RefreshController {
    fn default() -> Self {
        Self::new()
    }
}

impl RefreshController {
    /// Create the controller with the mount cycle already started.
    pub fn new() -> Self {
        let (tx, _) = watch::channel(CycleTick {
            cycle: RenderCycle::FIRST,
            reason: CycleReason::Mount,
        });
        Self { tx }
    }

    pub fn current(&self) -> RenderCycle {
        self.tx.borrow().cycle
    }

    /// Manual refresh: start a new cycle over the same inputs.
    pub fn refresh(&self) -> RenderCycle {
        self.advance(CycleReason::Refresh)
    }

    /// Start a new cycle for `reason`.
    pub fn advance(&self, reason: CycleReason) -> RenderCycle {
        let mut started = RenderCycle::FIRST;
        self.tx.send_modify(|tick| {
            tick.cycle = tick.cycle.next();
            tick.reason = reason;
            started = tick.cycle;
        });
        crate::debug!("cycle"; "started {} ({})", started, reason.label());
        started
    }

    /// Observe started cycles.
    pub fn subscribe(&self) -> watch::Receiver<CycleTick> {
        self.tx.subscribe()
    }
}
