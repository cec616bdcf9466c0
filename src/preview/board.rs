//! The single visible outcome.
//!
//! Boundaries (headless tasks, or serve-mode frames reporting over HTTP)
//! publish here, tagged with their cycle. Only the current cycle is
//! accepted and only its first report counts, so a discarded boundary that
//! finishes late can never replace what the user sees.

use super::{ExecutionOutcome, RenderCycle};
use thiserror::Error;
use tokio::sync::watch;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BoardState {
    pub cycle: RenderCycle,
    pub outcome: Option<ExecutionOutcome>,
}

#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum Rejected {
    #[error("outcome for cycle {cycle} is stale (current cycle is {current})")]
    Stale {
        cycle: RenderCycle,
        current: RenderCycle,
    },
    #[error("cycle {0} already reported an outcome")]
    AlreadyReported(RenderCycle),
}

pub struct OutcomeBoard {
    tx: watch::Sender<BoardState>,
}

impl Default for OutcomeBoard {
    fn default() -> Self {
        Self::new()
    }
}

impl OutcomeBoard {
    pub fn new() -> Self {
        let (tx, _) = watch::channel(BoardState {
            cycle: RenderCycle::FIRST,
            outcome: None,
        });
        Self { tx }
    }

    /// Make `cycle` current, clearing the visible outcome. Cycles never go
    /// backwards.
    pub fn begin(&self, cycle: RenderCycle) {
        self.tx.send_if_modified(|state| {
            if cycle <= state.cycle {
                return false;
            }
            state.cycle = cycle;
            state.outcome = None;
            true
        });
    }

    /// Accept `outcome` if it belongs to the current cycle and is its first.
    pub fn publish(&self, cycle: RenderCycle, outcome: ExecutionOutcome) -> Result<(), Rejected> {
        let mut result = Ok(());
        self.tx.send_if_modified(|state| {
            if state.cycle != cycle {
                result = Err(Rejected::Stale {
                    cycle,
                    current: state.cycle,
                });
                return false;
            }
            if state.outcome.is_some() {
                result = Err(Rejected::AlreadyReported(cycle));
                return false;
            }
            state.outcome = Some(outcome.clone());
            true
        });
        result
    }

    pub fn latest(&self) -> BoardState {
        self.tx.borrow().clone()
    }

    pub fn subscribe(&self) -> watch::Receiver<BoardState> {
        self.tx.subscribe()
    }

    /// Wait for the outcome of `cycle`. `None` once a newer cycle began
    /// without it.
    pub async fn wait(&self, cycle: RenderCycle) -> Option<ExecutionOutcome> {
        let mut rx = self.tx.subscribe();
        let state = rx
            .wait_for(|s| s.cycle > cycle || (s.cycle == cycle && s.outcome.is_some()))
            .await
            .ok()?;
        if state.cycle == cycle {
            state.outcome.clone()
        } else {
            None
        }
    }
}
