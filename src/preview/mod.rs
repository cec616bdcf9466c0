//! Preview state shared by every command.
//!
//! ```text
//! preview/
//! ├── entry.rs     # EntryResolver, EntrySelection
//! ├── cycle.rs     # RenderCycle, RefreshController
//! ├── outcome.rs   # ExecutionOutcome
//! ├── board.rs     # OutcomeBoard: the one visible outcome
//! └── mod.rs       # PreviewSession (this file)
//! ```

mod board;
mod cycle;
mod entry;
mod outcome;

pub use board::{BoardState, OutcomeBoard};
pub use cycle::{CycleReason, CycleTick, RefreshController, RenderCycle};
pub use entry::{EntryResolver, EntrySelection};
pub use outcome::{ExecutionOutcome, LIBRARIES_UNAVAILABLE, NO_COMPONENT};

use crate::config::PreviewConfig;
use crate::document::{Document, synthesize};
use crate::source::{Identity, SourceMap};
use arc_swap::ArcSwap;
use std::sync::Arc;

/// A source map together with its identity.
#[derive(Debug)]
pub struct Snapshot {
    pub sources: SourceMap,
    pub identity: Identity,
}

impl Snapshot {
    pub fn new(sources: SourceMap) -> Self {
        let identity = sources.identity();
        Self { sources, identity }
    }
}

/// The inputs of the current cycle and the controller that advances it.
///
/// Sources are swapped atomically; every change of identity starts exactly
/// one new cycle, a swap with identical content starts none.
pub struct PreviewSession {
    config: PreviewConfig,
    resolver: EntryResolver,
    snapshot: ArcSwap<Snapshot>,
    controller: RefreshController,
}

impl PreviewSession {
    pub fn new(config: PreviewConfig, sources: SourceMap) -> Self {
        Self {
            resolver: EntryResolver::from_config(&config),
            config,
            snapshot: ArcSwap::from_pointee(Snapshot::new(sources)),
            controller: RefreshController::new(),
        }
    }

    pub fn config(&self) -> &PreviewConfig {
        &self.config
    }

    pub fn controller(&self) -> &RefreshController {
        &self.controller
    }

    #[cfg(test)]
    pub fn snapshot(&self) -> Arc<Snapshot> {
        self.snapshot.load_full()
    }

    pub fn current(&self) -> RenderCycle {
        self.controller.current()
    }

    /// Manual refresh over unchanged inputs.
    pub fn refresh(&self) -> RenderCycle {
        self.controller.refresh()
    }

    /// Replace the source map. Returns the started cycle if the content
    /// identity changed.
    pub fn replace_sources(&self, sources: SourceMap) -> Option<RenderCycle> {
        let next = Arc::new(Snapshot::new(sources));
        let identity = next.identity;
        let previous = self.snapshot.swap(next);
        if previous.identity == identity {
            return None;
        }
        crate::debug!("preview"; "sources {} -> {}", previous.identity, identity);
        Some(self.controller.advance(CycleReason::Sources))
    }

    /// Entry selection for the current sources. Recomputed on every call.
    pub fn selection(&self) -> EntrySelection {
        self.resolver.resolve(&self.snapshot.load().sources)
    }

    /// Synthesize the document for `cycle` from the current inputs.
    pub fn document(&self, cycle: RenderCycle) -> Document {
        let snapshot = self.snapshot.load();
        let selection = self.resolver.resolve(&snapshot.sources);
        synthesize(&selection, &snapshot.sources, &self.config, cycle)
    }
}
