//! Isolated executor: one brand-new boundary per render cycle.
//!
//! Mounting a cycle first discards the previous boundary (its task is
//! aborted, taking pending library fetches and timers with it), then starts
//! the new one. A boundary reports to the [`OutcomeBoard`] tagged with its
//! cycle, so whatever a discarded boundary might still produce is rejected.


use crate::document::{Document, embedded_source};
use crate::pipeline::{Boundary, Pipeline};
use crate::preview::{ExecutionOutcome, OutcomeBoard, PreviewSession, RenderCycle};
use crate::runtime::{ResourceLoader, Runtime, Transpiler};
use crate::debug;
use parking_lot::Mutex;
use std::any::Any;
use std::sync::Arc;
use tokio::task::{JoinHandle, JoinSet};

/// Message shown when a fault escapes the pipeline without one.
const UNCAUGHT: &str = "Uncaught exception";

struct Mounted {
    boundary: Arc<Boundary>,
    task: Option<JoinHandle<()>>,
}

impl Drop for Mounted {
    fn drop(&mut self) {
        if let Some(task) = &self.task {
            task.abort();
        }
    }
}

pub struct IsolatedExecutor<T, R, L> {
    pipeline: Arc<Pipeline<T, R, L>>,
    board: Arc<OutcomeBoard>,
    mounted: Mutex<Option<Mounted>>,
}

impl<T, R, L> IsolatedExecutor<T, R, L>
where
    T: Transpiler,
    R: Runtime,
    L: ResourceLoader,
{
    pub fn new(pipeline: Pipeline<T, R, L>, board: Arc<OutcomeBoard>) -> Self {
        Self {
            pipeline: Arc::new(pipeline),
            board,
            mounted: Mutex::new(None),
        }
    }

    pub fn board(&self) -> &Arc<OutcomeBoard> {
        &self.board
    }

    /// The boundary of the latest mounted cycle.
    #[cfg(test)]
    pub fn boundary(&self) -> Option<Arc<Boundary>> {
        self.mounted
            .lock()
            .as_ref()
            .map(|mounted| Arc::clone(&mounted.boundary))
    }

    /// Replace the current boundary with a fresh one running `document`.
    ///
    /// Must be called inside a tokio runtime.
    pub fn mount(&self, cycle: RenderCycle, document: &Document) -> Arc<Boundary> {
        let mut mounted = self.mounted.lock();
        if let Some(previous) = mounted.take() {
            debug!("cycle"; "discarding boundary {}", previous.boundary.cycle());
            drop(previous);
        }

        self.board.begin(cycle);
        let boundary = Arc::new(Boundary::new(cycle, Arc::clone(&self.board)));

        let task = match document {
            Document::Placeholder => {
                boundary.empty();
                None
            }
            Document::Preview { entry, html, .. } => match embedded_source(html) {
                Ok(source) => Some(tokio::spawn(contain(
                    Arc::clone(&self.pipeline),
                    Arc::clone(&boundary),
                    entry.clone(),
                    source,
                ))),
                Err(err) => {
                    boundary.fail(ExecutionOutcome::runtime(err.to_string(), None));
                    None
                }
            },
        };

        *mounted = Some(Mounted {
            boundary: Arc::clone(&boundary),
            task,
        });
        boundary
    }

    /// Mount every cycle the session starts. Runs until the controller
    /// closes.
    pub async fn follow(self: Arc<Self>, session: Arc<PreviewSession>) {
        let mut ticks = session.controller().subscribe();
        loop {
            let cycle = ticks.borrow_and_update().cycle;
            self.mount(cycle, &session.document(cycle));
            if ticks.changed().await.is_err() {
                break;
            }
        }
    }
}

/// Boundary task with a last-resort handler: a panic anywhere in the
/// pipeline becomes a runtime error for this boundary only.
async fn contain<T, R, L>(
    pipeline: Arc<Pipeline<T, R, L>>,
    boundary: Arc<Boundary>,
    entry: String,
    source: String,
) where
    T: Transpiler,
    R: Runtime,
    L: ResourceLoader,
{
    // Owned by this task: aborting the task drops the set, which aborts
    // the pipeline with it.
    let mut inner = JoinSet::new();
    let running = Arc::clone(&boundary);
    inner.spawn(async move { pipeline.run(&running, &entry, &source).await });

    if let Some(Err(err)) = inner.join_next().await
        && err.is_panic()
    {
        let message = panic_message(err.into_panic());
        boundary.fail(ExecutionOutcome::runtime(message, None));
    }
}

fn panic_message(payload: Box<dyn Any + Send>) -> String {
    if let Some(message) = payload.downcast_ref::<&str>() {
        (*message).to_string()
    } else if let Some(message) = payload.downcast_ref::<String>() {
        message.clone()
    } else {
        UNCAUGHT.to_string()
    }
}
