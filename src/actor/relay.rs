//! Glue between the preview session, the outcome board and host pages.
//!
//! `forward_cycles` makes every started cycle current on the board before
//! host pages hear about it, so a report for the new cycle is never
//! rejected as stale. `report_outcomes` turns accepted reports into the
//! single-line serve status.

use std::sync::Arc;

use tokio::sync::{mpsc, watch};

use super::messages::WsMsg;
use crate::logger;
use crate::preview::{
    BoardState, CycleTick, ExecutionOutcome, OutcomeBoard, PreviewSession, RenderCycle,
};

/// Forward started cycles to the board and the WebSocket actor.
///
/// `ticks` is subscribed by the caller so no cycle started while the task
/// is being spawned goes unseen. Returns when the controller closes or the
/// actor is gone.
pub async fn forward_cycles(
    mut ticks: watch::Receiver<CycleTick>,
    session: Arc<PreviewSession>,
    board: Arc<OutcomeBoard>,
    ws_tx: mpsc::Sender<WsMsg>,
) {
    while ticks.changed().await.is_ok() {
        let tick = *ticks.borrow_and_update();
        board.begin(tick.cycle);

        let address = session.selection().address;
        crate::debug!("cycle"; "{} started ({}) at {}", tick.cycle, tick.reason.label(), address);

        let msg = WsMsg::Cycle {
            cycle: tick.cycle,
            address,
            reason: tick.reason,
        };
        if ws_tx.send(msg).await.is_err() {
            break;
        }
    }
}

/// Log every accepted outcome as the serve status line.
pub async fn report_outcomes(
    mut states: watch::Receiver<BoardState>,
    session: Arc<PreviewSession>,
) {
    while states.changed().await.is_ok() {
        let state = states.borrow_and_update().clone();
        let Some(outcome) = state.outcome else {
            continue;
        };
        let entry = session.selection().path;
        let (summary, detail) = status_line(state.cycle, &outcome, entry.as_deref());
        match outcome {
            ExecutionOutcome::Success => logger::status_success(&summary),
            ExecutionOutcome::Empty => logger::status_unchanged(&summary),
            _ => logger::status_error(&summary, &detail),
        }
    }
}

/// Summary and detail lines for one outcome.
fn status_line(
    cycle: RenderCycle,
    outcome: &ExecutionOutcome,
    entry: Option<&str>,
) -> (String, String) {
    match outcome {
        ExecutionOutcome::Empty => (
            format!("cycle {cycle}: no entry file, showing placeholder"),
            String::new(),
        ),
        ExecutionOutcome::Success => (
            format!("cycle {cycle}: mounted {}", entry.unwrap_or("entry")),
            String::new(),
        ),
        ExecutionOutcome::CompileError { message } => {
            (format!("cycle {cycle}: {}", outcome.title()), with_entry(entry, message))
        }
        ExecutionOutcome::RuntimeError { message, line } => {
            let detail = match line {
                Some(line) => format!("{} (line {line})", with_entry(entry, message)),
                None => with_entry(entry, message),
            };
            (format!("cycle {cycle}: {}", outcome.title()), detail)
        }
    }
}

fn with_entry(entry: Option<&str>, message: &str) -> String {
    match entry {
        Some(entry) => format!("{entry}: {message}"),
        None => message.to_string(),
    }
}
