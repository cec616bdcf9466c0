//! Actor Coordinator - wires up the serve-mode actor system
//!
//! Creates the channels, starts the WebSocket acceptor, and runs the
//! watcher, the relay tasks and the WebSocket actor until shutdown.

use std::sync::Arc;
use std::time::Duration;

use anyhow::Result;
use crossbeam::channel::Receiver;
use tokio::sync::mpsc;

use super::fs::FsActor;
use super::messages::WsMsg;
use super::relay::{forward_cycles, report_outcomes};
use super::ws::WsActor;
use crate::preview::{OutcomeBoard, PreviewSession};

const CHANNEL_BUFFER: usize = 32;

/// Coordinator - wires up and runs the actor system.
pub struct Coordinator {
    session: Arc<PreviewSession>,
    board: Arc<OutcomeBoard>,
    watcher: Option<FsActor>,
    shutdown_rx: Option<Receiver<()>>,
}

impl Coordinator {
    pub fn new(session: Arc<PreviewSession>, board: Arc<OutcomeBoard>) -> Self {
        Self {
            session,
            board,
            watcher: None,
            shutdown_rx: None,
        }
    }

    /// Feed the session from a watcher that is already running.
    pub fn with_watcher(mut self, watcher: Option<FsActor>) -> Self {
        self.watcher = watcher;
        self
    }

    /// Set shutdown signal receiver.
    pub fn with_shutdown_signal(mut self, rx: Receiver<()>) -> Self {
        self.shutdown_rx = Some(rx);
        self
    }

    /// Run the actor system.
    pub async fn run(mut self) -> Result<()> {
        let (ws_tx, ws_rx) = mpsc::channel::<WsMsg>(CHANNEL_BUFFER);

        let serve = &self.session.config().serve;
        match crate::reload::server::start_ws_server_with_channel(
            serve.interface,
            serve.ws_port,
            ws_tx.clone(),
        ) {
            Ok(actual_port) => crate::cli::serve::set_actual_ws_port(actual_port),
            Err(e) => crate::log!("actor"; "websocket server failed: {}", e),
        }

        let ticks = self.session.controller().subscribe();
        let states = self.board.subscribe();

        crate::debug!("actor"; "start");
        let ws_handle = tokio::spawn(WsActor::new(ws_rx).run());
        let mut forward_handle = tokio::spawn(forward_cycles(
            ticks,
            Arc::clone(&self.session),
            Arc::clone(&self.board),
            ws_tx.clone(),
        ));
        let report_handle = tokio::spawn(report_outcomes(states, Arc::clone(&self.session)));
        let fs_handle = self
            .watcher
            .take()
            .map(|fs| tokio::spawn(fs.run(Arc::clone(&self.session))));

        match self.shutdown_rx.take() {
            Some(rx) => loop {
                if rx.try_recv().is_ok() || crate::core::is_shutdown() {
                    crate::debug!("actor"; "shutdown signal received");
                    break;
                }
                tokio::time::sleep(Duration::from_millis(100)).await;
            },
            None => {
                let _ = (&mut forward_handle).await;
            }
        }

        if let Some(handle) = fs_handle {
            handle.abort();
        }
        forward_handle.abort();
        report_handle.abort();

        let _ = ws_tx.send(WsMsg::Shutdown).await;
        let _ = tokio::time::timeout(Duration::from_millis(500), ws_handle).await;

        crate::debug!("actor"; "stopped");
        Ok(())
    }
}
