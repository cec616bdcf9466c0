//! Server lifecycle management.

use crate::{
    actor::{Coordinator, fs::FsActor},
    core::register_server,
    log,
    preview::{OutcomeBoard, PreviewSession},
};
use anyhow::Result;
use crossbeam::channel::{Receiver, Sender};
use std::{
    net::SocketAddr,
    sync::Arc,
    thread::{self, JoinHandle},
};
use tiny_http::Server;

/// Maximum number of port binding attempts.
const MAX_PORT_RETRIES: u16 = 10;

/// Bind to the specified interface and port, with automatic port retry.
pub fn bind_with_retry(
    interface: std::net::IpAddr,
    base_port: u16,
) -> Result<(Server, SocketAddr)> {
    for offset in 0..MAX_PORT_RETRIES {
        let port = base_port.saturating_add(offset);
        let addr = SocketAddr::new(interface, port);

        match Server::http(addr) {
            Ok(server) => {
                if offset > 0 {
                    log!("serve"; "port {} in use, using {} instead", base_port, port);
                }
                return Ok((server, addr));
            }
            Err(_) if offset + 1 < MAX_PORT_RETRIES => continue,
            Err(e) => {
                return Err(anyhow::anyhow!(
                    "Failed to bind after {} attempts (ports {}-{}): {}",
                    MAX_PORT_RETRIES,
                    base_port,
                    port,
                    e
                ));
            }
        }
    }
    unreachable!()
}

/// Register server for graceful shutdown.
///
/// Ctrl+C unblocks the server and notifies the actors.
pub fn register_server_for_shutdown(server: Arc<Server>, shutdown_tx: Sender<()>) {
    register_server(server, shutdown_tx);
}

/// Spawn the actor system on its own runtime thread.
///
/// Always runs: host pages learn about new cycles over the WebSocket even
/// when there is no watcher.
pub fn spawn_actors(
    session: Arc<PreviewSession>,
    board: Arc<OutcomeBoard>,
    watcher: Option<FsActor>,
    shutdown_rx: Receiver<()>,
) -> JoinHandle<()> {
    thread::spawn(move || {
        run_actor_system(session, board, watcher, shutdown_rx);
    })
}

fn run_actor_system(
    session: Arc<PreviewSession>,
    board: Arc<OutcomeBoard>,
    watcher: Option<FsActor>,
    shutdown_rx: Receiver<()>,
) {
    let rt = match tokio::runtime::Builder::new_multi_thread()
        .worker_threads(2)
        .enable_all()
        .build()
    {
        Ok(rt) => rt,
        Err(e) => {
            log!("actor"; "failed to create tokio runtime: {}", e);
            return;
        }
    };

    rt.block_on(async {
        let coordinator = Coordinator::new(session, board)
            .with_watcher(watcher)
            .with_shutdown_signal(shutdown_rx);
        if let Err(e) = coordinator.run().await {
            log!("actor"; "error: {}", e);
        }
    });
}

/// Wait for actor system to shutdown gracefully (max 2 seconds).
pub fn wait_for_shutdown(handle: JoinHandle<()>) {
    for _ in 0..40 {
        if handle.is_finished() {
            let _ = handle.join();
            return;
        }
        thread::sleep(std::time::Duration::from_millis(50));
    }
}
