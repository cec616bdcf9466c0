//! Preview server: host page, per-cycle documents and outcome reports.

mod lifecycle;
mod response;
mod routes;


use crate::{
    actor::fs::FsActor,
    config::PreviewConfig,
    debug, log,
    preview::{OutcomeBoard, PreviewSession},
    source::scan_dir,
};
use anyhow::{Context, Result};
use crossbeam::channel;
use std::io::Read;
use std::sync::Arc;
use std::sync::atomic::{AtomicU16, Ordering};
use tiny_http::{Request, Server};

/// WebSocket port actually bound, 0 until the acceptor is up.
static ACTUAL_WS_PORT: AtomicU16 = AtomicU16::new(0);

/// Record the bound WebSocket port (called by the coordinator)
pub fn set_actual_ws_port(port: u16) {
    ACTUAL_WS_PORT.store(port, Ordering::Relaxed);
}

fn get_actual_ws_port() -> Option<u16> {
    match ACTUAL_WS_PORT.load(Ordering::Relaxed) {
        0 => None,
        port => Some(port),
    }
}

/// What every request handler shares.
pub struct ServeState {
    pub session: Arc<PreviewSession>,
    pub board: Arc<OutcomeBoard>,
}

/// Bound server ready to accept requests
pub struct BoundServer {
    server: Arc<Server>,
    state: Arc<ServeState>,
    watcher: Option<FsActor>,
    shutdown_rx: channel::Receiver<()>,
}

/// Scan sources and bind the HTTP server without starting the request loop.
///
/// With watching on, the watcher exists before the scan starts.
pub fn bind_server(config: &PreviewConfig) -> Result<BoundServer> {
    let watcher = super::start_watcher(config, config.serve.watch)?;
    let root = config.source_dir();
    let sources = scan_dir(&root, &config.source)
        .with_context(|| format!("Failed to scan {}", root.display()))?;
    debug!("serve"; "{} source files in {}", sources.len(), root.display());

    let session = Arc::new(PreviewSession::new(config.clone(), sources));
    let state = Arc::new(ServeState {
        session,
        board: Arc::new(OutcomeBoard::new()),
    });

    let (server, addr) = lifecycle::bind_with_retry(config.serve.interface, config.serve.port)?;
    let server = Arc::new(server);

    let (shutdown_tx, shutdown_rx) = channel::unbounded::<()>();
    lifecycle::register_server_for_shutdown(Arc::clone(&server), shutdown_tx);

    log!("serve"; "http://{}", addr);
    match state.session.selection().path {
        Some(entry) => log!("preview"; "entry {}", entry),
        None => log!("preview"; "no entry file yet, showing placeholder"),
    }

    Ok(BoundServer {
        server,
        state,
        watcher,
        shutdown_rx,
    })
}

impl BoundServer {
    /// Start the request loop (blocking).
    pub fn run(self) -> Result<()> {
        let actor_handle = lifecycle::spawn_actors(
            Arc::clone(&self.state.session),
            Arc::clone(&self.state.board),
            self.watcher,
            self.shutdown_rx,
        );
        run_request_loop(&self.server, &self.state)?;
        lifecycle::wait_for_shutdown(actor_handle);
        Ok(())
    }
}

fn run_request_loop(server: &Server, state: &Arc<ServeState>) -> Result<()> {
    let pool = rayon::ThreadPoolBuilder::new()
        .num_threads(4)
        .build()
        .context("failed to create thread pool")?;

    for request in server.incoming_requests() {
        let state = Arc::clone(state);
        pool.spawn(move || {
            if let Err(e) = handle_request(request, &state) {
                log!("serve"; "request error: {e}");
            }
        });
    }
    Ok(())
}

/// Handle a single HTTP request
fn handle_request(mut request: Request, state: &ServeState) -> Result<()> {
    if crate::core::is_shutdown() {
        return response::respond_unavailable(request);
    }

    let mut body = String::new();
    if request.method() == &tiny_http::Method::Post {
        if request.body_length().unwrap_or(0) > routes::MAX_REPORT_BYTES {
            return response::send(request, response::Reply::plain(413, "413 Payload Too Large"));
        }
        request
            .as_reader()
            .take(routes::MAX_REPORT_BYTES as u64)
            .read_to_string(&mut body)
            .context("Failed to read request body")?;
    }

    let content_type = header(&request, "content-type");
    let origin = header(&request, "origin");
    let reply = routes::route(
        state,
        &routes::Incoming {
            method: request.method().clone(),
            url: request.url(),
            content_type: content_type.as_deref(),
            origin: origin.as_deref(),
            body: &body,
        },
    );
    response::send(request, reply)
}

fn header(request: &Request, name: &str) -> Option<String> {
    request
        .headers()
        .iter()
        .find(|h| h.field.as_str().as_str().eq_ignore_ascii_case(name))
        .map(|h| h.value.to_string())
}
