//! WebSocket Actor - cycle notifications to host pages
//!
//! ```text
//! forwarder --[Cycle]--> WsActor --[broadcast]--> host pages
//! ```
//!
//! The last cycle message is replayed to every new client so a host page
//! that connects after a cycle started still catches up.

mod client_io;

use std::net::TcpStream;
use std::sync::Arc;

use parking_lot::Mutex;
use tokio::sync::mpsc;
use tungstenite::WebSocket;
use tungstenite::protocol::Message;

use super::messages::WsMsg;
use crate::reload::message::PreviewMessage;

type Clients = Arc<Mutex<Vec<WebSocket<TcpStream>>>>;

/// WebSocket Actor - manages client connections and broadcasts
pub struct WsActor {
    rx: mpsc::Receiver<WsMsg>,
    /// Connected clients (shared for broadcast + read thread)
    clients: Clients,
    /// Latest cycle message, replayed to new clients
    last_cycle: Arc<Mutex<Option<PreviewMessage>>>,
}

impl WsActor {
    pub fn new(rx: mpsc::Receiver<WsMsg>) -> Self {
        Self {
            rx,
            clients: Arc::new(Mutex::new(Vec::new())),
            last_cycle: Arc::new(Mutex::new(None)),
        }
    }

    /// Run the actor event loop
    pub async fn run(mut self) {
        let clients_for_reader = Arc::clone(&self.clients);
        std::thread::spawn(move || {
            Self::client_reader_loop(clients_for_reader);
        });

        while let Some(msg) = self.rx.recv().await {
            match msg {
                WsMsg::Cycle {
                    cycle,
                    address,
                    reason,
                } => {
                    crate::debug!("ws"; "cycle {} ({})", cycle, reason.label());
                    let message = PreviewMessage::cycle(cycle, address, reason);
                    let text = message.to_json();
                    *self.last_cycle.lock() = Some(message);
                    self.broadcast(Message::Text(text.into()));
                }

                WsMsg::AddClient(stream) => {
                    self.add_client(stream);
                }

                WsMsg::Shutdown => {
                    crate::debug!("ws"; "shutting down");
                    let mut clients = self.clients.lock();
                    for mut ws in clients.drain(..) {
                        let _ = ws.close(None);
                    }
                    break;
                }
            }
        }
    }

    /// Send `msg` to every client, dropping those whose socket fails.
    fn broadcast(&self, msg: Message) {
        let mut clients = self.clients.lock();
        let before = clients.len();
        clients.retain_mut(|ws| {
            ws.send(msg.clone())
                .inspect_err(|e| crate::debug!("ws"; "dropping client: {}", e))
                .is_ok()
        });
        crate::debug!("ws"; "sent to {} of {} clients", clients.len(), before);
    }

    #[cfg(test)]
    fn client_count(&self) -> usize {
        self.clients.lock().len()
    }
}

#[cfg(test)]
mod tests {
    use std::net::{Ipv4Addr, TcpListener};

    use super::*;
    use crate::preview::{CycleReason, RenderCycle};

    #[test]
    fn test_new_client_receives_connected_then_last_cycle() {
        let listener = TcpListener::bind((Ipv4Addr::LOCALHOST, 0)).unwrap();
        let addr = listener.local_addr().unwrap();

        let client = std::thread::spawn(move || {
            let (mut ws, _) = tungstenite::connect(format!("ws://{addr}")).unwrap();
            let first = ws.read().unwrap().to_text().unwrap().to_owned();
            let second = ws.read().unwrap().to_text().unwrap().to_owned();
            (first, second)
        });

        let (_tx, rx) = mpsc::channel(4);
        let actor = WsActor::new(rx);
        *actor.last_cycle.lock() = Some(PreviewMessage::cycle(
            RenderCycle::new(3),
            "localhost:3000/",
            CycleReason::Sources,
        ));

        let (stream, _) = listener.accept().unwrap();
        actor.add_client(stream);
        assert_eq!(actor.client_count(), 1);

        let (first, second) = client.join().unwrap();
        assert!(first.contains(r#""type":"connected""#));
        assert!(second.contains(r#""cycle":3"#));
    }

    #[test]
    fn test_broadcast_without_clients() {
        let (_tx, rx) = mpsc::channel(1);
        let actor = WsActor::new(rx);
        actor.broadcast(Message::Text("{}".into()));
        assert_eq!(actor.client_count(), 0);
    }
}
