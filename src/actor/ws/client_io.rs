use std::net::TcpStream;

use tungstenite::protocol::Message;

use crate::reload::message::PreviewMessage;

use super::{Clients, WsActor};

impl WsActor {
    /// Handshake a new connection and register it.
    pub(super) fn add_client(&self, stream: TcpStream) {
        match tungstenite::accept(stream) {
            Ok(mut ws) => {
                let connected = PreviewMessage::connected();
                if let Err(e) = ws.send(Message::Text(connected.to_json().into())) {
                    crate::log!("ws"; "failed to send connected message: {}", e);
                    return;
                }

                if let Some(ref cycle) = *self.last_cycle.lock()
                    && let Err(e) = ws.send(Message::Text(cycle.to_json().into()))
                {
                    crate::debug!("ws"; "failed to replay cycle: {}", e);
                    return;
                }

                // Polling reads from here on
                let _ = ws.get_ref().set_nonblocking(true);

                let mut clients = self.clients.lock();
                crate::debug!("ws"; "client connected (total: {})", clients.len() + 1);
                clients.push(ws);
            }
            Err(e) => {
                crate::log!("ws"; "handshake failed: {}", e);
            }
        }
    }

    /// Background thread that drains client frames and drops closed clients.
    ///
    /// The host page never sends anything meaningful; reading is only how a
    /// close is noticed between broadcasts.
    pub(super) fn client_reader_loop(clients: Clients) {
        while !crate::core::is_shutdown() {
            std::thread::sleep(std::time::Duration::from_millis(100));

            let mut clients = clients.lock();
            clients.retain_mut(|ws| match ws.read() {
                Ok(Message::Close(_)) => false,
                Ok(_) => true,
                Err(tungstenite::Error::Io(ref e)) if e.kind() == std::io::ErrorKind::WouldBlock => {
                    true
                }
                Err(_) => false,
            });
        }
    }
}
