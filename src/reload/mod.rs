//! Cycle notifications for the host page.
//!
//! ```text
//! RefreshController -> forwarder -> WsActor -> host page
//!    (cycle tick)                  (broadcast)  (replace frame)
//! ```
//!
//! - `message` - JSON messages sent over the WebSocket
//! - `server` - WebSocket acceptor handing clients to `WsActor`

pub mod message;
pub mod server;
