//! Actor Message Definitions

use crate::preview::{CycleReason, RenderCycle};

/// Messages to WebSocket Actor
pub enum WsMsg {
    /// A render cycle started; host pages replace their frame
    Cycle {
        cycle: RenderCycle,
        address: String,
        reason: CycleReason,
    },
    /// Add client
    AddClient(std::net::TcpStream),
    /// Shutdown
    Shutdown,
}
