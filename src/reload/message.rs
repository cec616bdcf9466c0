//! WebSocket message protocol between the server and the host page.
//!
//! - `connected`: sent once after the handshake
//! - `cycle`: a new render cycle started; the host page replaces its frame

use serde::{Deserialize, Serialize};

use crate::preview::{CycleReason, RenderCycle};

/// Message sent over WebSocket
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum PreviewMessage {
    /// Connection established
    Connected {
        /// Server version for compatibility check
        version: String,
    },

    /// A render cycle started
    Cycle {
        cycle: RenderCycle,
        /// Cosmetic address for the host page's address bar
        address: String,
        reason: CycleReason,
    },
}

impl PreviewMessage {
    pub fn connected() -> Self {
        Self::Connected {
            version: env!("CARGO_PKG_VERSION").to_string(),
        }
    }

    pub fn cycle(cycle: RenderCycle, address: impl Into<String>, reason: CycleReason) -> Self {
        Self::Cycle {
            cycle,
            address: address.into(),
            reason,
        }
    }

    /// Serialize to JSON string
    pub fn to_json(&self) -> String {
        serde_json::to_string(self).unwrap_or_else(|_| r#"{"type":"connected"}"#.to_string())
    }

    #[cfg(test)]
    pub fn from_json(s: &str) -> Option<Self> {
        serde_json::from_str(s).ok()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cycle_message() {
        let msg = PreviewMessage::cycle(RenderCycle::new(4), "localhost:3000/", CycleReason::Refresh);
        let json = msg.to_json();
        assert!(json.contains(r#""type":"cycle""#));
        assert!(json.contains(r#""cycle":4"#));
        assert!(json.contains(r#""reason":"refresh""#));
        assert_eq!(PreviewMessage::from_json(&json), Some(msg));
    }

    #[test]
    fn test_connected_message() {
        let json = PreviewMessage::connected().to_json();
        assert!(json.starts_with(r#"{"type":"connected","version":""#));
    }

    #[test]
    fn test_unknown_message_rejected() {
        assert_eq!(PreviewMessage::from_json(r#"{"type":"patch"}"#), None);
    }
}
