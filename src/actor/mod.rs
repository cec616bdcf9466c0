//! Actor system for serve mode
//!
//! ```text
//! FsActor --replace_sources--> PreviewSession --tick--> relay --Cycle--> WsActor
//!  (watch)                        (cycles)            (board)        (broadcast)
//! ```
//!
//! - `messages` - message types for the WebSocket actor
//! - `fs` - source watcher with debouncing
//! - `relay` - forwards started cycles and logs reported outcomes
//! - `ws` - WebSocket broadcast
//! - `coordinator` - wires up and runs actors

pub mod coordinator;
pub mod fs;
pub mod messages;
pub mod relay;
pub mod ws;

pub use coordinator::Coordinator;
