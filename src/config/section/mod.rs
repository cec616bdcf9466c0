//! Configuration section definitions for `prevue.toml`.
//!
//! | Section      | Purpose                                          |
//! |--------------|--------------------------------------------------|
//! | `[source]`   | Where sources live and which files are entries   |
//! | `[preview]`  | Address label and loader timings                 |
//! | `[runtime]`  | Versioned runtime library URLs                   |
//! | `[serve]`    | Development server (interface, ports, watch)     |

mod preview;
mod runtime;
mod serve;
mod source;

pub use preview::PreviewSection;
pub use runtime::RuntimeConfig;
pub use serve::ServeConfig;
pub use source::SourceConfig;
