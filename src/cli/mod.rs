//! Command-line interface module.

mod args;
pub mod check;
pub mod render;
pub mod serve;

pub use args::{Cli, Commands};

use crate::actor::fs::FsActor;
use crate::config::PreviewConfig;
use anyhow::{Context, Result};

/// Create the source watcher when `watch` is set. Call before scanning.
fn start_watcher(config: &PreviewConfig, watch: bool) -> Result<Option<FsActor>> {
    if !watch {
        return Ok(None);
    }
    FsActor::new(config)
        .map(Some)
        .with_context(|| format!("Failed to watch {}", config.source_dir().display()))
}
