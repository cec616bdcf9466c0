//! `prevue render`: print the synthesized document for the current sources.

use std::fs;
use std::path::Path;

use anyhow::{Context, Result, ensure};

use crate::config::PreviewConfig;
use crate::preview::{PreviewSession, RenderCycle};
use crate::source::scan_dir;

/// Synthesize the document for `cycle` and write it to `output` or stdout.
pub fn render_document(config: &PreviewConfig, output: Option<&Path>, cycle: u64) -> Result<()> {
    ensure!(cycle >= 1, "render cycle must be at least 1, got {cycle}");

    let sources = scan_dir(&config.source_dir(), &config.source)?;
    let session = PreviewSession::new(config.clone(), sources);
    let document = session.document(RenderCycle::new(cycle));

    match output {
        Some(path) => {
            if let Some(parent) = path.parent()
                && !parent.as_os_str().is_empty()
            {
                fs::create_dir_all(parent)
                    .with_context(|| format!("Failed to create {}", parent.display()))?;
            }
            fs::write(path, document.html())
                .with_context(|| format!("Failed to write {}", path.display()))?;
            match document.entry() {
                Some(entry) => crate::log!("render"; "{} -> {}", entry, path.display()),
                None => crate::log!("render"; "no entry file, placeholder -> {}", path.display()),
            }
        }
        // stdout carries the document only
        None => print!("{}", document.html()),
    }
    Ok(())
}
