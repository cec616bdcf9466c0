//! `[source]` section configuration.
//!
//! # Example
//!
//! ```toml
//! [source]
//! dir = "."                      # project directory scanned for sources
//! extensions = ["tsx", "jsx"]    # files eligible as preview entry
//! page_marker = "page"           # preferred entry file stem
//! scan = ["tsx", "jsx", "ts", "js", "css", "json"]
//! ignore = ["node_modules", ".git", "target"]
//! ```

use std::path::PathBuf;

use serde::{Deserialize, Serialize};

use super::super::error::ConfigDiagnostics;

/// Source discovery and entry eligibility settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct SourceConfig {
    /// Project directory, relative to the config file.
    pub dir: PathBuf,

    /// Extensions of files that can be rendered as the preview entry.
    pub extensions: Vec<String>,

    /// File stem that marks the conventional page entry.
    pub page_marker: String,

    /// Extensions loaded into the source map when scanning `dir`.
    pub scan: Vec<String>,

    /// Directory names skipped while scanning.
    pub ignore: Vec<String>,
}

impl Default for SourceConfig {
    fn default() -> Self {
        Self {
            dir: PathBuf::from("."),
            extensions: vec!["tsx".into(), "jsx".into()],
            page_marker: "page".into(),
            scan: ["tsx", "jsx", "ts", "js", "css", "json"]
                .into_iter()
                .map(String::from)
                .collect(),
            ignore: ["node_modules", ".git", "target"]
                .into_iter()
                .map(String::from)
                .collect(),
        }
    }
}

impl SourceConfig {
    pub fn validate(&self, diag: &mut ConfigDiagnostics) {
        if self.extensions.is_empty() {
            diag.error_with_hint(
                "source.extensions",
                "no entry extensions configured",
                "use extensions = [\"tsx\", \"jsx\"]",
            );
        }
        if self.page_marker.trim().is_empty() {
            diag.error("source.page_marker", "page marker must not be empty");
        }
        for ext in &self.extensions {
            if ext.starts_with('.') {
                diag.error_with_hint(
                    "source.extensions",
                    format!("extension `{ext}` has a leading dot"),
                    format!("use \"{}\"", ext.trim_start_matches('.')),
                );
            }
        }
    }
}
