//! Entry resolution: which file in the source map gets rendered.
//!
//! Selection policy, in order:
//! 1. the first eligible file whose stem is the page marker (`page.tsx`)
//! 2. the first eligible file in source map order
//! 3. nothing (the preview shows its placeholder)
//!
//! The display address is derived from the chosen path for the address bar
//! only and never influences execution.

use crate::config::PreviewConfig;
use crate::source::SourceMap;

/// Routing root stripped from page paths (`app/about/page.tsx` -> `/about`).
const ROUTING_ROOT: &str = "app";

/// Root route used when nothing remains after stripping.
const ROOT_ROUTE: &str = "/";

/// The entry chosen for one render cycle.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EntrySelection {
    /// Chosen file path, `None` when no file is eligible.
    pub path: Option<String>,
    /// Cosmetic address shown to the user.
    pub address: String,
}

/// Picks the renderable entry from a source map.
#[derive(Debug, Clone)]
pub struct EntryResolver {
    extensions: Vec<String>,
    page_marker: String,
    host_label: String,
}

impl Default for EntryResolver {
    fn default() -> Self {
        Self::from_config(&PreviewConfig::default())
    }
}

impl EntryResolver {
    pub fn from_config(config: &PreviewConfig) -> Self {
        Self {
            extensions: config.source.extensions.clone(),
            page_marker: config.source.page_marker.clone(),
            host_label: config.preview.host_label.clone(),
        }
    }

    /// Resolve the entry of `sources`. Pure.
    pub fn resolve(&self, sources: &SourceMap) -> EntrySelection {
        let mut eligible = sources.paths().filter(|p| self.is_eligible(p)).peekable();
        let first = eligible.peek().copied();
        let path = eligible
            .find(|p| self.is_page(p))
            .or(first)
            .map(str::to_string);

        let route = path
            .as_deref()
            .map(|p| self.route_for(p))
            .unwrap_or_else(|| ROOT_ROUTE.to_string());

        EntrySelection {
            address: format!("{}{}", self.host_label, route),
            path,
        }
    }

    fn is_eligible(&self, path: &str) -> bool {
        split_file_name(path)
            .1
            .rsplit_once('.')
            .is_some_and(|(_, ext)| self.extensions.iter().any(|e| e == ext))
    }

    fn is_page(&self, path: &str) -> bool {
        let (_, name) = split_file_name(path);
        name.rsplit_once('.')
            .is_some_and(|(stem, _)| stem == self.page_marker)
    }

    /// Route shown for `path`: page files collapse to their directory.
    fn route_for(&self, path: &str) -> String {
        let trimmed = if self.is_page(path) {
            split_file_name(path).0
        } else {
            path
        };

        let mut segments: Vec<&str> = trimmed.split('/').filter(|s| !s.is_empty()).collect();
        if segments.first() == Some(&ROUTING_ROOT) && self.is_page(path) {
            segments.remove(0);
        }

        if segments.is_empty() {
            ROOT_ROUTE.to_string()
        } else {
            format!("/{}", segments.join("/"))
        }
    }
}

/// Split `a/b/c.tsx` into (`a/b`, `c.tsx`).
fn split_file_name(path: &str) -> (&str, &str) {
    path.rsplit_once('/').unwrap_or(("", path))
}
