//! The external libraries every preview document loads.

use crate::config::RuntimeConfig;
use std::fmt;

/// A runtime library referenced by the preview document.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Library {
    /// Component renderer.
    React,
    /// DOM mount companion of the renderer.
    ReactDom,
    /// Source transpiler (TypeScript + JSX).
    Babel,
    /// Optional stylesheet utility.
    Tailwind,
}

impl Library {
    /// Globals a boundary needs before it can transpile and mount.
    pub const REQUIRED: [Self; 3] = [Self::React, Self::ReactDom, Self::Babel];

    /// Name used in failure messages (`Failed to load ReactDOM`).
    pub const fn name(self) -> &'static str {
        match self {
            Self::React => "React",
            Self::ReactDom => "ReactDOM",
            Self::Babel => "Babel",
            Self::Tailwind => "Tailwind",
        }
    }

    /// Global binding the library installs.
    pub const fn global(self) -> &'static str {
        match self {
            Self::React => "React",
            Self::ReactDom => "ReactDOM",
            Self::Babel => "Babel",
            Self::Tailwind => "tailwind",
        }
    }

    pub const fn is_required(self) -> bool {
        !matches!(self, Self::Tailwind)
    }
}

impl fmt::Display for Library {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// A library together with the URL it is fetched from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RuntimeLibrary {
    pub library: Library,
    pub url: String,
}

/// Libraries in document order. An empty `tailwind` URL leaves it out.
pub fn libraries(config: &RuntimeConfig) -> Vec<RuntimeLibrary> {
    let all = [
        (Library::React, &config.react),
        (Library::ReactDom, &config.react_dom),
        (Library::Babel, &config.babel),
        (Library::Tailwind, &config.tailwind),
    ];
    all.into_iter()
        .filter(|(library, url)| library.is_required() || !url.trim().is_empty())
        .map(|(library, url)| RuntimeLibrary {
            library,
            url: url.trim().to_string(),
        })
        .collect()
}

/// Globals excluded from the fallback component scan.
pub fn library_globals() -> impl Iterator<Item = &'static str> {
    Library::REQUIRED.into_iter().map(Library::global)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_libraries_in_document_order() {
        let libs = libraries(&RuntimeConfig::default());
        let names: Vec<_> = libs.iter().map(|l| l.library.name()).collect();
        assert_eq!(names, ["React", "ReactDOM", "Babel", "Tailwind"]);
    }

    #[test]
    fn test_empty_tailwind_is_omitted() {
        let config = RuntimeConfig {
            tailwind: String::new(),
            ..RuntimeConfig::default()
        };
        let libs = libraries(&config);
        assert_eq!(libs.len(), 3);
        assert!(libs.iter().all(|l| l.library.is_required()));
    }

    #[test]
    fn test_scan_exclusions() {
        let globals: Vec<_> = library_globals().collect();
        assert_eq!(globals, ["React", "ReactDOM", "Babel"]);
    }
}
