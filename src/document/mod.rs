//! Document synthesis: the self-contained page a boundary executes.
//!
//! The document carries everything one cycle needs: boundary config (cycle,
//! entry path, timings), the guard script (watchdog, idempotent loader
//! finalize, last-resort handler), one `<script>` per runtime library with
//! its failure hook, and the bootstrap with the entry source embedded as a
//! template literal. Synthesis is pure; nothing here executes.

pub mod literal;

use crate::config::PreviewConfig;
use crate::embed::preview::{DOCUMENT_HTML, DocumentVars, PLACEHOLDER_HTML, SOURCE_MARKER};
use crate::preview::{EntrySelection, RenderCycle};
use crate::runtime::{RuntimeLibrary, libraries, library_globals};
use crate::source::SourceMap;
use crate::utils::html::{escape_attr, json_for_script};
use serde::Serialize;
use std::fmt::Write;

pub use literal::LiteralError;

/// A synthesized preview document.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Document {
    /// Nothing eligible to render. Static markup, no scripts.
    Placeholder,
    Preview {
        cycle: RenderCycle,
        entry: String,
        html: String,
    },
}

impl Document {
    pub fn html(&self) -> &str {
        match self {
            Self::Placeholder => PLACEHOLDER_HTML,
            Self::Preview { html, .. } => html,
        }
    }

    pub const fn is_placeholder(&self) -> bool {
        matches!(self, Self::Placeholder)
    }

    pub fn entry(&self) -> Option<&str> {
        match self {
            Self::Placeholder => None,
            Self::Preview { entry, .. } => Some(entry),
        }
    }
}

/// Configuration handed to the boundary as `window.__PREVUE__`.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct BoundaryConfig<'a> {
    cycle: RenderCycle,
    entry: &'a str,
    watchdog_ms: u64,
    settle_ms: u64,
    fade_ms: u64,
    /// Globals excluded from the fallback component scan.
    libraries: Vec<&'static str>,
}

/// Build the document for one cycle.
pub fn synthesize(
    selection: &EntrySelection,
    sources: &SourceMap,
    config: &PreviewConfig,
    cycle: RenderCycle,
) -> Document {
    let Some((entry, source)) = selection
        .path
        .as_deref()
        .and_then(|path| sources.get(path).map(|source| (path, source)))
    else {
        return Document::Placeholder;
    };

    let boundary = BoundaryConfig {
        cycle,
        entry,
        watchdog_ms: config.preview.watchdog_ms,
        settle_ms: config.preview.settle_ms,
        fade_ms: config.preview.fade_ms,
        libraries: library_globals().collect(),
    };
    // Plain strings and integers; serialization cannot fail.
    let config_json = json_for_script(&boundary).unwrap_or_else(|_| "{}".into());

    let html = DOCUMENT_HTML.render(&DocumentVars {
        config_json: &config_json,
        libraries: &library_tags(&libraries(&config.runtime)),
        source,
    });

    Document::Preview {
        cycle,
        entry: entry.to_string(),
        html,
    }
}

/// One `<script>` per library, each with a hook that fails the boundary
/// with `Failed to load <Library>`.
fn library_tags(libraries: &[RuntimeLibrary]) -> String {
    let mut tags = String::new();
    for lib in libraries {
        let _ = writeln!(
            tags,
            r#"  <script crossorigin src="{}" onerror="__prevue.libraryFailed('{}')"></script>"#,
            escape_attr(&lib.url),
            lib.library.name(),
        );
    }
    tags
}

/// Decode the entry source embedded in a synthesized document.
pub fn embedded_source(html: &str) -> Result<String, LiteralError> {
    literal::unescape(literal::extract(html, SOURCE_MARKER)?)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::preview::EntryResolver;

    fn render(files: &[(&str, &str)]) -> Document {
        let sources: SourceMap = files.iter().map(|(p, s)| (*p, *s)).collect();
        let config = PreviewConfig::default();
        let selection = EntryResolver::from_config(&config).resolve(&sources);
        synthesize(&selection, &sources, &config, RenderCycle::new(7))
    }

    #[test]
    fn test_no_eligible_entry_yields_placeholder() {
        let doc = render(&[("README.md", "# hi"), ("styles.css", "body{}")]);
        assert!(doc.is_placeholder());
        assert!(!doc.html().contains("<script"));
        assert!(doc.html().contains("Ready to Build"));
    }

    #[test]
    fn test_scripts_in_order() {
        let doc = render(&[("app/page.tsx", "export default function App() {}")]);
        let html = doc.html();
        let config = html.find("window.__PREVUE__ =").unwrap();
        let react = html.find("libraryFailed('React')").unwrap();
        let react_dom = html.find("libraryFailed('ReactDOM')").unwrap();
        let babel = html.find("libraryFailed('Babel')").unwrap();
        let tailwind = html.find("libraryFailed('Tailwind')").unwrap();
        let source = html.find(SOURCE_MARKER).unwrap();
        assert!(config < react && react < react_dom && react_dom < babel);
        assert!(babel < tailwind && tailwind < source);
    }

    #[test]
    fn test_cycle_and_entry_embedded() {
        let doc = render(&[("app/page.tsx", "export default function App() {}")]);
        assert_eq!(doc.entry(), Some("app/page.tsx"));
        assert!(doc.html().contains(r#""cycle":7"#));
        assert!(doc.html().contains(r#""entry":"app/page.tsx""#));
        assert!(doc.html().contains(r#""libraries":["React","ReactDOM","Babel"]"#));
    }

    #[test]
    fn test_entry_path_cannot_break_out_of_script() {
        let doc = render(&[("</script><b>.tsx", "export default 1")]);
        let html = doc.html();
        let config_line = html.lines().find(|l| l.contains("window.__PREVUE__")).unwrap();
        assert!(!config_line.contains("</script><b>"));
    }

    #[test]
    fn test_source_round_trips_exactly() {
        let tricky = [
            "const x = 1;\nexport default () => `hi ${x}`;",
            "const re = /\\d+`/; // ` and \\` and ${",
            "const s = '</script><!-- -->';\r\nexport default function App() {}",
            "const t = String.raw`\\u{1F600}`;",
            "export default function App() { return <p>$ {`${'a'}`}</p>; }",
        ];
        for source in tricky {
            let doc = render(&[("app/page.tsx", source)]);
            assert_eq!(embedded_source(doc.html()).unwrap(), source);
        }
    }

    #[test]
    fn test_entry_path_naming_a_placeholder_keeps_the_source() {
        let source = "export default function App() { return null; }";
        let doc = render(&[("app/__PREVUE_SOURCE__/page.tsx", source)]);
        let html = doc.html();
        assert!(html.contains(r#""entry":"app/__PREVUE_SOURCE__/page.tsx""#));
        assert!(!html.contains("const SOURCE = `__PREVUE_SOURCE__`"));
        assert_eq!(embedded_source(html).unwrap(), source);
    }

    #[test]
    fn test_source_marker_in_entry_path_is_not_extracted() {
        let source = "export default function App() { return null; }";
        let doc = render(&[("app/const SOURCE = `x`/page.tsx", source)]);
        assert_eq!(embedded_source(doc.html()).unwrap(), source);
    }

    #[test]
    fn test_source_never_closes_its_script() {
        let doc = render(&[("app/page.tsx", "const s = '</script>';")]);
        let html = doc.html();
        let start = html.find(SOURCE_MARKER).unwrap();
        let end = html[start..].find("</script>").unwrap() + start;
        // The first closing tag after the literal is the template's own.
        assert!(html[start..end].contains("const s = '<\\/script>';"));
    }

    #[test]
    fn test_disabled_tailwind_has_no_tag() {
        let sources: SourceMap = [("page.jsx", "export default function Page() {}")]
            .into_iter()
            .collect();
        let mut config = PreviewConfig::default();
        config.runtime.tailwind.clear();
        let selection = EntryResolver::from_config(&config).resolve(&sources);
        let doc = synthesize(&selection, &sources, &config, RenderCycle::FIRST);
        assert!(!doc.html().contains("Tailwind"));
    }

    #[test]
    fn test_library_urls_are_attribute_escaped() {
        let tags = library_tags(&[RuntimeLibrary {
            library: crate::runtime::Library::React,
            url: "https://x.test/a\"b".into(),
        }]);
        assert!(tags.contains("a&quot;b"));
    }
}
