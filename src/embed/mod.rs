//! Embedded static resources.
//!
//! # Module Structure
//!
//! - `template` - Template types for typed variable injection
//! - `preview` - The preview document and its scripts (guard, bootstrap)
//! - `serve` - The serve-mode host shell
//!
//! Scripts and stylesheets are minified by `build.rs` into `OUT_DIR`.
//!
//! # Usage
//!
//! ```ignore
//! use embed::preview::{DOCUMENT_HTML, DocumentVars};
//!
//! let html = DOCUMENT_HTML.render(&DocumentVars {
//!     config_json: &json,
//!     libraries: &tags,
//!     source: "export default function App() { return <h1/>; }",
//! });
//! ```

mod template;

pub use template::{Template, TemplateVars, fill};

pub mod preview {
    use super::{Template, TemplateVars, fill};
    use crate::document::literal;

    /// Watchdog, finalizer and last-resort error handler.
    pub const GUARD_JS: &str = include_str!(concat!(env!("OUT_DIR"), "/guard.min.js"));

    /// Transpile, execute, resolve and mount, run on window `load`.
    pub const BOOTSTRAP_JS: &str = include_str!(concat!(env!("OUT_DIR"), "/bootstrap.min.js"));

    /// Loader, root and error panel styles.
    pub const PREVIEW_CSS: &str = include_str!(concat!(env!("OUT_DIR"), "/preview.min.css"));

    /// Static document shown when no entry is eligible. Carries no scripts.
    pub const PLACEHOLDER_HTML: &str = include_str!("preview/placeholder.html");

    /// Text immediately preceding the source template literal. Anchored to
    /// the opening tag of the bootstrap script; nothing spliced in before it
    /// can contain a raw `<`.
    pub const SOURCE_MARKER: &str = "<script>\nconst SOURCE = ";

    /// Variables for document.html.
    pub struct DocumentVars<'a> {
        /// JSON object assigned to `window.__PREVUE__`, already script-safe.
        pub config_json: &'a str,
        /// Library `<script>` tags.
        pub libraries: &'a str,
        /// Raw entry source; escaped here.
        pub source: &'a str,
    }

    impl TemplateVars for DocumentVars<'_> {
        fn apply(&self, content: &str) -> String {
            let source = literal::escape(self.source);
            fill(
                content,
                &[
                    ("__PREVUE_CONFIG__", self.config_json),
                    ("__PREVUE_GUARD_JS__", GUARD_JS),
                    ("__PREVUE_LIBRARIES__", self.libraries),
                    ("__PREVUE_CSS__", PREVIEW_CSS),
                    ("__PREVUE_BOOTSTRAP_JS__", BOOTSTRAP_JS),
                    ("__PREVUE_SOURCE__", &source),
                ],
            )
        }
    }

    /// Preview document template.
    pub const DOCUMENT_HTML: Template<DocumentVars<'static>> =
        Template::new(include_str!("preview/document.html"));
}

pub mod serve {
    use super::{Template, TemplateVars, fill};

    pub const SHELL_JS: &str = include_str!(concat!(env!("OUT_DIR"), "/shell.min.js"));
    pub const SHELL_CSS: &str = include_str!(concat!(env!("OUT_DIR"), "/shell.min.css"));

    /// Variables for shell.html.
    pub struct ShellVars<'a> {
        /// Address bar text, HTML-escaped by the caller.
        pub address: &'a str,
        /// JSON object `{cycle, wsPort}`, already script-safe.
        pub state_json: &'a str,
    }

    impl TemplateVars for ShellVars<'_> {
        fn apply(&self, content: &str) -> String {
            fill(
                content,
                &[
                    ("__PREVUE_SHELL_CSS__", SHELL_CSS),
                    ("__PREVUE_SHELL_STATE__", self.state_json),
                    ("__PREVUE_SHELL_JS__", SHELL_JS),
                    ("__PREVUE_ADDRESS__", self.address),
                ],
            )
        }
    }

    /// Host page: refresh control, address bar and the frame container.
    pub const SHELL_HTML: Template<ShellVars<'static>> =
        Template::new(include_str!("serve/shell.html"));
}
