//! `[runtime]` section configuration.
//!
//! Fixed, versioned references to the libraries every preview document
//! loads. An empty `tailwind` disables the stylesheet utility.
//!
//! ```toml
//! [runtime]
//! react = "https://unpkg.com/react@18/umd/react.development.js"
//! react_dom = "https://unpkg.com/react-dom@18/umd/react-dom.development.js"
//! babel = "https://unpkg.com/@babel/standalone@7/babel.min.js"
//! tailwind = "https://cdn.tailwindcss.com"
//! ```

use serde::{Deserialize, Serialize};

use super::super::error::ConfigDiagnostics;

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct RuntimeConfig {
    pub react: String,
    pub react_dom: String,
    pub babel: String,
    pub tailwind: String,
}

impl Default for RuntimeConfig {
    fn default() -> Self {
        Self {
            react: "https://unpkg.com/react@18/umd/react.development.js".into(),
            react_dom: "https://unpkg.com/react-dom@18/umd/react-dom.development.js".into(),
            babel: "https://unpkg.com/@babel/standalone@7/babel.min.js".into(),
            tailwind: "https://cdn.tailwindcss.com".into(),
        }
    }
}

impl RuntimeConfig {
    pub fn validate(&self, diag: &mut ConfigDiagnostics) {
        for (field, url) in [
            ("runtime.react", &self.react),
            ("runtime.react_dom", &self.react_dom),
            ("runtime.babel", &self.babel),
        ] {
            if url.trim().is_empty() {
                diag.error(field, "required runtime library has no URL");
            }
        }
    }
}
