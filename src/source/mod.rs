//! The source map: project file paths mapped to their source text.
//!
//! The map is owned by the project store (here: the scanned directory) and
//! is read-only to the preview core. Iteration follows insertion order, and
//! a map loaded from disk is inserted in lexical path order, so "first
//! eligible file" is deterministic.
//!
//! Each map has an [`Identity`] (blake3 over paths and contents). A new
//! identity is what starts a new render cycle in watch mode.

mod scan;

pub use scan::scan_dir;

use rustc_hash::FxHashMap;

/// Ordered mapping of file path to source text.
#[derive(Debug, Clone, Default)]
pub struct SourceMap {
    files: Vec<(String, String)>,
    index: FxHashMap<String, usize>,
}

impl SourceMap {
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert or replace a file. Replacing keeps the original position.
    pub fn insert(&mut self, path: impl Into<String>, source: impl Into<String>) {
        let path = path.into();
        let source = source.into();
        match self.index.get(&path) {
            Some(&i) => self.files[i].1 = source,
            None => {
                self.index.insert(path.clone(), self.files.len());
                self.files.push((path, source));
            }
        }
    }

    pub fn get(&self, path: &str) -> Option<&str> {
        self.index.get(path).map(|&i| self.files[i].1.as_str())
    }

    /// File paths in insertion order.
    pub fn paths(&self) -> impl Iterator<Item = &str> {
        self.files.iter().map(|(p, _)| p.as_str())
    }

    pub fn len(&self) -> usize {
        self.files.len()
    }

    pub fn is_empty(&self) -> bool {
        self.files.is_empty()
    }

    /// Content identity of the whole map (order-sensitive).
    pub fn identity(&self) -> Identity {
        let mut hasher = blake3::Hasher::new();
        for (path, source) in &self.files {
            hasher.update(&(path.len() as u64).to_le_bytes());
            hasher.update(path.as_bytes());
            hasher.update(&(source.len() as u64).to_le_bytes());
            hasher.update(source.as_bytes());
        }
        Identity(*hasher.finalize().as_bytes())
    }
}

impl<K: Into<String>, V: Into<String>> FromIterator<(K, V)> for SourceMap {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        let mut map = Self::new();
        for (path, source) in iter {
            map.insert(path, source);
        }
        map
    }
}

/// A 256-bit content hash identifying one source map state.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Identity([u8; 32]);

impl Identity {
    pub fn to_hex(self) -> String {
        hex::encode(self.0)
    }
}

impl std::fmt::Display for Identity {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        // First 16 hex chars are enough for log lines
        write!(f, "{}", &self.to_hex()[..16])
    }
}
