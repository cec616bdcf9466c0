//! Resource loading for runtime libraries.
//!
//! Loading is an injected capability: the pipeline only sees the
//! [`ResourceLoader`] trait, so tests substitute deterministic loaders for
//! network fetches.

use super::library::RuntimeLibrary;
use super::Library;
use std::future::Future;
use thiserror::Error;

/// A library that could not be fetched.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
#[error("Failed to load {library}")]
pub struct LoadFailure {
    pub library: Library,
}

/// Result of a fetch that did not fail.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Loaded {
    /// The library ran and installed its global.
    Defined,
    /// The fetch succeeded but the global never appeared.
    Undefined,
}

pub trait ResourceLoader: Send + Sync + 'static {
    fn load(
        &self,
        library: &RuntimeLibrary,
    ) -> impl Future<Output = Result<Loaded, LoadFailure>> + Send;
}

/// Loader for headless runs.
///
/// The transpiler and evaluator are native, so nothing is fetched. A library
/// whose URL is not an http(s) reference fails the way an unreachable script
/// would. The headless page provides the renderer globals but no stylesheet
/// utility, so Tailwind loads without defining its global.
#[derive(Debug, Clone, Copy, Default)]
pub struct NativeLoader;

impl ResourceLoader for NativeLoader {
    async fn load(&self, library: &RuntimeLibrary) -> Result<Loaded, LoadFailure> {
        let url = library.url.as_str();
        if !(url.starts_with("https://") || url.starts_with("http://")) {
            return Err(LoadFailure {
                library: library.library,
            });
        }
        Ok(match library.library {
            Library::Tailwind => Loaded::Undefined,
            Library::React | Library::ReactDom | Library::Babel => Loaded::Defined,
        })
    }
}
