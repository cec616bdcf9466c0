//! Deterministic stand-ins for tests.

use super::loader::LoadFailure;
use super::scope::Fault;
use super::transpile::TranspileError;
use super::{
    Library, Loaded, OxcTranspiler, ResourceLoader, Runtime, RuntimeLibrary, Scope, Transpiler,
};
use parking_lot::Mutex;
use rustc_hash::FxHashMap;
use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;

/// Loader whose per-library delay and result are scripted up front.
/// Unscripted libraries load immediately and define their global.
#[derive(Clone, Default)]
pub struct ScriptedLoader {
    script: FxHashMap<Library, (Duration, Result<Loaded, LoadFailure>)>,
    calls: Arc<AtomicUsize>,
}

impl ScriptedLoader {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn delay(mut self, library: Library, ms: u64) -> Self {
        self.entry(library).0 = Duration::from_millis(ms);
        self
    }

    pub fn fail(mut self, library: Library) -> Self {
        self.entry(library).1 = Err(LoadFailure { library });
        self
    }

    pub fn undefined(mut self, library: Library) -> Self {
        self.entry(library).1 = Ok(Loaded::Undefined);
        self
    }

    /// Shared counter of `load` calls.
    pub fn calls(&self) -> Arc<AtomicUsize> {
        Arc::clone(&self.calls)
    }

    fn entry(&mut self, library: Library) -> &mut (Duration, Result<Loaded, LoadFailure>) {
        self.script
            .entry(library)
            .or_insert((Duration::ZERO, Ok(Loaded::Defined)))
    }
}

impl ResourceLoader for ScriptedLoader {
    async fn load(&self, library: &RuntimeLibrary) -> Result<Loaded, LoadFailure> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        let (delay, result) = self
            .script
            .get(&library.library)
            .cloned()
            .unwrap_or((Duration::ZERO, Ok(Loaded::Defined)));
        tokio::time::sleep(delay).await;
        result
    }
}

/// Native transpiler that records every source it is handed.
#[derive(Clone, Default)]
pub struct RecordingTranspiler {
    seen: Arc<Mutex<Vec<String>>>,
}

impl RecordingTranspiler {
    pub fn seen(&self) -> Arc<Mutex<Vec<String>>> {
        Arc::clone(&self.seen)
    }
}

impl Transpiler for RecordingTranspiler {
    fn transpile(&self, path: &str, source: &str) -> Result<String, TranspileError> {
        self.seen.lock().push(source.to_string());
        OxcTranspiler.transpile(path, source)
    }
}

/// Runtime that panics while evaluating, escaping every stage's handling.
#[derive(Clone, Copy, Default)]
pub struct PanickingRuntime;

impl Runtime for PanickingRuntime {
    fn evaluate(
        &self,
        _path: &str,
        _code: &str,
        _visit: &mut dyn FnMut(&mut dyn Scope),
    ) -> Result<(), Fault> {
        panic!("kaboom");
    }
}
