//! Transpile-execute-render pipeline, run once inside each boundary.
//!
//! ```text
//! Loading -> Transpiling -> Executing -> ComponentResolution -> Mounted
//!    \            \              \                \
//!     +------------+--------------+----------------+--> Failed
//! ```
//!
//! The watchdog runs alongside and only ever hides the loader.

mod boundary;
mod resolve;
#[cfg(test)]
mod tests;

pub use boundary::Boundary;
#[cfg(test)]
pub use boundary::Loader;

use resolve::resolve;

use crate::config::PreviewSection;
use crate::preview::{ExecutionOutcome, LIBRARIES_UNAVAILABLE, NO_COMPONENT};
use crate::runtime::{
    Library, Loaded, ResourceLoader, Runtime, RuntimeLibrary, Scope, Transpiler,
};
use crate::{debug, log};
use rustc_hash::FxHashSet;
use std::sync::Arc;
use std::time::Duration;
use tokio::task::JoinSet;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Stage {
    Loading,
    Transpiling,
    Executing,
    ComponentResolution,
    Mounted,
    Failed,
}

/// Boundary timers.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Timing {
    pub watchdog: Duration,
    pub settle: Duration,
}

impl Timing {
    pub const fn from_config(preview: &PreviewSection) -> Self {
        Self {
            watchdog: preview.watchdog(),
            settle: preview.settle(),
        }
    }
}

pub struct Pipeline<T, R, L> {
    transpiler: T,
    runtime: R,
    loader: Arc<L>,
    libraries: Vec<RuntimeLibrary>,
    timing: Timing,
}

impl<T, R, L> Pipeline<T, R, L>
where
    T: Transpiler,
    R: Runtime,
    L: ResourceLoader,
{
    pub fn new(
        transpiler: T,
        runtime: R,
        loader: L,
        libraries: Vec<RuntimeLibrary>,
        timing: Timing,
    ) -> Self {
        Self {
            transpiler,
            runtime,
            loader: Arc::new(loader),
            libraries,
            timing,
        }
    }

    /// Run the entry through every stage, racing the watchdog.
    pub async fn run(&self, boundary: &Boundary, entry: &str, source: &str) {
        let watchdog = async {
            tokio::time::sleep(self.timing.watchdog).await;
            if boundary.finalize(false) {
                log!("preview"; "Preview loader timed out");
            }
            std::future::pending::<()>().await;
        };

        tokio::select! {
            () = self.drive(boundary, entry, source) => {}
            () = watchdog => {}
        }
    }

    async fn drive(&self, boundary: &Boundary, entry: &str, source: &str) {
        boundary.enter(Stage::Loading);
        let defined = self.load_libraries(boundary).await;
        if boundary.is_reported() {
            // A library failure hook already ended this boundary
            return;
        }
        if !Library::REQUIRED.iter().all(|lib| defined.contains(lib)) {
            return boundary.fail(ExecutionOutcome::compile(LIBRARIES_UNAVAILABLE));
        }

        debug!("preview"; "Preview: Starting compilation...");
        boundary.enter(Stage::Transpiling);
        let code = match self.transpiler.transpile(entry, source) {
            Ok(code) => code,
            Err(err) => return boundary.fail(ExecutionOutcome::compile(err.to_string())),
        };

        boundary.enter(Stage::Executing);
        let mut mounted = None;
        let evaluated = self
            .runtime
            .evaluate(entry, &code, &mut |scope: &mut dyn Scope| {
                boundary.enter(Stage::ComponentResolution);
                let Some(component) = resolve(scope.namespace()) else {
                    return boundary.fail(ExecutionOutcome::runtime(NO_COMPONENT, None));
                };
                debug!("preview"; "resolved {} via {:?}", component.name, component.strategy);

                match scope.mount(&component.name) {
                    Ok(()) => mounted = Some(component.name),
                    Err(fault) => {
                        boundary.fail(ExecutionOutcome::runtime(fault.message, fault.line));
                    }
                }
            });
        if let Err(fault) = evaluated {
            return boundary.fail(ExecutionOutcome::runtime(fault.message, fault.line));
        }
        let Some(component) = mounted else {
            return;
        };
        boundary.mounted(&component);

        tokio::time::sleep(self.timing.settle).await;
        boundary.succeed();
    }

    /// Fetch every library concurrently. Each failure fails the boundary as
    /// it happens; the stage only ends once all fetches have settled.
    async fn load_libraries(&self, boundary: &Boundary) -> FxHashSet<Library> {
        let mut pending = JoinSet::new();
        for lib in &self.libraries {
            let loader = Arc::clone(&self.loader);
            let lib = lib.clone();
            pending.spawn(async move {
                let result = loader.load(&lib).await;
                (lib.library, result)
            });
        }

        let mut defined = FxHashSet::default();
        while let Some(joined) = pending.join_next().await {
            match joined {
                Ok((library, Ok(Loaded::Defined))) => {
                    defined.insert(library);
                }
                Ok((library, Ok(Loaded::Undefined))) => {
                    debug!("preview"; "{} loaded without defining {}", library, library.global());
                }
                Ok((_, Err(failure))) => {
                    boundary.fail(ExecutionOutcome::runtime(failure.to_string(), None));
                }
                Err(err) => debug!("preview"; "library fetch aborted: {}", err),
            }
        }
        defined
    }
}
