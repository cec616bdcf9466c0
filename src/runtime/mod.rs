//! The capabilities a boundary runs on.
//!
//! ```text
//! runtime/
//! ├── library.rs     # React, ReactDOM, Babel, Tailwind and their URLs
//! ├── loader.rs      # ResourceLoader trait, NativeLoader
//! ├── transpile.rs   # Transpiler trait, OxcTranspiler
//! ├── commonjs.rs    # module syntax lowered to require/exports
//! ├── scope.rs       # Runtime and Scope traits
//! ├── engine.rs      # QuickJs runtime
//! └── host.js        # headless page globals and renderer
//! ```
//!
//! The pipeline is generic over all three traits; headless runs plug in the
//! native implementations, tests plug in deterministic ones.

mod commonjs;
mod engine;
mod library;
mod loader;
mod scope;
mod transpile;

#[cfg(test)]
pub mod testing;

pub use engine::QuickJs;
pub use library::{Library, RuntimeLibrary, libraries, library_globals};
pub use loader::{Loaded, NativeLoader, ResourceLoader};
pub use scope::{DEFAULT_EXPORT, Namespace, Runtime, Scope, Value};
pub use transpile::{OxcTranspiler, Transpiler};
