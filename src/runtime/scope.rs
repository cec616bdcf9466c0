//! Module-scope evaluation.
//!
//! A [`Runtime`] evaluates transpiled code inside one boundary and hands the
//! live global scope to the caller, which resolves a component from what
//! the evaluation left behind and mounts it in that same scope.

use std::collections::BTreeMap;
use thiserror::Error;

/// Name under which the default export is resolved and mounted.
pub const DEFAULT_EXPORT: &str = "default";

/// A fault thrown while evaluating or mounting.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
#[error("{message}")]
pub struct Fault {
    pub message: String,
    pub line: Option<u32>,
}

impl Fault {
    pub fn new(message: impl Into<String>, line: Option<u32>) -> Self {
        Self {
            message: message.into(),
            line,
        }
    }
}

/// Shape of an evaluated value, as far as component resolution cares.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Value {
    Function,
    Other,
}

/// What one evaluation left behind.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Namespace {
    pub default_export: Option<Value>,
    /// Global bindings introduced by the evaluation, in lexical order.
    pub globals: BTreeMap<String, Value>,
}

/// A global scope after evaluation, alive while the visitor runs.
pub trait Scope {
    fn namespace(&self) -> &Namespace;

    /// Instantiate `component` with no props and mount it at `#root`.
    fn mount(&mut self, component: &str) -> Result<(), Fault>;
}

pub trait Runtime: Send + Sync + 'static {
    /// Evaluate transpiled `code` in a fresh global scope, then pass that
    /// scope to `visit`. A fault thrown by the evaluation itself is
    /// returned and `visit` never runs.
    fn evaluate(
        &self,
        path: &str,
        code: &str,
        visit: &mut dyn FnMut(&mut dyn Scope),
    ) -> Result<(), Fault>;
}
