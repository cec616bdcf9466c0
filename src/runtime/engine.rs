//! Headless runtime backed by an embedded QuickJS engine.
//!
//! Every evaluation gets its own engine instance and global object, with a
//! memory cap and an interrupt deadline. The page globals come from
//! `host.js`: `window`, `document`, `require` for the importable modules,
//! and a component library whose renderer calls components synchronously.
//! Nothing reaches the filesystem or the network.

use super::scope::{DEFAULT_EXPORT, Fault, Namespace, Runtime, Scope, Value};
use crate::debug;
use rquickjs::context::EvalOptions;
use rquickjs::{CatchResultExt, CaughtError, Context, Ctx, Function, Object};
use rustc_hash::FxHashSet;
use std::collections::BTreeMap;
use std::time::{Duration, Instant};

const HOST_JS: &str = include_str!("host.js");

const GLOBAL_NAMES: &str = "Object.getOwnPropertyNames(globalThis)";

const MEMORY_LIMIT: usize = 64 * 1024 * 1024;
const STACK_LIMIT: usize = 1024 * 1024;

/// Default time an evaluation and its mount may run.
const DEFAULT_BUDGET: Duration = Duration::from_secs(5);

/// Message of a thrown value that is neither an error nor a string.
const UNCAUGHT: &str = "Uncaught exception";

#[derive(Debug, Clone, Copy)]
pub struct QuickJs {
    budget: Duration,
}

impl QuickJs {
    pub const fn new(budget: Duration) -> Self {
        Self { budget }
    }
}

impl Default for QuickJs {
    fn default() -> Self {
        Self::new(DEFAULT_BUDGET)
    }
}

impl Runtime for QuickJs {
    fn evaluate(
        &self,
        path: &str,
        code: &str,
        visit: &mut dyn FnMut(&mut dyn Scope),
    ) -> Result<(), Fault> {
        let engine = rquickjs::Runtime::new().map_err(engine_fault)?;
        engine.set_memory_limit(MEMORY_LIMIT);
        engine.set_max_stack_size(STACK_LIMIT);
        let deadline = Instant::now() + self.budget;
        engine.set_interrupt_handler(Some(Box::new(move || Instant::now() >= deadline)));
        let context = Context::full(&engine).map_err(engine_fault)?;

        context.with(|ctx| {
            let mount: Function = ctx.eval(HOST_JS).catch(&ctx).map_err(fault)?;
            let before: Vec<String> = ctx.eval(GLOBAL_NAMES).catch(&ctx).map_err(fault)?;

            // Browser scripts run sloppy
            let mut options = EvalOptions::default();
            options.strict = false;
            ctx.eval_with_options::<rquickjs::Value, _>(code, options)
                .catch(&ctx)
                .map_err(fault)?;
            debug!("preview"; "evaluated {}", path);

            let mut scope = EngineScope::capture(ctx.clone(), mount, &before)
                .catch(&ctx)
                .map_err(fault)?;
            visit(&mut scope);
            Ok(())
        })
    }
}

struct EngineScope<'js> {
    ctx: Ctx<'js>,
    exports: Option<Object<'js>>,
    mount: Function<'js>,
    namespace: Namespace,
}

impl<'js> EngineScope<'js> {
    /// Read the default export and the globals introduced since `before`.
    fn capture(
        ctx: Ctx<'js>,
        mount: Function<'js>,
        before: &[String],
    ) -> rquickjs::Result<Self> {
        let globals = ctx.globals();
        let module: Option<Object> = globals.get("module")?;
        let exports: Option<Object> = match &module {
            Some(module) => module.get("exports")?,
            None => None,
        };
        let default_export = match &exports {
            Some(exports) => shape(&exports.get(DEFAULT_EXPORT)?),
            None => None,
        };

        let known: FxHashSet<&str> = before.iter().map(String::as_str).collect();
        let after: Vec<String> = ctx.eval(GLOBAL_NAMES)?;
        let mut introduced = BTreeMap::new();
        for name in after.into_iter().filter(|name| !known.contains(name.as_str())) {
            let value: rquickjs::Value = globals.get(name.as_str())?;
            let shape = if value.is_function() {
                Value::Function
            } else {
                Value::Other
            };
            introduced.insert(name, shape);
        }

        Ok(Self {
            ctx,
            exports,
            mount,
            namespace: Namespace {
                default_export,
                globals: introduced,
            },
        })
    }
}

impl Scope for EngineScope<'_> {
    fn namespace(&self) -> &Namespace {
        &self.namespace
    }

    fn mount(&mut self, component: &str) -> Result<(), Fault> {
        let target = match &self.exports {
            Some(exports) if component == DEFAULT_EXPORT => exports.get(DEFAULT_EXPORT),
            _ => self.ctx.globals().get(component),
        };
        target
            .and_then(|target: rquickjs::Value| self.mount.call::<_, rquickjs::Value>((target,)))
            .catch(&self.ctx)
            .map(drop)
            .map_err(fault)
    }
}

fn shape(value: &rquickjs::Value<'_>) -> Option<Value> {
    if value.is_undefined() {
        None
    } else if value.is_function() {
        Some(Value::Function)
    } else {
        Some(Value::Other)
    }
}

fn fault(error: CaughtError<'_>) -> Fault {
    match error {
        CaughtError::Exception(exception) => {
            let line = exception
                .as_object()
                .get::<_, Option<i32>>("lineNumber")
                .ok()
                .flatten()
                .filter(|&line| line > 0)
                .or_else(|| exception.stack().as_deref().and_then(stack_line))
                .and_then(|line| u32::try_from(line).ok());
            Fault::new(exception.message().unwrap_or_default(), line)
        }
        CaughtError::Value(value) => {
            let message = value
                .as_string()
                .and_then(|s| s.to_string().ok())
                .unwrap_or_else(|| UNCAUGHT.to_string());
            Fault::new(message, None)
        }
        CaughtError::Error(err) => engine_fault(err),
    }
}

fn engine_fault(err: rquickjs::Error) -> Fault {
    Fault::new(err.to_string(), None)
}

/// Line of the innermost frame: `    at App (eval_script:3:5)`.
fn stack_line(stack: &str) -> Option<i32> {
    stack.lines().find_map(|frame| {
        let location = frame.trim().strip_prefix("at ")?;
        let inner = location.rsplit_once('(')?.1.strip_suffix(')')?;
        inner.split(':').nth(1)?.parse().ok()
    })
}
