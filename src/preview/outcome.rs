//! Execution outcomes, one per render cycle.

use serde::{Deserialize, Serialize};

/// Message used when evaluation succeeds but nothing renderable is found.
pub const NO_COMPONENT: &str = "No component found — must export a component";

/// Message used when the transpiler or renderer is missing after loading.
pub const LIBRARIES_UNAVAILABLE: &str = "required libraries unavailable";

/// Result of one render cycle.
///
/// Faults that escape the pipeline (caught by the last-resort handler in
/// the document) are reported as `RuntimeError` as well.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum ExecutionOutcome {
    /// No eligible entry file; the placeholder is shown.
    Empty,
    /// The component is mounted.
    Success,
    /// The transpiler rejected the source.
    CompileError { message: String },
    /// Evaluation threw, no component was found, or a library failed to load.
    RuntimeError {
        message: String,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        line: Option<u32>,
    },
}

impl ExecutionOutcome {
    pub fn compile(message: impl Into<String>) -> Self {
        Self::CompileError {
            message: message.into(),
        }
    }

    pub fn runtime(message: impl Into<String>, line: Option<u32>) -> Self {
        Self::RuntimeError {
            message: message.into(),
            line,
        }
    }

    pub const fn is_failure(&self) -> bool {
        matches!(self, Self::CompileError { .. } | Self::RuntimeError { .. })
    }

    /// Panel header shown by the document for failures.
    pub const fn title(&self) -> &'static str {
        match self {
            Self::Empty => "Ready to Build",
            Self::Success => "Mounted",
            Self::CompileError { .. } => "Compile Error",
            Self::RuntimeError { .. } => "Runtime Error",
        }
    }

    pub fn message(&self) -> Option<&str> {
        match self {
            Self::CompileError { message } | Self::RuntimeError { message, .. } => Some(message),
            Self::Empty | Self::Success => None,
        }
    }
}

impl std::fmt::Display for ExecutionOutcome {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Empty => write!(f, "empty"),
            Self::Success => write!(f, "mounted"),
            Self::CompileError { message } => write!(f, "Compile Error: {message}"),
            Self::RuntimeError {
                message,
                line: Some(line),
            } => write!(f, "Runtime Error: {message} (line {line})"),
            Self::RuntimeError { message, line: None } => write!(f, "Runtime Error: {message}"),
        }
    }
}
