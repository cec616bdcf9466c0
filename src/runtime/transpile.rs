//! TypeScript + JSX to plain JavaScript.

use super::commonjs::lower;
use oxc::allocator::Allocator;
use oxc::codegen::Codegen;
use oxc::parser::Parser;
use oxc::semantic::SemanticBuilder;
use oxc::span::SourceType;
use oxc::transformer::{JsxRuntime, TransformOptions, Transformer};
use std::path::Path;
use thiserror::Error;

/// Diagnostics reported by a transpiler, kept verbatim.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
#[error("{}", .diagnostics.join("\n"))]
pub struct TranspileError {
    pub diagnostics: Vec<String>,
}

pub trait Transpiler: Send + Sync + 'static {
    /// Transpile `source`, tagged with `path` for diagnostics.
    fn transpile(&self, path: &str, source: &str) -> Result<String, TranspileError>;
}

/// Native transpiler backed by oxc.
///
/// JSX uses the classic runtime (`React.createElement`) and module syntax is
/// lowered to CommonJS, so the output is a script that runs against the same
/// globals the preview document loads.
#[derive(Debug, Clone, Copy, Default)]
pub struct OxcTranspiler;

impl Transpiler for OxcTranspiler {
    fn transpile(&self, path: &str, source: &str) -> Result<String, TranspileError> {
        let allocator = Allocator::default();
        let source_type = SourceType::from_path(path).unwrap_or_else(|_| SourceType::tsx());

        let ret = Parser::new(&allocator, source, source_type).parse();
        if !ret.errors.is_empty() {
            return Err(diagnostics(ret.errors));
        }
        let mut program = ret.program;

        let scoping = SemanticBuilder::new()
            .build(&program)
            .semantic
            .into_scoping();

        let mut options = TransformOptions::default();
        options.jsx.runtime = JsxRuntime::Classic;

        let ret = Transformer::new(&allocator, Path::new(path), &options)
            .build_with_scoping(scoping, &mut program);
        if !ret.errors.is_empty() {
            return Err(diagnostics(ret.errors));
        }

        let code = Codegen::new().build(&program).code;
        lower(&code).map_err(|diagnostics| TranspileError { diagnostics })
    }
}

fn diagnostics<E: ToString>(errors: Vec<E>) -> TranspileError {
    TranspileError {
        diagnostics: errors.iter().map(ToString::to_string).collect(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_strips_types_and_lowers_jsx() {
        let code = OxcTranspiler
            .transpile(
                "app/page.tsx",
                "type P = { n: number };\nexport default function App(p: P) { return <h1>{p.n}</h1>; }",
            )
            .unwrap();
        assert!(code.contains("React.createElement"));
        assert!(!code.contains("type P"));
        assert!(code.contains("function App"));
        assert!(code.contains("exports.default = App;"));
        assert!(!code.contains("export "));
    }

    #[test]
    fn test_jsx_file_without_types() {
        let code = OxcTranspiler
            .transpile("Card.jsx", "function Card() { return <div className=\"c\" />; }")
            .unwrap();
        assert!(code.contains("React.createElement"));
    }

    #[test]
    fn test_syntax_error_is_reported() {
        let err = OxcTranspiler
            .transpile("app/page.tsx", "export default function App( { return <div>; }")
            .unwrap_err();
        assert!(!err.diagnostics.is_empty());
        assert_eq!(err.to_string(), err.diagnostics.join("\n"));
    }
}
