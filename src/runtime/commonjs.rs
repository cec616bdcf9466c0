//! ES module syntax lowered to CommonJS, the shape the browser transpiler
//! emits with `transform-modules-commonjs`.
//!
//! Imports become `require` calls bound with `const`, so they never reach
//! the global object. Exports become assignments to `exports`. Everything
//! else keeps its place, so top-level `function` and `var` declarations
//! still land on the global object when the result runs as a script.
//! No edit spans a line break; fault lines stay where codegen put them.

use oxc::allocator::Allocator;
use oxc::ast::ast::{
    Declaration, ExportDefaultDeclarationKind, ImportDeclarationSpecifier, Statement,
};
use oxc::parser::Parser;
use oxc::span::{GetSpan, SourceType};

/// Lower the module syntax of `code`. Errors are parser diagnostics.
pub fn lower(code: &str) -> Result<String, Vec<String>> {
    let allocator = Allocator::default();
    let ret = Parser::new(&allocator, code, SourceType::mjs()).parse();
    if !ret.errors.is_empty() {
        return Err(ret.errors.iter().map(ToString::to_string).collect());
    }

    let mut edits = Edits::default();
    for stmt in &ret.program.body {
        match stmt {
            Statement::ImportDeclaration(import) => {
                let module = require(import.source.value.as_str());
                let bindings = match &import.specifiers {
                    Some(specifiers) if !specifiers.is_empty() => specifiers
                        .iter()
                        .map(|specifier| match specifier {
                            ImportDeclarationSpecifier::ImportSpecifier(s) => format!(
                                "const {} = {module}[{}];",
                                s.local.name,
                                quote(s.imported.name().as_str())
                            ),
                            ImportDeclarationSpecifier::ImportDefaultSpecifier(s) => {
                                format!("const {} = {module};", s.local.name)
                            }
                            ImportDeclarationSpecifier::ImportNamespaceSpecifier(s) => {
                                format!("const {} = {module};", s.local.name)
                            }
                        })
                        .collect::<Vec<_>>()
                        .join(" "),
                    _ => format!("{module};"),
                };
                edits.replace(import.span.start, import.span.end, bindings);
            }
            Statement::ExportDefaultDeclaration(export) => {
                let start = export.declaration.span().start;
                let named = match &export.declaration {
                    ExportDefaultDeclarationKind::FunctionDeclaration(func) => {
                        Some(func.id.as_ref().map(|id| id.name.to_string()))
                    }
                    ExportDefaultDeclarationKind::ClassDeclaration(class) => {
                        Some(class.id.as_ref().map(|id| id.name.to_string()))
                    }
                    _ => None,
                };
                match named {
                    // Declaration stays a declaration; bind it afterwards
                    Some(Some(name)) => {
                        edits.replace(export.span.start, start, String::new());
                        edits.insert(export.span.end, format!(" exports.default = {name};"));
                    }
                    // Anonymous declaration becomes an expression
                    Some(None) => {
                        edits.replace(export.span.start, start, "exports.default = ".into());
                        edits.insert(export.span.end, ";".into());
                    }
                    None => edits.replace(export.span.start, start, "exports.default = ".into()),
                }
            }
            Statement::ExportNamedDeclaration(export) => {
                if let Some(decl) = &export.declaration {
                    edits.replace(export.span.start, decl.span().start, String::new());
                    let bound: String = declared_names(decl)
                        .iter()
                        .map(|name| format!(" exports.{name} = {name};"))
                        .collect();
                    edits.insert(export.span.end, bound);
                    continue;
                }
                let from = export
                    .source
                    .as_ref()
                    .map(|source| require(source.value.as_str()));
                let assignments = export
                    .specifiers
                    .iter()
                    .map(|spec| {
                        let exported = quote(spec.exported.name().as_str());
                        let local = spec.local.name();
                        match &from {
                            Some(module) => {
                                format!("exports[{exported}] = {module}[{}];", quote(local.as_str()))
                            }
                            None => format!("exports[{exported}] = {local};"),
                        }
                    })
                    .collect::<Vec<_>>()
                    .join(" ");
                edits.replace(export.span.start, export.span.end, assignments);
            }
            Statement::ExportAllDeclaration(export) => {
                let module = require(export.source.value.as_str());
                let lowered = match &export.exported {
                    Some(name) => format!("exports[{}] = {module};", quote(name.name().as_str())),
                    None => format!("Object.assign(exports, {module});"),
                };
                edits.replace(export.span.start, export.span.end, lowered);
            }
            _ => {}
        }
    }
    Ok(edits.apply(code))
}

fn declared_names(decl: &Declaration<'_>) -> Vec<String> {
    match decl {
        Declaration::VariableDeclaration(vars) => vars
            .declarations
            .iter()
            .flat_map(|declarator| declarator.id.get_binding_identifiers())
            .map(|id| id.name.to_string())
            .collect(),
        other => other.id().map(|id| id.name.to_string()).into_iter().collect(),
    }
}

fn require(module: &str) -> String {
    format!("require({})", quote(module))
}

/// JSON string literals are valid JavaScript string literals.
fn quote(text: &str) -> String {
    serde_json::Value::from(text).to_string()
}

/// Byte-range replacements, applied back to front.
#[derive(Default)]
struct Edits(Vec<(u32, u32, String)>);

impl Edits {
    fn replace(&mut self, start: u32, end: u32, text: String) {
        self.0.push((start, end, text));
    }

    fn insert(&mut self, at: u32, text: String) {
        self.0.push((at, at, text));
    }

    fn apply(mut self, code: &str) -> String {
        let mut out = code.to_string();
        self.0.sort_by_key(|&(start, end, _)| (start, end));
        for (start, end, text) in self.0.into_iter().rev() {
            out.replace_range(start as usize..end as usize, &text);
        }
        out
    }
}
