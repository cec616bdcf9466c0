//! Template types for typed variable injection.

use std::marker::PhantomData;

/// A set of values that fills a template's placeholders.
pub trait TemplateVars {
    fn apply(&self, content: &str) -> String;
}

/// Template with typed variable injection
#[derive(Debug, Clone, Copy)]
pub struct Template<V> {
    content: &'static str,
    _marker: PhantomData<V>,
}

impl<V> Template<V> {
    pub const fn new(content: &'static str) -> Self {
        Self {
            content,
            _marker: PhantomData,
        }
    }
}

impl<V: TemplateVars> Template<V> {
    pub fn render(&self, vars: &V) -> String {
        vars.apply(self.content)
    }
}

/// Substitute placeholders in one left-to-right pass over `content`.
///
/// Inserted values are never scanned again, so a value that happens to
/// contain another placeholder lands verbatim.
pub fn fill(content: &str, pairs: &[(&str, &str)]) -> String {
    let mut out = String::with_capacity(content.len());
    let mut rest = content;
    while let Some((at, placeholder, value)) = pairs
        .iter()
        .filter_map(|&(placeholder, value)| {
            rest.find(placeholder).map(|at| (at, placeholder, value))
        })
        .min_by_key(|&(at, ..)| at)
    {
        out.push_str(&rest[..at]);
        out.push_str(value);
        rest = &rest[at + placeholder.len()..];
    }
    out.push_str(rest);
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    struct Greeting<'a> {
        name: &'a str,
    }

    impl TemplateVars for Greeting<'_> {
        fn apply(&self, content: &str) -> String {
            fill(content, &[("__NAME__", self.name)])
        }
    }

    #[test]
    fn test_render_applies_vars() {
        const HELLO: Template<Greeting<'static>> = Template::new("hello __NAME__");
        assert_eq!(HELLO.render(&Greeting { name: "app" }), "hello app");
    }

    #[test]
    fn test_fill_replaces_every_occurrence() {
        let out = fill("__A__ __B__ __A__", &[("__A__", "1"), ("__B__", "2")]);
        assert_eq!(out, "1 2 1");
    }

    #[test]
    fn test_fill_values_are_not_rescanned() {
        // An earlier value naming a later placeholder must not capture it
        let out = fill("__A__|__B__", &[("__A__", "__B__"), ("__B__", "x")]);
        assert_eq!(out, "__B__|x");

        let out = fill("__A__|__B__", &[("__A__", "x"), ("__B__", "__A__")]);
        assert_eq!(out, "x|__A__");
    }
}
