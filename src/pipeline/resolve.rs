//! Component resolution: an explicit, ordered chain of lookups.

use crate::runtime::{DEFAULT_EXPORT, Namespace, Value, library_globals};

/// Lookup strategies, tried in this order.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Strategy {
    /// `export default` of a function.
    DefaultExport,
    /// Global function `App`.
    App,
    /// Global function `Page`.
    Page,
    /// First uppercase global function introduced by the evaluation, in
    /// lexical name order, skipping the runtime library globals.
    Scan,
}

const CHAIN: [Strategy; 4] = [
    Strategy::DefaultExport,
    Strategy::App,
    Strategy::Page,
    Strategy::Scan,
];

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Component {
    pub name: String,
    pub strategy: Strategy,
}

pub fn resolve(namespace: &Namespace) -> Option<Component> {
    CHAIN
        .into_iter()
        .find_map(|strategy| strategy.lookup(namespace))
}

impl Strategy {
    fn lookup(self, namespace: &Namespace) -> Option<Component> {
        let found = |name: &str| Component {
            name: name.to_string(),
            strategy: self,
        };
        match self {
            Self::DefaultExport => {
                (namespace.default_export == Some(Value::Function)).then(|| found(DEFAULT_EXPORT))
            }
            Self::App | Self::Page => {
                let name = if self == Self::App { "App" } else { "Page" };
                (namespace.globals.get(name) == Some(&Value::Function)).then(|| found(name))
            }
            Self::Scan => namespace
                .globals
                .iter()
                .find(|(name, value)| {
                    **value == Value::Function
                        && name.starts_with(|c: char| c.is_ascii_uppercase())
                        && !library_globals().any(|global| global == name.as_str())
                })
                .map(|(name, _)| found(name)),
        }
    }
}
