//! Per-tree evaluation options.

use tagfold_dom::Stem;

/// Attribute that turns a positional child into a named one.
pub const DEFAULT_NAME_ATTRIBUTE: &str = "_name";

/// Options for wrapping and evaluating a [`Tree`](crate::Tree).
#[derive(Clone, Debug)]
pub struct EvalOptions {
    /// Reserved attribute naming a child (default: `_name`)
    pub name_attribute: Stem,
    /// Collect degrade sites and transformer errors and fail `evaluate()`
    /// with the first one (default: false)
    pub strict: bool,
}

impl Default for EvalOptions {
    fn default() -> Self {
        Self {
            name_attribute: Stem::from_static(DEFAULT_NAME_ATTRIBUTE),
            strict: false,
        }
    }
}

impl EvalOptions {
    pub fn new() -> Self {
        Self::default()
    }

    /// Use a different reserved name attribute.
    pub fn with_name_attribute(mut self, name: impl Into<Stem>) -> Self {
        self.name_attribute = name.into();
        self
    }

    /// Enable strict mode.
    pub fn strict(mut self) -> Self {
        self.strict = true;
        self
    }
}
