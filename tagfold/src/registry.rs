//! Name → generator map consulted when wrapping and evaluating trees.

use std::fmt;
use std::rc::Rc;

use indexmap::IndexMap;
use tagfold_dom::Stem;

use crate::builtins;
use crate::smart_tag::{self, SmartTag};
use crate::transformer::{Generator, Transformer};
use crate::value::Value;

/// The set of tag names that evaluate to transformers.
///
/// A [`Tree`](crate::Tree) borrows its registry for its whole lifetime, so
/// registrations made after wrapping do not change the tree's classification.
#[derive(Clone, Default)]
pub struct Registry {
    generators: IndexMap<Stem, Generator>,
}

impl Registry {
    /// An empty registry: every non-typer tag evaluates as an element.
    pub fn new() -> Self {
        Self::default()
    }

    /// Cast transformers, `ref`, and the built-in smart tags.
    pub fn with_builtins() -> Self {
        let mut registry = Self::new();
        builtins::register_all(&mut registry);
        smart_tag::register_all(&mut registry);
        registry
    }

    /// Register a generator under a tag name (matched case-insensitively).
    /// An existing registration under the same name is replaced.
    pub fn register<F>(&mut self, name: &str, generator: F)
    where
        F: Fn(&str, Vec<Value>) -> Transformer + 'static,
    {
        let name = Stem::from(name).to_ascii_lowercase();
        debug!("registering transformer <{}>", name);
        self.generators.insert(name, Rc::new(generator));
    }

    pub fn register_smart_tag<T: SmartTag>(&mut self) {
        self.register(T::NAME, smart_tag::generate::<T>);
    }

    pub fn get(&self, name: &str) -> Option<&Generator> {
        self.generators.get(name)
    }

    pub fn contains(&self, name: &str) -> bool {
        self.generators.contains_key(name)
    }

    /// Registered names in registration order.
    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.generators.keys().map(Stem::as_str)
    }
}

impl fmt::Debug for Registry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_set().entries(self.names()).finish()
    }
}
