//! Transformers: named, argument-carrying callables that edit a fold
//! accumulator instead of contributing a plain value.

use std::fmt;
use std::rc::Rc;

use tagfold_dom::Stem;

use crate::error::TagError;
use crate::merge::merge_values;
use crate::resolve::TreeKey;
use crate::value::Value;

/// The callable part of a [`Transformer`].
pub type Body = Rc<dyn Fn(&Value, &dyn Hooks) -> Outcome>;

/// Builds a [`Transformer`] from an invocation name and positional arguments.
pub type Generator = Rc<dyn Fn(&str, Vec<Value>) -> Transformer>;

/// What a transformer asks the fold to do with its result.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Action {
    Replace,
    Merge,
    Error,
    None,
}

/// Result of invoking a transformer on an accumulator.
#[derive(Debug, Clone, PartialEq)]
pub enum Outcome {
    /// The value becomes the new accumulator.
    Replace(Value),
    /// The value is merged into the accumulator like an ordinary child.
    Merge(Value),
    /// The transformer failed; the error is merged as data.
    Error(TagError),
    /// The accumulator is left untouched.
    None,
}

impl Outcome {
    pub fn action(&self) -> Action {
        match self {
            Outcome::Replace(_) => Action::Replace,
            Outcome::Merge(_) => Action::Merge,
            Outcome::Error(_) => Action::Error,
            Outcome::None => Action::None,
        }
    }
}

/// Services a transformer body can call back into while it runs.
pub trait Hooks {
    /// Evaluate the node at a root-relative path.
    fn resolve(&self, path: &str) -> Option<Value>;

    /// The fold's pairwise merge, with this hook set threaded through.
    fn merge(&self, current: &Value, incoming: &Value, key: &TreeKey) -> Value;

    /// Called when an [`Outcome::Error`] is about to be merged as data.
    fn report(&self, _error: &TagError) {}
}

/// Hooks for running transformers outside of a tree: nothing resolves.
#[derive(Debug, Clone, Copy, Default)]
pub struct Detached;

impl Hooks for Detached {
    fn resolve(&self, _path: &str) -> Option<Value> {
        None
    }

    fn merge(&self, current: &Value, incoming: &Value, key: &TreeKey) -> Value {
        merge_values(current, incoming, key, self)
    }
}

/// A named callable value carrying its arguments.
#[derive(Clone)]
pub struct Transformer {
    name: Stem,
    args: Vec<Value>,
    body: Body,
}

impl Transformer {
    pub fn new<F>(name: impl Into<Stem>, args: Vec<Value>, body: F) -> Self
    where
        F: Fn(&Value, &dyn Hooks) -> Outcome + 'static,
    {
        Self {
            name: name.into(),
            args,
            body: Rc::new(body),
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn args(&self) -> &[Value] {
        &self.args
    }

    /// Run the body against the current accumulator.
    pub fn invoke(&self, current: &Value, hooks: &dyn Hooks) -> Outcome {
        (self.body)(current, hooks)
    }
}

impl PartialEq for Transformer {
    fn eq(&self, other: &Self) -> bool {
        self.name == other.name && self.args == other.args && Rc::ptr_eq(&self.body, &other.body)
    }
}

impl fmt::Debug for Transformer {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Transformer")
            .field("name", &self.name)
            .field("args", &self.args)
            .finish_non_exhaustive()
    }
}
