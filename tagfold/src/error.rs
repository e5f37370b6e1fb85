//! Error types.
//!
//! [`TagError`] is what smart tags and built-in transformers return; it is
//! carried inside [`Outcome::Error`](crate::Outcome::Error) and merged into the
//! fold as data. [`EvalError`] only surfaces from a tree evaluated in strict
//! mode.

use tagfold_dom::Stem;
use thiserror::Error;

use crate::value::{Value, ValueType};

/// A structured failure from a smart tag or transformer.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum TagError {
    #[error("<{tag}>: main value must be {expected}, found {found}")]
    MainValue {
        tag: Stem,
        expected: &'static str,
        found: ValueType,
    },

    #[error("<{tag}>: expected {expected} argument(s), found {found}")]
    Arity {
        tag: Stem,
        expected: &'static str,
        found: usize,
    },

    #[error("<{tag}>: argument {position} must be {expected}, found {found}")]
    ArgType {
        tag: Stem,
        position: usize,
        expected: &'static str,
        found: ValueType,
    },

    #[error("<{tag}>: index {index} is out of range at `{path}` (length {len})")]
    OutOfRange {
        tag: Stem,
        path: String,
        index: usize,
        len: usize,
    },

    #[error("<{tag}>: segment `{segment}` of `{path}` must be a non-negative integer")]
    NotNumeric {
        tag: Stem,
        path: String,
        segment: String,
    },

    #[error("<{tag}>: cannot descend into {found} at `{path}`")]
    NotTraversable {
        tag: Stem,
        path: String,
        found: ValueType,
    },

    #[error("<{tag}>: no key `{key}` at `{path}`")]
    MissingKey {
        tag: Stem,
        path: String,
        key: String,
    },

    #[error("<{tag}>: {message}")]
    Invalid { tag: Stem, message: String },
}

impl TagError {
    pub fn invalid(tag: impl Into<Stem>, message: impl Into<String>) -> Self {
        TagError::Invalid {
            tag: tag.into(),
            message: message.into(),
        }
    }

    /// Name of the tag that failed.
    pub fn tag(&self) -> &str {
        match self {
            TagError::MainValue { tag, .. }
            | TagError::Arity { tag, .. }
            | TagError::ArgType { tag, .. }
            | TagError::OutOfRange { tag, .. }
            | TagError::NotNumeric { tag, .. }
            | TagError::NotTraversable { tag, .. }
            | TagError::MissingKey { tag, .. }
            | TagError::Invalid { tag, .. } => tag,
        }
    }

    fn kind(&self) -> &'static str {
        match self {
            TagError::MainValue { .. } => "main-value",
            TagError::Arity { .. } => "arity",
            TagError::ArgType { .. } => "arg-type",
            TagError::OutOfRange { .. } => "out-of-range",
            TagError::NotNumeric { .. } => "not-numeric",
            TagError::NotTraversable { .. } => "not-traversable",
            TagError::MissingKey { .. } => "missing-key",
            TagError::Invalid { .. } => "invalid",
        }
    }

    /// Record form merged into the fold: `{error, tag, kind, ...details}`.
    pub fn to_value(&self) -> Value {
        let mut entries: Vec<(&str, Value)> = vec![
            ("error", Value::string(self.to_string())),
            ("tag", Value::string(self.tag())),
            ("kind", Value::string(self.kind())),
        ];
        match self {
            TagError::MainValue {
                expected, found, ..
            } => {
                entries.push(("expected", Value::string(*expected)));
                entries.push(("found", Value::string(found.as_str())));
            }
            TagError::ArgType {
                position,
                expected,
                found,
                ..
            } => {
                entries.push(("position", Value::Number(*position as f64)));
                entries.push(("expected", Value::string(*expected)));
                entries.push(("found", Value::string(found.as_str())));
            }
            TagError::Arity {
                expected, found, ..
            } => {
                entries.push(("expected", Value::string(*expected)));
                entries.push(("found", Value::Number(*found as f64)));
            }
            TagError::OutOfRange { index, len, .. } => {
                entries.push(("index", Value::Number(*index as f64)));
                entries.push(("length", Value::Number(*len as f64)));
            }
            TagError::NotNumeric { .. }
            | TagError::NotTraversable { .. }
            | TagError::MissingKey { .. }
            | TagError::Invalid { .. } => {}
        }
        Value::record(entries)
    }
}

/// Why a strict evaluation stopped.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum EvalError {
    #[error("{path}: no transformer registered for <{tag}>")]
    UnknownTransformer { path: String, tag: Stem },

    #[error("{path}: {source}")]
    Transformer {
        path: String,
        #[source]
        source: TagError,
    },

    #[error("{path}: reference `{target}` does not resolve to a node")]
    Unresolved { path: String, target: String },

    #[error("{path}: node is already being evaluated (cyclic reference)")]
    Cycle { path: String },
}
