//! The closed runtime value union.

use std::fmt;

use indexmap::IndexMap;
use tagfold_dom::{Element, Node, Stem};

use crate::transformer::Transformer;

/// String-keyed record. Equality ignores insertion order.
pub type Record = IndexMap<Stem, Value>;

/// A fully reduced value produced by evaluating a tree node.
///
/// Values own all of their data: markup variants hold deep copies, never
/// references into the host tree.
///
/// Equality is structural. Numbers compare by value except that `NaN` equals
/// `NaN`, so every value equals its own cache round trip.
#[derive(Debug, Clone)]
pub enum Value {
    Null,
    Boolean(bool),
    Number(f64),
    String(Stem),
    /// A markup text leaf
    Text(Stem),
    /// A markup element
    Element(Element),
    /// An ordered sequence of sibling markup nodes
    NodeList(Vec<Node>),
    Array(Vec<Value>),
    Record(Record),
    Transformer(Transformer),
}

/// The type of a [`Value`], also used to classify tree nodes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ValueType {
    Null,
    Boolean,
    Number,
    String,
    Text,
    Element,
    NodeList,
    Array,
    Record,
    Transformer,
}

impl ValueType {
    /// The typer vocabulary: tag names that force a node's type.
    pub const TYPERS: [ValueType; 8] = [
        ValueType::Null,
        ValueType::Boolean,
        ValueType::Number,
        ValueType::String,
        ValueType::Text,
        ValueType::NodeList,
        ValueType::Array,
        ValueType::Record,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            ValueType::Null => "null",
            ValueType::Boolean => "boolean",
            ValueType::Number => "number",
            ValueType::String => "string",
            ValueType::Text => "text",
            ValueType::Element => "element",
            ValueType::NodeList => "nodelist",
            ValueType::Array => "array",
            ValueType::Record => "record",
            ValueType::Transformer => "transformer",
        }
    }

    /// Look up a normalized tag name in the typer vocabulary.
    pub fn from_typer_tag(tag: &str) -> Option<ValueType> {
        Self::TYPERS.into_iter().find(|t| t.as_str() == tag)
    }
}

impl fmt::Display for ValueType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl PartialEq for Value {
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (Value::Null, Value::Null) => true,
            (Value::Boolean(a), Value::Boolean(b)) => a == b,
            (Value::Number(a), Value::Number(b)) => a == b || (a.is_nan() && b.is_nan()),
            (Value::String(a), Value::String(b)) | (Value::Text(a), Value::Text(b)) => a == b,
            (Value::Element(a), Value::Element(b)) => a == b,
            (Value::NodeList(a), Value::NodeList(b)) => a == b,
            (Value::Array(a), Value::Array(b)) => a == b,
            (Value::Record(a), Value::Record(b)) => a == b,
            (Value::Transformer(a), Value::Transformer(b)) => a == b,
            _ => false,
        }
    }
}

impl Value {
    pub fn value_type(&self) -> ValueType {
        match self {
            Value::Null => ValueType::Null,
            Value::Boolean(_) => ValueType::Boolean,
            Value::Number(_) => ValueType::Number,
            Value::String(_) => ValueType::String,
            Value::Text(_) => ValueType::Text,
            Value::Element(_) => ValueType::Element,
            Value::NodeList(_) => ValueType::NodeList,
            Value::Array(_) => ValueType::Array,
            Value::Record(_) => ValueType::Record,
            Value::Transformer(_) => ValueType::Transformer,
        }
    }

    pub fn string(s: impl Into<Stem>) -> Self {
        Value::String(s.into())
    }

    pub fn text(s: impl Into<Stem>) -> Self {
        Value::Text(s.into())
    }

    /// Build a record from key/value pairs.
    pub fn record<K, I>(entries: I) -> Self
    where
        K: Into<Stem>,
        I: IntoIterator<Item = (K, Value)>,
    {
        Value::Record(entries.into_iter().map(|(k, v)| (k.into(), v)).collect())
    }

    /// Text, element or node sequence.
    pub fn is_markup(&self) -> bool {
        matches!(self, Value::Text(_) | Value::Element(_) | Value::NodeList(_))
    }

    /// Convert a markup node into the matching value variant.
    pub fn from_node(node: Node) -> Self {
        match node {
            Node::Text(t) => Value::Text(t),
            Node::Element(e) => Value::Element(e),
        }
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            Value::String(s) => Some(s),
            _ => None,
        }
    }

    pub fn as_array(&self) -> Option<&[Value]> {
        match self {
            Value::Array(items) => Some(items),
            _ => None,
        }
    }

    pub fn as_record(&self) -> Option<&Record> {
        match self {
            Value::Record(record) => Some(record),
            _ => None,
        }
    }

    pub fn as_transformer(&self) -> Option<&Transformer> {
        match self {
            Value::Transformer(t) => Some(t),
            _ => None,
        }
    }
}

impl From<bool> for Value {
    fn from(b: bool) -> Self {
        Value::Boolean(b)
    }
}

impl From<f64> for Value {
    fn from(n: f64) -> Self {
        Value::Number(n)
    }
}

impl From<i32> for Value {
    fn from(n: i32) -> Self {
        Value::Number(f64::from(n))
    }
}

impl From<&str> for Value {
    fn from(s: &str) -> Self {
        Value::String(Stem::from(s))
    }
}

impl From<String> for Value {
    fn from(s: String) -> Self {
        Value::String(Stem::from(s))
    }
}

impl From<Vec<Value>> for Value {
    fn from(items: Vec<Value>) -> Self {
        Value::Array(items)
    }
}

impl From<Element> for Value {
    fn from(element: Element) -> Self {
        Value::Element(element)
    }
}

impl From<Record> for Value {
    fn from(record: Record) -> Self {
        Value::Record(record)
    }
}
