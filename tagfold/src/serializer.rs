//! Cache-safe representation of values.
//!
//! A [`Serialized`] value is plain owned data with markup flattened to strings
//! and attribute lists. [`deserialize`] always builds fresh markup nodes, so
//! two values read from the same cache entry never share structure.

use serde::{Deserialize, Serialize};
use tagfold_dom::{Element, Node, Stem};

use crate::value::{Record, Value};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", content = "value", rename_all = "lowercase")]
pub enum Serialized {
    Null,
    Boolean(bool),
    Number(f64),
    String(String),
    Text(String),
    Element(SerializedElement),
    NodeList(Vec<SerializedNode>),
    Array(Vec<Serialized>),
    Record(Vec<(String, Serialized)>),
    /// Opaque marker for a transformer; its body cannot be stored.
    Transformer { name: String },
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SerializedElement {
    pub tag: String,
    pub attrs: Vec<(String, String)>,
    pub children: Vec<SerializedNode>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum SerializedNode {
    Text(String),
    Element(SerializedElement),
}

impl Serialized {
    /// True when the value holds a transformer marker anywhere inside.
    pub fn contains_opaque(&self) -> bool {
        match self {
            Serialized::Transformer { .. } => true,
            Serialized::Array(items) => items.iter().any(Serialized::contains_opaque),
            Serialized::Record(entries) => entries.iter().any(|(_, v)| v.contains_opaque()),
            _ => false,
        }
    }
}

pub fn serialize(value: &Value) -> Serialized {
    match value {
        Value::Null => Serialized::Null,
        Value::Boolean(b) => Serialized::Boolean(*b),
        Value::Number(n) => Serialized::Number(*n),
        Value::String(s) => Serialized::String(s.to_string()),
        Value::Text(t) => Serialized::Text(t.to_string()),
        Value::Element(e) => Serialized::Element(serialize_element(e)),
        Value::NodeList(nodes) => Serialized::NodeList(nodes.iter().map(serialize_node).collect()),
        Value::Array(items) => Serialized::Array(items.iter().map(serialize).collect()),
        Value::Record(record) => Serialized::Record(
            record
                .iter()
                .map(|(k, v)| (k.to_string(), serialize(v)))
                .collect(),
        ),
        Value::Transformer(t) => Serialized::Transformer {
            name: t.name().to_string(),
        },
    }
}

/// Inverse of [`serialize`]. A transformer marker reads back as `Null`:
/// transformer bodies never live in a cache.
pub fn deserialize(serialized: &Serialized) -> Value {
    match serialized {
        Serialized::Null => Value::Null,
        Serialized::Boolean(b) => Value::Boolean(*b),
        Serialized::Number(n) => Value::Number(*n),
        Serialized::String(s) => Value::String(Stem::from(s)),
        Serialized::Text(t) => Value::Text(Stem::from(t)),
        Serialized::Element(e) => Value::Element(deserialize_element(e)),
        Serialized::NodeList(nodes) => Value::NodeList(nodes.iter().map(deserialize_node).collect()),
        Serialized::Array(items) => Value::Array(items.iter().map(deserialize).collect()),
        Serialized::Record(entries) => Value::Record(
            entries
                .iter()
                .map(|(k, v)| (Stem::from(k), deserialize(v)))
                .collect::<Record>(),
        ),
        Serialized::Transformer { name: _name } => {
            debug!("transformer <{}> cannot be restored from a cache entry", _name);
            Value::Null
        }
    }
}

pub fn serialize_element(element: &Element) -> SerializedElement {
    SerializedElement {
        tag: element.tag.to_string(),
        attrs: element
            .attrs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect(),
        children: element.children.iter().map(serialize_node).collect(),
    }
}

pub fn serialize_node(node: &Node) -> SerializedNode {
    match node {
        Node::Text(t) => SerializedNode::Text(t.to_string()),
        Node::Element(e) => SerializedNode::Element(serialize_element(e)),
    }
}

pub fn deserialize_element(serialized: &SerializedElement) -> Element {
    let mut element = Element::new(serialized.tag.as_str());
    for (k, v) in &serialized.attrs {
        element.set_attr(k.as_str(), v.as_str());
    }
    element.children = serialized.children.iter().map(deserialize_node).collect();
    element
}

pub fn deserialize_node(serialized: &SerializedNode) -> Node {
    match serialized {
        SerializedNode::Text(t) => Node::Text(Stem::from(t)),
        SerializedNode::Element(e) => Node::Element(deserialize_element(e)),
    }
}
