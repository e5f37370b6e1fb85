//! Total coercions from any [`Value`] to each concrete type.
//!
//! None of these fail: every input has a best-effort answer.

use tagfold_dom::{Element, Node, Stem};

use crate::value::{Record, Value, ValueType};

/// Tag of the generic container used when a value must become an element.
pub const CONTAINER_TAG: &str = "div";

/// Shared truthiness: null, false, 0, NaN and empty strings, texts,
/// sequences, arrays and records are false.
pub fn truthy(value: &Value) -> bool {
    match value {
        Value::Null => false,
        Value::Boolean(b) => *b,
        Value::Number(n) => *n != 0.0 && !n.is_nan(),
        Value::String(s) | Value::Text(s) => !s.is_empty(),
        Value::Element(_) | Value::Transformer(_) => true,
        Value::NodeList(nodes) => !nodes.is_empty(),
        Value::Array(items) => !items.is_empty(),
        Value::Record(record) => !record.is_empty(),
    }
}

pub fn to_null(_value: &Value) -> Value {
    Value::Null
}

pub fn to_boolean(value: &Value) -> Value {
    Value::Boolean(truthy(value))
}

/// Numbers pass through; strings and texts are parsed after trimming
/// (an empty string reads as 0); everything else is 0.
pub fn to_number(value: &Value) -> Value {
    let n = match value {
        Value::Number(n) => *n,
        Value::String(s) | Value::Text(s) => parse_number(s),
        _ => 0.0,
    };
    Value::Number(n)
}

/// Only decimal literals count: `f64::from_str` would also accept words
/// such as `nan` and `inf`, which read as 0 like any other non-number.
fn parse_number(s: &str) -> f64 {
    let trimmed = s.trim();
    let unsigned = trimmed.strip_prefix(['+', '-']).unwrap_or(trimmed);
    if !unsigned.starts_with(|c: char| c.is_ascii_digit() || c == '.') {
        return 0.0;
    }
    trimmed.parse::<f64>().unwrap_or(0.0)
}

/// Same digits as the JSON form used by `stringify`: safe integers have no
/// fraction, everything else is the shortest round-trip form (`1e21`,
/// `1e-7`). Non-finite values get names, since JSON has none.
pub fn format_number(n: f64) -> String {
    if n.is_nan() {
        "NaN".to_string()
    } else if n.is_infinite() {
        if n > 0.0 { "Infinity" } else { "-Infinity" }.to_string()
    } else {
        json_number(n).to_string()
    }
}

pub fn to_string(value: &Value) -> Value {
    Value::String(string_of(value))
}

/// The string form of a value, unwrapped.
pub fn string_of(value: &Value) -> Stem {
    match value {
        Value::String(s) | Value::Text(s) => s.clone(),
        Value::Null => Stem::from_static("null"),
        Value::Boolean(true) => Stem::from_static("true"),
        Value::Boolean(false) => Stem::from_static("false"),
        Value::Number(n) => Stem::from(format_number(*n)),
        Value::Element(e) => Stem::from(e.to_html()),
        Value::NodeList(nodes) => Stem::from(concat_nodes(nodes)),
        Value::Array(_) | Value::Record(_) => Stem::from(json_projection(value).to_string()),
        Value::Transformer(t) => Stem::from(format!("[transformer {}]", t.name())),
    }
}

/// Text items contribute their content, elements their outer HTML.
fn concat_nodes(nodes: &[Node]) -> String {
    let mut out = String::new();
    for node in nodes {
        match node {
            Node::Text(t) => out.push_str(t),
            Node::Element(e) => out.push_str(&e.to_html()),
        }
    }
    out
}

/// JSON number for `n`, integral when exact, `null` when not finite.
pub(crate) fn json_number(n: f64) -> serde_json::Value {
    const MAX_SAFE: f64 = 9_007_199_254_740_991.0;
    if n.is_finite() && n.fract() == 0.0 && n.abs() <= MAX_SAFE {
        serde_json::Value::from(n as i64)
    } else {
        serde_json::Number::from_f64(n)
            .map(serde_json::Value::Number)
            .unwrap_or(serde_json::Value::Null)
    }
}

/// Plain JSON view of a value, used by [`string_of`] for arrays and records.
/// Markup becomes its HTML text.
fn json_projection(value: &Value) -> serde_json::Value {
    match value {
        Value::Null => serde_json::Value::Null,
        Value::Boolean(b) => serde_json::Value::Bool(*b),
        Value::Number(n) => json_number(*n),
        Value::Array(items) => serde_json::Value::Array(items.iter().map(json_projection).collect()),
        Value::Record(record) => serde_json::Value::Object(
            record
                .iter()
                .map(|(k, v)| (k.to_string(), json_projection(v)))
                .collect(),
        ),
        other => serde_json::Value::String(string_of(other).to_string()),
    }
}

pub fn to_text(value: &Value) -> Value {
    match value {
        Value::Text(t) => Value::Text(t.clone()),
        other => Value::Text(string_of(other)),
    }
}

/// Elements are cloned; texts and sequences become the children of a
/// generic container; arrays and records give an empty container; anything
/// else is wrapped as text.
pub fn to_element(value: &Value) -> Value {
    let element = match value {
        Value::Element(e) => e.clone(),
        Value::Text(t) => Element::with_children(CONTAINER_TAG, vec![Node::Text(t.clone())]),
        Value::NodeList(nodes) => Element::with_children(CONTAINER_TAG, nodes.clone()),
        Value::Array(_) | Value::Record(_) => Element::new(CONTAINER_TAG),
        other => Element::with_children(CONTAINER_TAG, vec![Node::Text(string_of(other))]),
    };
    Value::Element(element)
}

pub fn to_node_sequence(value: &Value) -> Value {
    Value::NodeList(nodes_of(value))
}

/// Normalize any value into an ordered list of sibling nodes.
pub fn nodes_of(value: &Value) -> Vec<Node> {
    match value {
        Value::Null | Value::Transformer(_) => Vec::new(),
        Value::String(s) if s.is_empty() => Vec::new(),
        Value::Text(t) => vec![Node::Text(t.clone())],
        Value::Element(e) => vec![Node::Element(e.clone())],
        Value::NodeList(nodes) => nodes.clone(),
        Value::Array(items) => items.iter().flat_map(nodes_of).collect(),
        other => vec![Node::Text(string_of(other))],
    }
}

pub fn to_array(value: &Value) -> Value {
    match value {
        Value::Array(items) => Value::Array(items.clone()),
        Value::NodeList(nodes) => Value::Array(nodes.iter().cloned().map(Value::from_node).collect()),
        other => Value::Array(vec![other.clone()]),
    }
}

pub fn to_record(value: &Value) -> Value {
    match value {
        Value::Record(record) => Value::Record(record.clone()),
        _ => Value::Record(Record::new()),
    }
}

/// The cast a typed tree node applies to its folded accumulator.
///
/// `Element` and `Transformer` are absent: an element node re-wraps its host
/// element, a transformer node calls its generator.
pub fn cast_to(target: ValueType, value: &Value) -> Option<Value> {
    let cast = match target {
        ValueType::Null => to_null(value),
        ValueType::Boolean => to_boolean(value),
        ValueType::Number => to_number(value),
        ValueType::String => to_string(value),
        ValueType::Text => to_text(value),
        ValueType::NodeList => to_node_sequence(value),
        ValueType::Array => to_array(value),
        ValueType::Record => to_record(value),
        ValueType::Element | ValueType::Transformer => return None,
    };
    Some(cast)
}
