//! `<stringify>` and `<parse>`: a text form that keeps markup shape.
//!
//! The text form is compact JSON. Markup leaves are strings carrying a
//! marker prefix:
//!
//! | value    | encoded as                                          |
//! |----------|-----------------------------------------------------|
//! | text     | `%%-text-%%` + content                              |
//! | element  | `%%-element-%%` + JSON of the element               |
//! | nodelist | `%%-nodelist-%%` + JSON of the items                |
//! | string   | as is, or `%%-string-%%` + content if it starts `%%-` |

use serde_json::Value as Json;
use tagfold_dom::Stem;

use super::{SmartTag, expect_arity, main_value_error};
use crate::cast::json_number;
use crate::error::TagError;
use crate::serializer::{
    SerializedElement, SerializedNode, deserialize_element, deserialize_node, serialize_element,
    serialize_node,
};
use crate::value::{Record, Value};

const MARKER_START: &str = "%%-";
const TEXT_MARKER: &str = "%%-text-%%";
const ELEMENT_MARKER: &str = "%%-element-%%";
const NODELIST_MARKER: &str = "%%-nodelist-%%";
const STRING_MARKER: &str = "%%-string-%%";

pub struct Stringify;

impl SmartTag for Stringify {
    const NAME: &'static str = "stringify";
    type Args = ();

    fn check_args(args: &[Value]) -> Result<(), TagError> {
        expect_arity(Self::NAME, args, 0, 0, "0")
    }

    fn apply(main: Value, _args: ()) -> Result<Value, TagError> {
        Ok(Value::String(stringify_value(&main)))
    }
}

pub struct Parse;

impl SmartTag for Parse {
    const NAME: &'static str = "parse";
    type Args = ();

    fn check_main(main: &Value) -> Result<Value, TagError> {
        match main {
            Value::String(_) | Value::Text(_) => Ok(main.clone()),
            other => Err(main_value_error(Self::NAME, "string", other)),
        }
    }

    fn check_args(args: &[Value]) -> Result<(), TagError> {
        expect_arity(Self::NAME, args, 0, 0, "0")
    }

    fn apply(main: Value, _args: ()) -> Result<Value, TagError> {
        let (Value::String(text) | Value::Text(text)) = main else {
            return Err(main_value_error(Self::NAME, "string", &main));
        };
        parse_text(&text)
    }
}

/// Encode any value as compact marked-up JSON text.
pub fn stringify_value(value: &Value) -> Stem {
    Stem::from(encode(value).to_string())
}

/// Decode text produced by [`stringify_value`].
pub fn parse_text(text: &str) -> Result<Value, TagError> {
    let json: Json = serde_json::from_str(text)
        .map_err(|e| TagError::invalid(Parse::NAME, format!("malformed input: {e}")))?;
    decode(&json)
}

fn encode(value: &Value) -> Json {
    match value {
        Value::Null | Value::Transformer(_) => Json::Null,
        Value::Boolean(b) => Json::Bool(*b),
        Value::Number(n) => json_number(*n),
        Value::String(s) if s.starts_with(MARKER_START) => Json::String(format!("{STRING_MARKER}{s}")),
        Value::String(s) => Json::String(s.to_string()),
        Value::Text(t) => Json::String(format!("{TEXT_MARKER}{t}")),
        Value::Element(e) => Json::String(marked(ELEMENT_MARKER, &serialize_element(e))),
        Value::NodeList(nodes) => {
            let nodes: Vec<SerializedNode> = nodes.iter().map(serialize_node).collect();
            Json::String(marked(NODELIST_MARKER, &nodes))
        }
        Value::Array(items) => Json::Array(items.iter().map(encode).collect()),
        Value::Record(record) => Json::Object(
            record
                .iter()
                .map(|(k, v)| (k.to_string(), encode(v)))
                .collect(),
        ),
    }
}

fn marked<T: serde::Serialize>(marker: &str, shape: &T) -> String {
    // Plain data with string keys always serializes
    let body = serde_json::to_string(shape).unwrap_or_default();
    format!("{marker}{body}")
}

fn decode(json: &Json) -> Result<Value, TagError> {
    let value = match json {
        Json::Null => Value::Null,
        Json::Bool(b) => Value::Boolean(*b),
        Json::Number(n) => Value::Number(n.as_f64().unwrap_or(f64::NAN)),
        Json::String(s) => decode_string(s)?,
        Json::Array(items) => Value::Array(items.iter().map(decode).collect::<Result<_, _>>()?),
        Json::Object(entries) => Value::Record(
            entries
                .iter()
                .map(|(k, v)| Ok((Stem::from(k), decode(v)?)))
                .collect::<Result<Record, TagError>>()?,
        ),
    };
    Ok(value)
}

fn decode_string(s: &str) -> Result<Value, TagError> {
    if let Some(content) = s.strip_prefix(TEXT_MARKER) {
        Ok(Value::text(content))
    } else if let Some(body) = s.strip_prefix(ELEMENT_MARKER) {
        let element: SerializedElement = markup_shape(body)?;
        Ok(Value::Element(deserialize_element(&element)))
    } else if let Some(body) = s.strip_prefix(NODELIST_MARKER) {
        let nodes: Vec<SerializedNode> = markup_shape(body)?;
        Ok(Value::NodeList(nodes.iter().map(deserialize_node).collect()))
    } else if let Some(content) = s.strip_prefix(STRING_MARKER) {
        Ok(Value::string(content))
    } else {
        Ok(Value::string(s))
    }
}

fn markup_shape<T: serde::de::DeserializeOwned>(body: &str) -> Result<T, TagError> {
    serde_json::from_str(body)
        .map_err(|e| TagError::invalid(Parse::NAME, format!("malformed markup payload: {e}")))
}

#[cfg(test)]
mod tests {
    use tagfold_dom::{Element, Node};

    use super::*;
    use crate::smart_tag::run;

    fn sample() -> Value {
        let mut em = Element::new("em");
        em.set_attr("class", "x");
        em.push_text("hi");
        Value::record([
            ("n", Value::from(4)),
            ("f", Value::from(0.5)),
            ("s", Value::string("%%-text-%%not markup")),
            ("t", Value::text("  spaced  ")),
            ("e", Value::Element(em.clone())),
            (
                "l",
                Value::NodeList(vec![Node::text("a"), Node::text("b"), Node::Element(em)]),
            ),
            ("a", Value::Array(vec![Value::Null, Value::from(false)])),
        ])
    }

    #[test]
    fn test_stringify_then_parse_keeps_shape() {
        let text = run::<Stringify>(&sample(), &[]).unwrap();
        let parsed = run::<Parse>(&text, &[]).unwrap();
        assert_eq!(parsed, sample());
    }

    #[test]
    fn test_stringify_format() {
        assert_eq!(stringify_value(&Value::from(4)), "4");
        assert_eq!(stringify_value(&Value::Number(f64::NAN)), "null");
        assert_eq!(stringify_value(&Value::text("a")), "\"%%-text-%%a\"");
        assert_eq!(
            stringify_value(&Value::Array(vec![Value::string("a"), Value::from(1.5)])),
            "[\"a\",1.5]"
        );
        assert_eq!(
            stringify_value(&Value::Element(Element::new("br"))),
            r#""%%-element-%%{\"tag\":\"br\",\"attrs\":[],\"children\":[]}""#
        );
    }

    #[test]
    fn test_parse_errors() {
        assert!(matches!(
            run::<Parse>(&Value::string("{"), &[]),
            Err(TagError::Invalid { .. })
        ));
        assert!(matches!(
            run::<Parse>(&Value::from(1), &[]),
            Err(TagError::MainValue { .. })
        ));
        assert!(matches!(
            parse_text("\"%%-element-%%nope\""),
            Err(TagError::Invalid { .. })
        ));
    }
}
