use tagfold_dom::{Element, Node, Stem};

use super::{SmartTag, expect_arity, string_arg};
use crate::error::TagError;
use crate::value::Value;

/// `<replace>`: replace every literal occurrence of a substring in all
/// string-bearing leaves of the main value.
pub struct Replace;

pub struct ReplaceArgs {
    pattern: Stem,
    replacer: Stem,
}

impl SmartTag for Replace {
    const NAME: &'static str = "replace";
    type Args = ReplaceArgs;

    fn check_args(args: &[Value]) -> Result<ReplaceArgs, TagError> {
        expect_arity(Self::NAME, args, 2, 2, "2")?;
        let pattern = string_arg(Self::NAME, args, 0)?;
        if pattern.is_empty() {
            return Err(TagError::invalid(Self::NAME, "the string to replace is empty"));
        }
        let replacer = string_arg(Self::NAME, args, 1)?;
        Ok(ReplaceArgs { pattern, replacer })
    }

    fn apply(main: Value, args: ReplaceArgs) -> Result<Value, TagError> {
        Ok(replace_in(&main, &args.pattern, &args.replacer))
    }
}

fn replace_in(value: &Value, pattern: &str, replacer: &str) -> Value {
    match value {
        Value::String(s) => Value::String(Stem::from(s.replace(pattern, replacer))),
        Value::Text(t) => Value::Text(Stem::from(t.replace(pattern, replacer))),
        Value::Element(e) => Value::Element(replace_in_element(e, pattern, replacer)),
        Value::NodeList(nodes) => Value::NodeList(
            nodes
                .iter()
                .map(|n| replace_in_node(n, pattern, replacer))
                .collect(),
        ),
        Value::Array(items) => Value::Array(
            items
                .iter()
                .map(|v| replace_in(v, pattern, replacer))
                .collect(),
        ),
        Value::Record(record) => Value::Record(
            record
                .iter()
                .map(|(k, v)| (k.clone(), replace_in(v, pattern, replacer)))
                .collect(),
        ),
        Value::Null | Value::Boolean(_) | Value::Number(_) | Value::Transformer(_) => value.clone(),
    }
}

fn replace_in_node(node: &Node, pattern: &str, replacer: &str) -> Node {
    match node {
        Node::Text(t) => Node::Text(Stem::from(t.replace(pattern, replacer))),
        Node::Element(e) => Node::Element(replace_in_element(e, pattern, replacer)),
    }
}

fn replace_in_element(element: &Element, pattern: &str, replacer: &str) -> Element {
    Element {
        tag: element.tag.clone(),
        attrs: element.attrs.clone(),
        children: element
            .children
            .iter()
            .map(|n| replace_in_node(n, pattern, replacer))
            .collect(),
    }
}
