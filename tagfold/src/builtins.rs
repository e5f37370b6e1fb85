//! Built-in transformers: casts of the accumulator, and `ref`.

use tagfold_dom::Stem;

use crate::cast;
use crate::error::TagError;
use crate::registry::Registry;
use crate::transformer::{Outcome, Transformer};
use crate::value::{Value, ValueType};

type Cast = fn(&Value) -> Value;

const CASTS: [(&str, Cast); 9] = [
    ("tonull", cast::to_null),
    ("toboolean", cast::to_boolean),
    ("tonumber", cast::to_number),
    ("tostring", cast::to_string),
    ("totext", cast::to_text),
    ("toelement", cast::to_element),
    ("tonodelist", cast::to_node_sequence),
    ("toarray", cast::to_array),
    ("torecord", cast::to_record),
];

pub(crate) fn register_all(registry: &mut Registry) {
    for (tag, cast) in CASTS {
        registry.register(tag, move |name, args| {
            Transformer::new(name, args, move |current, _| Outcome::Replace(cast(current)))
        });
    }
    registry.register("ref", reference);
}

/// `<ref>/path</ref>`: merge the value of the node at a root-relative path.
pub fn reference(name: &str, args: Vec<Value>) -> Transformer {
    let target = match args.first() {
        Some(Value::String(s) | Value::Text(s)) => Ok(s.trim().to_string()),
        other => Err(TagError::ArgType {
            tag: Stem::from_static("ref"),
            position: 0,
            expected: "string",
            found: other.map_or(ValueType::Null, Value::value_type),
        }),
    };

    Transformer::new(name, args, move |_current, hooks| {
        let target = match &target {
            Ok(target) => target,
            Err(error) => return Outcome::Error(error.clone()),
        };
        match hooks.resolve(target) {
            // A transformer read back through a reference would be invoked
            // again by the merge
            Some(Value::Transformer(_)) => Outcome::Error(TagError::invalid(
                "ref",
                format!("`{target}` refers to a transformer"),
            )),
            Some(value) => Outcome::Merge(value),
            None => Outcome::Error(TagError::invalid(
                "ref",
                format!("`{target}` does not resolve to a node"),
            )),
        }
    })
}
