//! The pairwise merge at the heart of the fold.

use crate::cast::{nodes_of, string_of};
use crate::resolve::TreeKey;
use crate::transformer::{Hooks, Outcome};
use crate::value::Value;

/// Merge `incoming` (a child's value under `key`) into the accumulator.
///
/// Branches are tried in order: a transformer incoming edits the accumulator;
/// otherwise the shape of `current` decides. Every pair of variants has an
/// answer, so nothing here degrades to `Null`.
pub fn merge_values(current: &Value, incoming: &Value, key: &TreeKey, hooks: &dyn Hooks) -> Value {
    if let Value::Transformer(transformer) = incoming {
        trace!("merge: invoking transformer <{}> under key {}", transformer.name(), key);
        return settle(current, transformer.invoke(current, hooks), key, hooks);
    }

    match current {
        Value::Array(items) => {
            if key.is_name() {
                current.clone()
            } else {
                let mut items = items.clone();
                items.push(incoming.clone());
                Value::Array(items)
            }
        }

        Value::Null
        | Value::Boolean(_)
        | Value::Number(_)
        | Value::String(_)
        | Value::Text(_)
        | Value::Element(_)
        | Value::Transformer(_) => {
            if incoming.is_markup() {
                let mut nodes = nodes_of(current);
                nodes.extend(nodes_of(incoming));
                Value::NodeList(nodes)
            } else {
                incoming.clone()
            }
        }

        Value::NodeList(nodes) => match incoming {
            Value::Text(_) | Value::Element(_) | Value::NodeList(_) => {
                let mut nodes = nodes.clone();
                nodes.extend(nodes_of(incoming));
                Value::NodeList(nodes)
            }
            Value::Null | Value::Boolean(_) | Value::Number(_) | Value::String(_) => {
                let mut nodes = nodes.clone();
                nodes.push(tagfold_dom::Node::Text(string_of(incoming)));
                Value::NodeList(nodes)
            }
            Value::Array(incoming_items) => {
                let mut items: Vec<Value> = nodes.iter().cloned().map(Value::from_node).collect();
                items.extend(incoming_items.iter().cloned());
                Value::Array(items)
            }
            Value::Record(_) => incoming.clone(),
            // Handled before the match
            Value::Transformer(_) => current.clone(),
        },

        Value::Record(record) => match key {
            TreeKey::Position(_) => current.clone(),
            TreeKey::Name(name) => {
                let mut record = record.clone();
                record.insert(name.clone(), incoming.clone());
                Value::Record(record)
            }
        },
    }
}

/// Apply what a transformer asked for to the accumulator.
fn settle(current: &Value, outcome: Outcome, key: &TreeKey, hooks: &dyn Hooks) -> Value {
    match outcome {
        Outcome::Replace(value) => value,
        Outcome::Merge(value) => hooks.merge(current, &value, key),
        Outcome::None => current.clone(),
        Outcome::Error(error) => {
            hooks.report(&error);
            hooks.merge(current, &error.to_value(), key)
        }
    }
}

#[cfg(test)]
mod tests {
    use std::cell::RefCell;

    use tagfold_dom::{Element, Node};

    use super::*;
    use crate::error::TagError;
    use crate::transformer::{Detached, Transformer};
    use crate::value::{Record, ValueType};

    fn merge(current: &Value, incoming: &Value, key: impl Into<TreeKey>) -> Value {
        merge_values(current, incoming, &key.into(), &Detached)
    }

    fn bold(text: &str) -> Element {
        let mut b = Element::new("b");
        b.push_text(text);
        b
    }

    fn samples() -> Vec<Value> {
        vec![
            Value::Null,
            Value::from(true),
            Value::from(2),
            Value::string("s"),
            Value::text("t"),
            Value::Element(bold("e")),
            Value::NodeList(vec![Node::text("n")]),
            Value::Array(vec![Value::from(1)]),
            Value::record([("k", Value::from(1))]),
            Value::Transformer(Transformer::new("noop", vec![], |_, _| Outcome::None)),
        ]
    }

    /// Result type of every (current, incoming) pair under a positional key.
    #[test]
    fn test_positional_merge_table() {
        use ValueType as V;
        const SCALAR_ROW: [ValueType; 10] = [
            V::Null,
            V::Boolean,
            V::Number,
            V::String,
            V::NodeList,
            V::NodeList,
            V::NodeList,
            V::Array,
            V::Record,
            V::Null,
        ];
        let with_last = |last: ValueType| {
            let mut row = SCALAR_ROW;
            row[9] = last;
            row
        };

        // rows: current; columns: incoming, both in `samples()` order. The
        // last column is a transformer answering `None`, which keeps `current`.
        let expected: [[ValueType; 10]; 10] = [
            SCALAR_ROW,
            with_last(V::Boolean),
            with_last(V::Number),
            with_last(V::String),
            with_last(V::Text),
            with_last(V::Element),
            [
                V::NodeList,
                V::NodeList,
                V::NodeList,
                V::NodeList,
                V::NodeList,
                V::NodeList,
                V::NodeList,
                V::Array,
                V::Record,
                V::NodeList,
            ],
            [V::Array; 10],
            [V::Record; 10],
            with_last(V::Transformer),
        ];

        let values = samples();
        for (row, current) in values.iter().enumerate() {
            for (col, incoming) in values.iter().enumerate() {
                let merged = merge(current, incoming, 0usize);
                assert_eq!(
                    merged.value_type(),
                    expected[row][col],
                    "merge({:?}, {:?})",
                    current.value_type(),
                    incoming.value_type()
                );
            }
        }
    }

    #[test]
    fn test_array_appends_positional_only() {
        let acc = Value::Array(vec![Value::string("a")]);
        assert_eq!(
            merge(&acc, &Value::string("b"), 1usize),
            Value::Array(vec![Value::string("a"), Value::string("b")])
        );
        assert_eq!(merge(&acc, &Value::string("b"), "named"), acc);
    }

    #[test]
    fn test_record_sets_named_only() {
        let acc = Value::Record(Record::new());
        let acc = merge(&acc, &Value::from(4), "x");
        let acc = merge(&acc, &Value::from(9), "y");
        assert_eq!(acc, Value::record([("x", Value::from(4)), ("y", Value::from(9))]));
        assert_eq!(merge(&acc, &Value::from(1), 0usize), acc);
    }

    #[test]
    fn test_scalar_with_markup_concatenates() {
        let merged = merge(&Value::text("a"), &Value::Element(bold("b")), 0usize);
        assert_eq!(
            merged,
            Value::NodeList(vec![Node::text("a"), Node::Element(bold("b"))])
        );
    }

    #[test]
    fn test_node_list_branches() {
        let acc = Value::NodeList(vec![Node::text("a")]);
        assert_eq!(
            merge(&acc, &Value::from(3), 0usize),
            Value::NodeList(vec![Node::text("a"), Node::text("3")])
        );
        assert_eq!(
            merge(&acc, &Value::Array(vec![Value::from(1)]), 0usize),
            Value::Array(vec![Value::text("a"), Value::from(1)])
        );
        let record = Value::record([("k", Value::Null)]);
        assert_eq!(merge(&acc, &record, 0usize), record);
    }

    #[test]
    fn test_transformer_outcomes_settle() {
        let current = Value::Array(vec![Value::from(1)]);
        let replace = Transformer::new("r", vec![], |_, _| Outcome::Replace(Value::from(7)));
        let merge_in = Transformer::new("m", vec![], |_, _| Outcome::Merge(Value::from(2)));
        let failing = Transformer::new("e", vec![], |_, _| {
            Outcome::Error(TagError::invalid("e", "boom"))
        });

        assert_eq!(merge(&current, &Value::Transformer(replace), 0usize), Value::from(7));
        assert_eq!(
            merge(&current, &Value::Transformer(merge_in), 0usize),
            Value::Array(vec![Value::from(1), Value::from(2)])
        );

        let Value::Array(items) = merge(&current, &Value::Transformer(failing), 0usize) else {
            panic!("expected array");
        };
        assert_eq!(items.len(), 2);
        assert_eq!(items[1].as_record().map(|r| r["kind"].clone()), Some(Value::string("invalid")));
    }

    #[test]
    fn test_errors_are_reported_to_hooks() {
        struct Recording(RefCell<Vec<TagError>>);

        impl Hooks for Recording {
            fn resolve(&self, _path: &str) -> Option<Value> {
                None
            }
            fn merge(&self, current: &Value, incoming: &Value, key: &TreeKey) -> Value {
                merge_values(current, incoming, key, self)
            }
            fn report(&self, error: &TagError) {
                self.0.borrow_mut().push(error.clone());
            }
        }

        let hooks = Recording(RefCell::new(Vec::new()));
        let failing = Transformer::new("e", vec![], |_, _| {
            Outcome::Error(TagError::invalid("e", "boom"))
        });
        merge_values(&Value::Null, &Value::Transformer(failing), &TreeKey::Position(0), &hooks);
        assert_eq!(hooks.0.borrow().len(), 1);
    }
}
