use tagfold_dom::{Element, Node, Stem};

use super::{SmartTag, expect_arity, string_arg};
use crate::cast::{nodes_of, string_of};
use crate::error::TagError;
use crate::value::Value;

/// `<setproperty>`: set the value at a dot-separated path inside a clone of
/// the main value.
///
/// Arrays, records, element children and sequence items can be descended
/// into. Strings and texts are addressable by character at the last segment.
pub struct SetProperty;

pub struct SetPropertyArgs {
    path: Stem,
    value: Value,
}

impl SmartTag for SetProperty {
    const NAME: &'static str = "setproperty";
    type Args = SetPropertyArgs;

    fn check_args(args: &[Value]) -> Result<SetPropertyArgs, TagError> {
        expect_arity(Self::NAME, args, 2, 2, "2")?;
        let path = string_arg(Self::NAME, args, 0)?;
        if path.is_empty() {
            return Err(TagError::invalid(Self::NAME, "property path is empty"));
        }
        Ok(SetPropertyArgs {
            path,
            value: args[1].clone(),
        })
    }

    fn apply(main: Value, args: SetPropertyArgs) -> Result<Value, TagError> {
        let segments: Vec<&str> = args.path.split('.').collect();
        let walk = Walk {
            segments: &segments,
            value: &args.value,
        };
        walk.set(&main, 0)
    }
}

struct Walk<'p> {
    segments: &'p [&'p str],
    value: &'p Value,
}

impl Walk<'_> {
    fn set(&self, target: &Value, depth: usize) -> Result<Value, TagError> {
        let segment = self.segments[depth];
        let last = depth + 1 == self.segments.len();

        match target {
            Value::Array(items) => {
                let index = self.index(segment, depth, items.len())?;
                let mut items = items.clone();
                if last {
                    if index == items.len() {
                        items.push(self.value.clone());
                    } else {
                        items[index] = self.value.clone();
                    }
                } else {
                    let child = self.existing(&items, index, depth)?;
                    let updated = self.set(child, depth + 1)?;
                    items[index] = updated;
                }
                Ok(Value::Array(items))
            }

            Value::Record(record) => {
                let mut record = record.clone();
                if last {
                    record.insert(Stem::from(segment), self.value.clone());
                } else {
                    let child = record.get(segment).ok_or_else(|| TagError::MissingKey {
                        tag: Stem::from_static(SetProperty::NAME),
                        path: self.walked(depth),
                        key: segment.to_string(),
                    })?;
                    let updated = self.set(child, depth + 1)?;
                    record.insert(Stem::from(segment), updated);
                }
                Ok(Value::Record(record))
            }

            Value::Element(element) => {
                let children = self.splice(&element.children, segment, depth, last)?;
                Ok(Value::Element(Element {
                    tag: element.tag.clone(),
                    attrs: element.attrs.clone(),
                    children,
                }))
            }

            Value::NodeList(nodes) => Ok(Value::NodeList(self.splice(nodes, segment, depth, last)?)),

            Value::Text(t) if last => Ok(Value::Text(self.splice_chars(t, segment, depth)?)),
            Value::String(s) if last => Ok(Value::String(self.splice_chars(s, segment, depth)?)),

            other => Err(TagError::NotTraversable {
                tag: Stem::from_static(SetProperty::NAME),
                path: self.walked(depth),
                found: other.value_type(),
            }),
        }
    }

    /// Child-level splice: the addressed child is replaced by the node
    /// sequence of the new value, or the sequence is appended at the end.
    fn splice(&self, nodes: &[Node], segment: &str, depth: usize, last: bool) -> Result<Vec<Node>, TagError> {
        let index = self.index(segment, depth, nodes.len())?;
        let replacement = if last {
            nodes_of(self.value)
        } else {
            let child = self.existing(nodes, index, depth)?;
            nodes_of(&self.set(&Value::from_node(child.clone()), depth + 1)?)
        };

        let mut out = Vec::with_capacity(nodes.len() + replacement.len());
        out.extend_from_slice(&nodes[..index]);
        out.extend(replacement);
        if index < nodes.len() {
            out.extend_from_slice(&nodes[index + 1..]);
        }
        Ok(out)
    }

    fn splice_chars(&self, s: &str, segment: &str, depth: usize) -> Result<Stem, TagError> {
        let len = s.chars().count();
        let index = self.index(segment, depth, len)?;
        let mut out: String = s.chars().take(index).collect();
        out.push_str(&string_of(self.value));
        out.extend(s.chars().skip(index + 1));
        Ok(Stem::from(out))
    }

    /// Parse a numeric segment; `len` itself is allowed (append position).
    fn index(&self, segment: &str, depth: usize, len: usize) -> Result<usize, TagError> {
        let index = segment.parse::<usize>().map_err(|_| TagError::NotNumeric {
            tag: Stem::from_static(SetProperty::NAME),
            path: self.walked(depth),
            segment: segment.to_string(),
        })?;
        if index > len {
            return Err(self.out_of_range(index, len, depth));
        }
        Ok(index)
    }

    /// An interior segment must address an existing item.
    fn existing<'t, T>(&self, items: &'t [T], index: usize, depth: usize) -> Result<&'t T, TagError> {
        items
            .get(index)
            .ok_or_else(|| self.out_of_range(index, items.len(), depth))
    }

    fn out_of_range(&self, index: usize, len: usize, depth: usize) -> TagError {
        TagError::OutOfRange {
            tag: Stem::from_static(SetProperty::NAME),
            path: self.walked(depth),
            index,
            len,
        }
    }

    fn walked(&self, depth: usize) -> String {
        self.segments[..=depth].join(".")
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::smart_tag::run;
    use crate::transformer::{Outcome, Transformer};
    use crate::value::ValueType;

    fn set(main: &Value, path: &str, value: Value) -> Result<Value, TagError> {
        run::<SetProperty>(main, &[Value::string(path), value])
    }

    fn numbers() -> Value {
        Value::Array(vec![Value::from(1), Value::from(2), Value::from(3)])
    }

    #[test]
    fn test_array_append_and_out_of_range() {
        assert_eq!(
            set(&numbers(), "3", Value::from(4)).unwrap(),
            Value::Array(vec![Value::from(1), Value::from(2), Value::from(3), Value::from(4)])
        );
        assert_eq!(
            set(&numbers(), "5", Value::from(4)).unwrap_err(),
            TagError::OutOfRange {
                tag: Stem::from("setproperty"),
                path: "5".to_string(),
                index: 5,
                len: 3,
            }
        );
        assert_eq!(
            set(&numbers(), "0", Value::Null).unwrap(),
            Value::Array(vec![Value::Null, Value::from(2), Value::from(3)])
        );
    }

    #[test]
    fn test_nested_record_path() {
        let main = Value::record([("a", Value::record([("list", numbers())]))]);
        let updated = set(&main, "a.list.1", Value::string("two")).unwrap();
        assert_eq!(
            updated,
            Value::record([(
                "a",
                Value::record([(
                    "list",
                    Value::Array(vec![Value::from(1), Value::string("two"), Value::from(3)])
                )])
            )])
        );

        assert!(matches!(
            set(&main, "b.x", Value::Null),
            Err(TagError::MissingKey { .. })
        ));
        assert!(matches!(
            set(&main, "a.list.x", Value::Null),
            Err(TagError::NotNumeric { .. })
        ));
    }

    #[test]
    fn test_record_key_at_last_segment() {
        let main = Value::record([("a", Value::from(1))]);
        let added = set(&main, "b", Value::from(2)).unwrap();
        assert_eq!(added, Value::record([("a", Value::from(1)), ("b", Value::from(2))]));

        let replaced = set(&added, "a", Value::string("one")).unwrap();
        let record = replaced.as_record().expect("record");
        let keys: Vec<&str> = record.keys().map(Stem::as_str).collect();
        assert_eq!(keys, ["a", "b"]);
        assert_eq!(record["a"], Value::string("one"));
    }

    #[test]
    fn test_node_list_items() {
        let main = Value::NodeList(vec![Node::text("a"), Node::text("b")]);
        assert_eq!(
            set(&main, "2", Value::text("c")).unwrap(),
            Value::NodeList(vec![Node::text("a"), Node::text("b"), Node::text("c")])
        );
        assert_eq!(
            set(&main, "0", Value::Element(Element::new("hr"))).unwrap(),
            Value::NodeList(vec![Node::Element(Element::new("hr")), Node::text("b")])
        );
        assert_eq!(
            set(&main, "1", Value::from(7)).unwrap(),
            Value::NodeList(vec![Node::text("a"), Node::text("7")])
        );
        assert_eq!(
            set(&main, "3", Value::Null).unwrap_err(),
            TagError::OutOfRange {
                tag: Stem::from("setproperty"),
                path: "3".to_string(),
                index: 3,
                len: 2,
            }
        );
    }

    #[test]
    fn test_cannot_descend_into_scalars() {
        let noop = Transformer::new("noop", vec![], |_, _| Outcome::None);
        let main = Value::record([
            ("n", Value::from(1)),
            ("s", Value::string("str")),
            ("b", Value::from(true)),
            ("z", Value::Null),
            ("t", Value::Transformer(noop)),
        ]);
        let cases = [
            ("n", ValueType::Number),
            ("s", ValueType::String),
            ("b", ValueType::Boolean),
            ("z", ValueType::Null),
            ("t", ValueType::Transformer),
        ];
        for (key, found) in cases {
            assert_eq!(
                set(&main, &format!("{key}.0.0"), Value::Null).unwrap_err(),
                TagError::NotTraversable {
                    tag: Stem::from("setproperty"),
                    path: format!("{key}.0"),
                    found,
                },
                "{key}"
            );
        }
    }

    #[test]
    fn test_element_child_splice() {
        let mut ul = Element::new("ul");
        ul.push_element(Element::new("li"));
        ul.push_element(Element::new("li"));
        let replacement = Value::NodeList(vec![Node::text("a"), Node::text("b")]);

        let Value::Element(ul) = set(&Value::Element(ul), "0", replacement).unwrap() else {
            panic!("expected element");
        };
        assert_eq!(ul.to_html(), "<ul>ab<li></li></ul>");
    }

    #[test]
    fn test_text_character_splice() {
        assert_eq!(
            set(&Value::text("cat"), "0", Value::string("b")).unwrap(),
            Value::text("bat")
        );
        assert_eq!(
            set(&Value::string("cat"), "3", Value::string("s")).unwrap(),
            Value::string("cats")
        );

        let mut p = Element::new("p");
        p.push_text("cat");
        let Value::Element(p) = set(&Value::Element(p), "0.2", Value::string("r")).unwrap() else {
            panic!("expected element");
        };
        assert_eq!(p.children, vec![Node::text("car")]);
    }

    #[test]
    fn test_empty_path_rejected() {
        assert!(matches!(
            set(&numbers(), "", Value::Null),
            Err(TagError::Invalid { .. })
        ));
    }
}
