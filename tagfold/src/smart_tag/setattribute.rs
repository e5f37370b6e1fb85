use tagfold_dom::{Element, Node, Stem};

use super::{SmartTag, expect_arity, main_value_error, string_arg};
use crate::error::TagError;
use crate::value::Value;

/// `<setattribute>`: set an attribute on every element of the main value.
pub struct SetAttribute;

impl SmartTag for SetAttribute {
    const NAME: &'static str = "setattribute";
    type Args = (Stem, Stem);

    fn check_main(main: &Value) -> Result<Value, TagError> {
        let accepted = match main {
            Value::Element(_) | Value::NodeList(_) => true,
            Value::Array(items) => items.iter().all(|v| matches!(v, Value::Element(_))),
            _ => false,
        };
        if accepted {
            Ok(main.clone())
        } else {
            Err(main_value_error(
                Self::NAME,
                "element, array of elements or nodelist",
                main,
            ))
        }
    }

    fn check_args(args: &[Value]) -> Result<(Stem, Stem), TagError> {
        expect_arity(Self::NAME, args, 1, 2, "1 or 2")?;
        let name = string_arg(Self::NAME, args, 0)?;
        if name.is_empty() {
            return Err(TagError::invalid(Self::NAME, "attribute name is empty"));
        }
        let value = match args.get(1) {
            Some(_) => string_arg(Self::NAME, args, 1)?,
            None => Stem::new(),
        };
        Ok((name, value))
    }

    fn apply(main: Value, (name, value): (Stem, Stem)) -> Result<Value, TagError> {
        let set = |mut e: Element| {
            e.set_attr(name.clone(), value.clone());
            e
        };
        let result = match main {
            Value::Element(e) => Value::Element(set(e)),
            Value::Array(items) => Value::Array(
                items
                    .into_iter()
                    .map(|v| match v {
                        Value::Element(e) => Value::Element(set(e)),
                        other => other,
                    })
                    .collect(),
            ),
            Value::NodeList(nodes) => Value::NodeList(
                nodes
                    .into_iter()
                    .map(|n| match n {
                        Node::Element(e) => Node::Element(set(e)),
                        text => text,
                    })
                    .collect(),
            ),
            other => other,
        };
        Ok(result)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::smart_tag::run;
    use crate::value::ValueType;

    #[test]
    fn test_sets_on_every_element_in_sequence() {
        let main = Value::NodeList(vec![
            Node::Element(Element::new("li")),
            Node::text(" "),
            Node::Element(Element::new("li")),
        ]);
        let Value::NodeList(nodes) =
            run::<SetAttribute>(&main, &[Value::string("class"), Value::text("item")]).unwrap()
        else {
            panic!("expected nodelist");
        };
        assert_eq!(nodes[0].as_element().unwrap().get_attr("class"), Some("item"));
        assert_eq!(nodes[1], Node::text(" "));
        assert_eq!(nodes[2].as_element().unwrap().get_attr("class"), Some("item"));
    }

    #[test]
    fn test_sets_on_every_element_in_array() {
        let mut first = Element::new("li");
        first.set_attr("class", "old");
        let main = Value::Array(vec![Value::Element(first), Value::Element(Element::new("li"))]);

        let updated = run::<SetAttribute>(&main, &[Value::string("class"), Value::string("x")]).unwrap();
        let items = updated.as_array().expect("array");
        assert_eq!(items.len(), 2);
        for item in items {
            let Value::Element(li) = item else {
                panic!("expected element, got {item:?}");
            };
            assert_eq!(li.to_html(), "<li class=\"x\"></li>");
        }
    }

    #[test]
    fn test_value_defaults_to_empty() {
        let Value::Element(e) =
            run::<SetAttribute>(&Value::Element(Element::new("input")), &[Value::string("disabled")])
                .unwrap()
        else {
            panic!("expected element");
        };
        assert_eq!(e.to_html(), "<input disabled=\"\">");
    }

    #[test]
    fn test_rejects_non_markup_main() {
        let err = run::<SetAttribute>(&Value::from(1), &[Value::string("a")]).unwrap_err();
        assert!(matches!(
            err,
            TagError::MainValue { found: ValueType::Number, .. }
        ));
        let mixed = Value::Array(vec![Value::Element(Element::new("p")), Value::from(1)]);
        assert!(run::<SetAttribute>(&mixed, &[Value::string("a")]).is_err());
    }
}
