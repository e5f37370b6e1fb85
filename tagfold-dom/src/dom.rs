//! Owned element/text trees.
//!
//! Nothing here enforces HTML content models: a `<record>` may hold a `<td>`.
//! The same types carry parsed host documents and the markup values built
//! during evaluation. Everything is owned, so cloning an [`Element`] copies the
//! whole subtree and the copy can be edited without touching its source.
//!
//! ```rust
//! use tagfold_dom::{Element, Node};
//!
//! let mut p = Element::new("p");
//! p.set_attr("class", "lead");
//! p.push_text("Hello");
//! assert_eq!(p.text_content(), "Hello");
//! assert!(Node::from(p).is_element());
//! ```

use indexmap::IndexMap;

use crate::Stem;

/// A child of an element.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Node {
    Element(Element),
    Text(Stem),
}

impl Node {
    pub fn text(content: impl Into<Stem>) -> Self {
        Node::Text(content.into())
    }

    pub fn is_element(&self) -> bool {
        matches!(self, Node::Element(_))
    }

    pub fn is_text(&self) -> bool {
        matches!(self, Node::Text(_))
    }

    pub fn as_element(&self) -> Option<&Element> {
        if let Node::Element(e) = self { Some(e) } else { None }
    }

    pub fn as_text(&self) -> Option<&str> {
        if let Node::Text(t) = self { Some(t) } else { None }
    }

    /// Text made only of whitespace. Empty text counts.
    pub fn is_whitespace(&self) -> bool {
        self.as_text()
            .is_some_and(|t| t.chars().all(char::is_whitespace))
    }

    /// Concatenated text of this node and its descendants.
    pub fn text_content(&self) -> Stem {
        match self {
            Node::Text(t) => t.clone(),
            Node::Element(e) => e.text_content(),
        }
    }
}

impl From<Element> for Node {
    fn from(element: Element) -> Self {
        Node::Element(element)
    }
}

/// A tagged node with ordered attributes and children.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Element {
    /// Tag name as the host wrote it (the HTML parser lowercases)
    pub tag: Stem,
    /// Attributes in source order
    pub attrs: IndexMap<Stem, Stem>,
    pub children: Vec<Node>,
}

impl Element {
    pub fn new(tag: impl Into<Stem>) -> Self {
        Self::with_children(tag, Vec::new())
    }

    pub fn with_children(tag: impl Into<Stem>, children: Vec<Node>) -> Self {
        Self {
            tag: tag.into(),
            attrs: IndexMap::new(),
            children,
        }
    }

    pub fn get_attr(&self, name: &str) -> Option<&str> {
        self.attrs.get(name).map(Stem::as_str)
    }

    /// Overwriting an attribute keeps its position.
    pub fn set_attr(&mut self, name: impl Into<Stem>, value: impl Into<Stem>) {
        self.attrs.insert(name.into(), value.into());
    }

    pub fn remove_attr(&mut self, name: &str) -> Option<Stem> {
        self.attrs.shift_remove(name)
    }

    pub fn push_text(&mut self, text: impl Into<Stem>) {
        self.children.push(Node::Text(text.into()));
    }

    pub fn push_element(&mut self, element: Element) {
        self.children.push(Node::Element(element));
    }

    /// Concatenated text of all descendants, in document order.
    pub fn text_content(&self) -> Stem {
        let mut out = String::new();
        let mut stack: Vec<&Node> = self.children.iter().rev().collect();
        while let Some(node) = stack.pop() {
            match node {
                Node::Text(t) => out.push_str(t),
                Node::Element(e) => stack.extend(e.children.iter().rev()),
            }
        }
        out.into()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn attr_names(elem: &Element) -> Vec<&str> {
        elem.attrs.keys().map(Stem::as_str).collect()
    }

    #[test]
    fn test_attribute_order_is_stable() {
        let mut input = Element::new("input");
        input.set_attr("type", "text");
        input.set_attr("name", "q");
        input.set_attr("value", "");
        input.set_attr("type", "search");
        assert_eq!(input.get_attr("type"), Some("search"));
        assert_eq!(attr_names(&input), ["type", "name", "value"]);

        assert_eq!(input.remove_attr("name"), Some(Stem::from("q")));
        assert_eq!(input.remove_attr("name"), None);
        assert_eq!(attr_names(&input), ["type", "value"]);
    }

    #[test]
    fn test_text_content_in_document_order() {
        let mut em = Element::new("em");
        em.push_text("b");
        let mut span = Element::new("span");
        span.push_element(em);
        span.push_text("c");

        let mut li = Element::new("li");
        li.push_text("a");
        li.push_element(span);
        li.push_text("d");

        assert_eq!(li.text_content(), "abcd");
        assert_eq!(Node::from(Element::new("br")).text_content(), "");
    }

    #[test]
    fn test_clone_is_independent() {
        let mut list = Element::new("ul");
        list.push_element(Element::new("li"));
        let mut copy = list.clone();
        if let Some(Node::Element(li)) = copy.children.first_mut() {
            li.push_text("edited");
        }

        assert_eq!(list.text_content(), "");
        assert_eq!(copy.text_content(), "edited");
    }

    #[test]
    fn test_whitespace_detection() {
        assert!(Node::text("\n  \t").is_whitespace());
        assert!(Node::text("").is_whitespace());
        assert!(!Node::text(" x ").is_whitespace());
        assert!(!Node::from(Element::new("hr")).is_whitespace());
    }
}
