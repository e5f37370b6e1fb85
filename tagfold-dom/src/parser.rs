//! HTML parsing through html5ever's tree builder.
//!
//! The sink keeps a flat arena of slots while html5ever runs its insertion
//! modes (including error recovery), then converts `<body>` into the owned
//! DOM. Comments, processing instructions and the doctype are dropped.
//! Adjacent text is merged the way a browser does.

use std::borrow::Cow;
use std::cell::RefCell;
use std::rc::Rc;

use html5ever::tendril::TendrilSink;
use html5ever::tree_builder::{ElementFlags, NodeOrText, QuirksMode, TreeSink};
use html5ever::{Attribute, ExpandedName, LocalName, Namespace, QualName, parse_document};
use tendril::StrTendril;

use crate::Stem;
use crate::dom::{Element, Node};

/// Parse an HTML string and return its `<body>` element.
///
/// The tokenizer lowercases tag and attribute names. Attribute order is kept,
/// and the first of two duplicate attributes wins.
///
/// ```rust
/// use tagfold_dom::parse_body;
///
/// let body = parse_body("<record><number _name=\"x\">4</number></record>");
/// assert_eq!(body.tag, "body");
/// assert_eq!(body.children.len(), 1);
/// ```
pub fn parse_body(html: &str) -> Element {
    // Opening <body> ourselves keeps leading whitespace, which the
    // "before html" insertion mode would otherwise discard
    let source = format!("<body>{html}");
    parse_document(Arena::default(), Default::default())
        .one(StrTendril::from(source))
        .into_body()
}

/// Parse an HTML fragment into the nodes found inside `<body>`.
pub fn parse_fragment(html: &str) -> Vec<Node> {
    parse_body(html).children
}

/// Arena index plus the element name, so `elem_name` can lend from the handle.
#[derive(Clone, Debug)]
struct Handle {
    index: usize,
    name: Rc<QualName>,
}

#[derive(Debug)]
enum Content {
    Document,
    Element(Vec<(Stem, Stem)>),
    Text(String),
    /// Comments and processing instructions
    Skipped,
}

#[derive(Debug)]
struct Slot {
    name: Rc<QualName>,
    content: Content,
    parent: Option<usize>,
    children: Vec<usize>,
}

#[derive(Default)]
struct Arena {
    slots: RefCell<Vec<Slot>>,
}

fn anonymous() -> Rc<QualName> {
    Rc::new(QualName::new(None, Namespace::from(""), LocalName::from("")))
}

fn push_attrs(into: &mut Vec<(Stem, Stem)>, attrs: Vec<Attribute>) {
    for attr in attrs {
        let name = Stem::from(attr.name.local.as_ref());
        if into.iter().all(|(existing, _)| *existing != name) {
            into.push((name, Stem::from(&attr.value)));
        }
    }
}

impl Arena {
    fn push(&self, name: Rc<QualName>, content: Content) -> Handle {
        let mut slots = self.slots.borrow_mut();
        slots.push(Slot {
            name: name.clone(),
            content,
            parent: None,
            children: Vec::new(),
        });
        Handle {
            index: slots.len() - 1,
            name,
        }
    }

    /// Insert under `parent` before `before`, or last when `before` is None.
    /// Text landing right after a text sibling is appended to it.
    fn insert(&self, parent: usize, before: Option<usize>, child: NodeOrText<Handle>) {
        let mut slots = self.slots.borrow_mut();
        let siblings = &slots[parent].children;
        let at = before
            .and_then(|b| siblings.iter().position(|&c| c == b))
            .unwrap_or(siblings.len());

        let index = match child {
            NodeOrText::AppendNode(node) => {
                detach(&mut slots, node.index);
                node.index
            }
            NodeOrText::AppendText(text) => {
                let previous = at.checked_sub(1).map(|i| slots[parent].children[i]);
                if let Some(previous) = previous
                    && let Content::Text(existing) = &mut slots[previous].content
                {
                    existing.push_str(&text);
                    return;
                }
                slots.push(Slot {
                    name: anonymous(),
                    content: Content::Text(text.to_string()),
                    parent: None,
                    children: Vec::new(),
                });
                slots.len() - 1
            }
        };

        // Detaching may have shifted the target position
        let siblings = &slots[parent].children;
        let at = before
            .and_then(|b| siblings.iter().position(|&c| c == b))
            .unwrap_or(siblings.len());
        slots[parent].children.insert(at, index);
        slots[index].parent = Some(parent);
    }

    fn into_body(self) -> Element {
        let slots = self.slots.into_inner();
        let is = |index: usize, tag: &str| {
            matches!(slots[index].content, Content::Element(_)) && &*slots[index].name.local == tag
        };

        let body = slots
            .first()
            .into_iter()
            .flat_map(|doc| doc.children.iter().copied())
            .filter(|&c| is(c, "html"))
            .flat_map(|html| slots[html].children.iter().copied())
            .find(|&c| is(c, "body"));

        match body {
            Some(body) => build(&slots, body),
            None => Element::new("body"),
        }
    }
}

fn detach(slots: &mut [Slot], index: usize) {
    if let Some(parent) = slots[index].parent.take() {
        slots[parent].children.retain(|&c| c != index);
    }
}

fn build(slots: &[Slot], index: usize) -> Element {
    let slot = &slots[index];
    let mut element = Element::new(Stem::from(slot.name.local.as_ref()));
    if let Content::Element(attrs) = &slot.content {
        element.attrs = attrs.iter().cloned().collect();
    }
    element.children = slot
        .children
        .iter()
        .filter_map(|&child| match &slots[child].content {
            Content::Element(_) => Some(Node::Element(build(slots, child))),
            Content::Text(text) => Some(Node::text(text.as_str())),
            Content::Document | Content::Skipped => None,
        })
        .collect();
    element
}

impl TreeSink for Arena {
    type Handle = Handle;
    type Output = Self;
    type ElemName<'a>
        = ExpandedName<'a>
    where
        Self: 'a;

    fn finish(self) -> Self {
        self
    }

    fn parse_error(&self, _msg: Cow<'static, str>) {
        trace!("recovered from html parse error: {}", _msg);
    }

    fn get_document(&self) -> Handle {
        // The document is always the first slot
        let existing = self.slots.borrow().first().map(|doc| doc.name.clone());
        match existing {
            Some(name) => Handle { index: 0, name },
            None => self.push(anonymous(), Content::Document),
        }
    }

    fn elem_name<'a>(&'a self, target: &'a Handle) -> ExpandedName<'a> {
        target.name.expanded()
    }

    fn create_element(&self, name: QualName, attrs: Vec<Attribute>, _: ElementFlags) -> Handle {
        let mut kept = Vec::with_capacity(attrs.len());
        push_attrs(&mut kept, attrs);
        self.push(Rc::new(name), Content::Element(kept))
    }

    fn create_comment(&self, _text: StrTendril) -> Handle {
        self.push(anonymous(), Content::Skipped)
    }

    fn create_pi(&self, _target: StrTendril, _data: StrTendril) -> Handle {
        self.push(anonymous(), Content::Skipped)
    }

    fn append(&self, parent: &Handle, child: NodeOrText<Handle>) {
        self.insert(parent.index, None, child);
    }

    fn append_before_sibling(&self, sibling: &Handle, child: NodeOrText<Handle>) {
        let parent = self.slots.borrow()[sibling.index].parent;
        if let Some(parent) = parent {
            self.insert(parent, Some(sibling.index), child);
        }
    }

    fn append_based_on_parent_node(
        &self,
        element: &Handle,
        prev_element: &Handle,
        child: NodeOrText<Handle>,
    ) {
        let attached = self.slots.borrow()[element.index].parent.is_some();
        if attached {
            self.append_before_sibling(element, child);
        } else {
            self.append(prev_element, child);
        }
    }

    fn append_doctype_to_document(&self, _: StrTendril, _: StrTendril, _: StrTendril) {}

    fn get_template_contents(&self, target: &Handle) -> Handle {
        target.clone()
    }

    fn same_node(&self, x: &Handle, y: &Handle) -> bool {
        x.index == y.index
    }

    fn set_quirks_mode(&self, _mode: QuirksMode) {}

    fn add_attrs_if_missing(&self, target: &Handle, attrs: Vec<Attribute>) {
        if let Content::Element(existing) = &mut self.slots.borrow_mut()[target.index].content {
            push_attrs(existing, attrs);
        }
    }

    fn remove_from_parent(&self, target: &Handle) {
        detach(&mut self.slots.borrow_mut(), target.index);
    }

    fn reparent_children(&self, node: &Handle, new_parent: &Handle) {
        let mut slots = self.slots.borrow_mut();
        let moved = std::mem::take(&mut slots[node.index].children);
        for &child in &moved {
            slots[child].parent = Some(new_parent.index);
        }
        slots[new_parent.index].children.extend(moved);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn first_element(html: &str) -> Element {
        parse_fragment(html)
            .into_iter()
            .find_map(|n| match n {
                Node::Element(e) => Some(e),
                Node::Text(_) => None,
            })
            .unwrap()
    }

    #[test]
    fn test_tags_and_attributes_are_lowercased() {
        let record = first_element("<RECORD><Number _NAME=\"x\">4</Number></RECORD>");
        assert_eq!(record.tag, "record");
        let number = record.children[0].as_element().unwrap();
        assert_eq!(number.tag, "number");
        assert_eq!(number.get_attr("_name"), Some("x"));
        assert_eq!(number.text_content(), "4");
    }

    #[test]
    fn test_leading_whitespace_survives() {
        let nodes = parse_fragment("\n  <b>x</b>");
        assert_eq!(nodes.len(), 2);
        assert_eq!(nodes[0].as_text(), Some("\n  "));
    }

    #[test]
    fn test_comments_vanish_and_text_stays() {
        let nodes = parse_fragment("a<!-- note -->b<?pi x?>c");
        assert!(nodes.iter().all(Node::is_text));
        let text: String = nodes.iter().map(|n| n.text_content().to_string()).collect();
        assert_eq!(text, "abc");
    }

    #[test]
    fn test_first_duplicate_attribute_wins() {
        let div = first_element("<div class=\"a\" id=\"i\" class=\"b\"></div>");
        assert_eq!(div.get_attr("class"), Some("a"));
        let names: Vec<&str> = div.attrs.keys().map(Stem::as_str).collect();
        assert_eq!(names, ["class", "id"]);
    }

    #[test]
    fn test_foster_parented_text_merges() {
        // Text inside <table> outside a cell is moved before the table
        let nodes = parse_fragment("x<table>y<tr><td>z</td></tr></table>");
        assert_eq!(nodes[0].as_text(), Some("xy"));
        let table = nodes[1].as_element().unwrap();
        assert_eq!(table.tag, "table");
        assert_eq!(table.text_content(), "z");
    }
}
