//! The surface the evaluator needs from a host markup tree.

use tagfold_dom::Node;

/// What a host node is, decided once when the tree is wrapped.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HostKind<'h> {
    Element { tag: &'h str },
    Text { content: &'h str },
}

/// A read-only view of a node in the host's markup tree.
///
/// The evaluator never mutates host nodes; every markup value it produces is
/// built fresh from what this trait exposes.
pub trait HostNode {
    fn kind(&self) -> HostKind<'_>;

    fn attribute(&self, name: &str) -> Option<&str>;

    /// Attributes in document order. Empty for text nodes.
    fn attributes(&self) -> impl Iterator<Item = (&str, &str)>;

    /// Children in document order. Empty for text nodes.
    fn children(&self) -> impl Iterator<Item = &Self>;
}

impl HostNode for Node {
    fn kind(&self) -> HostKind<'_> {
        match self {
            Node::Element(e) => HostKind::Element { tag: &e.tag },
            Node::Text(t) => HostKind::Text { content: t },
        }
    }

    fn attribute(&self, name: &str) -> Option<&str> {
        self.as_element().and_then(|e| e.get_attr(name))
    }

    fn attributes(&self) -> impl Iterator<Item = (&str, &str)> {
        self.as_element()
            .into_iter()
            .flat_map(|e| e.attrs.iter().map(|(k, v)| (k.as_str(), v.as_str())))
    }

    fn children(&self) -> impl Iterator<Item = &Self> {
        let children: &[Node] = match self {
            Node::Element(e) => &e.children,
            Node::Text(_) => &[],
        };
        children.iter()
    }
}
