//! Wrapping a host tree and folding it into values.
//!
//! [`Tree::new`] walks the host once and records, per node, its key, path,
//! type and ordered subtree map in an [`indextree`] arena. Nothing about the
//! structure changes afterwards. [`Tree::evaluate`] folds bottom-up and
//! memoizes each node's result in its serialized form.

use std::cell::{Cell, RefCell};

use indexmap::IndexMap;
use indextree::{Arena, NodeId};
use tagfold_dom::{Element, Stem};

use crate::cast::{cast_to, nodes_of};
use crate::error::{EvalError, TagError};
use crate::host::{HostKind, HostNode};
use crate::merge::merge_values;
use crate::options::EvalOptions;
use crate::registry::Registry;
use crate::resolve::{TreeKey, TreePath, segment_keys, split_path};
use crate::serializer::{Serialized, deserialize, serialize};
use crate::transformer::Hooks;
use crate::value::{Value, ValueType};

struct TreeNode<'a, H> {
    host: &'a H,
    /// Normalized tag name; `None` for text nodes
    tag: Option<Stem>,
    name: Option<Stem>,
    /// `None` for the root
    key: Option<TreeKey>,
    path: TreePath,
    node_type: ValueType,
    subtrees: IndexMap<TreeKey, NodeId>,
    cache: RefCell<Option<Serialized>>,
    evaluating: Cell<bool>,
}

/// A host tree wrapped for evaluation.
///
/// A `Tree` is not `Sync`: evaluation fills per-node caches through shared
/// references, so concurrent evaluation of one tree is ruled out by the type.
pub struct Tree<'a, H> {
    arena: Arena<TreeNode<'a, H>>,
    root: NodeId,
    registry: &'a Registry,
    options: EvalOptions,
    errors: RefCell<Vec<EvalError>>,
}

impl<'a, H: HostNode> Tree<'a, H> {
    pub fn new(host: &'a H, registry: &'a Registry) -> Self {
        Self::with_options(host, registry, EvalOptions::default())
    }

    pub fn with_options(host: &'a H, registry: &'a Registry, options: EvalOptions) -> Self {
        let mut builder = Builder {
            arena: Arena::new(),
            registry,
            options: &options,
        };
        let root = builder.build(host, None, TreePath::root());
        let arena = builder.arena;
        debug!("wrapped tree with {} nodes", arena.count());

        Self {
            arena,
            root,
            registry,
            options,
            errors: RefCell::new(Vec::new()),
        }
    }

    pub fn root(&self) -> NodeId {
        self.root
    }

    pub fn options(&self) -> &EvalOptions {
        &self.options
    }

    /// Evaluate the root node.
    pub fn evaluate(&self) -> Result<Value, EvalError> {
        self.evaluate_node(self.root)
    }

    /// Evaluate any node of this tree.
    ///
    /// In lax mode this never fails. In strict mode the first problem met
    /// while computing the value is returned instead.
    pub fn evaluate_node(&self, id: NodeId) -> Result<Value, EvalError> {
        self.errors.borrow_mut().clear();
        let value = self.value_of(id);
        if self.options.strict
            && let Some(first) = self.errors.borrow().first()
        {
            return Err(first.clone());
        }
        Ok(value)
    }

    /// Problems recorded during the last evaluation, in the order met.
    pub fn errors(&self) -> Vec<EvalError> {
        self.errors.borrow().clone()
    }

    /// Drop every cached value, for hosts that changed the source tree.
    pub fn invalidate(&self) {
        for node in self.arena.iter().filter(|n| !n.is_removed()) {
            node.get().cache.borrow_mut().take();
        }
    }

    pub fn is_cached(&self, id: NodeId) -> bool {
        self.node(id).cache.borrow().is_some()
    }

    pub fn host(&self, id: NodeId) -> &'a H {
        self.node(id).host
    }

    pub fn path(&self, id: NodeId) -> &TreePath {
        &self.node(id).path
    }

    pub fn node_type(&self, id: NodeId) -> ValueType {
        self.node(id).node_type
    }

    pub fn key(&self, id: NodeId) -> Option<&TreeKey> {
        self.node(id).key.as_ref()
    }

    /// The declared name, if the node carries the reserved name attribute.
    pub fn name(&self, id: NodeId) -> Option<&str> {
        self.node(id).name.as_deref()
    }

    pub fn parent(&self, id: NodeId) -> Option<NodeId> {
        self.arena.get(id).and_then(|n| n.parent())
    }

    /// Children in fold order: positional keys, then names.
    pub fn subtrees(&self, id: NodeId) -> impl Iterator<Item = (&TreeKey, NodeId)> + '_ {
        self.node(id).subtrees.iter().map(|(k, v)| (k, *v))
    }

    /// Find the node at a root-relative path such as `/0/title`.
    pub fn resolve(&self, path: &str) -> Option<NodeId> {
        let mut current = self.root;
        for segment in split_path(path) {
            let subtrees = &self.node(current).subtrees;
            current = segment_keys(segment)
                .iter()
                .find_map(|key| subtrees.get(key).copied())?;
        }
        Some(current)
    }

    fn node(&self, id: NodeId) -> &TreeNode<'a, H> {
        self.arena[id].get()
    }

    fn record(&self, error: EvalError) {
        warn!("{}", error);
        self.errors.borrow_mut().push(error);
    }

    /// Cache hit, or seed → fold → own cast → cache.
    fn value_of(&self, id: NodeId) -> Value {
        let node = self.node(id);
        if let Some(cached) = node.cache.borrow().as_ref() {
            trace!("cache hit at {}", node.path);
            return deserialize(cached);
        }
        if node.evaluating.get() {
            self.record(EvalError::Cycle {
                path: node.path.to_string(),
            });
            return Value::Null;
        }

        let errors_before = self.errors.borrow().len();
        node.evaluating.set(true);
        let value = self.compute(id, node);
        node.evaluating.set(false);

        let clean = self.errors.borrow().len() == errors_before;
        if node.node_type != ValueType::Transformer && (clean || !self.options.strict) {
            let serialized = serialize(&value);
            if !serialized.contains_opaque() {
                *node.cache.borrow_mut() = Some(serialized);
            }
        }
        value
    }

    fn compute(&self, id: NodeId, node: &TreeNode<'a, H>) -> Value {
        let hooks = TreeHooks { tree: self, origin: id };
        let scalar_seed = matches!(
            node.node_type,
            ValueType::Null
                | ValueType::Boolean
                | ValueType::Number
                | ValueType::String
                | ValueType::Text
        );

        let mut acc = self.seed(node);
        for (i, (key, &child)) in node.subtrees.iter().enumerate() {
            let incoming = self.value_of(child);
            acc = if i == 0 && scalar_seed && incoming.is_markup() {
                incoming
            } else {
                merge_values(&acc, &incoming, key, &hooks)
            };
        }

        match node.node_type {
            ValueType::Element => Value::Element(self.rewrap(node, &acc)),
            ValueType::Transformer => self.generate(node, acc),
            other => cast_to(other, &acc).unwrap_or(acc),
        }
    }

    fn seed(&self, node: &TreeNode<'a, H>) -> Value {
        match node.node_type {
            ValueType::Null => Value::Null,
            ValueType::Boolean => Value::Boolean(false),
            ValueType::Number => Value::Number(0.0),
            ValueType::String => Value::String(Stem::new()),
            ValueType::Text => match node.host.kind() {
                HostKind::Text { content } => Value::text(content),
                HostKind::Element { .. } => Value::Text(Stem::new()),
            },
            ValueType::Element | ValueType::NodeList => Value::NodeList(Vec::new()),
            ValueType::Array | ValueType::Transformer => Value::Array(Vec::new()),
            ValueType::Record => Value::Record(Default::default()),
        }
    }

    /// A fresh copy of the host element around the folded content.
    fn rewrap(&self, node: &TreeNode<'a, H>, acc: &Value) -> Element {
        let tag = match node.host.kind() {
            HostKind::Element { tag } => tag,
            HostKind::Text { .. } => "",
        };
        let mut element = Element::new(tag);
        for (name, value) in node.host.attributes() {
            if name != self.options.name_attribute.as_str() {
                element.set_attr(name, value);
            }
        }
        element.children = nodes_of(acc);
        element
    }

    fn generate(&self, node: &TreeNode<'a, H>, acc: Value) -> Value {
        let tag = node.tag.as_deref().unwrap_or_default();
        let Some(generator) = self.registry.get(tag) else {
            self.record(EvalError::UnknownTransformer {
                path: node.path.to_string(),
                tag: Stem::from(tag),
            });
            return Value::Null;
        };

        let invocation = match &node.key {
            Some(key) => key.to_string(),
            None => tag.to_string(),
        };
        let args = match acc {
            Value::Array(items) => items,
            other => vec![other],
        };
        trace!("generating <{}> as {} with {} args", tag, invocation, args.len());
        Value::Transformer(generator(&invocation, args))
    }
}

/// The services a transformer sees while it runs inside this tree's fold.
struct TreeHooks<'t, 'a, H> {
    tree: &'t Tree<'a, H>,
    /// Node whose fold invoked the transformer
    origin: NodeId,
}

impl<H: HostNode> Hooks for TreeHooks<'_, '_, H> {
    fn resolve(&self, path: &str) -> Option<Value> {
        match self.tree.resolve(path) {
            Some(id) => Some(self.tree.value_of(id)),
            None => {
                self.tree.record(EvalError::Unresolved {
                    path: self.tree.path(self.origin).to_string(),
                    target: path.to_string(),
                });
                None
            }
        }
    }

    fn merge(&self, current: &Value, incoming: &Value, key: &TreeKey) -> Value {
        merge_values(current, incoming, key, self)
    }

    fn report(&self, error: &TagError) {
        self.tree.record(EvalError::Transformer {
            path: self.tree.path(self.origin).to_string(),
            source: error.clone(),
        });
    }
}

struct Builder<'a, 'o, H> {
    arena: Arena<TreeNode<'a, H>>,
    registry: &'a Registry,
    options: &'o EvalOptions,
}

impl<'a, H: HostNode> Builder<'a, '_, H> {
    fn build(&mut self, host: &'a H, key: Option<TreeKey>, path: TreePath) -> NodeId {
        let (tag, node_type) = match host.kind() {
            HostKind::Element { tag } => {
                let tag = Stem::from(tag).to_ascii_lowercase();
                let node_type = self.classify(&tag);
                (Some(tag), node_type)
            }
            HostKind::Text { .. } => (None, ValueType::Text),
        };
        let name = match &key {
            Some(TreeKey::Name(name)) => Some(name.clone()),
            Some(TreeKey::Position(_)) => None,
            None => self.declared_name(host),
        };

        let id = self.arena.new_node(TreeNode {
            host,
            tag,
            name,
            key,
            path: path.clone(),
            node_type,
            subtrees: IndexMap::new(),
            cache: RefCell::new(None),
            evaluating: Cell::new(false),
        });

        let subtrees = self.build_subtrees(id, host, &path);
        self.arena[id].get_mut().subtrees = subtrees;
        id
    }

    /// Typer vocabulary first, then registered transformers, then element.
    fn classify(&self, tag: &str) -> ValueType {
        if let Some(typer) = ValueType::from_typer_tag(tag) {
            typer
        } else if self.registry.contains(tag) {
            ValueType::Transformer
        } else {
            ValueType::Element
        }
    }

    fn declared_name(&self, host: &H) -> Option<Stem> {
        let name = host.attribute(&self.options.name_attribute)?;
        if name.is_empty() {
            warn!(
                "empty `{}` attribute ignored; child stays positional",
                self.options.name_attribute
            );
            return None;
        }
        Some(Stem::from(name))
    }

    fn build_subtrees(&mut self, parent: NodeId, host: &'a H, path: &TreePath) -> IndexMap<TreeKey, NodeId> {
        let children: Vec<&'a H> = host.children().collect();
        let has_elements = children
            .iter()
            .any(|c| matches!(c.kind(), HostKind::Element { .. }));

        let mut positional = Vec::new();
        let mut named: IndexMap<TreeKey, NodeId> = IndexMap::new();
        for child in children {
            let name = match child.kind() {
                HostKind::Text { content } => {
                    if has_elements && content.chars().all(char::is_whitespace) {
                        continue;
                    }
                    None
                }
                HostKind::Element { .. } => self.declared_name(child),
            };

            let key = match name {
                Some(name) => TreeKey::Name(name),
                None => TreeKey::Position(positional.len()),
            };
            let id = self.build(child, Some(key.clone()), path.child(key.clone()));
            parent.append(id, &mut self.arena);

            match key {
                TreeKey::Position(_) => positional.push((key, id)),
                TreeKey::Name(_) => {
                    if let Some(replaced) = named.insert(key, id) {
                        warn!("duplicate name under {}; the later child wins", path);
                        replaced.remove_subtree(&mut self.arena);
                    }
                }
            }
        }

        positional.into_iter().chain(named).collect()
    }
}

#[cfg(test)]
mod tests {
    use tagfold_dom::{Node, parse_fragment};

    use super::*;

    fn first_element(source: &str) -> Node {
        parse_fragment(source)
            .into_iter()
            .find(Node::is_element)
            .expect("fixture has an element")
    }

    #[test]
    fn test_keys_positional_then_named() {
        let host = first_element("<record>a<b _name=\"x\"></b><i></i><u _name=\"y\"></u></record>");
        let registry = Registry::new();
        let tree = Tree::new(&host, &registry);

        let keys: Vec<String> = tree
            .subtrees(tree.root())
            .map(|(k, _)| k.to_string())
            .collect();
        assert_eq!(keys, ["0", "1", "x", "y"]);
    }

    #[test]
    fn test_whitespace_siblings_dropped() {
        let host = first_element("<array>\n  <number>1</number>\n  <number>2</number>\n</array>");
        let registry = Registry::new();
        let tree = Tree::new(&host, &registry);
        assert_eq!(tree.subtrees(tree.root()).count(), 2);

        let lone = first_element("<text>   </text>");
        let tree = Tree::new(&lone, &registry);
        assert_eq!(tree.subtrees(tree.root()).count(), 1);
    }

    #[test]
    fn test_classification() {
        let host = first_element(
            "<div><number>1</number><replace></replace><span></span>text</div>",
        );
        let registry = Registry::with_builtins();
        let tree = Tree::new(&host, &registry);

        let types: Vec<ValueType> = tree
            .subtrees(tree.root())
            .map(|(_, id)| tree.node_type(id))
            .collect();
        assert_eq!(
            types,
            [
                ValueType::Number,
                ValueType::Transformer,
                ValueType::Element,
                ValueType::Text
            ]
        );
        assert_eq!(tree.node_type(tree.root()), ValueType::Element);

        // Without the registration the same tag is a plain element
        let bare = Registry::new();
        let tree = Tree::new(&host, &bare);
        let (_, replace) = tree.subtrees(tree.root()).nth(1).unwrap();
        assert_eq!(tree.node_type(replace), ValueType::Element);
    }

    #[test]
    fn test_paths_and_resolve() {
        let host = first_element(
            "<record><array _name=\"list\"><string>a</string><string>b</string></array></record>",
        );
        let registry = Registry::new();
        let tree = Tree::new(&host, &registry);

        let b = tree.resolve("/list/1").unwrap();
        assert_eq!(tree.path(b).to_string(), "/list/1");
        assert_eq!(tree.key(b), Some(&TreeKey::Position(1)));
        assert_eq!(tree.resolve("/"), Some(tree.root()));
        assert_eq!(tree.resolve("/list/2"), None);

        let list = tree.parent(b).unwrap();
        assert_eq!(tree.name(list), Some("list"));
        assert_eq!(tree.parent(list), Some(tree.root()));
        assert_eq!(tree.parent(tree.root()), None);
    }

    #[test]
    fn test_duplicate_and_empty_names() {
        let host = first_element(
            "<record><number _name=\"x\">1</number><number _name=\"\">2</number><number _name=\"x\">3</number></record>",
        );
        let registry = Registry::new();
        let tree = Tree::new(&host, &registry);

        let keys: Vec<String> = tree
            .subtrees(tree.root())
            .map(|(k, _)| k.to_string())
            .collect();
        assert_eq!(keys, ["0", "x"]);
        assert_eq!(
            tree.evaluate().unwrap(),
            Value::record([("x", Value::from(3))])
        );
    }

    #[test]
    fn test_custom_name_attribute() {
        let host = first_element("<record><number data-key=\"n\">5</number></record>");
        let registry = Registry::new();
        let options = EvalOptions::new().with_name_attribute("data-key");
        let tree = Tree::with_options(&host, &registry, options);
        assert_eq!(tree.evaluate().unwrap(), Value::record([("n", Value::from(5))]));
    }

    #[test]
    fn test_rewrap_strips_name_attribute() {
        let host = first_element(
            "<record><p _name=\"intro\" class=\"lead\">hi <b>there</b></p></record>",
        );
        let registry = Registry::new();
        let tree = Tree::new(&host, &registry);

        let Value::Record(record) = tree.evaluate().unwrap() else {
            panic!("expected record");
        };
        let Value::Element(p) = &record["intro"] else {
            panic!("expected element");
        };
        assert_eq!(p.to_html(), "<p class=\"lead\">hi <b>there</b></p>");
    }
}
