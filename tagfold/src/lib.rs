//! Memoized value evaluation over markup trees.
//!
//! tagfold reads a tree of tagged nodes as a computation. Every node folds the
//! values of its children, left to right, into one [`Value`]:
//!
//! - **Typers**: `<null>`, `<boolean>`, `<number>`, `<string>`, `<text>`,
//!   `<nodelist>`, `<array>` and `<record>` cast their folded content
//! - **Names**: children carrying `_name` become record keys instead of
//!   positional items
//! - **Transformers**: tags registered in a [`Registry`] evaluate to callable
//!   values that edit their parent's accumulator
//! - **Elements**: any other tag evaluates to a copy of itself around its
//!   folded content
//!
//! Positional children fold first, in document order, then named children in
//! declaration order. A transformer that should see a record's named fields
//! therefore carries a name itself.
//!
//! # Example
//!
//! ```rust
//! use tagfold::{Registry, Tree, Value};
//! use tagfold_dom::parse_fragment;
//!
//! let nodes = parse_fragment(
//!     r#"<record><string _name="title">hello world</string><replace _name="fix"><string>world</string><string>there</string></replace></record>"#,
//! );
//! let registry = Registry::with_builtins();
//! let tree = Tree::new(&nodes[0], &registry);
//!
//! assert_eq!(
//!     tree.evaluate().unwrap(),
//!     Value::record([("title", Value::string("hello there"))]),
//! );
//! ```

#[macro_use]
mod tracing_macros;

pub mod builtins;
pub mod cast;
mod error;
mod host;
pub mod merge;
mod options;
mod registry;
pub mod resolve;
pub mod serializer;
pub mod smart_tag;
mod transformer;
mod tree;
mod value;

pub use error::{EvalError, TagError};
pub use host::{HostKind, HostNode};
pub use options::{DEFAULT_NAME_ATTRIBUTE, EvalOptions};
pub use registry::Registry;
pub use resolve::{TreeKey, TreePath};
pub use serializer::{Serialized, deserialize, serialize};
pub use smart_tag::{Mode, SmartTag};
pub use transformer::{Action, Body, Detached, Generator, Hooks, Outcome, Transformer};
pub use tree::Tree;
pub use value::{Record, Value, ValueType};

// Nodes are identified by their arena id
pub use indextree::NodeId;
