//! Owned markup DOM for tagfold, based on html5ever.
//!
//! tagfold-dom provides:
//! - **DOM**: Simple owned Element/Node tree, cheap to clone and edit
//! - **Parsing**: Browser-compatible HTML5 parsing via html5ever with full error recovery
//! - **Serialization**: HTML5-correct serialization with proper escaping
//!
//! # Example
//!
//! ```rust
//! use tagfold_dom::{Node, parse_fragment};
//!
//! let nodes = parse_fragment("<p>Hello!</p><p>World!</p>");
//! for node in &nodes {
//!     if let Node::Element(elem) = node {
//!         println!("Found {} element", elem.tag);
//!     }
//! }
//!
//! let html: String = nodes.iter().map(Node::to_html).collect();
//! assert_eq!(html, "<p>Hello!</p><p>World!</p>");
//! ```

#[macro_use]
mod tracing_macros;

pub mod dom;
mod parser;
pub mod serialize;
mod stem;

pub use parser::{parse_body, parse_fragment};
pub use serialize::{SerializeOptions, serialize_element, serialize_fragment};
pub use stem::Stem;

// Re-export DOM types at crate root for convenience
pub use dom::{Element, Node};
