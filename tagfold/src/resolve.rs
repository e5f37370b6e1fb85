//! Keys, paths and root-relative lookup.

use std::fmt;

use smallvec::SmallVec;
use tagfold_dom::Stem;

/// Key of a child in its parent's subtree map.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum TreeKey {
    /// Document-order index among unnamed children
    Position(usize),
    /// Declared through the reserved name attribute
    Name(Stem),
}

impl TreeKey {
    pub fn is_name(&self) -> bool {
        matches!(self, TreeKey::Name(_))
    }
}

impl fmt::Display for TreeKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TreeKey::Position(i) => write!(f, "{i}"),
            TreeKey::Name(name) => f.write_str(name),
        }
    }
}

impl From<usize> for TreeKey {
    fn from(i: usize) -> Self {
        TreeKey::Position(i)
    }
}

impl From<&str> for TreeKey {
    fn from(name: &str) -> Self {
        TreeKey::Name(Stem::from(name))
    }
}

/// Segments from the root to a node. Displays as `/0/x/1`; the root is `/`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Default)]
pub struct TreePath(pub SmallVec<[TreeKey; 4]>);

impl TreePath {
    pub fn root() -> Self {
        Self::default()
    }

    pub fn child(&self, key: TreeKey) -> Self {
        let mut segments = self.0.clone();
        segments.push(key);
        Self(segments)
    }

    pub fn segments(&self) -> &[TreeKey] {
        &self.0
    }

    pub fn is_root(&self) -> bool {
        self.0.is_empty()
    }
}

impl fmt::Display for TreePath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.is_root() {
            return f.write_str("/");
        }
        for segment in &self.0 {
            write!(f, "/{segment}")?;
        }
        Ok(())
    }
}

/// Split a slash-delimited path into raw segments. Leading, trailing and
/// doubled slashes are ignored, so `""`, `"/"` and `"//"` all name the root.
pub fn split_path(path: &str) -> impl Iterator<Item = &str> {
    path.split('/').filter(|s| !s.is_empty())
}

/// Candidate keys for one raw segment, in lookup order: a numeric segment
/// tries the positional key first and then a name spelled with digits.
pub fn segment_keys(segment: &str) -> SmallVec<[TreeKey; 2]> {
    let mut keys = SmallVec::new();
    if let Ok(i) = segment.parse::<usize>() {
        keys.push(TreeKey::Position(i));
    }
    keys.push(TreeKey::Name(Stem::from(segment)));
    keys
}
