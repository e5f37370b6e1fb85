//! Stem - compact string type for DOM content.

use compact_str::CompactString;
use std::borrow::Borrow;
use std::fmt;
use std::hash::{Hash, Hasher};
use std::ops::Deref;
use tendril::StrTendril;

/// Compact string type used for tag names, attribute names and values, and text.
///
/// Either a `'static` literal (reserved names, container tags) or an owned
/// compact string. Values never borrow from a host document, so a `Stem` can
/// outlive the tree it was read from.
#[derive(Clone)]
pub enum Stem {
    Static(&'static str),
    Owned(CompactString),
}

impl Stem {
    pub fn new() -> Self {
        Self::Owned(CompactString::default())
    }

    /// Wrap a string literal without copying.
    pub const fn from_static(s: &'static str) -> Self {
        Self::Static(s)
    }

    pub fn as_str(&self) -> &str {
        match self {
            Self::Static(s) => s,
            Self::Owned(s) => s.as_str(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.as_str().is_empty()
    }

    pub fn len(&self) -> usize {
        self.as_str().len()
    }

    pub fn push_str(&mut self, s: &str) {
        match self {
            Self::Owned(existing) => {
                existing.push_str(s);
            }
            Self::Static(literal) => {
                *self = Self::Owned(compact_str::format_compact!("{}{}", literal, s));
            }
        }
    }

    /// Lowercase copy, used for tag-name normalization.
    pub fn to_ascii_lowercase(&self) -> Stem {
        if self.as_str().bytes().any(|b| b.is_ascii_uppercase()) {
            Self::Owned(CompactString::from(self.as_str().to_ascii_lowercase()))
        } else {
            self.clone()
        }
    }
}

impl Default for Stem {
    fn default() -> Self {
        Self::new()
    }
}

impl Deref for Stem {
    type Target = str;

    fn deref(&self) -> &Self::Target {
        self.as_str()
    }
}

impl AsRef<str> for Stem {
    fn as_ref(&self) -> &str {
        self.as_str()
    }
}

impl Borrow<str> for Stem {
    fn borrow(&self) -> &str {
        self.as_str()
    }
}

impl PartialEq for Stem {
    fn eq(&self, other: &Self) -> bool {
        self.as_str() == other.as_str()
    }
}

impl Eq for Stem {}

impl PartialEq<str> for Stem {
    fn eq(&self, other: &str) -> bool {
        self.as_str() == other
    }
}

impl PartialEq<&str> for Stem {
    fn eq(&self, other: &&str) -> bool {
        self.as_str() == *other
    }
}

impl PartialOrd for Stem {
    fn partial_cmp(&self, other: &Self) -> Option<std::cmp::Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for Stem {
    fn cmp(&self, other: &Self) -> std::cmp::Ordering {
        self.as_str().cmp(other.as_str())
    }
}

impl Hash for Stem {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.as_str().hash(state);
    }
}

impl fmt::Debug for Stem {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Debug::fmt(self.as_str(), f)
    }
}

impl fmt::Display for Stem {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Display::fmt(self.as_str(), f)
    }
}

impl From<&str> for Stem {
    fn from(s: &str) -> Self {
        Self::Owned(CompactString::new(s))
    }
}

impl From<&String> for Stem {
    fn from(s: &String) -> Self {
        Self::Owned(CompactString::new(s))
    }
}

impl From<String> for Stem {
    fn from(s: String) -> Self {
        Self::Owned(CompactString::from(s))
    }
}

impl From<CompactString> for Stem {
    fn from(s: CompactString) -> Self {
        Self::Owned(s)
    }
}

impl From<StrTendril> for Stem {
    fn from(t: StrTendril) -> Self {
        Self::Owned(CompactString::new(t.as_ref()))
    }
}

impl From<&StrTendril> for Stem {
    fn from(t: &StrTendril) -> Self {
        Self::Owned(CompactString::new(t.as_ref()))
    }
}

impl From<Stem> for String {
    fn from(s: Stem) -> Self {
        s.as_str().to_owned()
    }
}

const _: () = {
    const fn assert_send<T: Send>() {}
    const fn assert_sync<T: Sync>() {}
    assert_send::<Stem>();
    assert_sync::<Stem>();
};
