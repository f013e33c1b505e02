//! Property addressing: keys, object identity, links, and chains.
//!
//! A [`Link`] identifies one property on one owning object and is the unit of
//! dependency tracking. A [`Chain`] is the full path of links from a model
//! root to a (possibly nested) property; events carry chains so that a
//! notification is attributable to a single fully-qualified property even
//! when several nested objects share a key name.

use std::fmt;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

/// Interned property name. Cheap to clone.
///
/// # Examples
///
/// ```
/// # use reflow::Key;
/// let key = Key::from("title");
/// assert_eq!(key.as_str(), "title");
/// assert_eq!(key, Key::from(String::from("title")));
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[cfg_attr(
    feature = "serde",
    derive(serde::Serialize, serde::Deserialize),
    serde(from = "String", into = "String")
)]
pub struct Key(Arc<str>);

impl Key {
    /// Create a key from a property name.
    pub fn new(name: impl AsRef<str>) -> Self {
        Key(Arc::from(name.as_ref()))
    }

    /// The property name.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl From<&str> for Key {
    fn from(name: &str) -> Self {
        Key::new(name)
    }
}

impl From<String> for Key {
    fn from(name: String) -> Self {
        Key::new(name)
    }
}

impl From<&Key> for Key {
    fn from(key: &Key) -> Self {
        key.clone()
    }
}

impl From<Key> for String {
    fn from(key: Key) -> Self {
        key.0.to_string()
    }
}

impl fmt::Display for Key {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Identity of one object in a reactive node tree.
///
/// Ids are allocated from a process-wide counter, so identity stays unique
/// across models. This matters for piping: events forwarded from a child
/// model into a parent's bus keep unambiguous links.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct ObjectId(u64);

impl ObjectId {
    /// Allocate a fresh, process-unique id.
    pub(crate) fn next() -> Self {
        static NEXT: AtomicU64 = AtomicU64::new(0);
        ObjectId(NEXT.fetch_add(1, Ordering::Relaxed))
    }
}

impl fmt::Display for ObjectId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// One property on one owning object: the addressable unit of observation.
///
/// Two links are equal iff both the owner and the key are equal. Links are
/// the sole addressing mechanism; no path strings are involved, which avoids
/// ambiguity when the same key name appears in different nested objects.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Link {
    /// The owning object.
    pub owner: ObjectId,
    /// The property key.
    pub key: Key,
}

impl Link {
    /// Create a link for a property on an owner.
    pub fn new(owner: ObjectId, key: impl Into<Key>) -> Self {
        Link {
            owner,
            key: key.into(),
        }
    }
}

impl fmt::Display for Link {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}.{}", self.owner, self.key)
    }
}

/// Ordered sequence of links from a model root to an observed property.
///
/// Chains are immutable and cheap to clone; [`Chain::extended`] allocates a
/// new chain rather than mutating in place.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Chain(Arc<[Link]>);

impl Chain {
    /// The empty chain: the prefix of the model root itself.
    pub fn root() -> Self {
        Chain(Arc::from([]))
    }

    /// A chain of a single link.
    pub fn from_link(link: Link) -> Self {
        Chain(Arc::from([link]))
    }

    /// This chain with one more link appended.
    pub fn extended(&self, link: Link) -> Self {
        let mut links = Vec::with_capacity(self.0.len() + 1);
        links.extend_from_slice(&self.0);
        links.push(link);
        Chain(links.into())
    }

    /// The terminal link, if any. Events always carry non-empty chains.
    pub fn last(&self) -> Option<&Link> {
        self.0.last()
    }

    /// All links, root first.
    pub fn links(&self) -> &[Link] {
        &self.0
    }

    /// Number of links in the chain.
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// True for the root prefix.
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl fmt::Display for Chain {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, link) in self.0.iter().enumerate() {
            if i == 0 {
                write!(f, "{}", link)?;
            } else {
                write!(f, ".{}", link.key)?;
            }
        }
        Ok(())
    }
}
