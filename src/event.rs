//! Event bus: Get/Modify notifications, filters, subscriptions, and piping.

use std::fmt;
use std::sync::Arc;

use parking_lot::Mutex;
use slab::Slab;

use crate::link::{Chain, Key, Link};
use crate::value::Value;

/// The two kinds of property notifications.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum EventKind {
    /// A property was read.
    Get,
    /// A property's value changed.
    Modify,
}

/// A property notification.
#[derive(Debug, Clone)]
pub struct Event {
    /// Whether this is a read or a change notification.
    pub kind: EventKind,
    /// Full path from the model root to the affected property.
    pub chain: Chain,
    /// Value before the change (Modify only, when known).
    pub old_value: Option<Value>,
    /// Value after the change, or the value that was read.
    pub new_value: Option<Value>,
    /// Fine-grained deltas when an object value was replaced by another
    /// object. `None` means whole-value replacement.
    pub changes: Option<Changes>,
}

impl Event {
    pub(crate) fn get(chain: Chain, value: Value) -> Self {
        Event {
            kind: EventKind::Get,
            chain,
            old_value: None,
            new_value: Some(value),
            changes: None,
        }
    }

    pub(crate) fn modify(
        chain: Chain,
        old_value: Option<Value>,
        new_value: Option<Value>,
        changes: Option<Changes>,
    ) -> Self {
        Event {
            kind: EventKind::Modify,
            chain,
            old_value,
            new_value,
            changes,
        }
    }

    /// The terminal link of the chain: the property this event is about.
    pub fn link(&self) -> &Link {
        self.chain.last().expect("event chain is never empty")
    }
}

/// One entry of a structured delta, possibly nested.
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Diff {
    /// The affected key.
    pub key: Key,
    /// Changed keys of the nested object, when the value was itself an
    /// object that changed in place of being replaced wholesale.
    pub nested: Vec<Diff>,
}

impl Diff {
    /// A flat diff entry with no nested changes.
    pub fn new(key: impl Into<Key>) -> Self {
        Diff {
            key: key.into(),
            nested: Vec::new(),
        }
    }
}

/// Fine-grained add/modify/delete deltas between two keyed collections.
///
/// Attached to a Modify event when a property's object value was replaced by
/// a different object; consumers that merge keyed collections (attribute
/// maps and the like) use this instead of diffing whole values themselves.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Changes {
    /// Keys present in the new object but not the old one.
    pub additions: Vec<Diff>,
    /// Keys present in both whose values differ.
    pub modifications: Vec<Diff>,
    /// Keys present in the old object but not the new one.
    pub deletions: Vec<Diff>,
}

impl Changes {
    /// True when no delta was recorded.
    pub fn is_empty(&self) -> bool {
        self.additions.is_empty() && self.modifications.is_empty() && self.deletions.is_empty()
    }
}

/// Restricts which events a listener receives.
///
/// An absent link restriction matches every chain; a present one requires the
/// chain's terminal link to equal one of the filter links. Note the
/// difference between absent and present-but-empty: an empty link set
/// produces a listener that never fires, which is exactly what a computed
/// value with no captured dependencies needs.
#[derive(Debug, Clone, Default)]
pub struct EventFilter {
    /// Match only this event kind, if set.
    pub kind: Option<EventKind>,
    /// Match only chains ending in one of these links, if set.
    pub links: Option<Vec<Link>>,
}

impl EventFilter {
    /// Filter by kind only.
    pub fn of_kind(kind: EventKind) -> Self {
        EventFilter {
            kind: Some(kind),
            links: None,
        }
    }

    /// Filter by kind and a single terminal link.
    pub fn for_link(kind: EventKind, link: Link) -> Self {
        EventFilter {
            kind: Some(kind),
            links: Some(vec![link]),
        }
    }

    /// Filter by kind and a set of terminal links.
    ///
    /// An empty set produces a listener that never fires.
    pub fn for_links(kind: EventKind, links: Vec<Link>) -> Self {
        EventFilter {
            kind: Some(kind),
            links: Some(links),
        }
    }

    fn matches(&self, event: &Event) -> bool {
        if let Some(kind) = self.kind {
            if event.kind != kind {
                return false;
            }
        }
        if let Some(links) = &self.links {
            let last = event.link();
            if !links.iter().any(|link| link == last) {
                return false;
            }
        }
        true
    }
}

type Listener = Arc<dyn Fn(&Event) + Send + Sync>;

#[derive(Clone)]
struct ListenerEntry {
    listener: Listener,
    filter: Option<EventFilter>,
}

#[derive(Default)]
struct BusInner {
    listeners: Mutex<Slab<ListenerEntry>>,
    pipes: Mutex<Vec<EventBus>>,
}

/// Per-model publish/subscribe channel for property notifications.
///
/// Cheap to clone; clones share the listener table.
#[derive(Clone, Default)]
pub struct EventBus {
    inner: Arc<BusInner>,
}

impl EventBus {
    /// Create an empty bus.
    pub fn new() -> Self {
        Self::default()
    }

    /// Deliver an event to every matching listener, then forward it along
    /// every pipe edge.
    ///
    /// The listener table is snapshotted before iterating, so a listener
    /// added or revoked during delivery does not affect the current pass.
    pub fn emit(&self, event: &Event) {
        let entries: Vec<ListenerEntry> = self
            .inner
            .listeners
            .lock()
            .iter()
            .map(|(_, entry)| entry.clone())
            .collect();
        for entry in entries {
            if entry.filter.as_ref().map_or(true, |f| f.matches(event)) {
                (entry.listener)(event);
            }
        }

        let pipes: Vec<EventBus> = self.inner.pipes.lock().clone();
        for pipe in pipes {
            pipe.emit(event);
        }
    }

    /// Register a listener, optionally restricted by `filter`.
    pub fn on(
        &self,
        listener: impl Fn(&Event) + Send + Sync + 'static,
        filter: Option<EventFilter>,
    ) -> Subscription {
        let key = self.inner.listeners.lock().insert(ListenerEntry {
            listener: Arc::new(listener),
            filter,
        });
        let inner = Arc::downgrade(&self.inner);
        Subscription::new(move || {
            if let Some(inner) = inner.upgrade() {
                inner.listeners.lock().try_remove(key);
            }
        })
    }

    /// Forward every event emitted on this bus to `to` as well.
    ///
    /// Piping the same target twice is a no-op, but piping is transitive and
    /// does not deduplicate across distinct edges: a diamond of pipes
    /// delivers once per edge. This is a known limitation, not a bug to
    /// silently fix.
    pub fn pipe(&self, to: &EventBus) {
        let mut pipes = self.inner.pipes.lock();
        if pipes.iter().any(|pipe| Arc::ptr_eq(&pipe.inner, &to.inner)) {
            return;
        }
        pipes.push(to.clone());
    }

    /// Number of registered listeners.
    pub fn listener_count(&self) -> usize {
        self.inner.listeners.lock().len()
    }
}

impl fmt::Debug for EventBus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("EventBus")
            .field("listeners", &self.listener_count())
            .finish()
    }
}

type RevokeFn = Box<dyn FnOnce() + Send>;

/// Handle to an active listener registration.
///
/// [`Subscription::revoke`] is idempotent: the second and later calls are
/// no-ops and never fail. Dropping a subscription without revoking leaves
/// the listener registered for the lifetime of its bus.
pub struct Subscription {
    revoke: Mutex<Option<RevokeFn>>,
}

impl Subscription {
    pub(crate) fn new(revoke: impl FnOnce() + Send + 'static) -> Self {
        Subscription {
            revoke: Mutex::new(Some(Box::new(revoke))),
        }
    }

    /// A subscription over nothing.
    pub(crate) fn noop() -> Self {
        Subscription::new(|| {})
    }

    /// Remove the listener registration. Idempotent.
    pub fn revoke(&self) {
        let revoke = self.revoke.lock().take();
        if let Some(revoke) = revoke {
            revoke();
        }
    }

    /// False once revoked.
    pub fn is_active(&self) -> bool {
        self.revoke.lock().is_some()
    }
}

impl fmt::Debug for Subscription {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Subscription")
            .field("active", &self.is_active())
            .finish()
    }
}
