//! Single-property capabilities.

use crate::error::ModelError;
use crate::event::{Event, EventFilter, EventKind, Subscription};
use crate::link::{Chain, Link};
use crate::model::Model;
use crate::value::Value;

/// A capability bound to one property of one model.
///
/// References decouple "this variable" from "this model": they can be handed
/// to external consumers for reading, writing, and observing a single
/// property without exposing the rest of the model. Obtained through
/// [`Model::reference`] with a link captured via
/// [`ObjectRef::link`](crate::ObjectRef::link).
#[derive(Clone)]
pub struct Reference {
    model: Model,
    link: Link,
}

impl Reference {
    pub(crate) fn new(model: Model, link: Link) -> Self {
        Reference { model, link }
    }

    /// The link this reference is bound to.
    pub fn link(&self) -> &Link {
        &self.link
    }

    /// Read the property's current value. Capability reads are not
    /// dependency-tracked: no Get event is emitted.
    pub fn get(&self) -> Result<Value, ModelError> {
        self.model.raw_value(&self.link)
    }

    /// Write the property through the model's write path: readonly is
    /// enforced and a Modify notification is scheduled like any other write.
    /// Events from a reference carry a single-link chain.
    pub fn set(&self, value: impl Into<Value>) -> Result<(), ModelError> {
        self.model.write(
            self.link.owner,
            &Chain::root(),
            &self.link.key,
            value.into(),
            false,
        )
    }

    /// Subscribe to Modify events for this property.
    pub fn observe(&self, listener: impl Fn(&Event) + Send + Sync + 'static) -> Subscription {
        self.model.bus().on(
            listener,
            Some(EventFilter::for_link(EventKind::Modify, self.link.clone())),
        )
    }
}

impl std::fmt::Debug for Reference {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Reference").field("link", &self.link).finish()
    }
}
