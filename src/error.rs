//! Error types for the reactive engine.

use crate::link::Key;

/// Errors surfaced by the reactive engine.
///
/// Every variant is a local, synchronous error that propagates to the caller;
/// the engine never retries or swallows them. Failing extender callbacks are
/// the one exception: they are reported through
/// [`Tracer::on_extender_error`](crate::Tracer::on_extender_error) and
/// suppress the affected notification cycle instead of surfacing here.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ModelError {
    /// A modifier was registered twice for the same property.
    #[error("modifier `{modifier}` is already registered for property `{key}`")]
    AlreadyRegistered {
        /// The property the modifier was declared for.
        key: Key,
        /// The modifier name.
        modifier: &'static str,
    },

    /// Two mutually exclusive modifiers were registered for one property.
    #[error("cannot register `{modifier}` for property `{key}`: property is already `{existing}`")]
    ConflictingModifier {
        /// The property the modifier was declared for.
        key: Key,
        /// The modifier being registered.
        modifier: &'static str,
        /// The previously registered modifier it conflicts with.
        existing: &'static str,
    },

    /// A modifier was registered for a property that is ignored.
    #[error("property `{key}` is ignored")]
    Ignored {
        /// The ignored property.
        key: Key,
    },

    /// A write was attempted on a readonly property. The write did not
    /// proceed; the property still holds its previous value.
    #[error("property `{key}` is readonly")]
    Readonly {
        /// The readonly property.
        key: Key,
    },

    /// A write was attempted on a getter-backed computed property.
    #[error("property `{key}` is computed and cannot be assigned")]
    ComputedProperty {
        /// The computed property.
        key: Key,
    },

    /// A read of a property that does not exist on the target object.
    #[error("unknown property `{key}`")]
    UnknownProperty {
        /// The missing property.
        key: Key,
    },

    /// A descend into a property whose value is not a nested object.
    #[error("property `{key}` does not hold an object")]
    NotAnObject {
        /// The property that was descended into.
        key: Key,
    },

    /// A non-model value was assigned to an attached property.
    #[error("attached property `{key}` requires a model value")]
    NotAModel {
        /// The attached property.
        key: Key,
    },

    /// A computed value was used after [`Computed::dispose`](crate::Computed::dispose).
    #[error("computed value has been disposed")]
    Disposed,

    /// A link whose owner does not belong to this model's node tree.
    ///
    /// This is the typed rendition of bypassing the interception layer:
    /// capability construction has no meaningful behavior for objects the
    /// model does not own.
    #[error("target does not belong to this model")]
    ForeignTarget,

    /// An empty chain where a property path was required.
    #[error("chain does not address a property")]
    EmptyChain,
}
