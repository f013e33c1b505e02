//! Per-type shape descriptors: fields, getters, attachments, and modifiers.
//!
//! A [`Shape`] plays the role the class prototype plays in a dynamic
//! language: it is built once at type-definition time and shared by every
//! instance through `Arc<Shape>`, so modifiers are declared once per
//! property rather than per instance.

use std::sync::Arc;
use std::time::Duration;

use crate::error::ModelError;
use crate::link::Key;
use crate::model::ObjectRef;
use crate::modifier::{Extender, Modifier, ModifierSet, Modifiers};
use crate::value::Value;

/// The compute function of a getter-backed property.
///
/// Receives the root accessor handle; every property read through it during
/// the call is captured as a dependency.
pub type Getter = Arc<dyn Fn(&ObjectRef) -> Value + Send + Sync>;

/// How a declared field stores its value.
#[derive(Clone)]
pub(crate) enum FieldKind {
    /// Plain data field with its initial value.
    Data(Value),
    /// Accessor-backed embedded computed property.
    Getter(Getter),
    /// Holds a nested child model; assignment pipes the child's bus into
    /// the owner's. The assignment itself is exempt from Modify emission.
    Attached,
}

pub(crate) struct FieldDecl {
    pub(crate) key: Key,
    pub(crate) kind: FieldKind,
}

/// Per-type descriptor consulted when instantiating and accessing a model.
pub struct Shape {
    name: String,
    pub(crate) fields: Vec<FieldDecl>,
    pub(crate) modifiers: Modifiers,
}

impl Shape {
    /// Start declaring a shape.
    pub fn builder(name: impl Into<String>) -> ShapeBuilder {
        ShapeBuilder {
            name: name.into(),
            fields: Vec::new(),
            modifiers: Modifiers::new(),
        }
    }

    /// The shape's name, for diagnostics.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Declared field keys, in declaration order.
    pub fn keys(&self) -> impl Iterator<Item = &Key> {
        self.fields.iter().map(|field| &field.key)
    }

    pub(crate) fn field(&self, key: &Key) -> Option<&FieldDecl> {
        self.fields.iter().find(|field| &field.key == key)
    }

    pub(crate) fn modifier_set(&self, key: &Key) -> Option<&ModifierSet> {
        self.modifiers.get(key)
    }
}

impl std::fmt::Debug for Shape {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Shape")
            .field("name", &self.name)
            .field("fields", &self.fields.len())
            .finish()
    }
}

/// Builder for [`Shape`]. Modifier declarations fail fast on duplicates and
/// conflicts, at declaration time.
pub struct ShapeBuilder {
    name: String,
    fields: Vec<FieldDecl>,
    modifiers: Modifiers,
}

impl ShapeBuilder {
    /// Declare a plain data field initialized to [`Value::Null`].
    pub fn field(self, key: impl Into<Key>) -> Self {
        self.field_default(key, Value::Null)
    }

    /// Declare a plain data field with an initial value.
    pub fn field_default(mut self, key: impl Into<Key>, value: impl Into<Value>) -> Self {
        self.fields.push(FieldDecl {
            key: key.into(),
            kind: FieldKind::Data(value.into()),
        });
        self
    }

    /// Declare a getter-backed property: an embedded computed value that
    /// memoizes and tracks its own dependencies automatically.
    pub fn getter(
        mut self,
        key: impl Into<Key>,
        get: impl Fn(&ObjectRef) -> Value + Send + Sync + 'static,
    ) -> Self {
        self.fields.push(FieldDecl {
            key: key.into(),
            kind: FieldKind::Getter(Arc::new(get)),
        });
        self
    }

    /// Declare a field that holds a nested child [`Model`](crate::Model).
    /// Assigning a model into it pipes the child's event bus into the
    /// owner's, so mutations inside the child surface on the owner's bus.
    pub fn attached(mut self, key: impl Into<Key>) -> Self {
        self.fields.push(FieldDecl {
            key: key.into(),
            kind: FieldKind::Attached,
        });
        self
    }

    /// Reads and writes of `key` bypass event emission entirely.
    pub fn ignore(mut self, key: impl Into<Key>) -> Result<Self, ModelError> {
        self.modifiers.set(&key.into(), Modifier::Ignore)?;
        Ok(self)
    }

    /// Evaluate the getter for `key` eagerly at instantiation.
    pub fn effect(mut self, key: impl Into<Key>) -> Result<Self, ModelError> {
        self.modifiers.set(&key.into(), Modifier::Effect)?;
        Ok(self)
    }

    /// Notify `key`'s observers after a fixed delay, coalescing triggers
    /// while the timer is in flight. Mutually exclusive with debounce.
    pub fn throttle(mut self, key: impl Into<Key>, delay: Duration) -> Result<Self, ModelError> {
        self.modifiers.set(&key.into(), Modifier::Throttle(delay))?;
        Ok(self)
    }

    /// Notify `key`'s observers after a delay restarted on every trigger.
    /// Mutually exclusive with throttle.
    pub fn debounce(mut self, key: impl Into<Key>, delay: Duration) -> Result<Self, ModelError> {
        self.modifiers.set(&key.into(), Modifier::Debounce(delay))?;
        Ok(self)
    }

    /// Reject external writes to `key`.
    pub fn readonly(mut self, key: impl Into<Key>) -> Result<Self, ModelError> {
        self.modifiers.set(&key.into(), Modifier::Readonly)?;
        Ok(self)
    }

    /// Append an extender to `key`'s ordered hook pipeline. Unlike the other
    /// modifiers, multiple extenders may be registered; they apply in
    /// registration order.
    pub fn extend(mut self, key: impl Into<Key>, extender: Arc<dyn Extender>) -> Self {
        self.modifiers
            .set(&key.into(), Modifier::Extend(extender))
            .expect("extend registration cannot conflict");
        self
    }

    /// Finish the declaration.
    pub fn build(self) -> Arc<Shape> {
        Arc::new(Shape {
            name: self.name,
            fields: self.fields,
            modifiers: self.modifiers,
        })
    }
}
