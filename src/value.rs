//! Property values and construction trees.

use std::any::Any;
use std::fmt;
use std::sync::Arc;

use crate::link::{Key, ObjectId};
use crate::model::Model;

/// A dynamic property value.
///
/// Primitives and strings compare structurally; [`Value::Object`],
/// [`Value::Model`], and [`Value::Opaque`] compare by identity. This is the
/// comparison the engine memoizes by: a computed value whose recomputation
/// yields an equal `Value` notifies nobody.
#[derive(Clone)]
pub enum Value {
    /// Absent value.
    Null,
    /// Boolean.
    Bool(bool),
    /// Signed integer.
    Int(i64),
    /// Floating point number.
    Float(f64),
    /// String, cheap to clone.
    Str(Arc<str>),
    /// A nested reactive object within the same model's node tree.
    Object(ObjectId),
    /// An attached child model (see [`ShapeBuilder::attached`](crate::ShapeBuilder::attached)).
    Model(Model),
    /// An opaque leaf the engine does not descend into; compared by identity.
    Opaque(Arc<dyn Any + Send + Sync>),
}

impl Value {
    /// Wrap an arbitrary value as an opaque leaf.
    pub fn opaque<T: Any + Send + Sync>(value: T) -> Self {
        Value::Opaque(Arc::new(value))
    }

    /// True for [`Value::Null`].
    pub fn is_null(&self) -> bool {
        matches!(self, Value::Null)
    }

    /// The boolean payload, if any.
    pub fn as_bool(&self) -> Option<bool> {
        match self {
            Value::Bool(b) => Some(*b),
            _ => None,
        }
    }

    /// The integer payload, if any.
    pub fn as_int(&self) -> Option<i64> {
        match self {
            Value::Int(n) => Some(*n),
            _ => None,
        }
    }

    /// The float payload, if any.
    pub fn as_float(&self) -> Option<f64> {
        match self {
            Value::Float(n) => Some(*n),
            _ => None,
        }
    }

    /// The string payload, if any.
    pub fn as_str(&self) -> Option<&str> {
        match self {
            Value::Str(s) => Some(s),
            _ => None,
        }
    }

    /// The nested object id, if any.
    pub fn as_object(&self) -> Option<ObjectId> {
        match self {
            Value::Object(id) => Some(*id),
            _ => None,
        }
    }

    /// The attached model, if any.
    pub fn as_model(&self) -> Option<&Model> {
        match self {
            Value::Model(model) => Some(model),
            _ => None,
        }
    }
}

impl PartialEq for Value {
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (Value::Null, Value::Null) => true,
            (Value::Bool(a), Value::Bool(b)) => a == b,
            (Value::Int(a), Value::Int(b)) => a == b,
            (Value::Float(a), Value::Float(b)) => a == b,
            (Value::Str(a), Value::Str(b)) => a == b,
            (Value::Object(a), Value::Object(b)) => a == b,
            (Value::Model(a), Value::Model(b)) => Model::ptr_eq(a, b),
            (Value::Opaque(a), Value::Opaque(b)) => Arc::ptr_eq(a, b),
            _ => false,
        }
    }
}

impl fmt::Debug for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::Null => f.write_str("Null"),
            Value::Bool(b) => write!(f, "Bool({b})"),
            Value::Int(n) => write!(f, "Int({n})"),
            Value::Float(n) => write!(f, "Float({n})"),
            Value::Str(s) => write!(f, "Str({s:?})"),
            Value::Object(id) => write!(f, "Object({id})"),
            Value::Model(_) => f.write_str("Model(..)"),
            Value::Opaque(_) => f.write_str("Opaque(..)"),
        }
    }
}

impl From<bool> for Value {
    fn from(value: bool) -> Self {
        Value::Bool(value)
    }
}

impl From<i32> for Value {
    fn from(value: i32) -> Self {
        Value::Int(value.into())
    }
}

impl From<i64> for Value {
    fn from(value: i64) -> Self {
        Value::Int(value)
    }
}

impl From<f64> for Value {
    fn from(value: f64) -> Self {
        Value::Float(value)
    }
}

impl From<&str> for Value {
    fn from(value: &str) -> Self {
        Value::Str(Arc::from(value))
    }
}

impl From<String> for Value {
    fn from(value: String) -> Self {
        Value::Str(Arc::from(value.as_str()))
    }
}

impl From<Model> for Value {
    fn from(model: Model) -> Self {
        Value::Model(model)
    }
}

/// Construction tree for building nested node graphs.
///
/// Passed to [`Model::insert`](crate::Model::insert), which allocates one
/// node per [`Init::Object`] and returns the resulting [`Value`].
pub enum Init {
    /// A leaf value.
    Value(Value),
    /// A nested object, one node per occurrence.
    Object(Vec<(Key, Init)>),
}

impl Init {
    /// Build an object entry list from an iterator of key/init pairs.
    pub fn object<K: Into<Key>>(entries: impl IntoIterator<Item = (K, Init)>) -> Self {
        Init::Object(
            entries
                .into_iter()
                .map(|(key, init)| (key.into(), init))
                .collect(),
        )
    }
}

impl From<Value> for Init {
    fn from(value: Value) -> Self {
        Init::Value(value)
    }
}

impl From<bool> for Init {
    fn from(value: bool) -> Self {
        Init::Value(value.into())
    }
}

impl From<i64> for Init {
    fn from(value: i64) -> Self {
        Init::Value(value.into())
    }
}

impl From<i32> for Init {
    fn from(value: i32) -> Self {
        Init::Value(value.into())
    }
}

impl From<f64> for Init {
    fn from(value: f64) -> Self {
        Init::Value(value.into())
    }
}

impl From<&str> for Init {
    fn from(value: &str) -> Self {
        Init::Value(value.into())
    }
}
