//! Per-property behavioral modifiers and the extender hook pipeline.
//!
//! Modifiers are declared once per property at shape-definition time and
//! consulted on every access; the table lives on the [`Shape`](crate::Shape)
//! and is shared by all instances, which is the class-level scoping the
//! engine requires. Conflicting or duplicate declarations fail fast at
//! declaration time, not at use time.

use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;
use std::time::Duration;

use crate::error::ModelError;
use crate::link::{Key, Link};
use crate::model::Model;
use crate::value::Value;

/// Hooks that customize how a getter-backed computed property recomputes and
/// notifies.
///
/// Every method has a pass-through default; implement only what you need.
/// Extenders apply in registration order. A hook returning `Err` is reported
/// through [`Tracer::on_extender_error`](crate::Tracer::on_extender_error)
/// and suppresses that notification cycle; it never propagates into the
/// write path.
pub trait Extender: Send + Sync {
    /// Called once when the property's computed slot is first materialized.
    fn init(&self, _model: &Model, _link: &Link) {}

    /// Transform a freshly computed value before it is cached.
    fn compute(&self, value: Value) -> Value {
        value
    }

    /// Consulted on each dependency-triggered invalidation. Returning
    /// `Ok(false)` suppresses recomputation: the dirty flag is cleared and
    /// nobody is notified, as if the value were unaffected.
    fn recompute(&self) -> anyhow::Result<bool> {
        Ok(true)
    }

    /// Consulted before a notification is scheduled. Returning `Ok(false)`
    /// suppresses the notification without clearing dirtiness.
    fn notify(&self, _value: &Value) -> anyhow::Result<bool> {
        Ok(true)
    }
}

/// A single modifier declaration.
#[derive(Clone)]
pub enum Modifier {
    /// Reads and writes of the property bypass event emission entirely.
    Ignore,
    /// The property's getter is evaluated eagerly at instantiation so its
    /// dependency subscription exists before the first external read.
    Effect,
    /// Replace immediate notification with a delayed one, coalescing
    /// triggers while the timer is in flight.
    Throttle(Duration),
    /// Replace immediate notification with a delayed one whose timer
    /// restarts on every trigger.
    Debounce(Duration),
    /// Direct external writes fail with [`ModelError::Readonly`].
    Readonly,
    /// Append an [`Extender`] to the property's ordered hook list.
    Extend(Arc<dyn Extender>),
}

impl Modifier {
    fn name(&self) -> &'static str {
        match self {
            Modifier::Ignore => "ignore",
            Modifier::Effect => "effect",
            Modifier::Throttle(_) => "throttle",
            Modifier::Debounce(_) => "debounce",
            Modifier::Readonly => "readonly",
            Modifier::Extend(_) => "extend",
        }
    }
}

/// The modifiers registered for one property.
#[derive(Clone, Default)]
pub struct ModifierSet {
    /// Reads and writes bypass event emission.
    pub ignore: bool,
    /// Getter evaluated eagerly at instantiation.
    pub effect: bool,
    /// Delayed notification, triggers coalesced while pending.
    pub throttle: Option<Duration>,
    /// Delayed notification, timer restarted per trigger.
    pub debounce: Option<Duration>,
    /// External writes rejected.
    pub readonly: bool,
    /// Ordered extender pipeline.
    pub extenders: Vec<Arc<dyn Extender>>,
}

impl fmt::Debug for ModifierSet {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ModifierSet")
            .field("ignore", &self.ignore)
            .field("effect", &self.effect)
            .field("throttle", &self.throttle)
            .field("debounce", &self.debounce)
            .field("readonly", &self.readonly)
            .field("extenders", &self.extenders.len())
            .finish()
    }
}

/// Out-of-band table mapping property keys to their modifiers.
///
/// Owned by a [`Shape`](crate::Shape); entries are append-only and written
/// only during shape definition.
#[derive(Clone, Default)]
pub struct Modifiers {
    entries: HashMap<Key, ModifierSet>,
}

impl Modifiers {
    /// Create an empty table.
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a modifier for a property, failing fast on duplicates and
    /// conflicts.
    pub fn set(&mut self, key: &Key, modifier: Modifier) -> Result<(), ModelError> {
        let name = modifier.name();
        let entry = self.entries.entry(key.clone()).or_default();
        match modifier {
            Modifier::Ignore => {
                if entry.ignore {
                    return Err(already(key, name));
                }
                entry.ignore = true;
            }
            Modifier::Effect => {
                ensure_not_ignored(entry, key)?;
                if entry.effect {
                    return Err(already(key, name));
                }
                entry.effect = true;
            }
            Modifier::Throttle(delay) => {
                ensure_not_ignored(entry, key)?;
                if entry.throttle.is_some() {
                    return Err(already(key, name));
                }
                if entry.debounce.is_some() {
                    return Err(conflict(key, name, "debounce"));
                }
                entry.throttle = Some(delay);
            }
            Modifier::Debounce(delay) => {
                ensure_not_ignored(entry, key)?;
                if entry.debounce.is_some() {
                    return Err(already(key, name));
                }
                if entry.throttle.is_some() {
                    return Err(conflict(key, name, "throttle"));
                }
                entry.debounce = Some(delay);
            }
            Modifier::Readonly => {
                if entry.readonly {
                    return Err(already(key, name));
                }
                entry.readonly = true;
            }
            Modifier::Extend(extender) => {
                entry.extenders.push(extender);
            }
        }
        Ok(())
    }

    /// The modifiers registered for `key`, if any.
    pub fn get(&self, key: &Key) -> Option<&ModifierSet> {
        self.entries.get(key)
    }
}

impl fmt::Debug for Modifiers {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_map().entries(self.entries.iter()).finish()
    }
}

fn already(key: &Key, modifier: &'static str) -> ModelError {
    ModelError::AlreadyRegistered {
        key: key.clone(),
        modifier,
    }
}

fn conflict(key: &Key, modifier: &'static str, existing: &'static str) -> ModelError {
    ModelError::ConflictingModifier {
        key: key.clone(),
        modifier,
        existing,
    }
}

fn ensure_not_ignored(entry: &ModifierSet, key: &Key) -> Result<(), ModelError> {
    if entry.ignore {
        return Err(ModelError::Ignored { key: key.clone() });
    }
    Ok(())
}
