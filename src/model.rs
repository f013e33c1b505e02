//! The reactive model: node tree, accessor handles, and the write path.
//!
//! A [`Model`] turns a [`Shape`] into an observable instance. Reads through
//! [`ObjectRef`] emit Get events tagged with the full chain to the property;
//! writes perform the underlying assignment immediately and schedule a
//! Modify event through the scheduler, deduplicated per link per batch.
//! Getter-backed properties are embedded computed values: they memoize,
//! discover their own dependencies, and renotify through the extender and
//! throttle/debounce pipeline.

use std::collections::{HashMap, HashSet};
use std::fmt;
use std::sync::Arc;

use parking_lot::Mutex;

use crate::computed::Computed;
use crate::error::ModelError;
use crate::event::{Changes, Diff, Event, EventBus, EventFilter, EventKind, Subscription};
use crate::link::{Chain, Key, Link, ObjectId};
use crate::reference::Reference;
use crate::scheduler::{ManualTicker, Scheduler, Task, Ticker};
use crate::shape::{FieldKind, Getter, Shape};
use crate::tracer::{NoopTracer, Tracer};
use crate::value::{Init, Value};

/// Configuration for a model instance.
///
/// The ticker decides when pending batches flush (manual by default); the
/// tracer observes the notification lifecycle (noop by default).
pub struct ModelOptions {
    /// Batch-flush scheduling primitive.
    pub ticker: Arc<dyn Ticker>,
    /// Observability hooks.
    pub tracer: Arc<dyn Tracer>,
}

impl Default for ModelOptions {
    fn default() -> Self {
        ModelOptions {
            ticker: Arc::new(ManualTicker),
            tracer: Arc::new(NoopTracer),
        }
    }
}

struct Node {
    entries: Vec<(Key, Value)>,
}

impl Node {
    fn get(&self, key: &Key) -> Option<&Value> {
        self.entries
            .iter()
            .find(|(entry_key, _)| entry_key == key)
            .map(|(_, value)| value)
    }

    fn set(&mut self, key: &Key, value: Value) -> Option<Value> {
        if let Some((_, slot)) = self
            .entries
            .iter_mut()
            .find(|(entry_key, _)| entry_key == key)
        {
            Some(std::mem::replace(slot, value))
        } else {
            self.entries.push((key.clone(), value));
            None
        }
    }

    fn keys(&self) -> Vec<Key> {
        self.entries.iter().map(|(key, _)| key.clone()).collect()
    }
}

struct PendingWrite {
    chain: Chain,
    old: Option<Value>,
}

struct SlotInner {
    value: Option<Value>,
    dirty: bool,
    deps: Option<Subscription>,
    notify_pending: bool,
    initialized: bool,
}

/// Lazily-materialized state of one getter-backed property.
struct SlotState {
    state: Mutex<SlotInner>,
}

impl SlotState {
    fn new() -> Self {
        SlotState {
            state: Mutex::new(SlotInner {
                value: None,
                dirty: true,
                deps: None,
                notify_pending: false,
                initialized: false,
            }),
        }
    }
}

pub(crate) struct ModelInner {
    shape: Arc<Shape>,
    bus: EventBus,
    scheduler: Scheduler,
    tracer: Arc<dyn Tracer>,
    nodes: Mutex<HashMap<ObjectId, Node>>,
    root: ObjectId,
    slots: Mutex<HashMap<Key, Arc<SlotState>>>,
    pending: Mutex<HashMap<Link, PendingWrite>>,
}

/// A reactive model instance.
///
/// Cheap to clone: all state is behind `Arc`; clones share the bus,
/// scheduler, and node tree.
#[derive(Clone)]
pub struct Model {
    inner: Arc<ModelInner>,
}

impl Model {
    /// Instantiate a shape with default options.
    pub fn new(shape: Arc<Shape>) -> Self {
        Self::with_options(shape, ModelOptions::default())
    }

    /// Instantiate a shape with an explicit ticker and tracer.
    pub fn with_options(shape: Arc<Shape>, options: ModelOptions) -> Self {
        let root = ObjectId::next();
        let mut entries = Vec::new();
        for field in &shape.fields {
            match &field.kind {
                FieldKind::Data(default) => entries.push((field.key.clone(), default.clone())),
                FieldKind::Attached => entries.push((field.key.clone(), Value::Null)),
                FieldKind::Getter(_) => {}
            }
        }

        let model = Model {
            inner: Arc::new(ModelInner {
                shape: shape.clone(),
                bus: EventBus::new(),
                scheduler: Scheduler::new(options.ticker),
                tracer: options.tracer,
                nodes: Mutex::new(HashMap::from([(root, Node { entries })])),
                root,
                slots: Mutex::new(HashMap::new()),
                pending: Mutex::new(HashMap::new()),
            }),
        };

        // effect getters evaluate eagerly so their dependency subscriptions
        // exist before the first external read
        let eager: Vec<Key> = shape
            .fields
            .iter()
            .filter(|field| matches!(field.kind, FieldKind::Getter(_)))
            .filter(|field| {
                shape
                    .modifier_set(&field.key)
                    .map_or(false, |mods| mods.effect)
            })
            .map(|field| field.key.clone())
            .collect();
        for key in eager {
            let _ = model.root().get(key);
        }

        model
    }

    /// Accessor handle to the root object.
    pub fn root(&self) -> ObjectRef {
        ObjectRef {
            model: self.clone(),
            id: self.inner.root,
            chain: Chain::root(),
        }
    }

    /// The shape this model was instantiated from.
    pub fn shape(&self) -> &Arc<Shape> {
        &self.inner.shape
    }

    /// The model's event bus.
    pub fn bus(&self) -> &EventBus {
        &self.inner.bus
    }

    /// The model's scheduler.
    pub fn scheduler(&self) -> &Scheduler {
        &self.inner.scheduler
    }

    /// True when both handles refer to the same instance.
    pub fn ptr_eq(a: &Model, b: &Model) -> bool {
        Arc::ptr_eq(&a.inner, &b.inner)
    }

    /// Allocate nested object nodes from a construction tree and return the
    /// resulting value.
    pub fn insert(&self, init: Init) -> Value {
        match init {
            Init::Value(value) => value,
            Init::Object(entries) => {
                let mut node_entries = Vec::with_capacity(entries.len());
                for (key, child) in entries {
                    node_entries.push((key, self.insert(child)));
                }
                let id = ObjectId::next();
                self.inner.nodes.lock().insert(
                    id,
                    Node {
                        entries: node_entries,
                    },
                );
                Value::Object(id)
            }
        }
    }

    /// A single-property capability for `link`.
    ///
    /// Fails with [`ModelError::ForeignTarget`] when the link's owner is not
    /// part of this model's node tree.
    pub fn reference(&self, link: Link) -> Result<Reference, ModelError> {
        if !self.inner.nodes.lock().contains_key(&link.owner) {
            return Err(ModelError::ForeignTarget);
        }
        Ok(Reference::new(self.clone(), link))
    }

    /// Subscribe to Modify events for the property `chain` addresses.
    ///
    /// Filtering is by the chain's terminal link, so chains captured from an
    /// attached child model observe piped events too.
    pub fn observe(
        &self,
        chain: &Chain,
        listener: impl Fn(&Event) + Send + Sync + 'static,
    ) -> Result<Subscription, ModelError> {
        let link = chain.last().ok_or(ModelError::EmptyChain)?.clone();
        Ok(self
            .inner
            .bus
            .on(listener, Some(EventFilter::for_link(EventKind::Modify, link))))
    }

    /// Manually schedule a Modify event for an externally-mutated property.
    ///
    /// Used when a value was mutated through something that bypassed the
    /// accessor layer (an opaque leaf mutated in place, say). Deduplicated
    /// like any other write; the delivered event reads the live value.
    pub fn notify(&self, chain: Chain) -> Result<(), ModelError> {
        let link = chain.last().ok_or(ModelError::EmptyChain)?.clone();
        self.schedule_modify(link, chain, None);
        Ok(())
    }

    /// A memoized derived value recomputed when any property read during its
    /// evaluation changes.
    ///
    /// ```
    /// # use reflow::{Model, Shape, Value};
    /// let shape = Shape::builder("Point")
    ///     .field_default("x", 1)
    ///     .field_default("y", 2)
    ///     .build();
    /// let model = Model::new(shape);
    /// let root = model.root();
    /// let sum = model.computed(move || {
    ///     let x = root.get("x").unwrap().as_int().unwrap_or(0);
    ///     let y = root.get("y").unwrap().as_int().unwrap_or(0);
    ///     x + y
    /// });
    /// assert_eq!(sum.get().unwrap(), 3);
    /// ```
    pub fn computed<T, F>(&self, compute: F) -> Computed<T>
    where
        T: PartialEq + Clone + Send + Sync + 'static,
        F: Fn() -> T + Send + Sync + 'static,
    {
        Computed::new(self.clone(), compute)
    }

    /// Queue a task into the model's batch.
    pub fn schedule(&self, task: Task) {
        self.inner.scheduler.enqueue(task);
    }

    /// Flush the pending batch: deliver every scheduled notification.
    pub fn tick(&self) {
        self.inner.tracer.on_flush();
        self.inner.scheduler.flush();
    }

    // ---- internal: capture ----

    /// Run `f` while collecting the terminal link of every Get event emitted
    /// on this model's bus. Returns the result and the deduplicated links in
    /// first-read order. Reads performed after `f` returns (from deferred
    /// callbacks, say) are not captured.
    pub(crate) fn capture<T>(&self, f: impl FnOnce() -> T) -> (T, Vec<Link>) {
        let collected: Arc<Mutex<Vec<Link>>> = Arc::new(Mutex::new(Vec::new()));
        let sink = collected.clone();
        let collector = self.inner.bus.on(
            move |event| {
                sink.lock().push(event.link().clone());
            },
            Some(EventFilter::of_kind(EventKind::Get)),
        );
        let out = f();
        collector.revoke();

        let mut links: Vec<Link> = std::mem::take(&mut *collected.lock());
        let mut seen = HashSet::new();
        links.retain(|link| seen.insert(link.clone()));
        (out, links)
    }

    // ---- internal: reads and writes ----

    pub(crate) fn raw_value(&self, link: &Link) -> Result<Value, ModelError> {
        self.inner
            .nodes
            .lock()
            .get(&link.owner)
            .ok_or(ModelError::ForeignTarget)?
            .get(&link.key)
            .cloned()
            .ok_or_else(|| ModelError::UnknownProperty {
                key: link.key.clone(),
            })
    }

    pub(crate) fn write(
        &self,
        id: ObjectId,
        chain_prefix: &Chain,
        key: &Key,
        value: Value,
        silent: bool,
    ) -> Result<(), ModelError> {
        let is_root = id == self.inner.root;
        let shape = &self.inner.shape;
        let field_kind = if is_root {
            shape.field(key).map(|field| &field.kind)
        } else {
            None
        };
        let mods = if is_root { shape.modifier_set(key) } else { None };

        if matches!(field_kind, Some(FieldKind::Getter(_))) {
            return Err(ModelError::ComputedProperty { key: key.clone() });
        }
        if mods.map_or(false, |m| m.readonly) {
            return Err(ModelError::Readonly { key: key.clone() });
        }

        let attached = matches!(field_kind, Some(FieldKind::Attached));
        if attached {
            match &value {
                Value::Model(child) => child.bus().pipe(self.bus()),
                Value::Null => {}
                _ => return Err(ModelError::NotAModel { key: key.clone() }),
            }
        }

        let old = {
            let mut nodes = self.inner.nodes.lock();
            let node = nodes.get_mut(&id).ok_or(ModelError::ForeignTarget)?;
            node.set(key, value)
        };

        // attached assignments are exempt from Modify emission; only the
        // piped child events surface
        let suppressed = silent || attached || mods.map_or(false, |m| m.ignore);
        if suppressed {
            return Ok(());
        }

        let link = Link {
            owner: id,
            key: key.clone(),
        };
        let chain = chain_prefix.extended(link.clone());
        self.schedule_modify(link, chain, old);
        Ok(())
    }

    /// Record the pre-batch old value (first write wins the record) and
    /// queue a delivery task deduplicated by link. Delivery reads the live
    /// value, so the last write of the batch wins the notification.
    fn schedule_modify(&self, link: Link, chain: Chain, old: Option<Value>) {
        self.inner
            .pending
            .lock()
            .entry(link.clone())
            .or_insert(PendingWrite { chain, old });

        self.inner.tracer.on_schedule(&link);
        let weak = Arc::downgrade(&self.inner);
        let task_link = link.clone();
        self.inner.scheduler.enqueue_keyed(
            link,
            Box::new(move || {
                if let Some(inner) = weak.upgrade() {
                    Model { inner }.deliver_modify(&task_link);
                }
            }),
        );
    }

    fn deliver_modify(&self, link: &Link) {
        let Some(PendingWrite { chain, old }) = self.inner.pending.lock().remove(link) else {
            return;
        };
        let new = self
            .inner
            .nodes
            .lock()
            .get(&link.owner)
            .and_then(|node| node.get(&link.key).cloned());
        let changes = match (&old, &new) {
            (Some(Value::Object(old_id)), Some(Value::Object(new_id))) if old_id != new_id => {
                Some(self.diff_objects(*old_id, *new_id))
            }
            _ => None,
        };
        self.emit(&Event::modify(chain, old, new, changes));
    }

    pub(crate) fn emit(&self, event: &Event) {
        self.inner.tracer.on_emit(event);
        self.inner.bus.emit(event);
    }

    fn diff_objects(&self, old_id: ObjectId, new_id: ObjectId) -> Changes {
        let nodes = self.inner.nodes.lock();
        let mut visited = HashSet::new();
        diff_nodes(&nodes, old_id, new_id, &mut visited)
    }

    // ---- internal: embedded computed slots ----

    fn slot_read(&self, key: &Key, getter: &Getter, silent: bool) -> Result<Value, ModelError> {
        let slot = self
            .inner
            .slots
            .lock()
            .entry(key.clone())
            .or_insert_with(|| Arc::new(SlotState::new()))
            .clone();

        let link = Link {
            owner: self.inner.root,
            key: key.clone(),
        };

        let run_init = {
            let mut state = slot.state.lock();
            if state.initialized {
                false
            } else {
                state.initialized = true;
                true
            }
        };
        if run_init {
            if let Some(mods) = self.inner.shape.modifier_set(key) {
                for extender in &mods.extenders {
                    extender.init(self, &link);
                }
            }
        }

        let value = self.slot_get(&slot, key, getter)?;
        if !silent {
            self.emit(&Event::get(Chain::from_link(link), value.clone()));
        }
        Ok(value)
    }

    fn slot_get(
        &self,
        slot: &Arc<SlotState>,
        key: &Key,
        getter: &Getter,
    ) -> Result<Value, ModelError> {
        {
            let state = slot.state.lock();
            if !state.dirty {
                if let Some(value) = &state.value {
                    return Ok(value.clone());
                }
            }
        }

        // recompute: revoke the previous dependency subscription, run the
        // getter inside a Get collector, then resubscribe to exactly the
        // captured links (even when the value is unchanged; the dependency
        // set may have shifted through a conditional branch)
        let previous = {
            let mut state = slot.state.lock();
            state.dirty = false;
            state.deps.take()
        };
        if let Some(previous) = previous {
            previous.revoke();
        }

        let (mut next, links) = self.capture(|| getter(&self.root()));

        let changed = slot.state.lock().value.as_ref() != Some(&next);
        if changed {
            let extenders = self
                .inner
                .shape
                .modifier_set(key)
                .map(|mods| mods.extenders.clone())
                .unwrap_or_default();
            for extender in &extenders {
                next = extender.compute(next);
            }
            slot.state.lock().value = Some(next.clone());
        }

        let subscription = self.subscribe_slot(slot, key, links, getter.clone());
        let mut state = slot.state.lock();
        state.deps = Some(subscription);
        Ok(state.value.clone().unwrap_or(Value::Null))
    }

    fn subscribe_slot(
        &self,
        slot: &Arc<SlotState>,
        key: &Key,
        links: Vec<Link>,
        getter: Getter,
    ) -> Subscription {
        if links.is_empty() {
            return Subscription::noop();
        }
        let weak_model = Arc::downgrade(&self.inner);
        let weak_slot = Arc::downgrade(slot);
        let key = key.clone();
        self.inner.bus.on(
            move |_event| {
                let (Some(inner), Some(slot)) = (weak_model.upgrade(), weak_slot.upgrade()) else {
                    return;
                };
                Model { inner }.slot_invalidated(&slot, &key, &getter);
            },
            Some(EventFilter::for_links(EventKind::Modify, links)),
        )
    }

    fn slot_invalidated(&self, slot: &Arc<SlotState>, key: &Key, getter: &Getter) {
        let link = Link {
            owner: self.inner.root,
            key: key.clone(),
        };
        let old = {
            let mut state = slot.state.lock();
            state.dirty = true;
            state.value.clone()
        };

        let mods = self.inner.shape.modifier_set(key);
        let extenders = mods
            .map(|mods| mods.extenders.clone())
            .unwrap_or_default();
        for extender in &extenders {
            match extender.recompute() {
                Ok(true) => {}
                Ok(false) => {
                    // value considered unaffected
                    slot.state.lock().dirty = false;
                    return;
                }
                Err(error) => {
                    self.inner.tracer.on_extender_error(&link, &error);
                    return;
                }
            }
            match extender.notify(old.as_ref().unwrap_or(&Value::Null)) {
                Ok(true) => {}
                Ok(false) => return,
                Err(error) => {
                    self.inner.tracer.on_extender_error(&link, &error);
                    return;
                }
            }
        }

        let throttle = mods.and_then(|mods| mods.throttle);
        let debounce = mods.and_then(|mods| mods.debounce);
        let task = self.slot_notify_task(slot, key, getter, old);
        if let Some(delay) = throttle {
            let already_armed = {
                let mut state = slot.state.lock();
                if state.notify_pending {
                    true
                } else {
                    state.notify_pending = true;
                    false
                }
            };
            if !already_armed {
                self.inner.scheduler.enqueue_after(delay, task);
            }
        } else if let Some(delay) = debounce {
            self.inner.scheduler.enqueue_debounced(link, delay, task);
        } else {
            self.inner.tracer.on_schedule(&link);
            self.inner.scheduler.enqueue_keyed(link, task);
        }
    }

    fn slot_notify_task(
        &self,
        slot: &Arc<SlotState>,
        key: &Key,
        getter: &Getter,
        old: Option<Value>,
    ) -> Task {
        let weak_model = Arc::downgrade(&self.inner);
        let weak_slot = Arc::downgrade(slot);
        let key = key.clone();
        let getter = getter.clone();
        Box::new(move || {
            let (Some(inner), Some(slot)) = (weak_model.upgrade(), weak_slot.upgrade()) else {
                return;
            };
            let model = Model { inner };
            slot.state.lock().notify_pending = false;
            let Ok(new) = model.slot_get(&slot, &key, &getter) else {
                return;
            };
            // unchanged values notify nobody; dependencies were resubscribed
            if Some(&new) == old.as_ref() {
                return;
            }
            let link = Link {
                owner: model.inner.root,
                key,
            };
            model.emit(&Event::modify(
                Chain::from_link(link),
                old,
                Some(new),
                None,
            ));
        })
    }
}

impl fmt::Debug for Model {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Model")
            .field("shape", &self.inner.shape.name())
            .field("root", &self.inner.root)
            .finish()
    }
}

fn diff_nodes(
    nodes: &HashMap<ObjectId, Node>,
    old_id: ObjectId,
    new_id: ObjectId,
    visited: &mut HashSet<(ObjectId, ObjectId)>,
) -> Changes {
    let mut changes = Changes::default();
    if !visited.insert((old_id, new_id)) {
        return changes;
    }
    let (Some(old_node), Some(new_node)) = (nodes.get(&old_id), nodes.get(&new_id)) else {
        return changes;
    };

    for (key, new_value) in &new_node.entries {
        match old_node.get(key) {
            None => changes.additions.push(Diff::new(key.clone())),
            Some(old_value) if old_value != new_value => {
                let nested = match (old_value, new_value) {
                    (Value::Object(old_child), Value::Object(new_child)) => {
                        let child = diff_nodes(nodes, *old_child, *new_child, visited);
                        let mut nested = child.additions;
                        nested.extend(child.modifications);
                        nested.extend(child.deletions);
                        nested
                    }
                    _ => Vec::new(),
                };
                changes.modifications.push(Diff {
                    key: key.clone(),
                    nested,
                });
            }
            Some(_) => {}
        }
    }
    for (key, _) in &old_node.entries {
        if new_node.get(key).is_none() {
            changes.deletions.push(Diff::new(key.clone()));
        }
    }
    changes
}

/// Accessor handle to one node of a model's reactive tree.
///
/// Handles are created per access and carry the chain prefix from the model
/// root; node identity lives in [`ObjectId`], so repeated access through a
/// cyclic graph terminates and always lands on the same node.
#[derive(Clone)]
pub struct ObjectRef {
    model: Model,
    id: ObjectId,
    chain: Chain,
}

impl ObjectRef {
    /// The model this handle belongs to.
    pub fn model(&self) -> &Model {
        &self.model
    }

    /// Identity of the node this handle points at.
    pub fn id(&self) -> ObjectId {
        self.id
    }

    /// Chain prefix from the model root to this node.
    pub fn chain(&self) -> &Chain {
        &self.chain
    }

    /// This node as a property value, for aliasing.
    pub fn as_value(&self) -> Value {
        Value::Object(self.id)
    }

    /// Capture the link for `key` without dereferencing or emitting.
    pub fn link(&self, key: impl Into<Key>) -> Link {
        Link {
            owner: self.id,
            key: key.into(),
        }
    }

    /// Capture the full chain for `key` without dereferencing or emitting.
    pub fn chain_to(&self, key: impl Into<Key>) -> Chain {
        self.chain.extended(self.link(key))
    }

    /// Read a property, emitting a Get event tagged with the full chain.
    pub fn get(&self, key: impl Into<Key>) -> Result<Value, ModelError> {
        self.read(key.into(), false)
    }

    /// Read a property without emitting; observers and dependency capture
    /// see nothing.
    pub fn get_silent(&self, key: impl Into<Key>) -> Result<Value, ModelError> {
        self.read(key.into(), true)
    }

    /// Read a property and descend into its object value.
    pub fn object(&self, key: impl Into<Key>) -> Result<ObjectRef, ModelError> {
        let key = key.into();
        match self.get(key.clone())? {
            Value::Object(id) => Ok(ObjectRef {
                model: self.model.clone(),
                id,
                chain: self.chain.extended(Link {
                    owner: self.id,
                    key,
                }),
            }),
            _ => Err(ModelError::NotAnObject { key }),
        }
    }

    /// Read an attached property's child model.
    pub fn attached(&self, key: impl Into<Key>) -> Result<Model, ModelError> {
        let key = key.into();
        match self.read(key.clone(), true)? {
            Value::Model(model) => Ok(model),
            _ => Err(ModelError::NotAModel { key }),
        }
    }

    /// Write a property. The assignment is visible to synchronous reads
    /// immediately; the Modify notification is delivered at the next flush,
    /// at most once per link per batch.
    pub fn set(&self, key: impl Into<Key>, value: impl Into<Value>) -> Result<(), ModelError> {
        self.model
            .write(self.id, &self.chain, &key.into(), value.into(), false)
    }

    /// Write a property without scheduling any notification. Attached-field
    /// piping still happens.
    pub fn set_silent(
        &self,
        key: impl Into<Key>,
        value: impl Into<Value>,
    ) -> Result<(), ModelError> {
        self.model
            .write(self.id, &self.chain, &key.into(), value.into(), true)
    }

    /// The node's data keys, in insertion order.
    pub fn keys(&self) -> Vec<Key> {
        self.model
            .inner
            .nodes
            .lock()
            .get(&self.id)
            .map(|node| node.keys())
            .unwrap_or_default()
    }

    fn read(&self, key: Key, silent: bool) -> Result<Value, ModelError> {
        if self.id == self.model.inner.root {
            let shape = self.model.inner.shape.clone();
            if let Some(field) = shape.field(&key) {
                match &field.kind {
                    FieldKind::Getter(getter) => {
                        return self.model.slot_read(&key, getter, silent);
                    }
                    // attach implies ignore: raw value, no event
                    FieldKind::Attached => return self.raw_get(&key),
                    FieldKind::Data(_) => {}
                }
            }
            if shape.modifier_set(&key).map_or(false, |mods| mods.ignore) {
                return self.raw_get(&key);
            }
        }

        let value = self.raw_get(&key)?;
        if !silent {
            let chain = self.chain.extended(Link {
                owner: self.id,
                key,
            });
            self.model.emit(&Event::get(chain, value.clone()));
        }
        Ok(value)
    }

    fn raw_get(&self, key: &Key) -> Result<Value, ModelError> {
        self.model.raw_value(&Link {
            owner: self.id,
            key: key.clone(),
        })
    }
}

impl fmt::Debug for ObjectRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ObjectRef")
            .field("id", &self.id)
            .field("chain", &self.chain)
            .finish()
    }
}
