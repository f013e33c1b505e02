//! Reflow: a reactive dependency-tracking engine.
//!
//! Reflow turns plain state described by a [`Shape`] into an observable
//! [`Model`]: every property read emits a Get event, every write schedules a
//! batched Modify event, and derived values discover which properties they
//! read. No explicit subscription lists, no macros.
//!
//! # Key Features
//!
//! - **Implicit dependency capture**: a computed value's dependencies are
//!   exactly the properties read during its evaluation
//! - **Lazy memoization**: computed values recompute on demand, and only
//!   when a captured dependency actually changed
//! - **Batched notification**: writes within one turn coalesce into a single
//!   delivery per property, last write wins
//! - **Modifier pipeline**: per-property ignore/effect/throttle/debounce/
//!   readonly declarations and ordered extender hooks, declared once per
//!   shape and checked at declaration time
//! - **Nested observability**: object trees wrap lazily, attached child
//!   models pipe their events into the parent's bus
//! - **Pluggable ticking**: batch-flush timing is injected, so the engine
//!   runs identically under a frame loop, an executor, or manual flushing
//!
//! # Example
//!
//! ```
//! use reflow::{Model, Shape, Value};
//!
//! let shape = Shape::builder("Point")
//!     .field_default("x", 1)
//!     .field_default("y", 2)
//!     .getter("sum", |this| {
//!         let x = this.get("x").unwrap().as_int().unwrap_or(0);
//!         let y = this.get("y").unwrap().as_int().unwrap_or(0);
//!         Value::Int(x + y)
//!     })
//!     .build();
//!
//! let model = Model::new(shape);
//! let root = model.root();
//! assert_eq!(root.get("sum").unwrap(), Value::Int(3));
//!
//! let seen = std::sync::Arc::new(parking_lot::Mutex::new(Vec::new()));
//! let sink = seen.clone();
//! let sub = model
//!     .observe(&root.chain_to("sum"), move |event| {
//!         sink.lock().push(event.new_value.clone());
//!     })
//!     .unwrap();
//!
//! root.set("x", 5).unwrap();
//! model.tick();
//! assert_eq!(seen.lock().as_slice(), [Some(Value::Int(7))]);
//! sub.revoke();
//! ```
//!
//! The engine is UI-framework-agnostic: it exposes observation and mutation
//! only, and a rendering or binding layer consumes [`Reference`] and
//! [`Computed`] without ever touching links or chains itself.

mod computed;
mod error;
mod event;
mod link;
mod model;
mod modifier;
mod reference;
mod scheduler;
mod shape;
mod tracer;
mod value;

pub use computed::Computed;
pub use error::ModelError;
pub use event::{Changes, Diff, Event, EventBus, EventFilter, EventKind, Subscription};
pub use link::{Chain, Key, Link, ObjectId};
pub use model::{Model, ModelOptions, ObjectRef};
pub use modifier::{Extender, Modifier, ModifierSet, Modifiers};
pub use reference::Reference;
pub use scheduler::{CallbackTicker, ManualTicker, Scheduler, Task, TickFn, Ticker};
pub use shape::{Getter, Shape, ShapeBuilder};
pub use tracer::{NoopTracer, Tracer};
pub use value::{Init, Value};
