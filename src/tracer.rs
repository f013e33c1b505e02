//! Tracer trait for observing engine activity.
//!
//! The default [`NoopTracer`] costs nothing. Implementations can collect
//! events for tests, forward to a logging facade, or feed an inspector.

use crate::event::Event;
use crate::link::Link;

/// Observability hooks for the engine's notification lifecycle.
///
/// Every method has an empty default, so implementations override only what
/// they care about.
pub trait Tracer: Send + Sync {
    /// An event was delivered on the model's bus.
    fn on_emit(&self, _event: &Event) {}

    /// A Modify notification was scheduled for `link` (deduplicated per
    /// link per batch, so this fires once per batched write).
    fn on_schedule(&self, _link: &Link) {}

    /// A flush pass is about to drain the scheduler.
    fn on_flush(&self) {}

    /// An extender callback failed. The notification cycle for `link` was
    /// suppressed; the error is reported here and nowhere else.
    fn on_extender_error(&self, _link: &Link, _error: &anyhow::Error) {}
}

/// Tracer that ignores everything.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoopTracer;

impl Tracer for NoopTracer {}
