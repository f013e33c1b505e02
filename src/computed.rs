//! Standalone memoized computed values with implicit dependency capture.
//!
//! A [`Computed`] wraps a user closure. Recomputation opens a temporary
//! Get collector on the model's bus, runs the closure, and subscribes to
//! Modify events on exactly the links read during that synchronous call,
//! no more and no less. Reads performed inside deferred callbacks after the
//! closure returns are deliberately outside the capture window.

use std::sync::Arc;

use parking_lot::Mutex;
use slab::Slab;

use crate::error::ModelError;
use crate::event::{EventFilter, EventKind, Subscription};
use crate::link::Link;
use crate::model::Model;

type ListenerFn<T> = Arc<dyn Fn(&T) + Send + Sync>;

struct State<T> {
    value: Option<T>,
    dirty: bool,
    deps: Option<Subscription>,
    disposed: bool,
    notify_scheduled: bool,
}

struct ComputedInner<T> {
    model: Model,
    compute: Box<dyn Fn() -> T + Send + Sync>,
    state: Mutex<State<T>>,
    listeners: Mutex<Slab<ListenerFn<T>>>,
}

/// A memoized derived value.
///
/// Created through [`Model::computed`]. The value recomputes lazily on
/// [`Computed::get`] when a captured dependency changed; observers are
/// notified through the model's scheduler, batched, and only when the
/// recomputed value actually differs.
pub struct Computed<T> {
    inner: Arc<ComputedInner<T>>,
}

impl<T> Clone for Computed<T> {
    fn clone(&self) -> Self {
        Computed {
            inner: self.inner.clone(),
        }
    }
}

impl<T> Computed<T>
where
    T: PartialEq + Clone + Send + Sync + 'static,
{
    pub(crate) fn new(model: Model, compute: impl Fn() -> T + Send + Sync + 'static) -> Self {
        Computed {
            inner: Arc::new(ComputedInner {
                model,
                compute: Box::new(compute),
                state: Mutex::new(State {
                    value: None,
                    dirty: true,
                    deps: None,
                    disposed: false,
                    notify_scheduled: false,
                }),
                listeners: Mutex::new(Slab::new()),
            }),
        }
    }

    /// The current value, recomputing first if a dependency changed since
    /// the last computation.
    ///
    /// # Errors
    ///
    /// [`ModelError::Disposed`] after [`Computed::dispose`].
    pub fn get(&self) -> Result<T, ModelError> {
        {
            let state = self.inner.state.lock();
            if state.disposed {
                return Err(ModelError::Disposed);
            }
            if !state.dirty {
                if let Some(value) = &state.value {
                    return Ok(value.clone());
                }
            }
        }
        self.recompute()
    }

    /// Listen for value changes. The listener runs at batch flush, after
    /// the value recomputed to something different.
    ///
    /// # Errors
    ///
    /// [`ModelError::Disposed`] after [`Computed::dispose`].
    pub fn observe(
        &self,
        listener: impl Fn(&T) + Send + Sync + 'static,
    ) -> Result<Subscription, ModelError> {
        if self.inner.state.lock().disposed {
            return Err(ModelError::Disposed);
        }
        let key = self.inner.listeners.lock().insert(Arc::new(listener));
        let weak = Arc::downgrade(&self.inner);
        Ok(Subscription::new(move || {
            if let Some(inner) = weak.upgrade() {
                inner.listeners.lock().try_remove(key);
            }
        }))
    }

    /// Revoke every dependency subscription and listener and mark this value
    /// permanently disposed. Further use fails with [`ModelError::Disposed`],
    /// including a second dispose.
    pub fn dispose(&self) -> Result<(), ModelError> {
        let deps = {
            let mut state = self.inner.state.lock();
            if state.disposed {
                return Err(ModelError::Disposed);
            }
            state.disposed = true;
            state.deps.take()
        };
        if let Some(deps) = deps {
            deps.revoke();
        }
        self.inner.listeners.lock().clear();
        Ok(())
    }

    fn recompute(&self) -> Result<T, ModelError> {
        // revoke previous subscriptions before collecting; the dependency
        // set is rebuilt from scratch on every computation
        let previous = self.inner.state.lock().deps.take();
        if let Some(previous) = previous {
            previous.revoke();
        }

        let compute = &self.inner.compute;
        let (next, links) = self.inner.model.capture(|| compute());

        {
            let mut state = self.inner.state.lock();
            state.dirty = false;
            if state.value.as_ref() != Some(&next) {
                state.value = Some(next.clone());
            }
        }

        let subscription = self.subscribe(links);
        self.inner.state.lock().deps = Some(subscription);
        Ok(next)
    }

    fn subscribe(&self, links: Vec<Link>) -> Subscription {
        if links.is_empty() {
            return Subscription::noop();
        }
        let weak = Arc::downgrade(&self.inner);
        self.inner.model.bus().on(
            move |_event| {
                if let Some(inner) = weak.upgrade() {
                    Computed { inner }.invalidated();
                }
            },
            Some(EventFilter::for_links(EventKind::Modify, links)),
        )
    }

    fn invalidated(&self) {
        let schedule = {
            let mut state = self.inner.state.lock();
            if state.disposed {
                return;
            }
            state.dirty = true;
            if state.notify_scheduled {
                false
            } else {
                state.notify_scheduled = true;
                true
            }
        };
        if !schedule {
            return;
        }

        let weak = Arc::downgrade(&self.inner);
        self.inner.model.scheduler().enqueue(Box::new(move || {
            let Some(inner) = weak.upgrade() else {
                return;
            };
            let this = Computed { inner };
            let old = {
                let mut state = this.inner.state.lock();
                state.notify_scheduled = false;
                if state.disposed {
                    return;
                }
                state.value.clone()
            };
            let Ok(new) = this.get() else {
                return;
            };
            if Some(&new) == old.as_ref() {
                return;
            }
            let listeners: Vec<ListenerFn<T>> = this
                .inner
                .listeners
                .lock()
                .iter()
                .map(|(_, listener)| listener.clone())
                .collect();
            for listener in listeners {
                listener(&new);
            }
        }));
    }
}

impl<T> std::fmt::Debug for Computed<T> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Computed").finish_non_exhaustive()
    }
}
