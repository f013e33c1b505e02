//! Batched task scheduling with per-link deduplication and pluggable ticking.
//!
//! Mutations never notify synchronously: the write path enqueues a delivery
//! task here, deduplicated by [`Link`], and the whole batch runs at the next
//! flush. A batch opens implicitly on the first enqueue of an idle period,
//! at which point the injected [`Ticker`] is asked to arrange the flush.

use std::collections::{HashSet, VecDeque};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::{Duration, Instant};

use parking_lot::Mutex;

use crate::link::Link;

/// A unit of deferred work.
pub type Task = Box<dyn FnOnce() + Send>;

/// The flush entry point handed to a [`Ticker`]. Calling it drains the
/// pending batch; it is safe to call from any thread and after the owning
/// scheduler is gone (it becomes a no-op).
pub type TickFn = Arc<dyn Fn() + Send + Sync>;

/// The injectable scheduling primitive that decides when a pending batch
/// flushes.
///
/// The engine calls [`Ticker::request_tick`] once per batch, when the first
/// task of an idle period is enqueued. Delayed tasks (throttle/debounce
/// timers) that are not yet due when a flush runs stay queued; the embedder
/// is expected to tick again later, the way a frame loop naturally does.
pub trait Ticker: Send + Sync {
    /// Arrange for `flush` to be called at the next cooperative yield point.
    fn request_tick(&self, flush: TickFn);
}

/// Ticker that never arranges anything; the embedder drives flushing
/// explicitly through [`Scheduler::flush`] (or `Model::tick`).
#[derive(Debug, Clone, Copy, Default)]
pub struct ManualTicker;

impl Ticker for ManualTicker {
    fn request_tick(&self, _flush: TickFn) {}
}

/// Ticker that hands the flush entry point to an embedder-provided hook:
/// a frame callback, an executor spawn, a channel send, or whatever yields
/// cooperatively in the host environment.
pub struct CallbackTicker {
    hook: Box<dyn Fn(TickFn) + Send + Sync>,
}

impl CallbackTicker {
    /// Wrap a hook that schedules the flush.
    pub fn new(hook: impl Fn(TickFn) + Send + Sync + 'static) -> Self {
        CallbackTicker {
            hook: Box::new(hook),
        }
    }
}

impl Ticker for CallbackTicker {
    fn request_tick(&self, flush: TickFn) {
        (self.hook)(flush);
    }
}

struct DelayedTask {
    due: Instant,
    slot: Option<Link>,
    task: Task,
}

struct SchedulerInner {
    queue: Mutex<VecDeque<Task>>,
    seen: Mutex<HashSet<Link>>,
    timers: Mutex<Vec<DelayedTask>>,
    tick_requested: AtomicBool,
    ticker: Arc<dyn Ticker>,
}

/// Microtask-style batched task queue with per-link deduplication.
///
/// Cheap to clone; clones share the queue.
#[derive(Clone)]
pub struct Scheduler {
    inner: Arc<SchedulerInner>,
}

impl Scheduler {
    /// Create a scheduler driven by `ticker`.
    pub fn new(ticker: Arc<dyn Ticker>) -> Self {
        Scheduler {
            inner: Arc::new(SchedulerInner {
                queue: Mutex::new(VecDeque::new()),
                seen: Mutex::new(HashSet::new()),
                timers: Mutex::new(Vec::new()),
                tick_requested: AtomicBool::new(false),
                ticker,
            }),
        }
    }

    /// Queue a task unconditionally.
    pub fn enqueue(&self, task: Task) {
        self.inner.queue.lock().push_back(task);
        self.request_tick();
    }

    /// Queue a task unless one was already queued for `link` during the
    /// current unflushed batch. This is what guarantees a single Modify
    /// delivery per link per batch.
    pub fn enqueue_keyed(&self, link: Link, task: Task) {
        if !self.inner.seen.lock().insert(link) {
            return;
        }
        self.enqueue(task);
    }

    /// Queue a task to run at the first flush at or after `delay` from now.
    pub fn enqueue_after(&self, delay: Duration, task: Task) {
        self.inner.timers.lock().push(DelayedTask {
            due: Instant::now() + delay,
            slot: None,
            task,
        });
        self.request_tick();
    }

    /// Queue a delayed task keyed by `link`, replacing any timer already
    /// armed for that link. Re-arming restarts the delay, which is exactly
    /// debounce semantics.
    pub fn enqueue_debounced(&self, link: Link, delay: Duration, task: Task) {
        {
            let mut timers = self.inner.timers.lock();
            timers.retain(|timer| timer.slot.as_ref() != Some(&link));
            timers.push(DelayedTask {
                due: Instant::now() + delay,
                slot: Some(link),
                task,
            });
        }
        self.request_tick();
    }

    /// Drain and run every queued task, including tasks enqueued by other
    /// tasks during this flush, until the queue is empty. Due timers are
    /// promoted into the queue; timers not yet due stay armed for a later
    /// flush.
    pub fn flush(&self) {
        // a fresh dedup window: writes performed by delivered listeners
        // must notify again within this same flush
        self.inner.seen.lock().clear();
        loop {
            let task = self.inner.queue.lock().pop_front();
            if let Some(task) = task {
                task();
                continue;
            }

            let now = Instant::now();
            let mut due = Vec::new();
            {
                let mut timers = self.inner.timers.lock();
                let mut index = 0;
                while index < timers.len() {
                    if timers[index].due <= now {
                        due.push(timers.remove(index));
                    } else {
                        index += 1;
                    }
                }
            }
            if due.is_empty() {
                break;
            }
            due.sort_by_key(|timer| timer.due);
            let mut queue = self.inner.queue.lock();
            for timer in due {
                queue.push_back(timer.task);
            }
        }
        // the batch is drained; the next enqueue opens a new one
        self.inner.tick_requested.store(false, Ordering::SeqCst);
    }

    /// True while any task or timer is queued.
    pub fn has_pending(&self) -> bool {
        !self.inner.queue.lock().is_empty() || !self.inner.timers.lock().is_empty()
    }

    fn request_tick(&self) {
        if self.inner.tick_requested.swap(true, Ordering::SeqCst) {
            return;
        }
        let weak = Arc::downgrade(&self.inner);
        let flush: TickFn = Arc::new(move || {
            if let Some(inner) = weak.upgrade() {
                Scheduler { inner }.flush();
            }
        });
        self.inner.ticker.request_tick(flush);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::link::ObjectId;
    use std::sync::atomic::AtomicUsize;

    fn counting_task(counter: &Arc<AtomicUsize>) -> Task {
        let counter = counter.clone();
        Box::new(move || {
            counter.fetch_add(1, Ordering::SeqCst);
        })
    }

    #[test]
    fn keyed_tasks_deduplicate_within_a_batch() {
        let scheduler = Scheduler::new(Arc::new(ManualTicker));
        let link = Link::new(ObjectId::next(), "x");
        let runs = Arc::new(AtomicUsize::new(0));

        scheduler.enqueue_keyed(link.clone(), counting_task(&runs));
        scheduler.enqueue_keyed(link.clone(), counting_task(&runs));
        scheduler.enqueue_keyed(link.clone(), counting_task(&runs));
        scheduler.flush();

        assert_eq!(runs.load(Ordering::SeqCst), 1);

        // a new batch accepts the key again
        scheduler.enqueue_keyed(link, counting_task(&runs));
        scheduler.flush();
        assert_eq!(runs.load(Ordering::SeqCst), 2);
    }

    #[test]
    fn flush_drains_tasks_enqueued_during_flush() {
        let scheduler = Scheduler::new(Arc::new(ManualTicker));
        let runs = Arc::new(AtomicUsize::new(0));

        let inner_scheduler = scheduler.clone();
        let inner_runs = runs.clone();
        scheduler.enqueue(Box::new(move || {
            inner_runs.fetch_add(1, Ordering::SeqCst);
            let counter = inner_runs.clone();
            inner_scheduler.enqueue(Box::new(move || {
                counter.fetch_add(1, Ordering::SeqCst);
            }));
        }));

        scheduler.flush();
        assert_eq!(runs.load(Ordering::SeqCst), 2);
    }

    #[test]
    fn delayed_tasks_wait_for_their_due_time() {
        let scheduler = Scheduler::new(Arc::new(ManualTicker));
        let runs = Arc::new(AtomicUsize::new(0));

        scheduler.enqueue_after(Duration::from_millis(30), counting_task(&runs));
        scheduler.flush();
        assert_eq!(runs.load(Ordering::SeqCst), 0);
        assert!(scheduler.has_pending());

        std::thread::sleep(Duration::from_millis(40));
        scheduler.flush();
        assert_eq!(runs.load(Ordering::SeqCst), 1);
        assert!(!scheduler.has_pending());
    }

    #[test]
    fn debounced_tasks_replace_armed_timers() {
        let scheduler = Scheduler::new(Arc::new(ManualTicker));
        let link = Link::new(ObjectId::next(), "x");
        let runs = Arc::new(AtomicUsize::new(0));

        scheduler.enqueue_debounced(link.clone(), Duration::from_millis(20), counting_task(&runs));
        scheduler.enqueue_debounced(link.clone(), Duration::from_millis(20), counting_task(&runs));
        scheduler.enqueue_debounced(link, Duration::from_millis(20), counting_task(&runs));

        std::thread::sleep(Duration::from_millis(30));
        scheduler.flush();
        assert_eq!(runs.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn callback_ticker_is_asked_once_per_batch() {
        let requests = Arc::new(AtomicUsize::new(0));
        let seen = requests.clone();
        let ticker = CallbackTicker::new(move |_flush| {
            seen.fetch_add(1, Ordering::SeqCst);
        });
        let scheduler = Scheduler::new(Arc::new(ticker));
        let runs = Arc::new(AtomicUsize::new(0));

        scheduler.enqueue(counting_task(&runs));
        scheduler.enqueue(counting_task(&runs));
        assert_eq!(requests.load(Ordering::SeqCst), 1);

        scheduler.flush();
        scheduler.enqueue(counting_task(&runs));
        assert_eq!(requests.load(Ordering::SeqCst), 2);
    }

    #[test]
    fn callback_ticker_flush_fn_drains_the_batch() {
        let captured: Arc<Mutex<Option<TickFn>>> = Arc::new(Mutex::new(None));
        let slot = captured.clone();
        let ticker = CallbackTicker::new(move |flush| {
            *slot.lock() = Some(flush);
        });
        let scheduler = Scheduler::new(Arc::new(ticker));
        let runs = Arc::new(AtomicUsize::new(0));

        scheduler.enqueue(counting_task(&runs));
        let flush = captured.lock().take().expect("tick requested");
        flush();
        assert_eq!(runs.load(Ordering::SeqCst), 1);
    }
}
