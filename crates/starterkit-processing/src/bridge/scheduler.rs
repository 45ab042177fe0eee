//! Cooperative polling of background tasks from a single-threaded caller.

use crate::bridge::task::{TaskHandle, TaskPoll, submit};
use crate::config::TransformConfig;
use crate::error::Result;
use std::cell::RefCell;
use std::cmp::{Ordering, Reverse};
use std::collections::BinaryHeap;
use std::rc::Rc;
use std::thread;
use std::time::{Duration, Instant};
use tracing::trace;

/// Deferred, one-shot callbacks on the caller's own thread.
///
/// Callbacks need not be `Send`; they always run on the thread that drives
/// the scheduler.
pub trait Scheduler: Clone + 'static {
    fn schedule_once(&self, delay: Duration, callback: Box<dyn FnOnce()>);
}

struct Timer {
    deadline: Instant,
    seq: u64,
    callback: Box<dyn FnOnce()>,
}

impl PartialEq for Timer {
    fn eq(&self, other: &Self) -> bool {
        self.cmp(other) == Ordering::Equal
    }
}

impl Eq for Timer {}

impl PartialOrd for Timer {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for Timer {
    fn cmp(&self, other: &Self) -> Ordering {
        (self.deadline, self.seq).cmp(&(other.deadline, other.seq))
    }
}

#[derive(Default)]
struct LoopState {
    timers: BinaryHeap<Reverse<Timer>>,
    next_seq: u64,
}

/// A minimal single-threaded timer loop.
///
/// Timers with the same deadline run in the order they were scheduled.
#[derive(Clone, Default)]
pub struct EventLoop {
    state: Rc<RefCell<LoopState>>,
}

impl EventLoop {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of scheduled callbacks that have not run yet.
    pub fn pending(&self) -> usize {
        self.state.borrow().timers.len()
    }

    /// Run every callback whose deadline has passed. Never sleeps.
    ///
    /// Callbacks scheduled while this runs wait for the next call.
    pub fn run_pending(&self) -> usize {
        let now = Instant::now();
        let mut ran = 0;
        while let Some(callback) = self.pop_due(now) {
            callback();
            ran += 1;
        }
        ran
    }

    /// Drive the loop until no callbacks remain, sleeping until the next
    /// deadline in between.
    pub fn run_until_idle(&self) {
        loop {
            self.run_pending();
            let Some(deadline) = self.next_deadline() else {
                break;
            };
            let now = Instant::now();
            if deadline > now {
                thread::sleep(deadline - now);
            }
        }
    }

    fn next_deadline(&self) -> Option<Instant> {
        self.state
            .borrow()
            .timers
            .peek()
            .map(|Reverse(timer)| timer.deadline)
    }

    fn pop_due(&self, now: Instant) -> Option<Box<dyn FnOnce()>> {
        // the borrow ends before the callback runs, so callbacks may reschedule
        let mut state = self.state.borrow_mut();
        let due = state
            .timers
            .peek()
            .is_some_and(|Reverse(timer)| timer.deadline <= now);
        if !due {
            return None;
        }
        state.timers.pop().map(|Reverse(timer)| timer.callback)
    }
}

impl Scheduler for EventLoop {
    fn schedule_once(&self, delay: Duration, callback: Box<dyn FnOnce()>) {
        let mut state = self.state.borrow_mut();
        let seq = state.next_seq;
        state.next_seq += 1;
        state.timers.push(Reverse(Timer {
            deadline: Instant::now() + delay,
            seq,
            callback,
        }));
    }
}

/// Invoke `continuation` with the task's result once it has finished.
///
/// Checks once immediately; while the task is still running the check is
/// re-scheduled every `interval` and this returns without blocking. The
/// continuation runs exactly once, on the scheduler's thread.
pub fn await_and_continue<T, S, F>(
    handle: TaskHandle<T>,
    scheduler: &S,
    interval: Duration,
    continuation: F,
) where
    T: 'static,
    S: Scheduler,
    F: FnOnce(Result<T>) + 'static,
{
    match handle.poll() {
        TaskPoll::Ready(result) => continuation(result),
        TaskPoll::Pending(handle) => {
            trace!(
                "Task '{}' still running after {:?}",
                handle.name(),
                handle.elapsed()
            );
            let next = scheduler.clone();
            scheduler.schedule_once(
                interval,
                Box::new(move || await_and_continue(handle, &next, interval, continuation)),
            );
        }
    }
}

/// Submits producers and hands their results to continuations on a
/// [`Scheduler`].
#[derive(Clone)]
pub struct TaskBridge<S: Scheduler> {
    scheduler: S,
    poll_interval: Duration,
}

impl<S: Scheduler> TaskBridge<S> {
    pub fn new(scheduler: S, poll_interval: Duration) -> Self {
        Self {
            scheduler,
            poll_interval,
        }
    }

    /// Bridge polling at the configured interval.
    pub fn with_config(scheduler: S, config: &TransformConfig) -> Self {
        Self::new(scheduler, config.poll_interval)
    }

    pub fn scheduler(&self) -> &S {
        &self.scheduler
    }

    pub fn poll_interval(&self) -> Duration {
        self.poll_interval
    }

    /// Run `producer` in the background and call `continuation` with its
    /// result once it finishes.
    pub fn submit_and_continue<T, P, F>(&self, name: impl Into<String>, producer: P, continuation: F)
    where
        T: Send + 'static,
        P: FnOnce() -> Result<T> + Send + 'static,
        F: FnOnce(Result<T>) + 'static,
    {
        let handle = submit(name, producer);
        self.await_and_continue(handle, continuation);
    }

    /// Wait for an already submitted task.
    pub fn await_and_continue<T, F>(&self, handle: TaskHandle<T>, continuation: F)
    where
        T: 'static,
        F: FnOnce(Result<T>) + 'static,
    {
        await_and_continue(handle, &self.scheduler, self.poll_interval, continuation);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::PreprocessingError;
    use std::cell::{Cell, RefCell};
    use std::sync::mpsc;

    const FAST: Duration = Duration::from_millis(5);

    #[test]
    fn test_event_loop_runs_in_deadline_order() {
        let event_loop = EventLoop::new();
        let order = Rc::new(RefCell::new(Vec::new()));

        for (delay, label) in [(20, "late"), (0, "first"), (0, "second")] {
            let order = order.clone();
            event_loop.schedule_once(
                Duration::from_millis(delay),
                Box::new(move || order.borrow_mut().push(label)),
            );
        }
        assert_eq!(event_loop.pending(), 3);

        event_loop.run_until_idle();
        assert_eq!(*order.borrow(), vec!["first", "second", "late"]);
        assert_eq!(event_loop.pending(), 0);
    }

    #[test]
    fn test_run_pending_does_not_wait_for_future_timers() {
        let event_loop = EventLoop::new();
        event_loop.schedule_once(Duration::from_secs(60), Box::new(|| {}));

        let started = Instant::now();
        assert_eq!(event_loop.run_pending(), 0);
        assert!(started.elapsed() < Duration::from_secs(1));
        assert_eq!(event_loop.pending(), 1);
    }

    #[test]
    fn test_continuation_runs_exactly_once() {
        let event_loop = EventLoop::new();
        let calls = Rc::new(Cell::new(0));
        let value = Rc::new(Cell::new(0));

        let (release, gate) = mpsc::channel::<()>();
        let handle = submit("slow", move || {
            gate.recv().ok();
            Ok(9)
        });

        let (c, v) = (calls.clone(), value.clone());
        await_and_continue(handle, &event_loop, FAST, move |result: Result<i32>| {
            c.set(c.get() + 1);
            v.set(result.unwrap());
        });

        // still running: a re-check is scheduled and nothing ran yet
        assert_eq!(calls.get(), 0);
        assert_eq!(event_loop.pending(), 1);

        release.send(()).unwrap();
        event_loop.run_until_idle();

        assert_eq!(calls.get(), 1);
        assert_eq!(value.get(), 9);
        assert_eq!(event_loop.pending(), 0);
    }

    #[test]
    fn test_continuation_receives_producer_error() {
        let event_loop = EventLoop::new();
        let bridge = TaskBridge::new(event_loop.clone(), FAST);
        let seen = Rc::new(RefCell::new(None));

        let sink = seen.clone();
        bridge.submit_and_continue(
            "failing",
            || Err::<(), _>(PreprocessingError::ColumnNotFound("x".to_string())),
            move |result| *sink.borrow_mut() = Some(result.map_err(|e| e.error_code())),
        );
        event_loop.run_until_idle();

        assert_eq!(*seen.borrow(), Some(Err("PRODUCER_FAILURE")));
    }

    #[test]
    fn test_continuation_receives_producer_panic() {
        let event_loop = EventLoop::new();
        let bridge = TaskBridge::new(event_loop.clone(), FAST);
        let calls = Rc::new(Cell::new(0));
        let panicked = Rc::new(Cell::new(false));

        let (c, p) = (calls.clone(), panicked.clone());
        bridge.submit_and_continue(
            "panicking",
            || -> Result<()> { panic!("producer blew up") },
            move |result| {
                c.set(c.get() + 1);
                p.set(matches!(
                    result,
                    Err(PreprocessingError::ProducerPanicked { .. })
                ));
            },
        );
        event_loop.run_until_idle();

        assert_eq!(calls.get(), 1);
        assert!(panicked.get());
    }

    #[test]
    fn test_bridge_uses_configured_interval() {
        let config = TransformConfig::builder()
            .poll_interval(Duration::from_millis(250))
            .build()
            .unwrap();
        let bridge = TaskBridge::with_config(EventLoop::new(), &config);
        assert_eq!(bridge.poll_interval(), Duration::from_millis(250));
        assert_eq!(bridge.scheduler().pending(), 0);
    }
}
