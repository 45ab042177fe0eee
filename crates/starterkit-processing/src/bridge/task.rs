//! Background producers and their completion handles.
//!
//! A producer runs on its own detached thread. The only state it shares with
//! the caller is the handle's cell: the result slot, written exactly once,
//! and the liveness flag, cleared right after the slot is written.

use crate::error::{PreprocessingError, Result};
use parking_lot::Mutex;
use std::any::Any;
use std::panic::{AssertUnwindSafe, catch_unwind};
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::thread;
use std::time::{Duration, Instant};
use tracing::{debug, error, warn};

struct TaskShared<T> {
    live: AtomicBool,
    slot: Mutex<Option<Result<T>>>,
}

impl<T> TaskShared<T> {
    /// Publish the result. The flag store is the last write.
    fn finish(&self, result: Result<T>) {
        *self.slot.lock() = Some(result);
        self.live.store(false, Ordering::Release);
    }
}

/// One in-flight background computation.
///
/// Created by [`submit`]. Taking the result through [`poll`](Self::poll)
/// consumes the handle. Dropping a handle does not stop its producer; the
/// result is then discarded.
pub struct TaskHandle<T> {
    name: String,
    submitted_at: Instant,
    shared: Arc<TaskShared<T>>,
}

/// Outcome of a non-blocking completion check.
pub enum TaskPoll<T> {
    /// Still running; the handle is given back.
    Pending(TaskHandle<T>),
    Ready(Result<T>),
}

impl<T> TaskPoll<T> {
    pub fn is_ready(&self) -> bool {
        matches!(self, Self::Ready(_))
    }
}

static_assertions::assert_impl_all!(TaskHandle<polars::prelude::DataFrame>: Send);
static_assertions::assert_impl_all!(TaskHandle<String>: Send, Sync);

impl<T> TaskHandle<T> {
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Time since the producer was submitted.
    pub fn elapsed(&self) -> Duration {
        self.submitted_at.elapsed()
    }

    /// Whether the producer has finished. Never blocks.
    pub fn is_finished(&self) -> bool {
        !self.shared.live.load(Ordering::Acquire)
    }

    /// Check for completion without blocking.
    ///
    /// Returns the handle back while the producer is live, otherwise its
    /// result.
    pub fn poll(self) -> TaskPoll<T> {
        if !self.is_finished() {
            return TaskPoll::Pending(self);
        }
        let result = self.shared.slot.lock().take();
        match result {
            Some(result) => TaskPoll::Ready(result),
            // unreachable while the slot is written before the flag is cleared
            None => TaskPoll::Ready(Err(PreprocessingError::Internal(format!(
                "task '{}' finished without a result",
                self.name
            )))),
        }
    }

    fn finished(name: String, result: Result<T>) -> Self {
        Self {
            name,
            submitted_at: Instant::now(),
            shared: Arc::new(TaskShared {
                live: AtomicBool::new(false),
                slot: Mutex::new(Some(result)),
            }),
        }
    }
}

/// Run `producer` on a new named thread and return its handle immediately.
///
/// A producer error is wrapped in [`PreprocessingError::ProducerFailed`] and a
/// panic becomes [`PreprocessingError::ProducerPanicked`]. If no thread can be
/// spawned the returned handle is already finished with an internal error.
/// In every case the handle eventually reports finished.
pub fn submit<T, F>(name: impl Into<String>, producer: F) -> TaskHandle<T>
where
    T: Send + 'static,
    F: FnOnce() -> Result<T> + Send + 'static,
{
    let name = name.into();
    let shared = Arc::new(TaskShared {
        live: AtomicBool::new(true),
        slot: Mutex::new(None),
    });

    let worker_shared = Arc::clone(&shared);
    let task = name.clone();
    let spawned = thread::Builder::new()
        .name(format!("task-{name}"))
        .spawn(move || {
            let result = match catch_unwind(AssertUnwindSafe(producer)) {
                Ok(Ok(value)) => Ok(value),
                Ok(Err(source)) => {
                    warn!("Task '{}' failed: {}", task, source);
                    Err(PreprocessingError::ProducerFailed {
                        task,
                        source: Box::new(source),
                    })
                }
                Err(payload) => {
                    let message = panic_message(payload.as_ref());
                    error!("Task '{}' panicked: {}", task, message);
                    Err(PreprocessingError::ProducerPanicked { task, message })
                }
            };
            worker_shared.finish(result);
        });

    match spawned {
        // detached: the thread outlives the join handle
        Ok(_) => {
            debug!("Submitted task '{}'", name);
            TaskHandle {
                name,
                submitted_at: Instant::now(),
                shared,
            }
        }
        Err(e) => {
            error!("Failed to spawn thread for task '{}': {}", name, e);
            let err = PreprocessingError::Internal(format!("failed to spawn task '{name}': {e}"));
            TaskHandle::finished(name, Err(err))
        }
    }
}

fn panic_message(payload: &(dyn Any + Send)) -> String {
    if let Some(s) = payload.downcast_ref::<&str>() {
        s.to_string()
    } else if let Some(s) = payload.downcast_ref::<String>() {
        s.clone()
    } else {
        "unknown panic".to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::mpsc;

    fn wait(mut handle: TaskHandle<i32>) -> Result<i32> {
        loop {
            match handle.poll() {
                TaskPoll::Ready(result) => return result,
                TaskPoll::Pending(h) => {
                    handle = h;
                    thread::sleep(Duration::from_millis(5));
                }
            }
        }
    }

    #[test]
    fn test_submit_returns_value() {
        let handle = submit("answer", || Ok(42));
        assert_eq!(handle.name(), "answer");
        assert_eq!(wait(handle).unwrap(), 42);
    }

    #[test]
    fn test_poll_does_not_block_on_running_producer() {
        let (release, gate) = mpsc::channel::<()>();
        let handle = submit("gated", move || {
            gate.recv().ok();
            Ok(1)
        });

        let started = Instant::now();
        let handle = match handle.poll() {
            TaskPoll::Pending(handle) => handle,
            TaskPoll::Ready(_) => panic!("producer cannot finish before the gate opens"),
        };
        assert!(started.elapsed() < Duration::from_secs(1));
        assert!(!handle.is_finished());

        release.send(()).unwrap();
        assert_eq!(wait(handle).unwrap(), 1);
    }

    #[test]
    fn test_producer_error_is_wrapped() {
        let handle = submit("broken", || {
            Err::<i32, _>(PreprocessingError::UnsupportedFormat("xlsx".to_string()))
        });

        let err = wait(handle).unwrap_err();
        assert!(err.is_producer_failure());
        match err {
            PreprocessingError::ProducerFailed { task, source } => {
                assert_eq!(task, "broken");
                assert_eq!(source.error_code(), "UNSUPPORTED_FORMAT");
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn test_producer_panic_flips_liveness() {
        let handle = submit("explodes", || -> Result<i32> { panic!("boom") });

        let err = wait(handle).unwrap_err();
        assert!(matches!(
            err,
            PreprocessingError::ProducerPanicked { ref message, .. } if message == "boom"
        ));
    }

    #[test]
    fn test_dropped_handle_does_not_stop_producer() {
        let (tx, rx) = mpsc::channel();
        let handle = submit("detached", move || {
            tx.send(7).ok();
            Ok(())
        });
        drop(handle);
        assert_eq!(rx.recv_timeout(Duration::from_secs(5)).unwrap(), 7);
    }

    #[test]
    fn test_panic_message_formats() {
        let owned: Box<dyn Any + Send> = Box::new(String::from("owned"));
        assert_eq!(panic_message(owned.as_ref()), "owned");
        let other: Box<dyn Any + Send> = Box::new(5u8);
        assert_eq!(panic_message(other.as_ref()), "unknown panic");
    }
}
