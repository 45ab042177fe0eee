//! Background task bridge.
//!
//! Slow work (reading a file, transforming a large frame) runs on a producer
//! thread while the caller keeps its own single-threaded loop responsive and
//! polls for completion at a fixed interval.
//!
//! # Example
//!
//! ```rust,ignore
//! use starterkit_processing::bridge::{EventLoop, TaskBridge};
//! use starterkit_processing::loader::load_dataset;
//!
//! let event_loop = EventLoop::new();
//! let bridge = TaskBridge::new(event_loop.clone(), Duration::from_secs(1));
//!
//! bridge.submit_and_continue("load", move || load_dataset(&path), |result| {
//!     match result {
//!         Ok(df) => println!("loaded {:?}", df.shape()),
//!         Err(e) => eprintln!("{e}"),
//!     }
//! });
//! event_loop.run_until_idle();
//! ```

pub mod scheduler;
pub mod task;

pub use scheduler::{EventLoop, Scheduler, TaskBridge, await_and_continue};
pub use task::{TaskHandle, TaskPoll, submit};
