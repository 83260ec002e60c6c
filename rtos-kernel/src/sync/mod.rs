//! Synchronization primitives.
//!
//! All of them create their kernel object on first use, so they can be
//! `static`. Dropping an owned primitive deletes the object.
//!
//! # Examples
//!
//! ## Queue
//!
//! ```no_run
//! use rtos_kernel::{sync::Queue, Ticks};
//!
//! static Q: Queue<u32, 4> = Queue::new();
//!
//! assert!(Q.receive(Ticks::ZERO).is_err());
//!
//! Q.send(10, Ticks::new(5)).unwrap();
//! assert_eq!(Q.receive(Ticks::MAX).unwrap(), 10);
//! ```
//!
//! ## Mutex
//!
//! ```no_run
//! use rtos_kernel::sync::Mutex;
//!
//! static M: Mutex<u32> = Mutex::new(16);
//!
//! {
//!   let mut v = M.lock().unwrap();
//!   *v += 1;
//! }
//!
//! assert_eq!(*M.lock().unwrap(), 17)
//! ```
//!
//! ## Binary Semaphore
//!
//! ```no_run
//! use rtos_kernel::{sync::{Binary, Semaphore}, Ticks};
//!
//! static S: Semaphore<Binary> = Semaphore::new_binary();
//!
//! S.give().unwrap();
//! S.take(Ticks::MAX).unwrap();
//! ```
//!
//! ## Counting Semaphore
//!
//! ```no_run
//! use rtos_kernel::{sync::{Counting, Semaphore}, Ticks};
//!
//! static S: Semaphore<Counting<4, 4>> = Semaphore::new_counting();
//!
//! let _guard = S.lock(Ticks::MAX).unwrap();
//! ```

mod event_group;
pub use event_group::EventGroup;
mod mutex;
pub use mutex::*;
mod queue;
pub use queue::*;
mod queue_set;
pub use queue_set::{QueueSet, QueueSetMember};
mod semaphore;
pub use semaphore::*;

pub use crate::kernel::{EventBits, EVENT_BITS_MASK};
