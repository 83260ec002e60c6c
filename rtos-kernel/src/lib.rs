//! # A small real-time kernel for Rust
//!
//! A preemptive, priority-based kernel in the FreeRTOS mould: a tick-driven
//! scheduler with time slicing, blocking queues, semaphores, mutexes with
//! priority inheritance, event groups, software timers, direct-to-task
//! notifications and queue sets. It is `no_std` and needs a global
//! allocator.
//!
//! The kernel itself, [`Kernel`], is a plain state machine that never runs
//! task code. The task, [`sync`] and [`timer`] types drive one global
//! instance on top of a [`port::Port`], which performs the actual context
//! switches. With the `std` feature, [`port::HostPort`] runs every task on an
//! OS thread, one at a time, so programs can be tried out on a desktop.
//!
//! Every operation that can fail returns a [`RtosError`]. Violated kernel
//! invariants are not errors: they halt through [`assert::set_handler`].
//!
//! # Samples
//!
//! Spawning a new task
//!
//! ```no_run
//! # #[cfg(feature = "std")] {
//! use rtos_kernel::{port::HostPort, Config, CurrentTask, Scheduler, Task, Ticks};
//!
//! Scheduler::init(Config::new(), HostPort::new()).unwrap();
//!
//! Task::new().name("hello").stack_size(128).start(|_| {
//!   loop {
//!     log::info!("Hello world!");
//!     CurrentTask::delay(Ticks::MAX);
//!   }
//! }).unwrap();
//!
//! Scheduler::start().unwrap();
//! # }
//! ```
//!
//! Queue
//!
//! ```no_run
//! use rtos_kernel::{sync::Queue, Ticks};
//!
//! let q = Queue::<u32, 10>::new();
//! q.send(10, Ticks::new(5)).unwrap();
//! q.receive(Ticks::MAX).unwrap();
//! ```
//!
//! Mutex
//!
//! ```no_run
//! use rtos_kernel::sync::Mutex;
//!
//! let m = Mutex::new(0);
//! {
//!   let mut v = m.lock().unwrap();
//!   *v += 1;
//! }
//! ```
#![no_std]

extern crate alloc as alloc2;
#[cfg(feature = "std")]
extern crate std;

pub mod assert;
pub mod config;
mod critical_section;
mod delay;
mod error;
mod hooks;
mod interrupt_context;
pub mod kernel;
mod lazy_init;
pub mod port;
pub mod rt;
pub mod sync;
pub mod task;
mod ticks;
pub mod timer;
mod trace;

pub use crate::config::Config;
pub use crate::critical_section::CriticalSection;
pub use crate::delay::{Delay, TaskDelay, TaskDelayPeriodic};
pub use crate::error::RtosError;
pub use crate::hooks::{set_idle_hook, set_post_sleep_hook, set_pre_sleep_hook, set_tick_hook};
pub use crate::interrupt_context::InterruptContext;
pub use crate::kernel::Kernel;
pub use crate::task::*;
pub use crate::ticks::Ticks;
