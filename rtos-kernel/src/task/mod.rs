//! Task primitives.
//!
//! # Examples
//!
//! ```no_run
//! # #[cfg(feature = "std")] {
//! use core::time::Duration;
//! use rtos_kernel::{port::HostPort, task::{CurrentTask, Scheduler, Task}, Config};
//!
//! Scheduler::init(Config::new(), HostPort::new()).unwrap();
//!
//! Task::new().name("hello").stack_size(128).start(|_| {
//!   loop {
//!     println!("Hello, world!");
//!     CurrentTask::delay(Duration::from_secs(1));
//!   }
//! }).unwrap();
//!
//! Scheduler::start().unwrap();
//! # }
//! ```

use core::ops::Deref;

use crate::{rt, RtosError};

mod builder;
pub use builder::TaskBuilder;
mod current;
pub use current::CurrentTask;
mod handle;
pub use handle::TaskHandle;
mod name;
pub use name::TaskName;
mod notification;
pub use notification::TaskNotification;
mod priority;
pub use priority::{PriorityOverflow, TaskPriority};
mod scheduler;
pub use scheduler::{Scheduler, SchedulerState};
mod stack_overflow_hook;
pub(crate) use stack_overflow_hook::call_stack_overflow_hook;
pub use stack_overflow_hook::set_stack_overflow_hook;
mod state;
pub use state::TaskState;
mod system_state;
pub use system_state::{SystemState, TaskStatus};

pub use crate::config::MINIMAL_STACK_SIZE;

/// A task.
#[derive(Debug)]
pub struct Task {
  handle: TaskHandle,
}

impl Task {
  /// Prepare a builder object for the new task.
  pub const fn new() -> TaskBuilder<'static> {
    TaskBuilder::new()
  }

  /// Get the handle for the idle task.
  pub fn idle_task() -> Result<TaskHandle, RtosError> {
    rt::with(|kernel| kernel.idle_task())?.map(TaskHandle::from_id).ok_or(RtosError::InvalidHandle)
  }

  /// Find a task by its name.
  pub fn find(name: &str) -> Result<Option<TaskHandle>, RtosError> {
    Ok(rt::with(|kernel| kernel.task_by_name(name))?.map(TaskHandle::from_id))
  }

  /// Get a copyable handle of this task.
  #[inline]
  pub fn handle(&self) -> TaskHandle {
    self.handle
  }
}

impl Deref for Task {
  type Target = TaskHandle;

  #[inline]
  fn deref(&self) -> &Self::Target {
    &self.handle
  }
}
