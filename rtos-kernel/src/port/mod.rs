//! The boundary between the kernel and the machine it runs on.
//!
//! A [`Port`] owns everything architecture specific: building the initial
//! stack frame of a task, actually switching contexts, masking interrupts and
//! putting the processor to sleep. The kernel only decides *what* should run.

use crate::config::{StackWord, TickType};
use crate::kernel::TaskId;
use crate::RtosError;

mod sim;
pub use sim::Simulated;

#[cfg(feature = "std")]
pub mod host;
#[cfg(feature = "std")]
pub use host::HostPort;

/// Entry point of a task, called with the task's opaque parameter.
pub type TaskEntry = fn(usize);

/// Saved execution context of a task that is not running.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct TaskContext {
  /// Index into the task's stack the saved frame starts at.
  pub stack_pointer: usize,
}

/// Architecture support for the kernel.
pub trait Port: Send {
  /// Prepare `stack` so that switching to `task` calls `entry(param)`.
  fn init_task_stack(
    &mut self,
    task: TaskId,
    stack: &mut [StackWord],
    entry: TaskEntry,
    param: usize,
  ) -> Result<TaskContext, RtosError>;

  /// Start running `task`; called once when the scheduler starts.
  fn start_first_task(&mut self, task: TaskId);

  /// Switch from `from` to `to`, as soon as the kernel state is released.
  fn request_context_switch(&mut self, from: Option<TaskId>, to: TaskId);

  /// Mask interrupts that may call into the kernel.
  fn disable_interrupts(&mut self) {}

  fn enable_interrupts(&mut self) {}

  /// Mask kernel interrupts from an interrupt, returning the previous mask.
  fn set_interrupt_mask_from_isr(&mut self) -> u32 {
    0
  }

  fn clear_interrupt_mask_from_isr(&mut self, _mask: u32) {}

  /// `task` no longer exists.
  fn task_deleted(&mut self, _task: TaskId) {}

  /// Stop the tick and sleep for at most `expected` ticks.
  ///
  /// Returns the number of ticks that actually passed.
  fn suppress_ticks_and_sleep(&mut self, _expected: TickType) -> TickType {
    0
  }

  fn end_scheduler(&mut self) {}
}

/// Wait until the calling thread is allowed to run kernel calls.
#[inline]
pub(crate) fn wait_turn() {
  #[cfg(feature = "std")]
  host::wait_turn();
}

/// Whether the calling thread may act as `current`, the kernel's running
/// task.
#[cfg(feature = "std")]
#[inline]
pub(crate) fn is_caller_running(current: Option<TaskId>) -> bool {
  host::thread_task().map_or(true, |me| current == Some(me))
}

#[cfg(not(feature = "std"))]
#[inline]
pub(crate) fn is_caller_running(_current: Option<TaskId>) -> bool {
  true
}

/// Give the processor away while idle.
#[inline]
pub(crate) fn relax() {
  #[cfg(feature = "std")]
  host::relax();
  #[cfg(not(feature = "std"))]
  core::hint::spin_loop();
}

/// Park the thread that started the scheduler until the scheduler ends.
pub(crate) fn wait_for_end() {
  #[cfg(feature = "std")]
  host::wait_for_end();
  #[cfg(not(feature = "std"))]
  loop {
    core::hint::spin_loop();
  }
}
