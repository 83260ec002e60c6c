//! Software timers, run by the timer daemon task.

use core::mem;
use core::ops::Deref;

use crate::task::TaskHandle;
use crate::{rt, RtosError, Ticks};

mod builder;
pub use builder::TimerBuilder;
mod handle;
pub use handle::TimerHandle;

pub use crate::kernel::TimerId;

/// A software timer.
///
/// Note that all operations on a timer are processed by the timer daemon task
/// that receives messages in a queue. Every operation has an associated waiting time
/// for that queue to get unblocked.
///
/// ```no_run
/// use rtos_kernel::{timer::Timer, Ticks};
///
/// let timer = Timer::build()
///   .name("blink")
///   .period(Ticks::new(500))
///   .create(|timer| log::info!("{} expired", timer.name().unwrap()))
///   .unwrap();
/// timer.start(Ticks::MAX).unwrap();
/// ```
#[derive(Debug)]
#[must_use = "timer will be deleted immediately if unused"]
pub struct Timer {
  handle: TimerHandle,
}

impl Timer {
  /// The task running timer callbacks, once the scheduler started.
  pub fn daemon_task() -> Result<Option<TaskHandle>, RtosError> {
    Ok(rt::with_isr(|kernel| kernel.timer_daemon())?.map(TaskHandle::from_id))
  }

  /// Create a new timer builder.
  pub const fn build() -> TimerBuilder<'static> {
    TimerBuilder { name: "", period: Ticks::ZERO, auto_reload: true, id: 0 }
  }

  /// Detach this timer from Rust's memory management. The timer will still be active and
  /// will consume the memory.
  ///
  /// Can be used for timers that will never be changed and don't need to stay in scope.
  ///
  /// This is the same as calling [`mem::forget`], but self-documenting.
  pub fn detach(self) -> TimerHandle {
    let handle = self.handle;
    mem::forget(self);
    handle
  }
}

impl Deref for Timer {
  type Target = TimerHandle;

  fn deref(&self) -> &Self::Target {
    &self.handle
  }
}

impl Drop for Timer {
  fn drop(&mut self) {
    let _ = self.handle.delete(Ticks::MAX);
  }
}
