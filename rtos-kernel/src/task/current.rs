use crate::kernel::Kernel;
use crate::{rt, port, RtosError, Ticks};

use super::TaskHandle;

/// The task that is currently executing.
///
/// All functions act on the calling task.
#[derive(Debug)]
#[non_exhaustive]
pub struct CurrentTask {}

impl CurrentTask {
  pub(crate) const fn new_unchecked() -> Self {
    Self {}
  }

  /// Get the handle of the calling task.
  pub fn handle() -> Result<TaskHandle, RtosError> {
    TaskHandle::current()
  }

  /// Delay the execution of the current task.
  ///
  /// Once the delay is over the task queues up behind other ready tasks of
  /// its priority.
  pub fn delay(delay: impl Into<Ticks>) {
    let ticks = delay.into().as_ticks();
    let _ = rt::with(|kernel| kernel.delay(ticks));
  }

  /// Delay until `period` after `previous_wake`, which is then advanced by
  /// `period`. Returns `false` if that time already passed.
  pub fn delay_until(previous_wake: &mut Ticks, period: impl Into<Ticks>) -> bool {
    let period = period.into().as_ticks();
    let mut wake = previous_wake.as_ticks();
    let delayed = rt::with(|kernel| kernel.delay_until(&mut wake, period)).unwrap_or(false);
    *previous_wake = Ticks::new(wake);
    delayed
  }

  /// Let other ready tasks of the same priority run.
  pub fn yield_now() {
    let _ = rt::with(Kernel::yield_now);
  }

  /// Suspend the calling task until another task resumes it.
  pub fn suspend() -> Result<(), RtosError> {
    rt::with(|kernel| kernel.suspend(None))?
  }

  /// Delete the calling task. Does not return.
  pub fn delete() -> ! {
    let _ = rt::with(|kernel| kernel.delete_task(None));
    loop {
      // Only reached while the kernel is not scheduling.
      port::relax();
    }
  }

  /// Wait for the notification value to become non-zero, then return it
  /// after decrementing it, or zeroing it if `clear_on_exit` is set.
  pub fn notify_take(clear_on_exit: bool, timeout: impl Into<Ticks>) -> Result<u32, RtosError> {
    rt::block_on(timeout, |kernel, wait| kernel.notify_take(clear_on_exit, wait))
  }

  /// Wait for a notification and return the notification value.
  ///
  /// `clear_on_entry` bits are cleared before waiting unless a notification
  /// is already pending, `clear_on_exit` bits after receiving it.
  pub fn notify_wait(clear_on_entry: u32, clear_on_exit: u32, timeout: impl Into<Ticks>) -> Result<u32, RtosError> {
    rt::block_on(timeout, |kernel, wait| kernel.notify_wait(clear_on_entry, clear_on_exit, wait))
  }

  /// Clear `bits` of the own notification value, returning the value before.
  pub fn clear_notification_bits(bits: u32) -> Result<u32, RtosError> {
    rt::with(|kernel| kernel.clear_notification_bits(None, bits))?
  }
}
