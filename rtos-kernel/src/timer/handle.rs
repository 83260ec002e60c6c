use crate::config::MAX_TASK_NAME_LEN;
use crate::kernel::TimerId;
use crate::task::TaskName;
use crate::{rt, InterruptContext, RtosError, Ticks};

/// A handle for managing a timer.
///
/// See [`Timer`](crate::timer::Timer) for the preferred owned version.
///
/// Commands are carried out by the timer daemon task. Their `timeout` bounds
/// the wait for room in its command queue, not the command itself.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct TimerHandle {
  id: TimerId,
}

impl TimerHandle {
  pub(crate) const fn from_id(id: TimerId) -> Self {
    Self { id }
  }

  /// The kernel id of the timer.
  #[inline]
  pub const fn id(&self) -> TimerId {
    self.id
  }

  /// Get the timer's name.
  pub fn name(&self) -> Result<TaskName<MAX_TASK_NAME_LEN>, RtosError> {
    rt::with_isr(|kernel| kernel.timer_name(self.id).map(TaskName::new))?
  }

  /// Check if the timer is active.
  ///
  /// A command still waiting for the daemon does not count yet.
  #[inline]
  pub fn is_active(&self) -> Result<bool, RtosError> {
    rt::with_isr(|kernel| kernel.timer_is_active(self.id))?
  }

  /// Start the timer, expiring one period from now.
  #[inline]
  pub fn start(&self, timeout: impl Into<Ticks>) -> Result<(), RtosError> {
    let id = self.id;
    rt::block_on(timeout, |kernel, wait| kernel.start_timer(id, wait))
  }

  /// Start the timer from an interrupt service routine.
  #[inline]
  pub fn start_from_isr(&self, ic: &InterruptContext) -> Result<(), RtosError> {
    ic.wake(rt::with_isr(|kernel| kernel.start_timer_from_isr(self.id))??);
    Ok(())
  }

  /// Restart the timer, expiring one period from now.
  #[inline]
  pub fn reset(&self, timeout: impl Into<Ticks>) -> Result<(), RtosError> {
    let id = self.id;
    rt::block_on(timeout, |kernel, wait| kernel.reset_timer(id, wait))
  }

  /// Restart the timer from an interrupt service routine.
  #[inline]
  pub fn reset_from_isr(&self, ic: &InterruptContext) -> Result<(), RtosError> {
    ic.wake(rt::with_isr(|kernel| kernel.reset_timer_from_isr(self.id))??);
    Ok(())
  }

  /// Stop the timer.
  #[inline]
  pub fn stop(&self, timeout: impl Into<Ticks>) -> Result<(), RtosError> {
    let id = self.id;
    rt::block_on(timeout, |kernel, wait| kernel.stop_timer(id, wait))
  }

  /// Stop the timer from an interrupt service routine.
  #[inline]
  pub fn stop_from_isr(&self, ic: &InterruptContext) -> Result<(), RtosError> {
    ic.wake(rt::with_isr(|kernel| kernel.stop_timer_from_isr(self.id))??);
    Ok(())
  }

  /// Get the timer's period.
  #[inline]
  pub fn period(&self) -> Result<Ticks, RtosError> {
    rt::with_isr(|kernel| kernel.timer_period(self.id).map(Ticks::new))?
  }

  /// The tick the timer expires at next, if it is active.
  #[inline]
  pub fn expiry_time(&self) -> Result<Option<Ticks>, RtosError> {
    rt::with_isr(|kernel| kernel.timer_expiry_time(self.id).map(|expiry| expiry.map(Ticks::new)))?
  }

  /// Change the period of the timer and start it.
  #[inline]
  pub fn change_period(&self, timeout: impl Into<Ticks>, new_period: impl Into<Ticks>) -> Result<(), RtosError> {
    let (id, period) = (self.id, new_period.into().as_ticks());
    rt::block_on(timeout, |kernel, wait| kernel.change_timer_period(id, period, wait))
  }

  /// Change the period of the timer from an interrupt service routine.
  #[inline]
  pub fn change_period_from_isr(&self, ic: &InterruptContext, new_period: impl Into<Ticks>) -> Result<(), RtosError> {
    let period = new_period.into().as_ticks();
    ic.wake(rt::with_isr(|kernel| kernel.change_timer_period_from_isr(self.id, period))??);
    Ok(())
  }

  /// Get the identifier value given to the timer.
  #[inline]
  pub fn id_value(&self) -> Result<usize, RtosError> {
    rt::with_isr(|kernel| kernel.timer_id_value(self.id))?
  }

  /// Replace the identifier value, for example to keep a count in it.
  #[inline]
  pub fn set_id_value(&self, value: usize) -> Result<(), RtosError> {
    rt::with_isr(|kernel| kernel.set_timer_id_value(self.id, value))?
  }

  #[inline]
  pub fn auto_reload(&self) -> Result<bool, RtosError> {
    rt::with_isr(|kernel| kernel.timer_auto_reload(self.id))?
  }

  /// Turn auto reload on or off, taking effect at the next expiry.
  #[inline]
  pub fn set_auto_reload(&self, auto_reload: bool) -> Result<(), RtosError> {
    rt::with_isr(|kernel| kernel.set_timer_auto_reload(self.id, auto_reload))?
  }

  /// Delete the timer once the daemon gets to the command.
  pub fn delete(self, timeout: impl Into<Ticks>) -> Result<(), RtosError> {
    let id = self.id;
    rt::block_on(timeout, |kernel, wait| kernel.delete_timer(id, wait))
  }
}
