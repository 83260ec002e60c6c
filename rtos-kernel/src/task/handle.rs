use core::fmt;

use crate::config::MAX_TASK_NAME_LEN;
use crate::kernel::TaskId;
use crate::{rt, InterruptContext, RtosError};

use super::{TaskName, TaskNotification, TaskPriority, TaskState};

/// A handle for managing a task.
///
/// See [`Task`](crate::task::Task) for the owned version returned on creation.
/// Handles are plain ids: using one after its task was deleted fails with
/// [`RtosError::InvalidHandle`].
#[derive(Clone, Copy, PartialEq, Eq, Hash)]
pub struct TaskHandle {
  id: TaskId,
}

impl fmt::Debug for TaskHandle {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    self.id.fmt(f)
  }
}

impl TaskHandle {
  #[inline]
  pub(crate) const fn from_id(id: TaskId) -> Self {
    Self { id }
  }

  /// Get the kernel id of this task.
  #[inline]
  pub const fn id(&self) -> TaskId {
    self.id
  }

  /// Get the number of this task.
  #[inline]
  pub fn number(&self) -> Result<u32, RtosError> {
    rt::with(|kernel| kernel.task_number(self.id))?
  }

  /// Get the name of this task.
  pub fn name(&self) -> Result<TaskName<MAX_TASK_NAME_LEN>, RtosError> {
    rt::with(|kernel| kernel.task_name(self.id).map(TaskName::new))?
  }

  /// Get the state of this task.
  pub fn state(&self) -> Result<TaskState, RtosError> {
    rt::with(|kernel| kernel.task_state(self.id))?
  }

  /// Get the current priority, including priority inherited from mutex waiters.
  pub fn priority(&self) -> Result<TaskPriority, RtosError> {
    rt::with(|kernel| kernel.priority(self.id).map(TaskPriority::from_kernel))?
  }

  /// Get the priority the task was created with or last set to.
  pub fn base_priority(&self) -> Result<TaskPriority, RtosError> {
    rt::with(|kernel| kernel.base_priority(self.id).map(TaskPriority::from_kernel))?
  }

  /// Change the base priority of this task.
  pub fn set_priority(&self, priority: TaskPriority) -> Result<(), RtosError> {
    rt::with(|kernel| kernel.set_priority(Some(self.id), priority.get()))?
  }

  /// Suspend execution of the task.
  #[inline]
  pub fn suspend(&self) -> Result<(), RtosError> {
    rt::with(|kernel| kernel.suspend(Some(self.id)))?
  }

  /// Resume execution of the task.
  #[inline]
  pub fn resume(&self) -> Result<(), RtosError> {
    rt::with(|kernel| kernel.resume(self.id))?
  }

  /// Resume execution of the task from an interrupt.
  pub fn resume_from_isr(&self, ic: &InterruptContext) -> Result<(), RtosError> {
    ic.wake(rt::with_isr(|kernel| kernel.resume_from_isr(self.id))??);
    Ok(())
  }

  /// Make the task leave a blocking call early, which then fails with
  /// [`RtosError::Timeout`].
  ///
  /// Returns `false` if the task was not blocked.
  pub fn abort_delay(&self) -> Result<bool, RtosError> {
    rt::with(|kernel| kernel.abort_delay(self.id))?
  }

  /// Delete the task.
  pub fn delete(self) -> Result<(), RtosError> {
    rt::with(|kernel| kernel.delete_task(Some(self.id)))?
  }

  /// Send a notification to this task.
  ///
  /// # Errors
  ///
  /// This can only fail when sending [`TaskNotification::SetValue`] and
  /// the task already has pending notifications.
  pub fn notify(&self, notification: TaskNotification) -> Result<(), RtosError> {
    rt::with(|kernel| kernel.notify(self.id, notification.to_action()))??;
    Ok(())
  }

  /// Notify this task from an interrupt.
  pub fn notify_from_isr(&self, notification: TaskNotification, ic: &InterruptContext) -> Result<(), RtosError> {
    ic.wake(rt::with_isr(|kernel| kernel.notify_from_isr(self.id, notification.to_action()))??);
    Ok(())
  }

  /// Increment the notification value from an interrupt, for tasks using
  /// it as a counting semaphore.
  pub fn notify_give_from_isr(&self, ic: &InterruptContext) -> Result<(), RtosError> {
    self.notify_from_isr(TaskNotification::Increment, ic)
  }

  /// Get the notification value.
  pub fn notification_value(&self) -> Result<u32, RtosError> {
    rt::with(|kernel| kernel.notification_value(self.id))?
  }

  /// Clear pending notifications for this task.
  ///
  /// Returns whether a pending notification was cleared.
  #[inline]
  pub fn clear_notification(&self) -> Result<bool, RtosError> {
    rt::with(|kernel| kernel.clear_notification(Some(self.id)))?
  }

  /// Get the minimum amount of stack that was ever left on this task.
  #[inline]
  pub fn stack_high_water_mark(&self) -> Result<usize, RtosError> {
    rt::with(|kernel| kernel.stack_high_water_mark(self.id))?
  }

  /// Ticks during which this task was running.
  pub fn run_time_counter(&self) -> Result<u32, RtosError> {
    rt::with(|kernel| kernel.run_ticks(self.id))?
  }

  pub(crate) fn current() -> Result<Self, RtosError> {
    rt::with(|kernel| kernel.current_task())?.map(Self::from_id).ok_or(RtosError::InvalidHandle)
  }
}
