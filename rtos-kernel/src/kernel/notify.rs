//! Per-task notification word, a lightweight binary or counting semaphore,
//! event group or mailbox that needs no kernel object of its own.

use core::task::Poll;

use crate::config::TickType;
use crate::{trace, RtosError};

use super::{Kernel, TaskId, Wait};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum NotifyState {
  NotWaiting,
  Waiting,
  Pending,
}

/// How a notification changes the value of the notified task.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NotifyAction {
  /// Only mark the notification pending.
  NoAction,
  SetBits(u32),
  Increment,
  /// Write the value even if the previous one was not consumed yet.
  Overwrite(u32),
  /// Write the value unless the previous one was not consumed yet.
  SetValue(u32),
}

impl Kernel {
  /// Update the value of `task`, returning the previous value and whether
  /// the task was waiting for it.
  fn apply_notification(&mut self, task: TaskId, action: NotifyAction) -> Result<(u32, bool), RtosError> {
    let tcb = self.tasks.get_mut(task)?;
    if tcb.deleted {
      return Err(RtosError::InvalidHandle)
    }

    let previous = tcb.notify_value;
    let state = tcb.notify_state;
    tcb.notify_value = match action {
      NotifyAction::NoAction => previous,
      NotifyAction::SetBits(bits) => previous | bits,
      NotifyAction::Increment => previous.wrapping_add(1),
      NotifyAction::Overwrite(value) => value,
      NotifyAction::SetValue(_) if state == NotifyState::Pending => return Err(RtosError::CapacityExceeded),
      NotifyAction::SetValue(value) => value,
    };
    tcb.notify_state = NotifyState::Pending;
    trace::task_notify(task, tcb.notify_value);

    Ok((previous, state == NotifyState::Waiting))
  }

  /// Notify `task`, waking it if it waits for a notification.
  ///
  /// Returns the value before the update.
  pub fn notify(&mut self, task: TaskId, action: NotifyAction) -> Result<u32, RtosError> {
    let (previous, was_waiting) = self.apply_notification(task, action)?;
    if was_waiting {
      self.unblock(task);
      self.reset_next_unblock();
      let priority = self.tcb(task).priority;
      self.preempt(self.preempts(priority));
    }
    Ok(previous)
  }

  /// [`notify`](Self::notify) from an interrupt.
  ///
  /// Returns whether the notified task should preempt the interrupted one.
  pub fn notify_from_isr(&mut self, task: TaskId, action: NotifyAction) -> Result<bool, RtosError> {
    let (_, was_waiting) = self.apply_notification(task, action)?;
    Ok(was_waiting && self.ready_from_isr(task))
  }

  /// Wait for the notification value of the running task to become
  /// non-zero, then return it after zeroing or decrementing it.
  pub fn notify_take(&mut self, clear_on_exit: bool, wait: &mut Wait) -> Poll<Result<u32, RtosError>> {
    let Some(task) = self.current else {
      return Poll::Ready(Err(RtosError::WouldBlock))
    };

    if !wait.is_started() && self.tcb(task).notify_value == 0 {
      let ticks = self.prepare_block(wait, RtosError::WouldBlock)?;
      self.block_on_notification(task, ticks);
      return Poll::Pending
    }

    let tcb = self.tcb_mut(task);
    tcb.notify_state = NotifyState::NotWaiting;
    match tcb.notify_value {
      0 => Poll::Ready(Err(RtosError::Timeout)),
      value => {
        tcb.notify_value = if clear_on_exit { 0 } else { value - 1 };
        Poll::Ready(Ok(value))
      },
    }
  }

  /// Wait for a notification of the running task and return its value.
  ///
  /// Bits in `clear_on_entry` are cleared before waiting unless a
  /// notification is already pending; bits in `clear_on_exit` are cleared
  /// once it is received.
  pub fn notify_wait(
    &mut self,
    clear_on_entry: u32,
    clear_on_exit: u32,
    wait: &mut Wait,
  ) -> Poll<Result<u32, RtosError>> {
    let Some(task) = self.current else {
      return Poll::Ready(Err(RtosError::WouldBlock))
    };

    if !wait.is_started() && self.tcb(task).notify_state != NotifyState::Pending {
      self.tcb_mut(task).notify_value &= !clear_on_entry;
      let ticks = self.prepare_block(wait, RtosError::WouldBlock)?;
      self.block_on_notification(task, ticks);
      return Poll::Pending
    }

    let tcb = self.tcb_mut(task);
    let value = tcb.notify_value;
    let notified = tcb.notify_state == NotifyState::Pending;
    tcb.notify_state = NotifyState::NotWaiting;
    if notified {
      tcb.notify_value &= !clear_on_exit;
      Poll::Ready(Ok(value))
    } else {
      Poll::Ready(Err(RtosError::Timeout))
    }
  }

  fn block_on_notification(&mut self, task: TaskId, ticks: TickType) {
    self.tcb_mut(task).notify_state = NotifyState::Waiting;
    self.add_current_to_delayed(ticks, true);
    self.yield_within_api();
  }

  /// Drop a pending notification of `task`, or of the running task if
  /// `None`. Returns whether there was one.
  pub fn clear_notification(&mut self, task: Option<TaskId>) -> Result<bool, RtosError> {
    let task = task.or(self.current).ok_or(RtosError::InvalidHandle)?;
    let tcb = self.tasks.get_mut(task)?;
    let pending = tcb.notify_state == NotifyState::Pending;
    if pending {
      tcb.notify_state = NotifyState::NotWaiting;
    }
    Ok(pending)
  }

  /// Clear `bits` of the notification value, returning the value before.
  pub fn clear_notification_bits(&mut self, task: Option<TaskId>, bits: u32) -> Result<u32, RtosError> {
    let task = task.or(self.current).ok_or(RtosError::InvalidHandle)?;
    let tcb = self.tasks.get_mut(task)?;
    let previous = tcb.notify_value;
    tcb.notify_value &= !bits;
    Ok(previous)
  }

  pub fn notification_value(&self, task: TaskId) -> Result<u32, RtosError> {
    Ok(self.tasks.get(task)?.notify_value)
  }
}

#[cfg(test)]
mod tests {
  use super::super::testing::*;
  use super::*;
  use crate::task::TaskState;

  #[test]
  fn counting_notifications_are_taken_one_by_one() {
    let mut k = kernel();
    let task = spawn(&mut k, "counter", 1);
    start(&mut k);

    for _ in 0..3 {
      k.notify(task, NotifyAction::Increment).unwrap();
    }
    for expected in [3, 2, 1] {
      assert_eq!(k.notify_take(false, &mut Wait::poll()), Poll::Ready(Ok(expected)));
    }
    assert_eq!(k.notify_take(false, &mut Wait::poll()), Poll::Ready(Err(RtosError::WouldBlock)));
  }

  #[test]
  fn binary_take_clears_the_count() {
    let mut k = kernel();
    let task = spawn(&mut k, "binary", 1);
    start(&mut k);

    k.notify(task, NotifyAction::Increment).unwrap();
    k.notify(task, NotifyAction::Increment).unwrap();
    assert_eq!(k.notify_take(true, &mut Wait::poll()), Poll::Ready(Ok(2)));
    assert_eq!(k.notification_value(task), Ok(0));
  }

  #[test]
  fn waiting_task_is_woken_and_preempts() {
    let mut k = kernel();
    let waiter = spawn(&mut k, "waiter", 2);
    let notifier = spawn(&mut k, "notifier", 1);
    start(&mut k);

    let mut wait = Wait::forever();
    assert!(k.notify_take(true, &mut wait).is_pending());
    assert_eq!(k.task_state(waiter), Ok(TaskState::Blocked));
    assert_eq!(k.current_task(), Some(notifier));

    assert_eq!(k.notify(waiter, NotifyAction::Increment), Ok(0));
    assert_eq!(k.current_task(), Some(waiter));
    assert_eq!(k.notify_take(true, &mut wait), Poll::Ready(Ok(1)));
  }

  #[test]
  fn take_times_out() {
    let mut k = kernel();
    let waiter = spawn(&mut k, "waiter", 2);
    start(&mut k);

    let mut wait = Wait::new(3);
    assert!(k.notify_take(true, &mut wait).is_pending());
    ticks(&mut k, 3);
    assert_eq!(k.current_task(), Some(waiter));
    assert_eq!(k.notify_take(true, &mut wait), Poll::Ready(Err(RtosError::Timeout)));
  }

  #[test]
  fn set_value_refuses_to_overwrite_a_pending_value() {
    let mut k = kernel();
    let task = spawn(&mut k, "mailbox", 1);

    assert_eq!(k.notify(task, NotifyAction::SetValue(10)), Ok(0));
    assert_eq!(k.notify(task, NotifyAction::SetValue(20)), Err(RtosError::CapacityExceeded));
    assert_eq!(k.notify(task, NotifyAction::Overwrite(30)), Ok(10));
    assert_eq!(k.notification_value(task), Ok(30));

    assert_eq!(k.clear_notification(Some(task)), Ok(true));
    assert_eq!(k.notify(task, NotifyAction::SetValue(40)), Ok(30));
  }

  #[test]
  fn wait_clears_bits_on_entry_and_exit() {
    let mut k = kernel();
    let waiter = spawn(&mut k, "waiter", 2);
    spawn(&mut k, "notifier", 1);
    start(&mut k);

    k.notify(waiter, NotifyAction::SetBits(0b1000)).unwrap();
    k.clear_notification(Some(waiter)).unwrap();

    let mut wait = Wait::forever();
    assert!(k.notify_wait(0b1000, 0b0001, &mut wait).is_pending());
    assert_eq!(k.notification_value(waiter), Ok(0));

    k.notify(waiter, NotifyAction::SetBits(0b0011)).unwrap();
    assert_eq!(k.current_task(), Some(waiter));
    assert_eq!(k.notify_wait(0b1000, 0b0001, &mut wait), Poll::Ready(Ok(0b0011)));
    assert_eq!(k.notification_value(waiter), Ok(0b0010));
    assert_eq!(k.clear_notification_bits(None, 0b0010), Ok(0b0010));
  }

  #[test]
  fn pending_notification_is_returned_without_blocking() {
    let mut k = kernel();
    let task = spawn(&mut k, "task", 1);
    start(&mut k);

    k.notify(task, NotifyAction::Overwrite(0b110)).unwrap();
    assert_eq!(k.notify_wait(0b111, 0, &mut Wait::forever()), Poll::Ready(Ok(0b110)));
    assert_eq!(k.notify_wait(0, 0, &mut Wait::poll()), Poll::Ready(Err(RtosError::WouldBlock)));
  }

  #[test]
  fn isr_notification_defers_the_switch() {
    let mut k = kernel();
    let waiter = spawn(&mut k, "waiter", 2);
    let other = spawn(&mut k, "other", 1);
    start(&mut k);

    let mut wait = Wait::new(100);
    assert!(k.notify_take(false, &mut wait).is_pending());
    assert_eq!(k.notify_from_isr(waiter, NotifyAction::Increment), Ok(true));
    assert_eq!(k.current_task(), Some(other));
    assert_eq!(k.notify_from_isr(other, NotifyAction::NoAction), Ok(false));

    k.yield_from_isr();
    assert_eq!(k.current_task(), Some(waiter));
    assert_eq!(k.notify_take(false, &mut wait), Poll::Ready(Ok(1)));
  }

  #[test]
  fn isr_notification_while_suspended_waits_for_resume() {
    let mut k = kernel();
    let waiter = spawn(&mut k, "waiter", 2);
    let other = spawn(&mut k, "other", 1);
    start(&mut k);

    let mut wait = Wait::forever();
    assert!(k.notify_take(true, &mut wait).is_pending());
    k.suspend_all();
    k.notify_from_isr(waiter, NotifyAction::Increment).unwrap();
    assert_eq!(k.current_task(), Some(other));
    assert_eq!(k.task_state(waiter), Ok(TaskState::Ready));

    assert!(k.resume_all());
    assert_eq!(k.current_task(), Some(waiter));
  }
}
