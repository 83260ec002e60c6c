use core::task::Poll;

use crate::config::TickType;
use crate::{kernel_assert, trace, RtosError};

use super::list::ListId;
use super::{EventGroupId, Kernel, Wait};

pub type EventBits = u32;

/// Bits of an event group available to applications.
pub const EVENT_BITS_MASK: EventBits = 0x00ff_ffff;

pub(super) struct EventGroupCb {
  bits: EventBits,
  waiters: ListId,
}

/// Condition a task blocked on an event group waits for.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(super) struct EventWait {
  mask: EventBits,
  clear_on_exit: bool,
  wait_all: bool,
  /// Part of a [`Kernel::sync_event_group`] rendezvous: bits are cleared once
  /// every satisfied waiter was released.
  rendezvous: bool,
}

impl EventWait {
  fn is_satisfied(&self, bits: EventBits) -> bool {
    if self.wait_all {
      bits & self.mask == self.mask
    } else {
      bits & self.mask != 0
    }
  }
}

/// Bits to set or clear may be empty but must stay out of the control bits.
fn check_bits(bits: EventBits) {
  kernel_assert!(bits & !EVENT_BITS_MASK == 0, "invalid event bit mask");
}

/// A wait has to name at least one bit.
fn check_wait_mask(mask: EventBits) {
  kernel_assert!(mask != 0 && mask & !EVENT_BITS_MASK == 0, "invalid event bit mask");
}

impl Kernel {
  pub fn create_event_group(&mut self) -> Result<EventGroupId, RtosError> {
    if self.event_groups.is_full() {
      return Err(RtosError::ResourceExhausted)
    }

    let waiters = self.lists.new_list();
    self.event_groups.insert(EventGroupCb { bits: 0, waiters }).map_err(|err| {
      self.lists.release_list(waiters);
      err
    })
  }

  /// Delete an event group. Tasks waiting on it wake up and their retry
  /// fails with [`RtosError::InvalidHandle`].
  pub fn delete_event_group(&mut self, group: EventGroupId) -> Result<(), RtosError> {
    let cb = self.event_groups.remove(group)?;

    let mut switch = false;
    while let Some(task) = self.lists.head_owner(cb.waiters) {
      let tcb = self.tcb_mut(task);
      tcb.event_wait = None;
      tcb.event_result = None;
      switch |= self.wake_from_event(task);
    }
    self.lists.release_list(cb.waiters);

    self.preempt(switch);
    Ok(())
  }

  pub fn event_group_bits(&self, group: EventGroupId) -> Result<EventBits, RtosError> {
    Ok(self.event_groups.get(group)?.bits)
  }

  /// Clear `bits`, returning the value before.
  pub fn clear_event_bits(&mut self, group: EventGroupId, bits: EventBits) -> Result<EventBits, RtosError> {
    check_bits(bits);
    let cb = self.event_groups.get_mut(group)?;
    let before = cb.bits;
    cb.bits &= !bits;
    Ok(before)
  }

  /// Clearing never wakes anybody, so it is the same from an interrupt.
  pub fn clear_event_bits_from_isr(&mut self, group: EventGroupId, bits: EventBits) -> Result<EventBits, RtosError> {
    self.clear_event_bits(group, bits)
  }

  /// Set `bits` and release every waiter whose condition now holds.
  ///
  /// Returns the value after waiters cleared their bits.
  pub fn set_event_bits(&mut self, group: EventGroupId, bits: EventBits) -> Result<EventBits, RtosError> {
    let switch = self.set_bits_inner(group, bits)?;
    self.preempt(switch);
    self.event_group_bits(group)
  }

  /// Returns whether a released task should preempt the interrupted one.
  pub fn set_event_bits_from_isr(&mut self, group: EventGroupId, bits: EventBits) -> Result<bool, RtosError> {
    self.set_bits_inner(group, bits)
  }

  fn set_bits_inner(&mut self, group: EventGroupId, bits: EventBits) -> Result<bool, RtosError> {
    check_bits(bits);
    let cb = self.event_groups.get_mut(group)?;
    cb.bits |= bits;
    let waiters = cb.waiters;
    trace::event_group_set_bits(group, bits);

    let mut deferred = 0;
    let mut switch = false;
    for task in self.lists.owners(waiters) {
      let Some(wait) = self.tcb(task).event_wait else {
        continue
      };
      let cb = self.event_groups.get_mut(group)?;
      let value = cb.bits;
      if !wait.is_satisfied(value) {
        continue
      }

      let result = if wait.rendezvous {
        deferred |= wait.mask;
        value
      } else if wait.clear_on_exit {
        // Cleared right away: a later waiter on the same bits misses them.
        cb.bits &= !wait.mask;
        cb.bits
      } else {
        value
      };

      let tcb = self.tcb_mut(task);
      tcb.event_wait = None;
      tcb.event_result = Some(result);
      switch |= self.wake_from_event(task);
    }

    self.event_groups.get_mut(group)?.bits &= !deferred;
    Ok(switch)
  }

  /// Result handed over by the task that released the running one.
  fn take_event_result(&mut self) -> Option<EventBits> {
    let tcb = self.tcb_mut(self.current?);
    tcb.event_wait = None;
    tcb.event_result.take()
  }

  fn block_on_event_group(&mut self, group: EventGroupId, waiters: ListId, condition: EventWait, ticks: TickType) {
    let Some(current) = self.current else {
      return
    };

    let tcb = self.tcb_mut(current);
    tcb.event_wait = Some(condition);
    tcb.event_result = None;
    trace::event_group_wait_block(group, current, condition.mask);
    self.place_on_unordered_event_list(waiters, ticks);
    self.yield_within_api();
  }

  /// Wait until any or all of `mask` are set.
  ///
  /// Returns the group value at the time of return, after clearing `mask`
  /// if `clear_on_exit` is set. A timeout is not an error: the value tells
  /// which bits were set at that point.
  pub fn wait_event_bits(
    &mut self,
    group: EventGroupId,
    mask: EventBits,
    clear_on_exit: bool,
    wait_all: bool,
    wait: &mut Wait,
  ) -> Poll<Result<EventBits, RtosError>> {
    check_wait_mask(mask);
    if wait.is_started() {
      if let Some(result) = self.take_event_result() {
        return Poll::Ready(Ok(result))
      }
    }

    let condition = EventWait { mask, clear_on_exit, wait_all, rendezvous: false };
    let cb = self.event_groups.get_mut(group)?;
    if condition.is_satisfied(cb.bits) {
      if clear_on_exit {
        cb.bits &= !mask;
      }
      return Poll::Ready(Ok(cb.bits))
    }

    let (bits, waiters) = (cb.bits, cb.waiters);
    match self.prepare_block(wait, RtosError::WouldBlock) {
      Ok(ticks) => {
        self.block_on_event_group(group, waiters, condition, ticks);
        Poll::Pending
      },
      Err(_) => Poll::Ready(Ok(bits)),
    }
  }

  /// Set `bits`, then wait until all of `wait_for` are set, clearing them
  /// for every task meeting there at once.
  ///
  /// Returns the value that completed the rendezvous, or the current value
  /// on timeout.
  pub fn sync_event_group(
    &mut self,
    group: EventGroupId,
    bits: EventBits,
    wait_for: EventBits,
    wait: &mut Wait,
  ) -> Poll<Result<EventBits, RtosError>> {
    check_wait_mask(wait_for);
    let condition = EventWait { mask: wait_for, clear_on_exit: true, wait_all: true, rendezvous: true };

    let mut switch = false;
    let value = if wait.is_started() {
      if let Some(result) = self.take_event_result() {
        return Poll::Ready(Ok(result))
      }
      self.event_groups.get(group)?.bits
    } else {
      let original = self.event_groups.get(group)?.bits;
      switch = bits != 0 && self.set_bits_inner(group, bits)?;
      original | bits
    };

    if condition.is_satisfied(value) {
      self.event_groups.get_mut(group)?.bits &= !wait_for;
      self.preempt(switch);
      return Poll::Ready(Ok(value))
    }

    let waiters = self.event_groups.get(group)?.waiters;
    match self.prepare_block(wait, RtosError::WouldBlock) {
      Ok(ticks) => {
        self.block_on_event_group(group, waiters, condition, ticks);
        Poll::Pending
      },
      Err(_) => {
        self.preempt(switch);
        Poll::Ready(self.event_group_bits(group))
      },
    }
  }
}

#[cfg(test)]
mod tests {
  use super::super::testing::*;
  use super::*;
  use crate::task::TaskState;

  #[test]
  fn all_bits_wait_releases_when_the_last_bit_arrives() {
    for clear_on_exit in [false, true] {
      let mut k = kernel();
      let waiter = spawn(&mut k, "waiter", 2);
      let setter = spawn(&mut k, "setter", 1);
      start(&mut k);
      let group = k.create_event_group().unwrap();

      let mut wait = Wait::forever();
      assert!(k.wait_event_bits(group, 0b11, clear_on_exit, true, &mut wait).is_pending());
      assert_eq!(k.current_task(), Some(setter));

      ticks(&mut k, 5);
      k.set_event_bits(group, 0b01).unwrap();
      assert_eq!(k.task_state(waiter), Ok(TaskState::Blocked));

      ticks(&mut k, 4);
      k.set_event_bits(group, 0b10).unwrap();
      assert_eq!(k.tick_count(), 9);
      assert_eq!(k.current_task(), Some(waiter));

      let expected = if clear_on_exit { 0 } else { 0b11 };
      assert_eq!(k.wait_event_bits(group, 0b11, clear_on_exit, true, &mut wait), Poll::Ready(Ok(expected)));
      assert_eq!(k.event_group_bits(group), Ok(expected));
    }
  }

  #[test]
  fn any_bit_wait_returns_at_once_when_satisfied() {
    let mut k = kernel();
    let group = k.create_event_group().unwrap();
    k.set_event_bits(group, 0b100).unwrap();

    assert_eq!(k.wait_event_bits(group, 0b110, false, false, &mut Wait::poll()), Poll::Ready(Ok(0b100)));
    assert_eq!(k.wait_event_bits(group, 0b110, true, false, &mut Wait::poll()), Poll::Ready(Ok(0)));
    assert_eq!(k.wait_event_bits(group, 0b1, false, false, &mut Wait::poll()), Poll::Ready(Ok(0)));
  }

  #[test]
  fn overlapping_waiters_race_for_cleared_bits() {
    let mut k = kernel();
    let first = spawn(&mut k, "first", 3);
    let second = spawn(&mut k, "second", 2);
    spawn(&mut k, "setter", 1);
    start(&mut k);
    let group = k.create_event_group().unwrap();

    let mut first_wait = Wait::forever();
    assert!(k.wait_event_bits(group, 0b1, true, true, &mut first_wait).is_pending());
    assert!(k.wait_event_bits(group, 0b1, true, true, &mut Wait::forever()).is_pending());

    k.set_event_bits(group, 0b1).unwrap();
    assert_eq!(k.current_task(), Some(first));
    assert_eq!(k.task_state(second), Ok(TaskState::Blocked));
    assert_eq!(k.wait_event_bits(group, 0b1, true, true, &mut first_wait), Poll::Ready(Ok(0)));
  }

  #[test]
  fn timeout_returns_the_current_bits() {
    let mut k = kernel();
    let waiter = spawn(&mut k, "waiter", 2);
    start(&mut k);
    let group = k.create_event_group().unwrap();

    let mut wait = Wait::new(10);
    assert!(k.wait_event_bits(group, 0b11, false, true, &mut wait).is_pending());
    k.set_event_bits_from_isr(group, 0b01).unwrap();

    ticks(&mut k, 10);
    assert_eq!(k.current_task(), Some(waiter));
    assert_eq!(k.wait_event_bits(group, 0b11, false, true, &mut wait), Poll::Ready(Ok(0b01)));
  }

  #[test]
  fn set_from_isr_reports_the_needed_switch() {
    let mut k = kernel();
    let waiter = spawn(&mut k, "waiter", 2);
    let other = spawn(&mut k, "other", 1);
    start(&mut k);
    let group = k.create_event_group().unwrap();

    let mut wait = Wait::forever();
    assert!(k.wait_event_bits(group, 0b1, false, false, &mut wait).is_pending());
    assert_eq!(k.set_event_bits_from_isr(group, 0b1), Ok(true));
    assert_eq!(k.current_task(), Some(other));

    k.yield_from_isr();
    assert_eq!(k.current_task(), Some(waiter));
    assert_eq!(k.wait_event_bits(group, 0b1, false, false, &mut wait), Poll::Ready(Ok(0b1)));
  }

  #[test]
  fn sync_releases_all_tasks_together() {
    let mut k = kernel();
    let t1 = spawn(&mut k, "t1", 3);
    let t2 = spawn(&mut k, "t2", 2);
    let t3 = spawn(&mut k, "t3", 1);
    start(&mut k);
    let group = k.create_event_group().unwrap();

    let mut w1 = Wait::forever();
    let mut w2 = Wait::forever();
    assert!(k.sync_event_group(group, 0b001, 0b111, &mut w1).is_pending());
    assert_eq!(k.current_task(), Some(t2));
    assert!(k.sync_event_group(group, 0b010, 0b111, &mut w2).is_pending());
    assert_eq!(k.current_task(), Some(t3));

    assert_eq!(k.sync_event_group(group, 0b100, 0b111, &mut Wait::forever()), Poll::Ready(Ok(0b111)));
    assert_eq!(k.event_group_bits(group), Ok(0));

    assert_eq!(k.current_task(), Some(t1));
    assert_eq!(k.sync_event_group(group, 0b001, 0b111, &mut w1), Poll::Ready(Ok(0b111)));
    k.delay(10);
    assert_eq!(k.current_task(), Some(t2));
    assert_eq!(k.sync_event_group(group, 0b010, 0b111, &mut w2), Poll::Ready(Ok(0b111)));
    assert_eq!(k.event_group_bits(group), Ok(0));
  }

  #[test]
  fn deleting_the_group_wakes_waiters() {
    let mut k = kernel();
    let waiter = spawn(&mut k, "waiter", 2);
    spawn(&mut k, "other", 1);
    start(&mut k);
    let group = k.create_event_group().unwrap();

    let mut wait = Wait::forever();
    assert!(k.wait_event_bits(group, 0b1, false, false, &mut wait).is_pending());
    k.delete_event_group(group).unwrap();
    assert_eq!(k.current_task(), Some(waiter));
    assert_eq!(k.wait_event_bits(group, 0b1, false, false, &mut wait), Poll::Ready(Err(RtosError::InvalidHandle)));
  }

  #[test]
  fn deleting_a_waiting_task_leaves_the_group_clean() {
    let mut k = kernel();
    let waiter = spawn(&mut k, "waiter", 2);
    spawn(&mut k, "other", 1);
    start(&mut k);
    let group = k.create_event_group().unwrap();

    assert!(k.wait_event_bits(group, 0b1, false, false, &mut Wait::forever()).is_pending());
    k.delete_task(Some(waiter)).unwrap();
    let waiters = k.event_groups.get(group).unwrap().waiters;
    assert!(k.lists.is_empty(waiters));
    assert_eq!(k.set_event_bits(group, 0b1), Ok(0b1));
  }

  #[test]
  fn empty_set_and_clear_change_nothing() {
    let mut k = kernel();
    let group = k.create_event_group().unwrap();
    k.set_event_bits(group, 0b101).unwrap();

    assert_eq!(k.set_event_bits(group, 0), Ok(0b101));
    assert_eq!(k.set_event_bits_from_isr(group, 0), Ok(false));
    assert_eq!(k.clear_event_bits(group, 0), Ok(0b101));
    assert_eq!(k.event_group_bits(group), Ok(0b101));
  }

  #[test]
  #[should_panic(expected = "invalid event bit mask")]
  fn waiting_for_no_bits_is_fatal() {
    let mut k = kernel();
    let group = k.create_event_group().unwrap();
    let _ = k.wait_event_bits(group, 0, false, false, &mut Wait::poll());
  }

  #[test]
  #[should_panic(expected = "invalid event bit mask")]
  fn control_bits_are_off_limits() {
    let mut k = kernel();
    let group = k.create_event_group().unwrap();
    let _ = k.set_event_bits(group, 0x0100_0000);
  }
}
