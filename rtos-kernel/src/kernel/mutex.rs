//! Priority inheritance for mutexes.
//!
//! A task holding mutexes runs at the highest of its base priority and the
//! priorities of the tasks waiting on any of them. Each held mutex with
//! waiters contributes one [`Boost`], so releasing one mutex only drops what
//! that mutex lent.

use crate::{trace, RtosError};

use super::{Kernel, QueueId, TaskId};

/// Priority lent to a mutex holder by the waiters of `mutex`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(super) struct Boost {
  pub(super) mutex: QueueId,
  pub(super) priority: u8,
}

impl Kernel {
  /// Lend `priority` to `holder` for as long as it holds `mutex`.
  ///
  /// Returns whether the running task should be switched out.
  pub(super) fn priority_inherit(&mut self, holder: TaskId, mutex: QueueId, priority: u8) -> bool {
    let Ok(tcb) = self.tasks.get_mut(holder) else {
      return false
    };
    if priority <= tcb.base_priority {
      return false
    }

    match tcb.boosts.iter_mut().find(|boost| boost.mutex == mutex) {
      Some(boost) if boost.priority >= priority => return false,
      Some(boost) => boost.priority = priority,
      None => tcb.boosts.push(Boost { mutex, priority }),
    }

    trace::priority_inherit(holder, priority);
    self.refresh_priority(holder)
  }

  /// Drop whatever `holder` inherited through `mutex`.
  pub(super) fn priority_disinherit(&mut self, holder: TaskId, mutex: QueueId) -> bool {
    let Ok(tcb) = self.tasks.get_mut(holder) else {
      return false
    };

    let before = tcb.boosts.len();
    tcb.boosts.retain(|boost| boost.mutex != mutex);
    if tcb.boosts.len() == before {
      return false
    }

    let switch = self.refresh_priority(holder);
    trace::priority_disinherit(holder, self.tcb(holder).priority);
    switch
  }

  /// Make the boost `holder` gets through `mutex` match the highest
  /// priority task still waiting on it.
  pub(super) fn boost_from_waiters(&mut self, mutex: QueueId, holder: TaskId) -> bool {
    let Ok(queue) = self.queues.get(mutex) else {
      return false
    };

    let top = self.lists.head_owner(queue.receivers).map(|waiter| self.tcb(waiter).priority);
    let switch = self.priority_disinherit(holder, mutex);
    match top {
      Some(priority) => self.priority_inherit(holder, mutex, priority) || switch,
      None => switch,
    }
  }

  /// A waiter on `mutex` gave up; its priority is not lent any longer.
  pub(super) fn disinherit_after_timeout(&mut self, mutex: QueueId) -> bool {
    match self.queues.get(mutex).ok().and_then(|queue| queue.holder) {
      Some(holder) => self.boost_from_waiters(mutex, holder),
      None => false,
    }
  }

  /// Task holding `mutex`, if it is a mutex and taken.
  pub fn mutex_holder(&self, mutex: QueueId) -> Result<Option<TaskId>, RtosError> {
    let queue = self.queues.get(mutex)?;
    Ok(queue.kind.is_mutex().then_some(queue.holder).flatten())
  }
}

#[cfg(test)]
mod tests {
  use core::task::Poll;

  use super::super::testing::*;
  use super::super::Wait;
  use crate::RtosError;

  #[test]
  fn holder_inherits_and_returns_to_base_priority() {
    let mut k = kernel();
    let low = spawn(&mut k, "low", 1);
    start(&mut k);
    let mutex = k.create_mutex().unwrap();
    assert_eq!(k.take(mutex, &mut Wait::poll()), Poll::Ready(Ok(())));
    assert_eq!(k.mutex_holder(mutex), Ok(Some(low)));

    let high = spawn(&mut k, "high", 5);
    assert_eq!(k.current_task(), Some(high));

    let mut wait = Wait::forever();
    assert!(k.take(mutex, &mut wait).is_pending());
    assert_eq!(k.current_task(), Some(low));
    assert_eq!(k.priority(low), Ok(5));
    assert_eq!(k.base_priority(low), Ok(1));

    assert_eq!(k.give(mutex), Ok(()));
    assert_eq!(k.priority(low), Ok(1));
    assert_eq!(k.current_task(), Some(high));

    assert_eq!(k.take(mutex, &mut wait), Poll::Ready(Ok(())));
    assert_eq!(k.mutex_holder(mutex), Ok(Some(high)));
  }

  #[test]
  fn inheritance_preempts_medium_priority_work() {
    let mut k = kernel();
    let low = spawn(&mut k, "low", 1);
    start(&mut k);
    let mutex = k.create_mutex().unwrap();
    assert!(k.take(mutex, &mut Wait::poll()).is_ready());

    let medium = spawn(&mut k, "medium", 3);
    assert_eq!(k.current_task(), Some(medium));
    k.delay(10);

    let high = spawn(&mut k, "high", 5);
    assert!(k.take(mutex, &mut Wait::forever()).is_pending());
    assert_eq!(k.current_task(), Some(low));

    // The medium task wakes but must not preempt the boosted holder.
    ticks(&mut k, 10);
    assert_eq!(k.current_task(), Some(low));

    k.give(mutex).unwrap();
    assert_eq!(k.current_task(), Some(high));
  }

  #[test]
  fn timed_out_waiter_lowers_the_boost() {
    let mut k = kernel();
    let low = spawn(&mut k, "low", 1);
    start(&mut k);
    let mutex = k.create_mutex().unwrap();
    assert!(k.take(mutex, &mut Wait::poll()).is_ready());

    let high = spawn(&mut k, "high", 4);
    let mut wait = Wait::new(5);
    assert!(k.take(mutex, &mut wait).is_pending());
    assert_eq!(k.priority(low), Ok(4));

    ticks(&mut k, 5);
    assert_eq!(k.current_task(), Some(high));
    assert_eq!(k.take(mutex, &mut wait), Poll::Ready(Err(RtosError::Timeout)));
    assert_eq!(k.priority(low), Ok(1));
  }

  #[test]
  fn boosts_from_two_mutexes_are_tracked_separately() {
    let mut k = kernel();
    let low = spawn(&mut k, "low", 1);
    start(&mut k);
    let first = k.create_mutex().unwrap();
    let second = k.create_mutex().unwrap();
    assert!(k.take(first, &mut Wait::poll()).is_ready());
    assert!(k.take(second, &mut Wait::poll()).is_ready());

    let three = spawn(&mut k, "three", 3);
    assert!(k.take(first, &mut Wait::forever()).is_pending());
    let five = spawn(&mut k, "five", 5);
    let mut wait = Wait::forever();
    assert!(k.take(second, &mut wait).is_pending());
    assert_eq!(k.current_task(), Some(low));
    assert_eq!(k.priority(low), Ok(5));

    k.give(second).unwrap();
    assert_eq!(k.current_task(), Some(five));
    assert_eq!(k.priority(low), Ok(3));
    assert_eq!(k.take(second, &mut wait), Poll::Ready(Ok(())));

    k.delay(100);
    assert_eq!(k.current_task(), Some(low));
    k.give(first).unwrap();
    assert_eq!(k.priority(low), Ok(1));
    assert_eq!(k.current_task(), Some(three));
  }

  #[test]
  fn base_priority_change_keeps_the_boost() {
    let mut k = kernel();
    let low = spawn(&mut k, "low", 1);
    start(&mut k);
    let mutex = k.create_mutex().unwrap();
    assert!(k.take(mutex, &mut Wait::poll()).is_ready());

    spawn(&mut k, "high", 5);
    assert!(k.take(mutex, &mut Wait::forever()).is_pending());

    k.set_priority(Some(low), 2).unwrap();
    assert_eq!(k.priority(low), Ok(5));
    assert_eq!(k.base_priority(low), Ok(2));

    k.give(mutex).unwrap();
    assert_eq!(k.priority(low), Ok(2));
  }

  #[test]
  fn only_the_holder_may_give() {
    let mut k = kernel();
    spawn(&mut k, "owner", 1);
    start(&mut k);
    let mutex = k.create_mutex().unwrap();
    assert!(k.take(mutex, &mut Wait::poll()).is_ready());

    spawn(&mut k, "thief", 2);
    assert_eq!(k.give(mutex), Err(RtosError::OwnershipViolation));
    assert_eq!(k.take(mutex, &mut Wait::poll()), Poll::Ready(Err(RtosError::WouldBlock)));
  }
}
