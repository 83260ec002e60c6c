//! Queues and everything built on top of them: semaphores, mutexes and
//! queue sets.
//!
//! Items are copied in and out by value as byte slices of the size given at
//! creation. Semaphores and mutexes are queues with zero sized items, only
//! their count matters.

use core::task::Poll;

use alloc2::{boxed::Box, vec::Vec};

use crate::config::TickType;
use crate::{kernel_assert, trace, RtosError};

use super::list::ListId;
use super::{Kernel, QueueId, TaskId, Wait};

/// What a queue object is used as.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum QueueKind {
  Queue,
  BinarySemaphore,
  CountingSemaphore,
  Mutex,
  RecursiveMutex,
  Set,
}

impl QueueKind {
  #[inline]
  pub const fn is_mutex(self) -> bool {
    matches!(self, Self::Mutex | Self::RecursiveMutex)
  }

  #[inline]
  pub const fn is_semaphore(self) -> bool {
    matches!(self, Self::BinarySemaphore | Self::CountingSemaphore)
  }
}

/// Where [`Kernel::send`] puts an item.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SendPosition {
  Back,
  Front,
  /// Replace the only item of a queue of length 1, even if it is full.
  Overwrite,
}

/// Size of a queue set entry: the bits of a member's [`QueueId`].
const SET_ITEM_SIZE: usize = 4;

pub(super) struct QueueCb {
  pub(super) kind: QueueKind,
  pub(super) capacity: usize,
  pub(super) item_size: usize,
  storage: Box<[u8]>,
  head: usize,
  pub(super) count: usize,
  /// Tasks waiting for space.
  pub(super) senders: ListId,
  /// Tasks waiting for an item, or for a mutex to be given back.
  pub(super) receivers: ListId,
  pub(super) holder: Option<TaskId>,
  pub(super) recursion: u32,
  /// Set this queue is a member of.
  pub(super) set: Option<QueueId>,
}

impl QueueCb {
  fn slot(&mut self, index: usize) -> &mut [u8] {
    let start = index * self.item_size;
    &mut self.storage[start..start + self.item_size]
  }

  /// Store `item`, returning the number of items there were before.
  fn copy_in(&mut self, item: &[u8], position: SendPosition) -> usize {
    let previous = self.count;
    let index = match position {
      SendPosition::Back => {
        self.count += 1;
        (self.head + previous) % self.capacity
      },
      SendPosition::Front => {
        self.head = (self.head + self.capacity - 1) % self.capacity;
        self.count += 1;
        self.head
      },
      SendPosition::Overwrite => {
        self.count = 1;
        self.head
      },
    };

    if self.item_size > 0 {
      self.slot(index).copy_from_slice(item);
    }
    previous
  }

  fn peek_out(&mut self, out: &mut [u8]) {
    if self.item_size > 0 {
      out.copy_from_slice(self.slot(self.head));
    }
  }

  fn copy_out(&mut self, out: &mut [u8]) {
    self.peek_out(out);
    self.head = (self.head + 1) % self.capacity;
    self.count -= 1;
  }

  fn check_send(&self, item: &[u8], position: SendPosition) -> Result<(), RtosError> {
    if self.kind != QueueKind::Queue {
      return Err(RtosError::InvalidHandle)
    }
    if item.len() != self.item_size || (position == SendPosition::Overwrite && self.capacity != 1) {
      return Err(RtosError::InvalidQueueSize)
    }
    Ok(())
  }

  fn check_receive(&self, kind: QueueKind, out: &[u8]) -> Result<(), RtosError> {
    if self.kind != kind {
      return Err(RtosError::InvalidHandle)
    }
    if out.len() != self.item_size {
      return Err(RtosError::InvalidQueueSize)
    }
    Ok(())
  }

  fn check_semaphore(&self) -> Result<(), RtosError> {
    match self.kind {
      QueueKind::Queue | QueueKind::Set => Err(RtosError::InvalidHandle),
      _ => Ok(()),
    }
  }
}

impl Kernel {
  fn create_queue_of_kind(
    &mut self,
    kind: QueueKind,
    capacity: usize,
    item_size: usize,
    count: usize,
  ) -> Result<QueueId, RtosError> {
    if capacity == 0 || count > capacity {
      return Err(RtosError::InvalidQueueSize)
    }
    if self.queues.is_full() {
      return Err(RtosError::ResourceExhausted)
    }

    let bytes = capacity.checked_mul(item_size).ok_or(RtosError::ResourceExhausted)?;
    let mut storage = Vec::new();
    storage.try_reserve_exact(bytes).map_err(|_| RtosError::ResourceExhausted)?;
    storage.resize(bytes, 0);

    let senders = self.lists.new_list();
    let receivers = self.lists.new_list();
    let queue = QueueCb {
      kind,
      capacity,
      item_size,
      storage: storage.into_boxed_slice(),
      head: 0,
      count,
      senders,
      receivers,
      holder: None,
      recursion: 0,
      set: None,
    };

    match self.queues.insert(queue) {
      Ok(id) => {
        trace::queue_create(id, capacity, item_size);
        Ok(id)
      },
      Err(err) => {
        self.lists.release_list(senders);
        self.lists.release_list(receivers);
        Err(err)
      },
    }
  }

  /// Create a queue of `capacity` items of `item_size` bytes each.
  pub fn create_queue(&mut self, capacity: usize, item_size: usize) -> Result<QueueId, RtosError> {
    self.create_queue_of_kind(QueueKind::Queue, capacity, item_size, 0)
  }

  /// Create a binary semaphore, initially taken.
  pub fn create_binary_semaphore(&mut self) -> Result<QueueId, RtosError> {
    self.create_queue_of_kind(QueueKind::BinarySemaphore, 1, 0, 0)
  }

  pub fn create_counting_semaphore(&mut self, max: usize, initial: usize) -> Result<QueueId, RtosError> {
    self.create_queue_of_kind(QueueKind::CountingSemaphore, max, 0, initial)
  }

  /// Create a mutex, initially available.
  pub fn create_mutex(&mut self) -> Result<QueueId, RtosError> {
    self.create_queue_of_kind(QueueKind::Mutex, 1, 0, 1)
  }

  /// Create a mutex its holder may take again.
  pub fn create_recursive_mutex(&mut self) -> Result<QueueId, RtosError> {
    self.create_queue_of_kind(QueueKind::RecursiveMutex, 1, 0, 1)
  }

  /// Create a queue set able to report `length` pending events.
  pub fn create_queue_set(&mut self, length: usize) -> Result<QueueId, RtosError> {
    self.create_queue_of_kind(QueueKind::Set, length, SET_ITEM_SIZE, 0)
  }

  /// Delete a queue. Tasks waiting on it wake up and their retry fails
  /// with [`RtosError::InvalidHandle`].
  pub fn delete_queue(&mut self, queue: QueueId) -> Result<(), RtosError> {
    let cb = self.queues.remove(queue)?;

    let mut switch = false;
    for list in [cb.senders, cb.receivers] {
      while let Some(task) = self.lists.head_owner(list) {
        switch |= self.wake_from_event(task);
      }
      self.lists.release_list(list);
    }

    if cb.kind == QueueKind::Set {
      for member in self.queues.ids() {
        if let Ok(member) = self.queues.get_mut(member) {
          if member.set == Some(queue) {
            member.set = None;
          }
        }
      }
    }

    if let (true, Some(holder)) = (cb.kind.is_mutex(), cb.holder) {
      switch |= self.priority_disinherit(holder, queue);
    }

    trace::queue_delete(queue);
    self.preempt(switch);
    Ok(())
  }

  /// Park the running task on `list` of `queue` until `wait` runs out.
  fn block_on_queue(&mut self, queue: QueueId, list: ListId, ticks: TickType, sending: bool) {
    if let Some(current) = self.current {
      if sending {
        trace::blocking_on_queue_send(queue, current);
      } else {
        trace::blocking_on_queue_receive(queue, current);
      }
    }
    self.place_on_event_list(list, ticks);
    self.yield_within_api();
  }

  /// Data arrived in `queue`: wake a receiver or tell the set it belongs to.
  ///
  /// One item wakes one waiter, so the set only hears of it when nobody
  /// is blocked on the member itself.
  fn after_send(&mut self, queue: QueueId, notify_set: bool) -> bool {
    let Ok(cb) = self.queues.get(queue) else {
      return false
    };
    let receivers = cb.receivers;

    match cb.set {
      Some(set) if self.lists.is_empty(receivers) => notify_set && self.notify_queue_set(set, queue),
      _ => self.remove_from_event_list(receivers),
    }
  }

  fn notify_queue_set(&mut self, set: QueueId, member: QueueId) -> bool {
    let Ok(cb) = self.queues.get_mut(set) else {
      return false
    };
    kernel_assert!(cb.count < cb.capacity, "queue set is full");

    cb.copy_in(&member.to_bits().to_le_bytes(), SendPosition::Back);
    let receivers = cb.receivers;
    self.remove_from_event_list(receivers)
  }

  /// Copy `item` into `queue`, blocking while it is full.
  ///
  /// Fails with [`RtosError::CapacityExceeded`] if the queue is full and
  /// `wait` does not allow blocking.
  pub fn send(
    &mut self,
    queue: QueueId,
    item: &[u8],
    position: SendPosition,
    wait: &mut Wait,
  ) -> Poll<Result<(), RtosError>> {
    let cb = self.queues.get_mut(queue)?;
    cb.check_send(item, position)?;

    if cb.count < cb.capacity || position == SendPosition::Overwrite {
      let previous = cb.copy_in(item, position);
      let switch = self.after_send(queue, position != SendPosition::Overwrite || previous == 0);
      self.preempt(switch);
      return Poll::Ready(Ok(()))
    }

    let senders = cb.senders;
    match self.prepare_block(wait, RtosError::CapacityExceeded) {
      Ok(ticks) => {
        self.block_on_queue(queue, senders, ticks, true);
        Poll::Pending
      },
      Err(err) => {
        trace::queue_send_failed(queue);
        Poll::Ready(Err(err))
      },
    }
  }

  /// [`send`](Self::send) for interrupts, which never block.
  ///
  /// Returns whether a task woken by it should preempt the interrupted one.
  pub fn send_from_isr(&mut self, queue: QueueId, item: &[u8], position: SendPosition) -> Result<bool, RtosError> {
    let cb = self.queues.get_mut(queue)?;
    cb.check_send(item, position)?;

    if cb.count >= cb.capacity && position != SendPosition::Overwrite {
      trace::queue_send_failed(queue);
      return Err(RtosError::CapacityExceeded)
    }

    let previous = cb.copy_in(item, position);
    Ok(self.after_send(queue, position != SendPosition::Overwrite || previous == 0))
  }

  fn receive_as(
    &mut self,
    kind: QueueKind,
    queue: QueueId,
    out: &mut [u8],
    peek: bool,
    wait: &mut Wait,
  ) -> Poll<Result<(), RtosError>> {
    let cb = self.queues.get_mut(queue)?;
    cb.check_receive(kind, out)?;

    if cb.count > 0 {
      let switch = if peek {
        cb.peek_out(out);
        // The item is still there for the next receiver.
        let receivers = cb.receivers;
        self.remove_from_event_list(receivers)
      } else {
        cb.copy_out(out);
        let senders = cb.senders;
        self.remove_from_event_list(senders)
      };
      self.preempt(switch);
      return Poll::Ready(Ok(()))
    }

    let receivers = cb.receivers;
    match self.prepare_block(wait, RtosError::WouldBlock) {
      Ok(ticks) => {
        self.block_on_queue(queue, receivers, ticks, false);
        Poll::Pending
      },
      Err(err) => {
        trace::queue_receive_failed(queue);
        Poll::Ready(Err(err))
      },
    }
  }

  /// Move the oldest item of `queue` into `out`, blocking while it is empty.
  pub fn receive(&mut self, queue: QueueId, out: &mut [u8], wait: &mut Wait) -> Poll<Result<(), RtosError>> {
    self.receive_as(QueueKind::Queue, queue, out, false, wait)
  }

  /// Copy the oldest item of `queue` into `out` without removing it.
  pub fn peek(&mut self, queue: QueueId, out: &mut [u8], wait: &mut Wait) -> Poll<Result<(), RtosError>> {
    self.receive_as(QueueKind::Queue, queue, out, true, wait)
  }

  pub fn receive_from_isr(&mut self, queue: QueueId, out: &mut [u8]) -> Result<bool, RtosError> {
    self.receive_from_isr_as(QueueKind::Queue, queue, out)
  }

  fn receive_from_isr_as(&mut self, kind: QueueKind, queue: QueueId, out: &mut [u8]) -> Result<bool, RtosError> {
    let cb = self.queues.get_mut(queue)?;
    cb.check_receive(kind, out)?;
    if cb.count == 0 {
      trace::queue_receive_failed(queue);
      return Err(RtosError::WouldBlock)
    }

    cb.copy_out(out);
    let senders = cb.senders;
    Ok(self.remove_from_event_list(senders))
  }

  pub fn peek_from_isr(&mut self, queue: QueueId, out: &mut [u8]) -> Result<(), RtosError> {
    let cb = self.queues.get_mut(queue)?;
    cb.check_receive(QueueKind::Queue, out)?;
    if cb.count == 0 {
      return Err(RtosError::WouldBlock)
    }

    cb.peek_out(out);
    Ok(())
  }

  /// Wait for a member of `set` to receive data and return it.
  ///
  /// The member still holds the data; read it with a non-blocking receive
  /// or take.
  pub fn select(&mut self, set: QueueId, wait: &mut Wait) -> Poll<Result<QueueId, RtosError>> {
    let mut bits = [0; SET_ITEM_SIZE];
    match self.receive_as(QueueKind::Set, set, &mut bits, false, wait) {
      Poll::Ready(Ok(())) => Poll::Ready(decode_member(bits)),
      Poll::Ready(Err(err)) => Poll::Ready(Err(err)),
      Poll::Pending => Poll::Pending,
    }
  }

  pub fn select_from_isr(&mut self, set: QueueId) -> Result<QueueId, RtosError> {
    let mut bits = [0; SET_ITEM_SIZE];
    self.receive_from_isr_as(QueueKind::Set, set, &mut bits)?;
    decode_member(bits)
  }

  /// Take a semaphore or mutex, blocking while it is unavailable.
  ///
  /// Blocking on a mutex lends the caller's priority to its holder. Taking
  /// a held non-recursive mutex again is an [`RtosError::OwnershipViolation`].
  pub fn take(&mut self, queue: QueueId, wait: &mut Wait) -> Poll<Result<(), RtosError>> {
    let current = self.current;
    let cb = self.queues.get_mut(queue)?;
    cb.check_semaphore()?;

    if cb.kind.is_mutex() && cb.count == 0 && cb.holder.is_some() && cb.holder == current {
      if cb.kind == QueueKind::RecursiveMutex {
        cb.recursion += 1;
        return Poll::Ready(Ok(()))
      }
      return Poll::Ready(Err(RtosError::OwnershipViolation))
    }

    if cb.count > 0 {
      cb.count -= 1;
      let mut switch = false;
      if cb.kind.is_mutex() {
        cb.holder = current;
        cb.recursion = 1;
        if let Some(task) = current {
          switch |= self.boost_from_waiters(queue, task);
        }
      }
      self.preempt(switch);
      return Poll::Ready(Ok(()))
    }

    let (kind, holder, receivers) = (cb.kind, cb.holder, cb.receivers);
    match self.prepare_block(wait, RtosError::WouldBlock) {
      Ok(ticks) => {
        if let (true, Some(holder)) = (kind.is_mutex(), holder) {
          let priority = self.current_priority();
          self.priority_inherit(holder, queue, priority);
        }
        self.block_on_queue(queue, receivers, ticks, false);
        Poll::Pending
      },
      Err(err) => {
        let switch = kind.is_mutex() && err == RtosError::Timeout && self.disinherit_after_timeout(queue);
        trace::queue_receive_failed(queue);
        self.preempt(switch);
        Poll::Ready(Err(err))
      },
    }
  }

  /// Give a semaphore or mutex back.
  ///
  /// Only the holder may give a mutex; a recursive mutex is released once
  /// every take has been matched.
  pub fn give(&mut self, queue: QueueId) -> Result<(), RtosError> {
    let current = self.current;
    let cb = self.queues.get_mut(queue)?;
    cb.check_semaphore()?;

    let mut switch = false;
    if cb.kind.is_mutex() {
      if cb.count > 0 || cb.holder != current {
        return Err(RtosError::OwnershipViolation)
      }

      cb.recursion = cb.recursion.saturating_sub(1);
      if cb.recursion > 0 {
        return Ok(())
      }
      cb.holder = None;
      cb.count = 1;
      if let Some(task) = current {
        switch |= self.priority_disinherit(task, queue);
      }
    } else if cb.count >= cb.capacity {
      trace::queue_send_failed(queue);
      return Err(RtosError::CapacityExceeded)
    } else {
      cb.count += 1;
    }

    switch |= self.after_send(queue, true);
    self.preempt(switch);
    Ok(())
  }

  /// Give a semaphore from an interrupt. Mutexes cannot be used there.
  pub fn give_from_isr(&mut self, queue: QueueId) -> Result<bool, RtosError> {
    let cb = self.queues.get_mut(queue)?;
    cb.check_semaphore()?;
    if cb.kind.is_mutex() {
      return Err(RtosError::OwnershipViolation)
    }
    if cb.count >= cb.capacity {
      trace::queue_send_failed(queue);
      return Err(RtosError::CapacityExceeded)
    }

    cb.count += 1;
    Ok(self.after_send(queue, true))
  }

  pub fn take_from_isr(&mut self, queue: QueueId) -> Result<bool, RtosError> {
    let cb = self.queues.get_mut(queue)?;
    cb.check_semaphore()?;
    if cb.kind.is_mutex() {
      return Err(RtosError::OwnershipViolation)
    }
    if cb.count == 0 {
      trace::queue_receive_failed(queue);
      return Err(RtosError::WouldBlock)
    }

    cb.count -= 1;
    let senders = cb.senders;
    Ok(self.remove_from_event_list(senders))
  }

  /// Items in a queue, or the count of a semaphore.
  pub fn messages_waiting(&self, queue: QueueId) -> Result<usize, RtosError> {
    Ok(self.queues.get(queue)?.count)
  }

  pub fn spaces_available(&self, queue: QueueId) -> Result<usize, RtosError> {
    let cb = self.queues.get(queue)?;
    Ok(cb.capacity - cb.count)
  }

  pub fn queue_kind(&self, queue: QueueId) -> Result<QueueKind, RtosError> {
    Ok(self.queues.get(queue)?.kind)
  }

  pub fn queue_capacity(&self, queue: QueueId) -> Result<usize, RtosError> {
    Ok(self.queues.get(queue)?.capacity)
  }

  /// Drop every item of a queue or the count of a semaphore. A task
  /// waiting for space is woken.
  pub fn reset_queue(&mut self, queue: QueueId) -> Result<(), RtosError> {
    let cb = self.queues.get_mut(queue)?;
    if cb.kind.is_mutex() {
      return Err(RtosError::InvalidHandle)
    }

    cb.head = 0;
    cb.count = 0;
    let senders = cb.senders;
    let switch = self.remove_from_event_list(senders);
    self.preempt(switch);
    Ok(())
  }

  /// Make `set` report data arriving in `member`. The member must be empty
  /// and not belong to another set.
  pub fn add_to_set(&mut self, member: QueueId, set: QueueId) -> Result<(), RtosError> {
    if self.queues.get(set)?.kind != QueueKind::Set {
      return Err(RtosError::QueueSetMembership)
    }

    let cb = self.queues.get_mut(member)?;
    if cb.kind == QueueKind::Set || cb.set.is_some() || cb.count > 0 {
      return Err(RtosError::QueueSetMembership)
    }
    cb.set = Some(set);
    Ok(())
  }

  /// Remove an empty `member` from `set`.
  pub fn remove_from_set(&mut self, member: QueueId, set: QueueId) -> Result<(), RtosError> {
    let cb = self.queues.get_mut(member)?;
    if cb.set != Some(set) || cb.count > 0 {
      return Err(RtosError::QueueSetMembership)
    }
    cb.set = None;
    Ok(())
  }
}

fn decode_member(bits: [u8; SET_ITEM_SIZE]) -> Result<QueueId, RtosError> {
  QueueId::from_bits(u32::from_le_bytes(bits)).ok_or(RtosError::InvalidHandle)
}

#[cfg(test)]
mod tests {
  use super::super::testing::*;
  use super::*;

  fn send(k: &mut Kernel, queue: QueueId, value: u32) -> Poll<Result<(), RtosError>> {
    k.send(queue, &value.to_le_bytes(), SendPosition::Back, &mut Wait::poll())
  }

  fn receive(k: &mut Kernel, queue: QueueId, wait: &mut Wait) -> Poll<Result<u32, RtosError>> {
    let mut out = [0; 4];
    k.receive(queue, &mut out, wait).map(|result| result.map(|()| u32::from_le_bytes(out)))
  }

  #[test]
  fn items_come_out_in_order() {
    let mut k = kernel();
    spawn(&mut k, "a", 1);
    start(&mut k);
    let queue = k.create_queue(3, 4).unwrap();

    for value in [1, 2, 3] {
      assert_eq!(send(&mut k, queue, value), Poll::Ready(Ok(())));
    }
    assert_eq!(send(&mut k, queue, 4), Poll::Ready(Err(RtosError::CapacityExceeded)));
    assert_eq!(k.spaces_available(queue), Ok(0));

    for value in [1, 2, 3] {
      assert_eq!(receive(&mut k, queue, &mut Wait::poll()), Poll::Ready(Ok(value)));
    }
    assert_eq!(receive(&mut k, queue, &mut Wait::poll()), Poll::Ready(Err(RtosError::WouldBlock)));
  }

  #[test]
  fn send_to_front_jumps_the_line() {
    let mut k = kernel();
    let queue = k.create_queue(3, 4).unwrap();
    assert!(send(&mut k, queue, 1).is_ready());
    assert!(k.send(queue, &2u32.to_le_bytes(), SendPosition::Front, &mut Wait::poll()).is_ready());

    let mut out = [0; 4];
    assert_eq!(k.peek(queue, &mut out, &mut Wait::poll()), Poll::Ready(Ok(())));
    assert_eq!(u32::from_le_bytes(out), 2);
    assert_eq!(k.messages_waiting(queue), Ok(2));
    assert_eq!(receive(&mut k, queue, &mut Wait::poll()), Poll::Ready(Ok(2)));
    assert_eq!(receive(&mut k, queue, &mut Wait::poll()), Poll::Ready(Ok(1)));
  }

  #[test]
  fn overwrite_needs_a_single_item_queue() {
    let mut k = kernel();
    let mailbox = k.create_queue(1, 4).unwrap();
    for value in [5, 6] {
      assert!(k.send(mailbox, &u32::to_le_bytes(value), SendPosition::Overwrite, &mut Wait::poll()).is_ready());
    }
    assert_eq!(receive(&mut k, mailbox, &mut Wait::poll()), Poll::Ready(Ok(6)));

    let queue = k.create_queue(2, 4).unwrap();
    assert_eq!(
      k.send(queue, &[0; 4], SendPosition::Overwrite, &mut Wait::poll()),
      Poll::Ready(Err(RtosError::InvalidQueueSize)),
    );
  }

  #[test]
  fn item_size_must_match() {
    let mut k = kernel();
    let queue = k.create_queue(1, 4).unwrap();
    assert_eq!(
      k.send(queue, &[0; 2], SendPosition::Back, &mut Wait::poll()),
      Poll::Ready(Err(RtosError::InvalidQueueSize)),
    );
    assert_eq!(k.create_queue(0, 4), Err(RtosError::InvalidQueueSize));
  }

  #[test]
  fn waiting_receivers_are_served_by_priority() {
    let mut k = kernel();
    let r2 = spawn(&mut k, "r2", 2);
    let r4 = spawn(&mut k, "r4", 4);
    let r3 = spawn(&mut k, "r3", 3);
    let sender = spawn(&mut k, "sender", 1);
    start(&mut k);
    let queue = k.create_queue(4, 4).unwrap();

    let mut waits = [Wait::forever(); 3];
    for (wait, task) in waits.iter_mut().zip([r4, r3, r2]) {
      assert_eq!(k.current_task(), Some(task));
      assert!(receive(&mut k, queue, wait).is_pending());
    }
    assert_eq!(k.current_task(), Some(sender));

    for (value, (wait, task)) in (10..).zip(waits.iter_mut().zip([r4, r3, r2])) {
      assert_eq!(send(&mut k, queue, value), Poll::Ready(Ok(())));
      assert_eq!(k.current_task(), Some(task));
      assert_eq!(receive(&mut k, queue, wait), Poll::Ready(Ok(value)));
      k.delay(100);
    }
    assert_eq!(k.current_task(), Some(sender));
  }

  #[test]
  fn full_queue_blocks_the_sender_until_space_frees() {
    let mut k = kernel();
    let sender = spawn(&mut k, "sender", 2);
    let receiver = spawn(&mut k, "receiver", 1);
    start(&mut k);
    let queue = k.create_queue(1, 4).unwrap();

    assert!(send(&mut k, queue, 1).is_ready());
    let mut wait = Wait::new(50);
    assert!(k.send(queue, &2u32.to_le_bytes(), SendPosition::Back, &mut wait).is_pending());
    assert_eq!(k.current_task(), Some(receiver));

    ticks(&mut k, 10);
    assert_eq!(receive(&mut k, queue, &mut Wait::poll()), Poll::Ready(Ok(1)));
    assert_eq!(k.current_task(), Some(sender));
    assert_eq!(k.send(queue, &2u32.to_le_bytes(), SendPosition::Back, &mut wait), Poll::Ready(Ok(())));
  }

  #[test]
  fn blocked_receive_times_out() {
    let mut k = kernel();
    let receiver = spawn(&mut k, "receiver", 2);
    start(&mut k);
    let queue = k.create_queue(1, 4).unwrap();

    let mut wait = Wait::new(20);
    assert!(receive(&mut k, queue, &mut wait).is_pending());
    ticks(&mut k, 19);
    assert_ne!(k.current_task(), Some(receiver));
    ticks(&mut k, 1);
    assert_eq!(k.current_task(), Some(receiver));
    assert_eq!(receive(&mut k, queue, &mut wait), Poll::Ready(Err(RtosError::Timeout)));
  }

  #[test]
  fn deleted_queue_wakes_its_waiters() {
    let mut k = kernel();
    let receiver = spawn(&mut k, "receiver", 2);
    spawn(&mut k, "other", 1);
    start(&mut k);
    let queue = k.create_queue(1, 4).unwrap();

    let mut wait = Wait::forever();
    assert!(receive(&mut k, queue, &mut wait).is_pending());
    k.delete_queue(queue).unwrap();
    assert_eq!(k.current_task(), Some(receiver));
    assert_eq!(receive(&mut k, queue, &mut wait), Poll::Ready(Err(RtosError::InvalidHandle)));
    assert_eq!(k.delete_queue(queue), Err(RtosError::OwnershipViolation));
  }

  #[test]
  fn isr_send_defers_the_switch() {
    let mut k = kernel();
    let receiver = spawn(&mut k, "receiver", 2);
    let other = spawn(&mut k, "other", 1);
    start(&mut k);
    let queue = k.create_queue(2, 4).unwrap();

    let mut wait = Wait::forever();
    assert!(receive(&mut k, queue, &mut wait).is_pending());
    assert_eq!(k.send_from_isr(queue, &7u32.to_le_bytes(), SendPosition::Back), Ok(true));
    assert_eq!(k.current_task(), Some(other));

    k.yield_from_isr();
    assert_eq!(k.current_task(), Some(receiver));
    assert_eq!(receive(&mut k, queue, &mut wait), Poll::Ready(Ok(7)));

    let mut out = [0; 4];
    assert_eq!(k.receive_from_isr(queue, &mut out), Err(RtosError::WouldBlock));
  }

  #[test]
  fn counting_semaphore_counts() {
    let mut k = kernel();
    let sem = k.create_counting_semaphore(3, 1).unwrap();
    assert_eq!(k.create_counting_semaphore(2, 3), Err(RtosError::InvalidQueueSize));

    assert_eq!(k.give(sem), Ok(()));
    assert_eq!(k.give_from_isr(sem), Ok(false));
    assert_eq!(k.give(sem), Err(RtosError::CapacityExceeded));
    assert_eq!(k.messages_waiting(sem), Ok(3));

    for _ in 0..3 {
      assert_eq!(k.take(sem, &mut Wait::poll()), Poll::Ready(Ok(())));
    }
    assert_eq!(k.take_from_isr(sem), Err(RtosError::WouldBlock));
  }

  #[test]
  fn binary_semaphore_signals_a_task() {
    let mut k = kernel();
    let worker = spawn(&mut k, "worker", 3);
    let other = spawn(&mut k, "other", 1);
    start(&mut k);
    let sem = k.create_binary_semaphore().unwrap();

    let mut wait = Wait::forever();
    assert!(k.take(sem, &mut wait).is_pending());
    assert_eq!(k.current_task(), Some(other));

    assert_eq!(k.give(sem), Ok(()));
    assert_eq!(k.current_task(), Some(worker));
    assert_eq!(k.take(sem, &mut wait), Poll::Ready(Ok(())));
    assert_eq!(k.messages_waiting(sem), Ok(0));
  }

  #[test]
  fn recursive_mutex_needs_matching_gives() {
    let mut k = kernel();
    let owner = spawn(&mut k, "owner", 1);
    start(&mut k);
    let mutex = k.create_recursive_mutex().unwrap();

    for _ in 0..3 {
      assert_eq!(k.take(mutex, &mut Wait::poll()), Poll::Ready(Ok(())));
    }
    k.give(mutex).unwrap();
    k.give(mutex).unwrap();
    assert_eq!(k.mutex_holder(mutex), Ok(Some(owner)));
    k.give(mutex).unwrap();
    assert_eq!(k.mutex_holder(mutex), Ok(None));
    assert_eq!(k.give(mutex), Err(RtosError::OwnershipViolation));
  }

  #[test]
  fn plain_mutex_cannot_be_taken_twice() {
    let mut k = kernel();
    spawn(&mut k, "owner", 1);
    start(&mut k);
    let mutex = k.create_mutex().unwrap();

    assert_eq!(k.take(mutex, &mut Wait::poll()), Poll::Ready(Ok(())));
    assert_eq!(k.take(mutex, &mut Wait::forever()), Poll::Ready(Err(RtosError::OwnershipViolation)));
    assert_eq!(k.give_from_isr(mutex), Err(RtosError::OwnershipViolation));
  }

  #[test]
  fn queue_set_reports_the_member_with_data() {
    let mut k = kernel();
    let reader = spawn(&mut k, "reader", 2);
    let writer = spawn(&mut k, "writer", 1);
    start(&mut k);

    let set = k.create_queue_set(3).unwrap();
    let queue = k.create_queue(2, 4).unwrap();
    let sem = k.create_binary_semaphore().unwrap();
    k.add_to_set(queue, set).unwrap();
    k.add_to_set(sem, set).unwrap();
    assert_eq!(k.add_to_set(queue, set), Err(RtosError::QueueSetMembership));

    let mut wait = Wait::forever();
    assert!(k.select(set, &mut wait).is_pending());
    assert_eq!(k.current_task(), Some(writer));

    k.give(sem).unwrap();
    assert_eq!(k.current_task(), Some(reader));
    assert_eq!(k.select(set, &mut wait), Poll::Ready(Ok(sem)));
    assert!(k.take(sem, &mut Wait::poll()).is_ready());

    assert!(send(&mut k, queue, 9).is_ready());
    assert_eq!(k.select_from_isr(set), Ok(queue));
    assert_eq!(receive(&mut k, queue, &mut Wait::poll()), Poll::Ready(Ok(9)));
    assert_eq!(k.select_from_isr(set), Err(RtosError::WouldBlock));

    k.remove_from_set(queue, set).unwrap();
    assert!(send(&mut k, queue, 1).is_ready());
    assert_eq!(k.messages_waiting(set), Ok(0));
    assert_eq!(k.remove_from_set(queue, set), Err(RtosError::QueueSetMembership));
  }

  #[test]
  fn set_member_wakes_its_own_receiver_first() {
    let mut k = kernel();
    let reader = spawn(&mut k, "reader", 2);
    let writer = spawn(&mut k, "writer", 1);
    start(&mut k);

    let set = k.create_queue_set(2).unwrap();
    let queue = k.create_queue(2, 4).unwrap();
    k.add_to_set(queue, set).unwrap();

    let mut wait = Wait::forever();
    assert!(receive(&mut k, queue, &mut wait).is_pending());
    assert_eq!(k.current_task(), Some(writer));

    assert!(send(&mut k, queue, 7).is_ready());
    assert_eq!(k.current_task(), Some(reader));
    assert_eq!(k.messages_waiting(set), Ok(0));
    assert_eq!(receive(&mut k, queue, &mut wait), Poll::Ready(Ok(7)));

    assert!(send(&mut k, queue, 8).is_ready());
    assert_eq!(k.messages_waiting(set), Ok(1));
    assert_eq!(k.select_from_isr(set), Ok(queue));
  }

  #[test]
  fn reset_empties_the_queue() {
    let mut k = kernel();
    let queue = k.create_queue(2, 4).unwrap();
    assert!(send(&mut k, queue, 1).is_ready());
    k.reset_queue(queue).unwrap();
    assert_eq!(k.messages_waiting(queue), Ok(0));

    let mutex = k.create_mutex().unwrap();
    assert_eq!(k.reset_queue(mutex), Err(RtosError::InvalidHandle));
  }

  #[test]
  fn queue_table_runs_out() {
    let mut k = Kernel::new(config().max_queues(1), crate::port::Simulated::new());
    k.create_queue(1, 1).unwrap();
    assert_eq!(k.create_mutex(), Err(RtosError::ResourceExhausted));
  }
}
