use core::fmt;
use core::marker::PhantomData;

use super::item::{item_bytes, read_item};
use super::QueueItem;
use crate::kernel::{QueueId, SendPosition};
use crate::{rt, InterruptContext, RtosError, Ticks};

/// A handle for managing a queue.
///
/// See [`Queue`](crate::sync::Queue) for the preferred owned version. A handle
/// is `Copy`, so it can be given to interrupt handlers and other tasks.
pub struct QueueHandle<T> {
  id: QueueId,
  item_type: PhantomData<T>,
}

unsafe impl<T: Send> Send for QueueHandle<T> {}
unsafe impl<T: Send> Sync for QueueHandle<T> {}

impl<T> Clone for QueueHandle<T> {
  fn clone(&self) -> Self {
    *self
  }
}

impl<T> Copy for QueueHandle<T> {}

impl<T> PartialEq for QueueHandle<T> {
  fn eq(&self, other: &Self) -> bool {
    self.id == other.id
  }
}

impl<T> Eq for QueueHandle<T> {}

impl<T> fmt::Debug for QueueHandle<T> {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    f.debug_tuple("QueueHandle").field(&self.id).finish()
  }
}

impl<T: QueueItem> QueueHandle<T> {
  pub(crate) const fn from_id(id: QueueId) -> Self {
    Self { id, item_type: PhantomData }
  }

  /// The kernel id of the queue.
  #[inline]
  pub const fn id(&self) -> QueueId {
    self.id
  }

  fn send_at(&self, item: T, position: SendPosition, timeout: impl Into<Ticks>) -> Result<(), RtosError> {
    let id = self.id;
    rt::block_on(timeout, |kernel, wait| kernel.send(id, item_bytes(&item), position, wait))
  }

  fn send_at_from_isr(&self, ic: &InterruptContext, item: T, position: SendPosition) -> Result<(), RtosError> {
    let id = self.id;
    ic.wake(rt::with_isr(|kernel| kernel.send_from_isr(id, item_bytes(&item), position))??);
    Ok(())
  }

  /// Send an item to the end of the queue. Wait for the queue to have empty space for it.
  #[inline]
  pub fn send(&self, item: T, timeout: impl Into<Ticks>) -> Result<(), RtosError> {
    self.send_at(item, SendPosition::Back, timeout)
  }

  /// Send an item to the front of the queue, so it is received next.
  #[inline]
  pub fn send_to_front(&self, item: T, timeout: impl Into<Ticks>) -> Result<(), RtosError> {
    self.send_at(item, SendPosition::Front, timeout)
  }

  /// Replace the item of a queue of length 1, whether or not it is full.
  #[inline]
  pub fn overwrite(&self, item: T) -> Result<(), RtosError> {
    self.send_at(item, SendPosition::Overwrite, Ticks::ZERO)
  }

  /// Send an item to the end of the queue, from an interrupt.
  #[inline]
  pub fn send_from_isr(&self, ic: &InterruptContext, item: T) -> Result<(), RtosError> {
    self.send_at_from_isr(ic, item, SendPosition::Back)
  }

  /// Send an item to the front of the queue, from an interrupt.
  #[inline]
  pub fn send_to_front_from_isr(&self, ic: &InterruptContext, item: T) -> Result<(), RtosError> {
    self.send_at_from_isr(ic, item, SendPosition::Front)
  }

  /// Replace the item of a queue of length 1, from an interrupt.
  #[inline]
  pub fn overwrite_from_isr(&self, ic: &InterruptContext, item: T) -> Result<(), RtosError> {
    self.send_at_from_isr(ic, item, SendPosition::Overwrite)
  }

  /// Wait for an item to be available on the queue.
  #[inline]
  pub fn receive(&self, timeout: impl Into<Ticks>) -> Result<T, RtosError> {
    let id = self.id;
    let timeout = timeout.into();
    read_item(|out| rt::block_on(timeout, |kernel, wait| kernel.receive(id, &mut out[..], wait)))
  }

  /// Wait for an item to be available and copy it without removing it.
  #[inline]
  pub fn peek(&self, timeout: impl Into<Ticks>) -> Result<T, RtosError> {
    let id = self.id;
    let timeout = timeout.into();
    read_item(|out| rt::block_on(timeout, |kernel, wait| kernel.peek(id, &mut out[..], wait)))
  }

  /// Take the next item, from an interrupt.
  #[inline]
  pub fn receive_from_isr(&self, ic: &InterruptContext) -> Result<T, RtosError> {
    let id = self.id;
    read_item(|out| {
      ic.wake(rt::with_isr(|kernel| kernel.receive_from_isr(id, out))??);
      Ok(())
    })
  }

  /// Copy the next item without removing it, from an interrupt.
  #[inline]
  pub fn peek_from_isr(&self) -> Result<T, RtosError> {
    let id = self.id;
    read_item(|out| rt::with_isr(|kernel| kernel.peek_from_isr(id, out))?)
  }

  /// Get the number of messages in the queue.
  pub fn len(&self) -> Result<usize, RtosError> {
    rt::with_isr(|kernel| kernel.messages_waiting(self.id))?
  }

  /// Whether the queue holds no messages.
  pub fn is_empty(&self) -> Result<bool, RtosError> {
    Ok(self.len()? == 0)
  }

  /// Get the number of free slots in the queue.
  pub fn spaces(&self) -> Result<usize, RtosError> {
    rt::with_isr(|kernel| kernel.spaces_available(self.id))?
  }

  /// Discard all messages in the queue.
  pub fn reset(&self) -> Result<(), RtosError> {
    rt::with(|kernel| kernel.reset_queue(self.id))?
  }
}
