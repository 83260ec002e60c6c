use core::marker::PhantomData;
use core::mem::size_of;

use crate::kernel::QueueId;
use crate::lazy_init::LazyId;
use crate::{rt, InterruptContext, RtosError, Ticks};

mod handle;
pub use handle::QueueHandle;
mod item;
pub use item::QueueItem;

/// A fixed-size queue. Items are copied and owned by the queue.
///
/// Items are copied as bytes, so they have to be a [`QueueItem`].
///
/// The kernel object is created on first use, so a queue can be a `static`.
/// Dropping an owned queue deletes it.
///
/// # Example
///
/// ```no_run
/// use rtos_kernel::{sync::Queue, Ticks};
///
/// let queue = Queue::<u32, 8>::new();
/// queue.send(42, Ticks::MAX).unwrap();
///
/// assert_eq!(queue.receive(Ticks::MAX), Ok(42));
/// ```
pub struct Queue<T, const SIZE: usize> {
  id: LazyId<QueueId>,
  item_type: PhantomData<T>,
}

unsafe impl<T: Send, const SIZE: usize> Send for Queue<T, SIZE> {}
unsafe impl<T: Send, const SIZE: usize> Sync for Queue<T, SIZE> {}

impl<T: QueueItem, const SIZE: usize> Queue<T, SIZE> {
  /// Create a new queue.
  #[allow(clippy::new_without_default)]
  pub const fn new() -> Self {
    Self { id: LazyId::new(), item_type: PhantomData }
  }

  /// A copyable handle to the queue, creating it if needed.
  pub fn handle(&self) -> Result<QueueHandle<T>, RtosError> {
    let id = self.id.get_or_create(|kernel| kernel.create_queue(SIZE, size_of::<T>()))?;
    Ok(QueueHandle::from_id(id))
  }

  // Interrupt handlers cannot create the queue, only look it up.
  fn isr_handle(&self) -> Result<QueueHandle<T>, RtosError> {
    self.id.get().map(QueueHandle::from_id).ok_or(RtosError::InvalidHandle)
  }

  /// See [`QueueHandle::send`].
  pub fn send(&self, item: T, timeout: impl Into<Ticks>) -> Result<(), RtosError> {
    self.handle()?.send(item, timeout)
  }

  /// See [`QueueHandle::send_to_front`].
  pub fn send_to_front(&self, item: T, timeout: impl Into<Ticks>) -> Result<(), RtosError> {
    self.handle()?.send_to_front(item, timeout)
  }

  /// See [`QueueHandle::overwrite`].
  pub fn overwrite(&self, item: T) -> Result<(), RtosError> {
    self.handle()?.overwrite(item)
  }

  /// See [`QueueHandle::send_from_isr`]. Fails with
  /// [`InvalidHandle`](RtosError::InvalidHandle) if no task used the queue yet.
  pub fn send_from_isr(&self, ic: &InterruptContext, item: T) -> Result<(), RtosError> {
    self.isr_handle()?.send_from_isr(ic, item)
  }

  /// See [`QueueHandle::receive`].
  pub fn receive(&self, timeout: impl Into<Ticks>) -> Result<T, RtosError> {
    self.handle()?.receive(timeout)
  }

  /// See [`QueueHandle::peek`].
  pub fn peek(&self, timeout: impl Into<Ticks>) -> Result<T, RtosError> {
    self.handle()?.peek(timeout)
  }

  /// See [`QueueHandle::receive_from_isr`].
  pub fn receive_from_isr(&self, ic: &InterruptContext) -> Result<T, RtosError> {
    self.isr_handle()?.receive_from_isr(ic)
  }

  /// See [`QueueHandle::len`].
  pub fn len(&self) -> Result<usize, RtosError> {
    self.handle()?.len()
  }

  /// See [`QueueHandle::is_empty`].
  pub fn is_empty(&self) -> Result<bool, RtosError> {
    self.handle()?.is_empty()
  }

  /// See [`QueueHandle::spaces`].
  pub fn spaces(&self) -> Result<usize, RtosError> {
    self.handle()?.spaces()
  }

  /// See [`QueueHandle::reset`].
  pub fn reset(&self) -> Result<(), RtosError> {
    self.handle()?.reset()
  }
}

impl<T, const SIZE: usize> Drop for Queue<T, SIZE> {
  fn drop(&mut self) {
    if let Some(id) = self.id.take() {
      let _ = rt::with(|kernel| kernel.delete_queue(id));
    }
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn queue_needs_an_initialized_kernel() {
    let queue = Queue::<u32, 2>::new();
    assert_eq!(queue.send(1, Ticks::ZERO), Err(RtosError::KernelNotInitialized));
    assert_eq!(queue.receive_from_isr(&InterruptContext::new()), Err(RtosError::InvalidHandle));
  }
}
