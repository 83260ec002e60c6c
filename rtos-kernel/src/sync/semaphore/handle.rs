use crate::kernel::QueueId;
use crate::{rt, InterruptContext, RtosError, Ticks};

use super::SemaphoreGuard;

/// A handle for managing a semaphore.
///
/// See [`Semaphore`](crate::sync::Semaphore) for the preferred owned version.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SemaphoreHandle {
  id: QueueId,
}

impl SemaphoreHandle {
  pub(crate) const fn from_id(id: QueueId) -> Self {
    Self { id }
  }

  /// The kernel id of the semaphore.
  #[inline]
  pub const fn id(&self) -> QueueId {
    self.id
  }

  /// Increment the semaphore.
  ///
  /// Fails with [`CapacityExceeded`](RtosError::CapacityExceeded) if the
  /// count is already at its maximum.
  #[inline]
  pub fn give(&self) -> Result<(), RtosError> {
    rt::with(|kernel| kernel.give(self.id))?
  }

  /// Increment the semaphore from within an interrupt service routine.
  #[inline]
  pub fn give_from_isr(&self, ic: &InterruptContext) -> Result<(), RtosError> {
    ic.wake(rt::with_isr(|kernel| kernel.give_from_isr(self.id))??);
    Ok(())
  }

  /// Decrement the semaphore, waiting up to `timeout` for it to become
  /// available.
  #[inline]
  pub fn take(&self, timeout: impl Into<Ticks>) -> Result<(), RtosError> {
    let id = self.id;
    rt::block_on(timeout, |kernel, wait| kernel.take(id, wait))
  }

  /// Decrement the semaphore from within an interrupt service routine.
  #[inline]
  pub fn take_from_isr(&self, ic: &InterruptContext) -> Result<(), RtosError> {
    ic.wake(rt::with_isr(|kernel| kernel.take_from_isr(self.id))??);
    Ok(())
  }

  /// Decrement the semaphore and return a guard which increments it again
  /// when dropped.
  #[inline]
  pub fn lock(&self, timeout: impl Into<Ticks>) -> Result<SemaphoreGuard<'_>, RtosError> {
    self.take(timeout)?;
    Ok(SemaphoreGuard { handle: *self, _semaphore: core::marker::PhantomData })
  }

  /// The current count.
  #[inline]
  pub fn count(&self) -> Result<usize, RtosError> {
    rt::with_isr(|kernel| kernel.messages_waiting(self.id))?
  }
}
