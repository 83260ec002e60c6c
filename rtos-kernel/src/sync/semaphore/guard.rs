use core::marker::PhantomData;

use super::SemaphoreHandle;

/// An RAII implementation of a “scoped decrement” of a semaphore.
///
/// When this structure is dropped (falls out of scope), the semaphore is incremented again.
#[must_use = "if unused the `Semaphore` will increment again immediately"]
#[derive(Debug)]
pub struct SemaphoreGuard<'s> {
  pub(super) handle: SemaphoreHandle,
  pub(super) _semaphore: PhantomData<&'s SemaphoreHandle>,
}

impl Drop for SemaphoreGuard<'_> {
  fn drop(&mut self) {
    let _ = self.handle.give();
  }
}
