use core::fmt;
use core::marker::PhantomData;
use core::sync::atomic::{AtomicU32, Ordering::*};

use crate::kernel::pool::{PoolId, RawHandle};
use crate::kernel::Kernel;
use crate::{rt, RtosError};

/// A kernel object handle created on first use.
///
/// This lets wrapper types have a `const fn new` and live in a `static`.
pub(crate) struct LazyId<I> {
  bits: AtomicU32,
  _id: PhantomData<I>,
}

impl<I: PoolId> LazyId<I> {
  #[inline]
  pub const fn new() -> Self {
    Self { bits: AtomicU32::new(0), _id: PhantomData }
  }

  /// The handle, if the object was created.
  #[inline]
  pub fn get(&self) -> Option<I> {
    RawHandle::from_bits(self.bits.load(Acquire)).map(I::from_raw)
  }

  /// The handle, creating the object with `create` if it does not exist yet.
  #[inline]
  pub fn get_or_create(&self, create: impl FnOnce(&mut Kernel) -> Result<I, RtosError>) -> Result<I, RtosError> {
    match self.get() {
      Some(id) => Ok(id),
      None => self.initialize(create),
    }
  }

  #[cold]
  fn initialize(&self, create: impl FnOnce(&mut Kernel) -> Result<I, RtosError>) -> Result<I, RtosError> {
    // Checking again inside the kernel call keeps two racing tasks from
    // both creating the object.
    rt::with(|kernel| {
      if let Some(id) = self.get() {
        return Ok(id)
      }

      let id = create(kernel)?;
      self.bits.store(id.raw().to_bits(), Release);
      Ok(id)
    })?
  }

  /// Forget the handle, returning it if the object was created.
  #[inline]
  pub fn take(&mut self) -> Option<I> {
    RawHandle::from_bits(core::mem::take(self.bits.get_mut())).map(I::from_raw)
  }
}

impl<I: PoolId + fmt::Debug> fmt::Debug for LazyId<I> {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    match self.get() {
      Some(id) => id.fmt(f),
      None => f.write_str("<uninit>"),
    }
  }
}

#[cfg(test)]
mod tests {
  use alloc2::format;

  use super::*;
  use crate::kernel::QueueId;

  #[test]
  fn uncreated_objects_have_no_id() {
    let id = LazyId::<QueueId>::new();
    assert_eq!(id.get(), None);
    assert_eq!(format!("{:?}", id), "<uninit>");
  }
}
