use core::marker::PhantomData;

mod guard;
pub use guard::SemaphoreGuard;
mod handle;
pub use handle::SemaphoreHandle;

use crate::kernel::QueueId;
use crate::lazy_init::LazyId;
use crate::{rt, InterruptContext, RtosError, Ticks};

/// Marker type for a binary semaphore.
#[non_exhaustive]
pub struct Binary {}

/// Marker type for a counting semaphore.
#[non_exhaustive]
pub struct Counting<const INITIAL: usize, const MAX: usize> {}

/// A binary or counting semaphore.
///
/// A binary semaphore starts out empty. A counting semaphore with an
/// `INITIAL` count above `MAX` fails to be created with
/// [`InvalidQueueSize`](RtosError::InvalidQueueSize).
///
/// # Example
///
/// ```no_run
/// use rtos_kernel::{sync::{Binary, Counting, Semaphore}, Ticks};
///
/// let binary_semaphore = Semaphore::<Binary>::new_binary();
/// binary_semaphore.give().unwrap();
///
/// let counting_semaphore = Semaphore::<Counting<3, 8>>::new_counting();
/// for _ in 0..3 {
///   counting_semaphore.take(Ticks::ZERO).unwrap();
/// }
/// for _ in 0..8 {
///   counting_semaphore.give().unwrap();
/// }
/// ```
pub struct Semaphore<T> {
  id: LazyId<QueueId>,
  mode: PhantomData<T>,
}

/// How a semaphore of a given mode is created.
pub trait SemaphoreMode {
  #[doc(hidden)]
  fn create(kernel: &mut crate::Kernel) -> Result<QueueId, RtosError>;
}

impl SemaphoreMode for Binary {
  fn create(kernel: &mut crate::Kernel) -> Result<QueueId, RtosError> {
    kernel.create_binary_semaphore()
  }
}

impl<const INITIAL: usize, const MAX: usize> SemaphoreMode for Counting<INITIAL, MAX> {
  fn create(kernel: &mut crate::Kernel) -> Result<QueueId, RtosError> {
    kernel.create_counting_semaphore(MAX, INITIAL)
  }
}

impl Semaphore<Binary> {
  /// Create a new binary semaphore.
  pub const fn new_binary() -> Self {
    Self { id: LazyId::new(), mode: PhantomData }
  }
}

impl<const INITIAL: usize, const MAX: usize> Semaphore<Counting<INITIAL, MAX>> {
  /// Create a new counting semaphore.
  pub const fn new_counting() -> Self {
    Self { id: LazyId::new(), mode: PhantomData }
  }
}

impl<M: SemaphoreMode> Semaphore<M> {
  /// A copyable handle to the semaphore, creating it if needed.
  pub fn handle(&self) -> Result<SemaphoreHandle, RtosError> {
    self.id.get_or_create(M::create).map(SemaphoreHandle::from_id)
  }

  fn isr_handle(&self) -> Result<SemaphoreHandle, RtosError> {
    self.id.get().map(SemaphoreHandle::from_id).ok_or(RtosError::InvalidHandle)
  }

  /// See [`SemaphoreHandle::give`].
  pub fn give(&self) -> Result<(), RtosError> {
    self.handle()?.give()
  }

  /// See [`SemaphoreHandle::give_from_isr`]. Fails with
  /// [`InvalidHandle`](RtosError::InvalidHandle) if no task used the
  /// semaphore yet.
  pub fn give_from_isr(&self, ic: &InterruptContext) -> Result<(), RtosError> {
    self.isr_handle()?.give_from_isr(ic)
  }

  /// See [`SemaphoreHandle::take`].
  pub fn take(&self, timeout: impl Into<Ticks>) -> Result<(), RtosError> {
    self.handle()?.take(timeout)
  }

  /// See [`SemaphoreHandle::take_from_isr`].
  pub fn take_from_isr(&self, ic: &InterruptContext) -> Result<(), RtosError> {
    self.isr_handle()?.take_from_isr(ic)
  }

  /// See [`SemaphoreHandle::lock`].
  pub fn lock(&self, timeout: impl Into<Ticks>) -> Result<SemaphoreGuard<'_>, RtosError> {
    let handle = self.handle()?;
    handle.take(timeout)?;
    Ok(SemaphoreGuard { handle, _semaphore: PhantomData })
  }

  /// See [`SemaphoreHandle::count`].
  pub fn count(&self) -> Result<usize, RtosError> {
    self.handle()?.count()
  }
}

impl<T> Drop for Semaphore<T> {
  fn drop(&mut self) {
    if let Some(id) = self.id.take() {
      let _ = rt::with(|kernel| kernel.delete_queue(id));
    }
  }
}
