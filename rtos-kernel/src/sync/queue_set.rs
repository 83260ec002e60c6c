use crate::kernel::QueueId;
use crate::lazy_init::LazyId;
use crate::{rt, InterruptContext, RtosError, Ticks};

use super::{Queue, QueueHandle, QueueItem, Semaphore, SemaphoreHandle, SemaphoreMode};

/// A queue or semaphore that can be added to a [`QueueSet`].
pub trait QueueSetMember {
  /// The kernel id of the member, creating it if needed.
  fn member_id(&self) -> Result<QueueId, RtosError>;
}

impl<T: QueueItem> QueueSetMember for QueueHandle<T> {
  fn member_id(&self) -> Result<QueueId, RtosError> {
    Ok(self.id())
  }
}

impl<T: QueueItem, const SIZE: usize> QueueSetMember for Queue<T, SIZE> {
  fn member_id(&self) -> Result<QueueId, RtosError> {
    Ok(self.handle()?.id())
  }
}

impl QueueSetMember for SemaphoreHandle {
  fn member_id(&self) -> Result<QueueId, RtosError> {
    Ok(self.id())
  }
}

impl<M: SemaphoreMode> QueueSetMember for Semaphore<M> {
  fn member_id(&self) -> Result<QueueId, RtosError> {
    Ok(self.handle()?.id())
  }
}

/// Wait on several queues and semaphores at once.
///
/// `SIZE` must be at least the sum of the lengths of all members, so no
/// event is lost. Members can only be added or removed while empty, and
/// must then be read only after [`select`](Self::select) named them.
///
/// ```no_run
/// use rtos_kernel::{sync::{Binary, Queue, QueueSet, Semaphore}, Ticks};
///
/// static DATA: Queue<u32, 4> = Queue::new();
/// static STOP: Semaphore<Binary> = Semaphore::new_binary();
/// static SET: QueueSet<5> = QueueSet::new();
///
/// SET.add(&DATA).unwrap();
/// SET.add(&STOP).unwrap();
///
/// loop {
///   let member = SET.select(Ticks::MAX).unwrap();
///   if SET.is(member, &DATA) {
///     let _value = DATA.receive(Ticks::ZERO).unwrap();
///   } else {
///     STOP.take(Ticks::ZERO).unwrap();
///     break
///   }
/// }
/// ```
#[derive(Debug)]
pub struct QueueSet<const SIZE: usize> {
  id: LazyId<QueueId>,
}

impl<const SIZE: usize> QueueSet<SIZE> {
  #[allow(clippy::new_without_default)]
  pub const fn new() -> Self {
    Self { id: LazyId::new() }
  }

  fn id(&self) -> Result<QueueId, RtosError> {
    self.id.get_or_create(|kernel| kernel.create_queue_set(SIZE))
  }

  /// Add an empty queue or semaphore to the set.
  pub fn add(&self, member: &impl QueueSetMember) -> Result<(), RtosError> {
    let (set, member) = (self.id()?, member.member_id()?);
    rt::with(|kernel| kernel.add_to_set(member, set))?
  }

  /// Remove an empty member from the set.
  pub fn remove(&self, member: &impl QueueSetMember) -> Result<(), RtosError> {
    let (set, member) = (self.id()?, member.member_id()?);
    rt::with(|kernel| kernel.remove_from_set(member, set))?
  }

  /// Wait up to `timeout` for a member to have data, returning its id.
  pub fn select(&self, timeout: impl Into<Ticks>) -> Result<QueueId, RtosError> {
    let set = self.id()?;
    rt::block_on(timeout, |kernel, wait| kernel.select(set, wait))
  }

  /// The member with data, from an interrupt.
  pub fn select_from_isr(&self, _ic: &InterruptContext) -> Result<QueueId, RtosError> {
    let set = self.id.get().ok_or(RtosError::InvalidHandle)?;
    rt::with_isr(|kernel| kernel.select_from_isr(set))?
  }

  /// Whether a `selected` id names `member`.
  pub fn is(&self, selected: QueueId, member: &impl QueueSetMember) -> bool {
    member.member_id().map_or(false, |id| id == selected)
  }
}

impl<const SIZE: usize> Drop for QueueSet<SIZE> {
  fn drop(&mut self) {
    if let Some(id) = self.id.take() {
      let _ = rt::with(|kernel| kernel.delete_queue(id));
    }
  }
}
