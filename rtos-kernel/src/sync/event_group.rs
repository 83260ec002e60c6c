use crate::kernel::{EventBits, EventGroupId};
use crate::lazy_init::LazyId;
use crate::{rt, InterruptContext, RtosError, Ticks};

/// A set of event flags tasks can wait on.
///
/// Only the lower 24 bits can be used; the rest are reserved for the
/// kernel. Waiting on no bits at all, or on reserved ones, is a fatal error.
///
/// ```no_run
/// use rtos_kernel::{sync::EventGroup, Ticks};
///
/// static EVENTS: EventGroup = EventGroup::new();
///
/// EVENTS.set_bits(0b01).unwrap();
/// let bits = EVENTS.wait_bits(0b11, false, false, Ticks::new(10)).unwrap();
/// assert_eq!(bits & 0b11, 0b01);
/// ```
#[derive(Debug)]
pub struct EventGroup {
  id: LazyId<EventGroupId>,
}

impl EventGroup {
  /// Create a new event group with all bits clear.
  #[allow(clippy::new_without_default)]
  pub const fn new() -> Self {
    Self { id: LazyId::new() }
  }

  /// The kernel id of the group, creating it if needed.
  pub fn id(&self) -> Result<EventGroupId, RtosError> {
    self.id.get_or_create(|kernel| kernel.create_event_group())
  }

  fn isr_id(&self) -> Result<EventGroupId, RtosError> {
    self.id.get().ok_or(RtosError::InvalidHandle)
  }

  /// The current bits.
  pub fn bits(&self) -> Result<EventBits, RtosError> {
    let id = self.id()?;
    rt::with_isr(|kernel| kernel.event_group_bits(id))?
  }

  /// The current bits, from an interrupt.
  pub fn bits_from_isr(&self) -> Result<EventBits, RtosError> {
    let id = self.isr_id()?;
    rt::with_isr(|kernel| kernel.event_group_bits(id))?
  }

  /// Set `bits`, waking every task whose condition they complete.
  ///
  /// Returns the bits as they are after the woken tasks cleared theirs.
  pub fn set_bits(&self, bits: EventBits) -> Result<EventBits, RtosError> {
    let id = self.id()?;
    rt::with(|kernel| kernel.set_event_bits(id, bits))?
  }

  /// Set `bits` from an interrupt.
  pub fn set_bits_from_isr(&self, ic: &InterruptContext, bits: EventBits) -> Result<(), RtosError> {
    let id = self.isr_id()?;
    ic.wake(rt::with_isr(|kernel| kernel.set_event_bits_from_isr(id, bits))??);
    Ok(())
  }

  /// Clear `bits`, returning the value from before.
  pub fn clear_bits(&self, bits: EventBits) -> Result<EventBits, RtosError> {
    let id = self.id()?;
    rt::with(|kernel| kernel.clear_event_bits(id, bits))?
  }

  /// Clear `bits` from an interrupt, returning the value from before.
  pub fn clear_bits_from_isr(&self, bits: EventBits) -> Result<EventBits, RtosError> {
    let id = self.isr_id()?;
    rt::with_isr(|kernel| kernel.clear_event_bits_from_isr(id, bits))?
  }

  /// Wait up to `timeout` for any of `bits`, or all of them if `wait_for_all`.
  ///
  /// Returns the value when the wait ended, after `clear_on_exit` cleared
  /// the matched bits. A timeout is not an error: check the returned bits.
  pub fn wait_bits(
    &self,
    bits: EventBits,
    clear_on_exit: bool,
    wait_for_all: bool,
    timeout: impl Into<Ticks>,
  ) -> Result<EventBits, RtosError> {
    let id = self.id()?;
    rt::block_on(timeout, |kernel, wait| kernel.wait_event_bits(id, bits, clear_on_exit, wait_for_all, wait))
  }

  /// Set `bits`, then wait up to `timeout` for all of `wait_for`.
  ///
  /// Every task meeting here is released together and `wait_for` is
  /// cleared for all of them.
  pub fn sync(&self, bits: EventBits, wait_for: EventBits, timeout: impl Into<Ticks>) -> Result<EventBits, RtosError> {
    let id = self.id()?;
    rt::block_on(timeout, |kernel, wait| kernel.sync_event_group(id, bits, wait_for, wait))
  }
}

impl Drop for EventGroup {
  fn drop(&mut self) {
    if let Some(id) = self.id.take() {
      let _ = rt::with(|kernel| kernel.delete_event_group(id));
    }
  }
}
