use core::cell::Cell;
use core::marker::PhantomData;

use crate::{kernel::Kernel, rt};

/// Representation of an interrupt context.
///
/// The existence of this struct means that the current function is inside an interrupt service
/// routine. The kernel needs to keep track of whether or not to switch to a different task after
/// returning from the interrupt routine, so this struct needs to be passed to all `*_from_isr`
/// functions.
///
/// A single `InterruptContext` should be created at the start of an interrupt routine and dropped
/// as the last thing inside the same interrupt routine, as dropping it performs the switch.
#[must_use]
pub struct InterruptContext {
  higher_priority_task_woken: Cell<bool>,
  // An `InterruptContext` is only valid in the ISR it is created in.
  _not_send: PhantomData<*const ()>,
}

impl InterruptContext {
  /// Instantiate a new interrupt context.
  ///
  /// This must be called from within an interrupt service routine.
  #[allow(clippy::new_without_default)]
  pub fn new() -> Self {
    Self { higher_priority_task_woken: Cell::new(false), _not_send: PhantomData }
  }

  /// Record that an operation woke a task which should run next.
  #[inline]
  pub(crate) fn wake(&self, woken: bool) {
    if woken {
      self.higher_priority_task_woken.set(true);
    }
  }

  /// Whether a task with a higher priority than the interrupted one was woken.
  #[inline]
  pub fn higher_priority_task_woken(&self) -> bool {
    self.higher_priority_task_woken.get()
  }
}

impl Drop for InterruptContext {
  fn drop(&mut self) {
    if self.higher_priority_task_woken.get() {
      let _ = rt::with_isr(Kernel::yield_from_isr);
    }
  }
}
