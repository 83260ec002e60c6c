use crate::kernel::Kernel;
use crate::{rt, RtosError};

/// A kernel critical section, left when dropped.
///
/// Ticks arriving meanwhile are held back and no other task runs until the
/// outermost section ends. Sections nest. Blocking inside one is not
/// possible: blocking calls behave as if called with a zero timeout.
///
/// ```no_run
/// use rtos_kernel::CriticalSection;
///
/// let section = CriticalSection::enter().unwrap();
/// // ...
/// drop(section);
/// ```
#[must_use = "the critical section ends immediately if unused"]
#[derive(Debug)]
#[non_exhaustive]
pub struct CriticalSection {}

impl CriticalSection {
  pub fn enter() -> Result<Self, RtosError> {
    rt::with(Kernel::enter_critical)?;
    Ok(Self {})
  }
}

impl Drop for CriticalSection {
  fn drop(&mut self) {
    let _ = rt::with(Kernel::exit_critical);
  }
}
