//! The kernel instance behind the task, sync and timer types.
//!
//! There is one [`Kernel`] per program. It lives behind a
//! [`critical_section::Mutex`], so every call into it runs inside a critical
//! section, and a task switch the call asks for happens once that section is
//! left.

use core::cell::RefCell;
use core::task::Poll;

use critical_section::Mutex;

use crate::config::Config;
use crate::kernel::{Kernel, Wait};
use crate::port::{self, Port};
use crate::{hooks, RtosError, Ticks};

static KERNEL: Mutex<RefCell<Option<Kernel>>> = Mutex::new(RefCell::new(None));

/// Install a fresh kernel. Fails if the current one is already scheduling.
pub(crate) fn init(config: Config, port: impl Port + 'static) -> Result<(), RtosError> {
  critical_section::with(|cs| {
    let mut kernel = KERNEL.borrow_ref_mut(cs);
    if kernel.as_ref().map_or(false, Kernel::is_running) {
      return Err(RtosError::OwnershipViolation)
    }

    *kernel = Some(Kernel::new(config, port));
    Ok(())
  })
}

/// Run `f` on the kernel without waiting for the caller's turn, as an
/// interrupt handler does.
pub(crate) fn with_isr<R>(f: impl FnOnce(&mut Kernel) -> R) -> Result<R, RtosError> {
  critical_section::with(|cs| KERNEL.borrow_ref_mut(cs).as_mut().map(f).ok_or(RtosError::KernelNotInitialized))
}

/// Run `f` on the kernel on behalf of the calling task.
///
/// Returns once the calling task is the running task again, which is right
/// away unless `f` blocked it or made another task preempt it.
pub(crate) fn with<R>(f: impl FnOnce(&mut Kernel) -> R) -> Result<R, RtosError> {
  let mut f = Some(f);
  loop {
    port::wait_turn();

    // The tick may have switched tasks since `wait_turn` returned, so the
    // turn is checked again under the same critical section as the call.
    let result = with_isr(|kernel| {
      if !port::is_caller_running(kernel.current_task()) {
        return None
      }
      f.take().map(|f| f(kernel))
    })?;

    if let Some(result) = result {
      port::wait_turn();
      return Ok(result)
    }
  }
}

/// Retry a blocking kernel operation until it completes or `timeout` ends.
pub(crate) fn block_on<T>(
  timeout: impl Into<Ticks>,
  mut op: impl FnMut(&mut Kernel, &mut Wait) -> Poll<Result<T, RtosError>>,
) -> Result<T, RtosError> {
  let mut wait = Wait::from(timeout.into());
  loop {
    if let Poll::Ready(result) = with(|kernel| op(kernel, &mut wait))? {
      return result
    }
  }
}

/// Create the idle and timer tasks, start the first task and wait for
/// [`end`] to be called.
pub(crate) fn start() -> Result<(), RtosError> {
  with(|kernel| kernel.start_scheduler(idle_task, timer_task))??;
  port::wait_for_end();
  Ok(())
}

pub(crate) fn end() -> Result<(), RtosError> {
  with(Kernel::end_scheduler)
}

/// Tick interrupt handler for ports.
///
/// Returns whether it switched to another task.
pub fn tick() -> bool {
  with_isr(Kernel::tick).unwrap_or(false)
}

fn idle_task(_: usize) {
  loop {
    hooks::call_idle_hook();
    if with(Kernel::idle_step).is_err() {
      return
    }
    port::relax();
  }
}

fn timer_task(_: usize) {
  loop {
    match with(Kernel::timer_service_poll) {
      // The kernel is released while the callback runs, so it may use any
      // operation that does not block.
      Ok(Poll::Ready(expired)) => expired.run(),
      Ok(Poll::Pending) => {},
      Err(_) => return,
    }
  }
}
