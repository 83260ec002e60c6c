use crate::config::Config;
use crate::kernel::Kernel;
use crate::port::Port;
use crate::ticks::Ticks;
use crate::{rt, RtosError};

use super::SystemState;

/// State of the task scheduler.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SchedulerState {
  /// Execution of all tasks is suspended.
  Suspended,
  /// Scheduler was not yet started.
  NotStarted,
  /// Scheduler is running.
  Running,
}

/// The task scheduler.
#[non_exhaustive]
pub struct Scheduler;

impl Scheduler {
  /// Set up the kernel with `config` on `port`.
  ///
  /// Must be called before any other kernel object is used. Fails with
  /// [`RtosError::OwnershipViolation`] while a kernel is scheduling.
  pub fn init(config: Config, port: impl Port + 'static) -> Result<(), RtosError> {
    rt::init(config, port)
  }

  /// Start scheduling tasks.
  ///
  /// Returns once [`Scheduler::end`] was called, on ports that support it.
  pub fn start() -> Result<(), RtosError> {
    rt::start()
  }

  /// Stop scheduling tasks.
  pub fn end() -> Result<(), RtosError> {
    rt::end()
  }

  /// Get the current scheduler state.
  #[inline]
  pub fn state() -> SchedulerState {
    rt::with(|kernel| kernel.scheduler_state()).unwrap_or(SchedulerState::NotStarted)
  }

  /// Suspend the scheduler without disabling interrupts.
  #[inline(always)]
  pub fn suspend() {
    let _ = rt::with(Kernel::suspend_all);
  }

  /// Resume the scheduler.
  ///
  /// Returns `true` if resuming the scheduler caused a context switch.
  #[inline]
  pub fn resume() -> bool {
    rt::with(Kernel::resume_all).unwrap_or(false)
  }

  /// Number of ticks since the scheduler was started.
  #[inline(always)]
  pub fn tick_count() -> Ticks {
    Ticks::new(rt::with(|kernel| kernel.tick_count()).unwrap_or(0))
  }

  /// Number of ticks since the scheduler was started, from an interrupt.
  #[inline]
  pub fn tick_count_from_isr() -> Ticks {
    Ticks::new(rt::with_isr(|kernel| kernel.tick_count()).unwrap_or(0))
  }

  /// Get the number of existing tasks.
  pub fn task_count() -> usize {
    rt::with(|kernel| kernel.task_count()).unwrap_or(0)
  }

  /// Get the complete system state.
  pub fn system_state() -> Result<SystemState, RtosError> {
    rt::with(|kernel| kernel.system_state())
  }
}
