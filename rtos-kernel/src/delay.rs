use embedded_hal::blocking::delay::{DelayMs, DelayUs};

use crate::config::TICK_PERIOD_MS;
use crate::task::{CurrentTask, Scheduler};
use crate::ticks::Ticks;

/// Delay the current task by the given duration, minus the
/// time that was spent processing the last wakeup loop.
#[derive(Debug)]
pub struct TaskDelay {
  last_wake_time: Ticks,
}

impl TaskDelay {
  /// Create a new helper, marking the current time as the start of the
  /// next measurement.
  #[allow(clippy::new_without_default)]
  pub fn new() -> TaskDelay {
    TaskDelay { last_wake_time: Scheduler::tick_count() }
  }

  /// Delay the execution of the current task by the given duration,
  /// minus the time spent in this task since the last delay.
  ///
  /// Returns `false` if the deadline already passed.
  pub fn delay_until(&mut self, delay: impl Into<Ticks>) -> bool {
    CurrentTask::delay_until(&mut self.last_wake_time, delay)
  }
}

/// Periodic delay timer.
///
/// Use inside a polling loop, for example: the loop polls this instance every second.
/// The method `should_run` will return true once 30 seconds or more has elapsed
/// and it will then reset the timer for that period.
#[derive(Debug)]
pub struct TaskDelayPeriodic {
  last_wake_time: Ticks,
  period_ticks: Ticks,
}

impl TaskDelayPeriodic {
  /// Create a new timer with the set period.
  pub fn new(period: impl Into<Ticks>) -> TaskDelayPeriodic {
    TaskDelayPeriodic { last_wake_time: Scheduler::tick_count(), period_ticks: period.into() }
  }

  /// Has the set period passed? If it has, resets the internal timer.
  pub fn should_run(&mut self) -> bool {
    let now = Scheduler::tick_count();
    if now.as_ticks().wrapping_sub(self.last_wake_time.as_ticks()) < self.period_ticks.as_ticks() {
      false
    } else {
      self.last_wake_time = now;
      true
    }
  }

  /// Set a new delay period.
  pub fn set_period(&mut self, period: impl Into<Ticks>) {
    self.period_ticks = period.into();
  }

  /// Reset the internal timer to zero.
  pub fn reset(&mut self) {
    self.last_wake_time = Scheduler::tick_count();
  }
}

/// Blocking delay for `embedded-hal` drivers, putting the calling task to
/// sleep.
///
/// Delays are rounded up to whole ticks, so they never end early.
#[derive(Debug, Default, Clone, Copy)]
pub struct Delay;

impl Delay {
  pub const fn new() -> Self {
    Self
  }
}

macro_rules! impl_delay {
  ($($ty:ty),*) => {
    $(
      impl DelayMs<$ty> for Delay {
        fn delay_ms(&mut self, ms: $ty) {
          let ms = u32::from(ms);
          CurrentTask::delay(Ticks::new(ms.div_ceil(TICK_PERIOD_MS.max(1))));
        }
      }

      impl DelayUs<$ty> for Delay {
        fn delay_us(&mut self, us: $ty) {
          let us_per_tick = 1000 * TICK_PERIOD_MS.max(1);
          CurrentTask::delay(Ticks::new(u32::from(us).div_ceil(us_per_tick)));
        }
      }
    )*
  };
}

impl_delay!(u8, u16, u32);
