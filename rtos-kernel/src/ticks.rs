use core::time::Duration;

use crate::config::{TickType, MAX_DELAY, TICK_PERIOD_MS};

/// Duration in kernel ticks.
///
/// This type represents a duration in ticks. The duration of a single tick
/// depends on [`TICK_RATE_HZ`](crate::config::TICK_RATE_HZ).
///
/// All blocking API functions support any type which can be converted to
/// `Ticks`. In particular, you can pass a [`Duration`] seamlessly with the
/// following behaviour:
///
/// - `Duration::ZERO` makes an API call non-blocking and it will return immediately.
/// - `Duration::MAX` blocks an API call until it completes. This is true for any
///   `Duration` which exceeds `MAX_DELAY` ticks.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[repr(transparent)]
pub struct Ticks {
  pub(crate) ticks: TickType,
}

impl Ticks {
  /// Block forever.
  pub const MAX: Self = Self::new(MAX_DELAY);

  /// Do not block.
  pub const ZERO: Self = Self::new(0);

  /// Create `Ticks` from raw ticks.
  pub const fn new(ticks: TickType) -> Self {
    Self { ticks }
  }

  /// Create `Ticks` from milliseconds.
  pub const fn from_millis(ms: u32) -> Self {
    let ticks = ms / TICK_PERIOD_MS;
    Self { ticks }
  }

  /// Raw number of ticks.
  pub const fn as_ticks(&self) -> TickType {
    self.ticks
  }

  /// Whether this duration means "wait forever".
  pub const fn is_forever(&self) -> bool {
    self.ticks == MAX_DELAY
  }
}

impl From<Ticks> for TickType {
  fn from(ticks: Ticks) -> Self {
    ticks.ticks
  }
}

impl From<TickType> for Ticks {
  fn from(ticks: TickType) -> Self {
    Self::new(ticks)
  }
}

impl From<Duration> for Ticks {
  /// Convert a `Duration` to `Ticks`.
  fn from(duration: Duration) -> Self {
    let ticks = duration.as_millis() / TICK_PERIOD_MS as u128;
    Self::new(ticks.try_into().unwrap_or(MAX_DELAY))
  }
}

impl From<Ticks> for Duration {
  fn from(ticks: Ticks) -> Self {
    Duration::from_millis(ticks.ticks as u64 * TICK_PERIOD_MS as u64)
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn duration_max_gte_max_delay() {
    assert_eq!(Ticks::from(Duration::MAX), Ticks::new(MAX_DELAY));
    assert!(Ticks::from(Duration::MAX).is_forever());
  }

  #[test]
  fn duration_zero_does_not_block() {
    assert_eq!(Ticks::from(Duration::ZERO), Ticks::ZERO);
  }

  #[test]
  fn millis_convert_at_tick_rate() {
    assert_eq!(Ticks::from(Duration::from_millis(500)), Ticks::from_millis(500));
    assert_eq!(Duration::from(Ticks::from_millis(20)), Duration::from_millis(20));
  }
}
