use crate::config::{TickType, MAX_DELAY};
use crate::ticks::Ticks;

/// Point in time a blocking call started waiting, robust against tick wraps.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) struct TimeOut {
  pub(crate) overflow_count: u32,
  pub(crate) entered_at: TickType,
}

/// Block time of one blocking call.
///
/// A blocking kernel operation that cannot complete parks the calling task
/// and returns [`Poll::Pending`](core::task::Poll::Pending). Once the task
/// runs again it retries the operation with the same `Wait`, which then only
/// blocks for whatever is left of the original block time.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Wait {
  pub(crate) remaining: TickType,
  pub(crate) timeout: Option<TimeOut>,
}

impl Wait {
  /// Block for at most `ticks`.
  pub const fn new(ticks: TickType) -> Self {
    Self { remaining: ticks, timeout: None }
  }

  /// Block until the operation completes.
  pub const fn forever() -> Self {
    Self::new(MAX_DELAY)
  }

  /// Do not block at all.
  pub const fn poll() -> Self {
    Self::new(0)
  }

  /// Whether the calling task already blocked once with this `Wait`.
  pub const fn is_started(&self) -> bool {
    self.timeout.is_some()
  }

  /// Ticks left before the call times out.
  pub const fn remaining(&self) -> TickType {
    self.remaining
  }
}

impl From<Ticks> for Wait {
  fn from(ticks: Ticks) -> Self {
    Self::new(ticks.as_ticks())
  }
}
