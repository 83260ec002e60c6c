use core::fmt;

/// Basic error type for the library.
#[derive(Copy, Clone, Debug, Eq, PartialEq)]
pub enum RtosError {
  /// A slot table is full or memory allocation failed.
  ResourceExhausted,
  /// Priority outside of the configured number of levels.
  InvalidPriority,
  /// Timeout during a blocking operation.
  Timeout,
  /// A non-blocking call found the resource full or empty.
  WouldBlock,
  /// The caller does not own the object, or already released it.
  OwnershipViolation,
  /// Send on a full queue without waiting.
  CapacityExceeded,
  /// Zero capacity, mismatched item size or initial count above the maximum.
  InvalidQueueSize,
  /// The handle does not refer to a live object.
  InvalidHandle,
  /// Adding or removing a queue set member was not possible.
  QueueSetMembership,
  InvalidTimerPeriod,
  /// The global kernel has not been initialized.
  KernelNotInitialized,
}

impl fmt::Display for RtosError {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    f.write_str(match self {
      Self::ResourceExhausted => "resource exhausted",
      Self::InvalidPriority => "invalid priority",
      Self::Timeout => "timed out",
      Self::WouldBlock => "operation would block",
      Self::OwnershipViolation => "ownership violation",
      Self::CapacityExceeded => "queue is full",
      Self::InvalidQueueSize => "invalid queue size",
      Self::InvalidHandle => "invalid handle",
      Self::QueueSetMembership => "invalid queue set membership",
      Self::InvalidTimerPeriod => "timer period must not be zero",
      Self::KernelNotInitialized => "kernel is not initialized",
    })
  }
}
