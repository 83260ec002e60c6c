use core::fmt;

/// Status of a [`Task`](crate::task::Task).
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum TaskState {
  /// The task is querying the state of itself, so must be running.
  Running,
  /// The task is in a ready or pending ready list.
  Ready,
  /// The task is blocked.
  Blocked,
  /// The task is suspended or blocked with an infinite time out.
  Suspended,
  /// The task has been deleted, but its TCB has not yet been freed.
  Deleted,
  /// The task state is invalid.
  Invalid,
}

impl fmt::Display for TaskState {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    f.pad(match self {
      Self::Running => "Running",
      Self::Ready => "Ready",
      Self::Blocked => "Blocked",
      Self::Suspended => "Suspended",
      Self::Deleted => "Deleted",
      Self::Invalid => "Invalid",
    })
  }
}
