use core::fmt;

use crate::config::MAX_PRIORITIES;

/// Task execution priority.
///
/// Low priority numbers denote low priority tasks. Whether a priority is
/// usable also depends on [`Config::max_priorities`](crate::Config::max_priorities);
/// creating a task above it fails with
/// [`RtosError::InvalidPriority`](crate::RtosError::InvalidPriority).
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct TaskPriority {
  priority: u8,
}

impl TaskPriority {
  /// The priority of the idle task.
  pub const IDLE: Self = Self { priority: 0 };

  /// Create a new `TaskPriority`.
  ///
  /// Returns `None` if `priority` is greater or equal to [`MAX_PRIORITIES`].
  pub const fn new(priority: u8) -> Option<Self> {
    if priority >= MAX_PRIORITIES {
      return None
    }

    Some(Self { priority })
  }

  pub(crate) const fn from_kernel(priority: u8) -> Self {
    Self { priority }
  }

  #[inline]
  pub const fn get(self) -> u8 {
    self.priority
  }
}

impl fmt::Display for TaskPriority {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    self.priority.fmt(f)
  }
}

#[derive(Debug, Clone, Copy)]
#[non_exhaustive]
pub struct PriorityOverflow;

impl TryFrom<u8> for TaskPriority {
  type Error = PriorityOverflow;

  fn try_from(priority: u8) -> Result<Self, Self::Error> {
    Self::new(priority).ok_or(PriorityOverflow)
  }
}
