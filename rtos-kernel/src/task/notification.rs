use crate::kernel::NotifyAction;

/// Notification to be sent to a task.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TaskNotification {
  /// Send the event and unblock the task without changing the notification value.
  NoAction,
  /// Perform a logical or with the task's notification value.
  SetBits(u32),
  /// Increment the notification value by one.
  Increment,
  /// Unconditionally set the notification value.
  OverwriteValue(u32),
  /// Try setting the notification value to this value.
  ///
  /// # Errors
  ///
  /// This will fail if the task already has pending notifications.
  SetValue(u32),
}

impl TaskNotification {
  pub(crate) const fn to_action(self) -> NotifyAction {
    match self {
      Self::NoAction => NotifyAction::NoAction,
      Self::SetBits(bits) => NotifyAction::SetBits(bits),
      Self::Increment => NotifyAction::Increment,
      Self::OverwriteValue(value) => NotifyAction::Overwrite(value),
      Self::SetValue(value) => NotifyAction::SetValue(value),
    }
  }
}
