use alloc2::sync::Arc;

use crate::{rt, RtosError, Ticks};

use super::{Timer, TimerHandle, TimerId};

/// Helper struct for creating a new timer returned by [`Timer::build`].
#[derive(Debug, Clone)]
pub struct TimerBuilder<'n> {
  pub(super) name: &'n str,
  pub(super) period: Ticks,
  pub(super) auto_reload: bool,
  pub(super) id: usize,
}

impl<'n> TimerBuilder<'n> {
  /// Set the name of the timer.
  pub const fn name<'a>(self, name: &'a str) -> TimerBuilder<'a> {
    TimerBuilder { name, period: self.period, auto_reload: self.auto_reload, id: self.id }
  }

  /// Set the period of the timer.
  pub fn period(mut self, period: impl Into<Ticks>) -> Self {
    self.period = period.into();
    self
  }

  /// Should the timer be automatically reloaded?
  pub const fn auto_reload(mut self, auto_reload: bool) -> Self {
    self.auto_reload = auto_reload;
    self
  }

  /// Set the identifier value the callback can read with
  /// [`TimerHandle::id_value`].
  pub const fn id(mut self, id: usize) -> Self {
    self.id = id;
    self
  }

  /// Create the [`Timer`].
  ///
  /// The callback runs on the timer daemon task, so it must not block.
  /// Note that the newly created timer must be started.
  pub fn create<F>(&self, callback: F) -> Result<Timer, RtosError>
  where
    F: Fn(&TimerHandle) + Send + Sync + 'static,
  {
    let callback = Arc::new(move |timer: TimerId| callback(&TimerHandle::from_id(timer)));
    let period = self.period.as_ticks();
    let id = rt::with(|kernel| kernel.create_timer(self.name, period, self.auto_reload, self.id, callback))??;
    Ok(Timer { handle: TimerHandle::from_id(id) })
  }
}
