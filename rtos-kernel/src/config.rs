//! Kernel configuration.
//!
//! The constants in this module fix the compile-time shape of the kernel
//! (tick type width, name length, stack fill pattern). Everything that may
//! differ between applications lives in [`Config`], which is handed to
//! [`Kernel::new`](crate::kernel::Kernel::new).

/// Type used for tick counts and wake times.
pub type TickType = u32;

/// Type of a single stack slot.
pub type StackWord = u32;

/// Number of priority levels used by [`TaskPriority`](crate::task::TaskPriority).
pub const MAX_PRIORITIES: u8 = 32;

/// Tick interrupt frequency.
pub const TICK_RATE_HZ: u32 = 1000;

/// Length of one tick in milliseconds.
pub const TICK_PERIOD_MS: u32 = 1000 / TICK_RATE_HZ;

/// Block time meaning "wait forever".
pub const MAX_DELAY: TickType = TickType::MAX;

/// Smallest useful task stack, in words.
pub const MINIMAL_STACK_SIZE: usize = 128;

/// Maximum number of bytes kept from a task or timer name.
pub const MAX_TASK_NAME_LEN: usize = 16;

/// Pattern a fresh stack is filled with.
pub const STACK_FILL_WORD: StackWord = 0xa5a5_a5a5;

/// Number of words at the far end of a stack which must keep the fill pattern.
pub const STACK_GUARD_WORDS: usize = 4;

/// Runtime kernel configuration.
///
/// ```
/// use rtos_kernel::Config;
///
/// let config = Config::new()
///   .max_priorities(8)
///   .use_time_slicing(false)
///   .timer_task_priority(7);
/// assert_eq!(config.priorities(), 8);
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Config {
  pub(crate) max_priorities: u8,
  pub(crate) max_tasks: usize,
  pub(crate) max_queues: usize,
  pub(crate) max_event_groups: usize,
  pub(crate) max_timers: usize,
  pub(crate) use_preemption: bool,
  pub(crate) use_time_slicing: bool,
  pub(crate) idle_should_yield: bool,
  pub(crate) timer_task_priority: u8,
  pub(crate) timer_task_stack_size: usize,
  pub(crate) timer_queue_length: usize,
  pub(crate) check_for_stack_overflow: bool,
  pub(crate) use_tickless_idle: bool,
  pub(crate) expected_idle_time_before_sleep: TickType,
  pub(crate) initial_tick_count: TickType,
}

impl Config {
  pub const fn new() -> Self {
    Self {
      max_priorities: MAX_PRIORITIES,
      max_tasks: 32,
      max_queues: 64,
      max_event_groups: 16,
      max_timers: 16,
      use_preemption: true,
      use_time_slicing: true,
      idle_should_yield: true,
      timer_task_priority: MAX_PRIORITIES - 1,
      timer_task_stack_size: MINIMAL_STACK_SIZE * 2,
      timer_queue_length: 10,
      check_for_stack_overflow: true,
      use_tickless_idle: false,
      expected_idle_time_before_sleep: 2,
      initial_tick_count: 0,
    }
  }

  /// Set the number of priority levels, clamped to `1..=MAX_PRIORITIES`.
  pub const fn max_priorities(mut self, max_priorities: u8) -> Self {
    self.max_priorities = if max_priorities == 0 {
      1
    } else if max_priorities > MAX_PRIORITIES {
      MAX_PRIORITIES
    } else {
      max_priorities
    };
    if self.timer_task_priority >= self.max_priorities {
      self.timer_task_priority = self.max_priorities - 1;
    }
    self
  }

  /// Size of the task slot table, including the idle and timer tasks.
  pub const fn max_tasks(mut self, max_tasks: usize) -> Self {
    self.max_tasks = max_tasks;
    self
  }

  /// Size of the queue slot table. Semaphores, mutexes and queue sets use
  /// queue slots, and so does the timer command queue.
  pub const fn max_queues(mut self, max_queues: usize) -> Self {
    self.max_queues = max_queues;
    self
  }

  pub const fn max_event_groups(mut self, max_event_groups: usize) -> Self {
    self.max_event_groups = max_event_groups;
    self
  }

  pub const fn max_timers(mut self, max_timers: usize) -> Self {
    self.max_timers = max_timers;
    self
  }

  /// Whether a task becoming ready preempts a lower priority running task.
  pub const fn use_preemption(mut self, use_preemption: bool) -> Self {
    self.use_preemption = use_preemption;
    self
  }

  /// Whether equal priority tasks share the processor on every tick.
  pub const fn use_time_slicing(mut self, use_time_slicing: bool) -> Self {
    self.use_time_slicing = use_time_slicing;
    self
  }

  /// Whether the idle task yields to other priority 0 tasks.
  pub const fn idle_should_yield(mut self, idle_should_yield: bool) -> Self {
    self.idle_should_yield = idle_should_yield;
    self
  }

  pub const fn timer_task_priority(mut self, priority: u8) -> Self {
    self.timer_task_priority = if priority >= self.max_priorities {
      self.max_priorities - 1
    } else {
      priority
    };
    self
  }

  pub const fn timer_task_stack_size(mut self, stack_size: usize) -> Self {
    self.timer_task_stack_size = stack_size;
    self
  }

  /// Capacity of the timer command queue.
  pub const fn timer_queue_length(mut self, length: usize) -> Self {
    self.timer_queue_length = length;
    self
  }

  /// Check the stack guard words of every task it is switched out.
  pub const fn check_for_stack_overflow(mut self, check: bool) -> Self {
    self.check_for_stack_overflow = check;
    self
  }

  /// Let the idle task stop the tick and sleep when nothing is due soon.
  pub const fn use_tickless_idle(mut self, use_tickless_idle: bool) -> Self {
    self.use_tickless_idle = use_tickless_idle;
    self
  }

  /// Minimum number of idle ticks before the idle task asks the port to sleep.
  pub const fn expected_idle_time_before_sleep(mut self, ticks: TickType) -> Self {
    self.expected_idle_time_before_sleep = if ticks < 2 { 2 } else { ticks };
    self
  }

  /// Tick count the kernel starts from. Starting close to
  /// [`TickType::MAX`] makes the first counter wrap happen early.
  pub const fn initial_tick_count(mut self, ticks: TickType) -> Self {
    self.initial_tick_count = ticks;
    self
  }

  /// Number of priority levels.
  pub const fn priorities(&self) -> u8 {
    self.max_priorities
  }
}

impl Default for Config {
  fn default() -> Self {
    Self::new()
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn max_priorities_is_clamped() {
    assert_eq!(Config::new().max_priorities(0).priorities(), 1);
    assert_eq!(Config::new().max_priorities(200).priorities(), MAX_PRIORITIES);
  }

  #[test]
  fn timer_priority_follows_priority_count() {
    let config = Config::new().max_priorities(4);
    assert_eq!(config.timer_task_priority, 3);

    let config = config.timer_task_priority(9);
    assert_eq!(config.timer_task_priority, 3);
  }
}
