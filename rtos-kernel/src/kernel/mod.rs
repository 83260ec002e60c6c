//! The scheduler and every kernel object, as one state machine.
//!
//! [`Kernel`] owns all tasks, queues, event groups and timers and decides
//! which task runs. It never executes task code itself: operations that
//! change the running task ask the [`Port`] to switch, and operations that
//! have to wait return [`Poll::Pending`](core::task::Poll::Pending) after
//! parking the calling task, to be retried with the same [`Wait`] once the
//! task runs again.
//!
//! Ordering of tasks waiting on the same object uses the item key
//! `max_priorities - priority`, so the highest priority waiter is always at
//! the head and equal priorities are served first come, first served.

use alloc2::{boxed::Box, vec::Vec};

use crate::config::{Config, TickType, MAX_DELAY, MINIMAL_STACK_SIZE};
use crate::port::{Port, TaskEntry};
use crate::task::SchedulerState;
use crate::{hooks, kernel_assert, trace, RtosError};

pub(crate) mod list;
pub(crate) mod pool;

mod event_group;
mod mutex;
mod notify;
mod queue;
mod task;
mod timer;
mod wait;

pub use event_group::{EventBits, EVENT_BITS_MASK};
pub use notify::NotifyAction;
pub use queue::{QueueKind, SendPosition};
pub use timer::{ExpiredTimer, TimerCallback};
pub use wait::Wait;

use event_group::EventGroupCb;
use list::{ListArena, ListId};
use pool::{pool_id, Pool};
use queue::QueueCb;
use task::Tcb;
use timer::{TimerCb, TimerService};
use wait::TimeOut;

pool_id!(
  /// Handle of a task.
  TaskId
);

pool_id!(
  /// Handle of a queue, semaphore, mutex or queue set.
  QueueId
);

pool_id!(
  /// Handle of an event group.
  EventGroupId
);

pool_id!(
  /// Handle of a software timer.
  TimerId
);

/// Every kernel object plus the scheduler state.
pub struct Kernel {
  config: Config,
  port: Box<dyn Port>,

  lists: ListArena<TaskId>,
  tasks: Pool<TaskId, Tcb>,
  queues: Pool<QueueId, QueueCb>,
  event_groups: Pool<EventGroupId, EventGroupCb>,
  timers: Pool<TimerId, TimerCb>,
  timer_service: TimerService,

  ready: Vec<ListId>,
  delayed: ListId,
  overflow_delayed: ListId,
  suspended: ListId,
  pending_ready: ListId,
  terminating: ListId,

  tick: TickType,
  overflow_count: u32,
  next_unblock: TickType,
  top_ready_priority: u8,
  current: Option<TaskId>,
  running: bool,
  critical_nesting: u32,
  masked_ticks: TickType,
  scheduler_suspended: u32,
  yield_pending: bool,
  pended_ticks: TickType,
  next_task_number: u32,
  idle_task: Option<TaskId>,
  context_switches: u64,
}

impl Kernel {
  /// Create a kernel that has not started scheduling yet.
  pub fn new(config: Config, port: impl Port + 'static) -> Self {
    let mut lists = ListArena::new();
    let ready = (0..config.max_priorities).map(|_| lists.new_list()).collect();
    let delayed = lists.new_list();
    let overflow_delayed = lists.new_list();
    let suspended = lists.new_list();
    let pending_ready = lists.new_list();
    let terminating = lists.new_list();

    Self {
      port: Box::new(port),
      lists,
      tasks: Pool::new(config.max_tasks),
      queues: Pool::new(config.max_queues),
      event_groups: Pool::new(config.max_event_groups),
      timers: Pool::new(config.max_timers),
      timer_service: TimerService::new(config.initial_tick_count),
      ready,
      delayed,
      overflow_delayed,
      suspended,
      pending_ready,
      terminating,
      tick: config.initial_tick_count,
      overflow_count: 0,
      next_unblock: MAX_DELAY,
      top_ready_priority: 0,
      current: None,
      running: false,
      critical_nesting: 0,
      masked_ticks: 0,
      scheduler_suspended: 0,
      yield_pending: false,
      pended_ticks: 0,
      next_task_number: 0,
      idle_task: None,
      context_switches: 0,
      config,
    }
  }

  #[inline]
  pub fn config(&self) -> &Config {
    &self.config
  }

  /// The task the kernel considers running.
  #[inline]
  pub fn current_task(&self) -> Option<TaskId> {
    self.current
  }

  #[inline]
  pub fn tick_count(&self) -> TickType {
    self.tick
  }

  #[inline]
  pub fn is_running(&self) -> bool {
    self.running
  }

  pub fn scheduler_state(&self) -> SchedulerState {
    if !self.running {
      SchedulerState::NotStarted
    } else if self.scheduler_suspended > 0 {
      SchedulerState::Suspended
    } else {
      SchedulerState::Running
    }
  }

  /// Number of times a different task was switched in.
  #[inline]
  pub fn context_switch_count(&self) -> u64 {
    self.context_switches
  }

  #[inline]
  pub fn idle_task(&self) -> Option<TaskId> {
    self.idle_task
  }

  /// Start scheduling: create the idle and timer service tasks and pick the
  /// first task to run.
  pub fn start_scheduler(&mut self, idle_entry: TaskEntry, timer_entry: TaskEntry) -> Result<(), RtosError> {
    if self.running {
      return Ok(())
    }

    let idle = self.create_task("IDLE", idle_entry, 0, MINIMAL_STACK_SIZE, 0)?;
    self.idle_task = Some(idle);
    self.start_timer_service(timer_entry)?;

    self.reset_next_unblock();
    self.running = true;
    let first = self.select_next();
    self.current = Some(first);

    log::info!(target: "rtos_kernel::sched", "scheduler started with {} tasks", self.tasks.len());
    self.port.start_first_task(first);
    Ok(())
  }

  /// Stop scheduling and hand control back to the port.
  pub fn end_scheduler(&mut self) {
    log::info!(target: "rtos_kernel::sched", "scheduler stopped at tick {}", self.tick);
    self.running = false;
    self.port.end_scheduler();
  }

  fn tcb(&self, task: TaskId) -> &Tcb {
    match self.tasks.get(task) {
      Ok(tcb) => tcb,
      Err(_) => crate::assert::assert_failed("stale task handle inside the kernel", file!(), line!()),
    }
  }

  fn tcb_mut(&mut self, task: TaskId) -> &mut Tcb {
    match self.tasks.get_mut(task) {
      Ok(tcb) => tcb,
      Err(_) => crate::assert::assert_failed("stale task handle inside the kernel", file!(), line!()),
    }
  }

  fn current_priority(&self) -> u8 {
    self.current.and_then(|task| self.tasks.get(task).ok()).map_or(0, |tcb| tcb.priority)
  }

  /// Whether a task of `priority` becoming ready should preempt the running one.
  fn preempts(&self, priority: u8) -> bool {
    self.running && self.current.is_some() && priority > self.current_priority()
  }

  fn add_to_ready(&mut self, task: TaskId) {
    let tcb = self.tcb(task);
    let (item, priority) = (tcb.state_item, tcb.priority);
    self.lists.insert_end(self.ready[usize::from(priority)], item);
    if priority > self.top_ready_priority {
      self.top_ready_priority = priority;
    }
  }

  /// Rotate to the next task of the highest non-empty ready list.
  fn select_next(&mut self) -> TaskId {
    let mut priority = usize::from(self.top_ready_priority);
    while self.lists.is_empty(self.ready[priority]) {
      kernel_assert!(priority > 0, "no task is ready to run");
      priority -= 1;
    }
    self.top_ready_priority = priority as u8;

    match self.lists.next_owner(self.ready[priority]) {
      Some(task) => task,
      None => crate::assert::assert_failed("ready list emptied during selection", file!(), line!()),
    }
  }

  fn switch_context(&mut self) {
    if self.scheduler_suspended > 0 {
      self.yield_pending = true;
      return
    }
    self.yield_pending = false;

    if let Some(current) = self.current {
      if self.config.check_for_stack_overflow {
        self.check_stack(current);
      }
    }

    let next = self.select_next();
    if self.current != Some(next) {
      self.context_switches += 1;
      trace::task_switched_in(self.current, next);
      self.port.request_context_switch(self.current, next);
    }
    self.current = Some(next);
  }

  /// Reschedule now, or as soon as the critical section or scheduler
  /// suspension ends.
  fn yield_within_api(&mut self) {
    if !self.running {
      return
    }

    if self.critical_nesting > 0 || self.scheduler_suspended > 0 {
      self.yield_pending = true;
    } else {
      self.switch_context();
    }
  }

  fn preempt(&mut self, needed: bool) {
    if needed && self.config.use_preemption {
      self.yield_within_api();
    }
  }

  /// Let other ready tasks of the same priority run.
  pub fn yield_now(&mut self) {
    self.yield_within_api();
  }

  /// Perform the switch an interrupt asked for on its way out.
  pub fn yield_from_isr(&mut self) {
    self.yield_within_api();
  }

  pub fn enter_critical(&mut self) {
    if self.critical_nesting == 0 {
      self.port.disable_interrupts();
    }
    self.critical_nesting += 1;
  }

  /// Leave a critical section. Leaving the outermost one delivers ticks
  /// that arrived in between and performs a deferred switch.
  pub fn exit_critical(&mut self) {
    kernel_assert!(self.critical_nesting > 0, "critical section exit without entry");
    self.critical_nesting -= 1;
    if self.critical_nesting > 0 {
      return
    }

    self.port.enable_interrupts();
    while self.masked_ticks > 0 {
      self.masked_ticks -= 1;
      if self.advance_tick(false) {
        self.yield_pending = true;
      }
    }

    if self.yield_pending {
      self.yield_within_api();
    }
  }

  #[inline]
  pub fn critical_nesting(&self) -> u32 {
    self.critical_nesting
  }

  pub fn enter_critical_from_isr(&mut self) -> u32 {
    self.port.set_interrupt_mask_from_isr()
  }

  pub fn exit_critical_from_isr(&mut self, mask: u32) {
    self.port.clear_interrupt_mask_from_isr(mask);
  }

  /// Stop switching tasks without masking interrupts. Nests.
  pub fn suspend_all(&mut self) {
    self.scheduler_suspended += 1;
  }

  /// Undo one [`suspend_all`](Self::suspend_all).
  ///
  /// Tasks readied in the meantime move to their ready lists, missed ticks
  /// are processed, and a pending switch happens. Returns whether it did.
  pub fn resume_all(&mut self) -> bool {
    kernel_assert!(self.scheduler_suspended > 0, "scheduler resumed without being suspended");
    self.scheduler_suspended -= 1;
    if self.scheduler_suspended > 0 || !self.running {
      return false
    }

    while let Some(item) = self.lists.head(self.pending_ready) {
      let task = self.lists.owner(item);
      self.lists.remove(item);

      let tcb = self.tcb(task);
      let (state_item, priority) = (tcb.state_item, tcb.priority);
      if self.lists.is_listed(state_item) {
        self.lists.remove(state_item);
      }
      self.add_to_ready(task);

      if self.config.use_preemption && self.preempts(priority) {
        self.yield_pending = true;
      }
    }
    self.reset_next_unblock();

    while self.pended_ticks > 0 {
      self.pended_ticks -= 1;
      if self.advance_tick(true) {
        self.yield_pending = true;
      }
    }

    if self.yield_pending && self.config.use_preemption {
      self.yield_within_api();
      return true
    }
    false
  }

  /// Tick interrupt: advance time and switch if that made another task due.
  ///
  /// Returns whether a switch was requested.
  pub fn tick(&mut self) -> bool {
    let switch = self.increment_tick();
    if switch {
      self.yield_within_api();
    }
    switch
  }

  /// Advance time by one tick without switching.
  ///
  /// Returns whether the running task should be switched out.
  pub fn increment_tick(&mut self) -> bool {
    self.advance_tick(false)
  }

  fn advance_tick(&mut self, replay: bool) -> bool {
    if !self.running {
      return false
    }
    if self.critical_nesting > 0 {
      self.masked_ticks += 1;
      return false
    }
    if self.scheduler_suspended > 0 {
      self.pended_ticks += 1;
      hooks::call_tick_hook();
      return false
    }

    self.tick = self.tick.wrapping_add(1);
    if self.tick == 0 {
      self.switch_delayed_lists();
    }

    if let Some(current) = self.current {
      if let Ok(tcb) = self.tasks.get_mut(current) {
        tcb.run_ticks = tcb.run_ticks.wrapping_add(1);
      }
    }

    let mut switch = false;
    if self.tick >= self.next_unblock {
      switch |= self.wake_delayed();
    }

    let current_ready = self.ready[usize::from(self.current_priority())];
    if self.config.use_preemption && self.config.use_time_slicing && self.lists.len(current_ready) > 1 {
      switch = true;
    }

    if !replay {
      hooks::call_tick_hook();
    }

    if self.yield_pending && self.config.use_preemption {
      switch = true;
    }
    switch
  }

  fn wake_delayed(&mut self) -> bool {
    let mut switch = false;
    loop {
      let Some(item) = self.lists.head(self.delayed) else {
        self.next_unblock = MAX_DELAY;
        break
      };

      let wake_at = self.lists.value(item);
      if self.tick < wake_at {
        self.next_unblock = wake_at;
        break
      }

      let task = self.lists.owner(item);
      self.unblock(task);

      if self.config.use_preemption && self.running && self.tcb(task).priority >= self.current_priority() {
        switch = true;
      }
    }
    switch
  }

  /// Move a blocked task to its ready list, wherever it was waiting.
  fn unblock(&mut self, task: TaskId) {
    let tcb = self.tcb_mut(task);
    if tcb.notify_state == notify::NotifyState::Waiting {
      tcb.notify_state = notify::NotifyState::NotWaiting;
    }
    let (state_item, event_item) = (tcb.state_item, tcb.event_item);

    if self.lists.is_listed(state_item) {
      self.lists.remove(state_item);
    }
    if self.lists.is_listed(event_item) {
      self.lists.remove(event_item);
    }
    self.add_to_ready(task);
  }

  fn switch_delayed_lists(&mut self) {
    kernel_assert!(self.lists.is_empty(self.delayed), "delayed tasks left when the tick counter wrapped");
    core::mem::swap(&mut self.delayed, &mut self.overflow_delayed);
    self.overflow_count = self.overflow_count.wrapping_add(1);
    self.reset_next_unblock();
    trace::tick_overflow(self.overflow_count);
  }

  fn reset_next_unblock(&mut self) {
    self.next_unblock = self.lists.head_value(self.delayed).unwrap_or(MAX_DELAY);
  }

  fn timeout_state(&self) -> TimeOut {
    TimeOut { overflow_count: self.overflow_count, entered_at: self.tick }
  }

  /// Decide whether the running task may block for `wait`.
  ///
  /// The first call starts the timeout and returns the full block time.
  /// Retries return what is left of it, or [`RtosError::Timeout`] once it
  /// ran out or the wait was aborted. When blocking is impossible, the first
  /// call fails with `poll_error`.
  fn prepare_block(&mut self, wait: &mut Wait, poll_error: RtosError) -> Result<TickType, RtosError> {
    let started = wait.is_started();
    let give_up = if started { RtosError::Timeout } else { poll_error };

    let Some(current) = self.current else {
      return Err(give_up)
    };
    if !self.running || self.critical_nesting > 0 || self.scheduler_suspended > 0 || wait.remaining == 0 {
      return Err(give_up)
    }

    if !started {
      wait.timeout = Some(self.timeout_state());
      return Ok(wait.remaining)
    }

    if self.check_for_timeout(current, wait) {
      Err(RtosError::Timeout)
    } else {
      Ok(wait.remaining)
    }
  }

  /// Returns `true` if the wait is over; otherwise shrinks it by the time
  /// that already passed.
  fn check_for_timeout(&mut self, task: TaskId, wait: &mut Wait) -> bool {
    if core::mem::take(&mut self.tcb_mut(task).delay_aborted) {
      wait.remaining = 0;
      return true
    }
    if wait.remaining == MAX_DELAY {
      return false
    }
    let Some(timeout) = wait.timeout else {
      return false
    };

    let now = self.tick;
    let elapsed = now.wrapping_sub(timeout.entered_at);

    // Wrapped at least once and passed the start tick again.
    if self.overflow_count != timeout.overflow_count && now >= timeout.entered_at {
      wait.remaining = 0;
      return true
    }

    if elapsed < wait.remaining {
      wait.remaining -= elapsed;
      wait.timeout = Some(self.timeout_state());
      false
    } else {
      wait.remaining = 0;
      true
    }
  }

  #[inline]
  fn event_key(&self, priority: u8) -> TickType {
    TickType::from(self.config.max_priorities - priority)
  }

  /// Block the running task on `list` in priority order.
  fn place_on_event_list(&mut self, list: ListId, ticks: TickType) {
    let Some(current) = self.current else {
      return
    };

    let tcb = self.tcb(current);
    let (item, key) = (tcb.event_item, self.event_key(tcb.priority));
    self.lists.set_value(item, key);
    self.lists.insert(list, item);
    self.add_current_to_delayed(ticks, true);
  }

  /// Block the running task at the end of `list`, regardless of priority.
  fn place_on_unordered_event_list(&mut self, list: ListId, ticks: TickType) {
    let Some(current) = self.current else {
      return
    };

    let item = self.tcb(current).event_item;
    self.lists.insert_end(list, item);
    self.add_current_to_delayed(ticks, true);
  }

  /// Move the running task out of its ready list into the delayed list, or
  /// into the suspended list when it may wait forever.
  fn add_current_to_delayed(&mut self, ticks: TickType, can_block_indefinitely: bool) {
    let Some(current) = self.current else {
      return
    };

    let tick = self.tick;
    let tcb = self.tcb_mut(current);
    tcb.delay_aborted = false;
    let item = tcb.state_item;

    if self.lists.is_listed(item) {
      self.lists.remove(item);
    }

    if ticks == MAX_DELAY && can_block_indefinitely {
      self.lists.insert_end(self.suspended, item);
      return
    }

    let wake_at = tick.wrapping_add(ticks);
    self.lists.set_value(item, wake_at);
    if wake_at < tick {
      self.lists.insert(self.overflow_delayed, item);
    } else {
      self.lists.insert(self.delayed, item);
      if wake_at < self.next_unblock {
        self.next_unblock = wake_at;
      }
    }
    trace::task_delay(current, wake_at);
  }

  /// Wake the highest priority task waiting on `list`.
  ///
  /// Returns whether it has a higher priority than the running task.
  fn remove_from_event_list(&mut self, list: ListId) -> bool {
    match self.lists.head_owner(list) {
      Some(task) => self.wake_from_event(task),
      None => false,
    }
  }

  /// Take `task` off the event list it waits on and make it ready, or park
  /// it in the pending ready list while the scheduler is suspended.
  fn wake_from_event(&mut self, task: TaskId) -> bool {
    let tcb = self.tcb(task);
    let (event_item, state_item, priority) = (tcb.event_item, tcb.state_item, tcb.priority);

    if self.lists.is_listed(event_item) {
      self.lists.remove(event_item);
    }

    if self.scheduler_suspended == 0 {
      if self.lists.is_listed(state_item) {
        self.lists.remove(state_item);
      }
      self.add_to_ready(task);
      self.reset_next_unblock();
    } else {
      self.lists.insert_end(self.pending_ready, event_item);
    }

    let higher = self.preempts(priority);
    if higher && self.config.use_preemption {
      self.yield_pending = true;
    }
    higher
  }

  /// Make a task that waits without an event list ready, from an interrupt.
  fn ready_from_isr(&mut self, task: TaskId) -> bool {
    let tcb = self.tcb(task);
    let (event_item, state_item, priority) = (tcb.event_item, tcb.state_item, tcb.priority);

    if self.scheduler_suspended == 0 {
      if self.lists.is_listed(state_item) {
        self.lists.remove(state_item);
      }
      self.add_to_ready(task);
      self.reset_next_unblock();
    } else if !self.lists.is_listed(event_item) {
      self.lists.insert_end(self.pending_ready, event_item);
    }

    let higher = self.preempts(priority);
    if higher && self.config.use_preemption {
      self.yield_pending = true;
    }
    higher
  }

  /// One pass of the idle task: free deleted tasks, share the processor
  /// with other idle priority tasks and sleep if nothing is due.
  pub fn idle_step(&mut self) {
    self.reclaim_terminated();

    let others_at_idle = self.lists.len(self.ready[0]) > 1;
    if !self.config.use_preemption || (self.config.idle_should_yield && others_at_idle) {
      self.yield_within_api();
      return
    }

    if self.config.use_tickless_idle {
      self.low_power_idle();
    }
  }

  fn reclaim_terminated(&mut self) {
    while let Some(task) = self.lists.head_owner(self.terminating) {
      if Some(task) == self.current {
        break
      }

      let item = self.tcb(task).state_item;
      self.lists.remove(item);
      self.free_task(task);
    }
  }

  /// Ticks until the next task is due, or 0 if something other than the
  /// idle task could run right away.
  pub fn expected_idle_time(&self) -> TickType {
    if self.current_priority() > 0
      || self.lists.len(self.ready[0]) > 1
      || !self.lists.is_empty(self.pending_ready)
      || self.ready[1..].iter().any(|&list| !self.lists.is_empty(list))
    {
      return 0
    }

    self.next_unblock.wrapping_sub(self.tick)
  }

  fn low_power_idle(&mut self) {
    let threshold = self.config.expected_idle_time_before_sleep;
    if self.expected_idle_time() < threshold {
      return
    }

    self.suspend_all();

    let expected = self.expected_idle_time();
    if expected >= threshold {
      let expected = hooks::call_pre_sleep_hook(expected);
      let mut slept = 0;
      if expected > 0 {
        trace::low_power_idle_begin(expected);
        slept = self.port.suppress_ticks_and_sleep(expected).min(expected);
        self.step_tick(slept);
        trace::low_power_idle_end(slept);
      }
      hooks::call_post_sleep_hook(slept);
    }

    self.resume_all();
  }

  /// Account for `ticks` that passed while the tick was stopped.
  ///
  /// The last of them is delivered as a regular tick so that tasks due at
  /// exactly that time are woken.
  pub fn step_tick(&mut self, ticks: TickType) {
    if ticks == 0 {
      return
    }
    kernel_assert!(
      ticks <= self.next_unblock.wrapping_sub(self.tick),
      "tick stepped past the next unblock time",
    );

    self.tick = self.tick.wrapping_add(ticks - 1);
    if self.advance_tick(true) {
      self.yield_pending = true;
    }
  }
}

#[cfg(test)]
pub(crate) mod testing {
  use super::*;
  use crate::port::Simulated;

  pub fn noop(_: usize) {}

  pub fn config() -> Config {
    Config::new().max_priorities(8).check_for_stack_overflow(true)
  }

  pub fn kernel() -> Kernel {
    Kernel::new(config(), Simulated::new())
  }

  pub fn spawn(kernel: &mut Kernel, name: &str, priority: u8) -> TaskId {
    kernel.create_task(name, noop, 0, MINIMAL_STACK_SIZE, priority).unwrap()
  }

  /// Start the scheduler and let the timer service park itself.
  pub fn start(kernel: &mut Kernel) {
    kernel.start_scheduler(noop, noop).unwrap();
    settle_timer_service(kernel);
  }

  /// Run the timer service while it is the running task.
  pub fn settle_timer_service(kernel: &mut Kernel) {
    while kernel.current_task() == kernel.timer_daemon() {
      assert!(kernel.timer_service_poll().is_pending(), "unexpected timer expiry");
    }
  }

  pub fn ticks(kernel: &mut Kernel, n: TickType) {
    for _ in 0..n {
      kernel.tick();
    }
  }
}

#[cfg(test)]
mod tests {
  use super::testing::*;
  use super::*;
  use crate::task::TaskState;

  #[test]
  fn highest_priority_task_runs_first() {
    let mut k = kernel();
    let low = spawn(&mut k, "low", 1);
    let high = spawn(&mut k, "high", 3);
    start(&mut k);

    assert_eq!(k.current_task(), Some(high));
    assert_eq!(k.task_state(low), Ok(TaskState::Ready));
    assert_eq!(k.scheduler_state(), SchedulerState::Running);
  }

  #[test]
  fn equal_priorities_share_the_processor() {
    let mut k = kernel();
    let a = spawn(&mut k, "a", 2);
    let b = spawn(&mut k, "b", 2);
    start(&mut k);

    let first = k.current_task();
    ticks(&mut k, 1);
    let second = k.current_task();
    ticks(&mut k, 1);

    assert_ne!(first, second);
    assert_eq!(k.current_task(), first);
    assert!([Some(a), Some(b)].contains(&first));
  }

  #[test]
  fn time_slicing_can_be_disabled() {
    let mut k = Kernel::new(config().use_time_slicing(false), crate::port::Simulated::new());
    spawn(&mut k, "a", 2);
    spawn(&mut k, "b", 2);
    start(&mut k);

    let first = k.current_task();
    ticks(&mut k, 5);
    assert_eq!(k.current_task(), first);
  }

  #[test]
  fn woken_task_queues_behind_ready_peers() {
    let mut k = kernel();
    let tasks = [spawn(&mut k, "a", 2), spawn(&mut k, "b", 2), spawn(&mut k, "c", 2)];
    start(&mut k);

    let sleeper = k.current_task();
    k.delay(1);
    let next = k.current_task();
    assert_ne!(next, sleeper);
    let last = tasks.into_iter().map(Some).find(|&task| task != sleeper && task != next).flatten();

    ticks(&mut k, 1);
    assert_eq!(k.task_state(sleeper.unwrap()), Ok(TaskState::Ready));
    assert_eq!(k.current_task(), last);
    ticks(&mut k, 1);
    assert_eq!(k.current_task(), sleeper);
  }

  #[test]
  fn delayed_task_wakes_at_its_tick() {
    let mut k = Kernel::new(config().initial_tick_count(1000), crate::port::Simulated::new());
    let sleeper = spawn(&mut k, "sleeper", 2);
    let other = spawn(&mut k, "other", 1);
    start(&mut k);

    assert_eq!(k.current_task(), Some(sleeper));
    k.delay(500);
    assert_eq!(k.current_task(), Some(other));
    assert_eq!(k.task_state(sleeper), Ok(TaskState::Blocked));

    ticks(&mut k, 499);
    assert_eq!(k.tick_count(), 1499);
    assert_eq!(k.current_task(), Some(other));

    ticks(&mut k, 1);
    assert_eq!(k.tick_count(), 1500);
    assert_eq!(k.current_task(), Some(sleeper));
  }

  #[test]
  fn delays_survive_the_tick_counter_wrapping() {
    let mut k = Kernel::new(config().initial_tick_count(TickType::MAX - 5), crate::port::Simulated::new());
    let sleeper = spawn(&mut k, "sleeper", 2);
    spawn(&mut k, "other", 1);
    start(&mut k);

    k.delay(10);
    ticks(&mut k, 9);
    assert_ne!(k.current_task(), Some(sleeper));
    assert_eq!(k.overflow_count, 1);

    ticks(&mut k, 1);
    assert_eq!(k.tick_count(), 4);
    assert_eq!(k.current_task(), Some(sleeper));
  }

  #[test]
  fn critical_section_defers_ticks_and_switches() {
    let mut k = kernel();
    let low = spawn(&mut k, "low", 1);
    let high = spawn(&mut k, "high", 2);
    start(&mut k);

    k.delay(1);
    assert_eq!(k.current_task(), Some(low));

    k.enter_critical();
    ticks(&mut k, 3);
    assert_eq!(k.tick_count(), 0);
    assert_eq!(k.current_task(), Some(low));

    k.exit_critical();
    assert_eq!(k.tick_count(), 3);
    assert_eq!(k.current_task(), Some(high));
  }

  #[test]
  fn suspended_scheduler_replays_ticks_on_resume() {
    let mut k = kernel();
    let low = spawn(&mut k, "low", 1);
    let high = spawn(&mut k, "high", 2);
    start(&mut k);

    k.delay(2);
    k.suspend_all();
    assert_eq!(k.scheduler_state(), SchedulerState::Suspended);
    ticks(&mut k, 5);
    assert_eq!(k.tick_count(), 0);
    assert_eq!(k.current_task(), Some(low));

    assert!(k.resume_all());
    assert_eq!(k.tick_count(), 5);
    assert_eq!(k.current_task(), Some(high));
  }

  #[test]
  fn nested_suspension_needs_matching_resumes() {
    let mut k = kernel();
    spawn(&mut k, "a", 1);
    start(&mut k);

    k.suspend_all();
    k.suspend_all();
    assert!(!k.resume_all());
    assert_eq!(k.scheduler_state(), SchedulerState::Suspended);
    k.resume_all();
    assert_eq!(k.scheduler_state(), SchedulerState::Running);
  }

  #[test]
  #[should_panic(expected = "without being suspended")]
  fn unbalanced_resume_is_fatal() {
    let mut k = kernel();
    start(&mut k);
    k.resume_all();
  }

  #[test]
  fn idle_sleeps_until_the_next_task_is_due() {
    let config = config().use_tickless_idle(true).expected_idle_time_before_sleep(5);
    let mut k = Kernel::new(config, crate::port::Simulated::new());
    let worker = spawn(&mut k, "worker", 1);
    start(&mut k);

    k.delay(40);
    assert_eq!(k.current_task(), k.idle_task());
    assert_eq!(k.expected_idle_time(), 40);

    k.idle_step();
    assert_eq!(k.tick_count(), 40);
    assert_eq!(k.current_task(), Some(worker));
  }

  #[test]
  fn idle_does_not_sleep_below_threshold() {
    let config = config().use_tickless_idle(true).expected_idle_time_before_sleep(5);
    let mut k = Kernel::new(config, crate::port::Simulated::new());
    spawn(&mut k, "worker", 1);
    start(&mut k);

    k.delay(3);
    k.idle_step();
    assert_eq!(k.tick_count(), 0);
  }
}
