use core::ops::{Deref, DerefMut};

use alloc2::{boxed::Box, vec::Vec};

use crate::config::{StackWord, TickType, MAX_TASK_NAME_LEN, STACK_FILL_WORD, STACK_GUARD_WORDS};
use crate::port::{TaskContext, TaskEntry};
use crate::task::{SystemState, TaskHandle, TaskName, TaskPriority, TaskState, TaskStatus};
use crate::{trace, RtosError};

use super::event_group::{EventBits, EventWait};
use super::list::ItemId;
use super::mutex::Boost;
use super::notify::NotifyState;
use super::{Kernel, TaskId};

/// Stack memory of a task, lowest address first.
pub(super) enum Stack {
  Heap(Box<[StackWord]>),
  Static(&'static mut [StackWord]),
}

impl Deref for Stack {
  type Target = [StackWord];

  fn deref(&self) -> &Self::Target {
    match self {
      Self::Heap(stack) => stack,
      Self::Static(stack) => stack,
    }
  }
}

impl DerefMut for Stack {
  fn deref_mut(&mut self) -> &mut Self::Target {
    match self {
      Self::Heap(stack) => stack,
      Self::Static(stack) => stack,
    }
  }
}

/// Task control block.
pub(super) struct Tcb {
  pub(super) name: TaskName<MAX_TASK_NAME_LEN>,
  pub(super) number: u32,
  pub(super) priority: u8,
  pub(super) base_priority: u8,
  /// Priorities inherited through held mutexes.
  pub(super) boosts: Vec<Boost>,
  /// Links the task into a ready, delayed or suspended list.
  pub(super) state_item: ItemId,
  /// Links the task into the wait list of an object.
  pub(super) event_item: ItemId,
  pub(super) stack: Stack,
  pub(super) context: TaskContext,
  pub(super) run_ticks: u32,
  pub(super) notify_value: u32,
  pub(super) notify_state: NotifyState,
  pub(super) event_wait: Option<EventWait>,
  pub(super) event_result: Option<EventBits>,
  pub(super) delay_aborted: bool,
  pub(super) deleted: bool,
}

impl Kernel {
  /// Create a task with a heap allocated stack of `stack_depth` words.
  ///
  /// The task is ready immediately and preempts the caller if it has a
  /// higher priority.
  pub fn create_task(
    &mut self,
    name: &str,
    entry: TaskEntry,
    param: usize,
    stack_depth: usize,
    priority: u8,
  ) -> Result<TaskId, RtosError> {
    if priority >= self.config.max_priorities {
      return Err(RtosError::InvalidPriority)
    }
    if stack_depth == 0 || self.tasks.is_full() {
      return Err(RtosError::ResourceExhausted)
    }

    let mut stack = Vec::new();
    stack.try_reserve_exact(stack_depth).map_err(|_| RtosError::ResourceExhausted)?;
    stack.resize(stack_depth, STACK_FILL_WORD);

    self.add_task(name, Stack::Heap(stack.into_boxed_slice()), entry, param, priority)
  }

  /// Create a task running on caller provided stack memory.
  pub fn create_task_static(
    &mut self,
    name: &str,
    entry: TaskEntry,
    param: usize,
    stack: &'static mut [StackWord],
    priority: u8,
  ) -> Result<TaskId, RtosError> {
    if priority >= self.config.max_priorities {
      return Err(RtosError::InvalidPriority)
    }
    if stack.is_empty() || self.tasks.is_full() {
      return Err(RtosError::ResourceExhausted)
    }

    stack.fill(STACK_FILL_WORD);
    self.add_task(name, Stack::Static(stack), entry, param, priority)
  }

  fn add_task(
    &mut self,
    name: &str,
    stack: Stack,
    entry: TaskEntry,
    param: usize,
    priority: u8,
  ) -> Result<TaskId, RtosError> {
    let number = self.next_task_number;
    let task = self.tasks.insert_with(|id| Tcb {
      name: TaskName::new(name),
      number,
      priority,
      base_priority: priority,
      boosts: Vec::new(),
      state_item: self.lists.new_item(id),
      event_item: self.lists.new_item(id),
      stack,
      context: TaskContext::default(),
      run_ticks: 0,
      notify_value: 0,
      notify_state: NotifyState::NotWaiting,
      event_wait: None,
      event_result: None,
      delay_aborted: false,
      deleted: false,
    })?;

    let context = match self.tasks.get_mut(task) {
      Ok(tcb) => self.port.init_task_stack(task, &mut tcb.stack, entry, param),
      Err(err) => Err(err),
    };
    match context {
      Ok(context) => self.tcb_mut(task).context = context,
      Err(err) => {
        self.free_task(task);
        return Err(err)
      },
    }

    self.next_task_number = self.next_task_number.wrapping_add(1);
    self.add_to_ready(task);
    trace::task_create(task, self.tcb(task).name.as_str(), priority);

    self.preempt(self.preempts(priority));
    Ok(task)
  }

  /// Delete `task`, or the running task if `None`.
  ///
  /// A task deleting itself keeps its memory until the idle task reclaims
  /// it; any other task is freed right away.
  pub fn delete_task(&mut self, task: Option<TaskId>) -> Result<(), RtosError> {
    let task = task.or(self.current).ok_or(RtosError::InvalidHandle)?;
    let tcb = self.tasks.get(task).map_err(|_| RtosError::OwnershipViolation)?;
    if tcb.deleted {
      return Err(RtosError::OwnershipViolation)
    }

    let (state_item, event_item) = (tcb.state_item, tcb.event_item);
    if self.lists.is_listed(state_item) {
      self.lists.remove(state_item);
    }
    if self.lists.is_listed(event_item) {
      self.lists.remove(event_item);
    }
    trace::task_delete(task);

    if self.running && Some(task) == self.current {
      self.tcb_mut(task).deleted = true;
      self.lists.insert_end(self.terminating, state_item);
      self.yield_within_api();
    } else {
      self.free_task(task);
      self.reset_next_unblock();
    }
    Ok(())
  }

  pub(super) fn free_task(&mut self, task: TaskId) {
    if let Ok(tcb) = self.tasks.remove(task) {
      self.lists.release_item(tcb.state_item);
      self.lists.release_item(tcb.event_item);
      self.port.task_deleted(task);
    }
  }

  /// Block the running task for `ticks`, or just yield for 0.
  ///
  /// A task woken by the tick joins the back of its ready list, so on that
  /// tick it runs after tasks of the same priority that were already ready.
  pub fn delay(&mut self, ticks: TickType) {
    if ticks > 0 && self.running {
      self.add_current_to_delayed(ticks, false);
    }
    self.yield_within_api();
  }

  /// Block the running task until `period` ticks after `previous_wake`,
  /// which is advanced by `period`.
  ///
  /// Returns `false` if that time already passed and the task did not block.
  pub fn delay_until(&mut self, previous_wake: &mut TickType, period: TickType) -> bool {
    let now = self.tick;
    let wake_at = previous_wake.wrapping_add(period);

    let should_delay = if now < *previous_wake {
      // The tick count wrapped since the previous wake.
      wake_at < *previous_wake && wake_at > now
    } else {
      wake_at < *previous_wake || wake_at > now
    };
    *previous_wake = wake_at;

    if should_delay && self.running {
      self.add_current_to_delayed(wake_at.wrapping_sub(now), false);
    }
    self.yield_within_api();
    should_delay
  }

  /// Make a blocked task ready before its timeout. The blocking call it was
  /// in fails with [`RtosError::Timeout`].
  ///
  /// Returns `false` if the task was not blocked.
  pub fn abort_delay(&mut self, task: TaskId) -> Result<bool, RtosError> {
    if self.task_state(task)? != TaskState::Blocked {
      return Ok(false)
    }

    let event_item = self.tcb(task).event_item;
    if self.lists.is_listed(event_item) {
      self.tcb_mut(task).delay_aborted = true;
    }
    self.unblock(task);
    self.reset_next_unblock();

    let priority = self.tcb(task).priority;
    self.preempt(self.preempts(priority));
    Ok(true)
  }

  /// Suspend `task`, or the running task if `None`, until it is resumed.
  pub fn suspend(&mut self, task: Option<TaskId>) -> Result<(), RtosError> {
    let task = task.or(self.current).ok_or(RtosError::InvalidHandle)?;
    let tcb = self.tasks.get_mut(task)?;
    if tcb.deleted {
      return Err(RtosError::InvalidHandle)
    }
    if tcb.notify_state == NotifyState::Waiting {
      tcb.notify_state = NotifyState::NotWaiting;
    }

    let (state_item, event_item) = (tcb.state_item, tcb.event_item);
    if self.lists.is_listed(state_item) {
      self.lists.remove(state_item);
    }
    if self.lists.is_listed(event_item) {
      self.lists.remove(event_item);
    }
    self.lists.insert_end(self.suspended, state_item);
    trace::task_suspend(task);

    if self.running {
      self.reset_next_unblock();
      if Some(task) == self.current {
        self.yield_within_api();
      }
    }
    Ok(())
  }

  /// Suspended for real, as opposed to blocked without a timeout.
  fn is_suspended(&self, task: TaskId) -> bool {
    let tcb = self.tcb(task);
    self.lists.contains(self.suspended, tcb.state_item)
      && !self.lists.is_listed(tcb.event_item)
      && tcb.notify_state != NotifyState::Waiting
  }

  /// Resume a suspended task. Resuming a task that is not suspended does
  /// nothing.
  pub fn resume(&mut self, task: TaskId) -> Result<(), RtosError> {
    self.tasks.get(task)?;
    if Some(task) == self.current || !self.is_suspended(task) {
      return Ok(())
    }

    let item = self.tcb(task).state_item;
    self.lists.remove(item);
    self.add_to_ready(task);
    trace::task_resume(task);

    let priority = self.tcb(task).priority;
    self.preempt(self.running && priority >= self.current_priority());
    Ok(())
  }

  /// Resume a suspended task from an interrupt.
  ///
  /// Returns whether the interrupt should switch to it on exit.
  pub fn resume_from_isr(&mut self, task: TaskId) -> Result<bool, RtosError> {
    self.tasks.get(task)?;
    if !self.is_suspended(task) {
      return Ok(false)
    }

    trace::task_resume(task);
    Ok(self.ready_from_isr(task))
  }

  /// Effective priority, including inherited priority.
  pub fn priority(&self, task: TaskId) -> Result<u8, RtosError> {
    Ok(self.tasks.get(task)?.priority)
  }

  /// Priority the task was created or last set with.
  pub fn base_priority(&self, task: TaskId) -> Result<u8, RtosError> {
    Ok(self.tasks.get(task)?.base_priority)
  }

  /// Change the base priority of `task`, or of the running task if `None`.
  ///
  /// While the task holds a mutex with higher priority waiters it keeps
  /// running at their priority.
  pub fn set_priority(&mut self, task: Option<TaskId>, priority: u8) -> Result<(), RtosError> {
    if priority >= self.config.max_priorities {
      return Err(RtosError::InvalidPriority)
    }

    let task = task.or(self.current).ok_or(RtosError::InvalidHandle)?;
    self.tasks.get_mut(task)?.base_priority = priority;
    let switch = self.refresh_priority(task);
    self.preempt(switch);
    Ok(())
  }

  /// Recompute the effective priority from the base and inherited ones.
  ///
  /// Returns whether the running task should be switched out.
  pub(super) fn refresh_priority(&mut self, task: TaskId) -> bool {
    let tcb = self.tcb(task);
    let effective = tcb.boosts.iter().map(|boost| boost.priority).fold(tcb.base_priority, u8::max);
    if effective == tcb.priority {
      return false
    }

    self.apply_priority(task, effective)
  }

  fn apply_priority(&mut self, task: TaskId, priority: u8) -> bool {
    let key = self.event_key(priority);
    let tcb = self.tcb_mut(task);
    let old = tcb.priority;
    tcb.priority = priority;
    let (state_item, event_item, ordered) = (tcb.state_item, tcb.event_item, tcb.event_wait.is_none());
    trace::task_priority_set(task, old, priority);

    if ordered {
      if let Some(list) = self.lists.container(event_item).filter(|&list| list != self.pending_ready) {
        self.lists.remove(event_item);
        self.lists.set_value(event_item, key);
        self.lists.insert(list, event_item);
      }
    }

    let was_ready = self.lists.contains(self.ready[usize::from(old)], state_item);
    if was_ready {
      self.lists.remove(state_item);
      self.add_to_ready(task);
    }

    if !self.running {
      false
    } else if Some(task) == self.current {
      priority < old
    } else {
      was_ready && priority > self.current_priority()
    }
  }

  pub fn task_state(&self, task: TaskId) -> Result<TaskState, RtosError> {
    let tcb = self.tasks.get(task)?;
    if tcb.deleted {
      return Ok(TaskState::Deleted)
    }
    if self.running && Some(task) == self.current {
      return Ok(TaskState::Running)
    }
    if self.lists.contains(self.pending_ready, tcb.event_item) {
      return Ok(TaskState::Ready)
    }

    Ok(match self.lists.container(tcb.state_item) {
      Some(list) if list == self.delayed || list == self.overflow_delayed => TaskState::Blocked,
      Some(list) if list == self.suspended => {
        if self.lists.is_listed(tcb.event_item) || tcb.notify_state == NotifyState::Waiting {
          TaskState::Blocked
        } else {
          TaskState::Suspended
        }
      },
      Some(list) if list == self.terminating => TaskState::Deleted,
      Some(_) => TaskState::Ready,
      None => TaskState::Invalid,
    })
  }

  pub fn task_name(&self, task: TaskId) -> Result<&str, RtosError> {
    Ok(self.tasks.get(task)?.name.as_str())
  }

  /// Find a task by its (possibly truncated) name.
  pub fn task_by_name(&self, name: &str) -> Option<TaskId> {
    let name = TaskName::<MAX_TASK_NAME_LEN>::new(name);
    self.tasks
      .iter()
      .find(|(_, tcb)| !tcb.deleted && tcb.name.as_str() == name.as_str())
      .map(|(task, _)| task)
  }

  /// Number of tasks, including deleted ones not reclaimed yet.
  #[inline]
  pub fn task_count(&self) -> usize {
    self.tasks.len()
  }

  pub fn task_number(&self, task: TaskId) -> Result<u32, RtosError> {
    Ok(self.tasks.get(task)?.number)
  }

  /// Ticks during which `task` was the running task.
  pub fn run_ticks(&self, task: TaskId) -> Result<u32, RtosError> {
    Ok(self.tasks.get(task)?.run_ticks)
  }

  /// Saved context of a task that is not running.
  pub fn task_context(&self, task: TaskId) -> Result<TaskContext, RtosError> {
    Ok(self.tasks.get(task)?.context)
  }

  /// Smallest number of stack words that were never used.
  pub fn stack_high_water_mark(&self, task: TaskId) -> Result<usize, RtosError> {
    let tcb = self.tasks.get(task)?;
    Ok(tcb.stack.iter().take_while(|&&word| word == STACK_FILL_WORD).count())
  }

  pub fn task_status(&self, task: TaskId) -> Result<TaskStatus, RtosError> {
    let tcb = self.tasks.get(task)?;
    Ok(TaskStatus {
      handle: TaskHandle::from_id(task),
      name: tcb.name,
      number: tcb.number,
      state: self.task_state(task)?,
      current_priority: TaskPriority::from_kernel(tcb.priority),
      base_priority: TaskPriority::from_kernel(tcb.base_priority),
      run_time_counter: tcb.run_ticks,
      stack_high_water_mark: self.stack_high_water_mark(task)?,
    })
  }

  /// Status of every task.
  pub fn system_state(&self) -> SystemState {
    let tasks: Vec<TaskStatus> = self.tasks.ids().into_iter().filter_map(|task| self.task_status(task).ok()).collect();
    let total_run_time = tasks.iter().fold(0u32, |total, task| total.wrapping_add(task.run_time_counter));
    SystemState { tasks, total_run_time }
  }

  /// Report a task whose guard words at the stack bottom were overwritten.
  pub(super) fn check_stack(&self, task: TaskId) {
    let Ok(tcb) = self.tasks.get(task) else {
      return
    };

    let guard = tcb.stack.len().min(STACK_GUARD_WORDS);
    if tcb.stack[..guard].iter().any(|&word| word != STACK_FILL_WORD) {
      trace::stack_overflow(task, tcb.name.as_str());
      crate::task::call_stack_overflow_hook(&TaskHandle::from_id(task), tcb.name.as_str());
    }
  }
}

#[cfg(test)]
mod tests {
  use super::super::testing::*;
  use super::*;
  use crate::config::MINIMAL_STACK_SIZE;

  #[test]
  fn priority_out_of_range_is_rejected() {
    let mut k = kernel();
    assert_eq!(k.create_task("bad", noop, 0, MINIMAL_STACK_SIZE, 8), Err(RtosError::InvalidPriority));
    let task = spawn(&mut k, "ok", 7);
    assert_eq!(k.set_priority(Some(task), 8), Err(RtosError::InvalidPriority));
  }

  #[test]
  fn task_table_runs_out() {
    let mut k = crate::kernel::Kernel::new(config().max_tasks(2), crate::port::Simulated::new());
    spawn(&mut k, "a", 1);
    spawn(&mut k, "b", 1);
    assert_eq!(k.create_task("c", noop, 0, MINIMAL_STACK_SIZE, 1), Err(RtosError::ResourceExhausted));
  }

  #[test]
  fn creating_a_higher_priority_task_preempts() {
    let mut k = kernel();
    let low = spawn(&mut k, "low", 1);
    start(&mut k);
    assert_eq!(k.current_task(), Some(low));

    let high = spawn(&mut k, "high", 4);
    assert_eq!(k.current_task(), Some(high));
    assert_eq!(k.task_state(low), Ok(TaskState::Ready));
  }

  #[test]
  fn names_are_truncated_and_searchable() {
    let mut k = kernel();
    let task = spawn(&mut k, "a_rather_long_task_name", 1);
    assert_eq!(k.task_name(task), Ok("a_rather_long_t"));
    assert_eq!(k.task_by_name("a_rather_long_task_name"), Some(task));
    assert_eq!(k.task_by_name("missing"), None);
  }

  #[test]
  fn deleting_another_task_frees_it() {
    let mut k = kernel();
    let a = spawn(&mut k, "a", 2);
    let b = spawn(&mut k, "b", 1);
    start(&mut k);

    let count = k.task_count();
    k.delete_task(Some(b)).unwrap();
    assert_eq!(k.task_count(), count - 1);
    assert_eq!(k.task_state(b), Err(RtosError::InvalidHandle));
    assert_eq!(k.delete_task(Some(b)), Err(RtosError::OwnershipViolation));
    assert_eq!(k.current_task(), Some(a));
  }

  #[test]
  fn self_deletion_is_reclaimed_by_idle() {
    let mut k = kernel();
    let a = spawn(&mut k, "a", 1);
    start(&mut k);
    assert_eq!(k.current_task(), Some(a));

    let count = k.task_count();
    k.delete_task(None).unwrap();
    assert_eq!(k.current_task(), k.idle_task());
    assert_eq!(k.task_state(a), Ok(TaskState::Deleted));
    assert_eq!(k.task_count(), count);

    k.idle_step();
    assert_eq!(k.task_count(), count - 1);
    assert_eq!(k.task_state(a), Err(RtosError::InvalidHandle));
  }

  #[test]
  fn deleting_a_blocked_task_leaves_no_waiter_behind() {
    let mut k = kernel();
    let waiter = spawn(&mut k, "waiter", 2);
    let other = spawn(&mut k, "other", 1);
    start(&mut k);

    let queue = k.create_queue(1, 4).unwrap();
    let mut out = [0; 4];
    let mut wait = crate::kernel::Wait::forever();
    assert!(k.receive(queue, &mut out, &mut wait).is_pending());
    assert_eq!(k.current_task(), Some(other));

    k.delete_task(Some(waiter)).unwrap();
    let receivers = k.queues.get(queue).unwrap().receivers;
    assert!(k.lists.is_empty(receivers));

    let mut send = crate::kernel::Wait::poll();
    assert_eq!(k.send(queue, &[1, 2, 3, 4], crate::kernel::SendPosition::Back, &mut send), core::task::Poll::Ready(Ok(())));
    assert_eq!(k.current_task(), Some(other));
  }

  #[test]
  fn suspend_and_resume() {
    let mut k = kernel();
    let a = spawn(&mut k, "a", 2);
    let b = spawn(&mut k, "b", 1);
    start(&mut k);

    k.suspend(None).unwrap();
    assert_eq!(k.current_task(), Some(b));
    assert_eq!(k.task_state(a), Ok(TaskState::Suspended));

    ticks(&mut k, 100);
    assert_eq!(k.current_task(), Some(b));

    k.resume(a).unwrap();
    assert_eq!(k.current_task(), Some(a));
    assert_eq!(k.task_state(b), Ok(TaskState::Ready));
  }

  #[test]
  fn resume_from_isr_reports_the_needed_switch() {
    let mut k = kernel();
    let a = spawn(&mut k, "a", 2);
    let b = spawn(&mut k, "b", 1);
    start(&mut k);

    k.suspend(Some(a)).unwrap();
    assert_eq!(k.current_task(), Some(b));
    assert_eq!(k.resume_from_isr(a), Ok(true));
    assert_eq!(k.current_task(), Some(b));

    k.yield_from_isr();
    assert_eq!(k.current_task(), Some(a));
    assert_eq!(k.resume_from_isr(a), Ok(false));
  }

  #[test]
  fn resume_from_isr_while_scheduler_suspended_goes_through_pending_ready() {
    let mut k = kernel();
    let a = spawn(&mut k, "a", 2);
    let b = spawn(&mut k, "b", 1);
    start(&mut k);

    k.suspend(Some(a)).unwrap();
    k.suspend_all();
    k.resume_from_isr(a).unwrap();
    assert_eq!(k.task_state(a), Ok(TaskState::Ready));
    assert_eq!(k.current_task(), Some(b));

    assert!(k.resume_all());
    assert_eq!(k.current_task(), Some(a));
  }

  #[test]
  fn lowering_own_priority_yields() {
    let mut k = kernel();
    let a = spawn(&mut k, "a", 3);
    let b = spawn(&mut k, "b", 2);
    start(&mut k);

    k.set_priority(None, 1).unwrap();
    assert_eq!(k.current_task(), Some(b));
    assert_eq!(k.priority(a), Ok(1));

    k.set_priority(Some(a), 4).unwrap();
    assert_eq!(k.current_task(), Some(a));
  }

  #[test]
  fn abort_delay_wakes_early() {
    let mut k = kernel();
    let a = spawn(&mut k, "a", 2);
    let b = spawn(&mut k, "b", 1);
    start(&mut k);

    k.delay(1000);
    assert_eq!(k.current_task(), Some(b));
    assert_eq!(k.abort_delay(a), Ok(true));
    assert_eq!(k.current_task(), Some(a));
    assert_eq!(k.abort_delay(b), Ok(false));
  }

  #[test]
  fn aborted_wait_times_out() {
    let mut k = kernel();
    let a = spawn(&mut k, "a", 2);
    spawn(&mut k, "b", 1);
    start(&mut k);

    let queue = k.create_queue(1, 1).unwrap();
    let mut out = [0];
    let mut wait = crate::kernel::Wait::forever();
    assert!(k.receive(queue, &mut out, &mut wait).is_pending());

    k.abort_delay(a).unwrap();
    assert_eq!(k.current_task(), Some(a));
    assert_eq!(k.receive(queue, &mut out, &mut wait), core::task::Poll::Ready(Err(RtosError::Timeout)));
  }

  #[test]
  fn delay_until_keeps_a_fixed_period() {
    let mut k = kernel();
    let a = spawn(&mut k, "a", 2);
    spawn(&mut k, "b", 1);
    start(&mut k);

    let mut last_wake = k.tick_count();
    ticks(&mut k, 3);
    assert!(k.delay_until(&mut last_wake, 10));
    assert_eq!(last_wake, 10);

    ticks(&mut k, 7);
    assert_eq!(k.current_task(), Some(a));
    assert_eq!(k.tick_count(), 10);

    ticks(&mut k, 15);
    assert!(!k.delay_until(&mut last_wake, 10));
    assert_eq!(last_wake, 20);
  }

  #[test]
  fn high_water_mark_counts_untouched_words() {
    let mut k = kernel();
    let a = spawn(&mut k, "a", 1);
    let mark = k.stack_high_water_mark(a).unwrap();
    assert!(mark > 0 && mark < MINIMAL_STACK_SIZE);

    k.tasks.get_mut(a).unwrap().stack[mark - 1] = 0;
    assert_eq!(k.stack_high_water_mark(a), Ok(mark - 1));
  }

  #[test]
  #[should_panic(expected = "overflowed its stack")]
  fn clobbered_guard_words_trigger_the_overflow_hook() {
    let mut k = kernel();
    let a = spawn(&mut k, "a", 1);
    start(&mut k);
    assert_eq!(k.current_task(), Some(a));

    k.tasks.get_mut(a).unwrap().stack[0] = 0;
    k.delay(5);
  }

  #[test]
  fn system_state_lists_every_task() {
    let mut k = kernel();
    spawn(&mut k, "a", 1);
    spawn(&mut k, "b", 2);
    start(&mut k);
    ticks(&mut k, 4);

    let state = k.system_state();
    assert_eq!(state.tasks().len(), k.task_count());
    let b = state.tasks().iter().find(|task| task.name() == "b").unwrap();
    assert_eq!(b.state(), TaskState::Running);
    assert_eq!(b.run_time_counter(), 4);
  }
}
