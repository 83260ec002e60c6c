//! Software timers, run by a daemon task.
//!
//! Applications never touch an active timer directly. Starting, stopping
//! and the like are commands posted to the daemon's queue, so they take
//! effect once the daemon runs. The daemon keeps active timers in two
//! lists ordered by expiry time: one for times before the next tick counter
//! wrap and one for times after it.

use core::task::Poll;

use alloc2::{collections::VecDeque, sync::Arc};

use crate::config::{TickType, MAX_DELAY, MAX_TASK_NAME_LEN};
use crate::port::TaskEntry;
use crate::task::TaskName;
use crate::{trace, RtosError};

use super::list::{ItemId, ListArena, ListId};
use super::{Kernel, QueueId, SendPosition, TaskId, TimerId, Wait};

/// Called by the timer daemon when a timer expires.
pub type TimerCallback = Arc<dyn Fn(TimerId) + Send + Sync>;

/// A timer that expired, with the callback the daemon has to run for it.
///
/// The callback runs outside of the kernel, so it may call kernel
/// operations itself.
#[derive(Clone)]
pub struct ExpiredTimer {
  pub timer: TimerId,
  pub callback: TimerCallback,
}

impl ExpiredTimer {
  pub fn run(self) {
    (self.callback)(self.timer)
  }
}

impl core::fmt::Debug for ExpiredTimer {
  fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
    f.debug_struct("ExpiredTimer").field("timer", &self.timer).finish_non_exhaustive()
  }
}

/// Encoded size of a [`TimerCommand`] in the command queue.
const COMMAND_SIZE: usize = 12;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum TimerCommand {
  /// Start or restart, counting the period from `time`.
  Start { timer: TimerId, time: TickType },
  Stop { timer: TimerId },
  ChangePeriod { timer: TimerId, period: TickType },
  Delete { timer: TimerId },
}

impl TimerCommand {
  fn encode(self) -> [u8; COMMAND_SIZE] {
    let (code, timer, value) = match self {
      Self::Start { timer, time } => (0u32, timer, time),
      Self::Stop { timer } => (1, timer, 0),
      Self::ChangePeriod { timer, period } => (2, timer, period),
      Self::Delete { timer } => (3, timer, 0),
    };

    let mut bytes = [0; COMMAND_SIZE];
    bytes[0..4].copy_from_slice(&code.to_le_bytes());
    bytes[4..8].copy_from_slice(&timer.to_bits().to_le_bytes());
    bytes[8..12].copy_from_slice(&value.to_le_bytes());
    bytes
  }

  fn decode(bytes: &[u8; COMMAND_SIZE]) -> Option<Self> {
    let word = |i: usize| u32::from_le_bytes([bytes[i], bytes[i + 1], bytes[i + 2], bytes[i + 3]]);
    let timer = TimerId::from_bits(word(4))?;
    let value = word(8);

    Some(match word(0) {
      0 => Self::Start { timer, time: value },
      1 => Self::Stop { timer },
      2 => Self::ChangePeriod { timer, period: value },
      3 => Self::Delete { timer },
      _ => return None,
    })
  }

  fn name(&self) -> &'static str {
    match self {
      Self::Start { .. } => "start",
      Self::Stop { .. } => "stop",
      Self::ChangePeriod { .. } => "change period",
      Self::Delete { .. } => "delete",
    }
  }
}

pub(super) struct TimerCb {
  name: TaskName<MAX_TASK_NAME_LEN>,
  period: TickType,
  auto_reload: bool,
  id: usize,
  callback: TimerCallback,
  active: bool,
  item: ItemId,
}

/// State of the timer daemon.
pub(super) struct TimerService {
  lists: ListArena<TimerId>,
  current: ListId,
  overflow: ListId,
  /// Timers found expired outside of the current list, with their expiry time.
  due: VecDeque<(TimerId, TickType)>,
  queue: Option<QueueId>,
  daemon: Option<TaskId>,
  last_time: TickType,
}

impl TimerService {
  pub(super) fn new(now: TickType) -> Self {
    let mut lists = ListArena::new();
    let current = lists.new_list();
    let overflow = lists.new_list();
    Self { lists, current, overflow, due: VecDeque::new(), queue: None, daemon: None, last_time: now }
  }

  fn unlink(&mut self, timer: TimerId, item: ItemId) {
    if self.lists.is_listed(item) {
      self.lists.remove(item);
    }
    self.due.retain(|&(due, _)| due != timer);
  }
}

impl Kernel {
  pub(super) fn start_timer_service(&mut self, entry: TaskEntry) -> Result<(), RtosError> {
    self.timer_command_queue()?;
    let daemon = self.create_task(
      "Tmr Svc",
      entry,
      0,
      self.config.timer_task_stack_size,
      self.config.timer_task_priority,
    )?;
    self.timer_service.daemon = Some(daemon);
    Ok(())
  }

  /// The task running timer callbacks.
  #[inline]
  pub fn timer_daemon(&self) -> Option<TaskId> {
    self.timer_service.daemon
  }

  fn timer_command_queue(&mut self) -> Result<QueueId, RtosError> {
    if let Some(queue) = self.timer_service.queue {
      return Ok(queue)
    }

    let queue = self.create_queue(self.config.timer_queue_length, COMMAND_SIZE)?;
    self.timer_service.queue = Some(queue);
    Ok(queue)
  }

  /// Create a dormant timer calling `callback` `period` ticks after it is
  /// started, and every `period` ticks after that if `auto_reload` is set.
  pub fn create_timer(
    &mut self,
    name: &str,
    period: TickType,
    auto_reload: bool,
    id: usize,
    callback: TimerCallback,
  ) -> Result<TimerId, RtosError> {
    if period == 0 {
      return Err(RtosError::InvalidTimerPeriod)
    }
    if self.timers.is_full() {
      return Err(RtosError::ResourceExhausted)
    }
    self.timer_command_queue()?;

    let lists = &mut self.timer_service.lists;
    self.timers.insert_with(|timer| TimerCb {
      name: TaskName::new(name),
      period,
      auto_reload,
      id,
      callback,
      active: false,
      item: lists.new_item(timer),
    })
  }

  fn send_timer_command(&mut self, command: TimerCommand, wait: &mut Wait) -> Poll<Result<(), RtosError>> {
    let queue = self.timer_command_queue()?;
    self.send(queue, &command.encode(), SendPosition::Back, wait)
  }

  fn send_timer_command_from_isr(&mut self, command: TimerCommand) -> Result<bool, RtosError> {
    let queue = self.timer_command_queue()?;
    self.send_from_isr(queue, &command.encode(), SendPosition::Back)
  }

  /// Start `timer`, or restart it if it is already active. Its expiry is
  /// `period` ticks from now.
  ///
  /// Fails with [`RtosError::CapacityExceeded`] if the command queue stays
  /// full for the whole `wait`.
  pub fn start_timer(&mut self, timer: TimerId, wait: &mut Wait) -> Poll<Result<(), RtosError>> {
    self.timers.get(timer)?;
    let time = self.tick;
    self.send_timer_command(TimerCommand::Start { timer, time }, wait)
  }

  /// Restart `timer`; the same as [`start_timer`](Self::start_timer).
  pub fn reset_timer(&mut self, timer: TimerId, wait: &mut Wait) -> Poll<Result<(), RtosError>> {
    self.start_timer(timer, wait)
  }

  pub fn stop_timer(&mut self, timer: TimerId, wait: &mut Wait) -> Poll<Result<(), RtosError>> {
    self.timers.get(timer)?;
    self.send_timer_command(TimerCommand::Stop { timer }, wait)
  }

  /// Change the period of `timer` and start it, expiring `period` ticks
  /// from when the daemon handles the command.
  pub fn change_timer_period(
    &mut self,
    timer: TimerId,
    period: TickType,
    wait: &mut Wait,
  ) -> Poll<Result<(), RtosError>> {
    if period == 0 {
      return Poll::Ready(Err(RtosError::InvalidTimerPeriod))
    }
    self.timers.get(timer)?;
    self.send_timer_command(TimerCommand::ChangePeriod { timer, period }, wait)
  }

  pub fn delete_timer(&mut self, timer: TimerId, wait: &mut Wait) -> Poll<Result<(), RtosError>> {
    self.timers.get(timer)?;
    self.send_timer_command(TimerCommand::Delete { timer }, wait)
  }

  pub fn start_timer_from_isr(&mut self, timer: TimerId) -> Result<bool, RtosError> {
    self.timers.get(timer)?;
    let time = self.tick;
    self.send_timer_command_from_isr(TimerCommand::Start { timer, time })
  }

  pub fn reset_timer_from_isr(&mut self, timer: TimerId) -> Result<bool, RtosError> {
    self.start_timer_from_isr(timer)
  }

  pub fn stop_timer_from_isr(&mut self, timer: TimerId) -> Result<bool, RtosError> {
    self.timers.get(timer)?;
    self.send_timer_command_from_isr(TimerCommand::Stop { timer })
  }

  pub fn change_timer_period_from_isr(&mut self, timer: TimerId, period: TickType) -> Result<bool, RtosError> {
    if period == 0 {
      return Err(RtosError::InvalidTimerPeriod)
    }
    self.timers.get(timer)?;
    self.send_timer_command_from_isr(TimerCommand::ChangePeriod { timer, period })
  }

  /// Whether the daemon has `timer` scheduled.
  pub fn timer_is_active(&self, timer: TimerId) -> Result<bool, RtosError> {
    Ok(self.timers.get(timer)?.active)
  }

  pub fn timer_period(&self, timer: TimerId) -> Result<TickType, RtosError> {
    Ok(self.timers.get(timer)?.period)
  }

  /// Tick at which an active timer expires next.
  pub fn timer_expiry_time(&self, timer: TimerId) -> Result<Option<TickType>, RtosError> {
    let cb = self.timers.get(timer)?;
    Ok(cb.active.then(|| self.timer_service.lists.value(cb.item)))
  }

  pub fn timer_name(&self, timer: TimerId) -> Result<&str, RtosError> {
    Ok(self.timers.get(timer)?.name.as_str())
  }

  /// Application defined word stored with the timer.
  pub fn timer_id_value(&self, timer: TimerId) -> Result<usize, RtosError> {
    Ok(self.timers.get(timer)?.id)
  }

  pub fn set_timer_id_value(&mut self, timer: TimerId, id: usize) -> Result<(), RtosError> {
    self.timers.get_mut(timer)?.id = id;
    Ok(())
  }

  pub fn timer_auto_reload(&self, timer: TimerId) -> Result<bool, RtosError> {
    Ok(self.timers.get(timer)?.auto_reload)
  }

  /// Takes effect at the next expiry.
  pub fn set_timer_auto_reload(&mut self, timer: TimerId, auto_reload: bool) -> Result<(), RtosError> {
    self.timers.get_mut(timer)?.auto_reload = auto_reload;
    Ok(())
  }

  /// One step of the timer daemon.
  ///
  /// Handles queued commands and returns the next expired timer, whose
  /// callback the daemon runs before polling again. With nothing expired the
  /// daemon blocks until the next expiry or the next command.
  pub fn timer_service_poll(&mut self) -> Poll<ExpiredTimer> {
    let now = self.sample_timer_time();
    let switch = self.drain_timer_commands(now);

    if let Some(expired) = self.next_expired_timer(now) {
      self.preempt(switch);
      return Poll::Ready(expired)
    }

    let is_daemon = self.current.is_some() && self.current == self.timer_service.daemon;
    let can_block = self.running && self.critical_nesting == 0 && self.scheduler_suspended == 0;
    let receivers = self.timer_service.queue.and_then(|queue| self.queues.get(queue).ok()).map(|cb| cb.receivers);

    if let (true, true, Some(receivers)) = (is_daemon, can_block, receivers) {
      let ticks = self.timer_block_time(now);
      self.place_on_event_list(receivers, ticks);
      self.yield_within_api();
    } else {
      self.preempt(switch);
    }
    Poll::Pending
  }

  /// Current time as seen by the daemon, switching the expiry lists if the
  /// tick counter wrapped since the last sample.
  fn sample_timer_time(&mut self) -> TickType {
    let now = self.tick;
    if now < self.timer_service.last_time {
      let service = &mut self.timer_service;
      // Everything left in the current list was due before the wrap.
      while let Some(item) = service.lists.head(service.current) {
        let expiry = service.lists.value(item);
        let timer = service.lists.owner(item);
        service.lists.remove(item);
        service.due.push_back((timer, expiry));
      }
      core::mem::swap(&mut service.current, &mut service.overflow);
    }
    self.timer_service.last_time = now;
    now
  }

  fn drain_timer_commands(&mut self, now: TickType) -> bool {
    let Some(queue) = self.timer_service.queue else {
      return false
    };

    let mut switch = false;
    let mut bytes = [0; COMMAND_SIZE];
    while self.queues.get(queue).map_or(false, |cb| cb.count > 0) {
      match self.receive_from_isr(queue, &mut bytes) {
        Ok(woken) => switch |= woken,
        Err(_) => break,
      }
      if let Some(command) = TimerCommand::decode(&bytes) {
        self.process_timer_command(command, now);
      }
    }
    switch
  }

  fn process_timer_command(&mut self, command: TimerCommand, now: TickType) {
    let timer = match command {
      TimerCommand::Start { timer, .. }
      | TimerCommand::Stop { timer }
      | TimerCommand::ChangePeriod { timer, .. }
      | TimerCommand::Delete { timer } => timer,
    };
    let Ok(cb) = self.timers.get_mut(timer) else {
      return
    };
    trace::timer_command(timer, command.name());

    let item = cb.item;
    self.timer_service.unlink(timer, item);

    match command {
      TimerCommand::Start { time, .. } => {
        cb.active = true;
        let expiry = time.wrapping_add(cb.period);
        if self.insert_timer(timer, expiry, now, time) {
          self.timer_service.due.push_back((timer, expiry));
        }
      },
      TimerCommand::Stop { .. } => cb.active = false,
      TimerCommand::ChangePeriod { period, .. } => {
        cb.period = period;
        cb.active = true;
        self.insert_timer(timer, now.wrapping_add(period), now, now);
      },
      TimerCommand::Delete { .. } => {
        if self.timers.remove(timer).is_ok() {
          self.timer_service.lists.release_item(item);
        }
      },
    }
  }

  /// Put `timer` into the list matching `expiry`.
  ///
  /// Returns `true` instead if it already expired, measured from the time
  /// the command was issued.
  fn insert_timer(&mut self, timer: TimerId, expiry: TickType, now: TickType, issued: TickType) -> bool {
    let Ok(cb) = self.timers.get(timer) else {
      return false
    };
    let period = cb.period;
    let item = cb.item;
    let service = &mut self.timer_service;
    service.lists.set_value(item, expiry);

    if expiry <= now {
      if now.wrapping_sub(issued) >= period {
        return true
      }
      // The expiry wrapped past the tick counter.
      service.lists.insert(service.overflow, item);
    } else {
      if now < issued && expiry >= issued {
        // The tick counter wrapped after the command was issued.
        return true
      }
      service.lists.insert(service.current, item);
    }
    false
  }

  fn next_expired_timer(&mut self, now: TickType) -> Option<ExpiredTimer> {
    while let Some((timer, expiry)) = self.timer_service.due.pop_front() {
      if let Some(expired) = self.expire(timer, expiry, now) {
        return Some(expired)
      }
    }

    let service = &mut self.timer_service;
    let item = service.lists.head(service.current)?;
    let expiry = service.lists.value(item);
    if expiry > now {
      return None
    }

    let timer = service.lists.owner(item);
    service.lists.remove(item);
    self.expire(timer, expiry, now)
  }

  /// Reschedule a timer that expired at `expiry`.
  ///
  /// A periodic timer that is a whole period or more late is not fired for
  /// every period it missed: it catches up and expires next at `now + period`.
  fn expire(&mut self, timer: TimerId, expiry: TickType, now: TickType) -> Option<ExpiredTimer> {
    let cb = self.timers.get_mut(timer).ok()?;
    trace::timer_expired(timer, now);
    let expired = ExpiredTimer { timer, callback: cb.callback.clone() };

    if !cb.auto_reload {
      cb.active = false;
      return Some(expired)
    }

    let late = now.wrapping_sub(expiry);
    let next = if late >= cb.period { now.wrapping_add(cb.period) } else { expiry.wrapping_add(cb.period) };
    let item = cb.item;

    let service = &mut self.timer_service;
    service.lists.set_value(item, next);
    let list = if next > now { service.current } else { service.overflow };
    service.lists.insert(list, item);
    Some(expired)
  }

  /// Ticks the daemon may sleep before the next timer expires.
  fn timer_block_time(&self, now: TickType) -> TickType {
    let service = &self.timer_service;
    match service.lists.head_value(service.current) {
      Some(expiry) => expiry.wrapping_sub(now).max(1),
      // Nothing is due before the tick counter wraps.
      None if !service.lists.is_empty(service.overflow) => (0 as TickType).wrapping_sub(now).max(1),
      None => MAX_DELAY,
    }
  }
}

#[cfg(test)]
mod tests {
  use core::sync::atomic::{AtomicUsize, Ordering};

  use alloc2::vec::Vec;

  use super::super::testing::*;
  use super::*;
  use crate::config::TickType;

  /// Run the daemon while it is the running task, collecting what fired.
  fn run_daemon(k: &mut Kernel) -> Vec<(TimerId, TickType)> {
    let mut fired = Vec::new();
    while k.current_task() == k.timer_daemon() {
      if let Poll::Ready(expired) = k.timer_service_poll() {
        fired.push((expired.timer, k.tick_count()));
        expired.run();
      }
    }
    fired
  }

  fn timer(k: &mut Kernel, period: TickType, auto_reload: bool) -> TimerId {
    k.create_timer("timer", period, auto_reload, 0, Arc::new(|_| {})).unwrap()
  }

  /// Advance `n` ticks, running the daemon whenever it wakes.
  fn run_ticks(k: &mut Kernel, n: TickType) -> Vec<(TimerId, TickType)> {
    let mut fired = Vec::new();
    for _ in 0..n {
      k.tick();
      fired.extend(run_daemon(k));
    }
    fired
  }

  #[test]
  fn zero_period_is_rejected() {
    let mut k = kernel();
    assert!(matches!(k.create_timer("t", 0, false, 0, Arc::new(|_| {})), Err(RtosError::InvalidTimerPeriod)));
    let t = timer(&mut k, 5, false);
    assert_eq!(k.change_timer_period(t, 0, &mut Wait::poll()), Poll::Ready(Err(RtosError::InvalidTimerPeriod)));
  }

  #[test]
  fn one_shot_fires_once() {
    let mut k = kernel();
    spawn(&mut k, "app", 1);
    start(&mut k);

    let count = Arc::new(AtomicUsize::new(0));
    let counter = count.clone();
    let t = k
      .create_timer("once", 10, false, 7, Arc::new(move |_| {
        counter.fetch_add(1, Ordering::SeqCst);
      }))
      .unwrap();
    assert_eq!(k.timer_name(t), Ok("once"));
    assert_eq!(k.timer_id_value(t), Ok(7));

    assert_eq!(k.start_timer(t, &mut Wait::poll()), Poll::Ready(Ok(())));
    assert!(run_daemon(&mut k).is_empty());
    assert_eq!(k.timer_is_active(t), Ok(true));
    assert_eq!(k.timer_expiry_time(t), Ok(Some(10)));

    assert_eq!(run_ticks(&mut k, 30), [(t, 10)]);
    assert_eq!(count.load(Ordering::SeqCst), 1);
    assert_eq!(k.timer_is_active(t), Ok(false));
    assert_eq!(k.timer_expiry_time(t), Ok(None));
  }

  #[test]
  fn auto_reload_fires_every_period() {
    let mut k = kernel();
    spawn(&mut k, "app", 1);
    start(&mut k);

    let t = timer(&mut k, 10, true);
    assert!(k.start_timer(t, &mut Wait::poll()).is_ready());
    run_daemon(&mut k);

    assert_eq!(run_ticks(&mut k, 35), [(t, 10), (t, 20), (t, 30)]);
    assert_eq!(k.timer_expiry_time(t), Ok(Some(40)));
  }

  #[test]
  fn restarting_does_not_double_schedule() {
    let mut k = kernel();
    spawn(&mut k, "app", 1);
    start(&mut k);

    let t = timer(&mut k, 10, true);
    assert!(k.start_timer(t, &mut Wait::poll()).is_ready());
    run_daemon(&mut k);
    run_ticks(&mut k, 5);

    assert!(k.start_timer(t, &mut Wait::poll()).is_ready());
    run_daemon(&mut k);
    assert_eq!(k.timer_expiry_time(t), Ok(Some(15)));
    assert_eq!(k.timer_service.lists.len(k.timer_service.current), 1);

    assert!(k.stop_timer(t, &mut Wait::poll()).is_ready());
    run_daemon(&mut k);
    assert_eq!(k.timer_is_active(t), Ok(false));
    run_ticks(&mut k, 2);
    assert!(k.reset_timer(t, &mut Wait::poll()).is_ready());
    run_daemon(&mut k);
    assert_eq!(k.timer_expiry_time(t), Ok(Some(17)));

    assert_eq!(run_ticks(&mut k, 12), [(t, 17)]);
  }

  #[test]
  fn starved_daemon_catches_up_instead_of_bursting() {
    let mut k = Kernel::new(config().timer_task_priority(1), crate::port::Simulated::new());
    let hog = spawn(&mut k, "hog", 3);
    start(&mut k);
    assert_eq!(k.current_task(), Some(hog));

    let t = timer(&mut k, 10, true);
    assert!(k.start_timer(t, &mut Wait::poll()).is_ready());
    assert!(run_ticks(&mut k, 35).is_empty());

    k.delay(100);
    assert_eq!(k.current_task(), k.timer_daemon());
    assert_eq!(run_daemon(&mut k), [(t, 35)]);
    assert_eq!(k.timer_expiry_time(t), Ok(Some(45)));

    assert_eq!(run_ticks(&mut k, 10), [(t, 45)]);
  }

  #[test]
  fn full_command_queue_reports_capacity_exceeded() {
    let config = config().timer_task_priority(1).timer_queue_length(2);
    let mut k = Kernel::new(config, crate::port::Simulated::new());
    spawn(&mut k, "hog", 3);
    start(&mut k);

    let t = timer(&mut k, 10, false);
    assert!(k.start_timer(t, &mut Wait::poll()).is_ready());
    assert!(k.stop_timer(t, &mut Wait::poll()).is_ready());
    assert_eq!(k.start_timer(t, &mut Wait::poll()), Poll::Ready(Err(RtosError::CapacityExceeded)));
    assert_eq!(k.start_timer_from_isr(t), Err(RtosError::CapacityExceeded));
  }

  #[test]
  fn change_period_restarts_from_now() {
    let mut k = kernel();
    spawn(&mut k, "app", 1);
    start(&mut k);

    let t = timer(&mut k, 10, false);
    run_ticks(&mut k, 3);
    assert_eq!(k.change_timer_period_from_isr(t, 4), Ok(true));
    k.yield_from_isr();
    run_daemon(&mut k);

    assert_eq!(k.timer_period(t), Ok(4));
    assert_eq!(k.timer_is_active(t), Ok(true));
    assert_eq!(run_ticks(&mut k, 10), [(t, 7)]);
  }

  #[test]
  fn deleted_timer_is_gone_once_processed() {
    let mut k = kernel();
    spawn(&mut k, "app", 1);
    start(&mut k);

    let t = timer(&mut k, 10, true);
    assert!(k.start_timer(t, &mut Wait::poll()).is_ready());
    run_daemon(&mut k);
    assert!(k.delete_timer(t, &mut Wait::poll()).is_ready());
    run_daemon(&mut k);

    assert_eq!(k.timer_is_active(t), Err(RtosError::InvalidHandle));
    assert!(run_ticks(&mut k, 20).is_empty());
  }

  #[test]
  fn expiry_across_the_tick_wrap() {
    let mut k = Kernel::new(config().initial_tick_count(TickType::MAX - 5), crate::port::Simulated::new());
    spawn(&mut k, "app", 1);
    start(&mut k);

    let t = timer(&mut k, 10, false);
    assert!(k.start_timer(t, &mut Wait::poll()).is_ready());
    run_daemon(&mut k);
    assert_eq!(k.timer_expiry_time(t), Ok(Some(4)));

    assert!(run_ticks(&mut k, 9).is_empty());
    assert_eq!(run_ticks(&mut k, 1), [(t, 4)]);
  }

  #[test]
  fn commands_round_trip_through_the_queue_encoding() {
    let mut k = kernel();
    let t = timer(&mut k, 1, false);
    for command in [
      TimerCommand::Start { timer: t, time: 99 },
      TimerCommand::Stop { timer: t },
      TimerCommand::ChangePeriod { timer: t, period: 3 },
      TimerCommand::Delete { timer: t },
    ] {
      assert_eq!(TimerCommand::decode(&command.encode()), Some(command));
    }
    assert_eq!(TimerCommand::decode(&[0; COMMAND_SIZE]), None);
  }
}
