//! Runs tasks as threads of the host operating system.
//!
//! Every task gets its own thread, but only the thread of the task the
//! kernel considers running may pass [`wait_turn`]. All others wait on a
//! shared baton until a context switch hands it to them. A ticker thread
//! delivers the tick interrupt.
//!
//! Threads cannot be interrupted from the outside, so a switch requested by
//! the tick takes effect when the running task next calls into the kernel.

use std::boxed::Box;
use std::cell::Cell;
use std::panic::{self, AssertUnwindSafe};
use std::sync::{Condvar, Mutex, MutexGuard, PoisonError};
use std::thread;
use std::time::{Duration, Instant};
use std::vec::Vec;

use crate::config::{StackWord, TickType, TICK_PERIOD_MS};
use crate::kernel::TaskId;
use crate::RtosError;

use super::{Port, TaskContext, TaskEntry};

struct Baton {
  running: Option<TaskId>,
  /// Tasks whose threads have to leave as soon as they wake.
  deleted: Vec<TaskId>,
  ticks_suppressed: bool,
  ended: bool,
}

static BATON: Mutex<Baton> = Mutex::new(Baton { running: None, deleted: Vec::new(), ticks_suppressed: false, ended: false });
static TURN: Condvar = Condvar::new();

std::thread_local! {
  static THREAD_TASK: Cell<Option<TaskId>> = const { Cell::new(None) };
}

/// Unwinding payload used to leave the thread of a deleted task.
struct TaskExit;

fn baton() -> MutexGuard<'static, Baton> {
  BATON.lock().unwrap_or_else(PoisonError::into_inner)
}

fn wait<'a>(guard: MutexGuard<'a, Baton>) -> MutexGuard<'a, Baton> {
  TURN.wait(guard).unwrap_or_else(PoisonError::into_inner)
}

/// The task the calling thread runs, if any.
pub(crate) fn thread_task() -> Option<TaskId> {
  THREAD_TASK.with(Cell::get)
}

/// Block the calling task thread until the kernel switches to its task.
///
/// Threads that do not belong to a task pass right away.
pub(crate) fn wait_turn() {
  let Some(me) = thread_task() else {
    return
  };

  let mut baton = baton();
  loop {
    if baton.ended || baton.deleted.contains(&me) {
      drop(baton);
      panic::resume_unwind(Box::new(TaskExit));
    }
    if baton.running == Some(me) {
      return
    }
    baton = wait(baton);
  }
}

pub(crate) fn relax() {
  thread::sleep(Duration::from_millis(u64::from(TICK_PERIOD_MS)));
}

/// Block until the scheduler is ended.
pub(crate) fn wait_for_end() {
  let mut baton = baton();
  while !baton.ended {
    baton = wait(baton);
  }
}

fn run_task(task: TaskId, entry: TaskEntry, param: usize) {
  THREAD_TASK.with(|cell| cell.set(Some(task)));

  let result = panic::catch_unwind(AssertUnwindSafe(|| {
    wait_turn();
    entry(param);
  }));

  if let Err(payload) = result {
    if !payload.is::<TaskExit>() {
      log::error!(target: "rtos_kernel::port", "task {:?} panicked", task);
      // Hand the processor to someone else.
      let _ = panic::catch_unwind(|| crate::rt::with(|kernel| kernel.delete_task(Some(task))));
    }
  }

  baton().deleted.retain(|&deleted| deleted != task);
}

fn run_ticker() {
  let period = Duration::from_millis(u64::from(TICK_PERIOD_MS));
  let mut next = Instant::now() + period;

  loop {
    if let Some(delay) = next.checked_duration_since(Instant::now()) {
      thread::sleep(delay);
    }
    next += period;

    let baton = baton();
    if baton.ended {
      return
    }
    let suppressed = baton.ticks_suppressed;
    drop(baton);

    if !suppressed {
      crate::rt::tick();
    }
  }
}

/// [`Port`] running every task on a host thread.
#[derive(Debug, Default)]
pub struct HostPort {
  ticker: Option<thread::JoinHandle<()>>,
}

impl HostPort {
  pub const fn new() -> Self {
    Self { ticker: None }
  }
}

impl Port for HostPort {
  fn init_task_stack(
    &mut self,
    task: TaskId,
    _stack: &mut [StackWord],
    entry: TaskEntry,
    param: usize,
  ) -> Result<TaskContext, RtosError> {
    thread::Builder::new()
      .name(std::format!("task-{}", task.to_bits()))
      .spawn(move || run_task(task, entry, param))
      .map_err(|_| RtosError::ResourceExhausted)?;

    Ok(TaskContext::default())
  }

  fn start_first_task(&mut self, task: TaskId) {
    let mut baton = baton();
    baton.running = Some(task);
    baton.ended = false;
    drop(baton);
    TURN.notify_all();

    if self.ticker.is_none() {
      self.ticker = thread::Builder::new().name("ticker".into()).spawn(run_ticker).ok();
    }
  }

  fn request_context_switch(&mut self, _from: Option<TaskId>, to: TaskId) {
    baton().running = Some(to);
    TURN.notify_all();
  }

  fn task_deleted(&mut self, task: TaskId) {
    baton().deleted.push(task);
    TURN.notify_all();
  }

  fn suppress_ticks_and_sleep(&mut self, expected: TickType) -> TickType {
    baton().ticks_suppressed = true;
    let started = Instant::now();
    thread::sleep(Duration::from_millis(u64::from(expected) * u64::from(TICK_PERIOD_MS)));
    baton().ticks_suppressed = false;

    let slept = started.elapsed().as_millis() / u128::from(TICK_PERIOD_MS.max(1));
    TickType::try_from(slept).unwrap_or(expected).min(expected)
  }

  fn end_scheduler(&mut self) {
    let mut baton = baton();
    baton.ended = true;
    baton.running = None;
    drop(baton);
    TURN.notify_all();
  }
}
