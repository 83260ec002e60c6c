//! Shared setup for the tutorial programs.
//!
//! Every program starts the kernel on the host port, creates its tasks from
//! a start task and ends the scheduler once it has shown what it is about.
//! Output goes through `log`; set `RTOS_LOG` to a number from 0 (errors
//! only) to 4 (every kernel trace point) to change how much is printed.

use std::env;
use std::thread;
use std::time::Duration;

use rtos_kernel::port::HostPort;
use rtos_kernel::{Config, CriticalSection, CurrentTask, InterruptContext, Scheduler, Task, TaskPriority};

/// Priority of the task that sets a program up and ends it, above every
/// task the programs create.
const SUPERVISOR_PRIORITY: u8 = 10;

/// Install the logger, reading the verbosity from `RTOS_LOG`.
pub fn init_logging() {
  let verbosity = env::var("RTOS_LOG").ok().and_then(|level| level.parse::<usize>().ok()).unwrap_or(2);

  stderrlog::new()
    .verbosity(verbosity)
    .timestamp(stderrlog::Timestamp::Millisecond)
    .init()
    .unwrap();
}

/// Shorthand for a task priority known to be valid.
pub fn priority(priority: u8) -> TaskPriority {
  TaskPriority::new(priority).unwrap()
}

/// Start a fresh kernel whose first task runs `setup` in a critical
/// section, so the tasks it creates all start together, and ends the
/// scheduler `run_for` later.
pub fn run(config: Config, run_for: Duration, setup: impl FnOnce() + Send + 'static) {
  init_logging();

  Scheduler::init(config, HostPort::new()).unwrap();
  Task::new()
    .name("start_task")
    .priority(priority(SUPERVISOR_PRIORITY))
    .start(move |_| {
      {
        let _section = CriticalSection::enter().unwrap();
        setup();
      }
      CurrentTask::delay(run_for);
      Scheduler::end().unwrap();
    })
    .unwrap();

  log::info!("starting scheduler");
  Scheduler::start().unwrap();
  log::info!("scheduler ended after {} ticks", Scheduler::tick_count().as_ticks());
}

/// Call `handler` every `period` from a thread standing in for a hardware
/// interrupt, until it returns `false`.
pub fn periodic_interrupt(period: Duration, mut handler: impl FnMut(&InterruptContext) -> bool + Send + 'static) {
  thread::Builder::new()
    .name("interrupt".into())
    .spawn(move || loop {
      thread::sleep(period);
      let ic = InterruptContext::new();
      if !handler(&ic) {
        break
      }
    })
    .unwrap();
}
