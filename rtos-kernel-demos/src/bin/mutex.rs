//! Priority inheritance: the low priority holder of a mutex runs at the
//! priority of the high priority task waiting for it, so the medium priority
//! task cannot delay both.

use std::time::Duration;

use rtos_kernel::sync::Mutex;
use rtos_kernel::{Config, CurrentTask, Task};
use rtos_kernel_demos::{priority, run};

static SHARED: Mutex<u32> = Mutex::new(0);

/// Keep the processor busy for `ticks` ticks without blocking.
fn work(ticks: u32) {
  let start = rtos_kernel::Scheduler::tick_count().as_ticks();
  while rtos_kernel::Scheduler::tick_count().as_ticks().wrapping_sub(start) < ticks {}
}

fn main() {
  run(Config::new(), Duration::from_secs(4), || {
    Task::new()
      .name("low_task")
      .priority(priority(2))
      .start(|_| loop {
        log::info!("low_task takes the mutex");
        let mut value = SHARED.lock().unwrap();
        *value += 1;
        let me = CurrentTask::handle().unwrap();
        work(300);
        log::info!("low_task runs at priority {} before unlocking", me.priority().unwrap());
        drop(value);
        log::info!("low_task is back at priority {}", me.priority().unwrap());
        CurrentTask::delay(Duration::from_millis(1000));
      })
      .unwrap();

    Task::new()
      .name("middle_task")
      .priority(priority(3))
      .start(|_| loop {
        log::info!("middle_task runs");
        CurrentTask::delay(Duration::from_millis(1000));
      })
      .unwrap();

    Task::new()
      .name("high_task")
      .priority(priority(4))
      .start(|_| {
        CurrentTask::delay(Duration::from_millis(100));
        loop {
          log::info!("high_task takes the mutex");
          let mut value = SHARED.lock().unwrap();
          *value += 1;
          log::info!("high_task got the mutex, value is {}", *value);
          drop(value);
          CurrentTask::delay(Duration::from_millis(1000));
        }
      })
      .unwrap();
  });
}
