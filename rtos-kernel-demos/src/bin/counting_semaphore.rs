//! A counting semaphore collecting events faster than they are handled.

use std::time::Duration;

use rtos_kernel::sync::{Counting, Semaphore};
use rtos_kernel::{Config, CurrentTask, Task, Ticks};
use rtos_kernel_demos::{priority, run};

static EVENTS: Semaphore<Counting<0, 100>> = Semaphore::new_counting();

fn main() {
  run(Config::new(), Duration::from_secs(3), || {
    Task::new()
      .name("producer")
      .priority(priority(2))
      .start(|_| {
        for _ in 0..10 {
          EVENTS.give().unwrap();
          log::info!("event given, count is {}", EVENTS.count().unwrap());
          CurrentTask::delay(Duration::from_millis(100));
        }
      })
      .unwrap();

    Task::new()
      .name("consumer")
      .priority(priority(3))
      .start(|_| loop {
        EVENTS.take(Ticks::MAX).unwrap();
        log::info!("event taken, count is {}", EVENTS.count().unwrap());
        CurrentTask::delay(Duration::from_millis(250));
      })
      .unwrap();
  });
}
