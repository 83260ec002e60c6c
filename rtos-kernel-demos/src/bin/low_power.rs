//! Tickless idle: with every task delayed, the idle task stops the tick and
//! lets the processor sleep until the next wake up.

use std::sync::atomic::{AtomicU32, Ordering};
use std::time::Duration;

use rtos_kernel::{Config, CurrentTask, Task};
use rtos_kernel_demos::{priority, run};

static SLEPT: AtomicU32 = AtomicU32::new(0);

fn before_sleep(expected: u32) -> u32 {
  // A board would turn peripherals off here. Returning 0 skips the sleep.
  log::debug!("sleeping for up to {} ticks", expected);
  expected
}

fn after_sleep(slept: u32) {
  SLEPT.fetch_add(slept, Ordering::Relaxed);
}

fn main() {
  rtos_kernel::set_pre_sleep_hook(before_sleep);
  rtos_kernel::set_post_sleep_hook(after_sleep);

  let config = Config::new().use_tickless_idle(true).expected_idle_time_before_sleep(5);
  run(config, Duration::from_secs(3), || {
    Task::new()
      .name("worker")
      .priority(priority(2))
      .start(|_| loop {
        log::info!("worker wakes up, {} ticks spent asleep so far", SLEPT.load(Ordering::Relaxed));
        CurrentTask::delay(Duration::from_millis(500));
      })
      .unwrap();
  });
}
