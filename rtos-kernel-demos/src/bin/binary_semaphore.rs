//! An interrupt gives a binary semaphore; a task waits for it.

use std::time::Duration;

use rtos_kernel::sync::{Binary, Semaphore};
use rtos_kernel::{Config, RtosError, Task};
use rtos_kernel_demos::{periodic_interrupt, priority, run};

static KEY_PRESSED: Semaphore<Binary> = Semaphore::new_binary();

fn main() {
  run(Config::new(), Duration::from_secs(3), || {
    // Create it here: interrupts can only use a semaphore a task created.
    KEY_PRESSED.handle().unwrap();

    Task::new()
      .name("waiter")
      .priority(priority(2))
      .start(|_| loop {
        match KEY_PRESSED.take(Duration::from_millis(700)) {
          Ok(()) => log::info!("key pressed"),
          Err(RtosError::Timeout) => log::info!("no key for 700 ms"),
          Err(err) => panic!("{}", err),
        }
      })
      .unwrap();

    let mut presses = 0;
    periodic_interrupt(Duration::from_millis(400), move |ic| {
      presses += 1;
      // Two presses without a take in between count once.
      if let Err(err) = KEY_PRESSED.give_from_isr(ic) {
        log::warn!("press {} lost: {}", presses, err);
      }
      presses < 4
    });

    log::info!("semaphore count starts at {}", KEY_PRESSED.count().unwrap());
  });
}
