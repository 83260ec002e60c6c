//! A task waiting for two events, signalled by a task and an interrupt.

use std::time::Duration;

use rtos_kernel::sync::EventGroup;
use rtos_kernel::{Config, CurrentTask, Task, Ticks};
use rtos_kernel_demos::{periodic_interrupt, priority, run};

const KEY0: u32 = 1 << 0;
const KEY1: u32 = 1 << 1;

static EVENTS: EventGroup = EventGroup::new();

fn main() {
  run(Config::new(), Duration::from_secs(3), || {
    EVENTS.id().unwrap();

    Task::new()
      .name("key0")
      .priority(priority(2))
      .start(|_| loop {
        CurrentTask::delay(Duration::from_millis(500));
        let bits = EVENTS.set_bits(KEY0).unwrap();
        log::info!("key0 set, bits are now {:#04b}", bits);
      })
      .unwrap();

    Task::new()
      .name("waiter")
      .priority(priority(3))
      .start(|_| loop {
        let bits = EVENTS.wait_bits(KEY0 | KEY1, true, true, Ticks::MAX).unwrap();
        log::info!("both keys pressed, bits left {:#04b}", bits);
      })
      .unwrap();

    let mut presses = 0;
    periodic_interrupt(Duration::from_millis(700), move |ic| {
      presses += 1;
      EVENTS.set_bits_from_isr(ic, KEY1).unwrap();
      presses < 4
    });
  });
}
