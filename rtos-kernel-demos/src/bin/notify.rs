//! Task notifications standing in for a counting semaphore, an event group
//! and a mailbox.

use std::time::Duration;

use rtos_kernel::{Config, CurrentTask, Task, TaskNotification, Ticks};
use rtos_kernel_demos::{periodic_interrupt, priority, run};

fn main() {
  run(Config::new(), Duration::from_secs(3), || {
    let counter = Task::new()
      .name("counter")
      .priority(priority(3))
      .start(|_| loop {
        // Like taking a counting semaphore one unit at a time.
        let before = CurrentTask::notify_take(false, Ticks::MAX).unwrap();
        log::info!("counter: took one of {} pending", before);
        CurrentTask::delay(Duration::from_millis(200));
      })
      .unwrap()
      .handle();

    let flags = Task::new()
      .name("flags")
      .priority(priority(3))
      .start(|_| {
        let mut seen = 0;
        while seen != 0b11 {
          seen |= CurrentTask::notify_wait(0, 0b11, Ticks::MAX).unwrap();
          log::info!("flags: seen {:#04b}", seen);
        }
        log::info!("flags: all events arrived");
      })
      .unwrap()
      .handle();

    let mailbox = Task::new()
      .name("mailbox")
      .priority(priority(3))
      .start(|_| loop {
        let value = CurrentTask::notify_wait(0, u32::MAX, Ticks::MAX).unwrap();
        log::info!("mailbox: received {}", value);
      })
      .unwrap()
      .handle();

    Task::new()
      .name("notifier")
      .priority(priority(2))
      .start(move |_| {
        for round in 0..5u32 {
          counter.notify(TaskNotification::Increment).unwrap();
          mailbox.notify(TaskNotification::OverwriteValue(round * 10)).unwrap();
          if round == 3 {
            flags.notify(TaskNotification::SetBits(0b01)).unwrap();
          }
          CurrentTask::delay(Duration::from_millis(100));
        }
      })
      .unwrap();

    let mut fired = false;
    periodic_interrupt(Duration::from_millis(150), move |ic| {
      if !fired {
        counter.notify_give_from_isr(ic).unwrap();
        flags.notify_from_isr(TaskNotification::SetBits(0b10), ic).unwrap();
        fired = true;
      }
      !fired
    });
  });
}
