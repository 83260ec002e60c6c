//! One task waiting on a queue and a semaphore at the same time.

use std::time::Duration;

use rtos_kernel::sync::{Binary, Queue, QueueSet, Semaphore};
use rtos_kernel::{Config, CurrentTask, Task, Ticks};
use rtos_kernel_demos::{priority, run};

static VALUES: Queue<u32, 1> = Queue::new();
static BUTTON: Semaphore<Binary> = Semaphore::new_binary();
static SET: QueueSet<2> = QueueSet::new();

fn main() {
  run(Config::new(), Duration::from_secs(3), || {
    SET.add(&VALUES).unwrap();
    SET.add(&BUTTON).unwrap();

    Task::new()
      .name("sender")
      .priority(priority(2))
      .start(|_| {
        for round in 0..6u32 {
          if round % 2 == 0 {
            VALUES.send(round, Ticks::MAX).unwrap();
            log::info!("sent {}", round);
          } else {
            BUTTON.give().unwrap();
            log::info!("gave the semaphore");
          }
          CurrentTask::delay(Duration::from_millis(300));
        }
      })
      .unwrap();

    Task::new()
      .name("selector")
      .priority(priority(3))
      .start(|_| loop {
        let member = SET.select(Ticks::MAX).unwrap();
        if SET.is(member, &VALUES) {
          log::info!("queue ready, received {}", VALUES.receive(Ticks::ZERO).unwrap());
        } else if SET.is(member, &BUTTON) {
          BUTTON.take(Ticks::ZERO).unwrap();
          log::info!("semaphore ready, taken");
        }
      })
      .unwrap();
  });
}
