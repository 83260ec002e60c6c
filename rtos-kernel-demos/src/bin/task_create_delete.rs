//! Three tasks: two blink, the third deletes the first after a few rounds.

use std::time::Duration;

use rtos_kernel::{Config, CurrentTask, Task};
use rtos_kernel_demos::{priority, run};

fn main() {
  run(Config::new(), Duration::from_secs(4), || {
    let task1 = Task::new()
      .name("task1")
      .priority(priority(2))
      .start(|_| loop {
        log::info!("task1 toggles LED0");
        CurrentTask::delay(Duration::from_millis(500));
      })
      .unwrap();

    Task::new()
      .name("task2")
      .priority(priority(3))
      .start(|_| loop {
        log::info!("task2 toggles LED1");
        CurrentTask::delay(Duration::from_millis(500));
      })
      .unwrap();

    let task1 = task1.handle();
    Task::new()
      .name("task3")
      .priority(priority(4))
      .start(move |_| {
        CurrentTask::delay(Duration::from_millis(1600));
        log::info!("task3 deletes task1");
        task1.delete().unwrap();
        log::info!("{} tasks left", rtos_kernel::Scheduler::task_count());
      })
      .unwrap();
  });
}
