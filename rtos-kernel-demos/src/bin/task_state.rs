//! Querying tasks: priorities, states, names and the system state table.

use std::time::Duration;

use rtos_kernel::{Config, CurrentTask, Scheduler, Task};
use rtos_kernel_demos::{priority, run};

fn main() {
  run(Config::new(), Duration::from_secs(3), || {
    Task::new()
      .name("task1")
      .priority(priority(2))
      .start(|_| loop {
        CurrentTask::delay(Duration::from_millis(10));
      })
      .unwrap();

    Task::new()
      .name("task2")
      .priority(priority(3))
      .start(|_| {
        let me = CurrentTask::handle().unwrap();
        log::info!("task2 runs at priority {}", me.priority().unwrap());
        me.set_priority(priority(4)).unwrap();
        log::info!("task2 now runs at priority {}", me.priority().unwrap());

        log::info!("{} tasks exist", Scheduler::task_count());
        let task1 = Task::find("task1").unwrap().unwrap();
        log::info!(
          "task1 is number {}, {} with {} stack words never used",
          task1.number().unwrap(),
          task1.state().unwrap(),
          task1.stack_high_water_mark().unwrap(),
        );

        CurrentTask::delay(Duration::from_secs(1));
        log::info!("\n{}", Scheduler::system_state().unwrap());
      })
      .unwrap();
  });
}
