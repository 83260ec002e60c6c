//! Suspending a task and resuming it from another task and from an interrupt.

use std::sync::atomic::{AtomicU32, Ordering};
use std::time::Duration;

use rtos_kernel::{Config, CurrentTask, Task, TaskState};
use rtos_kernel_demos::{periodic_interrupt, priority, run};

fn main() {
  run(Config::new(), Duration::from_secs(5), || {
    let blinker = Task::new()
      .name("blinker")
      .priority(priority(2))
      .start(|_| {
        let mut count = 0;
        loop {
          count += 1;
          log::info!("blinker round {}", count);
          CurrentTask::delay(Duration::from_millis(300));
        }
      })
      .unwrap()
      .handle();

    Task::new()
      .name("key")
      .priority(priority(3))
      .start(move |_| {
        CurrentTask::delay(Duration::from_secs(1));
        log::info!("key: suspend blinker");
        blinker.suspend().unwrap();
        log::info!("blinker is {}", blinker.state().unwrap());

        CurrentTask::delay(Duration::from_secs(1));
        log::info!("key: resume blinker");
        blinker.resume().unwrap();

        CurrentTask::delay(Duration::from_secs(1));
        log::info!("key: suspend blinker until the interrupt resumes it");
        blinker.suspend().unwrap();
      })
      .unwrap();

    static FIRED: AtomicU32 = AtomicU32::new(0);
    periodic_interrupt(Duration::from_millis(200), move |ic| {
      if blinker.state() == Ok(TaskState::Suspended) && FIRED.fetch_add(1, Ordering::Relaxed) >= 5 {
        log::info!("interrupt: resume blinker");
        blinker.resume_from_isr(ic).unwrap();
        return false
      }
      true
    });
  });
}
