//! Two tasks of equal priority that never block share the processor one
//! tick at a time.

use std::time::Duration;

use rtos_kernel::{Config, Scheduler, Task};
use rtos_kernel_demos::{priority, run};

fn busy(name: &'static str) -> impl FnOnce(&mut rtos_kernel::CurrentTask) + Send + 'static {
  move |_| {
    let mut last = Scheduler::tick_count().as_ticks();
    let mut slices = 0u32;
    loop {
      // Reading the tick count enters the kernel, which is where the host
      // port lets the tick switch tasks.
      let now = Scheduler::tick_count().as_ticks();
      if now.wrapping_sub(last) > 1 {
        slices += 1;
        if slices % 100 == 0 {
          log::info!("{} got its {}th time slice at tick {}", name, slices, now);
        }
      }
      last = now;
    }
  }
}

fn main() {
  let config = Config::new().use_preemption(true).use_time_slicing(true);
  run(config, Duration::from_secs(2), || {
    Task::new().name("task1").priority(priority(2)).start(busy("task1")).unwrap();
    Task::new().name("task2").priority(priority(2)).start(busy("task2")).unwrap();
  });
}
