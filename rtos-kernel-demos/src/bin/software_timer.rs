//! A one-shot and an auto-reload timer, started and stopped by a task.

use std::time::Duration;

use rtos_kernel::timer::Timer;
use rtos_kernel::{Config, CurrentTask, Task, Ticks};
use rtos_kernel_demos::{priority, run};

fn main() {
  run(Config::new(), Duration::from_secs(4), || {
    let one_shot = Timer::build()
      .name("one_shot")
      .period(Duration::from_millis(500))
      .auto_reload(false)
      .create(|timer| log::info!("{} expired", timer.name().unwrap()))
      .unwrap()
      .detach();

    let periodic = Timer::build()
      .name("periodic")
      .period(Duration::from_millis(300))
      .create(|timer| {
        // The id value doubles as an expiry counter.
        let count = timer.id_value().unwrap() + 1;
        timer.set_id_value(count).unwrap();
        log::info!("{} expired {} times", timer.name().unwrap(), count);
      })
      .unwrap()
      .detach();

    Task::new()
      .name("timer_control")
      .priority(priority(2))
      .start(move |_| {
        log::info!("starting both timers");
        one_shot.start(Ticks::MAX).unwrap();
        periodic.start(Ticks::MAX).unwrap();

        CurrentTask::delay(Duration::from_millis(1000));
        log::info!("restarting the one-shot timer");
        one_shot.reset(Ticks::MAX).unwrap();

        CurrentTask::delay(Duration::from_millis(1000));
        log::info!("stretching the periodic timer to 600 ms");
        periodic.change_period(Ticks::MAX, Duration::from_millis(600)).unwrap();

        CurrentTask::delay(Duration::from_millis(1300));
        log::info!("stopping the periodic timer");
        periodic.stop(Ticks::MAX).unwrap();
        CurrentTask::delay(Duration::from_millis(50));
        log::info!("periodic timer active: {}", periodic.is_active().unwrap());
      })
      .unwrap();
  });
}
