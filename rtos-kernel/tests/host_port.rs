//! Tasks running on host threads only ever act as themselves.

use std::sync::atomic::{AtomicU32, AtomicUsize, Ordering::*};
use std::time::Duration;

use rtos_kernel::port::HostPort;
use rtos_kernel::{Config, CurrentTask, Scheduler, Task, TaskPriority};

static IDS: [AtomicU32; 2] = [AtomicU32::new(0), AtomicU32::new(0)];
static CALLS: [AtomicUsize; 2] = [AtomicUsize::new(0), AtomicUsize::new(0)];
static MISTAKEN: AtomicUsize = AtomicUsize::new(0);

fn worker(index: usize) {
  loop {
    let seen = CurrentTask::handle().unwrap().id().to_bits();
    if seen != IDS[index].load(Acquire) {
      MISTAKEN.fetch_add(1, Relaxed);
    }
    CALLS[index].fetch_add(1, Relaxed);
  }
}

#[test]
fn equal_priority_tasks_see_themselves_as_current() {
  Scheduler::init(Config::new(), HostPort::new()).unwrap();

  let priority = TaskPriority::new(2).unwrap();
  for index in 0..2 {
    let task = Task::new().name("worker").priority(priority).start(move |_| worker(index)).unwrap();
    IDS[index].store(task.id().to_bits(), Release);
  }

  Task::new()
    .name("supervisor")
    .priority(TaskPriority::new(3).unwrap())
    .start(|_| {
      CurrentTask::delay(Duration::from_millis(300));
      Scheduler::end().unwrap();
    })
    .unwrap();

  Scheduler::start().unwrap();

  assert!(CALLS[0].load(Relaxed) > 0);
  assert!(CALLS[1].load(Relaxed) > 0);
  assert_eq!(MISTAKEN.load(Relaxed), 0);
}
