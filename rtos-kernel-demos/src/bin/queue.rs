//! A key queue and a queue carrying a larger payload by value.

use std::time::Duration;

use rtos_kernel::sync::Queue;
use rtos_kernel::{Config, CurrentTask, Task, Ticks};
use rtos_kernel_demos::{priority, run};

static KEYS: Queue<u8, 2> = Queue::new();
static BIG_DATA: Queue<[u8; 64], 1> = Queue::new();

fn main() {
  run(Config::new(), Duration::from_secs(3), || {
    Task::new()
      .name("keys")
      .priority(priority(2))
      .start(|_| {
        for key in 1..=6u8 {
          match KEYS.send(key, Ticks::ZERO) {
            Ok(()) => log::info!("sent key {}", key),
            Err(err) => log::warn!("key {} dropped: {}", key, err),
          }
          let mut message = [0u8; 64];
          let text = b"a message too large to bother copying twice";
          message[..text.len()].copy_from_slice(text);
          message[63] = key;
          BIG_DATA.send(message, Ticks::MAX).unwrap();
          CurrentTask::delay(Duration::from_millis(50));
        }
      })
      .unwrap();

    Task::new()
      .name("key_reader")
      .priority(priority(3))
      .start(|_| loop {
        let key = KEYS.receive(Ticks::MAX).unwrap();
        log::info!("received key {}, {} more waiting", key, KEYS.len().unwrap());
        CurrentTask::delay(Duration::from_millis(120));
      })
      .unwrap();

    Task::new()
      .name("big_reader")
      .priority(priority(4))
      .start(|_| loop {
        let message = BIG_DATA.receive(Ticks::MAX).unwrap();
        let end = message.iter().position(|&b| b == 0).unwrap_or(message.len());
        log::info!("big data #{}: {}", message[63], String::from_utf8_lossy(&message[..end]));
      })
      .unwrap();
  });
}
