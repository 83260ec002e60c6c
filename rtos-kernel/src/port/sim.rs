use crate::config::{StackWord, TickType};
use crate::kernel::TaskId;
use crate::RtosError;

use super::{Port, TaskContext, TaskEntry};

/// Number of words of the fake exception frame.
const FRAME_WORDS: usize = 16;

/// A port that performs no real context switches.
///
/// The kernel driven by it is a pure state machine: whoever calls into it
/// acts as the task [`Kernel::current_task`](crate::kernel::Kernel::current_task)
/// reports. This is what the unit tests use.
#[derive(Debug, Default)]
pub struct Simulated {
  interrupts_masked: bool,
}

impl Simulated {
  pub const fn new() -> Self {
    Self { interrupts_masked: false }
  }

  /// Whether the kernel currently has interrupts masked.
  pub fn interrupts_masked(&self) -> bool {
    self.interrupts_masked
  }
}

impl Port for Simulated {
  fn init_task_stack(
    &mut self,
    _task: TaskId,
    stack: &mut [StackWord],
    entry: TaskEntry,
    param: usize,
  ) -> Result<TaskContext, RtosError> {
    let frame = FRAME_WORDS.min(stack.len());
    let top = stack.len();
    let sp = top - frame;

    for word in &mut stack[sp..] {
      *word = 0;
    }
    if frame >= 2 {
      stack[top - 1] = entry as usize as StackWord;
      stack[top - 2] = param as StackWord;
    }

    Ok(TaskContext { stack_pointer: sp })
  }

  fn start_first_task(&mut self, _task: TaskId) {}

  fn request_context_switch(&mut self, _from: Option<TaskId>, _to: TaskId) {}

  fn disable_interrupts(&mut self) {
    self.interrupts_masked = true;
  }

  fn enable_interrupts(&mut self) {
    self.interrupts_masked = false;
  }

  fn suppress_ticks_and_sleep(&mut self, expected: TickType) -> TickType {
    expected
  }
}
