use core::fmt;

use alloc2::vec::Vec;

use crate::config::MAX_TASK_NAME_LEN;

use super::{TaskHandle, TaskName, TaskPriority, TaskState};

/// Snapshot of one task, see [`Scheduler::system_state`](super::Scheduler::system_state).
#[derive(Debug, Clone)]
pub struct TaskStatus {
  pub(crate) handle: TaskHandle,
  pub(crate) name: TaskName<MAX_TASK_NAME_LEN>,
  pub(crate) number: u32,
  pub(crate) state: TaskState,
  pub(crate) current_priority: TaskPriority,
  pub(crate) base_priority: TaskPriority,
  pub(crate) run_time_counter: u32,
  pub(crate) stack_high_water_mark: usize,
}

impl TaskStatus {
  /// Get the task.
  #[inline]
  pub fn task(&self) -> TaskHandle {
    self.handle
  }

  /// Get the task name.
  #[inline]
  pub fn name(&self) -> &str {
    self.name.as_str()
  }

  /// Get the task number.
  #[inline]
  pub fn number(&self) -> u32 {
    self.number
  }

  /// Get the task state.
  #[inline]
  pub fn state(&self) -> TaskState {
    self.state
  }

  /// Get the task's current priority.
  pub fn current_priority(&self) -> TaskPriority {
    self.current_priority
  }

  /// Get the task's base priority.
  pub fn base_priority(&self) -> TaskPriority {
    self.base_priority
  }

  /// Ticks during which this task was running.
  pub fn run_time_counter(&self) -> u32 {
    self.run_time_counter
  }

  /// Fewest stack words this task ever had left.
  pub fn stack_high_water_mark(&self) -> usize {
    self.stack_high_water_mark
  }
}

#[derive(Debug, Clone)]
pub struct SystemState {
  pub(crate) tasks: Vec<TaskStatus>,
  pub(crate) total_run_time: u32,
}

impl SystemState {
  pub fn tasks(&self) -> &[TaskStatus] {
    &self.tasks
  }

  pub fn total_run_time(&self) -> u32 {
    self.total_run_time
  }
}

/// Share of the total run time, as shown in the task table.
struct CpuShare {
  run_time: u32,
  total: u32,
}

impl fmt::Display for CpuShare {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    if self.total == 0 || self.run_time > self.total {
      return f.pad("-")
    }

    let percent = (u64::from(self.run_time) * 100 / u64::from(self.total)) as u32;
    if percent == 0 && self.run_time > 0 {
      write!(f, " <1%")
    } else {
      write!(f, "{: >3}%", percent)
    }
  }
}

impl fmt::Display for SystemState {
  fn fmt(&self, f: &mut fmt::Formatter) -> Result<(), fmt::Error> {
    f.write_str("Tasks\r\n")?;

    writeln!(
      f,
      "{id: <6} | {name: <16} | {state: <9} | {priority: <8} | {stack: >10} | {cpu_abs: >10} | {cpu_rel: >4}",
      id = "ID",
      name = "Name",
      state = "State",
      priority = "Priority",
      stack = "Stack left",
      cpu_abs = "CPU",
      cpu_rel = "%"
    )?;

    for task in &self.tasks {
      writeln!(
        f,
        "{id: <6} | {name: <16} | {state: <9} | {priority: <8} | {stack: >10} | {cpu_abs: >10} | {cpu_rel: >4}",
        id = task.number(),
        name = task.name(),
        state = task.state(),
        priority = task.current_priority,
        stack = task.stack_high_water_mark,
        cpu_abs = task.run_time_counter,
        cpu_rel = CpuShare { run_time: task.run_time_counter, total: self.total_run_time },
      )?;
    }

    if self.total_run_time > 0 {
      writeln!(f, "Total run time: {}", self.total_run_time)?;
    }

    Ok(())
  }
}
