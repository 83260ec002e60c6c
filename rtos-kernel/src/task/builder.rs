use alloc2::boxed::Box;

use crate::config::MINIMAL_STACK_SIZE;
use crate::{rt, RtosError};

use super::{CurrentTask, Task, TaskHandle, TaskPriority};

type TaskFunction = Box<dyn FnOnce(&mut CurrentTask) + Send>;

/// Helper for spawning a new task, created with [`Task::new`].
#[derive(Debug, Clone, Copy)]
pub struct TaskBuilder<'n> {
  name: &'n str,
  stack_size: usize,
  priority: TaskPriority,
}

impl TaskBuilder<'_> {
  pub(crate) const fn new() -> TaskBuilder<'static> {
    TaskBuilder {
      name: "",
      stack_size: MINIMAL_STACK_SIZE,
      priority: TaskPriority::from_kernel(1),
    }
  }
}

impl TaskBuilder<'_> {
  /// Set the task name.
  pub const fn name<'n>(self, name: &'n str) -> TaskBuilder<'n> {
    TaskBuilder {
      name,
      stack_size: self.stack_size,
      priority: self.priority,
    }
  }

  /// Set the stack size in words.
  pub const fn stack_size(mut self, stack_size: usize) -> Self {
    self.stack_size = stack_size;
    self
  }

  /// Set the task priority.
  pub const fn priority(mut self, priority: TaskPriority) -> Self {
    self.priority = priority;
    self
  }

  /// Create and start the [`Task`].
  ///
  /// The task is deleted once `f` returns.
  pub fn start<F>(&self, f: F) -> Result<Task, RtosError>
  where
    F: FnOnce(&mut CurrentTask) + Send + 'static,
  {
    fn task_function(param: usize) {
      // NOTE: New scope so that everything is dropped before the task is deleted.
      {
        let function = unsafe { Box::from_raw(param as *mut TaskFunction) };
        let mut current_task = CurrentTask::new_unchecked();
        function(&mut current_task);
      }

      CurrentTask::delete();
    }

    let function: Box<TaskFunction> = Box::new(Box::new(f));
    let param = Box::into_raw(function) as usize;

    let created = rt::with(|kernel| {
      kernel.create_task(self.name, task_function, param, self.stack_size, self.priority.get())
    });

    match created {
      Ok(Ok(id)) => Ok(Task { handle: TaskHandle::from_id(id) }),
      Ok(Err(err)) | Err(err) => {
        // SAFETY: The task was not created, so nothing else owns the function.
        drop(unsafe { Box::from_raw(param as *mut TaskFunction) });
        Err(err)
      },
    }
  }
}
