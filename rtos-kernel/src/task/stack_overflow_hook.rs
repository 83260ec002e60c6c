use core::{
  mem,
  sync::atomic::{AtomicPtr, Ordering},
};

use super::TaskHandle;

type StackOverflowHookFunction = fn(&TaskHandle, &str);

static STACK_OVERFLOW_HOOK_FUNCTION: AtomicPtr<()> = AtomicPtr::new(default_stack_overflow_hook as *mut _);

fn default_stack_overflow_hook(task: &TaskHandle, task_name: &str) {
  if task_name.is_empty() {
    panic!("task {:?} has overflowed its stack", task.id());
  } else {
    panic!("task '{}' has overflowed its stack", task_name);
  }
}

/// Set a custom stack overflow hook.
///
/// The hook runs inside the kernel, right before the overflowing task would
/// be switched out, so it must not call into the kernel itself.
///
/// ```
/// use rtos_kernel::task::{self, TaskHandle};
///
/// fn my_stack_overflow_hook(task: &TaskHandle, task_name: &str) {
///   panic!("Stack overflow detected in task '{}' ({:?}).", task_name, task.id());
/// }
///
/// task::set_stack_overflow_hook(my_stack_overflow_hook);
/// ```
pub fn set_stack_overflow_hook(f: fn(&TaskHandle, &str)) {
  STACK_OVERFLOW_HOOK_FUNCTION.store(f as *mut _, Ordering::Release);
}

pub(crate) fn call_stack_overflow_hook(task: &TaskHandle, task_name: &str) {
  let f: StackOverflowHookFunction = unsafe { mem::transmute(STACK_OVERFLOW_HOOK_FUNCTION.load(Ordering::Acquire)) };
  f(task, task_name);
}
