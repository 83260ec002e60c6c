//! Fatal kernel assertions.
//!
//! Corrupted lists, double frees and similar invariant violations leave the
//! scheduler in an undefined state, so they never return an error. They go
//! through [`kernel_assert!`](crate::kernel_assert), which calls the handler
//! installed with [`set_handler`]. The default handler panics.

use core::{
  mem,
  sync::atomic::{AtomicPtr, Ordering},
};

type AssertFunction = fn(&'static str, &'static str, u32);

static ASSERT_FUNCTION: AtomicPtr<()> = AtomicPtr::new(assert_panic as *mut _);

/// Set a custom assertion handler.
///
/// The handler must not return to the kernel; halt, reset or panic instead.
///
/// # Examples
///
/// ```
/// fn my_assertion_handler(message: &str, file_name: &str, line: u32) {
///   panic!("kernel assertion in file {} at line {} failed: {}", file_name, line, message);
/// }
///
/// rtos_kernel::assert::set_handler(my_assertion_handler);
/// ```
pub fn set_handler(f: fn(&'static str, &'static str, u32)) {
  ASSERT_FUNCTION.store(f as *mut _, Ordering::Release);
}

fn assert_panic(message: &'static str, file_name: &'static str, line: u32) {
  let file_name = file_name.rsplit_once('/').map(|(_, s)| s).unwrap_or(file_name);
  panic!("assertion at {}:{} failed: {}", file_name, line, message);
}

#[doc(hidden)]
#[cold]
pub fn assert_failed(message: &'static str, file_name: &'static str, line: u32) -> ! {
  log::error!(target: "rtos_kernel::assert", "{}:{}: {}", file_name, line, message);

  let f: AssertFunction = unsafe { mem::transmute(ASSERT_FUNCTION.load(Ordering::Acquire)) };
  f(message, file_name, line);

  // A handler that returns leaves the kernel in an unknown state.
  loop {
    core::hint::spin_loop();
  }
}

/// Halt through the assertion handler if `cond` does not hold.
#[macro_export]
macro_rules! kernel_assert {
  ($cond:expr, $msg:literal $(,)?) => {
    if !$cond {
      $crate::assert::assert_failed($msg, file!(), line!());
    }
  };
}
