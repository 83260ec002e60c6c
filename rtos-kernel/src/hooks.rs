//! Application hooks called by the kernel.
//!
//! Every hook is a plain function pointer stored in an atomic, so it can be
//! installed before or after the kernel starts. The tick hook runs inside
//! the tick interrupt and must not block.

use core::mem;
use core::sync::atomic::{AtomicPtr, Ordering};

use crate::config::TickType;

static TICK_FUNCTION: AtomicPtr<()> = AtomicPtr::new(default_tick_hook as *mut _);

/// Set a custom tick hook.
///
/// # Examples
///
/// ```
/// use core::sync::atomic::{AtomicUsize, Ordering};
///
/// static TICKS: AtomicUsize = AtomicUsize::new(0);
///
/// fn my_tick_hook() {
///   TICKS.fetch_add(1, Ordering::Relaxed);
/// }
///
/// rtos_kernel::set_tick_hook(my_tick_hook);
/// ```
pub fn set_tick_hook(f: fn()) {
  TICK_FUNCTION.store(f as *mut _, Ordering::Release);
}

fn default_tick_hook() {}

pub(crate) fn call_tick_hook() {
  let f: fn() = unsafe { mem::transmute(TICK_FUNCTION.load(Ordering::Acquire)) };
  f();
}

static IDLE_FUNCTION: AtomicPtr<()> = AtomicPtr::new(default_idle_hook as *mut _);

/// Set a custom idle hook, called on every pass of the idle task.
///
/// # Examples
///
/// ```
/// fn my_idle_hook() {
///   // ...
/// }
///
/// rtos_kernel::set_idle_hook(my_idle_hook);
/// ```
pub fn set_idle_hook(f: fn()) {
  IDLE_FUNCTION.store(f as *mut _, Ordering::Release);
}

fn default_idle_hook() {}

pub(crate) fn call_idle_hook() {
  let f: fn() = unsafe { mem::transmute(IDLE_FUNCTION.load(Ordering::Acquire)) };
  f();
}

static PRE_SLEEP_FUNCTION: AtomicPtr<()> = AtomicPtr::new(default_pre_sleep_hook as *mut _);

/// Set a hook called before the idle task stops the tick.
///
/// It receives the number of ticks the kernel expects to sleep and returns
/// how long to actually sleep. Returning 0 skips the sleep, e.g. when the
/// hook already put the processor to sleep itself.
pub fn set_pre_sleep_hook(f: fn(TickType) -> TickType) {
  PRE_SLEEP_FUNCTION.store(f as *mut _, Ordering::Release);
}

fn default_pre_sleep_hook(expected: TickType) -> TickType {
  expected
}

pub(crate) fn call_pre_sleep_hook(expected: TickType) -> TickType {
  let f: fn(TickType) -> TickType = unsafe { mem::transmute(PRE_SLEEP_FUNCTION.load(Ordering::Acquire)) };
  f(expected)
}

static POST_SLEEP_FUNCTION: AtomicPtr<()> = AtomicPtr::new(default_post_sleep_hook as *mut _);

/// Set a hook called with the number of ticks slept once the tick runs again.
pub fn set_post_sleep_hook(f: fn(TickType)) {
  POST_SLEEP_FUNCTION.store(f as *mut _, Ordering::Release);
}

fn default_post_sleep_hook(_: TickType) {}

pub(crate) fn call_post_sleep_hook(slept: TickType) {
  let f: fn(TickType) = unsafe { mem::transmute(POST_SLEEP_FUNCTION.load(Ordering::Acquire)) };
  f(slept)
}
