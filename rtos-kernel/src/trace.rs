//! Trace points.
//!
//! The kernel calls these at its key transitions. They forward to the [`log`]
//! facade, one target per area, so a logger can filter e.g. only
//! `rtos_kernel::queue`. With no logger installed they cost a single
//! relaxed load.

use crate::config::TickType;
use crate::kernel::{EventGroupId, QueueId, TaskId, TimerId};

#[inline(always)]
pub fn task_create(task: TaskId, name: &str, priority: u8) {
  log::debug!(target: "rtos_kernel::task", "create {:?} '{}' priority {}", task, name, priority);
}

#[inline(always)]
pub fn task_delete(task: TaskId) {
  log::debug!(target: "rtos_kernel::task", "delete {:?}", task);
}

#[inline(always)]
pub fn task_switched_in(from: Option<TaskId>, to: TaskId) {
  log::trace!(target: "rtos_kernel::sched", "switch {:?} -> {:?}", from, to);
}

#[inline(always)]
pub fn task_delay(task: TaskId, wake_at: TickType) {
  log::trace!(target: "rtos_kernel::sched", "{:?} delayed until tick {}", task, wake_at);
}

#[inline(always)]
pub fn task_suspend(task: TaskId) {
  log::trace!(target: "rtos_kernel::task", "suspend {:?}", task);
}

#[inline(always)]
pub fn task_resume(task: TaskId) {
  log::trace!(target: "rtos_kernel::task", "resume {:?}", task);
}

#[inline(always)]
pub fn task_priority_set(task: TaskId, from: u8, to: u8) {
  log::trace!(target: "rtos_kernel::task", "{:?} priority {} -> {}", task, from, to);
}

#[inline(always)]
pub fn priority_inherit(holder: TaskId, priority: u8) {
  log::debug!(target: "rtos_kernel::mutex", "{:?} inherits priority {}", holder, priority);
}

#[inline(always)]
pub fn priority_disinherit(holder: TaskId, priority: u8) {
  log::debug!(target: "rtos_kernel::mutex", "{:?} back to priority {}", holder, priority);
}

#[inline(always)]
pub fn tick_overflow(overflow_count: u32) {
  log::debug!(target: "rtos_kernel::sched", "tick counter wrapped ({} times)", overflow_count);
}

#[inline(always)]
pub fn queue_create(queue: QueueId, capacity: usize, item_size: usize) {
  log::debug!(target: "rtos_kernel::queue", "create {:?} {}x{}", queue, capacity, item_size);
}

#[inline(always)]
pub fn queue_delete(queue: QueueId) {
  log::debug!(target: "rtos_kernel::queue", "delete {:?}", queue);
}

#[inline(always)]
pub fn blocking_on_queue_send(queue: QueueId, task: TaskId) {
  log::trace!(target: "rtos_kernel::queue", "{:?} blocks sending to {:?}", task, queue);
}

#[inline(always)]
pub fn blocking_on_queue_receive(queue: QueueId, task: TaskId) {
  log::trace!(target: "rtos_kernel::queue", "{:?} blocks receiving from {:?}", task, queue);
}

#[inline(always)]
pub fn queue_send_failed(queue: QueueId) {
  log::trace!(target: "rtos_kernel::queue", "send to {:?} failed", queue);
}

#[inline(always)]
pub fn queue_receive_failed(queue: QueueId) {
  log::trace!(target: "rtos_kernel::queue", "receive from {:?} failed", queue);
}

#[inline(always)]
pub fn event_group_set_bits(group: EventGroupId, bits: u32) {
  log::trace!(target: "rtos_kernel::event_group", "{:?} set {:#x}", group, bits);
}

#[inline(always)]
pub fn event_group_wait_block(group: EventGroupId, task: TaskId, mask: u32) {
  log::trace!(target: "rtos_kernel::event_group", "{:?} waits on {:?} for {:#x}", task, group, mask);
}

#[inline(always)]
pub fn task_notify(task: TaskId, value: u32) {
  log::trace!(target: "rtos_kernel::notify", "notify {:?} value {:#x}", task, value);
}

#[inline(always)]
pub fn timer_command(timer: TimerId, command: &str) {
  log::trace!(target: "rtos_kernel::timer", "{} {:?}", command, timer);
}

#[inline(always)]
pub fn timer_expired(timer: TimerId, now: TickType) {
  log::trace!(target: "rtos_kernel::timer", "{:?} expired at tick {}", timer, now);
}

#[inline(always)]
pub fn low_power_idle_begin(expected: TickType) {
  log::trace!(target: "rtos_kernel::idle", "sleep for up to {} ticks", expected);
}

#[inline(always)]
pub fn low_power_idle_end(slept: TickType) {
  log::trace!(target: "rtos_kernel::idle", "woke after {} ticks", slept);
}

#[inline(always)]
pub fn stack_overflow(task: TaskId, name: &str) {
  log::error!(target: "rtos_kernel::task", "{:?} '{}' overflowed its stack", task, name);
}
