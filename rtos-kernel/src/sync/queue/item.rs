use core::mem::{size_of, MaybeUninit};
use core::slice;

use crate::RtosError;

/// A type that can be sent through a [`Queue`](super::Queue) as raw bytes.
///
/// # Safety
///
/// Queues copy items as byte slices, so an implementor must have no padding
/// bytes and every byte pattern of its size must be a valid value. This
/// holds for integers, floats and arrays of them, and for `#[repr(C)]`
/// structs built from such fields without gaps.
pub unsafe trait QueueItem: Copy {}

macro_rules! impl_queue_item {
  ($($ty:ty),* $(,)?) => {
    $(unsafe impl QueueItem for $ty {})*
  };
}

impl_queue_item!(u8, u16, u32, u64, u128, usize, i8, i16, i32, i64, i128, isize, f32, f64, ());

unsafe impl<T: QueueItem, const N: usize> QueueItem for [T; N] {}

/// The bytes of `item` as they are copied into a queue.
#[inline]
pub(super) fn item_bytes<T: QueueItem>(item: &T) -> &[u8] {
  // SAFETY: `QueueItem` types have no padding, so every byte is initialized.
  unsafe { slice::from_raw_parts((item as *const T).cast::<u8>(), size_of::<T>()) }
}

/// Run `read` on a zeroed buffer the size of `T`, returning it as a `T` if
/// `read` succeeds.
#[inline]
pub(super) fn read_item<T: QueueItem>(read: impl FnOnce(&mut [u8]) -> Result<(), RtosError>) -> Result<T, RtosError> {
  let mut item = MaybeUninit::<T>::zeroed();
  // SAFETY: The zeroed buffer is initialized and exactly one `T` long.
  let bytes = unsafe { slice::from_raw_parts_mut(item.as_mut_ptr().cast::<u8>(), size_of::<T>()) };
  read(bytes)?;
  // SAFETY: Any bytes are a valid `QueueItem`.
  Ok(unsafe { item.assume_init() })
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn items_are_copied_bytewise() {
    let value = [3u16, 0xbeef];
    assert_eq!(item_bytes(&value).len(), 4);

    let copied: [u16; 2] = read_item(|out| {
      out.copy_from_slice(item_bytes(&value));
      Ok(())
    })
    .unwrap();
    assert_eq!(copied, value);
  }

  #[test]
  fn failed_reads_return_the_error() {
    assert_eq!(read_item::<u32>(|_| Err(RtosError::Timeout)), Err(RtosError::Timeout));
  }

  #[test]
  fn empty_items_have_no_bytes() {
    assert!(item_bytes(&()).is_empty());
    assert_eq!(read_item::<()>(|out| {
      assert!(out.is_empty());
      Ok(())
    }), Ok(()));
  }
}
