//! Fixed-capacity slot tables with generation-checked handles.

use core::fmt;
use core::marker::PhantomData;

use alloc2::vec::Vec;

use crate::RtosError;

/// A slot index paired with the generation of the object stored in it.
///
/// Generations start at 1, so [`RawHandle::to_bits`] never returns 0.
#[derive(Clone, Copy, PartialEq, Eq, Hash)]
pub struct RawHandle {
  index: u16,
  generation: u16,
}

impl RawHandle {
  #[inline]
  pub const fn to_bits(self) -> u32 {
    (self.generation as u32) << 16 | self.index as u32
  }

  #[inline]
  pub const fn from_bits(bits: u32) -> Option<Self> {
    let generation = (bits >> 16) as u16;
    if generation == 0 {
      return None
    }

    Some(Self { index: bits as u16, generation })
  }

  #[inline]
  pub const fn index(self) -> usize {
    self.index as usize
  }
}

impl fmt::Debug for RawHandle {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    write!(f, "{}v{}", self.index, self.generation)
  }
}

/// A typed handle into a [`Pool`].
pub trait PoolId: Copy {
  fn from_raw(raw: RawHandle) -> Self;
  fn raw(self) -> RawHandle;
}

macro_rules! pool_id {
  ($(#[$attr:meta])* $name:ident) => {
    $(#[$attr])*
    #[derive(Clone, Copy, PartialEq, Eq, Hash)]
    #[repr(transparent)]
    pub struct $name($crate::kernel::pool::RawHandle);

    impl $crate::kernel::pool::PoolId for $name {
      #[inline]
      fn from_raw(raw: $crate::kernel::pool::RawHandle) -> Self {
        Self(raw)
      }

      #[inline]
      fn raw(self) -> $crate::kernel::pool::RawHandle {
        self.0
      }
    }

    impl $name {
      /// Encode this handle as a non-zero integer.
      #[inline]
      pub const fn to_bits(self) -> u32 {
        self.0.to_bits()
      }

      /// Decode a handle produced by [`to_bits`](Self::to_bits).
      #[inline]
      pub const fn from_bits(bits: u32) -> Option<Self> {
        match $crate::kernel::pool::RawHandle::from_bits(bits) {
          Some(raw) => Some(Self(raw)),
          None => None,
        }
      }
    }

    impl core::fmt::Debug for $name {
      fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        write!(f, concat!(stringify!($name), "({:?})"), self.0)
      }
    }
  };
}
pub(crate) use pool_id;

struct Slot<T> {
  generation: u16,
  value: Option<T>,
}

/// A slot table holding at most `capacity` values.
pub struct Pool<I, T> {
  slots: Vec<Slot<T>>,
  free: Vec<u16>,
  capacity: usize,
  len: usize,
  _id: PhantomData<I>,
}

impl<I: PoolId, T> Pool<I, T> {
  pub fn new(capacity: usize) -> Self {
    Self {
      slots: Vec::new(),
      free: Vec::new(),
      capacity: capacity.min(u16::MAX as usize),
      len: 0,
      _id: PhantomData,
    }
  }

  #[inline]
  pub fn len(&self) -> usize {
    self.len
  }

  /// Store `value`, failing with [`RtosError::ResourceExhausted`] when full.
  pub fn insert(&mut self, value: T) -> Result<I, RtosError> {
    self.insert_with(|_| value)
  }

  /// Store the value built by `f`, which gets to know its own handle.
  pub fn insert_with(&mut self, f: impl FnOnce(I) -> T) -> Result<I, RtosError> {
    if self.len >= self.capacity {
      return Err(RtosError::ResourceExhausted)
    }

    let index = match self.free.pop() {
      Some(index) => index,
      None => {
        self.slots.try_reserve(1).map_err(|_| RtosError::ResourceExhausted)?;
        self.slots.push(Slot { generation: 1, value: None });
        (self.slots.len() - 1) as u16
      },
    };

    let slot = &mut self.slots[index as usize];
    let id = I::from_raw(RawHandle { index, generation: slot.generation });
    slot.value = Some(f(id));
    self.len += 1;

    Ok(id)
  }

  #[inline]
  pub fn is_full(&self) -> bool {
    self.len >= self.capacity
  }

  pub fn get(&self, id: I) -> Result<&T, RtosError> {
    let raw = id.raw();
    self.slots
      .get(raw.index())
      .filter(|slot| slot.generation == raw.generation)
      .and_then(|slot| slot.value.as_ref())
      .ok_or(RtosError::InvalidHandle)
  }

  pub fn get_mut(&mut self, id: I) -> Result<&mut T, RtosError> {
    let raw = id.raw();
    self.slots
      .get_mut(raw.index())
      .filter(|slot| slot.generation == raw.generation)
      .and_then(|slot| slot.value.as_mut())
      .ok_or(RtosError::InvalidHandle)
  }

  /// Take the value out of its slot.
  ///
  /// Removing with a handle whose value was already removed is reported as
  /// [`RtosError::OwnershipViolation`].
  pub fn remove(&mut self, id: I) -> Result<T, RtosError> {
    let raw = id.raw();
    let slot = self.slots.get_mut(raw.index()).ok_or(RtosError::InvalidHandle)?;
    if slot.generation != raw.generation || slot.value.is_none() {
      return Err(RtosError::OwnershipViolation)
    }

    let value = slot.value.take();
    slot.generation = match slot.generation.wrapping_add(1) {
      0 => 1,
      generation => generation,
    };
    self.free.push(raw.index);
    self.len -= 1;

    value.ok_or(RtosError::OwnershipViolation)
  }

  /// Iterate over live values in slot order.
  pub fn iter(&self) -> impl Iterator<Item = (I, &T)> + '_ {
    self.slots.iter().enumerate().filter_map(|(index, slot)| {
      let raw = RawHandle { index: index as u16, generation: slot.generation };
      slot.value.as_ref().map(|value| (I::from_raw(raw), value))
    })
  }

  /// Handles of all live values in slot order.
  pub fn ids(&self) -> Vec<I> {
    self.iter().map(|(id, _)| id).collect()
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  pool_id!(TestId);

  #[test]
  fn full_pool_is_exhausted() {
    let mut pool = Pool::<TestId, u8>::new(2);
    pool.insert(1).unwrap();
    pool.insert(2).unwrap();
    assert_eq!(pool.insert(3), Err(RtosError::ResourceExhausted));
  }

  #[test]
  fn stale_handles_are_rejected() {
    let mut pool = Pool::<TestId, u8>::new(2);
    let a = pool.insert(1).unwrap();
    assert_eq!(pool.remove(a), Ok(1));

    assert_eq!(pool.get(a), Err(RtosError::InvalidHandle));
    assert_eq!(pool.remove(a), Err(RtosError::OwnershipViolation));

    let b = pool.insert(2).unwrap();
    assert_eq!(a.raw().index(), b.raw().index());
    assert_ne!(a, b);
    assert_eq!(pool.get(b), Ok(&2));
  }

  #[test]
  fn bits_round_trip_and_are_never_zero() {
    let mut pool = Pool::<TestId, u8>::new(1);
    let a = pool.insert(7).unwrap();
    assert_ne!(a.to_bits(), 0);
    assert_eq!(TestId::from_bits(a.to_bits()), Some(a));
    assert_eq!(TestId::from_bits(0), None);
  }
}
