use core::cell::UnsafeCell;
use core::fmt;
use core::ops::{Deref, DerefMut};

use crate::kernel::QueueId;
use crate::lazy_init::LazyId;
use crate::task::TaskHandle;
use crate::{rt, RtosError, Ticks};

macro_rules! guard_impl_deref_mut {
  (MutexGuard) => {
    impl<T: ?Sized> DerefMut for MutexGuard<'_, T> {
      /// Mutably dereferences the locked value.
      fn deref_mut(&mut self) -> &mut T {
        unsafe { &mut *self.mutex.data.get() }
      }
    }
  };
  ($guard:ident) => {};
}

macro_rules! guard_deref_mut_doc {
  (MutexGuard) => { " and [`DerefMut`]" };
  ($guard:ident) => { "" };
}

macro_rules! impl_mutex {
  (
    $(#[$attr:meta])*
    $mutex:ident,
    $guard:ident,
    $create:ident,
    $variant_name:literal,
  ) => {
    $(#[$attr])*
    pub struct $mutex<T: ?Sized> {
      id: LazyId<QueueId>,
      data: UnsafeCell<T>,
    }

    unsafe impl<T: ?Sized + Send> Send for $mutex<T> {}
    unsafe impl<T: ?Sized + Send> Sync for $mutex<T> {}

    impl<T> $mutex<T> {
      #[doc = concat!("Create a new ", $variant_name, " with the given inner value.")]
      pub const fn new(data: T) -> Self {
        Self { id: LazyId::new(), data: UnsafeCell::new(data) }
      }

      /// Consume the mutex and return its inner value.
      pub fn into_inner(self) -> T {
        let mut this = core::mem::ManuallyDrop::new(self);
        if let Some(id) = this.id.take() {
          let _ = rt::with(|kernel| kernel.delete_queue(id));
        }
        // `this` is never dropped, so the value is moved out exactly once.
        unsafe { core::ptr::read(this.data.get()) }
      }
    }

    impl<T: ?Sized> $mutex<T> {
      fn id(&self) -> Result<QueueId, RtosError> {
        self.id.get_or_create(|kernel| kernel.$create())
      }

      #[doc = concat!("Lock the ", $variant_name, ", waiting for as long as it takes.")]
      pub fn lock(&self) -> Result<$guard<'_, T>, RtosError> {
        self.timed_lock(Ticks::MAX)
      }

      #[doc = concat!("Lock the ", $variant_name, " if it is free right now.")]
      pub fn try_lock(&self) -> Result<$guard<'_, T>, RtosError> {
        self.timed_lock(Ticks::ZERO)
      }

      #[doc = concat!("Lock the ", $variant_name, ", waiting at most `timeout`.")]
      ///
      /// While waiting, the calling task lends its priority to the holder.
      pub fn timed_lock(&self, timeout: impl Into<Ticks>) -> Result<$guard<'_, T>, RtosError> {
        let id = self.id()?;
        rt::block_on(timeout, |kernel, wait| kernel.take(id, wait))?;
        Ok($guard { mutex: self })
      }

      /// The task currently holding the lock.
      pub fn holder(&self) -> Result<Option<TaskHandle>, RtosError> {
        let id = self.id()?;
        let holder = rt::with_isr(|kernel| kernel.mutex_holder(id))??;
        Ok(holder.map(TaskHandle::from_id))
      }

      /// Mutable access without locking, as `&mut self` proves exclusivity.
      pub fn get_mut(&mut self) -> &mut T {
        self.data.get_mut()
      }
    }

    impl<T: ?Sized> Drop for $mutex<T> {
      fn drop(&mut self) {
        if let Some(id) = self.id.take() {
          let _ = rt::with(|kernel| kernel.delete_queue(id));
        }
      }
    }

    impl<T: ?Sized + fmt::Debug> fmt::Debug for $mutex<T> {
      fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        let mut d = f.debug_struct(stringify!($mutex));
        match self.try_lock() {
          Ok(guard) => d.field("data", &&*guard),
          Err(_) => d.field("data", &format_args!("<locked>")),
        };
        d.finish_non_exhaustive()
      }
    }

    #[doc = concat!("An RAII implementation of a “scoped lock” of a ", $variant_name, ".")]
    ///
    /// When this structure is dropped (falls out of scope), the lock will be unlocked.
    ///
    #[doc = concat!("The data protected by the mutex can be accessed through this guard via its [`Deref`]",
      guard_deref_mut_doc!($guard), " implementations.")]
    #[must_use = "if unused the mutex will immediately unlock"]
    pub struct $guard<'m, T: ?Sized> {
      mutex: &'m $mutex<T>,
    }

    unsafe impl<T: ?Sized + Sync> Sync for $guard<'_, T> {}

    impl<T: ?Sized> Deref for $guard<'_, T> {
      type Target = T;

      /// Dereferences the locked value.
      #[inline]
      fn deref(&self) -> &T {
        unsafe { &*self.mutex.data.get() }
      }
    }

    guard_impl_deref_mut!($guard);

    impl<T: ?Sized + fmt::Debug> fmt::Debug for $guard<'_, T> {
      fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Debug::fmt(&**self, f)
      }
    }

    impl<T: ?Sized> Drop for $guard<'_, T> {
      /// Unlocks the mutex.
      #[inline]
      fn drop(&mut self) {
        if let Some(id) = self.mutex.id.get() {
          let _ = rt::with(|kernel| kernel.give(id));
        }
      }
    }
  };
}

impl_mutex!(
  /// A mutual exclusion primitive useful for protecting shared data.
  ///
  /// Unlike a binary semaphore, a mutex has an owner: only the locking task
  /// may unlock it, and a higher priority task waiting for it raises the
  /// owner's priority until it unlocks.
  ///
  /// ```no_run
  /// use rtos_kernel::sync::Mutex;
  ///
  /// static M: Mutex<u32> = Mutex::new(16);
  ///
  /// *M.lock().unwrap() += 1;
  /// assert_eq!(*M.lock().unwrap(), 17);
  /// ```
  Mutex,
  MutexGuard,
  create_mutex,
  "mutex",
);

impl_mutex!(
  /// A mutex the holding task can lock again, unlocked once every guard is
  /// dropped.
  ///
  /// Guards only hand out shared references, since several may exist at once.
  RecursiveMutex,
  RecursiveMutexGuard,
  create_recursive_mutex,
  "recursive mutex",
);
