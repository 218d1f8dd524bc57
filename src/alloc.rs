//! The memory capability injected into a [`GrowableSparseSet`](crate::GrowableSparseSet).
//!
//! A growable set never touches the global heap directly. Instead it asks its [`Allocator`] for raw blocks, which lets
//! callers decide where the memory comes from (the global heap, an arena, a pool...).

#![allow(unsafe_code)]

use std::{
  alloc::{self as std_alloc, Layout},
  cmp, fmt,
  marker::PhantomData,
  mem,
  ptr::{self, NonNull},
};

use crate::error::{Error, Result};

/// The error returned by an [`Allocator`] that cannot satisfy a request.
#[derive(Clone, Copy, Debug, Default, Eq, PartialEq)]
pub struct AllocError;

impl fmt::Display for AllocError {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    f.write_str("memory allocation failed")
  }
}

impl std::error::Error for AllocError {}

/// An implementation of `Allocator` can allocate, grow, shrink, and deallocate arbitrary blocks of memory.
///
/// Sparse sets only ever request layouts with a non-zero size.
///
/// # Safety
///
/// Memory blocks returned from an allocator must point to valid memory of at least the requested size and alignment,
/// and must retain their validity until they are passed to [`deallocate`](Allocator::deallocate) or
/// [`reallocate`](Allocator::reallocate) on the same allocator (or a clone of it).
pub unsafe trait Allocator {
  /// Attempts to allocate a block of memory fitting `layout`.
  ///
  /// # Errors
  ///
  /// Returns [`AllocError`] if the memory cannot be provided.
  fn allocate(&self, layout: Layout) -> std::result::Result<NonNull<u8>, AllocError>;

  /// Deallocates the memory referenced by `ptr`.
  ///
  /// # Safety
  ///
  /// `ptr` must have been returned by this allocator with the given `layout`, and must not be used afterwards.
  unsafe fn deallocate(&self, ptr: NonNull<u8>, layout: Layout);

  /// Moves the block referenced by `ptr` into a block fitting `new_layout`, preserving the contents up to the smaller
  /// of both sizes.
  ///
  /// The default implementation allocates a new block, copies, and deallocates the old block.
  ///
  /// # Errors
  ///
  /// Returns [`AllocError`] if the memory cannot be provided, in which case the old block is still valid.
  ///
  /// # Safety
  ///
  /// `ptr` must have been returned by this allocator with `old_layout`, and both layouts must share the same alignment.
  unsafe fn reallocate(
    &self,
    ptr: NonNull<u8>,
    old_layout: Layout,
    new_layout: Layout,
  ) -> std::result::Result<NonNull<u8>, AllocError> {
    let new_ptr = self.allocate(new_layout)?;

    unsafe {
      ptr::copy_nonoverlapping(
        ptr.as_ptr(),
        new_ptr.as_ptr(),
        cmp::min(old_layout.size(), new_layout.size()),
      );
      self.deallocate(ptr, old_layout);
    }

    Ok(new_ptr)
  }
}

unsafe impl<A: Allocator + ?Sized> Allocator for &A {
  fn allocate(&self, layout: Layout) -> std::result::Result<NonNull<u8>, AllocError> {
    (**self).allocate(layout)
  }

  unsafe fn deallocate(&self, ptr: NonNull<u8>, layout: Layout) {
    unsafe { (**self).deallocate(ptr, layout) }
  }

  unsafe fn reallocate(
    &self,
    ptr: NonNull<u8>,
    old_layout: Layout,
    new_layout: Layout,
  ) -> std::result::Result<NonNull<u8>, AllocError> {
    unsafe { (**self).reallocate(ptr, old_layout, new_layout) }
  }
}

/// The global memory allocator, backed by whatever `#[global_allocator]` the program registered.
#[derive(Clone, Copy, Debug, Default, Eq, PartialEq)]
pub struct Global;

unsafe impl Allocator for Global {
  fn allocate(&self, layout: Layout) -> std::result::Result<NonNull<u8>, AllocError> {
    debug_assert!(layout.size() != 0);
    NonNull::new(unsafe { std_alloc::alloc(layout) }).ok_or(AllocError)
  }

  unsafe fn deallocate(&self, ptr: NonNull<u8>, layout: Layout) {
    unsafe { std_alloc::dealloc(ptr.as_ptr(), layout) }
  }

  unsafe fn reallocate(
    &self,
    ptr: NonNull<u8>,
    old_layout: Layout,
    new_layout: Layout,
  ) -> std::result::Result<NonNull<u8>, AllocError> {
    debug_assert_eq!(old_layout.align(), new_layout.align());
    debug_assert!(new_layout.size() != 0);
    NonNull::new(unsafe { std_alloc::realloc(ptr.as_ptr(), old_layout, new_layout.size()) }).ok_or(AllocError)
  }
}

/// A typed buffer of `capacity` slots obtained from an [`Allocator`].
///
/// The buffer does not own its allocator, and it does not track which slots are initialized. Its owner must pass the
/// same allocator to every call and must [`release`](RawBuf::release) the buffer before dropping it.
pub(crate) struct RawBuf<T> {
  capacity: usize,

  /// This can be dangling when `capacity` is 0, but it is always aligned.
  ptr: NonNull<T>,
  _marker: PhantomData<T>,
}

unsafe impl<T: Send> Send for RawBuf<T> {}
unsafe impl<T: Sync> Sync for RawBuf<T> {}

impl<T> RawBuf<T> {
  /// Constructs a buffer that owns no memory.
  pub(crate) const fn new() -> Self {
    Self {
      capacity: 0,
      ptr: NonNull::dangling(),
      _marker: PhantomData,
    }
  }

  pub(crate) fn capacity(&self) -> usize {
    self.capacity
  }

  pub(crate) fn as_ptr(&self) -> *const T {
    self.ptr.as_ptr()
  }

  pub(crate) fn as_mut_ptr(&mut self) -> *mut T {
    self.ptr.as_ptr()
  }

  /// Changes the capacity of the buffer to exactly `capacity` slots, preserving the contents of the slots that remain.
  ///
  /// A capacity of 0 releases the memory entirely.
  ///
  /// # Errors
  ///
  /// Returns an error if the layout overflows or the allocator fails, in which case the buffer is left untouched.
  pub(crate) fn resize<A: Allocator>(&mut self, alloc: &A, capacity: usize) -> Result<()> {
    debug_assert!(mem::size_of::<T>() != 0);

    if capacity == self.capacity {
      return Ok(());
    }

    if capacity == 0 {
      self.release(alloc);
      return Ok(());
    }

    let new_layout = Self::layout(capacity)?;
    let ptr = match self.current_memory() {
      None => alloc.allocate(new_layout),
      Some((ptr, old_layout)) => unsafe { alloc.reallocate(ptr, old_layout, new_layout) },
    }
    .map_err(|_| Error::Alloc { layout: new_layout })?;

    self.ptr = ptr.cast();
    self.capacity = capacity;
    Ok(())
  }

  /// Returns the memory to the allocator, if any is held.
  pub(crate) fn release<A: Allocator>(&mut self, alloc: &A) {
    if let Some((ptr, layout)) = self.current_memory() {
      unsafe { alloc.deallocate(ptr, layout) };
    }

    self.ptr = NonNull::dangling();
    self.capacity = 0;
  }

  /// Returns a pointer to the currently allocated memory, if any, and its layout.
  fn current_memory(&self) -> Option<(NonNull<u8>, Layout)> {
    if self.capacity == 0 {
      None
    } else {
      // The layout was valid when the memory was allocated, and it has not changed since.
      let layout = Layout::array::<T>(self.capacity).ok()?;
      Some((self.ptr.cast(), layout))
    }
  }

  /// Returns the layout of `capacity` slots.
  fn layout(capacity: usize) -> Result<Layout> {
    let layout = Layout::array::<T>(capacity).map_err(|_| Error::CapacityOverflow)?;
    alloc_guard(layout.size())?;
    Ok(layout)
  }
}

/// We need to guarantee the following:
/// * We don't ever allocate `> isize::MAX` byte-size objects.
/// * We don't overflow `usize::MAX` and actually allocate too little.
///
/// On 64-bit we just need to check for overflow since trying to allocate `> isize::MAX` bytes will surely fail. On
/// 32-bit and 16-bit we need to add an extra guard for this in case we're running on a platform which can use all 4GB
/// in user-space, e.g., PAE or x32.
fn alloc_guard(alloc_size: usize) -> Result<()> {
  if usize::BITS < 64 && alloc_size > isize::MAX as usize {
    Err(Error::CapacityOverflow)
  } else {
    Ok(())
  }
}

#[cfg(test)]
mod test {
  use coverage_helper::test;

  use super::*;

  /// An allocator that refuses every request.
  struct Exhausted;

  unsafe impl Allocator for Exhausted {
    fn allocate(&self, _: Layout) -> std::result::Result<NonNull<u8>, AllocError> {
      Err(AllocError)
    }

    unsafe fn deallocate(&self, _: NonNull<u8>, _: Layout) {
      unreachable!("nothing was ever allocated");
    }
  }

  #[test]
  fn test_new_holds_no_memory() {
    let buf: RawBuf<u32> = RawBuf::new();
    assert_eq!(buf.capacity(), 0);
  }

  #[test]
  fn test_resize_preserves_contents() {
    let mut buf: RawBuf<u32> = RawBuf::new();
    buf.resize(&Global, 4).unwrap();

    unsafe {
      for i in 0..4 {
        buf.as_mut_ptr().add(i).write(i as u32 * 10);
      }
    }

    buf.resize(&Global, 16).unwrap();
    assert_eq!(buf.capacity(), 16);
    assert_eq!(unsafe { *buf.as_ptr().add(3) }, 30);

    buf.resize(&Global, 2).unwrap();
    assert_eq!(buf.capacity(), 2);
    assert_eq!(unsafe { *buf.as_ptr().add(1) }, 10);
    buf.release(&Global);
  }

  #[test]
  fn test_resize_to_zero_releases() {
    let mut buf: RawBuf<u64> = RawBuf::new();
    buf.resize(&Global, 8).unwrap();
    buf.resize(&Global, 0).unwrap();
    assert_eq!(buf.capacity(), 0);
  }

  #[test]
  fn test_resize_overflow() {
    let mut buf: RawBuf<u64> = RawBuf::new();
    assert_eq!(buf.resize(&Global, usize::MAX), Err(Error::CapacityOverflow));
    assert_eq!(buf.capacity(), 0);
  }

  #[test]
  fn test_resize_reports_alloc_error() {
    let mut buf: RawBuf<u16> = RawBuf::new();
    assert_eq!(
      buf.resize(&Exhausted, 3),
      Err(Error::Alloc {
        layout: Layout::array::<u16>(3).unwrap()
      })
    );
    assert_eq!(buf.capacity(), 0);
  }

  #[test]
  fn test_default_reallocate_copies() {
    struct Copying;

    unsafe impl Allocator for Copying {
      fn allocate(&self, layout: Layout) -> std::result::Result<NonNull<u8>, AllocError> {
        Global.allocate(layout)
      }

      unsafe fn deallocate(&self, ptr: NonNull<u8>, layout: Layout) {
        unsafe { Global.deallocate(ptr, layout) }
      }
    }

    let mut buf: RawBuf<u8> = RawBuf::new();
    buf.resize(&Copying, 2).unwrap();
    unsafe {
      buf.as_mut_ptr().write(7);
      buf.as_mut_ptr().add(1).write(9);
    }

    buf.resize(&Copying, 5).unwrap();
    assert_eq!(unsafe { *buf.as_ptr().add(1) }, 9);
    buf.release(&Copying);
  }

  #[test]
  fn test_alloc_error_display() {
    assert_eq!(AllocError.to_string(), "memory allocation failed");
  }
}
