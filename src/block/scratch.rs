//! Shared scratch memory of a lane group.
//!
//! One arena backs every phase of a block sort: the ranking counters, the key exchange and
//! the value exchange all reinterpret the same bytes. Phases never overlap in time, the
//! barriers between them are what makes the reuse sound. Views are typed per phase and only
//! hand out raw reads and writes, the caller upholds the barrier discipline.

use std::{cell::UnsafeCell, marker::PhantomData, mem};

use bytemuck::{Pod, Zeroable};

/// Backing word of the arena. 16 byte alignment covers every key and value type we exchange.
#[derive(Clone, Copy, Pod, Zeroable)]
#[repr(C, align(16))]
struct Word([u8; 16]);

const WORD_BYTES: usize = mem::size_of::<Word>();

/// Scratch arena shared by every lane of one group.
pub struct TempStorage {
    words: Box<[UnsafeCell<Word>]>,
}

// SAFETY: lanes only access the arena through `ScratchView`, whose unsafe read/write methods
// require that no two lanes touch the same element between two barriers unless both only read.
unsafe impl Sync for TempStorage {}

impl TempStorage {
    pub fn with_bytes(bytes: usize) -> Self {
        let words = bytes.div_ceil(WORD_BYTES).max(1);
        Self {
            words: (0..words).map(|_| UnsafeCell::new(Word::zeroed())).collect(),
        }
    }

    #[inline(always)]
    pub fn bytes(&self) -> usize {
        self.words.len() * WORD_BYTES
    }

    /// Grows the arena so it holds at least `bytes`. Existing contents are not preserved.
    pub fn reserve(&mut self, bytes: usize) {
        if self.bytes() < bytes {
            *self = Self::with_bytes(bytes);
        }
    }

    /// Reinterprets the start of the arena as `len` elements of `T`.
    ///
    /// Panics if the arena is too small.
    #[inline(always)]
    pub(crate) fn view<T: Pod>(&self, len: usize) -> ScratchView<'_, T> {
        self.view_at(0, len)
    }

    /// Reinterprets `len` elements of `T` starting `offset` elements of `T` into the arena.
    #[inline(always)]
    pub(crate) fn view_at<T: Pod>(&self, offset: usize, len: usize) -> ScratchView<'_, T> {
        assert!(mem::align_of::<T>() <= mem::align_of::<Word>());
        assert!(
            (offset + len) * mem::size_of::<T>() <= self.bytes(),
            "scratch of {} bytes cannot hold {} elements of {} bytes",
            self.bytes(),
            offset + len,
            mem::size_of::<T>()
        );
        let base = UnsafeCell::raw_get(self.words.as_ptr()).cast::<T>();
        ScratchView {
            // SAFETY: in bounds, checked above
            ptr: unsafe { base.add(offset) },
            len,
            _storage: PhantomData,
        }
    }
}

/// A typed window into `TempStorage` for the duration of one phase.
#[derive(Clone, Copy)]
pub(crate) struct ScratchView<'s, T> {
    ptr: *mut T,
    len: usize,
    _storage: PhantomData<&'s TempStorage>,
}

// SAFETY: see `TempStorage`, the view is only a typed pointer into the shared arena
unsafe impl<T: Pod> Send for ScratchView<'_, T> {}
unsafe impl<T: Pod> Sync for ScratchView<'_, T> {}

impl<T: Pod> ScratchView<'_, T> {
    #[inline(always)]
    pub fn len(&self) -> usize {
        self.len
    }

    /// # Safety
    /// No other lane may read or write `index` until the group passes its next barrier.
    #[inline(always)]
    pub unsafe fn write(&self, index: usize, value: T) {
        debug_assert!(index < self.len());
        self.ptr.add(index).write(value)
    }

    /// # Safety
    /// No lane may write `index` until the group passes its next barrier, and the last write to
    /// it must have happened before a barrier this lane has since passed (or on this lane).
    #[inline(always)]
    pub unsafe fn read(&self, index: usize) -> T {
        debug_assert!(index < self.len());
        self.ptr.add(index).read()
    }
}
