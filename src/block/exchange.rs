//! Moving items between lanes through shared scratch.
//!
//! Every exchange is a scatter into scratch, a barrier, then a gather back into the lanes'
//! local arrays. Exchanges do not start with a barrier: the caller must make sure nobody is
//! still reading the scratch region from a previous phase.

use std::{marker::PhantomData, mem};

use bytemuck::Pod;

use crate::block::{group::Lane, scratch::TempStorage, Arrangement};

pub struct BlockExchange<'s, T, const THREADS: usize, const ITEMS_PER_THREAD: usize> {
    storage: &'s TempStorage,
    lane: Lane<'s>,
    _items: PhantomData<T>,
}

impl<'s, T: Pod, const THREADS: usize, const ITEMS_PER_THREAD: usize>
    BlockExchange<'s, T, THREADS, ITEMS_PER_THREAD>
{
    const ITEMS: usize = THREADS * ITEMS_PER_THREAD;

    pub const TEMP_STORAGE_BYTES: usize = Self::ITEMS * mem::size_of::<T>();

    #[inline(always)]
    pub fn new(storage: &'s TempStorage, lane: Lane<'s>) -> Self {
        debug_assert_eq!(lane.threads(), THREADS);
        Self {
            storage,
            lane,
            _items: PhantomData,
        }
    }

    /// Places item `i` at logical position `ranks[i]` in blocked arrangement.
    #[inline]
    pub fn scatter_to_blocked(
        &self,
        items: &mut [T; ITEMS_PER_THREAD],
        ranks: &[usize; ITEMS_PER_THREAD],
    ) {
        self.scatter(items, ranks, Arrangement::Blocked)
    }

    /// Places item `i` at logical position `ranks[i]` in striped arrangement.
    #[inline]
    pub fn scatter_to_striped(
        &self,
        items: &mut [T; ITEMS_PER_THREAD],
        ranks: &[usize; ITEMS_PER_THREAD],
    ) {
        self.scatter(items, ranks, Arrangement::Striped)
    }

    /// Ranks must be a permutation of `0..THREADS * ITEMS_PER_THREAD` across the group.
    pub fn scatter(
        &self,
        items: &mut [T; ITEMS_PER_THREAD],
        ranks: &[usize; ITEMS_PER_THREAD],
        arrangement: Arrangement,
    ) {
        crate::scope!("scatter");
        let buffer = self.storage.view::<T>(Self::ITEMS);
        for i in 0..ITEMS_PER_THREAD {
            debug_assert!(ranks[i] < Self::ITEMS);
            // SAFETY: ranks are a permutation, no two lanes write the same position
            unsafe { buffer.write(ranks[i], items[i]) };
        }

        self.lane.sync();

        self.gather(items, arrangement);
    }

    /// Transposes blocked items into striped arrangement, keeping the logical order.
    pub fn blocked_to_striped(&self, items: &mut [T; ITEMS_PER_THREAD]) {
        let buffer = self.storage.view::<T>(Self::ITEMS);
        let base = self.lane.linear_tid() * ITEMS_PER_THREAD;
        for i in 0..ITEMS_PER_THREAD {
            unsafe { buffer.write(base + i, items[i]) };
        }

        self.lane.sync();

        self.gather(items, Arrangement::Striped);
    }

    /// Transposes striped items into blocked arrangement, keeping the logical order.
    pub fn striped_to_blocked(&self, items: &mut [T; ITEMS_PER_THREAD]) {
        let buffer = self.storage.view::<T>(Self::ITEMS);
        let tid = self.lane.linear_tid();
        for i in 0..ITEMS_PER_THREAD {
            unsafe { buffer.write(i * THREADS + tid, items[i]) };
        }

        self.lane.sync();

        self.gather(items, Arrangement::Blocked);
    }

    #[inline(always)]
    fn gather(&self, items: &mut [T; ITEMS_PER_THREAD], arrangement: Arrangement) {
        let buffer = self.storage.view::<T>(Self::ITEMS);
        let tid = self.lane.linear_tid();
        for i in 0..ITEMS_PER_THREAD {
            let position = arrangement.position::<THREADS, ITEMS_PER_THREAD>(tid, i);
            // SAFETY: every write to scratch happened before the barrier we just passed
            items[i] = unsafe { buffer.read(position) };
        }
    }
}
