//! Stable digit ranking across a lane group.
//!
//! Ranking is a counting sort on one digit of the encoded keys. Counters live in scratch as a
//! digit-major grid, `counters[digit * THREADS + lane]`, so that an exclusive prefix sum over
//! the flat grid yields, for each (digit, lane) pair, the rank of that lane's first item with
//! that digit. Items are in blocked arrangement, so lane-major then slot order is input order
//! and the ranks come out stable.

use std::mem;

use crate::{
    block::{group::Lane, scratch::TempStorage},
    radix::key::UnsignedBits,
};

pub struct BlockRadixRank<
    's,
    const THREADS: usize,
    const ITEMS_PER_THREAD: usize,
    const RADIX_BITS: u32,
> {
    storage: &'s TempStorage,
    lane: Lane<'s>,
}

impl<'s, const THREADS: usize, const ITEMS_PER_THREAD: usize, const RADIX_BITS: u32>
    BlockRadixRank<'s, THREADS, ITEMS_PER_THREAD, RADIX_BITS>
{
    pub const RADIX_DIGITS: usize = 1 << RADIX_BITS;

    const COUNTERS: usize = Self::RADIX_DIGITS * THREADS;

    /// Counter grid plus one segment total per lane.
    pub const TEMP_STORAGE_BYTES: usize = (Self::COUNTERS + THREADS) * mem::size_of::<u32>();

    const VALID_RADIX_BITS: () = assert!(
        RADIX_BITS >= 1 && RADIX_BITS <= 8,
        "RADIX_BITS must be within 1..=8"
    );

    #[inline(always)]
    pub fn new(storage: &'s TempStorage, lane: Lane<'s>) -> Self {
        #[allow(clippy::let_unit_value)]
        let () = Self::VALID_RADIX_BITS;
        debug_assert_eq!(lane.threads(), THREADS);
        Self { storage, lane }
    }

    /// Ranks this lane's keys on the digit `[begin_bit, begin_bit + pass_bits)`.
    ///
    /// Every lane of the group must call this together. Ranks over the whole group form a
    /// permutation of `0..THREADS * ITEMS_PER_THREAD`. Equal digits keep their input order,
    /// `DESCENDING` only reverses the order of the digit values.
    ///
    /// Scratch is left in use: the caller must pass a barrier before reusing it.
    pub fn rank_keys<B: UnsignedBits, const DESCENDING: bool>(
        &self,
        keys: &[B; ITEMS_PER_THREAD],
        ranks: &mut [usize; ITEMS_PER_THREAD],
        begin_bit: u32,
        pass_bits: u32,
    ) {
        crate::scope!("rank_keys");
        debug_assert!(pass_bits <= RADIX_BITS);
        let tid = self.lane.linear_tid();
        let digits = Self::RADIX_DIGITS;
        let counters = self.storage.view::<u32>(Self::COUNTERS + THREADS);

        // Column `tid` of the grid belongs to this lane until the next barrier
        let mut slots = [0usize; ITEMS_PER_THREAD];
        let mut offsets = [0u32; ITEMS_PER_THREAD];
        unsafe {
            for digit in 0..digits {
                counters.write(digit * THREADS + tid, 0);
            }
            for i in 0..ITEMS_PER_THREAD {
                let mut digit = keys[i].digit(begin_bit, pass_bits);
                if DESCENDING {
                    digit = digits - 1 - digit;
                }
                let slot = digit * THREADS + tid;
                let count = counters.read(slot);
                counters.write(slot, count + 1);
                slots[i] = slot;
                offsets[i] = count;
            }
        }

        self.lane.sync();

        // Raking scan: lane `tid` owns the flat segment [tid * digits, (tid + 1) * digits)
        let segment = tid * digits..(tid + 1) * digits;
        unsafe {
            let total: u32 = segment.clone().map(|j| counters.read(j)).sum();
            counters.write(Self::COUNTERS + tid, total);
        }

        self.lane.sync();

        unsafe {
            let mut running: u32 = (0..tid).map(|t| counters.read(Self::COUNTERS + t)).sum();
            for j in segment {
                let count = counters.read(j);
                counters.write(j, running);
                running += count;
            }
        }

        self.lane.sync();

        for i in 0..ITEMS_PER_THREAD {
            ranks[i] = unsafe { counters.read(slots[i]) } as usize + offsets[i] as usize;
        }
    }
}
