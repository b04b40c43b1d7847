//! Block-wide radix sort.
//!
//! Each lane of a [`ThreadGroup`](crate::block::group::ThreadGroup) holds `ITEMS_PER_THREAD`
//! keys (and optionally values) in blocked arrangement. Together the lanes sort all
//! `THREADS * ITEMS_PER_THREAD` items, least significant digit first, with one stable ranking
//! and one exchange through shared scratch per `RADIX_BITS` wide digit.
//!
//! Scratch is shared by the ranking counters, the key exchange and the value exchange. Between
//! any two of these phases every lane passes a barrier, which is what keeps the aliasing sound.

use std::{marker::PhantomData, mem, ops::RangeBounds};

use bytemuck::Pod;

use crate::{
    block::{
        exchange::BlockExchange, group::Lane, rank::BlockRadixRank, scratch::TempStorage,
        Arrangement,
    },
    radix::key::{bit_window, is_full_window, key_bits, NullType, RadixKey},
};

/// Per-lane handle onto a block radix sort.
///
/// Every lane of the group constructs its own handle over the same [`TempStorage`] and all
/// lanes must call the same sort method with the same bit range. Calls that reuse one
/// `TempStorage` must be separated by a [`Lane::sync`].
///
/// `V` defaults to [`NullType`], a keys-only sort. Partial bit ranges are only meaningful for
/// unsigned keys; for signed and floating point keys the range must cover the whole key.
pub struct BlockRadixSort<
    's,
    K,
    const THREADS: usize,
    const ITEMS_PER_THREAD: usize,
    V = NullType,
    const RADIX_BITS: u32 = 4,
> {
    storage: &'s TempStorage,
    lane: Lane<'s>,
    _items: PhantomData<(K, V)>,
}

const fn max(a: usize, b: usize) -> usize {
    if a > b {
        a
    } else {
        b
    }
}

impl<'s, K, V, const THREADS: usize, const ITEMS_PER_THREAD: usize, const RADIX_BITS: u32>
    BlockRadixSort<'s, K, THREADS, ITEMS_PER_THREAD, V, RADIX_BITS>
where
    K: RadixKey,
    V: Pod + Send + Sync,
{
    /// Bytes of scratch one group needs: the largest of the ranking and exchange layouts.
    pub const TEMP_STORAGE_BYTES: usize = max(
        BlockRadixRank::<THREADS, ITEMS_PER_THREAD, RADIX_BITS>::TEMP_STORAGE_BYTES,
        max(
            BlockExchange::<K::Bits, THREADS, ITEMS_PER_THREAD>::TEMP_STORAGE_BYTES,
            BlockExchange::<V, THREADS, ITEMS_PER_THREAD>::TEMP_STORAGE_BYTES,
        ),
    );

    pub fn temp_storage() -> TempStorage {
        TempStorage::with_bytes(Self::TEMP_STORAGE_BYTES)
    }

    #[inline(always)]
    pub fn new(storage: &'s TempStorage, lane: Lane<'s>) -> Self {
        debug_assert!(storage.bytes() >= Self::TEMP_STORAGE_BYTES);
        debug_assert_eq!(lane.threads(), THREADS);
        Self {
            storage,
            lane,
            _items: PhantomData,
        }
    }

    /// Ascending sort, blocked output.
    pub fn sort(
        &self,
        keys: &mut [K; ITEMS_PER_THREAD],
        values: &mut [V; ITEMS_PER_THREAD],
        bits: impl RangeBounds<u32>,
    ) {
        let (begin_bit, end_bit) = bit_window::<K>(bits);
        self.sort_blocked::<false>(keys, values, begin_bit, end_bit)
    }

    /// Descending sort, blocked output.
    pub fn sort_descending(
        &self,
        keys: &mut [K; ITEMS_PER_THREAD],
        values: &mut [V; ITEMS_PER_THREAD],
        bits: impl RangeBounds<u32>,
    ) {
        let (begin_bit, end_bit) = bit_window::<K>(bits);
        self.sort_blocked::<true>(keys, values, begin_bit, end_bit)
    }

    /// Ascending sort, striped output.
    pub fn sort_blocked_to_striped(
        &self,
        keys: &mut [K; ITEMS_PER_THREAD],
        values: &mut [V; ITEMS_PER_THREAD],
        bits: impl RangeBounds<u32>,
    ) {
        let (begin_bit, end_bit) = bit_window::<K>(bits);
        self.sort_to_striped::<false>(keys, values, begin_bit, end_bit)
    }

    /// Descending sort, striped output.
    pub fn sort_descending_blocked_to_striped(
        &self,
        keys: &mut [K; ITEMS_PER_THREAD],
        values: &mut [V; ITEMS_PER_THREAD],
        bits: impl RangeBounds<u32>,
    ) {
        let (begin_bit, end_bit) = bit_window::<K>(bits);
        self.sort_to_striped::<true>(keys, values, begin_bit, end_bit)
    }

    #[inline(always)]
    fn check_window(begin_bit: u32, end_bit: u32) {
        debug_assert!(
            begin_bit <= end_bit && end_bit <= key_bits::<K>(),
            "invalid bit range {begin_bit}..{end_bit} for a {} bit key",
            key_bits::<K>()
        );
        debug_assert!(
            K::MASKED_WINDOWS || begin_bit == end_bit || is_full_window::<K>(begin_bit, end_bit),
            "partial bit ranges are only supported for unsigned keys"
        );
    }

    #[inline(always)]
    fn rank_keys<const DESCENDING: bool>(
        &self,
        unsigned_keys: &[K::Bits; ITEMS_PER_THREAD],
        ranks: &mut [usize; ITEMS_PER_THREAD],
        begin_bit: u32,
        pass_bits: u32,
    ) {
        BlockRadixRank::<THREADS, ITEMS_PER_THREAD, RADIX_BITS>::new(self.storage, self.lane)
            .rank_keys::<K::Bits, DESCENDING>(unsigned_keys, ranks, begin_bit, pass_bits)
    }

    #[inline(always)]
    fn key_exchange(&self) -> BlockExchange<'s, K::Bits, THREADS, ITEMS_PER_THREAD> {
        BlockExchange::new(self.storage, self.lane)
    }

    #[inline(always)]
    fn value_exchange(&self) -> BlockExchange<'s, V, THREADS, ITEMS_PER_THREAD> {
        BlockExchange::new(self.storage, self.lane)
    }

    /// Values alias the key exchange region, so they wait for every lane to finish reading keys.
    #[inline(always)]
    fn exchange_values(
        &self,
        values: &mut [V; ITEMS_PER_THREAD],
        ranks: &[usize; ITEMS_PER_THREAD],
        arrangement: Arrangement,
    ) {
        // Keys-only
        if mem::size_of::<V>() == 0 {
            return;
        }
        self.lane.sync();
        self.value_exchange().scatter(values, ranks, arrangement);
    }

    fn sort_blocked<const DESCENDING: bool>(
        &self,
        keys: &mut [K; ITEMS_PER_THREAD],
        values: &mut [V; ITEMS_PER_THREAD],
        mut begin_bit: u32,
        end_bit: u32,
    ) {
        crate::scope!("sort_blocked");
        Self::check_window(begin_bit, end_bit);
        let mut unsigned_keys = keys.map(K::twiddle_in);

        while begin_bit < end_bit {
            let pass_bits = RADIX_BITS.min(end_bit - begin_bit);

            let mut ranks = [0usize; ITEMS_PER_THREAD];
            self.rank_keys::<DESCENDING>(&unsigned_keys, &mut ranks, begin_bit, pass_bits);
            begin_bit += RADIX_BITS;

            self.lane.sync();

            self.key_exchange().scatter_to_blocked(&mut unsigned_keys, &ranks);
            self.exchange_values(values, &ranks, Arrangement::Blocked);

            if begin_bit >= end_bit {
                break;
            }

            self.lane.sync();
        }

        *keys = unsigned_keys.map(K::twiddle_out);
    }

    fn sort_to_striped<const DESCENDING: bool>(
        &self,
        keys: &mut [K; ITEMS_PER_THREAD],
        values: &mut [V; ITEMS_PER_THREAD],
        mut begin_bit: u32,
        end_bit: u32,
    ) {
        crate::scope!("sort_to_striped");
        Self::check_window(begin_bit, end_bit);
        let mut unsigned_keys = keys.map(K::twiddle_in);

        if begin_bit >= end_bit {
            // Nothing to rank, the items only change arrangement
            self.key_exchange().blocked_to_striped(&mut unsigned_keys);
            if mem::size_of::<V>() != 0 {
                self.lane.sync();
                self.value_exchange().blocked_to_striped(values);
            }
        }

        while begin_bit < end_bit {
            let pass_bits = RADIX_BITS.min(end_bit - begin_bit);

            let mut ranks = [0usize; ITEMS_PER_THREAD];
            self.rank_keys::<DESCENDING>(&unsigned_keys, &mut ranks, begin_bit, pass_bits);
            begin_bit += RADIX_BITS;

            self.lane.sync();

            // The last pass scatters straight into striped arrangement
            if begin_bit >= end_bit {
                self.key_exchange().scatter_to_striped(&mut unsigned_keys, &ranks);
                self.exchange_values(values, &ranks, Arrangement::Striped);
                break;
            }

            self.key_exchange().scatter_to_blocked(&mut unsigned_keys, &ranks);
            self.exchange_values(values, &ranks, Arrangement::Blocked);

            self.lane.sync();
        }

        *keys = unsigned_keys.map(K::twiddle_out);
    }
}

impl<'s, K, const THREADS: usize, const ITEMS_PER_THREAD: usize, const RADIX_BITS: u32>
    BlockRadixSort<'s, K, THREADS, ITEMS_PER_THREAD, NullType, RADIX_BITS>
where
    K: RadixKey,
{
    pub fn sort_keys(&self, keys: &mut [K; ITEMS_PER_THREAD], bits: impl RangeBounds<u32>) {
        self.sort(keys, &mut [NullType; ITEMS_PER_THREAD], bits)
    }

    pub fn sort_keys_descending(
        &self,
        keys: &mut [K; ITEMS_PER_THREAD],
        bits: impl RangeBounds<u32>,
    ) {
        self.sort_descending(keys, &mut [NullType; ITEMS_PER_THREAD], bits)
    }

    pub fn sort_keys_blocked_to_striped(
        &self,
        keys: &mut [K; ITEMS_PER_THREAD],
        bits: impl RangeBounds<u32>,
    ) {
        self.sort_blocked_to_striped(keys, &mut [NullType; ITEMS_PER_THREAD], bits)
    }

    pub fn sort_keys_descending_blocked_to_striped(
        &self,
        keys: &mut [K; ITEMS_PER_THREAD],
        bits: impl RangeBounds<u32>,
    ) {
        self.sort_descending_blocked_to_striped(keys, &mut [NullType; ITEMS_PER_THREAD], bits)
    }
}
