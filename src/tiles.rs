//! Host-side driver: sorts every tile of a flat buffer with its own lane group.
//!
//! This plays the role of a kernel launch. A tile is `THREADS * ITEMS_PER_THREAD` consecutive
//! items, each lane loads its items blocked, the group sorts them, and the lanes store them
//! back in the requested arrangement. Tiles are independent and spread over a [`Scheduler`].

use std::{cell::RefCell, ops::Range};

use bytemuck::Pod;
use thread_local::ThreadLocal;

use crate::{
    block::{
        group::ThreadGroup,
        load_store::{load_direct_blocked, store_direct},
        radix_sort::BlockRadixSort,
        scratch::TempStorage,
        Arrangement, SortOrder,
    },
    par::Scheduler,
    radix::key::{is_full_window, key_bits, NullType, RadixKey},
    scope, scope_print_major,
};

#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct SortOptions {
    pub order: SortOrder,
    /// Arrangement the sorted items are stored back in.
    pub arrangement: Arrangement,
    /// Bits of the key to compare, `None` compares every bit.
    pub bits: Option<Range<u32>>,
}

impl SortOptions {
    /// Resolves and checks the bit window for key type `K`.
    pub fn window<K: RadixKey>(&self) -> Result<(u32, u32), String> {
        let key_bits = key_bits::<K>();
        let (begin_bit, end_bit) = match &self.bits {
            Some(bits) => (bits.start, bits.end),
            None => (0, key_bits),
        };
        if begin_bit > end_bit || end_bit > key_bits {
            return Err(format!(
                "invalid bit range {begin_bit}..{end_bit} for a {key_bits} bit key"
            ));
        }
        if !K::MASKED_WINDOWS && begin_bit != end_bit && !is_full_window::<K>(begin_bit, end_bit)
        {
            return Err(format!(
                "bit range {begin_bit}..{end_bit} does not cover the whole key: partial ranges are only supported for unsigned keys"
            ));
        }
        Ok((begin_bit, end_bit))
    }
}

/// Sorts one tile with a group of `THREADS` lanes using `storage` as the group's scratch.
pub fn sort_tile<K, V, const THREADS: usize, const ITEMS_PER_THREAD: usize>(
    storage: &TempStorage,
    keys: &mut [K],
    values: &mut [V],
    order: SortOrder,
    arrangement: Arrangement,
    (begin_bit, end_bit): (u32, u32),
) where
    K: RadixKey,
    V: Pod + Send + Sync,
{
    scope!("sort_tile");
    debug_assert_eq!(keys.len(), THREADS * ITEMS_PER_THREAD);
    debug_assert_eq!(values.len(), THREADS * ITEMS_PER_THREAD);

    let (tile_keys, tile_values) = (&*keys, &*values);
    let lanes = ThreadGroup::new(THREADS).run(|lane| {
        let tid = lane.linear_tid();
        let mut k = [K::zeroed(); ITEMS_PER_THREAD];
        let mut v = [V::zeroed(); ITEMS_PER_THREAD];
        load_direct_blocked(tid, tile_keys, &mut k);
        load_direct_blocked(tid, tile_values, &mut v);

        let sort = BlockRadixSort::<K, THREADS, ITEMS_PER_THREAD, V>::new(storage, lane);
        let bits = begin_bit..end_bit;
        match (order, arrangement) {
            (SortOrder::Ascending, Arrangement::Blocked) => sort.sort(&mut k, &mut v, bits),
            (SortOrder::Descending, Arrangement::Blocked) => {
                sort.sort_descending(&mut k, &mut v, bits)
            }
            (SortOrder::Ascending, Arrangement::Striped) => {
                sort.sort_blocked_to_striped(&mut k, &mut v, bits)
            }
            (SortOrder::Descending, Arrangement::Striped) => {
                sort.sort_descending_blocked_to_striped(&mut k, &mut v, bits)
            }
        }
        (k, v)
    });

    for (tid, (k, v)) in lanes.iter().enumerate() {
        store_direct::<K, THREADS, ITEMS_PER_THREAD>(arrangement, tid, keys, k);
        store_direct::<V, THREADS, ITEMS_PER_THREAD>(arrangement, tid, values, v);
    }
}

/// Sorts every `THREADS * ITEMS_PER_THREAD` tile of `keys`, carrying `values` along.
///
/// Tiles are sorted independently of each other. Whatever the arrangement, each tile of the
/// output holds its items in sorted order once stored. Invalid shapes and bit windows are
/// reported before anything is sorted.
pub fn sort_tiles<K, V, const THREADS: usize, const ITEMS_PER_THREAD: usize>(
    scheduler: Scheduler,
    keys: &mut [K],
    values: &mut [V],
    options: &SortOptions,
) -> Result<(), String>
where
    K: RadixKey,
    V: Pod + Send + Sync,
{
    scope_print_major!("sort_tiles");
    let tile_len = THREADS * ITEMS_PER_THREAD;
    if tile_len == 0 {
        return Err("a tile needs at least one lane and one item per lane".to_string());
    }
    if keys.len() != values.len() {
        return Err(format!(
            "{} keys cannot be paired with {} values",
            keys.len(),
            values.len()
        ));
    }
    if keys.len() % tile_len != 0 {
        return Err(format!(
            "{} items do not split into tiles of {THREADS}x{ITEMS_PER_THREAD}",
            keys.len()
        ));
    }
    let window = options.window::<K>()?;

    scheduler.init();

    // A worker only runs one group at a time, so its scratch can be reused across tiles
    let scratch: ThreadLocal<RefCell<TempStorage>> = ThreadLocal::new();
    scheduler.par_tiles(
        keys,
        values,
        tile_len,
        &|_tile_id: usize, keys: &mut [K], values: &mut [V]| {
            let storage = scratch
                .get_or(|| {
                    RefCell::new(BlockRadixSort::<K, THREADS, ITEMS_PER_THREAD, V>::temp_storage())
                })
                .borrow_mut();
            sort_tile::<K, V, THREADS, ITEMS_PER_THREAD>(
                &storage,
                keys,
                values,
                options.order,
                options.arrangement,
                window,
            );
        },
    );
    Ok(())
}

/// Keys-only [`sort_tiles`].
pub fn sort_tiles_keys<K, const THREADS: usize, const ITEMS_PER_THREAD: usize>(
    scheduler: Scheduler,
    keys: &mut [K],
    options: &SortOptions,
) -> Result<(), String>
where
    K: RadixKey,
{
    // Zero sized, this does not allocate
    let mut values = vec![NullType; keys.len()];
    sort_tiles::<K, NullType, THREADS, ITEMS_PER_THREAD>(scheduler, keys, &mut values, options)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_window_validation() {
        let full = SortOptions::default();
        assert_eq!(full.window::<i16>(), Ok((0, 16)));

        let partial = SortOptions {
            bits: Some(4..12),
            ..Default::default()
        };
        assert_eq!(partial.window::<u16>(), Ok((4, 12)));
        assert!(partial.window::<i16>().is_err());
        assert!(partial.window::<f32>().is_err());

        let too_wide = SortOptions {
            bits: Some(0..33),
            ..Default::default()
        };
        assert!(too_wide.window::<u32>().is_err());
    }

    #[test]
    fn test_bad_shapes_are_rejected_before_sorting() {
        let mut keys = vec![3u32, 2, 1];
        let options = SortOptions::default();
        assert!(sort_tiles_keys::<u32, 2, 1>(Scheduler::Sequential, &mut keys, &options).is_err());
        assert_eq!(keys, [3, 2, 1]);

        let mut values = vec![0u8; 2];
        assert!(
            sort_tiles::<u32, u8, 3, 1>(Scheduler::Sequential, &mut keys, &mut values, &options)
                .is_err()
        );
    }

    #[test]
    fn test_tiles_are_sorted_independently() {
        let mut keys: Vec<u16> = vec![4, 3, 2, 1, 40, 30, 20, 10, 9, 9, 0, 9];
        let mut values: Vec<u8> = (0..12).collect();
        let options = SortOptions::default();
        sort_tiles::<u16, u8, 2, 2>(Scheduler::Sequential, &mut keys, &mut values, &options)
            .unwrap();
        assert_eq!(keys, [1, 2, 3, 4, 10, 20, 30, 40, 0, 9, 9, 9]);
        assert_eq!(values, [3, 2, 1, 0, 7, 6, 5, 4, 10, 8, 9, 11]);
    }
}
