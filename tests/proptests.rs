//! Property tests for tile sorting.

use block_radix_sort::{
    block::{Arrangement, SortOrder},
    par::Scheduler,
    test_util::reference_sort_tiles,
    tiles::{sort_tiles, SortOptions},
};
use proptest::prelude::*;

const THREADS: usize = 7;
const ITEMS_PER_THREAD: usize = 3;
const TILE: usize = THREADS * ITEMS_PER_THREAD;

fn order() -> impl Strategy<Value = SortOrder> {
    prop_oneof![Just(SortOrder::Ascending), Just(SortOrder::Descending)]
}

fn arrangement() -> impl Strategy<Value = Arrangement> {
    prop_oneof![Just(Arrangement::Blocked), Just(Arrangement::Striped)]
}

/// Whole tiles of keys, one to three of them.
fn tiles<T: Arbitrary>() -> impl Strategy<Value = Vec<T>> {
    (1usize..=3).prop_flat_map(|n| prop::collection::vec(any::<T>(), n * TILE))
}

/// A bit window `begin..end` inside a 32 bit key.
fn window() -> impl Strategy<Value = (u32, u32)> {
    (0u32..=32).prop_flat_map(|begin| (Just(begin), begin..=32))
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(64))]

    /// Every tile comes out as a permutation of itself, ordered on the window.
    #[test]
    fn prop_unsigned_window_sort(
        keys in tiles::<u32>(),
        (begin_bit, end_bit) in window(),
        order in order(),
        arrangement in arrangement(),
    ) {
        let mut keys = keys;
        let mut values: Vec<u32> = (0..keys.len() as u32).collect();
        let mut expected_keys = keys.clone();
        let mut expected_values = values.clone();
        let window = (begin_bit, end_bit);
        reference_sort_tiles(&mut expected_keys, &mut expected_values, TILE, order, window);

        let options = SortOptions { order, arrangement, bits: Some(begin_bit..end_bit) };
        sort_tiles::<u32, u32, THREADS, ITEMS_PER_THREAD>(
            Scheduler::Sequential, &mut keys, &mut values, &options,
        ).unwrap();

        prop_assert_eq!(keys, expected_keys);
        prop_assert_eq!(values, expected_values);
    }

    /// Full width signed sorts agree with the standard library's stable sort.
    #[test]
    fn prop_signed_matches_std(
        keys in tiles::<i16>(),
        order in order(),
        arrangement in arrangement(),
    ) {
        let mut keys = keys;
        let mut values: Vec<u16> = (0..keys.len() as u16).collect();
        let mut expected: Vec<(i16, u16)> =
            keys.iter().copied().zip(values.iter().copied()).collect();
        for tile in expected.chunks_mut(TILE) {
            match order {
                SortOrder::Ascending => tile.sort_by_key(|(k, _)| *k),
                SortOrder::Descending => tile.sort_by_key(|(k, _)| std::cmp::Reverse(*k)),
            }
        }

        let options = SortOptions { order, arrangement, bits: None };
        sort_tiles::<i16, u16, THREADS, ITEMS_PER_THREAD>(
            Scheduler::Rayon, &mut keys, &mut values, &options,
        ).unwrap();

        let got: Vec<(i16, u16)> = keys.into_iter().zip(values).collect();
        prop_assert_eq!(got, expected);
    }

    /// Sorting twice gives the same result as sorting once.
    #[test]
    fn prop_sort_is_idempotent(keys in tiles::<u64>(), order in order()) {
        let options = SortOptions { order, ..Default::default() };
        let mut once = keys;
        let mut values = vec![0u8; once.len()];
        sort_tiles::<u64, u8, THREADS, ITEMS_PER_THREAD>(
            Scheduler::Sequential, &mut once, &mut values, &options,
        ).unwrap();
        let mut twice = once.clone();
        sort_tiles::<u64, u8, THREADS, ITEMS_PER_THREAD>(
            Scheduler::Sequential, &mut twice, &mut values, &options,
        ).unwrap();
        prop_assert_eq!(once, twice);
    }

    /// Sorting twice on the same partial window changes nothing, values included.
    #[test]
    fn prop_masked_sort_is_idempotent(
        keys in tiles::<u16>(),
        (begin_bit, end_bit) in (0u32..=16).prop_flat_map(|begin| (Just(begin), begin..=16)),
        order in order(),
        arrangement in arrangement(),
    ) {
        let options = SortOptions { order, arrangement, bits: Some(begin_bit..end_bit) };
        let mut once = keys;
        let mut once_values: Vec<u16> = (0..once.len() as u16).collect();
        sort_tiles::<u16, u16, THREADS, ITEMS_PER_THREAD>(
            Scheduler::Sequential, &mut once, &mut once_values, &options,
        ).unwrap();
        let mut twice = once.clone();
        let mut twice_values = once_values.clone();
        sort_tiles::<u16, u16, THREADS, ITEMS_PER_THREAD>(
            Scheduler::Sequential, &mut twice, &mut twice_values, &options,
        ).unwrap();
        prop_assert_eq!(once, twice);
        prop_assert_eq!(once_values, twice_values);
    }
}
