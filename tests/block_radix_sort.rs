use std::{fmt::Debug, ops::Range};

use block_radix_sort::{
    block::{Arrangement, SortOrder},
    par::Scheduler,
    radix::{NullType, RadixKey},
    test_util::{random_data, random_few_distinct, reference_sort_tiles, same_keys},
    tiles::{sort_tiles, sort_tiles_keys, SortOptions},
};
use bytemuck::Pod;

trait TestValue: Pod + Send + Sync + PartialEq + Debug {
    /// Values that remember where each item started.
    fn from_index(i: usize) -> Self;
}

impl TestValue for u32 {
    fn from_index(i: usize) -> Self {
        i as u32
    }
}

impl TestValue for NullType {
    fn from_index(_i: usize) -> Self {
        NullType
    }
}

fn check<K, V, const THREADS: usize, const ITEMS_PER_THREAD: usize>(
    keys: Vec<K>,
    scheduler: Scheduler,
    order: SortOrder,
    arrangement: Arrangement,
    bits: Option<Range<u32>>,
) where
    K: RadixKey,
    V: TestValue,
{
    let tile_len = THREADS * ITEMS_PER_THREAD;
    assert_eq!(keys.len() % tile_len, 0);
    let mut keys = keys;
    let mut values: Vec<V> = (0..keys.len()).map(V::from_index).collect();

    let options = SortOptions {
        order,
        arrangement,
        bits,
    };
    let window = options.window::<K>().unwrap();

    let mut expected_keys = keys.clone();
    let mut expected_values = values.clone();
    reference_sort_tiles(&mut expected_keys, &mut expected_values, tile_len, order, window);

    sort_tiles::<K, V, THREADS, ITEMS_PER_THREAD>(scheduler, &mut keys, &mut values, &options)
        .unwrap();

    assert!(
        same_keys(&keys, &expected_keys),
        "{THREADS}x{ITEMS_PER_THREAD} {order:?} {arrangement:?} {window:?} {scheduler:?}\n got {keys:?}\n expected {expected_keys:?}"
    );
    assert_eq!(
        values, expected_values,
        "{THREADS}x{ITEMS_PER_THREAD} {order:?} {arrangement:?} {window:?} {scheduler:?}"
    );
}

macro_rules! shape_tests {
    ($($name:ident: $k:ty, $v:ty, $threads:literal x $items:literal, $tiles:literal tiles,
        $scheduler:ident, $order:ident, $arrangement:ident, $bits:expr;)*) => {
        $(
            #[test]
            fn $name() {
                let len = $threads * $items * $tiles;
                let keys = random_data::<$k>(len, $threads * 31 + $items);
                check::<$k, $v, $threads, $items>(
                    keys,
                    Scheduler::$scheduler,
                    SortOrder::$order,
                    Arrangement::$arrangement,
                    $bits,
                );
            }
        )*
    };
}

shape_tests! {
    keys_u32_64x1: u32, NullType, 64 x 1, 4 tiles, Forte, Ascending, Blocked, None;
    keys_i32_128x2: i32, NullType, 128 x 2, 3 tiles, Chili, Descending, Blocked, None;
    pairs_u64_256x3: u64, u32, 256 x 3, 2 tiles, Rayon, Ascending, Striped, None;
    keys_u16_65x5: u16, NullType, 65 x 5, 3 tiles, Raw, Ascending, Blocked, None;
    pairs_i16_37x7: i16, u32, 37 x 7, 5 tiles, Sequential, Descending, Striped, None;
    keys_f32_162x2: f32, NullType, 162 x 2, 2 tiles, Forte, Ascending, Blocked, None;
    pairs_f64_255x4: f64, u32, 255 x 4, 2 tiles, Rayon, Descending, Blocked, None;
    keys_i8_33x9: i8, NullType, 33 x 9, 3 tiles, Chili, Ascending, Striped, None;
    keys_u8_100x6: u8, NullType, 100 x 6, 2 tiles, Raw, Descending, Striped, None;
    pairs_u32_234x1_masked: u32, u32, 234 x 1, 3 tiles, Forte, Ascending, Blocked, Some(7..19);
    keys_u64_60x8_masked: u64, NullType, 60 x 8, 2 tiles,
        Sequential, Descending, Blocked, Some(3..37);
    pairs_u16_1024x1_masked: u16, u32, 1024 x 1, 1 tiles,
        Sequential, Ascending, Striped, Some(4..12);
    pairs_u32_512x2_empty_window: u32, u32, 512 x 2, 1 tiles,
        Sequential, Ascending, Striped, Some(5..5);
    keys_i64_464x3: i64, NullType, 464 x 3, 1 tiles, Rayon, Descending, Striped, None;
    pairs_u8_510x1_single_pass: u8, u32, 510 x 1, 2 tiles, Chili, Ascending, Blocked, Some(0..3);
    pairs_u128_64x2: u128, u32, 64 x 2, 2 tiles, Forte, Ascending, Blocked, None;
}

#[test]
fn test_few_distinct_keys_are_stable_on_every_scheduler() {
    for scheduler in Scheduler::ALL {
        for order in [SortOrder::Ascending, SortOrder::Descending] {
            for arrangement in [Arrangement::Blocked, Arrangement::Striped] {
                let keys = random_few_distinct(48 * 3 * 6, 5, 11);
                check::<u32, u32, 48, 3>(keys, scheduler, order, arrangement, None);
            }
        }
    }
}

#[test]
fn test_masked_windows_on_unsigned_keys() {
    for (begin_bit, end_bit) in [(0, 1), (0, 4), (3, 9), (8, 16), (15, 16), (0, 16)] {
        for order in [SortOrder::Ascending, SortOrder::Descending] {
            let keys = random_data::<u16>(32 * 4 * 3, begin_bit as u64 * 17 + end_bit as u64);
            check::<u16, u32, 32, 4>(
                keys,
                Scheduler::Rayon,
                order,
                Arrangement::Blocked,
                Some(begin_bit..end_bit),
            );
        }
    }
}

#[test]
fn test_float_special_values() {
    let mut keys = vec![
        f32::INFINITY,
        0.0,
        -1.5,
        2.0,
        f32::NEG_INFINITY,
        -0.0,
        2.0,
        -1000.0,
    ];
    sort_tiles_keys::<f32, 4, 2>(Scheduler::Sequential, &mut keys, &SortOptions::default())
        .unwrap();
    let expected = [
        f32::NEG_INFINITY,
        -1000.0,
        -1.5,
        -0.0,
        0.0,
        2.0,
        2.0,
        f32::INFINITY,
    ];
    assert!(same_keys(&keys, &expected), "{keys:?}");
    assert!(keys[3].is_sign_negative());
    assert!(keys[4].is_sign_positive());
}

#[test]
fn test_keys_only_striped_descending() {
    let mut keys: Vec<i32> = vec![5, -3, 9, 0, -3, 12, 7, 1, -8, 4, 2, 6];
    let options = SortOptions {
        order: SortOrder::Descending,
        arrangement: Arrangement::Striped,
        bits: None,
    };
    sort_tiles_keys::<i32, 3, 2>(Scheduler::Raw, &mut keys, &options).unwrap();
    assert_eq!(keys, [12, 9, 5, 0, -3, -3, 7, 6, 4, 2, 1, -8]);
}

#[test]
fn test_partial_window_on_signed_keys_is_rejected() {
    let mut keys = random_data::<i32>(64, 3);
    let before = keys.clone();
    let options = SortOptions {
        bits: Some(0..16),
        ..Default::default()
    };
    assert!(sort_tiles_keys::<i32, 16, 4>(Scheduler::Forte, &mut keys, &options).is_err());
    assert_eq!(keys, before);
}

#[test]
fn test_random_values_follow_their_keys() {
    let len = 96 * 2 * 4;
    let mut keys = random_data::<u32>(len, 5);
    let mut values = random_data::<u64>(len, 6);
    let pairs: Vec<(u32, u64)> = keys.iter().copied().zip(values.iter().copied()).collect();

    sort_tiles::<u32, u64, 96, 2>(
        Scheduler::Forte,
        &mut keys,
        &mut values,
        &SortOptions::default(),
    )
    .unwrap();

    for tile in 0..4 {
        let range = tile * 192..(tile + 1) * 192;
        assert!(keys[range.clone()].windows(2).all(|w| w[0] <= w[1]));
        let mut got: Vec<(u32, u64)> = keys[range.clone()]
            .iter()
            .copied()
            .zip(values[range.clone()].iter().copied())
            .collect();
        let mut input = pairs[range].to_vec();
        got.sort_unstable();
        input.sort_unstable();
        assert_eq!(got, input);
    }
}
