//! Random tiles and a plain reference sort to check block sorts against.

use rand::{rngs::StdRng, Rng, SeedableRng};

use crate::{
    block::SortOrder,
    radix::key::{NullType, RadixKey, UnsignedBits},
};

pub trait RandomItem: Sized {
    fn random(rng: &mut StdRng) -> Self;
}

macro_rules! impl_random_int {
    ($($t:ident),*) => {
        $(impl RandomItem for $t {
            #[inline(always)]
            fn random(rng: &mut StdRng) -> Self {
                rng.random()
            }
        })*
    };
}

impl_random_int!(u8, u16, u32, u64, u128, i8, i16, i32, i64, i128);

impl RandomItem for f32 {
    fn random(rng: &mut StdRng) -> Self {
        rng.random_range(-1000.0..1000.0)
    }
}

impl RandomItem for f64 {
    fn random(rng: &mut StdRng) -> Self {
        rng.random_range(-1000.0..1000.0)
    }
}

impl RandomItem for NullType {
    fn random(_rng: &mut StdRng) -> Self {
        NullType
    }
}

pub fn random_data<T: RandomItem>(len: usize, seed: u64) -> Vec<T> {
    let mut rng = StdRng::seed_from_u64(seed);
    (0..len).map(|_| T::random(&mut rng)).collect()
}

/// Random keys drawn from only `distinct` different values, for exercising stability.
pub fn random_few_distinct(len: usize, distinct: u32, seed: u64) -> Vec<u32> {
    let mut rng = StdRng::seed_from_u64(seed);
    (0..len).map(|_| rng.random_range(0..distinct)).collect()
}

/// The bits of `key` in `[begin_bit, end_bit)` of its encoded form.
pub fn window_bits<K: RadixKey>(key: K, begin_bit: u32, end_bit: u32) -> u128 {
    let width = end_bit - begin_bit;
    if width == 0 {
        return 0;
    }
    let bits = key.twiddle_in().to_u128() >> begin_bit;
    if width >= 128 {
        bits
    } else {
        bits & ((1u128 << width) - 1)
    }
}

/// Stable sort of every `tile_len` tile on the window `[begin_bit, end_bit)`.
pub fn reference_sort_tiles<K: RadixKey, V: Copy>(
    keys: &mut [K],
    values: &mut [V],
    tile_len: usize,
    order: SortOrder,
    (begin_bit, end_bit): (u32, u32),
) {
    assert_eq!(keys.len(), values.len());
    for (tile_keys, tile_values) in keys.chunks_mut(tile_len).zip(values.chunks_mut(tile_len)) {
        let mut pairs: Vec<(K, V)> = tile_keys
            .iter()
            .copied()
            .zip(tile_values.iter().copied())
            .collect();
        match order {
            SortOrder::Ascending => {
                pairs.sort_by_key(|(k, _)| window_bits(*k, begin_bit, end_bit))
            }
            SortOrder::Descending => pairs
                .sort_by_key(|(k, _)| std::cmp::Reverse(window_bits(*k, begin_bit, end_bit))),
        }
        for (i, (k, v)) in pairs.into_iter().enumerate() {
            tile_keys[i] = k;
            tile_values[i] = v;
        }
    }
}

/// Compares keys through their encoded bits, which also tells `-0.0` from `0.0`.
pub fn same_keys<K: RadixKey>(a: &[K], b: &[K]) -> bool {
    a.len() == b.len()
        && a
            .iter()
            .zip(b)
            .all(|(x, y)| x.twiddle_in() == y.twiddle_in())
}
