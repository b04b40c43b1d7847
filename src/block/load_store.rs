//! Direct loads and stores between a flat tile and one lane's local array.
//!
//! `tile` is the group's whole tile of `THREADS * ITEMS_PER_THREAD` elements.

use crate::block::Arrangement;

#[inline(always)]
pub fn load_direct_blocked<T: Copy, const ITEMS_PER_THREAD: usize>(
    linear_tid: usize,
    tile: &[T],
    items: &mut [T; ITEMS_PER_THREAD],
) {
    let base = linear_tid * ITEMS_PER_THREAD;
    items.copy_from_slice(&tile[base..base + ITEMS_PER_THREAD]);
}

#[inline(always)]
pub fn load_direct_striped<T: Copy, const THREADS: usize, const ITEMS_PER_THREAD: usize>(
    linear_tid: usize,
    tile: &[T],
    items: &mut [T; ITEMS_PER_THREAD],
) {
    for (i, item) in items.iter_mut().enumerate() {
        *item = tile[i * THREADS + linear_tid];
    }
}

#[inline(always)]
pub fn store_direct_blocked<T: Copy, const ITEMS_PER_THREAD: usize>(
    linear_tid: usize,
    tile: &mut [T],
    items: &[T; ITEMS_PER_THREAD],
) {
    let base = linear_tid * ITEMS_PER_THREAD;
    tile[base..base + ITEMS_PER_THREAD].copy_from_slice(items);
}

#[inline(always)]
pub fn store_direct_striped<T: Copy, const THREADS: usize, const ITEMS_PER_THREAD: usize>(
    linear_tid: usize,
    tile: &mut [T],
    items: &[T; ITEMS_PER_THREAD],
) {
    for (i, item) in items.iter().enumerate() {
        tile[i * THREADS + linear_tid] = *item;
    }
}

/// Stores in whichever arrangement the items are in.
#[inline(always)]
pub fn store_direct<T: Copy, const THREADS: usize, const ITEMS_PER_THREAD: usize>(
    arrangement: Arrangement,
    linear_tid: usize,
    tile: &mut [T],
    items: &[T; ITEMS_PER_THREAD],
) {
    match arrangement {
        Arrangement::Blocked => store_direct_blocked(linear_tid, tile, items),
        Arrangement::Striped => {
            store_direct_striped::<T, THREADS, ITEMS_PER_THREAD>(linear_tid, tile, items)
        }
    }
}
