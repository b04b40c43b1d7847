use std::thread;

use crate::par::cached_available_parallelism;

/// Splits the tiles into at most one contiguous run per available thread.
///
/// Every tile already spawns a thread per lane, so spawning per tile would multiply that.
#[inline(always)]
pub fn par_tiles<K, V, F>(keys: &mut [K], values: &mut [V], tile_len: usize, func: &F)
where
    K: Send + Sync,
    V: Send + Sync,
    F: Fn(usize, &mut [K], &mut [V]) + Send + Sync,
{
    if keys.is_empty() {
        return;
    }
    let tiles = keys.len() / tile_len;
    let tiles_per_run = tiles.div_ceil(cached_available_parallelism().max(1));
    let run_count = tiles.div_ceil(tiles_per_run);
    let run_len = tiles_per_run * tile_len;

    let run = move |first_tile: usize, keys: &mut [K], values: &mut [V]| {
        for (i, (keys, values)) in keys
            .chunks_mut(tile_len)
            .zip(values.chunks_mut(tile_len))
            .enumerate()
        {
            func(first_tile + i, keys, values);
        }
    };

    if run_count == 1 {
        run(0, keys, values);
        return;
    }

    thread::scope(|s| {
        let mut keys = keys;
        let mut values = values;
        for run_id in 0..run_count {
            let len = run_len.min(keys.len());
            let (left_keys, right_keys) = keys.split_at_mut(len);
            let (left_values, right_values) = values.split_at_mut(len);
            keys = right_keys;
            values = right_values;
            let first_tile = run_id * tiles_per_run;
            if run_id == run_count - 1 {
                run(first_tile, left_keys, left_values) // Run the last one on this thread
            } else {
                s.spawn(move || run(first_tile, left_keys, left_values));
            }
        }
    });
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicU32, Ordering};

    #[test]
    fn test_par_tiles_basic_increment() {
        crate::par::Scheduler::Raw.init();
        for tile_len in 1..12 {
            for tiles in 1..24 {
                let len = tiles * tile_len;
                let mut keys: Vec<u32> = (0..len as u32).collect();
                let mut values = vec![0u8; len];
                let list: Vec<AtomicU32> = (0..len).map(|_| AtomicU32::new(0)).collect();
                let func = |tile_id: usize, keys: &mut [u32], values: &mut [u8]| {
                    let offset = tile_id * tile_len;
                    for (i, key) in keys.iter().enumerate() {
                        list[offset + i].store(offset as u32 + i as u32, Ordering::Relaxed);
                        assert_eq!(*key as usize, offset + i);
                    }
                    assert_eq!(offset as u32, keys[0]);
                    values.fill(1);
                };
                par_tiles(&mut keys, &mut values, tile_len, &func);
                let list: Vec<u32> = list.into_iter().map(|a| a.into_inner()).collect();
                assert_eq!(list, keys);
                assert!(values.iter().all(|v| *v == 1));
            }
        }
    }
}
