pub static COMPUTE: forte::ThreadPool = forte::ThreadPool::new();

#[inline(always)]
pub fn par_tiles<K, V, F>(keys: &mut [K], values: &mut [V], tile_len: usize, func: &F)
where
    K: Send + Sync,
    V: Send + Sync,
    F: Fn(usize, &mut [K], &mut [V]) + Send + Sync,
{
    #[inline(always)]
    fn recursive_split<K, V, F>(
        worker: &forte::Worker,
        first_tile: usize,
        keys: &mut [K],
        values: &mut [V],
        func: &F,
        tile_len: usize,
    ) where
        K: Send + Sync,
        V: Send + Sync,
        F: Fn(usize, &mut [K], &mut [V]) + Send + Sync,
    {
        let tiles = keys.len() / tile_len;
        if tiles <= 1 {
            if tiles == 1 {
                func(first_tile, keys, values);
            }
        } else {
            let left_tiles = tiles / 2;
            let (left_keys, right_keys) = keys.split_at_mut(left_tiles * tile_len);
            let (left_values, right_values) = values.split_at_mut(left_tiles * tile_len);
            worker.join(
                |worker| {
                    recursive_split(worker, first_tile, left_keys, left_values, func, tile_len)
                },
                |worker| {
                    recursive_split(
                        worker,
                        first_tile + left_tiles,
                        right_keys,
                        right_values,
                        func,
                        tile_len,
                    )
                },
            );
        }
    }
    if !keys.is_empty() {
        COMPUTE.with_worker(|worker| {
            recursive_split(worker, 0, keys, values, func, tile_len);
        });
    }
}
