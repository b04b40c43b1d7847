// A fresh scope per call, the global pool behind it is shared. Sharing one `&mut Scope` between
// concurrent callers would alias it.
#[inline(always)]
pub fn par_tiles<K, V, F>(keys: &mut [K], values: &mut [V], tile_len: usize, func: &F)
where
    K: Send + Sync,
    V: Send + Sync,
    F: Fn(usize, &mut [K], &mut [V]) + Send + Sync,
{
    fn recursive_split<K, V, F>(
        worker: &mut chili::Scope,
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
        let mut scope = chili::Scope::global();
        recursive_split(&mut scope, 0, keys, values, func, tile_len);
    }
}
