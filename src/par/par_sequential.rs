#[inline(always)]
pub fn par_tiles<K, V, F>(keys: &mut [K], values: &mut [V], tile_len: usize, func: &F)
where
    K: Send + Sync,
    V: Send + Sync,
    F: Fn(usize, &mut [K], &mut [V]) + Send + Sync,
{
    for (tile_id, (keys, values)) in keys
        .chunks_mut(tile_len)
        .zip(values.chunks_mut(tile_len))
        .enumerate()
    {
        func(tile_id, keys, values);
    }
}
