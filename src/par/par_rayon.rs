use rayon::{
    iter::{IndexedParallelIterator, ParallelIterator},
    slice::ParallelSliceMut,
};

#[inline(always)]
pub fn par_tiles<K, V, F>(keys: &mut [K], values: &mut [V], tile_len: usize, func: &F)
where
    K: Send + Sync,
    V: Send + Sync,
    F: Fn(usize, &mut [K], &mut [V]) + Send + Sync,
{
    keys.par_chunks_mut(tile_len)
        .zip(values.par_chunks_mut(tile_len))
        .enumerate()
        .for_each(|(tile_id, (keys, values))| func(tile_id, keys, values));
}
