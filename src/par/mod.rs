//! Schedulers that distribute independent tiles over a thread pool.
//!
//! Tiles never communicate, so every backend only has to hand each `(tile_id, keys, values)`
//! triple to `func` exactly once. How the work is split differs per pool.

use std::{str::FromStr, sync::Once};

pub mod par_chili;
pub mod par_forte;
pub mod par_raw;
pub mod par_rayon;
pub mod par_sequential;

static INIT: Once = Once::new();
static mut AVAILABLE_PARALLELISM: usize = 1;

fn init_available_parallelism() {
    INIT.call_once(|| {
        let n = std::thread::available_parallelism()
            .map(|n| n.get())
            .unwrap_or(1);
        unsafe {
            // SAFETY: This is in a call_once
            AVAILABLE_PARALLELISM = n;
        }
    });
}

#[inline(always)]
pub fn cached_available_parallelism() -> usize {
    // SAFETY: We don't mutate
    unsafe { AVAILABLE_PARALLELISM }
}

#[derive(PartialEq, Eq, Default, Clone, Copy, Debug)]
pub enum Scheduler {
    Sequential,
    #[default]
    Forte,
    Chili,
    Rayon,
    Raw,
}

impl FromStr for Scheduler {
    type Err = String;

    #[inline(always)]
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "seq" => Ok(Self::Sequential),
            "forte" => Ok(Self::Forte),
            "chili" => Ok(Self::Chili),
            "rayon" => Ok(Self::Rayon),
            "raw" => Ok(Self::Raw),
            _ => Err(format!(
                "Unknown mode: '{s}', valid modes: 'seq', 'forte', 'chili', 'rayon', 'raw'"
            )),
        }
    }
}

impl Scheduler {
    pub const ALL: [Scheduler; 5] = [
        Scheduler::Sequential,
        Scheduler::Forte,
        Scheduler::Chili,
        Scheduler::Rayon,
        Scheduler::Raw,
    ];

    /// Calls `func(tile_id, keys, values)` once for every `tile_len` sized tile.
    ///
    /// `keys` and `values` must have the same length, a multiple of `tile_len`.
    #[inline(always)]
    pub fn par_tiles<K, V, F>(self, keys: &mut [K], values: &mut [V], tile_len: usize, func: &F)
    where
        K: Send + Sync,
        V: Send + Sync,
        F: Fn(usize, &mut [K], &mut [V]) + Send + Sync,
    {
        debug_assert_eq!(keys.len(), values.len());
        debug_assert!(tile_len > 0 && keys.len() % tile_len == 0);
        match self {
            Scheduler::Sequential => par_sequential::par_tiles(keys, values, tile_len, func),
            Scheduler::Forte => par_forte::par_tiles(keys, values, tile_len, func),
            Scheduler::Chili => par_chili::par_tiles(keys, values, tile_len, func),
            Scheduler::Rayon => par_rayon::par_tiles(keys, values, tile_len, func),
            Scheduler::Raw => par_raw::par_tiles(keys, values, tile_len, func),
        }
    }

    #[inline(always)]
    pub fn init(self) {
        init_available_parallelism();
        if self == Scheduler::Forte {
            par_forte::COMPUTE.resize_to_available();
        }
    }

    pub fn current_num_threads(self) -> usize {
        match self {
            Scheduler::Sequential => 1,
            Scheduler::Rayon => rayon::current_num_threads(),
            Scheduler::Forte | Scheduler::Chili | Scheduler::Raw => cached_available_parallelism(),
        }
    }
}
