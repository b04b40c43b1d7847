//! Cooperative primitives for a group of lanes that each hold `ITEMS_PER_THREAD` items.

use std::str::FromStr;

pub mod exchange;
pub mod group;
pub mod load_store;
pub mod radix_sort;
pub mod rank;
pub mod scratch;

/// How a group's logical sequence of items is distributed over its lanes.
#[derive(PartialEq, Eq, Default, Clone, Copy, Debug)]
pub enum Arrangement {
    /// Lane `t` owns the contiguous run `[t * ITEMS_PER_THREAD, (t + 1) * ITEMS_PER_THREAD)`.
    #[default]
    Blocked,
    /// Position `i` belongs to lane `i % THREADS`, slot `i / THREADS`.
    Striped,
}

impl Arrangement {
    /// Logical position of slot `slot` of lane `linear_tid`.
    #[inline(always)]
    pub fn position<const THREADS: usize, const ITEMS_PER_THREAD: usize>(
        self,
        linear_tid: usize,
        slot: usize,
    ) -> usize {
        match self {
            Arrangement::Blocked => linear_tid * ITEMS_PER_THREAD + slot,
            Arrangement::Striped => slot * THREADS + linear_tid,
        }
    }
}

#[derive(PartialEq, Eq, Default, Clone, Copy, Debug)]
pub enum SortOrder {
    #[default]
    Ascending,
    Descending,
}

impl FromStr for SortOrder {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "asc" | "ascending" => Ok(Self::Ascending),
            "desc" | "descending" => Ok(Self::Descending),
            _ => Err(format!(
                "Unknown sort order: '{s}', valid orders: 'asc', 'desc'"
            )),
        }
    }
}

impl FromStr for Arrangement {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "blocked" => Ok(Self::Blocked),
            "striped" => Ok(Self::Striped),
            _ => Err(format!(
                "Unknown arrangement: '{s}', valid arrangements: 'blocked', 'striped'"
            )),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_positions_cover_the_tile_once() {
        for arrangement in [Arrangement::Blocked, Arrangement::Striped] {
            let mut seen = [false; 15];
            for tid in 0..5 {
                for slot in 0..3 {
                    let p = arrangement.position::<5, 3>(tid, slot);
                    assert!(!seen[p]);
                    seen[p] = true;
                }
            }
            assert!(seen.iter().all(|s| *s));
        }
        assert_eq!(Arrangement::Striped.position::<5, 3>(2, 1), 7);
        assert_eq!(Arrangement::Blocked.position::<5, 3>(2, 1), 7);
        assert_eq!(Arrangement::Striped.position::<5, 3>(4, 2), 14);
        assert_eq!(Arrangement::Blocked.position::<5, 3>(1, 2), 5);
    }

    #[test]
    fn test_parse_order_and_arrangement() {
        assert_eq!("desc".parse::<SortOrder>(), Ok(SortOrder::Descending));
        assert_eq!("striped".parse::<Arrangement>(), Ok(Arrangement::Striped));
        assert!("sideways".parse::<Arrangement>().is_err());
    }
}
