use std::{str::FromStr, time::Duration, time::Instant};

use argh::FromArgs;

use crate::{
    block::{Arrangement, SortOrder},
    par::Scheduler,
};

pub mod block;
pub mod par;
pub mod radix;
pub mod test_util;
pub mod tiles;

#[cfg(feature = "profile")]
#[doc(hidden)]
pub use profiling;

/// Profiler scope, a noop unless the `profile` feature is enabled.
#[macro_export]
macro_rules! scope {
    ($name:expr) => {
        #[cfg(feature = "profile")]
        $crate::profiling::scope!($name);
    };
}

/// Profiler scope that also prints its duration when the `scope_print` feature is enabled.
#[macro_export]
macro_rules! scope_print {
    ($name:expr) => {
        $crate::scope!($name);
        #[cfg(feature = "scope_print")]
        let _scope_print = $crate::ScopeTimer::new($name);
    };
}

/// Like [`scope_print!`] but for the few top level phases, printed with `scope_print_major`.
#[macro_export]
macro_rules! scope_print_major {
    ($name:expr) => {
        $crate::scope!($name);
        #[cfg(feature = "scope_print_major")]
        let _scope_print = $crate::ScopeTimer::new($name);
    };
}

/// Prints the time between its creation and drop.
#[doc(hidden)]
pub struct ScopeTimer {
    name: &'static str,
    start: Instant,
}

impl ScopeTimer {
    pub fn new(name: &'static str) -> Self {
        Self {
            name,
            start: Instant::now(),
        }
    }
}

impl Drop for ScopeTimer {
    fn drop(&mut self) {
        println!("{:>10} {}", PrettyDuration(self.start.elapsed()), self.name);
    }
}

/// A wrapper struct for `std::time::Duration` to provide pretty-printing of durations.
#[doc(hidden)]
pub struct PrettyDuration(pub Duration);

impl std::fmt::Display for PrettyDuration {
    /// Durations are formatted as follows:
    /// - If the duration is greater than or equal to 1 second, it is formatted in seconds (s).
    /// - If the duration is greater than or equal to 1 millisecond but less than 1 second, it is formatted in milliseconds (ms).
    /// - If the duration is less than 1 millisecond, it is formatted in microseconds (µs).
    ///   In the case of seconds & milliseconds, the duration is always printed with a precision of two decimal places.
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let duration = self.0;
        if duration.as_secs() > 0 {
            let seconds =
                duration.as_secs() as f64 + f64::from(duration.subsec_nanos()) / 1_000_000_000.0;
            write!(f, "{seconds:.2}s ")
        } else if duration.subsec_millis() > 0 {
            let milliseconds =
                duration.as_millis() as f64 + f64::from(duration.subsec_micros() % 1_000) / 1_000.0;
            write!(f, "{milliseconds:.2}ms")
        } else {
            let microseconds = duration.as_micros();
            write!(f, "{microseconds}µs")
        }
    }
}

/// Key types the `block_sort` binary can generate and sort.
#[derive(PartialEq, Eq, Default, Clone, Copy, Debug)]
pub enum KeyType {
    U8,
    U16,
    #[default]
    U32,
    U64,
    I8,
    I16,
    I32,
    I64,
    F32,
    F64,
}

impl FromStr for KeyType {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "u8" => Ok(Self::U8),
            "u16" => Ok(Self::U16),
            "u32" => Ok(Self::U32),
            "u64" => Ok(Self::U64),
            "i8" => Ok(Self::I8),
            "i16" => Ok(Self::I16),
            "i32" => Ok(Self::I32),
            "i64" => Ok(Self::I64),
            "f32" => Ok(Self::F32),
            "f64" => Ok(Self::F64),
            _ => Err(format!(
                "Unknown key type: '{s}', valid types: 'u8', 'u16', 'u32', 'u64', 'i8', 'i16', 'i32', 'i64', 'f32', 'f64'"
            )),
        }
    }
}

#[derive(FromArgs, Debug)]
/// Sort random tiles with a block radix sort and check them against a reference sort.
pub struct Args {
    /// scheduler used to spread tiles over the pool: seq, forte, chili, rayon, raw
    #[argh(option, default = "Scheduler::Forte")]
    pub scheduler: Scheduler,

    /// lanes per group
    #[argh(option, default = "128")]
    pub threads: usize,

    /// items held by each lane
    #[argh(option, default = "4")]
    pub items_per_thread: usize,

    /// number of tiles to sort
    #[argh(option, default = "42")]
    pub tiles: usize,

    /// key type: u8, u16, u32, u64, i8, i16, i32, i64, f32, f64
    #[argh(option, default = "KeyType::U32")]
    pub key: KeyType,

    /// carry a u32 value along with every key
    #[argh(switch)]
    pub values: bool,

    /// sort order: asc, desc
    #[argh(option, default = "SortOrder::Ascending")]
    pub order: SortOrder,

    /// arrangement the sorted tile is stored in: blocked, striped
    #[argh(option, default = "Arrangement::Blocked")]
    pub arrangement: Arrangement,

    /// first key bit to compare, defaults to 0
    #[argh(option)]
    pub begin_bit: Option<u32>,

    /// one past the last key bit to compare, defaults to the key width
    #[argh(option)]
    pub end_bit: Option<u32>,

    /// seed for the random keys
    #[argh(option, default = "0")]
    pub seed: u64,
}
