pub mod key;

pub use key::{bit_window, key_bits, NullType, RadixKey, UnsignedBits};
