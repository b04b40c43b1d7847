//! Order-preserving conversions between native key types and the unsigned bit patterns the
//! block sort ranks digit by digit.
//!
//! Every transform is a bijection: `K::twiddle_out(k.twiddle_in()) == k` for every representable
//! `k`. Descending sorts never touch these transforms, they only flip the ranking direction.

use std::{
    fmt::Debug,
    mem,
    ops::{Bound, RangeBounds},
};

use bytemuck::{Pod, Zeroable};

/// Unsigned bit pattern of an encoded key.
pub trait UnsignedBits: Pod + Ord + Default + Debug + Send + Sync {
    const BITS: u32;

    /// Extracts the `pass_bits` wide digit starting at `begin_bit`.
    ///
    /// `begin_bit` must be below `Self::BITS` and `pass_bits` must be at most 8.
    fn digit(self, begin_bit: u32, pass_bits: u32) -> usize;

    /// Widens the pattern, used for masked comparisons outside the block sort.
    fn to_u128(self) -> u128;
}

macro_rules! unsigned_bits_impl {
    ($($t:ident)*) => ($(
        impl UnsignedBits for $t {
            const BITS: u32 = <$t>::BITS;

            #[inline(always)]
            fn digit(self, begin_bit: u32, pass_bits: u32) -> usize {
                debug_assert!(begin_bit < Self::BITS);
                debug_assert!(pass_bits <= 8);
                ((self >> begin_bit) as usize) & ((1usize << pass_bits) - 1)
            }

            #[inline(always)]
            fn to_u128(self) -> u128 {
                self as u128
            }
        }
    )*)
}

unsigned_bits_impl! { u8 u16 u32 u64 u128 }

/// A key that the block sort can order.
///
/// `twiddle_in` maps the key to an unsigned pattern whose unsigned order matches the key's
/// native order, `twiddle_out` reverses it exactly.
pub trait RadixKey: Pod + Debug + Send + Sync {
    type Bits: UnsignedBits;

    /// Whether sorting on a partial bit window is meaningful for this type.
    ///
    /// Only unsigned integers qualify. For signed and floating point keys the encoded sign
    /// bit decides the order, so any window that leaves it out has no defined semantics.
    const MASKED_WINDOWS: bool;

    fn twiddle_in(self) -> Self::Bits;
    fn twiddle_out(bits: Self::Bits) -> Self;
}

/// Unsigned integers are already in radix order.
macro_rules! key_impl_unsigned {
    ($($t:ident)*) => ($(
        impl RadixKey for $t {
            type Bits = $t;
            const MASKED_WINDOWS: bool = true;

            #[inline(always)]
            fn twiddle_in(self) -> $t {
                self
            }

            #[inline(always)]
            fn twiddle_out(bits: $t) -> Self {
                bits
            }
        }
    )*)
}

key_impl_unsigned! { u8 u16 u32 u64 u128 }

/// Signed integers are mapped to unsigned integers of the same width.
///
/// In two's complement negative integers have the most significant bit set, so once cast to
/// unsigned they would land after every positive integer. Flipping the sign bit fixes that.
///
/// ```plaintext
/// -128: 1000_0000    0000_0000
///   -1: 1111_1111    0111_1111
///    0: 0000_0000 -> 1000_0000
///    1: 0000_0001    1000_0001
///  127: 0111_1111    1111_1111
/// ```
macro_rules! key_impl_signed {
    ($($t:ident as $u:ident)*) => ($(
        impl RadixKey for $t {
            type Bits = $u;
            const MASKED_WINDOWS: bool = false;

            #[inline(always)]
            fn twiddle_in(self) -> $u {
                const SIGN_BIT: $u = 1 << (<$u>::BITS - 1);
                (self as $u) ^ SIGN_BIT
            }

            #[inline(always)]
            fn twiddle_out(bits: $u) -> Self {
                const SIGN_BIT: $u = 1 << (<$u>::BITS - 1);
                (bits ^ SIGN_BIT) as $t
            }
        }
    )*)
}

key_impl_signed! { i8 as u8 i16 as u16 i32 as u32 i64 as u64 i128 as u128 }

/// Floats are mapped so that the unsigned order of the bits matches the IEEE total order.
///
/// Non-negative values get their sign bit set, negative values have every bit inverted, which
/// reverses the order of their magnitudes and moves them below the non-negative range.
/// `-0.0` therefore sorts before `+0.0`. NaNs land at either end depending on their sign bit.
macro_rules! key_impl_float {
    ($($t:ident as $u:ident)*) => ($(
        impl RadixKey for $t {
            type Bits = $u;
            const MASKED_WINDOWS: bool = false;

            #[inline(always)]
            fn twiddle_in(self) -> $u {
                const SIGN_BIT: $u = 1 << (<$u>::BITS - 1);
                let bits = self.to_bits();
                if bits & SIGN_BIT != 0 {
                    !bits
                } else {
                    bits | SIGN_BIT
                }
            }

            #[inline(always)]
            fn twiddle_out(bits: $u) -> Self {
                const SIGN_BIT: $u = 1 << (<$u>::BITS - 1);
                let bits = if bits & SIGN_BIT != 0 {
                    bits ^ SIGN_BIT
                } else {
                    !bits
                };
                <$t>::from_bits(bits)
            }
        }
    )*)
}

key_impl_float! { f32 as u32 f64 as u64 }

/// Value type of a keys-only sort. Zero sized, so value exchanges compile away.
#[derive(Default, Clone, Copy, Debug, PartialEq, Eq)]
#[repr(C)]
pub struct NullType;

unsafe impl Pod for NullType {}
unsafe impl Zeroable for NullType {}

/// Resolves a bit range into `(begin_bit, end_bit)` for key type `K`.
///
/// Unbounded ends default to `0` and the bit width of `K`.
#[inline]
pub fn bit_window<K: RadixKey>(bits: impl RangeBounds<u32>) -> (u32, u32) {
    let begin_bit = match bits.start_bound() {
        Bound::Included(&b) => b,
        Bound::Excluded(&b) => b + 1,
        Bound::Unbounded => 0,
    };
    let end_bit = match bits.end_bound() {
        Bound::Included(&e) => e + 1,
        Bound::Excluded(&e) => e,
        Bound::Unbounded => key_bits::<K>(),
    };
    (begin_bit, end_bit)
}

#[inline(always)]
pub const fn key_bits<K: RadixKey>() -> u32 {
    (mem::size_of::<K>() * 8) as u32
}

/// Returns true if `[begin_bit, end_bit)` covers every bit of `K`.
#[inline(always)]
pub fn is_full_window<K: RadixKey>(begin_bit: u32, end_bit: u32) -> bool {
    begin_bit == 0 && end_bit == key_bits::<K>()
}
