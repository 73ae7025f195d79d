//! Proof-of-work and proof-of-stake difficulty ceilings.
//!
//! A [`Target`] is the 256-bit threshold a block hash must stay below. The
//! network profiles express their ceilings as "all ones shifted right by N
//! bits"; [`CompactTarget`] is the 32-bit `nBits` encoding of such a value
//! that ends up in block headers.

use primitive_types::U256;
use serde::{Deserialize, Serialize};

/// Represents a target value expressed as an unsigned 256-bit integer.
///
/// A numerically larger target is a looser ceiling: less work is needed to
/// find a hash below it.
///
/// # Example
///
/// ```
/// use arion_common::pow::Target;
///
/// let main = Target::from_leading_zero_bits(18);
/// let test = Target::from_leading_zero_bits(16);
///
/// assert!(test > main);
/// assert_eq!(main.to_compact().map(|c| c.to_consensus()), Some(0x1e3fffff));
/// ```
#[derive(Copy, Clone, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct Target(U256);

impl Target {
    /// The loosest possible target, every bit set.
    pub const MAX: Self = Target(U256::MAX);

    /// Builds the ceiling `~uint256(0) >> bits`.
    ///
    /// Shifting by 256 or more yields zero.
    pub fn from_leading_zero_bits(bits: u32) -> Self {
        if bits >= 256 {
            return Target(U256::zero());
        }
        #[allow(clippy::arithmetic_side_effects, reason = "Shift amount checked above")]
        let value = U256::max_value() >> bits;
        Target(value)
    }

    /// Creates a new `Target` from a hexadecimal string representation.
    pub fn from_hex(hex: &str) -> Option<Self> {
        U256::from_str_radix(hex, 16).ok().map(Target)
    }

    /// Creates a Target from bytes (big-endian).
    pub fn from_bytes(bytes: &[u8; 32]) -> Self {
        Self(U256::from_big_endian(bytes))
    }

    /// Returns the big-endian byte representation of the target.
    pub fn to_bytes(self) -> [u8; 32] {
        let mut bytes = [0u8; 32];
        for (i, byte) in bytes.iter_mut().rev().enumerate() {
            *byte = self.0.byte(i);
        }
        bytes
    }

    /// Number of leading zero bits, i.e. the `N` in `~0 >> N` for ceilings
    /// built by [`Target::from_leading_zero_bits`].
    pub fn leading_zeros(self) -> u32 {
        self.0.leading_zeros()
    }

    /// Converts a compact target representation into a Target instance.
    ///
    /// The actual target is calculated as: `mantissa * 256^(exponent - 3)`.
    ///
    /// # Returns
    ///
    /// * `Some(Target)` - The parsed target value if valid
    /// * `None` - If the mantissa is zero or negative, or the exponent does
    ///   not fit a 256-bit value
    pub fn from_compact(compact: CompactTarget) -> Option<Self> {
        let n = compact.0;
        let exponent = n >> 24;
        let mantissa = n & 0x007fffff;

        if n & 0x00800000 != 0 {
            return None; // Sign bit set
        }

        if mantissa == 0 {
            return None;
        }

        if exponent > 32 {
            return None;
        }

        let base = U256::from(mantissa);

        #[allow(clippy::arithmetic_side_effects, reason = "Checked U256 shift handle overflows")]
        let target = if exponent <= 3 {
            let shift_bits = 3u32.checked_sub(exponent)?.checked_mul(8)?;
            base >> shift_bits
        } else {
            let shift_bits = exponent.checked_sub(3)?.checked_mul(8)?;
            if shift_bits >= 256 {
                return None;
            }
            let shifted = base << shift_bits;
            // Bits pushed past the top would silently vanish.
            if shifted >> shift_bits != base {
                return None;
            }
            shifted
        };

        Some(Target(target))
    }

    /// Converts a target value into its compact representation.
    ///
    /// The size byte counts the significant bytes of the value, the mantissa
    /// holds its three most significant bytes. When the mantissa's high bit
    /// would be set (it is a sign bit in `nBits`), the mantissa is shifted
    /// right by one byte and the size incremented.
    ///
    /// Returns `None` only if an intermediate computation overflows.
    pub fn to_compact(self) -> Option<CompactTarget> {
        if self.0.is_zero() {
            return Some(CompactTarget(0));
        }

        let bit_length = u32::try_from(self.0.bits()).ok()?;
        let size = bit_length.checked_add(7)?.checked_div(8)?;

        let mantissa = if size <= 3 {
            let shift_bits = 3u32.checked_sub(size)?.checked_mul(8)?;
            self.0.low_u32().checked_shl(shift_bits)? & 0x00ffffff
        } else {
            let shift_bits = size.checked_sub(3)?.checked_mul(8)?;
            #[allow(clippy::arithmetic_side_effects, reason = "size <= 32 so shift < 256")]
            let shifted = self.0 >> shift_bits;
            shifted.low_u32() & 0x00ffffff
        };

        let (mantissa, size) = if mantissa & 0x00800000 != 0 {
            (mantissa.checked_shr(8)?, size.checked_add(1)?)
        } else {
            (mantissa, size)
        };

        let compact = size.checked_shl(24)? | mantissa;
        Some(CompactTarget(compact))
    }
}

impl From<U256> for Target {
    fn from(value: U256) -> Self {
        Target(value)
    }
}

impl From<Target> for U256 {
    fn from(target: Target) -> Self {
        target.0
    }
}

impl std::fmt::Display for Target {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&hex::encode(self.to_bytes()))
    }
}

/// Compact representation of a Target, as used in block headers.
#[derive(Copy, Clone, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct CompactTarget(u32);

impl CompactTarget {
    /// Wraps a raw `nBits` value.
    pub const fn from_consensus(bits: u32) -> Self {
        CompactTarget(bits)
    }

    /// Returns the raw `nBits` value.
    pub const fn to_consensus(self) -> u32 {
        self.0
    }
}

impl From<CompactTarget> for bitcoin::CompactTarget {
    fn from(compact: CompactTarget) -> Self {
        bitcoin::CompactTarget::from_consensus(compact.0)
    }
}

impl From<bitcoin::CompactTarget> for CompactTarget {
    fn from(compact: bitcoin::CompactTarget) -> Self {
        CompactTarget(compact.to_consensus())
    }
}

impl std::fmt::Display for CompactTarget {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{:08x}", self.0)
    }
}
