//! 256-bit storage word.
//!
//! Packing arithmetic runs on `primitive_types::U256`. Soroban's host
//! `U256` has no bitwise operators, so the value is persisted as a
//! [`StorageWord`]: its two 128-bit halves.

use primitive_types::U256;
use soroban_sdk::contracttype;

/// Total width of a storage word in bits.
pub const STORAGE_WORD_BITS: u32 = 256;

/// At-rest form of a `U256`, `hi * 2^128 + lo`.
#[contracttype]
#[derive(Copy, Clone, Debug, Default, Eq, PartialEq)]
pub struct StorageWord {
    pub hi: u128,
    pub lo: u128,
}

impl StorageWord {
    pub const ZERO: StorageWord = StorageWord { hi: 0, lo: 0 };

    pub fn to_u256(&self) -> U256 {
        (U256::from(self.hi) << 128u32) | U256::from(self.lo)
    }

    pub fn is_zero(&self) -> bool {
        self.hi == 0 && self.lo == 0
    }
}

impl From<U256> for StorageWord {
    fn from(value: U256) -> Self {
        StorageWord {
            hi: (value >> 128u32).low_u128(),
            lo: value.low_u128(),
        }
    }
}

impl From<StorageWord> for U256 {
    fn from(word: StorageWord) -> Self {
        word.to_u256()
    }
}

/// A value with the lowest `width` bits set.
pub fn low_mask(width: u32) -> U256 {
    if width >= STORAGE_WORD_BITS {
        return U256::MAX;
    }
    (U256::one() << width) - U256::one()
}

/// Extract the `width`-bit field starting at bit `offset`.
///
/// `width` is capped at 128 since the result is returned as a `u128`.
pub fn field(word: U256, offset: u32, width: u32) -> u128 {
    debug_assert!(width <= 128);
    ((word >> offset) & low_mask(width)).low_u128()
}

/// Replace the `width`-bit field at `offset` with `value`. Bits of `value`
/// above `width` are discarded; every other bit of `word` is preserved.
pub fn with_field(word: U256, offset: u32, width: u32, value: u128) -> U256 {
    debug_assert!(width <= 128);
    let mask = low_mask(width) << offset;
    let inserted = (U256::from(value) & low_mask(width)) << offset;
    (word & !mask) | inserted
}
