//! Bit-packing codec for prize payouts.
//!
//! Layout of a packed payout word (bit 0 is the least significant):
//!
//! | field       | bits | offset |
//! |-------------|------|--------|
//! | amount      | 128  | 0      |
//! | payout_type | 8    | 128    |
//! | param       | 16   | 136    |
//! | count       | 32   | 152    |
//!
//! Field widths are enforced by the Rust types (`u128`, `u8`, `u16`,
//! `u32`), so `pack` cannot fail. Callers holding wider integers use
//! [`narrow_u16`] to range-check before packing. `unpack` only extracts
//! bits; it does not judge whether the decoded values make sense.

use primitive_types::U256;

use crate::{
    word::{field, with_field},
    Error, StorageWord,
};

pub const AMOUNT_OFFSET: u32 = 0;
pub const AMOUNT_BITS: u32 = 128;
pub const PAYOUT_TYPE_OFFSET: u32 = 128;
pub const PAYOUT_TYPE_BITS: u32 = 8;
pub const PARAM_OFFSET: u32 = 136;
pub const PARAM_BITS: u32 = 16;
pub const COUNT_OFFSET: u32 = 152;
pub const COUNT_BITS: u32 = 32;

/// How a prize amount is paid out.
#[derive(Copy, Clone, Debug, Eq, PartialEq)]
#[repr(u8)]
pub enum PayoutType {
    /// No distribution; the whole amount goes to one recipient.
    Position = 0,
    Linear = 1,
    Exponential = 2,
    Uniform = 3,
    Custom = 4,
}

impl PayoutType {
    pub fn from_u8(value: u8) -> Option<Self> {
        match value {
            0 => Some(PayoutType::Position),
            1 => Some(PayoutType::Linear),
            2 => Some(PayoutType::Exponential),
            3 => Some(PayoutType::Uniform),
            4 => Some(PayoutType::Custom),
            _ => None,
        }
    }
}

/// Decoded form of a packed payout word.
#[derive(Copy, Clone, Debug, Default, Eq, PartialEq)]
pub struct PackedPayout {
    pub amount: u128,
    pub payout_type: u8,
    /// Curve weight for Linear/Exponential, share count for Custom, else 0.
    pub param: u16,
    /// Number of paid positions; 0 for single-recipient payouts. Not
    /// checked on unpack. For Custom payouts the separately stored share
    /// count decides how many shares are read back, not this field.
    pub count: u32,
}

impl PackedPayout {
    pub fn pack(&self) -> StorageWord {
        let mut word = U256::zero();
        word = with_field(word, AMOUNT_OFFSET, AMOUNT_BITS, self.amount);
        word = with_field(
            word,
            PAYOUT_TYPE_OFFSET,
            PAYOUT_TYPE_BITS,
            self.payout_type as u128,
        );
        word = with_field(word, PARAM_OFFSET, PARAM_BITS, self.param as u128);
        word = with_field(word, COUNT_OFFSET, COUNT_BITS, self.count as u128);
        word.into()
    }

    pub fn unpack(word: &StorageWord) -> Self {
        let word = word.to_u256();
        PackedPayout {
            amount: field(word, AMOUNT_OFFSET, AMOUNT_BITS),
            payout_type: field(word, PAYOUT_TYPE_OFFSET, PAYOUT_TYPE_BITS) as u8,
            param: field(word, PARAM_OFFSET, PARAM_BITS) as u16,
            count: field(word, COUNT_OFFSET, COUNT_BITS) as u32,
        }
    }
}

/// `amount + payout_type * 2^128 + param * 2^136`.
pub fn pack(amount: u128, payout_type: u8, param: u16) -> StorageWord {
    PackedPayout {
        amount,
        payout_type,
        param,
        count: 0,
    }
    .pack()
}

/// Inverse of [`pack`]. Any `count` bits present in the word are ignored.
pub fn unpack(word: &StorageWord) -> (u128, u8, u16) {
    let payout = PackedPayout::unpack(word);
    (payout.amount, payout.payout_type, payout.param)
}

/// Range-check a `u32` against the 16-bit `param`/share width.
pub fn narrow_u16(value: u32) -> Result<u16, Error> {
    u16::try_from(value).map_err(|_| Error::ValueOutOfRange)
}
