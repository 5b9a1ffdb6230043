//! Shared utilities and data structures for Stellarcade contracts.
//!
//! Holds the fixed-width storage codecs used by contracts that pack
//! several small fields into one persistent ledger entry:
//!
//! - [`word`]: field get/set on [`U256`] and its storable form,
//!   [`StorageWord`].
//! - [`packing`]: packs a prize payout `{amount, payout_type, param, count}`
//!   into a single word.
//! - [`slots`]: spreads an arbitrary-length list of 16-bit shares across
//!   as few words ("slots") as possible.
#![no_std]
#![allow(unexpected_cfgs)]

use soroban_sdk::contracttype;

pub mod packing;
pub mod slots;
pub mod word;

pub use primitive_types::U256;
pub use word::StorageWord;

/// Error codes raised by the shared codecs.
#[contracttype]
#[derive(Copy, Clone, Debug, Eq, PartialEq)]
#[repr(u32)]
pub enum Error {
    /// A value does not fit the bit width reserved for its field.
    ValueOutOfRange = 1,
    /// A share index is outside `[0, SHARES_PER_SLOT)`.
    IndexOutOfBounds = 2,
}
