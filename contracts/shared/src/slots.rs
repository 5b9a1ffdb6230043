//! Slotted array codec.
//!
//! Packs a list of 16-bit shares into storage words, `SHARES_PER_SLOT` per
//! word, so a list of `n` shares costs `ceil(n / SHARES_PER_SLOT)` ledger
//! entries instead of `n`.
//!
//! Only the low `WORD_BITS` of each word are used. The 12 bits between the
//! last share and `WORD_BITS` and the 4 bits above it are left zero and are
//! not free for new fields without a layout version bump.

use primitive_types::U256;
use soroban_sdk::{Env, Vec};

use crate::{
    packing::narrow_u16,
    word::{field, with_field},
    Error, StorageWord,
};

/// Usable width of a slot.
pub const WORD_BITS: u32 = 252;
/// Width of one packed share.
pub const ITEM_BITS: u32 = 16;
/// Shares held by one slot.
pub const SHARES_PER_SLOT: u32 = WORD_BITS / ITEM_BITS;

/// Number of slots needed to hold `len` shares.
pub fn slot_count(len: u32) -> u32 {
    len.div_ceil(SHARES_PER_SLOT)
}

fn check_index(index: u32) -> Result<(), Error> {
    if index >= SHARES_PER_SLOT {
        return Err(Error::IndexOutOfBounds);
    }
    Ok(())
}

/// Read the share at `index` within `slot`.
pub fn get_share(slot: &StorageWord, index: u32) -> Result<u16, Error> {
    check_index(index)?;
    Ok(field(slot.to_u256(), ITEM_BITS * index, ITEM_BITS) as u16)
}

/// Return `slot` with the share at `index` replaced by `value`.
pub fn set_share(slot: StorageWord, index: u32, value: u16) -> Result<StorageWord, Error> {
    check_index(index)?;
    Ok(with_field(slot.to_u256(), ITEM_BITS * index, ITEM_BITS, value as u128).into())
}

/// Pack `values` into `ceil(len / SHARES_PER_SLOT)` slots. The last slot is
/// zero-padded. Every value must fit in 16 bits.
pub fn from_array(env: &Env, values: &Vec<u32>) -> Result<Vec<StorageWord>, Error> {
    let mut slots = Vec::new(env);
    let mut current = StorageWord::ZERO;

    for (i, value) in values.iter().enumerate() {
        let index = (i as u32) % SHARES_PER_SLOT;
        current = set_share(current, index, narrow_u16(value)?)?;
        if index == SHARES_PER_SLOT - 1 {
            slots.push_back(current);
            current = StorageWord::ZERO;
        }
    }
    if values.len() % SHARES_PER_SLOT != 0 {
        slots.push_back(current);
    }

    Ok(slots)
}

/// Rebuild `count` shares, calling `load(slot_index)` once per slot.
///
/// A slot is loaded only when the slot index changes, so `load` runs
/// exactly `ceil(count / SHARES_PER_SLOT)` times. Callers must track the
/// real length themselves: shares past what was written decode as zero
/// when `load` returns the zero word for missing slots.
pub fn to_array<F>(env: &Env, count: u32, mut load: F) -> Vec<u32>
where
    F: FnMut(u32) -> StorageWord,
{
    let mut values = Vec::new(env);
    let mut loaded: Option<(u32, U256)> = None;

    for i in 0..count {
        let slot_index = i / SHARES_PER_SLOT;
        let slot = match loaded {
            Some((index, slot)) if index == slot_index => slot,
            _ => {
                let slot = load(slot_index).to_u256();
                loaded = Some((slot_index, slot));
                slot
            }
        };
        let share = field(slot, ITEM_BITS * (i % SHARES_PER_SLOT), ITEM_BITS) as u32;
        values.push_back(share);
    }

    values
}
