//! Prize identity, storage and reconstruction.
//!
//! Adding a prize is split in two so the contract can run the custody
//! transfer in between: [`prepare_prize`] validates and packs without
//! touching storage, [`commit_prize`] allocates the id and writes.

use soroban_sdk::{contracttype, Address, Env, Vec};
use stellarcade_shared::{
    packing::{narrow_u16, PackedPayout, PayoutType},
    slots, StorageWord,
};

use crate::{
    set_persistent, transfer::Asset, DataKey, Distribution, Erc20Payload, Erc721Payload, Error,
    Prize, TokenType, MAX_POSITIONS,
};

/// At-rest form of a prize's token payload.
#[contracttype]
#[derive(Clone, Debug, Eq, PartialEq)]
pub enum StoredToken {
    /// Packed `{amount, payout_type, param, count}`.
    Erc20(StorageWord),
    Erc721(u32),
}

#[contracttype]
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct StoredPrize {
    pub context_id: u64,
    pub token_address: Address,
    pub token: StoredToken,
    pub sponsor: Address,
}

/// A validated prize waiting for its deposit to land.
pub struct PendingPrize {
    pub asset: Asset,
    token: StoredToken,
    shares: Option<Vec<u32>>,
}

pub fn prize_count(env: &Env) -> u64 {
    env.storage()
        .persistent()
        .get(&DataKey::PrizeCount)
        .unwrap_or(0)
}

/// Validate `token_type` and build its stored form. No storage access.
pub fn prepare_prize(token_type: &TokenType) -> Result<PendingPrize, Error> {
    match token_type {
        TokenType::Erc20(payload) => {
            if payload.amount <= 0 {
                return Err(Error::InvalidAmount);
            }
            let (payout_type, param, count) = encode_distribution(payload)?;
            let shares = match &payload.distribution {
                Some(Distribution::Custom(shares)) => Some(shares.clone()),
                _ => None,
            };
            let word = PackedPayout {
                amount: payload.amount as u128,
                payout_type: payout_type as u8,
                param,
                count,
            }
            .pack();

            Ok(PendingPrize {
                asset: Asset::Fungible(payload.amount),
                token: StoredToken::Erc20(word),
                shares,
            })
        }
        TokenType::Erc721(payload) => Ok(PendingPrize {
            asset: Asset::NonFungible(payload.token_id),
            token: StoredToken::Erc721(payload.token_id),
            shares: None,
        }),
    }
}

/// Map a payload's distribution to `(payout_type, param, count)`.
fn encode_distribution(payload: &Erc20Payload) -> Result<(PayoutType, u16, u32), Error> {
    let distribution = match &payload.distribution {
        Some(distribution) => distribution,
        None => {
            if payload.positions != 0 {
                return Err(Error::InvalidDistribution);
            }
            return Ok((PayoutType::Position, 0, 0));
        }
    };

    match distribution {
        Distribution::Linear(weight) => {
            check_positions(payload.positions)?;
            Ok((PayoutType::Linear, narrow_u16(*weight)?, payload.positions))
        }
        Distribution::Exponential(weight) => {
            check_positions(payload.positions)?;
            Ok((PayoutType::Exponential, narrow_u16(*weight)?, payload.positions))
        }
        Distribution::Uniform => {
            check_positions(payload.positions)?;
            Ok((PayoutType::Uniform, 0, payload.positions))
        }
        Distribution::Custom(shares) => {
            let len = shares.len();
            check_positions(len)?;
            let mut total: u64 = 0;
            for share in shares.iter() {
                total += narrow_u16(share)? as u64;
            }
            if total == 0 {
                return Err(Error::InvalidDistribution);
            }
            Ok((PayoutType::Custom, narrow_u16(len)?, len))
        }
    }
}

fn check_positions(positions: u32) -> Result<(), Error> {
    if positions == 0 || positions > MAX_POSITIONS {
        return Err(Error::InvalidDistribution);
    }
    Ok(())
}

/// Allocate the next prize id and persist the prize. Returns the prize as
/// read back from storage.
pub fn commit_prize(
    env: &Env,
    context_id: u64,
    token_address: Address,
    sponsor: Address,
    pending: PendingPrize,
) -> Result<Prize, Error> {
    let prize_id = prize_count(env).checked_add(1).ok_or(Error::Overflow)?;
    set_persistent(env, &DataKey::PrizeCount, &prize_id);

    if let Some(shares) = &pending.shares {
        store_shares(env, prize_id, shares)?;
    }

    let record = StoredPrize {
        context_id,
        token_address,
        token: pending.token,
        sponsor,
    };
    set_persistent(env, &DataKey::Prize(prize_id), &record);

    decode(env, prize_id, record)
}

fn store_shares(env: &Env, prize_id: u64, shares: &Vec<u32>) -> Result<(), Error> {
    let packed = slots::from_array(env, shares)?;
    for (slot_index, slot) in packed.iter().enumerate() {
        set_persistent(env, &DataKey::ShareSlot(prize_id, slot_index as u32), &slot);
    }
    set_persistent(env, &DataKey::ShareCount(prize_id), &shares.len());
    Ok(())
}

fn load_shares(env: &Env, prize_id: u64) -> Vec<u32> {
    let count: u32 = env
        .storage()
        .persistent()
        .get(&DataKey::ShareCount(prize_id))
        .unwrap_or(0);

    slots::to_array(env, count, |slot_index| {
        env.storage()
            .persistent()
            .get(&DataKey::ShareSlot(prize_id, slot_index))
            .unwrap_or_default()
    })
}

/// Load the stored record of `prize_id`, failing with `PrizeNotFound` if it
/// was never written.
pub fn assert_exists(env: &Env, prize_id: u64) -> Result<StoredPrize, Error> {
    env.storage()
        .persistent()
        .get(&DataKey::Prize(prize_id))
        .ok_or(Error::PrizeNotFound)
}

/// Read and unpack a prize. Custom share slots are only read for prizes
/// whose payout type is Custom.
pub fn get_prize(env: &Env, prize_id: u64) -> Result<Prize, Error> {
    let record = assert_exists(env, prize_id)?;
    decode(env, prize_id, record)
}

fn decode(env: &Env, prize_id: u64, record: StoredPrize) -> Result<Prize, Error> {
    let token_type = match record.token {
        StoredToken::Erc721(token_id) => TokenType::Erc721(Erc721Payload { token_id }),
        StoredToken::Erc20(word) => {
            let payout = PackedPayout::unpack(&word);
            let amount = i128::try_from(payout.amount).map_err(|_| Error::CorruptRecord)?;
            let payout_type =
                PayoutType::from_u8(payout.payout_type).ok_or(Error::CorruptRecord)?;
            let weight = payout.param as u32;

            let distribution = match payout_type {
                PayoutType::Position => None,
                PayoutType::Linear => Some(Distribution::Linear(weight)),
                PayoutType::Exponential => Some(Distribution::Exponential(weight)),
                PayoutType::Uniform => Some(Distribution::Uniform),
                PayoutType::Custom => Some(Distribution::Custom(load_shares(env, prize_id))),
            };

            TokenType::Erc20(Erc20Payload {
                amount,
                distribution,
                positions: payout.count,
            })
        }
    };

    Ok(Prize {
        id: prize_id,
        context_id: record.context_id,
        token_address: record.token_address,
        token_type,
        sponsor: record.sponsor,
    })
}
