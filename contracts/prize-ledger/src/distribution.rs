//! Resolving a prize share to the asset it pays.
//!
//! A distributed prize pays position `i` the amount
//! `amount * w[i] / sum(w)` (rounded down), where the weights `w` are:
//!
//! - `Custom`: the stored shares;
//! - `Uniform`: `1` for every position;
//! - `Linear` / `Exponential`: whatever the configured [`PayoutCurve`]
//!   contract returns for `(payout_type, weight, positions)`.
//!
//! The product is taken in 256 bits, so every accepted amount can be
//! split. Rounding dust stays with the contract.

use soroban_sdk::{contractclient, Address, Env, Vec};
use stellarcade_shared::{packing::PayoutType, U256};

use crate::{transfer::Asset, DataKey, Distribution, Erc20Payload, Error, Prize, PrizeShare, TokenType};

/// External generator of per-position weights for curve distributions.
#[contractclient(name = "PayoutCurveClient")]
pub trait PayoutCurve {
    /// Must return exactly `positions` weights with a non-zero sum.
    fn weights(env: Env, payout_type: u32, weight: u32, positions: u32) -> Vec<u32>;
}

/// The asset `share` pays out of `prize`.
pub fn resolve(env: &Env, prize: &Prize, share: &PrizeShare) -> Result<Asset, Error> {
    match (&prize.token_type, share) {
        (TokenType::Erc721(payload), PrizeShare::Single(_)) => {
            Ok(Asset::NonFungible(payload.token_id))
        }
        (TokenType::Erc20(payload), PrizeShare::Single(_)) if payload.distribution.is_none() => {
            Ok(Asset::Fungible(payload.amount))
        }
        (TokenType::Erc20(payload), PrizeShare::Distributed(_, payout_index))
            if payload.distribution.is_some() =>
        {
            share_amount(env, payload, *payout_index).map(Asset::Fungible)
        }
        _ => Err(Error::InvalidShare),
    }
}

fn share_amount(env: &Env, payload: &Erc20Payload, payout_index: u32) -> Result<i128, Error> {
    if payout_index >= payload.positions {
        return Err(Error::InvalidPayoutIndex);
    }

    let weights = position_weights(env, payload)?;
    let weight = weights.get(payout_index).ok_or(Error::InvalidPayoutIndex)?;

    let mut total: u128 = 0;
    for w in weights.iter() {
        total = total.checked_add(w as u128).ok_or(Error::Overflow)?;
    }
    if total == 0 {
        return Err(Error::InvalidCurveOutput);
    }

    // 256-bit product: any positive i128 amount times a u32 weight fits.
    let amount = U256::from(payload.amount as u128)
        .checked_mul(U256::from(weight))
        .ok_or(Error::Overflow)?
        / U256::from(total);
    if amount.is_zero() {
        return Err(Error::InvalidAmount);
    }
    if amount.bits() > 127 {
        return Err(Error::Overflow);
    }
    Ok(amount.low_u128() as i128)
}

fn position_weights(env: &Env, payload: &Erc20Payload) -> Result<Vec<u32>, Error> {
    match &payload.distribution {
        None => Err(Error::InvalidShare),
        Some(Distribution::Custom(shares)) => Ok(shares.clone()),
        Some(Distribution::Uniform) => {
            let mut weights = Vec::new(env);
            for _ in 0..payload.positions {
                weights.push_back(1);
            }
            Ok(weights)
        }
        Some(Distribution::Linear(weight)) => {
            curve_weights(env, PayoutType::Linear, *weight, payload.positions)
        }
        Some(Distribution::Exponential(weight)) => {
            curve_weights(env, PayoutType::Exponential, *weight, payload.positions)
        }
    }
}

fn curve_weights(
    env: &Env,
    payout_type: PayoutType,
    weight: u32,
    positions: u32,
) -> Result<Vec<u32>, Error> {
    let curve: Address = env
        .storage()
        .instance()
        .get(&DataKey::Curve)
        .ok_or(Error::CurveNotConfigured)?;

    let weights = match PayoutCurveClient::new(env, &curve).try_weights(
        &(payout_type as u32),
        &weight,
        &positions,
    ) {
        Ok(Ok(weights)) => weights,
        _ => return Err(Error::InvalidCurveOutput),
    };

    if weights.len() != positions {
        return Err(Error::InvalidCurveOutput);
    }
    Ok(weights)
}
