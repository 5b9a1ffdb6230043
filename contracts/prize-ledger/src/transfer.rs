//! Token transfer adapters.
//!
//! Fungible prizes move through the SEP-41 `TokenClient`; NFT prizes move
//! through any contract exposing [`NonFungibleToken::transfer`]. Calls are
//! made with the `try_` client methods so a failing token contract surfaces
//! as `Error::TransferFailed` instead of an opaque trap.

use soroban_sdk::{contractclient, token::TokenClient, Address, Env};

use crate::Error;

/// Minimal NFT interface the ledger relies on.
#[contractclient(name = "NftClient")]
pub trait NonFungibleToken {
    fn transfer(env: Env, from: Address, to: Address, token_id: u32);
}

/// What a deposit or payout moves.
#[derive(Clone, Debug, Eq, PartialEq)]
pub enum Asset {
    Fungible(i128),
    NonFungible(u32),
}

/// Pull `asset` from `from` into the contract.
pub fn deposit(env: &Env, token_address: &Address, from: &Address, asset: &Asset) -> Result<(), Error> {
    let to = env.current_contract_address();
    send(env, token_address, from, &to, asset)
}

/// Send `asset` from the contract to `to`.
pub fn payout(env: &Env, token_address: &Address, to: &Address, asset: &Asset) -> Result<(), Error> {
    let from = env.current_contract_address();
    send(env, token_address, &from, to, asset)
}

fn send(
    env: &Env,
    token_address: &Address,
    from: &Address,
    to: &Address,
    asset: &Asset,
) -> Result<(), Error> {
    let succeeded = match asset {
        Asset::Fungible(amount) => matches!(
            TokenClient::new(env, token_address).try_transfer(from, to, amount),
            Ok(Ok(()))
        ),
        Asset::NonFungible(token_id) => matches!(
            NftClient::new(env, token_address).try_transfer(from, to, token_id),
            Ok(Ok(()))
        ),
    };

    if !succeeded {
        return Err(Error::TransferFailed);
    }
    Ok(())
}
