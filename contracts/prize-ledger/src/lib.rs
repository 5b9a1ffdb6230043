//! Stellarcade Prize Ledger Contract
//!
//! Custody and one-shot settlement of tournament prizes. Sponsors deposit a
//! SEP-41 amount or a single NFT against a context (tournament or pool);
//! the operator later pays each prize share to the recipient it resolved
//! off-chain, exactly once.
//!
//! ## Flow
//! 1. `add_prize`: validate and pack the payout, pull the asset from the
//!    sponsor, then allocate the next prize id and persist the record.
//! 2. `claim`: load the prize, reject already-claimed shares, transfer the
//!    share to the recipient, then mark the share claimed.
//!
//! A failed transfer aborts the invocation and rolls back every write made
//! by it, so no prize id is burned on a failed deposit and no claim flag is
//! set on a failed payout.
//!
//! ## Storage Strategy
//! - `instance()`: Admin, Curve. Contract config sharing one ledger entry.
//! - `persistent()`: PrizeCount, Prize records, custom share slots and
//!   counts, claim flags. TTL bumped on every write.
//!
//! An ERC20 prize's `{amount, payout_type, param, count}` lives in one
//! packed [`StorageWord`]; custom share lists are packed 15 shares per
//! slot. See `stellarcade_shared::packing` and `stellarcade_shared::slots`.
#![no_std]
#![allow(unexpected_cfgs)]

use soroban_sdk::{
    contract, contracterror, contractevent, contractimpl, contracttype, Address, BytesN, Env, Vec,
};

mod claims;
mod distribution;
mod ledger;
mod transfer;

pub use claims::ClaimKey;
pub use distribution::{PayoutCurve, PayoutCurveClient};
pub use stellarcade_shared::StorageWord;
pub use transfer::{NonFungibleToken, NftClient};

use transfer::Asset;

// ---------------------------------------------------------------------------
// Constants
// ---------------------------------------------------------------------------

/// Persistent storage TTL in ledgers (~30 days at 5 s/ledger).
pub const PERSISTENT_BUMP_LEDGERS: u32 = 518_400;

/// Upper bound on the number of paid positions of a distributed prize.
/// Far below the 16-bit `param` limit: a claim reads every Custom share
/// slot (67 at this bound) and asks the curve for every weight, and both
/// must stay inside one invocation's resource budget.
pub const MAX_POSITIONS: u32 = 1_000;

// ---------------------------------------------------------------------------
// Error Types
// ---------------------------------------------------------------------------

#[contracterror]
#[derive(Copy, Clone, Debug, Eq, PartialEq, PartialOrd, Ord)]
#[repr(u32)]
pub enum Error {
    AlreadyInitialized    = 1,
    NotInitialized        = 2,
    NotAuthorized         = 3,
    /// ERC20 amount is zero or negative, or a share resolves to nothing.
    InvalidAmount         = 4,
    /// Empty or oversized distribution, or positions inconsistent with it.
    InvalidDistribution   = 5,
    /// A weight or share does not fit in 16 bits.
    FieldOutOfRange       = 6,
    ShareIndexOutOfBounds = 7,
    PrizeNotFound         = 8,
    AlreadyClaimed        = 9,
    /// `Distributed` payout index is not below the prize's position count.
    InvalidPayoutIndex    = 10,
    /// The share kind does not match the prize (e.g. `Distributed` on an NFT).
    InvalidShare          = 11,
    TransferFailed        = 12,
    CurveNotConfigured    = 13,
    InvalidCurveOutput    = 14,
    /// A stored payout word decodes to an unknown payout type.
    CorruptRecord         = 15,
    Overflow              = 16,
}

impl From<stellarcade_shared::Error> for Error {
    fn from(err: stellarcade_shared::Error) -> Self {
        match err {
            stellarcade_shared::Error::ValueOutOfRange => Error::FieldOutOfRange,
            stellarcade_shared::Error::IndexOutOfBounds => Error::ShareIndexOutOfBounds,
        }
    }
}

// ---------------------------------------------------------------------------
// Storage Types
// ---------------------------------------------------------------------------

#[contracttype]
#[derive(Clone)]
pub enum DataKey {
    // --- instance() ---
    Admin,
    /// Optional payout curve contract for Linear/Exponential prizes.
    Curve,
    // --- persistent() ---
    /// Highest prize id handed out so far.
    PrizeCount,
    Prize(u64),
    /// (prize_id, slot_index) -> packed custom shares.
    ShareSlot(u64, u32),
    /// prize_id -> logical number of custom shares.
    ShareCount(u64),
    /// (context_id, sha256 of the prize share) -> claimed flag.
    Claimed(u64, BytesN<32>),
}

/// How an ERC20 prize is split across leaderboard positions.
#[contracttype]
#[derive(Clone, Debug, Eq, PartialEq)]
pub enum Distribution {
    /// Curve weight in `[0, 65535]`.
    Linear(u32),
    /// Curve weight in `[0, 65535]`.
    Exponential(u32),
    Uniform,
    /// Explicit per-position weights, each in `[0, 65535]`.
    Custom(Vec<u32>),
}

#[contracttype]
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct Erc20Payload {
    pub amount: i128,
    pub distribution: Option<Distribution>,
    /// Paid positions for curve distributions; `0` without a distribution.
    /// Ignored on input for `Custom`, where it is the number of shares.
    pub positions: u32,
}

#[contracttype]
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct Erc721Payload {
    pub token_id: u32,
}

#[contracttype]
#[derive(Clone, Debug, Eq, PartialEq)]
pub enum TokenType {
    Erc20(Erc20Payload),
    Erc721(Erc721Payload),
}

#[contracttype]
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct Prize {
    pub id: u64,
    pub context_id: u64,
    pub token_address: Address,
    pub token_type: TokenType,
    /// Depositor, kept for refunds.
    pub sponsor: Address,
}

/// Identifies exactly which portion of which prize a claim refers to.
#[contracttype]
#[derive(Clone, Debug, Eq, PartialEq)]
pub enum PrizeShare {
    /// The whole prize to one recipient.
    Single(u64),
    /// Payout index `.1` of distributed prize `.0`.
    Distributed(u64, u32),
}

impl PrizeShare {
    pub fn prize_id(&self) -> u64 {
        match self {
            PrizeShare::Single(prize_id) | PrizeShare::Distributed(prize_id, _) => *prize_id,
        }
    }
}

// ---------------------------------------------------------------------------
// Events
// ---------------------------------------------------------------------------

#[contractevent]
pub struct Initialized {
    pub admin: Address,
}

#[contractevent]
pub struct CurveUpdated {
    pub curve: Option<Address>,
}

#[contractevent]
pub struct PrizeAdded {
    #[topic]
    pub context_id: u64,
    #[topic]
    pub prize_id: u64,
    pub sponsor: Address,
    pub token_address: Address,
}

#[contractevent]
pub struct PrizeClaimed {
    #[topic]
    pub context_id: u64,
    #[topic]
    pub prize_id: u64,
    pub recipient: Address,
    pub share: PrizeShare,
}

// ---------------------------------------------------------------------------
// Contract
// ---------------------------------------------------------------------------

#[contract]
pub struct PrizeLedger;

#[contractimpl]
impl PrizeLedger {
    // -----------------------------------------------------------------------
    // init / set_curve
    // -----------------------------------------------------------------------

    /// Initialize the ledger. May only be called once.
    ///
    /// `curve` is the payout curve contract consulted for Linear and
    /// Exponential prizes; without one those prizes can be added but not
    /// claimed until `set_curve` is called.
    pub fn init(env: Env, admin: Address, curve: Option<Address>) -> Result<(), Error> {
        if env.storage().instance().has(&DataKey::Admin) {
            return Err(Error::AlreadyInitialized);
        }

        admin.require_auth();

        env.storage().instance().set(&DataKey::Admin, &admin);
        if let Some(curve) = &curve {
            env.storage().instance().set(&DataKey::Curve, curve);
        }

        Initialized { admin }.publish(&env);

        Ok(())
    }

    /// Replace or clear the payout curve contract. Admin only.
    pub fn set_curve(env: Env, admin: Address, curve: Option<Address>) -> Result<(), Error> {
        require_initialized(&env)?;
        require_admin(&env, &admin)?;

        match &curve {
            Some(curve) => env.storage().instance().set(&DataKey::Curve, curve),
            None => env.storage().instance().remove(&DataKey::Curve),
        }

        CurveUpdated { curve }.publish(&env);

        Ok(())
    }

    // -----------------------------------------------------------------------
    // add_prize
    // -----------------------------------------------------------------------

    /// Deposit a prize for `context_id` and record how it is paid out.
    ///
    /// The payout is validated and packed before any transfer. The asset is
    /// pulled from `sponsor` before the prize id is allocated; if the
    /// transfer fails the call returns `TransferFailed` and `prize_count`
    /// is unchanged.
    pub fn add_prize(
        env: Env,
        sponsor: Address,
        context_id: u64,
        token_address: Address,
        token_type: TokenType,
    ) -> Result<Prize, Error> {
        require_initialized(&env)?;

        sponsor.require_auth();

        let pending = ledger::prepare_prize(&token_type)?;
        transfer::deposit(&env, &token_address, &sponsor, &pending.asset)?;
        let prize = ledger::commit_prize(&env, context_id, token_address, sponsor, pending)?;

        PrizeAdded {
            context_id,
            prize_id: prize.id,
            sponsor: prize.sponsor.clone(),
            token_address: prize.token_address.clone(),
        }
        .publish(&env);

        Ok(prize)
    }

    // -----------------------------------------------------------------------
    // claim
    // -----------------------------------------------------------------------

    /// Pay `share` to `recipient`. Admin only.
    ///
    /// The recipient is resolved by the operator (e.g. whoever finished in
    /// the paid position). Each share can be paid at most once per context:
    /// the claim flag is written only after the transfer has succeeded.
    pub fn claim(
        env: Env,
        admin: Address,
        share: PrizeShare,
        recipient: Address,
    ) -> Result<(), Error> {
        require_initialized(&env)?;
        require_admin(&env, &admin)?;

        let prize = ledger::get_prize(&env, share.prize_id())?;

        let key = ClaimKey::new(&env, prize.context_id, &share);
        key.assert_not_claimed(&env)?;

        let asset = distribution::resolve(&env, &prize, &share)?;
        transfer::payout(&env, &prize.token_address, &recipient, &asset)?;

        key.mark_claimed(&env);

        PrizeClaimed {
            context_id: prize.context_id,
            prize_id: prize.id,
            recipient,
            share,
        }
        .publish(&env);

        Ok(())
    }

    // -----------------------------------------------------------------------
    // Views
    // -----------------------------------------------------------------------

    /// Rebuild a prize from storage, including any custom share list.
    pub fn get_prize(env: Env, prize_id: u64) -> Result<Prize, Error> {
        ledger::get_prize(&env, prize_id)
    }

    /// Number of prizes added so far; also the id of the latest prize.
    pub fn prize_count(env: Env) -> u64 {
        ledger::prize_count(&env)
    }

    /// Token amount `share` pays out. Fails with `InvalidShare` for NFT
    /// prizes and shares that do not match the prize's distribution.
    pub fn share_amount(env: Env, share: PrizeShare) -> Result<i128, Error> {
        let prize = ledger::get_prize(&env, share.prize_id())?;
        match distribution::resolve(&env, &prize, &share)? {
            Asset::Fungible(amount) => Ok(amount),
            Asset::NonFungible(_) => Err(Error::InvalidShare),
        }
    }

    /// Whether `share` has been paid in `context_id`. Unknown prizes and
    /// shares read as unclaimed.
    pub fn is_claimed(env: Env, context_id: u64, share: PrizeShare) -> bool {
        claims::is_claimed(&env, context_id, &share)
    }
}

// ---------------------------------------------------------------------------
// Internal helpers
// ---------------------------------------------------------------------------

fn require_initialized(env: &Env) -> Result<(), Error> {
    if !env.storage().instance().has(&DataKey::Admin) {
        return Err(Error::NotInitialized);
    }
    Ok(())
}

/// Verify that `caller` is the stored admin and has signed the invocation.
fn require_admin(env: &Env, caller: &Address) -> Result<(), Error> {
    let admin: Address = env
        .storage()
        .instance()
        .get(&DataKey::Admin)
        .ok_or(Error::NotInitialized)?;
    caller.require_auth();
    if caller != &admin {
        return Err(Error::NotAuthorized);
    }
    Ok(())
}

/// Write a persistent entry and extend its TTL in one step.
pub(crate) fn set_persistent<V>(env: &Env, key: &DataKey, value: &V)
where
    V: soroban_sdk::IntoVal<Env, soroban_sdk::Val>,
{
    env.storage().persistent().set(key, value);
    env.storage()
        .persistent()
        .extend_ttl(key, PERSISTENT_BUMP_LEDGERS, PERSISTENT_BUMP_LEDGERS);
}
