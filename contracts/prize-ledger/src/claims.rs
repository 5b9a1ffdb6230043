//! One-shot claim flags.
//!
//! A claim flag is keyed by `(context_id, sha256(share))`, where `share` is
//! serialized as:
//!
//!   `Single(id)`         -> `0x00 || id_be (8 bytes)`
//!   `Distributed(id, i)` -> `0x01 || id_be (8 bytes) || i_be (4 bytes)`
//!
//! The tag byte and fixed widths make the encoding injective, so distinct
//! shares never share a preimage. Flags only ever go from unset to `true`;
//! there is no way to clear one.

use soroban_sdk::{Bytes, BytesN, Env};

use crate::{set_persistent, DataKey, Error, PrizeShare};

const SINGLE_TAG: u8 = 0;
const DISTRIBUTED_TAG: u8 = 1;

/// Hash of a prize share, independent of context.
pub fn share_hash(env: &Env, share: &PrizeShare) -> BytesN<32> {
    let mut preimage = [0u8; 13];
    let len = match share {
        PrizeShare::Single(prize_id) => {
            preimage[0] = SINGLE_TAG;
            preimage[1..9].copy_from_slice(&prize_id.to_be_bytes());
            9
        }
        PrizeShare::Distributed(prize_id, payout_index) => {
            preimage[0] = DISTRIBUTED_TAG;
            preimage[1..9].copy_from_slice(&prize_id.to_be_bytes());
            preimage[9..13].copy_from_slice(&payout_index.to_be_bytes());
            13
        }
    };

    env.crypto()
        .sha256(&Bytes::from_slice(env, &preimage[..len]))
        .into()
}

/// A claim flag location. Build it once per operation and reuse it for the
/// check and the write so the share is hashed a single time.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct ClaimKey {
    pub context_id: u64,
    pub share_hash: BytesN<32>,
}

impl ClaimKey {
    pub fn new(env: &Env, context_id: u64, share: &PrizeShare) -> Self {
        ClaimKey {
            context_id,
            share_hash: share_hash(env, share),
        }
    }

    fn data_key(&self) -> DataKey {
        DataKey::Claimed(self.context_id, self.share_hash.clone())
    }

    /// Absent flags read as unclaimed.
    pub fn is_claimed(&self, env: &Env) -> bool {
        env.storage()
            .persistent()
            .get(&self.data_key())
            .unwrap_or(false)
    }

    pub fn assert_not_claimed(&self, env: &Env) -> Result<(), Error> {
        if self.is_claimed(env) {
            return Err(Error::AlreadyClaimed);
        }
        Ok(())
    }

    /// Set the flag. Must run only after the payout transfer succeeded.
    pub fn mark_claimed(&self, env: &Env) {
        set_persistent(env, &self.data_key(), &true);
    }
}

pub fn is_claimed(env: &Env, context_id: u64, share: &PrizeShare) -> bool {
    ClaimKey::new(env, context_id, share).is_claimed(env)
}
