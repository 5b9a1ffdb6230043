use soroban_sdk::{
    contract, contractimpl, contracttype,
    testutils::Address as _,
    token::{StellarAssetClient, TokenClient},
    Address, Env, Vec,
};

use stellarcade_prize_ledger::{
    Distribution, Erc20Payload, Erc721Payload, Error, PrizeLedger, PrizeLedgerClient, PrizeShare,
    TokenType,
};

// -------------------------------------------------------------------
// Mock collaborators
// -------------------------------------------------------------------

#[contracttype]
enum NftKey {
    Owner(u32),
    Frozen,
}

/// Bare-bones NFT: one owner per token id, transfers can be frozen.
#[contract]
struct MockNft;

#[contractimpl]
impl MockNft {
    pub fn mint(env: Env, to: Address, token_id: u32) {
        env.storage().persistent().set(&NftKey::Owner(token_id), &to);
    }

    pub fn owner_of(env: Env, token_id: u32) -> Address {
        env.storage()
            .persistent()
            .get(&NftKey::Owner(token_id))
            .unwrap()
    }

    pub fn set_frozen(env: Env, frozen: bool) {
        env.storage().instance().set(&NftKey::Frozen, &frozen);
    }

    pub fn transfer(env: Env, from: Address, to: Address, token_id: u32) {
        from.require_auth();
        let frozen: bool = env
            .storage()
            .instance()
            .get(&NftKey::Frozen)
            .unwrap_or(false);
        if frozen {
            panic!("transfers frozen");
        }
        let owner: Address = env
            .storage()
            .persistent()
            .get(&NftKey::Owner(token_id))
            .unwrap();
        if owner != from {
            panic!("not the owner");
        }
        env.storage().persistent().set(&NftKey::Owner(token_id), &to);
    }
}

/// Linear: `positions - i`. Exponential: `2^(positions - 1 - i)`.
#[contract]
struct MockCurve;

#[contractimpl]
impl MockCurve {
    pub fn weights(env: Env, payout_type: u32, _weight: u32, positions: u32) -> Vec<u32> {
        let mut weights = Vec::new(&env);
        for i in 0..positions {
            let w = if payout_type == 2 {
                1u32 << (positions - 1 - i)
            } else {
                positions - i
            };
            weights.push_back(w);
        }
        weights
    }
}

/// Always returns one weight too few.
#[contract]
struct ShortCurve;

#[contractimpl]
impl ShortCurve {
    pub fn weights(env: Env, _payout_type: u32, _weight: u32, positions: u32) -> Vec<u32> {
        let mut weights = Vec::new(&env);
        for _ in 1..positions {
            weights.push_back(1);
        }
        weights
    }
}

// -------------------------------------------------------------------
// Helpers
// -------------------------------------------------------------------

fn create_token<'a>(env: &'a Env, token_admin: &Address) -> (Address, StellarAssetClient<'a>) {
    let token_contract = env.register_stellar_asset_contract_v2(token_admin.clone());
    let token_client = StellarAssetClient::new(env, &token_contract.address());
    (token_contract.address(), token_client)
}

struct Setup<'a> {
    ledger: PrizeLedgerClient<'a>,
    ledger_id: Address,
    admin: Address,
    sponsor: Address,
    token_addr: Address,
    nft: MockNftClient<'a>,
    nft_addr: Address,
}

fn setup(env: &Env) -> Setup<'_> {
    let admin = Address::generate(env);
    let sponsor = Address::generate(env);
    let token_admin = Address::generate(env);

    let (token_addr, token_sac) = create_token(env, &token_admin);

    let curve_id = env.register(MockCurve, ());
    let nft_addr = env.register(MockNft, ());
    let nft = MockNftClient::new(env, &nft_addr);

    let ledger_id = env.register(PrizeLedger, ());
    let ledger = PrizeLedgerClient::new(env, &ledger_id);

    env.mock_all_auths();
    ledger.init(&admin, &Some(curve_id));

    token_sac.mint(&sponsor, &50_000i128);
    nft.mint(&sponsor, &11);
    nft.mint(&sponsor, &12);

    Setup {
        ledger,
        ledger_id,
        admin,
        sponsor,
        token_addr,
        nft,
        nft_addr,
    }
}

fn nft_prize(token_id: u32) -> TokenType {
    TokenType::Erc721(Erc721Payload { token_id })
}

fn curve_prize(amount: i128, distribution: Distribution, positions: u32) -> TokenType {
    TokenType::Erc20(Erc20Payload {
        amount,
        distribution: Some(distribution),
        positions,
    })
}

// -------------------------------------------------------------------
// NFT prizes
// -------------------------------------------------------------------

#[test]
fn test_nft_prize_deposit_and_claim() {
    let env = Env::default();
    let s = setup(&env);
    let winner = Address::generate(&env);

    let prize = s
        .ledger
        .add_prize(&s.sponsor, &9, &s.nft_addr, &nft_prize(11));
    assert_eq!(prize.token_type, nft_prize(11));
    assert_eq!(s.nft.owner_of(&11), s.ledger_id);
    assert_eq!(s.ledger.get_prize(&prize.id), prize);

    let share = PrizeShare::Single(prize.id);
    s.ledger.claim(&s.admin, &share, &winner);
    assert_eq!(s.nft.owner_of(&11), winner);
    assert!(s.ledger.is_claimed(&9, &share));

    assert_eq!(
        s.ledger.try_claim(&s.admin, &share, &winner),
        Err(Ok(Error::AlreadyClaimed))
    );
    assert_eq!(
        s.ledger.try_share_amount(&share),
        Err(Ok(Error::InvalidShare))
    );
}

#[test]
fn test_nft_deposit_by_non_owner_allocates_no_id() {
    let env = Env::default();
    let s = setup(&env);
    let stranger = Address::generate(&env);

    assert_eq!(
        s.ledger
            .try_add_prize(&stranger, &1, &s.nft_addr, &nft_prize(12)),
        Err(Ok(Error::TransferFailed))
    );
    assert_eq!(s.ledger.prize_count(), 0);
    assert_eq!(s.nft.owner_of(&12), s.sponsor);
}

#[test]
fn test_failed_payout_leaves_share_claimable() {
    let env = Env::default();
    let s = setup(&env);
    let winner = Address::generate(&env);

    let prize = s
        .ledger
        .add_prize(&s.sponsor, &3, &s.nft_addr, &nft_prize(12));
    let share = PrizeShare::Single(prize.id);

    s.nft.set_frozen(&true);
    assert_eq!(
        s.ledger.try_claim(&s.admin, &share, &winner),
        Err(Ok(Error::TransferFailed))
    );
    assert!(!s.ledger.is_claimed(&3, &share));

    s.nft.set_frozen(&false);
    s.ledger.claim(&s.admin, &share, &winner);
    assert_eq!(s.nft.owner_of(&12), winner);
    assert!(s.ledger.is_claimed(&3, &share));
}

#[test]
fn test_nft_prize_rejects_distributed_share() {
    let env = Env::default();
    let s = setup(&env);
    let winner = Address::generate(&env);

    let prize = s
        .ledger
        .add_prize(&s.sponsor, &1, &s.nft_addr, &nft_prize(11));
    assert_eq!(
        s.ledger
            .try_claim(&s.admin, &PrizeShare::Distributed(prize.id, 0), &winner),
        Err(Ok(Error::InvalidShare))
    );
}

#[test]
fn test_ids_shared_across_token_kinds() {
    let env = Env::default();
    let s = setup(&env);

    let first = s
        .ledger
        .add_prize(&s.sponsor, &1, &s.nft_addr, &nft_prize(11));
    let second = s.ledger.add_prize(
        &s.sponsor,
        &2,
        &s.token_addr,
        &curve_prize(100, Distribution::Uniform, 4),
    );
    let third = s
        .ledger
        .add_prize(&s.sponsor, &1, &s.nft_addr, &nft_prize(12));

    assert_eq!((first.id, second.id, third.id), (1, 2, 3));
    assert_eq!(s.ledger.prize_count(), 3);
}

// -------------------------------------------------------------------
// Curve distributions
// -------------------------------------------------------------------

#[test]
fn test_linear_curve_payouts() {
    let env = Env::default();
    let s = setup(&env);
    let token = TokenClient::new(&env, &s.token_addr);

    let prize = s.ledger.add_prize(
        &s.sponsor,
        &5,
        &s.token_addr,
        &curve_prize(1_000, Distribution::Linear(100), 4),
    );

    let expected = [400i128, 300, 200, 100];
    for (index, amount) in expected.iter().enumerate() {
        let winner = Address::generate(&env);
        let share = PrizeShare::Distributed(prize.id, index as u32);
        assert_eq!(s.ledger.share_amount(&share), *amount);
        s.ledger.claim(&s.admin, &share, &winner);
        assert_eq!(token.balance(&winner), *amount);
    }
    assert_eq!(token.balance(&s.ledger_id), 0);
}

#[test]
fn test_exponential_curve_payouts() {
    let env = Env::default();
    let s = setup(&env);

    let prize = s.ledger.add_prize(
        &s.sponsor,
        &5,
        &s.token_addr,
        &curve_prize(700, Distribution::Exponential(3), 3),
    );

    assert_eq!(
        s.ledger.share_amount(&PrizeShare::Distributed(prize.id, 0)),
        400
    );
    assert_eq!(
        s.ledger.share_amount(&PrizeShare::Distributed(prize.id, 1)),
        200
    );
    assert_eq!(
        s.ledger.share_amount(&PrizeShare::Distributed(prize.id, 2)),
        100
    );
    assert_eq!(
        s.ledger
            .try_share_amount(&PrizeShare::Distributed(prize.id, 3)),
        Err(Ok(Error::InvalidPayoutIndex))
    );
}

#[test]
fn test_curve_with_wrong_length_rejected() {
    let env = Env::default();
    let s = setup(&env);
    let winner = Address::generate(&env);

    let short = env.register(ShortCurve, ());
    s.ledger.set_curve(&s.admin, &Some(short));

    let prize = s.ledger.add_prize(
        &s.sponsor,
        &5,
        &s.token_addr,
        &curve_prize(500, Distribution::Linear(1), 5),
    );
    let share = PrizeShare::Distributed(prize.id, 0);

    assert_eq!(
        s.ledger.try_claim(&s.admin, &share, &winner),
        Err(Ok(Error::InvalidCurveOutput))
    );
    assert!(!s.ledger.is_claimed(&5, &share));
}

#[test]
fn test_cleared_curve_blocks_curve_claims() {
    let env = Env::default();
    let s = setup(&env);
    let winner = Address::generate(&env);

    let prize = s.ledger.add_prize(
        &s.sponsor,
        &5,
        &s.token_addr,
        &curve_prize(500, Distribution::Exponential(1), 2),
    );
    s.ledger.set_curve(&s.admin, &None);

    assert_eq!(
        s.ledger
            .try_claim(&s.admin, &PrizeShare::Distributed(prize.id, 0), &winner),
        Err(Ok(Error::CurveNotConfigured))
    );

    // Uniform prizes never consult the curve.
    let uniform = s.ledger.add_prize(
        &s.sponsor,
        &5,
        &s.token_addr,
        &curve_prize(500, Distribution::Uniform, 2),
    );
    s.ledger
        .claim(&s.admin, &PrizeShare::Distributed(uniform.id, 1), &winner);
    assert_eq!(TokenClient::new(&env, &s.token_addr).balance(&winner), 250);
}
