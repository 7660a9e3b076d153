use ed25519_dalek::SigningKey;
use sentinel_common::address::Address;
use sentinel_common::crypto::schnorr::ValidatorPublicKey;
use sentinel_common::genesis::{GenesisDelegation, GenesisState, GenesisValidator};
use sentinel_ledger::{
    BanStatus, ElectionParams, RedbBackend, Term, TermScheduler, ValidatorSetStore,
};

fn public_key(seed: u8) -> ValidatorPublicKey {
    ValidatorPublicKey::from_signing_key(&SigningKey::from_bytes(&[seed; 32]))
}

fn genesis() -> GenesisState {
    let validators: Vec<GenesisValidator> = (1..=4u8)
        .map(|seed| GenesisValidator {
            public_key: public_key(seed),
            deposit: 10_000_000,
        })
        .collect();
    let delegations = validators
        .iter()
        .map(|v| GenesisDelegation {
            delegator: Address([0xD0; 20]),
            delegatee: v.address(),
            amount: 5_000,
        })
        .collect();
    GenesisState { validators, delegations }
}

fn params() -> ElectionParams {
    ElectionParams {
        term_length: 10,
        max_num_of_validators: 30,
        min_num_of_validators: 2,
        delegation_threshold: 1_000,
        min_deposit: 1_000_000,
    }
}

#[test]
fn test_redb_store_persists_blocks_across_reopen() {
    let dir = tempfile::tempdir().unwrap();
    let delegator = Address([0xD0; 20]);
    let a = Address::from_public_key(&public_key(1));

    {
        let mut store = ValidatorSetStore::new(RedbBackend::open(dir.path()).unwrap());
        store.init_genesis(&genesis(), &params()).unwrap();

        let mut staged = store.begin(1).unwrap();
        staged.delegate(&delegator, &a, 2_500).unwrap();
        store.commit(staged).unwrap();
    }

    let store = ValidatorSetStore::new(RedbBackend::open(dir.path()).unwrap());
    assert_eq!(store.best_block().unwrap(), 1);
    assert_eq!(store.validator(&a, 1).unwrap().unwrap().delegated_stake, 5_000);
    assert_eq!(store.validator(&a, 2).unwrap().unwrap().delegated_stake, 7_500);
}

#[test]
fn test_term_boundary_reorders_authorities() {
    let dir = tempfile::tempdir().unwrap();
    let mut store = ValidatorSetStore::new(RedbBackend::open(dir.path()).unwrap());
    store.init_genesis(&genesis(), &params()).unwrap();
    let scheduler = TermScheduler::new(params().term_length);

    let genesis_order = store.possible_authors(1).unwrap();
    let last = *genesis_order.last().unwrap();

    for height in 1..=9u64 {
        let mut staged = store.begin(height).unwrap();
        if height == 3 {
            staged.delegate(&Address([0xD1; 20]), &last, 1).unwrap();
        }
        staged.close_block(&scheduler, &params());
        store.commit(staged).unwrap();
    }

    // The extra delegation only counts once the term closes.
    assert_eq!(store.possible_authors(9).unwrap(), genesis_order);
    assert_eq!(store.possible_authors(10).unwrap()[0], last);
    assert_eq!(
        store.term_metadata(10).unwrap(),
        Term { id: 1, first_block: 10, last_finished_block: 9 }
    );
    assert_eq!(store.term_metadata(9).unwrap(), Term::genesis());
}

#[test]
fn test_ban_shrinks_authorities_mid_term() {
    let dir = tempfile::tempdir().unwrap();
    let mut store = ValidatorSetStore::new(RedbBackend::open(dir.path()).unwrap());
    store.init_genesis(&genesis(), &params()).unwrap();
    let a = Address::from_public_key(&public_key(1));

    let scheduler = TermScheduler::new(params().term_length);
    assert_eq!(store.ban(&a, &scheduler, &params()).unwrap(), BanStatus::Applied);
    let authors = store.possible_authors(2).unwrap();
    assert_eq!(authors.len(), 3);
    assert!(!authors.contains(&a));
    assert_eq!(store.banned(2).unwrap(), vec![a]);
    assert!(store
        .delegations_of(&Address([0xD0; 20]), 2)
        .unwrap()
        .iter()
        .all(|d| d.delegatee != a));
    assert_eq!(store.possible_authors(1).unwrap().len(), 4);
}

#[test]
fn test_ban_on_boundary_block_still_closes_term() {
    let dir = tempfile::tempdir().unwrap();
    let mut store = ValidatorSetStore::new(RedbBackend::open(dir.path()).unwrap());
    store.init_genesis(&genesis(), &params()).unwrap();
    let scheduler = TermScheduler::new(params().term_length);
    let a = Address::from_public_key(&public_key(1));

    for height in 1..=8u64 {
        let mut staged = store.begin(height).unwrap();
        staged.close_block(&scheduler, &params());
        store.commit(staged).unwrap();
    }

    // Block 9 is the last block of the genesis term and carries only the ban.
    assert_eq!(store.ban(&a, &scheduler, &params()).unwrap(), BanStatus::Applied);
    assert_eq!(store.best_block().unwrap(), 9);
    assert_eq!(
        store.term_metadata(10).unwrap(),
        Term { id: 1, first_block: 10, last_finished_block: 9 }
    );
    let authors = store.possible_authors(10).unwrap();
    assert_eq!(authors.len(), 3);
    assert!(!authors.contains(&a));
}
