extern crate std;

use std::vec::Vec;

use soroban_sdk::{testutils::Address as _, Address};

use crate::invariants::{assert_fully_withdrawn, assert_ledger_consistent, assert_owner_unchanged};
use crate::mock::{FreezableFixture, Fixture, UNIT};
use crate::{Error, FundMeClient};

/// The two withdrawal entry points under test.
#[derive(Clone, Copy, Debug)]
enum Variant {
    Withdraw,
    Cheaper,
}

const VARIANTS: [Variant; 2] = [Variant::Withdraw, Variant::Cheaper];

impl Variant {
    fn call(self, client: &FundMeClient, caller: &Address) -> i128 {
        match self {
            Variant::Withdraw => client.withdraw(caller),
            Variant::Cheaper => client.cheaper_withdraw(caller),
        }
    }

    fn try_call(self, client: &FundMeClient, caller: &Address) -> Result<i128, Error> {
        let result = match self {
            Variant::Withdraw => client.try_withdraw(caller),
            Variant::Cheaper => client.try_cheaper_withdraw(caller),
        };
        match result {
            Ok(Ok(amount)) => Ok(amount),
            Err(Ok(err)) => Err(err),
            other => panic!("unexpected withdrawal outcome: {:?}", other),
        }
    }
}

/// Everything a withdrawal can change, as seen from outside the ledger.
#[derive(Debug, PartialEq, Eq)]
struct Snapshot {
    balances: Vec<i128>,
    funder_count: u32,
    held: i128,
}

fn snapshot(f: &Fixture, client: &FundMeClient, funders: &[Address]) -> Snapshot {
    Snapshot {
        balances: funders
            .iter()
            .map(|a| client.get_address_to_amount_funded(a))
            .collect(),
        funder_count: client.get_funder_count(),
        held: f.token.balance(&client.address),
    }
}

#[test]
fn test_withdraw_single_funder() {
    for variant in VARIANTS {
        let f = Fixture::new();
        let funder = f.funder(UNIT);
        f.client.fund(&funder, &UNIT);

        let owner_before = f.token.balance(&f.owner);
        let paid = variant.call(&f.client, &f.owner);

        assert_eq!(paid, UNIT, "{:?}", variant);
        assert_eq!(f.token.balance(&f.owner), owner_before + UNIT);
        assert_fully_withdrawn(&f.client, &f.token, &[funder]);
        assert_owner_unchanged(&f.client, &f.owner);
    }
}

#[test]
fn test_withdraw_five_funders() {
    for variant in VARIANTS {
        let f = Fixture::new();
        let funders: Vec<Address> = (0..5).map(|_| f.funder(UNIT)).collect();
        for funder in &funders {
            f.client.fund(funder, &UNIT);
        }
        assert_ledger_consistent(&f.client, &f.token, &funders);

        let owner_before = f.token.balance(&f.owner);
        variant.call(&f.client, &f.owner);

        assert_eq!(f.token.balance(&f.owner), owner_before + 5 * UNIT, "{:?}", variant);
        assert_fully_withdrawn(&f.client, &f.token, &funders);
        assert_eq!(
            f.client.try_get_funder(&0),
            Err(Ok(Error::IndexOutOfRange)),
            "{:?}",
            variant
        );
    }
}

#[test]
fn test_withdraw_rejects_non_owner() {
    for variant in VARIANTS {
        let f = Fixture::new();
        let funder = f.funder(UNIT);
        f.client.fund(&funder, &UNIT);
        let intruder = Address::generate(&f.env);

        assert_eq!(
            variant.try_call(&f.client, &intruder),
            Err(Error::NotOwner),
            "{:?}",
            variant
        );
        // A funder is not the owner either.
        assert_eq!(variant.try_call(&f.client, &funder), Err(Error::NotOwner));

        assert_eq!(f.client.get_address_to_amount_funded(&funder), UNIT);
        assert_eq!(f.client.get_funder(&0), funder);
        assert_eq!(f.held(), UNIT);
        assert_eq!(f.token.balance(&intruder), 0);
        assert_owner_unchanged(&f.client, &f.owner);
    }
}

#[test]
fn test_withdraw_with_repeat_funder() {
    for variant in VARIANTS {
        let f = Fixture::new();
        let a = f.funder(3 * UNIT);
        let b = f.funder(UNIT);
        f.client.fund(&a, &UNIT);
        f.client.fund(&b, &UNIT);
        f.client.fund(&a, &(2 * UNIT));
        assert_eq!(f.client.get_funder_count(), 3);

        let paid = variant.call(&f.client, &f.owner);

        assert_eq!(paid, 4 * UNIT, "{:?}", variant);
        assert_fully_withdrawn(&f.client, &f.token, &[a, b]);
    }
}

#[test]
fn test_withdraw_empty_ledger() {
    for variant in VARIANTS {
        let f = Fixture::new();
        assert_eq!(variant.call(&f.client, &f.owner), 0, "{:?}", variant);
        assert_eq!(f.client.get_funder_count(), 0);
    }
}

#[test]
fn test_funding_restarts_after_withdrawal() {
    for variant in VARIANTS {
        let f = Fixture::new();
        let a = f.funder(2 * UNIT);
        let b = f.funder(UNIT);
        f.client.fund(&a, &UNIT);
        variant.call(&f.client, &f.owner);

        f.client.fund(&b, &UNIT);
        f.client.fund(&a, &UNIT);

        assert_eq!(f.client.get_funder_count(), 2, "{:?}", variant);
        assert_eq!(f.client.get_funder(&0), b);
        assert_eq!(f.client.get_funder(&1), a);
        assert_eq!(f.client.get_address_to_amount_funded(&a), UNIT);
        assert_ledger_consistent(&f.client, &f.token, &[a, b]);
    }
}

#[test]
fn test_withdraw_sweeps_tokens_sent_outside_fund() {
    for variant in VARIANTS {
        let f = Fixture::new();
        let funder = f.funder(UNIT);
        f.client.fund(&funder, &UNIT);
        f.mint(&f.client.address, 7);

        let owner_before = f.token.balance(&f.owner);
        assert_eq!(variant.call(&f.client, &f.owner), UNIT + 7, "{:?}", variant);
        assert_eq!(f.token.balance(&f.owner), owner_before + UNIT + 7);
        assert_fully_withdrawn(&f.client, &f.token, &[funder]);
    }
}

#[test]
fn test_withdraw_variants_reach_identical_state() {
    let f = Fixture::new();
    let plain = FundMeClient::new(&f.env, &f.client.address);
    let cheaper = f.deploy_sibling();
    let funders: Vec<Address> = (0..4).map(|_| f.funder(20 * UNIT)).collect();

    // Same call sequence against both ledgers, repeat funders included.
    let sequence = [(0, UNIT), (1, 2 * UNIT), (0, UNIT / 2), (3, UNIT), (2, 5 * UNIT), (3, UNIT)];
    for ledger in [&plain, &cheaper] {
        for (who, amount) in sequence {
            ledger.fund(&funders[who], &amount);
        }
    }
    assert_eq!(snapshot(&f, &plain, &funders), snapshot(&f, &cheaper, &funders));

    let owner_start = f.token.balance(&f.owner);
    let paid_plain = plain.withdraw(&f.owner);
    let owner_mid = f.token.balance(&f.owner);
    let paid_cheaper = cheaper.cheaper_withdraw(&f.owner);
    let owner_end = f.token.balance(&f.owner);

    assert_eq!(paid_plain, paid_cheaper);
    assert_eq!(owner_mid - owner_start, owner_end - owner_mid);
    assert_eq!(snapshot(&f, &plain, &funders), snapshot(&f, &cheaper, &funders));
    assert_fully_withdrawn(&plain, &f.token, &funders);
    assert_fully_withdrawn(&cheaper, &f.token, &funders);

    // Both keep behaving identically after the reset.
    plain.fund(&funders[1], &UNIT);
    cheaper.fund(&funders[1], &UNIT);
    assert_eq!(snapshot(&f, &plain, &funders), snapshot(&f, &cheaper, &funders));
    assert_eq!(plain.get_funder(&0), cheaper.get_funder(&0));
}

#[test]
fn test_rejected_transfer_rolls_back_withdrawal() {
    for variant in VARIANTS {
        let f = FreezableFixture::new();
        let a = f.funder(UNIT);
        let b = f.funder(UNIT);
        f.client.fund(&a, &UNIT);
        f.client.fund(&b, &UNIT);

        f.token.set_frozen(&f.owner, &true);
        assert_eq!(
            variant.try_call(&f.client, &f.owner),
            Err(Error::TransferFailed),
            "{:?}",
            variant
        );

        // Balances, list and held funds are exactly as before the attempt.
        assert_eq!(f.client.get_address_to_amount_funded(&a), UNIT);
        assert_eq!(f.client.get_address_to_amount_funded(&b), UNIT);
        assert_eq!(f.client.get_funder_count(), 2);
        assert_eq!(f.client.get_funder(&0), a);
        assert_eq!(f.client.get_funder(&1), b);
        assert_eq!(f.token.balance(&f.client.address), 2 * UNIT);
        assert_eq!(f.token.balance(&f.owner), 0);

        f.token.set_frozen(&f.owner, &false);
        assert_eq!(variant.call(&f.client, &f.owner), 2 * UNIT);
        assert_eq!(f.token.balance(&f.owner), 2 * UNIT);
        assert_eq!(f.client.get_address_to_amount_funded(&a), 0);
        assert_eq!(f.client.get_funder_count(), 0);
    }
}
