extern crate std;

use soroban_sdk::{
    symbol_short,
    testutils::Events,
    vec, Address, Env, IntoVal, TryIntoVal, Val, Vec,
};

use crate::events::{Funded, Withdrawn};
use crate::mock::{Fixture, UNIT};

/// Last event published by `contract`, skipping events from the token.
fn last_event_from(env: &Env, contract: &Address) -> (Vec<Val>, Val) {
    let mut found = None;
    for (source, topics, data) in env.events().all().iter() {
        if &source == contract {
            found = Some((topics, data));
        }
    }
    found.expect("No events found")
}

#[test]
fn test_funded_event() {
    let f = Fixture::with_price(2_000, 0);
    let funder = f.funder(UNIT);

    f.client.fund(&funder, &UNIT);

    let (topics, data) = last_event_from(&f.env, &f.client.address);
    let expected_topics = vec![
        &f.env,
        symbol_short!("funded").into_val(&f.env),
        funder.into_val(&f.env),
    ];
    assert_eq!(topics, expected_topics);

    let event_data: Funded = data.try_into_val(&f.env).unwrap();
    assert_eq!(
        event_data,
        Funded {
            funder: funder.clone(),
            amount: UNIT,
            usd_value: 2_000 * UNIT,
        }
    );
}

#[test]
fn test_withdrawn_event() {
    let f = Fixture::new();
    let a = f.funder(2 * UNIT);
    let b = f.funder(UNIT);
    f.client.fund(&a, &UNIT);
    f.client.fund(&b, &UNIT);
    f.client.fund(&a, &UNIT);

    f.client.cheaper_withdraw(&f.owner);

    let (topics, data) = last_event_from(&f.env, &f.client.address);
    let expected_topics = vec![
        &f.env,
        symbol_short!("withdrawn").into_val(&f.env),
        f.owner.into_val(&f.env),
    ];
    assert_eq!(topics, expected_topics);

    let event_data: Withdrawn = data.try_into_val(&f.env).unwrap();
    assert_eq!(
        event_data,
        Withdrawn {
            owner: f.owner.clone(),
            amount: 3 * UNIT,
            funders_cleared: 3,
        }
    );
}

#[test]
fn test_rejected_fund_emits_nothing() {
    let f = Fixture::new();
    let funder = f.funder(UNIT);

    assert!(f.client.try_fund(&funder, &1).is_err());

    let from_ledger = f
        .env
        .events()
        .all()
        .iter()
        .filter(|(source, _, _)| source == &f.client.address)
        .count();
    assert_eq!(from_ledger, 0);
}
