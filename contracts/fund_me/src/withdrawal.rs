//! # Withdrawal
//!
//! Both withdrawal entry points run the same three phases:
//!
//! 1. [`require_owner`]: the single access-control check.
//! 2. Zero every listed funder's balance, either by walking storage entry by
//!    entry ([`zero_balances_by_index`]) or from a one-shot snapshot
//!    ([`zero_balances_from_snapshot`]).
//! 3. [`settle_and_transfer`]: clear the funder list, then pay out the held
//!    balance as the very last effect.
//!
//! Everything a recipient could observe is settled before the outbound
//! transfer. A rejected transfer aborts the invocation, which rolls back
//! phases 2 and 3 together.

use soroban_sdk::{token, Address, Env, Vec};

use crate::events;
use crate::storage::{
    clear_funders, funder_at, funder_count, load_config, save_amount_funded,
};
use crate::types::LedgerConfig;
use crate::Error;

/// Authenticate `caller` and check it against the stored owner.
pub fn require_owner(env: &Env, caller: &Address) -> Result<LedgerConfig, Error> {
    caller.require_auth();
    let config = load_config(env);
    if *caller != config.owner {
        return Err(Error::NotOwner);
    }
    Ok(config)
}

/// Zero balances by reading the list length and each entry from storage on
/// every iteration. Returns the number of entries visited.
pub fn zero_balances_by_index(env: &Env) -> u32 {
    let mut index = 0;
    while index < funder_count(env) {
        if let Some(funder) = funder_at(env, index) {
            save_amount_funded(env, &funder, 0);
        }
        index += 1;
    }
    index
}

/// Zero balances from a list loaded once up front. Returns the number of
/// entries visited.
pub fn zero_balances_from_snapshot(env: &Env, funders: &Vec<Address>) -> u32 {
    for funder in funders.iter() {
        save_amount_funded(env, &funder, 0);
    }
    funders.len()
}

/// Clear the funder list and transfer the whole held balance to the owner.
///
/// Returns the amount paid out.
pub fn settle_and_transfer(
    env: &Env,
    config: &LedgerConfig,
    funders_cleared: u32,
) -> Result<i128, Error> {
    clear_funders(env);

    let this = env.current_contract_address();
    let token_client = token::Client::new(env, &config.native_asset);
    let held = token_client.balance(&this);

    events::publish_withdrawn(env, &config.owner, held, funders_cleared);

    if held > 0 {
        match token_client.try_transfer(&this, &config.owner, &held) {
            Ok(Ok(())) => {}
            _ => return Err(Error::TransferFailed),
        }
    }
    Ok(held)
}
