//! # Storage
//!
//! Typed helpers over the two Soroban storage tiers used by the ledger.
//!
//! ## Instance storage (contract-lifetime TTL)
//!
//! | Key           | Type           | Description                         |
//! |---------------|----------------|-------------------------------------|
//! | `Config`      | `LedgerConfig` | Owner, price feed and native asset  |
//!
//! Instance TTL is bumped by **7 days** whenever it falls below 1 day remaining.
//!
//! ## Persistent storage (per-entry TTL)
//!
//! | Key                     | Type           | Description                          |
//! |-------------------------|----------------|--------------------------------------|
//! | `AmountFunded(address)` | `i128`         | Cumulative contribution of a funder  |
//! | `Funders`               | `Vec<Address>` | Funders since the last withdrawal    |
//!
//! Persistent TTL is bumped by **30 days** whenever it falls below 7 days remaining.
//!
//! Balances are zeroed rather than removed on withdrawal, so a funder's
//! entry keeps answering `0` after the reset instead of disappearing.

use soroban_sdk::{contracttype, Address, Env, Vec};

use crate::types::LedgerConfig;

// ── TTL Constants ────────────────────────────────────────────────────

/// Approximate ledgers per day (~5 seconds per ledger).
const DAY_IN_LEDGERS: u32 = 17_280;

/// Instance storage: bump by 7 days when below 1 day remaining.
const INSTANCE_BUMP_AMOUNT: u32 = 7 * DAY_IN_LEDGERS;
const INSTANCE_LIFETIME_THRESHOLD: u32 = DAY_IN_LEDGERS;

/// Persistent storage: bump by 30 days when below 7 days remaining.
const PERSISTENT_BUMP_AMOUNT: u32 = 30 * DAY_IN_LEDGERS;
const PERSISTENT_LIFETIME_THRESHOLD: u32 = 7 * DAY_IN_LEDGERS;

// ── Storage Keys ─────────────────────────────────────────────────────

#[contracttype]
#[derive(Clone, Debug, Eq, PartialEq)]
pub enum DataKey {
    /// Immutable ledger configuration (Instance).
    Config,
    /// Cumulative amount contributed by an address (Persistent).
    AmountFunded(Address),
    /// Ordered funder list, duplicates allowed (Persistent).
    Funders,
}

// ── Instance Storage Helpers ─────────────────────────────────────────

fn bump_instance(env: &Env) {
    env.storage()
        .instance()
        .extend_ttl(INSTANCE_LIFETIME_THRESHOLD, INSTANCE_BUMP_AMOUNT);
}

pub fn save_config(env: &Env, config: &LedgerConfig) {
    env.storage().instance().set(&DataKey::Config, config);
    bump_instance(env);
}

/// Retrieve the ledger configuration.
/// Panics if the constructor never ran.
pub fn load_config(env: &Env) -> LedgerConfig {
    bump_instance(env);
    env.storage()
        .instance()
        .get(&DataKey::Config)
        .expect("ledger not configured")
}

// ── Persistent Storage Helpers ───────────────────────────────────────

fn bump_persistent(env: &Env, key: &DataKey) {
    env.storage()
        .persistent()
        .extend_ttl(key, PERSISTENT_LIFETIME_THRESHOLD, PERSISTENT_BUMP_AMOUNT);
}

/// Cumulative amount funded by `funder`; `0` if it never funded.
pub fn load_amount_funded(env: &Env, funder: &Address) -> i128 {
    let key = DataKey::AmountFunded(funder.clone());
    match env.storage().persistent().get::<_, i128>(&key) {
        Some(amount) => {
            bump_persistent(env, &key);
            amount
        }
        None => 0,
    }
}

pub fn save_amount_funded(env: &Env, funder: &Address, amount: i128) {
    let key = DataKey::AmountFunded(funder.clone());
    env.storage().persistent().set(&key, &amount);
    bump_persistent(env, &key);
}

/// Load the whole funder list in a single storage read.
pub fn load_funders(env: &Env) -> Vec<Address> {
    let key = DataKey::Funders;
    match env.storage().persistent().get::<_, Vec<Address>>(&key) {
        Some(funders) => {
            bump_persistent(env, &key);
            funders
        }
        None => Vec::new(env),
    }
}

pub fn save_funders(env: &Env, funders: &Vec<Address>) {
    let key = DataKey::Funders;
    env.storage().persistent().set(&key, funders);
    bump_persistent(env, &key);
}

/// Append one entry to the funder list.
pub fn push_funder(env: &Env, funder: &Address) {
    let mut funders = load_funders(env);
    funders.push_back(funder.clone());
    save_funders(env, &funders);
}

/// Number of entries currently in the funder list.
pub fn funder_count(env: &Env) -> u32 {
    load_funders(env).len()
}

/// Funder at `index`, or `None` when out of range.
pub fn funder_at(env: &Env, index: u32) -> Option<Address> {
    load_funders(env).get(index)
}

/// Reset the funder list to empty.
pub fn clear_funders(env: &Env) {
    save_funders(env, &Vec::new(env));
}
