//! # Types
//!
//! Shared data structures used across the FundMe ledger modules.
//!
//! ## Config / ledger split
//!
//! The ledger's state lives in two storage tiers:
//!
//! - [`LedgerConfig`]: written once by the constructor; never mutated.
//! - Per-funder balances and the funder list: written on every `fund` and
//!   reset on every withdrawal (see [`crate::storage`]).

use soroban_sdk::{contracttype, Address};

/// Immutable ledger configuration, written once at construction.
#[contracttype]
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct LedgerConfig {
    /// The only account allowed to withdraw.
    pub owner: Address,
    /// Price oracle contract queried on every `fund`.
    pub price_feed: Address,
    /// Stellar Asset Contract of the native unit being collected.
    pub native_asset: Address,
}

/// A single price reading reported by the oracle.
///
/// `price` is the value of one whole native unit in reference currency,
/// scaled by `10^decimals`.
#[contracttype]
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct PriceData {
    pub price: i128,
    pub decimals: u32,
    /// Ledger timestamp at which the round was last updated; 0 if never.
    pub timestamp: u64,
}
