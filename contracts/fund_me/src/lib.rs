//! # FundMe Ledger Contract
//!
//! A minimal crowdfunding ledger. Contributions arrive in the native asset,
//! are valued in USD through an external price oracle, and must be worth at
//! least [`MINIMUM_USD`]. A single owner, fixed at deployment, can drain the
//! pool and reset every contributor's balance.
//!
//! | Phase        | Entry Point(s)                                        |
//! |--------------|-------------------------------------------------------|
//! | Deployment   | `__constructor`                                       |
//! | Funding      | [`FundMe::fund`]                                      |
//! | Withdrawal   | [`FundMe::withdraw`], [`FundMe::cheaper_withdraw`]    |
//! | Queries      | `get_owner`, `get_price_feed`, `get_funder`, ...      |
//!
//! ## Architecture
//!
//! Price lookups and conversion live in [`oracle`]. The withdrawal phases
//! live in [`withdrawal`]. Storage access is delegated to [`storage`]. This
//! file holds only the public entry points and error mapping.

#![no_std]

use soroban_sdk::{contract, contracterror, contractimpl, token, Address, Env};

mod events;
mod oracle;
mod storage;
mod types;
mod withdrawal;

#[cfg(test)]
mod test_events;
#[cfg(test)]
mod test_withdraw;

pub use events::{Funded, Withdrawn};
pub use oracle::{PriceFeed, PriceFeedClient, MINIMUM_USD, NATIVE_DECIMALS};
pub use types::{LedgerConfig, PriceData};

#[contracterror]
#[derive(Copy, Clone, Debug, Eq, PartialEq, PartialOrd, Ord)]
#[repr(u32)]
pub enum Error {
    NotOwner                 = 1,
    InsufficientContribution = 2,
    PriceUnavailable         = 3,
    TransferFailed           = 4,
    IndexOutOfRange          = 5,
    ArithmeticOverflow       = 6,
}

#[contract]
pub struct FundMe;

#[contractimpl]
impl FundMe {
    /// Deploy the ledger.
    ///
    /// `owner` must sign the deployment and becomes the only account able to
    /// withdraw. `price_feed` and `native_asset` are fixed for the contract's
    /// lifetime.
    pub fn __constructor(env: Env, owner: Address, price_feed: Address, native_asset: Address) {
        owner.require_auth();
        storage::save_config(
            &env,
            &LedgerConfig {
                owner,
                price_feed,
                native_asset,
            },
        );
    }

    // ─────────────────────────────────────────────────────────
    // Funding
    // ─────────────────────────────────────────────────────────

    /// Contribute `amount` of the native asset.
    ///
    /// Fails with `PriceUnavailable` if the oracle cannot be read and with
    /// `InsufficientContribution` if `amount` is worth less than
    /// [`MINIMUM_USD`]. Either way nothing is transferred or recorded.
    pub fn fund(env: Env, funder: Address, amount: i128) -> Result<(), Error> {
        funder.require_auth();

        let config = storage::load_config(&env);
        let price = oracle::fetch_price(&env, &config.price_feed)?;
        let usd_value = if amount > 0 {
            oracle::to_usd(amount, &price)?
        } else {
            0
        };
        if usd_value < MINIMUM_USD {
            return Err(Error::InsufficientContribution);
        }

        let total = storage::load_amount_funded(&env, &funder)
            .checked_add(amount)
            .ok_or(Error::ArithmeticOverflow)?;

        token::Client::new(&env, &config.native_asset).transfer(
            &funder,
            &env.current_contract_address(),
            &amount,
        );

        storage::save_amount_funded(&env, &funder, total);
        storage::push_funder(&env, &funder);

        events::publish_funded(&env, &funder, amount, usd_value);
        Ok(())
    }

    // ─────────────────────────────────────────────────────────
    // Withdrawal (owner only)
    // ─────────────────────────────────────────────────────────

    /// Zero every funder's balance, reset the funder list and send the whole
    /// held balance to the owner.
    ///
    /// Returns the amount transferred.
    pub fn withdraw(env: Env, caller: Address) -> Result<i128, Error> {
        let config = withdrawal::require_owner(&env, &caller)?;
        let cleared = withdrawal::zero_balances_by_index(&env);
        withdrawal::settle_and_transfer(&env, &config, cleared)
    }

    /// Same outcome as [`FundMe::withdraw`], reading the funder list from
    /// storage only once.
    pub fn cheaper_withdraw(env: Env, caller: Address) -> Result<i128, Error> {
        let config = withdrawal::require_owner(&env, &caller)?;
        let funders = storage::load_funders(&env);
        let cleared = withdrawal::zero_balances_from_snapshot(&env, &funders);
        withdrawal::settle_and_transfer(&env, &config, cleared)
    }

    // ─────────────────────────────────────────────────────────
    // Queries
    // ─────────────────────────────────────────────────────────

    pub fn get_owner(env: Env) -> Address {
        storage::load_config(&env).owner
    }

    pub fn get_price_feed(env: Env) -> Address {
        storage::load_config(&env).price_feed
    }

    pub fn get_native_asset(env: Env) -> Address {
        storage::load_config(&env).native_asset
    }

    /// Cumulative amount `funder` contributed since the last withdrawal.
    pub fn get_address_to_amount_funded(env: Env, funder: Address) -> i128 {
        storage::load_amount_funded(&env, &funder)
    }

    /// Funder recorded by the `index`-th successful `fund` call since the
    /// last withdrawal.
    pub fn get_funder(env: Env, index: u32) -> Result<Address, Error> {
        storage::funder_at(&env, index).ok_or(Error::IndexOutOfRange)
    }

    pub fn get_funder_count(env: Env) -> u32 {
        storage::funder_count(&env)
    }

    pub fn get_minimum_usd(_env: Env) -> i128 {
        MINIMUM_USD
    }

    /// USD value of `amount` native units at the oracle's current price.
    pub fn get_conversion_rate(env: Env, amount: i128) -> Result<i128, Error> {
        let config = storage::load_config(&env);
        let price = oracle::fetch_price(&env, &config.price_feed)?;
        oracle::to_usd(amount, &price)
    }
}
