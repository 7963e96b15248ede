//! # Oracle
//!
//! Price oracle interface and native-to-USD conversion.
//!
//! The oracle is an opaque external contract. The ledger only relies on
//! [`PriceFeed::get_price`], and normalizes with whatever `decimals` the
//! oracle reports instead of assuming a fixed scale.

use soroban_sdk::{contractclient, Address, Env};

use crate::types::PriceData;
use crate::Error;

/// Decimal places of the native unit (stroops per XLM).
pub const NATIVE_DECIMALS: u32 = 7;

/// Minimum contribution: 50 USD at the native unit's decimal scale.
pub const MINIMUM_USD: i128 = 50 * 10i128.pow(NATIVE_DECIMALS);

#[allow(dead_code)]
#[contractclient(name = "PriceFeedClient")]
pub trait PriceFeed {
    /// Current price of one native unit in reference currency.
    fn get_price(env: Env) -> PriceData;
}

/// Query the oracle and reject readings the ledger cannot use.
///
/// Any invocation failure, a non-positive price, a never-updated round or a
/// scale that does not fit in `i128` all map to [`Error::PriceUnavailable`].
pub fn fetch_price(env: &Env, price_feed: &Address) -> Result<PriceData, Error> {
    let client = PriceFeedClient::new(env, price_feed);
    let data = match client.try_get_price() {
        Ok(Ok(data)) => data,
        _ => return Err(Error::PriceUnavailable),
    };

    if data.price <= 0 || data.timestamp == 0 {
        return Err(Error::PriceUnavailable);
    }
    if 10i128.checked_pow(data.decimals).is_none() {
        return Err(Error::PriceUnavailable);
    }
    Ok(data)
}

/// Convert `amount` native units into reference currency at the same scale.
///
/// `usd = amount * price / 10^decimals`
pub fn to_usd(amount: i128, price: &PriceData) -> Result<i128, Error> {
    let scale = 10i128
        .checked_pow(price.decimals)
        .ok_or(Error::PriceUnavailable)?;
    amount
        .checked_mul(price.price)
        .map(|value| value / scale)
        .ok_or(Error::ArithmeticOverflow)
}
