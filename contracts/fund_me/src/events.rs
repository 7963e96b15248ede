//! # Events
//!
//! | Topic                   | Data          |
//! |-------------------------|---------------|
//! | `("funded", funder)`    | [`Funded`]    |
//! | `("withdrawn", owner)`  | [`Withdrawn`] |

use soroban_sdk::{contracttype, symbol_short, Address, Env};

#[contracttype]
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct Funded {
    pub funder: Address,
    pub amount: i128,
    /// Reference-currency value at the native unit's decimal scale.
    pub usd_value: i128,
}

#[contracttype]
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct Withdrawn {
    pub owner: Address,
    pub amount: i128,
    /// Length of the funder list that was reset, duplicates included.
    pub funders_cleared: u32,
}

pub fn publish_funded(env: &Env, funder: &Address, amount: i128, usd_value: i128) {
    env.events().publish(
        (symbol_short!("funded"), funder.clone()),
        Funded {
            funder: funder.clone(),
            amount,
            usd_value,
        },
    );
}

pub fn publish_withdrawn(env: &Env, owner: &Address, amount: i128, funders_cleared: u32) {
    env.events().publish(
        (symbol_short!("withdrawn"), owner.clone()),
        Withdrawn {
            owner: owner.clone(),
            amount,
            funders_cleared,
        },
    );
}
