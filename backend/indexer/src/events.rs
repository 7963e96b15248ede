//! Canonical event types emitted by the FundMe ledger contract.
//!
//! These mirror the Soroban contract events defined in
//! `contracts/fund_me/src/events.rs`.

use serde::{Deserialize, Serialize};

/// All recognised event kinds from the ledger contract.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EventKind {
    /// A contribution was accepted (`funded` topic).
    Funded,
    /// The owner drained the ledger (`withdrawn` topic).
    Withdrawn,
    /// An event from this contract that we don't recognise yet.
    Unknown,
}

impl EventKind {
    /// Parse the leading topic symbol string produced by Soroban into an [`EventKind`].
    pub fn from_topic(topic: &str) -> Self {
        match topic {
            "funded" => Self::Funded,
            "withdrawn" => Self::Withdrawn,
            _ => Self::Unknown,
        }
    }

    /// Return a short identifier string suitable for storage in the database.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Funded => "funded",
            Self::Withdrawn => "withdrawn",
            Self::Unknown => "unknown",
        }
    }
}

/// A fully decoded ledger event, ready to be stored in the database.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LedgerEvent {
    /// RPC event id, used as the idempotency key.
    pub event_id: String,
    pub event_type: String,
    /// Funder for `funded`, owner for `withdrawn`.
    pub account: Option<String>,
    pub amount: Option<String>,
    pub usd_value: Option<String>,
    pub funders_cleared: Option<i64>,
    pub ledger: i64,
    pub timestamp: i64,
    pub contract_id: String,
    pub tx_hash: Option<String>,
}

/// A raw event record as stored in / read from the database.
#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
pub struct EventRecord {
    pub id: i64,
    pub event_id: String,
    pub event_type: String,
    pub account: Option<String>,
    pub amount: Option<String>,
    pub usd_value: Option<String>,
    pub funders_cleared: Option<i64>,
    pub ledger: i64,
    pub timestamp: i64,
    pub contract_id: String,
    pub tx_hash: Option<String>,
    pub created_at: i64,
}

/// Aggregate view over the indexed history.
///
/// Amounts are rendered as decimal strings since they are `i128` on-chain.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Summary {
    pub funded_count: usize,
    pub withdrawn_count: usize,
    pub total_funded: String,
    pub total_withdrawn: String,
    /// Funded since the most recent withdrawal, i.e. what the ledger should
    /// currently hold.
    pub pending: String,
}

impl Summary {
    /// Fold records (in ledger order) into a [`Summary`]. Records with a
    /// missing or malformed amount count towards the totals as zero.
    pub fn from_records(records: &[EventRecord]) -> Self {
        let mut funded_count = 0;
        let mut withdrawn_count = 0;
        let mut total_funded: i128 = 0;
        let mut total_withdrawn: i128 = 0;
        let mut pending: i128 = 0;

        for record in records {
            let amount = record
                .amount
                .as_deref()
                .and_then(|a| a.parse::<i128>().ok())
                .unwrap_or(0);
            match EventKind::from_topic(&record.event_type) {
                EventKind::Funded => {
                    funded_count += 1;
                    total_funded = total_funded.saturating_add(amount);
                    pending = pending.saturating_add(amount);
                }
                EventKind::Withdrawn => {
                    withdrawn_count += 1;
                    total_withdrawn = total_withdrawn.saturating_add(amount);
                    pending = 0;
                }
                EventKind::Unknown => {}
            }
        }

        Summary {
            funded_count,
            withdrawn_count,
            total_funded: total_funded.to_string(),
            total_withdrawn: total_withdrawn.to_string(),
            pending: pending.to_string(),
        }
    }
}
