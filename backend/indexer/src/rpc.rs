//! Soroban RPC client: polls `getEvents` and decodes FundMe ledger events.
//!
//! ## Resilience
//!
//! * Exponential back-off is applied when the RPC returns a soft error or a
//!   rate-limit response, up to [`MAX_BACKOFF_SECS`] seconds.
//! * Transient network errors (connection reset, timeout) are retried silently.
//! * JSON-RPC codes -32600 / -32601 mean the request itself is wrong and are
//!   returned to the caller instead of retried.
//!
//! ## Payload format
//!
//! Requests ask for `xdrFormat: "json"`, so topics and data arrive already
//! decoded as ScVal JSON in `topicJson` / `valueJson`, e.g.
//! `{"symbol":"funded"}`, `{"i128":"10000000"}` or a `{"map":[...]}` of
//! `{"key":..,"val":..}` entries for a contract struct.

use std::time::Duration;

use reqwest::Client;
use serde::Deserialize;
use serde_json::{json, Value};
use tracing::{debug, warn};

use crate::errors::{IndexerError, Result};
use crate::events::{EventKind, LedgerEvent};

const MAX_BACKOFF_SECS: u64 = 60;
const INITIAL_BACKOFF_SECS: u64 = 2;

// ─────────────────────────────────────────────────────────
// JSON-RPC response shapes
// ─────────────────────────────────────────────────────────

#[derive(Debug, Deserialize)]
pub struct RpcResponse {
    pub result: Option<EventsResult>,
    pub error: Option<RpcError>,
}

#[derive(Debug, Deserialize)]
pub struct RpcError {
    pub code: i64,
    pub message: String,
}

impl RpcError {
    /// Invalid request / method not found: retrying cannot help.
    fn is_hard(&self) -> bool {
        matches!(self.code, -32600 | -32601)
    }
}

#[derive(Debug, Deserialize)]
pub struct EventsResult {
    pub events: Vec<RawEvent>,
    pub cursor: Option<String>,
    #[serde(rename = "latestLedger")]
    pub latest_ledger: Option<u64>,
}

#[derive(Debug, Deserialize, Clone)]
#[allow(dead_code)]
pub struct RawEvent {
    /// Topic list as ScVal JSON
    #[serde(rename = "topicJson", default)]
    pub topic: Vec<Value>,
    /// Event data as ScVal JSON
    #[serde(rename = "valueJson", default)]
    pub value: Value,
    #[serde(rename = "contractId")]
    pub contract_id: Option<String>,
    #[serde(rename = "txHash")]
    pub tx_hash: Option<String>,
    pub id: Option<String>,
    pub ledger: Option<u64>,
    #[serde(rename = "ledgerClosedAt")]
    pub ledger_closed_at: Option<String>,
    #[serde(rename = "inSuccessfulContractCall")]
    pub in_successful_contract_call: Option<bool>,
    #[serde(rename = "pagingToken")]
    pub paging_token: Option<String>,
}

/// One page of `getEvents` results.
#[derive(Debug)]
pub struct EventPage {
    pub events: Vec<RawEvent>,
    pub cursor: Option<String>,
    pub latest_ledger: Option<u64>,
}

struct Backoff {
    secs: u64,
}

impl Backoff {
    fn new() -> Self {
        Backoff {
            secs: INITIAL_BACKOFF_SECS,
        }
    }

    async fn wait(&mut self) {
        tokio::time::sleep(Duration::from_secs(self.secs)).await;
        self.secs = (self.secs * 2).min(MAX_BACKOFF_SECS);
    }
}

// ─────────────────────────────────────────────────────────
// Public API
// ─────────────────────────────────────────────────────────

/// Fetch a page of events from the RPC.
///
/// * `start_ledger`: the ledger sequence to scan from (inclusive).
/// * `cursor`      : optional opaque pagination cursor from a previous response.
/// * `limit`       : maximum number of events to return.
pub async fn fetch_events(
    client: &Client,
    rpc_url: &str,
    contract_id: &str,
    start_ledger: u32,
    cursor: Option<&str>,
    limit: u32,
) -> Result<EventPage> {
    let mut backoff = Backoff::new();
    let request = json!({
        "jsonrpc": "2.0",
        "id": 1,
        "method": "getEvents",
        "params": build_params(contract_id, start_ledger, cursor, limit),
    });

    loop {
        let resp = match client.post(rpc_url).json(&request).send().await {
            Ok(resp) => resp,
            Err(e) => {
                warn!("RPC request failed (will retry in {}s): {e}", backoff.secs);
                backoff.wait().await;
                continue;
            }
        };

        if resp.status() == reqwest::StatusCode::TOO_MANY_REQUESTS {
            warn!("Rate-limited by RPC (will retry in {}s)", backoff.secs);
            backoff.wait().await;
            continue;
        }

        let body: RpcResponse = resp.json().await?;

        if let Some(err) = body.error {
            if err.is_hard() {
                return Err(IndexerError::Rpc {
                    code: err.code,
                    message: err.message,
                });
            }
            warn!(
                "RPC soft error (will retry in {}s): {} {}",
                backoff.secs, err.code, err.message
            );
            backoff.wait().await;
            continue;
        }

        let result = body
            .result
            .ok_or_else(|| IndexerError::EventParse("Empty result from getEvents".to_string()))?;

        debug!(
            "Fetched {} events (latest_ledger={:?})",
            result.events.len(),
            result.latest_ledger
        );

        return Ok(EventPage {
            events: result.events,
            cursor: result.cursor,
            latest_ledger: result.latest_ledger,
        });
    }
}

fn build_params(contract_id: &str, start_ledger: u32, cursor: Option<&str>, limit: u32) -> Value {
    let mut params = json!({
        "filters": [
            {
                "type": "contract",
                "contractIds": [contract_id]
            }
        ],
        "pagination": {
            "limit": limit
        },
        "xdrFormat": "json"
    });

    if let Some(cur) = cursor {
        params["pagination"]["cursor"] = json!(cur);
    } else {
        params["startLedger"] = json!(start_ledger);
    }

    params
}

// ─────────────────────────────────────────────────────────
// Event decoding
// ─────────────────────────────────────────────────────────

/// Decode a list of raw RPC events into [`LedgerEvent`] structs.
///
/// Events from failed contract calls are dropped: their state changes were
/// rolled back on-chain.
pub fn decode_events(raw: &[RawEvent], contract_id: &str) -> Vec<LedgerEvent> {
    raw.iter()
        .filter(|e| e.in_successful_contract_call.unwrap_or(true))
        .filter_map(|e| decode_single(e, contract_id))
        .collect()
}

fn decode_single(raw: &RawEvent, contract_id: &str) -> Option<LedgerEvent> {
    let kind = EventKind::from_topic(&scval_to_string(raw.topic.first()?)?);

    let ledger = raw.ledger.unwrap_or(0) as i64;
    let timestamp = raw
        .ledger_closed_at
        .as_deref()
        .and_then(parse_iso_to_unix)
        .unwrap_or(0);

    // Both events carry the acting account (funder / owner) as topic #2.
    let account = raw
        .topic
        .get(1)
        .and_then(scval_to_string)
        .or_else(|| extract_field(&raw.value, &["funder", "owner"]));

    let amount = extract_field(&raw.value, &["amount"]);
    let usd_value = match kind {
        EventKind::Funded => extract_field(&raw.value, &["usd_value"]),
        _ => None,
    };
    let funders_cleared = match kind {
        EventKind::Withdrawn => {
            extract_field(&raw.value, &["funders_cleared"]).and_then(|v| v.parse().ok())
        }
        _ => None,
    };

    let tx_hash = raw.tx_hash.as_deref().map(normalize_tx_hash);
    let event_id = raw.id.clone().unwrap_or_else(|| {
        format!(
            "{ledger}-{}-{}-{}",
            tx_hash.as_deref().unwrap_or("-"),
            kind.as_str(),
            account.as_deref().unwrap_or("-"),
        )
    });

    Some(LedgerEvent {
        event_id,
        event_type: kind.as_str().to_string(),
        account,
        amount,
        usd_value,
        funders_cleared,
        ledger,
        timestamp,
        contract_id: raw
            .contract_id
            .clone()
            .unwrap_or_else(|| contract_id.to_string()),
        tx_hash,
    })
}

/// Read the first matching field of a contract struct (an ScVal map keyed
/// by symbols) as a string.
fn extract_field(value: &Value, keys: &[&str]) -> Option<String> {
    let entries = value.get("map")?.as_array()?;
    keys.iter().find_map(|key| {
        entries
            .iter()
            .find(|entry| {
                entry
                    .get("key")
                    .and_then(scval_to_string)
                    .is_some_and(|k| k == *key)
            })
            .and_then(|entry| entry.get("val"))
            .and_then(scval_to_string)
    })
}

/// Render a scalar ScVal as a string: symbols, strings, addresses and
/// integers. Containers yield `None`.
fn scval_to_string(v: &Value) -> Option<String> {
    let map = v.as_object()?;
    let (tag, inner) = map.iter().next()?;
    match (tag.as_str(), inner) {
        ("symbol" | "string" | "address", Value::String(s)) => Some(s.clone()),
        ("i128" | "u128" | "i64" | "u64" | "i32" | "u32", Value::String(s)) => Some(s.clone()),
        ("i128" | "u128" | "i64" | "u64" | "i32" | "u32", Value::Number(n)) => Some(n.to_string()),
        ("i128", Value::Object(parts)) => {
            let hi = parts.get("hi")?.as_i64()?;
            let lo = parts.get("lo")?.as_u64()?;
            Some((((hi as i128) << 64) | lo as i128).to_string())
        }
        ("u128", Value::Object(parts)) => {
            let hi = parts.get("hi")?.as_u64()?;
            let lo = parts.get("lo")?.as_u64()?;
            Some((((hi as u128) << 64) | lo as u128).to_string())
        }
        _ => None,
    }
}

/// Lowercase a 32-byte hex transaction hash; anything else is kept verbatim.
fn normalize_tx_hash(raw: &str) -> String {
    match hex::decode(raw) {
        Ok(bytes) if bytes.len() == 32 => hex::encode(bytes),
        _ => raw.to_string(),
    }
}

/// Parse an ISO-8601 timestamp string into a Unix epoch (seconds).
fn parse_iso_to_unix(s: &str) -> Option<i64> {
    chrono::DateTime::parse_from_rfc3339(s)
        .ok()
        .map(|dt| dt.timestamp())
}

// ─────────────────────────────────────────────────────────
// Unit tests
// ─────────────────────────────────────────────────────────
