//! Axum REST API handlers.

use std::sync::Arc;

use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::get,
    Json, Router,
};
use serde::Serialize;
use sqlx::SqlitePool;
use tracing::error;

use crate::db;
use crate::errors::IndexerError;
use crate::events::{EventRecord, Summary};

#[derive(Clone)]
pub struct ApiState {
    pub pool: SqlitePool,
}

/// Assemble the API routes over `state`.
pub fn router(state: Arc<ApiState>) -> Router {
    Router::new()
        .route("/health", get(health))
        .route("/events", get(get_all_events))
        .route("/funders/:address/events", get(get_funder_events))
        .route("/summary", get(get_summary))
        .with_state(state)
}

// ─────────────────────────────────────────────────────────
// Response shapes
// ─────────────────────────────────────────────────────────

#[derive(Serialize)]
pub struct FunderEventsResponse {
    pub address: String,
    pub count: usize,
    pub events: Vec<EventRecord>,
}

#[derive(Serialize)]
pub struct AllEventsResponse {
    pub count: usize,
    pub events: Vec<EventRecord>,
}

#[derive(Serialize)]
pub struct HealthResponse {
    pub status: &'static str,
    pub version: &'static str,
}

#[derive(Serialize)]
pub struct ErrorResponse {
    pub error: String,
}

fn internal_error(e: IndexerError) -> Response {
    error!("API query failed: {e}");
    (
        StatusCode::INTERNAL_SERVER_ERROR,
        Json(ErrorResponse {
            error: e.to_string(),
        }),
    )
        .into_response()
}

// ─────────────────────────────────────────────────────────
// Handlers
// ─────────────────────────────────────────────────────────

/// `GET /health`
pub async fn health() -> impl IntoResponse {
    Json(HealthResponse {
        status: "ok",
        version: env!("CARGO_PKG_VERSION"),
    })
}

/// `GET /funders/:address/events`
///
/// Every indexed event where `address` is the acting account: its
/// contributions, and withdrawals if it is the owner.
pub async fn get_funder_events(
    State(state): State<Arc<ApiState>>,
    Path(address): Path<String>,
) -> Response {
    match db::get_events_for_account(&state.pool, &address).await {
        Ok(events) => Json(FunderEventsResponse {
            address,
            count: events.len(),
            events,
        })
        .into_response(),
        Err(e) => internal_error(e),
    }
}

/// `GET /events`
pub async fn get_all_events(State(state): State<Arc<ApiState>>) -> Response {
    match db::get_all_events(&state.pool).await {
        Ok(events) => Json(AllEventsResponse {
            count: events.len(),
            events,
        })
        .into_response(),
        Err(e) => internal_error(e),
    }
}

/// `GET /summary`
///
/// Totals funded and withdrawn plus what the ledger should hold right now.
pub async fn get_summary(State(state): State<Arc<ApiState>>) -> Response {
    match db::get_all_events(&state.pool).await {
        Ok(events) => Json(Summary::from_records(&events)).into_response(),
        Err(e) => internal_error(e),
    }
}
