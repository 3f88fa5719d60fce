//! Record lookup and creation handlers.

use std::sync::Arc;

use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::Json;
use serde::Deserialize;

use threadlog_core::api::{CreateRecordRequest, RecordEntry};
use threadlog_core::{Address, RecordKind};

use crate::error::ApiError;
use crate::state::AppState;

/// Query parameters for `GET /v1/records`.
#[derive(Debug, Deserialize)]
pub struct ListRecordsQuery {
    /// Record kind to list, e.g. `post`.
    pub kind: Option<String>,
}

/// Fetch the record at an address.
///
/// GET /v1/records/:address
pub async fn get_record(
    State(state): State<Arc<AppState>>,
    Path(address): Path<String>,
) -> Result<Json<RecordEntry>, ApiError> {
    let address: Address = address
        .parse()
        .map_err(|_| ApiError::BadRequest(format!("invalid address: {address}")))?;

    let record = state
        .ledger
        .fetch(&address)
        .await?
        .ok_or_else(|| ApiError::NotFound(format!("no record at {address}")))?;

    tracing::debug!(address = %address, kind = %record.kind(), "Record fetched");
    Ok(Json(RecordEntry { address, record }))
}

/// List every record of one kind, ordered by address.
///
/// GET /v1/records?kind=post
pub async fn list_records(
    State(state): State<Arc<AppState>>,
    Query(query): Query<ListRecordsQuery>,
) -> Result<Json<Vec<RecordEntry>>, ApiError> {
    let kind: RecordKind = query
        .kind
        .as_deref()
        .ok_or_else(|| ApiError::BadRequest("missing query parameter: kind".into()))?
        .parse()
        .map_err(|e| ApiError::BadRequest(format!("{e}")))?;

    let entries: Vec<RecordEntry> = state
        .ledger
        .fetch_all(kind)
        .await?
        .into_iter()
        .map(|(address, record)| RecordEntry { address, record })
        .collect();

    tracing::debug!(kind = %kind, count = entries.len(), "Records listed");
    Ok(Json(entries))
}

/// Create a derived record at an unused address.
///
/// POST /v1/records
pub async fn create_record(
    State(state): State<Arc<AppState>>,
    Json(request): Json<CreateRecordRequest>,
) -> Result<(StatusCode, Json<RecordEntry>), ApiError> {
    let seeds = request
        .decode_seeds()
        .map_err(|e| ApiError::BadRequest(format!("invalid seed: {e}")))?;

    let CreateRecordRequest {
        kind,
        address,
        record,
        ..
    } = request;
    state
        .ledger
        .create_and_append(kind, &address, &seeds, record)
        .await?;

    // Reply with what the ledger stored, not what was sent.
    let record = state
        .ledger
        .fetch(&address)
        .await?
        .ok_or_else(|| ApiError::Internal(format!("created record missing at {address}")))?;

    tracing::info!(address = %address, kind = %kind, "Record created");
    Ok((StatusCode::CREATED, Json(RecordEntry { address, record })))
}
