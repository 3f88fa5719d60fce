//! Mutation handler.

use std::sync::Arc;

use axum::extract::State;
use axum::http::HeaderMap;
use axum::Json;
use serde::Serialize;

use threadlog_core::api::SIGNER_HEADER;
use threadlog_core::{Instruction, UserId};

use crate::error::ApiError;
use crate::state::AppState;

/// Response to an applied mutation.
#[derive(Debug, Serialize)]
pub struct MutationResponse {
    /// Instruction that was applied.
    pub instruction: &'static str,
    /// Who signed it.
    pub signer: UserId,
}

/// Run an instruction through the ledger program.
///
/// POST /v1/mutations
pub async fn submit_mutation(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
    Json(instruction): Json<Instruction>,
) -> Result<Json<MutationResponse>, ApiError> {
    let signer = signer_from(&headers)?;
    let name = instruction.name();

    state.ledger.submit_mutation(instruction, &signer).await?;

    tracing::info!(instruction = name, signer = %signer, "Mutation applied");
    Ok(Json(MutationResponse {
        instruction: name,
        signer,
    }))
}

fn signer_from(headers: &HeaderMap) -> Result<UserId, ApiError> {
    let value = headers
        .get(SIGNER_HEADER)
        .ok_or_else(|| ApiError::BadRequest(format!("missing {SIGNER_HEADER} header")))?;

    value
        .to_str()
        .ok()
        .and_then(|s| s.parse().ok())
        .ok_or_else(|| ApiError::BadRequest(format!("invalid {SIGNER_HEADER} header")))
}
