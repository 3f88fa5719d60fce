//! HTTP bodies shared by the ledger service and its client.

use serde::{Deserialize, Serialize};

use crate::address::RecordKind;
use crate::ids::Address;
use crate::records::Record;

/// Header carrying the signer's user id on `POST /v1/mutations`.
pub const SIGNER_HEADER: &str = "x-signer";

/// A record and the address it lives at.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RecordEntry {
    /// Ledger address.
    pub address: Address,
    /// Stored record.
    pub record: Record,
}

/// Body of `POST /v1/records`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CreateRecordRequest {
    /// Kind the address was derived for.
    pub kind: RecordKind,
    /// Target address.
    pub address: Address,
    /// Hex-encoded derivation seeds.
    pub seeds: Vec<String>,
    /// Initial record.
    pub record: Record,
}

impl CreateRecordRequest {
    /// Build a request, hex-encoding `seeds`.
    #[must_use]
    pub fn new(kind: RecordKind, address: Address, seeds: &[Vec<u8>], record: Record) -> Self {
        Self {
            kind,
            address,
            seeds: seeds.iter().map(hex::encode).collect(),
            record,
        }
    }

    /// Decode the seeds back to bytes.
    ///
    /// # Errors
    ///
    /// Returns an error if a seed is not valid hex.
    pub fn decode_seeds(&self) -> Result<Vec<Vec<u8>>, hex::FromHexError> {
        self.seeds.iter().map(hex::decode).collect()
    }
}

/// Error envelope returned by the service.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ApiErrorResponse {
    /// Error details.
    pub error: ApiErrorBody,
}

/// API error body.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ApiErrorBody {
    /// Error code.
    pub code: String,
    /// Error message.
    pub message: String,
    /// Additional details.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub details: Option<serde_json::Value>,
}
