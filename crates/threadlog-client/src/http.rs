//! HTTP transport for a remote threadlog ledger node.

use std::time::Duration;

use async_trait::async_trait;
use reqwest::{Client, StatusCode};

use threadlog_core::api::{ApiErrorResponse, CreateRecordRequest, RecordEntry, SIGNER_HEADER};
use threadlog_core::{
    Address, Instruction, Ledger, LedgerError, LedgerResult, ProgramError, Record, RecordKind,
    UserId,
};

use crate::error::ClientError;

/// [`Ledger`] implementation that talks to `threadlog-service` over HTTP.
#[derive(Debug, Clone)]
pub struct HttpLedger {
    client: Client,
    base_url: String,
}

impl HttpLedger {
    /// Create a ledger client for the node at `base_url`.
    ///
    /// # Errors
    ///
    /// Returns an error if the HTTP client cannot be built.
    pub fn new(base_url: impl Into<String>) -> Result<Self, ClientError> {
        Self::with_options(base_url, ClientOptions::default())
    }

    /// Create a ledger client with custom options.
    ///
    /// # Errors
    ///
    /// Returns an error if the HTTP client cannot be built.
    pub fn with_options(
        base_url: impl Into<String>,
        options: ClientOptions,
    ) -> Result<Self, ClientError> {
        let client = Client::builder()
            .timeout(Duration::from_secs(options.timeout_seconds))
            .user_agent(options.user_agent)
            .build()?;

        Ok(Self {
            client,
            base_url: base_url.into().trim_end_matches('/').to_string(),
        })
    }

    /// Base URL requests are sent to.
    #[must_use]
    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn url(&self, path: &str) -> String {
        format!("{}{path}", self.base_url)
    }

    /// Turn a non-success response into a ledger error.
    async fn error_from(response: reqwest::Response) -> LedgerError {
        let status = response.status();

        match response.json::<ApiErrorResponse>().await {
            Ok(api_error) => {
                let body = api_error.error;
                if body.code == "rejected" {
                    let program_error = body
                        .details
                        .as_ref()
                        .and_then(|d| d.get("program_code"))
                        .and_then(serde_json::Value::as_u64)
                        .and_then(|code| u32::try_from(code).ok())
                        .and_then(ProgramError::from_code);
                    if let Some(program_error) = program_error {
                        return LedgerError::Rejected(program_error);
                    }
                }
                LedgerError::Transport(format!("HTTP {status}: {} - {}", body.code, body.message))
            }
            Err(_) => LedgerError::Transport(format!("HTTP {status}")),
        }
    }
}

fn transport(err: &reqwest::Error) -> LedgerError {
    LedgerError::Transport(err.to_string())
}

#[async_trait]
impl Ledger for HttpLedger {
    async fn fetch(&self, address: &Address) -> LedgerResult<Option<Record>> {
        let response = self
            .client
            .get(self.url(&format!("/v1/records/{address}")))
            .send()
            .await
            .map_err(|e| transport(&e))?;

        match response.status() {
            StatusCode::OK => {
                let entry: RecordEntry = response
                    .json()
                    .await
                    .map_err(|e| LedgerError::Serialization(e.to_string()))?;
                Ok(Some(entry.record))
            }
            StatusCode::NOT_FOUND => Ok(None),
            _ => Err(Self::error_from(response).await),
        }
    }

    async fn fetch_all(&self, kind: RecordKind) -> LedgerResult<Vec<(Address, Record)>> {
        let response = self
            .client
            .get(self.url("/v1/records"))
            .query(&[("kind", kind.seed_tag())])
            .send()
            .await
            .map_err(|e| transport(&e))?;

        if !response.status().is_success() {
            return Err(Self::error_from(response).await);
        }

        let entries: Vec<RecordEntry> = response
            .json()
            .await
            .map_err(|e| LedgerError::Serialization(e.to_string()))?;
        Ok(entries
            .into_iter()
            .map(|entry| (entry.address, entry.record))
            .collect())
    }

    async fn create_and_append(
        &self,
        kind: RecordKind,
        address: &Address,
        seeds: &[Vec<u8>],
        record: Record,
    ) -> LedgerResult<()> {
        let request = CreateRecordRequest::new(kind, *address, seeds, record);
        let response = self
            .client
            .post(self.url("/v1/records"))
            .json(&request)
            .send()
            .await
            .map_err(|e| transport(&e))?;

        match response.status() {
            status if status.is_success() => Ok(()),
            StatusCode::CONFLICT => Err(LedgerError::AlreadyExists { address: *address }),
            _ => Err(Self::error_from(response).await),
        }
    }

    async fn submit_mutation(&self, instruction: Instruction, signer: &UserId) -> LedgerResult<()> {
        let response = self
            .client
            .post(self.url("/v1/mutations"))
            .header(SIGNER_HEADER, signer.to_string())
            .json(&instruction)
            .send()
            .await
            .map_err(|e| transport(&e))?;

        if response.status().is_success() {
            return Ok(());
        }
        Err(Self::error_from(response).await)
    }
}

/// Client options for customization.
#[derive(Debug, Clone)]
pub struct ClientOptions {
    /// Request timeout in seconds (default: 30). A timed-out fetch counts as failed.
    pub timeout_seconds: u64,
    /// User agent sent with every request.
    pub user_agent: String,
}

impl Default for ClientOptions {
    fn default() -> Self {
        Self {
            timeout_seconds: 30,
            user_agent: concat!("threadlog-client/", env!("CARGO_PKG_VERSION")).to_string(),
        }
    }
}

impl ClientOptions {
    /// Options with a custom timeout.
    #[must_use]
    pub fn with_timeout(timeout_seconds: u64) -> Self {
        Self {
            timeout_seconds,
            ..Self::default()
        }
    }
}
