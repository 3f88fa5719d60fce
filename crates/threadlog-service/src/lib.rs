//! Threadlog ledger node.
//!
//! Serves the [`threadlog_core::Ledger`] contract over HTTP so that
//! `threadlog-client` can run against a shared node:
//!
//! - record lookups by address and listings by kind
//! - lazy creation of derived records (comment pages)
//! - signed mutations checked by the ledger program
//!
//! # Signing
//!
//! Mutations name their signer in the `x-signer` header. The node trusts the
//! header; it is meant to sit behind something that authenticates callers.

#![forbid(unsafe_code)]
#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![allow(clippy::missing_errors_doc)] // Axum handlers all return Result
#![allow(clippy::unused_async)] // Handlers are async for axum even when they don't await

pub mod config;
pub mod error;
pub mod handlers;
pub mod routes;
pub mod state;

pub use config::{ServiceConfig, StorageBackend};
pub use error::ApiError;
pub use routes::create_router;
pub use state::{open_ledger, AppState};
