//! Router configuration.

use std::sync::Arc;
use std::time::Duration;

use axum::routing::{get, post};
use axum::Router;
use tower::limit::ConcurrencyLimitLayer;
use tower_http::cors::{Any, CorsLayer};
use tower_http::limit::RequestBodyLimitLayer;
use tower_http::timeout::TimeoutLayer;
use tower_http::trace::TraceLayer;

use crate::handlers::{health, mutations, records};
use crate::state::AppState;

// ============================================================================
// Concurrency Limiting Constants
// ============================================================================

/// Maximum concurrent record reads and creations.
const RECORDS_MAX_CONCURRENT_REQUESTS: usize = 256;

/// Maximum concurrent mutations. The ledger applies them one at a time.
const MUTATIONS_MAX_CONCURRENT_REQUESTS: usize = 64;

/// Create the service router with all routes and middleware.
///
/// # Routes
///
/// - `GET /health` - Health check
/// - `GET /v1/records?kind=<kind>` - List records of one kind
/// - `POST /v1/records` - Create a derived record
/// - `GET /v1/records/:address` - Fetch one record
/// - `POST /v1/mutations` - Apply an instruction (signer in `x-signer`)
pub fn create_router(state: AppState) -> Router {
    let cors_origins = state.config.cors_origins.clone();
    let max_body_bytes = state.config.max_body_bytes;
    let request_timeout_seconds = state.config.request_timeout_seconds;

    let cors = build_cors_layer(&cors_origins);

    let state = Arc::new(state);

    let record_routes = Router::new()
        .route(
            "/",
            get(records::list_records).post(records::create_record),
        )
        .route("/:address", get(records::get_record))
        .layer(ConcurrencyLimitLayer::new(RECORDS_MAX_CONCURRENT_REQUESTS));

    let mutation_routes = Router::new()
        .route("/", post(mutations::submit_mutation))
        .layer(ConcurrencyLimitLayer::new(MUTATIONS_MAX_CONCURRENT_REQUESTS));

    Router::new()
        .route("/health", get(health::health))
        .nest("/v1/records", record_routes)
        .nest("/v1/mutations", mutation_routes)
        .layer(TraceLayer::new_for_http())
        .layer(cors)
        .layer(RequestBodyLimitLayer::new(max_body_bytes))
        .layer(TimeoutLayer::new(Duration::from_secs(
            request_timeout_seconds,
        )))
        .with_state(state)
}

/// Build the CORS layer from configured origins.
fn build_cors_layer(origins: &[String]) -> CorsLayer {
    if origins.iter().any(|o| o == "*") {
        CorsLayer::new()
            .allow_origin(Any)
            .allow_methods(Any)
            .allow_headers(Any)
    } else {
        let origins: Vec<_> = origins.iter().filter_map(|o| o.parse().ok()).collect();

        CorsLayer::new()
            .allow_origin(origins)
            .allow_methods(Any)
            .allow_headers(Any)
    }
}
