//! Threadlog ledger node entry point.

use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use threadlog_service::{create_router, open_ledger, AppState, ServiceConfig};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "info,threadlog=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    tracing::info!("Starting threadlog node");

    let config = ServiceConfig::from_env();

    tracing::info!(
        listen_addr = %config.listen_addr,
        data_dir = %config.data_dir,
        storage = %config.storage_backend,
        max_body_bytes = config.max_body_bytes,
        request_timeout_seconds = config.request_timeout_seconds,
        "Service configuration loaded"
    );

    let ledger = open_ledger(&config)?;
    let state = AppState::new(ledger, config.clone());

    let app = create_router(state);

    tracing::info!(listen_addr = %config.listen_addr, "Starting HTTP server");
    let listener = tokio::net::TcpListener::bind(&config.listen_addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}
