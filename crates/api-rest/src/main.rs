//! Standalone REST API server binary.
//!
//! ## Purpose
//! Runs the REST API server on its own.
//!
//! ## Intended use
//! This binary is useful for development and debugging when you only want the
//! REST server (with OpenAPI/Swagger UI). The workspace's main `hms-run`
//! binary is the normal entry point.

use api_rest::{router, AppState};
use hms_core::{ConsoleConfig, LogNotifier, Notify, ServiceRegistry};
use std::sync::Arc;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

/// Main entry point for the HMS REST API server.
///
/// Starts the REST API server on the configured address (default: 0.0.0.0:3000).
///
/// # Environment Variables
/// - `HMS_REST_ADDR`: Server address (default: "0.0.0.0:3000")
/// - `HMS_STORE_URL`: Base URL of the record store (in-memory store when unset)
/// - `HMS_STORE_TOKEN`: Bearer token for the record store
/// - `HMS_PAGE_LIMIT`: Default page size for list queries
///
/// # Errors
/// Returns an error if:
/// - the logging/tracing configuration cannot be initialised,
/// - the record store configuration is invalid, or
/// - the server address cannot be bound.
#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive("api_rest=info".parse()?),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let addr = std::env::var("HMS_REST_ADDR").unwrap_or_else(|_| "0.0.0.0:3000".into());

    tracing::info!("-- Starting HMS REST API on {}", addr);

    let page_limit = std::env::var("HMS_PAGE_LIMIT")
        .ok()
        .map(|v| v.parse::<usize>())
        .transpose()?;
    let config = ConsoleConfig::new(
        std::env::var("HMS_STORE_URL").ok(),
        std::env::var("HMS_STORE_TOKEN").ok(),
        page_limit,
    )?;
    let store = config.build_store()?;
    let notifier: Arc<dyn Notify> = Arc::new(LogNotifier);
    let registry = Arc::new(ServiceRegistry::new(store, notifier, config.page_limit()));

    let app = router(AppState { registry });

    let listener = tokio::net::TcpListener::bind(&addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}
