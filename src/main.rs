use std::sync::Arc;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use api_rest::{router, AppState};
use hms_core::{ConsoleConfig, LogNotifier, Notify, ServiceRegistry};

/// Main entry point for the HMS console backend.
///
/// Resolves configuration from the environment, builds the record-store
/// client (remote HTTP store, or the in-memory store when no URL is
/// configured), and serves the REST API.
///
/// # Environment Variables
/// - `HMS_REST_ADDR`: REST server address (default: "0.0.0.0:3000")
/// - `HMS_STORE_URL`: Base URL of the record store (in-memory store when unset)
/// - `HMS_STORE_TOKEN`: Bearer token sent to the record store
/// - `HMS_PAGE_LIMIT`: Default page size for list queries
///
/// # Returns
/// * `Ok(())` - If the server starts and runs successfully
/// * `Err(anyhow::Error)` - If configuration or startup fails
#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();

    tracing_subscriber::registry()
        .with(tracing_subscriber::EnvFilter::from_default_env().add_directive("hms=info".parse()?))
        .with(tracing_subscriber::fmt::layer())
        .init();

    let rest_addr = std::env::var("HMS_REST_ADDR").unwrap_or_else(|_| "0.0.0.0:3000".into());

    tracing::info!("++ Starting HMS REST on {}", rest_addr);

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

    let listener = tokio::net::TcpListener::bind(&rest_addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}
