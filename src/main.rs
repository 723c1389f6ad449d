// Main entry point - Dependency injection and server setup
use std::sync::Arc;

use device_dashboards::application::cache_store::CacheStore;
use device_dashboards::application::dashboard_router::DashboardRouter;
use device_dashboards::application::live_store::LiveDashboardStore;
use device_dashboards::application::message_ingestor::MessageIngestor;
use device_dashboards::infrastructure::config::load_app_config;
use device_dashboards::infrastructure::device_hub::DeviceHub;
use device_dashboards::infrastructure::json_codec::JsonDashboardCodec;
use device_dashboards::infrastructure::json_file_cache::JsonFileCache;
use device_dashboards::presentation::app_state::AppState;
use device_dashboards::presentation::routes::build_router;
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Initialize tracing
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    // Load configuration
    let config = load_app_config()?;

    // Stores and collaborators (infrastructure layer)
    let devices = DeviceHub::new(config.server.outbox_capacity);
    let backend = Arc::new(JsonFileCache::open(&config.cache.path).await?);
    let cache = CacheStore::open(backend).await?;
    let live = LiveDashboardStore::new();

    // Create services (application layer)
    let router = DashboardRouter::new(live, cache, Arc::new(devices.clone()));
    let ingestor = MessageIngestor::new(
        router.clone(),
        Arc::new(JsonDashboardCodec),
        Arc::new(devices.clone()),
    );

    // Create application state
    let state = Arc::new(AppState {
        router,
        ingestor,
        devices,
    });

    // Build router (presentation layer)
    let app = build_router(state);

    // Start server
    let addr = config.server.bind_address;
    tracing::info!(%addr, cache = %config.cache.path.display(), "starting device-dashboards service");

    axum::serve(tokio::net::TcpListener::bind(addr).await?, app).await?;

    Ok(())
}
