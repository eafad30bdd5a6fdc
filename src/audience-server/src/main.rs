//! AudienceHub — paginated segment listing with on-demand user statistics.
//!
//! Main entry point: loads configuration, builds the store handle, and
//! starts the HTTP and metrics servers.

use audience_api::{ApiServer, AppState};
use audience_core::config::{AppConfig, StoreBackend};
use audience_store::{MemoryStore, SegmentStore};
use clap::Parser;
use std::sync::Arc;
use tracing::{error, info};

#[derive(Parser, Debug)]
#[command(name = "audience-server")]
#[command(about = "Segment listing and audience-statistics service")]
#[command(version)]
struct Cli {
    /// Node identifier (overrides config)
    #[arg(long, env = "AUDIENCE_HUB__NODE_ID")]
    node_id: Option<String>,

    /// HTTP port (overrides config)
    #[arg(long, env = "AUDIENCE_HUB__API__HTTP_PORT")]
    http_port: Option<u16>,

    /// Document store connection URL (overrides config)
    #[arg(long, env = "AUDIENCE_HUB__STORE__URL")]
    store_url: Option<String>,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Initialize tracing
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "audience_server=info,tower_http=info".into()),
        )
        .json()
        .init();

    let cli = Cli::parse();

    info!("AudienceHub starting up");

    // Load configuration
    let mut config = AppConfig::load().unwrap_or_else(|e| {
        tracing::warn!(error = %e, "Failed to load config, using defaults");
        AppConfig::default()
    });

    // Apply CLI overrides
    if let Some(node_id) = cli.node_id {
        config.node_id = node_id;
    }
    if let Some(port) = cli.http_port {
        config.api.http_port = port;
    }
    if let Some(url) = cli.store_url {
        config.store.url = url;
    }

    info!(
        node_id = %config.node_id,
        http_port = config.api.http_port,
        store_backend = ?config.store.backend,
        "Configuration loaded"
    );

    // Build the store handle once; both components share it read-only.
    let store = build_store(&config).await?;
    let state = AppState::new(store, config.node_id.clone());

    let api_server = ApiServer::new(config, state);

    // Start metrics exporter
    if let Err(e) = api_server.start_metrics().await {
        error!(error = %e, "Failed to start metrics exporter");
    }

    info!("AudienceHub is ready to serve traffic");

    // Start HTTP server (blocks until shutdown)
    api_server.start_http().await?;

    Ok(())
}

async fn build_store(config: &AppConfig) -> anyhow::Result<Arc<dyn SegmentStore>> {
    match config.store.backend {
        StoreBackend::Memory => {
            info!("Using in-memory store backend");
            Ok(Arc::new(MemoryStore::new()))
        }
        StoreBackend::Mongodb => connect_mongo(config).await,
    }
}

#[cfg(feature = "mongodb-store")]
async fn connect_mongo(config: &AppConfig) -> anyhow::Result<Arc<dyn SegmentStore>> {
    let store =
        audience_store::MongoStore::connect(&config.store.url, &config.store.database).await?;
    info!(
        url = %config.store.url,
        database = %config.store.database,
        "Connected to MongoDB store"
    );
    Ok(Arc::new(store))
}

#[cfg(not(feature = "mongodb-store"))]
async fn connect_mongo(_config: &AppConfig) -> anyhow::Result<Arc<dyn SegmentStore>> {
    anyhow::bail!(
        "store backend is `mongodb` but the binary was built without the `mongodb-store` feature"
    )
}
