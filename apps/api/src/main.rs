mod campaigns;
mod config;
mod db;
mod errors;
mod models;
mod routes;
mod state;
mod store;

use anyhow::Result;
use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;
use tower::ServiceBuilder;
use tower_http::{cors::CorsLayer, timeout::TimeoutLayer, trace::TraceLayer};
use tracing::{info, warn};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use crate::campaigns::visits::{PgVisitLogger, TracingVisitLogger, VisitLogger};
use crate::config::Config;
use crate::db::{create_pool, ensure_visit_schema};
use crate::routes::build_router;
use crate::state::AppState;
use crate::store::{CampaignStore, InMemoryStore, RedisStore};

#[tokio::main]
async fn main() -> Result<()> {
    // Load configuration first (fails on missing required env vars)
    let config = Config::from_env()?;

    // Initialize structured logging
    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| {
            EnvFilter::new(format!("{}={}", env!("CARGO_PKG_NAME"), &config.rust_log))
        }))
        .with(tracing_subscriber::fmt::layer())
        .init();

    info!("Starting Campaigns API v{}", env!("CARGO_PKG_VERSION"));

    // Initialize visitor state
    let store: Arc<dyn CampaignStore> = match &config.redis_url {
        Some(url) => {
            let redis = redis::Client::open(url.as_str())?;
            Arc::new(RedisStore::connect(&redis, config.campaign_data_ttl_secs).await?)
        }
        None => {
            warn!("REDIS_URL not set, visitor state is kept in memory and lost on restart");
            Arc::new(InMemoryStore::new())
        }
    };

    // Initialize the visit sink
    let visit_logger: Arc<dyn VisitLogger> = match &config.database_url {
        Some(url) => {
            let pool = create_pool(url).await?;
            ensure_visit_schema(&pool).await?;
            Arc::new(PgVisitLogger::new(pool))
        }
        None => {
            info!("DATABASE_URL not set, visits will only be logged");
            Arc::new(TracingVisitLogger)
        }
    };
    info!(
        "Campaign event logging {}",
        if config.campaign_event_logging {
            "enabled"
        } else {
            "disabled"
        }
    );

    // Build app state
    let state = AppState {
        store,
        visit_logger,
        config: config.clone(),
    };

    // Build router
    let app = build_router(state).layer(
        ServiceBuilder::new()
            .layer(TraceLayer::new_for_http())
            .layer(TimeoutLayer::new(Duration::from_secs(
                config.request_timeout_secs,
            )))
            .layer(CorsLayer::permissive()),
    );

    let addr: SocketAddr = format!("0.0.0.0:{}", config.port).parse()?;
    info!("Listening on {addr}");

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}
