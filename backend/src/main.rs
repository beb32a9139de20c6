//! Order-Fulfillment Allocator - Backend Server
//!
//! Sources each order line from finished stock, repaintable semi-finished
//! stock, or new fabrication, and records the resulting movements and
//! production orders.

use axum::{routing::get, Router};
use sqlx::postgres::PgPoolOptions;
use std::{net::SocketAddr, sync::Arc, time::Duration};
use tower_http::{
    cors::{Any, CorsLayer},
    trace::TraceLayer,
};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

mod config;
mod error;
mod handlers;
mod models;
mod routes;
mod services;
mod store;

pub use config::Config;

use config::StoreBackend;
use services::CommitGate;
use store::{load_seed_dir, InventoryStore, MemoryStore, PgInventoryStore};

/// Application state shared across handlers
#[derive(Clone)]
pub struct AppState {
    pub store: Arc<dyn InventoryStore>,
    pub config: Arc<Config>,
    pub gate: Arc<CommitGate>,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Initialize tracing
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "fulfillment_server=debug,tower_http=debug,sqlx=warn".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    // Load configuration
    dotenvy::dotenv().ok();
    let config = config::Config::load()?;

    tracing::info!("Starting Order Fulfillment Server");
    tracing::info!("Environment: {}", config.environment);
    tracing::info!("Semi-finished matching: {:?}", config.allocation.semi_match);

    let store = connect_store(&config).await?;

    // Create application state
    let state = AppState {
        store,
        config: Arc::new(config.clone()),
        gate: Arc::new(CommitGate::new()),
    };

    // Build application
    let app = create_app(state);

    // Start server
    let addr: SocketAddr = format!("{}:{}", config.server.host, config.server.port).parse()?;
    tracing::info!("Listening on {}", addr);

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}

/// Open the configured inventory store
async fn connect_store(config: &Config) -> anyhow::Result<Arc<dyn InventoryStore>> {
    match config.store.backend {
        StoreBackend::Postgres => {
            tracing::info!("Connecting to database...");
            let db_pool = PgPoolOptions::new()
                .max_connections(config.database.max_connections)
                .min_connections(config.database.min_connections)
                .acquire_timeout(Duration::from_secs(30))
                .connect(&config.database.url)
                .await?;
            tracing::info!("Database connection established");

            // Run migrations in development
            if config.environment == "development" {
                tracing::info!("Running database migrations...");
                sqlx::migrate!("./migrations").run(&db_pool).await?;
                tracing::info!("Migrations completed");
            }

            Ok(Arc::new(PgInventoryStore::new(db_pool)))
        }
        StoreBackend::Memory => match &config.store.seed_dir {
            Some(dir) => {
                let seed = load_seed_dir(dir)?;
                Ok(Arc::new(MemoryStore::from_seed(seed)))
            }
            None => {
                tracing::warn!("Memory store started without seed_dir; inventory is empty");
                Ok(Arc::new(MemoryStore::default()))
            }
        },
    }
}

/// Create the application router with all routes and middleware
fn create_app(state: AppState) -> Router {
    // CORS configuration
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    Router::new()
        .route("/", get(root))
        .route("/health", get(health_check))
        .nest("/api/v1", routes::api_routes())
        .layer(TraceLayer::new_for_http())
        .layer(cors)
        .with_state(state)
}

/// Root endpoint
async fn root() -> &'static str {
    "Order Fulfillment Allocator API v1.0"
}

/// Health check endpoint
async fn health_check() -> &'static str {
    "OK"
}
