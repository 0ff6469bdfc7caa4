use std::sync::Arc;

use anyhow::{Context, Result};
use circuit_coach::api::{create_routes, AppState};
use circuit_coach::auth::JwtService;
use circuit_coach::config::{AppConfig, DatabaseConfig, ProgramConfig, StorageBackend};
use circuit_coach::repository::{MemoryStore, PgStore, Store};
use circuit_coach::services::SlotSelector;
use tokio::net::TcpListener;
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> Result<()> {
    let app_config = AppConfig::from_env()?;

    // Initialize tracing
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&app_config.log_level)),
        )
        .init();

    let db_config = DatabaseConfig::from_env()?;
    let program = ProgramConfig::from_env()?;

    let store: Arc<dyn Store> = match db_config.backend {
        StorageBackend::Postgres => {
            let pool = db_config.create_pool().await?;
            let store = PgStore::new(pool);
            store.migrate().await.context("Failed to run database migrations")?;
            info!("Connected to PostgreSQL, migrations applied");
            Arc::new(store)
        }
        StorageBackend::Memory => {
            if app_config.is_production() {
                warn!("In-memory storage in production: data is lost on restart");
            }
            Arc::new(MemoryStore::new())
        }
    };

    let selector = Arc::new(SlotSelector::new(program.rotation_seed));
    let state = AppState::new(store, JwtService::new(&app_config.jwt_secret), program, selector);
    let app = create_routes(state);

    let address = app_config.server_address();
    let listener = TcpListener::bind(&address)
        .await
        .with_context(|| format!("Failed to bind {address}"))?;
    info!(environment = %app_config.environment, "Circuit coach server starting on http://{address}");
    info!("Health check available at http://{address}/health");

    axum::serve(listener, app).await?;

    Ok(())
}
