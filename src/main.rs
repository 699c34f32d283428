use std::sync::Arc;
use tracing_subscriber::EnvFilter;

use restaurant_api::auth::JwtKeys;
use restaurant_api::config::{config, AppConfig};
use restaurant_api::database::{
    DatabaseManager, MemoryRestaurantStore, PgRestaurantRepository, RestaurantStore,
};
use restaurant_api::is_production;
use restaurant_api::server::{app, AppState};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load .env if present so cargo run picks up DATABASE_URL, SECURITY_JWT_SECRET, etc.
    let _ = dotenvy::dotenv();

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new("restaurant_api=info,tower_http=info")),
        )
        .init();

    // Initialize configuration (this loads the config singleton)
    let config = config();
    tracing::info!("Starting Restaurant API in {:?} mode", config.environment);

    if is_production!() && config.security.cors_origins.iter().any(|o| o == "*") {
        tracing::warn!("CORS allows any origin in production");
    }

    let jwt = JwtKeys::from_config(&config.security).map_err(|e| {
        tracing::error!("Cannot start without a JWT secret: {}", e);
        e
    })?;
    let store = open_store(config).await?;
    tracing::info!("Using {} restaurant store", store.backend());

    let app = app(AppState::new(store, jwt), config);

    let bind_addr = format!("0.0.0.0:{}", config.server.port);
    let listener = tokio::net::TcpListener::bind(&bind_addr).await?;

    tracing::info!("Restaurant API listening on http://{}", bind_addr);

    axum::serve(listener, app).await?;
    Ok(())
}

async fn open_store(config: &AppConfig) -> anyhow::Result<Arc<dyn RestaurantStore>> {
    if config.database.url.is_none() {
        tracing::warn!("DATABASE_URL not set; listings are kept in memory only");
        return Ok(Arc::new(MemoryRestaurantStore::new()));
    }

    let pool = DatabaseManager::connect(&config.database).await?;
    let repository = PgRestaurantRepository::new(pool);
    repository.migrate().await?;
    Ok(Arc::new(repository))
}
