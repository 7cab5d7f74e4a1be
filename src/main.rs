//! EnrollHub server: class registration admission over HTTP.
//!
//! Main entry point that wires configuration, logging, the database and
//! the API together and starts the server.

use std::sync::Arc;

use tracing_subscriber::{EnvFilter, fmt};

use enrollhub_core::config::AppConfig;
use enrollhub_core::error::AppError;
use enrollhub_database::{DatabasePool, PgRegistrationStore};

#[tokio::main]
async fn main() {
    let config = match load_configuration() {
        Ok(c) => c,
        Err(e) => {
            eprintln!("Failed to load configuration: {e}");
            std::process::exit(1);
        }
    };

    init_logging(&config);

    if let Err(e) = run(config).await {
        tracing::error!("Server error: {}", e);
        std::process::exit(1);
    }
}

/// Load configuration from file, environment overlay and variables
fn load_configuration() -> Result<AppConfig, AppError> {
    let config_path =
        std::env::var("ENROLLHUB_CONFIG").unwrap_or_else(|_| "config/default.toml".to_string());
    let env = std::env::var("ENROLLHUB_ENV").unwrap_or_else(|_| "development".to_string());

    AppConfig::load_from(&config_path, &env)
}

/// Initialize tracing/logging
fn init_logging(config: &AppConfig) {
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&config.logging.level));

    match config.logging.format.as_str() {
        "json" => {
            fmt()
                .json()
                .with_env_filter(filter)
                .with_target(true)
                .with_thread_ids(true)
                .init();
        }
        _ => {
            fmt()
                .pretty()
                .with_env_filter(filter)
                .with_target(true)
                .init();
        }
    }
}

/// Main server run function
async fn run(config: AppConfig) -> Result<(), AppError> {
    tracing::info!("Starting EnrollHub v{}", env!("CARGO_PKG_VERSION"));

    tracing::info!("Connecting to database...");
    let pool = DatabasePool::connect(&config.database).await?;

    enrollhub_database::migration::run_migrations(pool.pool()).await?;

    let store = Arc::new(PgRegistrationStore::new(
        pool.pool().clone(),
        config.engine.lock_timeout(),
    ));

    enrollhub_api::run_server(config, store).await?;

    pool.close().await;
    tracing::info!("Database connections closed");
    Ok(())
}
