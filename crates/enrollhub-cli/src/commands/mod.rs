//! CLI command definitions and dispatch.

pub mod class;
pub mod migrate;
pub mod registration;
pub mod verify;

use std::sync::Arc;

use clap::{Parser, Subcommand};

use enrollhub_core::config::AppConfig;
use enrollhub_core::error::AppError;
use enrollhub_database::{DatabasePool, PgRegistrationStore, RegistrationStore};
use enrollhub_service::AdmissionEngine;

use crate::output::OutputFormat;

/// EnrollHub: class registration administration
#[derive(Debug, Parser)]
#[command(name = "enrollhub", version, about, long_about = None)]
pub struct Cli {
    /// Path to the base configuration file
    #[arg(short, long, default_value = "config/default.toml")]
    pub config: String,

    /// Environment overlay loaded next to the base file
    #[arg(short, long, default_value = "development")]
    pub env: String,

    /// Output format
    #[arg(short, long, value_enum, default_value = "table")]
    pub format: OutputFormat,

    /// Subcommand to execute
    #[command(subcommand)]
    pub command: Commands,
}

/// Top-level commands
#[derive(Debug, Subcommand)]
pub enum Commands {
    /// Database migration management
    Migrate(migrate::MigrateArgs),
    /// Class rosters and seat counts
    Class(class::ClassArgs),
    /// Register, drop and assign participants
    Registration(registration::RegistrationArgs),
    /// Check every class of an event for broken registration invariants
    Verify(verify::VerifyArgs),
}

impl Cli {
    /// Execute the CLI command
    pub async fn execute(&self) -> Result<(), AppError> {
        let config = AppConfig::load_from(&self.config, &self.env)?;
        match &self.command {
            Commands::Migrate(args) => migrate::execute(args, &config).await,
            Commands::Class(args) => class::execute(args, &config, self.format).await,
            Commands::Registration(args) => {
                registration::execute(args, &config, self.format).await
            }
            Commands::Verify(args) => verify::execute(args, &config, self.format).await,
        }
    }
}

/// Helper: connect the PostgreSQL registration store
pub async fn connect_store(config: &AppConfig) -> Result<Arc<dyn RegistrationStore>, AppError> {
    let pool = DatabasePool::connect(&config.database).await?;
    Ok(Arc::new(PgRegistrationStore::new(
        pool.into_pool(),
        config.engine.lock_timeout(),
    )))
}

/// Helper: an admission engine over the PostgreSQL store
pub async fn connect_engine(config: &AppConfig) -> Result<AdmissionEngine, AppError> {
    let store = connect_store(config).await?;
    Ok(AdmissionEngine::new(store, &config.engine))
}

/// Helper: ask before a destructive action unless `yes` was given
pub fn confirm(prompt: &str, yes: bool) -> Result<bool, AppError> {
    if yes {
        return Ok(true);
    }
    dialoguer::Confirm::new()
        .with_prompt(prompt)
        .default(false)
        .interact()
        .map_err(|e| AppError::internal(format!("Input error: {e}")))
}
