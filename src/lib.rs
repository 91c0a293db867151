pub mod bucketing;
pub mod classify;
pub mod commands;
pub mod config;
pub mod db;
pub mod delivery;
pub mod loader;
pub mod models;
pub mod normalize;
pub mod planner;
pub mod races;
pub mod stats;
pub mod weekly;

#[cfg(test)]
pub mod test_utils;

use chrono::Local;
use config::{AppConfig, ConfigError};
use db::{DbError, DbPool};
use loader::{Dataset, LoadError};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

/// Everything a command needs: configuration, the plan history pool and the
/// raw export rows.
pub struct AppState {
  pub config: AppConfig,
  pub db: DbPool,
  pub dataset: Dataset,
}

impl AppState {
  pub async fn initialize(config: AppConfig) -> Result<Self, StartupError> {
    let dataset = loader::load_dataset(&config.data_path).await?;
    let db = db::initialize_db(&config.plan_db_path).await?;
    Ok(Self { config, db, dataset })
  }
}

#[derive(Debug, thiserror::Error)]
pub enum StartupError {
  #[error(transparent)]
  Config(#[from] ConfigError),

  #[error(transparent)]
  Load(#[from] LoadError),

  #[error(transparent)]
  Db(#[from] DbError),

  #[error("Failed to start runtime: {0}")]
  Runtime(#[from] std::io::Error),

  #[error("{0}")]
  Command(String),

  #[error("Failed to encode snapshot: {0}")]
  Output(#[from] serde_json::Error),
}

/// Human-readable logs on stderr, filtered by `RUST_LOG` (default `info`).
pub fn init_logging() {
  let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));

  tracing_subscriber::registry()
    .with(filter)
    .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
    .init();
}

/// Load config and data, open the history database, and print the
/// dashboard snapshot as JSON on stdout.
pub fn run() -> Result<(), StartupError> {
  // Load environment variables from .env file
  dotenvy::dotenv().ok();
  init_logging();

  let runtime = tokio::runtime::Builder::new_multi_thread()
    .enable_all()
    .build()?;

  runtime.block_on(async {
    let config = AppConfig::from_env()?;
    let state = AppState::initialize(config).await?;

    let snapshot = commands::dashboard::get_dashboard_snapshot(&state, Local::now().naive_local())
      .map_err(StartupError::Command)?;
    println!("{}", serde_json::to_string_pretty(&snapshot)?);

    state.db.close().await;
    Ok::<(), StartupError>(())
  })
}
