//! Local plan history: an append-only list of generated plans in SQLite.

use std::path::Path;

use chrono::{DateTime, Utc};
use sqlx::sqlite::{SqlitePool, SqlitePoolOptions};

use crate::models::{PlanGoal, SavedPlan, TrainingPlan};

pub type DbPool = SqlitePool;

#[derive(Debug, thiserror::Error)]
pub enum DbError {
  #[error("Database error: {0}")]
  Sqlx(#[from] sqlx::Error),

  #[error("Migration error: {0}")]
  Migrate(#[from] sqlx::migrate::MigrateError),

  #[error("Failed to create database directory: {0}")]
  Io(#[from] std::io::Error),

  #[error("Stored plan is unreadable: {0}")]
  Corrupt(String),
}

/// Open (creating if needed) the history database and run migrations.
pub async fn initialize_db(path: &Path) -> Result<DbPool, DbError> {
  if let Some(parent) = path.parent() {
    if !parent.as_os_str().is_empty() {
      tokio::fs::create_dir_all(parent).await?;
    }
  }

  let db_url = format!("sqlite://{}?mode=rwc", path.display());
  tracing::info!(path = %path.display(), "Initializing plan history database");

  let pool = SqlitePoolOptions::new()
    .max_connections(5)
    .connect(&db_url)
    .await?;

  sqlx::migrate!("./migrations").run(&pool).await?;

  tracing::info!("Plan history database ready");
  Ok(pool)
}

#[derive(Debug, sqlx::FromRow)]
struct PlanRow {
  id: i64,
  created_at: DateTime<Utc>,
  goal: String,
  plan_json: String,
}

impl TryFrom<PlanRow> for SavedPlan {
  type Error = DbError;

  fn try_from(row: PlanRow) -> Result<Self, Self::Error> {
    let goal: PlanGoal = row.goal.parse().map_err(DbError::Corrupt)?;
    let plan: TrainingPlan = serde_json::from_str(&row.plan_json)
      .map_err(|e| DbError::Corrupt(format!("plan {}: {}", row.id, e)))?;

    Ok(SavedPlan {
      id: row.id,
      created_at: row.created_at,
      goal,
      plan,
    })
  }
}

/// Append a plan snapshot, returning its id.
pub async fn save_plan(pool: &DbPool, plan: &TrainingPlan) -> Result<i64, DbError> {
  let plan_json =
    serde_json::to_string(plan).map_err(|e| DbError::Corrupt(format!("encode: {}", e)))?;

  let result = sqlx::query(
    r#"
    INSERT INTO plan_history (created_at, goal, start_date, plan_json)
    VALUES (?1, ?2, ?3, ?4)
    "#,
  )
  .bind(plan.created_at)
  .bind(plan.goal.label())
  .bind(plan.start_date)
  .bind(plan_json)
  .execute(pool)
  .await?;

  let id = result.last_insert_rowid();
  tracing::debug!(id, goal = %plan.goal, "Saved plan snapshot");
  Ok(id)
}

/// Most recent plans first.
pub async fn list_plans(pool: &DbPool, limit: i64) -> Result<Vec<SavedPlan>, DbError> {
  let rows = sqlx::query_as::<_, PlanRow>(
    "SELECT id, created_at, goal, plan_json FROM plan_history ORDER BY created_at DESC, id DESC LIMIT ?1",
  )
  .bind(limit)
  .fetch_all(pool)
  .await?;

  rows.into_iter().map(SavedPlan::try_from).collect()
}

pub async fn load_plan(pool: &DbPool, id: i64) -> Result<Option<SavedPlan>, DbError> {
  let row = sqlx::query_as::<_, PlanRow>(
    "SELECT id, created_at, goal, plan_json FROM plan_history WHERE id = ?1",
  )
  .bind(id)
  .fetch_optional(pool)
  .await?;

  row.map(SavedPlan::try_from).transpose()
}

/// Remove every snapshot, returning how many were deleted.
pub async fn clear_history(pool: &DbPool) -> Result<u64, DbError> {
  let result = sqlx::query("DELETE FROM plan_history").execute(pool).await?;
  tracing::info!(deleted = result.rows_affected(), "Cleared plan history");
  Ok(result.rows_affected())
}
