use chrono::{DateTime, Datelike, Duration, Local, NaiveDate, Utc};

use crate::db;
use crate::delivery::{CalendarClient, DeliveryError, EmailClient};
use crate::models::SavedPlan;
use crate::planner::{generate_plan, PlanRequest};
use crate::stats::running_activities;
use crate::weekly::recent_weeks;
use crate::AppState;

pub const DEFAULT_HISTORY_LIMIT: i64 = 20;

/// Plans start on the coming Monday, or today when today is a Monday.
pub fn next_plan_start(today: NaiveDate) -> NaiveDate {
  let days_ahead = (7 - today.weekday().num_days_from_monday()) % 7;
  today + Duration::days(days_ahead as i64)
}

/// Build a plan from a chat-style request and the last four weeks of
/// running, and append it to the history.
pub async fn generate_training_plan(
  state: &AppState,
  message: &str,
  now: DateTime<Local>,
) -> Result<SavedPlan, String> {
  let request = PlanRequest::from_message(message);
  let runs = running_activities(&state.dataset.normalized_activities());
  let weeks = recent_weeks(&runs, now.naive_local());

  let plan = generate_plan(
    &request,
    &weeks,
    next_plan_start(now.date_naive()),
    now.with_timezone(&Utc),
  );

  let id = db::save_plan(&state.db, &plan)
    .await
    .map_err(|e| format!("Failed to save plan: {}", e))?;

  Ok(SavedPlan {
    id,
    created_at: plan.created_at,
    goal: plan.goal,
    plan,
  })
}

pub async fn get_plan_history(state: &AppState, limit: Option<i64>) -> Result<Vec<SavedPlan>, String> {
  let limit = limit.unwrap_or(DEFAULT_HISTORY_LIMIT).max(1);
  db::list_plans(&state.db, limit)
    .await
    .map_err(|e| format!("Failed to fetch plan history: {}", e))
}

pub async fn get_plan(state: &AppState, id: i64) -> Result<SavedPlan, String> {
  db::load_plan(&state.db, id)
    .await
    .map_err(|e| format!("Failed to fetch plan: {}", e))?
    .ok_or_else(|| format!("Plan {} not found", id))
}

pub async fn clear_plan_history(state: &AppState) -> Result<u64, String> {
  db::clear_history(&state.db)
    .await
    .map_err(|e| format!("Failed to clear plan history: {}", e))
}

/// ---------------------------------------------------------------------------
/// Delivery
/// ---------------------------------------------------------------------------

pub async fn email_plan(state: &AppState, id: i64, to_email: &str) -> Result<(), String> {
  let to_email = to_email.trim();
  if !to_email.contains('@') {
    return Err(format!("Invalid email address: {}", to_email));
  }

  let config = state
    .config
    .email
    .clone()
    .ok_or(DeliveryError::NotConfigured("Email"))
    .map_err(|e| e.to_string())?;

  let saved = get_plan(state, id).await?;
  let client = EmailClient::new(config).map_err(|e| e.to_string())?;
  client
    .send_plan(to_email, &saved.plan)
    .await
    .map_err(|e| format!("Failed to email plan: {}", e))
}

/// Returns the ids of the created calendar events.
pub async fn push_plan_to_calendar(state: &AppState, id: i64) -> Result<Vec<String>, String> {
  let config = state
    .config
    .calendar
    .clone()
    .ok_or(DeliveryError::NotConfigured("Calendar"))
    .map_err(|e| e.to_string())?;

  let saved = get_plan(state, id).await?;
  let client = CalendarClient::new(config).map_err(|e| e.to_string())?;
  client
    .push_plan(&saved.plan)
    .await
    .map_err(|e| format!("Failed to push plan to calendar: {}", e))
}
