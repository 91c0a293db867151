use chrono::NaiveDateTime;
use serde::Serialize;

use crate::bucketing::{DrillDown, DrillLevel, Selection, ViewScope};
use crate::models::{Bucket, WeekSummary};
use crate::normalize::MIN_DATA_YEAR;
use crate::races::{best_times_by_distance_class, PersonalRecord};
use crate::stats::{self, LifetimeStats, SeasonStats};
use crate::weekly;
use crate::AppState;

#[derive(Debug, Clone, Serialize)]
pub struct DrillView {
  pub drill: DrillDown,
  pub scope: ViewScope,
  pub level: DrillLevel,
  pub can_go_back: bool,
  pub buckets: Vec<Bucket>,
}

#[derive(Debug, Clone, Serialize)]
pub struct RecentWeeks {
  pub weeks: Vec<WeekSummary>,
  pub average_weekly_miles: f64,
}

/// What the binary prints: the lifetime cards, the recent training load and
/// the personal records table.
#[derive(Debug, Clone, Serialize)]
pub struct DashboardSnapshot {
  pub generated_at: NaiveDateTime,
  pub lifetime: LifetimeStats,
  pub recent: RecentWeeks,
  pub personal_records: Vec<PersonalRecord>,
}

pub fn get_lifetime_stats(state: &AppState) -> Result<LifetimeStats, String> {
  Ok(stats::lifetime_stats(&state.dataset.normalized_activities()))
}

pub fn get_season_stats(state: &AppState, year: i32) -> Result<SeasonStats, String> {
  if year < MIN_DATA_YEAR {
    return Err(format!("No data before {}", MIN_DATA_YEAR));
  }
  Ok(stats::season_stats(&state.dataset.normalized_activities(), year))
}

pub fn get_performance_trend(state: &AppState) -> Result<Vec<Bucket>, String> {
  Ok(stats::performance_trend(&state.dataset.normalized_activities()))
}

/// ---------------------------------------------------------------------------
/// Drill-down
/// ---------------------------------------------------------------------------

fn render(state: &AppState, drill: DrillDown) -> DrillView {
  let runs = stats::running_activities(&state.dataset.normalized_activities());
  DrillView {
    drill,
    scope: drill.scope(),
    level: drill.level(),
    can_go_back: drill.level() > drill.initial_level(),
    buckets: drill.buckets(&runs),
  }
}

/// Start a drill-down at `initial`: `AllYears` for lifetime, a year for a
/// season.
pub fn open_drilldown(state: &AppState, initial: ViewScope) -> Result<DrillView, String> {
  Ok(render(state, DrillDown::new(initial)))
}

pub fn drill_select(
  state: &AppState,
  drill: DrillDown,
  selection: Selection,
) -> Result<DrillView, String> {
  let next = drill
    .select(selection)
    .map_err(|e| format!("Cannot drill down: {}", e))?;
  Ok(render(state, next))
}

pub fn drill_back(state: &AppState, drill: DrillDown) -> Result<DrillView, String> {
  Ok(render(state, drill.back()))
}

/// ---------------------------------------------------------------------------
/// Recent Training Load
/// ---------------------------------------------------------------------------

/// The four weeks ending with the week containing `anchor` (normally now).
pub fn get_recent_weeks(state: &AppState, anchor: NaiveDateTime) -> Result<RecentWeeks, String> {
  let runs = stats::running_activities(&state.dataset.normalized_activities());
  let weeks = weekly::recent_weeks(&runs, anchor);
  Ok(RecentWeeks {
    average_weekly_miles: weekly::average_weekly_miles(&weeks),
    weeks,
  })
}

pub fn get_dashboard_snapshot(
  state: &AppState,
  anchor: NaiveDateTime,
) -> Result<DashboardSnapshot, String> {
  let races = state.dataset.normalized_races();

  Ok(DashboardSnapshot {
    generated_at: anchor,
    lifetime: get_lifetime_stats(state)?,
    recent: get_recent_weeks(state, anchor)?,
    personal_records: best_times_by_distance_class(&races).into_values().collect(),
  })
}
