//! Test utilities and helpers for unit testing
//!
//! This module provides common test infrastructure including:
//! - Database setup/teardown
//! - Mock data factories
//! - Test fixtures
//! - Helper assertions

use chrono::{DateTime, NaiveDate, NaiveDateTime, Utc};
use sqlx::SqlitePool;

use crate::classify::is_running_activity;
use crate::config::AppConfig;
use crate::loader::Dataset;
use crate::models::{
  NormalizedActivity, NormalizedRace, PlanGoal, RawRace, TrainingPlan, WeekSummary,
};
use crate::normalize::normalize_race;
use crate::planner::{generate_plan, PlanRequest};
use crate::AppState;

/// ---------------------------------------------------------------------------
/// Database Test Utilities
/// ---------------------------------------------------------------------------

/// Create an in-memory SQLite database for testing
/// Runs all migrations and returns a ready-to-use pool
///
/// Uses max_connections(1) to prevent multiple pool connections from creating
/// isolated in-memory databases, which would cause intermittent test failures
pub async fn setup_test_db() -> SqlitePool {
  let pool = sqlx::sqlite::SqlitePoolOptions::new()
    .max_connections(1)
    .connect("sqlite::memory:")
    .await
    .expect("Failed to create in-memory database");

  sqlx::migrate!("./migrations")
    .run(&pool)
    .await
    .expect("Failed to run migrations");

  pool
}

/// Close a test database pool
pub async fn teardown_test_db(pool: SqlitePool) {
  pool.close().await;
}

/// ---------------------------------------------------------------------------
/// Date Helpers
/// ---------------------------------------------------------------------------

pub fn date(year: i32, month: u32, day: u32) -> NaiveDate {
  NaiveDate::from_ymd_opt(year, month, day).expect("valid test date")
}

pub fn datetime(year: i32, month: u32, day: u32, hour: u32, minute: u32) -> NaiveDateTime {
  date(year, month, day)
    .and_hms_opt(hour, minute, 0)
    .expect("valid test time")
}

/// ---------------------------------------------------------------------------
/// Mock Data Factories
/// ---------------------------------------------------------------------------

/// A morning run with explicit terrain, skipping classification.
pub fn mock_activity(
  year: i32,
  month: u32,
  day: u32,
  miles: f64,
  hours: f64,
  is_trail: bool,
) -> NormalizedActivity {
  NormalizedActivity {
    date: Some(datetime(year, month, day, 7, 0)),
    name: Some(format!("Run {}-{:02}-{:02}", year, month, day)),
    activity_type: "Run".to_string(),
    distance_miles: miles,
    moving_hours: hours,
    elevation_gain_feet: 0.0,
    dirt_distance_miles: 0.0,
    calories: 0.0,
    is_running: true,
    is_trail,
  }
}

/// A run whose timestamp failed to parse.
pub fn mock_activity_without_date(miles: f64, hours: f64) -> NormalizedActivity {
  NormalizedActivity {
    date: None,
    ..mock_activity(2020, 1, 1, miles, hours, false)
  }
}

pub fn mock_activity_of_type(
  activity_type: &str,
  year: i32,
  month: u32,
  day: u32,
  miles: f64,
  hours: f64,
) -> NormalizedActivity {
  NormalizedActivity {
    activity_type: activity_type.to_string(),
    is_running: is_running_activity(activity_type),
    ..mock_activity(year, month, day, miles, hours, false)
  }
}

/// A race normalized the same way production rows are.
pub fn mock_race(date: &str, miles: f64, time: &str) -> NormalizedRace {
  normalize_race(&RawRace {
    date: Some(date.to_string()),
    name: Some(format!("Race {}", date)),
    distance_mi: Some(miles),
    time: Some(time.to_string()),
    ..Default::default()
  })
}

/// A 5K with the given placings.
pub fn mock_race_placed(overall: Option<u32>, division: Option<u32>) -> NormalizedRace {
  NormalizedRace {
    overall_place: overall,
    division_place: division,
    ..mock_race("2021-06-05", 3.1, "0:21:30")
  }
}

/// Consecutive weeks at ~9 min/mi, oldest first.
pub fn mock_week_summaries(miles: &[f64]) -> Vec<WeekSummary> {
  let last = miles.len();
  miles
    .iter()
    .enumerate()
    .map(|(i, m)| WeekSummary {
      label: crate::weekly::week_label(last - 1 - i),
      week_start: date(2024, 2, 19) + chrono::Duration::weeks(i as i64),
      run_count: if *m > 0.0 { 4 } else { 0 },
      total_miles: *m,
      total_hours: m * 9.0 / 60.0,
      elevation_gain_feet: 0.0,
    })
    .collect()
}

/// A template plan built from a steady 20-mile baseline.
pub fn mock_plan(goal: PlanGoal, created_at: DateTime<Utc>) -> TrainingPlan {
  let request = PlanRequest {
    goal,
    days_per_week: 4,
  };
  generate_plan(
    &request,
    &mock_week_summaries(&[20.0, 20.0, 20.0, 20.0]),
    created_at.date_naive(),
    created_at,
  )
}

/// ---------------------------------------------------------------------------
/// Dataset Fixtures
/// ---------------------------------------------------------------------------

/// Export rows in the shapes seen in the wild: meters with string miles,
/// comma thousands, non-run types, an unparseable date and a pre-2016 run.
pub const MOCK_ACTIVITIES_JSON: &str = r#"[
  {"Activity ID": 1, "Activity Name": "Morning Run", "Activity Type": "Run",
   "Activity Date": "Mar 4, 2024, 7:02:11 AM", "Distance": "5.00", "Distance.1": 8046.7,
   "Moving Time": 2700, "Elevation Gain": 60, "Calories": 520},
  {"Activity ID": 2, "Activity Name": "Ridge Loop", "Activity Type": "Trail Run",
   "Activity Date": "Mar 9, 2024, 8:15:00 AM", "Distance": "10.0", "Distance.1": 16093.4,
   "Moving Time": "7,200", "Elevation Gain": "1,800", "Dirt Distance": 15000},
  {"Activity ID": 3, "Activity Name": "Commute", "Activity Type": "Ride",
   "Activity Date": "Mar 5, 2024, 5:30:00 PM", "Distance.1": 20000, "Moving Time": 3000},
  {"Activity ID": 4, "Activity Name": "Old Run", "Activity Type": "Run",
   "Activity Date": "Jun 1, 2015, 6:00:00 AM", "Distance.1": 16093.4, "Moving Time": 5400},
  {"Activity ID": 5, "Activity Name": "Lost Watch", "Activity Type": "Run",
   "Activity Date": "sometime", "Distance": "3.0", "Moving Time": 1800},
  {"Activity ID": 6, "Activity Name": "Tempo", "Activity Type": "Run",
   "Activity Date": "Nov 20, 2023, 6:45:00 AM", "Distance": "6.2", "Distance.1": 0,
   "Moving Time": 2900}
]"#;

pub const MOCK_RACES_JSON: &str = r#"[
  {"date": "2023-10-08T00:00:00", "race": "City Marathon", "location": "Chicago, IL",
   "distance_mi": 26.2, "time": "1899-12-31T03:41:12Z", "overall_place": 2100,
   "division_place": 180, "percentile": 0.82, "course_rating": 5},
  {"date": "2022-10-09", "race": "City Marathon", "distance_mi": "26.2",
   "time": "3:55:40", "percentile": 0.74},
  {"date": "2023-05-20", "race": "Trail 5K", "distance_mi": 3.1, "time": "0:22:05",
   "overall_place": 3, "division_place": 1},
  {"date": "2021-04-11", "race": "Spring 10K", "distance_mi": 6.2, "time": "0:47:30",
   "division_place": 2, "effort_rating": 9},
  {"date": "2024-01-01", "race": "Resolution Run", "distance_mi": 8.0, "time": ""}
]"#;

pub fn mock_dataset() -> Dataset {
  Dataset::from_json(MOCK_ACTIVITIES_JSON, MOCK_RACES_JSON).expect("fixture parses")
}

/// App state over the fixture dataset and an in-memory history database.
pub async fn mock_app_state() -> AppState {
  AppState {
    config: AppConfig::default(),
    db: setup_test_db().await,
    dataset: mock_dataset(),
  }
}

/// ---------------------------------------------------------------------------
/// Helper Assertions
/// ---------------------------------------------------------------------------

/// Assert that two f64 values are approximately equal
#[macro_export]
macro_rules! assert_approx_eq {
  ($left:expr, $right:expr, $tolerance:expr) => {
    let diff = ($left - $right).abs();
    assert!(
      diff < $tolerance,
      "Values not approximately equal: {} vs {} (diff: {}, tolerance: {})",
      $left,
      $right,
      diff,
      $tolerance
    );
  };
}

#[cfg(test)]
mod tests {
  use super::*;

  #[tokio::test]
  async fn test_setup_test_db() {
    let pool = setup_test_db().await;

    let result: (i64,) = sqlx::query_as("SELECT COUNT(*) FROM plan_history")
      .fetch_one(&pool)
      .await
      .expect("plan_history table should exist");
    assert_eq!(result.0, 0);

    teardown_test_db(pool).await;
  }

  #[test]
  fn test_mock_race_is_normalized() {
    let race = mock_race("2019-10-13", 26.2, "3:30:00");
    assert_eq!(race.time_seconds, 12600);
    assert_eq!(race.date, Some(date(2019, 10, 13)));
  }

  #[test]
  fn test_mock_week_summaries_labels() {
    let weeks = mock_week_summaries(&[10.0, 12.0]);
    assert_eq!(weeks[0].label, "Last Week");
    assert_eq!(weeks[1].label, "This Week");
    assert_approx_eq!(weeks[1].total_hours, 1.8, 1e-9);
  }

  #[test]
  fn test_mock_dataset_keeps_every_row() {
    let dataset = mock_dataset();
    assert_eq!(dataset.activities.len(), 6);
    assert_eq!(dataset.races.len(), 5);
  }
}
