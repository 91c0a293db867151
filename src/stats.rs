//! Lifetime and season statistics for the dashboard header cards.
//!
//! Only running activities dated inside the dashboard's range count.

use chrono::{Datelike, NaiveDate};
use serde::Serialize;

use crate::bucketing::{bucket_by, data_years, pace_min_per_mile, ViewScope};
use crate::models::{Bucket, NormalizedActivity};
use crate::normalize::in_data_range;

/// Weeks used to average a season's mileage.
const WEEKS_PER_SEASON: f64 = 52.0;

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct RunTotals {
  pub run_count: u32,
  pub total_miles: f64,
  pub total_hours: f64,
  pub elevation_gain_feet: f64,
  pub calories: f64,
  pub trail_miles: f64,
  pub road_miles: f64,
  pub longest_run_miles: f64,
  pub average_pace_min_per_mile: Option<f64>,
}

impl RunTotals {
  fn from_runs<'a>(runs: impl IntoIterator<Item = &'a NormalizedActivity>) -> Self {
    let mut totals = RunTotals::default();
    for run in runs {
      totals.run_count += 1;
      totals.total_miles += run.distance_miles;
      totals.total_hours += run.moving_hours;
      totals.elevation_gain_feet += run.elevation_gain_feet;
      totals.calories += run.calories;
      totals.trail_miles += run.trail_miles();
      totals.road_miles += run.road_miles();
      totals.longest_run_miles = totals.longest_run_miles.max(run.distance_miles);
    }
    totals.average_pace_min_per_mile = pace_min_per_mile(totals.total_hours, totals.total_miles);
    totals
  }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct LifetimeStats {
  #[serde(flatten)]
  pub totals: RunTotals,
  pub first_run: Option<NaiveDate>,
  pub last_run: Option<NaiveDate>,
  pub active_years: Vec<i32>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SeasonStats {
  pub year: i32,
  #[serde(flatten)]
  pub totals: RunTotals,
  pub average_weekly_miles: f64,
  /// Label of the month with the most miles, if any were run.
  pub busiest_month: Option<String>,
  pub months: Vec<Bucket>,
}

pub fn running_activities(activities: &[NormalizedActivity]) -> Vec<NormalizedActivity> {
  activities
    .iter()
    .filter(|a| a.is_running && in_data_range(a.date))
    .cloned()
    .collect()
}

pub fn lifetime_stats(activities: &[NormalizedActivity]) -> LifetimeStats {
  let runs = running_activities(activities);
  let dates: Vec<NaiveDate> = runs.iter().filter_map(|r| r.date.map(|d| d.date())).collect();

  let mut active_years: Vec<i32> = dates.iter().map(|d| d.year()).collect();
  active_years.sort_unstable();
  active_years.dedup();

  LifetimeStats {
    totals: RunTotals::from_runs(&runs),
    first_run: dates.iter().min().copied(),
    last_run: dates.iter().max().copied(),
    active_years,
  }
}

pub fn season_stats(activities: &[NormalizedActivity], year: i32) -> SeasonStats {
  let runs = running_activities(activities);
  let in_year: Vec<&NormalizedActivity> = runs
    .iter()
    .filter(|r| r.date.is_some_and(|d| d.year() == year))
    .collect();

  let totals = RunTotals::from_runs(in_year);
  let months = bucket_by(&runs, &ViewScope::Year { year });

  let busiest_month = months
    .iter()
    .filter(|m| m.total_miles > 0.0)
    .max_by(|a, b| a.total_miles.total_cmp(&b.total_miles))
    .map(|m| m.period_label.clone());

  SeasonStats {
    year,
    average_weekly_miles: totals.total_miles / WEEKS_PER_SEASON,
    totals,
    busiest_month,
    months,
  }
}

/// Year-over-year buckets backing the performance trend chart.
pub fn performance_trend(activities: &[NormalizedActivity]) -> Vec<Bucket> {
  bucket_by(&running_activities(activities), &ViewScope::AllYears)
}

/// Years selectable in the season view, newest first.
pub fn available_years(activities: &[NormalizedActivity]) -> Vec<i32> {
  let mut years = data_years(&running_activities(activities));
  years.reverse();
  years
}

#[cfg(test)]
mod tests {
  use super::*;
  use crate::assert_approx_eq;
  use crate::test_utils::{date, mock_activity, mock_activity_of_type};

  fn sample() -> Vec<NormalizedActivity> {
    let mut long_trail = mock_activity(2022, 6, 18, 20.0, 4.5, true);
    long_trail.elevation_gain_feet = 3200.0;
    long_trail.calories = 2400.0;

    vec![
      mock_activity(2020, 1, 4, 6.0, 1.0, false),
      mock_activity(2022, 6, 2, 8.0, 1.2, false),
      long_trail,
      mock_activity(2022, 9, 10, 10.0, 1.5, false),
      mock_activity_of_type("Walk", 2022, 6, 3, 3.0, 1.0),
      mock_activity(2015, 4, 1, 12.0, 2.0, false),
    ]
  }

  #[test]
  fn test_lifetime_counts_only_runs_in_range() {
    let stats = lifetime_stats(&sample());

    assert_eq!(stats.totals.run_count, 4);
    assert_approx_eq!(stats.totals.total_miles, 44.0, 1e-9);
    assert_approx_eq!(stats.totals.trail_miles + stats.totals.road_miles, 44.0, 1e-9);
    assert_eq!(stats.totals.longest_run_miles, 20.0);
    assert_eq!(stats.totals.elevation_gain_feet, 3200.0);
    assert_eq!(stats.first_run, Some(date(2020, 1, 4)));
    assert_eq!(stats.last_run, Some(date(2022, 9, 10)));
    assert_eq!(stats.active_years, vec![2020, 2022]);
    assert_approx_eq!(
      stats.totals.average_pace_min_per_mile.unwrap(),
      8.2 * 60.0 / 44.0,
      1e-9
    );
  }

  #[test]
  fn test_lifetime_of_nothing() {
    let stats = lifetime_stats(&[]);
    assert_eq!(stats.totals.run_count, 0);
    assert_eq!(stats.totals.average_pace_min_per_mile, None);
    assert_eq!(stats.first_run, None);
    assert!(stats.active_years.is_empty());
  }

  #[test]
  fn test_season_stats() {
    let season = season_stats(&sample(), 2022);

    assert_eq!(season.totals.run_count, 3);
    assert_approx_eq!(season.totals.total_miles, 38.0, 1e-9);
    assert_approx_eq!(season.average_weekly_miles, 38.0 / 52.0, 1e-9);
    assert_eq!(season.busiest_month.as_deref(), Some("Jun"));
    assert_eq!(season.months.len(), 12);
    assert_eq!(season.months[5].run_count, 2);
  }

  #[test]
  fn test_empty_season() {
    let season = season_stats(&sample(), 2021);
    assert_eq!(season.totals.run_count, 0);
    assert_eq!(season.busiest_month, None);
    assert_eq!(season.months.len(), 12);
  }

  #[test]
  fn test_trend_and_years() {
    let trend = performance_trend(&sample());
    let labels: Vec<_> = trend.iter().map(|b| b.period_label.as_str()).collect();
    assert_eq!(labels, vec!["2020", "2021", "2022"]);

    assert_eq!(available_years(&sample()), vec![2022, 2021, 2020]);
  }

  #[test]
  fn test_lifetime_json_is_flat() {
    let json = serde_json::to_value(lifetime_stats(&sample())).unwrap();
    assert_eq!(json["run_count"], 4);
    assert!(json.get("totals").is_none());
  }
}
