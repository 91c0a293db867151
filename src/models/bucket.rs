use chrono::NaiveDate;
use serde::Serialize;

/// Aggregated statistics for one calendar period (year, month, week or day).
///
/// `trail_miles + road_miles == total_miles`; the pace fields are `None`
/// whenever the matching mileage is zero.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Bucket {
  pub period_label: String,
  pub period_start: NaiveDate,
  /// Exclusive upper bound of the period.
  pub period_end: NaiveDate,
  pub run_count: u32,
  pub total_miles: f64,
  pub total_hours: f64,
  pub trail_miles: f64,
  pub road_miles: f64,
  pub trail_pace_min_per_mile: Option<f64>,
  pub road_pace_min_per_mile: Option<f64>,
}

/// One week of the rolling "recent training load" window.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct WeekSummary {
  pub label: String,
  pub week_start: NaiveDate,
  pub run_count: u32,
  pub total_miles: f64,
  pub total_hours: f64,
  pub elevation_gain_feet: f64,
}
