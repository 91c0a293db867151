//! Rolling weekly summary for the "recent training load" view and the plan
//! coach.
//!
//! Unlike the drill-down buckets this window does not split trail and road;
//! it reports mileage, time, run count and climbing only.

use chrono::{Datelike, Duration, NaiveDate, NaiveDateTime, Weekday};

use crate::models::{NormalizedActivity, WeekSummary};

pub const DEFAULT_WEEKS: usize = 4;
pub const DEFAULT_WEEK_START: Weekday = Weekday::Mon;

/// `n` whole weeks ending with the week containing `anchor`, most recent
/// last. `anchor` is normally the current local time.
pub fn last_n_weeks(
  activities: &[NormalizedActivity],
  n: usize,
  week_start: Weekday,
  anchor: NaiveDateTime,
) -> Vec<WeekSummary> {
  let current_start = start_of_week(anchor.date(), week_start);

  (0..n)
    .rev()
    .filter_map(|weeks_ago| {
      let start = current_start.checked_sub_signed(Duration::weeks(weeks_ago as i64))?;
      let end = start.checked_add_signed(Duration::weeks(1))?;
      Some(summarize_week(activities, weeks_ago, start, end))
    })
    .collect()
}

/// The default 4-week, Monday-start window.
pub fn recent_weeks(activities: &[NormalizedActivity], anchor: NaiveDateTime) -> Vec<WeekSummary> {
  last_n_weeks(activities, DEFAULT_WEEKS, DEFAULT_WEEK_START, anchor)
}

pub fn week_label(weeks_ago: usize) -> String {
  match weeks_ago {
    0 => "This Week".to_string(),
    1 => "Last Week".to_string(),
    k => format!("{} weeks ago", k),
  }
}

/// Mean weekly mileage across the window (0 for an empty window).
pub fn average_weekly_miles(weeks: &[WeekSummary]) -> f64 {
  if weeks.is_empty() {
    return 0.0;
  }
  weeks.iter().map(|w| w.total_miles).sum::<f64>() / weeks.len() as f64
}

fn start_of_week(day: NaiveDate, week_start: Weekday) -> NaiveDate {
  let offset = (day.weekday().num_days_from_monday() + 7 - week_start.num_days_from_monday()) % 7;
  day.checked_sub_signed(Duration::days(offset as i64)).unwrap_or(day)
}

fn summarize_week(
  activities: &[NormalizedActivity],
  weeks_ago: usize,
  start: NaiveDate,
  end: NaiveDate,
) -> WeekSummary {
  let mut summary = WeekSummary {
    label: week_label(weeks_ago),
    week_start: start,
    run_count: 0,
    total_miles: 0.0,
    total_hours: 0.0,
    elevation_gain_feet: 0.0,
  };

  for a in activities {
    let Some(date) = a.date.map(|d| d.date()) else {
      continue;
    };
    if date < start || date >= end {
      continue;
    }
    summary.run_count += 1;
    summary.total_miles += a.distance_miles;
    summary.total_hours += a.moving_hours;
    summary.elevation_gain_feet += a.elevation_gain_feet;
  }

  summary
}

#[cfg(test)]
mod tests {
  use super::*;
  use crate::assert_approx_eq;
  use crate::test_utils::{date, datetime, mock_activity};

  fn anchor() -> NaiveDateTime {
    // Thursday
    datetime(2024, 3, 14, 18, 0)
  }

  #[test]
  fn test_four_weeks_most_recent_last() {
    let weeks = recent_weeks(&[], anchor());

    assert_eq!(weeks.len(), 4);
    let labels: Vec<_> = weeks.iter().map(|w| w.label.as_str()).collect();
    assert_eq!(labels, vec!["3 weeks ago", "2 weeks ago", "Last Week", "This Week"]);
    assert_eq!(weeks[3].week_start, date(2024, 3, 11));
    assert_eq!(weeks[0].week_start, date(2024, 2, 19));
  }

  #[test]
  fn test_activities_land_in_their_week() {
    let activities = vec![
      mock_activity(2024, 3, 11, 5.0, 0.8, false),
      mock_activity(2024, 3, 17, 12.0, 2.0, true),
      mock_activity(2024, 3, 10, 8.0, 1.2, false),
      mock_activity(2024, 2, 19, 4.0, 0.6, false),
      mock_activity(2024, 2, 18, 20.0, 3.0, false),
    ];
    let weeks = recent_weeks(&activities, anchor());

    assert_eq!(weeks[3].run_count, 2);
    assert_approx_eq!(weeks[3].total_miles, 17.0, 1e-9);
    assert_approx_eq!(weeks[3].total_hours, 2.8, 1e-9);
    assert_eq!(weeks[2].run_count, 1);
    assert_eq!(weeks[1].run_count, 0);
    assert_eq!(weeks[0].run_count, 1);
  }

  #[test]
  fn test_elevation_is_summed() {
    let mut hilly = mock_activity(2024, 3, 12, 6.0, 1.0, true);
    hilly.elevation_gain_feet = 900.0;
    let mut flat = mock_activity(2024, 3, 13, 4.0, 0.6, false);
    flat.elevation_gain_feet = 40.0;

    let weeks = recent_weeks(&[hilly, flat], anchor());
    assert_eq!(weeks[3].elevation_gain_feet, 940.0);
  }

  #[test]
  fn test_custom_week_start_and_length() {
    let weeks = last_n_weeks(&[], 2, Weekday::Sun, anchor());
    assert_eq!(weeks.len(), 2);
    assert_eq!(weeks[1].week_start, date(2024, 3, 10));
    assert_eq!(weeks[0].week_start, date(2024, 3, 3));

    assert!(last_n_weeks(&[], 0, Weekday::Mon, anchor()).is_empty());
  }

  #[test]
  fn test_anchor_on_week_start() {
    let weeks = recent_weeks(&[], datetime(2024, 3, 11, 0, 0));
    assert_eq!(weeks[3].week_start, date(2024, 3, 11));
  }

  #[test]
  fn test_empty_week_is_all_zero() {
    let weeks = recent_weeks(&[], anchor());
    for week in &weeks {
      assert_eq!(week.run_count, 0);
      assert_eq!(week.total_miles, 0.0);
      assert_eq!(week.total_hours, 0.0);
    }
    assert_eq!(average_weekly_miles(&weeks), 0.0);
    assert_eq!(average_weekly_miles(&[]), 0.0);
  }

  #[test]
  fn test_average_weekly_miles() {
    let activities = vec![
      mock_activity(2024, 3, 12, 20.0, 3.0, false),
      mock_activity(2024, 3, 5, 12.0, 2.0, false),
    ];
    let weeks = recent_weeks(&activities, anchor());
    assert_approx_eq!(average_weekly_miles(&weeks), 8.0, 1e-9);
  }
}
