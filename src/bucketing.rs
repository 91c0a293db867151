//! Time-bucketing engine
//!
//! Groups normalized activities into year / month / week / day buckets for
//! the drill-down charts. Buckets are recomputed from the full activity list
//! for whatever [`ViewScope`] is selected; nothing is cached between calls.
//!
//! Every period in the requested range is represented, including empty ones,
//! so chart x-axes stay contiguous.

use chrono::{Datelike, Duration, NaiveDate};
use serde::{Deserialize, Serialize};

use crate::models::{Bucket, NormalizedActivity};
use crate::normalize::in_data_range;

/// ---------------------------------------------------------------------------
/// Drill-down Levels and Scopes
/// ---------------------------------------------------------------------------

/// Granularity of the buckets on screen. Ordered shallow to deep.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DrillLevel {
  Years,
  Months,
  Weeks,
  Days,
}

/// The selection state a view renders from, passed by value into
/// [`bucket_by`]. Each variant carries exactly the selections its level
/// needs.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "scope", rename_all = "snake_case")]
pub enum ViewScope {
  /// One bucket per year of data.
  AllYears,
  /// Twelve month buckets.
  Year { year: i32 },
  /// Monday-start week buckets covering the month.
  Month { year: i32, month: u32 },
  /// Seven day buckets starting at `start` (a Monday).
  Week { year: i32, month: u32, start: NaiveDate },
}

impl ViewScope {
  pub fn level(&self) -> DrillLevel {
    match self {
      ViewScope::AllYears => DrillLevel::Years,
      ViewScope::Year { .. } => DrillLevel::Months,
      ViewScope::Month { .. } => DrillLevel::Weeks,
      ViewScope::Week { .. } => DrillLevel::Days,
    }
  }

  /// The next shallower scope, with this level's selection cleared.
  pub fn parent(&self) -> Option<ViewScope> {
    match *self {
      ViewScope::AllYears => None,
      ViewScope::Year { .. } => Some(ViewScope::AllYears),
      ViewScope::Month { year, .. } => Some(ViewScope::Year { year }),
      ViewScope::Week { year, month, .. } => Some(ViewScope::Month { year, month }),
    }
  }
}

/// A period picked on the chart to drill into.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", content = "value", rename_all = "snake_case")]
pub enum Selection {
  Year(i32),
  Month(u32),
  Week(NaiveDate),
}

#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum DrillError {
  #[error("Days are the deepest drill-down level")]
  Terminal,

  #[error("Invalid month: {0}")]
  InvalidMonth(u32),

  #[error("Week starting {0} is not part of the selected month")]
  WeekOutsideMonth(NaiveDate),

  #[error("Cannot select {selection:?} at the {level:?} level")]
  Mismatch { level: DrillLevel, selection: Selection },
}

/// ---------------------------------------------------------------------------
/// Drill-down State Machine
/// ---------------------------------------------------------------------------

/// One-directional drill-down: `select` goes one level deeper, `back` goes
/// one level shallower and clears the deeper selection. A view never backs
/// out past the scope it started at, so the season view (which starts at
/// months) stays within its year.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct DrillDown {
  initial: ViewScope,
  scope: ViewScope,
}

impl DrillDown {
  pub fn new(initial: ViewScope) -> Self {
    Self {
      initial,
      scope: initial,
    }
  }

  /// Lifetime view: starts at the year overview.
  pub fn lifetime() -> Self {
    Self::new(ViewScope::AllYears)
  }

  /// Season view: starts at the months of `year`.
  pub fn season(year: i32) -> Self {
    Self::new(ViewScope::Year { year })
  }

  pub fn scope(&self) -> ViewScope {
    self.scope
  }

  pub fn level(&self) -> DrillLevel {
    self.scope.level()
  }

  pub fn initial_level(&self) -> DrillLevel {
    self.initial.level()
  }

  pub fn select(&self, selection: Selection) -> Result<Self, DrillError> {
    let next = match (self.scope, selection) {
      (ViewScope::Week { .. }, _) => return Err(DrillError::Terminal),
      (ViewScope::AllYears, Selection::Year(year)) => ViewScope::Year { year },
      (ViewScope::Year { year }, Selection::Month(month)) => {
        if !(1..=12).contains(&month) {
          return Err(DrillError::InvalidMonth(month));
        }
        ViewScope::Month { year, month }
      }
      (ViewScope::Month { year, month }, Selection::Week(day)) => {
        let start = week_start_monday(day);
        if !month_week_starts(year, month).contains(&start) {
          return Err(DrillError::WeekOutsideMonth(start));
        }
        ViewScope::Week { year, month, start }
      }
      (scope, selection) => {
        return Err(DrillError::Mismatch {
          level: scope.level(),
          selection,
        })
      }
    };

    Ok(Self {
      initial: self.initial,
      scope: next,
    })
  }

  pub fn back(&self) -> Self {
    if self.scope.level() <= self.initial.level() {
      return *self;
    }
    match self.scope.parent() {
      Some(parent) => Self {
        initial: self.initial,
        scope: parent,
      },
      None => *self,
    }
  }

  pub fn buckets(&self, activities: &[NormalizedActivity]) -> Vec<Bucket> {
    bucket_by(activities, &self.scope)
  }
}

/// ---------------------------------------------------------------------------
/// Bucketing
/// ---------------------------------------------------------------------------

/// A labelled half-open date interval `[start, end)`.
#[derive(Debug, Clone, PartialEq)]
struct Period {
  label: String,
  start: NaiveDate,
  end: NaiveDate,
}

/// Bucket `activities` by the periods of `scope`, oldest first.
pub fn bucket_by(activities: &[NormalizedActivity], scope: &ViewScope) -> Vec<Bucket> {
  periods_for(activities, scope)
    .into_iter()
    .map(|period| {
      let matching: Vec<&NormalizedActivity> = activities
        .iter()
        .filter(|a| {
          a.date
            .map(|d| d.date() >= period.start && d.date() < period.end)
            .unwrap_or(false)
        })
        .collect();
      aggregate(period, &matching)
    })
    .collect()
}

/// Years with data, from the first to the last (gaps included).
pub fn data_years(activities: &[NormalizedActivity]) -> Vec<i32> {
  let years = activities
    .iter()
    .filter(|a| in_data_range(a.date))
    .filter_map(|a| a.date.map(|d| d.year()));

  let (min, max) = years.fold((None, None), |(min, max): (Option<i32>, Option<i32>), y| {
    (
      Some(min.map_or(y, |m| m.min(y))),
      Some(max.map_or(y, |m| m.max(y))),
    )
  });

  match (min, max) {
    (Some(min), Some(max)) => (min..=max).collect(),
    _ => Vec::new(),
  }
}

fn periods_for(activities: &[NormalizedActivity], scope: &ViewScope) -> Vec<Period> {
  match *scope {
    ViewScope::AllYears => data_years(activities)
      .into_iter()
      .filter_map(|year| {
        Some(Period {
          label: year.to_string(),
          start: NaiveDate::from_ymd_opt(year, 1, 1)?,
          end: NaiveDate::from_ymd_opt(year + 1, 1, 1)?,
        })
      })
      .collect(),

    ViewScope::Year { year } => (1..=12)
      .filter_map(|month| {
        let start = NaiveDate::from_ymd_opt(year, month, 1)?;
        Some(Period {
          label: start.format("%b").to_string(),
          start,
          end: first_of_next_month(start)?,
        })
      })
      .collect(),

    ViewScope::Month { year, month } => month_week_starts(year, month)
      .into_iter()
      .filter_map(|start| {
        let end = add_days(start, 7)?;
        let last = add_days(start, 6)?;
        Some(Period {
          label: format!("{} - {}", start.format("%b %-d"), last.format("%b %-d")),
          start,
          end,
        })
      })
      .collect(),

    ViewScope::Week { start, .. } => (0..7)
      .filter_map(|offset| {
        let day = add_days(start, offset)?;
        Some(Period {
          label: day.format("%a %-d").to_string(),
          start: day,
          end: add_days(day, 1)?,
        })
      })
      .collect(),
  }
}

fn aggregate(period: Period, activities: &[&NormalizedActivity]) -> Bucket {
  let mut total_miles = 0.0;
  let mut total_hours = 0.0;
  let mut trail_miles = 0.0;
  let mut trail_hours = 0.0;
  let mut road_miles = 0.0;
  let mut road_hours = 0.0;

  for a in activities {
    total_miles += a.distance_miles;
    total_hours += a.moving_hours;
    if a.is_trail {
      trail_miles += a.distance_miles;
      trail_hours += a.moving_hours;
    } else {
      road_miles += a.distance_miles;
      road_hours += a.moving_hours;
    }
  }

  Bucket {
    period_label: period.label,
    period_start: period.start,
    period_end: period.end,
    run_count: activities.len() as u32,
    total_miles,
    total_hours,
    trail_miles,
    road_miles,
    trail_pace_min_per_mile: pace_min_per_mile(trail_hours, trail_miles),
    road_pace_min_per_mile: pace_min_per_mile(road_hours, road_miles),
  }
}

/// Minutes per mile, `None` when there is no mileage to divide by.
pub fn pace_min_per_mile(hours: f64, miles: f64) -> Option<f64> {
  if miles > 0.0 {
    Some(hours * 60.0 / miles)
  } else {
    None
  }
}

/// ---------------------------------------------------------------------------
/// Calendar Helpers
/// ---------------------------------------------------------------------------

pub fn week_start_monday(day: NaiveDate) -> NaiveDate {
  let offset = day.weekday().num_days_from_monday() as i64;
  day.checked_sub_signed(Duration::days(offset)).unwrap_or(day)
}

/// Mondays of every week touching the month: from the Monday on or before
/// the 1st through the last Monday on or before month end.
pub fn month_week_starts(year: i32, month: u32) -> Vec<NaiveDate> {
  let Some(first) = NaiveDate::from_ymd_opt(year, month, 1) else {
    return Vec::new();
  };
  let Some(last) = first_of_next_month(first).and_then(|d| add_days(d, -1)) else {
    return Vec::new();
  };

  let mut starts = Vec::new();
  let mut start = week_start_monday(first);
  while start <= last {
    starts.push(start);
    match add_days(start, 7) {
      Some(next) => start = next,
      None => break,
    }
  }
  starts
}

fn first_of_next_month(first: NaiveDate) -> Option<NaiveDate> {
  if first.month() == 12 {
    NaiveDate::from_ymd_opt(first.year() + 1, 1, 1)
  } else {
    NaiveDate::from_ymd_opt(first.year(), first.month() + 1, 1)
  }
}

fn add_days(day: NaiveDate, days: i64) -> Option<NaiveDate> {
  day.checked_add_signed(Duration::days(days))
}
