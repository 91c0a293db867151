//! Race analyzer
//!
//! Personal records per distance class, personal-best progression, and the
//! percentile/podium summaries behind the race history view. Races without a
//! parseable finish time are skipped by everything that ranks times.

use std::cmp::Ordering;
use std::collections::BTreeMap;

use chrono::{Datelike, NaiveDate};
use serde::{Deserialize, Serialize};

use crate::models::{DistanceClass, NormalizedRace};

/// ---------------------------------------------------------------------------
/// Personal Records
/// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PersonalRecord {
  pub distance_class: DistanceClass,
  pub race: NormalizedRace,
}

/// Fastest race per distance class. Ties keep the first race encountered.
pub fn best_times_by_distance_class(
  races: &[NormalizedRace],
) -> BTreeMap<DistanceClass, PersonalRecord> {
  let mut best: BTreeMap<DistanceClass, PersonalRecord> = BTreeMap::new();

  for race in races.iter().filter(|r| r.has_valid_time()) {
    match best.get(&race.distance_class) {
      Some(current) if race.time_seconds >= current.race.time_seconds => {}
      _ => {
        best.insert(
          race.distance_class.clone(),
          PersonalRecord {
            distance_class: race.distance_class.clone(),
            race: race.clone(),
          },
        );
      }
    }
  }

  best
}

/// ---------------------------------------------------------------------------
/// Progression
/// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ProgressionPoint {
  pub race_index: usize,
  pub date: Option<NaiveDate>,
  pub name: Option<String>,
  pub time_seconds: u32,
  /// Fastest time up to and including this race.
  pub running_personal_best: u32,
}

/// Races of one class in date order with the running personal best.
/// Undated races sort last, keeping their input order.
pub fn progression_series(
  races: &[NormalizedRace],
  distance_class: &DistanceClass,
) -> Vec<ProgressionPoint> {
  let mut matching: Vec<&NormalizedRace> = races
    .iter()
    .filter(|r| &r.distance_class == distance_class && r.has_valid_time())
    .collect();
  matching.sort_by(|a, b| compare_dates_undated_last(a.date, b.date));

  let mut best = u32::MAX;
  matching
    .into_iter()
    .enumerate()
    .map(|(race_index, race)| {
      best = best.min(race.time_seconds);
      ProgressionPoint {
        race_index,
        date: race.date,
        name: race.name.clone(),
        time_seconds: race.time_seconds,
        running_personal_best: best,
      }
    })
    .collect()
}

fn compare_dates_undated_last(a: Option<NaiveDate>, b: Option<NaiveDate>) -> Ordering {
  match (a, b) {
    (Some(a), Some(b)) => a.cmp(&b),
    (Some(_), None) => Ordering::Less,
    (None, Some(_)) => Ordering::Greater,
    (None, None) => Ordering::Equal,
  }
}

/// ---------------------------------------------------------------------------
/// Percentile and Podiums
/// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PercentileSummary {
  /// Races that carry a percentile.
  pub count: usize,
  pub average_percentile: Option<f64>,
}

pub fn percentile_summary(races: &[NormalizedRace]) -> PercentileSummary {
  let percentiles: Vec<f64> = races.iter().filter_map(|r| r.percentile).collect();
  let count = percentiles.len();
  let average_percentile = if count > 0 {
    Some(percentiles.iter().sum::<f64>() / count as f64)
  } else {
    None
  };

  PercentileSummary {
    count,
    average_percentile,
  }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PodiumFinishes {
  pub overall: Vec<NormalizedRace>,
  pub divisional: Vec<NormalizedRace>,
}

fn is_podium(place: Option<u32>) -> bool {
  matches!(place, Some(1..=3))
}

pub fn podium_finishes(races: &[NormalizedRace]) -> PodiumFinishes {
  PodiumFinishes {
    overall: races
      .iter()
      .filter(|r| is_podium(r.overall_place))
      .cloned()
      .collect(),
    divisional: races
      .iter()
      .filter(|r| is_podium(r.division_place))
      .cloned()
      .collect(),
  }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Medal {
  Gold,
  Silver,
  Bronze,
}

/// Medal shown next to a race in the history table.
///
/// An overall podium always shows gold, whatever the division place was.
/// Only non-overall podiums fall through to the division place.
pub fn display_medal(race: &NormalizedRace) -> Option<Medal> {
  if is_podium(race.overall_place) {
    return Some(Medal::Gold);
  }
  match race.division_place {
    Some(1) => Some(Medal::Gold),
    Some(2) => Some(Medal::Silver),
    Some(3) => Some(Medal::Bronze),
    _ => None,
  }
}

/// ---------------------------------------------------------------------------
/// Race History Table
/// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RaceFilter {
  /// Distance class label, e.g. "Marathon" or "8 mi".
  #[serde(default)]
  pub distance: Option<String>,
  #[serde(default)]
  pub year: Option<i32>,
}

/// Races matching `filter`, newest first (undated last).
pub fn filter_races(races: &[NormalizedRace], filter: &RaceFilter) -> Vec<NormalizedRace> {
  let class = filter.distance.as_deref().map(DistanceClass::from_label);

  let mut rows: Vec<NormalizedRace> = races
    .iter()
    .filter(|r| class.as_ref().map_or(true, |c| &r.distance_class == c))
    .filter(|r| {
      filter
        .year
        .map_or(true, |y| r.date.is_some_and(|d| d.year() == y))
    })
    .cloned()
    .collect();

  rows.sort_by(|a, b| match (a.date, b.date) {
    (Some(a), Some(b)) => b.cmp(&a),
    (Some(_), None) => Ordering::Less,
    (None, Some(_)) => Ordering::Greater,
    (None, None) => Ordering::Equal,
  });
  rows
}

/// "H:MM:SS" for a finish time, "--" when the time is unknown.
pub fn format_race_time(seconds: u32) -> String {
  if seconds == 0 {
    return "--".to_string();
  }
  format!(
    "{}:{:02}:{:02}",
    seconds / 3600,
    (seconds % 3600) / 60,
    seconds % 60
  )
}
