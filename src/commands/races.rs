use serde::Serialize;

use crate::models::{DistanceClass, NormalizedRace};
use crate::races::{
  best_times_by_distance_class, display_medal, filter_races, format_race_time, percentile_summary,
  podium_finishes, progression_series, Medal, PercentileSummary, PersonalRecord, PodiumFinishes,
  ProgressionPoint, RaceFilter,
};
use crate::AppState;

/// One row of the race history table.
#[derive(Debug, Clone, Serialize)]
pub struct RaceRow {
  #[serde(flatten)]
  pub race: NormalizedRace,
  pub time_display: String,
  pub medal: Option<Medal>,
}

#[derive(Debug, Clone, Serialize)]
pub struct RaceInsights {
  pub race_count: usize,
  pub percentile: PercentileSummary,
  pub podiums: PodiumFinishes,
}

pub fn get_race_history(state: &AppState, filter: RaceFilter) -> Result<Vec<RaceRow>, String> {
  let rows = filter_races(&state.dataset.normalized_races(), &filter)
    .into_iter()
    .map(|race| RaceRow {
      time_display: format_race_time(race.time_seconds),
      medal: display_medal(&race),
      race,
    })
    .collect();
  Ok(rows)
}

/// Distance class labels present in the data, for the history filter.
pub fn get_race_distances(state: &AppState) -> Result<Vec<String>, String> {
  let mut classes: Vec<DistanceClass> = state
    .dataset
    .normalized_races()
    .into_iter()
    .map(|r| r.distance_class)
    .collect();
  classes.sort();
  classes.dedup();
  Ok(classes.iter().map(DistanceClass::label).collect())
}

/// Fastest race per class, longest distance first.
pub fn get_personal_records(state: &AppState) -> Result<Vec<PersonalRecord>, String> {
  Ok(
    best_times_by_distance_class(&state.dataset.normalized_races())
      .into_values()
      .collect(),
  )
}

pub fn get_race_progression(state: &AppState, distance: &str) -> Result<Vec<ProgressionPoint>, String> {
  if distance.trim().is_empty() {
    return Err("A distance is required".to_string());
  }
  let class = DistanceClass::from_label(distance);
  Ok(progression_series(&state.dataset.normalized_races(), &class))
}

pub fn get_race_insights(state: &AppState) -> Result<RaceInsights, String> {
  let races = state.dataset.normalized_races();
  Ok(RaceInsights {
    race_count: races.len(),
    percentile: percentile_summary(&races),
    podiums: podium_finishes(&races),
  })
}
