//! Record normalizer: resolves the export's alternate fields and string
//! encodings into the canonical shapes the engines consume.
//!
//! Every function here is total. Malformed values degrade to zero (numbers)
//! or `None` (dates) instead of failing the row.

use chrono::{DateTime, Datelike, NaiveDate, NaiveDateTime};

use crate::classify::{classify_terrain, is_running_activity, Terrain};
use crate::models::{DistanceClass, NormalizedActivity, NormalizedRace, RawActivity, RawRace};

pub const METERS_PER_MILE: f64 = 1609.34;

/// Records dated before this year are outside the dashboard's range.
pub const MIN_DATA_YEAR: i32 = 2016;

/// Export timestamp format, e.g. "Jan 5, 2020, 1:23:45 PM".
const ACTIVITY_DATE_FORMAT: &str = "%b %d, %Y, %I:%M:%S %p";

const FALLBACK_DATETIME_FORMATS: [&str; 2] = ["%Y-%m-%dT%H:%M:%S", "%Y-%m-%d %H:%M:%S"];

/// ---------------------------------------------------------------------------
/// Activities
/// ---------------------------------------------------------------------------

pub fn normalize_activity(raw: &RawActivity) -> NormalizedActivity {
  let activity_type = raw.activity_type.clone().unwrap_or_default();
  let distance_miles = resolve_distance_miles(raw);
  let elevation_gain_feet = non_negative(raw.elevation_gain_feet);
  let dirt_distance_miles = non_negative(raw.dirt_distance_meters) / METERS_PER_MILE;

  let is_trail =
    classify_terrain(distance_miles, elevation_gain_feet, dirt_distance_miles) == Terrain::Trail;

  NormalizedActivity {
    date: raw.activity_date.as_deref().and_then(parse_activity_date),
    name: raw.activity_name.clone(),
    is_running: is_running_activity(&activity_type),
    activity_type,
    distance_miles,
    moving_hours: non_negative(raw.moving_time_seconds) / 3600.0,
    elevation_gain_feet,
    dirt_distance_miles,
    calories: non_negative(raw.calories),
    is_trail,
  }
}

pub fn normalize_activities(raw: &[RawActivity]) -> Vec<NormalizedActivity> {
  raw.iter().map(normalize_activity).collect()
}

/// Meters field first, then the string-miles field, then zero.
fn resolve_distance_miles(raw: &RawActivity) -> f64 {
  match raw.distance_meters {
    Some(meters) if meters.is_finite() && meters > 0.0 => meters / METERS_PER_MILE,
    _ => non_negative(raw.distance_miles),
  }
}

/// Parse the export timestamp, accepting ISO-style strings as a fallback.
pub fn parse_activity_date(raw: &str) -> Option<NaiveDateTime> {
  let raw = raw.trim();

  if let Ok(parsed) = NaiveDateTime::parse_from_str(raw, ACTIVITY_DATE_FORMAT) {
    return Some(parsed);
  }
  if let Ok(parsed) = DateTime::parse_from_rfc3339(raw) {
    return Some(parsed.naive_local());
  }
  for format in FALLBACK_DATETIME_FORMATS {
    if let Ok(parsed) = NaiveDateTime::parse_from_str(raw, format) {
      return Some(parsed);
    }
  }
  NaiveDate::parse_from_str(raw, "%Y-%m-%d")
    .ok()
    .and_then(|d| d.and_hms_opt(0, 0, 0))
}

/// ---------------------------------------------------------------------------
/// Races
/// ---------------------------------------------------------------------------

pub fn normalize_race(raw: &RawRace) -> NormalizedRace {
  let distance_miles = non_negative(raw.distance_mi);

  NormalizedRace {
    date: raw.date.as_deref().and_then(parse_race_date),
    name: raw.name.clone(),
    location: raw.location.clone(),
    distance_miles,
    distance_class: DistanceClass::from_miles(distance_miles),
    time_seconds: raw.time.as_deref().map(parse_race_time).unwrap_or(0),
    overall_place: raw.overall_place,
    division_place: raw.division_place,
    percentile: raw.percentile.filter(|p| (0.0..=1.0).contains(p)),
    course_rating: raw.course_rating.filter(|r| *r <= 5),
    effort_rating: raw.effort_rating.filter(|r| *r <= 5),
    satisfaction_rating: raw.satisfaction_rating.filter(|r| *r <= 5),
    activity_link: raw.activity_link.clone(),
  }
}

pub fn normalize_races(raw: &[RawRace]) -> Vec<NormalizedRace> {
  raw.iter().map(normalize_race).collect()
}

/// Race dates only need their "yyyy-MM-dd" prefix.
pub fn parse_race_date(raw: &str) -> Option<NaiveDate> {
  let prefix = raw.trim().get(..10)?;
  NaiveDate::parse_from_str(prefix, "%Y-%m-%d").ok()
}

/// Finish time in seconds from "H:MM:SS" or a datetime-embedded time
/// ("1899-12-30T03:45:00"). Returns 0 for anything that is not exactly
/// three numeric parts.
pub fn parse_race_time(raw: &str) -> u32 {
  let raw = raw.trim();
  let clock = match raw.split_once('T') {
    Some((_, after)) => after,
    None => raw,
  };
  let clock = clock.trim_end_matches('Z');

  let parts: Vec<&str> = clock.split(':').collect();
  if parts.len() != 3 {
    return 0;
  }

  let mut values = [0.0_f64; 3];
  for (slot, part) in values.iter_mut().zip(&parts) {
    match part.trim().parse::<f64>() {
      Ok(v) if v.is_finite() && v >= 0.0 => *slot = v,
      _ => return 0,
    }
  }

  let total = values[0] * 3600.0 + values[1] * 60.0 + values[2];
  total.round().min(u32::MAX as f64) as u32
}

/// ---------------------------------------------------------------------------
/// Helpers
/// ---------------------------------------------------------------------------

pub fn in_data_range(date: Option<NaiveDateTime>) -> bool {
  date.is_some_and(|d| d.year() >= MIN_DATA_YEAR)
}

fn non_negative(value: Option<f64>) -> f64 {
  value.filter(|v| v.is_finite() && *v > 0.0).unwrap_or(0.0)
}
