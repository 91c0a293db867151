use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};

use super::lenient;

/// One row of `activities_mapped.json`, as exported.
///
/// Keys follow the export's column headers; snake_case aliases are accepted
/// for rows that were re-mapped by hand. `distance_meters` ("Distance.1") is
/// authoritative when present.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct RawActivity {
  #[serde(rename = "Activity ID", alias = "activity_id", default, deserialize_with = "lenient::string")]
  pub activity_id: Option<String>,

  #[serde(rename = "Activity Name", alias = "activity_name", default, deserialize_with = "lenient::string")]
  pub activity_name: Option<String>,

  #[serde(rename = "Activity Type", alias = "activity_type", default, deserialize_with = "lenient::string")]
  pub activity_type: Option<String>,

  #[serde(rename = "Activity Date", alias = "activity_date", default, deserialize_with = "lenient::string")]
  pub activity_date: Option<String>,

  #[serde(rename = "Distance", alias = "distance", default, deserialize_with = "lenient::number")]
  pub distance_miles: Option<f64>,

  #[serde(rename = "Distance.1", alias = "distance_meters", default, deserialize_with = "lenient::number")]
  pub distance_meters: Option<f64>,

  #[serde(rename = "Moving Time", alias = "moving_time", default, deserialize_with = "lenient::number")]
  pub moving_time_seconds: Option<f64>,

  #[serde(rename = "Elevation Gain", alias = "elevation_gain", default, deserialize_with = "lenient::number")]
  pub elevation_gain_feet: Option<f64>,

  #[serde(rename = "Dirt Distance", alias = "dirt_distance", default, deserialize_with = "lenient::number")]
  pub dirt_distance_meters: Option<f64>,

  #[serde(rename = "Calories", alias = "calories", default, deserialize_with = "lenient::number")]
  pub calories: Option<f64>,
}

/// Canonical activity shape every engine works on.
///
/// `date` is `None` when the export's timestamp could not be parsed; such
/// records never fall inside any calendar period.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct NormalizedActivity {
  pub date: Option<NaiveDateTime>,
  pub name: Option<String>,
  pub activity_type: String,
  pub distance_miles: f64,
  pub moving_hours: f64,
  pub elevation_gain_feet: f64,
  pub dirt_distance_miles: f64,
  pub calories: f64,
  pub is_running: bool,
  pub is_trail: bool,
}

impl NormalizedActivity {
  pub fn trail_miles(&self) -> f64 {
    if self.is_trail {
      self.distance_miles
    } else {
      0.0
    }
  }

  pub fn road_miles(&self) -> f64 {
    if self.is_trail {
      0.0
    } else {
      self.distance_miles
    }
  }
}
