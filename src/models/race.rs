use chrono::NaiveDate;
use serde::{Deserialize, Serialize, Serializer};

use super::lenient;

/// One row of `races_normalized.json`.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct RawRace {
  #[serde(default, alias = "Date", deserialize_with = "lenient::string")]
  pub date: Option<String>,

  #[serde(default, alias = "race", alias = "Race", deserialize_with = "lenient::string")]
  pub name: Option<String>,

  #[serde(default, alias = "location", deserialize_with = "lenient::string")]
  pub location: Option<String>,

  #[serde(default, alias = "distance", alias = "Distance", deserialize_with = "lenient::number")]
  pub distance_mi: Option<f64>,

  /// "H:MM:SS", or a datetime with the finish time embedded after the `T`.
  #[serde(default, alias = "Time", alias = "finish_time", deserialize_with = "lenient::string")]
  pub time: Option<String>,

  #[serde(default, alias = "overall", deserialize_with = "lenient::whole")]
  pub overall_place: Option<u32>,

  #[serde(default, alias = "division", alias = "age_group_place", deserialize_with = "lenient::whole")]
  pub division_place: Option<u32>,

  /// Fraction in `0..=1`.
  #[serde(default, deserialize_with = "lenient::number")]
  pub percentile: Option<f64>,

  #[serde(default, alias = "course", deserialize_with = "lenient::whole")]
  pub course_rating: Option<u32>,

  #[serde(default, alias = "effort", deserialize_with = "lenient::whole")]
  pub effort_rating: Option<u32>,

  #[serde(default, alias = "satisfaction", deserialize_with = "lenient::whole")]
  pub satisfaction_rating: Option<u32>,

  #[serde(default, alias = "strava_link", alias = "activity_url", deserialize_with = "lenient::string")]
  pub activity_link: Option<String>,
}

/// ---------------------------------------------------------------------------
/// Distance Classes
/// ---------------------------------------------------------------------------

/// Half-width of each canonical distance band, in miles.
pub const DISTANCE_TOLERANCE_MILES: f64 = 0.1;

/// Canonical race distance. `Other` keeps the raw mileage as its label.
///
/// Variant order is the display order of the personal-records table.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum DistanceClass {
  Marathon,
  HalfMarathon,
  FifteenK,
  TenK,
  FiveK,
  Other(String),
}

impl DistanceClass {
  pub const CANONICAL: [DistanceClass; 5] = [
    DistanceClass::Marathon,
    DistanceClass::HalfMarathon,
    DistanceClass::FifteenK,
    DistanceClass::TenK,
    DistanceClass::FiveK,
  ];

  /// Canonical distance in miles (`None` for `Other`).
  pub fn miles(&self) -> Option<f64> {
    match self {
      DistanceClass::Marathon => Some(26.2),
      DistanceClass::HalfMarathon => Some(13.1),
      DistanceClass::FifteenK => Some(9.3),
      DistanceClass::TenK => Some(6.21371),
      DistanceClass::FiveK => Some(3.1),
      DistanceClass::Other(_) => None,
    }
  }

  /// Nearest canonical class within the tolerance band, else `Other`.
  pub fn from_miles(miles: f64) -> Self {
    // Slack keeps values like 3.2 (3.1 + 0.1 in decimal) inside the band.
    let band = DISTANCE_TOLERANCE_MILES + 1e-9;

    Self::CANONICAL
      .iter()
      .filter_map(|class| {
        let diff = (miles - class.miles()?).abs();
        (diff <= band).then_some((class, diff))
      })
      .min_by(|a, b| a.1.total_cmp(&b.1))
      .map(|(class, _)| class.clone())
      .unwrap_or_else(|| DistanceClass::Other(format_miles(miles)))
  }

  pub fn label(&self) -> String {
    match self {
      DistanceClass::Marathon => "Marathon".to_string(),
      DistanceClass::HalfMarathon => "Half Marathon".to_string(),
      DistanceClass::FifteenK => "15K".to_string(),
      DistanceClass::TenK => "10K".to_string(),
      DistanceClass::FiveK => "5K".to_string(),
      DistanceClass::Other(raw) => raw.clone(),
    }
  }

  /// Parse a label produced by [`DistanceClass::label`].
  pub fn from_label(label: &str) -> Self {
    match label.trim().to_lowercase().as_str() {
      "marathon" => DistanceClass::Marathon,
      "half marathon" | "half" => DistanceClass::HalfMarathon,
      "15k" => DistanceClass::FifteenK,
      "10k" => DistanceClass::TenK,
      "5k" => DistanceClass::FiveK,
      _ => DistanceClass::Other(label.trim().to_string()),
    }
  }
}

impl std::fmt::Display for DistanceClass {
  fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
    write!(f, "{}", self.label())
  }
}

// Serialized as its label so it can key JSON maps.
impl Serialize for DistanceClass {
  fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
  where
    S: Serializer,
  {
    serializer.serialize_str(&self.label())
  }
}

fn format_miles(miles: f64) -> String {
  let rounded = (miles * 100.0).round() / 100.0;
  format!("{} mi", rounded)
}

/// ---------------------------------------------------------------------------
/// Normalized Race
/// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct NormalizedRace {
  pub date: Option<NaiveDate>,
  pub name: Option<String>,
  pub location: Option<String>,
  pub distance_miles: f64,
  pub distance_class: DistanceClass,
  /// Finish time; 0 when the time string could not be parsed.
  pub time_seconds: u32,
  pub overall_place: Option<u32>,
  pub division_place: Option<u32>,
  pub percentile: Option<f64>,
  pub course_rating: Option<u32>,
  pub effort_rating: Option<u32>,
  pub satisfaction_rating: Option<u32>,
  pub activity_link: Option<String>,
}

impl NormalizedRace {
  pub fn has_valid_time(&self) -> bool {
    self.time_seconds > 0
  }
}
