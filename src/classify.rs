//! Activity classification: is it a run, and was it on trail or road?
//!
//! There is no ground-truth surface data in the export, so terrain is a
//! heuristic over climbing per mile and the share of dirt-surface distance.

use serde::Serialize;

/// Climb above this many feet per mile marks a run as trail.
pub const TRAIL_ELEVATION_FT_PER_MILE: f64 = 50.0;

/// Dirt surface above this percentage of distance marks a run as trail.
pub const TRAIL_DIRT_PCT: f64 = 50.0;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Terrain {
  Trail,
  Road,
}

/// Case-insensitive: contains "run" and neither "walk" nor "hike".
pub fn is_running_activity(type_label: &str) -> bool {
  let label = type_label.to_lowercase();
  label.contains("run") && !label.contains("walk") && !label.contains("hike")
}

/// Trail if either threshold is exceeded. Zero-distance activities are road.
pub fn classify_terrain(distance_miles: f64, elevation_gain_feet: f64, dirt_distance_miles: f64) -> Terrain {
  let (elevation_per_mile, dirt_pct) = if distance_miles > 0.0 {
    (
      elevation_gain_feet / distance_miles,
      dirt_distance_miles / distance_miles * 100.0,
    )
  } else {
    (0.0, 0.0)
  };

  if elevation_per_mile > TRAIL_ELEVATION_FT_PER_MILE || dirt_pct > TRAIL_DIRT_PCT {
    Terrain::Trail
  } else {
    Terrain::Road
  }
}
