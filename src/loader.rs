//! Reads the two dashboard exports from disk.
//!
//! Rows are decoded one at a time so a single malformed entry is logged and
//! skipped rather than failing the whole file.

use std::path::{Path, PathBuf};

use serde::de::DeserializeOwned;
use serde_json::Value;

use crate::models::{NormalizedActivity, NormalizedRace, RawActivity, RawRace};
use crate::normalize::{normalize_activities, normalize_races};

pub const ACTIVITIES_FILE: &str = "activities_mapped.json";
pub const RACES_FILE: &str = "races_normalized.json";

#[derive(Debug, thiserror::Error)]
pub enum LoadError {
  #[error("Failed to read {}: {source}", .path.display())]
  Read {
    path: PathBuf,
    source: std::io::Error,
  },

  #[error("{file} is not a JSON array: {source}")]
  Parse {
    file: &'static str,
    source: serde_json::Error,
  },
}

/// Raw rows exactly as exported. Normalization happens per request.
#[derive(Debug, Clone, Default)]
pub struct Dataset {
  pub activities: Vec<RawActivity>,
  pub races: Vec<RawRace>,
}

impl Dataset {
  pub fn from_json(activities_json: &str, races_json: &str) -> Result<Self, LoadError> {
    Ok(Self {
      activities: parse_rows(ACTIVITIES_FILE, activities_json)?,
      races: parse_rows(RACES_FILE, races_json)?,
    })
  }

  pub fn normalized_activities(&self) -> Vec<NormalizedActivity> {
    normalize_activities(&self.activities)
  }

  pub fn normalized_races(&self) -> Vec<NormalizedRace> {
    normalize_races(&self.races)
  }
}

/// Load both exports from `base_path`. Both files must exist.
pub async fn load_dataset(base_path: &Path) -> Result<Dataset, LoadError> {
  let activities_json = read_file(&base_path.join(ACTIVITIES_FILE)).await?;
  let races_json = read_file(&base_path.join(RACES_FILE)).await?;

  let dataset = Dataset::from_json(&activities_json, &races_json)?;
  tracing::info!(
    activities = dataset.activities.len(),
    races = dataset.races.len(),
    "Loaded dashboard data from {}",
    base_path.display()
  );

  Ok(dataset)
}

async fn read_file(path: &Path) -> Result<String, LoadError> {
  tokio::fs::read_to_string(path)
    .await
    .map_err(|source| LoadError::Read {
      path: path.to_path_buf(),
      source,
    })
}

fn parse_rows<T: DeserializeOwned>(file: &'static str, json: &str) -> Result<Vec<T>, LoadError> {
  let rows: Vec<Value> =
    serde_json::from_str(json).map_err(|source| LoadError::Parse { file, source })?;

  let total = rows.len();
  let parsed: Vec<T> = rows
    .into_iter()
    .enumerate()
    .filter_map(|(index, row)| match serde_json::from_value(row) {
      Ok(parsed) => Some(parsed),
      Err(e) => {
        tracing::warn!(file, index, "Skipping malformed row: {}", e);
        None
      }
    })
    .collect();

  if parsed.len() < total {
    tracing::warn!(file, skipped = total - parsed.len(), "Some rows could not be read");
  }

  Ok(parsed)
}
