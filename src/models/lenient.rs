//! Lenient field decoders for hand-exported JSON rows.
//!
//! Export columns arrive as numbers, numeric strings, empty strings or null
//! depending on the tool that produced them. Anything unparseable decodes to
//! `None` so a single bad cell never rejects the whole row.

use serde::{Deserialize, Deserializer};
use serde_json::Value;

/// Decode a number given as a JSON number or a numeric string.
pub fn number<'de, D>(deserializer: D) -> Result<Option<f64>, D::Error>
where
  D: Deserializer<'de>,
{
  let value = Option::<Value>::deserialize(deserializer)?;
  Ok(value.as_ref().and_then(value_to_f64))
}

/// Decode a positive whole number (placements, ratings).
pub fn whole<'de, D>(deserializer: D) -> Result<Option<u32>, D::Error>
where
  D: Deserializer<'de>,
{
  let value = Option::<Value>::deserialize(deserializer)?;
  Ok(
    value
      .as_ref()
      .and_then(value_to_f64)
      .filter(|v| *v >= 1.0 && v.fract() == 0.0 && *v <= u32::MAX as f64)
      .map(|v| v as u32),
  )
}

/// Decode a non-empty string; numbers are rendered to text.
pub fn string<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
  D: Deserializer<'de>,
{
  let value = Option::<Value>::deserialize(deserializer)?;
  Ok(match value {
    Some(Value::String(s)) if !s.trim().is_empty() => Some(s),
    Some(Value::Number(n)) => Some(n.to_string()),
    _ => None,
  })
}

pub fn value_to_f64(value: &Value) -> Option<f64> {
  let parsed = match value {
    Value::Number(n) => n.as_f64(),
    Value::String(s) => s.trim().replace(',', "").parse::<f64>().ok(),
    _ => None,
  };
  parsed.filter(|v| v.is_finite())
}

#[cfg(test)]
mod tests {
  use super::*;
  use serde_json::json;

  #[derive(Debug, Deserialize)]
  struct Row {
    #[serde(default, deserialize_with = "number")]
    distance: Option<f64>,
    #[serde(default, deserialize_with = "whole")]
    place: Option<u32>,
    #[serde(default, deserialize_with = "string")]
    name: Option<String>,
  }

  #[test]
  fn test_numbers_accept_strings_and_numbers() {
    let row: Row = serde_json::from_value(json!({"distance": "6.21"})).unwrap();
    assert_eq!(row.distance, Some(6.21));

    let row: Row = serde_json::from_value(json!({"distance": 10})).unwrap();
    assert_eq!(row.distance, Some(10.0));

    let row: Row = serde_json::from_value(json!({"distance": "1,609.34"})).unwrap();
    assert_eq!(row.distance, Some(1609.34));
  }

  #[test]
  fn test_garbage_degrades_to_none() {
    let row: Row = serde_json::from_value(json!({
      "distance": "n/a",
      "place": 0,
      "name": ""
    }))
    .unwrap();
    assert_eq!(row.distance, None);
    assert_eq!(row.place, None);
    assert_eq!(row.name, None);

    let row: Row = serde_json::from_value(json!({"distance": true, "place": 2.5})).unwrap();
    assert_eq!(row.distance, None);
    assert_eq!(row.place, None);
  }

  #[test]
  fn test_missing_and_null_fields() {
    let row: Row = serde_json::from_value(json!({"distance": null})).unwrap();
    assert_eq!(row.distance, None);
    assert_eq!(row.place, None);
    assert_eq!(row.name, None);
  }

  #[test]
  fn test_whole_accepts_numeric_strings() {
    let row: Row = serde_json::from_value(json!({"place": "3", "name": 42})).unwrap();
    assert_eq!(row.place, Some(3));
    assert_eq!(row.name, Some("42".to_string()));
  }
}
