pub mod dashboard;
pub mod plans;
pub mod races;

use crate::stats;
use crate::AppState;

/// Years selectable in the season view, newest first.
pub fn get_available_years(state: &AppState) -> Result<Vec<i32>, String> {
  Ok(stats::available_years(&state.dataset.normalized_activities()))
}

#[cfg(test)]
mod tests {
  use super::*;
  use crate::test_utils::{mock_app_state, teardown_test_db};

  #[tokio::test]
  async fn test_available_years_skip_old_and_non_runs() {
    let state = mock_app_state().await;
    // Runs in 2023 and 2024; the 2015 run is out of range
    assert_eq!(get_available_years(&state).unwrap(), vec![2024, 2023]);
    teardown_test_db(state.db).await;
  }
}
