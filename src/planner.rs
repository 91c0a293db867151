//! Plan coach: turns a chat request plus recent training into a 7-day plan.
//!
//! Remote coaching is switched off; every plan comes from the templates
//! below, scaled to the athlete's recent weekly mileage.

use chrono::{DateTime, Duration, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

use crate::models::{Intensity, PlanDay, PlanGoal, PlanSource, TrainingPlan, WeekSummary};
use crate::weekly::average_weekly_miles;

pub const DEFAULT_DAYS_PER_WEEK: u8 = 4;
pub const MIN_DAYS_PER_WEEK: u8 = 3;
pub const MAX_DAYS_PER_WEEK: u8 = 6;

/// Floor for the weekly target so a lapsed runner still gets a real week.
const MIN_WEEKLY_MILES: f64 = 10.0;
/// Week-over-week build.
const WEEKLY_INCREASE: f64 = 1.1;
/// Assumed easy pace when there is no recent running to learn from.
const DEFAULT_EASY_PACE_MIN_PER_MILE: f64 = 10.0;
/// Quality days carry a bit more than easy days.
const QUALITY_WEIGHT: f64 = 1.2;

/// ---------------------------------------------------------------------------
/// Request Parsing
/// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PlanRequest {
  pub goal: PlanGoal,
  pub days_per_week: u8,
}

impl Default for PlanRequest {
  fn default() -> Self {
    Self {
      goal: PlanGoal::GeneralFitness,
      days_per_week: DEFAULT_DAYS_PER_WEEK,
    }
  }
}

impl PlanRequest {
  /// Pull a goal and running-days count out of a free-text chat message,
  /// e.g. "Build me a half marathon week, 5 days a week".
  pub fn from_message(message: &str) -> Self {
    let text = message.to_lowercase();

    // "half marathon" contains "marathon", and "15k" contains "5k".
    let goal = if text.contains("half") {
      PlanGoal::HalfMarathon
    } else if text.contains("marathon") {
      PlanGoal::Marathon
    } else if text.contains("15k") {
      PlanGoal::FifteenK
    } else if text.contains("10k") {
      PlanGoal::TenK
    } else if text.contains("5k") {
      PlanGoal::FiveK
    } else {
      PlanGoal::GeneralFitness
    };

    let days_per_week = parse_days(&text)
      .map(|d| d.clamp(MIN_DAYS_PER_WEEK, MAX_DAYS_PER_WEEK))
      .unwrap_or(DEFAULT_DAYS_PER_WEEK);

    Self {
      goal,
      days_per_week,
    }
  }
}

/// Finds "N days", "N-day" or "Ndays".
fn parse_days(text: &str) -> Option<u8> {
  let tokens: Vec<&str> = text
    .split(|c: char| !c.is_ascii_alphanumeric())
    .filter(|t| !t.is_empty())
    .collect();

  for (i, token) in tokens.iter().enumerate() {
    if let Some(number) = token.strip_suffix("days").or_else(|| token.strip_suffix("day")) {
      if let Ok(days) = number.parse::<u8>() {
        return Some(days);
      }
    }
    if let Ok(days) = token.parse::<u8>() {
      if tokens.get(i + 1).is_some_and(|next| next.starts_with("day")) {
        return Some(days);
      }
    }
  }
  None
}

/// ---------------------------------------------------------------------------
/// Templates
/// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Slot {
  Rest,
  Easy,
  Quality,
  Steady,
  Long,
}

/// Week layouts by running days, indexed from the plan's start date.
fn week_template(days_per_week: u8) -> [Slot; 7] {
  use Slot::*;
  match days_per_week {
    0..=3 => [Rest, Quality, Rest, Easy, Rest, Long, Rest],
    4 => [Rest, Quality, Easy, Rest, Easy, Long, Rest],
    5 => [Easy, Quality, Easy, Rest, Easy, Long, Rest],
    _ => [Easy, Quality, Easy, Steady, Easy, Long, Rest],
  }
}

fn long_run_share(goal: PlanGoal) -> f64 {
  match goal {
    PlanGoal::Marathon => 0.35,
    PlanGoal::HalfMarathon => 0.30,
    PlanGoal::FifteenK => 0.28,
    PlanGoal::TenK => 0.25,
    PlanGoal::FiveK => 0.22,
    PlanGoal::GeneralFitness => 0.25,
  }
}

fn quality_workout(goal: PlanGoal) -> (&'static str, Intensity, &'static str) {
  match goal {
    PlanGoal::Marathon => (
      "Marathon-pace run",
      Intensity::Moderate,
      "Middle miles at goal marathon pace",
    ),
    PlanGoal::HalfMarathon => ("Tempo run", Intensity::Moderate, "20-30 min comfortably hard"),
    PlanGoal::FifteenK | PlanGoal::TenK => (
      "Threshold intervals",
      Intensity::Hard,
      "4 x 1 mile at 10K effort, 2 min jog between",
    ),
    PlanGoal::FiveK => (
      "Track intervals",
      Intensity::Hard,
      "6 x 800m at 5K effort, 400m jog between",
    ),
    PlanGoal::GeneralFitness => ("Fartlek", Intensity::Moderate, "8 x 1 min surges, easy between"),
  }
}

fn long_run_note(goal: PlanGoal) -> &'static str {
  match goal {
    PlanGoal::Marathon => "Easy effort; practice race-day fueling",
    PlanGoal::HalfMarathon => "Easy effort, last 2 miles steady",
    PlanGoal::GeneralFitness => "Relaxed and conversational",
    _ => "Easy effort throughout",
  }
}

/// ---------------------------------------------------------------------------
/// Plan Generation
/// ---------------------------------------------------------------------------

/// Build the week starting at `start` from the recent weekly window.
pub fn generate_plan(
  request: &PlanRequest,
  recent_weeks: &[WeekSummary],
  start: NaiveDate,
  now: DateTime<Utc>,
) -> TrainingPlan {
  tracing::info!(goal = %request.goal, "Remote coach disabled, building template plan");

  let baseline = average_weekly_miles(recent_weeks);
  let target = round_half((baseline * WEEKLY_INCREASE).max(MIN_WEEKLY_MILES));
  let easy_pace = recent_pace(recent_weeks).unwrap_or(DEFAULT_EASY_PACE_MIN_PER_MILE);

  let template = week_template(request.days_per_week);
  let long_miles = round_half(target * long_run_share(request.goal));

  let weight_of = |slot: Slot| match slot {
    Slot::Quality | Slot::Steady => QUALITY_WEIGHT,
    Slot::Easy => 1.0,
    Slot::Rest | Slot::Long => 0.0,
  };
  let total_weight: f64 = template.iter().map(|s| weight_of(*s)).sum();
  let remaining = (target - long_miles).max(0.0);

  let (quality_name, quality_intensity, quality_note) = quality_workout(request.goal);

  let days = template
    .iter()
    .enumerate()
    .map(|(offset, slot)| {
      let date = start + Duration::days(offset as i64);
      let miles = match slot {
        Slot::Rest => None,
        Slot::Long => Some(long_miles),
        _ if total_weight > 0.0 => Some(round_half(remaining * weight_of(*slot) / total_weight)),
        _ => None,
      };

      let (workout_type, intensity, notes, pace) = match slot {
        Slot::Rest => ("Rest", Intensity::Rest, "Optional mobility or cross-training", easy_pace),
        Slot::Easy => ("Easy run", Intensity::Easy, "Conversational pace", easy_pace),
        Slot::Quality => (quality_name, quality_intensity, quality_note, easy_pace * 0.9),
        Slot::Steady => ("Steady run", Intensity::Moderate, "Controlled, just below tempo", easy_pace * 0.95),
        Slot::Long => ("Long run", Intensity::Long, long_run_note(request.goal), easy_pace * 1.05),
      };

      PlanDay {
        date,
        weekday: date.format("%A").to_string(),
        workout_type: workout_type.to_string(),
        distance_miles: miles,
        duration_minutes: miles.map(|m| (m * pace).round() as u32),
        intensity,
        notes: notes.to_string(),
      }
    })
    .collect::<Vec<_>>();

  let run_days = days.iter().filter(|d| !d.is_rest()).count();

  TrainingPlan {
    goal: request.goal,
    source: PlanSource::Template,
    created_at: now,
    start_date: start,
    baseline_weekly_miles: baseline,
    target_weekly_miles: target,
    summary: format!(
      "{} week: {:.1} miles over {} runs (recent average {:.1} mi/week).",
      request.goal, target, run_days, baseline
    ),
    coaching_notes: coaching_notes(request, baseline, target),
    days,
  }
}

fn coaching_notes(request: &PlanRequest, baseline: f64, target: f64) -> Vec<String> {
  let mut notes = Vec::new();

  if baseline <= 0.0 {
    notes.push("No running in the last few weeks; starting from a conservative base.".to_string());
  } else if target > baseline * WEEKLY_INCREASE + 0.5 {
    notes.push(format!(
      "Target is above your usual build because recent volume ({:.1} mi) is light.",
      baseline
    ));
  } else {
    notes.push("Volume builds about 10% on your recent average.".to_string());
  }

  if matches!(request.goal, PlanGoal::Marathon | PlanGoal::HalfMarathon) {
    notes.push("Keep the long run easy; the quality day carries the race-specific work.".to_string());
  }
  notes.push("Skip or shorten any run if you feel pain rather than fatigue.".to_string());

  notes
}

/// Pace across the window, in minutes per mile.
fn recent_pace(weeks: &[WeekSummary]) -> Option<f64> {
  let miles: f64 = weeks.iter().map(|w| w.total_miles).sum();
  let hours: f64 = weeks.iter().map(|w| w.total_hours).sum();
  crate::bucketing::pace_min_per_mile(hours, miles)
}

fn round_half(miles: f64) -> f64 {
  (miles * 2.0).round() / 2.0
}
