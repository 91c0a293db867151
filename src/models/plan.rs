use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

/// What the athlete is training for.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PlanGoal {
  Marathon,
  HalfMarathon,
  FifteenK,
  TenK,
  FiveK,
  GeneralFitness,
}

impl PlanGoal {
  pub fn label(&self) -> &'static str {
    match self {
      PlanGoal::Marathon => "Marathon",
      PlanGoal::HalfMarathon => "Half Marathon",
      PlanGoal::FifteenK => "15K",
      PlanGoal::TenK => "10K",
      PlanGoal::FiveK => "5K",
      PlanGoal::GeneralFitness => "General Fitness",
    }
  }
}

impl std::fmt::Display for PlanGoal {
  fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
    write!(f, "{}", self.label())
  }
}

impl std::str::FromStr for PlanGoal {
  type Err = String;
  fn from_str(s: &str) -> Result<Self, Self::Err> {
    match s {
      "Marathon" => Ok(Self::Marathon),
      "Half Marathon" => Ok(Self::HalfMarathon),
      "15K" => Ok(Self::FifteenK),
      "10K" => Ok(Self::TenK),
      "5K" => Ok(Self::FiveK),
      "General Fitness" => Ok(Self::GeneralFitness),
      _ => Err(format!("Unknown plan goal: {}", s)),
    }
  }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Intensity {
  Rest,
  Easy,
  Moderate,
  Hard,
  Long,
}

impl Intensity {
  pub fn as_str(&self) -> &'static str {
    match self {
      Intensity::Rest => "rest",
      Intensity::Easy => "easy",
      Intensity::Moderate => "moderate",
      Intensity::Hard => "hard",
      Intensity::Long => "long",
    }
  }
}

/// Where a plan came from. Remote coaching is disabled, so every plan is
/// currently a template.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PlanSource {
  Template,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PlanDay {
  pub date: NaiveDate,
  pub weekday: String,
  pub workout_type: String,
  #[serde(skip_serializing_if = "Option::is_none")]
  pub distance_miles: Option<f64>,
  #[serde(skip_serializing_if = "Option::is_none")]
  pub duration_minutes: Option<u32>,
  pub intensity: Intensity,
  pub notes: String,
}

impl PlanDay {
  pub fn is_rest(&self) -> bool {
    self.intensity == Intensity::Rest
  }
}

/// A 7-day schedule plus narrative, handed to email/calendar delivery.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TrainingPlan {
  pub goal: PlanGoal,
  pub source: PlanSource,
  pub created_at: DateTime<Utc>,
  pub start_date: NaiveDate,
  pub baseline_weekly_miles: f64,
  pub target_weekly_miles: f64,
  pub days: Vec<PlanDay>,
  pub summary: String,
  pub coaching_notes: Vec<String>,
}

impl TrainingPlan {
  pub fn planned_miles(&self) -> f64 {
    self.days.iter().filter_map(|d| d.distance_miles).sum()
  }

  /// Plain-text rendering used as the email body and calendar descriptions.
  pub fn to_text(&self) -> String {
    let mut out = format!(
      "{} plan starting {}\n{}\n\n",
      self.goal,
      self.start_date.format("%b %-d, %Y"),
      self.summary
    );

    for day in &self.days {
      let mut line = format!("{} {}: {}", day.weekday, day.date.format("%m/%d"), day.workout_type);
      if let Some(miles) = day.distance_miles {
        line.push_str(&format!(" - {:.1} mi", miles));
      }
      if let Some(minutes) = day.duration_minutes {
        line.push_str(&format!(" ({} min)", minutes));
      }
      line.push_str(&format!(" [{}]", day.intensity.as_str()));
      if !day.notes.is_empty() {
        line.push_str(&format!(" - {}", day.notes));
      }
      out.push_str(&line);
      out.push('\n');
    }

    if !self.coaching_notes.is_empty() {
      out.push_str("\nNotes:\n");
      for note in &self.coaching_notes {
        out.push_str(&format!("- {}\n", note));
      }
    }

    out
  }
}

/// A plan snapshot read back from the local history.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SavedPlan {
  pub id: i64,
  pub created_at: DateTime<Utc>,
  pub goal: PlanGoal,
  pub plan: TrainingPlan,
}
