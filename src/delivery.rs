//! Outbound delivery of a training plan: EmailJS for email, Google Calendar
//! for all-day events.

use std::time::Duration as StdDuration;

use chrono::Duration;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use url::Url;

use crate::config::{CalendarConfig, EmailConfig};
use crate::models::{PlanDay, TrainingPlan};

const REQUEST_TIMEOUT: StdDuration = StdDuration::from_secs(15);

#[derive(Debug, thiserror::Error)]
pub enum DeliveryError {
  #[error("{0} delivery is not configured")]
  NotConfigured(&'static str),

  #[error("Invalid endpoint: {0}")]
  InvalidUrl(String),

  #[error("HTTP request failed: {0}")]
  Request(#[from] reqwest::Error),

  #[error("Not authenticated - calendar token missing or expired")]
  NotAuthenticated,

  #[error("API error ({status}): {body}")]
  Api { status: u16, body: String },
}

/// `base` joined with `segments`, each percent-encoded as one path segment.
fn endpoint(base: &str, segments: &[&str]) -> Result<Url, DeliveryError> {
  let mut url = Url::parse(base).map_err(|e| DeliveryError::InvalidUrl(format!("{}: {}", base, e)))?;
  url
    .path_segments_mut()
    .map_err(|_| DeliveryError::InvalidUrl(base.to_string()))?
    .pop_if_empty()
    .extend(segments);
  Ok(url)
}

fn http_client() -> Result<Client, DeliveryError> {
  Ok(Client::builder().timeout(REQUEST_TIMEOUT).build()?)
}

async fn api_error(response: reqwest::Response) -> DeliveryError {
  let status = response.status().as_u16();
  let body = response.text().await.unwrap_or_default();
  DeliveryError::Api { status, body }
}

/// ---------------------------------------------------------------------------
/// Email
/// ---------------------------------------------------------------------------

#[derive(Debug, Serialize)]
struct EmailRequest<'a> {
  service_id: &'a str,
  template_id: &'a str,
  user_id: &'a str,
  template_params: TemplateParams<'a>,
}

#[derive(Debug, Serialize)]
struct TemplateParams<'a> {
  to_email: &'a str,
  subject: String,
  message: String,
}

pub struct EmailClient {
  config: EmailConfig,
  http: Client,
}

impl EmailClient {
  pub fn new(config: EmailConfig) -> Result<Self, DeliveryError> {
    Ok(Self {
      config,
      http: http_client()?,
    })
  }

  pub async fn send_plan(&self, to_email: &str, plan: &TrainingPlan) -> Result<(), DeliveryError> {
    let url = endpoint(&self.config.api_base, &["api", "v1.0", "email", "send"])?;

    let request = EmailRequest {
      service_id: &self.config.service_id,
      template_id: &self.config.template_id,
      user_id: &self.config.public_key,
      template_params: TemplateParams {
        to_email,
        subject: format!("Your {} training week", plan.goal),
        message: plan.to_text(),
      },
    };

    let response = self.http.post(url).json(&request).send().await?;
    if !response.status().is_success() {
      return Err(api_error(response).await);
    }

    tracing::info!(goal = %plan.goal, "Emailed training plan");
    Ok(())
  }
}

/// ---------------------------------------------------------------------------
/// Calendar
/// ---------------------------------------------------------------------------

#[derive(Debug, Serialize)]
struct EventDate {
  date: String,
}

#[derive(Debug, Serialize)]
struct CalendarEvent {
  summary: String,
  description: String,
  start: EventDate,
  end: EventDate,
}

#[derive(Debug, Deserialize)]
struct CreatedEvent {
  id: String,
}

impl CalendarEvent {
  /// All-day event; Google treats `end` as exclusive.
  fn for_day(day: &PlanDay) -> Self {
    let summary = match day.distance_miles {
      Some(miles) => format!("{} - {:.1} mi", day.workout_type, miles),
      None => day.workout_type.clone(),
    };

    let mut description = format!("Intensity: {}", day.intensity.as_str());
    if let Some(minutes) = day.duration_minutes {
      description.push_str(&format!("\nDuration: {} min", minutes));
    }
    if !day.notes.is_empty() {
      description.push_str(&format!("\n{}", day.notes));
    }

    Self {
      summary,
      description,
      start: EventDate {
        date: day.date.format("%Y-%m-%d").to_string(),
      },
      end: EventDate {
        date: (day.date + Duration::days(1)).format("%Y-%m-%d").to_string(),
      },
    }
  }
}

pub struct CalendarClient {
  config: CalendarConfig,
  http: Client,
}

impl CalendarClient {
  pub fn new(config: CalendarConfig) -> Result<Self, DeliveryError> {
    if config.access_token.is_empty() {
      return Err(DeliveryError::NotAuthenticated);
    }
    Ok(Self {
      config,
      http: http_client()?,
    })
  }

  /// One event per running day, in plan order. Returns the created event ids.
  pub async fn push_plan(&self, plan: &TrainingPlan) -> Result<Vec<String>, DeliveryError> {
    let url = endpoint(
      &self.config.api_base,
      &["calendar", "v3", "calendars", &self.config.calendar_id, "events"],
    )?;

    let mut event_ids = Vec::new();
    for day in plan.days.iter().filter(|d| !d.is_rest()) {
      let response = self
        .http
        .post(url.clone())
        .bearer_auth(&self.config.access_token)
        .json(&CalendarEvent::for_day(day))
        .send()
        .await?;

      if response.status() == reqwest::StatusCode::UNAUTHORIZED {
        return Err(DeliveryError::NotAuthenticated);
      }
      if !response.status().is_success() {
        return Err(api_error(response).await);
      }

      let created: CreatedEvent = response.json().await?;
      tracing::debug!(date = %day.date, event_id = %created.id, "Created calendar event");
      event_ids.push(created.id);
    }

    tracing::info!(events = event_ids.len(), "Pushed plan to calendar");
    Ok(event_ids)
  }
}
