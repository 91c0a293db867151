//! Application configuration loaded from environment variables.
//!
//! `.env` is loaded by the binary before this runs. Email and calendar
//! delivery are optional: leave all of a channel's variables unset to
//! disable it, set all of them to enable it.

use std::env;
use std::path::PathBuf;

use url::Url;

pub const DEFAULT_DATA_PATH: &str = "data";
pub const DEFAULT_PLAN_DB: &str = "plan-history.db";
pub const DEFAULT_EMAILJS_API_BASE: &str = "https://api.emailjs.com";
pub const DEFAULT_GOOGLE_API_BASE: &str = "https://www.googleapis.com";
pub const DEFAULT_CALENDAR_ID: &str = "primary";

#[derive(Debug, thiserror::Error, PartialEq)]
pub enum ConfigError {
  #[error("Missing configuration: {0}")]
  Missing(&'static str),

  #[error("Invalid URL in {var}: {value}")]
  InvalidUrl { var: &'static str, value: String },
}

#[derive(Debug, Clone, PartialEq)]
pub struct EmailConfig {
  pub service_id: String,
  pub template_id: String,
  pub public_key: String,
  pub api_base: String,
}

impl EmailConfig {
  /// `Ok(None)` when no EmailJS variable is set.
  pub fn from_env() -> Result<Option<Self>, ConfigError> {
    let service_id = env::var("EMAILJS_SERVICE_ID").ok();
    let template_id = env::var("EMAILJS_TEMPLATE_ID").ok();
    let public_key = env::var("EMAILJS_PUBLIC_KEY").ok();

    if service_id.is_none() && template_id.is_none() && public_key.is_none() {
      return Ok(None);
    }

    Ok(Some(Self {
      service_id: service_id.ok_or(ConfigError::Missing("EMAILJS_SERVICE_ID"))?,
      template_id: template_id.ok_or(ConfigError::Missing("EMAILJS_TEMPLATE_ID"))?,
      public_key: public_key.ok_or(ConfigError::Missing("EMAILJS_PUBLIC_KEY"))?,
      api_base: url_var("EMAILJS_API_BASE", DEFAULT_EMAILJS_API_BASE)?,
    }))
  }
}

#[derive(Debug, Clone, PartialEq)]
pub struct CalendarConfig {
  /// OAuth access token obtained by the front end.
  pub access_token: String,
  pub calendar_id: String,
  pub api_base: String,
}

impl CalendarConfig {
  /// `Ok(None)` when no calendar token is set.
  pub fn from_env() -> Result<Option<Self>, ConfigError> {
    let Ok(access_token) = env::var("GOOGLE_CALENDAR_TOKEN") else {
      return Ok(None);
    };

    Ok(Some(Self {
      access_token: access_token.trim().to_string(),
      calendar_id: env::var("GOOGLE_CALENDAR_ID").unwrap_or_else(|_| DEFAULT_CALENDAR_ID.to_string()),
      api_base: url_var("GOOGLE_API_BASE", DEFAULT_GOOGLE_API_BASE)?,
    }))
  }
}

#[derive(Debug, Clone, PartialEq)]
pub struct AppConfig {
  /// Directory holding `activities_mapped.json` and `races_normalized.json`.
  pub data_path: PathBuf,
  pub plan_db_path: PathBuf,
  pub email: Option<EmailConfig>,
  pub calendar: Option<CalendarConfig>,
}

impl Default for AppConfig {
  /// Local defaults with delivery disabled.
  fn default() -> Self {
    Self {
      data_path: PathBuf::from(DEFAULT_DATA_PATH),
      plan_db_path: PathBuf::from(DEFAULT_PLAN_DB),
      email: None,
      calendar: None,
    }
  }
}

impl AppConfig {
  pub fn from_env() -> Result<Self, ConfigError> {
    let config = Self {
      data_path: env::var("DASHBOARD_DATA_PATH")
        .map(PathBuf::from)
        .unwrap_or_else(|_| PathBuf::from(DEFAULT_DATA_PATH)),
      plan_db_path: env::var("PLAN_HISTORY_DB")
        .map(PathBuf::from)
        .unwrap_or_else(|_| PathBuf::from(DEFAULT_PLAN_DB)),
      email: EmailConfig::from_env()?,
      calendar: CalendarConfig::from_env()?,
    };

    tracing::info!(
      data_path = %config.data_path.display(),
      email = config.email.is_some(),
      calendar = config.calendar.is_some(),
      "Configuration loaded"
    );

    Ok(config)
  }
}

fn url_var(var: &'static str, default: &str) -> Result<String, ConfigError> {
  let value = env::var(var).unwrap_or_else(|_| default.to_string());
  match Url::parse(&value) {
    Ok(url) if !url.cannot_be_a_base() => Ok(value.trim_end_matches('/').to_string()),
    _ => Err(ConfigError::InvalidUrl { var, value }),
  }
}

#[cfg(test)]
mod tests {
  use super::*;
  use serial_test::serial;

  const ALL_VARS: [&str; 9] = [
    "DASHBOARD_DATA_PATH",
    "PLAN_HISTORY_DB",
    "EMAILJS_SERVICE_ID",
    "EMAILJS_TEMPLATE_ID",
    "EMAILJS_PUBLIC_KEY",
    "EMAILJS_API_BASE",
    "GOOGLE_CALENDAR_TOKEN",
    "GOOGLE_CALENDAR_ID",
    "GOOGLE_API_BASE",
  ];

  fn cleared() -> Vec<(&'static str, Option<&'static str>)> {
    ALL_VARS.iter().map(|v| (*v, None)).collect()
  }

  fn with(overrides: &[(&'static str, &'static str)]) -> Vec<(&'static str, Option<&'static str>)> {
    let mut vars = cleared();
    for (key, value) in overrides {
      if let Some(slot) = vars.iter_mut().find(|(k, _)| k == key) {
        slot.1 = Some(*value);
      }
    }
    vars
  }

  #[test]
  #[serial]
  fn test_defaults_when_unset() {
    temp_env::with_vars(cleared(), || {
      let config = AppConfig::from_env().expect("Config should load");
      assert_eq!(config, AppConfig::default());
    });
  }

  #[test]
  #[serial]
  fn test_paths_from_env() {
    temp_env::with_vars(
      with(&[("DASHBOARD_DATA_PATH", "/srv/running"), ("PLAN_HISTORY_DB", "/tmp/plans.db")]),
      || {
        let config = AppConfig::from_env().expect("Config should load");
        assert_eq!(config.data_path, PathBuf::from("/srv/running"));
        assert_eq!(config.plan_db_path, PathBuf::from("/tmp/plans.db"));
      },
    );
  }

  #[test]
  #[serial]
  fn test_full_email_config() {
    temp_env::with_vars(
      with(&[
        ("EMAILJS_SERVICE_ID", "service_x"),
        ("EMAILJS_TEMPLATE_ID", "template_y"),
        ("EMAILJS_PUBLIC_KEY", "pk_z"),
      ]),
      || {
        let email = AppConfig::from_env().unwrap().email.expect("email enabled");
        assert_eq!(email.service_id, "service_x");
        assert_eq!(email.api_base, DEFAULT_EMAILJS_API_BASE);
      },
    );
  }

  #[test]
  #[serial]
  fn test_partial_email_config_is_an_error() {
    temp_env::with_vars(with(&[("EMAILJS_SERVICE_ID", "service_x")]), || {
      assert_eq!(
        AppConfig::from_env(),
        Err(ConfigError::Missing("EMAILJS_TEMPLATE_ID"))
      );
    });
  }

  #[test]
  #[serial]
  fn test_calendar_config() {
    temp_env::with_vars(
      with(&[
        ("GOOGLE_CALENDAR_TOKEN", " ya29.token \n"),
        ("GOOGLE_API_BASE", "http://localhost:9000/"),
      ]),
      || {
        let calendar = AppConfig::from_env().unwrap().calendar.expect("calendar enabled");
        assert_eq!(calendar.access_token, "ya29.token");
        assert_eq!(calendar.calendar_id, DEFAULT_CALENDAR_ID);
        assert_eq!(calendar.api_base, "http://localhost:9000");
      },
    );
  }

  #[test]
  #[serial]
  fn test_invalid_api_base() {
    temp_env::with_vars(
      with(&[("GOOGLE_CALENDAR_TOKEN", "tok"), ("GOOGLE_API_BASE", "not a url")]),
      || {
        assert!(matches!(
          AppConfig::from_env(),
          Err(ConfigError::InvalidUrl { var: "GOOGLE_API_BASE", .. })
        ));
      },
    );
  }
}
