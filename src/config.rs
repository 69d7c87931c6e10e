use std::path::Path;

use chrono::{FixedOffset, NaiveDate};
use regex::Regex;
use serde::Deserialize;
use url::Url;

use crate::error::ConfigError;
use crate::models::{
    DEFAULT_ATTACHMENT_PATTERN, DEFAULT_CALENDAR_BASE_URL, DEFAULT_EVENT_TITLE,
    DEFAULT_GMAIL_BASE_URL, DEFAULT_SUBJECT, DEFAULT_UTC_OFFSET_MINUTES,
};
use crate::search::{SearchCriteria, SearchWindow};

pub const DEFAULT_CONFIG_PATH: &str = "shift-sync.toml";
pub const ACCESS_TOKEN_ENV: &str = "SHIFT_SYNC_ACCESS_TOKEN";
pub const DEBUG_ENV: &str = "SHIFT_SYNC_DEBUG";

const MAX_OFFSET_MINUTES: u32 = 24 * 60;

/// The fixed offset `minutes` east of UTC, if it is within +/-24h.
#[must_use]
pub fn offset_from_minutes(minutes: i32) -> Option<FixedOffset> {
    minutes.checked_mul(60).and_then(FixedOffset::east_opt)
}

#[derive(Debug, Clone, Deserialize, PartialEq, Eq)]
#[serde(deny_unknown_fields)]
pub struct Config {
    #[serde(default)]
    pub debug: bool,
    /// "First Last", as the person is named in the schedule.
    pub employee_name: String,
    #[serde(default)]
    pub access_token: Option<String>,
    pub mail: MailConfig,
    #[serde(default)]
    pub calendar: CalendarConfig,
}

#[derive(Debug, Clone, Deserialize, PartialEq, Eq)]
#[serde(deny_unknown_fields)]
pub struct MailConfig {
    pub sender: String,
    #[serde(default = "default_subject")]
    pub subject: String,
    #[serde(default = "default_attachment_pattern")]
    pub attachment_pattern: String,
    #[serde(default = "default_lookback_days")]
    pub lookback_days: u32,
    #[serde(default = "default_gmail_base_url")]
    pub base_url: String,
}

#[derive(Debug, Clone, Deserialize, PartialEq, Eq)]
#[serde(default, deny_unknown_fields)]
pub struct CalendarConfig {
    pub calendar_id: String,
    pub title: String,
    pub location: String,
    pub utc_offset_minutes: i32,
    pub base_url: String,
}

impl Default for CalendarConfig {
    fn default() -> Self {
        Self {
            calendar_id: "primary".to_string(),
            title: DEFAULT_EVENT_TITLE.to_string(),
            location: String::new(),
            utc_offset_minutes: DEFAULT_UTC_OFFSET_MINUTES,
            base_url: DEFAULT_CALENDAR_BASE_URL.to_string(),
        }
    }
}

fn default_subject() -> String {
    DEFAULT_SUBJECT.to_string()
}

fn default_attachment_pattern() -> String {
    DEFAULT_ATTACHMENT_PATTERN.to_string()
}

fn default_lookback_days() -> u32 {
    1
}

fn default_gmail_base_url() -> String {
    DEFAULT_GMAIL_BASE_URL.to_string()
}

fn parse_flag(field: &'static str, value: &str) -> Result<bool, ConfigError> {
    match value.trim().to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Ok(true),
        "" | "0" | "false" | "no" | "off" => Ok(false),
        other => Err(ConfigError::Invalid {
            field,
            message: format!("expected a boolean, got {other:?}"),
        }),
    }
}

fn check_url(field: &'static str, value: &str) -> Result<(), ConfigError> {
    let url = Url::parse(value).map_err(|error| ConfigError::Invalid {
        field,
        message: format!("{value}: {error}"),
    })?;
    if !matches!(url.scheme(), "http" | "https") {
        return Err(ConfigError::Invalid {
            field,
            message: format!("{value}: expected an http(s) url"),
        });
    }
    Ok(())
}

impl Config {
    /// Parses and validates a TOML document.
    ///
    /// # Errors
    ///
    /// [`ConfigError::Parse`] for malformed TOML or missing required keys,
    /// [`ConfigError::Invalid`] for values that fail validation.
    pub fn from_toml_str(text: &str) -> Result<Self, ConfigError> {
        let config: Self = toml::from_str(text)?;
        config.validate()?;
        Ok(config)
    }

    /// Reads `path`, then applies the process environment overrides.
    ///
    /// # Errors
    ///
    /// [`ConfigError::Read`] if the file cannot be read, otherwise as
    /// [`Config::from_toml_str`] and [`Config::apply_env`].
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let text = std::fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.display().to_string(),
            source,
        })?;
        let mut config = Self::from_toml_str(&text)?;
        config.apply_env(|name| std::env::var(name).ok())?;
        Ok(config)
    }

    /// Applies `SHIFT_SYNC_ACCESS_TOKEN` and `SHIFT_SYNC_DEBUG` as returned by
    /// `lookup`.
    ///
    /// # Errors
    ///
    /// [`ConfigError::Invalid`] for a debug value that is not a boolean.
    pub fn apply_env<F>(&mut self, lookup: F) -> Result<(), ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(token) = lookup(ACCESS_TOKEN_ENV).filter(|token| !token.trim().is_empty()) {
            self.access_token = Some(token.trim().to_string());
        }
        if let Some(value) = lookup(DEBUG_ENV) {
            self.debug = parse_flag("debug", &value)?;
        }
        Ok(())
    }

    /// # Errors
    ///
    /// [`ConfigError::Invalid`] naming the first offending field.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.employee_name.trim().is_empty() {
            return Err(ConfigError::Invalid {
                field: "employee_name",
                message: "must not be empty".to_string(),
            });
        }
        if self.mail.sender.trim().is_empty() {
            return Err(ConfigError::Invalid {
                field: "mail.sender",
                message: "must not be empty".to_string(),
            });
        }
        Regex::new(&self.mail.attachment_pattern).map_err(|error| ConfigError::Invalid {
            field: "mail.attachment_pattern",
            message: error.to_string(),
        })?;
        check_url("mail.base_url", &self.mail.base_url)?;
        check_url("calendar.base_url", &self.calendar.base_url)?;
        if self.calendar.utc_offset_minutes.unsigned_abs() >= MAX_OFFSET_MINUTES {
            return Err(ConfigError::Invalid {
                field: "calendar.utc_offset_minutes",
                message: format!(
                    "{} is outside +/-{MAX_OFFSET_MINUTES}",
                    self.calendar.utc_offset_minutes
                ),
            });
        }
        Ok(())
    }

    /// # Errors
    ///
    /// [`ConfigError::Invalid`] when no token is configured.
    pub fn access_token(&self) -> Result<&str, ConfigError> {
        self.access_token
            .as_deref()
            .filter(|token| !token.is_empty())
            .ok_or_else(|| ConfigError::Invalid {
                field: "access_token",
                message: format!("set {ACCESS_TOKEN_ENV} or access_token in the config file"),
            })
    }

    /// # Errors
    ///
    /// [`ConfigError::Invalid`] for an offset outside +/-24h.
    pub fn utc_offset(&self) -> Result<FixedOffset, ConfigError> {
        offset_from_minutes(self.calendar.utc_offset_minutes).ok_or_else(|| {
            ConfigError::Invalid {
                field: "calendar.utc_offset_minutes",
                message: format!("{} is not a valid offset", self.calendar.utc_offset_minutes),
            }
        })
    }

    /// Search for schedules sent within `lookback_days` of `today`.
    ///
    /// # Errors
    ///
    /// [`ConfigError::Invalid`] for an attachment pattern that does not
    /// compile.
    pub fn search_criteria(&self, today: NaiveDate) -> Result<SearchCriteria, ConfigError> {
        self.search_criteria_in(SearchWindow::lookback(today, self.mail.lookback_days))
    }

    /// # Errors
    ///
    /// See [`Config::search_criteria`].
    pub fn search_criteria_in(&self, window: SearchWindow) -> Result<SearchCriteria, ConfigError> {
        let pattern =
            Regex::new(&self.mail.attachment_pattern).map_err(|error| ConfigError::Invalid {
                field: "mail.attachment_pattern",
                message: error.to_string(),
            })?;
        Ok(SearchCriteria::new(
            self.mail.sender.clone(),
            self.mail.subject.clone(),
            window,
            pattern,
        ))
    }
}
