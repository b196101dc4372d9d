//! Calendar configuration.

use std::path::{Path, PathBuf};

use chrono::FixedOffset;
use serde::{Deserialize, Serialize};

use crate::error::{CalendarError, CalendarResult};
use crate::expand::DateZone;
use crate::source::MonthParam;

static DEFAULT_API_URL: &str = "http://localhost:8080";
const DEFAULT_TIMEOUT_SECS: u64 = 10;

/// Environment variable that overrides `api_url`.
pub const API_URL_ENV_VAR: &str = "SCHOOLCAL_API_URL";

/// Configuration at ~/.config/schoolcal/config.toml
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct CalendarConfig {
    /// Base URL of the school API
    pub api_url: String,

    /// Month numbering the API expects in its query string
    pub month_param: MonthParam,

    /// Also send `year=YYYY` with each month request
    pub send_year: bool,

    /// Per-request timeout
    pub timeout_secs: u64,

    /// UTC offset ("+08:00") event timestamps are read in; unset uses the
    /// machine's local zone
    pub utc_offset: Option<String>,
}

impl Default for CalendarConfig {
    fn default() -> Self {
        CalendarConfig {
            api_url: DEFAULT_API_URL.to_string(),
            month_param: MonthParam::default(),
            send_year: false,
            timeout_secs: DEFAULT_TIMEOUT_SECS,
            utc_offset: None,
        }
    }
}

impl CalendarConfig {
    pub fn config_path() -> CalendarResult<PathBuf> {
        let config_dir = dirs::config_dir()
            .ok_or_else(|| CalendarError::Config("Could not determine config directory".into()))?
            .join("schoolcal");

        Ok(config_dir.join("config.toml"))
    }

    /// Load from the default location, falling back to defaults when the
    /// file does not exist, then apply the environment override.
    pub fn load() -> CalendarResult<Self> {
        let path = Self::config_path()?;
        let config = if path.exists() {
            Self::load_from(&path)?
        } else {
            tracing::debug!(path = %path.display(), "no config file, using defaults");
            CalendarConfig::default()
        };

        config.with_api_url(std::env::var(API_URL_ENV_VAR).ok())
    }

    pub fn load_from(path: &Path) -> CalendarResult<Self> {
        let content = std::fs::read_to_string(path)?;
        Self::from_toml_str(&content)
    }

    pub fn from_toml_str(content: &str) -> CalendarResult<Self> {
        let config: CalendarConfig =
            toml::from_str(content).map_err(|e| CalendarError::Config(e.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    /// Replace `api_url` when an override is given.
    pub fn with_api_url(mut self, api_url: Option<String>) -> CalendarResult<Self> {
        if let Some(url) = api_url.filter(|u| !u.trim().is_empty()) {
            self.api_url = url.trim().to_string();
            self.validate()?;
        }
        Ok(self)
    }

    pub fn validate(&self) -> CalendarResult<()> {
        let url = url::Url::parse(&self.api_url)
            .map_err(|e| CalendarError::Config(format!("Invalid api_url '{}': {e}", self.api_url)))?;
        if !matches!(url.scheme(), "http" | "https") {
            return Err(CalendarError::Config(format!(
                "api_url must be http or https, got '{}'",
                url.scheme()
            )));
        }
        if self.timeout_secs == 0 {
            return Err(CalendarError::Config("timeout_secs must be at least 1".into()));
        }
        self.date_zone()?;
        Ok(())
    }

    /// Zone event timestamps are converted into.
    pub fn date_zone(&self) -> CalendarResult<DateZone> {
        let Some(offset) = self.utc_offset.as_deref().map(str::trim).filter(|s| !s.is_empty())
        else {
            return Ok(DateZone::Local);
        };
        offset
            .parse::<FixedOffset>()
            .map(DateZone::Fixed)
            .map_err(|e| CalendarError::Config(format!("Invalid utc_offset '{offset}': {e}")))
    }

    /// Create a default config file with all options commented out.
    pub fn create_default_config(path: &Path) -> CalendarResult<()> {
        let contents = format!(
            "\
# schoolcal configuration

# Base URL of the school API:
# api_url = \"{DEFAULT_API_URL}\"

# How the API numbers months (\"one_based\": January = 1, \"zero_based\": January = 0):
# month_param = \"one_based\"

# Send the year along with the month:
# send_year = false

# Request timeout in seconds:
# timeout_secs = {DEFAULT_TIMEOUT_SECS}

# UTC offset event timestamps are read in (defaults to the local time zone):
# utc_offset = \"+08:00\"
"
        );

        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }

        std::fs::write(path, contents)?;

        Ok(())
    }
}
