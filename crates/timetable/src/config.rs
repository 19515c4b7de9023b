/// Configuration for the remote API, the week layout and PDF imports
use crate::error::TimetableError;
use crate::schedule::DaySet;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;
use std::time::Duration;
use url::Url;

/// Base URL of the hosted schedule service.
const DEFAULT_BASE_URL: &str = "https://api.remindme.globaltfn.tech/api/";

/// Top-level configuration
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TimetableConfig {
    pub api: ApiConfig,
    /// Weekdays every timetable covers
    pub days: DaySet,
    pub upload: UploadConfig,
}

/// Remote API connection settings
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ApiConfig {
    /// Root under which `schedule/`, `holiday/` and `extract-pdf` live
    pub base_url: Url,
    pub connect_timeout_secs: u64,
    /// Applies to plain requests; the PDF extraction stream has no timeout
    pub request_timeout_secs: u64,
    pub user_agent: String,
    /// How long an instructor roster stays cached
    pub roster_cache_ttl_secs: u64,
}

impl ApiConfig {
    /// Config pointing at `base_url` with default timeouts.
    pub fn with_base_url(base_url: &str) -> Result<Self, TimetableError> {
        Ok(Self {
            base_url: Url::parse(base_url)?,
            ..Self::default()
        })
    }

    pub fn connect_timeout(&self) -> Duration {
        Duration::from_secs(self.connect_timeout_secs)
    }

    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_secs)
    }

    pub fn roster_cache_ttl(&self) -> Duration {
        Duration::from_secs(self.roster_cache_ttl_secs)
    }
}

impl Default for ApiConfig {
    fn default() -> Self {
        Self {
            base_url: Url::parse(DEFAULT_BASE_URL).expect("DEFAULT_BASE_URL is a valid URL"),
            connect_timeout_secs: 10,
            request_timeout_secs: 30,
            user_agent: format!("timetable/{}", env!("CARGO_PKG_VERSION")),
            roster_cache_ttl_secs: 5 * 60,
        }
    }
}

/// PDF import settings
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct UploadConfig {
    /// Pause on a finished upload before the state returns to idle
    pub settle_delay_ms: u64,
}

impl UploadConfig {
    pub fn settle_delay(&self) -> Duration {
        Duration::from_millis(self.settle_delay_ms)
    }
}

impl Default for UploadConfig {
    fn default() -> Self {
        Self {
            settle_delay_ms: 1000,
        }
    }
}

impl TimetableConfig {
    /// Loads configuration from a JSON file. Missing keys take defaults.
    ///
    /// # Arguments
    /// * `path` - Path to the JSON config file
    ///
    /// # Returns
    /// * `Ok(TimetableConfig)` - Parsed configuration
    /// * `Err` - If the file can't be read or parsed, or lists no weekdays
    pub fn load_from_file(path: &Path) -> Result<Self, TimetableError> {
        let content = fs::read_to_string(path).map_err(|e| TimetableError::Config {
            message: format!("failed to read {}: {}", path.display(), e),
        })?;
        Self::from_json(&content)
    }

    /// Parses configuration from a JSON string.
    pub fn from_json(content: &str) -> Result<Self, TimetableError> {
        let config: TimetableConfig =
            serde_json::from_str(content).map_err(|e| TimetableError::Config {
                message: e.to_string(),
            })?;
        if config.days.days().is_empty() {
            return Err(TimetableError::Config {
                message: "at least one weekday must be configured".to_string(),
            });
        }
        Ok(config)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::schedule::Weekday;

    #[test]
    fn test_defaults() {
        let config = TimetableConfig::default();
        assert_eq!(config.days, DaySet::six_day());
        assert_eq!(config.upload.settle_delay(), Duration::from_secs(1));
        assert_eq!(config.api.base_url.as_str(), DEFAULT_BASE_URL);
    }

    #[test]
    fn test_partial_json_keeps_defaults() {
        let config = TimetableConfig::from_json(
            r#"{
                "api": { "base_url": "http://localhost:4000/api/" },
                "days": ["Monday", "Tuesday", "Wednesday", "Thursday", "Friday", "Saturday", "Sunday"]
            }"#,
        )
        .unwrap();
        assert_eq!(config.api.base_url.as_str(), "http://localhost:4000/api/");
        assert_eq!(config.api.request_timeout_secs, 30);
        assert!(config.days.contains(Weekday::Sunday));
        assert_eq!(config.upload.settle_delay_ms, 1000);
    }

    #[test]
    fn test_rejects_empty_day_set() {
        let err = TimetableConfig::from_json(r#"{ "days": [] }"#).unwrap_err();
        assert!(matches!(err, TimetableError::Config { .. }));
    }

    #[test]
    fn test_rejects_bad_url() {
        assert!(ApiConfig::with_base_url("not a url").is_err());
        let err = TimetableConfig::from_json(r#"{ "api": { "base_url": "::" } }"#).unwrap_err();
        assert!(matches!(err, TimetableError::Config { .. }));
    }
}
