use anyhow::{anyhow, Context, Result};
use chrono::{NaiveTime, Weekday};
use dotenvy::dotenv;
use job_tracker::{FilterConfig, TrackerConfig};
use serde::Serialize;
use std::env;
use std::path::PathBuf;
use std::str::FromStr;

/// Salary floors at or above this are rupees per annum, not lakhs.
const RUPEE_FLOOR_THRESHOLD: f64 = 1000.0;
const RUPEES_PER_LAKH: f64 = 100_000.0;

/// Application configuration loaded from environment variables
#[derive(Debug, Clone, Serialize)]
pub struct Config {
    pub job_titles: Vec<String>,
    pub location: String,
    pub preferred_locations: Vec<String>,
    pub min_salary_lpa: f64,
    pub max_experience_years: u32,
    pub experience_levels: Vec<String>,
    pub retention_days: u32,
    pub history_max_age_days: u32,
    pub sweep_weekday: Weekday,
    pub storage_dir: PathBuf,
    pub sources_file: Option<PathBuf>,
    pub daily_run_time: NaiveTime,
    /// 0 disables the interval trigger
    pub run_interval_minutes: u64,
    pub request_delay_ms: u64,
    pub max_keywords: usize,
    pub server_host: String,
    pub server_port: u16,
    pub notification_email: Option<String>,
    pub notification_webhook_url: Option<String>,
    #[serde(skip)]
    pub notification_webhook_token: Option<String>,
}

impl Config {
    /// Load configuration from environment variables
    pub fn from_env() -> Result<Self> {
        // Load .env file if present (development)
        let _ = dotenv();

        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Build from any key lookup. Missing or blank keys take their defaults.
    pub fn from_lookup<F>(lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |key: &str| {
            lookup(key)
                .map(|v| v.trim().to_string())
                .filter(|v| !v.is_empty())
        };
        let list = |key: &str, default: &str| split_list(&get(key).unwrap_or_else(|| default.to_string()));

        let config = Self {
            job_titles: list("JOB_TITLES", "operations,operations coordinator"),
            location: get("LOCATION").unwrap_or_else(|| "India".to_string()),
            preferred_locations: list(
                "PREFERRED_LOCATIONS",
                "gurugram,gurgaon,delhi,new delhi,noida",
            ),
            min_salary_lpa: salary_floor_lpa(parse_or(get("MIN_SALARY_LPA"), "MIN_SALARY_LPA", 9.0)?),
            max_experience_years: parse_or(get("MAX_EXPERIENCE_YEARS"), "MAX_EXPERIENCE_YEARS", 2)?,
            experience_levels: list("EXPERIENCE_LEVEL", "entry,fresher,0-1,0-2"),
            retention_days: parse_or(get("RETENTION_DAYS"), "RETENTION_DAYS", 3)?,
            history_max_age_days: parse_or(get("HISTORY_MAX_AGE_DAYS"), "HISTORY_MAX_AGE_DAYS", 30)?,
            sweep_weekday: match get("SWEEP_WEEKDAY") {
                Some(day) => Weekday::from_str(&day)
                    .map_err(|_| anyhow!("SWEEP_WEEKDAY must be a day of the week, got {day:?}"))?,
                None => Weekday::Mon,
            },
            storage_dir: get("STORAGE_DIR")
                .map(PathBuf::from)
                .unwrap_or_else(|| PathBuf::from("job_results")),
            sources_file: get("SOURCES_FILE").map(PathBuf::from),
            daily_run_time: match get("DAILY_RUN_TIME") {
                Some(time) => NaiveTime::parse_from_str(&time, "%H:%M")
                    .with_context(|| format!("DAILY_RUN_TIME must be HH:MM, got {time:?}"))?,
                None => NaiveTime::from_hms_opt(9, 0, 0).unwrap_or(NaiveTime::MIN),
            },
            run_interval_minutes: parse_or(get("RUN_INTERVAL_MINUTES"), "RUN_INTERVAL_MINUTES", 360)?,
            request_delay_ms: parse_or(get("REQUEST_DELAY_MS"), "REQUEST_DELAY_MS", 1000)?,
            max_keywords: parse_or(get("MAX_KEYWORDS"), "MAX_KEYWORDS", 8)?,
            server_host: get("SERVER_HOST").unwrap_or_else(|| "0.0.0.0".to_string()),
            server_port: parse_or(get("SERVER_PORT"), "SERVER_PORT", 8000)?,
            notification_email: get("NOTIFICATION_EMAIL"),
            notification_webhook_url: get("NOTIFICATION_WEBHOOK_URL"),
            notification_webhook_token: get("NOTIFICATION_WEBHOOK_TOKEN"),
        };

        config
            .tracker_config()
            .validate()
            .context("Invalid history retention settings")?;

        Ok(config)
    }

    pub fn tracker_config(&self) -> TrackerConfig {
        TrackerConfig::default()
            .with_retention_days(self.retention_days)
            .with_max_age_days(self.history_max_age_days)
            .with_sweep_weekday(self.sweep_weekday)
    }

    pub fn filter_config(&self) -> FilterConfig {
        FilterConfig::default()
            .with_preferred_locations(self.preferred_locations.clone())
            .with_max_experience_years(self.max_experience_years)
            .with_min_salary_lpa(self.min_salary_lpa)
    }

    pub fn bind_addr(&self) -> String {
        format!("{}:{}", self.server_host, self.server_port)
    }
}

fn split_list(value: &str) -> Vec<String> {
    value
        .split(',')
        .map(|item| item.trim().to_string())
        .filter(|item| !item.is_empty())
        .collect()
}

fn parse_or<T>(value: Option<String>, key: &str, default: T) -> Result<T>
where
    T: FromStr,
    T::Err: std::error::Error + Send + Sync + 'static,
{
    match value {
        Some(raw) => raw
            .parse()
            .with_context(|| format!("{key} must be a valid number, got {raw:?}")),
        None => Ok(default),
    }
}

/// Accepts either lakhs (`9`) or rupees (`900000`).
fn salary_floor_lpa(value: f64) -> f64 {
    if value >= RUPEE_FLOOR_THRESHOLD {
        value / RUPEES_PER_LAKH
    } else {
        value
    }
}
