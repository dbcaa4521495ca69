use chrono::Weekday;
use serde::{Deserialize, Serialize};

use crate::error::{Result, TrackerError};

/// Settings for the location / seniority / salary filter chain
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FilterConfig {
    pub preferred_locations: Vec<String>,
    pub max_experience_years: u32,
    pub min_salary_lpa: f64,
}

impl Default for FilterConfig {
    fn default() -> Self {
        Self {
            preferred_locations: ["gurugram", "gurgaon", "delhi", "new delhi", "noida"]
                .iter()
                .map(|s| s.to_string())
                .collect(),
            max_experience_years: 2,
            min_salary_lpa: 9.0,
        }
    }
}

impl FilterConfig {
    pub fn with_preferred_locations(mut self, locations: Vec<String>) -> Self {
        self.preferred_locations = locations;
        self
    }

    pub fn with_max_experience_years(mut self, years: u32) -> Self {
        self.max_experience_years = years;
        self
    }

    pub fn with_min_salary_lpa(mut self, lpa: f64) -> Self {
        self.min_salary_lpa = lpa;
        self
    }
}

/// Retention and sweeping policy for the seen-job history
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TrackerConfig {
    /// Days a posting stays suppressed after it was last emitted
    pub retention_days: u32,
    /// Age after which history entries are swept
    pub max_age_days: u32,
    /// Day of the week the sweeper runs
    pub sweep_weekday: Weekday,
}

impl Default for TrackerConfig {
    fn default() -> Self {
        Self {
            retention_days: 3,
            max_age_days: 30,
            sweep_weekday: Weekday::Mon,
        }
    }
}

impl TrackerConfig {
    pub fn with_retention_days(mut self, days: u32) -> Self {
        self.retention_days = days;
        self
    }

    pub fn with_max_age_days(mut self, days: u32) -> Self {
        self.max_age_days = days;
        self
    }

    pub fn with_sweep_weekday(mut self, weekday: Weekday) -> Self {
        self.sweep_weekday = weekday;
        self
    }

    /// Sweeping must never forget a posting that is still being suppressed.
    pub fn validate(&self) -> Result<()> {
        if self.max_age_days < self.retention_days {
            return Err(TrackerError::InvalidConfig(format!(
                "max_age_days ({}) must be at least retention_days ({})",
                self.max_age_days, self.retention_days
            )));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_are_valid() {
        assert!(TrackerConfig::default().validate().is_ok());
    }

    #[test]
    fn test_sweep_horizon_shorter_than_window_is_rejected() {
        let config = TrackerConfig::default()
            .with_retention_days(7)
            .with_max_age_days(5);

        let err = config.validate().unwrap_err();
        assert!(matches!(err, TrackerError::InvalidConfig(_)));
    }
}
