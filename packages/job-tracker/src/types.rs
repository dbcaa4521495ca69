use chrono::{DateTime, Utc};
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::fmt;

// ============================================================================
// SOURCES
// ============================================================================

/// Job board a record originated from
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum SourceName {
    LinkedIn,
    Indeed,
    Glassdoor,
    TimesJobs,
    Monster,
    Shine,
    Foundit,
    Instahyre,
    Naukri,
    ZipRecruiter,
    Google,
    Other(String),
}

impl SourceName {
    pub fn as_str(&self) -> &str {
        match self {
            SourceName::LinkedIn => "LinkedIn",
            SourceName::Indeed => "Indeed",
            SourceName::Glassdoor => "Glassdoor",
            SourceName::TimesJobs => "TimesJobs",
            SourceName::Monster => "Monster",
            SourceName::Shine => "Shine",
            SourceName::Foundit => "Foundit",
            SourceName::Instahyre => "Instahyre",
            SourceName::Naukri => "Naukri",
            SourceName::ZipRecruiter => "ZipRecruiter",
            SourceName::Google => "Google",
            SourceName::Other(name) => name,
        }
    }

    /// Parse a board name leniently ("zip_recruiter", "Times Jobs", "linkedin").
    pub fn parse(name: &str) -> Self {
        let key: String = name
            .chars()
            .filter(|c| c.is_alphanumeric())
            .collect::<String>()
            .to_lowercase();

        match key.as_str() {
            "linkedin" => SourceName::LinkedIn,
            "indeed" => SourceName::Indeed,
            "glassdoor" => SourceName::Glassdoor,
            "timesjobs" => SourceName::TimesJobs,
            "monster" => SourceName::Monster,
            "shine" => SourceName::Shine,
            "foundit" => SourceName::Foundit,
            "instahyre" => SourceName::Instahyre,
            "naukri" => SourceName::Naukri,
            "ziprecruiter" => SourceName::ZipRecruiter,
            "google" => SourceName::Google,
            _ => SourceName::Other(name.trim().to_string()),
        }
    }
}

impl fmt::Display for SourceName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl From<&str> for SourceName {
    fn from(name: &str) -> Self {
        Self::parse(name)
    }
}

impl Serialize for SourceName {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.as_str())
    }
}

impl<'de> Deserialize<'de> for SourceName {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let name = String::deserialize(deserializer)?;
        Ok(Self::parse(&name))
    }
}

/// Whether a source already narrowed its results to entry-level roles.
///
/// Decides the experience sentinel used when a record carries no hint.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SourceKind {
    PreFiltered,
    #[default]
    Raw,
}

// ============================================================================
// RECORDS
// ============================================================================

/// A job record as produced by a scraper. Every field may be missing.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RawJobRecord {
    pub title: Option<String>,
    pub company: Option<String>,
    pub location: Option<String>,
    pub salary: Option<String>,
    #[serde(alias = "experience_hint")]
    pub experience: Option<String>,
    #[serde(alias = "job_url")]
    pub url: Option<String>,
    #[serde(alias = "site")]
    pub source: Option<String>,
    pub description: Option<String>,
    pub min_amount: Option<f64>,
    pub max_amount: Option<f64>,
    pub interval: Option<String>,
    pub search_term: Option<String>,
}

impl RawJobRecord {
    pub fn new(title: impl Into<String>, company: impl Into<String>) -> Self {
        Self {
            title: Some(title.into()),
            company: Some(company.into()),
            ..Default::default()
        }
    }

    pub fn with_location(mut self, location: impl Into<String>) -> Self {
        self.location = Some(location.into());
        self
    }

    pub fn with_salary(mut self, salary: impl Into<String>) -> Self {
        self.salary = Some(salary.into());
        self
    }

    pub fn with_experience(mut self, experience: impl Into<String>) -> Self {
        self.experience = Some(experience.into());
        self
    }

    pub fn with_url(mut self, url: impl Into<String>) -> Self {
        self.url = Some(url.into());
        self
    }
}

/// A normalized job posting. `title` and `company` are never empty.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct JobRecord {
    pub title: String,
    pub company: String,
    pub location: String,
    pub salary: String,
    #[serde(rename = "experience")]
    pub experience_hint: String,
    #[serde(rename = "url")]
    pub source_url: String,
    #[serde(rename = "source")]
    pub source_name: SourceName,
    #[serde(rename = "scraped_date")]
    pub fetched_at: DateTime<Utc>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub search_term: Option<String>,
}

impl JobRecord {
    /// A record with the identity fields set and sentinels everywhere else.
    pub fn new(
        title: impl Into<String>,
        company: impl Into<String>,
        location: impl Into<String>,
        source_name: SourceName,
    ) -> Self {
        Self {
            title: title.into(),
            company: company.into(),
            location: location.into(),
            salary: crate::normalizer::SALARY_CHECK_DESCRIPTION.to_string(),
            experience_hint: crate::normalizer::EXPERIENCE_NOT_SPECIFIED.to_string(),
            source_url: String::new(),
            source_name,
            fetched_at: Utc::now(),
            description: None,
            search_term: None,
        }
    }
}

// ============================================================================
// IDENTITY
// ============================================================================

/// Hex digest identifying a logical posting independent of its source
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Fingerprint(String);

impl Fingerprint {
    pub fn from_hex(hex: impl Into<String>) -> Self {
        Self(hex.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for Fingerprint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}
