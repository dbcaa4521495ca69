//! Heuristic filters applied to normalized records.
//!
//! These are best-effort keyword and pattern checks, not classifiers. When a
//! record gives too little information to decide, the filters lean towards
//! keeping it so a human can review it.

use lazy_static::lazy_static;
use regex::Regex;
use tracing::info;

use crate::config::FilterConfig;
use crate::types::JobRecord;

lazy_static! {
    // "0-1", "0 - 2", "0-3" years
    static ref JUNIOR_RANGE_REGEX: Regex = Regex::new(r"0\s*-\s*[123]").unwrap();

    // "2 years experience", "1-3 years of experience"
    static ref YEARS_EXPERIENCE_REGEX: Regex =
        Regex::new(r"(\d+)\s*(?:-\s*\d+)?\s*years?\s+(?:of\s+)?experience").unwrap();

    // "10 LPA", "9.5 - 12 lpa"
    static ref LPA_REGEX: Regex =
        Regex::new(r"(\d+(?:\.\d+)?)\s*(?:-\s*\d+(?:\.\d+)?)?\s*lpa").unwrap();

    // "10 lakh", "8-10 lacs", "12L"
    static ref LAKH_REGEX: Regex =
        Regex::new(r"(\d+(?:\.\d+)?)\s*(?:-\s*\d+(?:\.\d+)?)?\s*(?:lakh|lac|l)").unwrap();

    // "₹9,00,000 per year", "1200000 p.a."
    static ref ANNUAL_RUPEES_REGEX: Regex = Regex::new(
        r"₹?\s*(\d+(?:,\d+)*(?:\.\d+)?)\s*(?:-\s*\d+(?:,\d+)*(?:\.\d+)?)?\s*(?:per\s*)?(?:year|annual|p\.a\.)"
    ).unwrap();
}

const ENTRY_KEYWORDS: &[&str] = &[
    "entry",
    "fresher",
    "junior",
    "0-1",
    "0-2",
    "graduate",
    "beginner",
    "trainee",
    "associate",
    "coordinator",
    "executive",
    "new grad",
];

const SENIOR_KEYWORDS: &[&str] = &[
    "senior",
    "lead",
    "manager",
    "head",
    "director",
    "principal",
    "expert",
    "specialist",
    "architect",
    "5+",
    "7+",
    "10+",
];

const UNDISCLOSED_SALARY_MARKERS: &[&str] = &["not disclosed", "check", "not specified"];

const UNSPECIFIED_EXPERIENCE_MARKERS: &[&str] = &["check", "not specified"];

/// A predicate over normalized records
pub trait JobFilter: Send + Sync {
    fn name(&self) -> &'static str;

    fn accepts(&self, job: &JobRecord) -> bool;
}

// ============================================================================
// LOCATION
// ============================================================================

/// Keeps jobs whose location mentions one of the preferred places.
pub struct LocationFilter {
    preferred: Vec<String>,
}

impl LocationFilter {
    pub fn new(preferred: &[String]) -> Self {
        Self {
            preferred: preferred
                .iter()
                .map(|loc| loc.trim().to_lowercase())
                .filter(|loc| !loc.is_empty())
                .collect(),
        }
    }
}

impl JobFilter for LocationFilter {
    fn name(&self) -> &'static str {
        "location"
    }

    fn accepts(&self, job: &JobRecord) -> bool {
        if self.preferred.is_empty() {
            return true;
        }
        let location = job.location.to_lowercase();
        self.preferred.iter().any(|pref| location.contains(pref))
    }
}

// ============================================================================
// SENIORITY
// ============================================================================

/// Keeps entry-level roles and roles whose seniority can't be determined.
pub struct SeniorityFilter {
    max_years: u32,
}

impl SeniorityFilter {
    pub fn new(max_years: u32) -> Self {
        Self { max_years }
    }

    fn min_years_required(description: &str) -> Option<u32> {
        YEARS_EXPERIENCE_REGEX
            .captures_iter(description)
            .filter_map(|caps| caps.get(1)?.as_str().parse::<u32>().ok())
            .min()
    }
}

impl JobFilter for SeniorityFilter {
    fn name(&self) -> &'static str {
        "seniority"
    }

    fn accepts(&self, job: &JobRecord) -> bool {
        let title = job.title.to_lowercase();
        let experience = job.experience_hint.to_lowercase();

        if SENIOR_KEYWORDS.iter().any(|kw| title.contains(kw)) {
            return false;
        }

        if ENTRY_KEYWORDS
            .iter()
            .any(|kw| title.contains(kw) || experience.contains(kw))
        {
            return true;
        }

        if JUNIOR_RANGE_REGEX.is_match(&experience) {
            return true;
        }

        if UNSPECIFIED_EXPERIENCE_MARKERS
            .iter()
            .any(|marker| experience.contains(marker))
        {
            return true;
        }

        let description = job.description.as_deref().unwrap_or("").to_lowercase();
        match Self::min_years_required(&description) {
            Some(years) => years <= self.max_years,
            None => false,
        }
    }
}

// ============================================================================
// SALARY
// ============================================================================

/// Keeps jobs paying at least a floor in lakhs per annum.
///
/// Undisclosed salaries pass for manual review.
pub struct SalaryFilter {
    min_lpa: f64,
}

impl SalaryFilter {
    pub fn new(min_lpa: f64) -> Self {
        Self { min_lpa }
    }
}

impl JobFilter for SalaryFilter {
    fn name(&self) -> &'static str {
        "salary"
    }

    fn accepts(&self, job: &JobRecord) -> bool {
        let salary = job.salary.to_lowercase();

        if UNDISCLOSED_SALARY_MARKERS
            .iter()
            .any(|marker| salary.contains(marker))
        {
            return true;
        }

        extract_salary_lpa(&salary) >= self.min_lpa
    }
}

/// Best-effort salary extraction in lakhs per annum; 0.0 when nothing matches.
pub fn extract_salary_lpa(salary_text: &str) -> f64 {
    let text = salary_text.to_lowercase();

    let first_number = |re: &Regex| -> Option<f64> {
        re.captures(&text)
            .and_then(|caps| caps.get(1))
            .and_then(|m| m.as_str().replace(',', "").parse::<f64>().ok())
    };

    if let Some(lpa) = first_number(&LPA_REGEX) {
        return lpa;
    }
    if let Some(lakhs) = first_number(&LAKH_REGEX) {
        return lakhs;
    }
    if let Some(rupees) = first_number(&ANNUAL_RUPEES_REGEX) {
        return rupees / 100_000.0;
    }
    0.0
}

// ============================================================================
// CHAIN
// ============================================================================

/// Ordered sequence of filters; a record must pass all of them.
#[derive(Default)]
pub struct FilterChain {
    filters: Vec<Box<dyn JobFilter>>,
}

impl FilterChain {
    pub fn new() -> Self {
        Self::default()
    }

    /// The standard location → seniority → salary chain.
    pub fn from_config(config: &FilterConfig) -> Self {
        Self::new()
            .with_filter(LocationFilter::new(&config.preferred_locations))
            .with_filter(SeniorityFilter::new(config.max_experience_years))
            .with_filter(SalaryFilter::new(config.min_salary_lpa))
    }

    pub fn with_filter(mut self, filter: impl JobFilter + 'static) -> Self {
        self.filters.push(Box::new(filter));
        self
    }

    pub fn len(&self) -> usize {
        self.filters.len()
    }

    pub fn is_empty(&self) -> bool {
        self.filters.is_empty()
    }

    /// Apply each filter in turn, keeping input order.
    pub fn apply(&self, jobs: Vec<JobRecord>) -> Vec<JobRecord> {
        self.filters.iter().fold(jobs, |jobs, filter| {
            let before = jobs.len();
            let kept: Vec<JobRecord> = jobs.into_iter().filter(|j| filter.accepts(j)).collect();
            info!(
                filter = filter.name(),
                before,
                after = kept.len(),
                "Applied job filter"
            );
            kept
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::SourceName;
    use chrono::Utc;

    fn job(title: &str, location: &str, salary: &str, experience: &str) -> JobRecord {
        JobRecord {
            title: title.to_string(),
            company: "Acme".to_string(),
            location: location.to_string(),
            salary: salary.to_string(),
            experience_hint: experience.to_string(),
            source_url: String::new(),
            source_name: SourceName::Indeed,
            fetched_at: Utc::now(),
            description: None,
            search_term: None,
        }
    }

    #[test]
    fn test_location_substring_match() {
        let filter = LocationFilter::new(&["Gurugram".to_string(), " noida ".to_string()]);
        assert!(filter.accepts(&job("Ops", "Sector 44, Gurugram, Haryana", "", "")));
        assert!(filter.accepts(&job("Ops", "NOIDA", "", "")));
        assert!(!filter.accepts(&job("Ops", "Mumbai", "", "")));
    }

    #[test]
    fn test_empty_location_preferences_accept_everything() {
        let filter = LocationFilter::new(&[]);
        assert!(filter.accepts(&job("Ops", "Anywhere", "", "")));
    }

    #[test]
    fn test_senior_titles_rejected_even_with_entry_hint() {
        let filter = SeniorityFilter::new(2);
        assert!(!filter.accepts(&job("Senior Operations Coordinator", "", "", "Entry level")));
        assert!(!filter.accepts(&job("Operations Manager", "", "", "0-1 years")));
    }

    #[test]
    fn test_entry_signals_accepted() {
        let filter = SeniorityFilter::new(2);
        assert!(filter.accepts(&job("Operations Coordinator", "", "", "3-5 yrs")));
        assert!(filter.accepts(&job("Operations", "", "", "Entry level")));
        assert!(filter.accepts(&job("Operations", "", "", "0 - 3 Yrs")));
        assert!(filter.accepts(&job("Operations", "", "", "Not specified")));
    }

    #[test]
    fn test_description_years_decide_ambiguous_roles() {
        let filter = SeniorityFilter::new(2);

        let mut junior = job("Operations", "", "", "3-6 yrs");
        junior.description = Some("Requires 1-2 years of experience in logistics".into());
        assert!(filter.accepts(&junior));

        let mut senior = job("Operations", "", "", "3-6 yrs");
        senior.description = Some("Minimum 4 years experience".into());
        assert!(!filter.accepts(&senior));

        assert!(!filter.accepts(&job("Operations", "", "", "3-6 yrs")));
    }

    #[test]
    fn test_salary_extraction_patterns() {
        assert_eq!(extract_salary_lpa("10-12 LPA"), 10.0);
        assert_eq!(extract_salary_lpa("9.5 lpa"), 9.5);
        assert_eq!(extract_salary_lpa("8 - 10 Lacs P.A."), 8.0);
        assert_eq!(extract_salary_lpa("₹12,00,000 per year"), 12.0);
        assert_eq!(extract_salary_lpa("competitive"), 0.0);
    }

    #[test]
    fn test_salary_filter_keeps_undisclosed() {
        let filter = SalaryFilter::new(9.0);
        assert!(filter.accepts(&job("Ops", "", "Not disclosed", "")));
        assert!(filter.accepts(&job("Ops", "", "Check job description", "")));
        assert!(filter.accepts(&job("Ops", "", "10-12 LPA", "")));
        assert!(!filter.accepts(&job("Ops", "", "4-6 LPA", "")));
    }

    #[test]
    fn test_chain_applies_in_order_and_preserves_order() {
        let chain = FilterChain::from_config(
            &FilterConfig::default()
                .with_preferred_locations(vec!["gurugram".into()])
                .with_min_salary_lpa(9.0),
        );
        assert_eq!(chain.len(), 3);

        let jobs = vec![
            job("Operations Coordinator", "Gurugram", "10 LPA", ""),
            job("Operations Coordinator", "Mumbai", "10 LPA", ""),
            job("Operations Head", "Gurugram", "30 LPA", ""),
            job("Operations Executive", "Gurugram", "Not disclosed", ""),
            job("Operations Associate", "Gurugram", "3 LPA", ""),
        ];

        let kept: Vec<String> = chain
            .apply(jobs)
            .into_iter()
            .map(|j| format!("{} @ {}", j.title, j.salary))
            .collect();

        assert_eq!(
            kept,
            vec![
                "Operations Coordinator @ 10 LPA",
                "Operations Executive @ Not disclosed",
            ]
        );
    }
}
