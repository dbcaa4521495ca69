//! Raw scraper output → canonical [`JobRecord`].
//!
//! Records without a title or company are dropped silently; every other
//! missing field is replaced with a fixed sentinel so downstream code (and
//! the fingerprint) never sees an absent value.

use chrono::{DateTime, Utc};
use tracing::debug;

use crate::types::{JobRecord, RawJobRecord, SourceKind, SourceName};

pub const LOCATION_NOT_SPECIFIED: &str = "Not specified";
pub const SALARY_CHECK_DESCRIPTION: &str = "Check job description";
pub const EXPERIENCE_ENTRY_LEVEL: &str = "Entry level";
pub const EXPERIENCE_NOT_SPECIFIED: &str = "Not specified";

const RUPEES_PER_LAKH: f64 = 100_000.0;

/// Raw records returned by one source, in scrape order
#[derive(Debug, Clone)]
pub struct RawBatch {
    pub source: SourceName,
    pub kind: SourceKind,
    pub records: Vec<RawJobRecord>,
}

impl RawBatch {
    pub fn new(source: SourceName, kind: SourceKind, records: Vec<RawJobRecord>) -> Self {
        Self {
            source,
            kind,
            records,
        }
    }
}

/// Normalize one raw record, or `None` when title or company is missing.
pub fn normalize(raw: RawJobRecord, source: &SourceName, kind: SourceKind) -> Option<JobRecord> {
    normalize_at(raw, source, kind, Utc::now())
}

pub fn normalize_at(
    raw: RawJobRecord,
    source: &SourceName,
    kind: SourceKind,
    fetched_at: DateTime<Utc>,
) -> Option<JobRecord> {
    let (Some(title), Some(company)) = (clean(raw.title), clean(raw.company)) else {
        debug!(source = %source, "Dropping raw record without title or company");
        return None;
    };

    let salary = clean(raw.salary)
        .or_else(|| format_salary(raw.min_amount, raw.max_amount, raw.interval.as_deref()))
        .unwrap_or_else(|| SALARY_CHECK_DESCRIPTION.to_string());

    let experience_hint = clean(raw.experience).unwrap_or_else(|| {
        match kind {
            SourceKind::PreFiltered => EXPERIENCE_ENTRY_LEVEL,
            SourceKind::Raw => EXPERIENCE_NOT_SPECIFIED,
        }
        .to_string()
    });

    // Aggregated feeds name the originating board per record
    let source_name = clean(raw.source)
        .map(|name| SourceName::parse(&name))
        .unwrap_or_else(|| source.clone());

    Some(JobRecord {
        title,
        company,
        location: clean(raw.location).unwrap_or_else(|| LOCATION_NOT_SPECIFIED.to_string()),
        salary,
        experience_hint,
        source_url: clean(raw.url).unwrap_or_default(),
        source_name,
        fetched_at,
        description: clean(raw.description),
        search_term: clean(raw.search_term),
    })
}

/// Normalize a batch, preserving input order and dropping incomplete records.
pub fn normalize_batch(batch: RawBatch) -> Vec<JobRecord> {
    let fetched_at = Utc::now();
    let total = batch.records.len();

    let records: Vec<JobRecord> = batch
        .records
        .into_iter()
        .filter_map(|raw| normalize_at(raw, &batch.source, batch.kind, fetched_at))
        .collect();

    debug!(
        source = %batch.source,
        total,
        kept = records.len(),
        "Normalized raw batch"
    );

    records
}

fn clean(value: Option<String>) -> Option<String> {
    value
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

/// Render structured salary amounts the way boards show them.
///
/// Yearly and monthly amounts are converted to lakhs per annum; other
/// intervals are shown as rupee ranges.
fn format_salary(min: Option<f64>, max: Option<f64>, interval: Option<&str>) -> Option<String> {
    let min = min.filter(|v| v.is_finite() && *v > 0.0)?;
    let max = max.filter(|v| v.is_finite() && *v > 0.0);
    let interval = interval.unwrap_or("").trim().to_lowercase();

    let to_lpa = |amount: f64| match interval.as_str() {
        "yearly" => Some(amount / RUPEES_PER_LAKH),
        "monthly" => Some(amount * 12.0 / RUPEES_PER_LAKH),
        _ => None,
    };

    let formatted = match max {
        Some(max) => match (to_lpa(min), to_lpa(max)) {
            (Some(lo), Some(hi)) => format!("{:.1}-{:.1} LPA", lo, hi),
            _ => format!("₹{}-₹{} {}", group_thousands(min), group_thousands(max), interval),
        },
        None => match interval.as_str() {
            "yearly" => format!("{:.1}+ LPA", min / RUPEES_PER_LAKH),
            _ => format!("₹{}+ {}", group_thousands(min), interval),
        },
    };

    Some(formatted.trim_end().to_string())
}

fn group_thousands(amount: f64) -> String {
    let digits = format!("{:.0}", amount);
    let mut grouped = String::with_capacity(digits.len() + digits.len() / 3);
    for (i, c) in digits.chars().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            grouped.push(',');
        }
        grouped.push(c);
    }
    grouped
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_missing_title_or_company_is_dropped() {
        let source = SourceName::Indeed;
        let no_title = RawJobRecord {
            company: Some("Beta".into()),
            ..Default::default()
        };
        let blank_company = RawJobRecord::new("Operations Executive", "   ");

        assert!(normalize(no_title, &source, SourceKind::Raw).is_none());
        assert!(normalize(blank_company, &source, SourceKind::Raw).is_none());
    }

    #[test]
    fn test_sentinels_fill_missing_fields() {
        let raw = RawJobRecord::new(" Operations Coordinator ", "Acme");
        let job = normalize(raw, &SourceName::Shine, SourceKind::Raw).unwrap();

        assert_eq!(job.title, "Operations Coordinator");
        assert_eq!(job.location, LOCATION_NOT_SPECIFIED);
        assert_eq!(job.salary, SALARY_CHECK_DESCRIPTION);
        assert_eq!(job.experience_hint, EXPERIENCE_NOT_SPECIFIED);
        assert_eq!(job.source_url, "");
        assert_eq!(job.source_name, SourceName::Shine);
    }

    #[test]
    fn test_prefiltered_sources_default_to_entry_level() {
        let raw = RawJobRecord::new("Operations Coordinator", "Acme");
        let job = normalize(raw, &SourceName::Naukri, SourceKind::PreFiltered).unwrap();
        assert_eq!(job.experience_hint, EXPERIENCE_ENTRY_LEVEL);
    }

    #[test]
    fn test_record_source_overrides_batch_source() {
        let mut raw = RawJobRecord::new("Operations Coordinator", "Acme");
        raw.source = Some("glassdoor".into());

        let job = normalize(raw, &SourceName::Other("JobSpy".into()), SourceKind::Raw).unwrap();
        assert_eq!(job.source_name, SourceName::Glassdoor);
    }

    #[test]
    fn test_batch_preserves_order() {
        let batch = RawBatch::new(
            SourceName::Indeed,
            SourceKind::Raw,
            vec![
                RawJobRecord::new("A", "X"),
                RawJobRecord::new("", "Y"),
                RawJobRecord::new("C", "Z"),
            ],
        );

        let titles: Vec<String> = normalize_batch(batch).into_iter().map(|j| j.title).collect();
        assert_eq!(titles, vec!["A", "C"]);
    }

    #[test]
    fn test_yearly_amounts_format_as_lpa() {
        assert_eq!(
            format_salary(Some(900000.0), Some(1200000.0), Some("yearly")).as_deref(),
            Some("9.0-12.0 LPA")
        );
        assert_eq!(
            format_salary(Some(1050000.0), None, Some("yearly")).as_deref(),
            Some("10.5+ LPA")
        );
    }

    #[test]
    fn test_monthly_amounts_are_annualized() {
        assert_eq!(
            format_salary(Some(75000.0), Some(100000.0), Some("monthly")).as_deref(),
            Some("9.0-12.0 LPA")
        );
    }

    #[test]
    fn test_other_intervals_format_as_rupees() {
        assert_eq!(
            format_salary(Some(500.0), Some(1500.0), Some("hourly")).as_deref(),
            Some("₹500-₹1,500 hourly")
        );
        assert_eq!(
            format_salary(Some(1234567.0), None, None).as_deref(),
            Some("₹1,234,567+")
        );
    }

    #[test]
    fn test_salary_text_wins_over_amounts() {
        let mut raw = RawJobRecord::new("Ops", "Acme").with_salary("10-12 LPA");
        raw.min_amount = Some(1.0);
        raw.interval = Some("yearly".into());

        let job = normalize(raw, &SourceName::Indeed, SourceKind::Raw).unwrap();
        assert_eq!(job.salary, "10-12 LPA");
    }
}
