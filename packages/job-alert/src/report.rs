//! Saved search results and HTML reports under the storage directory.

use anyhow::{Context, Result};
use chrono::{DateTime, Local};
use job_tracker::JobRecord;
use serde::{Deserialize, Serialize};
use std::fmt::Write as _;
use std::fs;
use std::path::{Path, PathBuf};
use tracing::info;

const RESULTS_PREFIX: &str = "jobs_";
const REPORT_PREFIX: &str = "job_report_";
const FILE_TIMESTAMP: &str = "%Y%m%d_%H%M%S_%3f";

/// Contents of a `jobs_*.json` results file
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SavedSearch {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub search_date: Option<DateTime<Local>>,
    #[serde(default)]
    pub total_jobs: usize,
    #[serde(default)]
    pub jobs: Vec<JobRecord>,
}

#[derive(Debug, Clone)]
pub struct ReportWriter {
    dir: PathBuf,
}

impl ReportWriter {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    fn ensure_dir(&self) -> Result<()> {
        fs::create_dir_all(&self.dir)
            .with_context(|| format!("Failed to create storage dir {}", self.dir.display()))
    }

    /// Write `jobs_YYYYmmdd_HHMMSS_mmm.json`
    pub fn save_jobs(&self, jobs: &[JobRecord]) -> Result<PathBuf> {
        self.save_jobs_at(jobs, Local::now())
    }

    pub fn save_jobs_at(&self, jobs: &[JobRecord], now: DateTime<Local>) -> Result<PathBuf> {
        self.ensure_dir()?;
        let path = self.dir.join(format!(
            "{RESULTS_PREFIX}{}.json",
            now.format(FILE_TIMESTAMP)
        ));

        let saved = SavedSearch {
            search_date: Some(now),
            total_jobs: jobs.len(),
            jobs: jobs.to_vec(),
        };
        let json = serde_json::to_string_pretty(&saved).context("Failed to serialize jobs")?;
        fs::write(&path, json)
            .with_context(|| format!("Failed to write results {}", path.display()))?;

        info!(path = %path.display(), count = jobs.len(), "Saved job results");
        Ok(path)
    }

    /// Write `job_report_YYYYmmdd_HHMMSS_mmm.html`
    pub fn create_html_report(&self, jobs: &[JobRecord]) -> Result<PathBuf> {
        self.create_html_report_at(jobs, Local::now())
    }

    pub fn create_html_report_at(&self, jobs: &[JobRecord], now: DateTime<Local>) -> Result<PathBuf> {
        self.ensure_dir()?;
        let path = self.dir.join(format!(
            "{REPORT_PREFIX}{}.html",
            now.format(FILE_TIMESTAMP)
        ));

        fs::write(&path, render_html_report(jobs, now))
            .with_context(|| format!("Failed to write report {}", path.display()))?;

        info!(path = %path.display(), count = jobs.len(), "Created HTML report");
        Ok(path)
    }

    /// Most recent results file, or an empty result when none exist.
    pub fn load_latest_jobs(&self) -> Result<SavedSearch> {
        let Some(path) = self.latest(RESULTS_PREFIX, "json")? else {
            return Ok(SavedSearch::default());
        };

        let contents = fs::read_to_string(&path)
            .with_context(|| format!("Failed to read results {}", path.display()))?;
        serde_json::from_str(&contents)
            .with_context(|| format!("Invalid results file {}", path.display()))
    }

    pub fn latest_report(&self) -> Result<Option<PathBuf>> {
        self.latest(REPORT_PREFIX, "html")
    }

    /// Number of `jobs_*.json` files
    pub fn saved_search_count(&self) -> Result<usize> {
        Ok(self.matching(RESULTS_PREFIX, "json")?.len())
    }

    fn latest(&self, prefix: &str, extension: &str) -> Result<Option<PathBuf>> {
        // Timestamped names sort chronologically
        Ok(self.matching(prefix, extension)?.into_iter().max())
    }

    fn matching(&self, prefix: &str, extension: &str) -> Result<Vec<PathBuf>> {
        let entries = match fs::read_dir(&self.dir) {
            Ok(entries) => entries,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(Vec::new()),
            Err(e) => {
                return Err(e)
                    .with_context(|| format!("Failed to list {}", self.dir.display()))
            }
        };

        let mut paths = Vec::new();
        for entry in entries {
            let path = entry
                .with_context(|| format!("Failed to list {}", self.dir.display()))?
                .path();
            let matches = path.extension().is_some_and(|ext| ext == extension)
                && path
                    .file_name()
                    .and_then(|name| name.to_str())
                    .is_some_and(|name| name.starts_with(prefix));
            if matches {
                paths.push(path);
            }
        }
        Ok(paths)
    }
}

fn render_html_report(jobs: &[JobRecord], now: DateTime<Local>) -> String {
    let mut html = String::new();
    let _ = write!(
        html,
        r#"<!DOCTYPE html>
<html>
<head>
    <meta charset="utf-8">
    <title>Job Search Results - {date}</title>
    <style>
        body {{ font-family: Arial, sans-serif; margin: 20px; }}
        h1 {{ color: #333; }}
        .job {{ border: 1px solid #ddd; padding: 15px; margin: 10px 0; border-radius: 5px; }}
        .job:hover {{ background-color: #f5f5f5; }}
        .job-title {{ font-size: 18px; font-weight: bold; color: #0066cc; }}
        .company {{ color: #666; margin: 5px 0; }}
        .details {{ margin: 10px 0; }}
        .apply-btn {{ background-color: #0066cc; color: white; padding: 8px 15px;
                     text-decoration: none; border-radius: 3px; display: inline-block; }}
        .summary {{ background-color: #e8f4f8; padding: 15px; border-radius: 5px; margin-bottom: 20px; }}
    </style>
</head>
<body>
    <h1>Job Search Results</h1>
    <div class="summary">
        <p><strong>Search Date:</strong> {when}</p>
        <p><strong>Total Jobs Found:</strong> {total}</p>
    </div>
"#,
        date = now.format("%Y-%m-%d"),
        when = now.format("%Y-%m-%d %H:%M"),
        total = jobs.len(),
    );

    for job in jobs {
        let _ = write!(
            html,
            r#"    <div class="job">
        <div class="job-title">{title}</div>
        <div class="company">{company} - {location}</div>
        <div class="details">
            <p><strong>Salary:</strong> {salary}</p>
            <p><strong>Experience:</strong> {experience}</p>
            <p><strong>Source:</strong> {source}</p>
        </div>
"#,
            title = escape_html(&job.title),
            company = escape_html(&job.company),
            location = escape_html(&job.location),
            salary = escape_html(&job.salary),
            experience = escape_html(&job.experience_hint),
            source = escape_html(job.source_name.as_str()),
        );
        if !job.source_url.is_empty() {
            let _ = writeln!(
                html,
                r#"        <a href="{}" target="_blank" class="apply-btn">View &amp; Apply</a>"#,
                escape_html(&job.source_url)
            );
        }
        html.push_str("    </div>\n");
    }

    html.push_str("</body>\n</html>\n");
    html
}

pub(crate) fn escape_html(value: &str) -> String {
    let mut escaped = String::with_capacity(value.len());
    for c in value.chars() {
        match c {
            '&' => escaped.push_str("&amp;"),
            '<' => escaped.push_str("&lt;"),
            '>' => escaped.push_str("&gt;"),
            '"' => escaped.push_str("&quot;"),
            '\'' => escaped.push_str("&#39;"),
            _ => escaped.push(c),
        }
    }
    escaped
}
