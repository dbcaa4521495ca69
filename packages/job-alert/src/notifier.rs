use anyhow::{Context, Result};
use async_trait::async_trait;
use job_tracker::JobRecord;
use serde::Serialize;
use std::fmt::Write as _;
use std::time::Duration;
use tracing::info;

use crate::config::Config;
use crate::report::escape_html;

/// Jobs listed in a notification body
const SUMMARY_LIMIT: usize = 10;

/// Delivers the new jobs of a cycle to the user
#[async_trait]
pub trait Notifier: Send + Sync {
    async fn notify(&self, jobs: &[JobRecord]) -> Result<()>;
}

/// Plain-text listing of the first jobs of a cycle
pub fn format_job_summary(jobs: &[JobRecord]) -> String {
    if jobs.is_empty() {
        return "No matching jobs found in today's search.".to_string();
    }

    let mut summary = format!("Found {} matching jobs:\n\n", jobs.len());
    for (i, job) in jobs.iter().take(SUMMARY_LIMIT).enumerate() {
        let _ = write!(
            summary,
            "{}. {}\n   Company: {}\n   Location: {}\n   Salary: {}\n   Experience: {}\n   Source: {}\n   URL: {}\n\n",
            i + 1,
            job.title,
            job.company,
            job.location,
            job.salary,
            job.experience_hint,
            job.source_name,
            job.source_url,
        );
    }

    if jobs.len() > SUMMARY_LIMIT {
        let _ = writeln!(summary, "\n... and {} more jobs.", jobs.len() - SUMMARY_LIMIT);
    }
    summary
}

fn format_job_html(jobs: &[JobRecord]) -> String {
    let mut html = format!(
        "<html><body><h2>Found {} jobs matching your criteria</h2><ul>",
        jobs.len()
    );
    for job in jobs.iter().take(SUMMARY_LIMIT) {
        let _ = write!(
            html,
            r#"<li><strong>{}</strong> at {}<br>Location: {}<br>Salary: {}<br><a href="{}">Apply Now</a></li><br>"#,
            escape_html(&job.title),
            escape_html(&job.company),
            escape_html(&job.location),
            escape_html(&job.salary),
            escape_html(&job.source_url),
        );
    }
    html.push_str("</ul></body></html>");
    html
}

#[derive(Debug, Serialize)]
struct WebhookMessage<'a> {
    #[serde(skip_serializing_if = "Option::is_none")]
    to: Option<&'a str>,
    subject: String,
    text: String,
    html: String,
}

/// Posts each notification to an HTTP relay (mail gateway, chat webhook, ...)
pub struct WebhookNotifier {
    client: reqwest::Client,
    url: String,
    token: Option<String>,
    recipient: Option<String>,
}

impl WebhookNotifier {
    pub fn new(url: impl Into<String>) -> Result<Self> {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(30))
            .build()
            .context("Failed to create HTTP client")?;

        Ok(Self {
            client,
            url: url.into(),
            token: None,
            recipient: None,
        })
    }

    pub fn with_token(mut self, token: impl Into<String>) -> Self {
        self.token = Some(token.into());
        self
    }

    pub fn with_recipient(mut self, recipient: impl Into<String>) -> Self {
        self.recipient = Some(recipient.into());
        self
    }

    /// Notifier from configuration, or `None` when no relay is configured.
    pub fn from_config(config: &Config) -> Result<Option<Self>> {
        let Some(url) = &config.notification_webhook_url else {
            info!("Notification relay not configured, notifications disabled");
            return Ok(None);
        };

        let mut notifier = Self::new(url.clone())?;
        if let Some(token) = &config.notification_webhook_token {
            notifier = notifier.with_token(token.clone());
        }
        if let Some(email) = &config.notification_email {
            notifier = notifier.with_recipient(email.clone());
        }
        Ok(Some(notifier))
    }
}

#[async_trait]
impl Notifier for WebhookNotifier {
    async fn notify(&self, jobs: &[JobRecord]) -> Result<()> {
        let message = WebhookMessage {
            to: self.recipient.as_deref(),
            subject: format!("Job Alert - {} new opportunities", jobs.len()),
            text: format_job_summary(jobs),
            html: format_job_html(jobs),
        };

        let mut request = self.client.post(&self.url).json(&message);
        if let Some(token) = &self.token {
            request = request.bearer_auth(token);
        }

        let response = request
            .send()
            .await
            .context("Notification relay request failed")?;
        let status = response.status();
        if !status.is_success() {
            anyhow::bail!("Notification relay returned HTTP {}", status);
        }

        info!(
            count = jobs.len(),
            recipient = self.recipient.as_deref().unwrap_or("-"),
            "Sent job notification"
        );
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use job_tracker::SourceName;

    fn jobs(n: usize) -> Vec<JobRecord> {
        (1..=n)
            .map(|i| JobRecord::new(format!("Job {i}"), "Acme", "Delhi", SourceName::Naukri))
            .collect()
    }

    #[test]
    fn test_empty_summary() {
        assert_eq!(
            format_job_summary(&[]),
            "No matching jobs found in today's search."
        );
    }

    #[test]
    fn test_summary_lists_top_ten() {
        let summary = format_job_summary(&jobs(12));

        assert!(summary.starts_with("Found 12 matching jobs:"));
        assert!(summary.contains("10. Job 10\n"));
        assert!(!summary.contains("Job 11"));
        assert!(summary.contains("... and 2 more jobs."));
        assert!(summary.contains("   Source: Naukri\n"));
    }

    #[test]
    fn test_unconfigured_relay_disables_notifications() {
        let config = Config::from_lookup(|_| None).unwrap();
        assert!(WebhookNotifier::from_config(&config).unwrap().is_none());

        let config = Config::from_lookup(|key| match key {
            "NOTIFICATION_WEBHOOK_URL" => Some("https://relay.example.com/send".to_string()),
            "NOTIFICATION_EMAIL" => Some("me@example.com".to_string()),
            _ => None,
        })
        .unwrap();
        let notifier = WebhookNotifier::from_config(&config).unwrap().unwrap();
        assert_eq!(notifier.recipient.as_deref(), Some("me@example.com"));
    }

    #[test]
    fn test_html_body_is_escaped() {
        let mut job = JobRecord::new("Ops <Lead>", "A&B", "Delhi", SourceName::Indeed);
        job.source_url = "https://x.test/?a=1&b=2".to_string();

        let html = format_job_html(&[job]);
        assert!(html.contains("<strong>Ops &lt;Lead&gt;</strong> at A&amp;B"));
        assert!(html.contains(r#"href="https://x.test/?a=1&amp;b=2""#));
    }
}
