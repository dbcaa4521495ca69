use async_trait::async_trait;
use job_tracker::{RawJobRecord, SourceKind, SourceName};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use tracing::debug;

use super::JobSource;
use crate::error::SourceError;

/// A JSON array of raw job records exported by another scraper
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct JsonFeedConfig {
    pub name: SourceName,
    #[serde(default)]
    pub kind: SourceKind,
    /// Local path, or an http(s) URL that may use the same placeholders as
    /// [`HtmlBoardConfig::search_url`](super::HtmlBoardConfig::search_url).
    pub location: String,
}

pub struct JsonFeedSource {
    config: JsonFeedConfig,
    client: reqwest::Client,
}

impl JsonFeedSource {
    pub fn new(config: JsonFeedConfig, client: reqwest::Client) -> Self {
        Self { config, client }
    }

    fn is_remote(&self) -> bool {
        self.config.location.starts_with("http://") || self.config.location.starts_with("https://")
    }

    async fn read_body(&self, keyword: &str, location: &str) -> Result<String, SourceError> {
        if !self.is_remote() {
            let path = PathBuf::from(&self.config.location);
            return tokio::fs::read_to_string(&path)
                .await
                .map_err(|source| SourceError::Io { path, source });
        }

        let url = super::html_board::render_search_url(&self.config.location, keyword, location);
        let response = self
            .client
            .get(&url)
            .send()
            .await
            .map_err(|source| SourceError::Http {
                url: url.clone(),
                source,
            })?;

        let status = response.status();
        if !status.is_success() {
            return Err(SourceError::Status { url, status });
        }

        response
            .text()
            .await
            .map_err(|source| SourceError::Http { url, source })
    }
}

#[async_trait]
impl JobSource for JsonFeedSource {
    fn name(&self) -> &SourceName {
        &self.config.name
    }

    fn kind(&self) -> SourceKind {
        self.config.kind
    }

    async fn fetch(&self, keyword: &str, location: &str) -> Result<Vec<RawJobRecord>, SourceError> {
        let body = self.read_body(keyword, location).await?;
        let entries: Vec<serde_json::Value> =
            serde_json::from_str(&body).map_err(|source| SourceError::Feed {
                location: self.config.location.clone(),
                source,
            })?;

        // Malformed entries are dropped one at a time
        let total = entries.len();
        let records: Vec<RawJobRecord> = entries
            .into_iter()
            .enumerate()
            .filter_map(|(index, entry)| match serde_json::from_value(entry) {
                Ok(record) => Some(record),
                Err(e) => {
                    debug!(
                        source = %self.config.name,
                        index,
                        error = %e,
                        "Skipping malformed feed entry"
                    );
                    None
                }
            })
            .collect();

        debug!(
            source = %self.config.name,
            records = records.len(),
            skipped = total - records.len(),
            "Read job feed"
        );

        Ok(records)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    fn feed(location: &str) -> JsonFeedSource {
        JsonFeedSource::new(
            JsonFeedConfig {
                name: SourceName::Other("JobSpy".to_string()),
                kind: SourceKind::Raw,
                location: location.to_string(),
            },
            reqwest::Client::new(),
        )
    }

    #[tokio::test]
    async fn test_reads_local_feed() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(
            file,
            r#"[{{"title": "Operations Executive", "company": "Acme", "site": "indeed",
                 "job_url": "https://in.indeed.com/viewjob?jk=1"}},
                {{"company": "No Title"}}]"#
        )
        .unwrap();

        let records = feed(file.path().to_str().unwrap())
            .fetch("operations", "India")
            .await
            .unwrap();

        assert_eq!(records.len(), 2);
        assert_eq!(records[0].source.as_deref(), Some("indeed"));
        assert_eq!(records[1].title, None);
    }

    #[tokio::test]
    async fn test_malformed_entry_does_not_lose_the_feed() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(
            file,
            r#"[{{"title": "Operations Executive", "company": "Acme"}},
                {{"title": 123, "company": "Beta"}},
                {{"title": "Admin", "company": "Gamma", "min_amount": "n/a"}},
                "not a record"]"#
        )
        .unwrap();

        let records = feed(file.path().to_str().unwrap())
            .fetch("operations", "India")
            .await
            .unwrap();

        assert_eq!(records.len(), 1);
        assert_eq!(records[0].title.as_deref(), Some("Operations Executive"));
        assert_eq!(records[0].company.as_deref(), Some("Acme"));
    }

    #[tokio::test]
    async fn test_missing_feed_is_an_error() {
        let err = feed("/nonexistent/feed.json")
            .fetch("operations", "India")
            .await
            .unwrap_err();
        assert!(matches!(err, SourceError::Io { .. }));
    }

    #[tokio::test]
    async fn test_non_array_feed_is_an_error() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(file, r#"{{"jobs": []}}"#).unwrap();

        let err = feed(file.path().to_str().unwrap())
            .fetch("operations", "India")
            .await
            .unwrap_err();
        assert!(matches!(err, SourceError::Feed { .. }));
    }
}
