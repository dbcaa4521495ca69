//! Job board adapters.
//!
//! Every source turns one (keyword, location) search into raw records. What a
//! source cannot find stays `None`; the normalizer decides what is usable.
//!
//! Sources are described in a JSON file (`SOURCES_FILE`):
//!
//! ```json
//! { "sources": [
//!     { "type": "html_board", "name": "TimesJobs",
//!       "search_url": "https://www.timesjobs.com/...&txtKeywords={keywords}&txtLocation={location}",
//!       "selectors": { "card": "li.job-bx", "title": "h2", "company": "h3.joblist-comp-name" } },
//!     { "type": "json_feed", "name": "JobSpy", "location": "exports/jobspy.json" }
//! ] }
//! ```

mod html_board;
mod json_feed;

pub use html_board::{CardSelectors, HtmlBoardConfig, HtmlBoardSource};
pub use json_feed::{JsonFeedConfig, JsonFeedSource};

use anyhow::{Context, Result};
use async_trait::async_trait;
use job_tracker::{RawJobRecord, SourceKind, SourceName};
use serde::{Deserialize, Serialize};
use std::path::Path;
use std::sync::Arc;
use std::time::Duration;

use crate::error::SourceError;

/// A place job postings can be searched
#[async_trait]
pub trait JobSource: Send + Sync {
    fn name(&self) -> &SourceName;

    /// Whether the board already filters to entry-level roles
    fn kind(&self) -> SourceKind;

    async fn fetch(&self, keyword: &str, location: &str)
        -> Result<Vec<RawJobRecord>, SourceError>;
}

/// One entry of the sources file
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum SourceDefinition {
    HtmlBoard(HtmlBoardConfig),
    JsonFeed(JsonFeedConfig),
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct SourcesFile {
    pub sources: Vec<SourceDefinition>,
}

impl SourcesFile {
    pub fn load(path: &Path) -> Result<Self> {
        let contents = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read sources file {}", path.display()))?;
        serde_json::from_str(&contents)
            .with_context(|| format!("Invalid sources file {}", path.display()))
    }

    /// Boards searched when no sources file is configured
    pub fn builtin() -> Self {
        Self {
            sources: vec![
                SourceDefinition::HtmlBoard(HtmlBoardConfig {
                    name: SourceName::LinkedIn,
                    kind: SourceKind::Raw,
                    search_url: "https://www.linkedin.com/jobs/search/?keywords={keywords}&location={location}&position=1&pageNum=0".to_string(),
                    max_results: 20,
                    selectors: CardSelectors {
                        card: "div.base-card".to_string(),
                        title: "h3.base-search-card__title".to_string(),
                        company: "h4.base-search-card__subtitle".to_string(),
                        location: Some("span.job-search-card__location".to_string()),
                        salary: None,
                        experience: None,
                        link: Some("a.base-card__full-link".to_string()),
                    },
                }),
                SourceDefinition::HtmlBoard(HtmlBoardConfig {
                    name: SourceName::Indeed,
                    kind: SourceKind::Raw,
                    search_url: "https://in.indeed.com/jobs?q={keywords}&l={location}&explvl=entry_level".to_string(),
                    max_results: 15,
                    selectors: CardSelectors {
                        card: "div.job_seen_beacon, div.slider_container".to_string(),
                        title: "h2.jobTitle span[title], a[data-testid='job-title']".to_string(),
                        company: "span[data-testid='company-name'], span.companyName".to_string(),
                        location: Some("div[data-testid='text-location'], div.companyLocation".to_string()),
                        salary: Some("div.salary-snippet-container, div.salaryOnly".to_string()),
                        experience: None,
                        link: Some("a.jcs-JobTitle, h2 a".to_string()),
                    },
                }),
                SourceDefinition::HtmlBoard(HtmlBoardConfig {
                    name: SourceName::TimesJobs,
                    kind: SourceKind::Raw,
                    search_url: "https://www.timesjobs.com/candidate/job-search.html?searchType=personalizedSearch&from=submit&txtKeywords={keywords}&txtLocation={location}".to_string(),
                    max_results: 20,
                    selectors: CardSelectors {
                        card: "li.job-bx".to_string(),
                        title: "h2".to_string(),
                        company: "h3.joblist-comp-name".to_string(),
                        location: Some("ul.top-jd-dtl span".to_string()),
                        salary: None,
                        experience: Some("ul.top-jd-dtl li".to_string()),
                        link: Some("h2 a".to_string()),
                    },
                }),
                SourceDefinition::HtmlBoard(HtmlBoardConfig {
                    name: SourceName::Shine,
                    kind: SourceKind::Raw,
                    search_url: "https://www.shine.com/job-search/{keywords_slug}-jobs-in-{location_slug}".to_string(),
                    max_results: 20,
                    selectors: CardSelectors {
                        card: "div.jobCard".to_string(),
                        title: "h2, a.jobTitle".to_string(),
                        company: "div.recruiterName, span.company".to_string(),
                        location: Some("div.jobLocation, span.location".to_string()),
                        salary: None,
                        experience: None,
                        link: Some("h2 a".to_string()),
                    },
                }),
            ],
        }
    }

    /// Instantiate every configured source, sharing one HTTP client.
    pub fn build(&self) -> Result<Vec<Arc<dyn JobSource>>> {
        let client = http_client()?;

        self.sources
            .iter()
            .map(|definition| -> Result<Arc<dyn JobSource>> {
                Ok(match definition {
                    SourceDefinition::HtmlBoard(config) => {
                        Arc::new(HtmlBoardSource::new(config.clone(), client.clone())?)
                    }
                    SourceDefinition::JsonFeed(config) => {
                        Arc::new(JsonFeedSource::new(config.clone(), client.clone()))
                    }
                })
            })
            .collect()
    }
}

/// HTTP client with browser-like headers
pub fn http_client() -> Result<reqwest::Client> {
    // Use a browser-like User-Agent to avoid bot detection
    let user_agent = "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/120.0.0.0 Safari/537.36";

    let mut headers = reqwest::header::HeaderMap::new();
    headers.insert(
        reqwest::header::ACCEPT,
        reqwest::header::HeaderValue::from_static(
            "text/html,application/xhtml+xml,application/xml;q=0.9,image/webp,*/*;q=0.8",
        ),
    );
    headers.insert(
        reqwest::header::ACCEPT_LANGUAGE,
        reqwest::header::HeaderValue::from_static("en-US,en;q=0.5"),
    );
    headers.insert(
        reqwest::header::CONNECTION,
        reqwest::header::HeaderValue::from_static("keep-alive"),
    );

    reqwest::Client::builder()
        .timeout(Duration::from_secs(30))
        .user_agent(user_agent)
        .default_headers(headers)
        .redirect(reqwest::redirect::Policy::limited(5))
        .build()
        .context("Failed to create HTTP client")
}
