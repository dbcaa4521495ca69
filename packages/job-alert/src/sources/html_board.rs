//! Job boards scraped from server-rendered search result pages.
//!
//! No JavaScript rendering: boards that build their listings client-side
//! return no cards and simply contribute nothing.

use async_trait::async_trait;
use job_tracker::{RawJobRecord, SourceKind, SourceName};
use scraper::{ElementRef, Html, Selector};
use serde::{Deserialize, Serialize};
use tracing::debug;
use url::Url;

use super::JobSource;
use crate::error::SourceError;

fn default_max_results() -> usize {
    20
}

/// Where and how to read one board
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HtmlBoardConfig {
    pub name: SourceName,
    #[serde(default)]
    pub kind: SourceKind,
    /// Search page URL. `{keywords}` / `{location}` are URL-encoded,
    /// `{keywords_slug}` / `{location_slug}` are lower-case and hyphenated.
    pub search_url: String,
    #[serde(default = "default_max_results")]
    pub max_results: usize,
    pub selectors: CardSelectors,
}

/// CSS selectors for one result card. Fields are searched inside the card.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CardSelectors {
    pub card: String,
    pub title: String,
    pub company: String,
    #[serde(default)]
    pub location: Option<String>,
    #[serde(default)]
    pub salary: Option<String>,
    #[serde(default)]
    pub experience: Option<String>,
    #[serde(default)]
    pub link: Option<String>,
}

struct CompiledSelectors {
    card: Selector,
    title: Selector,
    company: Selector,
    location: Option<Selector>,
    salary: Option<Selector>,
    experience: Option<Selector>,
    link: Option<Selector>,
    any_link: Selector,
}

pub struct HtmlBoardSource {
    config: HtmlBoardConfig,
    selectors: CompiledSelectors,
    client: reqwest::Client,
}

impl HtmlBoardSource {
    pub fn new(config: HtmlBoardConfig, client: reqwest::Client) -> Result<Self, SourceError> {
        let board = config.name.to_string();
        let compile = |field: &'static str, selector: &str| {
            Selector::parse(selector).map_err(|_| SourceError::Selector {
                board: board.clone(),
                field,
                selector: selector.to_string(),
            })
        };
        let optional = |field: &'static str, selector: &Option<String>| {
            selector.as_deref().map(|s| compile(field, s)).transpose()
        };

        let s = &config.selectors;
        let selectors = CompiledSelectors {
            card: compile("card", &s.card)?,
            title: compile("title", &s.title)?,
            company: compile("company", &s.company)?,
            location: optional("location", &s.location)?,
            salary: optional("salary", &s.salary)?,
            experience: optional("experience", &s.experience)?,
            link: optional("link", &s.link)?,
            any_link: compile("link", "a[href]")?,
        };

        Ok(Self {
            config,
            selectors,
            client,
        })
    }

    pub fn search_url(&self, keyword: &str, location: &str) -> Result<Url, SourceError> {
        let rendered = render_search_url(&self.config.search_url, keyword, location);
        Url::parse(&rendered).map_err(|_| SourceError::InvalidUrl(rendered))
    }

    async fn fetch_html(&self, url: &Url) -> Result<String, SourceError> {
        let response = self
            .client
            .get(url.clone())
            .send()
            .await
            .map_err(|source| SourceError::Http {
                url: url.to_string(),
                source,
            })?;

        let status = response.status();
        if !status.is_success() {
            return Err(SourceError::Status {
                url: url.to_string(),
                status,
            });
        }

        response.text().await.map_err(|source| SourceError::Http {
            url: url.to_string(),
            source,
        })
    }

    /// Extract result cards from a search page.
    pub fn parse_cards(&self, html: &str, page_url: &Url) -> Vec<RawJobRecord> {
        let document = Html::parse_document(html);
        let s = &self.selectors;

        document
            .select(&s.card)
            .take(self.config.max_results)
            .map(|card| RawJobRecord {
                title: first_text(card, &s.title),
                company: first_text(card, &s.company),
                location: s.location.as_ref().and_then(|sel| first_text(card, sel)),
                salary: s.salary.as_ref().and_then(|sel| first_text(card, sel)),
                experience: s.experience.as_ref().and_then(|sel| first_text(card, sel)),
                url: self.card_link(card, page_url),
                ..Default::default()
            })
            .collect()
    }

    fn card_link(&self, card: ElementRef<'_>, page_url: &Url) -> Option<String> {
        let s = &self.selectors;
        let href = s
            .link
            .as_ref()
            .and_then(|sel| card.select(sel).find_map(|el| el.value().attr("href")))
            .or_else(|| card.value().attr("href"))
            .or_else(|| card.select(&s.any_link).find_map(|el| el.value().attr("href")))?;

        page_url.join(href.trim()).ok().map(|url| url.to_string())
    }
}

#[async_trait]
impl JobSource for HtmlBoardSource {
    fn name(&self) -> &SourceName {
        &self.config.name
    }

    fn kind(&self) -> SourceKind {
        self.config.kind
    }

    async fn fetch(&self, keyword: &str, location: &str) -> Result<Vec<RawJobRecord>, SourceError> {
        let url = self.search_url(keyword, location)?;
        let html = self.fetch_html(&url).await?;
        let records = self.parse_cards(&html, &url);

        debug!(
            source = %self.config.name,
            keyword,
            location,
            cards = records.len(),
            "Parsed search results page"
        );

        Ok(records)
    }
}

fn first_text(card: ElementRef<'_>, selector: &Selector) -> Option<String> {
    card.select(selector)
        .map(|el| collapse_whitespace(&el.text().collect::<Vec<_>>().join(" ")))
        .find(|text| !text.is_empty())
}

fn collapse_whitespace(text: &str) -> String {
    text.split_whitespace().collect::<Vec<_>>().join(" ")
}

fn slug(value: &str) -> String {
    value
        .split_whitespace()
        .map(|part| part.to_lowercase())
        .collect::<Vec<_>>()
        .join("-")
}

pub(super) fn render_search_url(template: &str, keyword: &str, location: &str) -> String {
    template
        .replace("{keywords_slug}", &slug(keyword))
        .replace("{location_slug}", &slug(location))
        .replace("{keywords}", &urlencoding::encode(keyword))
        .replace("{location}", &urlencoding::encode(location))
}
