//! Wikipedia Knowledge Source
//!
//! Searches the MediaWiki action API and returns the plain-text intros of
//! the best matching pages.

use std::time::Duration;

use async_trait::async_trait;
use serde::Deserialize;

use super::{format_page, truncate_chars, KnowledgeSource};
use crate::error::{AssistantError, Result};

/// Queries longer than this are cut before searching
pub const MAX_QUERY_CHARS: usize = 300;

/// Returned when no page yields a summary
pub const NO_RESULT: &str = "No good Wikipedia Search Result was found";

const USER_AGENT: &str = concat!(
    "math-agent/",
    env!("CARGO_PKG_VERSION"),
    " (https://github.com/your-org/math-agent)"
);

/// Wikipedia client configuration
#[derive(Clone, Debug)]
pub struct WikipediaConfig {
    /// MediaWiki `api.php` endpoint
    pub api_url: String,

    /// Number of search hits to summarise
    pub top_k: usize,

    /// Maximum characters in the combined result
    pub max_chars: usize,

    /// Request timeout in seconds
    pub timeout_secs: u64,
}

impl Default for WikipediaConfig {
    fn default() -> Self {
        Self {
            api_url: api_url_for("en"),
            top_k: 3,
            max_chars: 4000,
            timeout_secs: 30,
        }
    }
}

impl WikipediaConfig {
    pub fn from_env() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build from any key-value source (environment, test fixtures)
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let defaults = Self::default();
        let api_url = lookup("WIKIPEDIA_API_URL")
            .or_else(|| lookup("WIKIPEDIA_LANG").map(|lang| api_url_for(&lang)))
            .unwrap_or(defaults.api_url);

        Self {
            api_url,
            top_k: lookup("WIKIPEDIA_TOP_K")
                .and_then(|v| v.parse().ok())
                .filter(|k| *k > 0)
                .unwrap_or(defaults.top_k),
            max_chars: lookup("WIKIPEDIA_MAX_CHARS")
                .and_then(|v| v.parse().ok())
                .filter(|c| *c > 0)
                .unwrap_or(defaults.max_chars),
            timeout_secs: defaults.timeout_secs,
        }
    }
}

fn api_url_for(lang: &str) -> String {
    format!("https://{}.wikipedia.org/w/api.php", lang.trim())
}

/// Wikipedia client
pub struct WikipediaClient {
    client: reqwest::Client,
    config: WikipediaConfig,
}

impl WikipediaClient {
    pub fn new(config: WikipediaConfig) -> Result<Self> {
        let client = reqwest::Client::builder()
            .user_agent(USER_AGENT)
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()?;

        Ok(Self { client, config })
    }

    pub fn from_env() -> Result<Self> {
        Self::new(WikipediaConfig::from_env())
    }

    /// Titles of the best matching pages
    async fn search(&self, query: &str) -> Result<Vec<String>> {
        let limit = self.config.top_k.to_string();
        let response: SearchResponse = self
            .get(&[
                ("action", "query"),
                ("list", "search"),
                ("srsearch", query),
                ("srlimit", limit.as_str()),
                ("format", "json"),
                ("formatversion", "2"),
            ])
            .await?;

        Ok(response
            .query
            .map(|q| q.search.into_iter().map(|hit| hit.title).collect())
            .unwrap_or_default())
    }

    /// Plain-text intro of a page; `None` for missing or disambiguation pages
    async fn summary(&self, title: &str) -> Result<Option<(String, String)>> {
        let response: PagesResponse = self
            .get(&[
                ("action", "query"),
                ("prop", "extracts|pageprops"),
                ("ppprop", "disambiguation"),
                ("exintro", "1"),
                ("explaintext", "1"),
                ("redirects", "1"),
                ("titles", title),
                ("format", "json"),
                ("formatversion", "2"),
            ])
            .await?;

        let Some(page) = response.query.and_then(|q| q.pages.into_iter().next()) else {
            return Ok(None);
        };

        if page.missing || page.pageprops.is_some_and(|p| p.disambiguation.is_some()) {
            return Ok(None);
        }

        Ok(page
            .extract
            .filter(|e| !e.trim().is_empty())
            .map(|extract| (page.title.unwrap_or_else(|| title.to_string()), extract)))
    }

    async fn get<T: serde::de::DeserializeOwned>(&self, params: &[(&str, &str)]) -> Result<T> {
        let response = self
            .client
            .get(&self.config.api_url)
            .query(params)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            return Err(AssistantError::Lookup(format!("Wikipedia returned HTTP {status}")));
        }

        Ok(response.json().await?)
    }
}

#[async_trait]
impl KnowledgeSource for WikipediaClient {
    async fn lookup(&self, query: &str) -> Result<String> {
        let query: String = query.chars().take(MAX_QUERY_CHARS).collect();
        let titles = self.search(&query).await?;

        let mut pages = Vec::with_capacity(titles.len());
        for title in titles.iter().take(self.config.top_k) {
            match self.summary(title).await? {
                Some((resolved, extract)) => pages.push(format_page(&resolved, &extract)),
                None => tracing::debug!(%title, "Skipping page without a usable summary"),
            }
        }

        tracing::debug!(query = %query, hits = pages.len(), "Wikipedia lookup");

        if pages.is_empty() {
            return Ok(NO_RESULT.into());
        }

        Ok(truncate_chars(&pages.join("\n\n"), self.config.max_chars))
    }

    async fn health_check(&self) -> bool {
        match self.search("Wikipedia").await {
            Ok(_) => true,
            Err(e) => {
                tracing::warn!("Wikipedia health check failed: {}", e);
                false
            }
        }
    }

    fn name(&self) -> &str {
        "wikipedia"
    }
}

// MediaWiki response types (internal)

#[derive(Debug, Deserialize)]
struct SearchResponse {
    #[serde(default)]
    query: Option<SearchQuery>,
}

#[derive(Debug, Deserialize)]
struct SearchQuery {
    #[serde(default)]
    search: Vec<SearchHit>,
}

#[derive(Debug, Deserialize)]
struct SearchHit {
    title: String,
}

#[derive(Debug, Deserialize)]
struct PagesResponse {
    #[serde(default)]
    query: Option<PagesQuery>,
}

#[derive(Debug, Deserialize)]
struct PagesQuery {
    #[serde(default)]
    pages: Vec<Page>,
}

#[derive(Debug, Deserialize)]
struct Page {
    #[serde(default)]
    title: Option<String>,
    #[serde(default)]
    extract: Option<String>,
    #[serde(default)]
    missing: bool,
    #[serde(default)]
    pageprops: Option<PageProps>,
}

#[derive(Debug, Deserialize)]
struct PageProps {
    #[serde(default)]
    disambiguation: Option<String>,
}
