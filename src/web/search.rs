use anyhow::{Context, Result};
use once_cell::sync::Lazy;
use regex::Regex;
use reqwest::Client;
use serde::Deserialize;
use std::time::Duration;
use tracing::{debug, warn};

use crate::config::GoogleSearchKeys;
use crate::util::SecretString;

const BROWSER_UA: &str = "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36 \
                          (KHTML, like Gecko) Chrome/120.0.0.0 Safari/537.36";

static TAG_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"<[^>]+>").expect("static pattern"));
static WS_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"\s+").expect("static pattern"));
static DDG_SNIPPET_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?s)result__snippet[^>]*>(.*?)</a>").expect("static pattern"));
static DDG_TITLE_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?s)result__title[^>]*>(.*?)</a>").expect("static pattern"));

fn strip_html(fragment: &str) -> String {
    let text = TAG_RE.replace_all(fragment, "");
    WS_RE.replace_all(&text, " ").trim().to_string()
}

// ============================================================================
// Google Custom Search
// ============================================================================

pub struct GoogleSearch {
    api_key: SecretString,
    engine_id: String,
    base_url: String,
    client: Client,
}

#[derive(Debug, Deserialize)]
struct SearchResponse {
    #[serde(default)]
    items: Vec<SearchItem>,
}

#[derive(Debug, Deserialize)]
struct SearchItem {
    #[serde(default)]
    title: String,
    #[serde(default)]
    snippet: String,
    #[serde(default)]
    link: String,
}

impl GoogleSearch {
    pub fn new(keys: &GoogleSearchKeys) -> Result<Self> {
        Self::with_base_url(keys, "https://www.googleapis.com".to_string())
    }

    pub fn with_base_url(keys: &GoogleSearchKeys, base_url: String) -> Result<Self> {
        Ok(Self {
            api_key: keys.api_key.clone(),
            engine_id: keys.engine_id.clone(),
            base_url,
            client: Client::builder()
                .timeout(Duration::from_secs(10))
                .build()
                .context("failed to build HTTP client")?,
        })
    }

    async fn query(&self, query: &str, num: u32) -> Result<Vec<SearchItem>> {
        debug!("Google Custom Search: {}", query);

        let response = self
            .client
            .get(format!("{}/customsearch/v1", self.base_url))
            .query(&[
                ("key", self.api_key.expose()),
                ("cx", &self.engine_id),
                ("q", query),
                ("num", &num.to_string()),
            ])
            .send()
            .await
            .context("Failed to send Google Custom Search request")?;

        if !response.status().is_success() {
            anyhow::bail!("Google Custom Search error {}", response.status());
        }

        let body: SearchResponse = response
            .json()
            .await
            .context("Failed to parse Google Custom Search response")?;
        Ok(body.items)
    }

    /// Gather leadership-phrased search results for a company. Failed queries
    /// are skipped; an empty string means nothing usable came back.
    pub async fn company_context(&self, company: &str) -> String {
        let queries = [
            format!("{} CEO chief executive officer", company),
            format!("{} founder president owner", company),
        ];

        let mut results = Vec::new();
        for query in &queries {
            match self.query(query, 5).await {
                Ok(items) => {
                    for item in items {
                        let combined = format!("{} {}", item.title, item.snippet);
                        if combined.len() > 30 {
                            results.push(combined);
                        }
                    }
                }
                Err(e) => warn!("Google search failed for {:?}: {:#}", query, e),
            }
        }

        let mut combined = results
            .into_iter()
            .take(8)
            .collect::<Vec<_>>()
            .join(" | ");
        crate::util::cap_bytes(&mut combined, 4000);
        combined
    }

    /// Search for a person's LinkedIn profile URL.
    pub async fn linkedin_profile(&self, person: &str, company: &str) -> Option<String> {
        let query = format!(r#""{}" "{}" site:linkedin.com/in"#, person, company);
        match self.query(&query, 3).await {
            Ok(items) => items
                .into_iter()
                .map(|item| item.link)
                .find(|link| link.contains("linkedin.com/in/") && link.len() > 30),
            Err(e) => {
                warn!("Google LinkedIn search failed: {:#}", e);
                None
            }
        }
    }
}

// ============================================================================
// DuckDuckGo HTML search (no API key)
// ============================================================================

pub struct DuckDuckGo {
    base_url: String,
    client: Client,
}

impl DuckDuckGo {
    pub fn new() -> Result<Self> {
        Self::with_base_url("https://html.duckduckgo.com".to_string())
    }

    pub fn with_base_url(base_url: String) -> Result<Self> {
        Ok(Self {
            base_url,
            client: Client::builder()
                .timeout(Duration::from_secs(10))
                .user_agent(BROWSER_UA)
                .build()
                .context("failed to build HTTP client")?,
        })
    }

    async fn search_page(&self, query: &str) -> Result<String> {
        debug!("DuckDuckGo search: {}", query);

        let url = format!("{}/html/?q={}", self.base_url, query.replace(' ', "+"));
        let response = self
            .client
            .get(&url)
            .send()
            .await
            .context("Failed to send DuckDuckGo request")?;

        if !response.status().is_success() {
            anyhow::bail!("DuckDuckGo error {}", response.status());
        }

        response
            .text()
            .await
            .context("Failed to read DuckDuckGo response body")
    }

    /// Scrape result snippets and titles for leadership-phrased queries.
    pub async fn company_context(&self, company: &str) -> String {
        let queries = [
            format!("{} CEO", company),
            format!("{} founder", company),
            format!("{} president", company),
            format!("{} leadership", company),
        ];

        let mut results = Vec::new();
        for query in &queries {
            let html = match self.search_page(query).await {
                Ok(html) => html,
                Err(e) => {
                    warn!("Search failed for {:?}: {:#}", query, e);
                    continue;
                }
            };

            for caps in DDG_SNIPPET_RE.captures_iter(&html).take(2) {
                let snippet = strip_html(&caps[1]);
                if snippet.len() > 30 {
                    results.push(snippet);
                }
            }
            for caps in DDG_TITLE_RE.captures_iter(&html).take(2) {
                let title = strip_html(&caps[1]);
                if title.len() > 10 {
                    results.push(title);
                }
            }
        }

        debug!("DuckDuckGo gathered {} result fragments", results.len());

        let mut combined = results
            .into_iter()
            .take(15)
            .collect::<Vec<_>>()
            .join(" | ");
        crate::util::cap_bytes(&mut combined, 6000);
        combined
    }

    /// Scan search results for a linkedin.com/in profile URL.
    pub async fn find_linkedin(&self, person: &str, company: &str) -> Option<String> {
        static LINKEDIN_URL_RE: Lazy<Regex> = Lazy::new(|| {
            Regex::new(r"https://[a-zA-Z0-9.-]*linkedin\.com/in/[a-zA-Z0-9-]+/?")
                .expect("static pattern")
        });
        static LINKEDIN_BARE_RE: Lazy<Regex> = Lazy::new(|| {
            Regex::new(r"linkedin\.com/in/[a-zA-Z0-9-]+/?").expect("static pattern")
        });

        let query = format!("\"{}\" {} LinkedIn", person, company);
        let html = match self.search_page(&query).await {
            Ok(html) => html,
            Err(e) => {
                warn!("DuckDuckGo LinkedIn search failed: {:#}", e);
                return None;
            }
        };

        if let Some(m) = LINKEDIN_URL_RE.find(&html) {
            return Some(m.as_str().to_string());
        }
        LINKEDIN_BARE_RE
            .find(&html)
            .map(|m| format!("https://{}", m.as_str()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_strip_html() {
        assert_eq!(
            strip_html("<b>Jane</b>   Maxwell <a href=\"x\">CEO</a>"),
            "Jane Maxwell CEO"
        );
    }

    #[test]
    fn test_ddg_snippet_regex() {
        let html = r#"<a class="result__snippet" href="/x">Jane Maxwell is the <b>CEO</b> of Acme</a>"#;
        let caps = DDG_SNIPPET_RE.captures(html).unwrap();
        assert!(caps[1].contains("Jane Maxwell"));
    }

    #[tokio::test]
    async fn test_google_company_context_from_mock() {
        let mut server = mockito::Server::new_async().await;
        let mock = server
            .mock("GET", "/customsearch/v1")
            .match_query(mockito::Matcher::Any)
            .with_status(200)
            .with_body(
                r#"{"items": [{"title": "Acme leadership", "snippet": "Jane Maxwell has been CEO of Acme since 2019, leading the firm", "link": "https://acme.com"}]}"#,
            )
            .expect_at_least(1)
            .create_async()
            .await;

        let keys = GoogleSearchKeys {
            api_key: SecretString::new("k".to_string()),
            engine_id: "cx".to_string(),
        };
        let search = GoogleSearch::with_base_url(&keys, server.url()).unwrap();
        let context = search.company_context("Acme").await;

        mock.assert_async().await;
        assert!(context.contains("Jane Maxwell"));
    }

    #[tokio::test]
    async fn test_google_company_context_survives_errors() {
        let mut server = mockito::Server::new_async().await;
        server
            .mock("GET", "/customsearch/v1")
            .match_query(mockito::Matcher::Any)
            .with_status(500)
            .create_async()
            .await;

        let keys = GoogleSearchKeys {
            api_key: SecretString::new("k".to_string()),
            engine_id: "cx".to_string(),
        };
        let search = GoogleSearch::with_base_url(&keys, server.url()).unwrap();
        assert!(search.company_context("Acme").await.is_empty());
    }

    #[tokio::test]
    async fn test_ddg_find_linkedin() {
        let mut server = mockito::Server::new_async().await;
        server
            .mock("GET", mockito::Matcher::Regex("^/html/.*".to_string()))
            .with_status(200)
            .with_body(r#"<a href="https://www.linkedin.com/in/jane-maxwell">Jane Maxwell</a>"#)
            .create_async()
            .await;

        let ddg = DuckDuckGo::with_base_url(server.url()).unwrap();
        let url = ddg.find_linkedin("Jane Maxwell", "Acme").await.unwrap();
        assert!(url.contains("linkedin.com/in/jane-maxwell"));
    }
}
