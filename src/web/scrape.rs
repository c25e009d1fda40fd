//! Website content extraction
//!
//! Fetches a company's homepage through a ladder of fallbacks (strict TLS,
//! relaxed TLS, plain HTTP, alternate user agent), strips markup, and keeps
//! the sentences most likely to mention leadership.

use anyhow::{Context, Result};
use once_cell::sync::Lazy;
use regex::Regex;
use reqwest::Client;
use std::time::Duration;
use tracing::debug;

const BROWSER_UA: &str = "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36 \
                          (KHTML, like Gecko) Chrome/120.0.0.0 Safari/537.36";
const BOT_UA: &str = "Mozilla/5.0 (compatible; execfind/0.3; +https://example.com/bot)";

/// Sentence-level keywords that mark text as leadership-relevant.
const LEADERSHIP_TERMS: &[&str] = &[
    "ceo",
    "chief executive",
    "president",
    "founder",
    "owner",
    "director",
    "manager",
    "leader",
    "head of",
    "chairman",
    "co-founder",
    "managing",
    "executive",
    "established",
    "started",
    "founded",
    "created",
    "built",
];

static SCRIPT_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?is)<script[^>]*>.*?</script>").expect("static pattern"));
static STYLE_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?is)<style[^>]*>.*?</style>").expect("static pattern"));
static TAG_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"<[^>]+>").expect("static pattern"));
static WS_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"\s+").expect("static pattern"));

#[derive(Debug, Clone)]
pub struct ScrapeSettings {
    pub timeout_secs: u64,
    pub max_chars: usize,
}

impl Default for ScrapeSettings {
    fn default() -> Self {
        Self {
            timeout_secs: 12,
            max_chars: 8000,
        }
    }
}

fn build_client(timeout_secs: u64, accept_invalid_certs: bool, user_agent: &str) -> Result<Client> {
    Client::builder()
        .timeout(Duration::from_secs(timeout_secs))
        .user_agent(user_agent)
        .danger_accept_invalid_certs(accept_invalid_certs)
        .build()
        .context("failed to build HTTP client")
}

async fn try_fetch(client: &Client, url: &str) -> Option<String> {
    let response = client.get(url).send().await.ok()?;
    if !response.status().is_success() {
        return None;
    }
    response.text().await.ok()
}

/// Fetch raw page body through the fallback ladder. Returns None when every
/// attempt fails.
async fn fetch_with_fallbacks(url: &str, settings: &ScrapeSettings) -> Option<String> {
    // 1. Default TLS settings
    if let Ok(client) = build_client(settings.timeout_secs, false, BROWSER_UA) {
        if let Some(body) = try_fetch(&client, url).await {
            return Some(body);
        }
    }

    // 2. Relaxed TLS verification
    if let Ok(client) = build_client(settings.timeout_secs, true, BROWSER_UA) {
        if let Some(body) = try_fetch(&client, url).await {
            return Some(body);
        }
    }

    // 3. Plain HTTP
    if let Some(http_url) = url.strip_prefix("https://") {
        if let Ok(client) = build_client(settings.timeout_secs, false, BROWSER_UA) {
            if let Some(body) = try_fetch(&client, &format!("http://{}", http_url)).await {
                return Some(body);
            }
        }
    }

    // 4. Alternate user agent, shorter timeout
    if let Ok(client) = build_client(settings.timeout_secs.min(10), true, BOT_UA) {
        if let Some(body) = try_fetch(&client, url).await {
            return Some(body);
        }
    }

    None
}

/// Reduce an HTML page to plain text.
pub fn html_to_text(html: &str) -> String {
    let no_scripts = SCRIPT_RE.replace_all(html, " ");
    let no_styles = STYLE_RE.replace_all(&no_scripts, " ");
    let no_tags = TAG_RE.replace_all(&no_styles, " ");
    WS_RE.replace_all(&no_tags, " ").trim().to_string()
}

/// Pull the leadership-relevant sentences out of page text. Falls back to the
/// general text when no sentence matches.
pub fn select_leadership_text(text: &str, company: &str, max_chars: usize) -> String {
    let company_lower = company.to_lowercase();

    let sentences: Vec<&str> = text
        .split('.')
        .map(str::trim)
        .filter(|s| s.len() > 10)
        .filter(|s| {
            let lower = s.to_lowercase();
            LEADERSHIP_TERMS.iter().any(|t| lower.contains(t)) || lower.contains(&company_lower)
        })
        .take(20)
        .collect();

    let mut result = if sentences.is_empty() {
        text.to_string()
    } else {
        sentences.join(". ")
    };
    crate::util::cap_bytes(&mut result, max_chars);
    result
}

/// Fetch a company website and return leadership-focused plain text.
/// Empty string on any failure; scraping never aborts a row.
pub async fn site_leadership_text(url: &str, company: &str, settings: &ScrapeSettings) -> String {
    let url = if url.starts_with("http://") || url.starts_with("https://") {
        url.to_string()
    } else {
        format!("https://{}", url)
    };

    let Some(body) = fetch_with_fallbacks(&url, settings).await else {
        debug!("All fetch attempts failed for {}", url);
        return String::new();
    };

    let text = html_to_text(&body);
    let selected = select_leadership_text(&text, company, settings.max_chars);
    debug!("Scraped {} chars of leadership text from {}", selected.len(), url);
    selected
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_html_to_text_strips_scripts_and_tags() {
        let html = r#"<html><head><style>body { color: red; }</style>
            <script>var x = "Evil Hacker";</script></head>
            <body><h1>About   Acme</h1><p>Jane Maxwell founded the company.</p></body></html>"#;
        let text = html_to_text(html);
        assert!(!text.contains("Evil Hacker"));
        assert!(!text.contains("color"));
        assert!(text.contains("About Acme"));
        assert!(text.contains("Jane Maxwell founded the company"));
    }

    #[test]
    fn test_select_leadership_sentences() {
        let text = "Welcome to our website. Jane Maxwell is the CEO and founder. \
                    We sell widgets worldwide. The company was established in 1990";
        let selected = select_leadership_text(text, "Acme", 8000);
        assert!(selected.contains("Jane Maxwell is the CEO"));
        assert!(selected.contains("established in 1990"));
        assert!(!selected.contains("widgets worldwide"));
    }

    #[test]
    fn test_select_falls_back_to_general_text() {
        let text = "Nothing relevant here at all. Just plain prose without keywords";
        let selected = select_leadership_text(text, "Acme", 8000);
        assert_eq!(selected, text);
    }

    #[test]
    fn test_select_respects_cap() {
        let text = "ceo ".repeat(5000);
        let selected = select_leadership_text(&text, "Acme", 100);
        assert!(selected.len() <= 100);
    }

    #[test]
    fn test_cap_on_multibyte_text() {
        // Accented pages must not split a character at the cap
        let text = format!("ceo {}", "é".repeat(200));
        let selected = select_leadership_text(&text, "Acme", 101);
        assert!(selected.len() <= 101);
        assert!(selected.chars().all(|c| c == 'c' || c == 'e' || c == 'o' || c == ' ' || c == 'é'));
    }

    #[tokio::test]
    async fn test_site_leadership_text_from_mock_server() {
        let mut server = mockito::Server::new_async().await;
        server
            .mock("GET", "/")
            .with_status(200)
            .with_body("<html><body>Maria Santos, CEO of Acme, welcomes you.</body></html>")
            .create_async()
            .await;

        let settings = ScrapeSettings::default();
        let text = site_leadership_text(&server.url(), "Acme", &settings).await;
        assert!(text.contains("Maria Santos"));
    }

    #[tokio::test]
    async fn test_site_leadership_text_unreachable_is_empty() {
        let settings = ScrapeSettings {
            timeout_secs: 1,
            max_chars: 8000,
        };
        let text =
            site_leadership_text("http://127.0.0.1:1", "Acme", &settings).await;
        assert!(text.is_empty());
    }
}
