//! LinkedIn profile URL lookup
//!
//! Best effort, three rungs: Google Custom Search when credentials exist,
//! DuckDuckGo HTML scraping, and finally asking a model to guess the most
//! likely profile URL. Returns an empty string when every rung misses.

use once_cell::sync::Lazy;
use regex::Regex;
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, warn};

use crate::llm::{prompts, CompletionRequest, LlmClient};
use crate::ratelimit::RateLimiter;
use crate::web::{DuckDuckGo, GoogleSearch};

static PROFILE_URL_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"https://(?:[a-zA-Z0-9-]+\.)?linkedin\.com/in/[a-zA-Z0-9-]+/?")
        .expect("static pattern")
});

pub struct LinkedInFinder {
    google: Option<Arc<GoogleSearch>>,
    ddg: Arc<DuckDuckGo>,
    llm: Arc<dyn LlmClient>,
    limiter: RateLimiter,
}

impl LinkedInFinder {
    pub fn new(
        google: Option<Arc<GoogleSearch>>,
        ddg: Arc<DuckDuckGo>,
        llm: Arc<dyn LlmClient>,
    ) -> Self {
        Self {
            google,
            ddg,
            llm,
            limiter: RateLimiter::new(),
        }
    }

    /// Model-guessed URL, kept only if it actually looks like a profile link.
    async fn guess_via_llm(&self, person: &str, company: &str) -> Option<String> {
        let request = CompletionRequest::new(prompts::linkedin_url_guess(person, company))
            .with_temperature(0.2)
            .with_max_tokens(100);

        let answer = match self.llm.complete(&request).await {
            Ok(answer) => answer,
            Err(e) => {
                warn!("LinkedIn URL guess failed: {:#}", e);
                return None;
            }
        };

        PROFILE_URL_RE
            .find(&answer)
            .map(|m| m.as_str().trim_end_matches('/').to_string())
    }

    /// Find a profile URL for a person at a company, or an empty string.
    pub async fn find(&self, person: &str, company: &str) -> String {
        self.limiter
            .wait("linkedin", Duration::from_millis(1500))
            .await;

        if let Some(ref google) = self.google {
            if let Some(url) = google.linkedin_profile(person, company).await {
                debug!("LinkedIn via Google: {}", url);
                return url;
            }
        }

        if let Some(url) = self.ddg.find_linkedin(person, company).await {
            debug!("LinkedIn via DuckDuckGo: {}", url);
            return url;
        }

        if let Some(url) = self.guess_via_llm(person, company).await {
            debug!("LinkedIn via model guess: {}", url);
            return url;
        }

        String::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::llm::MockLlmClient;

    fn finder(ddg_url: String) -> LinkedInFinder {
        LinkedInFinder::new(
            None,
            Arc::new(DuckDuckGo::with_base_url(ddg_url).unwrap()),
            Arc::new(MockLlmClient::new()),
        )
    }

    #[test]
    fn test_profile_url_regex() {
        let m = PROFILE_URL_RE
            .find("try https://www.linkedin.com/in/jane-maxwell/ maybe")
            .unwrap();
        assert!(m.as_str().contains("/in/jane-maxwell"));
        assert!(PROFILE_URL_RE
            .find("https://linkedin.com/company/acme")
            .is_none());
    }

    #[tokio::test]
    async fn test_ddg_hit_skips_llm() {
        let mut server = mockito::Server::new_async().await;
        server
            .mock("GET", mockito::Matcher::Regex("^/html/.*".to_string()))
            .with_status(200)
            .with_body(r#"<a href="https://www.linkedin.com/in/omar-diaz">Omar Diaz</a>"#)
            .create_async()
            .await;

        let url = finder(server.url()).find("Omar Diaz", "Acme").await;
        assert!(url.contains("linkedin.com/in/omar-diaz"));
    }

    #[tokio::test]
    async fn test_falls_back_to_llm_guess() {
        let mut server = mockito::Server::new_async().await;
        server
            .mock("GET", mockito::Matcher::Regex("^/html/.*".to_string()))
            .with_status(200)
            .with_body("no links here")
            .create_async()
            .await;

        let url = finder(server.url()).find("Jane Maxwell", "Acme").await;
        assert_eq!(url, "https://linkedin.com/in/jane-maxwell");
    }
}
