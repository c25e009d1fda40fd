//! Generative extraction sources
//!
//! Each flavor wraps one model provider: gather whatever web context is
//! available (search results, scraped website text, raw URLs), feed it to the
//! model with a maximum-recall prompt, and run the response through the
//! aggressive parser.

use anyhow::Result;
use async_trait::async_trait;
use std::sync::Arc;
use tracing::debug;

use super::{CompanyQuery, LookupOutcome, Source};
use crate::extract;
use crate::llm::{prompts, CompletionRequest, LlmClient};
use crate::web::scrape::{site_leadership_text, ScrapeSettings};
use crate::web::{DuckDuckGo, GoogleSearch};

/// Which provider persona this source runs as. Flavor decides the prompt,
/// sampling temperature, and how context is gathered.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum SourceFlavor {
    /// Anthropic: researcher prompt over Google CSE results + website text
    Researcher,
    /// OpenAI: aggressive extraction prompt over DuckDuckGo results + website text
    Aggressive,
    /// Gemini: short prompt over DuckDuckGo results and raw URLs, no scraping
    Generative,
}

impl SourceFlavor {
    fn label(&self) -> &'static str {
        match self {
            SourceFlavor::Researcher => "Anthropic Claude",
            SourceFlavor::Aggressive => "OpenAI",
            SourceFlavor::Generative => "Gemini",
        }
    }

    fn temperature(&self) -> f32 {
        match self {
            SourceFlavor::Generative => 0.4,
            _ => 0.3,
        }
    }
}

pub struct LlmSource {
    flavor: SourceFlavor,
    llm: Arc<dyn LlmClient>,
    google: Option<Arc<GoogleSearch>>,
    ddg: Arc<DuckDuckGo>,
    scrape: ScrapeSettings,
    max_tokens: u32,
}

impl LlmSource {
    pub fn new(
        flavor: SourceFlavor,
        llm: Arc<dyn LlmClient>,
        google: Option<Arc<GoogleSearch>>,
        ddg: Arc<DuckDuckGo>,
        scrape: ScrapeSettings,
        max_tokens: u32,
    ) -> Self {
        Self {
            flavor,
            llm,
            google,
            ddg,
            scrape,
            max_tokens,
        }
    }

    /// Assemble the context block fed into the prompt. Every part is best
    /// effort; missing pieces are simply absent from the block.
    async fn gather_context(&self, query: &CompanyQuery) -> String {
        let mut parts = vec![format!("Company: {}", query.name)];

        match self.flavor {
            SourceFlavor::Researcher => {
                if let Some(ref google) = self.google {
                    let results = google.company_context(&query.name).await;
                    if !results.is_empty() {
                        parts.push(format!("Google search results: {}", results));
                    }
                }
                if let Some(ref website) = query.website {
                    let content = site_leadership_text(website, &query.name, &self.scrape).await;
                    if !content.is_empty() {
                        parts.push(format!("Website content: {}", content));
                    }
                }
                if let Some(ref linkedin) = query.linkedin {
                    parts.push(format!("LinkedIn: {}", linkedin));
                }
            }
            SourceFlavor::Aggressive => {
                let results = self.ddg.company_context(&query.name).await;
                if !results.is_empty() {
                    parts.push(format!("Search results: {}", results));
                }
                if let Some(ref website) = query.website {
                    let content = site_leadership_text(website, &query.name, &self.scrape).await;
                    if !content.is_empty() {
                        parts.push(format!("Website: {}", content));
                    }
                }
                if let Some(ref linkedin) = query.linkedin {
                    parts.push(format!("LinkedIn: {}", linkedin));
                }
            }
            SourceFlavor::Generative => {
                let results = self.ddg.company_context(&query.name).await;
                if !results.is_empty() {
                    parts.push(format!("Search results: {}", results));
                }
                if let Some(ref website) = query.website {
                    parts.push(format!("Website: {}", website));
                }
                if let Some(ref linkedin) = query.linkedin {
                    parts.push(format!("LinkedIn: {}", linkedin));
                }
            }
        }

        parts.join("\n\n")
    }

    fn build_request(&self, company: &str, context: &str) -> CompletionRequest {
        let request = match self.flavor {
            SourceFlavor::Researcher => {
                CompletionRequest::new(prompts::researcher(company, context))
            }
            SourceFlavor::Aggressive => {
                CompletionRequest::new(prompts::aggressive_extraction(company, context))
                    .with_system(prompts::extraction_system())
            }
            SourceFlavor::Generative => {
                CompletionRequest::new(prompts::generative(company, context))
            }
        };
        request
            .with_temperature(self.flavor.temperature())
            .with_max_tokens(self.max_tokens)
    }
}

#[async_trait]
impl Source for LlmSource {
    fn name(&self) -> &'static str {
        self.flavor.label()
    }

    async fn lookup(&self, query: &CompanyQuery) -> Result<LookupOutcome> {
        let context = self.gather_context(query).await;
        debug!("{} context: {} chars", self.name(), context.len());

        let request = self.build_request(&query.name, &context);
        let response = self.llm.complete(&request).await?;

        match extract::parse_lookup_response(&response, self.name(), Some(&context)) {
            Some(record) => Ok(LookupOutcome::Found(record)),
            None => Ok(LookupOutcome::not_found(format!(
                "{} - no names found",
                self.name()
            ))),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::llm::MockLlmClient;

    fn mock_source(flavor: SourceFlavor, ddg_url: String) -> LlmSource {
        LlmSource::new(
            flavor,
            Arc::new(MockLlmClient::new()),
            None,
            Arc::new(DuckDuckGo::with_base_url(ddg_url).unwrap()),
            ScrapeSettings::default(),
            400,
        )
    }

    #[tokio::test]
    async fn test_aggressive_flavor_finds_mock_name() {
        let mut server = mockito::Server::new_async().await;
        server
            .mock("GET", mockito::Matcher::Regex("^/html/.*".to_string()))
            .with_status(200)
            .with_body("")
            .create_async()
            .await;

        let source = mock_source(SourceFlavor::Aggressive, server.url());
        let outcome = source.lookup(&CompanyQuery::new("Acme")).await.unwrap();

        let LookupOutcome::Found(record) = outcome else {
            panic!("expected Found, got {:?}", outcome);
        };
        assert_eq!(record.name, "Jane Maxwell");
        assert_eq!(record.source, "OpenAI");
    }

    #[tokio::test]
    async fn test_researcher_flavor_without_google() {
        let server = mockito::Server::new_async().await;
        let source = mock_source(SourceFlavor::Researcher, server.url());
        let outcome = source.lookup(&CompanyQuery::new("Acme")).await.unwrap();

        let LookupOutcome::Found(record) = outcome else {
            panic!("expected Found, got {:?}", outcome);
        };
        assert_eq!(record.name, "Omar Diaz");
        assert_eq!(record.source, "Anthropic Claude");
    }

    #[tokio::test]
    async fn test_generative_flavor_includes_raw_urls_in_context() {
        let mut server = mockito::Server::new_async().await;
        server
            .mock("GET", mockito::Matcher::Regex("^/html/.*".to_string()))
            .with_status(200)
            .with_body("")
            .create_async()
            .await;

        let source = mock_source(SourceFlavor::Generative, server.url());
        let query = CompanyQuery::new("Acme")
            .with_website("https://acme.com")
            .with_linkedin("https://linkedin.com/company/acme");
        let context = source.gather_context(&query).await;

        assert!(context.contains("Company: Acme"));
        assert!(context.contains("Website: https://acme.com"));
        assert!(context.contains("LinkedIn: https://linkedin.com/company/acme"));
    }

    #[test]
    fn test_flavor_labels_and_temperatures() {
        assert_eq!(SourceFlavor::Researcher.label(), "Anthropic Claude");
        assert_eq!(SourceFlavor::Aggressive.label(), "OpenAI");
        assert_eq!(SourceFlavor::Generative.label(), "Gemini");
        assert!(SourceFlavor::Generative.temperature() > SourceFlavor::Aggressive.temperature());
    }
}
