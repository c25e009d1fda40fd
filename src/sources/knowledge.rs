//! Last-resort knowledge mining
//!
//! No web context at all: ask the model a series of direct questions about the
//! company and scan the free-text answers for anything that looks like a
//! person's name. Runs only after every other source has come up empty.

use anyhow::Result;
use async_trait::async_trait;
use std::sync::Arc;
use std::time::Duration;
use tokio::time::sleep;
use tracing::debug;

use super::{CeoRecord, CompanyQuery, Confidence, LookupOutcome, Source};
use crate::extract;
use crate::llm::{prompts, CompletionRequest, LlmClient};

/// Answer fragments that mean the model declined rather than named someone.
const REFUSAL_WORDS: &[&str] = &["not", "unknown", "unclear", "information", "available"];

pub struct KnowledgeSource {
    llm: Arc<dyn LlmClient>,
    max_tokens: u32,
    query_delay: Duration,
}

impl KnowledgeSource {
    pub fn new(llm: Arc<dyn LlmClient>, max_tokens: u32) -> Self {
        Self {
            llm,
            max_tokens,
            query_delay: Duration::from_millis(300),
        }
    }

    #[cfg(test)]
    fn without_delay(llm: Arc<dyn LlmClient>) -> Self {
        Self {
            llm,
            max_tokens: 200,
            query_delay: Duration::ZERO,
        }
    }

    fn usable_name(answer: &str) -> Option<String> {
        let name = extract::extract_name(answer)?;
        let lowered = name.to_lowercase();
        if lowered
            .split_whitespace()
            .any(|word| REFUSAL_WORDS.contains(&word))
        {
            return None;
        }
        Some(name)
    }
}

#[async_trait]
impl Source for KnowledgeSource {
    fn name(&self) -> &'static str {
        "AI Knowledge Mining"
    }

    fn min_interval(&self) -> Duration {
        Duration::from_millis(800)
    }

    async fn lookup(&self, query: &CompanyQuery) -> Result<LookupOutcome> {
        for prompt in prompts::knowledge_queries(&query.name) {
            let request = CompletionRequest::new(prompt.clone())
                .with_temperature(0.2)
                .with_max_tokens(self.max_tokens);

            let answer = match self.llm.complete(&request).await {
                Ok(answer) => answer,
                Err(e) => {
                    debug!("knowledge query failed: {:#}", e);
                    continue;
                }
            };

            if let Some(name) = Self::usable_name(&answer) {
                let record = CeoRecord::new(name, format!("AI Knowledge Mining - {}", prompt))
                    .with_title("Leadership")
                    .with_confidence(Confidence::Medium);
                return Ok(LookupOutcome::Found(record));
            }

            sleep(self.query_delay).await;
        }

        Ok(LookupOutcome::not_found("no names surfaced from model memory"))
    }
}
