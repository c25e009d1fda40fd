use anyhow::Result;
use std::sync::Arc;

use super::client::{LlmClient, MockLlmClient};
use super::providers::{AnthropicClient, GeminiClient, OpenAIClient};
use crate::config::{ApiKeys, LlmConfig};

/// Primary client: always OpenAI (the mandatory credential). Used for
/// aggressive extraction, knowledge mining, and LinkedIn URL guessing.
pub fn primary_client(
    keys: &ApiKeys,
    config: &LlmConfig,
    dry_run: bool,
) -> Result<Arc<dyn LlmClient>> {
    if dry_run {
        return Ok(Arc::new(MockLlmClient::new()));
    }
    Ok(Arc::new(OpenAIClient::new(
        keys.openai.clone(),
        config.openai_model.clone(),
        config.timeout_secs,
    )?))
}

/// Anthropic client, present only when its credential is set.
pub fn anthropic_client(
    keys: &ApiKeys,
    config: &LlmConfig,
    dry_run: bool,
) -> Result<Option<Arc<dyn LlmClient>>> {
    let Some(ref api_key) = keys.anthropic else {
        return Ok(None);
    };
    if dry_run {
        return Ok(Some(Arc::new(MockLlmClient::new())));
    }
    Ok(Some(Arc::new(AnthropicClient::new(
        api_key.clone(),
        config.anthropic_model.clone(),
        config.timeout_secs,
    )?)))
}

/// Gemini client, present only when its credential is set.
pub fn gemini_client(
    keys: &ApiKeys,
    config: &LlmConfig,
    dry_run: bool,
) -> Result<Option<Arc<dyn LlmClient>>> {
    let Some(ref api_key) = keys.gemini else {
        return Ok(None);
    };
    if dry_run {
        return Ok(Some(Arc::new(MockLlmClient::new())));
    }
    Ok(Some(Arc::new(GeminiClient::new(
        api_key.clone(),
        config.gemini_model.clone(),
        config.timeout_secs,
    )?)))
}
