use anyhow::{bail, Result};
use serde::{Deserialize, Serialize};
use std::env;
use std::fs;
use std::path::Path;
use tracing::debug;

use crate::util::SecretString;

#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct Config {
    #[serde(default)]
    pub llm: LlmConfig,
    #[serde(default)]
    pub enrichment: EnrichmentConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LlmConfig {
    /// Model used for OpenAI calls (aggressive extraction, knowledge mining,
    /// LinkedIn URL guessing)
    #[serde(default = "default_openai_model")]
    pub openai_model: String,

    /// Model used for Anthropic calls when ANTHROPIC_API_KEY is present
    #[serde(default = "default_anthropic_model")]
    pub anthropic_model: String,

    /// Model used for Gemini calls when GEMINI_API_KEY is present
    #[serde(default = "default_gemini_model")]
    pub gemini_model: String,

    /// Optional: Override max_tokens for LLM requests.
    /// If not specified, uses provider-specific defaults:
    /// - openai: 400
    /// - anthropic: 300
    /// - gemini: 300
    #[serde(default)]
    pub max_tokens: Option<u32>,

    /// HTTP timeout for LLM requests in seconds (default: 60)
    #[serde(default = "default_llm_timeout")]
    pub timeout_secs: u64,
}

impl LlmConfig {
    /// Get max_tokens value, using provider-specific default if not specified
    pub fn get_max_tokens(&self, provider: &str) -> u32 {
        if let Some(tokens) = self.max_tokens {
            return tokens;
        }

        // Provider-specific defaults sized for short extraction replies
        match provider {
            "openai" => 400,
            "anthropic" => 300,
            "gemini" => 300,
            _ => 400,
        }
    }
}

impl Default for LlmConfig {
    fn default() -> Self {
        Self {
            openai_model: default_openai_model(),
            anthropic_model: default_anthropic_model(),
            gemini_model: default_gemini_model(),
            max_tokens: None,
            timeout_secs: default_llm_timeout(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EnrichmentConfig {
    /// Persist the working table every N processed rows (default: 3)
    #[serde(default = "default_save_every")]
    pub save_every: usize,

    /// Fixed delay between rows in milliseconds (default: 1000)
    #[serde(default = "default_row_delay")]
    pub row_delay_ms: u64,

    /// HTTP timeout for website scraping in seconds (default: 12)
    #[serde(default = "default_scrape_timeout")]
    pub scrape_timeout_secs: u64,

    /// Cap on scraped website text passed into prompts (default: 8000)
    #[serde(default = "default_max_site_chars")]
    pub max_site_chars: usize,
}

impl Default for EnrichmentConfig {
    fn default() -> Self {
        Self {
            save_every: default_save_every(),
            row_delay_ms: default_row_delay(),
            scrape_timeout_secs: default_scrape_timeout(),
            max_site_chars: default_max_site_chars(),
        }
    }
}

fn default_openai_model() -> String {
    "gpt-4o-mini".to_string()
}

fn default_anthropic_model() -> String {
    "claude-3-5-haiku-latest".to_string()
}

fn default_gemini_model() -> String {
    "gemini-1.5-flash".to_string()
}

fn default_llm_timeout() -> u64 {
    60
}

fn default_save_every() -> usize {
    3
}

fn default_row_delay() -> u64 {
    1000
}

fn default_scrape_timeout() -> u64 {
    12
}

fn default_max_site_chars() -> usize {
    8000
}

impl Config {
    /// Load config from repo root or user config directory
    #[allow(dead_code)]
    pub fn load() -> Result<Self> {
        Self::load_with_path(None)
    }

    /// Load configuration from a specific path, or use default search paths
    pub fn load_with_path(path: Option<String>) -> Result<Self> {
        // If explicit path provided, use it
        if let Some(config_path) = path {
            debug!("Loading config from explicit path: {}", config_path);
            return Self::load_from_path(&config_path);
        }

        // Try repo root first (per-repo config)
        if let Ok(config) = Self::load_from_path("execfind.toml") {
            debug!("Loaded config from ./execfind.toml");
            return Ok(config);
        }

        // Try user config directory
        if let Some(config_dir) = dirs::config_dir() {
            let config_path = config_dir.join("execfind").join("config.toml");
            if let Ok(config) = Self::load_from_path(&config_path) {
                debug!("Loaded config from {:?}", config_path);
                return Ok(config);
            }
        }

        debug!("Using default config");
        Ok(Self::default())
    }

    fn load_from_path<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = fs::read_to_string(path)?;
        let config: Config = toml::from_str(&content)?;
        Ok(config)
    }
}

/// API credentials pulled from the environment. Only the OpenAI key is
/// mandatory; everything else widens the cascade when present.
#[derive(Debug, Clone)]
pub struct ApiKeys {
    pub openai: SecretString,
    pub anthropic: Option<SecretString>,
    pub gemini: Option<SecretString>,
    pub google_search: Option<GoogleSearchKeys>,
    pub hunter: Option<SecretString>,
    pub apollo: Option<SecretString>,
    pub rocketreach: Option<SecretString>,
}

#[derive(Debug, Clone)]
pub struct GoogleSearchKeys {
    pub api_key: SecretString,
    pub engine_id: String,
}

fn optional_key(var: &str) -> Option<SecretString> {
    env::var(var).ok().filter(|v| !v.is_empty()).map(Into::into)
}

impl ApiKeys {
    /// Load credentials from the environment. Startup halts when the primary
    /// OpenAI key is absent; optional keys are logged and skipped.
    pub fn from_env() -> Result<Self> {
        let openai = match env::var("OPENAI_API_KEY") {
            Ok(v) if !v.is_empty() => SecretString::new(v),
            _ => bail!("OPENAI_API_KEY not set; add it to the environment or a .env file"),
        };

        let google_search = match (
            optional_key("GOOGLE_SEARCH_API_KEY"),
            env::var("GOOGLE_SEARCH_CX").ok().filter(|v| !v.is_empty()),
        ) {
            (Some(api_key), Some(engine_id)) => Some(GoogleSearchKeys { api_key, engine_id }),
            _ => None,
        };

        let keys = Self {
            openai,
            anthropic: optional_key("ANTHROPIC_API_KEY"),
            gemini: optional_key("GEMINI_API_KEY"),
            google_search,
            hunter: optional_key("HUNTER_API_KEY"),
            apollo: optional_key("APOLLO_API_KEY"),
            rocketreach: optional_key("ROCKETREACH_API_KEY"),
        };

        debug!("Loaded {} API credentials", keys.active_count());
        Ok(keys)
    }

    /// Number of credentials actually present
    pub fn active_count(&self) -> usize {
        1 + [
            self.anthropic.is_some(),
            self.gemini.is_some(),
            self.google_search.is_some(),
            self.hunter.is_some(),
            self.apollo.is_some(),
            self.rocketreach.is_some(),
        ]
        .iter()
        .filter(|b| **b)
        .count()
    }

    pub fn has_contact_api(&self) -> bool {
        self.hunter.is_some() || self.apollo.is_some() || self.rocketreach.is_some()
    }
}
