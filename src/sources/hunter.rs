use anyhow::{bail, Context, Result};
use async_trait::async_trait;
use reqwest::Client;
use serde::Deserialize;
use std::time::Duration;
use tracing::debug;

use super::{CeoRecord, CompanyQuery, Confidence, LookupOutcome, Source, LEADERSHIP_TITLES};
use crate::util::{domain_of, SecretString};

/// Hunter.io domain search: finds named email contacts for a company domain
/// and picks the one with a leadership position.
pub struct HunterSource {
    api_key: SecretString,
    base_url: String,
    client: Client,
}

#[derive(Debug, Deserialize)]
struct HunterResponse {
    #[serde(default)]
    data: HunterData,
}

#[derive(Debug, Deserialize, Default)]
struct HunterData {
    #[serde(default)]
    emails: Vec<HunterEmail>,
}

#[derive(Debug, Deserialize)]
struct HunterEmail {
    #[serde(default)]
    first_name: String,
    #[serde(default)]
    last_name: String,
    #[serde(default)]
    position: String,
    #[serde(default, rename = "value")]
    email: String,
}

impl HunterSource {
    pub fn new(api_key: SecretString) -> Result<Self> {
        Self::with_base_url(api_key, "https://api.hunter.io".to_string())
    }

    pub fn with_base_url(api_key: SecretString, base_url: String) -> Result<Self> {
        Ok(Self {
            api_key,
            base_url,
            client: Client::builder()
                .timeout(Duration::from_secs(15))
                .build()
                .context("failed to build HTTP client")?,
        })
    }
}

#[async_trait]
impl Source for HunterSource {
    fn name(&self) -> &'static str {
        "Hunter.io"
    }

    fn min_interval(&self) -> Duration {
        Duration::from_secs(2)
    }

    async fn lookup(&self, query: &CompanyQuery) -> Result<LookupOutcome> {
        // Hunter is keyed by domain; nothing to do without a website
        let Some(ref website) = query.website else {
            return Ok(LookupOutcome::not_found("Hunter.io - no website URL"));
        };
        let domain = domain_of(website);
        if domain.is_empty() {
            return Ok(LookupOutcome::not_found("Hunter.io - unusable website URL"));
        }

        debug!("Hunter.io domain search: {}", domain);

        let response = self
            .client
            .get(format!("{}/v2/domain-search", self.base_url))
            .query(&[
                ("domain", domain.as_str()),
                ("api_key", self.api_key.expose()),
                ("limit", "50"),
            ])
            .send()
            .await
            .context("Failed to send Hunter.io request")?;

        if !response.status().is_success() {
            bail!("Hunter.io API error {}", response.status());
        }

        let body: HunterResponse = response
            .json()
            .await
            .context("Failed to parse Hunter.io response")?;

        for email in body.data.emails {
            let position = email.position.to_lowercase();
            if LEADERSHIP_TITLES.iter().any(|t| position.contains(t)) {
                let name = format!("{} {}", email.first_name, email.last_name)
                    .trim()
                    .to_string();
                let record = CeoRecord::new(name, self.name())
                    .with_title(if email.position.is_empty() {
                        "CEO".to_string()
                    } else {
                        email.position
                    })
                    .with_email(email.email)
                    .with_confidence(Confidence::High);
                return Ok(LookupOutcome::Found(record));
            }
        }

        Ok(LookupOutcome::not_found("Hunter.io - no leadership contact"))
    }
}
