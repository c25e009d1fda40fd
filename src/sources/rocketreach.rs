use anyhow::{bail, Context, Result};
use async_trait::async_trait;
use reqwest::Client;
use serde::Deserialize;
use std::time::Duration;
use tracing::debug;

use super::{CeoRecord, CompanyQuery, Confidence, LookupOutcome, Source, LEADERSHIP_TITLES};
use crate::util::SecretString;

/// RocketReach profile search; unlike Apollo the title filtering happens
/// client-side over the returned profiles.
pub struct RocketReachSource {
    api_key: SecretString,
    base_url: String,
    client: Client,
}

#[derive(Debug, Deserialize)]
struct RocketReachResponse {
    #[serde(default)]
    profiles: Vec<RocketReachProfile>,
}

#[derive(Debug, Deserialize)]
struct RocketReachProfile {
    #[serde(default)]
    name: String,
    #[serde(default)]
    current_title: String,
    #[serde(default)]
    email: String,
    #[serde(default)]
    linkedin_url: String,
}

impl RocketReachSource {
    pub fn new(api_key: SecretString) -> Result<Self> {
        Self::with_base_url(api_key, "https://api.rocketreach.co".to_string())
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
impl Source for RocketReachSource {
    fn name(&self) -> &'static str {
        "RocketReach"
    }

    fn min_interval(&self) -> Duration {
        Duration::from_secs(2)
    }

    async fn lookup(&self, query: &CompanyQuery) -> Result<LookupOutcome> {
        debug!("RocketReach search: {}", query.name);

        let search = format!("{} CEO", query.name);
        let response = self
            .client
            .get(format!("{}/v2/api/search", self.base_url))
            .header("Api-Key", self.api_key.expose())
            .query(&[("query", search.as_str()), ("start", "0"), ("size", "10")])
            .send()
            .await
            .context("Failed to send RocketReach request")?;

        if !response.status().is_success() {
            bail!("RocketReach API error {}", response.status());
        }

        let body: RocketReachResponse = response
            .json()
            .await
            .context("Failed to parse RocketReach response")?;

        for profile in body.profiles {
            let title = profile.current_title.to_lowercase();
            if !profile.name.trim().is_empty()
                && LEADERSHIP_TITLES.iter().any(|t| title.contains(t))
            {
                let record = CeoRecord::new(profile.name.trim(), self.name())
                    .with_title(if profile.current_title.is_empty() {
                        "CEO".to_string()
                    } else {
                        profile.current_title
                    })
                    .with_email(profile.email)
                    .with_linkedin(profile.linkedin_url)
                    .with_confidence(Confidence::High);
                return Ok(LookupOutcome::Found(record));
            }
        }

        Ok(LookupOutcome::not_found(
            "RocketReach - no leadership profile",
        ))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn source_for(server: &mockito::Server) -> RocketReachSource {
        RocketReachSource::with_base_url(SecretString::new("k".to_string()), server.url()).unwrap()
    }

    #[tokio::test]
    async fn test_rocketreach_filters_by_title() {
        let mut server = mockito::Server::new_async().await;
        server
            .mock("GET", "/v2/api/search")
            .match_query(mockito::Matcher::Any)
            .with_status(200)
            .with_body(
                r#"{"profiles": [
                    {"name": "Sam Sales", "current_title": "Account Executive"},
                    {"name": "Ana Petrova", "current_title": "President & CEO", "linkedin_url": "https://linkedin.com/in/ana-petrova"}
                ]}"#,
            )
            .create_async()
            .await;

        let source = source_for(&server);
        let outcome = source.lookup(&CompanyQuery::new("Acme")).await.unwrap();

        let LookupOutcome::Found(record) = outcome else {
            panic!("expected Found, got {:?}", outcome);
        };
        assert_eq!(record.name, "Ana Petrova");
        assert_eq!(record.title, "President & CEO");
    }

    #[tokio::test]
    async fn test_rocketreach_no_matching_title() {
        let mut server = mockito::Server::new_async().await;
        server
            .mock("GET", "/v2/api/search")
            .match_query(mockito::Matcher::Any)
            .with_status(200)
            .with_body(r#"{"profiles": [{"name": "Sam Sales", "current_title": "Account Executive"}]}"#)
            .create_async()
            .await;

        let source = source_for(&server);
        let outcome = source.lookup(&CompanyQuery::new("Acme")).await.unwrap();
        assert!(matches!(outcome, LookupOutcome::NotFound { .. }));
    }
}
