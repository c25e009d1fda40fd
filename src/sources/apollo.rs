use anyhow::{bail, Context, Result};
use async_trait::async_trait;
use reqwest::Client;
use serde::Deserialize;
use serde_json::json;
use std::time::Duration;
use tracing::debug;

use super::{CeoRecord, CompanyQuery, Confidence, LookupOutcome, Source};
use crate::util::SecretString;

/// Apollo.io people search filtered to leadership titles.
pub struct ApolloSource {
    api_key: SecretString,
    base_url: String,
    client: Client,
}

#[derive(Debug, Deserialize)]
struct ApolloResponse {
    #[serde(default)]
    people: Vec<ApolloPerson>,
}

#[derive(Debug, Deserialize)]
struct ApolloPerson {
    #[serde(default)]
    name: String,
    #[serde(default)]
    title: String,
    #[serde(default)]
    email: String,
    #[serde(default)]
    linkedin_url: String,
}

impl ApolloSource {
    pub fn new(api_key: SecretString) -> Result<Self> {
        Self::with_base_url(api_key, "https://api.apollo.io".to_string())
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
impl Source for ApolloSource {
    fn name(&self) -> &'static str {
        "Apollo.io"
    }

    fn min_interval(&self) -> Duration {
        Duration::from_secs(2)
    }

    async fn lookup(&self, query: &CompanyQuery) -> Result<LookupOutcome> {
        debug!("Apollo.io people search: {}", query.name);

        let payload = json!({
            "q_organization_name": query.name,
            "page": 1,
            "per_page": 10,
            "person_titles": [
                "CEO",
                "Chief Executive Officer",
                "President",
                "Founder",
                "Co-Founder",
                "Owner",
                "Managing Director"
            ],
        });

        let response = self
            .client
            .post(format!("{}/v1/mixed_people/search", self.base_url))
            .header("X-Api-Key", self.api_key.expose())
            .header("Cache-Control", "no-cache")
            .json(&payload)
            .send()
            .await
            .context("Failed to send Apollo.io request")?;

        if !response.status().is_success() {
            bail!("Apollo.io API error {}", response.status());
        }

        let body: ApolloResponse = response
            .json()
            .await
            .context("Failed to parse Apollo.io response")?;

        // Titles were filtered server-side; the first hit is the best one
        match body.people.into_iter().next() {
            Some(person) if !person.name.trim().is_empty() => {
                let record = CeoRecord::new(person.name.trim(), self.name())
                    .with_title(if person.title.is_empty() {
                        "CEO".to_string()
                    } else {
                        person.title
                    })
                    .with_email(person.email)
                    .with_linkedin(person.linkedin_url)
                    .with_confidence(Confidence::High);
                Ok(LookupOutcome::Found(record))
            }
            _ => Ok(LookupOutcome::not_found("Apollo.io - no people matched")),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn source_for(server: &mockito::Server) -> ApolloSource {
        ApolloSource::with_base_url(SecretString::new("k".to_string()), server.url()).unwrap()
    }

    #[tokio::test]
    async fn test_apollo_takes_first_person() {
        let mut server = mockito::Server::new_async().await;
        server
            .mock("POST", "/v1/mixed_people/search")
            .match_header("x-api-key", "k")
            .with_status(200)
            .with_body(
                r#"{"people": [
                    {"name": "Omar Diaz", "title": "Founder", "email": "omar@acme.com", "linkedin_url": "https://linkedin.com/in/omar-diaz"},
                    {"name": "Someone Else", "title": "President"}
                ]}"#,
            )
            .create_async()
            .await;

        let source = source_for(&server);
        let outcome = source.lookup(&CompanyQuery::new("Acme")).await.unwrap();

        let LookupOutcome::Found(record) = outcome else {
            panic!("expected Found, got {:?}", outcome);
        };
        assert_eq!(record.name, "Omar Diaz");
        assert_eq!(record.title, "Founder");
        assert_eq!(record.linkedin, "https://linkedin.com/in/omar-diaz");
        assert_eq!(record.confidence, Confidence::High);
    }

    #[tokio::test]
    async fn test_apollo_empty_people() {
        let mut server = mockito::Server::new_async().await;
        server
            .mock("POST", "/v1/mixed_people/search")
            .with_status(200)
            .with_body(r#"{"people": []}"#)
            .create_async()
            .await;

        let source = source_for(&server);
        let outcome = source.lookup(&CompanyQuery::new("Acme")).await.unwrap();
        assert!(matches!(outcome, LookupOutcome::NotFound { .. }));
    }

    #[tokio::test]
    async fn test_apollo_server_error_is_err() {
        let mut server = mockito::Server::new_async().await;
        server
            .mock("POST", "/v1/mixed_people/search")
            .with_status(500)
            .create_async()
            .await;

        let source = source_for(&server);
        assert!(source.lookup(&CompanyQuery::new("Acme")).await.is_err());
    }
}
