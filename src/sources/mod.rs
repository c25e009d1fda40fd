//! Enrichment sources and the ordered lookup cascade
//!
//! Each source is one way of finding a company's chief executive: contact
//! databases (Hunter, Apollo, RocketReach), LLM extraction over gathered web
//! context, and knowledge-only LLM queries. The cascade tries them in priority
//! order and stops at the first result that passes the validity check.

pub mod apollo;
pub mod cascade;
pub mod hunter;
pub mod knowledge;
pub mod llm_search;
pub mod rocketreach;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use std::time::Duration;

pub use cascade::Cascade;

/// Title substrings that identify a chief-executive-like position in
/// contact-database results.
pub(crate) const LEADERSHIP_TITLES: &[&str] =
    &["ceo", "chief executive", "president", "founder", "owner"];

/// One company row's lookup inputs.
#[derive(Debug, Clone)]
pub struct CompanyQuery {
    pub name: String,
    pub website: Option<String>,
    pub linkedin: Option<String>,
}

impl CompanyQuery {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            website: None,
            linkedin: None,
        }
    }

    pub fn with_website(mut self, url: impl Into<String>) -> Self {
        self.website = Some(url.into());
        self
    }

    pub fn with_linkedin(mut self, url: impl Into<String>) -> Self {
        self.linkedin = Some(url.into());
        self
    }
}

/// Confidence tier attached to a found record.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Confidence {
    High,
    Medium,
    Low,
}

impl fmt::Display for Confidence {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Confidence::High => write!(f, "high"),
            Confidence::Medium => write!(f, "medium"),
            Confidence::Low => write!(f, "low"),
        }
    }
}

impl FromStr for Confidence {
    type Err = ();

    /// Lenient: anything unrecognized is treated as low confidence, since
    /// model output is free text.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "high" => Ok(Confidence::High),
            "medium" => Ok(Confidence::Medium),
            _ => Ok(Confidence::Low),
        }
    }
}

/// A chief-executive record produced by one source.
#[derive(Debug, Clone, PartialEq)]
pub struct CeoRecord {
    pub name: String,
    pub title: String,
    pub email: String,
    pub linkedin: String,
    pub confidence: Confidence,
    pub source: String,
}

impl CeoRecord {
    pub fn new(name: impl Into<String>, source: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            title: String::new(),
            email: String::new(),
            linkedin: String::new(),
            confidence: Confidence::Low,
            source: source.into(),
        }
    }

    pub fn with_title(mut self, title: impl Into<String>) -> Self {
        self.title = title.into();
        self
    }

    pub fn with_email(mut self, email: impl Into<String>) -> Self {
        self.email = email.into();
        self
    }

    pub fn with_linkedin(mut self, linkedin: impl Into<String>) -> Self {
        self.linkedin = linkedin.into();
        self
    }

    pub fn with_confidence(mut self, confidence: Confidence) -> Self {
        self.confidence = confidence;
        self
    }
}

/// Tagged outcome of one enrichment attempt against one source.
#[derive(Debug, Clone, PartialEq)]
pub enum LookupOutcome {
    Found(CeoRecord),
    NotFound { reason: String },
    Failed { reason: String },
}

impl LookupOutcome {
    pub fn not_found(reason: impl Into<String>) -> Self {
        LookupOutcome::NotFound {
            reason: reason.into(),
        }
    }

    pub fn failed(reason: impl Into<String>) -> Self {
        LookupOutcome::Failed {
            reason: reason.into(),
        }
    }

    pub fn is_found(&self) -> bool {
        matches!(self, LookupOutcome::Found(_))
    }
}

/// One enrichment provider in the cascade.
#[async_trait]
pub trait Source: Send + Sync {
    /// Stable label used for logging, rate limiting, and the `source` column
    fn name(&self) -> &'static str;

    /// Minimum interval between consecutive calls to this source
    fn min_interval(&self) -> Duration {
        Duration::from_secs(1)
    }

    /// Attempt one lookup. Errors are degraded to `Failed` by the cascade.
    async fn lookup(&self, query: &CompanyQuery) -> anyhow::Result<LookupOutcome>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_confidence_roundtrip() {
        assert_eq!("high".parse::<Confidence>().unwrap(), Confidence::High);
        assert_eq!("Medium".parse::<Confidence>().unwrap(), Confidence::Medium);
        assert_eq!(Confidence::Low.to_string(), "low");
    }

    #[test]
    fn test_confidence_lenient_parse() {
        // Model output is free text; anything odd degrades to low
        assert_eq!("certain".parse::<Confidence>().unwrap(), Confidence::Low);
        assert_eq!("".parse::<Confidence>().unwrap(), Confidence::Low);
    }

    #[test]
    fn test_record_builder() {
        let record = CeoRecord::new("Jane Maxwell", "Hunter.io")
            .with_title("CEO")
            .with_email("jane@acme.com")
            .with_confidence(Confidence::High);
        assert_eq!(record.name, "Jane Maxwell");
        assert_eq!(record.title, "CEO");
        assert_eq!(record.email, "jane@acme.com");
        assert_eq!(record.confidence, Confidence::High);
        assert_eq!(record.source, "Hunter.io");
        assert!(record.linkedin.is_empty());
    }

    #[test]
    fn test_outcome_constructors() {
        assert!(!LookupOutcome::not_found("nothing").is_found());
        assert!(!LookupOutcome::failed("boom").is_found());
        assert!(LookupOutcome::Found(CeoRecord::new("A B", "x")).is_found());
    }
}
