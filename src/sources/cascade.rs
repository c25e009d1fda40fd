//! Ordered lookup cascade
//!
//! Sources run in priority order: contact databases first, then LLM
//! extraction over web context, knowledge mining last. A source error never
//! stops the cascade; the row just moves on to the next source.

use tracing::{debug, info, warn};

use super::{CompanyQuery, LookupOutcome, Source};
use crate::extract;
use crate::ratelimit::RateLimiter;

pub struct Cascade {
    sources: Vec<Box<dyn Source>>,
    limiter: RateLimiter,
}

impl Cascade {
    pub fn new(sources: Vec<Box<dyn Source>>) -> Self {
        Self {
            sources,
            limiter: RateLimiter::new(),
        }
    }

    pub fn len(&self) -> usize {
        self.sources.len()
    }

    pub fn is_empty(&self) -> bool {
        self.sources.is_empty()
    }

    pub fn source_names(&self) -> Vec<&'static str> {
        self.sources.iter().map(|s| s.name()).collect()
    }

    /// Run the cascade for one company. Returns the first `Found` whose name
    /// passes the validity check; `NotFound` once every source has been tried.
    pub async fn lookup(&self, query: &CompanyQuery) -> LookupOutcome {
        for source in &self.sources {
            self.limiter.wait(source.name(), source.min_interval()).await;
            debug!("Trying {} for {:?}", source.name(), query.name);

            let outcome = match source.lookup(query).await {
                Ok(outcome) => outcome,
                Err(e) => {
                    warn!("{} failed for {:?}: {:#}", source.name(), query.name, e);
                    LookupOutcome::failed(format!("{:#}", e))
                }
            };

            match outcome {
                LookupOutcome::Found(record) => {
                    if extract::is_valid_name(&record.name) {
                        info!(
                            "Found {} for {:?} via {}",
                            record.name, query.name, record.source
                        );
                        return LookupOutcome::Found(record);
                    }
                    debug!(
                        "{} returned unusable name {:?}, continuing",
                        source.name(),
                        record.name
                    );
                }
                LookupOutcome::NotFound { reason } => {
                    debug!("{}: {}", source.name(), reason);
                }
                LookupOutcome::Failed { reason } => {
                    debug!("{} errored: {}", source.name(), reason);
                }
            }
        }

        LookupOutcome::not_found("all sources exhausted")
    }
}
