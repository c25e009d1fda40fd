//! Batch enrichment driver
//!
//! Processes the table row by row, saving incrementally so an interrupted run
//! loses at most a handful of lookups. Progress is reported over a channel so
//! the CLI can print without the driver knowing about terminals.

use anyhow::{Context, Result};
use clap::ValueEnum;
use std::path::PathBuf;
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::Duration;
use tokio::sync::mpsc::UnboundedSender;
use tokio::time::sleep;
use tracing::{info, warn};

use crate::sources::{Cascade, LookupOutcome};
use crate::table::Dataset;
use crate::web::LinkedInFinder;

/// Which rows a run picks up.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, ValueEnum)]
pub enum ResumeMode {
    /// Only rows without a usable result; "Not found" markers are retried
    #[default]
    Missing,
    /// Skip the already-enriched head of the file, then behave like missing
    Continue,
    /// Every row, overwriting previous results
    Full,
}

pub struct RunSettings {
    pub mode: ResumeMode,
    pub save_every: usize,
    pub row_delay: Duration,
    pub output: PathBuf,
}

/// One progress report from the driver to whoever is watching.
#[derive(Debug)]
pub enum ProgressEvent {
    RowStarted {
        position: usize,
        total: usize,
        company: String,
    },
    RowFinished {
        company: String,
        found: Option<String>,
        source: String,
    },
    Saved {
        processed: usize,
    },
    Finished {
        attempted: usize,
        succeeded: usize,
    },
}

fn select_rows(dataset: &Dataset, mode: ResumeMode) -> Vec<usize> {
    match mode {
        ResumeMode::Full => (0..dataset.len()).collect(),
        ResumeMode::Missing => (0..dataset.len())
            .filter(|&row| !dataset.has_valid_result(row))
            .collect(),
        ResumeMode::Continue => {
            let start = (0..dataset.len())
                .find(|&row| !dataset.has_valid_result(row))
                .unwrap_or(dataset.len());
            (start..dataset.len())
                .filter(|&row| !dataset.has_valid_result(row))
                .collect()
        }
    }
}

/// Run the cascade over every selected row, saving every `save_every`
/// processed rows and once more at the end. A set `cancel` flag stops the run
/// at the next row boundary; progress already saved stays saved.
pub async fn run(
    dataset: &mut Dataset,
    cascade: &Cascade,
    linkedin: Option<&LinkedInFinder>,
    settings: &RunSettings,
    cancel: &AtomicBool,
    progress: &UnboundedSender<ProgressEvent>,
) -> Result<(usize, usize)> {
    let rows = select_rows(dataset, settings.mode);
    let total = rows.len();
    info!(
        "Processing {} of {} rows ({:?} mode) via {:?}",
        total,
        dataset.len(),
        settings.mode,
        cascade.source_names()
    );

    let mut attempted = 0;
    let mut succeeded = 0;
    let mut since_save = 0;

    for (position, &row) in rows.iter().enumerate() {
        if cancel.load(Ordering::SeqCst) {
            warn!("Cancelled; stopping after {} rows", attempted);
            break;
        }

        let Some(query) = dataset.query(row) else {
            continue;
        };
        let company = query.name.clone();
        let _ = progress.send(ProgressEvent::RowStarted {
            position: position + 1,
            total,
            company: company.clone(),
        });

        attempted += 1;
        match cascade.lookup(&query).await {
            LookupOutcome::Found(record) => {
                succeeded += 1;
                let _ = progress.send(ProgressEvent::RowFinished {
                    company: company.clone(),
                    found: Some(record.name.clone()),
                    source: record.source.clone(),
                });
                dataset.apply(row, &record);
                if record.linkedin.is_empty() {
                    if let Some(finder) = linkedin {
                        let url = finder.find(&record.name, &company).await;
                        if !url.is_empty() {
                            dataset.set_linkedin(row, url);
                        }
                    }
                }
            }
            LookupOutcome::NotFound { reason } | LookupOutcome::Failed { reason } => {
                dataset.mark_not_found(row);
                let _ = progress.send(ProgressEvent::RowFinished {
                    company,
                    found: None,
                    source: reason,
                });
            }
        }

        since_save += 1;
        if since_save >= settings.save_every {
            dataset
                .save(&settings.output)
                .with_context(|| format!("incremental save to {}", settings.output.display()))?;
            let _ = progress.send(ProgressEvent::Saved {
                processed: attempted,
            });
            since_save = 0;
        }

        if position + 1 < total && !settings.row_delay.is_zero() {
            sleep(settings.row_delay).await;
        }
    }

    dataset
        .save(&settings.output)
        .with_context(|| format!("final save to {}", settings.output.display()))?;
    let _ = progress.send(ProgressEvent::Finished {
        attempted,
        succeeded,
    });

    Ok((attempted, succeeded))
}
