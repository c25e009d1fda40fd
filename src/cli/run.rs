use anyhow::{Context, Result};
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::mpsc;
use tracing::{info, warn};

use crate::config::{ApiKeys, Config};
use crate::llm::factory;
use crate::report::Summary;
use crate::runner::{self, ProgressEvent, ResumeMode, RunSettings};
use crate::sources::knowledge::KnowledgeSource;
use crate::sources::llm_search::{LlmSource, SourceFlavor};
use crate::sources::{apollo::ApolloSource, hunter::HunterSource, rocketreach::RocketReachSource};
use crate::sources::{Cascade, Source};
use crate::table::Dataset;
use crate::util::SecretString;
use crate::web::scrape::ScrapeSettings;
use crate::web::{DuckDuckGo, GoogleSearch, LinkedInFinder};

/// Default output path: `<input stem>_with_ceos.csv` next to the input.
fn default_output(input: &Path) -> PathBuf {
    let stem = input
        .file_stem()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_else(|| "output".to_string());
    input.with_file_name(format!("{}_with_ceos.csv", stem))
}

fn dry_run_keys() -> ApiKeys {
    ApiKeys {
        openai: SecretString::new("dry-run".to_string()),
        anthropic: None,
        gemini: None,
        google_search: None,
        hunter: None,
        apollo: None,
        rocketreach: None,
    }
}

/// Assemble the cascade in priority order from whichever credentials exist.
/// In dry-run mode only the knowledge source runs, against the mock client.
fn build_cascade(keys: &ApiKeys, config: &Config, dry_run: bool) -> Result<Cascade> {
    let mut sources: Vec<Box<dyn Source>> = Vec::new();
    let openai = factory::primary_client(keys, &config.llm, dry_run)?;

    if dry_run {
        sources.push(Box::new(KnowledgeSource::new(
            openai,
            config.llm.get_max_tokens("openai"),
        )));
        return Ok(Cascade::new(sources));
    }

    if let Some(ref key) = keys.hunter {
        sources.push(Box::new(HunterSource::new(key.clone())?));
    }
    if let Some(ref key) = keys.apollo {
        sources.push(Box::new(ApolloSource::new(key.clone())?));
    }
    if let Some(ref key) = keys.rocketreach {
        sources.push(Box::new(RocketReachSource::new(key.clone())?));
    }

    let google = match keys.google_search {
        Some(ref gs) => Some(Arc::new(GoogleSearch::new(gs)?)),
        None => None,
    };
    let ddg = Arc::new(DuckDuckGo::new()?);
    let scrape = ScrapeSettings {
        timeout_secs: config.enrichment.scrape_timeout_secs,
        max_chars: config.enrichment.max_site_chars,
    };

    if let Some(anthropic) = factory::anthropic_client(keys, &config.llm, dry_run)? {
        sources.push(Box::new(LlmSource::new(
            SourceFlavor::Researcher,
            anthropic,
            google.clone(),
            ddg.clone(),
            scrape.clone(),
            config.llm.get_max_tokens("anthropic"),
        )));
    }

    sources.push(Box::new(LlmSource::new(
        SourceFlavor::Aggressive,
        openai.clone(),
        google.clone(),
        ddg.clone(),
        scrape.clone(),
        config.llm.get_max_tokens("openai"),
    )));

    if let Some(gemini) = factory::gemini_client(keys, &config.llm, dry_run)? {
        sources.push(Box::new(LlmSource::new(
            SourceFlavor::Generative,
            gemini,
            google,
            ddg,
            scrape,
            config.llm.get_max_tokens("gemini"),
        )));
    }

    sources.push(Box::new(KnowledgeSource::new(
        openai,
        config.llm.get_max_tokens("openai"),
    )));

    Ok(Cascade::new(sources))
}

pub async fn run(
    input: String,
    output: Option<String>,
    mode: ResumeMode,
    save_every: Option<usize>,
    config_path: Option<String>,
    model_override: Option<String>,
    dry_run: bool,
) -> Result<()> {
    dotenvy::dotenv().ok();

    let mut config = Config::load_with_path(config_path)?;
    if let Some(model) = model_override {
        config.llm.openai_model = model;
    }
    if let Some(n) = save_every {
        config.enrichment.save_every = n.max(1);
    }

    let keys = if dry_run {
        dry_run_keys()
    } else {
        ApiKeys::from_env()?
    };

    let input_path = PathBuf::from(&input);
    let output_path = output.map(PathBuf::from).unwrap_or_else(|| default_output(&input_path));

    // Resume from the output file when one exists so prior results survive.
    let load_path = if output_path.exists() {
        info!("Resuming from existing output {}", output_path.display());
        &output_path
    } else {
        &input_path
    };
    let mut dataset = Dataset::load(load_path)
        .with_context(|| format!("loading {}", load_path.display()))?;

    let cascade = build_cascade(&keys, &config, dry_run)?;
    info!(
        "Cascade: {:?} ({} credentials)",
        cascade.source_names(),
        keys.active_count()
    );
    if !keys.has_contact_api() && !dry_run {
        warn!("No contact-database credentials; relying on model extraction only");
    }

    let linkedin = if dry_run {
        None
    } else {
        let google = match keys.google_search {
            Some(ref gs) => Some(Arc::new(GoogleSearch::new(gs)?)),
            None => None,
        };
        Some(LinkedInFinder::new(
            google,
            Arc::new(DuckDuckGo::new()?),
            factory::primary_client(&keys, &config.llm, dry_run)?,
        ))
    };

    let settings = RunSettings {
        mode,
        save_every: config.enrichment.save_every,
        row_delay: Duration::from_millis(config.enrichment.row_delay_ms),
        output: output_path.clone(),
    };

    let cancel = Arc::new(AtomicBool::new(false));
    {
        let cancel = cancel.clone();
        tokio::spawn(async move {
            if tokio::signal::ctrl_c().await.is_ok() {
                eprintln!("\nInterrupted; finishing current row and saving...");
                cancel.store(true, Ordering::SeqCst);
            }
        });
    }

    let (tx, mut rx) = mpsc::unbounded_channel();
    let printer = tokio::spawn(async move {
        while let Some(event) = rx.recv().await {
            match event {
                ProgressEvent::RowStarted {
                    position,
                    total,
                    company,
                } => println!("[{}/{}] {}", position, total, company),
                ProgressEvent::RowFinished {
                    company,
                    found: Some(name),
                    source,
                } => println!("  {} -> {} ({})", company, name, source),
                ProgressEvent::RowFinished { company, .. } => {
                    println!("  {} -> not found", company)
                }
                ProgressEvent::Saved { processed } => {
                    println!("  saved after {} rows", processed)
                }
                ProgressEvent::Finished {
                    attempted,
                    succeeded,
                } => println!("Done: {}/{} lookups succeeded", succeeded, attempted),
            }
        }
    });

    let (attempted, succeeded) =
        runner::run(&mut dataset, &cascade, linkedin.as_ref(), &settings, &cancel, &tx).await?;
    drop(tx);
    printer.await.ok();

    info!(
        "Run complete: {} attempted, {} succeeded, output {}",
        attempted,
        succeeded,
        output_path.display()
    );
    println!("\n{}", Summary::of(&dataset));

    Ok(())
}
