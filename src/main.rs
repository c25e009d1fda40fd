use anyhow::Result;
use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

use execfind::cli;
use execfind::runner::ResumeMode;

#[derive(Parser)]
#[command(name = "execfind", version)]
#[command(about = "Enrich a CSV of companies with their chief executives", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Enrich a company table, saving incrementally
    Run {
        /// Input CSV with a company-name column
        input: String,

        /// Output file path (defaults to <input stem>_with_ceos.csv; loaded
        /// instead of the input when it already exists)
        #[arg(short = 'o', long)]
        output: Option<String>,

        /// Which rows to process
        #[arg(long, value_enum, default_value_t = ResumeMode::Missing)]
        mode: ResumeMode,

        /// Save the table every N processed rows
        #[arg(long)]
        save_every: Option<usize>,

        /// Path to config file (defaults to ./execfind.toml or ~/.config/execfind/config.toml)
        #[arg(long)]
        config: Option<String>,

        /// Override the OpenAI model (e.g. "gpt-4o")
        #[arg(long)]
        model: Option<String>,

        /// Use a mock LLM client and skip network sources
        #[arg(long)]
        dry_run: bool,
    },

    /// Summarize an enriched table
    Analyze {
        /// CSV file to summarize
        file: String,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("execfind=info")),
        )
        .init();

    let cli = Cli::parse();

    match cli.command {
        Commands::Run {
            input,
            output,
            mode,
            save_every,
            config,
            model,
            dry_run,
        } => {
            cli::run::run(input, output, mode, save_every, config, model, dry_run).await?;
        }
        Commands::Analyze { file } => {
            cli::analyze::run(file)?;
        }
    }

    Ok(())
}
