//! `prospector` binary: run discovery or scrape a single profile and print
//! the resolved entities as JSON on stdout. Logs go to stderr.

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use std::path::PathBuf;
use tokio_util::sync::CancellationToken;
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

use prospector_adapters::build_registry;
use prospector_common::{file_config, AppConfig, FileConfig, SourceKind};
use prospector_resolve::{DiscoveryRequest, Prospector};

#[derive(Parser)]
#[command(name = "prospector")]
#[command(about = "Discover creator profiles across sources and resolve them into entities")]
#[command(version)]
struct Cli {
    /// TOML tuning file (overrides PROSPECTOR_CONFIG)
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    /// Emit logs as JSON lines
    #[arg(long, global = true)]
    json_logs: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Search sources, resolve identities, enrich and rank
    Discover {
        /// Search term (repeatable). Defaults to the configured YouTube queries.
        #[arg(short, long = "term")]
        terms: Vec<String>,

        /// Restrict to these sources (repeatable)
        #[arg(short, long = "source")]
        sources: Vec<SourceKind>,

        /// Results requested per source
        #[arg(short, long)]
        max_results: Option<usize>,

        /// Include the run report alongside the entities
        #[arg(long)]
        report: bool,
    },

    /// Fetch one profile with content and pricing, then enrich it
    Scrape {
        #[arg(short, long)]
        source: SourceKind,

        /// Source-local identifier (channel id, handle, slug)
        #[arg(short, long)]
        id: String,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    init_tracing(cli.json_logs)?;

    let app = AppConfig::from_env();
    let file = load_file_config(cli.config.as_ref().or(app.config_path.as_ref()))?;

    let registry = build_registry(&app, &file);
    let prospector = Prospector::new(registry, &file);

    match cli.command {
        Commands::Discover {
            terms,
            sources,
            max_results,
            report,
        } => {
            let terms = if terms.is_empty() {
                info!("No search terms given, using configured default queries");
                file.youtube.default_queries.clone()
            } else {
                terms
            };

            let mut request = DiscoveryRequest::new(terms);
            if !sources.is_empty() {
                request = request.with_sources(sources);
            }
            if let Some(max) = max_results {
                request = request.with_max_results(max);
            }

            let cancel = CancellationToken::new();
            let trigger = cancel.clone();
            tokio::spawn(async move {
                if tokio::signal::ctrl_c().await.is_ok() {
                    warn!("Interrupt received, cancelling discovery run");
                    trigger.cancel();
                }
            });

            let outcome = prospector
                .discover_with_cancel(request, &cancel)
                .await
                .context("Discovery run failed")?;

            eprintln!("{}", outcome.report.resolve);
            eprintln!("{}", outcome.report.enrichment);

            let json = if report {
                serde_json::to_string_pretty(&outcome)?
            } else {
                serde_json::to_string_pretty(&outcome.entities)?
            };
            println!("{json}");
        }
        Commands::Scrape { source, id } => {
            let entity = prospector
                .scrape_single(source, &id)
                .await
                .with_context(|| format!("Failed to scrape {source}:{id}"))?;
            println!("{}", serde_json::to_string_pretty(&entity)?);
        }
    }

    Ok(())
}

fn init_tracing(json: bool) -> Result<()> {
    let filter = EnvFilter::from_default_env().add_directive("prospector=info".parse()?);
    let builder = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr);

    if json {
        builder.json().init();
    } else {
        builder.init();
    }
    Ok(())
}

fn load_file_config(path: Option<&PathBuf>) -> Result<FileConfig> {
    match path {
        Some(path) => {
            info!(path = %path.display(), "Loading config file");
            file_config::load_config(path)
        }
        None => Ok(FileConfig::default()),
    }
}
