use anyhow::{Context, Result};
use clap::Parser;
use std::path::PathBuf;

use articlesync::config::Config;
use articlesync::feed::FeedFetcher;
use articlesync::pipeline::{Pipeline, UpsertSink};
use articlesync::storage::{Database, DocumentStore, MemoryStore};

#[derive(Parser, Debug)]
#[command(
    name = "articlesync",
    about = "Poll RSS feeds on a schedule and upsert articles into a document store"
)]
struct Args {
    /// Path to the TOML config file (missing file = built-in defaults)
    #[arg(long, value_name = "FILE", default_value = "articlesync.toml")]
    config: PathBuf,

    /// Override the database path from the config file
    #[arg(long, value_name = "FILE")]
    database: Option<PathBuf>,

    /// Run a single pass and exit instead of scheduling
    #[arg(long)]
    once: bool,

    /// Write to an in-memory store instead of the database
    #[arg(long)]
    dry_run: bool,
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .init();

    let args = Args::parse();

    let mut config = Config::load(&args.config)
        .with_context(|| format!("Failed to load config '{}'", args.config.display()))?;
    if let Some(database) = args.database {
        config.database_path = database;
    }

    if config.feeds.is_empty() {
        tracing::warn!("No feeds configured; runs will do nothing");
    }

    let fetcher =
        FeedFetcher::new(config.fetcher_settings()).context("Failed to build HTTP client")?;

    if args.dry_run {
        tracing::info!("Dry run: articles go to an in-memory store");
        let pipeline = Pipeline::new(
            fetcher,
            UpsertSink::new(MemoryStore::new()),
            config.write_concurrency,
        );
        return schedule(&pipeline, &config, args.once).await;
    }

    let db_path = config
        .database_path
        .to_str()
        .ok_or_else(|| anyhow::anyhow!("Invalid UTF-8 in database path"))?;
    let db = Database::open(db_path)
        .await
        .with_context(|| format!("Failed to open database '{}'", db_path))?;

    let pipeline = Pipeline::new(fetcher, UpsertSink::new(db), config.write_concurrency);
    schedule(&pipeline, &config, args.once).await
}

/// Runs once, or immediately and then every `interval_hours` until Ctrl-C.
async fn schedule<S: DocumentStore>(
    pipeline: &Pipeline<S>,
    config: &Config,
    once: bool,
) -> Result<()> {
    if once {
        pipeline.run_once(&config.feeds).await.log();
        return Ok(());
    }

    tracing::info!(
        interval_hours = config.interval_hours,
        feeds = config.feeds.len(),
        "Scheduler started"
    );

    let shutdown = async {
        match tokio::signal::ctrl_c().await {
            Ok(()) => tracing::info!("Shutting down"),
            Err(e) => {
                // Without a signal handler the scheduler keeps running
                tracing::error!(error = %e, "Failed to listen for Ctrl-C");
                std::future::pending::<()>().await;
            }
        }
    };

    pipeline
        .run_scheduled(&config.feeds, config.interval(), shutdown)
        .await;
    Ok(())
}
