//! Run the internship ingestion pipeline.
//!
//! `ingest-run` (or `ingest-run run`) performs one run and prints the
//! summary. `ingest-run schedule --cron <expr>` keeps the process alive and
//! starts a run on every tick, skipping ticks that overlap a running one.

use std::sync::Arc;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use internship_ingest::config::Config;
use internship_ingest::{Ingestion, RunGuard, RunSummary};
use tokio_cron_scheduler::{Job, JobScheduler};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[derive(Parser)]
#[command(name = "ingest-run")]
#[command(about = "Fetch internship postings from job boards and store the new ones")]
struct Cli {
    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// Run the pipeline once
    Run {
        /// Fetch, dedupe and filter without writing
        #[arg(long)]
        dry_run: bool,

        /// Print the summary as JSON
        #[arg(long)]
        json: bool,
    },

    /// Run the pipeline on a cron schedule
    Schedule {
        /// Six-field cron expression (seconds first)
        #[arg(long, env = "INGEST_CRON", default_value = "0 0 * * * *")]
        cron: String,

        #[arg(long)]
        dry_run: bool,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    // Initialize logging
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "info,internship_ingest=debug,sqlx=warn".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let cli = Cli::parse();
    let command = cli.command.unwrap_or(Commands::Run {
        dry_run: false,
        json: false,
    });

    let mut config = Config::from_env().context("Failed to load configuration")?;

    match command {
        Commands::Run { dry_run, json } => {
            config.ingest = config.ingest.with_dry_run(dry_run);
            let ingestion = build(&config).await?;
            let summary = ingestion.run().await;
            print_summary(&summary, json)?;
        }
        Commands::Schedule { cron, dry_run } => {
            config.ingest = config.ingest.with_dry_run(dry_run);
            let ingestion = Arc::new(build(&config).await?);
            schedule(ingestion, &cron).await?;
        }
    }

    Ok(())
}

async fn build(config: &Config) -> Result<Ingestion> {
    let store = config.open_store().await?;
    Ok(config.build_ingestion(store))
}

fn print_summary(summary: &RunSummary, json: bool) -> Result<()> {
    if json {
        println!(
            "{}",
            serde_json::to_string_pretty(summary).context("Failed to serialize summary")?
        );
    } else {
        println!("{}", summary);
    }
    Ok(())
}

async fn schedule(ingestion: Arc<Ingestion>, cron: &str) -> Result<()> {
    let mut scheduler = JobScheduler::new().await?;
    let guard = RunGuard::new();

    let job = Job::new_async(cron, move |_uuid, _lock| {
        let ingestion = ingestion.clone();
        let guard = guard.clone();
        Box::pin(async move {
            if let Some(summary) = guard.try_run(ingestion.run()).await {
                tracing::info!("{}", summary);
            }
        })
    })
    .with_context(|| format!("Invalid cron expression: {}", cron))?;

    scheduler.add(job).await?;
    scheduler.start().await?;
    tracing::info!(cron, "Ingestion scheduler started");

    tokio::signal::ctrl_c()
        .await
        .context("Failed to listen for shutdown signal")?;

    tracing::info!("Shutting down scheduler");
    scheduler.shutdown().await?;
    Ok(())
}
