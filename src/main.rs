//! Lorekeeper - Narrative Insight Synthesis Engine
//!
//! Thin command line harness: loads a JSON fixture into the in-memory store
//! and prints the generated insights.

use anyhow::{Context, Result};
use chrono::{DateTime, Utc};
use clap::{Parser, Subcommand};
use lorekeeper::{
    config::LorekeeperConfig,
    insight::InsightEngine,
    store::{Fixture, MemoryStore},
};
use std::path::PathBuf;
use std::sync::Arc;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[derive(Parser)]
#[command(name = "lorekeeper")]
#[command(version)]
#[command(about = "Narrative insight synthesis for companions, quests, and skills")]
struct Cli {
    /// Configuration file path
    #[arg(short, long, env = "LOREKEEPER_CONFIG")]
    config: Option<PathBuf>,

    /// Enable verbose logging
    #[arg(short, long)]
    verbose: bool,

    /// Emit logs as JSON
    #[arg(long)]
    log_json: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Generate insights for every snapshot in a fixture
    Generate {
        /// Fixture file (JSON)
        #[arg(short, long)]
        input: PathBuf,

        /// Reference time (RFC 3339), defaults to now
        #[arg(long, value_parser = parse_time)]
        now: Option<DateTime<Utc>>,
    },

    /// Validate a fixture's snapshots without generating anything
    Check {
        /// Fixture file (JSON)
        #[arg(short, long)]
        input: PathBuf,
    },

    /// Show configuration
    Config {
        /// Show default configuration
        #[arg(long)]
        default: bool,
    },
}

fn parse_time(s: &str) -> std::result::Result<DateTime<Utc>, String> {
    DateTime::parse_from_rfc3339(s)
        .map(|t| t.with_timezone(&Utc))
        .map_err(|e| format!("invalid RFC 3339 time '{}': {}", s, e))
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    // Logs go to stderr; stdout carries the insight JSON
    let log_level = if cli.verbose { "debug" } else { "info" };
    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| format!("lorekeeper={}", log_level).into());
    let registry = tracing_subscriber::registry().with(filter);
    if cli.log_json {
        registry
            .with(
                tracing_subscriber::fmt::layer()
                    .json()
                    .with_writer(std::io::stderr),
            )
            .init();
    } else {
        registry
            .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
            .init();
    }

    let config = match cli.config {
        Some(path) => LorekeeperConfig::from_file(&path)
            .with_context(|| format!("Failed to load config from {}", path.display()))?,
        None => LorekeeperConfig::default(),
    };

    match cli.command {
        Commands::Generate { input, now } => {
            run_generate(config, input, now.unwrap_or_else(Utc::now)).await?;
        }
        Commands::Check { input } => {
            run_check(input).await?;
        }
        Commands::Config { default } => {
            show_config(if default { None } else { Some(&config) })?;
        }
    }

    Ok(())
}

async fn run_generate(config: LorekeeperConfig, input: PathBuf, now: DateTime<Utc>) -> Result<()> {
    let fixture = Fixture::load(&input)
        .await
        .with_context(|| format!("Failed to load fixture {}", input.display()))?;
    let user_id = fixture.user_id.clone();
    let (store, snapshots) = MemoryStore::from_fixture(fixture).await;

    tracing::info!(user_id = %user_id, entities = snapshots.len(), "Generating insights");

    let engine = InsightEngine::new(Arc::new(store), &config)?;
    let insights = engine
        .generate_all_insights_at(&user_id, &snapshots, now)
        .await;

    println!("{}", serde_json::to_string_pretty(&insights)?);
    Ok(())
}

async fn run_check(input: PathBuf) -> Result<()> {
    let fixture = Fixture::load(&input)
        .await
        .with_context(|| format!("Invalid fixture {}", input.display()))?;

    let parsed = fixture.parse_snapshots();
    let invalid = parsed.iter().filter(|p| p.is_err()).count();

    println!("Fixture: {}", input.display());
    println!("  user:      {}", fixture.user_id);
    println!("  snapshots: {} ({} invalid)", parsed.len(), invalid);
    println!(
        "  events:    {}",
        fixture.events.values().map(Vec::len).sum::<usize>()
    );
    for (index, result) in parsed.iter().enumerate() {
        if let Err(e) = result {
            println!("  [{}] {}", index, e);
        }
    }
    Ok(())
}

fn show_config(config: Option<&LorekeeperConfig>) -> Result<()> {
    let config = config.cloned().unwrap_or_default();
    println!("{}", config.to_toml_string()?);
    Ok(())
}
