//! SafeRoute CLI - score and rank candidate cycling routes against the risk artifacts.

mod commands;
mod config;

use std::path::PathBuf;

use anyhow::Result;
use clap::{Parser, Subcommand};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use saferoute_core::{ArtifactStore, RankMode};

use crate::config::Config;

#[derive(Parser, Debug)]
#[command(name = "saferoute", version, about = "Route safety risk scoring")]
struct Args {
    /// Artifact directory (overrides SAFEROUTE_ARTIFACT_DIR)
    #[arg(long, global = true)]
    artifacts: Option<PathBuf>,

    /// Pretty-print JSON output
    #[arg(long, global = true)]
    pretty: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Load the artifacts and report their status
    Check,
    /// Score a batch of candidate routes and rank them
    Score {
        /// JSON file with the candidate routes
        #[arg(long)]
        routes: PathBuf,

        /// fastest, safer or balanced
        #[arg(long, default_value_t = RankMode::Balanced)]
        mode: RankMode,

        /// Sample spacing in meters (overrides SAFEROUTE_SAMPLE_SPACING_M)
        #[arg(long)]
        spacing: Option<f64>,
    },
}

fn init_tracing(json: bool) -> Result<()> {
    let filter = tracing_subscriber::EnvFilter::from_default_env()
        .add_directive("saferoute=info".parse()?)
        .add_directive("saferoute_core=info".parse()?);

    // stdout carries the JSON results, so logs go to stderr.
    if json {
        tracing_subscriber::registry()
            .with(tracing_subscriber::fmt::layer().json().with_writer(std::io::stderr))
            .with(filter)
            .init();
    } else {
        tracing_subscriber::registry()
            .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
            .with(filter)
            .init();
    }
    Ok(())
}

fn main() -> Result<()> {
    let args = Args::parse();
    let config = Config::from_env();
    init_tracing(config.log_json)?;

    let artifact_dir = args.artifacts.unwrap_or(config.artifact_dir);
    let store = ArtifactStore::from_dir(&artifact_dir);

    match args.command {
        Command::Check => {
            let status = commands::check(&store)?;
            commands::write_json(&status, args.pretty)?;
        }
        Command::Score {
            routes,
            mode,
            spacing,
        } => {
            let candidates = commands::read_batch(&routes)?;
            let spacing = spacing.unwrap_or(config.sample_spacing_m);
            let response = commands::score(&store, &candidates, mode, spacing)?;
            commands::write_json(&response, args.pretty)?;
        }
    }

    Ok(())
}
