//! ShotScore CLI — the main entry point.
//!
//! Commands:
//! - `onboard` — Initialize config & reference store
//! - `run`     — Start the Slack review bridge
//! - `review`  — Score a local image file once and print the critique
//! - `doctor`  — Diagnose configuration health

use clap::{Parser, Subcommand};
use std::path::PathBuf;

mod commands;

#[derive(Parser)]
#[command(
    name = "shotscore",
    about = "ShotScore — Slack image review bridge",
    version,
    author
)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Enable verbose logging
    #[arg(short, long, global = true)]
    verbose: bool,
}

#[derive(Subcommand)]
enum Commands {
    /// Initialize configuration and the reference store
    Onboard,

    /// Start the Slack review bridge
    Run,

    /// Score a local image file once and print the critique
    Review {
        /// Path to the image file
        image: PathBuf,
    },

    /// Diagnose configuration health
    Doctor,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();

    // Initialize tracing
    let filter = if cli.verbose { "debug" } else { "info" };
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(filter)),
        )
        .with_target(false)
        .init();

    match cli.command {
        Commands::Onboard => commands::onboard::run().await?,
        Commands::Run => commands::run::run().await?,
        Commands::Review { image } => commands::review::run(image).await?,
        Commands::Doctor => commands::doctor::run().await?,
    }

    Ok(())
}
