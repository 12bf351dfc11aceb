//! Folio CLI - Database migrations and management tools.
//!
//! # Usage
//!
//! ```bash
//! # Run database migrations
//! folio migrate
//!
//! # Load reference data and books from a YAML file
//! folio seed -f demos/catalog.yaml
//!
//! # Print offer and order counters
//! folio stats
//! ```
//!
//! # Commands
//!
//! - `migrate` - Run database migrations
//! - `seed` - Load catalog seed data from a YAML file
//! - `stats` - Print offer moderation and order fulfillment counters

#![cfg_attr(not(test), forbid(unsafe_code))]

use clap::{Parser, Subcommand};

mod commands;

#[derive(Parser)]
#[command(name = "folio")]
#[command(author, version, about = "Folio bookstore CLI tools")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Run database migrations
    Migrate,
    /// Load catalog seed data from a YAML file
    Seed {
        /// Path to the YAML seed file
        #[arg(short, long)]
        file: String,
    },
    /// Print offer and order counters
    Stats,
}

#[tokio::main]
async fn main() {
    // Initialize tracing
    tracing_subscriber::fmt::init();

    let cli = Cli::parse();

    let result: Result<(), Box<dyn std::error::Error>> = run(cli).await;

    if let Err(e) = result {
        tracing::error!("Command failed: {e}");
        std::process::exit(1);
    }
}

async fn run(cli: Cli) -> Result<(), Box<dyn std::error::Error>> {
    match cli.command {
        Commands::Migrate => commands::migrate::run().await?,
        Commands::Seed { file } => commands::seed::catalog(&file).await?,
        Commands::Stats => commands::stats::overview().await?,
    }
    Ok(())
}
