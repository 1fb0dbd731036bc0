//! Bazaar CLI - Database migrations and catalog tools.
//!
//! # Usage
//!
//! ```bash
//! # Run database migrations
//! bazaar migrate
//!
//! # Load a demo catalog
//! bazaar seed catalog --file crates/cli/seed/catalog.yaml
//!
//! # Show catalog statistics
//! bazaar seed stats
//! ```
//!
//! All commands read `BAZAAR_DATABASE_URL` (or `DATABASE_URL`).

#![cfg_attr(not(test), forbid(unsafe_code))]

use clap::{Parser, Subcommand};

mod commands;

#[derive(Parser)]
#[command(name = "bazaar")]
#[command(author, version, about = "Bazaar CLI tools")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Run database migrations
    Migrate,
    /// Seed the database
    Seed {
        #[command(subcommand)]
        action: SeedAction,
    },
}

#[derive(Subcommand)]
enum SeedAction {
    /// Create categories and products from a YAML file
    Catalog {
        /// Path to the catalog YAML file
        #[arg(short, long, default_value = "crates/cli/seed/catalog.yaml")]
        file: String,
    },
    /// Show user, category and product counts
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
        Commands::Seed { action } => match action {
            SeedAction::Catalog { file } => commands::seed::catalog(&file).await?,
            SeedAction::Stats => commands::seed::stats().await?,
        },
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn test_cli_definition() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_parses_seed_catalog() {
        let cli = Cli::try_parse_from(["bazaar", "seed", "catalog", "--file", "demo.yaml"]);
        assert!(matches!(
            cli.map(|c| c.command),
            Ok(Commands::Seed {
                action: SeedAction::Catalog { ref file }
            }) if file == "demo.yaml"
        ));
    }
}
