//! Bazaar CLI - Database migrations and management tools.
//!
//! # Usage
//!
//! ```bash
//! # Run database migrations (schema + session store)
//! bazaar-cli migrate
//!
//! # Load brands, categories and products from YAML
//! bazaar-cli seed crates/cli/seed/catalog.yaml
//!
//! # Grant or revoke admin rights
//! bazaar-cli user promote -e admin@example.com
//! bazaar-cli user demote -e admin@example.com
//! ```
//!
//! All commands read `BAZAAR_DATABASE_URL` (or `DATABASE_URL`).

#![cfg_attr(not(test), forbid(unsafe_code))]

use std::path::PathBuf;

use clap::{Parser, Subcommand};

mod commands;

#[derive(Parser)]
#[command(name = "bazaar-cli")]
#[command(author, version, about = "Bazaar CLI tools")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Run database migrations
    Migrate,
    /// Seed the catalog from a YAML file
    Seed {
        /// Path to the YAML file
        file: PathBuf,
    },
    /// Manage users
    User {
        #[command(subcommand)]
        action: UserAction,
    },
}

#[derive(Subcommand)]
enum UserAction {
    /// Grant admin rights
    Promote {
        /// User email address
        #[arg(short, long)]
        email: String,
    },
    /// Revoke admin rights
    Demote {
        /// User email address
        #[arg(short, long)]
        email: String,
    },
}

#[tokio::main]
async fn main() {
    tracing_subscriber::fmt::init();

    let cli = Cli::parse();

    if let Err(e) = run(cli).await {
        tracing::error!("Command failed: {e}");
        std::process::exit(1);
    }
}

async fn run(cli: Cli) -> Result<(), commands::CliError> {
    match cli.command {
        Commands::Migrate => commands::migrate::run().await,
        Commands::Seed { file } => commands::seed::catalog(&file).await,
        Commands::User { action } => match action {
            UserAction::Promote { email } => commands::user::set_admin(&email, true).await,
            UserAction::Demote { email } => commands::user::set_admin(&email, false).await,
        },
    }
}
