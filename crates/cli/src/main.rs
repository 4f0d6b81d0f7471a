//! Shopfront CLI - Database migrations and operator tools.
//!
//! # Usage
//!
//! ```bash
//! # Run database migrations
//! sf-cli migrate
//!
//! # Provision an admin (no setup key needed)
//! sf-cli admin add -e owner@example.com -p 'correct horse'
//!
//! # Apply the product image map (built-in, or a YAML file)
//! sf-cli products sync-images
//! sf-cli products sync-images --map images.yaml
//! ```

#![cfg_attr(not(test), forbid(unsafe_code))]

use std::path::PathBuf;

use clap::{Parser, Subcommand};

mod commands;

#[derive(Parser)]
#[command(name = "sf-cli")]
#[command(author, version, about = "Shopfront CLI tools")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Run database migrations
    Migrate,
    /// Manage admin users
    Admin {
        #[command(subcommand)]
        action: AdminAction,
    },
    /// Manage products
    Products {
        #[command(subcommand)]
        action: ProductAction,
    },
}

#[derive(Subcommand)]
enum AdminAction {
    /// Grant admin access, creating the identity user if needed
    Add {
        /// Admin email address
        #[arg(short, long)]
        email: String,

        /// Password for a newly created identity user
        #[arg(short, long, env = "SF_ADMIN_PASSWORD", hide_env_values = true)]
        password: String,
    },
}

#[derive(Subcommand)]
enum ProductAction {
    /// Replace product images from the image map
    SyncImages {
        /// YAML image map (defaults to `PRODUCT_IMAGE_MAP_PATH`, then the built-in map)
        #[arg(short, long)]
        map: Option<PathBuf>,
    },
}

#[tokio::main]
async fn main() {
    // Initialize tracing
    tracing_subscriber::fmt::init();

    let cli = Cli::parse();

    if let Err(e) = run(cli).await {
        tracing::error!("Command failed: {e}");
        std::process::exit(1);
    }
}

async fn run(cli: Cli) -> Result<(), commands::CliError> {
    match cli.command {
        Commands::Migrate => commands::migrate::run().await?,
        Commands::Admin { action } => match action {
            AdminAction::Add { email, password } => {
                commands::admin::add(&email, password).await?;
            }
        },
        Commands::Products { action } => match action {
            ProductAction::SyncImages { map } => {
                commands::products::sync_images(map).await?;
            }
        },
    }
    Ok(())
}
