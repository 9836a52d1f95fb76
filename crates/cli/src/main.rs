//! DyF CLI - database migrations and store management.
//!
//! # Usage
//!
//! ```bash
//! # Run database migrations
//! dyf-cli migrate
//!
//! # Create an admin user
//! dyf-cli admin create -r 11111111-1 -n "Administrador" -e admin@dyf.cl -p 'Qwerty123$'
//!
//! # Seed the catalog from a JSON array of products
//! dyf-cli seed products data/products.json
//! ```
//!
//! All commands read `DYF_DATABASE_URL` (or `DATABASE_URL`).

#![cfg_attr(not(test), forbid(unsafe_code))]

use clap::{Parser, Subcommand};

mod commands;

#[derive(Parser)]
#[command(name = "dyf-cli")]
#[command(author, version, about = "DyF store CLI tools")]
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
    /// Load data into the store
    Seed {
        #[command(subcommand)]
        target: SeedTarget,
    },
}

#[derive(Subcommand)]
enum AdminAction {
    /// Create a new admin user
    Create {
        /// RUT, e.g. 12345678-5
        #[arg(short, long)]
        rut: String,

        /// Display name
        #[arg(short, long)]
        name: String,

        /// Login email
        #[arg(short, long)]
        email: String,

        /// Password (8-20 chars, upper, lower, digit and one of @$!%*?&)
        #[arg(short, long)]
        password: String,

        /// Contact phone
        #[arg(long, default_value = "No informado")]
        phone: String,

        /// Shipping address
        #[arg(long, default_value = "No informada")]
        address: String,
    },
}

#[derive(Subcommand)]
enum SeedTarget {
    /// Insert products from a JSON file, skipping ids that already exist
    Products {
        /// Path to a JSON array of products
        file: String,
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

async fn run(cli: Cli) -> Result<(), Box<dyn std::error::Error>> {
    match cli.command {
        Commands::Migrate => commands::migrate::run().await?,
        Commands::Admin { action } => match action {
            AdminAction::Create {
                rut,
                name,
                email,
                password,
                phone,
                address,
            } => {
                let account = commands::admin::NewAdmin {
                    rut,
                    name,
                    email,
                    password,
                    phone,
                    shipping_address: address,
                };
                commands::admin::create_user(account).await?;
            }
        },
        Commands::Seed { target } => match target {
            SeedTarget::Products { file } => commands::seed::products(&file).await?,
        },
    }
    Ok(())
}
