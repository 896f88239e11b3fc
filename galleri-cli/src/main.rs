//! galleri: a command-line CRM for a small art gallery
//!
//! Customers live either in a hosted Supabase-style store or, when no
//! remote endpoint is configured, in a local SQLite database. Listing,
//! searching, sorting, and pagination run client-side over the fully
//! fetched collection; bulk import maps spreadsheet rows into customers
//! with contacts and sales.

mod cli;
mod config;
mod import;
mod model;
mod services;
mod store;

use anyhow::Result;
use clap::Parser;

use cli::{Cli, Commands};

#[tokio::main]
async fn main() -> Result<()> {
    dotenvy::dotenv().ok();
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("warn")).init();

    let cli = Cli::parse();

    let store_config = config::StoreConfig::load()?;
    log::debug!("Using {} store", store_config.describe());
    let store = store::connect(&store_config).await?;

    match cli.command {
        Commands::List(args) => cli::commands::handle_list(store.as_ref(), args).await,
        Commands::Create(args) => cli::commands::handle_create(store.as_ref(), args).await,
        Commands::Update { id, args } => {
            cli::commands::handle_update(store.as_ref(), &id, args).await
        }
        Commands::Delete { id, yes } => {
            cli::commands::handle_delete(store.as_ref(), &id, yes).await
        }
        Commands::Import { file } => cli::commands::handle_import(store.as_ref(), &file).await,
    }
}
