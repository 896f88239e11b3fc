//! Command-line interface definitions

pub mod commands;

use std::path::PathBuf;

use clap::{Args, Parser, Subcommand};

use crate::model::ActiveStatus;
use crate::services::listing::{SortField, SortOrder};

#[derive(Parser)]
#[command(
    name = "galleri",
    about = "Customer management for a small art gallery",
    version
)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// List customers with filtering, sorting and pagination
    List(ListArgs),
    /// Create a new customer
    Create(CustomerArgs),
    /// Update a customer (overwrites the full field set)
    Update {
        /// Store id of the customer
        id: String,
        #[command(flatten)]
        args: CustomerArgs,
    },
    /// Delete a customer and its contacts and sales
    Delete {
        /// Store id of the customer
        id: String,
        /// Skip the confirmation prompt
        #[arg(long)]
        yes: bool,
    },
    /// Import customers from an Excel spreadsheet
    Import {
        /// Spreadsheet file (.xlsx); first sheet, first row is headers
        file: PathBuf,
    },
}

#[derive(Args)]
pub struct ListArgs {
    /// Match against company name, customer number, city, or phone
    #[arg(long, default_value = "")]
    pub search: String,

    #[arg(long, value_enum, default_value = "company")]
    pub sort_by: SortField,

    #[arg(long, value_enum, default_value = "asc")]
    pub order: SortOrder,

    #[arg(long, default_value_t = 1)]
    pub page: usize,

    /// Items per page (12, 24, 48 or 96)
    #[arg(long, default_value_t = 12)]
    pub per_page: usize,
}

#[derive(Args)]
pub struct CustomerArgs {
    /// External business code, unique across customers
    #[arg(long)]
    pub customer_no: String,

    #[arg(long)]
    pub company: String,

    #[arg(long)]
    pub address: Option<String>,

    #[arg(long)]
    pub postal_code: Option<String>,

    #[arg(long)]
    pub city: Option<String>,

    #[arg(long)]
    pub phone: Option<String>,

    #[arg(long, value_enum, default_value = "nej")]
    pub status: ActiveStatus,

    #[arg(long)]
    pub visit_booked: bool,

    #[arg(long)]
    pub notes: Option<String>,
}
