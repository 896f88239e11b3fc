//! Storage backends for customer records
//!
//! One backend-neutral trait with two implementations: the hosted
//! Supabase-style store and a local SQLite fallback used when no remote
//! endpoint is configured. Duplicate-key detection is a capability of the
//! trait (`StoreError::UniqueViolation`), never backend error-code
//! inspection at call sites.

pub mod local;
pub mod remote;

pub use local::LocalStore;
pub use remote::RemoteStore;

use anyhow::Result;
use async_trait::async_trait;
use thiserror::Error;

use crate::config::StoreConfig;
use crate::model::{ContactDraft, CustomerDraft, CustomerRecord, SaleDraft};

#[derive(Debug, Error)]
pub enum StoreError {
    /// The customer number is already taken
    #[error("customer number already exists")]
    UniqueViolation,
    #[error("record not found: {0}")]
    NotFound(String),
    #[error(transparent)]
    Backend(#[from] anyhow::Error),
}

/// Persistence operations required by the CLI and the batch importer
#[async_trait]
pub trait CustomerStore: Send + Sync {
    /// Insert a customer, returning its store-assigned id
    async fn insert_customer(&self, draft: &CustomerDraft) -> Result<String, StoreError>;

    async fn insert_contacts(
        &self,
        customer_id: &str,
        contacts: &[ContactDraft],
    ) -> Result<(), StoreError>;

    async fn insert_sales(&self, customer_id: &str, sales: &[SaleDraft])
    -> Result<(), StoreError>;

    /// Full-record overwrite: the caller always supplies the complete field set
    async fn update_customer(&self, id: &str, draft: &CustomerDraft) -> Result<(), StoreError>;

    /// Delete a customer; contacts and sales cascade
    async fn delete_customer(&self, id: &str) -> Result<(), StoreError>;

    /// Fetch the full collection with related contacts and sales, ordered by
    /// company name
    async fn list_customers(&self) -> Result<Vec<CustomerRecord>, StoreError>;
}

/// Construct the store the configuration selects
pub async fn connect(config: &StoreConfig) -> Result<Box<dyn CustomerStore>> {
    match config {
        StoreConfig::Remote { url, api_key } => Ok(Box::new(RemoteStore::new(url, api_key)?)),
        StoreConfig::Local { db_path } => Ok(Box::new(LocalStore::open(db_path).await?)),
    }
}
