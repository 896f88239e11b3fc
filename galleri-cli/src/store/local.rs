//! Local SQLite store
//!
//! The fallback backend when no remote endpoint is configured. Schema is
//! created on open; customer numbers are UNIQUE and child tables cascade on
//! delete. Contact date fields are stored as the raw text the source carried
//! (SQLite does not enforce a date type).

use std::path::Path;

use anyhow::{Context, Result};
use chrono::{DateTime, Utc};
use sqlx::SqlitePool;
use sqlx::sqlite::{SqliteConnectOptions, SqlitePoolOptions};
use uuid::Uuid;

use crate::model::{
    ActiveStatus, Contact, ContactDraft, ContactRole, Customer, CustomerDraft, CustomerRecord,
    Sale, SaleDraft,
};

use super::{CustomerStore, StoreError};

pub struct LocalStore {
    pool: SqlitePool,
}

impl LocalStore {
    /// Open (creating if missing) the database at `path`
    pub async fn open(path: &Path) -> Result<Self> {
        let options = SqliteConnectOptions::new()
            .filename(path)
            .create_if_missing(true)
            .foreign_keys(true);

        let pool = SqlitePoolOptions::new()
            .connect_with(options)
            .await
            .with_context(|| format!("Failed to open database: {}", path.display()))?;

        init_schema(&pool).await.context("Failed to create schema")?;
        Ok(Self { pool })
    }

    /// In-memory database for tests. Single connection: every pooled
    /// connection would otherwise get its own empty :memory: database.
    #[cfg(test)]
    pub async fn open_in_memory() -> Result<Self> {
        use std::str::FromStr;

        let options = SqliteConnectOptions::from_str("sqlite::memory:")?.foreign_keys(true);
        let pool = SqlitePoolOptions::new()
            .max_connections(1)
            .connect_with(options)
            .await?;
        init_schema(&pool).await?;
        Ok(Self { pool })
    }
}

async fn init_schema(pool: &SqlitePool) -> Result<(), sqlx::Error> {
    sqlx::query(
        "CREATE TABLE IF NOT EXISTS customers (
            id TEXT PRIMARY KEY,
            customer_no TEXT NOT NULL UNIQUE,
            status TEXT NOT NULL,
            company_name TEXT NOT NULL,
            address TEXT,
            postal_code TEXT,
            city TEXT,
            phone TEXT,
            visit_booked INTEGER NOT NULL DEFAULT 0,
            notes TEXT,
            created_at TEXT NOT NULL,
            updated_at TEXT NOT NULL
        )",
    )
    .execute(pool)
    .await?;

    sqlx::query(
        "CREATE TABLE IF NOT EXISTS contacts (
            id TEXT PRIMARY KEY,
            customer_id TEXT NOT NULL REFERENCES customers(id) ON DELETE CASCADE,
            role TEXT NOT NULL,
            name TEXT,
            phone TEXT,
            mobile TEXT,
            email TEXT,
            last_contact TEXT,
            follow_up TEXT,
            created_at TEXT NOT NULL,
            updated_at TEXT NOT NULL
        )",
    )
    .execute(pool)
    .await?;

    sqlx::query(
        "CREATE TABLE IF NOT EXISTS sales (
            id TEXT PRIMARY KEY,
            customer_id TEXT NOT NULL REFERENCES customers(id) ON DELETE CASCADE,
            date TEXT,
            amount REAL NOT NULL DEFAULT 0,
            description TEXT,
            created_at TEXT NOT NULL
        )",
    )
    .execute(pool)
    .await?;

    Ok(())
}

fn map_sqlx(e: sqlx::Error) -> StoreError {
    if let sqlx::Error::Database(ref db) = e {
        if db.is_unique_violation() {
            return StoreError::UniqueViolation;
        }
    }
    StoreError::Backend(e.into())
}

#[derive(sqlx::FromRow)]
struct CustomerRow {
    id: String,
    customer_no: String,
    status: String,
    company_name: String,
    address: Option<String>,
    postal_code: Option<String>,
    city: Option<String>,
    phone: Option<String>,
    visit_booked: bool,
    notes: Option<String>,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl CustomerRow {
    fn into_customer(self) -> Customer {
        Customer {
            id: self.id,
            customer_no: self.customer_no,
            status: ActiveStatus::parse(&self.status).unwrap_or(ActiveStatus::Inactive),
            company_name: self.company_name,
            address: self.address,
            postal_code: self.postal_code,
            city: self.city,
            phone: self.phone,
            visit_booked: self.visit_booked,
            notes: self.notes,
            created_at: self.created_at,
            updated_at: self.updated_at,
        }
    }
}

#[derive(sqlx::FromRow)]
struct ContactRow {
    id: String,
    customer_id: String,
    role: String,
    name: Option<String>,
    phone: Option<String>,
    mobile: Option<String>,
    email: Option<String>,
    last_contact: Option<String>,
    follow_up: Option<String>,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl ContactRow {
    fn into_contact(self) -> Option<Contact> {
        let role = match ContactRole::from_code(&self.role) {
            Some(role) => role,
            None => {
                log::warn!("Contact {} has unknown role '{}', skipping", self.id, self.role);
                return None;
            }
        };
        Some(Contact {
            id: self.id,
            customer_id: self.customer_id,
            role,
            name: self.name,
            phone: self.phone,
            mobile: self.mobile,
            email: self.email,
            last_contact: self.last_contact,
            follow_up: self.follow_up,
            created_at: self.created_at,
            updated_at: self.updated_at,
        })
    }
}

#[derive(sqlx::FromRow)]
struct SaleRow {
    id: String,
    customer_id: String,
    date: Option<String>,
    amount: f64,
    description: Option<String>,
    created_at: DateTime<Utc>,
}

impl SaleRow {
    fn into_sale(self) -> Sale {
        Sale {
            id: self.id,
            customer_id: self.customer_id,
            date: self.date,
            amount: self.amount,
            description: self.description,
            created_at: self.created_at,
        }
    }
}

#[async_trait::async_trait]
impl CustomerStore for LocalStore {
    async fn insert_customer(&self, draft: &CustomerDraft) -> Result<String, StoreError> {
        let id = Uuid::new_v4().to_string();
        let now = Utc::now();

        sqlx::query(
            "INSERT INTO customers
                (id, customer_no, status, company_name, address, postal_code,
                 city, phone, visit_booked, notes, created_at, updated_at)
             VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?)",
        )
        .bind(&id)
        .bind(&draft.customer_no)
        .bind(draft.status.as_code())
        .bind(&draft.company_name)
        .bind(&draft.address)
        .bind(&draft.postal_code)
        .bind(&draft.city)
        .bind(&draft.phone)
        .bind(draft.visit_booked)
        .bind(&draft.notes)
        .bind(now)
        .bind(now)
        .execute(&self.pool)
        .await
        .map_err(map_sqlx)?;

        Ok(id)
    }

    async fn insert_contacts(
        &self,
        customer_id: &str,
        contacts: &[ContactDraft],
    ) -> Result<(), StoreError> {
        let now = Utc::now();
        for contact in contacts {
            sqlx::query(
                "INSERT INTO contacts
                    (id, customer_id, role, name, phone, mobile, email,
                     last_contact, follow_up, created_at, updated_at)
                 VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?)",
            )
            .bind(Uuid::new_v4().to_string())
            .bind(customer_id)
            .bind(contact.role.as_code())
            .bind(&contact.name)
            .bind(&contact.phone)
            .bind(&contact.mobile)
            .bind(&contact.email)
            .bind(&contact.last_contact)
            .bind(&contact.follow_up)
            .bind(now)
            .bind(now)
            .execute(&self.pool)
            .await
            .map_err(map_sqlx)?;
        }
        Ok(())
    }

    async fn insert_sales(
        &self,
        customer_id: &str,
        sales: &[SaleDraft],
    ) -> Result<(), StoreError> {
        let now = Utc::now();
        for sale in sales {
            sqlx::query(
                "INSERT INTO sales (id, customer_id, date, amount, description, created_at)
                 VALUES (?, ?, ?, ?, ?, ?)",
            )
            .bind(Uuid::new_v4().to_string())
            .bind(customer_id)
            .bind(&sale.date)
            .bind(sale.amount)
            .bind(&sale.description)
            .bind(now)
            .execute(&self.pool)
            .await
            .map_err(map_sqlx)?;
        }
        Ok(())
    }

    async fn update_customer(&self, id: &str, draft: &CustomerDraft) -> Result<(), StoreError> {
        let result = sqlx::query(
            "UPDATE customers SET
                customer_no = ?, status = ?, company_name = ?, address = ?,
                postal_code = ?, city = ?, phone = ?, visit_booked = ?,
                notes = ?, updated_at = ?
             WHERE id = ?",
        )
        .bind(&draft.customer_no)
        .bind(draft.status.as_code())
        .bind(&draft.company_name)
        .bind(&draft.address)
        .bind(&draft.postal_code)
        .bind(&draft.city)
        .bind(&draft.phone)
        .bind(draft.visit_booked)
        .bind(&draft.notes)
        .bind(Utc::now())
        .bind(id)
        .execute(&self.pool)
        .await
        .map_err(map_sqlx)?;

        if result.rows_affected() == 0 {
            return Err(StoreError::NotFound(id.to_string()));
        }
        Ok(())
    }

    async fn delete_customer(&self, id: &str) -> Result<(), StoreError> {
        let result = sqlx::query("DELETE FROM customers WHERE id = ?")
            .bind(id)
            .execute(&self.pool)
            .await
            .map_err(map_sqlx)?;

        if result.rows_affected() == 0 {
            return Err(StoreError::NotFound(id.to_string()));
        }
        Ok(())
    }

    async fn list_customers(&self) -> Result<Vec<CustomerRecord>, StoreError> {
        let customers: Vec<CustomerRow> =
            sqlx::query_as("SELECT * FROM customers ORDER BY company_name COLLATE NOCASE")
                .fetch_all(&self.pool)
                .await
                .map_err(map_sqlx)?;

        let contacts: Vec<ContactRow> = sqlx::query_as("SELECT * FROM contacts")
            .fetch_all(&self.pool)
            .await
            .map_err(map_sqlx)?;

        let sales: Vec<SaleRow> = sqlx::query_as("SELECT * FROM sales")
            .fetch_all(&self.pool)
            .await
            .map_err(map_sqlx)?;

        let mut contacts_by_customer: std::collections::HashMap<String, Vec<Contact>> =
            std::collections::HashMap::new();
        for row in contacts {
            if let Some(contact) = row.into_contact() {
                contacts_by_customer
                    .entry(contact.customer_id.clone())
                    .or_default()
                    .push(contact);
            }
        }

        let mut sales_by_customer: std::collections::HashMap<String, Vec<Sale>> =
            std::collections::HashMap::new();
        for row in sales {
            let sale = row.into_sale();
            sales_by_customer
                .entry(sale.customer_id.clone())
                .or_default()
                .push(sale);
        }

        Ok(customers
            .into_iter()
            .map(|row| {
                let customer = row.into_customer();
                let contacts = contacts_by_customer.remove(&customer.id).unwrap_or_default();
                let sales = sales_by_customer.remove(&customer.id).unwrap_or_default();
                CustomerRecord {
                    customer,
                    contacts,
                    sales,
                }
            })
            .collect())
    }
}
