//! Hosted store backend (Supabase-style PostgREST endpoint)
//!
//! Speaks the legacy Swedish column names of the hosted schema
//! (kundnr, foretagsnamn, ...). The backend enforces a real date type on
//! contact and sale date columns, so raw draft dates are normalized here
//! before they go over the wire. Postgres unique-violation (23505) maps to
//! `StoreError::UniqueViolation`.

use anyhow::{Context, Result, anyhow};
use chrono::{DateTime, Utc};
use reqwest::{Client, Method, RequestBuilder, Response, StatusCode};
use serde::{Deserialize, Serialize};

use crate::import::date::normalize_date_str;
use crate::model::{
    ActiveStatus, Contact, ContactDraft, ContactRole, Customer, CustomerDraft, CustomerRecord,
    Sale, SaleDraft,
};

use super::{CustomerStore, StoreError};

pub struct RemoteStore {
    client: Client,
    base_url: String,
    api_key: String,
}

impl RemoteStore {
    pub fn new(base_url: &str, api_key: &str) -> Result<Self> {
        let client = Client::builder()
            .build()
            .context("Failed to build HTTP client")?;
        Ok(Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
            api_key: api_key.to_string(),
        })
    }

    fn table_url(&self, table: &str) -> String {
        format!("{}/rest/v1/{}", self.base_url, table)
    }

    fn request(&self, method: Method, url: &str) -> RequestBuilder {
        self.client
            .request(method, url)
            .header("apikey", &self.api_key)
            .bearer_auth(&self.api_key)
    }

    /// Turn a non-success response into a StoreError, distinguishing
    /// uniqueness violations
    async fn check(response: Response) -> Result<Response, StoreError> {
        let status = response.status();
        if status.is_success() {
            return Ok(response);
        }
        let body = response.text().await.unwrap_or_default();
        if status == StatusCode::CONFLICT || body.contains("23505") {
            return Err(StoreError::UniqueViolation);
        }
        Err(StoreError::Backend(anyhow!(
            "Store request failed ({}): {}",
            status,
            body
        )))
    }
}

fn to_backend(e: reqwest::Error) -> StoreError {
    StoreError::Backend(e.into())
}

#[derive(Serialize)]
struct CustomerPayload {
    kundnr: String,
    aktiv: String,
    foretagsnamn: String,
    adress: Option<String>,
    postnummer: Option<String>,
    stad: Option<String>,
    telefon: Option<String>,
    bokat_besok: bool,
    anteckningar: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    updated_at: Option<String>,
}

impl CustomerPayload {
    fn from_draft(draft: &CustomerDraft) -> Self {
        Self {
            kundnr: draft.customer_no.clone(),
            aktiv: draft.status.as_code().to_string(),
            foretagsnamn: draft.company_name.clone(),
            adress: draft.address.clone(),
            postnummer: draft.postal_code.clone(),
            stad: draft.city.clone(),
            telefon: draft.phone.clone(),
            bokat_besok: draft.visit_booked,
            anteckningar: draft.notes.clone(),
            updated_at: None,
        }
    }
}

#[derive(Serialize)]
struct ContactPayload {
    customer_id: String,
    role: String,
    namn: Option<String>,
    telefon: Option<String>,
    mobil: Option<String>,
    email: Option<String>,
    senast_kontakt: Option<String>,
    aterkom: Option<String>,
}

impl ContactPayload {
    fn from_draft(customer_id: &str, draft: &ContactDraft) -> Self {
        Self {
            customer_id: customer_id.to_string(),
            role: draft.role.as_code().to_string(),
            namn: draft.name.clone(),
            telefon: draft.phone.clone(),
            mobil: draft.mobile.clone(),
            email: draft.email.clone(),
            // The hosted schema types these as dates; raw text that does not
            // normalize becomes null rather than a rejected row
            senast_kontakt: draft.last_contact.as_deref().and_then(normalize_date_str),
            aterkom: draft.follow_up.as_deref().and_then(normalize_date_str),
        }
    }
}

#[derive(Serialize)]
struct SalePayload {
    customer_id: String,
    datum: Option<String>,
    belopp: f64,
    sald_konst: Option<String>,
}

impl SalePayload {
    fn from_draft(customer_id: &str, draft: &SaleDraft) -> Self {
        Self {
            customer_id: customer_id.to_string(),
            datum: draft.date.as_deref().and_then(normalize_date_str),
            belopp: draft.amount,
            sald_konst: draft.description.clone(),
        }
    }
}

#[derive(Deserialize)]
struct CustomerWire {
    id: String,
    kundnr: String,
    #[serde(default)]
    aktiv: serde_json::Value,
    foretagsnamn: String,
    adress: Option<String>,
    postnummer: Option<String>,
    stad: Option<String>,
    telefon: Option<String>,
    #[serde(default)]
    bokat_besok: bool,
    anteckningar: Option<String>,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
    #[serde(default)]
    contacts: Vec<ContactWire>,
    #[serde(default)]
    sales: Vec<SaleWire>,
}

impl CustomerWire {
    fn into_record(self) -> CustomerRecord {
        // Older rows carry booleans, newer rows the JAA/NJA/NEJ codes
        let status = match &self.aktiv {
            serde_json::Value::Bool(true) => ActiveStatus::Fully,
            serde_json::Value::Bool(false) => ActiveStatus::Inactive,
            serde_json::Value::String(s) => {
                ActiveStatus::parse(s).unwrap_or(ActiveStatus::Inactive)
            }
            _ => ActiveStatus::Inactive,
        };

        let customer = Customer {
            id: self.id,
            customer_no: self.kundnr,
            status,
            company_name: self.foretagsnamn,
            address: self.adress,
            postal_code: self.postnummer,
            city: self.stad,
            phone: self.telefon,
            visit_booked: self.bokat_besok,
            notes: self.anteckningar,
            created_at: self.created_at,
            updated_at: self.updated_at,
        };

        let contacts = self
            .contacts
            .into_iter()
            .filter_map(ContactWire::into_contact)
            .collect();
        let sales = self.sales.into_iter().map(SaleWire::into_sale).collect();

        CustomerRecord {
            customer,
            contacts,
            sales,
        }
    }
}

#[derive(Deserialize)]
struct ContactWire {
    id: String,
    customer_id: String,
    role: String,
    namn: Option<String>,
    telefon: Option<String>,
    mobil: Option<String>,
    email: Option<String>,
    senast_kontakt: Option<String>,
    aterkom: Option<String>,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl ContactWire {
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
            name: self.namn,
            phone: self.telefon,
            mobile: self.mobil,
            email: self.email,
            last_contact: self.senast_kontakt,
            follow_up: self.aterkom,
            created_at: self.created_at,
            updated_at: self.updated_at,
        })
    }
}

#[derive(Deserialize)]
struct SaleWire {
    id: String,
    customer_id: String,
    datum: Option<String>,
    belopp: f64,
    sald_konst: Option<String>,
    created_at: DateTime<Utc>,
}

impl SaleWire {
    fn into_sale(self) -> Sale {
        Sale {
            id: self.id,
            customer_id: self.customer_id,
            date: self.datum,
            amount: self.belopp,
            description: self.sald_konst,
            created_at: self.created_at,
        }
    }
}

#[async_trait::async_trait]
impl CustomerStore for RemoteStore {
    async fn insert_customer(&self, draft: &CustomerDraft) -> Result<String, StoreError> {
        let response = self
            .request(Method::POST, &self.table_url("customers"))
            .header("Prefer", "return=representation")
            .json(&[CustomerPayload::from_draft(draft)])
            .send()
            .await
            .map_err(to_backend)?;
        let response = Self::check(response).await?;

        let rows: Vec<CustomerWire> = response.json().await.map_err(to_backend)?;
        rows.into_iter()
            .next()
            .map(|row| row.id)
            .ok_or_else(|| StoreError::Backend(anyhow!("Insert returned no record")))
    }

    async fn insert_contacts(
        &self,
        customer_id: &str,
        contacts: &[ContactDraft],
    ) -> Result<(), StoreError> {
        if contacts.is_empty() {
            return Ok(());
        }
        let payloads: Vec<ContactPayload> = contacts
            .iter()
            .map(|c| ContactPayload::from_draft(customer_id, c))
            .collect();
        let response = self
            .request(Method::POST, &self.table_url("contacts"))
            .json(&payloads)
            .send()
            .await
            .map_err(to_backend)?;
        Self::check(response).await?;
        Ok(())
    }

    async fn insert_sales(
        &self,
        customer_id: &str,
        sales: &[SaleDraft],
    ) -> Result<(), StoreError> {
        if sales.is_empty() {
            return Ok(());
        }
        let payloads: Vec<SalePayload> = sales
            .iter()
            .map(|s| SalePayload::from_draft(customer_id, s))
            .collect();
        let response = self
            .request(Method::POST, &self.table_url("sales"))
            .json(&payloads)
            .send()
            .await
            .map_err(to_backend)?;
        Self::check(response).await?;
        Ok(())
    }

    async fn update_customer(&self, id: &str, draft: &CustomerDraft) -> Result<(), StoreError> {
        let mut payload = CustomerPayload::from_draft(draft);
        payload.updated_at = Some(Utc::now().to_rfc3339());

        let response = self
            .request(Method::PATCH, &self.table_url("customers"))
            .query(&[("id", format!("eq.{}", id))])
            .header("Prefer", "return=representation")
            .json(&payload)
            .send()
            .await
            .map_err(to_backend)?;
        let response = Self::check(response).await?;

        let rows: Vec<serde_json::Value> = response.json().await.map_err(to_backend)?;
        if rows.is_empty() {
            return Err(StoreError::NotFound(id.to_string()));
        }
        Ok(())
    }

    async fn delete_customer(&self, id: &str) -> Result<(), StoreError> {
        let response = self
            .request(Method::DELETE, &self.table_url("customers"))
            .query(&[("id", format!("eq.{}", id))])
            .header("Prefer", "return=representation")
            .send()
            .await
            .map_err(to_backend)?;
        let response = Self::check(response).await?;

        let rows: Vec<serde_json::Value> = response.json().await.map_err(to_backend)?;
        if rows.is_empty() {
            return Err(StoreError::NotFound(id.to_string()));
        }
        Ok(())
    }

    async fn list_customers(&self) -> Result<Vec<CustomerRecord>, StoreError> {
        let response = self
            .request(Method::GET, &self.table_url("customers"))
            .query(&[
                ("select", "*,contacts(*),sales(*)"),
                ("order", "foretagsnamn.asc"),
            ])
            .send()
            .await
            .map_err(to_backend)?;
        let response = Self::check(response).await?;

        let rows: Vec<CustomerWire> = response.json().await.map_err(to_backend)?;
        Ok(rows.into_iter().map(CustomerWire::into_record).collect())
    }
}
