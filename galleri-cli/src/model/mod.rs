//! Domain types for the gallery CRM
//!
//! Draft types are what the import mapper and the forms produce; the store
//! backends consume drafts and hand back full records with store-assigned ids.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Tri-state customer activity, carried over from the legacy spreadsheets
/// (JAA = active, NJA = partially active, NEJ = inactive).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, clap::ValueEnum)]
pub enum ActiveStatus {
    #[serde(rename = "JAA")]
    #[value(name = "jaa")]
    Fully,
    #[serde(rename = "NJA")]
    #[value(name = "nja")]
    Partially,
    #[serde(rename = "NEJ")]
    #[value(name = "nej")]
    Inactive,
}

impl ActiveStatus {
    /// Parse a raw spreadsheet or wire value. Boolean cells from older
    /// exports map to fully active / inactive.
    pub fn parse(raw: &str) -> Option<Self> {
        match raw.trim().to_uppercase().as_str() {
            "JAA" | "JA" | "TRUE" => Some(ActiveStatus::Fully),
            "NJA" => Some(ActiveStatus::Partially),
            "NEJ" | "FALSE" => Some(ActiveStatus::Inactive),
            _ => None,
        }
    }

    /// Legacy wire code stored by both backends
    pub fn as_code(self) -> &'static str {
        match self {
            ActiveStatus::Fully => "JAA",
            ActiveStatus::Partially => "NJA",
            ActiveStatus::Inactive => "NEJ",
        }
    }

    /// Sort rank: fully active sorts above partially active above inactive
    pub fn rank(self) -> u8 {
        match self {
            ActiveStatus::Fully => 3,
            ActiveStatus::Partially => 2,
            ActiveStatus::Inactive => 1,
        }
    }
}

impl std::fmt::Display for ActiveStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ActiveStatus::Fully => write!(f, "active"),
            ActiveStatus::Partially => write!(f, "partially active"),
            ActiveStatus::Inactive => write!(f, "inactive"),
        }
    }
}

/// Fixed contact roles per customer
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ContactRole {
    #[serde(rename = "ordforande")]
    Chairperson,
    #[serde(rename = "kassor")]
    Treasurer,
    #[serde(rename = "ansvarig")]
    Responsible,
}

impl ContactRole {
    pub const ALL: [ContactRole; 3] = [
        ContactRole::Chairperson,
        ContactRole::Treasurer,
        ContactRole::Responsible,
    ];

    /// Wire code used by both backends
    pub fn as_code(self) -> &'static str {
        match self {
            ContactRole::Chairperson => "ordforande",
            ContactRole::Treasurer => "kassor",
            ContactRole::Responsible => "ansvarig",
        }
    }

    pub fn from_code(code: &str) -> Option<Self> {
        match code {
            "ordforande" => Some(ContactRole::Chairperson),
            "kassor" => Some(ContactRole::Treasurer),
            "ansvarig" => Some(ContactRole::Responsible),
            _ => None,
        }
    }
}

impl std::fmt::Display for ContactRole {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ContactRole::Chairperson => write!(f, "chairperson"),
            ContactRole::Treasurer => write!(f, "treasurer"),
            ContactRole::Responsible => write!(f, "responsible"),
        }
    }
}

/// Backend-neutral customer record, as produced by forms and the import
/// mapper. customer_no and company_name are required on create.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CustomerDraft {
    pub customer_no: String,
    pub status: ActiveStatus,
    pub company_name: String,
    pub address: Option<String>,
    pub postal_code: Option<String>,
    pub city: Option<String>,
    pub phone: Option<String>,
    pub visit_booked: bool,
    pub notes: Option<String>,
}

/// Contact draft. Date-ish fields keep whatever text the source carried;
/// backends that enforce a date type normalize at persistence time.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ContactDraft {
    pub role: ContactRole,
    pub name: Option<String>,
    pub phone: Option<String>,
    pub mobile: Option<String>,
    pub email: Option<String>,
    pub last_contact: Option<String>,
    pub follow_up: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SaleDraft {
    pub date: Option<String>,
    pub amount: f64,
    pub description: Option<String>,
}

/// Persisted customer
#[derive(Debug, Clone, Serialize)]
pub struct Customer {
    pub id: String,
    pub customer_no: String,
    pub status: ActiveStatus,
    pub company_name: String,
    pub address: Option<String>,
    pub postal_code: Option<String>,
    pub city: Option<String>,
    pub phone: Option<String>,
    pub visit_booked: bool,
    pub notes: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize)]
pub struct Contact {
    pub id: String,
    pub customer_id: String,
    pub role: ContactRole,
    pub name: Option<String>,
    pub phone: Option<String>,
    pub mobile: Option<String>,
    pub email: Option<String>,
    pub last_contact: Option<String>,
    pub follow_up: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize)]
pub struct Sale {
    pub id: String,
    pub customer_id: String,
    pub date: Option<String>,
    pub amount: f64,
    pub description: Option<String>,
    pub created_at: DateTime<Utc>,
}

/// A customer with its related contacts and sales, as returned by `list`
#[derive(Debug, Clone, Serialize)]
pub struct CustomerRecord {
    pub customer: Customer,
    pub contacts: Vec<Contact>,
    pub sales: Vec<Sale>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_parse_accepts_legacy_codes() {
        assert_eq!(ActiveStatus::parse("JAA"), Some(ActiveStatus::Fully));
        assert_eq!(ActiveStatus::parse("ja"), Some(ActiveStatus::Fully));
        assert_eq!(ActiveStatus::parse("Nja"), Some(ActiveStatus::Partially));
        assert_eq!(ActiveStatus::parse("NEJ"), Some(ActiveStatus::Inactive));
        assert_eq!(ActiveStatus::parse("true"), Some(ActiveStatus::Fully));
        assert_eq!(ActiveStatus::parse("false"), Some(ActiveStatus::Inactive));
        assert_eq!(ActiveStatus::parse("maybe"), None);
        assert_eq!(ActiveStatus::parse(""), None);
    }

    #[test]
    fn test_status_rank_orders_fully_first() {
        assert!(ActiveStatus::Fully.rank() > ActiveStatus::Partially.rank());
        assert!(ActiveStatus::Partially.rank() > ActiveStatus::Inactive.rank());
    }

    #[test]
    fn test_role_codes_round_trip() {
        for role in ContactRole::ALL {
            assert_eq!(ContactRole::from_code(role.as_code()), Some(role));
        }
        assert_eq!(ContactRole::from_code("secretary"), None);
    }
}
