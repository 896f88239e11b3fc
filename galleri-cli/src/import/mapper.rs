//! Row-to-record mapping for the spreadsheet import
//!
//! Pure transformation from one raw row (plus its zero-based position) to a
//! customer draft, 0-3 contact drafts, and at most one sale draft. No hidden
//! state: the same row and index always map to the same output.

use calamine::Data;
use once_cell::sync::Lazy;
use regex::Regex;

use crate::model::{ActiveStatus, ContactDraft, CustomerDraft, SaleDraft};

use super::columns::{self, ContactColumns, RawCells, first_cell, first_value};
use super::date::normalize_date;

/// One untyped spreadsheet row plus its zero-based data-row position
#[derive(Debug, Clone)]
pub struct RawRow {
    pub index: usize,
    pub cells: RawCells,
}

/// Mapper output for one row
#[derive(Debug, Clone, PartialEq)]
pub struct MappedRow {
    pub customer: CustomerDraft,
    pub contacts: Vec<ContactDraft>,
    pub sale: Option<SaleDraft>,
}

/// Trailing Swedish postal code: three digits, optional space, two digits
static POSTAL_SUFFIX: Lazy<Regex> = Lazy::new(|| Regex::new(r"(\d{3})\s?(\d{2})\s*$").unwrap());

/// Map one raw row into backend-neutral drafts
pub fn map_row(row: &RawRow) -> MappedRow {
    let cells = &row.cells;

    let customer_no = first_value(cells, columns::CUSTOMER_NO)
        .unwrap_or_else(|| format!("K{:03}", row.index + 1));

    let status = first_value(cells, columns::STATUS)
        .and_then(|raw| ActiveStatus::parse(&raw))
        .unwrap_or(ActiveStatus::Inactive);

    let company_name = first_value(cells, columns::COMPANY_NAME).unwrap_or_default();
    let address = first_value(cells, columns::ADDRESS);
    let phone = first_value(cells, columns::PHONE);
    let visit_booked = first_value(cells, columns::VISIT_BOOKED)
        .map(|raw| parse_yes(&raw))
        .unwrap_or(false);

    let mut postal_code = first_value(cells, columns::POSTAL_CODE);
    let mut city = first_value(cells, columns::CITY);
    if city.is_none() {
        if let Some(combined) = first_value(cells, columns::COMBINED_CITY) {
            let (split_city, split_postal) = split_postal_city(&combined);
            city = Some(split_city);
            if postal_code.is_none() {
                postal_code = split_postal;
            }
        }
    }

    let customer = CustomerDraft {
        customer_no,
        status,
        company_name,
        address,
        postal_code,
        city,
        phone,
        visit_booked,
        notes: build_notes(cells),
    };

    let contacts = columns::CONTACT_COLUMNS
        .iter()
        .filter_map(|cols| map_contact(cells, cols))
        .collect();

    MappedRow {
        customer,
        contacts,
        sale: map_sale(cells),
    }
}

/// Split a combined "city + postal code" value. On a trailing postal-code
/// match the remainder is the city and the code is normalized to one
/// internal space; otherwise the whole value is the city.
pub fn split_postal_city(combined: &str) -> (String, Option<String>) {
    match POSTAL_SUFFIX.captures(combined) {
        Some(caps) => {
            let full = caps.get(0).unwrap();
            let city = combined[..full.start()].trim().to_string();
            let postal = format!("{} {}", &caps[1], &caps[2]);
            (city, Some(postal))
        }
        None => (combined.trim().to_string(), None),
    }
}

fn parse_yes(raw: &str) -> bool {
    matches!(raw.trim().to_uppercase().as_str(), "JA" | "JAA" | "TRUE" | "1")
}

/// Concatenate the optional note sections present on the row, each rendered
/// as "label: value", joined by blank lines
fn build_notes(cells: &RawCells) -> Option<String> {
    let sections: Vec<String> = columns::NOTES_SECTIONS
        .iter()
        .filter_map(|(label, candidates)| {
            first_value(cells, candidates).map(|value| format!("{}: {}", label, value))
        })
        .collect();

    if sections.is_empty() {
        None
    } else {
        Some(sections.join("\n\n"))
    }
}

/// A contact draft exists iff the role's name or email column is non-empty
fn map_contact(cells: &RawCells, cols: &ContactColumns) -> Option<ContactDraft> {
    let name = first_value(cells, cols.name);
    let email = first_value(cells, cols.email);
    if name.is_none() && email.is_none() {
        return None;
    }

    Some(ContactDraft {
        role: cols.role,
        name,
        phone: first_value(cells, cols.phone),
        mobile: first_value(cells, cols.mobile),
        email,
        last_contact: first_cell(cells, cols.last_contact).and_then(raw_date_text),
        follow_up: first_cell(cells, cols.follow_up).and_then(raw_date_text),
    })
}

/// At most one sale per row, gated on both the bought-art and last-visit
/// columns being non-empty. Spreadsheets carry no amount, so it defaults
/// to zero.
fn map_sale(cells: &RawCells) -> Option<SaleDraft> {
    let bought = first_value(cells, columns::BOUGHT_ART)?;
    let visit = first_cell(cells, columns::LAST_VISIT)?;

    Some(SaleDraft {
        date: normalize_date(visit),
        amount: 0.0,
        description: Some(bought),
    })
}

/// Draft representation of a date-ish cell. Text cells keep their raw value
/// (backends normalize at persistence time); numeric serials have no useful
/// raw text, so they are converted up front.
fn raw_date_text(cell: &Data) -> Option<String> {
    match cell {
        Data::String(s) => {
            let trimmed = s.trim();
            if trimmed.is_empty() {
                None
            } else {
                Some(trimmed.to_string())
            }
        }
        Data::Int(_) | Data::Float(_) | Data::DateTime(_) => normalize_date(cell),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::ContactRole;

    fn row(index: usize, pairs: &[(&str, &str)]) -> RawRow {
        let mut cells = RawCells::new();
        for (key, value) in pairs {
            cells.insert(key.to_string(), Data::String(value.to_string()));
        }
        RawRow { index, cells }
    }

    #[test]
    fn test_basic_fields_map_through() {
        let mapped = map_row(&row(
            0,
            &[
                ("Kundnr", "K042"),
                ("Företagsnamn", "Konstföreningen Norr"),
                ("Aktiv", "JAA"),
                ("Adress", "Storgatan 1"),
                ("Postnummer", "111 22"),
                ("Stad", "STOCKHOLM"),
                ("Telefon", "08-123 45 67"),
                ("Bokat besök", "Ja"),
            ],
        ));

        let c = &mapped.customer;
        assert_eq!(c.customer_no, "K042");
        assert_eq!(c.company_name, "Konstföreningen Norr");
        assert_eq!(c.status, ActiveStatus::Fully);
        assert_eq!(c.address.as_deref(), Some("Storgatan 1"));
        assert_eq!(c.postal_code.as_deref(), Some("111 22"));
        assert_eq!(c.city.as_deref(), Some("STOCKHOLM"));
        assert!(c.visit_booked);
        assert!(mapped.contacts.is_empty());
        assert!(mapped.sale.is_none());
    }

    #[test]
    fn test_missing_customer_no_is_synthesized_from_position() {
        let mapped = map_row(&row(0, &[("Företagsnamn", "A")]));
        assert_eq!(mapped.customer.customer_no, "K001");

        let mapped = map_row(&row(41, &[("Företagsnamn", "A")]));
        assert_eq!(mapped.customer.customer_no, "K042");
    }

    #[test]
    fn test_missing_status_defaults_to_inactive() {
        let mapped = map_row(&row(0, &[("Företagsnamn", "A")]));
        assert_eq!(mapped.customer.status, ActiveStatus::Inactive);

        let mapped = map_row(&row(0, &[("Företagsnamn", "A"), ("Aktiv", "kanske")]));
        assert_eq!(mapped.customer.status, ActiveStatus::Inactive);
    }

    #[test]
    fn test_mangled_headers_are_recognized() {
        let mapped = map_row(&row(
            0,
            &[("FÃ¶retagsnamn", "Mangled AB"), ("Bokat besÃ¶k", "Ja")],
        ));
        assert_eq!(mapped.customer.company_name, "Mangled AB");
        assert!(mapped.customer.visit_booked);
    }

    #[test]
    fn test_combined_city_field_splits_trailing_postal_code() {
        let mapped = map_row(&row(
            0,
            &[("Företagsnamn", "A"), ("Postadress", "BEDDINGESTRAND 231 76")],
        ));
        assert_eq!(mapped.customer.city.as_deref(), Some("BEDDINGESTRAND"));
        assert_eq!(mapped.customer.postal_code.as_deref(), Some("231 76"));
    }

    #[test]
    fn test_combined_city_without_postal_code_is_city_only() {
        let mapped = map_row(&row(
            0,
            &[("Företagsnamn", "A"), ("Postadress", "STOCKHOLM")],
        ));
        assert_eq!(mapped.customer.city.as_deref(), Some("STOCKHOLM"));
        assert_eq!(mapped.customer.postal_code, None);
    }

    #[test]
    fn test_explicit_postal_code_wins_over_split() {
        let mapped = map_row(&row(
            0,
            &[
                ("Företagsnamn", "A"),
                ("Postnummer", "999 99"),
                ("Postadress", "BEDDINGESTRAND 231 76"),
            ],
        ));
        assert_eq!(mapped.customer.postal_code.as_deref(), Some("999 99"));
        assert_eq!(mapped.customer.city.as_deref(), Some("BEDDINGESTRAND"));
    }

    #[test]
    fn test_postal_split_normalizes_missing_space() {
        let (city, postal) = split_postal_city("MALMÖ 21145");
        assert_eq!(city, "MALMÖ");
        assert_eq!(postal.as_deref(), Some("211 45"));
    }

    #[test]
    fn test_notes_sections_join_in_order_with_blank_lines() {
        let mapped = map_row(&row(
            0,
            &[
                ("Företagsnamn", "A"),
                ("Erbjudande 1", "Utskick vår 2023"),
                ("Intresse", "Grafik"),
            ],
        ));
        assert_eq!(
            mapped.customer.notes.as_deref(),
            Some("Intresse: Grafik\n\nErbjudande 1: Utskick vår 2023")
        );
    }

    #[test]
    fn test_no_note_sections_means_no_notes() {
        let mapped = map_row(&row(0, &[("Företagsnamn", "A")]));
        assert_eq!(mapped.customer.notes, None);
    }

    #[test]
    fn test_contact_requires_name_or_email() {
        let mapped = map_row(&row(
            0,
            &[("Företagsnamn", "A"), ("Telefon ordförande", "070-111")],
        ));
        assert!(mapped.contacts.is_empty());

        let mapped = map_row(&row(
            0,
            &[("Företagsnamn", "A"), ("E-post kassör", "bo@exempel.se")],
        ));
        assert_eq!(mapped.contacts.len(), 1);
        assert_eq!(mapped.contacts[0].role, ContactRole::Treasurer);
        assert_eq!(mapped.contacts[0].email.as_deref(), Some("bo@exempel.se"));
        assert_eq!(mapped.contacts[0].name, None);
    }

    #[test]
    fn test_all_three_roles_extract_independently() {
        let mapped = map_row(&row(
            0,
            &[
                ("Företagsnamn", "A"),
                ("Ordförande", "Anna"),
                ("Kassör", "Bo"),
                ("Ansvarig", "Cecilia"),
                ("Senast kontakt ordförande", "2023-04"),
            ],
        ));
        assert_eq!(mapped.contacts.len(), 3);
        assert_eq!(mapped.contacts[0].role, ContactRole::Chairperson);
        // Raw text is kept in the draft; backends normalize on persist
        assert_eq!(mapped.contacts[0].last_contact.as_deref(), Some("2023-04"));
    }

    #[test]
    fn test_sale_requires_both_bought_art_and_last_visit() {
        let mapped = map_row(&row(
            0,
            &[("Företagsnamn", "A"), ("Köpt konst", "Litografi")],
        ));
        assert!(mapped.sale.is_none());

        let mapped = map_row(&row(
            0,
            &[
                ("Företagsnamn", "A"),
                ("Köpt konst", "Litografi"),
                ("Senaste besök", "2023-05-17"),
            ],
        ));
        let sale = mapped.sale.unwrap();
        assert_eq!(sale.date.as_deref(), Some("2023-05-17"));
        assert_eq!(sale.amount, 0.0);
        assert_eq!(sale.description.as_deref(), Some("Litografi"));
    }

    #[test]
    fn test_numeric_visit_serial_becomes_calendar_date() {
        let mut cells = RawCells::new();
        cells.insert("Företagsnamn".to_string(), Data::String("A".to_string()));
        cells.insert("Köpt konst".to_string(), Data::String("Olja".to_string()));
        cells.insert("Senaste besök".to_string(), Data::Float(32.0));
        let mapped = map_row(&RawRow { index: 0, cells });
        assert_eq!(mapped.sale.unwrap().date.as_deref(), Some("1900-02-01"));
    }

    #[test]
    fn test_mapping_is_deterministic() {
        let raw = row(
            3,
            &[
                ("Företagsnamn", "A"),
                ("Postadress", "LUND 223 50"),
                ("Ordförande", "Anna"),
                ("Intresse", "Skulptur"),
            ],
        );
        assert_eq!(map_row(&raw), map_row(&raw));
    }
}
