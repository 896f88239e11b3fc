//! Source column tables for the spreadsheet import
//!
//! Spreadsheet headers vary between exports: Swedish labels, lowercase
//! database-style keys, and UTF-8-mangled variants of the same label
//! (`Företagsnamn` read back as `FÃ¶retagsnamn`). Each destination field
//! lists its candidate headers in priority order, consumed by a single
//! first-non-empty resolver. New spreadsheet dialects are handled by
//! extending these tables, not by adding branches.

use std::collections::HashMap;

use calamine::Data;

use crate::model::ContactRole;

/// Header-to-cell map for one data row
pub type RawCells = HashMap<String, Data>;

pub const CUSTOMER_NO: &[&str] = &["Kundnr", "kundnr"];
pub const STATUS: &[&str] = &["Aktiv", "aktiv"];
pub const COMPANY_NAME: &[&str] = &[
    "Företagsnamn",
    "FÃ¶retagsnamn",
    "foretagsnamn",
    "Företag",
    "FÃ¶retag",
    "Förening",
    "FÃ¶rening",
];
pub const ADDRESS: &[&str] = &["Adress", "adress"];
pub const POSTAL_CODE: &[&str] = &["Postnummer", "postnummer"];
pub const CITY: &[&str] = &["Stad", "stad"];
/// Combined "city + postal code" column, split by the mapper
pub const COMBINED_CITY: &[&str] = &["Postadress", "postadress"];
pub const PHONE: &[&str] = &[
    "Telefon",
    "telefon",
    "Telefon företag",
    "Telefon fÃ¶retag",
];
pub const VISIT_BOOKED: &[&str] = &["Bokat besök", "Bokat besÃ¶k", "bokat_besok"];

/// Optional sections concatenated into the notes field, in this order
pub const NOTES_SECTIONS: &[(&str, &[&str])] = &[
    ("Intresse", &["Intresse", "intresse"]),
    ("Senaste köp", &["Senaste köp", "Senaste kÃ¶p"]),
    ("Tidigare köp", &["Tidigare köp", "Tidigare kÃ¶p"]),
    ("Erbjudande 1", &["Erbjudande 1", "Erbjudande 1 skickat"]),
    ("Erbjudande 2", &["Erbjudande 2", "Erbjudande 2 skickat"]),
];

/// Sale gating columns: a sale draft requires both
pub const BOUGHT_ART: &[&str] = &["Köpt konst", "KÃ¶pt konst", "köpt konst"];
pub const LAST_VISIT: &[&str] = &["Senaste besök", "Senaste besÃ¶k"];

/// Candidate columns for one contact role
pub struct ContactColumns {
    pub role: ContactRole,
    pub name: &'static [&'static str],
    pub phone: &'static [&'static str],
    pub mobile: &'static [&'static str],
    pub email: &'static [&'static str],
    pub last_contact: &'static [&'static str],
    pub follow_up: &'static [&'static str],
}

pub const CONTACT_COLUMNS: [ContactColumns; 3] = [
    ContactColumns {
        role: ContactRole::Chairperson,
        name: &["Ordförande", "OrdfÃ¶rande", "ordforande"],
        phone: &["Telefon ordförande", "Telefon ordfÃ¶rande"],
        mobile: &["Mobil ordförande", "Mobil ordfÃ¶rande"],
        email: &["E-post ordförande", "E-post ordfÃ¶rande", "Email ordförande"],
        last_contact: &["Senast kontakt ordförande", "Senast kontakt ordfÃ¶rande"],
        follow_up: &["Återkom ordförande", "Ã…terkom ordfÃ¶rande"],
    },
    ContactColumns {
        role: ContactRole::Treasurer,
        name: &["Kassör", "KassÃ¶r", "kassor"],
        phone: &["Telefon kassör", "Telefon kassÃ¶r"],
        mobile: &["Mobil kassör", "Mobil kassÃ¶r"],
        email: &["E-post kassör", "E-post kassÃ¶r", "Email kassör"],
        last_contact: &["Senast kontakt kassör", "Senast kontakt kassÃ¶r"],
        follow_up: &["Återkom kassör", "Ã…terkom kassÃ¶r"],
    },
    ContactColumns {
        role: ContactRole::Responsible,
        name: &["Ansvarig", "ansvarig"],
        phone: &["Telefon ansvarig"],
        mobile: &["Mobil ansvarig"],
        email: &["E-post ansvarig", "Email ansvarig"],
        last_contact: &["Senast kontakt ansvarig", "Senast kontakt"],
        follow_up: &["Återkom ansvarig", "Ã…terkom ansvarig", "Återkom", "Ã…terkom"],
    },
];

/// Render one cell as trimmed text. Whole-number floats drop the fraction
/// (calamine reads integer cells back as floats).
pub fn cell_text(cell: &Data) -> String {
    let text = match cell {
        Data::String(s) => s.clone(),
        Data::Int(i) => i.to_string(),
        Data::Float(f) => {
            if f.fract() == 0.0 {
                (*f as i64).to_string()
            } else {
                f.to_string()
            }
        }
        Data::Bool(b) => b.to_string(),
        _ => String::new(),
    };
    text.trim().to_string()
}

/// First present, non-empty value among the candidate headers
pub fn first_value(row: &RawCells, candidates: &[&str]) -> Option<String> {
    for key in candidates {
        if let Some(cell) = row.get(*key) {
            let text = cell_text(cell);
            if !text.is_empty() {
                return Some(text);
            }
        }
    }
    None
}

/// First present, non-empty raw cell. Used for date columns, where numeric
/// serials must not be flattened to text before normalization.
pub fn first_cell<'a>(row: &'a RawCells, candidates: &[&str]) -> Option<&'a Data> {
    for key in candidates {
        if let Some(cell) = row.get(*key) {
            if !cell_text(cell).is_empty() || matches!(cell, Data::DateTime(_)) {
                return Some(cell);
            }
        }
    }
    None
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_first_value_respects_priority_and_skips_empty() {
        let mut row = RawCells::new();
        row.insert("FÃ¶retagsnamn".to_string(), Data::String("Mangled AB".to_string()));
        row.insert("Företagsnamn".to_string(), Data::String("  ".to_string()));
        assert_eq!(
            first_value(&row, COMPANY_NAME),
            Some("Mangled AB".to_string())
        );

        row.insert("Företagsnamn".to_string(), Data::String("Riktig AB".to_string()));
        assert_eq!(first_value(&row, COMPANY_NAME), Some("Riktig AB".to_string()));
    }

    #[test]
    fn test_cell_text_renders_whole_floats_as_integers() {
        assert_eq!(cell_text(&Data::Float(42.0)), "42");
        assert_eq!(cell_text(&Data::Float(42.5)), "42.5");
        assert_eq!(cell_text(&Data::Int(7)), "7");
        assert_eq!(cell_text(&Data::Bool(true)), "true");
        assert_eq!(cell_text(&Data::Empty), "");
    }
}
