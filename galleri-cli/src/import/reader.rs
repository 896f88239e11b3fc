//! Workbook reading for the customer import
//!
//! First sheet only; the first row is headers and every following non-empty
//! row becomes one raw row keyed by header text. A file that cannot be read
//! as a spreadsheet aborts the whole import with a single error.

use std::path::Path;

use anyhow::{Context, Result};
use calamine::{Data, Reader, Xlsx, open_workbook};

use super::columns::RawCells;
use super::mapper::RawRow;

/// Read all data rows from the first sheet of an Excel workbook
pub fn read_rows(path: &Path) -> Result<Vec<RawRow>> {
    let mut workbook: Xlsx<_> = open_workbook(path)
        .with_context(|| format!("Failed to open spreadsheet: {}", path.display()))?;

    let sheet_name = workbook
        .sheet_names()
        .first()
        .context("Spreadsheet has no sheets")?
        .clone();

    let range = workbook
        .worksheet_range(&sheet_name)
        .with_context(|| format!("Failed to read sheet: {}", sheet_name))?;

    let mut rows = range.rows();
    let headers: Vec<String> = match rows.next() {
        Some(header_row) => header_row
            .iter()
            .map(|cell| cell.to_string().trim().to_string())
            .collect(),
        None => return Ok(Vec::new()),
    };

    let mut out = Vec::new();
    let mut index = 0usize;
    for row in rows {
        // Skip fully empty rows
        if row.iter().all(|cell| cell.to_string().trim().is_empty()) {
            continue;
        }

        let mut cells = RawCells::new();
        for (col, cell) in row.iter().enumerate() {
            if let Some(header) = headers.get(col) {
                if !header.is_empty() && !matches!(cell, Data::Empty) {
                    cells.insert(header.clone(), cell.clone());
                }
            }
        }

        out.push(RawRow { index, cells });
        index += 1;
    }

    log::debug!("Read {} data rows from {}", out.len(), path.display());
    Ok(out)
}
