//! Import command handler

use std::path::Path;

use anyhow::Result;
use colored::*;

use crate::import::batch::BatchImporter;
use crate::import::reader;
use crate::store::CustomerStore;

pub async fn handle_import(store: &dyn CustomerStore, file: &Path) -> Result<()> {
    // An unreadable file aborts the whole import with one error;
    // everything past this point is row-granular
    let rows = reader::read_rows(file)?;
    if rows.is_empty() {
        println!("No data rows found in {}", file.display());
        return Ok(());
    }

    println!("Importing {} rows from {}", rows.len(), file.display());

    let mut importer = BatchImporter::new(store);
    let summary = importer
        .run(&rows, |p| {
            print!(
                "\r  row {}/{}: {} imported, {} skipped, {} failed",
                p.row, p.total, p.imported, p.skipped, p.failed
            );
            use std::io::Write;
            let _ = std::io::stdout().flush();
        })
        .await;
    println!();

    println!(
        "Done: {} imported, {} skipped (duplicate customer numbers), {}",
        summary.imported.to_string().green(),
        summary.skipped,
        if summary.failed > 0 {
            format!("{} failed", summary.failed).red().to_string()
        } else {
            "0 failed".to_string()
        }
    );
    if summary.failed > 0 {
        println!(
            "{}",
            "Run with RUST_LOG=warn for per-row diagnostics.".dimmed()
        );
    }

    Ok(())
}
