//! Sequential batch import with per-row failure tolerance
//!
//! Rows are persisted strictly in input order, one at a time, so progress is
//! monotonic and deterministic. A failed customer insert fails that row only;
//! a duplicate customer number is silently skipped (re-imported spreadsheets
//! are expected); contact and sale failures are logged but never fail a row
//! whose customer already persisted. Nothing is retried or rolled back.

use crate::store::{CustomerStore, StoreError};

use super::mapper::{RawRow, map_row};

/// Running state reported after every row
#[derive(Debug, Clone, Copy)]
pub struct ImportProgress {
    /// 1-based row just processed
    pub row: usize,
    pub total: usize,
    pub imported: usize,
    pub failed: usize,
    pub skipped: usize,
}

/// Aggregate result of one import run
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ImportSummary {
    pub imported: usize,
    pub failed: usize,
    /// Duplicate customer numbers: neither success nor failure
    pub skipped: usize,
}

pub struct BatchImporter<'a> {
    store: &'a dyn CustomerStore,
}

impl<'a> BatchImporter<'a> {
    pub fn new(store: &'a dyn CustomerStore) -> Self {
        Self { store }
    }

    /// Run the import over `rows`, invoking `progress` after each row.
    /// Takes `&mut self` so one importer drives at most one run at a time.
    pub async fn run<F>(&mut self, rows: &[RawRow], mut progress: F) -> ImportSummary
    where
        F: FnMut(&ImportProgress),
    {
        let mut summary = ImportSummary::default();
        let total = rows.len();

        for (pos, row) in rows.iter().enumerate() {
            let mapped = map_row(row);
            let row_num = pos + 1;

            match self.store.insert_customer(&mapped.customer).await {
                Ok(customer_id) => {
                    summary.imported += 1;

                    if !mapped.contacts.is_empty() {
                        if let Err(e) = self
                            .store
                            .insert_contacts(&customer_id, &mapped.contacts)
                            .await
                        {
                            log::warn!(
                                "Row {}: contacts for {} not saved: {}",
                                row_num,
                                mapped.customer.customer_no,
                                e
                            );
                        }
                    }

                    if let Some(sale) = &mapped.sale {
                        if let Err(e) = self
                            .store
                            .insert_sales(&customer_id, std::slice::from_ref(sale))
                            .await
                        {
                            log::warn!(
                                "Row {}: sale for {} not saved: {}",
                                row_num,
                                mapped.customer.customer_no,
                                e
                            );
                        }
                    }
                }
                Err(StoreError::UniqueViolation) => {
                    summary.skipped += 1;
                    log::debug!(
                        "Row {}: customer number {} already exists, skipped",
                        row_num,
                        mapped.customer.customer_no
                    );
                }
                Err(e) => {
                    summary.failed += 1;
                    log::warn!(
                        "Row {}: failed to insert customer {}: {}",
                        row_num,
                        mapped.customer.customer_no,
                        e
                    );
                }
            }

            progress(&ImportProgress {
                row: row_num,
                total,
                imported: summary.imported,
                failed: summary.failed,
                skipped: summary.skipped,
            });
        }

        summary
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::import::columns::RawCells;
    use crate::model::{ContactDraft, CustomerDraft, CustomerRecord, SaleDraft};
    use crate::store::LocalStore;
    use anyhow::anyhow;
    use async_trait::async_trait;
    use calamine::Data;
    use std::sync::Mutex;

    fn make_row(index: usize, customer_no: &str) -> RawRow {
        let mut cells = RawCells::new();
        cells.insert("Kundnr".to_string(), Data::String(customer_no.to_string()));
        cells.insert(
            "Företagsnamn".to_string(),
            Data::String(format!("Förening {}", customer_no)),
        );
        RawRow { index, cells }
    }

    /// Store double that fails by customer number
    #[derive(Default)]
    struct ScriptedStore {
        duplicates: Vec<String>,
        failures: Vec<String>,
        fail_sub_records: bool,
        inserted: Mutex<Vec<String>>,
    }

    #[async_trait]
    impl CustomerStore for ScriptedStore {
        async fn insert_customer(&self, draft: &CustomerDraft) -> Result<String, StoreError> {
            if self.duplicates.contains(&draft.customer_no) {
                return Err(StoreError::UniqueViolation);
            }
            if self.failures.contains(&draft.customer_no) {
                return Err(StoreError::Backend(anyhow!("write failed")));
            }
            self.inserted.lock().unwrap().push(draft.customer_no.clone());
            Ok(format!("id-{}", draft.customer_no))
        }

        async fn insert_contacts(
            &self,
            _customer_id: &str,
            _contacts: &[ContactDraft],
        ) -> Result<(), StoreError> {
            if self.fail_sub_records {
                return Err(StoreError::Backend(anyhow!("contacts failed")));
            }
            Ok(())
        }

        async fn insert_sales(
            &self,
            _customer_id: &str,
            _sales: &[SaleDraft],
        ) -> Result<(), StoreError> {
            if self.fail_sub_records {
                return Err(StoreError::Backend(anyhow!("sales failed")));
            }
            Ok(())
        }

        async fn update_customer(
            &self,
            _id: &str,
            _draft: &CustomerDraft,
        ) -> Result<(), StoreError> {
            Ok(())
        }

        async fn delete_customer(&self, _id: &str) -> Result<(), StoreError> {
            Ok(())
        }

        async fn list_customers(&self) -> Result<Vec<CustomerRecord>, StoreError> {
            Ok(Vec::new())
        }
    }

    #[tokio::test]
    async fn test_duplicate_row_is_skipped_not_failed() {
        let store = ScriptedStore {
            duplicates: vec!["K002".to_string()],
            ..Default::default()
        };
        let rows = vec![make_row(0, "K001"), make_row(1, "K002"), make_row(2, "K003")];

        let mut seen = Vec::new();
        let summary = BatchImporter::new(&store)
            .run(&rows, |p| seen.push(p.row))
            .await;

        assert_eq!(summary.imported, 2);
        assert_eq!(summary.failed, 0);
        assert_eq!(summary.skipped, 1);
        // Progress fires for every row, in input order
        assert_eq!(seen, vec![1, 2, 3]);
    }

    #[tokio::test]
    async fn test_failed_row_does_not_abort_the_batch() {
        let store = ScriptedStore {
            failures: vec!["K002".to_string()],
            ..Default::default()
        };
        let rows = vec![make_row(0, "K001"), make_row(1, "K002"), make_row(2, "K003")];

        let summary = BatchImporter::new(&store).run(&rows, |_| {}).await;

        assert_eq!(summary.imported, 2);
        assert_eq!(summary.failed, 1);
        assert_eq!(summary.skipped, 0);
        // Rows 1 and 3 persisted regardless of row 2
        assert_eq!(
            *store.inserted.lock().unwrap(),
            vec!["K001".to_string(), "K003".to_string()]
        );
    }

    #[tokio::test]
    async fn test_sub_record_failure_keeps_the_row_a_success() {
        let store = ScriptedStore {
            fail_sub_records: true,
            ..Default::default()
        };
        let mut row = make_row(0, "K001");
        row.cells.insert(
            "Ordförande".to_string(),
            Data::String("Anna".to_string()),
        );
        row.cells.insert(
            "Köpt konst".to_string(),
            Data::String("Litografi".to_string()),
        );
        row.cells.insert(
            "Senaste besök".to_string(),
            Data::String("2023-05-17".to_string()),
        );

        let summary = BatchImporter::new(&store).run(&[row], |_| {}).await;

        assert_eq!(summary.imported, 1);
        assert_eq!(summary.failed, 0);
    }

    #[tokio::test]
    async fn test_progress_counts_accumulate() {
        let store = ScriptedStore {
            duplicates: vec!["K002".to_string()],
            failures: vec!["K003".to_string()],
            ..Default::default()
        };
        let rows = vec![make_row(0, "K001"), make_row(1, "K002"), make_row(2, "K003")];

        let mut snapshots = Vec::new();
        BatchImporter::new(&store)
            .run(&rows, |p| snapshots.push((p.imported, p.skipped, p.failed)))
            .await;

        assert_eq!(snapshots, vec![(1, 0, 0), (1, 1, 0), (1, 1, 1)]);
    }

    #[tokio::test]
    async fn test_import_into_local_store_end_to_end() {
        let store = LocalStore::open_in_memory().await.unwrap();
        let mut row = make_row(0, "K001");
        row.cells.insert(
            "Ordförande".to_string(),
            Data::String("Anna Svensson".to_string()),
        );
        row.cells.insert(
            "Postadress".to_string(),
            Data::String("BEDDINGESTRAND 231 76".to_string()),
        );
        let rows = vec![row, make_row(1, "K001")]; // second row is a duplicate

        let summary = BatchImporter::new(&store).run(&rows, |_| {}).await;
        assert_eq!(summary.imported, 1);
        assert_eq!(summary.skipped, 1);

        let records = store.list_customers().await.unwrap();
        assert_eq!(records.len(), 1);
        assert_eq!(records[0].customer.postal_code.as_deref(), Some("231 76"));
        assert_eq!(records[0].contacts.len(), 1);
        assert_eq!(records[0].contacts[0].name.as_deref(), Some("Anna Svensson"));
    }
}
