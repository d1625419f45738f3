use anyhow::Result;
use std::io::Read;

use crate::application::{AppError, LedgerService};
use crate::domain::{parse_amount, Ledger, LedgerError, LedgerSnapshot};
use crate::io::export::SnapshotFile;

/// Result of an import operation
#[derive(Debug, Clone)]
pub struct ImportResult {
    /// People created (CSV import) or contained in the snapshot (full import)
    pub people: usize,
    /// Expenses imported
    pub expenses: usize,
    pub errors: Vec<ImportError>,
}

/// One record the import could not apply, tied to its source line
#[derive(Debug, Clone)]
pub struct ImportError {
    pub line: usize,
    pub field: Option<String>,
    pub error: String,
}

/// Behavior switches for imports
#[derive(Debug, Clone, Default)]
pub struct ImportOptions {
    pub dry_run: bool,
    pub validate_only: bool,
    pub create_missing_people: bool,
}

/// Reads external files into the ledger
pub struct Importer<'a> {
    service: &'a LedgerService,
}

impl<'a> Importer<'a> {
    pub fn new(service: &'a LedgerService) -> Self {
        Self { service }
    }

    /// Import a full JSON snapshot, replacing the stored ledger.
    ///
    /// The snapshot is validated as a whole before anything is written: a
    /// single bad expense rejects the entire file, nothing is repaired or
    /// partially applied.
    pub async fn import_snapshot_json<R: Read>(
        &self,
        reader: R,
        options: ImportOptions,
    ) -> Result<ImportResult> {
        let file: SnapshotFile = serde_json::from_reader(reader)?;
        let snapshot = LedgerSnapshot {
            people: file.people,
            expenses: file.expenses,
        };

        if options.dry_run || options.validate_only {
            Ledger::from_snapshot(&snapshot).map_err(AppError::CorruptedState)?;
        } else {
            self.service.restore(&snapshot).await?;
        }

        Ok(ImportResult {
            people: snapshot.people.len(),
            expenses: snapshot.expenses.len(),
            errors: Vec::new(),
        })
    }

    /// Import expenses from CSV, appending to the current ledger.
    ///
    /// Expects the same column layout the exporter writes
    /// (`index,amount,paid_by,split_between`); the index column is ignored
    /// and the split is read as `;`-joined names. Rows are validated
    /// individually, so one bad row is reported and skipped instead of
    /// aborting the rest.
    pub async fn import_expenses_csv<R: Read>(
        &self,
        reader: R,
        options: ImportOptions,
    ) -> Result<ImportResult> {
        let mut csv_reader = csv::Reader::from_reader(reader);
        let mut imported = 0;
        let mut people_created = 0;
        let mut errors = Vec::new();

        for (line_num, result) in csv_reader.records().enumerate() {
            // Line numbers are for the user: 1-based, counting the header
            let line = line_num + 2;

            let record = match result {
                Ok(r) => r,
                Err(e) => {
                    errors.push(ImportError {
                        line,
                        field: None,
                        error: format!("CSV parse error: {}", e),
                    });
                    continue;
                }
            };

            let amount_str = record.get(1).unwrap_or("");
            let paid_by = record.get(2).unwrap_or("").trim().to_string();
            let split_between: Vec<String> = record
                .get(3)
                .unwrap_or("")
                .split(';')
                .map(|s| s.trim().to_string())
                .filter(|s| !s.is_empty())
                .collect();

            let amount = match parse_amount(amount_str) {
                Ok(a) => a,
                Err(e) => {
                    errors.push(ImportError {
                        line,
                        field: Some("amount".to_string()),
                        error: format!("Invalid amount: {}", e),
                    });
                    continue;
                }
            };

            // Create unknown participants first when asked to
            if options.create_missing_people && !options.dry_run && !options.validate_only {
                match self.ensure_people(&paid_by, &split_between).await {
                    Ok(created) => people_created += created,
                    Err(e) => {
                        errors.push(ImportError {
                            line,
                            field: None,
                            error: format!("Person error: {}", e),
                        });
                        continue;
                    }
                }
            }

            // Dry runs count the row but never write it
            if options.dry_run || options.validate_only {
                imported += 1;
                continue;
            }

            match self.service.add_expense(amount, &paid_by, &split_between).await {
                Ok(_) => {
                    imported += 1;
                }
                Err(e) => {
                    errors.push(ImportError {
                        line,
                        field: None,
                        error: format!("Expense rejected: {}", e),
                    });
                }
            }
        }

        Ok(ImportResult {
            people: people_created,
            expenses: imported,
            errors,
        })
    }

    /// Add every participant of a row that is not in the group yet.
    /// Returns how many were created.
    async fn ensure_people(
        &self,
        paid_by: &str,
        split_between: &[String],
    ) -> Result<usize, AppError> {
        let mut created = 0;

        for name in std::iter::once(paid_by).chain(split_between.iter().map(String::as_str)) {
            match self.service.add_person(name).await {
                Ok(()) => created += 1,
                Err(AppError::Ledger(LedgerError::DuplicatePerson(_))) => {}
                Err(e) => return Err(e),
            }
        }

        Ok(created)
    }
}
