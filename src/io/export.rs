use anyhow::Result;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::io::Write;

use crate::application::LedgerService;
use crate::domain::{format_amount, Expense};

/// Ledger snapshot file for full export/import.
/// The metadata fields are optional on the way back in, so a bare
/// `{"people": ..., "expenses": ...}` document also imports.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SnapshotFile {
    #[serde(default)]
    pub version: String,
    #[serde(default)]
    pub exported_at: Option<DateTime<Utc>>,
    pub people: Vec<String>,
    pub expenses: Vec<Expense>,
}

/// Writes ledger data out in the supported formats
pub struct Exporter<'a> {
    service: &'a LedgerService,
}

impl<'a> Exporter<'a> {
    pub fn new(service: &'a LedgerService) -> Self {
        Self { service }
    }

    /// Export balances and the settlement plan as plain text:
    ///
    /// ```text
    /// Balances:
    /// Anna: 20.00
    /// Ben: -10.00
    ///
    /// Settlement:
    /// Ben pays Anna: 10.00
    /// ```
    ///
    /// The Settlement section is omitted entirely when nothing needs to move.
    pub async fn export_settlement_text<W: Write>(&self, mut writer: W) -> Result<()> {
        let balances = self.service.balances().await?;
        let payments = self.service.settlement().await?;

        writeln!(writer, "Balances:")?;
        for entry in &balances {
            writeln!(writer, "{}: {}", entry.person, format_amount(entry.balance))?;
        }

        if !payments.is_empty() {
            writeln!(writer)?;
            writeln!(writer, "Settlement:")?;
            for payment in &payments {
                writeln!(
                    writer,
                    "{} pays {}: {}",
                    payment.from,
                    payment.to,
                    format_amount(payment.amount)
                )?;
            }
        }

        writer.flush()?;
        Ok(())
    }

    /// Export expenses to CSV format. Split members are joined with `;`
    /// inside the last column.
    pub async fn export_expenses_csv<W: Write>(&self, writer: W) -> Result<usize> {
        let expenses = self.service.list_expenses().await?;
        let mut csv_writer = csv::Writer::from_writer(writer);

        csv_writer.write_record(&["index", "amount", "paid_by", "split_between"])?;

        let mut count = 0;
        for (index, expense) in expenses.iter().enumerate() {
            csv_writer.write_record(&[
                index.to_string(),
                format_amount(expense.amount),
                expense.paid_by.clone(),
                expense.split_between.join(";"),
            ])?;
            count += 1;
        }

        csv_writer.flush()?;
        Ok(count)
    }

    /// Export balances to CSV format
    pub async fn export_balances_csv<W: Write>(&self, writer: W) -> Result<usize> {
        let balances = self.service.balances().await?;
        let mut csv_writer = csv::Writer::from_writer(writer);

        csv_writer.write_record(&["person", "balance"])?;

        let mut count = 0;
        for entry in &balances {
            csv_writer.write_record(&[&entry.person, &format_amount(entry.balance)])?;
            count += 1;
        }

        csv_writer.flush()?;
        Ok(count)
    }

    /// Export the full ledger as a JSON snapshot
    pub async fn export_snapshot_json<W: Write>(&self, mut writer: W) -> Result<SnapshotFile> {
        let snapshot = self.service.snapshot().await?;

        let file = SnapshotFile {
            version: env!("CARGO_PKG_VERSION").to_string(),
            exported_at: Some(Utc::now()),
            people: snapshot.people,
            expenses: snapshot.expenses,
        };

        let json = serde_json::to_string_pretty(&file)?;
        writer.write_all(json.as_bytes())?;
        writer.flush()?;

        Ok(file)
    }
}
