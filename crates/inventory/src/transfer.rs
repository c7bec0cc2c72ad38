//! Stock import/export.
//!
//! The interchange format is a JSON array of [`StockRow`]s with locations
//! written as `A-1-1`:
//!
//! ```json
//! [{ "product_code": "PRD001", "location": "A-1-1", "cases": 24 }]
//! ```
//!
//! Importing replays each row as an inbound command, so every row goes
//! through the same validation and journaling as a manual receipt.

use chrono::Utc;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use rackledger_core::Actor;
use rackledger_products::ProductCode;

use crate::error::LedgerError;
use crate::ledger::{Inbound, Ledger, LedgerCommand};
use crate::location::Location;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StockRow {
    pub product_code: ProductCode,
    pub location: Location,
    pub cases: i64,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ImportFailure {
    /// Zero-based index of the row in the input.
    pub row: usize,
    pub error: LedgerError,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ImportSummary {
    pub applied: usize,
    pub failures: Vec<ImportFailure>,
}

impl ImportSummary {
    pub(crate) fn fail(&mut self, row: usize, error: LedgerError) {
        tracing::debug!(row, error = %error, "import row rejected");
        self.failures.push(ImportFailure { row, error });
    }

    pub fn is_clean(&self) -> bool {
        self.failures.is_empty()
    }
}

#[derive(Debug, Error)]
pub enum TransferError {
    #[error("malformed stock rows: {0}")]
    Json(#[from] serde_json::Error),
}

pub(crate) fn inbound_command(row: StockRow, actor: &Actor) -> LedgerCommand {
    LedgerCommand::Inbound(Inbound {
        product: row.product_code,
        location: row.location,
        cases: row.cases,
        actor: actor.clone(),
        occurred_at: Utc::now(),
    })
}

/// Apply every row as an inbound; a failing row does not stop the rest.
pub fn import_rows(ledger: &mut Ledger, rows: impl IntoIterator<Item = StockRow>, actor: &Actor) -> ImportSummary {
    let mut summary = ImportSummary::default();
    for (index, row) in rows.into_iter().enumerate() {
        match ledger.execute(&inbound_command(row, actor)) {
            Ok(_) => summary.applied += 1,
            Err(err) => summary.fail(index, err),
        }
    }
    tracing::debug!(applied = summary.applied, failed = summary.failures.len(), "stock import finished");
    summary
}

pub fn import_json(ledger: &mut Ledger, json: &str, actor: &Actor) -> Result<ImportSummary, TransferError> {
    let rows: Vec<StockRow> = serde_json::from_str(json)?;
    Ok(import_rows(ledger, rows, actor))
}

/// Current stock as rows, ordered by location then product.
pub fn export_stock(ledger: &Ledger) -> Vec<StockRow> {
    ledger
        .stock_entries()
        .map(|entry| StockRow {
            product_code: entry.product,
            location: entry.location,
            // The ledger caps every product at `MAX_CASES`, which fits an i64.
            cases: i64::try_from(entry.cases).unwrap_or(i64::MAX),
        })
        .collect()
}

pub fn export_json(ledger: &Ledger) -> Result<String, TransferError> {
    Ok(serde_json::to_string_pretty(&export_stock(ledger))?)
}
