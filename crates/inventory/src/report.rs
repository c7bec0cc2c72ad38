//! Read-side views for the dashboard: product table, shortage list, stock
//! status and transaction history. Rows only; rendering is up to the caller.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use rackledger_core::{Actor, TransactionId};
use rackledger_products::{ProductCode, SortDirection};

use crate::ledger::Ledger;
use crate::location::Location;
use crate::record::{TransactionKind, transaction_id};

/// Scalar columns of the product table that can be sorted on.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum OverviewField {
    Code,
    Name,
    QuantityPerCase,
    TotalCases,
    TotalQuantity,
    MinimumStock,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct OverviewSort {
    pub field: OverviewField,
    pub direction: SortDirection,
}

/// One row of the product table.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ProductOverview {
    pub code: ProductCode,
    pub name: String,
    pub quantity_per_case: u32,
    pub total_cases: u64,
    pub total_quantity: u64,
    pub locations: Vec<(Location, u64)>,
    pub minimum_stock: u64,
    pub below_minimum: bool,
}

/// Product table filtered by `search` (code or name, case-insensitive).
///
/// Without a sort the rows follow catalog order. Sorting is stable.
pub fn product_overview(ledger: &Ledger, search: &str, sort: Option<OverviewSort>) -> Vec<ProductOverview> {
    let mut rows: Vec<ProductOverview> = ledger
        .products()
        .search(search)
        .into_iter()
        .map(|p| {
            let stock = ledger.aggregate(&p);
            ProductOverview {
                below_minimum: stock.total_quantity < p.minimum_stock(),
                code: stock.product,
                name: p.name().to_string(),
                quantity_per_case: p.quantity_per_case(),
                total_cases: stock.total_cases,
                total_quantity: stock.total_quantity,
                locations: stock.locations,
                minimum_stock: p.minimum_stock(),
            }
        })
        .collect();

    if let Some(OverviewSort { field, direction }) = sort {
        rows.sort_by(|a, b| {
            let ordering = match field {
                OverviewField::Code => a.code.cmp(&b.code),
                OverviewField::Name => a.name.cmp(&b.name),
                OverviewField::QuantityPerCase => a.quantity_per_case.cmp(&b.quantity_per_case),
                OverviewField::TotalCases => a.total_cases.cmp(&b.total_cases),
                OverviewField::TotalQuantity => a.total_quantity.cmp(&b.total_quantity),
                OverviewField::MinimumStock => a.minimum_stock.cmp(&b.minimum_stock),
            };
            direction.apply(ordering)
        });
    }

    rows
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ShortageRow {
    pub code: ProductCode,
    pub name: String,
    pub total_quantity: u64,
    pub minimum_stock: u64,
    /// Units needed to reach the minimum.
    pub deficit: u64,
}

/// Products strictly below their minimum stock, largest deficit first.
pub fn shortage_report(ledger: &Ledger) -> Vec<ShortageRow> {
    let mut rows: Vec<ShortageRow> = product_overview(ledger, "", None)
        .into_iter()
        .filter(|row| row.below_minimum)
        .map(|row| ShortageRow {
            deficit: row.minimum_stock - row.total_quantity,
            code: row.code,
            name: row.name,
            total_quantity: row.total_quantity,
            minimum_stock: row.minimum_stock,
        })
        .collect();
    rows.sort_by(|a, b| b.deficit.cmp(&a.deficit).then_with(|| a.code.cmp(&b.code)));
    rows
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct StockStatusRow {
    pub location: Location,
    pub code: ProductCode,
    /// `None` if the product has since disappeared from the catalog.
    pub name: Option<String>,
    pub cases: u64,
    pub quantity: Option<u64>,
}

/// Every stock entry with product details, ordered by location then product.
pub fn stock_status(ledger: &Ledger) -> Vec<StockStatusRow> {
    ledger
        .stock_entries()
        .map(|entry| {
            let product = ledger.products().lookup(&entry.product);
            StockStatusRow {
                location: entry.location,
                name: product.as_ref().map(|p| p.name().to_string()),
                quantity: product.as_ref().map(|p| p.units_for(entry.cases)),
                code: entry.product,
                cases: entry.cases,
            }
        })
        .collect()
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct HistoryFilter {
    pub product: Option<ProductCode>,
    pub kind: Option<TransactionKind>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct HistoryRow {
    pub id: TransactionId,
    pub sequence: u64,
    pub occurred_at: DateTime<Utc>,
    pub kind: TransactionKind,
    pub product: ProductCode,
    pub cases: u64,
    pub from: Option<Location>,
    pub to: Option<Location>,
    pub actor: Actor,
}

/// Journal rows matching `filter`, oldest first.
pub fn transaction_history(ledger: &Ledger, filter: &HistoryFilter) -> Vec<HistoryRow> {
    ledger
        .journal()
        .iter()
        .filter(|entry| {
            let record = entry.payload();
            filter.product.as_ref().is_none_or(|p| *p == record.product)
                && filter.kind.is_none_or(|k| k == record.kind)
        })
        .map(|entry| {
            let record = entry.payload();
            HistoryRow {
                id: transaction_id(entry),
                sequence: entry.sequence_number(),
                occurred_at: record.occurred_at,
                kind: record.kind,
                product: record.product.clone(),
                cases: record.cases,
                from: record.from,
                to: record.to,
                actor: record.actor.clone(),
            }
        })
        .collect()
}
