//! Sample warehouse used by the `rackledger` binary.
//!
//! Seeds the catalog and stock that the dashboard ships as mock data, then
//! derives the same views the dashboard shows.

use std::sync::Arc;

use anyhow::Context;
use serde::Serialize;

use rackledger_core::Actor;
use rackledger_inventory::report::{self, ProductOverview, ShortageRow};
use rackledger_inventory::transfer::{self, StockRow};
use rackledger_inventory::{Grid, Ledger, Location};
use rackledger_products::transfer::import_products;
use rackledger_products::{Catalog, ProductCode, ProductRow};

/// (code, name, quantity per case, minimum stock in units)
const SAMPLE_PRODUCTS: [(&str, &str, u32, u64); 3] = [
    ("PRD001", "Premium Coffee Beans", 24, 800),
    ("PRD002", "Organic Black Tea", 36, 720),
    ("PRD003", "Matcha Powder", 20, 400),
];

/// (code, location, cases)
const SAMPLE_STOCK: [(&str, Location, i64); 6] = [
    ("PRD001", Location::new('A', 1, 1), 24),
    ("PRD001", Location::new('B', 3, 2), 26),
    ("PRD002", Location::new('A', 1, 1), 12),
    ("PRD002", Location::new('C', 5, 3), 18),
    ("PRD003", Location::new('A', 1, 2), 18),
    ("PRD003", Location::new('D', 2, 1), 7),
];

pub fn sample_catalog() -> anyhow::Result<Catalog> {
    let rows = SAMPLE_PRODUCTS.map(|(code, name, quantity_per_case, minimum_stock)| ProductRow {
        code: code.to_string(),
        name: name.to_string(),
        quantity_per_case,
        minimum_stock,
    });

    let mut catalog = Catalog::new();
    let summary = import_products(&mut catalog, rows);
    if let Some(failure) = summary.failures.first() {
        anyhow::bail!("sample product {} rejected: {}", failure.row, failure.error);
    }
    Ok(catalog)
}

pub fn sample_rows() -> anyhow::Result<Vec<StockRow>> {
    SAMPLE_STOCK
        .into_iter()
        .map(|(code, location, cases)| {
            Ok(StockRow {
                product_code: ProductCode::new(code)?,
                location,
                cases,
            })
        })
        .collect()
}

/// Ledger over `grid` seeded with the sample stock.
///
/// Fails if any sample row does not fit the configured grid.
pub fn sample_ledger(grid: Grid, actor: &Actor) -> anyhow::Result<Ledger> {
    let mut ledger = Ledger::new(grid, Arc::new(sample_catalog()?));
    let summary = transfer::import_rows(&mut ledger, sample_rows()?, actor);
    if let Some(failure) = summary.failures.first() {
        anyhow::bail!("sample row {} rejected: {}", failure.row, failure.error);
    }
    tracing::info!(entries = ledger.entry_count(), "sample stock loaded");
    Ok(ledger)
}

/// Everything the binary prints.
#[derive(Debug, Serialize)]
pub struct Dashboard {
    pub products: Vec<ProductOverview>,
    pub shortages: Vec<ShortageRow>,
    pub stock: Vec<StockRow>,
}

pub fn dashboard(ledger: &Ledger) -> Dashboard {
    Dashboard {
        products: report::product_overview(ledger, "", None),
        shortages: report::shortage_report(ledger),
        stock: transfer::export_stock(ledger),
    }
}

pub fn render(ledger: &Ledger) -> anyhow::Result<String> {
    serde_json::to_string_pretty(&dashboard(ledger)).context("failed to serialize dashboard")
}
