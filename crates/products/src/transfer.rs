//! Product-data import.
//!
//! Rows are JSON objects; `code` stays a plain string so a malformed code is
//! reported against its row instead of failing the whole document:
//!
//! ```json
//! [{ "code": "PRD001", "name": "Premium Coffee Beans", "quantity_per_case": 24, "minimum_stock": 800 }]
//! ```
//!
//! A row whose code is already registered replaces that product's metadata.

use serde::{Deserialize, Serialize};
use thiserror::Error;

use rackledger_core::{DomainError, DomainResult};

use crate::catalog::Catalog;
use crate::product::{Product, ProductCode};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProductRow {
    pub code: String,
    pub name: String,
    pub quantity_per_case: u32,
    pub minimum_stock: u64,
}

impl From<&Product> for ProductRow {
    fn from(product: &Product) -> Self {
        Self {
            code: product.code().to_string(),
            name: product.name().to_string(),
            quantity_per_case: product.quantity_per_case(),
            minimum_stock: product.minimum_stock(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProductImportFailure {
    /// Zero-based index of the row in the input.
    pub row: usize,
    pub error: DomainError,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ProductImportSummary {
    pub registered: usize,
    pub updated: usize,
    pub failures: Vec<ProductImportFailure>,
}

impl ProductImportSummary {
    pub fn applied(&self) -> usize {
        self.registered + self.updated
    }

    pub fn is_clean(&self) -> bool {
        self.failures.is_empty()
    }
}

#[derive(Debug, Error)]
pub enum ProductImportError {
    #[error("malformed product rows: {0}")]
    Json(#[from] serde_json::Error),
}

fn product_from_row(row: ProductRow) -> DomainResult<Product> {
    Product::new(ProductCode::new(row.code)?, row.name, row.quantity_per_case, row.minimum_stock)
}

/// Register or update one product per row; a failing row does not stop the rest.
pub fn import_products(catalog: &mut Catalog, rows: impl IntoIterator<Item = ProductRow>) -> ProductImportSummary {
    let mut summary = ProductImportSummary::default();
    for (index, row) in rows.into_iter().enumerate() {
        let outcome = product_from_row(row).and_then(|product| {
            let existing = catalog.get(product.code()).is_some();
            if existing {
                catalog.update(product)?;
            } else {
                catalog.register(product)?;
            }
            Ok(existing)
        });
        match outcome {
            Ok(true) => summary.updated += 1,
            Ok(false) => summary.registered += 1,
            Err(error) => {
                tracing::debug!(row = index, error = %error, "product row rejected");
                summary.failures.push(ProductImportFailure { row: index, error });
            }
        }
    }
    tracing::debug!(
        registered = summary.registered,
        updated = summary.updated,
        failed = summary.failures.len(),
        "product import finished"
    );
    summary
}

pub fn import_products_json(catalog: &mut Catalog, json: &str) -> Result<ProductImportSummary, ProductImportError> {
    let rows: Vec<ProductRow> = serde_json::from_str(json)?;
    Ok(import_products(catalog, rows))
}

/// Every registered product as a row, ordered by code.
pub fn export_products(catalog: &Catalog) -> Vec<ProductRow> {
    catalog.iter().map(ProductRow::from).collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn row(code: &str, name: &str, quantity_per_case: u32, minimum_stock: u64) -> ProductRow {
        ProductRow {
            code: code.to_string(),
            name: name.to_string(),
            quantity_per_case,
            minimum_stock,
        }
    }

    #[test]
    fn import_registers_new_and_updates_existing_codes() {
        let mut catalog = Catalog::new();
        let first = import_products(
            &mut catalog,
            vec![
                row("PRD001", "Premium Coffee Beans", 24, 800),
                row("PRD002", "Organic Black Tea", 36, 720),
            ],
        );
        assert_eq!(first.registered, 2);
        assert!(first.is_clean());

        let second = import_products(
            &mut catalog,
            vec![
                row("PRD002", "Organic Green Tea", 36, 600),
                row("PRD003", "Matcha Powder", 20, 400),
            ],
        );
        assert_eq!((second.registered, second.updated, second.applied()), (1, 1, 2));

        let tea = catalog.get(&ProductCode::new("PRD002").unwrap()).unwrap();
        assert_eq!(tea.name(), "Organic Green Tea");
        assert_eq!(tea.minimum_stock(), 600);
        assert_eq!(catalog.len(), 3);
    }

    #[test]
    fn invalid_rows_are_reported_by_index() {
        let mut catalog = Catalog::new();
        let json = r#"[
            { "code": "PRD001", "name": "Premium Coffee Beans", "quantity_per_case": 24, "minimum_stock": 800 },
            { "code": "PRD 002", "name": "Organic Black Tea", "quantity_per_case": 36, "minimum_stock": 720 },
            { "code": "PRD003", "name": "   ", "quantity_per_case": 20, "minimum_stock": 400 },
            { "code": "PRD004", "name": "Hojicha", "quantity_per_case": 0, "minimum_stock": 10 }
        ]"#;

        let summary = import_products_json(&mut catalog, json).unwrap();
        assert_eq!(summary.applied(), 1);

        let failed: Vec<_> = summary.failures.iter().map(|f| f.row).collect();
        assert_eq!(failed, vec![1, 2, 3]);
        match &summary.failures[0].error {
            DomainError::InvalidId(_) => {}
            other => panic!("Expected InvalidId, got {other:?}"),
        }
        match &summary.failures[2].error {
            DomainError::Validation(_) => {}
            other => panic!("Expected Validation, got {other:?}"),
        }
        assert_eq!(catalog.len(), 1);
    }

    #[test]
    fn malformed_json_is_an_import_error() {
        let mut catalog = Catalog::new();
        let err = import_products_json(&mut catalog, r#"[{ "code": "PRD001" }]"#).unwrap_err();
        assert!(err.to_string().starts_with("malformed product rows"));
        assert!(catalog.is_empty());
    }

    #[test]
    fn exported_rows_rebuild_the_catalog() {
        let mut source = Catalog::new();
        import_products(
            &mut source,
            vec![row("PRD002", "Organic Black Tea", 36, 720), row("PRD001", "Premium Coffee Beans", 24, 800)],
        );

        let rows = export_products(&source);
        assert_eq!(rows[0].code, "PRD001");

        let mut target = Catalog::new();
        assert!(import_products(&mut target, rows.clone()).is_clean());
        assert_eq!(export_products(&target), rows);
    }
}
