//! Product catalog.
//!
//! The ledger does not own product metadata; it resolves codes through the
//! [`ProductDirectory`] seam implemented here. [`transfer`] loads product
//! data in bulk.

pub mod catalog;
pub mod product;
pub mod transfer;

pub use catalog::{Catalog, ProductDirectory};
pub use product::{Product, ProductCode, SortDirection};
pub use transfer::{ProductImportError, ProductImportFailure, ProductImportSummary, ProductRow};
