//! Failures of ledger commands and queries.

use thiserror::Error;

use rackledger_products::ProductCode;

use crate::location::Location;

pub type LedgerResult<T> = Result<T, LedgerError>;

/// Every way a ledger command or query can be refused.
///
/// All variants are recoverable and leave the ledger untouched.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum LedgerError {
    #[error("unknown product: {0}")]
    UnknownProduct(ProductCode),

    #[error("location {0} is outside the storage grid")]
    InvalidLocation(Location),

    #[error("invalid quantity {0}: cases must be positive and a product may hold at most 9223372036854775807 cases")]
    InvalidQuantity(i64),

    #[error(
        "insufficient stock of {product} at {location}: requested {requested} cases, {available} available"
    )]
    InsufficientStock {
        product: ProductCode,
        location: Location,
        requested: u64,
        available: u64,
    },

    #[error("no stock of {product} at {location}")]
    UnknownEntry { product: ProductCode, location: Location },

    #[error("cannot move {product} from {location} to the same location")]
    InvalidMove { product: ProductCode, location: Location },
}

impl LedgerError {
    /// Cases missing to satisfy a refused outbound or move.
    pub fn shortfall(&self) -> Option<u64> {
        match self {
            LedgerError::InsufficientStock {
                requested,
                available,
                ..
            } => Some(requested.saturating_sub(*available)),
            _ => None,
        }
    }

    /// Stable machine-readable name of the failure.
    pub fn kind(&self) -> &'static str {
        match self {
            LedgerError::UnknownProduct(_) => "unknown_product",
            LedgerError::InvalidLocation(_) => "invalid_location",
            LedgerError::InvalidQuantity(_) => "invalid_quantity",
            LedgerError::InsufficientStock { .. } => "insufficient_stock",
            LedgerError::UnknownEntry { .. } => "unknown_entry",
            LedgerError::InvalidMove { .. } => "invalid_move",
        }
    }
}
