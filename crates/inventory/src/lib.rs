//! Inventory ledger of a rack warehouse.
//!
//! Deterministic domain logic only: the [`Ledger`] owns stock per storage
//! slot and an append-only journal of every movement. [`SharedLedger`] puts
//! it behind a lock for concurrent callers; [`report`] and [`transfer`]
//! derive dashboard views and interchange rows from it.

pub mod config;
pub mod error;
pub mod ledger;
pub mod location;
pub mod record;
pub mod report;
pub mod shared;
pub mod stock;
pub mod transfer;

pub use config::GridConfig;
pub use error::{LedgerError, LedgerResult};
pub use ledger::{Inbound, LEDGER_STREAM, Ledger, LedgerCommand, MAX_CASES, MoveStock, Outbound};
pub use location::{Grid, Location};
pub use record::{Journal, JournalEntry, JournalSnapshot, TransactionKind, TransactionRecord, transaction_id};
pub use shared::{SharedLedger, SharedLedgerError};
pub use stock::{ProductStock, SlotStock, StockEntry};
pub use transfer::{ImportFailure, ImportSummary, StockRow, TransferError};
