//! Thread-safe boundary around a [`Ledger`].

use std::sync::{Arc, RwLock, RwLockReadGuard, RwLockWriteGuard};

use thiserror::Error;

use rackledger_core::{Actor, AggregateRoot, DomainError, ExpectedVersion};
use rackledger_events::{EventBus, InMemoryEventBus, Subscription};
use rackledger_products::ProductCode;

use crate::error::LedgerError;
use crate::ledger::{Ledger, LedgerCommand};
use crate::location::Location;
use crate::record::{JournalEntry, JournalSnapshot};
use crate::stock::{ProductStock, StockEntry};
use crate::transfer::{ImportSummary, StockRow, inbound_command};

#[derive(Debug, Error)]
pub enum SharedLedgerError {
    /// The ledger refused the command.
    #[error(transparent)]
    Rejected(#[from] LedgerError),

    /// The caller's expected version is stale.
    #[error(transparent)]
    Conflict(#[from] DomainError),

    #[error("ledger lock poisoned")]
    Poisoned,
}

impl SharedLedgerError {
    /// The ledger error behind a rejection, if that is what this is.
    pub fn ledger_error(&self) -> Option<&LedgerError> {
        match self {
            SharedLedgerError::Rejected(err) => Some(err),
            _ => None,
        }
    }
}

/// A ledger shared between threads.
///
/// Commands serialize on the write lock and are applied in the order they
/// acquire it; queries share the read lock. Committed journal entries are
/// published on an in-memory feed while the write lock is still held, so
/// subscribers see them in commit order.
#[derive(Debug, Clone)]
pub struct SharedLedger {
    inner: Arc<RwLock<Ledger>>,
    feed: Arc<InMemoryEventBus<JournalEntry>>,
}

impl SharedLedger {
    pub fn new(ledger: Ledger) -> Self {
        Self {
            inner: Arc::new(RwLock::new(ledger)),
            feed: Arc::new(InMemoryEventBus::new()),
        }
    }

    pub fn execute(&self, command: &LedgerCommand) -> Result<JournalEntry, SharedLedgerError> {
        self.execute_expecting(ExpectedVersion::Any, command)
    }

    /// Apply `command` only if the ledger is still at `expected`.
    ///
    /// Lets a caller that prepared a command against a known state refuse it
    /// once somebody else has changed the ledger in between.
    pub fn execute_expecting(
        &self,
        expected: ExpectedVersion,
        command: &LedgerCommand,
    ) -> Result<JournalEntry, SharedLedgerError> {
        let mut ledger = self.write()?;
        expected.check(ledger.version())?;

        let entry = ledger.execute(command)?;
        if let Err(err) = self.feed.publish(entry.clone()) {
            tracing::warn!(error = %err, sequence = entry.sequence_number(), "failed to publish journal entry");
        }
        Ok(entry)
    }

    /// Import rows one command at a time, collecting per-row failures.
    pub fn import(&self, rows: impl IntoIterator<Item = StockRow>, actor: &Actor) -> Result<ImportSummary, SharedLedgerError> {
        let mut summary = ImportSummary::default();
        for (index, row) in rows.into_iter().enumerate() {
            match self.execute(&inbound_command(row, actor)) {
                Ok(_) => summary.applied += 1,
                Err(SharedLedgerError::Rejected(err)) => summary.fail(index, err),
                Err(other) => return Err(other),
            }
        }
        Ok(summary)
    }

    pub fn query_location(&self, location: &Location) -> Result<Vec<StockEntry>, SharedLedgerError> {
        Ok(self.read()?.query_location(location)?)
    }

    pub fn query_product(&self, product: &ProductCode) -> Result<ProductStock, SharedLedgerError> {
        Ok(self.read()?.query_product(product)?)
    }

    pub fn is_below_minimum(&self, product: &ProductCode) -> Result<bool, SharedLedgerError> {
        Ok(self.read()?.is_below_minimum(product)?)
    }

    pub fn version(&self) -> Result<u64, SharedLedgerError> {
        Ok(self.read()?.version())
    }

    /// Snapshot of the journal; stays valid after the lock is released.
    pub fn journal(&self) -> Result<JournalSnapshot, SharedLedgerError> {
        Ok(self.read()?.journal())
    }

    /// Run a read-only closure against a consistent view of the ledger
    /// (reports, exports).
    pub fn read_with<T>(&self, f: impl FnOnce(&Ledger) -> T) -> Result<T, SharedLedgerError> {
        let ledger = self.read()?;
        Ok(f(&ledger))
    }

    /// Feed of journal entries committed after this call.
    pub fn subscribe(&self) -> Subscription<JournalEntry> {
        self.feed.subscribe()
    }

    fn read(&self) -> Result<RwLockReadGuard<'_, Ledger>, SharedLedgerError> {
        self.inner.read().map_err(|_| SharedLedgerError::Poisoned)
    }

    fn write(&self) -> Result<RwLockWriteGuard<'_, Ledger>, SharedLedgerError> {
        self.inner.write().map_err(|_| SharedLedgerError::Poisoned)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;

    use rackledger_products::{Catalog, Product};

    use crate::ledger::{Inbound, Outbound};
    use crate::location::Grid;

    fn code(s: &str) -> ProductCode {
        ProductCode::new(s).unwrap()
    }

    fn test_actor() -> Actor {
        Actor::from("user1")
    }

    fn test_shared() -> SharedLedger {
        let mut catalog = Catalog::new();
        catalog
            .register(Product::new(code("PRD001"), "Premium Coffee Beans", 24, 800).unwrap())
            .unwrap();
        SharedLedger::new(Ledger::new(Grid::default(), Arc::new(catalog)))
    }

    fn inbound(cases: i64) -> LedgerCommand {
        LedgerCommand::Inbound(Inbound {
            product: code("PRD001"),
            location: Location::new('A', 1, 1),
            cases,
            actor: test_actor(),
            occurred_at: Utc::now(),
        })
    }

    #[test]
    fn committed_entries_reach_subscribers_in_order() {
        let shared = test_shared();
        let feed = shared.subscribe();

        shared.execute(&inbound(5)).unwrap();
        shared.execute(&inbound(7)).unwrap();
        let _ = shared.execute(&inbound(0));

        let seen: Vec<_> = feed.drain().iter().map(|e| (e.sequence_number(), e.payload().cases)).collect();
        assert_eq!(seen, vec![(1, 5), (2, 7)]);
    }

    #[test]
    fn rejection_is_reported_as_ledger_error() {
        let shared = test_shared();
        shared.execute(&inbound(10)).unwrap();

        let err = shared
            .execute(&LedgerCommand::Outbound(Outbound {
                product: code("PRD001"),
                location: Location::new('A', 1, 1),
                cases: 12,
                actor: test_actor(),
                occurred_at: Utc::now(),
            }))
            .unwrap_err();
        assert_eq!(err.ledger_error().and_then(LedgerError::shortfall), Some(2));
        assert_eq!(shared.query_location(&Location::new('A', 1, 1)).unwrap()[0].cases, 10);
    }

    #[test]
    fn read_with_sees_a_consistent_ledger() {
        let shared = test_shared();
        shared.execute(&inbound(4)).unwrap();

        let (entries, version) = shared
            .read_with(|ledger| (ledger.entry_count(), ledger.version()))
            .unwrap();
        assert_eq!((entries, version), (1, 1));
    }

    #[test]
    fn rejected_overflow_leaves_the_lock_usable() {
        let shared = test_shared();
        shared.execute(&inbound(i64::MAX)).unwrap();

        let err = shared.execute(&inbound(i64::MAX)).unwrap_err();
        assert_eq!(err.ledger_error(), Some(&LedgerError::InvalidQuantity(i64::MAX)));

        let err = shared.execute(&inbound(1)).unwrap_err();
        assert_eq!(err.ledger_error().map(LedgerError::kind), Some("invalid_quantity"));
        assert_eq!(shared.query_product(&code("PRD001")).unwrap().total_cases, i64::MAX as u64);
        assert_eq!(shared.version().unwrap(), 1);
    }

    #[test]
    fn stale_expected_version_is_a_conflict() {
        let shared = test_shared();
        shared.execute_expecting(ExpectedVersion::Exact(0), &inbound(1)).unwrap();

        let err = shared
            .execute_expecting(ExpectedVersion::Exact(0), &inbound(1))
            .unwrap_err();
        match err {
            SharedLedgerError::Conflict(DomainError::Conflict(_)) => {}
            other => panic!("Expected Conflict, got {other:?}"),
        }
        assert_eq!(shared.version().unwrap(), 1);
        assert_eq!(shared.query_product(&code("PRD001")).unwrap().total_cases, 1);
    }

    #[test]
    fn journal_snapshot_outlives_later_commands() {
        let shared = test_shared();
        shared.execute(&inbound(1)).unwrap();
        let snapshot = shared.journal().unwrap();
        shared.execute(&inbound(1)).unwrap();

        assert_eq!(snapshot.len(), 1);
        assert_eq!(shared.journal().unwrap().len(), 2);
        // 2 cases * 24 units is far below the 800 unit minimum.
        assert!(shared.is_below_minimum(&code("PRD001")).unwrap());
    }

    #[test]
    fn import_collects_row_failures() {
        let shared = test_shared();
        let rows = vec![
            StockRow {
                product_code: code("PRD001"),
                location: Location::new('A', 1, 1),
                cases: 3,
            },
            StockRow {
                product_code: code("PRD009"),
                location: Location::new('A', 1, 1),
                cases: 3,
            },
        ];

        let summary = shared.import(rows, &test_actor()).unwrap();
        assert_eq!(summary.applied, 1);
        assert_eq!(summary.failures.len(), 1);
        assert_eq!(summary.failures[0].row, 1);
        assert_eq!(shared.read_with(|l| l.entry_count()).unwrap(), 1);
    }
}
