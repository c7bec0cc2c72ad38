use std::sync::Arc;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use rackledger_core::{Actor, Aggregate, AggregateRoot, LedgerId};
use rackledger_events::EventEnvelope;
use rackledger_products::{Product, ProductCode, ProductDirectory};

use crate::error::{LedgerError, LedgerResult};
use crate::location::{Grid, Location};
use crate::record::{Journal, JournalEntry, JournalSnapshot, TransactionKind, TransactionRecord};
use crate::stock::{ProductStock, SlotStock, StockBook, StockEntry};

/// Upper bound on the cases of one product across the whole grid.
///
/// Keeps every slot count, product total and exported row representable as
/// the signed quantity commands and interchange rows carry.
pub const MAX_CASES: u64 = i64::MAX as u64;

/// Stream type stamped on every journal envelope.
pub const LEDGER_STREAM: &str = "inventory.ledger";

/// Command: Inbound (receive cases into a slot).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Inbound {
    pub product: ProductCode,
    pub location: Location,
    pub cases: i64,
    pub actor: Actor,
    pub occurred_at: DateTime<Utc>,
}

/// Command: Outbound (ship cases out of a slot).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Outbound {
    pub product: ProductCode,
    pub location: Location,
    pub cases: i64,
    pub actor: Actor,
    pub occurred_at: DateTime<Utc>,
}

/// Command: MoveStock (relocate cases between two slots).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MoveStock {
    pub product: ProductCode,
    pub from: Location,
    pub to: Location,
    pub cases: i64,
    pub actor: Actor,
    pub occurred_at: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum LedgerCommand {
    Inbound(Inbound),
    Outbound(Outbound),
    Move(MoveStock),
}

impl LedgerCommand {
    pub fn kind(&self) -> TransactionKind {
        match self {
            LedgerCommand::Inbound(_) => TransactionKind::Inbound,
            LedgerCommand::Outbound(_) => TransactionKind::Outbound,
            LedgerCommand::Move(_) => TransactionKind::Move,
        }
    }

    pub fn product(&self) -> &ProductCode {
        match self {
            LedgerCommand::Inbound(c) => &c.product,
            LedgerCommand::Outbound(c) => &c.product,
            LedgerCommand::Move(c) => &c.product,
        }
    }
}

/// Aggregate root: the inventory ledger of one warehouse.
///
/// Owns every stock entry and the transaction journal. Products are resolved
/// through a [`ProductDirectory`] and never stored here.
///
/// Stock changes only through [`Ledger::execute`] (or the `inbound`,
/// `outbound` and `move_stock` shorthands). Each accepted command becomes a
/// single [`TransactionRecord`] that is applied whole, so a move can never be
/// observed half done.
pub struct Ledger {
    id: LedgerId,
    grid: Grid,
    products: Arc<dyn ProductDirectory>,
    stock: StockBook,
    journal: Journal,
    version: u64,
}

impl core::fmt::Debug for Ledger {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("Ledger")
            .field("id", &self.id)
            .field("grid", &self.grid)
            .field("entries", &self.stock.len())
            .field("version", &self.version)
            .finish()
    }
}

impl Ledger {
    /// Create an empty ledger over `grid`.
    pub fn new(grid: Grid, products: Arc<dyn ProductDirectory>) -> Self {
        Self::with_id(LedgerId::new(), grid, products)
    }

    pub fn with_id(id: LedgerId, grid: Grid, products: Arc<dyn ProductDirectory>) -> Self {
        Self {
            id,
            grid,
            products,
            stock: StockBook::default(),
            journal: Journal::default(),
            version: 0,
        }
    }

    pub fn id_typed(&self) -> LedgerId {
        self.id
    }

    pub fn grid(&self) -> &Grid {
        &self.grid
    }

    pub fn products(&self) -> &dyn ProductDirectory {
        self.products.as_ref()
    }

    /// Validate and apply a command, journaling the resulting record.
    ///
    /// A rejected command changes nothing: no stock, no journal entry, no
    /// version bump.
    pub fn execute(&mut self, command: &LedgerCommand) -> LedgerResult<JournalEntry> {
        let record = match self.decide(command) {
            Ok(record) => record,
            Err(err) => {
                tracing::warn!(
                    kind = %command.kind(),
                    product = %command.product(),
                    reason = err.kind(),
                    error = %err,
                    "ledger command rejected"
                );
                return Err(err);
            }
        };

        self.apply(&record);
        tracing::info!(
            ledger = %self.id,
            version = self.version,
            kind = %record.kind,
            product = %record.product,
            cases = record.cases,
            from = ?record.from.map(|l| l.to_string()),
            to = ?record.to.map(|l| l.to_string()),
            actor = %record.actor,
            "stock transaction applied"
        );

        let entry = EventEnvelope::new(Uuid::now_v7(), self.id, LEDGER_STREAM, self.version, record);
        self.journal.append(entry.clone());
        Ok(entry)
    }

    pub fn inbound(
        &mut self,
        product: &ProductCode,
        location: Location,
        cases: i64,
        actor: &Actor,
    ) -> LedgerResult<TransactionRecord> {
        let command = LedgerCommand::Inbound(Inbound {
            product: product.clone(),
            location,
            cases,
            actor: actor.clone(),
            occurred_at: Utc::now(),
        });
        self.execute(&command).map(EventEnvelope::into_payload)
    }

    pub fn outbound(
        &mut self,
        product: &ProductCode,
        location: Location,
        cases: i64,
        actor: &Actor,
    ) -> LedgerResult<TransactionRecord> {
        let command = LedgerCommand::Outbound(Outbound {
            product: product.clone(),
            location,
            cases,
            actor: actor.clone(),
            occurred_at: Utc::now(),
        });
        self.execute(&command).map(EventEnvelope::into_payload)
    }

    pub fn move_stock(
        &mut self,
        product: &ProductCode,
        from: Location,
        to: Location,
        cases: i64,
        actor: &Actor,
    ) -> LedgerResult<TransactionRecord> {
        let command = LedgerCommand::Move(MoveStock {
            product: product.clone(),
            from,
            to,
            cases,
            actor: actor.clone(),
            occurred_at: Utc::now(),
        });
        self.execute(&command).map(EventEnvelope::into_payload)
    }

    /// Entries at one slot, ordered by product code.
    pub fn query_location(&self, location: &Location) -> LedgerResult<Vec<StockEntry>> {
        self.ensure_location(location)?;
        tracing::debug!(location = %location, "location queried");
        Ok(self.stock.at_location(location))
    }

    /// Totals and per-slot breakdown of one product.
    ///
    /// A registered product without stock yields zero totals.
    pub fn query_product(&self, product: &ProductCode) -> LedgerResult<ProductStock> {
        let meta = self.ensure_product(product)?;
        tracing::debug!(product = %product, "product queried");
        Ok(self.aggregate(&meta))
    }

    /// `true` iff the product's unit total is strictly below its minimum stock.
    pub fn is_below_minimum(&self, product: &ProductCode) -> LedgerResult<bool> {
        let meta = self.ensure_product(product)?;
        Ok(self.aggregate(&meta).total_quantity < meta.minimum_stock())
    }

    /// Occupied slots of one column for the grid browser, or `None` if the
    /// column is not part of the grid.
    pub fn column_view(&self, column: char) -> Option<Vec<SlotStock>> {
        let column = column.to_ascii_uppercase();
        self.grid
            .has_column(column)
            .then(|| self.stock.column(column))
    }

    /// Every entry, ordered by location then product.
    pub fn stock_entries(&self) -> impl Iterator<Item = StockEntry> + '_ {
        self.stock.entries()
    }

    pub fn entry_count(&self) -> usize {
        self.stock.len()
    }

    /// Read-only view of the journal as of now.
    pub fn journal(&self) -> JournalSnapshot {
        self.journal.snapshot()
    }

    pub(crate) fn aggregate(&self, product: &Product) -> ProductStock {
        let locations = self.stock.of_product(product.code());
        let total_cases = locations
            .iter()
            .fold(0u64, |total, (_, cases)| total.saturating_add(*cases));
        ProductStock {
            product: product.code().clone(),
            total_cases,
            total_quantity: product.units_for(total_cases),
            locations,
        }
    }

    fn ensure_location(&self, location: &Location) -> LedgerResult<()> {
        if self.grid.contains(location) {
            Ok(())
        } else {
            Err(LedgerError::InvalidLocation(*location))
        }
    }

    fn ensure_product(&self, product: &ProductCode) -> LedgerResult<Product> {
        self.products
            .lookup(product)
            .ok_or_else(|| LedgerError::UnknownProduct(product.clone()))
    }

    fn ensure_capacity(&self, product: &ProductCode, cases: u64, requested: i64) -> LedgerResult<()> {
        match self.stock.product_total(product).checked_add(cases) {
            Some(total) if total <= MAX_CASES => Ok(()),
            _ => Err(LedgerError::InvalidQuantity(requested)),
        }
    }

    fn ensure_available(&self, product: &ProductCode, location: Location, requested: u64) -> LedgerResult<()> {
        let available = self.stock.cases(product, &location);
        if available == 0 {
            return Err(LedgerError::UnknownEntry {
                product: product.clone(),
                location,
            });
        }
        if requested > available {
            return Err(LedgerError::InsufficientStock {
                product: product.clone(),
                location,
                requested,
                available,
            });
        }
        Ok(())
    }
}

fn positive_cases(cases: i64) -> LedgerResult<u64> {
    u64::try_from(cases)
        .ok()
        .filter(|&c| c > 0)
        .ok_or(LedgerError::InvalidQuantity(cases))
}

impl AggregateRoot for Ledger {
    type Id = LedgerId;

    fn id(&self) -> &Self::Id {
        &self.id
    }

    fn version(&self) -> u64 {
        self.version
    }
}

impl Aggregate for Ledger {
    type Command = LedgerCommand;
    type Event = TransactionRecord;
    type Error = LedgerError;

    fn apply(&mut self, event: &Self::Event) {
        if let Some(from) = event.from {
            self.stock.debit(&event.product, from, event.cases);
        }
        if let Some(to) = event.to {
            self.stock.credit(&event.product, to, event.cases);
        }

        // Deterministic version tracking: +1 per applied record.
        self.version += 1;
    }

    fn handle(&self, command: &Self::Command) -> Result<Vec<Self::Event>, Self::Error> {
        self.decide(command).map(|record| vec![record])
    }
}

impl Ledger {
    /// Every accepted command maps to exactly one record.
    fn decide(&self, command: &LedgerCommand) -> LedgerResult<TransactionRecord> {
        match command {
            LedgerCommand::Inbound(cmd) => self.handle_inbound(cmd),
            LedgerCommand::Outbound(cmd) => self.handle_outbound(cmd),
            LedgerCommand::Move(cmd) => self.handle_move(cmd),
        }
    }

    fn handle_inbound(&self, cmd: &Inbound) -> LedgerResult<TransactionRecord> {
        let cases = positive_cases(cmd.cases)?;
        self.ensure_location(&cmd.location)?;
        self.ensure_product(&cmd.product)?;
        self.ensure_capacity(&cmd.product, cases, cmd.cases)?;

        Ok(TransactionRecord {
            occurred_at: cmd.occurred_at,
            product: cmd.product.clone(),
            kind: TransactionKind::Inbound,
            cases,
            from: None,
            to: Some(cmd.location),
            actor: cmd.actor.clone(),
        })
    }

    fn handle_outbound(&self, cmd: &Outbound) -> LedgerResult<TransactionRecord> {
        let cases = positive_cases(cmd.cases)?;
        self.ensure_location(&cmd.location)?;
        self.ensure_product(&cmd.product)?;
        self.ensure_available(&cmd.product, cmd.location, cases)?;

        Ok(TransactionRecord {
            occurred_at: cmd.occurred_at,
            product: cmd.product.clone(),
            kind: TransactionKind::Outbound,
            cases,
            from: Some(cmd.location),
            to: None,
            actor: cmd.actor.clone(),
        })
    }

    fn handle_move(&self, cmd: &MoveStock) -> LedgerResult<TransactionRecord> {
        let cases = positive_cases(cmd.cases)?;
        self.ensure_location(&cmd.from)?;
        self.ensure_location(&cmd.to)?;
        if cmd.from == cmd.to {
            return Err(LedgerError::InvalidMove {
                product: cmd.product.clone(),
                location: cmd.from,
            });
        }
        self.ensure_product(&cmd.product)?;
        self.ensure_available(&cmd.product, cmd.from, cases)?;

        Ok(TransactionRecord {
            occurred_at: cmd.occurred_at,
            product: cmd.product.clone(),
            kind: TransactionKind::Move,
            cases,
            from: Some(cmd.from),
            to: Some(cmd.to),
            actor: cmd.actor.clone(),
        })
    }
}
