//! Transaction records and the append-only journal.

use std::ops::Deref;
use std::sync::Arc;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use rackledger_core::{Actor, TransactionId};
use rackledger_events::{Event, EventEnvelope};
use rackledger_products::ProductCode;

use crate::location::Location;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TransactionKind {
    Inbound,
    Outbound,
    Move,
}

impl core::fmt::Display for TransactionKind {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.write_str(match self {
            TransactionKind::Inbound => "inbound",
            TransactionKind::Outbound => "outbound",
            TransactionKind::Move => "move",
        })
    }
}

/// One applied stock movement.
///
/// `from` is `None` for inbound, `to` is `None` for outbound; a move has both.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TransactionRecord {
    pub occurred_at: DateTime<Utc>,
    pub product: ProductCode,
    pub kind: TransactionKind,
    pub cases: u64,
    pub from: Option<Location>,
    pub to: Option<Location>,
    pub actor: Actor,
}

impl Event for TransactionRecord {
    fn event_type(&self) -> &'static str {
        match self.kind {
            TransactionKind::Inbound => "inventory.stock.inbound",
            TransactionKind::Outbound => "inventory.stock.outbound",
            TransactionKind::Move => "inventory.stock.moved",
        }
    }

    fn version(&self) -> u32 {
        1
    }

    fn occurred_at(&self) -> DateTime<Utc> {
        self.occurred_at
    }
}

/// A journaled record: id, ledger stream and sequence number around the record.
pub type JournalEntry = EventEnvelope<TransactionRecord>;

/// Stable id of a journaled record.
pub fn transaction_id(entry: &JournalEntry) -> TransactionId {
    TransactionId::from_uuid(entry.event_id())
}

/// Append-only transaction log.
///
/// Appends copy the backing vector only while a [`JournalSnapshot`] of it is
/// still alive, so readers never block or observe a half-written log.
#[derive(Debug, Clone, Default)]
pub struct Journal {
    entries: Arc<Vec<JournalEntry>>,
}

impl Journal {
    pub(crate) fn append(&mut self, entry: JournalEntry) {
        Arc::make_mut(&mut self.entries).push(entry);
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Immutable view of the log as of now.
    pub fn snapshot(&self) -> JournalSnapshot {
        JournalSnapshot(Arc::clone(&self.entries))
    }
}

/// Frozen view of the journal; later appends are not visible through it.
#[derive(Debug, Clone)]
pub struct JournalSnapshot(Arc<Vec<JournalEntry>>);

impl Deref for JournalSnapshot {
    type Target = [JournalEntry];

    fn deref(&self) -> &Self::Target {
        &self.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rackledger_core::LedgerId;
    use uuid::Uuid;

    fn record(kind: TransactionKind, cases: u64) -> TransactionRecord {
        TransactionRecord {
            occurred_at: Utc::now(),
            product: ProductCode::new("PRD001").unwrap(),
            kind,
            cases,
            from: None,
            to: Some(Location::new('A', 1, 1)),
            actor: Actor::from("user1"),
        }
    }

    fn entry(seq: u64, kind: TransactionKind) -> JournalEntry {
        EventEnvelope::new(Uuid::now_v7(), LedgerId::new(), "inventory.ledger", seq, record(kind, seq))
    }

    #[test]
    fn snapshot_does_not_see_later_appends() {
        let mut journal = Journal::default();
        journal.append(entry(1, TransactionKind::Inbound));

        let before = journal.snapshot();
        journal.append(entry(2, TransactionKind::Outbound));

        assert_eq!(before.len(), 1);
        assert_eq!(journal.len(), 2);
        assert_eq!(journal.snapshot().len(), 2);
        assert_eq!(journal.snapshot().last().unwrap().sequence_number(), 2);
    }

    #[test]
    fn event_type_follows_kind() {
        assert_eq!(record(TransactionKind::Inbound, 1).event_type(), "inventory.stock.inbound");
        assert_eq!(record(TransactionKind::Outbound, 1).event_type(), "inventory.stock.outbound");
        assert_eq!(record(TransactionKind::Move, 1).event_type(), "inventory.stock.moved");
    }

    #[test]
    fn kind_serializes_lowercase() {
        let json = serde_json::to_value(record(TransactionKind::Move, 3)).unwrap();
        assert_eq!(json["kind"], "move");
        assert_eq!(json["to"], "A-1-1");
        assert!(json["from"].is_null());
    }

    #[test]
    fn transaction_id_is_the_envelope_id() {
        let e = entry(1, TransactionKind::Inbound);
        assert_eq!(*transaction_id(&e).as_uuid(), e.event_id());
    }
}
