//! Event plumbing shared by the ledger and its consumers.
//!
//! - [`Event`]: an immutable, versioned fact.
//! - [`EventEnvelope`]: stream metadata (id, stream, sequence) around a fact.
//! - [`EventBus`] / [`InMemoryEventBus`]: fan-out of committed envelopes.

pub mod bus;
pub mod envelope;
pub mod event;
pub mod in_memory_bus;

pub use bus::{EventBus, Subscription};
pub use envelope::EventEnvelope;
pub use event::Event;
pub use in_memory_bus::{InMemoryBusError, InMemoryEventBus};
