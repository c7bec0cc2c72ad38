//! Building blocks shared by the catalog and the ledger: errors, typed ids,
//! the actor newtype and the aggregate traits. No I/O lives here.

pub mod aggregate;
pub mod entity;
pub mod error;
pub mod id;
pub mod value_object;

pub use aggregate::{Aggregate, AggregateRoot, ExpectedVersion};
pub use entity::Entity;
pub use error::{DomainError, DomainResult};
pub use id::{Actor, LedgerId, TransactionId};
pub use value_object::ValueObject;
