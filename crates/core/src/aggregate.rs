//! Decide/evolve contract for the ledger and anything else that owns state
//! changed only through commands.

use crate::error::{DomainError, DomainResult};

/// State with an identity and a count of the changes applied to it.
pub trait AggregateRoot {
    type Id: Clone + Eq + core::hash::Hash + core::fmt::Debug;

    fn id(&self) -> &Self::Id;

    /// Number of records applied so far; starts at 0.
    fn version(&self) -> u64;
}

/// What a caller believes the current version to be.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum ExpectedVersion {
    /// Apply regardless of version.
    Any,
    Exact(u64),
}

impl ExpectedVersion {
    pub fn matches(self, actual: u64) -> bool {
        match self {
            ExpectedVersion::Any => true,
            ExpectedVersion::Exact(expected) => expected == actual,
        }
    }

    /// `Conflict` if the caller's view is stale.
    pub fn check(self, actual: u64) -> DomainResult<()> {
        if self.matches(actual) {
            return Ok(());
        }
        Err(DomainError::conflict(format!(
            "version mismatch (expected: {self:?}, actual: {actual})"
        )))
    }
}

/// Command handling split into a pure decision and an infallible apply.
///
/// `handle` inspects state and either rejects the command or returns the
/// records it produces. `apply` folds one record into state and bumps the
/// version. All validation lives in `handle`, so a decided record is always
/// applied in full.
pub trait Aggregate: AggregateRoot {
    type Command: Clone + core::fmt::Debug;
    type Event: Clone + core::fmt::Debug;
    type Error: core::fmt::Debug;

    fn apply(&mut self, event: &Self::Event);

    fn handle(&self, command: &Self::Command) -> Result<Vec<Self::Event>, Self::Error>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn any_matches_every_version() {
        assert!(ExpectedVersion::Any.matches(0));
        assert!(ExpectedVersion::Any.matches(42));
    }

    #[test]
    fn exact_version_mismatch_is_a_conflict() {
        assert!(ExpectedVersion::Exact(3).check(3).is_ok());
        let err = ExpectedVersion::Exact(3).check(4).unwrap_err();
        match err {
            DomainError::Conflict(msg) => assert!(msg.contains("actual: 4")),
            _ => panic!("Expected Conflict"),
        }
    }
}
