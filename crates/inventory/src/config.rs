//! Ledger configuration.
//!
//! Values come from the environment with hard defaults, the same way the
//! binaries read the rest of their settings.

use serde::{Deserialize, Serialize};

use rackledger_core::{DomainError, DomainResult};

use crate::location::Grid;

pub const COLUMNS_VAR: &str = "RACKLEDGER_COLUMNS";
pub const POSITIONS_VAR: &str = "RACKLEDGER_POSITIONS";
pub const LEVELS_VAR: &str = "RACKLEDGER_LEVELS";

/// Shape of the storage grid.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GridConfig {
    /// Column letters, e.g. `ABCDEFGHIJK`.
    pub columns: String,
    /// Positions per column, numbered from 1.
    pub positions: u8,
    /// Shelf levels per position, numbered from 1.
    pub levels: u8,
}

impl Default for GridConfig {
    fn default() -> Self {
        Self {
            columns: "ABCDEFGHIJK".to_string(),
            positions: 15,
            levels: 3,
        }
    }
}

impl GridConfig {
    /// Read `RACKLEDGER_COLUMNS`, `RACKLEDGER_POSITIONS` and `RACKLEDGER_LEVELS`.
    pub fn from_env() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Same as [`GridConfig::from_env`] but with an arbitrary variable source.
    ///
    /// Unparseable numbers keep their default and are logged.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let mut config = Self::default();

        if let Some(columns) = lookup(COLUMNS_VAR) {
            config.columns = columns.trim().to_string();
        }
        if let Some(raw) = lookup(POSITIONS_VAR) {
            match raw.trim().parse() {
                Ok(n) => config.positions = n,
                Err(e) => tracing::warn!(var = POSITIONS_VAR, value = %raw, error = %e, "ignoring malformed setting"),
            }
        }
        if let Some(raw) = lookup(LEVELS_VAR) {
            match raw.trim().parse() {
                Ok(n) => config.levels = n,
                Err(e) => tracing::warn!(var = LEVELS_VAR, value = %raw, error = %e, "ignoring malformed setting"),
            }
        }

        config
    }

    /// Check the shape and build the grid.
    pub fn validate(&self) -> DomainResult<Grid> {
        let mut columns: Vec<char> = self.columns.chars().collect();
        if columns.is_empty() {
            return Err(DomainError::validation("grid needs at least one column"));
        }
        if let Some(bad) = columns.iter().find(|c| !c.is_ascii_uppercase()) {
            return Err(DomainError::validation(format!(
                "column {bad:?} must be an uppercase ASCII letter"
            )));
        }
        columns.sort_unstable();
        let before = columns.len();
        columns.dedup();
        if columns.len() != before {
            return Err(DomainError::validation("duplicate column letters"));
        }
        if self.positions == 0 || self.levels == 0 {
            return Err(DomainError::validation("positions and levels must be positive"));
        }

        Ok(Grid::new(columns, self.positions, self.levels))
    }
}
