//! Storage grid coordinates.

use core::str::FromStr;

use serde::{Deserialize, Serialize};

use rackledger_core::{DomainError, ValueObject};

/// A storage slot: column letter, position along the column, shelf level.
///
/// Displays and parses as `A-1-1`. Ordering is column, then position, then
/// level, which is also the order the grid enumerates slots in.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct Location {
    column: char,
    position: u8,
    level: u8,
}

impl Location {
    /// Build a coordinate. Whether it exists is decided by a [`Grid`].
    pub const fn new(column: char, position: u8, level: u8) -> Self {
        Self {
            column: column.to_ascii_uppercase(),
            position,
            level,
        }
    }

    pub fn column(&self) -> char {
        self.column
    }

    pub fn position(&self) -> u8 {
        self.position
    }

    pub fn level(&self) -> u8 {
        self.level
    }
}

impl ValueObject for Location {}

impl core::fmt::Display for Location {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        write!(f, "{}-{}-{}", self.column, self.position, self.level)
    }
}

impl FromStr for Location {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let malformed = || DomainError::invalid_id(format!("location {s:?} is not COLUMN-POSITION-LEVEL"));

        let mut parts = s.trim().split('-');
        let (Some(column), Some(position), Some(level), None) =
            (parts.next(), parts.next(), parts.next(), parts.next())
        else {
            return Err(malformed());
        };

        let mut chars = column.chars();
        let column = match (chars.next(), chars.next()) {
            (Some(c), None) if c.is_ascii_alphabetic() => c,
            _ => return Err(malformed()),
        };
        let position = position.parse::<u8>().map_err(|_| malformed())?;
        let level = level.parse::<u8>().map_err(|_| malformed())?;

        Ok(Location::new(column, position, level))
    }
}

impl TryFrom<String> for Location {
    type Error = DomainError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl From<Location> for String {
    fn from(value: Location) -> Self {
        value.to_string()
    }
}

/// The fixed, finite set of valid locations.
///
/// Built from [`crate::GridConfig::validate`]; columns are kept sorted.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Grid {
    columns: Vec<char>,
    positions: u8,
    levels: u8,
}

impl Grid {
    pub(crate) fn new(columns: Vec<char>, positions: u8, levels: u8) -> Self {
        Self {
            columns,
            positions,
            levels,
        }
    }

    pub fn columns(&self) -> &[char] {
        &self.columns
    }

    pub fn positions(&self) -> u8 {
        self.positions
    }

    pub fn levels(&self) -> u8 {
        self.levels
    }

    pub fn has_column(&self, column: char) -> bool {
        self.columns.binary_search(&column).is_ok()
    }

    pub fn contains(&self, location: &Location) -> bool {
        self.has_column(location.column)
            && (1..=self.positions).contains(&location.position)
            && (1..=self.levels).contains(&location.level)
    }

    /// Number of slots in the grid.
    pub fn len(&self) -> usize {
        self.columns.len() * usize::from(self.positions) * usize::from(self.levels)
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Every slot, in [`Location`] order.
    pub fn locations(&self) -> impl Iterator<Item = Location> + '_ {
        self.columns.iter().flat_map(move |&c| self.slots_of(c))
    }

    /// Every slot of one column; empty if the column is not part of the grid.
    pub fn column(&self, column: char) -> impl Iterator<Item = Location> + '_ {
        let column = column.to_ascii_uppercase();
        let known = self.has_column(column);
        self.slots_of(column).filter(move |_| known)
    }

    fn slots_of(&self, column: char) -> impl Iterator<Item = Location> + '_ {
        (1..=self.positions)
            .flat_map(move |p| (1..=self.levels).map(move |l| Location::new(column, p, l)))
    }
}

impl Default for Grid {
    /// Columns `A`..=`K`, 15 positions, 3 levels.
    fn default() -> Self {
        Self::new(('A'..='K').collect(), 15, 3)
    }
}
