use core::cmp::Ordering;
use core::str::FromStr;

use serde::{Deserialize, Serialize};

use rackledger_core::{DomainError, DomainResult, Entity, ValueObject};

/// Product code (stock-keeping unit), e.g. `PRD001`.
///
/// Trimmed, non-empty, ASCII alphanumeric plus `-` and `_`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct ProductCode(String);

impl ProductCode {
    pub fn new(code: impl AsRef<str>) -> DomainResult<Self> {
        let code = code.as_ref().trim();
        if code.is_empty() {
            return Err(DomainError::invalid_id("product code cannot be empty"));
        }
        if !code
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || c == '-' || c == '_')
        {
            return Err(DomainError::invalid_id(format!(
                "product code {code:?} contains unsupported characters"
            )));
        }
        Ok(Self(code.to_string()))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl ValueObject for ProductCode {}

impl core::fmt::Display for ProductCode {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.write_str(&self.0)
    }
}

impl FromStr for ProductCode {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::new(s)
    }
}

impl TryFrom<String> for ProductCode {
    type Error = DomainError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

impl From<ProductCode> for String {
    fn from(value: ProductCode) -> Self {
        value.0
    }
}

/// Product metadata the ledger resolves codes against.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Product {
    code: ProductCode,
    name: String,
    quantity_per_case: u32,
    minimum_stock: u64,
}

impl Product {
    /// Validate and build a product.
    ///
    /// `minimum_stock` is expressed in individual units, not cases.
    pub fn new(
        code: ProductCode,
        name: impl Into<String>,
        quantity_per_case: u32,
        minimum_stock: u64,
    ) -> DomainResult<Self> {
        let name = name.into();
        if name.trim().is_empty() {
            return Err(DomainError::validation("name cannot be empty"));
        }
        if quantity_per_case == 0 {
            return Err(DomainError::validation("quantity per case must be positive"));
        }
        Ok(Self {
            code,
            name: name.trim().to_string(),
            quantity_per_case,
            minimum_stock,
        })
    }

    pub fn code(&self) -> &ProductCode {
        &self.code
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn quantity_per_case(&self) -> u32 {
        self.quantity_per_case
    }

    pub fn minimum_stock(&self) -> u64 {
        self.minimum_stock
    }

    /// Units contained in `cases` full cases of this product.
    pub fn units_for(&self, cases: u64) -> u64 {
        cases.saturating_mul(u64::from(self.quantity_per_case))
    }

    /// Case-insensitive substring match on code or name.
    pub fn matches(&self, term: &str) -> bool {
        let term = term.trim().to_lowercase();
        term.is_empty()
            || self.code.as_str().to_lowercase().contains(&term)
            || self.name.to_lowercase().contains(&term)
    }
}

impl Entity for Product {
    type Id = ProductCode;

    fn id(&self) -> &Self::Id {
        &self.code
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SortDirection {
    #[default]
    Asc,
    Desc,
}

impl SortDirection {
    /// Orient an ascending comparison.
    pub fn apply(self, ordering: Ordering) -> Ordering {
        match self {
            SortDirection::Asc => ordering,
            SortDirection::Desc => ordering.reverse(),
        }
    }

    pub fn toggled(self) -> Self {
        match self {
            SortDirection::Asc => SortDirection::Desc,
            SortDirection::Desc => SortDirection::Asc,
        }
    }
}
