//! Stock entries and the two-way index that holds them.

use std::collections::{BTreeMap, BTreeSet};

use serde::Serialize;

use rackledger_products::ProductCode;

use crate::location::Location;

/// Cases of one product at one location.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct StockEntry {
    pub product: ProductCode,
    pub location: Location,
    pub cases: u64,
}

/// Aggregated stock of one product across the grid.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ProductStock {
    pub product: ProductCode,
    pub total_cases: u64,
    /// `total_cases * quantity_per_case`.
    pub total_quantity: u64,
    /// Ordered by location.
    pub locations: Vec<(Location, u64)>,
}

/// Occupied slot in a column view.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SlotStock {
    pub location: Location,
    /// Ordered by product code.
    pub entries: Vec<StockEntry>,
}

/// Stock indexed by location and by product.
///
/// Case counts live only in `by_location`; `by_product` just records where a
/// product is stocked. A pair is present iff its count is positive, so there
/// is at most one entry per (product, location) and no zero entries.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub(crate) struct StockBook {
    by_location: BTreeMap<Location, BTreeMap<ProductCode, u64>>,
    by_product: BTreeMap<ProductCode, BTreeSet<Location>>,
}

impl StockBook {
    pub(crate) fn cases(&self, product: &ProductCode, location: &Location) -> u64 {
        self.by_location
            .get(location)
            .and_then(|slot| slot.get(product))
            .copied()
            .unwrap_or(0)
    }

    pub(crate) fn credit(&mut self, product: &ProductCode, location: Location, cases: u64) {
        if cases == 0 {
            return;
        }
        *self
            .by_location
            .entry(location)
            .or_default()
            .entry(product.clone())
            .or_insert(0) += cases;
        self.by_product
            .entry(product.clone())
            .or_default()
            .insert(location);
    }

    /// Remove `cases`; the entry disappears when it reaches zero.
    ///
    /// Callers check availability first.
    pub(crate) fn debit(&mut self, product: &ProductCode, location: Location, cases: u64) {
        let Some(slot) = self.by_location.get_mut(&location) else {
            return;
        };
        let Some(current) = slot.get_mut(product) else {
            return;
        };
        debug_assert!(*current >= cases, "debit beyond available stock");

        *current = current.saturating_sub(cases);
        if *current > 0 {
            return;
        }

        slot.remove(product);
        if slot.is_empty() {
            self.by_location.remove(&location);
        }
        if let Some(locations) = self.by_product.get_mut(product) {
            locations.remove(&location);
            if locations.is_empty() {
                self.by_product.remove(product);
            }
        }
    }

    pub(crate) fn at_location(&self, location: &Location) -> Vec<StockEntry> {
        self.by_location
            .get(location)
            .map(|slot| {
                slot.iter()
                    .map(|(product, &cases)| StockEntry {
                        product: product.clone(),
                        location: *location,
                        cases,
                    })
                    .collect()
            })
            .unwrap_or_default()
    }

    pub(crate) fn of_product(&self, product: &ProductCode) -> Vec<(Location, u64)> {
        self.by_product
            .get(product)
            .map(|locations| {
                locations
                    .iter()
                    .map(|location| (*location, self.cases(product, location)))
                    .collect()
            })
            .unwrap_or_default()
    }

    /// Cases of `product` over all slots.
    pub(crate) fn product_total(&self, product: &ProductCode) -> u64 {
        self.by_product
            .get(product)
            .map(|locations| {
                locations
                    .iter()
                    .fold(0u64, |total, location| total.saturating_add(self.cases(product, location)))
            })
            .unwrap_or(0)
    }

    /// Every entry, ordered by location then product.
    pub(crate) fn entries(&self) -> impl Iterator<Item = StockEntry> + '_ {
        self.by_location.iter().flat_map(|(location, slot)| {
            slot.iter().map(move |(product, &cases)| StockEntry {
                product: product.clone(),
                location: *location,
                cases,
            })
        })
    }

    /// Occupied slots of a column, in location order.
    pub(crate) fn column(&self, column: char) -> Vec<SlotStock> {
        let start = Location::new(column, 0, 0);
        self.by_location
            .range(start..)
            .take_while(|(location, _)| location.column() == column)
            .map(|(location, _)| SlotStock {
                location: *location,
                entries: self.at_location(location),
            })
            .collect()
    }

    pub(crate) fn len(&self) -> usize {
        self.by_location.values().map(BTreeMap::len).sum()
    }
}
