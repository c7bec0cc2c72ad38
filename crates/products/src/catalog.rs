use std::collections::BTreeMap;
use std::sync::{Arc, RwLock};

use rackledger_core::{DomainError, DomainResult};

use crate::product::{Product, ProductCode};

/// Read access to registered products.
///
/// This is the only view of the catalog the ledger gets. Implementations
/// must be shareable across threads because the ledger may sit behind a lock
/// while the catalog keeps changing elsewhere.
pub trait ProductDirectory: Send + Sync {
    fn lookup(&self, code: &ProductCode) -> Option<Product>;

    /// All registered products, ordered by code.
    fn products(&self) -> Vec<Product>;

    /// Products whose code or name contains `term` (case-insensitive),
    /// ordered by code. A blank term matches everything.
    fn search(&self, term: &str) -> Vec<Product> {
        self.products().into_iter().filter(|p| p.matches(term)).collect()
    }
}

/// In-memory product catalog keyed by code.
#[derive(Debug, Clone, Default)]
pub struct Catalog {
    products: BTreeMap<ProductCode, Product>,
}

impl Catalog {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a new product. Codes are unique.
    pub fn register(&mut self, product: Product) -> DomainResult<()> {
        if self.products.contains_key(product.code()) {
            return Err(DomainError::conflict(format!(
                "product {} already registered",
                product.code()
            )));
        }
        tracing::debug!(code = %product.code(), name = product.name(), "product registered");
        self.products.insert(product.code().clone(), product);
        Ok(())
    }

    /// Replace the metadata of an already registered product.
    pub fn update(&mut self, product: Product) -> DomainResult<()> {
        match self.products.get_mut(product.code()) {
            Some(existing) => {
                *existing = product;
                Ok(())
            }
            None => Err(DomainError::not_found(format!("product {}", product.code()))),
        }
    }

    pub fn get(&self, code: &ProductCode) -> Option<&Product> {
        self.products.get(code)
    }

    pub fn len(&self) -> usize {
        self.products.len()
    }

    pub fn is_empty(&self) -> bool {
        self.products.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &Product> {
        self.products.values()
    }
}

impl ProductDirectory for Catalog {
    fn lookup(&self, code: &ProductCode) -> Option<Product> {
        self.get(code).cloned()
    }

    fn products(&self) -> Vec<Product> {
        self.iter().cloned().collect()
    }
}

/// A poisoned lock reads as an empty catalog; the poisoning is logged.
impl ProductDirectory for RwLock<Catalog> {
    fn lookup(&self, code: &ProductCode) -> Option<Product> {
        match self.read() {
            Ok(catalog) => catalog.lookup(code),
            Err(_) => {
                tracing::warn!(code = %code, "catalog lock poisoned; product lookup failed");
                None
            }
        }
    }

    fn products(&self) -> Vec<Product> {
        match self.read() {
            Ok(catalog) => catalog.products(),
            Err(_) => {
                tracing::warn!("catalog lock poisoned; listing no products");
                Vec::new()
            }
        }
    }
}

impl<T> ProductDirectory for Arc<T>
where
    T: ProductDirectory + ?Sized,
{
    fn lookup(&self, code: &ProductCode) -> Option<Product> {
        (**self).lookup(code)
    }

    fn products(&self) -> Vec<Product> {
        (**self).products()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn product(code: &str, name: &str) -> Product {
        Product::new(ProductCode::new(code).unwrap(), name, 24, 100).unwrap()
    }

    fn sample_catalog() -> Catalog {
        let mut catalog = Catalog::new();
        catalog.register(product("PRD002", "Organic Black Tea")).unwrap();
        catalog.register(product("PRD001", "Premium Coffee Beans")).unwrap();
        catalog.register(product("PRD003", "Matcha Powder")).unwrap();
        catalog
    }

    #[test]
    fn duplicate_registration_is_a_conflict() {
        let mut catalog = sample_catalog();
        let err = catalog.register(product("PRD001", "Other")).unwrap_err();
        match err {
            DomainError::Conflict(msg) => assert!(msg.contains("PRD001")),
            _ => panic!("Expected Conflict error for duplicate code"),
        }
        assert_eq!(catalog.len(), 3);
    }

    #[test]
    fn update_requires_existing_code() {
        let mut catalog = sample_catalog();
        catalog.update(product("PRD001", "Decaf Coffee Beans")).unwrap();
        assert_eq!(
            catalog.get(&ProductCode::new("PRD001").unwrap()).unwrap().name(),
            "Decaf Coffee Beans"
        );

        let err = catalog.update(product("PRD999", "Ghost")).unwrap_err();
        match err {
            DomainError::NotFound(_) => {}
            _ => panic!("Expected NotFound error for unknown code"),
        }
    }

    #[test]
    fn iteration_is_ordered_by_code() {
        let catalog = sample_catalog();
        let codes: Vec<_> = catalog.iter().map(|p| p.code().as_str()).collect();
        assert_eq!(codes, vec!["PRD001", "PRD002", "PRD003"]);
    }

    #[test]
    fn search_matches_code_and_name() {
        let catalog = sample_catalog();
        let by_name: Vec<_> = catalog.search("tea").into_iter().map(|p| p.code().to_string()).collect();
        assert_eq!(by_name, vec!["PRD002"]);

        assert_eq!(catalog.search("prd00").len(), 3);
        assert_eq!(catalog.search("  ").len(), 3);
    }

    #[test]
    fn locked_catalog_sees_later_registrations() {
        let shared = Arc::new(RwLock::new(Catalog::new()));
        let directory: Arc<dyn ProductDirectory> = shared.clone();
        let code = ProductCode::new("PRD001").unwrap();

        assert!(directory.lookup(&code).is_none());
        shared.write().unwrap().register(product("PRD001", "Coffee")).unwrap();
        assert_eq!(directory.lookup(&code).unwrap().name(), "Coffee");
        assert_eq!(directory.products().len(), 1);
    }

    #[test]
    fn poisoned_catalog_lock_reads_as_empty() {
        let shared = Arc::new(RwLock::new(sample_catalog()));
        let poisoner = Arc::clone(&shared);
        let _ = std::thread::spawn(move || {
            let _guard = poisoner.write().unwrap();
            panic!("poison the catalog");
        })
        .join();

        assert!(shared.is_poisoned());
        assert!(shared.lookup(&ProductCode::new("PRD001").unwrap()).is_none());
        assert!(shared.products().is_empty());
    }

    mod proptest_tests {
        use super::*;
        use proptest::prelude::*;

        proptest! {
            #![proptest_config(ProptestConfig {
                cases: 256,
                ..ProptestConfig::default()
            })]

            /// Property: every search hit contains the term, and every miss does not.
            #[test]
            fn search_partitions_the_catalog(term in "[a-zA-Z0-9]{0,4}") {
                let catalog = sample_catalog();
                let hits: Vec<_> = catalog.search(&term).into_iter().map(|p| p.code().clone()).collect();
                let needle = term.to_lowercase();

                for p in catalog.iter() {
                    let contains = p.code().as_str().to_lowercase().contains(&needle)
                        || p.name().to_lowercase().contains(&needle);
                    prop_assert_eq!(hits.contains(p.code()), contains);
                }
            }
        }
    }
}
