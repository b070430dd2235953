//! In-memory collaborator implementations.
//!
//! Back the test suite (call-count assertions against the handler) and
//! the dev server. Records are keyed by `(environment, id)`; lookups
//! clone, so a populated instance is safe to share behind `Arc`.

use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};

use async_trait::async_trait;

use super::{ProductCatalog, ProductRecord, StoreDirectory, StoreRecord};
use crate::environment::Environment;

/// In-memory [`StoreDirectory`] with a lookup counter.
#[derive(Debug, Default)]
pub struct MemoryStoreDirectory {
    stores: HashMap<(Environment, String), StoreRecord>,
    calls: AtomicUsize,
}

impl MemoryStoreDirectory {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers a store record. Populate before sharing.
    pub fn insert(&mut self, environment: Environment, store_id: impl Into<String>, record: StoreRecord) {
        self.stores.insert((environment, store_id.into()), record);
    }

    /// Number of lookups performed so far.
    #[must_use]
    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::Relaxed)
    }
}

#[async_trait]
impl StoreDirectory for MemoryStoreDirectory {
    async fn store_by_id(
        &self,
        environment: Environment,
        store_id: &str,
    ) -> anyhow::Result<Option<StoreRecord>> {
        self.calls.fetch_add(1, Ordering::Relaxed);
        Ok(self
            .stores
            .get(&(environment, store_id.to_string()))
            .cloned())
    }
}

/// In-memory [`ProductCatalog`] with a lookup counter.
#[derive(Debug, Default)]
pub struct MemoryProductCatalog {
    products: HashMap<(Environment, String, String), ProductRecord>,
    calls: AtomicUsize,
}

impl MemoryProductCatalog {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers a product record. Populate before sharing.
    pub fn insert(
        &mut self,
        environment: Environment,
        store_id: impl Into<String>,
        stripe_code: impl Into<String>,
        record: ProductRecord,
    ) {
        self.products
            .insert((environment, store_id.into(), stripe_code.into()), record);
    }

    /// Number of lookups performed so far.
    #[must_use]
    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::Relaxed)
    }
}

#[async_trait]
impl ProductCatalog for MemoryProductCatalog {
    async fn product_by_stripe_code(
        &self,
        environment: Environment,
        store_id: &str,
        stripe_code: &str,
    ) -> anyhow::Result<Option<ProductRecord>> {
        self.calls.fetch_add(1, Ordering::Relaxed);
        Ok(self
            .products
            .get(&(environment, store_id.to_string(), stripe_code.to_string()))
            .cloned())
    }
}
