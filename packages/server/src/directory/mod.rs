//! Collaborator interfaces for store and product lookups.
//!
//! The gateway never owns store or product data; it queries two
//! external systems through the narrow traits below. Implementations:
//! production clients over the peer network (out of tree), memory
//! (tests and the dev server).

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::environment::Environment;

pub mod memory;

pub use memory::{MemoryProductCatalog, MemoryStoreDirectory};

/// Operational status of a store, normalized from the directory's
/// free-form status string.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StoreStatus {
    Open,
    Closed,
}

impl StoreStatus {
    /// Exactly `"closed"` maps to [`StoreStatus::Closed`]; every other
    /// value, including absent, is treated as open.
    #[must_use]
    pub fn parse(raw: &str) -> Self {
        if raw == "closed" {
            Self::Closed
        } else {
            Self::Open
        }
    }
}

/// A store record as returned by the store directory.
///
/// Every field is optional: the directory is a loosely-schemaed
/// JSON-speaking system and records routinely omit fields.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct StoreRecord {
    /// The directory's own identifier for the store.
    pub id: Option<String>,
    pub name: Option<String>,
    /// Free-form status string; see [`StoreRecord::status`].
    pub status: Option<String>,
    pub address: Option<String>,
    pub contact_no: Option<String>,
    pub shop_admin_email: Option<String>,
    pub shop_type: Option<String>,
    pub updated_at: Option<DateTime<Utc>>,
}

impl StoreRecord {
    /// Normalized operational status.
    #[must_use]
    pub fn status(&self) -> StoreStatus {
        self.status
            .as_deref()
            .map_or(StoreStatus::Open, StoreStatus::parse)
    }
}

/// A product record as returned by the product catalog.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ProductRecord {
    /// The catalog's internal identifier.
    pub id: Option<String>,
    pub stripe_code: Option<String>,
    pub title: Option<String>,
    pub category: Option<String>,
    pub picture: Option<String>,
    pub price: Option<f64>,
    pub purchase_price: Option<f64>,
    pub shop_id: Option<String>,
    /// Free-form metadata object carried verbatim from the catalog.
    pub metadata: Option<serde_json::Value>,
    pub units: Option<i64>,
    pub is_vending: Option<bool>,
    pub available_items: Option<i64>,
}

/// Resolves store records by environment and store id.
#[async_trait]
pub trait StoreDirectory: Send + Sync {
    /// Look up a single store. `Ok(None)` means the store does not
    /// exist in the given environment; `Err` is an unexpected failure
    /// the handler maps to an internal error.
    async fn store_by_id(
        &self,
        environment: Environment,
        store_id: &str,
    ) -> anyhow::Result<Option<StoreRecord>>;
}

/// Resolves product records by environment, store id, and stripe code.
#[async_trait]
pub trait ProductCatalog: Send + Sync {
    /// Look up a single product. Same `Ok(None)` / `Err` split as
    /// [`StoreDirectory::store_by_id`].
    async fn product_by_stripe_code(
        &self,
        environment: Environment,
        store_id: &str,
        stripe_code: &str,
    ) -> anyhow::Result<Option<ProductRecord>>;
}
