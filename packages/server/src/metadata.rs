//! Deterministic construction of the string metadata maps carried in
//! responses.
//!
//! Two sources feed these maps: a fixed field list for stores, and the
//! catalog's free-form metadata object for products. Product maps are
//! built in two explicit passes -- render the free-form entries, then
//! apply fixed-name overrides -- so serialization and override
//! precedence stay testable instead of depending on object iteration.

use std::collections::HashMap;

use serde_json::Value;

use crate::directory::{ProductRecord, StoreRecord};

/// Fixed-field metadata for a store record.
///
/// `shopType` defaults to `"store"` when the record omits it; every
/// other field defaults to the empty string.
#[must_use]
pub fn store_metadata(record: &StoreRecord) -> HashMap<String, String> {
    let text = |field: &Option<String>| field.clone().unwrap_or_default();

    HashMap::from([
        ("status".to_string(), text(&record.status)),
        ("address".to_string(), text(&record.address)),
        ("contact_no".to_string(), text(&record.contact_no)),
        (
            "shop_admin_email".to_string(),
            text(&record.shop_admin_email),
        ),
        (
            "shopType".to_string(),
            record
                .shop_type
                .clone()
                .unwrap_or_else(|| "store".to_string()),
        ),
    ])
}

/// Metadata map for a product record.
///
/// Pass 1 flattens the free-form metadata object (ignored unless it is
/// object-shaped). Pass 2 injects `units`, `isVending`, and
/// `availableItems` when present on the record, overriding any
/// same-named free-form keys.
#[must_use]
pub fn product_metadata(record: &ProductRecord) -> HashMap<String, String> {
    let mut map = HashMap::new();

    if let Some(Value::Object(fields)) = &record.metadata {
        for (key, value) in fields {
            map.insert(key.clone(), render(value));
        }
    }

    if let Some(units) = record.units {
        map.insert("units".to_string(), units.to_string());
    }
    if let Some(is_vending) = record.is_vending {
        map.insert("isVending".to_string(), is_vending.to_string());
    }
    if let Some(available) = record.available_items {
        map.insert("availableItems".to_string(), available.to_string());
    }

    map
}

/// Renders one free-form value as a string.
///
/// Strings pass through raw; other scalars (numbers, booleans, null)
/// use their JSON text; structured values serialize to compact JSON.
fn render(value: &Value) -> String {
    match value {
        Value::String(text) => text.clone(),
        other => other.to_string(),
    }
}
