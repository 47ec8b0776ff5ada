//! Product options for the product picker.

use std::collections::HashSet;

use serde::{Deserialize, Serialize};

use crate::types::{InventoryRecord, ProductCode};

/// A product as offered by the picker: one entry per product, not per variant.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProductOption {
    pub product_id: ProductCode,
    pub name: String,
}

/// Collapse variants to one option per `product_id`.
///
/// The first variant seen for each product supplies the name, and options
/// keep the order in which their products first appear.
#[must_use]
pub fn unique_products(records: &[InventoryRecord]) -> Vec<ProductOption> {
    let mut seen = HashSet::new();
    records
        .iter()
        .filter(|record| seen.insert(&record.product_id))
        .map(|record| ProductOption {
            product_id: record.product_id.clone(),
            name: record.name.clone(),
        })
        .collect()
}
