//! Inventory variant records as returned by the list endpoint.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use super::id::{ProductCode, VariantCode};
use super::lenient;
use super::status::StockStatus;

/// One sellable variant of a product, the unit of inventory tracking.
///
/// Numeric fields are decoded leniently (see [`lenient`]): the API sends
/// `sales` and `cost_price` as strings and may send `null` anywhere.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct InventoryRecord {
    /// Unique variant code.
    pub variant_code: VariantCode,
    /// Owning product.
    pub product_id: ProductCode,
    /// Product name.
    #[serde(default)]
    pub name: String,
    /// Category name.
    #[serde(default)]
    pub category: String,
    /// Option label (size, colour, ...).
    #[serde(default)]
    pub option: String,
    /// Selling price.
    #[serde(default, deserialize_with = "lenient::decimal")]
    pub price: Decimal,
    /// Purchase cost (computed server-side).
    #[serde(default, deserialize_with = "lenient::decimal")]
    pub cost_price: Decimal,
    /// Units on hand.
    #[serde(default, deserialize_with = "lenient::count")]
    pub stock: i64,
    /// Reorder threshold.
    #[serde(default, deserialize_with = "lenient::count")]
    pub min_stock: i64,
    /// Total sales amount (computed server-side).
    #[serde(default, deserialize_with = "lenient::decimal")]
    pub sales: Decimal,
    /// Number of orders.
    #[serde(default, deserialize_with = "lenient::count")]
    pub order_count: i64,
    /// Number of returns.
    #[serde(default, deserialize_with = "lenient::count")]
    pub return_count: i64,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub memo: String,
    /// Supplier names, formatted for display.
    #[serde(default)]
    pub suppliers: String,
}

impl InventoryRecord {
    /// Create a record with the given identity and zeroed quantities.
    #[must_use]
    pub fn new(variant_code: impl Into<VariantCode>, product_id: impl Into<ProductCode>) -> Self {
        Self {
            variant_code: variant_code.into(),
            product_id: product_id.into(),
            name: String::new(),
            category: String::new(),
            option: String::new(),
            price: Decimal::ZERO,
            cost_price: Decimal::ZERO,
            stock: 0,
            min_stock: 0,
            sales: Decimal::ZERO,
            order_count: 0,
            return_count: 0,
            description: String::new(),
            memo: String::new(),
            suppliers: String::new(),
        }
    }

    /// Derived stock status, recomputed on every call.
    #[must_use]
    pub const fn status(&self) -> StockStatus {
        StockStatus::derive(self.stock, self.min_stock)
    }
}
