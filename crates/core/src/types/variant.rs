//! Variant detail, supplier and mutation payloads.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use super::id::{AdjustmentId, ProductCode, SupplierId, VariantCode};
use super::lenient;

/// A supplier linked to a variant (detail endpoint).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SupplierLink {
    /// Supplier name.
    pub name: String,
    /// Unit cost from this supplier.
    #[serde(default, deserialize_with = "lenient::decimal")]
    pub cost_price: Decimal,
    /// Whether this is the primary supplier.
    #[serde(default)]
    pub is_primary: bool,
}

/// A single variant as returned by the detail endpoint.
///
/// Unlike list rows, the detail view carries supplier links as structured
/// objects rather than a display string.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct VariantDetail {
    pub variant_code: VariantCode,
    pub product_id: ProductCode,
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub option: String,
    #[serde(default, deserialize_with = "lenient::decimal")]
    pub price: Decimal,
    #[serde(default, deserialize_with = "lenient::count")]
    pub stock: i64,
    #[serde(default, deserialize_with = "lenient::count")]
    pub min_stock: i64,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub memo: String,
    #[serde(default)]
    pub suppliers: Vec<SupplierLink>,
}

/// A supplier record from the supplier list.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Supplier {
    pub id: SupplierId,
    pub name: String,
    #[serde(default)]
    pub contact: String,
    #[serde(default)]
    pub manager: String,
    #[serde(default)]
    pub email: String,
    #[serde(default)]
    pub address: String,
}

/// Partial update for a variant. Unset fields are left untouched.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct VariantUpdate {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub option: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub price: Option<Decimal>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub min_stock: Option<i64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub memo: Option<String>,
}

impl VariantUpdate {
    /// Whether the update would change nothing.
    #[must_use]
    pub const fn is_empty(&self) -> bool {
        self.name.is_none()
            && self.option.is_none()
            && self.price.is_none()
            && self.min_stock.is_none()
            && self.description.is_none()
            && self.memo.is_none()
    }
}

/// A new variant, either added to an existing product or created together
/// with its product.
///
/// Optional fields left unset are omitted so the server applies its own
/// defaults.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NewVariant {
    pub product_id: ProductCode,
    pub name: String,
    /// Option label such as "Red / M"; required by the server.
    pub option: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub category: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub price: Option<Decimal>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub min_stock: Option<i64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub memo: Option<String>,
}

/// Request to fold source variants into a target variant.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MergeRequest {
    pub target_variant_code: VariantCode,
    pub source_variant_codes: Vec<VariantCode>,
}

/// Stock count correction after a physical count.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StockAdjustmentRequest {
    /// Counted quantity; the server records the delta.
    pub actual_stock: i64,
    pub reason: String,
    pub updated_by: String,
}

/// One entry of the stock adjustment history.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StockAdjustment {
    pub id: AdjustmentId,
    pub variant_code: VariantCode,
    pub product_id: ProductCode,
    #[serde(default)]
    pub product_name: String,
    /// Change in stock (negative for shrinkage).
    pub delta: i64,
    #[serde(default)]
    pub reason: String,
    #[serde(default)]
    pub created_by: String,
    pub created_at: DateTime<Utc>,
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_variant_update_skips_unset_fields() {
        let update = VariantUpdate {
            min_stock: Some(10),
            memo: Some("recount".to_owned()),
            ..VariantUpdate::default()
        };
        let json = serde_json::to_value(&update).unwrap();
        assert_eq!(json, serde_json::json!({"min_stock": 10, "memo": "recount"}));
    }

    #[test]
    fn test_variant_update_is_empty() {
        assert!(VariantUpdate::default().is_empty());
        let update = VariantUpdate {
            price: Some(Decimal::from(1000)),
            ..VariantUpdate::default()
        };
        assert!(!update.is_empty());
    }

    #[test]
    fn test_new_variant_omits_unset_fields() {
        let new = NewVariant {
            product_id: ProductCode::new("P001"),
            name: "Linen shirt".to_owned(),
            option: "Red / M".to_owned(),
            category: None,
            price: Some(Decimal::new(2_990, 2)),
            min_stock: None,
            description: None,
            memo: None,
        };
        let json = serde_json::to_value(&new).unwrap();
        assert_eq!(
            json,
            serde_json::json!({
                "product_id": "P001",
                "name": "Linen shirt",
                "option": "Red / M",
                "price": "29.90",
            })
        );
    }

    #[test]
    fn test_variant_detail_with_suppliers() {
        let json = r#"{
            "variant_code": "P001-A",
            "product_id": "P001",
            "stock": 4,
            "suppliers": [{"name": "Hanil", "cost_price": 1200, "is_primary": true}]
        }"#;
        let detail: VariantDetail = serde_json::from_str(json).unwrap();
        assert_eq!(detail.suppliers.len(), 1);
        assert!(detail.suppliers[0].is_primary);
        assert_eq!(detail.suppliers[0].cost_price, Decimal::from(1200));
    }

    #[test]
    fn test_stock_adjustment_timestamp() {
        let json = r#"{
            "id": 3,
            "variant_code": "P001-A",
            "product_id": "P001",
            "product_name": "Shirt",
            "delta": -2,
            "reason": "damaged",
            "created_by": "kim",
            "created_at": "2025-07-01T09:30:00+09:00"
        }"#;
        let adjustment: StockAdjustment = serde_json::from_str(json).unwrap();
        assert_eq!(adjustment.delta, -2);
        assert_eq!(adjustment.created_at.to_rfc3339(), "2025-07-01T00:30:00+00:00");
    }
}
