//! Column sorting for inventory tables.
//!
//! Clicking a column header cycles its order ascending → descending → none.
//! Numeric columns compare numerically, text columns lexicographically.
//! Sorting is stable, so equal keys keep the server's order.

use std::cmp::Ordering;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::types::InventoryRecord;

/// Sortable inventory column.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SortKey {
    ProductId,
    VariantCode,
    Name,
    Price,
    Stock,
    Sales,
}

/// Error returned when a sort column is not recognized.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
#[error("invalid sort key: {0} (expected product_id, variant_code, name, price, stock or sales)")]
pub struct SortKeyError(pub String);

impl std::str::FromStr for SortKey {
    type Err = SortKeyError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().replace('-', "_").as_str() {
            "product_id" | "product" => Ok(Self::ProductId),
            "variant_code" | "variant" => Ok(Self::VariantCode),
            "name" => Ok(Self::Name),
            "price" => Ok(Self::Price),
            "stock" => Ok(Self::Stock),
            "sales" => Ok(Self::Sales),
            _ => Err(SortKeyError(s.to_owned())),
        }
    }
}

/// Sort direction.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SortOrder {
    Ascending,
    Descending,
}

/// A column and direction.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Sort {
    pub key: SortKey,
    pub order: SortOrder,
}

impl Sort {
    #[must_use]
    pub const fn ascending(key: SortKey) -> Self {
        Self {
            key,
            order: SortOrder::Ascending,
        }
    }

    #[must_use]
    pub const fn descending(key: SortKey) -> Self {
        Self {
            key,
            order: SortOrder::Descending,
        }
    }

    /// Next sort state after clicking the `key` column header.
    ///
    /// Same column: ascending → descending → unsorted. A different column
    /// always starts ascending.
    #[must_use]
    pub fn toggle(current: Option<Self>, key: SortKey) -> Option<Self> {
        match current {
            Some(sort) if sort.key == key => match sort.order {
                SortOrder::Ascending => Some(Self::descending(key)),
                SortOrder::Descending => None,
            },
            _ => Some(Self::ascending(key)),
        }
    }

    /// Compare two records under this sort.
    #[must_use]
    pub fn compare(&self, a: &InventoryRecord, b: &InventoryRecord) -> Ordering {
        let ordering = match self.key {
            SortKey::ProductId => a.product_id.cmp(&b.product_id),
            SortKey::VariantCode => a.variant_code.cmp(&b.variant_code),
            SortKey::Name => a.name.cmp(&b.name),
            SortKey::Price => a.price.cmp(&b.price),
            SortKey::Stock => a.stock.cmp(&b.stock),
            SortKey::Sales => a.sales.cmp(&b.sales),
        };
        match self.order {
            SortOrder::Ascending => ordering,
            SortOrder::Descending => ordering.reverse(),
        }
    }

    /// Sort records in place.
    pub fn apply(&self, records: &mut [InventoryRecord]) {
        records.sort_by(|a, b| self.compare(a, b));
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use rust_decimal::Decimal;

    use super::*;

    fn record(code: &str, name: &str, stock: i64, sales: i64) -> InventoryRecord {
        let mut record = InventoryRecord::new(code, format!("P-{code}"));
        record.name = name.to_owned();
        record.stock = stock;
        record.sales = Decimal::from(sales);
        record
    }

    fn codes(records: &[InventoryRecord]) -> Vec<&str> {
        records.iter().map(|r| r.variant_code.as_str()).collect()
    }

    #[test]
    fn test_toggle_cycle() {
        let first = Sort::toggle(None, SortKey::Stock);
        assert_eq!(first, Some(Sort::ascending(SortKey::Stock)));
        let second = Sort::toggle(first, SortKey::Stock);
        assert_eq!(second, Some(Sort::descending(SortKey::Stock)));
        assert_eq!(Sort::toggle(second, SortKey::Stock), None);
    }

    #[test]
    fn test_toggle_other_column_restarts_ascending() {
        let current = Some(Sort::descending(SortKey::Stock));
        assert_eq!(
            Sort::toggle(current, SortKey::Name),
            Some(Sort::ascending(SortKey::Name))
        );
    }

    #[test]
    fn test_numeric_sort_is_numeric() {
        let mut records = vec![record("A", "a", 100, 0), record("B", "b", 9, 0), record("C", "c", 20, 0)];
        Sort::ascending(SortKey::Stock).apply(&mut records);
        assert_eq!(codes(&records), vec!["B", "C", "A"]);
    }

    #[test]
    fn test_descending_sales() {
        let mut records = vec![record("A", "a", 0, 5), record("B", "b", 0, 50), record("C", "c", 0, 10)];
        Sort::descending(SortKey::Sales).apply(&mut records);
        assert_eq!(codes(&records), vec!["B", "C", "A"]);
    }

    #[test]
    fn test_sort_is_stable() {
        let mut records = vec![record("A", "same", 1, 0), record("B", "same", 2, 0), record("C", "alpha", 3, 0)];
        Sort::ascending(SortKey::Name).apply(&mut records);
        assert_eq!(codes(&records), vec!["C", "A", "B"]);
    }

    #[test]
    fn test_parse_sort_key() {
        assert_eq!("product-id".parse::<SortKey>().unwrap(), SortKey::ProductId);
        assert_eq!("Sales".parse::<SortKey>().unwrap(), SortKey::Sales);
        assert!("colour".parse::<SortKey>().is_err());
    }
}
