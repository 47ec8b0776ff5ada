//! Inventory filter criteria.
//!
//! A [`FilterCriteria`] is built once from the user's filter inputs and then
//! used twice: [`FilterCriteria::server_query`] turns it into the list
//! endpoint's query parameters, and [`FilterCriteria::matches`] re-applies
//! every predicate to the records the server returned. The server cannot
//! evaluate the derived stock status, and it paginates before filtering, so
//! whenever any criterion is present the caller must fetch the full result
//! set and filter locally ([`FilterCriteria::requires_full_scan`]).
//!
//! ```
//! use storeroom_core::FilterCriteria;
//!
//! let criteria = FilterCriteria::default().with_stock_range(Some(5), Some(20));
//! let query = criteria.server_query();
//!
//! assert_eq!(query.stock_gt, Some(4));
//! assert_eq!(query.stock_lt, Some(21));
//! assert!(criteria.requires_full_scan());
//! ```

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::types::{InventoryRecord, StockStatus, StockStatusError};

/// Upper sales bound the filter form starts at. A maximum at or above this
/// value means "no maximum".
pub const SALES_CEILING: Decimal = Decimal::from_parts(5_000_000, 0, 0, false, 0);

// =============================================================================
// Ranges
// =============================================================================

/// Inclusive stock range `[min, max]`, each bound optional.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct StockRange {
    pub min: Option<i64>,
    pub max: Option<i64>,
}

impl StockRange {
    /// Exclusive lower bound sent to the server as `stock_gt`.
    #[must_use]
    pub const fn gt(&self) -> Option<i64> {
        match self.min {
            Some(min) => Some(min.saturating_sub(1)),
            None => None,
        }
    }

    /// Exclusive upper bound sent to the server as `stock_lt`.
    #[must_use]
    pub const fn lt(&self) -> Option<i64> {
        match self.max {
            Some(max) => Some(max.saturating_add(1)),
            None => None,
        }
    }

    #[must_use]
    pub const fn is_unbounded(&self) -> bool {
        self.min.is_none() && self.max.is_none()
    }

    /// Check `stock > gt` and `stock < lt`, skipping absent bounds.
    #[must_use]
    pub fn contains(&self, stock: i64) -> bool {
        self.gt().is_none_or(|gt| stock > gt) && self.lt().is_none_or(|lt| stock < lt)
    }
}

/// Inclusive sales range `[min, max]`, each bound optional.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SalesRange {
    pub min: Option<Decimal>,
    pub max: Option<Decimal>,
}

impl SalesRange {
    /// Build a range from form values, dropping the form's defaults.
    ///
    /// A minimum of zero or less and a maximum at or above
    /// [`SALES_CEILING`] are the form's starting values and impose no
    /// constraint.
    #[must_use]
    pub fn from_bounds(min: Option<Decimal>, max: Option<Decimal>) -> Self {
        Self {
            min: min.filter(|min| *min > Decimal::ZERO),
            max: max.filter(|max| *max < SALES_CEILING),
        }
    }

    #[must_use]
    pub const fn is_unbounded(&self) -> bool {
        self.min.is_none() && self.max.is_none()
    }

    #[must_use]
    pub fn contains(&self, sales: Decimal) -> bool {
        self.min.is_none_or(|min| sales >= min) && self.max.is_none_or(|max| sales <= max)
    }
}

// =============================================================================
// Server Query
// =============================================================================

/// Query parameters understood by `GET inventory/variants/`.
///
/// Pagination parameters are added by the fetch loop, not stored here.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, Serialize)]
pub struct ServerQuery {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub category: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub stock_gt: Option<i64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub stock_lt: Option<i64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub sales_min: Option<Decimal>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub sales_max: Option<Decimal>,
    /// Product-name search used by the product picker.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub product_name: Option<String>,
}

impl ServerQuery {
    /// Query for the product search picker.
    #[must_use]
    pub fn product_search(product_name: impl Into<String>) -> Self {
        Self {
            product_name: Some(product_name.into()).filter(|name| !name.is_empty()),
            ..Self::default()
        }
    }

    /// Parameters as key/value pairs, in a fixed order.
    #[must_use]
    pub fn to_pairs(&self) -> Vec<(&'static str, String)> {
        let mut pairs = Vec::new();
        if let Some(name) = &self.name {
            pairs.push(("name", name.clone()));
        }
        if let Some(category) = &self.category {
            pairs.push(("category", category.clone()));
        }
        if let Some(gt) = self.stock_gt {
            pairs.push(("stock_gt", gt.to_string()));
        }
        if let Some(lt) = self.stock_lt {
            pairs.push(("stock_lt", lt.to_string()));
        }
        if let Some(min) = self.sales_min {
            pairs.push(("sales_min", min.to_string()));
        }
        if let Some(max) = self.sales_max {
            pairs.push(("sales_max", max.to_string()));
        }
        if let Some(product_name) = &self.product_name {
            pairs.push(("product_name", product_name.clone()));
        }
        pairs
    }

    /// Stable string form, used as a cache key.
    #[must_use]
    pub fn cache_key(&self) -> String {
        self.to_pairs()
            .into_iter()
            .map(|(key, value)| format!("{key}={value}"))
            .collect::<Vec<_>>()
            .join("&")
    }
}

// =============================================================================
// Filter Criteria
// =============================================================================

/// Raw filter values as a form or command line supplies them.
///
/// Field names follow the UI (`min_stock`, not `stock_gt`). Convert with
/// [`FilterForm::into_criteria`], which also drops the form's sentinel
/// values.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct FilterForm {
    pub name: Option<String>,
    pub category: Option<String>,
    pub status: Option<String>,
    pub min_stock: Option<i64>,
    pub max_stock: Option<i64>,
    pub min_sales: Option<Decimal>,
    pub max_sales: Option<Decimal>,
}

impl FilterForm {
    /// Convert to typed criteria.
    ///
    /// # Errors
    ///
    /// Returns [`StockStatusError`] if `status` is not a known label.
    pub fn into_criteria(self) -> Result<FilterCriteria, StockStatusError> {
        let status = match self.status.as_deref() {
            Some(label) => StockStatus::parse_filter(label)?,
            None => None,
        };

        Ok(FilterCriteria::default()
            .with_name(self.name.unwrap_or_default())
            .with_category(self.category.unwrap_or_default())
            .with_status(status)
            .with_stock_range(self.min_stock, self.max_stock)
            .with_sales_range(SalesRange::from_bounds(self.min_sales, self.max_sales)))
    }
}

/// Typed, immutable set of inventory filters.
///
/// Every field is optional; `None` means "no constraint". Build with the
/// `with_*` methods, each of which returns a new value.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FilterCriteria {
    name: Option<String>,
    name_lower: Option<String>,
    category: Option<String>,
    status: Option<StockStatus>,
    stock: StockRange,
    sales: SalesRange,
}

impl FilterCriteria {
    /// Case-insensitive name substring. An empty string clears the filter.
    #[must_use]
    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        let name = name.into();
        if name.is_empty() {
            self.name = None;
            self.name_lower = None;
        } else {
            self.name_lower = Some(name.to_lowercase());
            self.name = Some(name);
        }
        self
    }

    /// Exact category. An empty string clears the filter.
    #[must_use]
    pub fn with_category(mut self, category: impl Into<String>) -> Self {
        self.category = Some(category.into()).filter(|category| !category.is_empty());
        self
    }

    /// Derived status, or `None` for all statuses.
    #[must_use]
    pub fn with_status(mut self, status: Option<StockStatus>) -> Self {
        self.status = status;
        self
    }

    /// Inclusive stock bounds.
    #[must_use]
    pub fn with_stock_range(mut self, min: Option<i64>, max: Option<i64>) -> Self {
        self.stock = StockRange { min, max };
        self
    }

    /// Inclusive sales bounds.
    #[must_use]
    pub fn with_sales_range(mut self, sales: SalesRange) -> Self {
        self.sales = sales;
        self
    }

    #[must_use]
    pub fn name(&self) -> Option<&str> {
        self.name.as_deref()
    }

    #[must_use]
    pub fn category(&self) -> Option<&str> {
        self.category.as_deref()
    }

    #[must_use]
    pub const fn status(&self) -> Option<StockStatus> {
        self.status
    }

    #[must_use]
    pub const fn stock(&self) -> StockRange {
        self.stock
    }

    #[must_use]
    pub const fn sales(&self) -> SalesRange {
        self.sales
    }

    /// Whether no criterion is set.
    #[must_use]
    pub const fn is_empty(&self) -> bool {
        self.name.is_none()
            && self.category.is_none()
            && self.status.is_none()
            && self.stock.is_unbounded()
            && self.sales.is_unbounded()
    }

    /// Whether the full result set must be fetched and filtered locally.
    ///
    /// True as soon as any criterion is present. With no criteria the
    /// server's own pagination is used as-is.
    #[must_use]
    pub const fn requires_full_scan(&self) -> bool {
        !self.is_empty()
    }

    /// Server query parameters for these criteria.
    ///
    /// The status filter is never sent; the server has no notion of it.
    #[must_use]
    pub fn server_query(&self) -> ServerQuery {
        ServerQuery {
            name: self.name.clone(),
            category: self.category.clone(),
            stock_gt: self.stock.gt(),
            stock_lt: self.stock.lt(),
            sales_min: self.sales.min,
            sales_max: self.sales.max,
            product_name: None,
        }
    }

    /// Whether a record satisfies every present criterion.
    #[must_use]
    pub fn matches(&self, record: &InventoryRecord) -> bool {
        if let Some(needle) = &self.name_lower
            && !record.name.to_lowercase().contains(needle.as_str())
        {
            return false;
        }

        if let Some(category) = &self.category
            && record.category != *category
        {
            return false;
        }

        if let Some(status) = self.status
            && record.status() != status
        {
            return false;
        }

        self.stock.contains(record.stock) && self.sales.contains(record.sales)
    }

    /// Keep only the records that match.
    #[must_use]
    pub fn apply(&self, mut records: Vec<InventoryRecord>) -> Vec<InventoryRecord> {
        records.retain(|record| self.matches(record));
        records
    }
}
