//! Derived stock status.
//!
//! The server never stores a status for a variant. It is recomputed from
//! `stock` and `min_stock` every time a record is displayed or filtered, and
//! both paths go through [`StockStatus::derive`] so the two can never disagree.

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Stock level label for a variant.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StockStatus {
    /// Stock is at or above the reorder threshold.
    Normal,
    /// Some stock left, but below `min_stock`.
    LowStock,
    /// Nothing left.
    SoldOut,
}

/// Error returned when a status label is not recognized.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
#[error("invalid stock status: {0} (expected normal, low stock, sold out or all)")]
pub struct StockStatusError(pub String);

impl StockStatus {
    /// Labels accepted as "no status filter".
    pub const ALL_LABELS: &'static [&'static str] = &["all", "all statuses", "any"];

    /// Compute the status for a stock level and reorder threshold.
    ///
    /// `stock == 0` is sold out, `stock < min_stock` is low stock, and
    /// everything else is normal. Negative stock is not special-cased: it is
    /// low stock below a positive threshold and normal otherwise.
    #[must_use]
    pub const fn derive(stock: i64, min_stock: i64) -> Self {
        if stock == 0 {
            Self::SoldOut
        } else if stock < min_stock {
            Self::LowStock
        } else {
            Self::Normal
        }
    }

    /// Human-readable label.
    #[must_use]
    pub const fn label(self) -> &'static str {
        match self {
            Self::Normal => "normal",
            Self::LowStock => "low stock",
            Self::SoldOut => "sold out",
        }
    }

    /// Parse a status filter value from a form or command line.
    ///
    /// Returns `Ok(None)` for the "all statuses" sentinel (and the empty
    /// string), meaning the status predicate is skipped.
    ///
    /// # Errors
    ///
    /// Returns [`StockStatusError`] for unrecognized labels.
    pub fn parse_filter(value: &str) -> Result<Option<Self>, StockStatusError> {
        let normalized = value.trim().to_lowercase();
        if normalized.is_empty() || Self::ALL_LABELS.contains(&normalized.as_str()) {
            return Ok(None);
        }
        normalized.parse().map(Some)
    }
}

impl std::fmt::Display for StockStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.pad(self.label())
    }
}

impl std::str::FromStr for StockStatus {
    type Err = StockStatusError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().replace(['_', '-'], " ").as_str() {
            "normal" => Ok(Self::Normal),
            "low stock" | "low" => Ok(Self::LowStock),
            "sold out" | "soldout" => Ok(Self::SoldOut),
            _ => Err(StockStatusError(s.to_owned())),
        }
    }
}
