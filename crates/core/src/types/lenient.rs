//! Lenient numeric decoding for API fields.
//!
//! The inventory API is inconsistent about numbers: `sales` and `cost_price`
//! arrive as strings, `stock` usually as a number but occasionally as a
//! string, and any of them may be `null`. Fields decoded with these helpers
//! accept all three shapes and fall back to zero when a string does not
//! parse. A malformed value never fails the whole response.
//!
//! ```
//! use rust_decimal::Decimal;
//! use storeroom_core::types::lenient::coerce_decimal;
//!
//! assert_eq!(coerce_decimal("1500"), Decimal::from(1500));
//! assert_eq!(coerce_decimal("2,000"), Decimal::ZERO);
//! ```

use std::str::FromStr;

use rust_decimal::Decimal;
use rust_decimal::prelude::ToPrimitive;
use serde::{Deserialize, Deserializer};

/// Any JSON value a numeric field may carry.
#[derive(Deserialize)]
#[serde(untagged)]
enum RawNumber {
    Number(serde_json::Number),
    Text(String),
    Other(serde_json::Value),
}

/// Parse a string the way a browser's `Number()` would, returning zero for
/// anything that is not a number.
///
/// Whitespace is trimmed, an empty string is zero, and scientific notation
/// is accepted. Thousands separators are not.
#[must_use]
pub fn coerce_decimal(raw: &str) -> Decimal {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        return Decimal::ZERO;
    }
    Decimal::from_str(trimmed)
        .or_else(|_| Decimal::from_scientific(trimmed))
        .unwrap_or(Decimal::ZERO)
}

/// Integer variant of [`coerce_decimal`]. Fractions are truncated.
#[must_use]
pub fn coerce_count(raw: &str) -> i64 {
    coerce_decimal(raw).trunc().to_i64().unwrap_or(0)
}

fn number_to_decimal(number: &serde_json::Number) -> Decimal {
    coerce_decimal(&number.to_string())
}

/// Deserialize a decimal from a number, a numeric string, or null.
///
/// # Errors
///
/// Never fails on malformed values; only propagates deserializer errors
/// for input that is not valid JSON at all.
pub fn decimal<'de, D>(deserializer: D) -> Result<Decimal, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(match RawNumber::deserialize(deserializer)? {
        RawNumber::Number(number) => number_to_decimal(&number),
        RawNumber::Text(text) => coerce_decimal(&text),
        RawNumber::Other(_) => Decimal::ZERO,
    })
}

/// Deserialize an integer count from a number, a numeric string, or null.
///
/// # Errors
///
/// Never fails on malformed values; only propagates deserializer errors
/// for input that is not valid JSON at all.
pub fn count<'de, D>(deserializer: D) -> Result<i64, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(match RawNumber::deserialize(deserializer)? {
        RawNumber::Number(number) => number
            .as_i64()
            .unwrap_or_else(|| number_to_decimal(&number).trunc().to_i64().unwrap_or(0)),
        RawNumber::Text(text) => coerce_count(&text),
        RawNumber::Other(_) => 0,
    })
}
