//! Integration tests for the Storeroom inventory client.
//!
//! Every test runs the real [`InventoryApiClient`] against a `wiremock`
//! server that mimics the ERP's paginated REST API.
//!
//! # Running Tests
//!
//! ```bash
//! cargo test -p storeroom-integration-tests
//! ```
//!
//! # Test Categories
//!
//! - `fetch_loop` - Following `next` links across pages
//! - `inventory_query` - Filtering, pagination and caching end to end
//! - `api_errors` - Status code to `ApiError` mapping
//! - `variants` - Mutations, merge precheck and stock history

#![cfg_attr(not(test), forbid(unsafe_code))]
#![allow(clippy::missing_panics_doc)]

use serde_json::{Value, json};
use storeroom_client::{ClientConfig, InventoryApiClient};
use wiremock::MockServer;

/// Path prefix the mock API is mounted under.
pub const API_PREFIX: &str = "/api";

/// Path of the variant list endpoint on the mock server.
pub const VARIANTS_PATH: &str = "/api/inventory/variants/";

/// A mock ERP server plus helpers to point a client at it.
pub struct TestApi {
    pub server: MockServer,
}

impl TestApi {
    pub async fn start() -> Self {
        Self {
            server: MockServer::start().await,
        }
    }

    /// Base URL of the mock API, ending in `/`.
    #[must_use]
    pub fn base_url(&self) -> String {
        format!("{}{API_PREFIX}/", self.server.uri())
    }

    /// Client configuration with no cache and the given fetch page size.
    #[must_use]
    pub fn config(&self, fetch_page_size: u32) -> ClientConfig {
        let mut config = ClientConfig::new(&self.base_url())
            .unwrap_or_else(|e| panic!("mock server URL rejected: {e}"));
        config.fetch_page_size = fetch_page_size;
        config
    }

    #[must_use]
    pub fn client(&self, fetch_page_size: u32) -> InventoryApiClient {
        InventoryApiClient::new(&self.config(fetch_page_size))
            .unwrap_or_else(|e| panic!("failed to build client: {e}"))
    }

    /// Absolute URL of a list page, as DRF would put in `next`/`previous`.
    #[must_use]
    pub fn list_page_url(&self, page: u32) -> String {
        format!("{}{VARIANTS_PATH}?page={page}", self.server.uri())
    }

    /// Query pairs of every list request received so far, in order.
    pub async fn list_requests(&self) -> Vec<Vec<(String, String)>> {
        self.server
            .received_requests()
            .await
            .unwrap_or_default()
            .into_iter()
            .filter(|request| request.url.path() == VARIANTS_PATH)
            .map(|request| request.url.query_pairs().into_owned().collect())
            .collect()
    }
}

/// Look up `key` in a request's query pairs.
#[must_use]
pub fn param<'a>(pairs: &'a [(String, String)], key: &str) -> Option<&'a str> {
    pairs
        .iter()
        .find(|(k, _)| k == key)
        .map(|(_, v)| v.as_str())
}

// =============================================================================
// Payload Builders
// =============================================================================

/// A list row as the variant list endpoint returns it.
///
/// Sales are sent as a string, the way the API serializes decimals.
#[must_use]
pub fn record_json(code: &str, product: &str, name: &str, stock: i64, min_stock: i64) -> Value {
    json!({
        "variant_code": code,
        "product_id": product,
        "name": name,
        "category": "Apparel",
        "option": "Free",
        "price": "19.90",
        "cost_price": "8.00",
        "stock": stock,
        "min_stock": min_stock,
        "sales": format!("{}.00", stock * 10),
        "order_count": 1,
        "return_count": 0,
        "description": "",
        "memo": "",
        "suppliers": "",
    })
}

/// `count` rows `V000`, `V001`, ... with stock equal to their index.
#[must_use]
pub fn records(count: i64) -> Vec<Value> {
    (0..count)
        .map(|i| {
            record_json(
                &format!("V{i:03}"),
                &format!("P{}", i / 3),
                &format!("Item {i}"),
                i,
                5,
            )
        })
        .collect()
}

/// A paginated list envelope.
#[must_use]
pub fn page_json(
    count: usize,
    next: Option<String>,
    previous: Option<String>,
    results: &[Value],
) -> Value {
    json!({
        "count": count,
        "next": next,
        "previous": previous,
        "results": results,
    })
}

/// A variant detail body with the given supplier names.
#[must_use]
pub fn detail_json(code: &str, suppliers: &[&str]) -> Value {
    let links: Vec<Value> = suppliers
        .iter()
        .enumerate()
        .map(|(i, name)| {
            json!({
                "name": name,
                "cost_price": "1200.00",
                "is_primary": i == 0,
            })
        })
        .collect();

    json!({
        "variant_code": code,
        "product_id": "P1",
        "name": "Linen shirt",
        "option": "Red / M",
        "price": "29900",
        "stock": "12",
        "min_stock": 5,
        "description": "",
        "memo": "",
        "suppliers": links,
    })
}
