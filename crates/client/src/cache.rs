//! Cache types for inventory list responses.

use std::sync::Arc;

use storeroom_core::{InventoryRecord, PaginatedResponse, ServerQuery};

/// Cache key: the server query plus, for native pages, the page requested.
#[derive(Debug, Clone, Hash, PartialEq, Eq)]
pub enum CacheKey {
    /// Every record matching the query.
    FullScan(ServerQuery),
    /// One server page.
    Page {
        query: ServerQuery,
        page: u32,
        page_size: u32,
    },
}

/// Cached value types.
#[derive(Debug, Clone)]
pub enum CacheValue {
    Records(Arc<Vec<InventoryRecord>>),
    Page(Arc<PaginatedResponse<InventoryRecord>>),
}
