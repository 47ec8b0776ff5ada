//! Inventory query coordinator.
//!
//! Chooses between the server's own pagination and a full scan:
//!
//! - With no filter criteria and no sort, one server page is requested at
//!   the table's page size and its metadata is passed through.
//! - Otherwise every matching record is fetched (see [`crate::pages`]),
//!   filtered and sorted locally, and paged with
//!   [`storeroom_core::paginate`].
//!
//! List responses can be cached for a short window; any mutation issued
//! through the coordinator clears the cache.

use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Duration;

use moka::future::Cache;
use serde::Serialize;
use storeroom_core::{
    FilterCriteria, ITEMS_PER_PAGE, InventoryRecord, MergeRequest, NewVariant, PageMeta,
    ProductOption, ServerQuery, Sort, StockAdjustmentRequest, VariantCode, VariantDetail,
    VariantUpdate, paginate, unique_products,
};
use tracing::{debug, info, instrument};

use crate::cache::{CacheKey, CacheValue};
use crate::client::InventoryApiClient;
use crate::error::ApiError;
use crate::pages::{VariantSource, collect_all};

const CACHE_CAPACITY: u64 = 256;

/// One page of inventory as shown in the table.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct InventoryView {
    pub data: Vec<InventoryRecord>,
    pub pagination: PageMeta,
}

impl InventoryView {
    /// An empty page at `page`, beyond the last page of `count` items.
    #[must_use]
    pub fn past_end(count: u64, page: u32) -> Self {
        Self {
            data: Vec::new(),
            pagination: PageMeta {
                count,
                next: None,
                previous: (page > 1).then(|| page - 1),
            },
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Freshness {
    Cached,
    Fresh,
}

/// Runs inventory queries against a [`VariantSource`].
#[derive(Clone)]
pub struct InventoryQuery<S> {
    source: S,
    fetch_page_size: u32,
    cache: Option<Cache<CacheKey, CacheValue>>,
    /// Bumped by every invalidation. Responses fetched under an older
    /// generation are returned to their caller but never cached.
    generation: Arc<AtomicU64>,
}

impl<S: VariantSource> InventoryQuery<S> {
    /// Coordinator over `source`, fetching full scans `fetch_page_size` rows
    /// at a time. Caching is off until [`Self::with_cache_ttl`] is called.
    #[must_use]
    pub fn new(source: S, fetch_page_size: u32) -> Self {
        Self {
            source,
            fetch_page_size: fetch_page_size.max(1),
            cache: None,
            generation: Arc::new(AtomicU64::new(0)),
        }
    }

    /// Cache list responses for `ttl`. A zero `ttl` disables caching.
    #[must_use]
    pub fn with_cache_ttl(mut self, ttl: Duration) -> Self {
        self.cache = (!ttl.is_zero()).then(|| {
            Cache::builder()
                .max_capacity(CACHE_CAPACITY)
                .time_to_live(ttl)
                .build()
        });
        self
    }

    pub const fn source(&self) -> &S {
        &self.source
    }

    /// One table page of inventory matching `criteria`.
    ///
    /// `page` is 1-based. Pages past the end come back empty with the total
    /// count still set.
    ///
    /// # Errors
    ///
    /// Returns the first `ApiError` from the server. No partial data is
    /// returned.
    #[instrument(skip(self, criteria), fields(full_scan = criteria.requires_full_scan()))]
    pub async fn run(
        &self,
        criteria: &FilterCriteria,
        page: u32,
        sort: Option<Sort>,
    ) -> Result<InventoryView, ApiError> {
        self.execute(criteria, page, sort, Freshness::Cached).await
    }

    /// Same as [`Self::run`], but always goes to the server and refreshes the
    /// cache.
    ///
    /// # Errors
    ///
    /// Returns the first `ApiError` from the server.
    #[instrument(skip(self, criteria))]
    pub async fn refetch(
        &self,
        criteria: &FilterCriteria,
        page: u32,
        sort: Option<Sort>,
    ) -> Result<InventoryView, ApiError> {
        self.execute(criteria, page, sort, Freshness::Fresh).await
    }

    /// Every record matching `criteria`, sorted, without pagination.
    ///
    /// # Errors
    ///
    /// Returns the first `ApiError` from the server.
    #[instrument(skip(self, criteria))]
    pub async fn export(
        &self,
        criteria: &FilterCriteria,
        sort: Option<Sort>,
    ) -> Result<Vec<InventoryRecord>, ApiError> {
        let records = self.filtered(criteria, sort, Freshness::Cached).await?;
        info!(records = records.len(), "Exporting inventory");
        Ok(records)
    }

    /// Products whose name matches `product_name`, one option per product.
    ///
    /// A blank search term returns no options without contacting the server.
    ///
    /// # Errors
    ///
    /// Returns the first `ApiError` from the server.
    #[instrument(skip(self))]
    pub async fn search_products(&self, product_name: &str) -> Result<Vec<ProductOption>, ApiError> {
        let product_name = product_name.trim();
        if product_name.is_empty() {
            return Ok(Vec::new());
        }

        let query = ServerQuery::product_search(product_name);
        let records = self.full_scan(&query, Freshness::Cached).await?;
        Ok(unique_products(&records))
    }

    /// Drop every cached response, including any still being fetched.
    pub async fn invalidate(&self) {
        self.generation.fetch_add(1, Ordering::SeqCst);
        if let Some(cache) = &self.cache {
            cache.invalidate_all();
            cache.run_pending_tasks().await;
            debug!("Inventory cache invalidated");
        }
    }

    // =========================================================================
    // Internals
    // =========================================================================

    async fn execute(
        &self,
        criteria: &FilterCriteria,
        page: u32,
        sort: Option<Sort>,
        freshness: Freshness,
    ) -> Result<InventoryView, ApiError> {
        if criteria.requires_full_scan() || sort.is_some() {
            let records = self.filtered(criteria, sort, freshness).await?;
            let page = paginate(&records, page, ITEMS_PER_PAGE);
            Ok(InventoryView {
                data: page.items,
                pagination: page.meta,
            })
        } else {
            self.native_page(&criteria.server_query(), page, freshness)
                .await
        }
    }

    async fn filtered(
        &self,
        criteria: &FilterCriteria,
        sort: Option<Sort>,
        freshness: Freshness,
    ) -> Result<Vec<InventoryRecord>, ApiError> {
        let records = self.full_scan(&criteria.server_query(), freshness).await?;

        let mut records: Vec<InventoryRecord> = records
            .iter()
            .filter(|record| criteria.matches(record))
            .cloned()
            .collect();
        if let Some(sort) = sort {
            sort.apply(&mut records);
        }

        debug!(matched = records.len(), "Filtered inventory");
        Ok(records)
    }

    async fn full_scan(
        &self,
        query: &ServerQuery,
        freshness: Freshness,
    ) -> Result<Arc<Vec<InventoryRecord>>, ApiError> {
        let key = CacheKey::FullScan(query.clone());

        if freshness == Freshness::Cached
            && let Some(CacheValue::Records(records)) = self.cached(&key).await
        {
            debug!(query = %query.cache_key(), "Full scan served from cache");
            return Ok(records);
        }

        let generation = self.generation();
        let records = Arc::new(collect_all(&self.source, query, self.fetch_page_size).await?);
        self.store(generation, key, CacheValue::Records(Arc::clone(&records)))
            .await;
        Ok(records)
    }

    async fn native_page(
        &self,
        query: &ServerQuery,
        page: u32,
        freshness: Freshness,
    ) -> Result<InventoryView, ApiError> {
        if page == 0 {
            return self.past_end(query, page).await;
        }

        let page_size = u32::try_from(ITEMS_PER_PAGE).unwrap_or(u32::MAX);
        let key = CacheKey::Page {
            query: query.clone(),
            page,
            page_size,
        };

        let response = if freshness == Freshness::Cached
            && let Some(CacheValue::Page(response)) = self.cached(&key).await
        {
            response
        } else {
            let generation = self.generation();
            match self.source.fetch_page(query, page, page_size).await {
                Ok(response) => {
                    let response = Arc::new(response);
                    self.store(generation, key, CacheValue::Page(Arc::clone(&response)))
                        .await;
                    response
                }
                Err(e) if e.is_not_found() && page > 1 => {
                    return self.past_end(query, page).await;
                }
                Err(e) => return Err(e),
            }
        };

        Ok(InventoryView {
            data: response.results.clone(),
            pagination: PageMeta {
                count: response.count,
                next: response.next_page(page),
                previous: response.previous_page(),
            },
        })
    }

    /// Empty view for a page the server does not have, with the real count.
    async fn past_end(&self, query: &ServerQuery, page: u32) -> Result<InventoryView, ApiError> {
        let first = self.source.fetch_page(query, 1, 1).await?;
        debug!(page, count = first.count, "Requested page is past the end");
        Ok(InventoryView::past_end(first.count, page))
    }

    async fn cached(&self, key: &CacheKey) -> Option<CacheValue> {
        match &self.cache {
            Some(cache) => cache.get(key).await,
            None => None,
        }
    }

    fn generation(&self) -> u64 {
        self.generation.load(Ordering::SeqCst)
    }

    /// Cache `value` unless an invalidation happened since `generation` was
    /// read.
    async fn store(&self, generation: u64, key: CacheKey, value: CacheValue) {
        let Some(cache) = &self.cache else {
            return;
        };
        if self.generation() != generation {
            debug!("Discarding response fetched before invalidation");
            return;
        }

        cache.insert(key.clone(), value).await;
        // An invalidation may have landed between the check and the insert.
        if self.generation() != generation {
            cache.invalidate(&key).await;
        }
    }
}

// =============================================================================
// Mutations
// =============================================================================

impl InventoryQuery<InventoryApiClient> {
    /// Coordinator configured from the client's settings.
    #[must_use]
    pub fn for_client(client: InventoryApiClient, cache_ttl: Duration) -> Self {
        let fetch_page_size = client.fetch_page_size();
        Self::new(client, fetch_page_size).with_cache_ttl(cache_ttl)
    }

    /// Create a variant under an existing product, then clear cached lists.
    ///
    /// # Errors
    ///
    /// Returns `ApiError` if the server rejects the variant.
    pub async fn create_variant(&self, variant: &NewVariant) -> Result<VariantDetail, ApiError> {
        let detail = self.source.create_variant(variant).await?;
        self.invalidate().await;
        Ok(detail)
    }

    /// Create a product with its first variant, then clear cached lists.
    ///
    /// # Errors
    ///
    /// Returns `ApiError` if the server rejects the product.
    pub async fn create_product(&self, variant: &NewVariant) -> Result<VariantDetail, ApiError> {
        let detail = self.source.create_product(variant).await?;
        self.invalidate().await;
        Ok(detail)
    }

    /// Upload a POS sales export, then clear cached lists.
    ///
    /// # Errors
    ///
    /// Returns `ApiError` if the upload fails.
    pub async fn upload_inventory(&self, file_name: &str, contents: Vec<u8>) -> Result<(), ApiError> {
        self.source.upload_inventory(file_name, contents).await?;
        self.invalidate().await;
        Ok(())
    }

    /// Update a variant, then clear cached lists.
    ///
    /// # Errors
    ///
    /// Returns `ApiError` if the update fails.
    pub async fn update_variant(
        &self,
        code: &VariantCode,
        update: &VariantUpdate,
    ) -> Result<VariantDetail, ApiError> {
        let detail = self.source.update_variant(code, update).await?;
        self.invalidate().await;
        Ok(detail)
    }

    /// Delete a variant, then clear cached lists.
    ///
    /// # Errors
    ///
    /// Returns `ApiError` if the delete fails.
    pub async fn delete_variant(&self, code: &VariantCode) -> Result<(), ApiError> {
        self.source.delete_variant(code).await?;
        self.invalidate().await;
        Ok(())
    }

    /// Merge variants, then clear cached lists.
    ///
    /// # Errors
    ///
    /// Returns `ApiError` if the merge fails.
    pub async fn merge_variants(&self, request: &MergeRequest) -> Result<(), ApiError> {
        self.source.merge_variants(request).await?;
        self.invalidate().await;
        Ok(())
    }

    /// Record a stock count, then clear cached lists.
    ///
    /// # Errors
    ///
    /// Returns `ApiError` if the adjustment fails.
    pub async fn adjust_stock(
        &self,
        code: &VariantCode,
        request: &StockAdjustmentRequest,
    ) -> Result<(), ApiError> {
        self.source.adjust_stock(code, request).await?;
        self.invalidate().await;
        Ok(())
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use std::sync::Mutex;
    use std::sync::atomic::AtomicBool;

    use storeroom_core::{SortKey, StockStatus};
    use tokio::sync::Notify;

    use super::*;
    use crate::pages::tests::{FakeSource, records};

    fn coordinator(n: usize) -> InventoryQuery<FakeSource> {
        InventoryQuery::new(FakeSource::new(records(n)), 10)
    }

    fn codes(view: &InventoryView) -> Vec<&str> {
        view.data.iter().map(|r| r.variant_code.as_str()).collect()
    }

    #[tokio::test]
    async fn test_no_criteria_uses_server_pagination() {
        let query = coordinator(25);
        let view = query.run(&FilterCriteria::default(), 1, None).await.unwrap();

        assert_eq!(query.source().calls(), 1);
        assert_eq!(view.data.len(), 10);
        assert_eq!(view.pagination.count, 25);
        assert_eq!(view.pagination.next, Some(2));
        assert_eq!(view.pagination.previous, None);

        let seen = query.source().queries.lock().unwrap();
        assert_eq!(seen[0], (ServerQuery::default(), 1, 10));
    }

    #[tokio::test]
    async fn test_status_filter_scans_everything_and_never_sends_status() {
        let query = coordinator(25);
        let criteria = FilterCriteria::default().with_status(Some(StockStatus::LowStock));
        let view = query.run(&criteria, 1, None).await.unwrap();

        // Stock 1..=4 is below the minimum of 5; stock 0 is sold out.
        assert_eq!(codes(&view), vec!["V001", "V002", "V003", "V004"]);
        assert_eq!(view.pagination.count, 4);
        assert_eq!(view.pagination.next, None);

        assert_eq!(query.source().calls(), 3);
        let seen = query.source().queries.lock().unwrap();
        assert!(seen.iter().all(|(q, _, _)| *q == ServerQuery::default()));
    }

    #[tokio::test]
    async fn test_stock_range_filtered_locally_and_paged() {
        let query = coordinator(25);
        let criteria = FilterCriteria::default().with_stock_range(Some(5), Some(20));
        let view = query.run(&criteria, 2, None).await.unwrap();

        // Stock 5..=20 is 16 records; page 2 holds the last 6.
        assert_eq!(view.pagination.count, 16);
        assert_eq!(view.data.len(), 6);
        assert_eq!(view.data[0].stock, 15);
        assert_eq!(view.pagination.previous, Some(1));
        assert_eq!(view.pagination.next, None);

        let seen = query.source().queries.lock().unwrap();
        assert_eq!(seen[0].0.stock_gt, Some(4));
        assert_eq!(seen[0].0.stock_lt, Some(21));
    }

    #[tokio::test]
    async fn test_sort_forces_full_scan() {
        let query = coordinator(25);
        let sort = Some(Sort::descending(SortKey::Stock));
        let view = query.run(&FilterCriteria::default(), 1, sort).await.unwrap();

        assert_eq!(query.source().calls(), 3);
        assert_eq!(view.data[0].variant_code.as_str(), "V024");
        assert_eq!(view.pagination.count, 25);
    }

    #[tokio::test]
    async fn test_native_page_past_end_is_empty() {
        let query = coordinator(25);
        let view = query.run(&FilterCriteria::default(), 4, None).await.unwrap();

        assert!(view.data.is_empty());
        assert_eq!(view.pagination.count, 25);
        assert_eq!(view.pagination.previous, Some(3));
        assert_eq!(view.pagination.next, None);
    }

    #[tokio::test]
    async fn test_filtered_page_past_end_is_empty() {
        let query = coordinator(25);
        let criteria = FilterCriteria::default().with_name("item");
        let view = query.run(&criteria, 9, None).await.unwrap();
        assert!(view.data.is_empty());
        assert_eq!(view.pagination.count, 25);
    }

    #[tokio::test]
    async fn test_error_propagates() {
        let mut source = FakeSource::new(records(25));
        source.fail_on_page = Some(2);
        let query = InventoryQuery::new(source, 10);
        let criteria = FilterCriteria::default().with_name("item");

        let result = query.run(&criteria, 1, None).await;
        assert!(matches!(result, Err(ApiError::Status { .. })));
    }

    #[tokio::test]
    async fn test_cache_serves_repeat_queries() {
        let query = coordinator(25).with_cache_ttl(Duration::from_secs(60));
        let criteria = FilterCriteria::default().with_name("item");

        query.run(&criteria, 1, None).await.unwrap();
        query.run(&criteria, 2, None).await.unwrap();
        assert_eq!(query.source().calls(), 3);

        query.refetch(&criteria, 1, None).await.unwrap();
        assert_eq!(query.source().calls(), 6);

        query.invalidate().await;
        query.run(&criteria, 1, None).await.unwrap();
        assert_eq!(query.source().calls(), 9);
    }

    #[tokio::test]
    async fn test_zero_ttl_disables_cache() {
        let query = coordinator(5).with_cache_ttl(Duration::ZERO);
        query.run(&FilterCriteria::default(), 1, None).await.unwrap();
        query.run(&FilterCriteria::default(), 1, None).await.unwrap();
        assert_eq!(query.source().calls(), 2);
    }

    #[tokio::test]
    async fn test_export_returns_everything_filtered() {
        let query = coordinator(25);
        let criteria = FilterCriteria::default().with_status(Some(StockStatus::Normal));
        let all = query
            .export(&criteria, Some(Sort::ascending(SortKey::Stock)))
            .await
            .unwrap();
        assert_eq!(all.len(), 20);
        assert_eq!(all[0].stock, 5);
    }

    #[tokio::test]
    async fn test_search_products_dedupes() {
        let query = coordinator(9);
        let options = query.search_products("Item").await.unwrap();
        let ids: Vec<&str> = options.iter().map(|o| o.product_id.as_str()).collect();
        assert_eq!(ids, vec!["P00", "P01", "P02"]);
        assert_eq!(options[0].name, "Item 0");

        let seen = query.source().queries.lock().unwrap();
        assert_eq!(seen[0].0.product_name.as_deref(), Some("Item"));
    }

    #[tokio::test]
    async fn test_blank_product_search_skips_request() {
        let query = coordinator(9);
        assert!(query.search_products("   ").await.unwrap().is_empty());
        assert_eq!(query.source().calls(), 0);
    }

    /// One-record source whose first fetch reads the stock, then waits
    /// until released.
    struct GatedSource {
        stock: Mutex<i64>,
        hold_first: AtomicBool,
        entered: Notify,
        release: Notify,
    }

    impl GatedSource {
        fn new(stock: i64) -> Self {
            Self {
                stock: Mutex::new(stock),
                hold_first: AtomicBool::new(true),
                entered: Notify::new(),
                release: Notify::new(),
            }
        }
    }

    impl VariantSource for GatedSource {
        async fn fetch_page(
            &self,
            _query: &ServerQuery,
            _page: u32,
            _page_size: u32,
        ) -> Result<storeroom_core::PaginatedResponse<InventoryRecord>, ApiError> {
            let mut record = InventoryRecord::new("V001", "P01");
            record.name = "Item 1".to_string();
            record.stock = *self.stock.lock().unwrap();

            if self.hold_first.swap(false, Ordering::SeqCst) {
                self.entered.notify_one();
                self.release.notified().await;
            }

            Ok(storeroom_core::PaginatedResponse {
                count: 1,
                next: None,
                previous: None,
                results: vec![record],
            })
        }
    }

    /// Run `criteria` while the stock changes and the cache is invalidated
    /// mid-fetch, then return the stock seen by the following query.
    async fn stock_after_invalidation_during_fetch(criteria: &FilterCriteria) -> i64 {
        let query = InventoryQuery::new(GatedSource::new(5), 10)
            .with_cache_ttl(Duration::from_secs(60));

        let in_flight = query.run(criteria, 1, None);
        let mutation = async {
            query.source().entered.notified().await;
            *query.source().stock.lock().unwrap() = 99;
            query.invalidate().await;
            query.source().release.notify_one();
        };
        let (stale, ()) = tokio::join!(in_flight, mutation);
        assert_eq!(stale.unwrap().data[0].stock, 5);

        let fresh = query.run(criteria, 1, None).await.unwrap();
        fresh.data[0].stock
    }

    #[tokio::test]
    async fn test_full_scan_in_flight_during_invalidate_is_not_cached() {
        let criteria = FilterCriteria::default().with_name("item");
        assert_eq!(stock_after_invalidation_during_fetch(&criteria).await, 99);
    }

    #[tokio::test]
    async fn test_native_page_in_flight_during_invalidate_is_not_cached() {
        let criteria = FilterCriteria::default();
        assert_eq!(stock_after_invalidation_during_fetch(&criteria).await, 99);
    }

    #[tokio::test]
    async fn test_fetch_after_invalidate_is_cached_again() {
        let query = coordinator(5).with_cache_ttl(Duration::from_secs(60));
        query.invalidate().await;

        query.run(&FilterCriteria::default(), 1, None).await.unwrap();
        query.run(&FilterCriteria::default(), 1, None).await.unwrap();
        assert_eq!(query.source().calls(), 1);
    }

    #[test]
    fn test_past_end_view() {
        let view = InventoryView::past_end(7, 1);
        assert!(view.data.is_empty());
        assert_eq!(view.pagination.previous, None);
        assert_eq!(view.pagination.count, 7);
    }
}
