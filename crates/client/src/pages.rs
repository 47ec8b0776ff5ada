//! Paginated fetch loop.
//!
//! The list endpoint filters on the server but paginates before the client
//! can apply the predicates it cannot express (derived stock status), so a
//! filtered view needs every matching record. [`variant_pages`] walks the
//! `next` links one request at a time as a lazy stream; [`collect_all`]
//! folds it into a single list.
//!
//! There is no retry and no partial result: the first failing page ends the
//! stream with its error. Dropping the stream stops further requests.

use std::future::Future;

use async_stream::try_stream;
use futures::{Stream, TryStreamExt};
use storeroom_core::{InventoryRecord, PaginatedResponse, ServerQuery};
use tracing::{debug, warn};

use crate::error::ApiError;

/// Anything that can serve one page of the variant list.
///
/// Implemented by [`crate::InventoryApiClient`]; tests substitute in-memory
/// sources.
pub trait VariantSource: Send + Sync {
    /// Fetch the 1-based `page` of variants matching `query`.
    fn fetch_page(
        &self,
        query: &ServerQuery,
        page: u32,
        page_size: u32,
    ) -> impl Future<Output = Result<PaginatedResponse<InventoryRecord>, ApiError>> + Send;
}

/// Stream every page of `query`, starting at page 1.
///
/// The next page number comes from the `next` URL. The stream ends after
/// the page whose `next` is null, or with a warning if `next` fails to move
/// forward.
pub fn variant_pages<'a, S: VariantSource>(
    source: &'a S,
    query: &'a ServerQuery,
    page_size: u32,
) -> impl Stream<Item = Result<PaginatedResponse<InventoryRecord>, ApiError>> + 'a {
    try_stream! {
        let mut page: u32 = 1;
        loop {
            let response = source.fetch_page(query, page, page_size).await?;
            debug!(
                page,
                rows = response.results.len(),
                count = response.count,
                "Fetched inventory page"
            );

            let next = response.next_page(page);
            yield response;

            match next {
                Some(next) if next > page => page = next,
                Some(next) => {
                    warn!(page, next, "Next page link does not advance, stopping");
                    break;
                }
                None => break,
            }
        }
    }
}

/// Fetch every record matching `query`.
///
/// Logs a warning when the number of records differs from the `count` the
/// first page reported, which happens when the data changes mid-scan. The
/// records are returned either way.
///
/// # Errors
///
/// Returns the first `ApiError` any page produces.
pub async fn collect_all<S: VariantSource>(
    source: &S,
    query: &ServerQuery,
    page_size: u32,
) -> Result<Vec<InventoryRecord>, ApiError> {
    let (expected, records) = variant_pages(source, query, page_size)
        .try_fold(
            (None, Vec::new()),
            |(expected, mut records), page| async move {
                records.extend(page.results);
                Ok((expected.or(Some(page.count)), records))
            },
        )
        .await?;

    if let Some(expected) = expected
        && records.len() as u64 != expected
    {
        warn!(
            expected,
            received = records.len(),
            "Inventory changed during full scan"
        );
    }

    debug!(records = records.len(), "Full scan complete");
    Ok(records)
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
pub(crate) mod tests {
    use std::sync::Mutex;
    use std::sync::atomic::{AtomicUsize, Ordering};

    use reqwest::StatusCode;

    use super::*;

    /// In-memory source serving `records` in pages, with optional failures.
    pub(crate) struct FakeSource {
        pub records: Vec<InventoryRecord>,
        pub fail_on_page: Option<u32>,
        /// Reported `count`, when it should differ from `records.len()`.
        pub reported_count: Option<u64>,
        pub calls: AtomicUsize,
        pub queries: Mutex<Vec<(ServerQuery, u32, u32)>>,
    }

    impl FakeSource {
        pub(crate) fn new(records: Vec<InventoryRecord>) -> Self {
            Self {
                records,
                fail_on_page: None,
                reported_count: None,
                calls: AtomicUsize::new(0),
                queries: Mutex::new(Vec::new()),
            }
        }

        pub(crate) fn calls(&self) -> usize {
            self.calls.load(Ordering::SeqCst)
        }
    }

    impl VariantSource for FakeSource {
        async fn fetch_page(
            &self,
            query: &ServerQuery,
            page: u32,
            page_size: u32,
        ) -> Result<PaginatedResponse<InventoryRecord>, ApiError> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            self.queries
                .lock()
                .unwrap()
                .push((query.clone(), page, page_size));

            if self.fail_on_page == Some(page) {
                return Err(ApiError::Status {
                    status: StatusCode::INTERNAL_SERVER_ERROR,
                    body: "boom".to_string(),
                });
            }

            if page == 0 {
                return Err(ApiError::NotFound("inventory/variants/".to_string()));
            }
            let size = page_size as usize;
            let start = (page as usize - 1) * size;
            if start >= self.records.len() && page > 1 {
                return Err(ApiError::NotFound("inventory/variants/".to_string()));
            }
            let end = (start + size).min(self.records.len());
            let next = (end < self.records.len())
                .then(|| format!("http://erp.test/inventory/variants/?page={}", page + 1));

            Ok(PaginatedResponse {
                count: self
                    .reported_count
                    .unwrap_or(self.records.len() as u64),
                next,
                previous: None,
                results: self.records[start..end].to_vec(),
            })
        }
    }

    pub(crate) fn records(n: usize) -> Vec<InventoryRecord> {
        (0..n)
            .map(|i| {
                let mut record = InventoryRecord::new(format!("V{i:03}"), format!("P{:02}", i / 3));
                record.name = format!("Item {i}");
                record.stock = i64::try_from(i).unwrap();
                record.min_stock = 5;
                record
            })
            .collect()
    }

    #[tokio::test]
    async fn test_collects_every_page() {
        let source = FakeSource::new(records(250));
        let all = collect_all(&source, &ServerQuery::default(), 100).await.unwrap();
        assert_eq!(all.len(), 250);
        assert_eq!(all, source.records);
        assert_eq!(source.calls(), 3);
    }

    #[tokio::test]
    async fn test_empty_first_page_is_one_request() {
        let source = FakeSource::new(Vec::new());
        let all = collect_all(&source, &ServerQuery::default(), 100).await.unwrap();
        assert!(all.is_empty());
        assert_eq!(source.calls(), 1);
    }

    #[tokio::test]
    async fn test_failure_aborts_without_partial_result() {
        let mut source = FakeSource::new(records(250));
        source.fail_on_page = Some(2);
        let result = collect_all(&source, &ServerQuery::default(), 100).await;
        assert!(matches!(result, Err(ApiError::Status { .. })));
        assert_eq!(source.calls(), 2);
    }

    #[tokio::test]
    async fn test_count_mismatch_still_returns_data() {
        let mut source = FakeSource::new(records(30));
        source.reported_count = Some(31);
        let all = collect_all(&source, &ServerQuery::default(), 10).await.unwrap();
        assert_eq!(all.len(), 30);
    }

    #[tokio::test]
    async fn test_query_and_page_size_forwarded() {
        let source = FakeSource::new(records(15));
        let query = ServerQuery {
            name: Some("Item".to_string()),
            ..ServerQuery::default()
        };
        collect_all(&source, &query, 10).await.unwrap();

        let seen = source.queries.lock().unwrap();
        assert_eq!(seen.len(), 2);
        assert_eq!(seen[0], (query.clone(), 1, 10));
        assert_eq!(seen[1], (query, 2, 10));
    }

    struct StuckSource;

    impl VariantSource for StuckSource {
        async fn fetch_page(
            &self,
            _query: &ServerQuery,
            _page: u32,
            _page_size: u32,
        ) -> Result<PaginatedResponse<InventoryRecord>, ApiError> {
            Ok(PaginatedResponse {
                count: 2,
                next: Some("http://erp.test/inventory/variants/?page=1".to_string()),
                previous: None,
                results: records(1),
            })
        }
    }

    #[tokio::test]
    async fn test_non_advancing_next_stops() {
        let all = collect_all(&StuckSource, &ServerQuery::default(), 1).await.unwrap();
        assert_eq!(all.len(), 1);
    }

    #[tokio::test]
    async fn test_stream_is_lazy() {
        let source = FakeSource::new(records(50));
        let query = ServerQuery::default();
        let mut pages = std::pin::pin!(variant_pages(&source, &query, 10));
        let first = pages.try_next().await.unwrap().unwrap();
        assert_eq!(first.results.len(), 10);
        assert_eq!(source.calls(), 1);
    }
}
