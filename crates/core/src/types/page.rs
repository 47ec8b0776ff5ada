//! Server pagination envelope.

use serde::{Deserialize, Serialize};
use url::Url;

/// Paginated list response: `{count, next, previous, results}`.
///
/// `next` and `previous` are absolute URLs to the neighbouring pages, or
/// `null` at either end.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PaginatedResponse<T> {
    /// Total number of matching items on the server.
    pub count: u64,
    /// URL of the following page.
    pub next: Option<String>,
    /// URL of the preceding page.
    pub previous: Option<String>,
    /// Items on this page.
    #[serde(default = "Vec::new")]
    pub results: Vec<T>,
}

impl<T> PaginatedResponse<T> {
    /// Page number of the following page.
    ///
    /// Read from the `page` query parameter of `next`. A `next` URL without
    /// one (or that cannot be parsed) is taken to mean `current + 1`.
    #[must_use]
    pub fn next_page(&self, current: u32) -> Option<u32> {
        self.next
            .as_deref()
            .map(|url| page_param(url).unwrap_or_else(|| current.saturating_add(1)))
    }

    /// Page number of the preceding page.
    ///
    /// DRF omits `page=1` from the first page's URL, so a `previous` URL
    /// without a `page` parameter means page 1.
    #[must_use]
    pub fn previous_page(&self) -> Option<u32> {
        self.previous
            .as_deref()
            .map(|url| page_param(url).unwrap_or(1))
    }
}

/// Extract the `page` query parameter from an absolute URL.
///
/// Values are percent-decoded. `None` if the URL does not parse or carries
/// no numeric `page`.
fn page_param(url: &str) -> Option<u32> {
    let url = Url::parse(url).ok()?;
    url.query_pairs()
        .find(|(key, _)| key == "page")
        .and_then(|(_, value)| value.parse().ok())
}
