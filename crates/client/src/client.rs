//! Inventory REST API client.
//!
//! Thin typed wrapper over the ERP's REST endpoints. Every method issues a
//! single request; paging over full result sets lives in [`crate::pages`].

use std::sync::Arc;

use reqwest::{Method, StatusCode, header};
use secrecy::{ExposeSecret, SecretString};
use serde::{Deserialize, de::DeserializeOwned};
use storeroom_core::{InventoryRecord, PaginatedResponse, ServerQuery};
use tracing::instrument;
use url::Url;

use crate::config::ClientConfig;
use crate::error::ApiError;
use crate::pages::VariantSource;

/// Longest response body kept in errors and logs.
const MAX_BODY_IN_ERROR: usize = 500;

/// Client for the inventory REST API.
///
/// Cheap to clone; clones share the underlying connection pool.
///
/// # Authentication
///
/// When a token is configured it is sent as `Authorization: Bearer <token>`
/// on every request.
#[derive(Clone)]
pub struct InventoryApiClient {
    inner: Arc<InventoryApiClientInner>,
}

struct InventoryApiClientInner {
    client: reqwest::Client,
    base_url: Url,
    api_token: Option<SecretString>,
    fetch_page_size: u32,
}

/// DRF-style error body: `{"detail": "..."}`.
#[derive(Debug, Deserialize)]
struct ErrorDetail {
    detail: String,
}

impl InventoryApiClient {
    /// Create a client from configuration.
    ///
    /// # Errors
    ///
    /// Returns `ApiError::Http` if the HTTP client cannot be built.
    pub fn new(config: &ClientConfig) -> Result<Self, ApiError> {
        let client = reqwest::Client::builder().timeout(config.timeout).build()?;

        Ok(Self {
            inner: Arc::new(InventoryApiClientInner {
                client,
                base_url: config.base_url.clone(),
                api_token: config.api_token.clone(),
                fetch_page_size: config.fetch_page_size,
            }),
        })
    }

    /// API base URL.
    #[must_use]
    pub fn base_url(&self) -> &Url {
        &self.inner.base_url
    }

    /// Page size used by the full-scan fetch loop.
    #[must_use]
    pub fn fetch_page_size(&self) -> u32 {
        self.inner.fetch_page_size
    }

    // =========================================================================
    // Request Plumbing
    // =========================================================================

    /// URL for `segments` beneath the base URL, with a trailing slash.
    ///
    /// Each segment is percent-encoded, so codes containing `/` or spaces
    /// stay within their own path segment.
    pub(crate) fn endpoint(&self, segments: &[&str]) -> Result<Url, ApiError> {
        let mut url = self.inner.base_url.clone();
        url.path_segments_mut()
            .map_err(|()| ApiError::InvalidUrl(self.inner.base_url.to_string()))?
            .pop_if_empty()
            .extend(segments)
            .push("");
        Ok(url)
    }

    fn request(&self, method: Method, url: Url) -> reqwest::RequestBuilder {
        let builder = self
            .inner
            .client
            .request(method, url)
            .header(header::ACCEPT, "application/json");

        match &self.inner.api_token {
            Some(token) => builder.bearer_auth(token.expose_secret()),
            None => builder,
        }
    }

    /// Send a request, turning non-success statuses into errors.
    async fn send(&self, request: reqwest::RequestBuilder) -> Result<reqwest::Response, ApiError> {
        let response = request.send().await?;

        if response.status().is_success() {
            Ok(response)
        } else {
            Err(error_for_status(response).await)
        }
    }

    pub(crate) async fn get<T: DeserializeOwned>(&self, url: Url) -> Result<T, ApiError> {
        let response = self.send(self.request(Method::GET, url)).await?;
        decode(response).await
    }

    /// Send `body` as JSON and decode the JSON response.
    pub(crate) async fn send_json<B, T>(&self, method: Method, url: Url, body: &B) -> Result<T, ApiError>
    where
        B: serde::Serialize + ?Sized,
        T: DeserializeOwned,
    {
        let response = self.send(self.request(method, url).json(body)).await?;
        decode(response).await
    }

    /// Send a request whose response body is not needed.
    pub(crate) async fn send_discarding<B>(
        &self,
        method: Method,
        url: Url,
        body: Option<&B>,
    ) -> Result<(), ApiError>
    where
        B: serde::Serialize + ?Sized,
    {
        let mut request = self.request(method, url);
        if let Some(body) = body {
            request = request.json(body);
        }
        self.send(request).await?;
        Ok(())
    }

    /// Post a multipart form whose response body is not needed.
    pub(crate) async fn send_multipart(
        &self,
        url: Url,
        form: reqwest::multipart::Form,
    ) -> Result<(), ApiError> {
        self.send(self.request(Method::POST, url).multipart(form))
            .await?;
        Ok(())
    }

    // =========================================================================
    // Variant List
    // =========================================================================

    /// Fetch one page of `GET inventory/variants/`.
    ///
    /// # Errors
    ///
    /// Returns `ApiError` if the request fails or the body cannot be decoded.
    #[instrument(skip(self, query), fields(query = %query.cache_key()))]
    pub async fn list_variants(
        &self,
        query: &ServerQuery,
        page: u32,
        page_size: u32,
    ) -> Result<PaginatedResponse<InventoryRecord>, ApiError> {
        let mut url = self.endpoint(&["inventory", "variants"])?;
        {
            let mut pairs = url.query_pairs_mut();
            for (key, value) in query.to_pairs() {
                pairs.append_pair(key, &value);
            }
            pairs
                .append_pair("page", &page.to_string())
                .append_pair("page_size", &page_size.to_string());
        }

        self.get(url).await
    }
}

impl VariantSource for InventoryApiClient {
    async fn fetch_page(
        &self,
        query: &ServerQuery,
        page: u32,
        page_size: u32,
    ) -> Result<PaginatedResponse<InventoryRecord>, ApiError> {
        self.list_variants(query, page, page_size).await
    }
}

// =============================================================================
// Response Handling
// =============================================================================

async fn decode<T: DeserializeOwned>(response: reqwest::Response) -> Result<T, ApiError> {
    let body = response.text().await?;

    serde_json::from_str(&body).map_err(|e| {
        tracing::error!(
            error = %e,
            body = %truncate(&body),
            "Failed to parse inventory API response"
        );
        ApiError::Parse(e)
    })
}

async fn error_for_status(response: reqwest::Response) -> ApiError {
    let status = response.status();

    // Check for rate limiting
    if status == StatusCode::TOO_MANY_REQUESTS {
        let retry_after = response
            .headers()
            .get(header::RETRY_AFTER)
            .and_then(|v| v.to_str().ok())
            .and_then(|s| s.parse().ok())
            .unwrap_or(60);
        return ApiError::RateLimited(retry_after);
    }

    if status == StatusCode::NOT_FOUND {
        return ApiError::NotFound(response.url().path().to_string());
    }

    let body = match response.text().await {
        Ok(body) => body,
        Err(e) => return ApiError::Http(e),
    };

    if status == StatusCode::UNAUTHORIZED || status == StatusCode::FORBIDDEN {
        let message = serde_json::from_str::<ErrorDetail>(&body)
            .map_or_else(|_| format!("HTTP {status}"), |detail| detail.detail);
        return ApiError::Unauthorized(message);
    }

    tracing::warn!(
        status = %status,
        body = %truncate(&body),
        "Inventory API returned non-success status"
    );
    ApiError::Status {
        status,
        body: truncate(&body),
    }
}

fn truncate(body: &str) -> String {
    body.chars().take(MAX_BODY_IN_ERROR).collect()
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    fn client(base_url: &str) -> InventoryApiClient {
        InventoryApiClient::new(&ClientConfig::new(base_url).unwrap()).unwrap()
    }

    #[test]
    fn test_endpoint_under_base_path() {
        let client = client("https://erp.example.com/api");
        let url = client.endpoint(&["inventory", "variants"]).unwrap();
        assert_eq!(url.as_str(), "https://erp.example.com/api/inventory/variants/");
    }

    #[test]
    fn test_endpoint_encodes_codes() {
        let client = client("http://localhost:8000/");
        let url = client.endpoint(&["inventory", "variants", "TS 01/RED"]).unwrap();
        assert_eq!(
            url.as_str(),
            "http://localhost:8000/inventory/variants/TS%2001%2FRED/"
        );
    }

    #[test]
    fn test_fetch_page_size_from_config() {
        let mut config = ClientConfig::new("http://localhost:8000/").unwrap();
        config.fetch_page_size = 25;
        let client = InventoryApiClient::new(&config).unwrap();
        assert_eq!(client.fetch_page_size(), 25);
        assert_eq!(client.base_url().as_str(), "http://localhost:8000/");
    }

    #[test]
    fn test_truncate_long_body() {
        let body = "x".repeat(2_000);
        assert_eq!(truncate(&body).len(), MAX_BODY_IN_ERROR);
    }
}
