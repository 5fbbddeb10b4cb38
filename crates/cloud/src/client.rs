//! Async client for STAC Item Search and collection listing.

use std::time::Duration;

use serde::de::DeserializeOwned;
use tracing::debug;

use stacscout_core::models::{
    CollectionEntry, CollectionList, SearchRequest, StacItemCollection, StacLink,
};

use crate::catalog::{Catalog, ClientOptions};
use crate::error::{CloudError, Result};

/// Async client for one STAC API.
pub struct CatalogClient {
    catalog: Catalog,
    client: reqwest::Client,
    options: ClientOptions,
}

impl CatalogClient {
    /// Create a new catalog client.
    pub fn new(catalog: Catalog, options: ClientOptions) -> Result<Self> {
        let client = reqwest::Client::builder()
            .timeout(options.request_timeout)
            .user_agent(options.user_agent.clone())
            .build()
            .map_err(|e| CloudError::Network(format!("failed to build HTTP client: {e}")))?;

        Ok(Self {
            catalog,
            client,
            options,
        })
    }

    pub fn catalog(&self) -> &Catalog {
        &self.catalog
    }

    // ── Collections ─────────────────────────────────────────────────

    /// Fetch the catalog's collection listing.
    pub async fn collections(&self) -> Result<Vec<CollectionEntry>> {
        let url = self.catalog.collections_url();
        let list: CollectionList = self
            .send_with_retry("collection listing", || self.client.get(&url))
            .await?;
        Ok(list.collections)
    }

    // ── Search ──────────────────────────────────────────────────────

    /// Execute a fresh search and return the first page.
    pub async fn search(&self, request: &SearchRequest) -> Result<StacItemCollection> {
        let url = self.catalog.search_url();
        self.post_search(&url, request).await
    }

    /// Follow a `"next"` link. Handles both GET links and POST links with
    /// a replacement or merged body.
    pub async fn follow_next(
        &self,
        link: &StacLink,
        original: &SearchRequest,
    ) -> Result<StacItemCollection> {
        if !link.is_post() {
            return self
                .send_with_retry("pagination", || self.client.get(&link.href))
                .await;
        }

        let body = if link.merge.unwrap_or(false) {
            let mut base = serde_json::to_value(original)
                .map_err(|e| CloudError::Network(format!("serializing params: {e}")))?;
            if let (Some(base_obj), Some(link_obj)) = (
                base.as_object_mut(),
                link.body.as_ref().and_then(|b| b.as_object()),
            ) {
                for (k, v) in link_obj {
                    base_obj.insert(k.clone(), v.clone());
                }
            }
            base
        } else if let Some(ref link_body) = link.body {
            link_body.clone()
        } else {
            serde_json::to_value(original)
                .map_err(|e| CloudError::Network(format!("serializing params: {e}")))?
        };

        self.send_with_retry("pagination", || self.client.post(&link.href).json(&body))
            .await
    }

    // ── Private helpers ─────────────────────────────────────────────

    async fn post_search(&self, url: &str, request: &SearchRequest) -> Result<StacItemCollection> {
        debug!(
            url,
            collections = ?request.collections,
            datetime = %request.datetime,
            "POST search"
        );
        self.send_with_retry("STAC search", || self.client.post(url).json(request))
            .await
    }

    /// Send a request built by `make`, retrying transport errors and 5xx
    /// responses with exponential backoff (500 ms, 1 s, 2 s, ...).
    async fn send_with_retry<T, F>(&self, what: &str, make: F) -> Result<T>
    where
        T: DeserializeOwned,
        F: Fn() -> reqwest::RequestBuilder,
    {
        let mut last_err = None;

        for attempt in 0..=self.options.max_retries {
            if attempt > 0 {
                let delay = Duration::from_millis(500 * (1 << (attempt - 1)));
                debug!(attempt, ?delay, "retrying {what}");
                tokio::time::sleep(delay).await;
            }

            match make().send().await {
                Ok(r) if r.status().is_success() => {
                    let body = r
                        .text()
                        .await
                        .map_err(|e| CloudError::Network(format!("reading {what} body: {e}")))?;
                    return serde_json::from_str(&body)
                        .map_err(|e| CloudError::Network(format!("parsing {what} response: {e}")));
                }
                Ok(r) => {
                    let status = r.status();
                    let body = r.text().await.unwrap_or_default();
                    last_err = Some(CloudError::Network(format!(
                        "{what} returned HTTP {}: {}",
                        status,
                        body.chars().take(500).collect::<String>()
                    )));
                    // Don't retry client errors (4xx)
                    if status.is_client_error() {
                        break;
                    }
                }
                Err(e) => {
                    last_err = Some(CloudError::Network(format!("{what} request failed: {e}")));
                }
            }
        }

        Err(last_err.unwrap_or_else(|| CloudError::Network(format!("{what} failed"))))
    }
}
