//! Place-name lookup against a Nominatim-compatible geocoder.

use tracing::debug;

use stacscout_core::geocode::{first_hit, GeocodeResult};
use stacscout_core::models::GeocodeHit;

use crate::catalog::{ClientOptions, NOMINATIM_URL};
use crate::error::{CloudError, Result};

/// Async geocoder client.
pub struct Geocoder {
    url: String,
    client: reqwest::Client,
}

impl Geocoder {
    /// Geocoder for the public Nominatim instance.
    pub fn nominatim(options: &ClientOptions) -> Result<Self> {
        Self::new(NOMINATIM_URL, options)
    }

    pub fn new(url: impl Into<String>, options: &ClientOptions) -> Result<Self> {
        let client = reqwest::Client::builder()
            .timeout(options.request_timeout)
            .user_agent(options.user_agent.clone())
            .build()
            .map_err(|e| CloudError::Network(format!("failed to build HTTP client: {e}")))?;
        Ok(Self {
            url: url.into(),
            client,
        })
    }

    /// Look up `query` and return the best match's bounding box.
    ///
    /// No match is reported as [`stacscout_core::Error::GeocodeNotFound`].
    pub async fn locate(&self, query: &str) -> Result<GeocodeResult> {
        debug!(query, "geocoding");
        let resp = self
            .client
            .get(&self.url)
            .query(&[("format", "json"), ("q", query), ("limit", "1")])
            .send()
            .await?;

        if !resp.status().is_success() {
            return Err(CloudError::Network(format!(
                "geocoder returned HTTP {}",
                resp.status()
            )));
        }

        let hits: Vec<GeocodeHit> = resp
            .json()
            .await
            .map_err(|e| CloudError::Network(format!("parsing geocoder response: {e}")))?;
        Ok(first_hit(query, hits)?)
    }
}
