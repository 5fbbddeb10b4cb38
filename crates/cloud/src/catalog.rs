//! Catalog endpoint selection and client options.

use std::time::Duration;

/// EOPF Sentinel catalog root.
pub const EOPF_ROOT: &str = "https://stac.core.eopf.eodc.eu";

/// STAC Browser deployment matching the EOPF catalog.
pub const EOPF_BROWSER_BASE: &str = "https://stac.browser.user.eopf.eodc.eu/collections";

/// OpenStreetMap Nominatim search endpoint.
pub const NOMINATIM_URL: &str = "https://nominatim.openstreetmap.org/search";

/// Catalog to browse.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Catalog {
    /// The EOPF Sentinel Zarr catalog.
    Eopf,
    /// Any STAC API root (e.g. `"https://my-stac.example.com/api/v1"`).
    Custom(String),
}

impl Default for Catalog {
    fn default() -> Self {
        Self::Eopf
    }
}

impl Catalog {
    /// Parse a shorthand (`"eopf"`) or treat the input as an API root URL.
    pub fn from_str_or_url(s: &str) -> Self {
        match s.to_lowercase().as_str() {
            "eopf" | "eodc" | "default" => Self::Eopf,
            _ => Self::Custom(s.to_string()),
        }
    }

    fn root(&self) -> &str {
        match self {
            Self::Eopf => EOPF_ROOT,
            Self::Custom(url) => {
                let url = url.trim_end_matches('/');
                url.strip_suffix("/search").unwrap_or(url)
            }
        }
    }

    /// Full `POST /search` URL.
    pub fn search_url(&self) -> String {
        format!("{}/search", self.root())
    }

    /// Full `GET /collections` URL.
    pub fn collections_url(&self) -> String {
        format!("{}/collections", self.root())
    }

    /// Base for item detail links: the STAC Browser for the EOPF catalog,
    /// the API's own collections endpoint otherwise.
    pub fn browser_base(&self) -> String {
        match self {
            Self::Eopf => EOPF_BROWSER_BASE.to_string(),
            Self::Custom(_) => self.collections_url(),
        }
    }
}

/// Configuration for [`CatalogClient`](crate::client::CatalogClient) and
/// [`Geocoder`](crate::geocoder::Geocoder).
#[derive(Debug, Clone)]
pub struct ClientOptions {
    /// Per-request timeout (default 30 s).
    pub request_timeout: Duration,
    /// Maximum retries on transient failures (default 3).
    pub max_retries: u32,
    /// `User-Agent` header; Nominatim rejects anonymous clients.
    pub user_agent: String,
}

impl Default for ClientOptions {
    fn default() -> Self {
        Self {
            request_timeout: Duration::from_secs(30),
            max_retries: 3,
            user_agent: concat!("stacscout/", env!("CARGO_PKG_VERSION")).to_string(),
        }
    }
}
