//! STAC (SpatioTemporal Asset Catalog) wire types.
//!
//! Serde models for the three documents the browser exchanges with its
//! collaborators: the Item Search request/response (`POST /search`), the
//! collection listing (`GET /collections`) and the geocoder lookup.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

// ---------------------------------------------------------------------------
// Search request
// ---------------------------------------------------------------------------

/// Property every search is sorted by.
pub const SORT_FIELD: &str = "properties.datetime";

/// Sort direction for the item timestamp.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SortDirection {
    Asc,
    #[default]
    Desc,
}

impl SortDirection {
    /// Parse `"asc"` / `"desc"` (case-insensitive).
    pub fn parse(s: &str) -> Option<Self> {
        match s.to_ascii_lowercase().as_str() {
            "asc" | "ascending" => Some(Self::Asc),
            "desc" | "descending" => Some(Self::Desc),
            _ => None,
        }
    }
}

/// One entry of the `sortby` array.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SortBy {
    pub field: String,
    pub direction: SortDirection,
}

/// Body for `POST /search` (STAC API – Item Search).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SearchRequest {
    pub collections: Vec<String>,

    /// `[west, south, east, north]`.
    pub bbox: [f64; 4],

    /// Combined interval `start/end`.
    pub datetime: String,

    pub limit: u32,

    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub sortby: Vec<SortBy>,

    /// Pagination token, set only when a POST `next` link merges one in.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub token: Option<String>,
}

// ---------------------------------------------------------------------------
// Search response
// ---------------------------------------------------------------------------

/// A STAC Item Collection (GeoJSON FeatureCollection).
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct StacItemCollection {
    #[serde(rename = "type", default = "feature_collection")]
    pub type_: String,

    pub features: Vec<StacItem>,

    #[serde(default)]
    pub links: Vec<StacLink>,

    #[serde(rename = "numberMatched", skip_serializing_if = "Option::is_none")]
    pub number_matched: Option<u64>,

    /// Older catalogs report counts in `context` instead of `numberMatched`.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub context: Option<serde_json::Value>,
}

fn feature_collection() -> String {
    "FeatureCollection".to_string()
}

impl StacItemCollection {
    /// Find the `"next"` pagination link, if any.
    pub fn next_link(&self) -> Option<&StacLink> {
        self.links.iter().find(|l| l.rel == "next")
    }

    /// Total matches reported by the catalog, from either convention.
    pub fn matched(&self) -> Option<u64> {
        self.number_matched.or_else(|| {
            self.context
                .as_ref()
                .and_then(|c| c.get("matched"))
                .and_then(|v| v.as_u64())
        })
    }
}

/// A single STAC Item (GeoJSON Feature).
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct StacItem {
    pub id: String,

    /// Geometry as raw GeoJSON.
    #[serde(default)]
    pub geometry: Option<serde_json::Value>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub bbox: Option<Vec<f64>>,

    pub properties: StacItemProperties,

    #[serde(default)]
    pub assets: BTreeMap<String, StacAsset>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub collection: Option<String>,
}

/// STAC Item properties.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct StacItemProperties {
    /// ISO 8601 datetime. `null` for items that only carry a range.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub datetime: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub start_datetime: Option<String>,

    /// Cloud cover percentage (EO extension).
    #[serde(rename = "eo:cloud_cover", default, skip_serializing_if = "Option::is_none")]
    pub eo_cloud_cover: Option<f64>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub platform: Option<String>,

    /// All other properties we don't model explicitly.
    #[serde(flatten)]
    pub extra: serde_json::Map<String, serde_json::Value>,
}

/// A single STAC Asset (file reference).
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct StacAsset {
    pub href: String,

    #[serde(rename = "type", default, skip_serializing_if = "Option::is_none")]
    pub type_: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub roles: Option<Vec<String>>,
}

/// A STAC Link (used for pagination and related resources).
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
pub struct StacLink {
    /// Relationship: `"self"`, `"root"`, `"next"`, `"prev"`, etc.
    pub rel: String,

    pub href: String,

    /// HTTP method for the link (default GET, but `"next"` often uses POST).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub method: Option<String>,

    /// Request body for POST-based pagination.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub body: Option<serde_json::Value>,

    /// If true, merge `body` into the previous request body.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub merge: Option<bool>,
}

impl StacLink {
    /// Whether following this link needs a POST.
    pub fn is_post(&self) -> bool {
        self.method
            .as_deref()
            .map(|m| m.eq_ignore_ascii_case("POST"))
            .unwrap_or(false)
    }
}

// ---------------------------------------------------------------------------
// Collection listing
// ---------------------------------------------------------------------------

/// Body of `GET /collections`.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct CollectionList {
    #[serde(default)]
    pub collections: Vec<CollectionEntry>,
}

/// One collection as listed by the catalog.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct CollectionEntry {
    pub id: String,

    #[serde(default)]
    pub title: Option<String>,
}

// ---------------------------------------------------------------------------
// Geocoder
// ---------------------------------------------------------------------------

/// One hit of a Nominatim-style `?format=json` search.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct GeocodeHit {
    /// `[south, north, west, east]`, as strings.
    pub boundingbox: Vec<String>,

    pub display_name: String,
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
