//! Domain item type, normalized from the catalog's GeoJSON features.

use std::collections::BTreeMap;

use chrono::{DateTime, Utc};
use serde::Serialize;
use tracing::warn;

use crate::error::{Error, Result};
use crate::models::{StacAsset, StacItem};

/// A downloadable file attached to an item.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Asset {
    pub href: String,
    pub media_type: Option<String>,
    pub title: Option<String>,
    pub roles: Vec<String>,
}

impl From<StacAsset> for Asset {
    fn from(a: StacAsset) -> Self {
        Self {
            href: a.href,
            media_type: a.type_,
            title: a.title,
            roles: a.roles.unwrap_or_default(),
        }
    }
}

/// One catalog record. Immutable once fetched.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Item {
    pub id: String,
    /// Empty when the catalog omitted the `collection` field.
    pub collection_id: String,
    pub timestamp_millis: i64,
    pub cloud_cover_percent: Option<f64>,
    pub platform: Option<String>,
    pub geometry: serde_json::Value,
    pub assets: BTreeMap<String, Asset>,
    /// Every property as delivered, for the detail view.
    pub properties: serde_json::Map<String, serde_json::Value>,
}

impl Item {
    /// Acquisition time as a UTC datetime.
    pub fn datetime(&self) -> Option<DateTime<Utc>> {
        DateTime::from_timestamp_millis(self.timestamp_millis)
    }
}

impl TryFrom<StacItem> for Item {
    type Error = Error;

    fn try_from(raw: StacItem) -> Result<Self> {
        let stamp = raw
            .properties
            .datetime
            .as_deref()
            .or(raw.properties.start_datetime.as_deref())
            .ok_or_else(|| Error::InvalidItem {
                id: raw.id.clone(),
                reason: "missing properties.datetime".into(),
            })?;
        let timestamp_millis = parse_timestamp(stamp).ok_or_else(|| Error::InvalidItem {
            id: raw.id.clone(),
            reason: format!("unparseable datetime '{stamp}'"),
        })?;

        let properties = match serde_json::to_value(&raw.properties) {
            Ok(serde_json::Value::Object(map)) => map,
            _ => serde_json::Map::new(),
        };

        Ok(Self {
            collection_id: raw.collection.unwrap_or_default(),
            timestamp_millis,
            cloud_cover_percent: raw.properties.eo_cloud_cover,
            platform: raw.properties.platform,
            geometry: raw.geometry.unwrap_or(serde_json::Value::Null),
            assets: raw
                .assets
                .into_iter()
                .map(|(k, a)| (k, Asset::from(a)))
                .collect(),
            properties,
            id: raw.id,
        })
    }
}

/// Convert a page of raw features, skipping the ones that cannot be placed
/// on the time axis.
pub fn items_from_features(features: Vec<StacItem>) -> Vec<Item> {
    features
        .into_iter()
        .filter_map(|raw| match Item::try_from(raw) {
            Ok(item) => Some(item),
            Err(e) => {
                warn!("skipping feature: {e}");
                None
            }
        })
        .collect()
}

fn parse_timestamp(s: &str) -> Option<i64> {
    DateTime::parse_from_rfc3339(s)
        .ok()
        .map(|dt| dt.with_timezone(&Utc).timestamp_millis())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn raw(json: serde_json::Value) -> StacItem {
        serde_json::from_value(json).unwrap()
    }

    #[test]
    fn converts_core_fields() {
        let item = Item::try_from(raw(serde_json::json!({
            "id": "a",
            "collection": "sentinel-2-l2a",
            "geometry": {"type": "Point", "coordinates": [11.0, 46.0]},
            "properties": {"datetime": "2024-01-02T03:04:05Z", "eo:cloud_cover": 3.5, "gsd": 10},
            "assets": {"thumb": {"href": "https://x/t.png", "type": "image/png", "roles": ["thumbnail"]}}
        })))
        .unwrap();

        assert_eq!(item.collection_id, "sentinel-2-l2a");
        assert_eq!(item.timestamp_millis, 1_704_164_645_000);
        assert_eq!(item.cloud_cover_percent, Some(3.5));
        assert_eq!(item.assets["thumb"].roles, vec!["thumbnail".to_string()]);
        assert_eq!(item.properties["gsd"], 10);
        assert_eq!(item.properties["eo:cloud_cover"], 3.5);
    }

    #[test]
    fn falls_back_to_start_datetime() {
        let item = Item::try_from(raw(serde_json::json!({
            "id": "b",
            "properties": {"datetime": null, "start_datetime": "2024-01-01T00:00:00+01:00"}
        })))
        .unwrap();
        assert_eq!(item.timestamp_millis, 1_704_063_600_000);
        assert_eq!(item.collection_id, "");
    }

    #[test]
    fn features_without_time_are_skipped() {
        let items = items_from_features(vec![
            raw(serde_json::json!({"id": "ok", "properties": {"datetime": "2024-01-01T00:00:00Z"}})),
            raw(serde_json::json!({"id": "bad", "properties": {"datetime": "yesterday"}})),
            raw(serde_json::json!({"id": "none", "properties": {}})),
        ]);
        assert_eq!(items.len(), 1);
        assert_eq!(items[0].id, "ok");
    }
}
