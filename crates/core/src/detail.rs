//! Detail view model for a single selected item.

use serde::Serialize;

use crate::item::Item;
use crate::registry::CollectionRegistry;

/// Property keys surfaced in the metadata grid, in display order.
pub const HIGHLIGHT_KEYS: [&str; 6] = [
    "platform",
    "processing:level",
    "eo:cloud_cover",
    "gsd",
    "instruments",
    "s1:orbit_source",
];

/// Number of assets listed in the quick-download section.
pub const MAX_LISTED_ASSETS: usize = 5;

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct MetadataEntry {
    pub label: String,
    pub value: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct AssetLink {
    pub key: String,
    pub href: String,
    pub media_type: String,
}

/// Everything the detail panel shows for one item.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ItemDetail {
    pub id: String,
    pub collection_id: String,
    pub collection_color: &'static str,
    /// RFC 3339, UTC.
    pub datetime: String,
    pub browser_url: String,
    pub metadata: Vec<MetadataEntry>,
    pub assets: Vec<AssetLink>,
}

impl ItemDetail {
    pub fn from_item(item: &Item, registry: &CollectionRegistry, browser_base: &str) -> Self {
        let metadata = HIGHLIGHT_KEYS
            .iter()
            .filter_map(|key| {
                let value = item.properties.get(*key)?;
                if value.is_null() {
                    return None;
                }
                Some(MetadataEntry {
                    label: label_for(key),
                    value: format_value(value),
                })
            })
            .collect();

        let assets = item
            .assets
            .iter()
            .take(MAX_LISTED_ASSETS)
            .map(|(key, asset)| AssetLink {
                key: key.clone(),
                href: asset.href.clone(),
                media_type: asset
                    .media_type
                    .clone()
                    .unwrap_or_else(|| "unknown".to_string()),
            })
            .collect();

        Self {
            id: item.id.clone(),
            collection_id: item.collection_id.clone(),
            collection_color: registry.color_for(&item.collection_id),
            datetime: item
                .datetime()
                .map(|dt| dt.format("%Y-%m-%dT%H:%M:%SZ").to_string())
                .unwrap_or_default(),
            browser_url: browser_url(browser_base, &item.collection_id, &item.id),
            metadata,
            assets,
        }
    }
}

/// `<base>/<collection>/items/<item>`.
pub fn browser_url(base: &str, collection_id: &str, item_id: &str) -> String {
    format!(
        "{}/{}/items/{}",
        base.trim_end_matches('/'),
        collection_id,
        item_id
    )
}

/// `"s1:orbit_source"` → `"ORBIT SOURCE"`.
fn label_for(key: &str) -> String {
    let last = key.rsplit(':').next().unwrap_or(key);
    last.to_uppercase().replacen('_', " ", 1)
}

fn format_value(value: &serde_json::Value) -> String {
    match value {
        serde_json::Value::Number(n) => n
            .as_f64()
            .map(|f| format!("{f:.2}"))
            .unwrap_or_else(|| n.to_string()),
        serde_json::Value::String(s) => s.clone(),
        serde_json::Value::Array(values) => values
            .iter()
            .map(format_value)
            .collect::<Vec<_>>()
            .join(", "),
        other => other.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::item::Asset;
    use crate::models::CollectionEntry;
    use std::collections::BTreeMap;

    fn fixture() -> Item {
        let mut assets = BTreeMap::new();
        for key in ["a", "b", "c", "d", "e", "f"] {
            assets.insert(
                key.to_string(),
                Asset {
                    href: format!("https://data/{key}"),
                    media_type: if key == "a" { None } else { Some("application/vnd+zarr".into()) },
                    title: None,
                    roles: vec![],
                },
            );
        }
        let properties = serde_json::json!({
            "datetime": "2024-05-01T09:30:00Z",
            "platform": "sentinel-1a",
            "eo:cloud_cover": 7,
            "instruments": ["c-sar"],
            "s1:orbit_source": "RESORB",
            "unrelated": 1
        });
        Item {
            id: "S1A_IW_GRDH_1SDV".into(),
            collection_id: "sentinel-1-l1-grd".into(),
            timestamp_millis: 1_714_555_800_000,
            cloud_cover_percent: Some(7.0),
            platform: Some("sentinel-1a".into()),
            geometry: serde_json::Value::Null,
            assets,
            properties: properties.as_object().unwrap().clone(),
        }
    }

    #[test]
    fn browser_link_is_collection_scoped() {
        let reg = CollectionRegistry::new();
        let d = ItemDetail::from_item(
            &fixture(),
            &reg,
            "https://stac.browser.user.eopf.eodc.eu/collections/",
        );
        assert_eq!(
            d.browser_url,
            "https://stac.browser.user.eopf.eodc.eu/collections/sentinel-1-l1-grd/items/S1A_IW_GRDH_1SDV"
        );
        assert_eq!(d.datetime, "2024-05-01T09:30:00Z");
    }

    #[test]
    fn metadata_uses_highlight_keys_in_order() {
        let reg = CollectionRegistry::new();
        let d = ItemDetail::from_item(&fixture(), &reg, "https://b");
        let labels: Vec<_> = d.metadata.iter().map(|m| m.label.as_str()).collect();
        assert_eq!(labels, ["PLATFORM", "CLOUD COVER", "INSTRUMENTS", "ORBIT SOURCE"]);
        assert_eq!(d.metadata[1].value, "7.00");
        assert_eq!(d.metadata[2].value, "c-sar");
    }

    #[test]
    fn assets_capped_and_typed() {
        let mut reg = CollectionRegistry::new();
        reg.load(vec![CollectionEntry {
            id: "sentinel-1-l1-grd".into(),
            title: None,
        }]);
        let d = ItemDetail::from_item(&fixture(), &reg, "https://b");
        assert_eq!(d.assets.len(), MAX_LISTED_ASSETS);
        assert_eq!(d.assets[0].media_type, "unknown");
        assert_eq!(d.assets[1].key, "b");
        assert_eq!(d.collection_color, crate::registry::PALETTE[0]);
    }

    #[test]
    fn label_formatting() {
        assert_eq!(label_for("processing:level"), "LEVEL");
        assert_eq!(label_for("gsd"), "GSD");
        assert_eq!(label_for("eo:cloud_cover"), "CLOUD COVER");
    }
}
