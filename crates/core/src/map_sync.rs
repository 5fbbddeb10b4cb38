//! Map overlay state: one colored layer per collection in the visible subset.

use std::collections::BTreeMap;

use serde::Serialize;

use crate::item::Item;
use crate::registry::CollectionRegistry;

/// Identifier of an overlay layer, stable for the layer's lifetime.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
pub struct LayerId(pub u64);

/// An item footprint drawn on a layer.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Shape {
    pub item_id: String,
    pub geometry: serde_json::Value,
}

/// Footprints of one collection, drawn in that collection's color.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct OverlayLayer {
    pub id: LayerId,
    pub collection_id: String,
    pub color: &'static str,
    pub shapes: Vec<Shape>,
}

/// What a [`MapSync::sync`] call changed, by collection id.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct SyncReport {
    pub added: Vec<String>,
    pub removed: Vec<String>,
    pub redrawn: Vec<String>,
}

/// Overlay layer table kept consistent with the visible subset.
#[derive(Debug, Default)]
pub struct MapSync {
    layers: BTreeMap<String, OverlayLayer>,
    next_id: u64,
}

impl MapSync {
    pub fn new() -> Self {
        Self::default()
    }

    /// Bring the layer table in line with `visible`.
    ///
    /// Layers of collections still present keep their identity and only
    /// get their shapes and color redrawn.
    pub fn sync(&mut self, visible: &[Item], registry: &CollectionRegistry) -> SyncReport {
        let mut grouped: BTreeMap<&str, Vec<Shape>> = BTreeMap::new();
        for item in visible {
            grouped
                .entry(item.collection_id.as_str())
                .or_default()
                .push(Shape {
                    item_id: item.id.clone(),
                    geometry: item.geometry.clone(),
                });
        }

        let mut report = SyncReport::default();

        let stale: Vec<String> = self
            .layers
            .keys()
            .filter(|k| !grouped.contains_key(k.as_str()))
            .cloned()
            .collect();
        for key in stale {
            self.layers.remove(&key);
            report.removed.push(key);
        }

        for (collection_id, shapes) in grouped {
            match self.layers.get_mut(collection_id) {
                Some(layer) => {
                    layer.color = registry.color_for(collection_id);
                    layer.shapes.clear();
                    layer.shapes.extend(shapes);
                    report.redrawn.push(collection_id.to_string());
                }
                None => {
                    let id = LayerId(self.next_id);
                    self.next_id += 1;
                    self.layers.insert(
                        collection_id.to_string(),
                        OverlayLayer {
                            id,
                            collection_id: collection_id.to_string(),
                            color: registry.color_for(collection_id),
                            shapes,
                        },
                    );
                    report.added.push(collection_id.to_string());
                }
            }
        }

        report
    }

    /// Resolve a clicked shape to the item id it represents.
    pub fn select_shape(&self, item_id: &str) -> Option<&str> {
        self.layers
            .values()
            .flat_map(|l| l.shapes.iter())
            .find(|s| s.item_id == item_id)
            .map(|s| s.item_id.as_str())
    }

    pub fn layer(&self, collection_id: &str) -> Option<&OverlayLayer> {
        self.layers.get(collection_id)
    }

    /// Layers ordered by collection id.
    pub fn layers(&self) -> impl Iterator<Item = &OverlayLayer> {
        self.layers.values()
    }

    pub fn len(&self) -> usize {
        self.layers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.layers.is_empty()
    }

    pub fn clear(&mut self) {
        self.layers.clear();
    }

    /// Union extent `[west, south, east, north]` of every drawn shape.
    pub fn bounds(&self) -> Option<[f64; 4]> {
        let mut acc: Option<[f64; 4]> = None;
        for shape in self.layers.values().flat_map(|l| l.shapes.iter()) {
            if let Some(coords) = shape.geometry.get("coordinates") {
                extend_bounds(coords, &mut acc);
            }
        }
        acc
    }
}

fn extend_bounds(value: &serde_json::Value, acc: &mut Option<[f64; 4]>) {
    let Some(arr) = value.as_array() else {
        return;
    };
    match (arr.first().and_then(|v| v.as_f64()), arr.get(1).and_then(|v| v.as_f64())) {
        (Some(x), Some(y)) => {
            let b = acc.get_or_insert([x, y, x, y]);
            b[0] = b[0].min(x);
            b[1] = b[1].min(y);
            b[2] = b[2].max(x);
            b[3] = b[3].max(y);
        }
        _ => {
            for child in arr {
                extend_bounds(child, acc);
            }
        }
    }
}
