//! Collection registry with stable per-collection display colors.

use std::collections::HashMap;

use serde::Serialize;

use crate::models::CollectionEntry;

/// Distinct colors handed out to collections in ascending id order.
pub const PALETTE: [&str; 11] = [
    "#2563eb", // blue
    "#7c3aed", // violet
    "#db2777", // pink
    "#16a34a", // green
    "#0d9488", // teal
    "#ca8a04", // gold
    "#ea580c", // orange
    "#dc2626", // red
    "#9333ea", // purple
    "#0891b2", // cyan
    "#be123c", // rose
];

/// Color for collections the registry has never seen.
pub const NEUTRAL_COLOR: &str = "#64748b";

/// A catalog collection as shown in the picker.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CollectionDescriptor {
    pub id: String,
    pub title: String,
    pub color: &'static str,
}

/// Session-wide id → color table.
///
/// Colors are assigned on first sight and never change afterwards; the
/// table is not cleared by a new search.
#[derive(Debug, Default)]
pub struct CollectionRegistry {
    colors: HashMap<String, &'static str>,
    assigned: usize,
    collections: Vec<CollectionDescriptor>,
}

impl CollectionRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a catalog listing and return it sorted by id, with colors.
    pub fn load(&mut self, entries: Vec<CollectionEntry>) -> Vec<CollectionDescriptor> {
        let mut entries = entries;
        entries.sort_by(|a, b| a.id.cmp(&b.id));

        let descriptors: Vec<CollectionDescriptor> = entries
            .into_iter()
            .map(|entry| {
                let color = self.assign(&entry.id);
                let title = match entry.title {
                    Some(t) if !t.is_empty() => t,
                    _ => entry.id.clone(),
                };
                CollectionDescriptor {
                    id: entry.id,
                    title,
                    color,
                }
            })
            .collect();

        self.collections = descriptors.clone();
        descriptors
    }

    fn assign(&mut self, id: &str) -> &'static str {
        if let Some(color) = self.colors.get(id) {
            return color;
        }
        let color = PALETTE[self.assigned % PALETTE.len()];
        self.assigned += 1;
        self.colors.insert(id.to_string(), color);
        color
    }

    /// Assigned color, or [`NEUTRAL_COLOR`] for unknown ids.
    pub fn color_for(&self, id: &str) -> &'static str {
        self.colors.get(id).copied().unwrap_or(NEUTRAL_COLOR)
    }

    /// The most recently loaded listing.
    pub fn collections(&self) -> &[CollectionDescriptor] {
        &self.collections
    }

    pub fn get(&self, id: &str) -> Option<&CollectionDescriptor> {
        self.collections.iter().find(|c| c.id == id)
    }

    pub fn is_empty(&self) -> bool {
        self.colors.is_empty()
    }
}
