//! Append-only store of items fetched within one search session.

use crate::item::{items_from_features, Item};
use crate::models::{StacItemCollection, StacLink};

/// Continuation reference returned alongside a page; `None` when exhausted.
pub type PaginationCursor = Option<StacLink>;

/// One decoded page of search results.
#[derive(Debug, Clone, Default)]
pub struct PageResult {
    pub items: Vec<Item>,
    pub next: PaginationCursor,
    /// Total matches, when the catalog reports it.
    pub matched: Option<u64>,
}

impl From<StacItemCollection> for PageResult {
    fn from(col: StacItemCollection) -> Self {
        let next = col.next_link().cloned();
        let matched = col.matched();
        Self {
            items: items_from_features(col.features),
            next,
            matched,
        }
    }
}

/// Items accumulated across a fresh search and its continuations.
#[derive(Debug, Default)]
pub struct ResultAccumulator {
    items: Vec<Item>,
}

impl ResultAccumulator {
    pub fn new() -> Self {
        Self::default()
    }

    /// Fresh search: drop everything and keep only `page`.
    pub fn replace(&mut self, page: PageResult) -> PaginationCursor {
        self.items = page.items;
        page.next
    }

    /// Continuation: extend with `page` in arrival order.
    ///
    /// Duplicate ids are kept; the catalog does not repeat items across
    /// pages of one search.
    pub fn append(&mut self, page: PageResult) -> PaginationCursor {
        self.items.extend(page.items);
        page.next
    }

    pub fn items(&self) -> &[Item] {
        &self.items
    }

    pub fn find(&self, id: &str) -> Option<&Item> {
        self.items.iter().find(|i| i.id == id)
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    pub fn clear(&mut self) {
        self.items.clear();
    }
}
