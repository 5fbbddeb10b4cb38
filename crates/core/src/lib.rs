//! # StacScout Core
//!
//! Browsing logic for STAC satellite-imagery catalogs, free of any I/O.
//!
//! This crate provides:
//! - Serde models for the catalog's search, collection and geocoder documents
//! - `CollectionRegistry`: stable per-collection display colors
//! - `SearchForm`: validation of form input into a search request
//! - `ResultAccumulator`: results accumulated across pagination
//! - `filter`: cloud-cover and time-window filtering
//! - `DayHistogram` and `MapSync`: timeline and map overlay view models
//! - `SearchSession`: the session-state owner tying it all together

pub mod accumulator;
pub mod detail;
pub mod error;
pub mod filter;
pub mod geocode;
pub mod histogram;
pub mod item;
pub mod map_sync;
pub mod models;
pub mod query;
pub mod registry;
pub mod session;

pub use accumulator::{PageResult, PaginationCursor, ResultAccumulator};
pub use detail::ItemDetail;
pub use error::{Error, Result, ValidationError};
pub use filter::{FilterState, TimeWindow};
pub use geocode::GeocodeResult;
pub use histogram::{DayBucket, DayHistogram};
pub use item::{Asset, Item};
pub use map_sync::{MapSync, OverlayLayer, SyncReport};
pub use models::{SearchRequest, SortDirection, StacItemCollection, StacLink};
pub use query::SearchForm;
pub use registry::{CollectionDescriptor, CollectionRegistry};
pub use session::{Outcome, Phase, RequestKind, SearchSession, Ticket};

/// Prelude for convenient imports
pub mod prelude {
    pub use crate::error::{Error, Result, ValidationError};
    pub use crate::item::Item;
    pub use crate::query::SearchForm;
    pub use crate::session::{Outcome, Phase, SearchSession};
}
