//! # StacScout Cloud
//!
//! Network collaborators for STAC catalog browsing: the catalog's Item
//! Search and collection listing, a Nominatim-style geocoder, and a
//! [`SessionController`] that feeds their responses into a
//! [`stacscout_core::SearchSession`].
//!
//! ## Features
//!
//! - `native` (default): blocking API via a Tokio `block_on` wrapper

pub mod catalog;
pub mod client;
pub mod controller;
pub mod error;
pub mod geocoder;

pub mod sync_api;

pub use catalog::{Catalog, ClientOptions};
pub use client::CatalogClient;
pub use controller::SessionController;
pub use error::{CloudError, Result};
pub use geocoder::Geocoder;

/// Blocking API re-exported as `blocking` module (native only).
#[cfg(feature = "native")]
pub mod blocking {
    pub use crate::sync_api::*;
}
