//! Blocking (synchronous) API for native platforms.
//!
//! Wraps the async [`SessionController`] with a Tokio runtime so callers
//! don't need to manage their own async runtime.

#[cfg(feature = "native")]
mod inner {
    use stacscout_core::error::Result;
    use stacscout_core::geocode::GeocodeResult;
    use stacscout_core::query::SearchForm;
    use stacscout_core::registry::CollectionDescriptor;
    use stacscout_core::session::{Outcome, SearchSession};

    use crate::catalog::{Catalog, ClientOptions};
    use crate::controller::SessionController;
    use crate::error::CloudError;

    /// Blocking wrapper around [`SessionController`].
    ///
    /// Uses an internal single-threaded Tokio runtime.
    pub struct SessionControllerBlocking {
        rt: tokio::runtime::Runtime,
        inner: SessionController,
    }

    impl SessionControllerBlocking {
        pub fn new(catalog: Catalog, options: ClientOptions) -> crate::Result<Self> {
            let rt = tokio::runtime::Builder::new_current_thread()
                .enable_all()
                .build()
                .map_err(|e| CloudError::Network(e.to_string()))?;
            let inner = SessionController::new(catalog, options)?;
            Ok(Self { rt, inner })
        }

        /// Wrap an already configured controller.
        pub fn from_controller(inner: SessionController) -> crate::Result<Self> {
            let rt = tokio::runtime::Builder::new_current_thread()
                .enable_all()
                .build()
                .map_err(|e| CloudError::Network(e.to_string()))?;
            Ok(Self { rt, inner })
        }

        pub fn session(&self) -> &SearchSession {
            self.inner.session()
        }

        pub fn session_mut(&mut self) -> &mut SearchSession {
            self.inner.session_mut()
        }

        pub fn load_collections(&mut self) -> Result<Vec<CollectionDescriptor>> {
            self.rt.block_on(self.inner.load_collections())
        }

        pub fn submit(&mut self, form: &SearchForm) -> Result<Outcome> {
            self.rt.block_on(self.inner.submit(form))
        }

        pub fn load_more(&mut self) -> Result<Outcome> {
            self.rt.block_on(self.inner.load_more())
        }

        pub fn load_pages(&mut self, max_pages: usize) -> Result<usize> {
            self.rt.block_on(self.inner.load_pages(max_pages))
        }

        pub fn geocode(&self, query: &str) -> Result<GeocodeResult> {
            self.rt.block_on(self.inner.geocode(query))
        }
    }
}

#[cfg(feature = "native")]
pub use inner::*;
