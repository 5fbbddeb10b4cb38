//! Drives a [`SearchSession`] from catalog and geocoder responses.

use tracing::{info, warn};

use stacscout_core::accumulator::PageResult;
use stacscout_core::error::{Error, Result};
use stacscout_core::geocode::GeocodeResult;
use stacscout_core::query::SearchForm;
use stacscout_core::registry::CollectionDescriptor;
use stacscout_core::session::{Outcome, SearchSession, Ticket};

use crate::catalog::{Catalog, ClientOptions};
use crate::client::CatalogClient;
use crate::geocoder::Geocoder;

/// Owns the session state and the clients that feed it.
///
/// Every intent awaits its request to completion before returning, so a
/// second intent cannot start while one is outstanding. Dropping an intent's
/// future mid-request records the request as failed, leaving the session
/// ready for the next intent.
pub struct SessionController {
    client: CatalogClient,
    geocoder: Geocoder,
    session: SearchSession,
}

impl SessionController {
    /// Controller using the public Nominatim geocoder.
    pub fn new(catalog: Catalog, options: ClientOptions) -> crate::Result<Self> {
        let geocoder = Geocoder::nominatim(&options)?;
        Self::with_geocoder(catalog, options, geocoder)
    }

    pub fn with_geocoder(
        catalog: Catalog,
        options: ClientOptions,
        geocoder: Geocoder,
    ) -> crate::Result<Self> {
        let session = SearchSession::new(catalog.browser_base());
        let client = CatalogClient::new(catalog, options)?;
        Ok(Self {
            client,
            geocoder,
            session,
        })
    }

    pub fn session(&self) -> &SearchSession {
        &self.session
    }

    /// Mutable access for filter changes and `reset`.
    pub fn session_mut(&mut self) -> &mut SearchSession {
        &mut self.session
    }

    /// Fetch and register the catalog's collections.
    ///
    /// On failure the registry is left as it was; there is no retry
    /// beyond the client's transport retries.
    pub async fn load_collections(&mut self) -> Result<Vec<CollectionDescriptor>> {
        match self.client.collections().await {
            Ok(entries) => Ok(self.session.load_collections(entries)),
            Err(e) => {
                warn!("collection listing failed: {e}");
                Err(e.into_core(Error::RegistryUnavailable))
            }
        }
    }

    /// Validate the form and run a fresh search.
    pub async fn submit(&mut self, form: &SearchForm) -> Result<Outcome> {
        let request = form.build()?;
        let ticket = self.session.begin_search(request.clone())?;
        let pending = InFlight::new(&mut self.session, ticket);

        match self.client.search(&request).await {
            Ok(col) => Ok(pending.complete(PageResult::from(col))),
            Err(e) => {
                let message = e.to_string();
                pending.fail(message.clone());
                Err(Error::SearchFailed(message))
            }
        }
    }

    /// Fetch the next page of the current search.
    pub async fn load_more(&mut self) -> Result<Outcome> {
        let request = self.session.request().cloned().ok_or(Error::NoMorePages)?;
        let (ticket, link) = self.session.begin_continuation()?;
        let pending = InFlight::new(&mut self.session, ticket);

        match self.client.follow_next(&link, &request).await {
            Ok(col) => Ok(pending.complete(PageResult::from(col))),
            Err(e) => {
                let message = e.to_string();
                pending.fail(message.clone());
                Err(Error::SearchFailed(message))
            }
        }
    }

    /// Keep loading pages until `max_pages` have been fetched in total or
    /// the catalog runs out.
    pub async fn load_pages(&mut self, max_pages: usize) -> Result<usize> {
        let mut pages = 1;
        while pages < max_pages && self.session.has_more() {
            self.load_more().await?;
            pages += 1;
        }
        info!(pages, items = self.session.items().len(), "pagination finished");
        Ok(pages)
    }

    /// Resolve a place name to a bounding box. Session state is untouched.
    pub async fn geocode(&self, query: &str) -> Result<GeocodeResult> {
        self.geocoder
            .locate(query)
            .await
            .map_err(|e| e.into_core(Error::GeocodeNotFound))
    }
}

/// A ticket awaiting its response. Fails the ticket on drop unless it was
/// settled first.
struct InFlight<'a> {
    session: &'a mut SearchSession,
    ticket: Ticket,
    settled: bool,
}

impl<'a> InFlight<'a> {
    fn new(session: &'a mut SearchSession, ticket: Ticket) -> Self {
        Self {
            session,
            ticket,
            settled: false,
        }
    }

    fn complete(mut self, page: PageResult) -> Outcome {
        self.settled = true;
        self.session.complete(self.ticket, page)
    }

    fn fail(mut self, message: String) -> Outcome {
        self.settled = true;
        self.session.fail(self.ticket, message)
    }
}

impl Drop for InFlight<'_> {
    fn drop(&mut self) {
        if !self.settled {
            warn!(kind = ?self.ticket.kind(), "request dropped before completion");
            self.session.fail(self.ticket, "request cancelled");
        }
    }
}
