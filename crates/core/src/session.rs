//! Search session: the single owner of all per-session browsing state.
//!
//! A [`SearchSession`] holds the accumulated results, pagination cursor,
//! filter settings, visible subset and map overlay table. The network
//! layer drives it with a begin/complete protocol:
//!
//! 1. [`SearchSession::begin_search`] or [`SearchSession::begin_continuation`]
//!    hands out a [`Ticket`] and moves the session to [`Phase::Searching`].
//! 2. The caller performs the request.
//! 3. [`SearchSession::complete`] or [`SearchSession::fail`] applies the
//!    outcome, unless the ticket has been superseded in the meantime.

use serde::Serialize;
use tracing::{debug, info, warn};

use crate::accumulator::{PageResult, PaginationCursor, ResultAccumulator};
use crate::detail::ItemDetail;
use crate::error::{Error, Result};
use crate::filter::{self, FilterState, TimeWindow};
use crate::histogram::DayHistogram;
use crate::item::Item;
use crate::map_sync::{MapSync, SyncReport};
use crate::models::{CollectionEntry, SearchRequest, StacLink};
use crate::registry::{CollectionDescriptor, CollectionRegistry};

/// Request lifecycle of the session.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize)]
pub enum Phase {
    #[default]
    Idle,
    Searching,
    Error(String),
}

/// Which kind of request a ticket belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RequestKind {
    Fresh,
    Continuation,
}

/// Handle for one in-flight request.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Ticket {
    seq: u64,
    kind: RequestKind,
}

impl Ticket {
    pub fn kind(&self) -> RequestKind {
        self.kind
    }
}

/// Result of feeding a response back into the session.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Outcome {
    Applied(SyncReport),
    /// A newer request was issued after this one; nothing changed.
    Stale,
}

/// Owned view-model snapshot for presentation layers.
#[derive(Debug, Clone, Serialize)]
pub struct Snapshot {
    pub phase: Phase,
    pub has_more: bool,
    pub accumulated: usize,
    pub matched: Option<u64>,
    pub filter: FilterState,
    pub visible: Vec<Item>,
}

/// Per-session browsing state, owned by a single controller.
#[derive(Debug)]
pub struct SearchSession {
    registry: CollectionRegistry,
    accumulator: ResultAccumulator,
    cursor: PaginationCursor,
    request: Option<SearchRequest>,
    filter: FilterState,
    /// The user moved a window bound since it was last auto-initialized.
    window_narrowed: bool,
    visible: Vec<Item>,
    map: MapSync,
    phase: Phase,
    latest_seq: u64,
    matched: Option<u64>,
    browser_base: String,
}

impl SearchSession {
    /// New session whose detail links point below `browser_base`.
    pub fn new(browser_base: impl Into<String>) -> Self {
        Self {
            registry: CollectionRegistry::new(),
            accumulator: ResultAccumulator::new(),
            cursor: None,
            request: None,
            filter: FilterState::default(),
            window_narrowed: false,
            visible: Vec::new(),
            map: MapSync::new(),
            phase: Phase::Idle,
            latest_seq: 0,
            matched: None,
            browser_base: browser_base.into(),
        }
    }

    // ── Collections ─────────────────────────────────────────────────

    /// Register the catalog's collection listing.
    pub fn load_collections(&mut self, entries: Vec<CollectionEntry>) -> Vec<CollectionDescriptor> {
        let loaded = self.registry.load(entries);
        info!("Loaded {} collections", loaded.len());
        loaded
    }

    pub fn registry(&self) -> &CollectionRegistry {
        &self.registry
    }

    // ── Requests ────────────────────────────────────────────────────

    /// Start a fresh search, clearing the result view.
    pub fn begin_search(&mut self, request: SearchRequest) -> Result<Ticket> {
        if self.phase == Phase::Searching {
            return Err(Error::Busy);
        }
        self.accumulator.clear();
        self.visible.clear();
        self.map.clear();
        self.cursor = None;
        self.matched = None;
        self.request = Some(request);
        self.phase = Phase::Searching;
        Ok(self.issue(RequestKind::Fresh))
    }

    /// Start loading the next page. Returns the link to follow.
    pub fn begin_continuation(&mut self) -> Result<(Ticket, StacLink)> {
        if self.phase == Phase::Searching {
            return Err(Error::Busy);
        }
        let link = self.cursor.clone().ok_or(Error::NoMorePages)?;
        self.phase = Phase::Searching;
        Ok((self.issue(RequestKind::Continuation), link))
    }

    fn issue(&mut self, kind: RequestKind) -> Ticket {
        self.latest_seq += 1;
        debug!(seq = self.latest_seq, ?kind, "issuing request");
        Ticket {
            seq: self.latest_seq,
            kind,
        }
    }

    fn is_current(&self, ticket: Ticket) -> bool {
        if ticket.seq == self.latest_seq {
            true
        } else {
            warn!(
                seq = ticket.seq,
                latest = self.latest_seq,
                "discarding response for superseded request"
            );
            false
        }
    }

    /// Apply a successfully received page.
    pub fn complete(&mut self, ticket: Ticket, page: PageResult) -> Outcome {
        if !self.is_current(ticket) {
            return Outcome::Stale;
        }

        let received = page.items.len();
        if page.matched.is_some() {
            self.matched = page.matched;
        }
        self.cursor = match ticket.kind {
            RequestKind::Fresh => {
                let next = self.accumulator.replace(page);
                self.window_narrowed = false;
                self.reinit_window();
                next
            }
            RequestKind::Continuation => {
                let next = self.accumulator.append(page);
                if !self.window_narrowed {
                    self.reinit_window();
                }
                next
            }
        };
        self.phase = Phase::Idle;
        info!(
            received,
            total = self.accumulator.len(),
            has_more = self.cursor.is_some(),
            "page applied"
        );
        Outcome::Applied(self.recompute())
    }

    /// Record a failed request. Accumulated results are left as they are.
    pub fn fail(&mut self, ticket: Ticket, message: impl Into<String>) -> Outcome {
        if !self.is_current(ticket) {
            return Outcome::Stale;
        }
        let message = message.into();
        warn!("request failed: {message}");
        self.phase = Phase::Error(message);
        Outcome::Applied(SyncReport::default())
    }

    /// Span the window over the accumulated items, or open it fully when
    /// there are none.
    fn reinit_window(&mut self) {
        let window = TimeWindow::spanning(self.accumulator.items())
            .unwrap_or_else(|| FilterState::default().window());
        self.filter.set_window(window);
    }

    // ── Filters ─────────────────────────────────────────────────────

    /// Set the cloud ceiling, clamped to 0..=100. NaN lifts the ceiling.
    pub fn set_max_cloud_cover(&mut self, percent: f64) -> SyncReport {
        self.filter.max_cloud_cover_percent = if percent.is_nan() {
            100.0
        } else {
            percent.clamp(0.0, 100.0)
        };
        self.recompute()
    }

    pub fn set_time_window_start(&mut self, millis: i64) -> SyncReport {
        self.filter.time_window_start_millis = millis;
        self.window_narrowed = true;
        self.recompute()
    }

    pub fn set_time_window_end(&mut self, millis: i64) -> SyncReport {
        self.filter.time_window_end_millis = millis;
        self.window_narrowed = true;
        self.recompute()
    }

    fn recompute(&mut self) -> SyncReport {
        self.visible = filter::apply(self.accumulator.items(), &self.filter);
        self.map.sync(&self.visible, &self.registry)
    }

    // ── Selection ───────────────────────────────────────────────────

    /// Detail view for a list entry.
    pub fn select(&self, item_id: &str) -> Option<ItemDetail> {
        let item = self.accumulator.find(item_id)?;
        Some(ItemDetail::from_item(item, &self.registry, &self.browser_base))
    }

    /// Detail view for a clicked map shape.
    pub fn select_shape(&self, item_id: &str) -> Option<ItemDetail> {
        let id = self.map.select_shape(item_id)?;
        self.select(id)
    }

    // ── Lifecycle ───────────────────────────────────────────────────

    /// Drop all results and filters. Collections and their colors stay.
    ///
    /// Any request still in flight is superseded.
    pub fn reset(&mut self) {
        self.accumulator.clear();
        self.cursor = None;
        self.request = None;
        self.filter = FilterState::default();
        self.window_narrowed = false;
        self.visible.clear();
        self.map.clear();
        self.phase = Phase::Idle;
        self.matched = None;
        self.latest_seq += 1;
    }

    // ── Read-only views ─────────────────────────────────────────────

    pub fn phase(&self) -> &Phase {
        &self.phase
    }

    pub fn is_searching(&self) -> bool {
        self.phase == Phase::Searching
    }

    pub fn has_more(&self) -> bool {
        self.cursor.is_some()
    }

    /// The last submitted search, needed to follow POST `next` links.
    pub fn request(&self) -> Option<&SearchRequest> {
        self.request.as_ref()
    }

    pub fn items(&self) -> &[Item] {
        self.accumulator.items()
    }

    pub fn visible(&self) -> &[Item] {
        &self.visible
    }

    pub fn filter(&self) -> &FilterState {
        &self.filter
    }

    pub fn map(&self) -> &MapSync {
        &self.map
    }

    pub fn matched(&self) -> Option<u64> {
        self.matched
    }

    pub fn histogram(&self) -> DayHistogram {
        DayHistogram::from_items(&self.visible)
    }

    /// Result banner text.
    pub fn summary(&self) -> String {
        match self.matched {
            Some(total) if total as usize > self.accumulator.len() => format!(
                "{} Items Found ({} matched)",
                self.accumulator.len(),
                total
            ),
            _ => format!("{} Items Found", self.accumulator.len()),
        }
    }

    pub fn snapshot(&self) -> Snapshot {
        Snapshot {
            phase: self.phase.clone(),
            has_more: self.has_more(),
            accumulated: self.accumulator.len(),
            matched: self.matched,
            filter: self.filter,
            visible: self.visible.clone(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::filter::DAY_MILLIS;
    use crate::models::{SortBy, SortDirection};

    const T0: i64 = 1_704_067_200_000;

    fn item(id: &str, collection: &str, ts: i64, cloud: Option<f64>) -> Item {
        Item {
            id: id.to_string(),
            collection_id: collection.to_string(),
            timestamp_millis: ts,
            cloud_cover_percent: cloud,
            platform: None,
            geometry: serde_json::json!({"type": "Point", "coordinates": [11.0, 46.0]}),
            assets: Default::default(),
            properties: serde_json::Map::new(),
        }
    }

    fn link(href: &str) -> StacLink {
        StacLink {
            rel: "next".into(),
            href: href.into(),
            method: None,
            body: None,
            merge: None,
        }
    }

    fn page(items: Vec<Item>, next: Option<&str>) -> PageResult {
        PageResult {
            items,
            next: next.map(link),
            matched: None,
        }
    }

    fn request() -> SearchRequest {
        SearchRequest {
            collections: vec!["s1".into(), "s2".into()],
            bbox: [10.0, 45.0, 12.0, 47.0],
            datetime: "2024-01-01T00:00:00Z/2024-01-31T23:59:59Z".into(),
            limit: 50,
            sortby: vec![SortBy {
                field: "properties.datetime".into(),
                direction: SortDirection::Desc,
            }],
            token: None,
        }
    }

    fn session() -> SearchSession {
        let mut s = SearchSession::new("https://browser/collections");
        s.load_collections(vec![
            CollectionEntry { id: "s1".into(), title: None },
            CollectionEntry { id: "s2".into(), title: None },
        ]);
        s
    }

    fn ids(items: &[Item]) -> Vec<&str> {
        items.iter().map(|i| i.id.as_str()).collect()
    }

    #[test]
    fn fresh_search_then_continuations_accumulate_in_order() {
        let mut s = session();
        let t = s.begin_search(request()).unwrap();
        assert!(!s.has_more());
        s.complete(t, page(vec![item("a", "s1", T0, None)], Some("p2")));
        assert!(s.has_more());

        let (t, l) = s.begin_continuation().unwrap();
        assert_eq!(l.href, "p2");
        s.complete(t, page(vec![item("b", "s2", T0 + 1, None)], Some("p3")));

        let (t, _) = s.begin_continuation().unwrap();
        s.complete(t, page(vec![item("c", "s1", T0 + 2, None)], None));

        assert_eq!(ids(s.items()), ["a", "b", "c"]);
        assert!(!s.has_more());
        assert_eq!(s.begin_continuation().unwrap_err(), Error::NoMorePages);
    }

    #[test]
    fn new_search_replaces_results() {
        let mut s = session();
        let t = s.begin_search(request()).unwrap();
        s.complete(t, page(vec![item("a", "s1", T0, None), item("b", "s1", T0, None)], None));

        let t = s.begin_search(request()).unwrap();
        assert!(s.items().is_empty());
        assert!(s.map().is_empty());
        s.complete(t, page(vec![item("z", "s2", T0, None)], None));
        assert_eq!(ids(s.items()), ["z"]);
    }

    #[test]
    fn reentry_while_searching_is_refused() {
        let mut s = session();
        let _t = s.begin_search(request()).unwrap();
        assert!(s.is_searching());
        assert_eq!(s.begin_search(request()).unwrap_err(), Error::Busy);
        assert_eq!(s.begin_continuation().unwrap_err(), Error::Busy);
    }

    #[test]
    fn superseded_response_is_discarded() {
        let mut s = session();
        let stale = s.begin_search(request()).unwrap();
        s.reset();
        let fresh = s.begin_search(request()).unwrap();

        let late = s.complete(stale, page(vec![item("old", "s1", T0, None)], None));
        assert_eq!(late, Outcome::Stale);
        assert!(s.items().is_empty());
        assert!(s.is_searching());

        assert!(matches!(
            s.complete(fresh, page(vec![item("new", "s1", T0, None)], None)),
            Outcome::Applied(_)
        ));
        assert_eq!(ids(s.items()), ["new"]);
    }

    #[test]
    fn failed_continuation_keeps_accumulated_items() {
        let mut s = session();
        let t = s.begin_search(request()).unwrap();
        s.complete(t, page(vec![item("a", "s1", T0, None)], Some("p2")));

        let (t, _) = s.begin_continuation().unwrap();
        s.fail(t, "HTTP 502");
        assert_eq!(s.phase(), &Phase::Error("HTTP 502".into()));
        assert_eq!(ids(s.items()), ["a"]);
        assert!(s.has_more());

        // Still interactive: the next attempt is accepted.
        assert!(s.begin_continuation().is_ok());
    }

    #[test]
    fn failed_fresh_search_leaves_empty_view() {
        let mut s = session();
        let t = s.begin_search(request()).unwrap();
        s.complete(t, page(vec![item("a", "s1", T0, None)], None));

        let t = s.begin_search(request()).unwrap();
        s.fail(t, "timeout");
        assert!(s.items().is_empty());
        assert!(s.visible().is_empty());
    }

    #[test]
    fn first_fetch_initializes_window() {
        let mut s = session();
        let t = s.begin_search(request()).unwrap();
        s.complete(
            t,
            page(vec![item("a", "s1", T0 + 500, None), item("b", "s1", T0 + 100, None)], None),
        );
        assert_eq!(
            s.filter().window(),
            TimeWindow {
                start_millis: T0 + 100,
                end_millis: T0 + 500
            }
        );
    }

    #[test]
    fn single_timestamp_window_is_widened() {
        let mut s = session();
        let t = s.begin_search(request()).unwrap();
        s.complete(t, page(vec![item("a", "s1", T0, None)], None));
        assert_eq!(s.filter().time_window_start_millis, T0 - DAY_MILLIS);
        assert_eq!(s.filter().time_window_end_millis, T0 + DAY_MILLIS);
        assert_eq!(s.visible().len(), 1);
    }

    #[test]
    fn continuation_respans_untouched_window() {
        let mut s = session();
        let t = s.begin_search(request()).unwrap();
        let first = vec![item("a", "s1", T0, None), item("b", "s1", T0 + 10, None)];
        s.complete(t, page(first, Some("p2")));
        let (t, _) = s.begin_continuation().unwrap();
        s.complete(t, page(vec![item("c", "s1", T0 + 1000, None)], None));
        assert_eq!(s.filter().time_window_end_millis, T0 + 1000);
        assert_eq!(s.visible().len(), 3);
    }

    #[test]
    fn continuation_preserves_narrowed_window() {
        let mut s = session();
        let t = s.begin_search(request()).unwrap();
        let first = vec![item("a", "s1", T0, None), item("b", "s1", T0 + 10, None)];
        s.complete(t, page(first, Some("p2")));
        s.set_time_window_end(T0 + 5);
        assert_eq!(ids(s.visible()), ["a"]);

        let (t, _) = s.begin_continuation().unwrap();
        s.complete(t, page(vec![item("c", "s1", T0 + 1000, None)], None));
        assert_eq!(s.filter().time_window_end_millis, T0 + 5);
        assert_eq!(ids(s.visible()), ["a"]);
        assert_eq!(s.items().len(), 3);
    }

    #[test]
    fn empty_fresh_search_reopens_narrowed_window() {
        let mut s = session();
        let t = s.begin_search(request()).unwrap();
        s.complete(t, page(vec![item("a", "s1", T0, None)], None));
        s.set_time_window_start(T0 + 1000);
        s.set_time_window_end(T0 + 1500);

        let t = s.begin_search(request()).unwrap();
        s.complete(t, page(Vec::new(), None));
        assert_eq!(s.filter().window(), FilterState::default().window());
        assert_eq!(s.snapshot().filter, FilterState::default());
    }

    #[test]
    fn narrowing_to_one_timestamp_gives_one_bucket() {
        let mut s = session();
        let t = s.begin_search(request()).unwrap();
        s.complete(
            t,
            page(
                vec![
                    item("a", "s1", T0, None),
                    item("b", "s1", T0 + 2 * DAY_MILLIS, None),
                    item("c", "s2", T0 + 4 * DAY_MILLIS, None),
                ],
                None,
            ),
        );
        s.set_time_window_start(T0 + 2 * DAY_MILLIS);
        s.set_time_window_end(T0 + 2 * DAY_MILLIS);
        assert_eq!(s.visible().len(), 1);
        assert_eq!(s.histogram().len(), 1);
    }

    #[test]
    fn cloud_ceiling_drops_empty_layer() {
        let mut s = session();
        let t = s.begin_search(request()).unwrap();
        s.complete(
            t,
            page(vec![item("a", "s1", T0, Some(5.0)), item("b", "s2", T0, Some(60.0))], None),
        );
        assert_eq!(s.map().len(), 2);

        let report = s.set_max_cloud_cover(10.0);
        assert_eq!(report.removed, ["s2"]);
        assert!(s.map().layer("s2").is_none());
        assert_eq!(ids(s.visible()), ["a"]);
    }

    #[test]
    fn nan_cloud_ceiling_shows_everything() {
        let mut s = session();
        let t = s.begin_search(request()).unwrap();
        s.complete(
            t,
            page(vec![item("a", "s1", T0, Some(5.0)), item("b", "s1", T0, Some(90.0))], None),
        );
        s.set_max_cloud_cover(f64::NAN);
        assert_eq!(s.filter().max_cloud_cover_percent, 100.0);
        assert_eq!(ids(s.visible()), ["a", "b"]);

        s.set_max_cloud_cover(f64::NEG_INFINITY);
        assert_eq!(s.filter().max_cloud_cover_percent, 0.0);
    }

    #[test]
    fn layer_color_follows_collections_loaded_after_search() {
        let mut s = SearchSession::new("https://browser/collections");
        let t = s.begin_search(request()).unwrap();
        s.complete(t, page(vec![item("a", "s1", T0, Some(5.0))], None));
        assert_eq!(s.map().layer("s1").unwrap().color, crate::registry::NEUTRAL_COLOR);

        s.load_collections(vec![CollectionEntry { id: "s1".into(), title: None }]);
        s.set_max_cloud_cover(50.0);

        let assigned = s.registry().color_for("s1");
        assert_ne!(assigned, crate::registry::NEUTRAL_COLOR);
        assert_eq!(s.map().layer("s1").unwrap().color, assigned);
        assert_eq!(s.select("a").unwrap().collection_color, assigned);
    }

    #[test]
    fn list_and_map_selection_agree() {
        let mut s = session();
        let t = s.begin_search(request()).unwrap();
        s.complete(
            t,
            page(vec![item("a", "s1", T0, Some(50.0)), item("b", "s2", T0, Some(1.0))], None),
        );
        // Filtering shifts positions; selection must still follow ids.
        s.set_max_cloud_cover(10.0);
        let from_list = s.select("b").unwrap();
        let from_map = s.select_shape("b").unwrap();
        assert_eq!(from_list, from_map);
        assert_eq!(from_list.browser_url, "https://browser/collections/s2/items/b");
        assert!(s.select_shape("a").is_none());
    }

    #[test]
    fn reset_keeps_colors() {
        let mut s = session();
        let color = s.registry().color_for("s2");
        let t = s.begin_search(request()).unwrap();
        s.complete(t, page(vec![item("a", "s1", T0, None)], Some("p2")));
        s.set_max_cloud_cover(20.0);

        s.reset();
        assert!(s.items().is_empty());
        assert!(!s.has_more());
        assert!(s.request().is_none());
        assert_eq!(s.filter(), &FilterState::default());
        assert_eq!(s.registry().color_for("s2"), color);
    }

    #[test]
    fn summary_mentions_matched_total() {
        let mut s = session();
        let t = s.begin_search(request()).unwrap();
        s.complete(
            t,
            PageResult {
                items: vec![item("a", "s1", T0, None)],
                next: Some(link("p2")),
                matched: Some(40),
            },
        );
        assert_eq!(s.summary(), "1 Items Found (40 matched)");
        assert_eq!(s.snapshot().accumulated, 1);
    }
}
