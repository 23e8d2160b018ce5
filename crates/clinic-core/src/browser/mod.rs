//! Generic paginated resource browser
//!
//! One implementation of the fetch/paginate/date-filter/search/edit
//! cycle shared by every list-style dashboard view. A browser owns its
//! [`ResourceQuery`], the last fetched [`ResourcePage`], the selection
//! state for the master/detail toggle, and the loading flag.
//!
//! Fetches are tagged with an issue number so the result of a
//! superseded request is discarded on arrival: the last *issued*
//! query's result wins, never the last *completed* one. The fetch
//! cycle is split into [`ResourceBrowser::begin_fetch`] and
//! [`ResourceBrowser::apply_fetch`] so the single-threaded event loop
//! owns completion ordering; [`ResourceBrowser::refresh`] composes the
//! two for sequential callers.

use std::sync::Arc;

use tracing::{debug, warn};

use crate::api::ResourceGateway;
use crate::daterange::DateRange;
use crate::error::Result;
use crate::identifier::IdentifierKind;
use crate::notify::Notifier;
use crate::resources::{FilterMode, Resource};

/// A search term together with its classified kind
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SearchTerm {
    pub value: String,
    pub kind: IdentifierKind,
}

/// The parameter set driving a list fetch
///
/// Recomputed whenever any field changes; the browser snapshots it into
/// each fetch ticket.
#[derive(Debug, Clone, PartialEq)]
pub struct ResourceQuery {
    /// 1-based page number
    pub page: u32,
    pub date_range: Option<DateRange>,
    /// Server-side status filter; stays `None` for client-filtered
    /// resources
    pub status_filter: Option<String>,
    pub search: Option<SearchTerm>,
    pub sort_key: Option<String>,
}

impl Default for ResourceQuery {
    fn default() -> Self {
        Self {
            page: 1,
            date_range: None,
            status_filter: None,
            search: None,
            sort_key: None,
        }
    }
}

/// One fetched page; replaced wholesale on every successful fetch
#[derive(Debug, Clone)]
pub struct ResourcePage<T> {
    pub items: Vec<T>,
    pub current_page: u32,
    pub total_pages: u32,
}

impl<T> ResourcePage<T> {
    /// A page holding a single point-search result
    pub fn single(item: T) -> Self {
        Self {
            items: vec![item],
            current_page: 1,
            total_pages: 1,
        }
    }
}

impl<T> Default for ResourcePage<T> {
    fn default() -> Self {
        Self {
            items: Vec::new(),
            current_page: 1,
            total_pages: 1,
        }
    }
}

/// Tag for one in-flight fetch
#[derive(Debug, Clone)]
pub struct FetchTicket {
    issue: u64,
    query: ResourceQuery,
}

/// The one body a browser view renders
///
/// Precedence is total and fixed: loading > detail > empty > list, so
/// no view can ever show two conflicting bodies or none at all.
#[derive(Debug, PartialEq)]
pub enum BrowserBody<'a, T> {
    Loading,
    Detail(&'a T),
    Empty,
    List(Vec<&'a T>),
}

/// Browser over one backend resource
pub struct ResourceBrowser<T: Resource> {
    gateway: Arc<dyn ResourceGateway<T>>,
    notifier: Notifier,
    query: ResourceQuery,
    page: ResourcePage<T>,
    /// Index into `page.items`; at most one item selected at a time
    selected: Option<usize>,
    /// Local status filter, used only when `T::FILTER_MODE` is
    /// `ClientSide`
    local_filter: Option<String>,
    loading: bool,
    /// Issue number of the newest fetch; older results are stale
    latest_issue: u64,
    /// Set when a fetch failed with an unrecoverable session error
    session_expired: bool,
}

impl<T: Resource> ResourceBrowser<T> {
    pub fn new(gateway: Arc<dyn ResourceGateway<T>>, notifier: Notifier) -> Self {
        Self {
            gateway,
            notifier,
            query: ResourceQuery::default(),
            page: ResourcePage::default(),
            selected: None,
            local_filter: None,
            loading: false,
            latest_issue: 0,
            session_expired: false,
        }
    }

    pub fn query(&self) -> &ResourceQuery {
        &self.query
    }

    pub fn page(&self) -> &ResourcePage<T> {
        &self.page
    }

    pub fn is_loading(&self) -> bool {
        self.loading
    }

    pub fn gateway(&self) -> Arc<dyn ResourceGateway<T>> {
        Arc::clone(&self.gateway)
    }

    // ========== Query mutations ==========

    /// Move to a page, clamped to `[1, total_pages]`
    ///
    /// Page 0 and negative requests are rejected outright - no query
    /// change, no network call. Returns whether a re-fetch is needed.
    pub fn set_page(&mut self, requested: i64) -> bool {
        if requested < 1 {
            debug!(requested, "Rejected out-of-range page request");
            return false;
        }

        let total = i64::from(self.page.total_pages.max(1));
        let clamped = requested.min(total) as u32;

        if clamped == self.query.page {
            return false;
        }

        self.query.page = clamped;
        true
    }

    /// Replace the date range; the page is kept, the server clamps
    pub fn set_date_range(&mut self, range: DateRange) -> bool {
        if self.query.date_range == Some(range) {
            return false;
        }
        self.query.date_range = Some(range);
        true
    }

    /// Apply a status filter in the mode fixed for this resource
    ///
    /// Server-side resources put the filter into the query and need a
    /// re-fetch; client-side resources narrow the already-fetched page
    /// and never touch the network. An empty filter clears it.
    pub fn set_status_filter(&mut self, filter: Option<String>) -> bool {
        let filter = filter.filter(|f| !f.trim().is_empty());

        match T::FILTER_MODE {
            FilterMode::ServerSide => {
                if self.query.status_filter == filter {
                    return false;
                }
                self.query.status_filter = filter;
                self.query.page = 1;
                true
            }
            FilterMode::ClientSide => {
                self.local_filter = filter;
                self.selected = None;
                false
            }
        }
    }

    /// Set or clear the search term; searching resets to page 1
    pub fn set_search(&mut self, term: &str, kind: IdentifierKind) -> bool {
        let term = term.trim();
        let next = if term.is_empty() {
            None
        } else {
            Some(SearchTerm {
                value: term.to_string(),
                kind,
            })
        };

        if self.query.search == next {
            return false;
        }
        self.query.search = next;
        self.query.page = 1;
        true
    }

    pub fn set_sort_key(&mut self, key: Option<String>) -> bool {
        let key = key.filter(|k| !k.trim().is_empty());
        if self.query.sort_key == key {
            return false;
        }
        self.query.sort_key = key;
        true
    }

    // ========== Fetch cycle ==========

    /// Start a fetch: raise the loading flag and snapshot the query
    pub fn begin_fetch(&mut self) -> FetchTicket {
        self.latest_issue += 1;
        self.loading = true;
        FetchTicket {
            issue: self.latest_issue,
            query: self.query.clone(),
        }
    }

    /// Run the request a ticket describes
    ///
    /// A ticket with a search term performs a point search and wraps
    /// the hit in a single-item page; everything else is a list query.
    pub async fn perform(
        gateway: Arc<dyn ResourceGateway<T>>,
        ticket: &FetchTicket,
    ) -> Result<ResourcePage<T>> {
        match &ticket.query.search {
            Some(search) => gateway
                .find(search.kind, &search.value)
                .await
                .map(ResourcePage::single),
            None => gateway.query(&ticket.query).await,
        }
    }

    /// Complete a fetch
    ///
    /// Stale tickets are dropped without touching any state - a newer
    /// fetch has been issued and its completion is authoritative. On
    /// failure the previous page stays visible and the user gets a
    /// notification.
    pub fn apply_fetch(&mut self, ticket: FetchTicket, result: Result<ResourcePage<T>>) {
        if ticket.issue != self.latest_issue {
            debug!(
                resource = T::ENDPOINT,
                stale = ticket.issue,
                latest = self.latest_issue,
                "Discarding stale fetch result"
            );
            return;
        }

        self.loading = false;

        match result {
            Ok(page) => {
                debug!(
                    resource = T::ENDPOINT,
                    page = page.current_page,
                    items = page.items.len(),
                    "Page replaced"
                );
                self.query.page = page.current_page;
                self.page = page;
                self.selected = None;
            }
            Err(e) => {
                warn!(
                    resource = T::ENDPOINT,
                    code = e.code(),
                    error = %e,
                    "Fetch failed, keeping previous page"
                );
                if !e.is_recoverable() {
                    self.session_expired = true;
                }
                self.notifier.push(e.notification());
            }
        }
    }

    /// Whether a fetch failed with an invalid session since the last
    /// check; reading resets the flag. The caller is expected to drop
    /// back to the login screen.
    pub fn take_session_expired(&mut self) -> bool {
        std::mem::take(&mut self.session_expired)
    }

    /// Convenience for sequential callers: begin, perform, apply
    pub async fn refresh(&mut self) {
        let ticket = self.begin_fetch();
        let result = Self::perform(self.gateway(), &ticket).await;
        self.apply_fetch(ticket, result);
    }

    // ========== Master/detail toggle ==========

    /// Collapse the list into the detail view of one visible item
    ///
    /// Selecting discards any previous selection; at most one item is
    /// ever selected.
    pub fn select_visible(&mut self, position: usize) -> bool {
        match self.visible_indices().get(position) {
            Some(&index) => {
                self.selected = Some(index);
                true
            }
            None => false,
        }
    }

    /// Restore the list view without re-fetching
    pub fn deselect(&mut self) {
        self.selected = None;
    }

    pub fn selected_item(&self) -> Option<&T> {
        self.selected.and_then(|i| self.page.items.get(i))
    }

    // ========== Mutations ==========

    /// Submit an edit of the selected item
    ///
    /// Callers validate the form first (see [`crate::validate`]). On
    /// success the selection is cleared and the current page re-fetched
    /// wholesale - the page is never optimistically patched. On failure
    /// the detail form stays open with a notification.
    pub async fn save(&mut self, item: T) {
        if self.selected.is_none() {
            warn!(resource = T::ENDPOINT, "Save requested with no selection");
            return;
        }

        match self.gateway.update(item.id(), &item).await {
            Ok(_) => {
                self.notifier
                    .success(format!("{} updated successfully!", T::NAME));
                self.selected = None;
                self.refresh().await;
            }
            Err(e) => self.notifier.push(e.notification()),
        }
    }

    /// Submit a new item; on success the current page is re-fetched
    pub async fn create(&mut self, item: T) -> bool {
        match self.gateway.create(&item).await {
            Ok(_) => {
                self.notifier
                    .success(format!("{} created successfully!", T::NAME));
                self.refresh().await;
                true
            }
            Err(e) => {
                self.notifier.push(e.notification());
                false
            }
        }
    }

    // ========== Rendering ==========

    fn visible_indices(&self) -> Vec<usize> {
        match (&T::FILTER_MODE, &self.local_filter) {
            (FilterMode::ClientSide, Some(filter)) => self
                .page
                .items
                .iter()
                .enumerate()
                .filter(|(_, item)| item.status_value() == Some(filter.as_str()))
                .map(|(i, _)| i)
                .collect(),
            _ => (0..self.page.items.len()).collect(),
        }
    }

    /// Items currently shown, after any client-side status filter
    pub fn visible_items(&self) -> Vec<&T> {
        self.visible_indices()
            .into_iter()
            .filter_map(|i| self.page.items.get(i))
            .collect()
    }

    /// The single body to render, by fixed precedence
    pub fn body(&self) -> BrowserBody<'_, T> {
        if self.loading {
            return BrowserBody::Loading;
        }
        if let Some(item) = self.selected_item() {
            return BrowserBody::Detail(item);
        }
        let visible = self.visible_items();
        if visible.is_empty() {
            return BrowserBody::Empty;
        }
        BrowserBody::List(visible)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::api::ResourceGateway;
    use crate::error::Error;
    use async_trait::async_trait;
    use serde::{Deserialize, Serialize};
    use std::sync::Mutex;

    #[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
    struct Ticket {
        id: i64,
        status: String,
    }

    impl Resource for Ticket {
        const ENDPOINT: &'static str = "ticket";
        const NAME: &'static str = "Ticket";
        const FILTER_MODE: FilterMode = FilterMode::ClientSide;

        fn id(&self) -> i64 {
            self.id
        }

        fn status_value(&self) -> Option<&str> {
            Some(&self.status)
        }
    }

    /// Gateway returning a canned page and logging every query
    struct FakeGateway {
        queries: Mutex<Vec<ResourceQuery>>,
        fail: Mutex<bool>,
        total_pages: u32,
    }

    impl FakeGateway {
        fn new(total_pages: u32) -> Arc<Self> {
            Arc::new(Self {
                queries: Mutex::new(Vec::new()),
                fail: Mutex::new(false),
                total_pages,
            })
        }

        fn set_failing(&self, failing: bool) {
            *self.fail.lock().unwrap() = failing;
        }

        fn query_log(&self) -> Vec<ResourceQuery> {
            self.queries.lock().unwrap().clone()
        }
    }

    #[async_trait]
    impl ResourceGateway<Ticket> for FakeGateway {
        async fn query(&self, query: &ResourceQuery) -> Result<ResourcePage<Ticket>> {
            self.queries.lock().unwrap().push(query.clone());
            if *self.fail.lock().unwrap() {
                return Err(Error::Api("server unavailable".to_string()));
            }
            Ok(ResourcePage {
                items: vec![
                    Ticket { id: 1, status: "PENDING".to_string() },
                    Ticket { id: 2, status: "COMPLETE".to_string() },
                ],
                current_page: query.page,
                total_pages: self.total_pages,
            })
        }

        async fn find(&self, _kind: IdentifierKind, value: &str) -> Result<Ticket> {
            if value == "missing" {
                return Err(Error::NotFound(Ticket::NAME.to_string()));
            }
            Ok(Ticket { id: 99, status: "PENDING".to_string() })
        }

        async fn create(&self, item: &Ticket) -> Result<Ticket> {
            Ok(item.clone())
        }

        async fn update(&self, _id: i64, item: &Ticket) -> Result<Ticket> {
            Ok(item.clone())
        }
    }

    fn browser_with(gateway: Arc<FakeGateway>) -> (ResourceBrowser<Ticket>, Notifier) {
        let notifier = Notifier::new();
        (ResourceBrowser::new(gateway, notifier.clone()), notifier)
    }

    #[tokio::test]
    async fn negative_page_is_rejected_without_a_fetch() {
        let gateway = FakeGateway::new(3);
        let (mut browser, _) = browser_with(Arc::clone(&gateway));
        browser.refresh().await;

        assert!(!browser.set_page(-5));
        assert!(!browser.set_page(0));
        assert_eq!(browser.query().page, 1);
        // Only the initial refresh hit the gateway
        assert_eq!(gateway.query_log().len(), 1);
    }

    #[tokio::test]
    async fn page_is_clamped_to_total_pages() {
        let gateway = FakeGateway::new(3);
        let (mut browser, _) = browser_with(gateway);
        browser.refresh().await;

        assert!(browser.set_page(50));
        assert_eq!(browser.query().page, 3);
    }

    #[tokio::test]
    async fn failed_fetch_preserves_previous_items() {
        let gateway = FakeGateway::new(3);
        let (mut browser, notifier) = browser_with(Arc::clone(&gateway));
        browser.refresh().await;
        assert_eq!(browser.page().items.len(), 2);

        gateway.set_failing(true);
        browser.set_page(2);
        browser.refresh().await;

        // Previous page still visible, one error notification, loading cleared
        assert_eq!(browser.page().items.len(), 2);
        assert_eq!(browser.page().current_page, 1);
        assert!(!browser.is_loading());
        assert_eq!(notifier.pending_count(), 1);
    }

    #[tokio::test]
    async fn stale_fetch_result_is_discarded() {
        let gateway = FakeGateway::new(5);
        let (mut browser, _) = browser_with(Arc::clone(&gateway));
        browser.refresh().await;

        // Issue query A (page 2), then query B (page 3) before A lands
        browser.set_page(2);
        let ticket_a = browser.begin_fetch();
        let result_a = ResourceBrowser::perform(browser.gateway(), &ticket_a).await;

        browser.set_page(3);
        let ticket_b = browser.begin_fetch();
        let result_b = ResourceBrowser::perform(browser.gateway(), &ticket_b).await;

        // B's response arrives first, then A's late response
        browser.apply_fetch(ticket_b, result_b);
        browser.apply_fetch(ticket_a, result_a);

        // The last issued query wins, not the last completed
        assert_eq!(browser.page().current_page, 3);
        assert!(!browser.is_loading());
    }

    #[tokio::test]
    async fn client_side_filter_narrows_without_a_fetch() {
        let gateway = FakeGateway::new(1);
        let (mut browser, _) = browser_with(Arc::clone(&gateway));
        browser.refresh().await;

        let needs_fetch = browser.set_status_filter(Some("COMPLETE".to_string()));
        assert!(!needs_fetch);
        assert_eq!(gateway.query_log().len(), 1);

        let visible = browser.visible_items();
        assert_eq!(visible.len(), 1);
        assert_eq!(visible[0].id, 2);
        // The filter never leaks into the server query
        assert!(browser.query().status_filter.is_none());

        browser.set_status_filter(None);
        assert_eq!(browser.visible_items().len(), 2);
    }

    #[tokio::test]
    async fn body_precedence_is_total() {
        let gateway = FakeGateway::new(1);
        let (mut browser, _) = browser_with(gateway);

        // Nothing fetched yet: empty state, not a blank screen
        assert_eq!(browser.body(), BrowserBody::Empty);

        let ticket = browser.begin_fetch();
        assert_eq!(browser.body(), BrowserBody::Loading);

        let result = ResourceBrowser::perform(browser.gateway(), &ticket).await;
        browser.apply_fetch(ticket, result);
        assert!(matches!(browser.body(), BrowserBody::List(_)));

        assert!(browser.select_visible(0));
        assert!(matches!(browser.body(), BrowserBody::Detail(_)));

        browser.deselect();
        assert!(matches!(browser.body(), BrowserBody::List(_)));

        // A filter that matches nothing renders the empty state
        browser.set_status_filter(Some("CANCELLED".to_string()));
        assert_eq!(browser.body(), BrowserBody::Empty);
    }

    #[tokio::test]
    async fn invalid_session_raises_the_expired_flag_once() {
        let gateway = FakeGateway::new(1);
        let (mut browser, notifier) = browser_with(gateway);

        let ticket = browser.begin_fetch();
        browser.apply_fetch(ticket, Err(Error::Session));

        assert!(browser.take_session_expired());
        // Reading resets the flag
        assert!(!browser.take_session_expired());
        assert_eq!(notifier.pending_count(), 1);

        // Recoverable failures never raise it
        let ticket = browser.begin_fetch();
        browser.apply_fetch(ticket, Err(Error::Api("server unavailable".to_string())));
        assert!(!browser.take_session_expired());
    }

    #[tokio::test]
    async fn deselect_restores_the_list_without_refetching() {
        let gateway = FakeGateway::new(1);
        let (mut browser, _) = browser_with(Arc::clone(&gateway));
        browser.refresh().await;

        browser.select_visible(0);
        browser.deselect();
        assert_eq!(gateway.query_log().len(), 1);
    }

    #[tokio::test]
    async fn save_clears_selection_and_refetches() {
        let gateway = FakeGateway::new(1);
        let (mut browser, notifier) = browser_with(Arc::clone(&gateway));
        browser.refresh().await;
        browser.select_visible(0);

        let edited = Ticket { id: 1, status: "COMPLETE".to_string() };
        browser.save(edited).await;

        assert!(browser.selected_item().is_none());
        // Initial fetch plus the post-save re-fetch
        assert_eq!(gateway.query_log().len(), 2);
        let notes = notifier.drain();
        assert_eq!(notes.len(), 1);
        assert!(notes[0].message.contains("updated"));
    }

    #[tokio::test]
    async fn search_uses_point_lookup_and_not_found_is_reported() {
        let gateway = FakeGateway::new(1);
        let (mut browser, notifier) = browser_with(Arc::clone(&gateway));
        browser.refresh().await;

        assert!(browser.set_search("0712345678", IdentifierKind::Phone));
        browser.refresh().await;
        assert_eq!(browser.page().items.len(), 1);
        assert_eq!(browser.page().items[0].id, 99);

        assert!(browser.set_search("missing", IdentifierKind::Username));
        browser.refresh().await;
        // Previous result preserved, distinct not-found message surfaced
        assert_eq!(browser.page().items[0].id, 99);
        let notes = notifier.drain();
        assert_eq!(notes.last().unwrap().message, "Ticket not found");
    }
}
