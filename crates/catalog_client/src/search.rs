//! Controller behind the search page: owns [`QueryState`], mirrors it into
//! the address bar and turns it into paginated queries.

use std::{
    sync::{Arc, Weak},
    time::Duration,
};

use shared::{
    domain::{CategoryId, SortSpec, WorkId},
    error::ErrorCode,
    protocol::Category,
};
use tokio::sync::{broadcast, Mutex};
use tracing::{debug, error, info, warn};

use crate::{
    address_bar::{read_state, write_state, AddressBar},
    api::CatalogApi,
    debounce::{Debouncer, SEARCH_QUIET_WINDOW},
    events::{CatalogEvent, View},
    pagination::pagination_window,
    query::{QueryDescriptor, ResultPage},
    random::{RandomWorkPicker, RANDOM_THROTTLE},
    state::{QueryState, DEFAULT_PAGE_SIZE},
    EVENT_CHANNEL_CAPACITY,
};

#[derive(Debug, Clone)]
pub struct SearchOptions {
    pub page_size: u32,
    pub quiet_window: Duration,
    pub random_interval: Duration,
}

impl Default for SearchOptions {
    fn default() -> Self {
        Self {
            page_size: DEFAULT_PAGE_SIZE,
            quiet_window: SEARCH_QUIET_WINDOW,
            random_interval: RANDOM_THROTTLE,
        }
    }
}

/// What a dispatch ended up presenting.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DispatchOutcome {
    Rendered { total_count: u64, total_pages: u32 },
    Empty { total_count: u64 },
    Failed(ErrorCode),
    /// A newer dispatch started before this one finished; its response was dropped.
    Superseded,
}

struct SearchSession {
    query: QueryState,
    result: Option<ResultPage>,
    total_pages: u32,
    latest_seq: u64,
    categories: Vec<Category>,
}

/// A claimed dispatch: only the holder of the latest `seq` may present its response.
struct Ticket {
    seq: u64,
    descriptor: QueryDescriptor,
}

impl SearchSession {
    fn next_ticket(&mut self, page_size: u32) -> Ticket {
        self.latest_seq += 1;
        Ticket {
            seq: self.latest_seq,
            descriptor: self.query.descriptor(page_size),
        }
    }
}

pub struct SearchController {
    api: Arc<dyn CatalogApi>,
    address_bar: Arc<dyn AddressBar>,
    options: SearchOptions,
    inner: Mutex<SearchSession>,
    random: RandomWorkPicker,
    events: broadcast::Sender<CatalogEvent>,
}

impl SearchController {
    pub fn new(api: Arc<dyn CatalogApi>, address_bar: Arc<dyn AddressBar>) -> Arc<Self> {
        Self::new_with_options(api, address_bar, SearchOptions::default())
    }

    pub fn new_with_options(
        api: Arc<dyn CatalogApi>,
        address_bar: Arc<dyn AddressBar>,
        options: SearchOptions,
    ) -> Arc<Self> {
        let (events, _) = broadcast::channel(EVENT_CHANNEL_CAPACITY);
        let options = SearchOptions {
            page_size: options.page_size.max(1),
            ..options
        };
        Arc::new(Self {
            random: RandomWorkPicker::new(api.clone(), events.clone(), options.random_interval),
            api,
            address_bar,
            options,
            inner: Mutex::new(SearchSession {
                query: QueryState::default(),
                result: None,
                total_pages: 0,
                latest_seq: 0,
                categories: Vec::new(),
            }),
            events,
        })
    }

    pub fn subscribe_events(&self) -> broadcast::Receiver<CatalogEvent> {
        self.events.subscribe()
    }

    pub fn page_size(&self) -> u32 {
        self.options.page_size
    }

    pub async fn state(&self) -> QueryState {
        self.inner.lock().await.query.clone()
    }

    pub async fn total_pages(&self) -> u32 {
        self.inner.lock().await.total_pages
    }

    pub async fn result(&self) -> Option<ResultPage> {
        self.inner.lock().await.result.clone()
    }

    pub async fn categories(&self) -> Vec<Category> {
        self.inner.lock().await.categories.clone()
    }

    /// Loads categories, adopts the state found in the address bar and runs
    /// the first search. A bookmarked page past the last one is pulled back
    /// to the last page.
    pub async fn initialize(&self) -> DispatchOutcome {
        self.load_categories().await;

        let parsed = read_state(self.address_bar.as_ref());
        let ticket = {
            let mut guard = self.inner.lock().await;
            guard.query = parsed.clone();
            self.publish(&mut guard)
        };
        let _ = self.events.send(CatalogEvent::ControlsSynced(parsed));

        let outcome = self.run(ticket).await;
        if let DispatchOutcome::Empty { total_count } = outcome {
            if total_count > 0 {
                let clamped = {
                    let mut guard = self.inner.lock().await;
                    let last = guard.total_pages;
                    if last > 0 && guard.query.page() > last {
                        guard.query.set_page(last);
                        Some(self.publish(&mut guard))
                    } else {
                        None
                    }
                };
                if let Some(ticket) = clamped {
                    return self.run(ticket).await;
                }
            }
        }
        outcome
    }

    async fn load_categories(&self) {
        match self.api.list_categories().await {
            Ok(categories) => {
                debug!(count = categories.len(), "categories loaded");
                self.inner.lock().await.categories = categories.clone();
                let _ = self.events.send(CatalogEvent::CategoriesLoaded(categories));
            }
            Err(err) => warn!(%err, "failed to load categories"),
        }
    }

    /// Mirrors a just-changed state into the address bar and claims the next
    /// dispatch. Must run under the same lock as the mutation.
    fn publish(&self, session: &mut SearchSession) -> Ticket {
        write_state(self.address_bar.as_ref(), &session.query);
        session.next_ticket(self.options.page_size)
    }

    /// Applies `mutate`; returns `None` without dispatching when it reports no change.
    async fn commit(
        &self,
        mutate: impl FnOnce(&mut QueryState) -> bool,
    ) -> Option<DispatchOutcome> {
        let ticket = {
            let mut guard = self.inner.lock().await;
            if !mutate(&mut guard.query) {
                return None;
            }
            self.publish(&mut guard)
        };
        Some(self.run(ticket).await)
    }

    async fn commit_always(&self, mutate: impl FnOnce(&mut QueryState)) -> DispatchOutcome {
        let ticket = {
            let mut guard = self.inner.lock().await;
            mutate(&mut guard.query);
            self.publish(&mut guard)
        };
        self.run(ticket).await
    }

    /// Returns `None` when the trimmed text equals the current search text.
    pub async fn set_search_text(&self, text: &str) -> Option<DispatchOutcome> {
        self.commit(|query| query.apply_search_text(text)).await
    }

    /// Input-event handle: calls collapse until the quiet window passes, then
    /// the last text is committed through [`Self::set_search_text`].
    pub fn debounced_search_input(self: &Arc<Self>) -> Debouncer<String> {
        let controller: Weak<Self> = Arc::downgrade(self);
        Debouncer::spawn(self.options.quiet_window, move |text: String| {
            let controller = controller.clone();
            async move {
                if let Some(controller) = controller.upgrade() {
                    controller.set_search_text(&text).await;
                }
            }
        })
    }

    pub async fn set_category_filter(&self, category: Option<CategoryId>) -> DispatchOutcome {
        self.commit_always(|query| query.apply_category(category)).await
    }

    pub async fn set_sort(&self, sort: SortSpec) -> DispatchOutcome {
        self.commit_always(|query| query.apply_sort(sort)).await
    }

    /// Sort from a form value such as `views_desc`; unknown values select the default sort.
    pub async fn set_sort_token(&self, token: &str) -> DispatchOutcome {
        let sort = token.parse::<SortSpec>().unwrap_or_else(|err| {
            debug!(%err, "falling back to default sort");
            SortSpec::default()
        });
        self.set_sort(sort).await
    }

    /// Clamps `page` into `[1, total_pages]`. Does nothing while there are no
    /// pages to go to.
    pub async fn go_to_page(&self, page: i64) -> Option<DispatchOutcome> {
        let ticket = {
            let mut guard = self.inner.lock().await;
            let total = guard.total_pages;
            if total == 0 {
                debug!(page, "ignoring page change without results");
                return None;
            }
            let target = page.clamp(1, i64::from(total));
            let target = u32::try_from(target).unwrap_or(1);
            guard.query.set_page(target);
            self.publish(&mut guard)
        };
        Some(self.run(ticket).await)
    }

    /// Page change from untyped input; anything non-numeric means page 1.
    pub async fn go_to_page_raw(&self, raw: &str) -> Option<DispatchOutcome> {
        let page = raw.trim().parse::<i64>().unwrap_or(1);
        self.go_to_page(page).await
    }

    pub async fn clear_all(&self) -> DispatchOutcome {
        let ticket = {
            let mut guard = self.inner.lock().await;
            guard.query.reset();
            self.publish(&mut guard)
        };
        let _ = self
            .events
            .send(CatalogEvent::ControlsSynced(QueryState::default()));
        self.run(ticket).await
    }

    /// Runs the current state against the data API. Safe to call again after
    /// a failure: the state it queries is left untouched.
    pub async fn dispatch(&self) -> DispatchOutcome {
        let ticket = self
            .inner
            .lock()
            .await
            .next_ticket(self.options.page_size);
        self.run(ticket).await
    }

    async fn run(&self, ticket: Ticket) -> DispatchOutcome {
        let Ticket { seq, descriptor } = ticket;
        let _ = self.events.send(CatalogEvent::Loading(View::SearchResults));
        debug!(
            seq,
            offset = descriptor.offset,
            limit = descriptor.limit,
            text = descriptor.text.as_deref().unwrap_or(""),
            sort = %descriptor.sort,
            "dispatching search"
        );

        let response = self.api.search_works(&descriptor).await;

        let mut guard = self.inner.lock().await;
        if seq != guard.latest_seq {
            debug!(
                seq,
                latest = guard.latest_seq,
                "discarding superseded search response"
            );
            return DispatchOutcome::Superseded;
        }

        match response {
            Ok(page) => {
                let total_count = page.total_count;
                let total_pages = page.total_pages(self.options.page_size);
                let current = guard.query.page();
                guard.total_pages = total_pages;
                guard.result = Some(page.clone());
                drop(guard);

                info!(seq, total_count, total_pages, "search completed");
                if page.is_empty() {
                    let _ = self.events.send(CatalogEvent::NoResults);
                    DispatchOutcome::Empty { total_count }
                } else {
                    let _ = self.events.send(CatalogEvent::SearchResults {
                        page,
                        total_pages,
                        pagination: pagination_window(current, total_pages),
                    });
                    DispatchOutcome::Rendered {
                        total_count,
                        total_pages,
                    }
                }
            }
            Err(err) => {
                drop(guard);
                error!(seq, %err, "search failed");
                let _ = self.events.send(CatalogEvent::Error {
                    view: View::SearchResults,
                    message: err.user_message().to_string(),
                });
                DispatchOutcome::Failed(err.code())
            }
        }
    }

    pub async fn random_work(&self) -> Option<WorkId> {
        self.random.pick(None).await
    }
}

#[cfg(test)]
#[path = "tests/search_tests.rs"]
mod tests;
